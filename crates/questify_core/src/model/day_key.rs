//! Calendar-day keys and clock abstraction.
//!
//! # Responsibility
//! - Normalize points in time to calendar-day keys.
//! - Answer day-adjacency questions used by streak policy.
//! - Provide a `Clock` seam so date-dependent logic is testable.
//!
//! # Invariants
//! - Two instants on the same calendar day (in their own offset) map to the
//!   same `DayKey`, regardless of time-of-day.
//! - `DayKey` serializes as `YYYY-MM-DD`.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Calendar-day key with no time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Returns the calendar-day key of `now`, evaluated in `now`'s own zone.
    pub fn from_datetime<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self(now.date_naive())
    }

    /// Builds a key from calendar components. Returns `None` for invalid dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn as_date(self) -> NaiveDate {
        self.0
    }

    /// Returns the key shifted by `days` (negative moves backwards).
    ///
    /// Returns `None` when the shift leaves chrono's supported date range.
    pub fn offset_days(self, days: i64) -> Option<Self> {
        self.0.checked_add_signed(Duration::days(days)).map(Self)
    }

    /// True iff `self` is exactly the calendar day before `reference`.
    pub fn is_immediately_previous_day(self, reference: DayKey) -> bool {
        self.0.succ_opt() == Some(reference.0)
    }
}

impl Display for DayKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = chrono::ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(value.trim(), DAY_KEY_FORMAT).map(Self)
    }
}

/// Source of "now" for date-dependent operations.
pub trait Clock {
    /// Current instant as Unix epoch milliseconds.
    fn now_epoch_ms(&self) -> i64;
    /// Calendar-day key of the current instant.
    fn today(&self) -> DayKey;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_epoch_ms(&self) -> i64 {
        (**self).now_epoch_ms()
    }

    fn today(&self) -> DayKey {
        (**self).today()
    }
}

/// Local system clock. Day keys follow the machine's local calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn today(&self) -> DayKey {
        DayKey::from_datetime(&Local::now())
    }
}

/// Manually driven clock for tests and replays.
///
/// Interior mutability keeps `advance_days` usable while the clock is
/// borrowed by a service.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn at(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Clock pinned to noon UTC of `day`.
    pub fn on_day(day: DayKey) -> Self {
        let noon = day
            .as_date()
            .and_hms_opt(12, 0, 0)
            .unwrap_or_default()
            .and_utc()
            .fixed_offset();
        Self::at(noon)
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        self.now.set(now);
    }

    pub fn set_day(&self, day: DayKey) {
        self.set(Self::on_day(day).now.get());
    }

    /// Moves the clock forward (or backward) by whole days.
    pub fn advance_days(&self, days: i64) {
        let current = self.now.get();
        if let Some(next) = current.checked_add_signed(Duration::days(days)) {
            self.now.set(next);
        }
    }
}

impl Clock for FixedClock {
    fn now_epoch_ms(&self) -> i64 {
        self.now.get().timestamp_millis()
    }

    fn today(&self) -> DayKey {
        DayKey::from_datetime(&self.now.get())
    }
}
