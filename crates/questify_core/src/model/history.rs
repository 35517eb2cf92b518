//! Completion history ledger.
//!
//! # Responsibility
//! - Tally completion events per calendar day.
//! - Provide trailing windows for trend display.
//!
//! # Invariants
//! - Counts only increment; no entry is ever zero once created.
//! - Undo does not touch history.

use crate::model::day_key::DayKey;
use serde::Serialize;
use std::collections::BTreeMap;

/// Append-only mapping from day to completion count.
///
/// Serializes as a `{"YYYY-MM-DD": count}` map. Stored entries are
/// rebuilt through `from_entries` so zero counts are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HistoryLedger {
    days: BTreeMap<DayKey, u32>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the tally for `day`, creating the entry on first use.
    ///
    /// Returns the new count for that day.
    pub fn record_completion(&mut self, day: DayKey) -> u32 {
        let count = self.days.entry(day).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Completion count for `day`, zero when no entry exists.
    pub fn count_on(&self, day: DayKey) -> u32 {
        self.days.get(&day).copied().unwrap_or(0)
    }

    /// Returns `days` consecutive entries ending at `today`, oldest first.
    ///
    /// Days without completions are reported with a zero count.
    pub fn trailing_window(&self, today: DayKey, days: u32) -> Vec<(DayKey, u32)> {
        (0..i64::from(days))
            .rev()
            .filter_map(|back| today.offset_days(-back))
            .map(|day| (day, self.count_on(day)))
            .collect()
    }

    /// Sum of all recorded completions.
    pub fn total(&self) -> u64 {
        self.days.values().map(|count| u64::from(*count)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DayKey, u32)> + '_ {
        self.days.iter().map(|(day, count)| (*day, *count))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Rebuilds a ledger from stored entries.
    ///
    /// Returns the first offending day when any count is zero.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (DayKey, u32)>,
    ) -> Result<Self, DayKey> {
        let mut days = BTreeMap::new();
        for (day, count) in entries {
            if count == 0 {
                return Err(day);
            }
            days.insert(day, count);
        }
        Ok(Self { days })
    }
}
