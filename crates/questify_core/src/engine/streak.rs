//! Daily streak policy.
//!
//! # Invariants
//! - Evaluated once per completion event, never once per task.
//! - Same-day completions never change the streak value.
//! - `last_done_date` always equals the event day afterwards.

use crate::model::day_key::DayKey;
use crate::model::progress::ProgressState;

/// Which branch of the streak policy fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// No previous completion; streak starts at 1.
    Started,
    /// Already completed earlier the same day.
    Unchanged,
    /// Previous completion was yesterday; streak grew by one.
    Extended,
    /// Gap of two or more days, or a previous date after `today`.
    Reset,
}

/// Applies the streak policy for a completion on `today`.
pub fn record_streak(state: &mut ProgressState, today: DayKey) -> StreakChange {
    let change = match state.last_done_date {
        None => {
            state.streak = 1;
            StreakChange::Started
        }
        Some(last) if last == today => StreakChange::Unchanged,
        Some(last) if last.is_immediately_previous_day(today) => {
            state.streak = state.streak.saturating_add(1);
            StreakChange::Extended
        }
        Some(_) => {
            state.streak = 1;
            StreakChange::Reset
        }
    };
    state.last_done_date = Some(today);
    change
}
