//! Progress state record.
//!
//! # Invariants
//! - `level >= 1`.
//! - `xp < xp_threshold(level)` after every progression operation.
//! - `level` never decreases outside of a full reset.

use crate::model::day_key::DayKey;
use serde::{Deserialize, Serialize};

/// XP, level and streak bookkeeping for one user.
///
/// Serialized with the export document field names
/// (`xp`, `level`, `streak`, `lastDoneDate`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub xp: u64,
    pub level: u32,
    pub streak: u32,
    pub last_done_date: Option<DayKey>,
}

impl ProgressState {
    /// Fresh progress: level 1, no XP, no streak.
    pub fn new() -> Self {
        Self {
            xp: 0,
            level: 1,
            streak: 0,
            last_done_date: None,
        }
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new()
    }
}
