//! XP rewards, level thresholds and level-up rollover.
//!
//! # Invariants
//! - `xp_threshold` is strictly increasing for `level >= 1`.
//! - After `apply_reward`, `xp < xp_threshold(level)`.
//! - One `LevelUp` is emitted per level gained.
//! - Reward bookkeeping is constant-size whatever the amount; only the
//!   rollover loop scales with the number of levels crossed.

use crate::model::progress::ProgressState;
use crate::model::task::Difficulty;

const THRESHOLD_BASE: f64 = 80.0;
const THRESHOLD_LINEAR: f64 = 20.0;
const THRESHOLD_CURVE_EXPONENT: f64 = 1.3;
const THRESHOLD_CURVE_SCALE: f64 = 15.0;

const BAR_MIN_PERCENT: u8 = 2;
const BAR_MAX_PERCENT: u8 = 98;

/// XP granted for completing a task of the given difficulty.
pub fn xp_reward(difficulty: Difficulty) -> u64 {
    match difficulty {
        Difficulty::Hard => 35,
        Difficulty::Medium => 20,
        Difficulty::Easy => 10,
    }
}

/// XP needed to leave `level`: `round(80 + level*20 + level^1.3 * 15)`.
pub fn xp_threshold(level: u32) -> u64 {
    let level = f64::from(level);
    let raw = THRESHOLD_BASE
        + level * THRESHOLD_LINEAR
        + level.powf(THRESHOLD_CURVE_EXPONENT) * THRESHOLD_CURVE_SCALE;
    raw.round() as u64
}

/// One level gained during a reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub from: u32,
    pub to: u32,
}

/// Result of applying one reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardOutcome {
    pub xp_awarded: u64,
    pub from_level: u32,
    /// Equal to `from_level` when no level was gained.
    pub to_level: u32,
}

impl RewardOutcome {
    pub fn levels_gained(&self) -> u32 {
        self.to_level - self.from_level
    }

    /// One event per level crossed, in ascending order.
    pub fn level_ups(&self) -> impl Iterator<Item = LevelUp> {
        (self.from_level..self.to_level).map(|from| LevelUp { from, to: from + 1 })
    }
}

/// Adds `amount` XP and rolls any excess into level-ups.
pub fn apply_reward(state: &mut ProgressState, amount: u64) -> RewardOutcome {
    let from_level = state.level;
    state.xp = state.xp.saturating_add(amount);

    while state.level < u32::MAX {
        let threshold = xp_threshold(state.level);
        if state.xp < threshold {
            break;
        }
        state.xp -= threshold;
        state.level += 1;
    }

    RewardOutcome {
        xp_awarded: amount,
        from_level,
        to_level: state.level,
    }
}

/// Display-ready view of the current level progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub level: u32,
    pub xp: u64,
    pub threshold: u64,
    pub streak: u32,
    /// Progress bar fill, clamped to `2..=98` so the bar never looks empty or full.
    pub bar_percent: u8,
}

pub fn progress_snapshot(state: &ProgressState) -> ProgressSnapshot {
    let threshold = xp_threshold(state.level);
    let ratio = state.xp as f64 / threshold as f64;
    let percent = (ratio * 100.0).round();
    let bar_percent = percent.clamp(f64::from(BAR_MIN_PERCENT), f64::from(BAR_MAX_PERCENT)) as u8;

    ProgressSnapshot {
        level: state.level,
        xp: state.xp,
        threshold,
        streak: state.streak,
        bar_percent,
    }
}
