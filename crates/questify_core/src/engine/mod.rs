//! Progression and streak rules.
//!
//! # Responsibility
//! - Convert difficulty into XP and roll XP over into levels.
//! - Apply streak continuation/reset policy per completion event.
//!
//! # Invariants
//! - Rules are pure functions over `ProgressState`; no I/O, no clock reads.

pub mod progression;
pub mod streak;
