//! Domain model for tasks, progress and completion history.
//!
//! # Responsibility
//! - Define the records that make up the persisted aggregate.
//! - Keep calendar-day normalization in one place (`day_key`).
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Day keys carry no time-of-day component.

pub mod day_key;
pub mod history;
pub mod progress;
pub mod task;
