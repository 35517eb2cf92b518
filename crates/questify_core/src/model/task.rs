//! Task domain model.
//!
//! # Responsibility
//! - Define the task record owned by the task registry.
//! - Normalize and validate user-provided title/category input.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` and `category` are trimmed and non-empty.
//! - `done_today` is the only field that changes after creation.
//!
//! # See also
//! - crate::registry

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Category assigned when the caller leaves it blank.
pub const DEFAULT_CATEGORY: &str = "General";

/// Task difficulty tier. Serialized as the integer `1`, `2` or `3`.
///
/// Any other integer decodes to `Easy`, the lowest reward tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Maps a raw difficulty value, falling back to `Easy` when unrecognized.
    pub fn from_raw(value: i64) -> Self {
        match value {
            3 => Self::Hard,
            2 => Self::Medium,
            _ => Self::Easy,
        }
    }

    pub fn as_raw(self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

impl From<i64> for Difficulty {
    fn from(value: i64) -> Self {
        Self::from_raw(value)
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.as_raw()
    }
}

/// Task validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
    /// Category is empty after trimming.
    EmptyCategory,
    /// Nil UUID is not a valid task identity.
    NilId,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::EmptyCategory => write!(f, "task category must not be empty"),
            Self::NilId => write!(f, "task id must not be nil"),
        }
    }
}

impl Error for TaskValidationError {}

/// Creation request for a new task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTask {
    /// Raw title; trimmed before storage.
    pub title: String,
    /// Defaults to `Difficulty::Medium` when `None`.
    pub difficulty: Option<Difficulty>,
    /// Defaults to `"General"` when `None` or blank.
    pub category: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Task record. Field names follow the export document shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub difficulty: Difficulty,
    pub category: String,
    pub done_today: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Task {
    /// Creates a task from a request with a generated id.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is blank after trimming.
    pub fn create(request: &NewTask, created_at: i64) -> Result<Self, TaskValidationError> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        let category = request
            .category
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        Ok(Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            difficulty: request.difficulty.unwrap_or_default(),
            category: category.to_string(),
            done_today: false,
            created_at,
        })
    }

    /// Checks stored-record invariants. Used by import and storage read paths.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.category.trim().is_empty() {
            return Err(TaskValidationError::EmptyCategory);
        }
        Ok(())
    }

    /// Case-insensitive title substring match.
    pub fn title_contains(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(&needle.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::{Difficulty, NewTask, Task, TaskValidationError, DEFAULT_CATEGORY};

    #[test]
    fn create_trims_and_applies_defaults() {
        let task = Task::create(&NewTask::new("  read a chapter  "), 42).unwrap();
        assert_eq!(task.title, "read a chapter");
        assert_eq!(task.difficulty, Difficulty::Medium);
        assert_eq!(task.category, DEFAULT_CATEGORY);
        assert!(!task.done_today);
        assert_eq!(task.created_at, 42);
        assert!(!task.id.is_nil());
    }

    #[test]
    fn blank_category_falls_back_to_general() {
        let request = NewTask::new("stretch").category("   ");
        let task = Task::create(&request, 0).unwrap();
        assert_eq!(task.category, "General");
    }

    #[test]
    fn create_rejects_blank_title() {
        let err = Task::create(&NewTask::new(" \t "), 0).unwrap_err();
        assert_eq!(err, TaskValidationError::EmptyTitle);
    }

    #[test]
    fn raw_difficulty_falls_back_to_easy() {
        assert_eq!(Difficulty::from_raw(3), Difficulty::Hard);
        assert_eq!(Difficulty::from_raw(2), Difficulty::Medium);
        assert_eq!(Difficulty::from_raw(1), Difficulty::Easy);
        assert_eq!(Difficulty::from_raw(0), Difficulty::Easy);
        assert_eq!(Difficulty::from_raw(99), Difficulty::Easy);
        assert_eq!(Difficulty::from_raw(-2), Difficulty::Easy);
    }

    #[test]
    fn ids_are_unique_per_task() {
        let a = Task::create(&NewTask::new("a"), 0).unwrap();
        let b = Task::create(&NewTask::new("a"), 0).unwrap();
        assert_ne!(a.id, b.id);
    }
}
