//! Task registry: the ordered collection of task records.
//!
//! # Responsibility
//! - Own task records and their `done_today` flags.
//! - Answer active/done/category queries for presentation layers.
//!
//! # Invariants
//! - Task ids are unique within the registry.
//! - Newest tasks come first.

use crate::model::task::{Task, TaskId, TaskValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised when rebuilding a registry from stored records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    Validation {
        task_id: TaskId,
        error: TaskValidationError,
    },
    DuplicateId(TaskId),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { task_id, error } => write!(f, "invalid task {task_id}: {error}"),
            Self::DuplicateId(task_id) => write!(f, "duplicate task id: {task_id}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation { error, .. } => Some(error),
            Self::DuplicateId(_) => None,
        }
    }
}

/// Active-task filter used by list views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Exact category match; `None` keeps every category.
    pub category: Option<String>,
    /// Case-insensitive title substring; blank keeps every title.
    pub query: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |category| task.category == category);
        let query_ok = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .map_or(true, |query| task.title_contains(query));
        category_ok && query_ok
    }
}

/// Ordered task collection, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry from stored records, keeping their order.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, RegistryError> {
        for (index, task) in tasks.iter().enumerate() {
            task.validate().map_err(|error| RegistryError::Validation {
                task_id: task.id,
                error,
            })?;
            if tasks[..index].iter().any(|earlier| earlier.id == task.id) {
                return Err(RegistryError::DuplicateId(task.id));
            }
        }
        Ok(Self { tasks })
    }

    pub(crate) fn push_front(&mut self, task: Task) {
        self.tasks.insert(0, task);
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    pub(crate) fn remove(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub(crate) fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks not yet completed.
    pub fn active(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(|task| !task.done_today)
    }

    /// Tasks whose `done_today` flag is set, regardless of day rollover.
    pub fn done(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(|task| task.done_today)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for task in &self.tasks {
            if !seen.contains(&task.category.as_str()) {
                seen.push(task.category.as_str());
            }
        }
        seen
    }
}
