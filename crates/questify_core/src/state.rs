//! Quest state aggregate and completion event sequence.
//!
//! # Responsibility
//! - Own tasks, progress and history as one explicit aggregate.
//! - Run the completion sequence (reward, streak, history) atomically.
//!
//! # Invariants
//! - Every mutation goes through `&mut QuestState`; no module-level globals.
//! - Complete/undo/delete on unknown ids are no-ops, not errors.
//! - Undo and delete never touch progress or history.
//!
//! # See also
//! - crate::engine::progression
//! - crate::engine::streak

use crate::engine::progression::{apply_reward, xp_reward, xp_threshold, RewardOutcome};
use crate::engine::streak::{record_streak, StreakChange};
use crate::model::day_key::DayKey;
use crate::model::history::HistoryLedger;
use crate::model::progress::ProgressState;
use crate::model::task::{Difficulty, NewTask, Task, TaskId, TaskValidationError};
use crate::registry::{RegistryError, TaskFilter, TaskRegistry};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised when assembling a state from stored parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    Registry(RegistryError),
    InvalidLevel(u32),
    XpAboveThreshold { xp: u64, level: u32, threshold: u64 },
    ZeroHistoryCount(DayKey),
}

impl Display for StateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registry(err) => write!(f, "{err}"),
            Self::InvalidLevel(level) => write!(f, "level must be >= 1, got {level}"),
            Self::XpAboveThreshold {
                xp,
                level,
                threshold,
            } => write!(
                f,
                "xp {xp} must be below level {level} threshold {threshold}"
            ),
            Self::ZeroHistoryCount(day) => write!(f, "history count for {day} must be > 0"),
        }
    }
}

impl Error for StateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Registry(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RegistryError> for StateError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

/// Everything that happened during one completion event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub task_id: TaskId,
    pub day: DayKey,
    pub reward: RewardOutcome,
    pub streak_change: StreakChange,
    /// Streak value after the event.
    pub streak: u32,
    /// History count for `day` after the event.
    pub day_count: u32,
}

/// Tasks, progress and history for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestState {
    tasks: TaskRegistry,
    progress: ProgressState,
    history: HistoryLedger,
}

const SEED_TASKS: &[(&str, Difficulty, &str)] = &[
    ("Finish CS homework", Difficulty::Medium, "Study"),
    ("30-min workout", Difficulty::Medium, "Health"),
    ("Clean desk", Difficulty::Easy, "Chores"),
];

impl QuestState {
    /// Empty state: no tasks, level 1, no streak, no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state with the starter tasks, listed in seed order.
    pub fn seeded(now_epoch_ms: i64) -> Self {
        let mut state = Self::new();
        for (title, difficulty, category) in SEED_TASKS.iter().rev() {
            let request = NewTask::new(*title)
                .difficulty(*difficulty)
                .category(*category);
            // Seed titles are non-empty constants.
            if let Ok(task) = Task::create(&request, now_epoch_ms) {
                state.tasks.push_front(task);
            }
        }
        state
    }

    /// Assembles a state from stored parts, rejecting malformed data.
    pub fn from_parts(
        tasks: Vec<Task>,
        progress: ProgressState,
        history: impl IntoIterator<Item = (DayKey, u32)>,
    ) -> Result<Self, StateError> {
        let tasks = TaskRegistry::from_tasks(tasks)?;
        if progress.level == 0 {
            return Err(StateError::InvalidLevel(progress.level));
        }
        let threshold = xp_threshold(progress.level);
        if progress.xp >= threshold {
            return Err(StateError::XpAboveThreshold {
                xp: progress.xp,
                level: progress.level,
                threshold,
            });
        }
        let history = HistoryLedger::from_entries(history).map_err(StateError::ZeroHistoryCount)?;

        Ok(Self {
            tasks,
            progress,
            history,
        })
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Creates a task at the front of the registry.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is blank after trimming.
    pub fn create_task(
        &mut self,
        request: &NewTask,
        now_epoch_ms: i64,
    ) -> Result<TaskId, TaskValidationError> {
        let task = Task::create(request, now_epoch_ms)?;
        let id = task.id;
        self.tasks.push_front(task);
        Ok(id)
    }

    /// Marks a task done and runs reward, streak and history once.
    ///
    /// Returns `None` when the task is unknown or already done.
    pub fn complete_task(&mut self, id: TaskId, today: DayKey) -> Option<CompletionReport> {
        let task = self.tasks.get_mut(id)?;
        if task.done_today {
            return None;
        }
        task.done_today = true;
        let amount = xp_reward(task.difficulty);

        let reward = apply_reward(&mut self.progress, amount);
        let streak_change = record_streak(&mut self.progress, today);
        let day_count = self.history.record_completion(today);

        Some(CompletionReport {
            task_id: id,
            day: today,
            reward,
            streak_change,
            streak: self.progress.streak,
            day_count,
        })
    }

    /// Clears a task's done flag. XP, level, streak and history stay as-is.
    ///
    /// Returns `false` when the task is unknown or not done.
    pub fn undo_task(&mut self, id: TaskId) -> bool {
        match self.tasks.get_mut(id) {
            Some(task) if task.done_today => {
                task.done_today = false;
                true
            }
            _ => false,
        }
    }

    /// Removes a task. Progress and history are untouched.
    pub fn delete_task(&mut self, id: TaskId) -> Option<Task> {
        self.tasks.remove(id)
    }

    /// Clears tasks, progress and history.
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.progress = ProgressState::new();
        self.history = HistoryLedger::new();
    }

    pub fn active_tasks(&self) -> Vec<&Task> {
        self.tasks.active().collect()
    }

    pub fn filtered_active_tasks(&self, filter: &TaskFilter) -> Vec<&Task> {
        self.tasks.active().filter(|task| filter.matches(task)).collect()
    }

    /// Done tasks, shown only while the last completion day is `today`.
    ///
    /// Stale `done_today` flags from earlier days drop out of this view once
    /// the day rolls over, even though the flag itself stays set.
    pub fn completed_today(&self, today: DayKey) -> Vec<&Task> {
        if self.progress.last_done_date != Some(today) {
            return Vec::new();
        }
        self.tasks.done().collect()
    }
}
