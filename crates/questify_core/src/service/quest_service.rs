//! Quest use-case service.
//!
//! # Responsibility
//! - Load or seed state on open, then persist after every mutation.
//! - Read the day from the injected `Clock` so completions are testable.
//! - Fan out level-up events to registered listeners.
//!
//! # Invariants
//! - Corrupt stored data is replaced by a seeded state, never adopted.
//! - Mutations run on a working copy that replaces the live state only
//!   after it is saved; a failed save or import leaves state untouched.
//! - Listeners fire once per level gained, after the state is saved.

use crate::engine::progression::{progress_snapshot, LevelUp, ProgressSnapshot};
use crate::model::day_key::{Clock, DayKey};
use crate::model::task::{NewTask, Task, TaskId, TaskValidationError};
use crate::registry::TaskFilter;
use crate::repo::state_repo::{RepoError, StateRepository};
use crate::snapshot::{decode_document, encode_document, SnapshotError};
use crate::state::{CompletionReport, QuestState};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Days shown by the default completion trend.
pub const DEFAULT_TREND_DAYS: u32 = 7;

/// Service error for quest use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Task input rejected at the boundary.
    Validation(TaskValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Import/export document failure.
    Snapshot(SnapshotError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Snapshot(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for ServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SnapshotError> for ServiceError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Receives one call per level gained.
pub trait LevelUpListener {
    fn on_level_up(&self, event: &LevelUp);
}

impl<F: Fn(&LevelUp)> LevelUpListener for F {
    fn on_level_up(&self, event: &LevelUp) {
        self(event)
    }
}

/// How `QuestService::open` obtained its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// Store was empty; starter tasks were seeded.
    Seeded,
    /// Stored data was corrupt and replaced by starter tasks.
    Recovered,
}

/// Quest service facade over a repository and a clock.
pub struct QuestService<R: StateRepository, C: Clock> {
    repo: R,
    clock: C,
    state: QuestState,
    load_outcome: LoadOutcome,
    listeners: Vec<Box<dyn LevelUpListener>>,
}

impl<R: StateRepository, C: Clock> QuestService<R, C> {
    /// Loads stored state, seeding a fresh one when empty or corrupt.
    ///
    /// # Errors
    /// - Storage transport failures are returned; corrupt data is not.
    pub fn open(repo: R, clock: C) -> ServiceResult<Self> {
        let (state, load_outcome) = match repo.load_state() {
            Ok(Some(state)) => (state, LoadOutcome::Loaded),
            Ok(None) => (QuestState::seeded(clock.now_epoch_ms()), LoadOutcome::Seeded),
            Err(err) if err.is_corrupt_data() => {
                warn!(
                    "event=state_load module=service status=recovered reason=corrupt_data error={err}"
                );
                (
                    QuestState::seeded(clock.now_epoch_ms()),
                    LoadOutcome::Recovered,
                )
            }
            Err(err) => return Err(err.into()),
        };

        if load_outcome != LoadOutcome::Loaded {
            repo.save_state(&state)?;
        }
        info!(
            "event=state_load module=service status=ok outcome={:?} tasks={} level={}",
            load_outcome,
            state.tasks().len(),
            state.progress().level
        );

        Ok(Self {
            repo,
            clock,
            state,
            load_outcome,
            listeners: Vec::new(),
        })
    }

    pub fn state(&self) -> &QuestState {
        &self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn load_outcome(&self) -> LoadOutcome {
        self.load_outcome
    }

    pub fn today(&self) -> DayKey {
        self.clock.today()
    }

    /// Registers a level-up listener (celebration, notification, ...).
    pub fn add_listener(&mut self, listener: impl LevelUpListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Creates a task and persists it.
    pub fn create_task(&mut self, request: &NewTask) -> ServiceResult<TaskId> {
        let mut next = self.state.clone();
        let id = next.create_task(request, self.clock.now_epoch_ms())?;
        self.commit(next, "quest_create")?;
        info!("event=quest_create module=service status=ok task_id={id}");
        Ok(id)
    }

    /// Completes a task on the clock's current day.
    ///
    /// Returns `Ok(None)` for unknown or already-done tasks; nothing is saved.
    /// When the save fails the task stays open, so a retry awards again.
    pub fn complete_task(&mut self, id: TaskId) -> ServiceResult<Option<CompletionReport>> {
        let today = self.clock.today();
        let mut next = self.state.clone();
        let Some(report) = next.complete_task(id, today) else {
            debug!("event=quest_complete module=service status=noop task_id={id}");
            return Ok(None);
        };
        self.commit(next, "quest_complete")?;

        info!(
            "event=quest_complete module=service status=ok task_id={id} day={} xp_awarded={} levels_gained={} streak={} streak_change={:?}",
            report.day,
            report.reward.xp_awarded,
            report.reward.levels_gained(),
            report.streak,
            report.streak_change
        );
        for level_up in report.reward.level_ups() {
            info!(
                "event=quest_level_up module=service status=ok from={} to={}",
                level_up.from, level_up.to
            );
            for listener in &self.listeners {
                listener.on_level_up(&level_up);
            }
        }
        Ok(Some(report))
    }

    /// Clears a task's done flag. Returns `Ok(false)` when nothing changed.
    pub fn undo_task(&mut self, id: TaskId) -> ServiceResult<bool> {
        let mut next = self.state.clone();
        if !next.undo_task(id) {
            debug!("event=quest_undo module=service status=noop task_id={id}");
            return Ok(false);
        }
        self.commit(next, "quest_undo")?;
        info!("event=quest_undo module=service status=ok task_id={id}");
        Ok(true)
    }

    /// Deletes a task. Returns the removed record, `None` when unknown.
    pub fn delete_task(&mut self, id: TaskId) -> ServiceResult<Option<Task>> {
        let mut next = self.state.clone();
        let Some(removed) = next.delete_task(id) else {
            debug!("event=quest_delete module=service status=noop task_id={id}");
            return Ok(None);
        };
        self.commit(next, "quest_delete")?;
        info!("event=quest_delete module=service status=ok task_id={id}");
        Ok(Some(removed))
    }

    /// Clears tasks, progress and history.
    pub fn reset(&mut self) -> ServiceResult<()> {
        let mut next = self.state.clone();
        next.reset();
        self.commit(next, "state_reset")?;
        info!("event=state_reset module=service status=ok");
        Ok(())
    }

    /// Encodes the current state as a backup document.
    pub fn export_document(&self) -> ServiceResult<String> {
        Ok(encode_document(&self.state)?)
    }

    /// Replaces the current state with a decoded backup document.
    ///
    /// # Errors
    /// - `Snapshot` when the document is malformed; current state is kept.
    /// - `Repo` when the imported state cannot be saved; current state is kept.
    pub fn import_document(&mut self, raw: &str) -> ServiceResult<()> {
        let imported = match decode_document(raw) {
            Ok(state) => state,
            Err(err) => {
                warn!("event=state_import module=service status=rejected error={err}");
                return Err(err.into());
            }
        };
        self.commit(imported, "state_import")?;
        info!(
            "event=state_import module=service status=ok tasks={}",
            self.state.tasks().len()
        );
        Ok(())
    }

    pub fn progress_snapshot(&self) -> ProgressSnapshot {
        progress_snapshot(self.state.progress())
    }

    pub fn active_tasks(&self, filter: &TaskFilter) -> Vec<&Task> {
        self.state.filtered_active_tasks(filter)
    }

    pub fn completed_today(&self) -> Vec<&Task> {
        self.state.completed_today(self.clock.today())
    }

    /// Completion counts for the trailing `days`, ending today.
    pub fn trend(&self, days: u32) -> Vec<(DayKey, u32)> {
        self.state.history().trailing_window(self.clock.today(), days)
    }

    /// Saves `next`, then makes it the live state.
    fn commit(&mut self, next: QuestState, event: &'static str) -> ServiceResult<()> {
        if let Err(err) = self.repo.save_state(&next) {
            warn!("event=state_save module=service status=error trigger={event} error={err}");
            return Err(err.into());
        }
        self.state = next;
        debug!("event=state_save module=service status=ok trigger={event}");
        Ok(())
    }
}
