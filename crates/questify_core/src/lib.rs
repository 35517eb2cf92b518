//! Gamification core for the Questify task tracker.
//! This crate owns the XP, level, streak and history rules.

pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repo;
pub mod service;
pub mod snapshot;
pub mod state;

pub use config::CoreConfig;
pub use engine::progression::{
    apply_reward, progress_snapshot, xp_reward, xp_threshold, LevelUp, ProgressSnapshot,
    RewardOutcome,
};
pub use engine::streak::{record_streak, StreakChange};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::day_key::{Clock, DayKey, FixedClock, SystemClock};
pub use model::history::HistoryLedger;
pub use model::progress::ProgressState;
pub use model::task::{Difficulty, NewTask, Task, TaskId, TaskValidationError, DEFAULT_CATEGORY};
pub use registry::{RegistryError, TaskFilter, TaskRegistry};
pub use repo::state_repo::{RepoError, RepoResult, SqliteStateRepository, StateRepository};
pub use service::quest_service::{
    LevelUpListener, LoadOutcome, QuestService, ServiceError, ServiceResult, DEFAULT_TREND_DAYS,
};
pub use snapshot::{decode_document, encode_document, export_file_name, SnapshotError};
pub use state::{CompletionReport, QuestState, StateError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
