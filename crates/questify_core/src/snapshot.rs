//! JSON document codec for backup export and import.
//!
//! # Responsibility
//! - Encode the full aggregate as one JSON document.
//! - Decode documents strictly: reject, never partially adopt.
//!
//! # Invariants
//! - `decode_document(encode_document(state)) == state`.
//! - A document without `tasks` or `stats` is rejected.
//! - Decoded state satisfies every `QuestState::from_parts` check.
//!
//! Wire shape:
//! `{"tasks": [...], "stats": {"xp", "level", "streak", "lastDoneDate"},
//! "history": {"YYYY-MM-DD": count}}`

use crate::model::day_key::DayKey;
use crate::model::history::HistoryLedger;
use crate::model::progress::ProgressState;
use crate::model::task::Task;
use crate::state::{QuestState, StateError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const EXPORT_FILE_PREFIX: &str = "questify-backup-";

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Document encode/decode errors.
#[derive(Debug)]
pub enum SnapshotError {
    /// Not parseable JSON, or a section has the wrong shape.
    Json(serde_json::Error),
    /// A required top-level section is absent.
    MissingSection(&'static str),
    /// Sections parsed but violate state invariants.
    InvalidData(StateError),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed document: {err}"),
            Self::MissingSection(section) => {
                write!(f, "document is missing required section `{section}`")
            }
            Self::InvalidData(err) => write!(f, "invalid document data: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::MissingSection(_) => None,
            Self::InvalidData(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<StateError> for SnapshotError {
    fn from(value: StateError) -> Self {
        Self::InvalidData(value)
    }
}

#[derive(Serialize)]
struct DocumentOut<'a> {
    tasks: &'a [Task],
    stats: &'a ProgressState,
    history: &'a HistoryLedger,
}

#[derive(Deserialize)]
struct DocumentIn {
    tasks: Option<Vec<Task>>,
    stats: Option<ProgressState>,
    history: Option<BTreeMap<DayKey, u32>>,
}

/// Encodes the aggregate as pretty-printed JSON.
pub fn encode_document(state: &QuestState) -> SnapshotResult<String> {
    let document = DocumentOut {
        tasks: state.tasks().as_slice(),
        stats: state.progress(),
        history: state.history(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Decodes and validates a document produced by `encode_document`.
///
/// A missing `history` section is treated as empty.
///
/// # Errors
/// - `Json` for unparseable input or malformed records.
/// - `MissingSection` when `tasks` or `stats` is absent.
/// - `InvalidData` when records break state invariants.
pub fn decode_document(raw: &str) -> SnapshotResult<QuestState> {
    let document: DocumentIn = serde_json::from_str(raw)?;
    let tasks = document
        .tasks
        .ok_or(SnapshotError::MissingSection("tasks"))?;
    let stats = document
        .stats
        .ok_or(SnapshotError::MissingSection("stats"))?;
    let history = document.history.unwrap_or_default();

    Ok(QuestState::from_parts(tasks, stats, history)?)
}

/// Suggested backup file name for an export made on `today`.
pub fn export_file_name(today: DayKey) -> String {
    format!("{EXPORT_FILE_PREFIX}{today}.json")
}

#[cfg(test)]
mod tests {
    use super::{decode_document, export_file_name, SnapshotError};
    use crate::model::day_key::DayKey;

    #[test]
    fn export_file_name_embeds_day() {
        let day = DayKey::from_ymd(2026, 10, 19).unwrap();
        assert_eq!(export_file_name(day), "questify-backup-2026-10-19.json");
    }

    #[test]
    fn non_object_documents_are_rejected() {
        let err = decode_document("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, SnapshotError::Json(_)));
        let err = decode_document("not json").unwrap_err();
        assert!(matches!(err, SnapshotError::Json(_)));
    }
}
