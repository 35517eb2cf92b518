//! State repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Load and save the full `QuestState` aggregate.
//! - Map SQLite rows to validated domain records.
//!
//! # Invariants
//! - `save_state` runs in one transaction; readers never see half a save.
//! - Task order is preserved through the `position` column.
//! - An empty store (no progress row) loads as `None`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::day_key::DayKey;
use crate::model::progress::ProgressState;
use crate::model::task::{Difficulty, Task};
use crate::state::{QuestState, StateError};
use rusqlite::types::FromSql;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for state persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A stored row could not be mapped to a domain value.
    InvalidData(String),
    /// Rows mapped but the assembled state breaks invariants.
    InvalidState(StateError),
    /// Connection was not migrated to the schema this build expects.
    SchemaMismatch { found: u32, expected: u32 },
}

impl RepoError {
    /// True when the stored data itself is corrupt, as opposed to a
    /// transport or schema failure.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(self, Self::InvalidData(_) | Self::InvalidState(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored state data: {message}"),
            Self::InvalidState(err) => write!(f, "invalid stored state: {err}"),
            Self::SchemaMismatch { found, expected } => write!(
                f,
                "state store schema version {found} does not match expected {expected}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidState(err) => Some(err),
            Self::InvalidData(_) | Self::SchemaMismatch { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<StateError> for RepoError {
    fn from(value: StateError) -> Self {
        Self::InvalidState(value)
    }
}

/// Load/save contract for the quest state aggregate.
pub trait StateRepository {
    /// Returns `None` when nothing has been saved yet.
    fn load_state(&self) -> RepoResult<Option<QuestState>>;
    /// Replaces the stored aggregate with `state`.
    fn save_state(&self, state: &QuestState) -> RepoResult<()>;
}

/// SQLite-backed state repository.
pub struct SqliteStateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStateRepository<'conn> {
    /// Wraps a connection opened via `db::open_db*`.
    ///
    /// # Errors
    /// - `SchemaMismatch` when the connection was not migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        let expected = latest_version();
        if found != expected {
            return Err(RepoError::SchemaMismatch { found, expected });
        }
        Ok(Self { conn })
    }
}

impl StateRepository for SqliteStateRepository<'_> {
    fn load_state(&self) -> RepoResult<Option<QuestState>> {
        let progress = self
            .conn
            .query_row(
                "SELECT xp, level, streak, last_done_date FROM progress WHERE id = 1;",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>("xp")?,
                        row.get::<_, i64>("level")?,
                        row.get::<_, i64>("streak")?,
                        row.get::<_, Option<String>>("last_done_date")?,
                    ))
                },
            )
            .optional()
            .map_err(read_error)?;
        let Some((xp, level, streak, last_done_date)) = progress else {
            return Ok(None);
        };
        let progress = ProgressState {
            xp: to_unsigned("progress.xp", xp)?,
            level: to_unsigned("progress.level", level)?,
            streak: to_unsigned("progress.streak", streak)?,
            last_done_date: last_done_date
                .as_deref()
                .map(|value| parse_day("progress.last_done_date", value))
                .transpose()?,
        };

        let mut stmt = self.conn.prepare(
            "SELECT id, title, difficulty, category, done_today, created_at
             FROM tasks
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT day, completions FROM history ORDER BY day ASC;")?;
        let mut rows = stmt.query([])?;
        let mut history = Vec::new();
        while let Some(row) = rows.next()? {
            let day: String = column(row, "day")?;
            let completions: i64 = column(row, "completions")?;
            history.push((
                parse_day("history.day", &day)?,
                to_unsigned("history.completions", completions)?,
            ));
        }

        Ok(Some(QuestState::from_parts(tasks, progress, history)?))
    }

    fn save_state(&self, state: &QuestState) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM tasks;", [])?;
        for (position, task) in state.tasks().iter().enumerate() {
            tx.execute(
                "INSERT INTO tasks (id, position, title, difficulty, category, done_today, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    task.id.to_string(),
                    to_signed("tasks.position", position as u64)?,
                    task.title.as_str(),
                    task.difficulty.as_raw(),
                    task.category.as_str(),
                    task.done_today,
                    task.created_at,
                ],
            )?;
        }

        let progress = state.progress();
        tx.execute(
            "INSERT INTO progress (id, xp, level, streak, last_done_date)
             VALUES (1, ?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                xp = excluded.xp,
                level = excluded.level,
                streak = excluded.streak,
                last_done_date = excluded.last_done_date;",
            params![
                to_signed("progress.xp", progress.xp)?,
                progress.level,
                progress.streak,
                progress.last_done_date.map(|day| day.to_string()),
            ],
        )?;

        tx.execute("DELETE FROM history;", [])?;
        for (day, completions) in state.history().iter() {
            tx.execute(
                "INSERT INTO history (day, completions) VALUES (?1, ?2);",
                params![day.to_string(), completions],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = column(row, "id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{id_text}` in tasks.id")))?;

    let done_today = match column::<i64>(row, "done_today")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid done_today value `{other}` in tasks.done_today"
            )));
        }
    };

    Ok(Task {
        id,
        title: column(row, "title")?,
        difficulty: Difficulty::from_raw(column(row, "difficulty")?),
        category: column(row, "category")?,
        done_today,
        created_at: column(row, "created_at")?,
    })
}

fn column<T: FromSql>(row: &Row<'_>, name: &str) -> RepoResult<T> {
    row.get(name).map_err(read_error)
}

/// Values of the wrong storage class are corrupt data, not transport failures.
fn read_error(err: rusqlite::Error) -> RepoError {
    match err {
        rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => RepoError::InvalidData(err.to_string()),
        other => other.into(),
    }
}

fn parse_day(column: &str, value: &str) -> RepoResult<DayKey> {
    value
        .parse()
        .map_err(|_| RepoError::InvalidData(format!("invalid day `{value}` in {column}")))
}

fn to_unsigned<T: TryFrom<i64>>(column: &str, value: i64) -> RepoResult<T> {
    T::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("out-of-range value `{value}` in {column}")))
}

fn to_signed(column: &str, value: u64) -> RepoResult<i64> {
    i64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("value `{value}` too large for {column}")))
}
