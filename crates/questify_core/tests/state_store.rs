use questify_core::db::{open_db, open_db_in_memory};
use questify_core::{
    DayKey, Difficulty, NewTask, QuestState, RepoError, SqliteStateRepository, StateRepository,
};

fn populated_state() -> QuestState {
    let mut state = QuestState::seeded(1_700_000_000_000);
    let id = state
        .create_task(&NewTask::new("Plan week").difficulty(Difficulty::Hard), 1_700_000_500_000)
        .unwrap();
    let seed = state.tasks().as_slice()[3].id;
    let day = DayKey::from_ymd(2026, 2, 14).unwrap();
    state.complete_task(id, day).unwrap();
    state.complete_task(seed, day).unwrap();
    state
}

#[test]
fn empty_store_loads_as_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStateRepository::try_new(&conn).unwrap();
    assert!(repo.load_state().unwrap().is_none());
}

#[test]
fn save_and_load_roundtrip_preserves_state_and_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStateRepository::try_new(&conn).unwrap();
    let state = populated_state();

    repo.save_state(&state).unwrap();
    let loaded = repo.load_state().unwrap().unwrap();
    assert_eq!(loaded, state);
}

#[test]
fn save_replaces_previous_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStateRepository::try_new(&conn).unwrap();
    let mut state = populated_state();
    repo.save_state(&state).unwrap();

    let removed = state.tasks().as_slice()[0].id;
    state.delete_task(removed).unwrap();
    repo.save_state(&state).unwrap();
    let loaded = repo.load_state().unwrap().unwrap();
    assert_eq!(loaded, state);
    assert!(loaded.task(removed).is_none());

    state.reset();
    repo.save_state(&state).unwrap();
    assert_eq!(repo.load_state().unwrap().unwrap(), QuestState::new());
}

#[test]
fn state_survives_reopening_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questify.sqlite3");
    let state = populated_state();

    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteStateRepository::try_new(&conn).unwrap();
        repo.save_state(&state).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteStateRepository::try_new(&conn).unwrap();
    assert_eq!(repo.load_state().unwrap().unwrap(), state);
}

#[test]
fn corrupt_rows_are_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStateRepository::try_new(&conn).unwrap();
    repo.save_state(&populated_state()).unwrap();

    conn.execute("UPDATE progress SET last_done_date = 'soon' WHERE id = 1;", [])
        .unwrap();
    let err = repo.load_state().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert!(err.is_corrupt_data());

    conn.execute("UPDATE progress SET last_done_date = NULL, level = 0 WHERE id = 1;", [])
        .unwrap();
    let err = repo.load_state().unwrap_err();
    assert!(matches!(err, RepoError::InvalidState(_)));
    assert!(err.is_corrupt_data());
}

#[test]
fn mistyped_columns_are_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStateRepository::try_new(&conn).unwrap();
    repo.save_state(&populated_state()).unwrap();

    // INTEGER affinity keeps non-numeric text as text.
    conn.execute("UPDATE tasks SET difficulty = 'hard';", [])
        .unwrap();
    let err = repo.load_state().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)), "{err}");
    assert!(err.is_corrupt_data());

    repo.save_state(&populated_state()).unwrap();
    conn.execute("UPDATE progress SET xp = 'lots' WHERE id = 1;", [])
        .unwrap();
    let err = repo.load_state().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)), "{err}");

    repo.save_state(&populated_state()).unwrap();
    conn.execute("UPDATE history SET completions = 2.5;", [])
        .unwrap();
    assert!(repo.load_state().unwrap_err().is_corrupt_data());
}
