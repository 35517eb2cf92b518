use questify_core::{
    xp_reward, DayKey, Difficulty, NewTask, ProgressState, QuestState, StreakChange, TaskFilter,
    TaskId, TaskValidationError,
};

const NOW_MS: i64 = 1_780_000_000_000;

fn day(d: u32) -> DayKey {
    DayKey::from_ymd(2026, 5, d).unwrap()
}

fn add(state: &mut QuestState, title: &str, difficulty: Difficulty) -> TaskId {
    state
        .create_task(&NewTask::new(title).difficulty(difficulty), NOW_MS)
        .unwrap()
}

#[test]
fn create_task_applies_defaults_and_inserts_newest_first() {
    let mut state = QuestState::new();
    let first = state.create_task(&NewTask::new("  first  "), NOW_MS).unwrap();
    let second = state
        .create_task(&NewTask::new("second").category(" Study "), NOW_MS)
        .unwrap();

    let ids: Vec<TaskId> = state.tasks().iter().map(|task| task.id).collect();
    assert_eq!(ids, vec![second, first]);

    let first_task = state.task(first).unwrap();
    assert_eq!(first_task.title, "first");
    assert_eq!(first_task.difficulty, Difficulty::Medium);
    assert_eq!(first_task.category, "General");
    assert_eq!(first_task.created_at, NOW_MS);
    assert!(!first_task.done_today);
    assert_eq!(state.task(second).unwrap().category, "Study");
}

#[test]
fn create_task_rejects_blank_title_without_mutation() {
    let mut state = QuestState::new();
    let err = state.create_task(&NewTask::new("   "), NOW_MS).unwrap_err();
    assert_eq!(err, TaskValidationError::EmptyTitle);
    assert!(state.tasks().is_empty());
}

#[test]
fn completing_twice_awards_only_once() {
    let mut state = QuestState::new();
    let id = add(&mut state, "write report", Difficulty::Hard);

    let report = state.complete_task(id, day(1)).unwrap();
    assert_eq!(report.reward.xp_awarded, xp_reward(Difficulty::Hard));
    assert_eq!(report.streak, 1);
    assert_eq!(report.day_count, 1);
    let after_first = state.progress().clone();

    assert!(state.complete_task(id, day(1)).is_none());
    assert!(state.complete_task(id, day(2)).is_none());
    assert_eq!(state.progress(), &after_first);
    assert_eq!(state.history().count_on(day(1)), 1);
    assert_eq!(state.history().count_on(day(2)), 0);
}

#[test]
fn unknown_ids_are_no_ops() {
    let mut state = QuestState::seeded(NOW_MS);
    let before = state.clone();
    let missing = TaskId::new_v4();

    assert!(state.complete_task(missing, day(1)).is_none());
    assert!(!state.undo_task(missing));
    assert!(state.delete_task(missing).is_none());
    assert_eq!(state, before);
}

#[test]
fn streak_follows_day_adjacency() {
    let mut state = QuestState::new();
    let ids: Vec<TaskId> = (0..4)
        .map(|index| add(&mut state, &format!("task {index}"), Difficulty::Easy))
        .collect();

    let report = state.complete_task(ids[0], day(1)).unwrap();
    assert_eq!(report.streak_change, StreakChange::Started);
    assert_eq!(state.progress().streak, 1);

    let report = state.complete_task(ids[1], day(1)).unwrap();
    assert_eq!(report.streak_change, StreakChange::Unchanged);
    assert_eq!(state.progress().streak, 1);

    let report = state.complete_task(ids[2], day(2)).unwrap();
    assert_eq!(report.streak_change, StreakChange::Extended);
    assert_eq!(state.progress().streak, 2);

    let report = state.complete_task(ids[3], day(4)).unwrap();
    assert_eq!(report.streak_change, StreakChange::Reset);
    assert_eq!(state.progress().streak, 1);
    assert_eq!(state.progress().last_done_date, Some(day(4)));
}

#[test]
fn history_counts_every_completion_and_ignores_undo() {
    let mut state = QuestState::new();
    let ids: Vec<TaskId> = (0..3)
        .map(|index| add(&mut state, &format!("chore {index}"), Difficulty::Medium))
        .collect();

    for id in &ids {
        state.complete_task(*id, day(9)).unwrap();
    }
    assert_eq!(state.history().count_on(day(9)), 3);

    assert!(state.undo_task(ids[1]));
    assert_eq!(state.history().count_on(day(9)), 3);
}

#[test]
fn undo_keeps_progress_and_allows_recompletion() {
    let mut state = QuestState::new();
    let id = add(&mut state, "stretch", Difficulty::Medium);
    state.complete_task(id, day(3)).unwrap();
    let progress_after_complete = state.progress().clone();

    assert!(state.undo_task(id));
    assert!(!state.undo_task(id));
    assert!(!state.task(id).unwrap().done_today);
    assert_eq!(state.progress(), &progress_after_complete);

    // Re-completing after undo is a fresh completion event.
    let report = state.complete_task(id, day(3)).unwrap();
    assert_eq!(report.day_count, 2);
    assert_eq!(state.progress().xp, 2 * xp_reward(Difficulty::Medium));
    assert_eq!(state.progress().streak, 1);
}

#[test]
fn delete_leaves_progress_and_history_intact() {
    let mut state = QuestState::new();
    let id = add(&mut state, "laundry", Difficulty::Hard);
    state.complete_task(id, day(5)).unwrap();
    let progress = state.progress().clone();
    let history = state.history().clone();

    let removed = state.delete_task(id).unwrap();
    assert_eq!(removed.id, id);
    assert!(state.task(id).is_none());
    assert_eq!(state.progress(), &progress);
    assert_eq!(state.history(), &history);
}

#[test]
fn completed_today_hides_stale_flags_after_rollover() {
    let mut state = QuestState::new();
    let done = add(&mut state, "done one", Difficulty::Easy);
    let open = add(&mut state, "open one", Difficulty::Easy);
    state.complete_task(done, day(10)).unwrap();

    let today: Vec<TaskId> = state.completed_today(day(10)).iter().map(|t| t.id).collect();
    assert_eq!(today, vec![done]);
    let active: Vec<TaskId> = state.active_tasks().iter().map(|t| t.id).collect();
    assert_eq!(active, vec![open]);

    assert!(state.completed_today(day(11)).is_empty());
    assert!(state.task(done).unwrap().done_today);
    assert_eq!(state.active_tasks().len(), 1);
}

#[test]
fn filtered_active_tasks_apply_category_and_query() {
    let mut state = QuestState::new();
    state
        .create_task(&NewTask::new("Read paper").category("Study"), NOW_MS)
        .unwrap();
    state
        .create_task(&NewTask::new("Read novel").category("Leisure"), NOW_MS)
        .unwrap();
    state
        .create_task(&NewTask::new("Write essay").category("Study"), NOW_MS)
        .unwrap();

    let filter = TaskFilter {
        category: Some("Study".to_string()),
        query: Some("read".to_string()),
    };
    let titles: Vec<&str> = state
        .filtered_active_tasks(&filter)
        .iter()
        .map(|task| task.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Read paper"]);
    assert_eq!(state.tasks().categories(), vec!["Study", "Leisure"]);
}

#[test]
fn reset_clears_everything() {
    let mut state = QuestState::seeded(NOW_MS);
    let id = state.tasks().as_slice()[0].id;
    state.complete_task(id, day(1)).unwrap();

    state.reset();

    assert!(state.tasks().is_empty());
    assert_eq!(state.progress(), &ProgressState::new());
    assert!(state.history().is_empty());
}
