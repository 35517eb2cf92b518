use questify_core::{
    apply_reward, xp_reward, xp_threshold, Difficulty, LevelUp, ProgressState,
};

#[test]
fn threshold_is_strictly_increasing() {
    for level in 1..2_000 {
        assert!(
            xp_threshold(level + 1) > xp_threshold(level),
            "threshold not increasing at level {level}"
        );
    }
}

#[test]
fn reward_table_matches_difficulty_tiers() {
    assert_eq!(xp_reward(Difficulty::Easy), 10);
    assert_eq!(xp_reward(Difficulty::Medium), 20);
    assert_eq!(xp_reward(Difficulty::Hard), 35);
    assert_eq!(xp_reward(Difficulty::from_raw(1)), 10);
    assert_eq!(xp_reward(Difficulty::from_raw(2)), 20);
    assert_eq!(xp_reward(Difficulty::from_raw(3)), 35);
}

#[test]
fn out_of_range_difficulty_rewards_like_easy() {
    for raw in [0, 4, 7, -1, i64::MAX] {
        assert_eq!(
            xp_reward(Difficulty::from_raw(raw)),
            xp_reward(Difficulty::from_raw(1))
        );
    }
}

#[test]
fn invariant_holds_after_rewards_of_any_size() {
    for amount in [0, 1, 114, 115, 116, 500, 10_000, 1_000_000] {
        let mut state = ProgressState::new();
        apply_reward(&mut state, amount);
        assert!(
            state.xp < xp_threshold(state.level),
            "invariant broken for amount {amount}: {state:?}"
        );
    }
}

#[test]
fn large_reward_rolls_over_multiple_levels_with_one_event_each() {
    let mut state = ProgressState::new();
    let amount = xp_threshold(1) + xp_threshold(2) + xp_threshold(3) + 7;

    let outcome = apply_reward(&mut state, amount);

    assert_eq!(state.level, 4);
    assert_eq!(state.xp, 7);
    assert_eq!(outcome.xp_awarded, amount);
    assert_eq!(
        outcome.level_ups().collect::<Vec<_>>(),
        vec![
            LevelUp { from: 1, to: 2 },
            LevelUp { from: 2, to: 3 },
            LevelUp { from: 3, to: 4 },
        ]
    );
}

#[test]
fn level_never_decreases_across_rewards() {
    let mut state = ProgressState::new();
    let mut previous_level = state.level;
    for step in 0..500u64 {
        apply_reward(&mut state, step % 40);
        assert!(state.level >= previous_level);
        assert!(state.xp < xp_threshold(state.level));
        previous_level = state.level;
    }
}

#[test]
fn accumulated_medium_rewards_level_up_on_sixth_completion() {
    let mut state = ProgressState::new();
    for _ in 0..5 {
        let outcome = apply_reward(&mut state, xp_reward(Difficulty::Medium));
        assert_eq!(outcome.levels_gained(), 0);
    }
    assert_eq!(state.xp, 100);

    let outcome = apply_reward(&mut state, xp_reward(Difficulty::Medium));
    assert_eq!(outcome.levels_gained(), 1);
    assert_eq!(state.level, 2);
    assert_eq!(state.xp, 5);
}

#[test]
fn huge_reward_reports_level_span_without_buffering_events() {
    let mut state = ProgressState::new();

    let outcome = apply_reward(&mut state, 1 << 50);

    assert_eq!(outcome.from_level, 1);
    assert_eq!(outcome.to_level, state.level);
    assert!(outcome.levels_gained() > 1_000_000);
    assert!(state.xp < xp_threshold(state.level));
    assert_eq!(outcome.level_ups().next(), Some(LevelUp { from: 1, to: 2 }));
    assert_eq!(
        outcome.level_ups().last(),
        Some(LevelUp {
            from: state.level - 1,
            to: state.level
        })
    );
}
