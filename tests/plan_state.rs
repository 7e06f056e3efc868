use std::collections::HashMap;

use h2h_terminal::models::{
    ChipType, Opponent, PlanEvent, Player, Position, Role, UserConfig, MAX_PLANS,
};
use h2h_terminal::seed;
use h2h_terminal::state::{apply_delta, new_plan_id, plan_window, AppState, Delta, Screen};

fn demo_state() -> AppState {
    let mut state = AppState::default();
    let plan = seed::demo_plan("p1", 24, 30);
    assert!(state.add_plan(plan));
    state
}

#[test]
fn fresh_state_without_plans_starts_on_setup() {
    let state = AppState::default();
    assert_eq!(state.screen, Screen::Setup);
    assert!(state.active_plan().is_none());
}

#[test]
fn restored_user_with_plans_starts_on_planner() {
    let mut user = UserConfig {
        setup_complete: true,
        ..UserConfig::default()
    };
    user.plans.push(seed::demo_plan("p1", 24, 30));
    user.active_plan_id = Some("p1".to_string());
    let state = AppState::new(user);
    assert_eq!(state.screen, Screen::Planner);
    assert_eq!(state.selected_week(), Some(24));
}

#[test]
fn plan_ids_are_unique_enough_for_the_plan_cap() {
    let mut ids: Vec<String> = (0..MAX_PLANS).map(|_| new_plan_id()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), MAX_PLANS);
}

#[test]
fn planner_edit_cycle_survives_a_serde_round_trip() {
    let mut state = demo_state();
    state.add_plan_event(PlanEvent::TransferOut {
        week: 26,
        player_id: "p15".to_string(),
    });
    state.add_plan_event(PlanEvent::TransferIn {
        week: 26,
        player: Player {
            id: "n1".to_string(),
            name: "Wood".to_string(),
            team: "NFO".to_string(),
            position: Position::FWD,
        },
    });
    state.cycle_chip(28);
    state.set_captain(26, Some("p8".to_string()));
    state.toggle_manual_doubling(27, "mci");
    state.toggle_player_role(24, "p13");

    let json = serde_json::to_string(&state.user).expect("serialize user");
    let restored: UserConfig = serde_json::from_str(&json).expect("deserialize user");
    assert_eq!(restored, state.user);

    let plan = restored.active_plan().expect("active plan");
    assert_eq!(plan.events.len(), 3);
    assert_eq!(plan.captains.get(&26).map(String::as_str), Some("p8"));
    assert_eq!(
        plan.manual_doubling.get(&27),
        Some(&vec!["MCI".to_string()])
    );
    assert!(
        plan.squad
            .slots_for_week(24)
            .iter()
            .any(|s| s.player_id == "p13" && s.role == Role::Xi)
    );
}

#[test]
fn chip_cycle_lands_back_on_none_and_updates_projection() {
    let mut state = demo_state();
    state.cycle_chip(25);
    state.cycle_chip(25);
    state.cycle_chip(25);
    assert_eq!(state.chips_for_week(25), vec![ChipType::BenchBoost]);
    let summary = state.summary_for_week(25).expect("summary");
    assert_eq!(summary.total_players, 15);

    state.cycle_chip(25);
    state.cycle_chip(25);
    assert!(state.chips_for_week(25).is_empty());
    let summary = state.summary_for_week(25).expect("summary");
    assert_eq!(summary.total_players, 11);
}

#[test]
fn opponents_delta_targets_only_the_named_plan() {
    let mut state = demo_state();
    let second = seed::demo_plan("p2", 24, 30);
    assert!(state.add_plan(second));

    let mut opponents = HashMap::new();
    opponents.insert(
        24,
        Opponent {
            entry_id: 42,
            team_name: "Other Lot".to_string(),
            manager_name: "Riley Chen".to_string(),
        },
    );
    apply_delta(
        &mut state,
        Delta::Opponents {
            plan_id: "p1".to_string(),
            opponents,
        },
    );

    let p1 = state.user.plans.iter().find(|p| p.id == "p1").expect("p1");
    let p2 = state.user.plans.iter().find(|p| p.id == "p2").expect("p2");
    assert_eq!(p1.opponents.len(), 1);
    assert_eq!(p1.opponents.get(&24).map(|o| o.entry_id), Some(42));
    // The untouched plan keeps its seeded opponents.
    assert_eq!(p2.opponents.len(), 7);
}

#[test]
fn base_squad_delta_from_an_older_week_warns() {
    let mut state = demo_state();
    apply_delta(
        &mut state,
        Delta::BaseSquad {
            plan_id: "p1".to_string(),
            squad: seed::sample_base_squad(24..=30),
            source_week: 22,
        },
    );
    assert!(
        state
            .logs
            .back()
            .is_some_and(|l| l.starts_with("[WARN]") && l.contains("week 22"))
    );
}

#[test]
fn plan_window_clamps_to_season_end() {
    assert_eq!(plan_window(24), (24, 30));
    assert_eq!(plan_window(35), (35, 38));
    assert_eq!(plan_window(38), (38, 38));
}
