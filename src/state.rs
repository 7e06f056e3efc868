use std::collections::{HashMap, VecDeque};

use crate::models::{
    ChipType, H2hLeague, MAX_GW_SPAN, MAX_PLANS, Opponent, OpponentPlayer, OpponentSquad, Plan,
    PlanEvent, Player, PlayerSlot, Role, Squad, UserConfig,
};
use crate::projection::{self, SquadSummary};

const LOG_CAPACITY: usize = 200;
const LAST_SEASON_WEEK: u32 = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Planner,
    H2h,
}

pub struct AppState {
    pub screen: Screen,
    pub help_overlay: bool,
    pub user: UserConfig,
    /// Index into the active plan's week range.
    pub week_cursor: usize,
    /// Index into the selected week's slot rows.
    pub row_cursor: usize,
    pub setup_input: String,
    pub setup_loading: bool,
    pub search_input: String,
    pub search_active: bool,
    pub squad_loading: bool,
    pub opponents_loading: bool,
    /// Full player registry from the bootstrap payload, for transfer-in
    /// search.
    pub player_pool: Vec<Player>,
    pub current_week: Option<u32>,
    /// Detected doubling/blanking team lists per week, from fixture-count
    /// analysis.
    pub detected_doubling: HashMap<u32, Vec<String>>,
    pub detected_blanking: HashMap<u32, Vec<String>>,
    pub logs: VecDeque<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(UserConfig::default())
    }
}

impl AppState {
    pub fn new(user: UserConfig) -> Self {
        let screen = if user.setup_complete && user.active_plan().is_some() {
            Screen::Planner
        } else {
            Screen::Setup
        };
        Self {
            screen,
            help_overlay: false,
            user,
            week_cursor: 0,
            row_cursor: 0,
            setup_input: String::new(),
            setup_loading: false,
            search_input: String::new(),
            search_active: false,
            squad_loading: false,
            opponents_loading: false,
            player_pool: Vec::new(),
            current_week: None,
            detected_doubling: HashMap::new(),
            detected_blanking: HashMap::new(),
            logs: VecDeque::with_capacity(LOG_CAPACITY),
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.logs.len() >= LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(line.into());
    }

    pub fn active_plan(&self) -> Option<&Plan> {
        self.user.active_plan()
    }

    pub fn active_plan_mut(&mut self) -> Option<&mut Plan> {
        self.user.active_plan_mut()
    }

    /// The week under the planner cursor, clamped to the plan range.
    pub fn selected_week(&self) -> Option<u32> {
        let plan = self.active_plan()?;
        let span = (plan.end_week - plan.start_week) as usize;
        Some(plan.start_week + self.week_cursor.min(span) as u32)
    }

    pub fn select_next_week(&mut self) {
        if let Some(plan) = self.active_plan() {
            let span = (plan.end_week - plan.start_week) as usize;
            if self.week_cursor < span {
                self.week_cursor += 1;
                self.row_cursor = 0;
            }
        }
    }

    pub fn select_prev_week(&mut self) {
        if self.week_cursor > 0 {
            self.week_cursor -= 1;
            self.row_cursor = 0;
        }
    }

    pub fn select_next_row(&mut self) {
        let rows = self.selected_week_rows();
        if rows > 0 && self.row_cursor < rows - 1 {
            self.row_cursor += 1;
        }
    }

    pub fn select_prev_row(&mut self) {
        self.row_cursor = self.row_cursor.saturating_sub(1);
    }

    fn selected_week_rows(&self) -> usize {
        let Some(week) = self.selected_week() else {
            return 0;
        };
        self.squad_for_week(week)
            .map(|squad| squad.slots_for_week(week).len())
            .unwrap_or(0)
    }

    /// The player id under the planner row cursor, in XI-then-bench order.
    pub fn selected_player_id(&self) -> Option<String> {
        let week = self.selected_week()?;
        let squad = self.squad_for_week(week)?;
        let rows = ordered_slots(&squad, week);
        rows.get(self.row_cursor).map(|slot| slot.player_id.clone())
    }

    // Derived views

    pub fn squad_for_week(&self, week: u32) -> Option<Squad> {
        let plan = self.active_plan()?;
        Some(projection::project_squad(&plan.squad, &plan.events, week))
    }

    pub fn summary_for_week(&self, week: u32) -> Option<SquadSummary> {
        let plan = self.active_plan()?;
        let squad = projection::project_squad(&plan.squad, &plan.events, week);
        let include_bench = projection::is_bench_boost_active(&plan.events, week);
        Some(projection::squad_summary_for_week(
            &squad,
            week,
            include_bench,
            Some(plan),
            self.detected_doubling_for(week),
        ))
    }

    pub fn chips_for_week(&self, week: u32) -> Vec<ChipType> {
        self.active_plan()
            .map(|plan| projection::chips_for_week(&plan.events, week))
            .unwrap_or_default()
    }

    pub fn captain_for_week(&self, week: u32) -> Option<String> {
        self.active_plan()?.captains.get(&week).cloned()
    }

    pub fn detected_doubling_for(&self, week: u32) -> Option<&[String]> {
        self.detected_doubling.get(&week).map(Vec::as_slice)
    }

    pub fn detected_blanking_for(&self, week: u32) -> Option<&[String]> {
        self.detected_blanking.get(&week).map(Vec::as_slice)
    }

    // Plan management

    /// Add a plan and make it active. Refused once MAX_PLANS is reached.
    pub fn add_plan(&mut self, plan: Plan) -> bool {
        if self.user.plans.len() >= MAX_PLANS {
            return false;
        }
        self.user.active_plan_id = Some(plan.id.clone());
        self.user.plans.push(plan);
        self.week_cursor = 0;
        self.row_cursor = 0;
        true
    }

    /// Delete a plan; when the active one goes, the first survivor (if any)
    /// takes over.
    pub fn delete_plan(&mut self, plan_id: &str) {
        self.user.plans.retain(|p| p.id != plan_id);
        if self.user.active_plan_id.as_deref() == Some(plan_id) {
            self.user.active_plan_id = self.user.plans.first().map(|p| p.id.clone());
            self.week_cursor = 0;
            self.row_cursor = 0;
        }
    }

    /// Wipe the stored identity and every plan, back to a fresh setup.
    pub fn reset_user(&mut self) {
        self.user = UserConfig::default();
        self.screen = Screen::Setup;
        self.setup_input.clear();
        self.week_cursor = 0;
        self.row_cursor = 0;
    }

    pub fn set_active_plan(&mut self, plan_id: &str) {
        if self.user.plans.iter().any(|p| p.id == plan_id) {
            self.user.active_plan_id = Some(plan_id.to_string());
            self.week_cursor = 0;
            self.row_cursor = 0;
        }
    }

    pub fn cycle_active_plan(&mut self) {
        if self.user.plans.is_empty() {
            return;
        }
        let idx = self
            .user
            .active_plan_id
            .as_deref()
            .and_then(|id| self.user.plans.iter().position(|p| p.id == id))
            .map(|i| (i + 1) % self.user.plans.len())
            .unwrap_or(0);
        self.user.active_plan_id = Some(self.user.plans[idx].id.clone());
        self.week_cursor = 0;
        self.row_cursor = 0;
    }

    // Active plan edits. Each bumps the plan's updated stamp.

    pub fn set_base_squad(&mut self, squad: Squad) {
        if let Some(plan) = self.active_plan_mut() {
            plan.squad = squad;
            plan.touch();
        }
    }

    pub fn add_plan_event(&mut self, event: PlanEvent) {
        if let Some(plan) = self.active_plan_mut() {
            plan.events.push(event);
            plan.touch();
        }
    }

    pub fn remove_plan_events(&mut self, week: u32, matches: impl Fn(&PlanEvent) -> bool) {
        if let Some(plan) = self.active_plan_mut() {
            plan.events.retain(|ev| ev.week() != week || !matches(ev));
            plan.touch();
        }
    }

    pub fn reset_plan_events(&mut self) {
        if let Some(plan) = self.active_plan_mut() {
            plan.events.clear();
            plan.captains.clear();
            plan.touch();
        }
    }

    pub fn set_captain(&mut self, week: u32, player_id: Option<String>) {
        if let Some(plan) = self.active_plan_mut() {
            match player_id {
                Some(id) => {
                    plan.captains.insert(week, id);
                }
                None => {
                    plan.captains.remove(&week);
                }
            }
            plan.touch();
        }
    }

    /// Chip cycling for the planner key: none -> WC -> FH -> BB -> TC -> none,
    /// keeping at most one chip event per week.
    pub fn cycle_chip(&mut self, week: u32) {
        let current = self.chips_for_week(week).into_iter().next();
        let next = match current {
            None => Some(ChipType::Wildcard),
            Some(chip) => {
                let idx = ChipType::ALL.iter().position(|c| *c == chip).unwrap_or(0);
                ChipType::ALL.get(idx + 1).copied()
            }
        };
        if let Some(plan) = self.active_plan_mut() {
            plan.events
                .retain(|ev| !matches!(ev, PlanEvent::Chip { week: w, .. } if *w == week));
            if let Some(chip) = next {
                plan.events.push(PlanEvent::Chip { week, chip });
            }
            plan.touch();
        }
    }

    pub fn set_opponents(&mut self, opponents: HashMap<u32, Opponent>) {
        if let Some(plan) = self.active_plan_mut() {
            plan.opponents = opponents;
            plan.touch();
        }
    }

    pub fn set_opponent_squad(&mut self, week: u32, squad: OpponentSquad) {
        if let Some(plan) = self.active_plan_mut() {
            plan.opponent_squads.insert(week, squad);
            plan.touch();
        }
    }

    pub fn add_opponent_player(&mut self, week: u32, player: OpponentPlayer) {
        if let Some(plan) = self.active_plan_mut() {
            let entry = plan
                .opponent_squads
                .entry(week)
                .or_insert_with(|| OpponentSquad {
                    players: Vec::new(),
                    source_week: week,
                });
            entry.players.push(player);
            plan.touch();
        }
    }

    pub fn remove_opponent_player(&mut self, week: u32, player_id: &str) {
        if let Some(plan) = self.active_plan_mut() {
            if let Some(squad) = plan.opponent_squads.get_mut(&week) {
                squad.players.retain(|p| p.player.id != player_id);
            }
            plan.touch();
        }
    }

    pub fn move_player_role(&mut self, week: u32, player_id: &str, role: Role) {
        if let Some(plan) = self.active_plan_mut() {
            if let Some(slots) = plan.squad.slots.get_mut(&week) {
                for slot in slots.iter_mut() {
                    if slot.player_id == player_id {
                        slot.role = role;
                    }
                }
            }
            plan.touch();
        }
    }

    pub fn toggle_player_role(&mut self, week: u32, player_id: &str) {
        let Some(plan) = self.active_plan() else {
            return;
        };
        let current = plan
            .squad
            .slots_for_week(week)
            .iter()
            .find(|s| s.player_id == player_id)
            .map(|s| s.role);
        if let Some(role) = current {
            let flipped = match role {
                Role::Xi => Role::Bench,
                Role::Bench => Role::Xi,
            };
            self.move_player_role(week, player_id, flipped);
        }
    }

    /// Copy the previous week's slot list forward, dropping ids that are no
    /// longer in the registry.
    pub fn copy_slots_from_previous(&mut self, week: u32) {
        if let Some(plan) = self.active_plan_mut() {
            let Some(prev) = plan.squad.slots.get(&(week.wrapping_sub(1))).cloned() else {
                return;
            };
            let copied: Vec<PlayerSlot> = prev
                .into_iter()
                .filter(|slot| plan.squad.contains_player(&slot.player_id))
                .collect();
            plan.squad.slots.insert(week, copied);
            plan.touch();
        }
    }

    pub fn toggle_manual_doubling(&mut self, week: u32, team: &str) {
        if let Some(plan) = self.active_plan_mut() {
            toggle_team(plan.manual_doubling.entry(week).or_default(), team);
            plan.touch();
        }
    }

    pub fn toggle_manual_blanking(&mut self, week: u32, team: &str) {
        if let Some(plan) = self.active_plan_mut() {
            toggle_team(plan.manual_blanking.entry(week).or_default(), team);
            plan.touch();
        }
    }

    /// Transfer-in search over the bootstrap player pool, by name or team
    /// code, excluding players already in the projected squad for the week.
    pub fn search_player_pool(&self, week: u32, query: &str) -> Vec<&Player> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        let current = self.squad_for_week(week);
        self.player_pool
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&query) || p.team.to_lowercase() == query
            })
            .filter(|p| {
                current
                    .as_ref()
                    .is_none_or(|squad| !squad.contains_player(&p.id))
            })
            .take(12)
            .collect()
    }
}

/// XI first, then bench, preserving slot order inside each group. The
/// planner table and row cursor share this ordering.
pub fn ordered_slots(squad: &Squad, week: u32) -> Vec<&PlayerSlot> {
    let slots = squad.slots_for_week(week);
    let mut ordered: Vec<&PlayerSlot> = slots.iter().filter(|s| s.role == Role::Xi).collect();
    ordered.extend(slots.iter().filter(|s| s.role == Role::Bench));
    ordered
}

fn toggle_team(list: &mut Vec<String>, team: &str) {
    let team = team.trim().to_uppercase();
    if let Some(idx) = list.iter().position(|t| *t == team) {
        list.remove(idx);
    } else {
        list.push(team);
    }
}

/// Fresh plan id: creation stamp plus a short random suffix.
pub fn new_plan_id() -> String {
    format!(
        "plan-{}-{:04x}",
        chrono::Utc::now().timestamp_millis(),
        rand::random::<u16>()
    )
}

/// Clamp a plan window starting at `start_week` to the configured span and
/// the end of the season.
pub fn plan_window(start_week: u32) -> (u32, u32) {
    let start = start_week.clamp(1, LAST_SEASON_WEEK);
    let end = (start + MAX_GW_SPAN - 1).min(LAST_SEASON_WEEK);
    (start, end)
}

/// State changes produced by the background provider. Deltas carry the plan
/// id they were fetched for and are dropped when that plan is gone by the
/// time they land.
#[derive(Debug, Clone)]
pub enum Delta {
    EntryInfo {
        team_id: String,
        team_name: String,
        manager_name: String,
        leagues: Vec<H2hLeague>,
    },
    CurrentWeek(u32),
    PlayerPool(Vec<Player>),
    BaseSquad {
        plan_id: String,
        squad: Squad,
        source_week: u32,
    },
    Opponents {
        plan_id: String,
        opponents: HashMap<u32, Opponent>,
    },
    OpponentSquad {
        plan_id: String,
        week: u32,
        squad: OpponentSquad,
    },
    WeekSignals {
        week: u32,
        doubling: Vec<String>,
        blanking: Vec<String>,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchEntry {
        team_id: String,
    },
    FetchPlayerPool,
    FetchBaseSquad {
        plan_id: String,
        team_id: String,
        start_week: u32,
        end_week: u32,
    },
    FetchOpponents {
        plan_id: String,
        league_id: u32,
        entry_id: u32,
        start_week: u32,
        end_week: u32,
    },
    FetchOpponentSquad {
        plan_id: String,
        entry_id: u32,
        week: u32,
    },
    FetchWeekSignals {
        start_week: u32,
        end_week: u32,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::EntryInfo {
            team_id,
            team_name,
            manager_name,
            leagues,
        } => {
            state.user.team_id = team_id;
            state.user.team_name = team_name.clone();
            state.user.manager_name = manager_name;
            state.user.leagues = leagues;
            state.setup_loading = false;
            state.push_log(format!("[INFO] Linked FPL team: {team_name}"));
        }
        Delta::CurrentWeek(week) => {
            state.current_week = Some(week);
        }
        Delta::PlayerPool(mut players) => {
            state.push_log(format!("[INFO] Player pool loaded ({})", players.len()));
            players.sort_by(|a, b| a.name.cmp(&b.name));
            state.player_pool = players;
        }
        Delta::BaseSquad {
            plan_id,
            squad,
            source_week,
        } => {
            state.squad_loading = false;
            let Some(plan) = state.user.plans.iter_mut().find(|p| p.id == plan_id) else {
                return;
            };
            let start_week = plan.start_week;
            plan.squad = squad;
            plan.touch();
            if source_week < start_week {
                state.push_log(format!(
                    "[WARN] Base squad imported from week {source_week} picks"
                ));
            } else {
                state.push_log("[INFO] Base squad imported");
            }
        }
        Delta::Opponents { plan_id, opponents } => {
            state.opponents_loading = false;
            let count = opponents.len();
            let Some(plan) = state.user.plans.iter_mut().find(|p| p.id == plan_id) else {
                return;
            };
            plan.opponents = opponents;
            plan.touch();
            state.push_log(format!("[INFO] Matchups loaded for {count} week(s)"));
        }
        Delta::OpponentSquad {
            plan_id,
            week,
            squad,
        } => {
            let source_week = squad.source_week;
            let Some(plan) = state.user.plans.iter_mut().find(|p| p.id == plan_id) else {
                return;
            };
            plan.opponent_squads.insert(week, squad);
            plan.touch();
            if source_week != week {
                state.push_log(format!(
                    "[WARN] Opponent picks for week {week} not posted; showing week {source_week}"
                ));
            } else {
                state.push_log(format!("[INFO] Opponent squad loaded for week {week}"));
            }
        }
        Delta::WeekSignals {
            week,
            doubling,
            blanking,
        } => {
            if !doubling.is_empty() {
                state.push_log(format!("[INFO] Week {week} doubles: {}", doubling.join(", ")));
            }
            state.detected_doubling.insert(week, doubling);
            state.detected_blanking.insert(week, blanking);
        }
        Delta::Log(line) => state.push_log(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Position;

    fn state_with_plan() -> AppState {
        let mut state = AppState::default();
        assert!(state.add_plan(Plan::empty("p1", "A", 1, "L", 24, 30)));
        state
    }

    #[test]
    fn plan_limit_is_enforced() {
        let mut state = AppState::default();
        for i in 0..MAX_PLANS {
            assert!(state.add_plan(Plan::empty(format!("p{i}"), "P", 1, "L", 24, 30)));
        }
        assert!(!state.add_plan(Plan::empty("overflow", "P", 1, "L", 24, 30)));
        assert_eq!(state.user.plans.len(), MAX_PLANS);
    }

    #[test]
    fn deleting_active_plan_falls_back_to_first_survivor() {
        let mut state = AppState::default();
        state.add_plan(Plan::empty("p1", "A", 1, "L", 24, 30));
        state.add_plan(Plan::empty("p2", "B", 1, "L", 24, 30));
        assert_eq!(state.user.active_plan_id.as_deref(), Some("p2"));
        state.delete_plan("p2");
        assert_eq!(state.user.active_plan_id.as_deref(), Some("p1"));
        state.delete_plan("p1");
        assert!(state.user.active_plan_id.is_none());
    }

    #[test]
    fn week_cursor_stays_inside_plan_range() {
        let mut state = state_with_plan();
        assert_eq!(state.selected_week(), Some(24));
        for _ in 0..20 {
            state.select_next_week();
        }
        assert_eq!(state.selected_week(), Some(30));
        state.select_prev_week();
        assert_eq!(state.selected_week(), Some(29));
    }

    #[test]
    fn chip_cycling_keeps_one_chip_per_week() {
        let mut state = state_with_plan();
        state.cycle_chip(25);
        assert_eq!(state.chips_for_week(25), vec![ChipType::Wildcard]);
        state.cycle_chip(25);
        assert_eq!(state.chips_for_week(25), vec![ChipType::FreeHit]);
        state.cycle_chip(25);
        state.cycle_chip(25);
        assert_eq!(state.chips_for_week(25), vec![ChipType::TripleCaptain]);
        state.cycle_chip(25);
        assert!(state.chips_for_week(25).is_empty());
    }

    #[test]
    fn stale_opponent_squad_delta_for_deleted_plan_is_dropped() {
        let mut state = state_with_plan();
        let delta = Delta::OpponentSquad {
            plan_id: "gone".to_string(),
            week: 24,
            squad: OpponentSquad {
                players: Vec::new(),
                source_week: 24,
            },
        };
        apply_delta(&mut state, delta);
        assert!(
            state
                .active_plan()
                .is_some_and(|p| p.opponent_squads.is_empty())
        );
    }

    #[test]
    fn stale_fallback_week_is_logged_as_warning() {
        let mut state = state_with_plan();
        apply_delta(
            &mut state,
            Delta::OpponentSquad {
                plan_id: "p1".to_string(),
                week: 26,
                squad: OpponentSquad {
                    players: Vec::new(),
                    source_week: 24,
                },
            },
        );
        assert!(
            state
                .logs
                .back()
                .is_some_and(|l| l.starts_with("[WARN]") && l.contains("week 24"))
        );
        assert_eq!(
            state
                .active_plan()
                .and_then(|p| p.opponent_squads.get(&26))
                .map(|s| s.source_week),
            Some(24)
        );
    }

    #[test]
    fn copy_forward_drops_departed_players() {
        let mut state = state_with_plan();
        let mut squad = Squad::default();
        squad.players.push(Player {
            id: "keep".to_string(),
            name: "Keep".to_string(),
            team: "LIV".to_string(),
            position: Position::MID,
        });
        squad.slots.insert(
            24,
            vec![
                PlayerSlot {
                    player_id: "keep".to_string(),
                    role: Role::Xi,
                },
                PlayerSlot {
                    player_id: "ghost".to_string(),
                    role: Role::Xi,
                },
            ],
        );
        state.set_base_squad(squad);
        state.copy_slots_from_previous(25);
        let plan = state.active_plan().expect("plan");
        let week25: Vec<&str> = plan
            .squad
            .slots_for_week(25)
            .iter()
            .map(|s| s.player_id.as_str())
            .collect();
        assert_eq!(week25, vec!["keep"]);
    }

    #[test]
    fn override_toggle_round_trips() {
        let mut state = state_with_plan();
        state.toggle_manual_doubling(25, "liv");
        assert_eq!(
            state.active_plan().unwrap().manual_doubling.get(&25),
            Some(&vec!["LIV".to_string()])
        );
        state.toggle_manual_doubling(25, "LIV");
        assert!(
            state
                .active_plan()
                .unwrap()
                .manual_doubling
                .get(&25)
                .is_some_and(Vec::is_empty)
        );
    }

    #[test]
    fn switching_plans_resets_the_cursors() {
        let mut state = AppState::default();
        state.add_plan(Plan::empty("p1", "A", 1, "L", 24, 30));
        state.add_plan(Plan::empty("p2", "B", 1, "L", 26, 32));
        state.select_next_week();
        state.set_active_plan("p1");
        assert_eq!(state.selected_week(), Some(24));
        state.set_active_plan("missing");
        assert_eq!(state.user.active_plan_id.as_deref(), Some("p1"));
    }

    #[test]
    fn reset_user_returns_to_a_blank_setup() {
        let mut state = state_with_plan();
        state.user.team_id = "123".to_string();
        state.user.setup_complete = true;
        state.reset_user();
        assert_eq!(state.screen, Screen::Setup);
        assert!(state.user.plans.is_empty());
        assert!(state.user.team_id.is_empty());
    }

    #[test]
    fn opponent_roster_edits_round_trip() {
        let mut state = state_with_plan();
        let ward = OpponentPlayer {
            player: Player {
                id: "w1".to_string(),
                name: "Watkins".to_string(),
                team: "AVL".to_string(),
                position: Position::FWD,
            },
            is_captain: true,
            is_vice_captain: false,
            is_starting: true,
        };
        state.add_opponent_player(25, ward);
        let plan = state.active_plan().expect("plan");
        let squad = plan.opponent_squads.get(&25).expect("created on demand");
        assert_eq!(squad.source_week, 25);
        assert_eq!(squad.captain_id(), Some("w1"));

        state.remove_opponent_player(25, "w1");
        let plan = state.active_plan().expect("plan");
        assert!(
            plan.opponent_squads
                .get(&25)
                .is_some_and(|s| s.players.is_empty())
        );
    }

    #[test]
    fn set_opponents_replaces_the_map() {
        let mut state = state_with_plan();
        let mut opponents = HashMap::new();
        opponents.insert(
            24,
            Opponent {
                entry_id: 7,
                team_name: "Rivals".to_string(),
                manager_name: "Pat Quinn".to_string(),
            },
        );
        state.set_opponents(opponents);
        state.set_opponent_squad(
            24,
            OpponentSquad {
                players: Vec::new(),
                source_week: 24,
            },
        );
        let plan = state.active_plan().expect("plan");
        assert_eq!(plan.opponents.len(), 1);
        assert!(plan.opponent_squads.contains_key(&24));
    }

    #[test]
    fn remove_plan_events_is_scoped_to_the_week() {
        let mut state = state_with_plan();
        state.add_plan_event(PlanEvent::TransferOut {
            week: 25,
            player_id: "a".to_string(),
        });
        state.add_plan_event(PlanEvent::TransferOut {
            week: 26,
            player_id: "b".to_string(),
        });
        state.remove_plan_events(25, |_| true);
        let plan = state.active_plan().expect("plan");
        assert_eq!(plan.events.len(), 1);
        assert_eq!(plan.events[0].week(), 26);
    }

    #[test]
    fn search_excludes_current_squad_members() {
        let mut state = state_with_plan();
        let salah = Player {
            id: "p8".to_string(),
            name: "Salah".to_string(),
            team: "LIV".to_string(),
            position: Position::MID,
        };
        let mut squad = Squad::default();
        squad.players.push(salah.clone());
        squad.slots.insert(
            24,
            vec![PlayerSlot {
                player_id: "p8".to_string(),
                role: Role::Xi,
            }],
        );
        state.set_base_squad(squad);
        state.player_pool = vec![
            salah,
            Player {
                id: "x1".to_string(),
                name: "Szoboszlai".to_string(),
                team: "LIV".to_string(),
                position: Position::MID,
            },
        ];
        let hits = state.search_player_pool(24, "liv");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "x1");
    }

    #[test]
    fn plan_window_respects_span_and_season_end() {
        assert_eq!(plan_window(24), (24, 30));
        assert_eq!(plan_window(36), (36, 38));
        assert_eq!(plan_window(0), (1, 7));
    }
}
