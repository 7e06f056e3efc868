use std::collections::HashMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Upper bound on concurrently stored plans.
pub const MAX_PLANS: usize = 5;
/// Longest planning window a single plan may cover, in gameweeks.
pub const MAX_GW_SPAN: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    GK,
    DEF,
    MID,
    FWD,
}

impl Position {
    pub const ALL: [Position; 4] = [Position::GK, Position::DEF, Position::MID, Position::FWD];

    pub fn label(self) -> &'static str {
        match self {
            Position::GK => "GK",
            Position::DEF => "DEF",
            Position::MID => "MID",
            Position::FWD => "FWD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "XI")]
    Xi,
    #[serde(rename = "BENCH")]
    Bench,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Xi => "XI",
            Role::Bench => "BENCH",
        }
    }
}

/// One fantasy asset. Immutable once created; transfers replace it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    /// Club short code, canonically uppercase ("LIV", "ARS", ...).
    pub team: String,
    pub position: Position,
}

/// Pairs a player id with its lineup role for one gameweek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSlot {
    pub player_id: String,
    pub role: Role,
}

/// A squad is a player registry plus the authoritative slot list per week.
/// A player missing from a week's slot list is not in the squad that week.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Squad {
    pub players: Vec<Player>,
    pub slots: HashMap<u32, Vec<PlayerSlot>>,
}

impl Squad {
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn contains_player(&self, id: &str) -> bool {
        self.player(id).is_some()
    }

    pub fn slots_for_week(&self, week: u32) -> &[PlayerSlot] {
        self.slots.get(&week).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChipType {
    Wildcard,
    FreeHit,
    BenchBoost,
    TripleCaptain,
}

impl ChipType {
    pub const ALL: [ChipType; 4] = [
        ChipType::Wildcard,
        ChipType::FreeHit,
        ChipType::BenchBoost,
        ChipType::TripleCaptain,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChipType::Wildcard => "Wildcard",
            ChipType::FreeHit => "Free Hit",
            ChipType::BenchBoost => "Bench Boost",
            ChipType::TripleCaptain => "Triple Captain",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ChipType::Wildcard => "WC",
            ChipType::FreeHit => "FH",
            ChipType::BenchBoost => "BB",
            ChipType::TripleCaptain => "TC",
        }
    }
}

/// One planning action, pinned to exactly one gameweek. Events in the same
/// week resolve in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanEvent {
    /// New player enters from `week` onward; carries full player data since
    /// the player did not previously exist in the registry.
    TransferIn { week: u32, player: Player },
    /// Player leaves the squad from `week` onward.
    TransferOut { week: u32, player_id: String },
    /// Chip activation, effective for `week` only.
    Chip { week: u32, chip: ChipType },
}

impl PlanEvent {
    pub fn week(&self) -> u32 {
        match self {
            PlanEvent::TransferIn { week, .. }
            | PlanEvent::TransferOut { week, .. }
            | PlanEvent::Chip { week, .. } => *week,
        }
    }
}

/// The opposing manager for one gameweek, from league matchup data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opponent {
    pub entry_id: u32,
    pub team_name: String,
    pub manager_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentPlayer {
    pub player: Player,
    pub is_captain: bool,
    pub is_vice_captain: bool,
    /// First 11 of the positionally ordered pick list.
    pub is_starting: bool,
}

/// An opponent's roster for one week. `source_week` records the week the
/// picks were actually fetched for, which lags the plan week when the
/// requested week's data is not posted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentSquad {
    pub players: Vec<OpponentPlayer>,
    pub source_week: u32,
}

impl OpponentSquad {
    pub fn roster(&self) -> Vec<Player> {
        self.players.iter().map(|p| p.player.clone()).collect()
    }

    pub fn captain_id(&self) -> Option<&str> {
        self.players
            .iter()
            .find(|p| p.is_captain)
            .map(|p| p.player.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

/// Output of the head-to-head risk engine. Differential lists keep the
/// input roster order.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadToHeadResult {
    pub my_differentials: Vec<Player>,
    pub their_differentials: Vec<Player>,
    pub risk: RiskLevel,
    pub overlap_percentage: u8,
    pub my_captain_doubling: bool,
    pub their_captain_doubling: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct H2hLeague {
    pub id: u32,
    pub name: String,
    pub entry_rank: Option<u32>,
}

/// Aggregate root for one planning window. Week-indexed maps treat a
/// missing entry as "nothing known for that week".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub league_id: u32,
    pub league_name: String,
    pub start_week: u32,
    pub end_week: u32,
    pub squad: Squad,
    pub events: Vec<PlanEvent>,
    pub opponents: HashMap<u32, Opponent>,
    pub opponent_squads: HashMap<u32, OpponentSquad>,
    pub captains: HashMap<u32, String>,
    /// Manual "this team doubles in week N" overrides, uppercase team codes.
    pub manual_doubling: HashMap<u32, Vec<String>>,
    /// Manual "this team blanks in week N" overrides, uppercase team codes.
    pub manual_blanking: HashMap<u32, Vec<String>>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Plan {
    pub fn empty(
        id: impl Into<String>,
        name: impl Into<String>,
        league_id: u32,
        league_name: impl Into<String>,
        start_week: u32,
        end_week: u32,
    ) -> Plan {
        let now = chrono::Utc::now().timestamp_millis();
        let mut squad = Squad::default();
        for week in start_week..=end_week {
            squad.slots.insert(week, Vec::new());
        }
        Plan {
            id: id.into(),
            name: name.into(),
            league_id,
            league_name: league_name.into(),
            start_week,
            end_week,
            squad,
            events: Vec::new(),
            opponents: HashMap::new(),
            opponent_squads: HashMap::new(),
            captains: HashMap::new(),
            manual_doubling: HashMap::new(),
            manual_blanking: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn weeks(&self) -> RangeInclusive<u32> {
        self.start_week..=self.end_week
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

/// Everything persisted for the user: identity, leagues, and plans.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub team_id: String,
    pub team_name: String,
    pub manager_name: String,
    pub leagues: Vec<H2hLeague>,
    pub plans: Vec<Plan>,
    pub active_plan_id: Option<String>,
    pub setup_complete: bool,
}

impl UserConfig {
    pub fn active_plan(&self) -> Option<&Plan> {
        let id = self.active_plan_id.as_deref()?;
        self.plans.iter().find(|p| p.id == id)
    }

    pub fn active_plan_mut(&mut self) -> Option<&mut Plan> {
        let id = self.active_plan_id.clone()?;
        self.plans.iter_mut().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plan_seeds_slot_lists_for_every_week_in_range() {
        let plan = Plan::empty("p1", "Plan A", 9, "Mini League", 24, 30);
        for week in 24..=30 {
            assert!(plan.squad.slots.get(&week).is_some_and(Vec::is_empty));
        }
        assert!(!plan.squad.slots.contains_key(&23));
        assert!(!plan.squad.slots.contains_key(&31));
    }

    #[test]
    fn plan_event_week_accessor_covers_all_variants() {
        let p = Player {
            id: "x".to_string(),
            name: "X".to_string(),
            team: "LIV".to_string(),
            position: Position::MID,
        };
        assert_eq!(PlanEvent::TransferIn { week: 5, player: p }.week(), 5);
        assert_eq!(
            PlanEvent::TransferOut {
                week: 6,
                player_id: "x".to_string()
            }
            .week(),
            6
        );
        assert_eq!(
            PlanEvent::Chip {
                week: 7,
                chip: ChipType::BenchBoost
            }
            .week(),
            7
        );
    }

    #[test]
    fn plan_events_round_trip_through_json() {
        let events = vec![
            PlanEvent::TransferOut {
                week: 25,
                player_id: "p8".to_string(),
            },
            PlanEvent::Chip {
                week: 26,
                chip: ChipType::TripleCaptain,
            },
        ];
        let json = serde_json::to_string(&events).expect("serialize");
        let back: Vec<PlanEvent> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, events);
    }

    #[test]
    fn opponent_squad_surfaces_captain() {
        let squad = OpponentSquad {
            players: vec![
                OpponentPlayer {
                    player: Player {
                        id: "a".to_string(),
                        name: "A".to_string(),
                        team: "ARS".to_string(),
                        position: Position::DEF,
                    },
                    is_captain: false,
                    is_vice_captain: true,
                    is_starting: true,
                },
                OpponentPlayer {
                    player: Player {
                        id: "b".to_string(),
                        name: "B".to_string(),
                        team: "MCI".to_string(),
                        position: Position::FWD,
                    },
                    is_captain: true,
                    is_vice_captain: false,
                    is_starting: true,
                },
            ],
            source_week: 24,
        };
        assert_eq!(squad.captain_id(), Some("b"));
        assert_eq!(squad.roster().len(), 2);
    }
}
