use std::ops::RangeInclusive;

use crate::models::{
    Opponent, OpponentPlayer, OpponentSquad, Plan, Player, PlayerSlot, Position, Role, Squad,
};

/// Demo data for running without an FPL team id: a 15-man base squad and a
/// fixed opponent roster per week, with deliberate overlap so the risk
/// screen has something to say.
fn sample_players() -> Vec<Player> {
    fn p(id: &str, name: &str, team: &str, position: Position) -> Player {
        Player {
            id: id.to_string(),
            name: name.to_string(),
            team: team.to_string(),
            position,
        }
    }
    vec![
        p("p1", "Alisson", "LIV", Position::GK),
        p("p2", "Henderson", "CRY", Position::GK),
        p("p3", "Alexander-Arnold", "LIV", Position::DEF),
        p("p4", "Saliba", "ARS", Position::DEF),
        p("p5", "Gabriel", "ARS", Position::DEF),
        p("p6", "Hall", "NEW", Position::DEF),
        p("p7", "Dalot", "MUN", Position::DEF),
        p("p8", "Salah", "LIV", Position::MID),
        p("p9", "Palmer", "CHE", Position::MID),
        p("p10", "Saka", "ARS", Position::MID),
        p("p11", "Gordon", "NEW", Position::MID),
        p("p12", "Mbeumo", "BRE", Position::MID),
        p("p13", "Haaland", "MCI", Position::FWD),
        p("p14", "Isak", "NEW", Position::FWD),
        p("p15", "Watkins", "AVL", Position::FWD),
    ]
}

pub fn sample_base_squad(weeks: RangeInclusive<u32>) -> Squad {
    let players = sample_players();
    let slots: Vec<PlayerSlot> = players
        .iter()
        .enumerate()
        .map(|(idx, player)| PlayerSlot {
            player_id: player.id.clone(),
            role: if idx < 11 { Role::Xi } else { Role::Bench },
        })
        .collect();

    let mut squad = Squad {
        players,
        slots: Default::default(),
    };
    for week in weeks {
        squad.slots.insert(week, slots.clone());
    }
    squad
}

pub fn sample_opponent_squad(week: u32) -> OpponentSquad {
    fn op(id: &str, name: &str, team: &str, position: Position, is_captain: bool) -> OpponentPlayer {
        OpponentPlayer {
            player: Player {
                id: id.to_string(),
                name: name.to_string(),
                team: team.to_string(),
                position,
            },
            is_captain,
            is_vice_captain: false,
            is_starting: true,
        }
    }
    OpponentSquad {
        players: vec![
            op("o1", "Raya", "ARS", Position::GK, false),
            op("p3", "Alexander-Arnold", "LIV", Position::DEF, false),
            op("o3", "Van Dijk", "LIV", Position::DEF, false),
            op("p4", "Saliba", "ARS", Position::DEF, false),
            op("o5", "Gvardiol", "MCI", Position::DEF, false),
            op("p8", "Salah", "LIV", Position::MID, true),
            op("p9", "Palmer", "CHE", Position::MID, false),
            op("o8", "Odegaard", "ARS", Position::MID, false),
            op("o9", "Foden", "MCI", Position::MID, false),
            op("p13", "Haaland", "MCI", Position::FWD, false),
            op("o11", "Havertz", "ARS", Position::FWD, false),
        ],
        source_week: week,
    }
}

pub fn sample_opponent() -> Opponent {
    Opponent {
        entry_id: 0,
        team_name: "Demo Rivals".to_string(),
        manager_name: "Demo Manager".to_string(),
    }
}

/// A fully populated demo plan covering the default window.
pub fn demo_plan(id: impl Into<String>, start_week: u32, end_week: u32) -> Plan {
    let mut plan = Plan::empty(id, "Demo plan", 0, "Demo league", start_week, end_week);
    plan.squad = sample_base_squad(plan.weeks());
    for week in plan.weeks() {
        plan.opponents.insert(week, sample_opponent());
        plan.opponent_squads.insert(week, sample_opponent_squad(week));
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_plan_covers_every_week() {
        let plan = demo_plan("demo", 24, 30);
        for week in 24..=30 {
            assert_eq!(plan.squad.slots_for_week(week).len(), 15);
            assert!(plan.opponents.contains_key(&week));
            assert!(plan.opponent_squads.contains_key(&week));
        }
        assert_eq!(plan.squad.players.len(), 15);
    }

    #[test]
    fn demo_rosters_overlap_by_construction() {
        let plan = demo_plan("demo", 24, 30);
        let opp = plan.opponent_squads.get(&24).expect("week seeded");
        let shared = opp
            .players
            .iter()
            .filter(|p| plan.squad.contains_player(&p.player.id))
            .count();
        assert!(shared >= 4);
        assert_eq!(opp.captain_id(), Some("p8"));
    }
}
