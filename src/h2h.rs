use std::collections::HashSet;

use crate::gameweeks;
use crate::models::{HeadToHeadResult, Plan, Player, RiskLevel};

/// Compare two rosters for one week and derive differential sets, overlap,
/// captain exposure, and a qualitative risk tier. Pure function of its
/// arguments; equality is by player id only, so the same real-world player
/// must carry the same id on both sides for overlap to register.
pub fn compute_head_to_head_risk(
    my_players: &[Player],
    their_players: &[Player],
    week: u32,
    my_captain_id: Option<&str>,
    their_captain_id: Option<&str>,
    plan: Option<&Plan>,
    detected_doubling: Option<&[String]>,
) -> HeadToHeadResult {
    let my_ids: HashSet<&str> = my_players.iter().map(|p| p.id.as_str()).collect();
    let their_ids: HashSet<&str> = their_players.iter().map(|p| p.id.as_str()).collect();

    let my_differentials: Vec<Player> = my_players
        .iter()
        .filter(|p| !their_ids.contains(p.id.as_str()))
        .cloned()
        .collect();
    let their_differentials: Vec<Player> = their_players
        .iter()
        .filter(|p| !my_ids.contains(p.id.as_str()))
        .cloned()
        .collect();

    let overlap_count = my_players
        .iter()
        .filter(|p| their_ids.contains(p.id.as_str()))
        .count();
    let overlap_percentage =
        ((overlap_count as f64 / my_players.len().max(1) as f64) * 100.0).round() as u8;

    let my_captain_doubling = captain_doubling(my_players, my_captain_id, week, plan, detected_doubling);
    let their_captain_doubling =
        captain_doubling(their_players, their_captain_id, week, plan, detected_doubling);

    let risk = derive_risk_level(
        my_differentials.len(),
        their_differentials.len(),
        overlap_percentage,
        my_captain_doubling,
        their_captain_doubling,
    );

    HeadToHeadResult {
        my_differentials,
        their_differentials,
        risk,
        overlap_percentage,
        my_captain_doubling,
        their_captain_doubling,
    }
}

fn captain_doubling(
    players: &[Player],
    captain_id: Option<&str>,
    week: u32,
    plan: Option<&Plan>,
    detected_doubling: Option<&[String]>,
) -> bool {
    let Some(id) = captain_id else {
        return false;
    };
    let Some(captain) = players.iter().find(|p| p.id == id) else {
        return false;
    };
    gameweeks::is_team_doubling(&captain.team, week, plan, detected_doubling)
}

/// Ordered tier rules, first match wins:
/// high when the opponent's differential count exceeds mine by more than
/// two or their captain doubles while mine does not; medium when overlap is
/// under 50% or they simply hold more differentials; low otherwise.
fn derive_risk_level(
    my_diff_count: usize,
    their_diff_count: usize,
    overlap_percentage: u8,
    my_captain_doubling: bool,
    their_captain_doubling: bool,
) -> RiskLevel {
    if their_diff_count > my_diff_count + 2 || (their_captain_doubling && !my_captain_doubling) {
        return RiskLevel::High;
    }
    if overlap_percentage < 50 || their_diff_count > my_diff_count {
        return RiskLevel::Medium;
    }
    RiskLevel::Low
}
