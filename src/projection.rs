use std::collections::HashMap;

use crate::gameweeks;
use crate::models::{ChipType, Plan, PlanEvent, Player, PlayerSlot, Position, Role, Squad};

/// Replay transfer events up to and including `target_week` against a base
/// squad, producing the effective squad as of that week. The base is never
/// mutated; future-dated events have no effect yet. Applying the same event
/// list twice yields the same result.
pub fn project_squad(base: &Squad, events: &[PlanEvent], target_week: u32) -> Squad {
    events
        .iter()
        .filter(|ev| ev.week() <= target_week)
        .fold(base.clone(), |squad, ev| apply_event(squad, ev, target_week))
}

fn apply_event(mut squad: Squad, event: &PlanEvent, target_week: u32) -> Squad {
    match event {
        PlanEvent::TransferOut { player_id, .. } => {
            squad.players.retain(|p| p.id != *player_id);
            for (&week, slots) in squad.slots.iter_mut() {
                if week > target_week {
                    continue;
                }
                slots.retain(|slot| slot.player_id != *player_id);
            }
        }
        PlanEvent::TransferIn { week, player } => {
            if !squad.contains_player(&player.id) {
                squad.players.push(player.clone());
            }
            // Incoming players land on the bench; promotion to XI is an
            // explicit follow-up edit.
            for week in *week..=target_week {
                let slots = squad.slots.entry(week).or_default();
                if slots.iter().any(|slot| slot.player_id == player.id) {
                    continue;
                }
                slots.push(PlayerSlot {
                    player_id: player.id.clone(),
                    role: Role::Bench,
                });
            }
        }
        PlanEvent::Chip { .. } => {}
    }
    squad
}

pub fn is_bench_boost_active(events: &[PlanEvent], week: u32) -> bool {
    events
        .iter()
        .any(|ev| matches!(ev, PlanEvent::Chip { week: w, chip: ChipType::BenchBoost } if *w == week))
}

pub fn chips_for_week(events: &[PlanEvent], week: u32) -> Vec<ChipType> {
    events
        .iter()
        .filter_map(|ev| match ev {
            PlanEvent::Chip { week: w, chip } if *w == week => Some(*chip),
            _ => None,
        })
        .collect()
}

/// Point cost of the week's transfers: 4 per transfer-in beyond the free
/// allowance.
pub fn transfer_cost(events: &[PlanEvent], week: u32, free_transfers: u32) -> u32 {
    let transfers_in = events
        .iter()
        .filter(|ev| matches!(ev, PlanEvent::TransferIn { week: w, .. } if *w == week))
        .count() as u32;
    transfers_in.saturating_sub(free_transfers) * 4
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SquadSummary {
    pub total_players: usize,
    pub xi_count: usize,
    pub bench_count: usize,
    pub doubling_players: Vec<Player>,
    pub position_counts: HashMap<Position, usize>,
}

/// Weekly headline numbers for a projected squad. Counts cover the XI only
/// unless `include_bench` is set (Bench Boost weeks).
pub fn squad_summary_for_week(
    squad: &Squad,
    week: u32,
    include_bench: bool,
    plan: Option<&Plan>,
    detected_doubling: Option<&[String]>,
) -> SquadSummary {
    let slots = squad.slots_for_week(week);
    let xi_count = slots.iter().filter(|s| s.role == Role::Xi).count();
    let bench_count = slots.iter().filter(|s| s.role == Role::Bench).count();

    let relevant: Vec<&Player> = slots
        .iter()
        .filter(|slot| include_bench || slot.role == Role::Xi)
        .filter_map(|slot| squad.player(&slot.player_id))
        .collect();

    let doubling_players = relevant
        .iter()
        .filter(|p| gameweeks::is_team_doubling(&p.team, week, plan, detected_doubling))
        .map(|p| (*p).clone())
        .collect();

    let mut position_counts: HashMap<Position, usize> =
        Position::ALL.iter().map(|p| (*p, 0)).collect();
    for player in &relevant {
        *position_counts.entry(player.position).or_insert(0) += 1;
    }

    SquadSummary {
        total_players: relevant.len(),
        xi_count,
        bench_count,
        doubling_players,
        position_counts,
    }
}

pub fn players_by_position<'a>(
    squad: &'a Squad,
    week: u32,
    position: Position,
    role: Option<Role>,
) -> Vec<&'a Player> {
    squad
        .slots_for_week(week)
        .iter()
        .filter(|slot| role.is_none_or(|r| slot.role == r))
        .filter_map(|slot| squad.player(&slot.player_id))
        .filter(|p| p.position == position)
        .collect()
}
