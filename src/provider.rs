use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::fpl_fetch::{self, PlayerPool};
use crate::state::{Delta, ProviderCommand};

/// Background fetch worker. Commands come from the UI thread, deltas go
/// back over the channel; all HTTP happens here so the draw loop never
/// blocks. Errors turn into log deltas instead of killing the thread.
pub fn spawn(commands: Receiver<ProviderCommand>, deltas: Sender<Delta>) {
    thread::spawn(move || {
        let mut pool: Option<PlayerPool> = None;
        while let Ok(cmd) = commands.recv() {
            if handle_command(cmd, &mut pool, &deltas).is_err() {
                // UI side hung up; nothing left to do.
                break;
            }
        }
    });
}

type SendResult = std::result::Result<(), std::sync::mpsc::SendError<Delta>>;

fn handle_command(
    cmd: ProviderCommand,
    pool: &mut Option<PlayerPool>,
    deltas: &Sender<Delta>,
) -> SendResult {
    match cmd {
        ProviderCommand::FetchEntry { team_id } => match fpl_fetch::fetch_entry(&team_id) {
            Ok(info) => deltas.send(Delta::EntryInfo {
                team_id,
                team_name: info.team_name,
                manager_name: info.manager_name,
                leagues: info.leagues,
            }),
            Err(err) => deltas.send(Delta::Log(format!("[WARN] Entry lookup failed: {err:#}"))),
        },
        ProviderCommand::FetchPlayerPool => match ensure_pool(pool) {
            Ok(p) => {
                deltas.send(Delta::CurrentWeek(p.current_week))?;
                deltas.send(Delta::PlayerPool(p.players.values().cloned().collect()))
            }
            Err(err) => deltas.send(Delta::Log(format!("[WARN] Bootstrap failed: {err:#}"))),
        },
        ProviderCommand::FetchBaseSquad {
            plan_id,
            team_id,
            start_week,
            end_week,
        } => {
            let result = ensure_pool(pool).and_then(|p| {
                let picks =
                    fpl_fetch::fetch_picks_with_fallback(&team_id, start_week, p.current_week)?;
                let squad = fpl_fetch::squad_from_picks(&picks, p, start_week..=end_week);
                Ok((picks.week, squad))
            });
            match result {
                Ok((source_week, squad)) => deltas.send(Delta::BaseSquad {
                    plan_id,
                    squad,
                    source_week,
                }),
                Err(err) => {
                    deltas.send(Delta::Log(format!("[WARN] Squad import failed: {err:#}")))
                }
            }
        }
        ProviderCommand::FetchOpponents {
            plan_id,
            league_id,
            entry_id,
            start_week,
            end_week,
        } => match fpl_fetch::fetch_h2h_matches(league_id, entry_id) {
            Ok(rows) => {
                let opponents =
                    fpl_fetch::opponents_for_range(&rows, entry_id, start_week..=end_week);
                deltas.send(Delta::Opponents { plan_id, opponents })
            }
            Err(err) => deltas.send(Delta::Log(format!("[WARN] Matchups failed: {err:#}"))),
        },
        ProviderCommand::FetchOpponentSquad {
            plan_id,
            entry_id,
            week,
        } => {
            let result = ensure_pool(pool).and_then(|p| {
                let team_id = entry_id.to_string();
                let picks = fpl_fetch::fetch_picks_with_fallback(&team_id, week, 1)?;
                Ok(fpl_fetch::opponent_squad_from_picks(&picks, p))
            });
            match result {
                Ok(squad) => deltas.send(Delta::OpponentSquad {
                    plan_id,
                    week,
                    squad,
                }),
                Err(err) => deltas.send(Delta::Log(format!(
                    "[WARN] Opponent picks failed for week {week}: {err:#}"
                ))),
            }
        }
        ProviderCommand::FetchWeekSignals {
            start_week,
            end_week,
        } => {
            let teams = match ensure_pool(pool) {
                Ok(p) => p.teams.clone(),
                Err(err) => {
                    return deltas.send(Delta::Log(format!("[WARN] Bootstrap failed: {err:#}")));
                }
            };
            for week in start_week..=end_week {
                match fpl_fetch::fetch_week_signals(week, &teams) {
                    Ok((doubling, blanking)) => deltas.send(Delta::WeekSignals {
                        week,
                        doubling,
                        blanking,
                    })?,
                    Err(err) => deltas.send(Delta::Log(format!(
                        "[WARN] Fixture scan failed for week {week}: {err:#}"
                    )))?,
                }
            }
            Ok(())
        }
    }
}

fn ensure_pool<'a>(pool: &'a mut Option<PlayerPool>) -> anyhow::Result<&'a PlayerPool> {
    if pool.is_none() {
        *pool = Some(fpl_fetch::fetch_player_pool()?);
    }
    pool.as_ref()
        .ok_or_else(|| anyhow::anyhow!("player pool unavailable"))
}
