use std::collections::HashMap;
use std::ops::RangeInclusive;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::http_cache::fetch_json_cached;
use crate::http_client::http_client;
use crate::models::{
    H2hLeague, Opponent, OpponentPlayer, OpponentSquad, Player, PlayerSlot, Position, Role, Squad,
};

const FPL_API_BASE: &str = "https://fantasy.premierleague.com/api";

// The bootstrap payload is large and changes rarely; picks and matchups
// move during a gameweek.
const BOOTSTRAP_MAX_AGE_SECS: u64 = 6 * 60 * 60;
const ENTRY_MAX_AGE_SECS: u64 = 60 * 60;
const PICKS_MAX_AGE_SECS: u64 = 10 * 60;
const MATCHES_MAX_AGE_SECS: u64 = 10 * 60;
const FIXTURES_MAX_AGE_SECS: u64 = 60 * 60;

const MAX_H2H_PAGES: u32 = 50;

/// Everything worth keeping from `bootstrap-static/`: the full player
/// registry, team code table, and the current gameweek.
#[derive(Debug, Clone, Default)]
pub struct PlayerPool {
    pub players: HashMap<u32, Player>,
    pub teams: HashMap<u32, String>,
    pub current_week: u32,
}

impl PlayerPool {
    pub fn player(&self, element: u32) -> Option<&Player> {
        self.players.get(&element)
    }
}

pub fn fetch_player_pool() -> Result<PlayerPool> {
    let client = http_client()?;
    let url = format!("{FPL_API_BASE}/bootstrap-static/");
    let body = fetch_json_cached(client, &url, BOOTSTRAP_MAX_AGE_SECS)
        .context("bootstrap request failed")?;
    parse_bootstrap_json(&body)
}

pub fn parse_bootstrap_json(raw: &str) -> Result<PlayerPool> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid bootstrap json")?;

    let mut teams = HashMap::new();
    if let Some(arr) = v.get("teams").and_then(|x| x.as_array()) {
        for team in arr {
            let Some(id) = team.get("id").and_then(|x| x.as_u64()) else {
                continue;
            };
            let short = team
                .get("short_name")
                .and_then(|x| x.as_str())
                .unwrap_or_default()
                .to_uppercase();
            teams.insert(id as u32, short);
        }
    }

    let mut players = HashMap::new();
    if let Some(arr) = v.get("elements").and_then(|x| x.as_array()) {
        for el in arr {
            let Some(id) = el.get("id").and_then(|x| x.as_u64()) else {
                continue;
            };
            let name = el
                .get("web_name")
                .and_then(|x| x.as_str())
                .unwrap_or_default()
                .to_string();
            let team_id = el.get("team").and_then(|x| x.as_u64()).unwrap_or(0) as u32;
            let team = teams.get(&team_id).cloned().unwrap_or_default();
            let position =
                map_position(el.get("element_type").and_then(|x| x.as_u64()).unwrap_or(0));
            players.insert(
                id as u32,
                Player {
                    id: id.to_string(),
                    name,
                    team,
                    position,
                },
            );
        }
    }

    let current_week = current_week_from_events(&v);

    Ok(PlayerPool {
        players,
        teams,
        current_week,
    })
}

fn current_week_from_events(v: &Value) -> u32 {
    let Some(events) = v.get("events").and_then(|x| x.as_array()) else {
        return 1;
    };
    if let Some(current) = events.iter().find(|e| {
        e.get("is_current")
            .and_then(|x| x.as_bool())
            .unwrap_or(false)
    }) {
        if let Some(id) = current.get("id").and_then(|x| x.as_u64()) {
            return id as u32;
        }
    }
    // Between seasons there is no current event; fall back to the last
    // finished one.
    events
        .iter()
        .rev()
        .find(|e| e.get("finished").and_then(|x| x.as_bool()).unwrap_or(false))
        .and_then(|e| e.get("id").and_then(|x| x.as_u64()))
        .map(|id| id as u32)
        .unwrap_or(1)
}

/// Position codes in the bootstrap payload: 1=GK 2=DEF 3=MID 4=FWD.
/// Unknown codes land on MID.
pub fn map_position(element_type: u64) -> Position {
    match element_type {
        1 => Position::GK,
        2 => Position::DEF,
        3 => Position::MID,
        4 => Position::FWD,
        _ => Position::MID,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub team_name: String,
    pub manager_name: String,
    pub leagues: Vec<H2hLeague>,
}

pub fn fetch_entry(team_id: &str) -> Result<EntryInfo> {
    let client = http_client()?;
    let url = format!("{FPL_API_BASE}/entry/{team_id}/");
    let body = fetch_json_cached(client, &url, ENTRY_MAX_AGE_SECS)
        .with_context(|| format!("entry {team_id} request failed"))?;
    parse_entry_json(&body)
}

pub fn parse_entry_json(raw: &str) -> Result<EntryInfo> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid entry json")?;

    let team_name = v
        .get("name")
        .and_then(|x| x.as_str())
        .unwrap_or_default()
        .to_string();
    let first = v
        .get("player_first_name")
        .and_then(|x| x.as_str())
        .unwrap_or_default();
    let last = v
        .get("player_last_name")
        .and_then(|x| x.as_str())
        .unwrap_or_default();
    let manager_name = format!("{first} {last}").trim().to_string();

    let mut leagues = Vec::new();
    if let Some(arr) = v
        .get("leagues")
        .and_then(|x| x.get("h2h"))
        .and_then(|x| x.as_array())
    {
        for league in arr {
            let Some(id) = league.get("id").and_then(|x| x.as_u64()) else {
                continue;
            };
            leagues.push(H2hLeague {
                id: id as u32,
                name: league
                    .get("name")
                    .and_then(|x| x.as_str())
                    .unwrap_or_default()
                    .to_string(),
                entry_rank: league
                    .get("entry_rank")
                    .and_then(|x| x.as_u64())
                    .map(|r| r as u32),
            });
        }
    }

    Ok(EntryInfo {
        team_name,
        manager_name,
        leagues,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub element: u32,
    /// 1-based slot in the positionally ordered pick list; 1..=11 start.
    pub order: u32,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

impl Pick {
    pub fn is_starting(&self) -> bool {
        self.order <= 11
    }
}

/// A pick list together with the week it actually came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameweekPicks {
    pub week: u32,
    pub picks: Vec<Pick>,
}

pub fn fetch_picks(team_id: &str, week: u32) -> Result<Vec<Pick>> {
    let client = http_client()?;
    let url = format!("{FPL_API_BASE}/entry/{team_id}/event/{week}/picks/");
    let body = fetch_json_cached(client, &url, PICKS_MAX_AGE_SECS)
        .with_context(|| format!("picks request failed for week {week}"))?;
    parse_picks_json(&body)
}

pub fn parse_picks_json(raw: &str) -> Result<Vec<Pick>> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid picks json")?;
    let mut out = Vec::new();
    if let Some(arr) = v.get("picks").and_then(|x| x.as_array()) {
        for pick in arr {
            let Some(element) = pick.get("element").and_then(|x| x.as_u64()) else {
                continue;
            };
            out.push(Pick {
                element: element as u32,
                order: pick.get("position").and_then(|x| x.as_u64()).unwrap_or(0) as u32,
                is_captain: pick
                    .get("is_captain")
                    .and_then(|x| x.as_bool())
                    .unwrap_or(false),
                is_vice_captain: pick
                    .get("is_vice_captain")
                    .and_then(|x| x.as_bool())
                    .unwrap_or(false),
            });
        }
    }
    Ok(out)
}

/// Picks for `week`, walking back to the most recent posted week when the
/// requested one is not available yet. The week actually used is reported
/// in the result so stale data can be flagged.
pub fn fetch_picks_with_fallback(team_id: &str, week: u32, floor_week: u32) -> Result<GameweekPicks> {
    let floor = floor_week.min(week).max(1);
    let mut probe = week;
    loop {
        match fetch_picks(team_id, probe) {
            Ok(picks) if !picks.is_empty() => {
                return Ok(GameweekPicks { week: probe, picks });
            }
            Ok(_) | Err(_) if probe > floor => {
                probe -= 1;
            }
            Ok(_) => {
                return Err(anyhow::anyhow!(
                    "no picks posted for entry {team_id} in weeks {floor}..={week}"
                ));
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("no picks available for entry {team_id} down to week {floor}")
                });
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct H2hMatchRow {
    pub week: u32,
    pub entry_1_id: u32,
    pub entry_1_team: String,
    pub entry_1_manager: String,
    pub entry_2_id: u32,
    pub entry_2_team: String,
    pub entry_2_manager: String,
}

pub fn fetch_h2h_matches(league_id: u32, entry_id: u32) -> Result<Vec<H2hMatchRow>> {
    let client = http_client()?;
    let mut out = Vec::new();
    let mut page = 1u32;
    loop {
        let url = format!(
            "{FPL_API_BASE}/leagues-h2h-matches/league/{league_id}/?page={page}&entry={entry_id}"
        );
        let body = fetch_json_cached(client, &url, MATCHES_MAX_AGE_SECS)
            .with_context(|| format!("h2h matches page {page} request failed"))?;
        let (rows, has_next) = parse_h2h_matches_page_json(&body)?;
        out.extend(rows);
        if !has_next || page >= MAX_H2H_PAGES {
            break;
        }
        page += 1;
    }
    Ok(out)
}

pub fn parse_h2h_matches_page_json(raw: &str) -> Result<(Vec<H2hMatchRow>, bool)> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid h2h matches json")?;
    let has_next = v.get("has_next").and_then(|x| x.as_bool()).unwrap_or(false);

    let mut rows = Vec::new();
    if let Some(arr) = v.get("results").and_then(|x| x.as_array()) {
        for m in arr {
            let Some(week) = m.get("event").and_then(|x| x.as_u64()) else {
                continue;
            };
            rows.push(H2hMatchRow {
                week: week as u32,
                entry_1_id: m
                    .get("entry_1_entry")
                    .and_then(|x| x.as_u64())
                    .unwrap_or(0) as u32,
                entry_1_team: str_field(m, "entry_1_name"),
                entry_1_manager: str_field(m, "entry_1_player_name"),
                entry_2_id: m
                    .get("entry_2_entry")
                    .and_then(|x| x.as_u64())
                    .unwrap_or(0) as u32,
                entry_2_team: str_field(m, "entry_2_name"),
                entry_2_manager: str_field(m, "entry_2_player_name"),
            });
        }
    }
    Ok((rows, has_next))
}

fn str_field(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(|x| x.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Pull the user's opponent for each week in the range out of the full
/// matchup list. Weeks without a matchup are simply absent.
pub fn opponents_for_range(
    rows: &[H2hMatchRow],
    entry_id: u32,
    weeks: RangeInclusive<u32>,
) -> HashMap<u32, Opponent> {
    let mut out = HashMap::new();
    for week in weeks {
        let Some(row) = rows
            .iter()
            .find(|m| m.week == week && (m.entry_1_id == entry_id || m.entry_2_id == entry_id))
        else {
            continue;
        };
        let opponent = if row.entry_1_id == entry_id {
            Opponent {
                entry_id: row.entry_2_id,
                team_name: row.entry_2_team.clone(),
                manager_name: row.entry_2_manager.clone(),
            }
        } else {
            Opponent {
                entry_id: row.entry_1_id,
                team_name: row.entry_1_team.clone(),
                manager_name: row.entry_1_manager.clone(),
            }
        };
        out.insert(week, opponent);
    }
    out
}

/// Doubling and blanking team lists for one week, derived from per-team
/// fixture counts: 2+ fixtures doubles, zero blanks.
pub fn fetch_week_signals(week: u32, teams: &HashMap<u32, String>) -> Result<(Vec<String>, Vec<String>)> {
    let client = http_client()?;
    let url = format!("{FPL_API_BASE}/fixtures/?event={week}");
    let body = fetch_json_cached(client, &url, FIXTURES_MAX_AGE_SECS)
        .with_context(|| format!("fixtures request failed for week {week}"))?;
    parse_week_signals_json(&body, teams)
}

pub fn parse_week_signals_json(
    raw: &str,
    teams: &HashMap<u32, String>,
) -> Result<(Vec<String>, Vec<String>)> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid fixtures json")?;

    let mut counts: HashMap<u32, u32> = teams.keys().map(|id| (*id, 0)).collect();
    if let Some(arr) = v.as_array() {
        for fixture in arr {
            for key in ["team_h", "team_a"] {
                if let Some(id) = fixture.get(key).and_then(|x| x.as_u64()) {
                    *counts.entry(id as u32).or_insert(0) += 1;
                }
            }
        }
    }

    let mut doubling = Vec::new();
    let mut blanking = Vec::new();
    for (id, count) in &counts {
        let Some(code) = teams.get(id) else {
            continue;
        };
        if *count >= 2 {
            doubling.push(code.clone());
        } else if *count == 0 {
            blanking.push(code.clone());
        }
    }
    doubling.sort_unstable();
    blanking.sort_unstable();
    Ok((doubling, blanking))
}

/// Build a plan's base squad from one week of picks, replicating the slot
/// list across every week of the window. The first 11 picks start.
pub fn squad_from_picks(
    picks: &GameweekPicks,
    pool: &PlayerPool,
    weeks: RangeInclusive<u32>,
) -> Squad {
    let mut squad = Squad::default();
    let mut slots = Vec::new();
    for pick in &picks.picks {
        let Some(player) = pool.player(pick.element) else {
            continue;
        };
        squad.players.push(player.clone());
        slots.push(PlayerSlot {
            player_id: player.id.clone(),
            role: if pick.is_starting() {
                Role::Xi
            } else {
                Role::Bench
            },
        });
    }
    for week in weeks {
        squad.slots.insert(week, slots.clone());
    }
    squad
}

pub fn opponent_squad_from_picks(picks: &GameweekPicks, pool: &PlayerPool) -> OpponentSquad {
    let players = picks
        .picks
        .iter()
        .filter_map(|pick| {
            pool.player(pick.element).map(|player| OpponentPlayer {
                player: player.clone(),
                is_captain: pick.is_captain,
                is_vice_captain: pick.is_vice_captain,
                is_starting: pick.is_starting(),
            })
        })
        .collect();
    OpponentSquad {
        players,
        source_week: picks.week,
    }
}
