use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use h2h_terminal::models::{
    HeadToHeadResult, Opponent, Plan, PlanEvent, RiskLevel, Role,
};
use h2h_terminal::state::{
    apply_delta, new_plan_id, ordered_slots, plan_window, AppState, ProviderCommand, Screen,
};
use h2h_terminal::{gameweeks, h2h, plan_store, projection, seed, state};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        let mut state = AppState::new(plan_store::load_user());
        if state.user.team_id.is_empty() {
            if let Ok(team_id) = std::env::var("FPL_TEAM_ID") {
                state.setup_input = team_id.trim().to_string();
            }
        }
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            self.on_search_key(key);
            return;
        }
        match self.state.screen {
            Screen::Setup => self.on_setup_key(key),
            Screen::Planner => self.on_planner_key(key),
            Screen::H2h => self.on_h2h_key(key),
        }
    }

    fn on_setup_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('d') => {
                // Demo mode: a seeded plan, no network needed.
                let (start, end) = plan_window(gameweeks::DEFAULT_WEEKS[0]);
                let plan = seed::demo_plan(new_plan_id(), start, end);
                if self.state.add_plan(plan) {
                    self.state.user.setup_complete = true;
                    self.state.screen = Screen::Planner;
                    self.state.push_log("[INFO] Demo plan loaded");
                }
            }
            KeyCode::Char('n') if !self.state.user.team_name.is_empty() => self.create_plan(),
            KeyCode::Char('r') if !self.state.user.team_name.is_empty() => {
                self.state.reset_user();
                self.state.push_log("[INFO] Team unlinked; plans cleared");
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.state.setup_input.len() < 10 {
                    self.state.setup_input.push(c);
                }
            }
            KeyCode::Backspace => {
                self.state.setup_input.pop();
            }
            KeyCode::Enter => self.link_team(),
            _ => {}
        }
    }

    fn on_planner_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Tab | KeyCode::Char('2') => self.state.screen = Screen::H2h,
            KeyCode::Char('h') | KeyCode::Left => self.state.select_prev_week(),
            KeyCode::Char('l') | KeyCode::Right => self.state.select_next_week(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next_row(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev_row(),
            KeyCode::Char('/') => {
                if self.state.player_pool.is_empty() {
                    self.state
                        .push_log("[INFO] Player pool not loaded; search unavailable");
                } else {
                    self.state.search_active = true;
                    self.state.search_input.clear();
                }
            }
            KeyCode::Char('x') => self.transfer_out_selected(),
            KeyCode::Char('b') => {
                if let (Some(week), Some(id)) =
                    (self.state.selected_week(), self.state.selected_player_id())
                {
                    self.state.toggle_player_role(week, &id);
                }
            }
            KeyCode::Char('c') => self.set_captain_selected(),
            KeyCode::Char('C') => {
                if let Some(week) = self.state.selected_week() {
                    self.state.cycle_chip(week);
                }
            }
            KeyCode::Char('y') => {
                if let Some(week) = self.state.selected_week() {
                    self.state.copy_slots_from_previous(week);
                    self.state
                        .push_log(format!("[INFO] Week {week} lineup copied forward"));
                }
            }
            KeyCode::Char('D') => self.toggle_override_selected(false),
            KeyCode::Char('B') => self.toggle_override_selected(true),
            KeyCode::Char('u') => {
                if let Some(week) = self.state.selected_week() {
                    self.state.remove_plan_events(week, |_| true);
                    self.state.set_captain(week, None);
                    self.state
                        .push_log(format!("[INFO] Week {week} events cleared"));
                }
            }
            KeyCode::Char('r') => {
                self.state.reset_plan_events();
                self.state.push_log("[INFO] Plan events cleared");
            }
            KeyCode::Char('n') => self.create_plan(),
            KeyCode::Char('p') => self.state.cycle_active_plan(),
            KeyCode::Char('X') => {
                if let Some(id) = self.state.active_plan().map(|p| p.id.clone()) {
                    self.state.delete_plan(&id);
                    self.state.push_log("[INFO] Plan deleted");
                    if self.state.active_plan().is_none() {
                        self.state.screen = Screen::Setup;
                    }
                }
            }
            KeyCode::Char('g') => self.request_plan_data(),
            _ => {}
        }
    }

    fn on_h2h_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Tab | KeyCode::Char('1') | KeyCode::Esc => {
                self.state.screen = Screen::Planner
            }
            KeyCode::Char('h') | KeyCode::Left => self.state.select_prev_week(),
            KeyCode::Char('l') | KeyCode::Right => self.state.select_next_week(),
            KeyCode::Char('g') => self.request_opponent_squads(),
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.search_active = false;
                self.state.search_input.clear();
            }
            KeyCode::Backspace => {
                self.state.search_input.pop();
            }
            KeyCode::Enter => self.transfer_in_hit(0),
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                self.transfer_in_hit(c as usize - '1' as usize);
            }
            KeyCode::Char(c) => self.state.search_input.push(c),
            _ => {}
        }
    }

    fn transfer_in_hit(&mut self, index: usize) {
        let Some(week) = self.state.selected_week() else {
            return;
        };
        let query = self.state.search_input.clone();
        let hit = self
            .state
            .search_player_pool(week, &query)
            .get(index)
            .cloned()
            .cloned();
        let Some(player) = hit else {
            return;
        };
        let name = player.name.clone();
        self.state.add_plan_event(PlanEvent::TransferIn { week, player });
        self.state.search_active = false;
        self.state.search_input.clear();
        self.state
            .push_log(format!("[INFO] {name} in from week {week}"));
    }

    fn transfer_out_selected(&mut self) {
        let (Some(week), Some(id)) = (self.state.selected_week(), self.state.selected_player_id())
        else {
            return;
        };
        let name = self
            .state
            .squad_for_week(week)
            .and_then(|s| s.player(&id).map(|p| p.name.clone()))
            .unwrap_or_else(|| id.clone());
        self.state
            .add_plan_event(PlanEvent::TransferOut { week, player_id: id });
        self.state
            .push_log(format!("[INFO] {name} out from week {week}"));
    }

    fn set_captain_selected(&mut self) {
        let (Some(week), Some(id)) = (self.state.selected_week(), self.state.selected_player_id())
        else {
            return;
        };
        if self.state.captain_for_week(week).as_deref() == Some(id.as_str()) {
            self.state.set_captain(week, None);
        } else {
            self.state.set_captain(week, Some(id));
        }
    }

    fn toggle_override_selected(&mut self, blanking: bool) {
        let (Some(week), Some(id)) = (self.state.selected_week(), self.state.selected_player_id())
        else {
            return;
        };
        let Some(team) = self
            .state
            .squad_for_week(week)
            .and_then(|s| s.player(&id).map(|p| p.team.clone()))
        else {
            return;
        };
        if blanking {
            self.state.toggle_manual_blanking(week, &team);
            self.state
                .push_log(format!("[INFO] Blank override toggled: {team} week {week}"));
        } else {
            self.state.toggle_manual_doubling(week, &team);
            self.state
                .push_log(format!("[INFO] Double override toggled: {team} week {week}"));
        }
    }

    fn link_team(&mut self) {
        let team_id = self.state.setup_input.trim().to_string();
        if team_id.is_empty() {
            self.state.push_log("[INFO] Enter an FPL team id first");
            return;
        }
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[WARN] Network provider unavailable");
            return;
        };
        self.state.setup_loading = true;
        let _ = tx.send(ProviderCommand::FetchEntry {
            team_id: team_id.clone(),
        });
        let _ = tx.send(ProviderCommand::FetchPlayerPool);
        self.state
            .push_log(format!("[INFO] Looking up team {team_id}"));
    }

    fn create_plan(&mut self) {
        let start = self
            .state
            .current_week
            .map(|w| (w + 1).min(38))
            .unwrap_or(gameweeks::DEFAULT_WEEKS[0]);
        let (start, end) = plan_window(start);
        let env_league = std::env::var("H2H_LEAGUE_ID")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok());
        let (league_id, league_name) = env_league
            .and_then(|id| {
                self.state
                    .user
                    .leagues
                    .iter()
                    .find(|l| l.id == id)
                    .map(|l| (l.id, l.name.clone()))
                    .or(Some((id, format!("League {id}"))))
            })
            .or_else(|| {
                self.state
                    .user
                    .leagues
                    .first()
                    .map(|l| (l.id, l.name.clone()))
            })
            .unwrap_or((0, "No league".to_string()));
        let name = format!("Plan {}", self.state.user.plans.len() + 1);
        let plan = Plan::empty(new_plan_id(), name, league_id, league_name, start, end);
        if !self.state.add_plan(plan) {
            self.state.push_log("[WARN] Plan limit reached; delete one first");
            return;
        }
        self.state.user.setup_complete = true;
        self.state.screen = Screen::Planner;
        self.request_plan_data();
    }

    /// Kick off every fetch the active plan needs: base squad, matchups,
    /// and fixture signals for the window.
    fn request_plan_data(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[WARN] Network provider unavailable");
            return;
        };
        let Some(plan) = self.state.active_plan() else {
            return;
        };
        let team_id = self.state.user.team_id.clone();
        let plan_id = plan.id.clone();
        let (start_week, end_week) = (plan.start_week, plan.end_week);
        let league_id = plan.league_id;

        let _ = tx.send(ProviderCommand::FetchPlayerPool);
        let _ = tx.send(ProviderCommand::FetchWeekSignals {
            start_week,
            end_week,
        });
        if team_id.is_empty() {
            self.state
                .push_log("[INFO] No team linked; squad import skipped");
            return;
        }
        self.state.squad_loading = true;
        let _ = tx.send(ProviderCommand::FetchBaseSquad {
            plan_id: plan_id.clone(),
            team_id: team_id.clone(),
            start_week,
            end_week,
        });
        if league_id != 0 {
            if let Ok(entry_id) = team_id.parse::<u32>() {
                self.state.opponents_loading = true;
                let _ = tx.send(ProviderCommand::FetchOpponents {
                    plan_id,
                    league_id,
                    entry_id,
                    start_week,
                    end_week,
                });
            }
        }
    }

    /// Fetch picks for every opponent already known to the plan.
    fn request_opponent_squads(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[WARN] Network provider unavailable");
            return;
        };
        let Some(plan) = self.state.active_plan() else {
            return;
        };
        let plan_id = plan.id.clone();
        let requests: Vec<(u32, u32)> = plan
            .opponents
            .iter()
            .filter(|(_, opp)| opp.entry_id != 0)
            .map(|(week, opp)| (*week, opp.entry_id))
            .collect();
        if requests.is_empty() {
            self.state.push_log("[INFO] No opponents to fetch picks for");
            return;
        }
        for (week, entry_id) in requests {
            let _ = tx.send(ProviderCommand::FetchOpponentSquad {
                plan_id: plan_id.clone(),
                entry_id,
                week,
            });
        }
        self.state.push_log("[INFO] Opponent pick fetches queued");
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    h2h_terminal::provider::spawn(cmd_rx, tx);

    let mut app = App::new(Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = plan_store::save_user(&app.state.user) {
        eprintln!("failed to save plans: {err:#}");
    }
    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Setup => render_setup(frame, chunks[1], &app.state),
        Screen::Planner => render_planner(frame, chunks[1], &app.state),
        Screen::H2h => render_h2h(frame, chunks[1], &app.state),
    }

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let screen = match state.screen {
        Screen::Setup => "SETUP",
        Screen::Planner => "PLANNER",
        Screen::H2h => "H2H RISK",
    };
    let team = if state.user.team_name.is_empty() {
        "No team linked".to_string()
    } else {
        state.user.team_name.clone()
    };
    let plan = state
        .active_plan()
        .map(|p| format!("{} (GW{}-{})", p.name, p.start_week, p.end_week))
        .unwrap_or_else(|| "No plan".to_string());
    format!("H2H TERMINAL | {screen} | {team} | {plan}")
}

fn footer_text(state: &AppState) -> String {
    if state.search_active {
        return format!(
            "Search: {}_ | 1-9/Enter Pick | Esc Cancel",
            state.search_input
        );
    }
    match state.screen {
        Screen::Setup => {
            "Digits Team id | Enter Link | n New plan | d Demo | r Unlink | ? Help | q Quit"
                .to_string()
        }
        Screen::Planner => {
            "Tab H2H | h/l Week | j/k Row | / In | x Out | b XI/Bench | c Captain | C Chip | y Copy | u/r Clear | D/B Override | n/p/X Plans | g Fetch | ? Help | q Quit"
                .to_string()
        }
        Screen::H2h => "Tab Planner | h/l Week | g Opponent picks | ? Help | q Quit".to_string(),
    }
}

fn render_setup(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(6)])
        .split(area);

    let mut lines = vec![
        "Link your FPL team to plan head-to-head matchups.".to_string(),
        String::new(),
        format!("Team id: {}_", state.setup_input),
        String::new(),
    ];
    if state.setup_loading {
        lines.push("Looking up team...".to_string());
    } else if !state.user.team_name.is_empty() {
        lines.push(format!(
            "Linked: {} ({})",
            state.user.team_name, state.user.manager_name
        ));
        if state.user.leagues.is_empty() {
            lines.push("No H2H leagues on this entry.".to_string());
        } else {
            lines.push("H2H leagues:".to_string());
            for league in state.user.leagues.iter().take(5) {
                let rank = league
                    .entry_rank
                    .map(|r| format!(" (rank {r})"))
                    .unwrap_or_default();
                lines.push(format!("  {}{rank}", league.name));
            }
        }
        lines.push(String::new());
        lines.push("Press n to start a plan.".to_string());
    } else {
        lines.push("Press d for a demo plan without linking.".to_string());
    }

    let body = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("Get Started").borders(Borders::ALL));
    frame.render_widget(body, rows[0]);

    render_console(frame, rows[1], state);
}

fn render_planner(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(6)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(20),
            Constraint::Min(34),
            Constraint::Length(32),
        ])
        .split(rows[0]);

    let weeks = Paragraph::new(week_strip_text(state))
        .block(Block::default().title("Weeks").borders(Borders::ALL));
    frame.render_widget(weeks, columns[0]);

    render_squad_table(frame, columns[1], state);

    let summary = Paragraph::new(summary_text(state))
        .block(Block::default().title("Week Summary").borders(Borders::ALL));
    frame.render_widget(summary, columns[2]);

    render_console(frame, rows[1], state);

    if state.search_active {
        render_search_overlay(frame, frame.size(), state);
    }
}

fn week_strip_text(state: &AppState) -> String {
    let Some(plan) = state.active_plan() else {
        return "No plan".to_string();
    };
    let selected = state.selected_week();
    let mut lines = Vec::new();
    for week in plan.weeks() {
        let prefix = if selected == Some(week) { "> " } else { "  " };
        let chips: Vec<&str> = state
            .chips_for_week(week)
            .into_iter()
            .map(|c| c.code())
            .collect();
        let chip = if chips.is_empty() {
            String::new()
        } else {
            format!(" [{}]", chips.join("+"))
        };
        let detected = state.detected_doubling_for(week);
        let doubles = gameweeks::doubling_teams(week, Some(plan), detected).len();
        let marker = if doubles > 0 {
            format!(" DGW x{doubles}")
        } else {
            String::new()
        };
        let opponent = plan
            .opponents
            .get(&week)
            .map(|o| format!(" vs {}", truncate(&o.team_name, 8)))
            .unwrap_or_default();
        lines.push(format!("{prefix}GW{week}{chip}{marker}{opponent}"));
    }
    lines.join("\n")
}

fn render_squad_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Squad").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let Some(week) = state.selected_week() else {
        frame.render_widget(Paragraph::new("No plan selected"), inner);
        return;
    };
    let Some(squad) = state.squad_for_week(week) else {
        return;
    };
    let rows = ordered_slots(&squad, week);
    if rows.is_empty() {
        frame.render_widget(
            Paragraph::new("No squad for this week; press g to import picks"),
            inner,
        );
        return;
    }

    let captain = state.captain_for_week(week);
    let plan = state.active_plan();
    let detected = state.detected_doubling_for(week).map(<[String]>::to_vec);
    let visible = inner.height as usize;

    for (i, slot) in rows.iter().take(visible).enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + i as u16,
            width: inner.width,
            height: 1,
        };
        let selected = i == state.row_cursor;
        let style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else if slot.role == Role::Bench {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let Some(player) = squad.player(&slot.player_id) else {
            continue;
        };
        let cap = if captain.as_deref() == Some(player.id.as_str()) {
            " (C)"
        } else {
            ""
        };
        let mut flags = String::new();
        if gameweeks::is_team_doubling(&player.team, week, plan, detected.as_deref()) {
            flags.push_str(" DGW");
        }
        if gameweeks::is_team_blanking(&player.team, week, plan, detected.as_deref()) {
            flags.push_str(" BLANK");
        }
        let line = format!(
            "{:<5} {:<4} {:<18} {:<4}{}{}",
            slot.role.label(),
            player.position.label(),
            truncate(&player.name, 18),
            player.team,
            cap,
            flags
        );
        frame.render_widget(Paragraph::new(line).style(style), row_area);
    }
}

fn summary_text(state: &AppState) -> String {
    let Some(week) = state.selected_week() else {
        return "No plan selected".to_string();
    };
    let Some(summary) = state.summary_for_week(week) else {
        return "No plan selected".to_string();
    };
    let plan = state.active_plan();

    let mut lines = vec![
        format!("GW{week}"),
        format!(
            "XI {} | Bench {} | Counted {}",
            summary.xi_count, summary.bench_count, summary.total_players
        ),
    ];
    let shape: Vec<String> = h2h_terminal::models::Position::ALL
        .iter()
        .map(|p| {
            format!(
                "{} {}",
                p.label(),
                summary.position_counts.get(p).copied().unwrap_or(0)
            )
        })
        .collect();
    lines.push(shape.join(" / "));

    if let Some(plan) = plan {
        let chips: Vec<&str> = state
            .chips_for_week(week)
            .into_iter()
            .map(|c| c.label())
            .collect();
        if !chips.is_empty() {
            lines.push(format!("Chip: {}", chips.join(", ")));
        }
        let cost = projection::transfer_cost(&plan.events, week, 1);
        if cost > 0 {
            lines.push(format!("Transfer cost: -{cost}"));
        }
    }

    lines.push(String::new());
    if summary.doubling_players.is_empty() {
        lines.push("No doublers counted".to_string());
    } else {
        lines.push(format!("Doublers ({}):", summary.doubling_players.len()));
        for player in summary.doubling_players.iter().take(8) {
            lines.push(format!("  {} ({})", truncate(&player.name, 16), player.team));
        }
    }

    if let Some(blanks) = state.detected_blanking_for(week) {
        if !blanks.is_empty() {
            lines.push(format!("Blank teams: {}", blanks.join(", ")));
        }
    }

    let fixtures = gameweeks::fixtures_for_week(week);
    if !fixtures.is_empty() {
        lines.push(String::new());
        lines.push("Fixtures:".to_string());
        for f in fixtures.iter().take(12) {
            let marker = if f.is_double { " (2nd)" } else { "" };
            lines.push(format!("  {} v {}{marker}", f.home, f.away));
        }
    }

    lines.join("\n")
}

/// Risk inputs for a week: my counted roster and captain against the
/// opponent's starters and captain.
fn h2h_for_week(state: &AppState, week: u32) -> Option<(HeadToHeadResult, Opponent)> {
    let plan = state.active_plan()?;
    let opponent = plan.opponents.get(&week).cloned()?;
    let opponent_squad = plan.opponent_squads.get(&week)?;

    let squad = state.squad_for_week(week)?;
    let include_bench = projection::is_bench_boost_active(&plan.events, week);
    let mine: Vec<_> = squad
        .slots_for_week(week)
        .iter()
        .filter(|slot| include_bench || slot.role == Role::Xi)
        .filter_map(|slot| squad.player(&slot.player_id).cloned())
        .collect();
    let theirs: Vec<_> = opponent_squad
        .players
        .iter()
        .filter(|p| p.is_starting)
        .map(|p| p.player.clone())
        .collect();

    let my_captain = state.captain_for_week(week);
    let their_captain = opponent_squad.captain_id().map(str::to_string);
    let result = h2h::compute_head_to_head_risk(
        &mine,
        &theirs,
        week,
        my_captain.as_deref(),
        their_captain.as_deref(),
        Some(plan),
        state.detected_doubling_for(week),
    );
    Some((result, opponent))
}

fn render_h2h(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(6)])
        .split(area);

    let Some(week) = state.selected_week() else {
        frame.render_widget(Paragraph::new("No plan selected"), rows[0]);
        render_console(frame, rows[1], state);
        return;
    };

    let Some((result, opponent)) = h2h_for_week(state, week) else {
        let body = Paragraph::new(format!(
            "GW{week}: no opponent data yet.\n\nPress g to fetch matchups and opponent picks."
        ))
        .block(Block::default().title("Head-to-Head").borders(Borders::ALL));
        frame.render_widget(body, rows[0]);
        render_console(frame, rows[1], state);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(rows[0]);

    let verdict = Paragraph::new(verdict_text(state, week, &result, &opponent)).block(
        Block::default()
            .title("Verdict")
            .borders(Borders::ALL)
            .border_style(risk_style(result.risk)),
    );
    frame.render_widget(verdict, columns[0]);

    let mine = Paragraph::new(differential_text(&result.my_differentials))
        .block(Block::default().title("My Differentials").borders(Borders::ALL));
    frame.render_widget(mine, columns[1]);

    let theirs = Paragraph::new(differential_text(&result.their_differentials)).block(
        Block::default()
            .title("Their Differentials")
            .borders(Borders::ALL),
    );
    frame.render_widget(theirs, columns[2]);

    render_console(frame, rows[1], state);
}

fn verdict_text(
    state: &AppState,
    week: u32,
    result: &HeadToHeadResult,
    opponent: &Opponent,
) -> String {
    let mut lines = vec![
        format!("GW{week} vs {}", opponent.team_name),
        format!("Manager: {}", opponent.manager_name),
        String::new(),
        format!("Risk: {}", result.risk.label()),
        format!("Overlap: {}%", result.overlap_percentage),
        format!(
            "Differentials: {} vs {}",
            result.my_differentials.len(),
            result.their_differentials.len()
        ),
        format!(
            "My captain doubles: {}",
            if result.my_captain_doubling { "yes" } else { "no" }
        ),
        format!(
            "Their captain doubles: {}",
            if result.their_captain_doubling { "yes" } else { "no" }
        ),
    ];
    if let Some(plan) = state.active_plan() {
        if let Some(squad) = plan.opponent_squads.get(&week) {
            if squad.source_week != week {
                lines.push(String::new());
                lines.push(format!("Opponent picks from GW{}", squad.source_week));
            }
        }
    }
    lines.join("\n")
}

fn differential_text(players: &[h2h_terminal::models::Player]) -> String {
    if players.is_empty() {
        return "None".to_string();
    }
    players
        .iter()
        .map(|p| format!("{} {} ({})", p.position.label(), truncate(&p.name, 16), p.team))
        .collect::<Vec<_>>()
        .join("\n")
}

fn risk_style(risk: RiskLevel) -> Style {
    match risk {
        RiskLevel::Low => Style::default().fg(Color::Green),
        RiskLevel::Medium => Style::default().fg(Color::Yellow),
        RiskLevel::High => Style::default().fg(Color::Red),
    }
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = if state.logs.is_empty() {
        "No activity yet".to_string()
    } else {
        let take = (area.height.saturating_sub(2)) as usize;
        state
            .logs
            .iter()
            .rev()
            .take(take.max(1))
            .cloned()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join("\n")
    };
    let console =
        Paragraph::new(text).block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, area);
}

fn render_search_overlay(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup_area = centered_rect(50, 60, area);
    frame.render_widget(Clear, popup_area);

    let Some(week) = state.selected_week() else {
        return;
    };
    let hits = state.search_player_pool(week, &state.search_input);
    let mut lines = vec![format!("Transfer in (GW{week}): {}_", state.search_input), String::new()];
    if hits.is_empty() {
        lines.push("Type a player name or team code".to_string());
    }
    for (i, player) in hits.iter().enumerate().take(9) {
        lines.push(format!(
            "{} {} {} ({})",
            i + 1,
            player.position.label(),
            truncate(&player.name, 20),
            player.team
        ));
    }

    let popup = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("Search").borders(Borders::ALL));
    frame.render_widget(popup, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "H2H Terminal - Help",
        "",
        "Global:",
        "  Tab          Planner <-> H2H",
        "  h/l or ←/→   Switch week",
        "  ?            Toggle help",
        "  q            Quit (plans are saved)",
        "",
        "Planner:",
        "  j/k or ↑/↓   Move in squad",
        "  /            Transfer in (search)",
        "  x            Transfer out selected",
        "  b            Toggle XI/Bench",
        "  c            Set/unset captain",
        "  C            Cycle chip for week",
        "  y            Copy lineup from previous week",
        "  u / r        Clear week events / all events",
        "  D / B        Toggle double/blank override",
        "  n / p / X    New / next / delete plan",
        "  g            Fetch squad, matchups, fixtures",
        "",
        "H2H:",
        "  g            Fetch opponent picks",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max.saturating_sub(1)).chain(['…']).collect()
}
