//! Main application state and TUI event loop for Deckboard.
//!
//! [`App`] owns the theme, view mode, the interactive selection state
//! (player filter, sort key, unplayed toggle), and the last received
//! dashboard snapshot. Derived views are plain pure-function recomputes
//! from `{snapshot, selection}` whenever either changes; no framework
//! dependency tracking is involved.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::Text,
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::mpsc;

use board_runtime::data::aggregator::{LeagueAggregator, PlayerFilter, SortKey};
use board_runtime::enrichment::colors_by_commander;
use board_runtime::orchestrator::DashboardSnapshot;

use crate::components::header::Header;
use crate::summary_view::{self, PlayerBarData, SummaryViewData};
use crate::table_view::{self, DeckRowData, DeckTableTotals};
use crate::themes::Theme;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    /// Live dashboard: header, summary cards, chart, and deck table.
    Dashboard,
    /// Static deck table only.
    Table,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the Deckboard TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Current view mode.
    pub view_mode: ViewMode,
    /// Index into the filter cycle: 0 is "All", `i` is `players[i - 1]`.
    pub filter_index: usize,
    /// Active sort column.
    pub sort_key: SortKey,
    /// Whether never-played decks are shown.
    pub include_unplayed: bool,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Most recent dashboard snapshot, `None` until the first data arrives.
    pub snapshot: Option<DashboardSnapshot>,
}

impl App {
    /// Construct a new application with the given configuration.
    pub fn new(
        theme_name: &str,
        view_mode: ViewMode,
        sort_key: SortKey,
        include_unplayed: bool,
    ) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view_mode,
            filter_index: 0,
            sort_key,
            include_unplayed,
            should_quit: false,
            snapshot: None,
        }
    }

    // ── Public event loops ────────────────────────────────────────────────────

    /// Run the dashboard TUI, receiving snapshots from `rx`.
    ///
    /// Uses `crossterm::event::poll` (synchronous, with a 250 ms timeout) so
    /// that the terminal event loop stays on the current thread while data
    /// updates arrive on the async channel via `try_recv`.
    ///
    /// Keys: `p`/`P` cycle the player filter, `s` cycles the sort column,
    /// `u` toggles unplayed decks, `r` requests a refresh, `q` / `Ctrl+C`
    /// exits.
    pub async fn run_dashboard(
        mut self,
        mut rx: mpsc::Receiver<DashboardSnapshot>,
        refresh_tx: mpsc::Sender<()>,
    ) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard events with a short timeout so we don't block.
            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            break Ok(());
                        }
                        KeyCode::Char('q') | KeyCode::Char('Q') => break Ok(()),
                        KeyCode::Char('p') => self.cycle_filter(1),
                        KeyCode::Char('P') => self.cycle_filter(-1),
                        KeyCode::Char('s') | KeyCode::Char('S') => {
                            self.sort_key = self.sort_key.next();
                        }
                        KeyCode::Char('u') | KeyCode::Char('U') => {
                            self.include_unplayed = !self.include_unplayed;
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            // Best-effort: a full trigger queue means a
                            // refresh is already pending.
                            let _ = refresh_tx.try_send(());
                        }
                        _ => {}
                    }
                }
            }

            // Drain any pending snapshot updates (non-blocking).
            loop {
                match rx.try_recv() {
                    Ok(snapshot) => self.update_snapshot(snapshot),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Run a static deck-table view, then wait for `q` / `Ctrl+C`.
    pub async fn run_table(
        self,
        rows: Vec<DeckRowData>,
        totals: DeckTableTotals,
    ) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        loop {
            terminal.draw(|frame| {
                let area = frame.area();
                if rows.is_empty() {
                    table_view::render_no_data(frame, area, &self.theme);
                } else {
                    table_view::render_deck_table(frame, area, "Decks", &rows, &totals, &self.theme);
                }
            })?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            break;
                        }
                        KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        _ => {}
                    }
                }
            }
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    // ── Selection state ───────────────────────────────────────────────────────

    /// Store a fresh snapshot, clamping the filter index if the player list
    /// shrank across a reload.
    pub fn update_snapshot(&mut self, snapshot: DashboardSnapshot) {
        let options = snapshot.report.league.players.len() + 1;
        if self.filter_index >= options {
            self.filter_index = 0;
        }
        self.snapshot = Some(snapshot);
    }

    /// Advance the player filter by `step` (wrapping), over
    /// `All → players[0] → players[1] → …`.
    pub fn cycle_filter(&mut self, step: i64) {
        let options = self
            .snapshot
            .as_ref()
            .map(|s| s.report.league.players.len() + 1)
            .unwrap_or(1) as i64;
        self.filter_index = (self.filter_index as i64 + step).rem_euclid(options) as usize;
    }

    /// The active player filter derived from the filter index.
    pub fn player_filter(&self) -> PlayerFilter {
        if self.filter_index == 0 {
            return PlayerFilter::All;
        }
        self.snapshot
            .as_ref()
            .and_then(|s| s.report.league.players.get(self.filter_index - 1))
            .map(|name| PlayerFilter::Name(name.clone()))
            .unwrap_or(PlayerFilter::All)
    }

    // ── Derived views ─────────────────────────────────────────────────────────

    /// Recompute the visible deck rows and totals from the current snapshot
    /// and selection.
    pub fn visible_rows(&self) -> (Vec<DeckRowData>, DeckTableTotals) {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return (Vec::new(), DeckTableTotals::from_rows(&[]));
        };

        let filter = self.player_filter();
        let decks = LeagueAggregator::filter_and_sort(
            &snapshot.report.league.decks,
            &filter,
            self.include_unplayed,
            self.sort_key,
        );

        let rows: Vec<DeckRowData> = decks
            .iter()
            .map(|deck| DeckRowData::from_deck(deck, &snapshot.art))
            .collect();
        let totals = DeckTableTotals::from_rows(&rows);
        (rows, totals)
    }

    /// Recompute the summary view data from the current snapshot.
    pub fn summary_data(&self) -> SummaryViewData {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return SummaryViewData::default();
        };
        let report = &snapshot.report;

        // The color tally depends on the enrichment cache, so it is
        // recomputed here rather than carried in the report.
        let colors = colors_by_commander(&snapshot.art);
        let most_played_color =
            LeagueAggregator::most_played_color(&report.league.decks, &colors).map(
                |(code, tally)| {
                    let name = board_core::colors::Colors::display_name(&code).unwrap_or("Unknown");
                    (name.to_string(), tally)
                },
            );

        SummaryViewData {
            total_decks: report.league.decks.len(),
            total_games: report.total_games,
            never_played: report.highlights.never_played,
            sessions: report.league.sessions.len(),
            most_wins: report
                .highlights
                .most_wins
                .as_ref()
                .map(|t| (t.player.clone(), t.total_wins)),
            most_games: report
                .highlights
                .most_games
                .as_ref()
                .map(|t| (t.player.clone(), t.total_games)),
            most_popular_theme: report.highlights.most_popular_theme.clone(),
            most_played_color,
            most_dominant: report.highlights.most_dominant.clone(),
            last_session: report
                .league
                .sessions
                .iter()
                .filter_map(|s| s.date)
                .max()
                .map(|date| date.format("%Y-%m-%d").to_string()),
            breakdown: report
                .breakdown
                .iter()
                .map(|t| PlayerBarData {
                    player: t.player.clone(),
                    games: t.total_games,
                    wins: t.total_wins,
                })
                .collect(),
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let Some(snapshot) = self.snapshot.as_ref() else {
            table_view::render_no_data(frame, area, &self.theme);
            return;
        };

        if snapshot.report.league.decks.is_empty() {
            table_view::render_no_data(frame, area, &self.theme);
            return;
        }

        let summary = self.summary_data();
        let filter = self.player_filter();
        let header = Header::new(
            filter.label(),
            self.sort_key.label(),
            self.include_unplayed,
            &self.theme,
        );
        let header_lines = header.to_lines();
        let header_height = header_lines.len() as u16;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_height),
                Constraint::Length(summary.height()),
                Constraint::Min(4),
            ])
            .split(area);

        frame.render_widget(Paragraph::new(Text::from(header_lines)), chunks[0]);
        summary_view::render_summary(frame, chunks[1], &summary, &self.theme);

        let (rows, totals) = self.visible_rows();
        let title = format!("Decks: {} by {}", filter.label(), self.sort_key.label());
        table_view::render_deck_table(frame, chunks[2], &title, &rows, &totals, &self.theme);
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
