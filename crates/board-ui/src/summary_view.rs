//! Summary view for the Deckboard TUI.
//!
//! Renders the league-wide stat cards (totals and superlatives) and a
//! per-player games chart as hand-built lines inside a single paragraph.

use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use board_core::formatting;

use crate::themes::Theme;

/// Width of the per-player bar portion in terminal columns.
const BAR_WIDTH: usize = 30;

/// Display width the stat labels are padded to.
const LABEL_WIDTH: usize = 22;

/// One bar of the per-player chart.
#[derive(Debug, Clone)]
pub struct PlayerBarData {
    pub player: String,
    pub games: u32,
    pub wins: u32,
}

/// All data required to render the summary view.
#[derive(Debug, Clone, Default)]
pub struct SummaryViewData {
    /// Normalized deck count.
    pub total_decks: usize,
    /// Sum of game counts across all decks.
    pub total_games: u32,
    /// Count of decks with no recorded games.
    pub never_played: usize,
    /// Recorded session count (workbook sources only).
    pub sessions: usize,
    /// Player with the most wins, as `(name, wins)`.
    pub most_wins: Option<(String, u32)>,
    /// Player with the most games, as `(name, games)`.
    pub most_games: Option<(String, u32)>,
    /// Most popular theme tag, as `(theme, count)`.
    pub most_popular_theme: Option<(String, u32)>,
    /// Most played color, as `(display name, weighted tally)`.
    pub most_played_color: Option<(String, u32)>,
    /// Most dominant deck, as `(deck id, win rate)`.
    pub most_dominant: Option<(String, u32)>,
    /// Formatted date of the most recent session with a known date.
    pub last_session: Option<String>,
    /// Per-player bars, in player order.
    pub breakdown: Vec<PlayerBarData>,
}

impl SummaryViewData {
    /// Number of terminal rows the summary occupies when rendered.
    pub fn height(&self) -> u16 {
        // Stat rows + blank + chart title + one bar per player.
        (SUMMARY_STAT_ROWS + 2 + self.breakdown.len()) as u16
    }
}

/// Number of fixed stat rows emitted by [`build_summary_lines`].
const SUMMARY_STAT_ROWS: usize = 8;

/// Render the summary view into `area`.
pub fn render_summary(frame: &mut Frame, area: Rect, data: &SummaryViewData, theme: &Theme) {
    let lines = build_summary_lines(data, theme);
    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

/// Build the full `Vec<Line>` for the summary view (extracted for
/// testability).
pub fn build_summary_lines<'a>(data: &SummaryViewData, theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::with_capacity(SUMMARY_STAT_ROWS + 2 + data.breakdown.len());

    lines.push(stat_row(
        "🃏",
        "Decks:",
        format!(
            "{} ({} never played)",
            formatting::format_count(data.total_decks as u64),
            data.never_played
        ),
        theme,
    ));

    let games_value = if data.sessions > 0 {
        format!(
            "{} across {} sessions",
            formatting::format_count(data.total_games as u64),
            data.sessions
        )
    } else {
        formatting::format_count(data.total_games as u64)
    };
    lines.push(stat_row("🎲", "Games Recorded:", games_value, theme));

    lines.push(stat_row(
        "🏆",
        "Most Wins:",
        data.most_wins
            .as_ref()
            .map(|(player, wins)| format!("{player} ({wins})"))
            .unwrap_or_else(|| "-".to_string()),
        theme,
    ));

    lines.push(stat_row(
        "🔥",
        "Most Active:",
        data.most_games
            .as_ref()
            .map(|(player, games)| format!("{player} ({games} games)"))
            .unwrap_or_else(|| "-".to_string()),
        theme,
    ));

    lines.push(stat_row(
        "🎨",
        "Top Color:",
        data.most_played_color
            .as_ref()
            .map(|(name, tally)| format!("{name} ({tally})"))
            .unwrap_or_else(|| "-".to_string()),
        theme,
    ));

    lines.push(stat_row(
        "🏷",
        "Top Theme:",
        data.most_popular_theme
            .as_ref()
            .map(|(theme_name, count)| format!("{theme_name} ({count})"))
            .unwrap_or_else(|| "-".to_string()),
        theme,
    ));

    lines.push(stat_row(
        "💪",
        "Most Dominant:",
        data.most_dominant
            .as_ref()
            .map(|(id, rate)| format!("{id} ({})", formatting::format_percent(*rate)))
            .unwrap_or_else(|| "-".to_string()),
        theme,
    ));

    lines.push(stat_row(
        "📅",
        "Last Session:",
        data.last_session.clone().unwrap_or_else(|| "-".to_string()),
        theme,
    ));

    // ── Per-player chart ──────────────────────────────────────────────────────
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Games per Player", theme.bold)));

    let max_games = data.breakdown.iter().map(|b| b.games).max().unwrap_or(0);
    for bar in &data.breakdown {
        lines.push(player_bar(bar, max_games, theme));
    }

    lines
}

// ── Row builders ──────────────────────────────────────────────────────────────

/// Pad an emoji + label to [`LABEL_WIDTH`] display columns.
fn pad_label(emoji: &str, label: &str) -> String {
    // Most emoji occupy 2 display columns, the space after them 1.
    let content_width = 2 + 1 + label.width();
    let padding = if content_width < LABEL_WIDTH {
        LABEL_WIDTH - content_width
    } else {
        1
    };
    format!("{} {}{}", emoji, label, " ".repeat(padding))
}

/// Build one `<label> <value>` stat row.
fn stat_row<'a>(emoji: &str, label: &str, value: String, theme: &'a Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(pad_label(emoji, label), theme.label),
        Span::styled(value, theme.value),
    ])
}

/// Build one per-player chart bar:
///
/// ```text
/// <player>    [<filled><empty>] <games> games, <wins> wins
/// ```
fn player_bar<'a>(bar: &PlayerBarData, max_games: u32, theme: &'a Theme) -> Line<'a> {
    let name_width = bar.player.width();
    let padding = if name_width < 14 { 14 - name_width } else { 1 };
    let padded_name = format!("{}{}", bar.player, " ".repeat(padding));

    let filled = if max_games > 0 {
        ((bar.games as f64 / max_games as f64) * BAR_WIDTH as f64).round() as usize
    } else {
        0
    };
    let empty = BAR_WIDTH.saturating_sub(filled);

    Line::from(vec![
        Span::styled(padded_name, theme.chart_label),
        Span::styled("█".repeat(filled), theme.chart_bar),
        Span::styled("░".repeat(empty), theme.chart_empty),
        Span::styled(
            format!(" {} games, {} wins", bar.games, bar.wins),
            theme.chart_label,
        ),
    ])
}

// ── Tests ─────────────────────────────────────────────────────────────────────
