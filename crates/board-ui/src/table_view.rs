//! Deck table view for the Deckboard TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per deck
//! plus a highlighted totals row at the bottom.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use board_core::colors::Colors;
use board_core::formatting;
use board_core::models::Deck;
use board_core::stats::WinLoss;
use board_runtime::enrichment::ArtCache;

use crate::themes::Theme;

/// Data for a single row in the deck table.
#[derive(Debug, Clone)]
pub struct DeckRowData {
    /// Deck identifier.
    pub id: String,
    /// Commander display name (full partner pair, when present).
    pub commander: String,
    /// Owning player.
    pub player: String,
    /// Compact color-identity label (e.g. `"WUG"`), or a dash while the
    /// lookup has not landed.
    pub colors: String,
    /// Joined theme tags.
    pub themes: String,
    /// Games recorded.
    pub games: u32,
    /// Games won.
    pub wins: u32,
    /// Games lost.
    pub losses: u32,
    /// Win rate as an integer percentage.
    pub win_rate: u32,
    /// Formatted power estimate.
    pub power: String,
}

impl DeckRowData {
    /// Build a table row from a normalized deck plus the art cache.
    pub fn from_deck(deck: &Deck, art: &ArtCache) -> Self {
        let primary = board_core::models::primary_commander(&deck.commander);
        let colors = art
            .get(primary)
            .map(|card| Colors::label(&card.colors))
            .unwrap_or_else(|| "-".to_string());

        Self {
            id: deck.id.clone(),
            commander: deck.commander.clone(),
            player: deck.player.clone(),
            colors,
            themes: formatting::format_themes(&deck.themes),
            games: deck.games,
            wins: deck.wins,
            losses: deck.losses,
            win_rate: deck.win_rate(),
            power: formatting::format_power(deck.power),
        }
    }
}

/// Aggregated totals across all rows in the table.
#[derive(Debug, Clone)]
pub struct DeckTableTotals {
    /// Number of decks represented.
    pub deck_count: usize,
    /// Total games across the shown decks.
    pub total_games: u32,
    /// Total wins across the shown decks.
    pub total_wins: u32,
    /// Total losses across the shown decks.
    pub total_losses: u32,
    /// Overall win rate over the shown decks.
    pub win_rate: u32,
}

impl DeckTableTotals {
    /// Sum the shown rows into a totals record.
    pub fn from_rows(rows: &[DeckRowData]) -> Self {
        let total_games: u32 = rows.iter().map(|r| r.games).sum();
        let total_wins: u32 = rows.iter().map(|r| r.wins).sum();
        let total_losses: u32 = rows.iter().map(|r| r.losses).sum();
        Self {
            deck_count: rows.len(),
            total_games,
            total_wins,
            total_losses,
            win_rate: board_core::stats::win_rate(total_wins, total_games),
        }
    }
}

/// Render the deck table into `area`.
///
/// The table has one data row per [`DeckRowData`] entry, followed by a
/// highlighted totals row, all within a bordered block titled `title`.
pub fn render_deck_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[DeckRowData],
    totals: &DeckTableTotals,
    theme: &Theme,
) {
    let header_cells = [
        "ID", "Commander", "Player", "Colors", "Themes", "Games", "Wins", "Losses", "Win %",
        "Power",
    ]
    .iter()
    .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(row.id.clone()),
                Cell::from(row.commander.clone()),
                Cell::from(row.player.clone()),
                Cell::from(row.colors.clone()),
                Cell::from(row.themes.clone()),
                Cell::from(formatting::format_count(row.games as u64)),
                Cell::from(formatting::format_count(row.wins as u64)),
                Cell::from(formatting::format_count(row.losses as u64)),
                Cell::from(formatting::format_percent(row.win_rate)),
                Cell::from(row.power.clone()),
            ])
            .style(style)
        })
        .collect();

    // Totals row, styled separately to stand out.
    let total_row = Row::new(vec![
        Cell::from("TOTAL").style(theme.table_total),
        Cell::from(format!("{} decks", totals.deck_count)),
        Cell::from(""),
        Cell::from(""),
        Cell::from(""),
        Cell::from(formatting::format_count(totals.total_games as u64)),
        Cell::from(formatting::format_count(totals.total_wins as u64)),
        Cell::from(formatting::format_count(totals.total_losses as u64)),
        Cell::from(formatting::format_percent(totals.win_rate)),
        Cell::from(""),
    ])
    .style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(total_row);

    let widths = [
        Constraint::Length(8),
        Constraint::Length(28),
        Constraint::Length(12),
        Constraint::Length(7),
        Constraint::Length(22),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(6),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a "no data" placeholder when there are no decks to show.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No league data found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Point --source at a league .csv or .xlsx file.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default().borders(Borders::ALL).title(" Deckboard "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
