use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decorative sparkle string placed either side of the application title.
pub const SPARKLES: &str = "✦ ✧ ✦ ✧";

/// Dashboard header rendering five lines:
///
/// 1. Application title with sparkle decorations (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. Active player filter, sort key, and unplayed toggle in
///    `[ filter | sort | unplayed ]` format.
/// 4. Key hints.
/// 5. An empty line.
pub struct Header<'a> {
    /// Active player filter label (e.g. "All", "Alice").
    pub filter: &'a str,
    /// Active sort column label (e.g. "Games").
    pub sort: &'a str,
    /// Whether never-played decks are shown.
    pub show_unplayed: bool,
    /// Theme providing colour styles for each part of the header.
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    /// Construct a new header.
    pub fn new(filter: &'a str, sort: &'a str, show_unplayed: bool, theme: &'a Theme) -> Self {
        Self {
            filter,
            sort,
            show_unplayed,
            theme,
        }
    }

    /// Render the header as a `Vec<Line>` containing exactly five lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);
        let unplayed = if self.show_unplayed {
            "unplayed shown"
        } else {
            "unplayed hidden"
        };

        vec![
            // Title line.
            Line::from(vec![
                Span::styled(SPARKLES, self.theme.header_sparkle),
                Span::styled(" DECKBOARD LEAGUE DASHBOARD ", self.theme.header),
                Span::styled(SPARKLES, self.theme.header_sparkle),
            ]),
            // Separator line.
            Line::from(Span::styled(separator, self.theme.separator)),
            // Filter / sort / unplayed info line.
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.filter.to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.sort.to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(unplayed, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            // Key hints.
            Line::from(Span::styled(
                "p: player  s: sort  u: unplayed  r: refresh  q: quit",
                self.theme.dim,
            )),
            // Empty line.
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
