//! Derived statistics over the normalized league.
//!
//! All functions here are pure: they are recomputed from
//! `{entities, filter, sort}` (and the enrichment lookup, where relevant)
//! whenever any input changes.

use std::collections::HashMap;

use board_core::colors::Colors;
use board_core::models::{primary_commander, Deck};
use board_core::stats::WinLoss;

/// Decks need at least this many recorded games to qualify for the
/// most-dominant superlative; a single lucky win is not dominance.
pub const MIN_DOMINANT_GAMES: u32 = 2;

// ── PlayerTotals ──────────────────────────────────────────────────────────────

/// Per-player aggregate over that player's decks only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerTotals {
    pub player: String,
    pub deck_count: u32,
    pub total_games: u32,
    pub total_wins: u32,
}

impl WinLoss for PlayerTotals {
    fn wins(&self) -> u32 {
        self.total_wins
    }

    fn games(&self) -> u32 {
        self.total_games
    }
}

// ── SortKey / PlayerFilter ────────────────────────────────────────────────────

/// Sort column for the deck table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Games,
    Wins,
    WinRate,
}

impl SortKey {
    /// Parse a settings string; unknown names fall back to `Games`.
    pub fn from_name(name: &str) -> SortKey {
        match name.to_lowercase().as_str() {
            "wins" => SortKey::Wins,
            "winrate" => SortKey::WinRate,
            _ => SortKey::Games,
        }
    }

    /// Canonical lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Games => "games",
            SortKey::Wins => "wins",
            SortKey::WinRate => "winrate",
        }
    }

    /// Human-readable column label.
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Games => "Games",
            SortKey::Wins => "Wins",
            SortKey::WinRate => "Win %",
        }
    }

    /// The next key in cycle order (used by the UI sort toggle).
    pub fn next(&self) -> SortKey {
        match self {
            SortKey::Games => SortKey::Wins,
            SortKey::Wins => SortKey::WinRate,
            SortKey::WinRate => SortKey::Games,
        }
    }

    fn value_for(&self, deck: &Deck) -> u32 {
        match self {
            SortKey::Games => deck.games,
            SortKey::Wins => deck.wins,
            SortKey::WinRate => deck.win_rate(),
        }
    }
}

/// Player selection for the deck table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerFilter {
    /// The "all players" sentinel.
    All,
    /// A single player's decks.
    Name(String),
}

impl PlayerFilter {
    /// `true` when `deck` passes the filter.
    pub fn matches(&self, deck: &Deck) -> bool {
        match self {
            PlayerFilter::All => true,
            PlayerFilter::Name(name) => deck.player == *name,
        }
    }

    /// Display label.
    pub fn label(&self) -> &str {
        match self {
            PlayerFilter::All => "All",
            PlayerFilter::Name(name) => name,
        }
    }
}

// ── LeagueAggregator ──────────────────────────────────────────────────────────

/// Stateless helper that computes derived views over the deck set.
pub struct LeagueAggregator;

impl LeagueAggregator {
    /// One entry per known player, in player-list order, aggregating over
    /// that player's decks only. Players with zero decks still appear with
    /// zero-valued fields.
    pub fn per_player_breakdown(decks: &[Deck], players: &[String]) -> Vec<PlayerTotals> {
        players
            .iter()
            .map(|player| {
                let mut totals = PlayerTotals {
                    player: player.clone(),
                    deck_count: 0,
                    total_games: 0,
                    total_wins: 0,
                };
                for deck in decks.iter().filter(|d| d.player == *player) {
                    totals.deck_count += 1;
                    totals.total_games += deck.games;
                    totals.total_wins += deck.wins;
                }
                totals
            })
            .collect()
    }

    /// Filter to the selected player, drop never-played decks unless
    /// requested, and sort descending by `key`.
    ///
    /// Ties on the sort key are broken by ascending deck id so the order
    /// is deterministic across runs.
    pub fn filter_and_sort(
        decks: &[Deck],
        filter: &PlayerFilter,
        include_unplayed: bool,
        key: SortKey,
    ) -> Vec<Deck> {
        let mut selected: Vec<Deck> = decks
            .iter()
            .filter(|deck| filter.matches(deck))
            .filter(|deck| include_unplayed || deck.games > 0)
            .cloned()
            .collect();

        selected.sort_by(|a, b| {
            key.value_for(b)
                .cmp(&key.value_for(a))
                .then_with(|| a.id.cmp(&b.id))
        });

        selected
    }

    /// The per-player aggregate with the most wins; ties go to the entry
    /// earliest in player order.
    pub fn top_by_wins(breakdown: &[PlayerTotals]) -> Option<&PlayerTotals> {
        Self::top_by(breakdown, |totals| totals.total_wins)
    }

    /// The per-player aggregate with the most games; ties go to the entry
    /// earliest in player order.
    pub fn top_by_games(breakdown: &[PlayerTotals]) -> Option<&PlayerTotals> {
        Self::top_by(breakdown, |totals| totals.total_games)
    }

    /// Unweighted theme tally: one increment per deck per tag. Returns the
    /// tag with the highest count (ties break lexicographically) or `None`
    /// when no deck carries a theme.
    pub fn most_popular_theme(decks: &[Deck]) -> Option<(String, u32)> {
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for deck in decks {
            for theme in &deck.themes {
                *counts.entry(theme.as_str()).or_insert(0) += 1;
            }
        }

        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(theme, count)| (theme.to_string(), count))
    }

    /// Weighted color tally across the deck set.
    ///
    /// Each deck contributes its primary commander's color identity codes
    /// (taken from the enrichment lookup), weighted by its game count with
    /// a minimum weight of 1 so unplayed decks still count. Decks whose
    /// commander has no lookup entry contribute nothing. Ties break by the
    /// registry's canonical color order.
    pub fn most_played_color(
        decks: &[Deck],
        colors_by_commander: &HashMap<String, Vec<String>>,
    ) -> Option<(String, u32)> {
        let mut tallies: HashMap<&str, u32> = HashMap::new();

        for deck in decks {
            let name = primary_commander(&deck.commander);
            let Some(codes) = colors_by_commander.get(name) else {
                continue;
            };
            let weight = deck.games.max(1);
            if codes.is_empty() {
                *tallies.entry("C").or_insert(0) += weight;
                continue;
            }
            for code in codes {
                *tallies.entry(code.as_str()).or_insert(0) += weight;
            }
        }

        tallies
            .into_iter()
            .max_by(|a, b| {
                a.1.cmp(&b.1)
                    .then_with(|| Colors::sort_index(b.0).cmp(&Colors::sort_index(a.0)))
            })
            .map(|(code, count)| (code.to_string(), count))
    }

    /// Among decks with at least [`MIN_DOMINANT_GAMES`] recorded games, the
    /// one with the highest win rate; `None` when no deck qualifies. Ties
    /// break by ascending deck id.
    pub fn most_dominant_deck(decks: &[Deck]) -> Option<&Deck> {
        decks
            .iter()
            .filter(|deck| deck.games >= MIN_DOMINANT_GAMES)
            .fold(None, |best: Option<&Deck>, deck| match best {
                None => Some(deck),
                Some(current) => {
                    let challenger = deck.win_rate();
                    let champion = current.win_rate();
                    if challenger > champion
                        || (challenger == champion && deck.id < current.id)
                    {
                        Some(deck)
                    } else {
                        Some(current)
                    }
                }
            })
    }

    /// Count of decks with no recorded games.
    pub fn never_played_count(decks: &[Deck]) -> usize {
        decks.iter().filter(|deck| deck.games == 0).count()
    }

    /// Sum of game counts across all decks.
    pub fn total_games(decks: &[Deck]) -> u32 {
        decks.iter().map(|deck| deck.games).sum()
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Maximum by `value`, keeping the first entry on ties.
    fn top_by(
        breakdown: &[PlayerTotals],
        value: impl Fn(&PlayerTotals) -> u32,
    ) -> Option<&PlayerTotals> {
        breakdown.iter().fold(None, |best, totals| match best {
            None => Some(totals),
            Some(current) if value(totals) > value(current) => Some(totals),
            _ => best,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_deck(id: &str, player: &str, games: u32, wins: u32) -> Deck {
        Deck {
            id: id.to_string(),
            commander: format!("Commander {id}"),
            player: player.to_string(),
            themes: vec![],
            games,
            wins,
            losses: games.saturating_sub(wins),
            power: None,
            decklist: None,
        }
    }

    fn themed_deck(id: &str, themes: &[&str]) -> Deck {
        let mut deck = make_deck(id, "Alice", 1, 0);
        deck.themes = themes.iter().map(|t| t.to_string()).collect();
        deck
    }

    // ── per_player_breakdown ──────────────────────────────────────────────────

    #[test]
    fn test_breakdown_one_entry_per_player_in_order() {
        let decks = vec![
            make_deck("d1", "Bob", 5, 2),
            make_deck("d2", "Alice", 3, 1),
            make_deck("d3", "Bob", 2, 2),
        ];
        let players = vec!["Alice".to_string(), "Bob".to_string(), "Cara".to_string()];

        let breakdown = LeagueAggregator::per_player_breakdown(&decks, &players);

        assert_eq!(breakdown.len(), 3);
        assert_eq!(breakdown[0].player, "Alice");
        assert_eq!(breakdown[0].deck_count, 1);
        assert_eq!(breakdown[0].total_games, 3);
        assert_eq!(breakdown[1].player, "Bob");
        assert_eq!(breakdown[1].deck_count, 2);
        assert_eq!(breakdown[1].total_games, 7);
        assert_eq!(breakdown[1].total_wins, 4);
    }

    #[test]
    fn test_breakdown_zero_deck_player_appears_with_zeroes() {
        let decks = vec![make_deck("d1", "Alice", 4, 2)];
        let players = vec!["Alice".to_string(), "Cara".to_string()];

        let breakdown = LeagueAggregator::per_player_breakdown(&decks, &players);

        assert_eq!(breakdown[1].player, "Cara");
        assert_eq!(breakdown[1].deck_count, 0);
        assert_eq!(breakdown[1].total_games, 0);
        assert_eq!(breakdown[1].total_wins, 0);
    }

    #[test]
    fn test_breakdown_empty_players_is_empty() {
        let decks = vec![make_deck("d1", "Alice", 4, 2)];
        assert!(LeagueAggregator::per_player_breakdown(&decks, &[]).is_empty());
    }

    // ── filter_and_sort ───────────────────────────────────────────────────────

    #[test]
    fn test_filter_all_excludes_unplayed_sorted_by_games() {
        let decks = vec![
            make_deck("d1", "Alice", 3, 1),
            make_deck("d2", "Bob", 0, 0),
            make_deck("d3", "Cara", 9, 4),
            make_deck("d4", "Alice", 5, 5),
        ];

        let sorted =
            LeagueAggregator::filter_and_sort(&decks, &PlayerFilter::All, false, SortKey::Games);

        let ids: Vec<&str> = sorted.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d3", "d4", "d1"]);
    }

    #[test]
    fn test_filter_include_unplayed_keeps_zero_game_decks() {
        let decks = vec![make_deck("d1", "Alice", 0, 0), make_deck("d2", "Alice", 2, 1)];

        let sorted =
            LeagueAggregator::filter_and_sort(&decks, &PlayerFilter::All, true, SortKey::Games);
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].id, "d2");
        assert_eq!(sorted[1].id, "d1");
    }

    #[test]
    fn test_filter_by_player_name() {
        let decks = vec![
            make_deck("d1", "Alice", 3, 1),
            make_deck("d2", "Bob", 5, 2),
            make_deck("d3", "Alice", 7, 3),
        ];

        let sorted = LeagueAggregator::filter_and_sort(
            &decks,
            &PlayerFilter::Name("Alice".to_string()),
            false,
            SortKey::Games,
        );
        let ids: Vec<&str> = sorted.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d3", "d1"]);
    }

    #[test]
    fn test_sort_by_win_rate() {
        // d1: 50 %, d2: 100 %, d3: 25 %.
        let decks = vec![
            make_deck("d1", "Alice", 4, 2),
            make_deck("d2", "Bob", 2, 2),
            make_deck("d3", "Cara", 4, 1),
        ];

        let sorted =
            LeagueAggregator::filter_and_sort(&decks, &PlayerFilter::All, false, SortKey::WinRate);
        let ids: Vec<&str> = sorted.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d2", "d1", "d3"]);
    }

    #[test]
    fn test_sort_ties_break_by_ascending_deck_id() {
        let decks = vec![
            make_deck("z9", "Alice", 5, 1),
            make_deck("a1", "Bob", 5, 2),
            make_deck("m5", "Cara", 5, 3),
        ];

        let sorted =
            LeagueAggregator::filter_and_sort(&decks, &PlayerFilter::All, false, SortKey::Games);
        let ids: Vec<&str> = sorted.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "m5", "z9"]);
    }

    // ── Superlatives ──────────────────────────────────────────────────────────

    #[test]
    fn test_top_by_wins_tie_goes_to_first_in_player_order() {
        let breakdown = vec![
            PlayerTotals {
                player: "Alice".to_string(),
                deck_count: 2,
                total_games: 10,
                total_wins: 4,
            },
            PlayerTotals {
                player: "Bob".to_string(),
                deck_count: 1,
                total_games: 8,
                total_wins: 4,
            },
        ];

        let top = LeagueAggregator::top_by_wins(&breakdown).unwrap();
        assert_eq!(top.player, "Alice");
    }

    #[test]
    fn test_top_by_games_picks_maximum() {
        let breakdown = vec![
            PlayerTotals {
                player: "Alice".to_string(),
                deck_count: 2,
                total_games: 10,
                total_wins: 4,
            },
            PlayerTotals {
                player: "Bob".to_string(),
                deck_count: 1,
                total_games: 18,
                total_wins: 2,
            },
        ];

        let top = LeagueAggregator::top_by_games(&breakdown).unwrap();
        assert_eq!(top.player, "Bob");
    }

    #[test]
    fn test_top_by_wins_empty_is_none() {
        assert!(LeagueAggregator::top_by_wins(&[]).is_none());
    }

    // ── most_popular_theme ────────────────────────────────────────────────────

    #[test]
    fn test_most_popular_theme_counts_per_deck() {
        let decks = vec![
            themed_deck("d1", &["Aggro"]),
            themed_deck("d2", &["Aggro", "Control"]),
            themed_deck("d3", &[]),
        ];

        let (theme, count) = LeagueAggregator::most_popular_theme(&decks).unwrap();
        assert_eq!(theme, "Aggro");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_most_popular_theme_tie_breaks_lexicographically() {
        let decks = vec![themed_deck("d1", &["Control"]), themed_deck("d2", &["Aggro"])];
        let (theme, count) = LeagueAggregator::most_popular_theme(&decks).unwrap();
        assert_eq!(theme, "Aggro");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_most_popular_theme_none_when_untagged() {
        let decks = vec![themed_deck("d1", &[])];
        assert!(LeagueAggregator::most_popular_theme(&decks).is_none());
    }

    // ── most_played_color ─────────────────────────────────────────────────────

    fn color_lookup(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(name, codes)| {
                (
                    name.to_string(),
                    codes.iter().map(|c| c.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_most_played_color_weighted_by_games() {
        let mut red = make_deck("d1", "Alice", 5, 2);
        red.commander = "Krenko, Mob Boss".to_string();
        let mut green = make_deck("d2", "Bob", 1, 0);
        green.commander = "Omnath, Locus of Mana".to_string();

        let lookup = color_lookup(&[
            ("Krenko, Mob Boss", &["R"]),
            ("Omnath, Locus of Mana", &["G"]),
        ]);

        let (code, count) =
            LeagueAggregator::most_played_color(&[red, green], &lookup).unwrap();
        assert_eq!(code, "R");
        assert_eq!(count, 5);
    }

    #[test]
    fn test_most_played_color_unplayed_deck_weighs_one() {
        let mut deck = make_deck("d1", "Alice", 0, 0);
        deck.commander = "Krenko, Mob Boss".to_string();
        let lookup = color_lookup(&[("Krenko, Mob Boss", &["R"])]);

        let (code, count) = LeagueAggregator::most_played_color(&[deck], &lookup).unwrap();
        assert_eq!(code, "R");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_most_played_color_uses_primary_partner_only() {
        let mut deck = make_deck("d1", "Alice", 2, 1);
        deck.commander = "Halana, Kessig Ranger // Alena, Kessig Trapper".to_string();
        let lookup = color_lookup(&[("Halana, Kessig Ranger", &["G"])]);

        let (code, _) = LeagueAggregator::most_played_color(&[deck], &lookup).unwrap();
        assert_eq!(code, "G");
    }

    #[test]
    fn test_most_played_color_missing_lookup_contributes_nothing() {
        let deck = make_deck("d1", "Alice", 9, 3);
        let lookup = color_lookup(&[]);
        assert!(LeagueAggregator::most_played_color(&[deck], &lookup).is_none());
    }

    #[test]
    fn test_most_played_color_empty_identity_counts_as_colorless() {
        let mut deck = make_deck("d1", "Alice", 3, 1);
        deck.commander = "Kozilek, Butcher of Truth".to_string();
        let lookup = color_lookup(&[("Kozilek, Butcher of Truth", &[])]);

        let (code, count) = LeagueAggregator::most_played_color(&[deck], &lookup).unwrap();
        assert_eq!(code, "C");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_most_played_color_tie_breaks_by_registry_order() {
        let mut white = make_deck("d1", "Alice", 2, 1);
        white.commander = "White Commander".to_string();
        let mut green = make_deck("d2", "Bob", 2, 1);
        green.commander = "Green Commander".to_string();

        let lookup = color_lookup(&[
            ("White Commander", &["W"]),
            ("Green Commander", &["G"]),
        ]);

        // Both tally 2; W precedes G in the canonical order.
        let (code, _) =
            LeagueAggregator::most_played_color(&[white, green], &lookup).unwrap();
        assert_eq!(code, "W");
    }

    // ── most_dominant_deck ────────────────────────────────────────────────────

    #[test]
    fn test_most_dominant_requires_two_games() {
        // One game with a 100 % rate does not qualify; two games do.
        let lucky = make_deck("d1", "Alice", 1, 1);
        let steady = make_deck("d2", "Bob", 2, 2);

        let decks = [lucky, steady];
        let dominant = LeagueAggregator::most_dominant_deck(&decks).unwrap();
        assert_eq!(dominant.id, "d2");
    }

    #[test]
    fn test_most_dominant_none_when_no_deck_qualifies() {
        let decks = vec![make_deck("d1", "Alice", 1, 1), make_deck("d2", "Bob", 0, 0)];
        assert!(LeagueAggregator::most_dominant_deck(&decks).is_none());
    }

    #[test]
    fn test_most_dominant_picks_highest_rate() {
        let decks = vec![
            make_deck("d1", "Alice", 4, 2), // 50 %
            make_deck("d2", "Bob", 5, 4),   // 80 %
            make_deck("d3", "Cara", 10, 3), // 30 %
        ];
        let dominant = LeagueAggregator::most_dominant_deck(&decks).unwrap();
        assert_eq!(dominant.id, "d2");
    }

    #[test]
    fn test_most_dominant_tie_breaks_by_ascending_id() {
        let decks = vec![
            make_deck("z1", "Alice", 4, 2), // 50 %
            make_deck("a1", "Bob", 2, 1),   // 50 %
        ];
        let dominant = LeagueAggregator::most_dominant_deck(&decks).unwrap();
        assert_eq!(dominant.id, "a1");
    }

    // ── never_played_count / total_games ──────────────────────────────────────

    #[test]
    fn test_never_played_count() {
        let decks = vec![
            make_deck("d1", "Alice", 0, 0),
            make_deck("d2", "Bob", 3, 1),
            make_deck("d3", "Cara", 0, 0),
        ];
        assert_eq!(LeagueAggregator::never_played_count(&decks), 2);
    }

    #[test]
    fn test_total_games_sums() {
        let decks = vec![make_deck("d1", "Alice", 4, 2), make_deck("d2", "Bob", 6, 1)];
        assert_eq!(LeagueAggregator::total_games(&decks), 10);
    }

    // ── SortKey / PlayerFilter plumbing ───────────────────────────────────────

    #[test]
    fn test_sort_key_from_name() {
        assert_eq!(SortKey::from_name("games"), SortKey::Games);
        assert_eq!(SortKey::from_name("WINS"), SortKey::Wins);
        assert_eq!(SortKey::from_name("winrate"), SortKey::WinRate);
        assert_eq!(SortKey::from_name("nonsense"), SortKey::Games);
    }

    #[test]
    fn test_sort_key_cycle_covers_all() {
        let start = SortKey::Games;
        assert_eq!(start.next(), SortKey::Wins);
        assert_eq!(start.next().next(), SortKey::WinRate);
        assert_eq!(start.next().next().next(), SortKey::Games);
    }

    #[test]
    fn test_player_filter_labels() {
        assert_eq!(PlayerFilter::All.label(), "All");
        assert_eq!(PlayerFilter::Name("Alice".to_string()).label(), "Alice");
    }
}
