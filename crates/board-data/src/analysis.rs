//! Top-level analysis pipeline for Deckboard.
//!
//! Orchestrates source loading, normalization, and aggregation, returning a
//! [`LeagueReport`] ready for the UI layer. There is no fatal error path:
//! an unreadable source is recovered as an empty dataset, which the display
//! surface renders as an empty state.

use std::path::Path;

use chrono::Utc;
use tracing::warn;

use board_core::models::League;

use crate::aggregator::{LeagueAggregator, PlayerTotals};
use crate::normalize::normalize;
use crate::reader::{load_source, SourceTables};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReportMetadata {
    /// ISO-8601 timestamp when this report was generated.
    pub generated_at: String,
    /// Wall-clock seconds spent reading and decoding the source.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent normalizing and aggregating.
    pub transform_time_seconds: f64,
    /// Raw deck rows read (before deduplication).
    pub deck_rows_read: usize,
    /// Raw participation rows read.
    pub participation_rows_read: usize,
    /// Normalized deck count.
    pub decks_count: usize,
    /// Known player count.
    pub players_count: usize,
    /// Session count.
    pub sessions_count: usize,
}

/// League-wide superlatives shown as stat cards.
#[derive(Debug, Clone, Default)]
pub struct Highlights {
    /// Player aggregate with the most wins.
    pub most_wins: Option<PlayerTotals>,
    /// Player aggregate with the most games (the most active player).
    pub most_games: Option<PlayerTotals>,
    /// Theme tag with the highest occurrence count.
    pub most_popular_theme: Option<(String, u32)>,
    /// Id and win rate of the deck with the best record over at least two
    /// games.
    pub most_dominant: Option<(String, u32)>,
    /// Count of decks with no recorded games.
    pub never_played: usize,
}

/// The complete output of [`analyze_source`].
#[derive(Debug, Clone)]
pub struct LeagueReport {
    /// Normalized entities.
    pub league: League,
    /// Per-player aggregates in player order.
    pub breakdown: Vec<PlayerTotals>,
    /// League-wide superlatives.
    pub highlights: Highlights,
    /// Sum of game counts across all decks.
    pub total_games: u32,
    /// Metadata about this analysis run.
    pub metadata: ReportMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full analysis pipeline against the source file at `path`.
///
/// 1. Load and decode the source into raw tables.
/// 2. Normalize into league entities.
/// 3. Compute the per-player breakdown and highlights.
///
/// An unreadable source yields an empty report rather than an error.
pub fn analyze_source(path: &Path) -> LeagueReport {
    // ── Step 1: Load ──────────────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let tables = match load_source(path) {
        Ok(tables) => tables,
        Err(e) => {
            warn!("Source {} unreadable ({}); treating dataset as empty", path.display(), e);
            SourceTables::default()
        }
    };
    let load_time = load_start.elapsed().as_secs_f64();

    analyze_tables(&tables, load_time)
}

/// Normalize and aggregate already-loaded tables (the load-free tail of
/// [`analyze_source`], used directly by tests).
pub fn analyze_tables(tables: &SourceTables, load_time_seconds: f64) -> LeagueReport {
    // ── Step 2: Normalize ─────────────────────────────────────────────────────
    let transform_start = std::time::Instant::now();
    let league = normalize(tables);

    // ── Step 3: Aggregate ─────────────────────────────────────────────────────
    let breakdown = LeagueAggregator::per_player_breakdown(&league.decks, &league.players);

    let highlights = Highlights {
        most_wins: LeagueAggregator::top_by_wins(&breakdown).cloned(),
        most_games: LeagueAggregator::top_by_games(&breakdown).cloned(),
        most_popular_theme: LeagueAggregator::most_popular_theme(&league.decks),
        most_dominant: LeagueAggregator::most_dominant_deck(&league.decks)
            .map(|deck| (deck.id.clone(), board_core::stats::win_rate(deck.wins, deck.games))),
        never_played: LeagueAggregator::never_played_count(&league.decks),
    };

    let total_games = LeagueAggregator::total_games(&league.decks);
    let transform_time = transform_start.elapsed().as_secs_f64();

    let metadata = ReportMetadata {
        generated_at: Utc::now().to_rfc3339(),
        load_time_seconds,
        transform_time_seconds: transform_time,
        deck_rows_read: tables.decks.len(),
        participation_rows_read: tables.game_players.len(),
        decks_count: league.decks.len(),
        players_count: league.players.len(),
        sessions_count: league.sessions.len(),
    };

    LeagueReport {
        league,
        breakdown,
        highlights,
        total_games,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
