//! Normalization of raw source rows into league entities.
//!
//! Deduplicates deck rows (last occurrence wins), joins participation
//! records into per-deck totals where available, and falls back to the
//! deck row's own pre-aggregated totals otherwise. Pure: identical input
//! always produces identical output.

use std::collections::HashMap;

use board_core::cells::{CellReader, Row, SerialDate};
use board_core::models::{Deck, League, Participation, Session, UNKNOWN_LABEL};
use tracing::debug;

use crate::reader::SourceTables;

// ── Column aliases ────────────────────────────────────────────────────────────
// The delimited and workbook variants use different column vocabularies;
// the normalizer accepts either.

const DECK_ID_COLUMNS: &[&str] = &["DeckID", "ID"];
const COMMANDER_COLUMNS: &[&str] = &["Commander"];
const PLAYER_COLUMNS: &[&str] = &["PlayerName", "Player"];
const GAMES_COLUMNS: &[&str] = &["Total Games", "Games"];
const WINS_COLUMNS: &[&str] = &["Wins"];
const LOSSES_COLUMNS: &[&str] = &["Losses"];
const THEMES_COLUMNS: &[&str] = &["Themes"];
const POWER_COLUMNS: &[&str] = &["Power"];
const DECKLIST_COLUMNS: &[&str] = &["Decklist"];

const GAME_ID_COLUMNS: &[&str] = &["ID", "GameID"];
const GAME_DATE_COLUMNS: &[&str] = &["Date"];
const GAME_LOCATION_COLUMNS: &[&str] = &["Location"];
const GAME_NOTES_COLUMNS: &[&str] = &["Notes"];
const GAME_PLAYER_COUNT_COLUMNS: &[&str] = &["Players", "Player Count"];

const PARTICIPATION_GAME_COLUMNS: &[&str] = &["GameID", "Game"];
const PARTICIPATION_DECK_COLUMNS: &[&str] = &["DeckID", "Deck"];
const PARTICIPATION_WIN_COLUMNS: &[&str] = &["Win", "Won"];

const PLAYER_NAME_COLUMNS: &[&str] = &["Name", "PlayerName", "Player"];

// ── Public API ────────────────────────────────────────────────────────────────

/// Normalize raw row collections into the league entity set.
///
/// Guarantees: every deck's `id`/`player`/`commander` is non-empty
/// (placeholder-substituted when the source is missing the value) and all
/// numeric fields are concrete, defaulting to zero.
pub fn normalize(tables: &SourceTables) -> League {
    let participation = collect_participation(&tables.game_players);
    let tallies = tally_participation(&participation);
    let decks = normalize_decks(&tables.decks, &tallies);
    let players = normalize_players(&tables.players, &decks);
    let sessions = normalize_sessions(&tables.games);

    debug!(
        decks = decks.len(),
        players = players.len(),
        sessions = sessions.len(),
        participation = participation.len(),
        "normalized league entities"
    );

    League {
        decks,
        players,
        sessions,
    }
}

/// Parse participation rows, dropping rows with no deck reference.
pub fn collect_participation(rows: &[Row]) -> Vec<Participation> {
    rows.iter()
        .filter_map(|row| {
            let deck_id = CellReader::text(row, PARTICIPATION_DECK_COLUMNS)?;
            Some(Participation {
                game_id: CellReader::text(row, PARTICIPATION_GAME_COLUMNS).unwrap_or_default(),
                deck_id,
                win: CellReader::flag(row, PARTICIPATION_WIN_COLUMNS),
            })
        })
        .collect()
}

/// Group participation records by deck id into `(games, wins)` tallies.
pub fn tally_participation(records: &[Participation]) -> HashMap<String, (u32, u32)> {
    let mut tallies: HashMap<String, (u32, u32)> = HashMap::new();
    for record in records {
        let entry = tallies.entry(record.deck_id.clone()).or_insert((0, 0));
        entry.0 += 1;
        if record.win {
            entry.1 += 1;
        }
    }
    tallies
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Build the deck list: dedupe by id (last occurrence wins, first
/// occurrence keeps its position), then apply participation tallies where
/// present.
fn normalize_decks(rows: &[Row], tallies: &HashMap<String, (u32, u32)>) -> Vec<Deck> {
    let mut decks: Vec<Deck> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let deck = deck_from_row(row);
        match index_by_id.get(&deck.id) {
            Some(&index) => {
                // Later rows with the same id overwrite earlier ones.
                decks[index] = deck;
            }
            None => {
                index_by_id.insert(deck.id.clone(), decks.len());
                decks.push(deck);
            }
        }
    }

    // Participation records are the authoritative source of a deck's
    // totals when any exist for its id.
    for deck in &mut decks {
        if let Some(&(games, wins)) = tallies.get(&deck.id) {
            deck.games = games;
            deck.wins = wins;
            deck.losses = games - wins;
        }
    }

    decks
}

/// Map a single deck row to a [`Deck`] with placeholder/default fields.
fn deck_from_row(row: &Row) -> Deck {
    Deck {
        id: CellReader::text(row, DECK_ID_COLUMNS)
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        commander: CellReader::text(row, COMMANDER_COLUMNS)
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        player: CellReader::text(row, PLAYER_COLUMNS)
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        themes: CellReader::tags(row, THEMES_COLUMNS),
        games: CellReader::count(row, GAMES_COLUMNS),
        wins: CellReader::count(row, WINS_COLUMNS),
        losses: CellReader::count(row, LOSSES_COLUMNS),
        power: CellReader::number(row, POWER_COLUMNS),
        decklist: CellReader::text(row, DECKLIST_COLUMNS),
    }
}

/// Player list: the `Players` table row order when present, otherwise
/// first-appearance order over the deck rows.
fn normalize_players(player_rows: &[Row], decks: &[Deck]) -> Vec<String> {
    let mut players: Vec<String> = Vec::new();

    for row in player_rows {
        if let Some(name) = CellReader::text(row, PLAYER_NAME_COLUMNS) {
            if !players.contains(&name) {
                players.push(name);
            }
        }
    }

    if !players.is_empty() {
        return players;
    }

    for deck in decks {
        if !players.contains(&deck.player) {
            players.push(deck.player.clone());
        }
    }
    players
}

/// Sessions from the `Games` table, with serial-date conversion.
fn normalize_sessions(rows: &[Row]) -> Vec<Session> {
    rows.iter()
        .filter_map(|row| {
            let id = CellReader::text(row, GAME_ID_COLUMNS)?;
            Some(Session {
                id,
                date: CellReader::number(row, GAME_DATE_COLUMNS)
                    .and_then(SerialDate::to_datetime),
                location: CellReader::text(row, GAME_LOCATION_COLUMNS),
                notes: CellReader::text(row, GAME_NOTES_COLUMNS),
                player_count: CellReader::count(row, GAME_PLAYER_COUNT_COLUMNS),
            })
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
