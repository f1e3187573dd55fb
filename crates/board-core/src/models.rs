use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder substituted for missing identity fields so that normalized
/// entities never carry empty ids, players, or commander names.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// A player's persistent card configuration, tracked across sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    /// Unique identifier, stable across loads.
    pub id: String,
    /// Commander display name. May denote a partner pair using a
    /// `" / "` or `" // "` separator; see [`primary_commander`].
    pub commander: String,
    /// Owning player's name. Player identity is the name string itself.
    pub player: String,
    /// Free-text theme tags, zero or more. Order is not significant.
    #[serde(default)]
    pub themes: Vec<String>,
    /// Games recorded for this deck. `wins + losses <= games`; ties and
    /// incomplete sessions account for the gap.
    #[serde(default)]
    pub games: u32,
    /// Games won.
    #[serde(default)]
    pub wins: u32,
    /// Games lost.
    #[serde(default)]
    pub losses: u32,
    /// Optional numeric power estimate.
    #[serde(default)]
    pub power: Option<f64>,
    /// Optional external deck-list reference.
    #[serde(default)]
    pub decklist: Option<String>,
}

/// One completed multiplayer game instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier.
    pub id: String,
    /// Calendar timestamp, when the source supplied one.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Free-text location.
    #[serde(default)]
    pub location: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Number of participants.
    #[serde(default)]
    pub player_count: u32,
}

/// One deck's outcome within one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participation {
    /// Session identifier this record belongs to.
    pub game_id: String,
    /// Deck identifier this record belongs to.
    pub deck_id: String,
    /// Whether the deck won the session.
    pub win: bool,
}

/// The normalized entity set produced by one load of the source.
///
/// Immutable after construction; superseded entirely on reload. Player
/// order is preserved from the source for consistent display ordering.
#[derive(Debug, Clone, Default)]
pub struct League {
    pub decks: Vec<Deck>,
    pub players: Vec<String>,
    pub sessions: Vec<Session>,
}

impl League {
    /// `true` when the load produced no entities at all.
    pub fn is_empty(&self) -> bool {
        self.decks.is_empty() && self.players.is_empty() && self.sessions.is_empty()
    }
}

/// Return the first component of a partner-pair commander name.
///
/// Partner pairs are written `"A / B"` or `"A // B"`; only the first
/// component is semantically significant for external lookups. Single
/// commanders are returned trimmed and unchanged.
///
/// # Examples
///
/// ```
/// use board_core::models::primary_commander;
///
/// assert_eq!(primary_commander("Tymna the Weaver / Thrasios"), "Tymna the Weaver");
/// assert_eq!(primary_commander("Halana // Alena"), "Halana");
/// assert_eq!(primary_commander("Atraxa, Praetors' Voice"), "Atraxa, Praetors' Voice");
/// ```
pub fn primary_commander(commander: &str) -> &str {
    for separator in [" // ", " / "] {
        if let Some((first, _)) = commander.split_once(separator) {
            return first.trim();
        }
    }
    commander.trim()
}
