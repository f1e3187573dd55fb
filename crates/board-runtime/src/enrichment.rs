//! Best-effort commander art and color-identity enrichment.
//!
//! Looks up each distinct primary commander name against a card-metadata
//! service via fuzzy name match. Lookups run in batches of at most
//! [`LOOKUP_BATCH_SIZE`] concurrent requests with a fixed pause between
//! batches to respect the service's rate limit. Individual failures are
//! logged and dropped; they never abort the batch or the dashboard. The
//! aggregation pipeline never waits on these results.

use std::collections::HashMap;
use std::time::Duration;

use board_core::error::BoardError;
use board_core::models::{primary_commander, Deck, UNKNOWN_LABEL};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time;
use tracing::debug;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Maximum concurrent outbound lookups per batch.
pub const LOOKUP_BATCH_SIZE: usize = 5;

/// Pause between batches.
pub const BATCH_PAUSE: Duration = Duration::from_millis(200);

/// Public card-metadata endpoint.
const DEFAULT_BASE_URL: &str = "https://api.scryfall.com";

// ── CardArt ───────────────────────────────────────────────────────────────────

/// Display metadata attached to one commander name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardArt {
    /// The commander name the lookup was keyed by (not the service's
    /// canonical spelling, so cache hits stay aligned with deck data).
    pub name: String,
    /// Art crop image URL, when the service supplied one.
    pub image_url: Option<String>,
    /// Color identity codes (`W`, `U`, `B`, `R`, `G`).
    pub colors: Vec<String>,
}

/// Enrichment cache keyed by commander name. Last write wins; a reload
/// that races an in-flight lookup simply supersedes it on the next insert.
pub type ArtCache = HashMap<String, CardArt>;

/// Project an art cache down to the color-identity lookup consumed by the
/// aggregation layer.
pub fn colors_by_commander(cache: &ArtCache) -> HashMap<String, Vec<String>> {
    cache
        .iter()
        .map(|(name, art)| (name.clone(), art.colors.clone()))
        .collect()
}

// ── ScryfallClient ────────────────────────────────────────────────────────────

/// Thin client for the card-metadata lookup endpoint.
#[derive(Clone)]
pub struct ScryfallClient {
    client: reqwest::Client,
    base_url: String,
}

impl ScryfallClient {
    /// Client against the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client against an explicit base URL (used for testing).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("deckboard/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fuzzy-name lookup for a single commander.
    ///
    /// Any transport, status, or payload problem maps to
    /// [`BoardError::Enrichment`]; callers treat that as "no enrichment
    /// data for this entity".
    pub async fn lookup(&self, name: &str) -> Result<CardArt, BoardError> {
        let url = format!("{}/cards/named", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("fuzzy", name)])
            .send()
            .await
            .map_err(|e| BoardError::Enrichment(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BoardError::Enrichment(format!(
                "lookup for {name:?} returned {status}"
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BoardError::Enrichment(e.to_string()))?;

        Ok(Self::parse_card(name, &payload))
    }

    /// Extract the art crop URL and color identity from a card payload.
    ///
    /// Double-faced cards carry their images per face; the front face's
    /// art is used.
    fn parse_card(name: &str, payload: &serde_json::Value) -> CardArt {
        let image_url = payload
            .get("image_uris")
            .and_then(|uris| uris.get("art_crop"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| {
                payload
                    .get("card_faces")
                    .and_then(|faces| faces.get(0))
                    .and_then(|face| face.get("image_uris"))
                    .and_then(|uris| uris.get("art_crop"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            });

        let colors = payload
            .get("color_identity")
            .and_then(|v| v.as_array())
            .map(|codes| {
                codes
                    .iter()
                    .filter_map(|c| c.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        CardArt {
            name: name.to_string(),
            image_url,
            colors,
        }
    }
}

impl Default for ScryfallClient {
    fn default() -> Self {
        Self::new()
    }
}

// ── EnrichmentService ─────────────────────────────────────────────────────────

/// Batched, rate-limited lookup driver.
pub struct EnrichmentService {
    client: ScryfallClient,
}

impl EnrichmentService {
    pub fn new(client: ScryfallClient) -> Self {
        Self { client }
    }

    /// Distinct primary commander names over the deck set, in first
    /// appearance order. Placeholder names are skipped; there is nothing
    /// to look up for them.
    pub fn distinct_commanders(decks: &[Deck]) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for deck in decks {
            let name = primary_commander(&deck.commander);
            if name.is_empty() || name == UNKNOWN_LABEL {
                continue;
            }
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Look up every name, sending each successful result through `tx`.
    ///
    /// Runs at most [`LOOKUP_BATCH_SIZE`] lookups concurrently and sleeps
    /// [`BATCH_PAUSE`] between batches. Failed lookups are dropped after a
    /// debug log; the loop finishes regardless. Returns early when the
    /// receiver is gone.
    pub async fn enrich(&self, names: Vec<String>, tx: mpsc::Sender<CardArt>) {
        let batches = names.chunks(LOOKUP_BATCH_SIZE).count();
        debug!(names = names.len(), batches, "starting enrichment lookups");

        for (index, batch) in names.chunks(LOOKUP_BATCH_SIZE).enumerate() {
            let mut lookups = JoinSet::new();
            for name in batch {
                let client = self.client.clone();
                let name = name.clone();
                lookups.spawn(async move { client.lookup(&name).await });
            }

            while let Some(joined) = lookups.join_next().await {
                match joined {
                    Ok(Ok(art)) => {
                        if tx.send(art).await.is_err() {
                            debug!("enrichment receiver gone; stopping lookups");
                            return;
                        }
                    }
                    Ok(Err(e)) => debug!(error = %e, "enrichment lookup failed; skipping"),
                    Err(e) => debug!(error = %e, "enrichment task failed; skipping"),
                }
            }

            if index + 1 < batches {
                time::sleep(BATCH_PAUSE).await;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_deck(id: &str, commander: &str) -> Deck {
        Deck {
            id: id.to_string(),
            commander: commander.to_string(),
            player: "Alice".to_string(),
            themes: vec![],
            games: 0,
            wins: 0,
            losses: 0,
            power: None,
            decklist: None,
        }
    }

    // ── parse_card ────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_card_with_top_level_image() {
        let payload = serde_json::json!({
            "name": "Krenko, Mob Boss",
            "image_uris": { "art_crop": "https://img.example/krenko.jpg" },
            "color_identity": ["R"],
        });

        let art = ScryfallClient::parse_card("Krenko, Mob Boss", &payload);
        assert_eq!(art.name, "Krenko, Mob Boss");
        assert_eq!(art.image_url.as_deref(), Some("https://img.example/krenko.jpg"));
        assert_eq!(art.colors, vec!["R"]);
    }

    #[test]
    fn test_parse_card_double_faced_uses_front_face() {
        let payload = serde_json::json!({
            "card_faces": [
                { "image_uris": { "art_crop": "https://img.example/front.jpg" } },
                { "image_uris": { "art_crop": "https://img.example/back.jpg" } }
            ],
            "color_identity": ["G", "W"],
        });

        let art = ScryfallClient::parse_card("Halana", &payload);
        assert_eq!(art.image_url.as_deref(), Some("https://img.example/front.jpg"));
        assert_eq!(art.colors, vec!["G", "W"]);
    }

    #[test]
    fn test_parse_card_missing_fields() {
        let payload = serde_json::json!({ "name": "Mystery" });
        let art = ScryfallClient::parse_card("Mystery", &payload);
        assert!(art.image_url.is_none());
        assert!(art.colors.is_empty());
    }

    #[test]
    fn test_parse_card_keeps_lookup_key_not_canonical_name() {
        // The cache key must match the deck's spelling, not the service's.
        let payload = serde_json::json!({
            "name": "Krenko, Mob Boss",
            "color_identity": ["R"],
        });
        let art = ScryfallClient::parse_card("krenko", &payload);
        assert_eq!(art.name, "krenko");
    }

    // ── distinct_commanders ───────────────────────────────────────────────────

    #[test]
    fn test_distinct_commanders_dedupes_preserving_order() {
        let decks = vec![
            make_deck("d1", "Krenko, Mob Boss"),
            make_deck("d2", "Atraxa, Praetors' Voice"),
            make_deck("d3", "Krenko, Mob Boss"),
        ];
        let names = EnrichmentService::distinct_commanders(&decks);
        assert_eq!(names, vec!["Krenko, Mob Boss", "Atraxa, Praetors' Voice"]);
    }

    #[test]
    fn test_distinct_commanders_uses_primary_partner() {
        let decks = vec![
            make_deck("d1", "Tymna the Weaver / Thrasios, Triton Hero"),
            make_deck("d2", "Tymna the Weaver / Kraum, Ludevic's Opus"),
        ];
        let names = EnrichmentService::distinct_commanders(&decks);
        assert_eq!(names, vec!["Tymna the Weaver"]);
    }

    #[test]
    fn test_distinct_commanders_skips_placeholder() {
        let decks = vec![make_deck("d1", UNKNOWN_LABEL)];
        assert!(EnrichmentService::distinct_commanders(&decks).is_empty());
    }

    // ── colors_by_commander ───────────────────────────────────────────────────

    #[test]
    fn test_colors_by_commander_projection() {
        let mut cache = ArtCache::new();
        cache.insert(
            "Krenko, Mob Boss".to_string(),
            CardArt {
                name: "Krenko, Mob Boss".to_string(),
                image_url: None,
                colors: vec!["R".to_string()],
            },
        );

        let lookup = colors_by_commander(&cache);
        assert_eq!(lookup.get("Krenko, Mob Boss"), Some(&vec!["R".to_string()]));
    }

    // ── cache semantics ───────────────────────────────────────────────────────

    #[test]
    fn test_art_cache_last_write_wins() {
        let mut cache = ArtCache::new();
        cache.insert(
            "Krenko".to_string(),
            CardArt {
                name: "Krenko".to_string(),
                image_url: Some("old".to_string()),
                colors: vec![],
            },
        );
        cache.insert(
            "Krenko".to_string(),
            CardArt {
                name: "Krenko".to_string(),
                image_url: Some("new".to_string()),
                colors: vec!["R".to_string()],
            },
        );

        assert_eq!(cache.len(), 1);
        assert_eq!(cache["Krenko"].image_url.as_deref(), Some("new"));
    }

    // ── enrich (failure path, no network dependency) ──────────────────────────

    #[tokio::test]
    async fn test_enrich_swallows_failures_and_completes() {
        // Point at a closed local port: every lookup fails fast, none of
        // them may abort the run or panic.
        let client = ScryfallClient::with_base_url("http://127.0.0.1:1");
        let service = EnrichmentService::new(client);
        let (tx, mut rx) = mpsc::channel(8);

        let names: Vec<String> = (0..7).map(|i| format!("Commander {i}")).collect();
        service.enrich(names, tx).await;

        // Sender dropped after the run; no results were produced.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_enrich_empty_name_list_is_noop() {
        let client = ScryfallClient::with_base_url("http://127.0.0.1:1");
        let service = EnrichmentService::new(client);
        let (tx, mut rx) = mpsc::channel(1);

        service.enrich(Vec::new(), tx).await;
        assert!(rx.recv().await.is_none());
    }
}
