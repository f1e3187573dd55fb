//! Async dashboard orchestrator.
//!
//! Coordinates [`DataManager`] and [`EnrichmentService`] in a tokio task,
//! sending [`DashboardSnapshot`]s through an `mpsc` channel so the TUI
//! event loop can consume them without any shared mutable state.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;

use crate::data_manager::DataManager;
use crate::enrichment::{ArtCache, CardArt, EnrichmentService, ScryfallClient};
use board_data::analysis::LeagueReport;

// ── Public types ──────────────────────────────────────────────────────────────

/// A single dashboard snapshot forwarded to the TUI layer.
///
/// This is the primary data contract between the background runtime and
/// the presentation layer.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    /// Full league report from the data pipeline.
    pub report: LeagueReport,
    /// Commander art/color cache as of this snapshot. Last write wins;
    /// entries accumulate as lookups complete.
    pub art: ArtCache,
}

// ── DashboardOrchestrator ─────────────────────────────────────────────────────

/// Background dashboard coordinator.
///
/// Call [`DashboardOrchestrator::start`] to spin up the loop in a
/// dedicated tokio task and receive a channel endpoint for
/// [`DashboardSnapshot`] updates plus a refresh trigger.
pub struct DashboardOrchestrator {
    /// How often to re-run the analysis pipeline.
    refresh_interval: Duration,
    /// League source file.
    source_path: PathBuf,
    /// Whether to run commander art/color lookups.
    enrich: bool,
    /// Override for the card-metadata endpoint (used for testing).
    art_base_url: Option<String>,
}

impl DashboardOrchestrator {
    /// Create a new orchestrator.
    ///
    /// # Parameters
    /// - `refresh_interval_secs` – seconds between data refreshes.
    /// - `source_path`           – league source file.
    /// - `enrich`                – run commander lookups when `true`.
    pub fn new(refresh_interval_secs: u64, source_path: PathBuf, enrich: bool) -> Self {
        Self {
            refresh_interval: Duration::from_secs(refresh_interval_secs),
            source_path,
            enrich,
            art_base_url: None,
        }
    }

    /// Redirect card-metadata lookups to an explicit base URL.
    pub fn with_art_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.art_base_url = Some(base_url.into());
        self
    }

    /// Start the dashboard loop.
    ///
    /// Spawns a tokio task that runs the loop. Returns:
    /// - An `mpsc::Receiver<DashboardSnapshot>` for the caller to poll.
    /// - An `mpsc::Sender<()>` that forces an immediate data refresh.
    /// - A [`DashboardHandle`] that can be used to abort the loop.
    pub fn start(self) -> (mpsc::Receiver<DashboardSnapshot>, mpsc::Sender<()>, DashboardHandle) {
        // Buffer a modest number of snapshots so slow consumers don't
        // stall the loop.
        let (tx, rx) = mpsc::channel(16);
        let (refresh_tx, refresh_rx) = mpsc::channel(4);

        let handle = tokio::spawn(async move {
            self.dashboard_loop(tx, refresh_rx).await;
        });

        (rx, refresh_tx, DashboardHandle { handle })
    }

    // ── Private implementation ────────────────────────────────────────────

    /// The main dashboard loop.
    ///
    /// Performs an immediate fetch on startup, spawns enrichment for the
    /// loaded deck set, then repeats the fetch on `refresh_interval` or on
    /// an explicit refresh trigger. The loop exits when the snapshot
    /// receiver is closed.
    async fn dashboard_loop(
        self,
        tx: mpsc::Sender<DashboardSnapshot>,
        mut refresh_rx: mpsc::Receiver<()>,
    ) {
        let mut data_manager = DataManager::new(
            crate::data_manager::DEFAULT_CACHE_TTL_SECS,
            self.source_path.clone(),
        );
        let mut art: ArtCache = ArtCache::new();

        // Held for the lifetime of the loop so the receive branch below
        // stays pending (rather than closing) while no lookups run.
        let (art_tx, mut art_rx) = mpsc::channel::<CardArt>(32);

        // Initial fetch (force refresh to populate immediately).
        let mut report = data_manager.get_data(true).cloned();
        if let Some(ref r) = report {
            self.spawn_enrichment(r, &art, &art_tx);
            self.send_snapshot(&tx, r, &art).await;
        }

        let mut interval = time::interval(self.refresh_interval);
        // Consume the first tick which fires immediately; we already
        // fetched above.
        interval.tick().await;

        loop {
            if tx.is_closed() {
                tracing::debug!("snapshot channel closed; exiting loop");
                break;
            }

            tokio::select! {
                maybe_art = art_rx.recv() => {
                    if let Some(card) = maybe_art {
                        // Last write wins by commander name.
                        art.insert(card.name.clone(), card);
                        if let Some(ref r) = report {
                            self.send_snapshot(&tx, r, &art).await;
                        }
                    }
                }
                _ = interval.tick() => {
                    report = data_manager.get_data(false).cloned();
                    if let Some(ref r) = report {
                        self.spawn_enrichment(r, &art, &art_tx);
                        self.send_snapshot(&tx, r, &art).await;
                    }
                }
                triggered = refresh_rx.recv() => {
                    if triggered.is_some() {
                        tracing::debug!("refresh trigger received");
                        report = data_manager.get_data(true).cloned();
                        if let Some(ref r) = report {
                            self.spawn_enrichment(r, &art, &art_tx);
                            self.send_snapshot(&tx, r, &art).await;
                        }
                    }
                }
            }
        }
    }

    /// Spawn lookups for commanders that have no cache entry yet.
    ///
    /// Reloads never cancel in-flight lookups; stale results are simply
    /// superseded last-write-wins when they land in the cache.
    fn spawn_enrichment(&self, report: &LeagueReport, art: &ArtCache, art_tx: &mpsc::Sender<CardArt>) {
        if !self.enrich {
            return;
        }

        let names: Vec<String> = EnrichmentService::distinct_commanders(&report.league.decks)
            .into_iter()
            .filter(|name| !art.contains_key(name))
            .collect();
        if names.is_empty() {
            return;
        }

        let client = match &self.art_base_url {
            Some(url) => ScryfallClient::with_base_url(url.clone()),
            None => ScryfallClient::new(),
        };
        let service = EnrichmentService::new(client);
        let art_tx = art_tx.clone();

        tokio::spawn(async move {
            service.enrich(names, art_tx).await;
        });
    }

    /// Send a [`DashboardSnapshot`] to the channel.
    async fn send_snapshot(
        &self,
        tx: &mpsc::Sender<DashboardSnapshot>,
        report: &LeagueReport,
        art: &ArtCache,
    ) {
        let snapshot = DashboardSnapshot {
            report: report.clone(),
            art: art.clone(),
        };
        if let Err(e) = tx.send(snapshot).await {
            tracing::warn!(error = %e, "failed to send dashboard snapshot; receiver dropped");
        }
    }
}

// ── DashboardHandle ───────────────────────────────────────────────────────────

/// A handle to the background dashboard task.
///
/// Drop or call [`DashboardHandle::abort`] to stop the loop.
pub struct DashboardHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl DashboardHandle {
    /// Immediately abort the dashboard loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_league_csv(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("league.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "DeckID,Commander,PlayerName,Total Games,Wins").unwrap();
        writeln!(file, "d1,Krenko,Alice,5,2").unwrap();
        writeln!(file, "d2,Atraxa,Bob,3,1").unwrap();
        path
    }

    // ── orchestrator creation ─────────────────────────────────────────────

    #[test]
    fn test_orchestrator_creation() {
        let orch = DashboardOrchestrator::new(30, PathBuf::from("/tmp/league.csv"), false);
        assert_eq!(orch.refresh_interval, Duration::from_secs(30));
        assert_eq!(orch.source_path, PathBuf::from("/tmp/league.csv"));
        assert!(!orch.enrich);
        assert!(orch.art_base_url.is_none());
    }

    #[test]
    fn test_orchestrator_art_base_url_override() {
        let orch = DashboardOrchestrator::new(30, PathBuf::from("/tmp/league.csv"), true)
            .with_art_base_url("http://127.0.0.1:9");
        assert_eq!(orch.art_base_url.as_deref(), Some("http://127.0.0.1:9"));
    }

    // ── async: start / abort ──────────────────────────────────────────────

    #[tokio::test]
    async fn test_orchestrator_start_and_abort() {
        let dir = TempDir::new().unwrap();
        let path = write_league_csv(&dir);

        let orch = DashboardOrchestrator::new(60, path, false);
        let (_rx, _refresh, handle) = orch.start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();
    }

    // ── async: receives initial snapshot ─────────────────────────────────

    #[tokio::test]
    async fn test_orchestrator_sends_initial_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = write_league_csv(&dir);

        let orch = DashboardOrchestrator::new(60, path, false);
        let (mut rx, _refresh, handle) = orch.start();

        let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for snapshot")
            .expect("channel closed before receiving snapshot");

        assert_eq!(snapshot.report.league.decks.len(), 2);
        assert!(snapshot.art.is_empty());

        handle.abort();
    }

    // ── async: refresh trigger produces a fresh snapshot ─────────────────

    #[tokio::test]
    async fn test_orchestrator_refresh_trigger() {
        let dir = TempDir::new().unwrap();
        let path = write_league_csv(&dir);

        let orch = DashboardOrchestrator::new(600, path, false);
        let (mut rx, refresh, handle) = orch.start();

        // Initial snapshot.
        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out")
            .expect("closed");
        assert_eq!(first.report.league.decks.len(), 2);

        // Trigger a refresh; with a 600 s interval the next snapshot can
        // only come from the trigger.
        refresh.send(()).await.unwrap();
        let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for refresh snapshot")
            .expect("closed");
        assert_eq!(second.report.league.decks.len(), 2);

        handle.abort();
    }

    // ── async: missing source still produces an (empty) snapshot ─────────

    #[tokio::test]
    async fn test_orchestrator_missing_source_sends_empty_snapshot() {
        let orch = DashboardOrchestrator::new(
            60,
            PathBuf::from("/tmp/deckboard-orchestrator-missing.csv"),
            false,
        );
        let (mut rx, _refresh, handle) = orch.start();

        let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out")
            .expect("closed");
        assert!(snapshot.report.league.is_empty());

        handle.abort();
    }
}
