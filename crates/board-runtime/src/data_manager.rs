//! TTL-cached data manager for the dashboard runtime.
//!
//! Wraps [`analyze_source`] with a configurable time-to-live cache and
//! transparent retry logic. Callers use [`DataManager::get_data`] to obtain
//! a fresh-or-cached [`LeagueReport`]; the manager handles staleness checks,
//! up to three fetch attempts with exponential back-off, and graceful
//! fallback to the previous cache on transient failure.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use board_data::analysis::{analyze_source, LeagueReport};

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// Maximum number of fetch attempts before giving up and returning stale data.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── DataManager ───────────────────────────────────────────────────────────────

/// TTL-cached wrapper around the full analysis pipeline.
///
/// # Example
/// ```no_run
/// use board_runtime::data_manager::DataManager;
///
/// let mut mgr = DataManager::new(30, "league.xlsx".into());
/// if let Some(report) = mgr.get_data(false) {
///     println!("total games: {}", report.total_games);
/// }
/// ```
pub struct DataManager {
    /// Maximum age of cached data before it is considered stale.
    cache_ttl: Duration,
    /// Path to the league source file.
    source_path: PathBuf,
    /// Most recently fetched report.
    cache: Option<LeagueReport>,
    /// When the cache was last populated.
    cache_timestamp: Option<Instant>,
    /// Human-readable description of the last error encountered.
    last_error: Option<String>,
    /// When the last *successful* fetch completed.
    last_successful_fetch: Option<Instant>,
}

impl DataManager {
    /// Create a new manager.
    ///
    /// # Parameters
    /// - `cache_ttl_secs` – seconds before cached data is considered stale.
    /// - `source_path`    – league source file forwarded to `analyze_source`.
    pub fn new(cache_ttl_secs: u64, source_path: PathBuf) -> Self {
        Self {
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            source_path,
            cache: None,
            cache_timestamp: None,
            last_error: None,
            last_successful_fetch: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return analysis data, using the cache when it is still valid.
    ///
    /// When `force_refresh` is `true` the cache is bypassed and a fresh
    /// fetch is always attempted. On fetch failure the previous cache (if
    /// any) is returned as a best-effort fallback.
    ///
    /// The fetch is retried up to [`MAX_RETRY_ATTEMPTS`] times with
    /// exponential back-off (0 ms → 100 ms → 200 ms).
    pub fn get_data(&mut self, force_refresh: bool) -> Option<&LeagueReport> {
        if !force_refresh && self.is_cache_valid() {
            tracing::debug!("returning cached league report");
            return self.cache.as_ref();
        }

        match self.fetch_with_retry() {
            Ok(report) => {
                tracing::debug!(
                    decks = report.metadata.decks_count,
                    total_games = report.total_games,
                    "league report cache updated"
                );
                self.cache = Some(report);
                self.cache_timestamp = Some(Instant::now());
                self.last_successful_fetch = Some(Instant::now());
                self.last_error = None;
                self.cache.as_ref()
            }
            Err(e) => {
                tracing::warn!(error = %e, "fetch failed; falling back to cached data");
                self.last_error = Some(e);
                // Return whatever we have, even if stale.
                self.cache.as_ref()
            }
        }
    }

    /// Discard the current cache, forcing the next [`Self::get_data`] call
    /// to fetch.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_timestamp = None;
        tracing::debug!("cache invalidated");
    }

    /// Age of the current cache entry, or `None` if no data has been fetched.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Human-readable description of the last fetch error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// `true` when the cache holds data that is still within its TTL.
    fn is_cache_valid(&self) -> bool {
        match (self.cache.as_ref(), self.cache_timestamp) {
            (Some(_), Some(ts)) => ts.elapsed() < self.cache_ttl,
            _ => false,
        }
    }

    /// Attempt up to [`MAX_RETRY_ATTEMPTS`] fetches with exponential
    /// back-off (0, 100, 200 ms).
    fn fetch_with_retry(&mut self) -> Result<LeagueReport, String> {
        let mut last_err = String::new();

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            if attempt > 0 {
                let sleep_ms = (attempt as u64) * 100;
                tracing::debug!(attempt, sleep_ms, "retrying fetch after back-off");
                thread::sleep(Duration::from_millis(sleep_ms));
            }

            match self.fetch_fresh() {
                Ok(report) => return Ok(report),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "fetch attempt failed");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }

    /// Call the analysis pipeline with this manager's configuration.
    fn fetch_fresh(&self) -> Result<LeagueReport, String> {
        // analyze_source never fails on unreadable sources (it returns an
        // empty report); the catch-unwind only guards against panics.
        let path = self.source_path.clone();
        let report = std::panic::catch_unwind(move || analyze_source(&path)).map_err(|e| {
            format!(
                "analyze_source panicked: {:?}",
                e.downcast_ref::<&str>().unwrap_or(&"unknown panic")
            )
        })?;

        Ok(report)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
