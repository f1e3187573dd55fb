use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use board_data::reader::find_source_files;

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.deckboard/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.deckboard/`
/// - `~/.deckboard/logs/`
/// - `~/.deckboard/data/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let board_dir = home.join(".deckboard");
    std::fs::create_dir_all(&board_dir)?;
    std::fs::create_dir_all(board_dir.join("logs"))?;
    std::fs::create_dir_all(board_dir.join("data"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
///
/// The `log_file` parameter is accepted for forward-compatibility but file
/// logging is not yet wired – all output currently goes to stderr.
pub fn setup_logging(log_level: &str, _log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    // Map the settings level names to tracing directives (tracing uses lowercase).
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Source discovery ───────────────────────────────────────────────────────────

/// Attempt to locate a league source file on the local system.
///
/// Scans the following directories in order and returns the first `.csv` or
/// `.xlsx` file found (files within a directory are visited in path order):
/// 1. `./data/`
/// 2. `~/.deckboard/data/`
///
/// Returns `None` when neither directory yields a candidate.
pub fn discover_source_path() -> Option<PathBuf> {
    let mut candidates = vec![PathBuf::from("data")];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".deckboard").join("data"));
    }

    candidates
        .into_iter()
        .filter(|dir| dir.exists())
        .find_map(|dir| find_source_files(&dir).into_iter().next())
}

/// Fallback source path used when discovery finds nothing.
///
/// The analysis pipeline treats a missing file as an empty dataset, so this
/// keeps the dashboard runnable (showing its empty state) with a sensible
/// location to drop a file into later.
pub fn default_source_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".deckboard")
        .join("data")
        .join("league.xlsx")
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── test_ensure_directories ───────────────────────────────────────────────

    #[test]
    fn test_ensure_directories() {
        let tmp = TempDir::new().expect("tempdir");

        // Override HOME so that dirs::home_dir() resolves to our temp dir.
        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", tmp.path());

        let result = ensure_directories();

        // Restore HOME.
        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }

        result.expect("ensure_directories should succeed");

        let board_dir = tmp.path().join(".deckboard");
        assert!(board_dir.is_dir(), ".deckboard dir must exist");
        assert!(board_dir.join("logs").is_dir(), "logs subdir must exist");
        assert!(board_dir.join("data").is_dir(), "data subdir must exist");
    }

    // ── test_discover_source_path ─────────────────────────────────────────────

    #[test]
    fn test_discover_source_path_returns_none_when_absent() {
        let tmp = TempDir::new().expect("tempdir");

        // Point HOME at a directory with no data directory at all.
        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", tmp.path());

        let path = discover_source_path();

        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }

        assert!(
            path.is_none(),
            "should return None when no source file exists"
        );
    }

    #[test]
    fn test_discover_source_path_finds_home_data_file() {
        let tmp = TempDir::new().expect("tempdir");
        let data_dir = tmp.path().join(".deckboard").join("data");
        std::fs::create_dir_all(&data_dir).expect("create data dir");
        let league = data_dir.join("league.csv");
        std::fs::write(&league, "DeckID,Commander\n").expect("write league file");

        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", tmp.path());

        let path = discover_source_path();

        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }

        assert_eq!(path, Some(league));
    }

    #[test]
    fn test_default_source_path_under_home() {
        let tmp = TempDir::new().expect("tempdir");

        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", tmp.path());

        let path = default_source_path();

        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }

        assert_eq!(
            path,
            tmp.path().join(".deckboard").join("data").join("league.xlsx")
        );
    }
}
