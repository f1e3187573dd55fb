use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by Deckboard.
#[derive(Error, Debug)]
pub enum BoardError {
    /// A source file could not be opened or read from disk.
    #[error("Failed to read source {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The payload could not be decoded as the expected tabular format at
    /// all (corrupt bytes, malformed header). Callers recover by treating
    /// the dataset as empty.
    #[error("Source cannot be decoded: {0}")]
    SourceUnreadable(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A single card-metadata lookup failed. Never surfaced to the user;
    /// the enrichment layer logs and drops these.
    #[error("Card lookup failed: {0}")]
    Enrichment(String),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the board crates.
pub type Result<T> = std::result::Result<T, BoardError>;
