//! Source discovery and decoding for Deckboard.
//!
//! Converts a raw league payload (delimited text or a multi-table Excel
//! workbook) into named row collections for the normalizer. A payload that
//! cannot be decoded at all fails with [`BoardError::SourceUnreadable`];
//! a missing workbook table yields an empty collection, never an error, so
//! downstream aggregation stays resilient to partially-populated sources.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use board_core::cells::{Cell, Row};
use board_core::error::{BoardError, Result};
use calamine::{Data, Range, Reader as _, Xlsx};
use tracing::{debug, warn};

// ── Table names ───────────────────────────────────────────────────────────────

pub const PLAYERS_TABLE: &str = "Players";
pub const DECKS_TABLE: &str = "Decks";
pub const GAMES_TABLE: &str = "Games";
pub const GAME_PLAYERS_TABLE: &str = "Game Players";

/// The tables a workbook source is expected to carry.
pub const EXPECTED_TABLES: &[&str] =
    &[PLAYERS_TABLE, DECKS_TABLE, GAMES_TABLE, GAME_PLAYERS_TABLE];

// ── Public types ──────────────────────────────────────────────────────────────

/// Named row collections produced by one read of the source.
///
/// The delimited variant fills only `decks`; the workbook variant fills
/// whichever tables the file actually carries.
#[derive(Debug, Default)]
pub struct SourceTables {
    pub players: Vec<Row>,
    pub decks: Vec<Row>,
    pub games: Vec<Row>,
    pub game_players: Vec<Row>,
}

/// The two supported source encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text with a header row.
    Delimited,
    /// Multi-table Excel workbook.
    Workbook,
}

impl SourceFormat {
    /// Detect the format from the file extension. Anything that is not a
    /// workbook extension is treated as delimited text.
    pub fn detect(path: &Path) -> SourceFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => SourceFormat::Workbook,
            _ => SourceFormat::Delimited,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find candidate source files (`.csv` / `.xlsx`) under `data_path`,
/// sorted by path.
pub fn find_source_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        debug!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| {
                        ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("xlsx")
                    })
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load and decode the source at `path` into [`SourceTables`].
///
/// Fails with [`BoardError::FileRead`] when the file cannot be read and
/// [`BoardError::SourceUnreadable`] when it cannot be decoded as its
/// format. Missing workbook tables are substituted with empty collections.
pub fn load_source(path: &Path) -> Result<SourceTables> {
    match SourceFormat::detect(path) {
        SourceFormat::Workbook => {
            let bytes = std::fs::read(path).map_err(|e| BoardError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?;
            let mut tables = read_workbook(&bytes, EXPECTED_TABLES)?;
            Ok(SourceTables {
                players: tables.remove(PLAYERS_TABLE).unwrap_or_default(),
                decks: tables.remove(DECKS_TABLE).unwrap_or_default(),
                games: tables.remove(GAMES_TABLE).unwrap_or_default(),
                game_players: tables.remove(GAME_PLAYERS_TABLE).unwrap_or_default(),
            })
        }
        SourceFormat::Delimited => {
            let text = std::fs::read_to_string(path).map_err(|e| BoardError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok(SourceTables {
                decks: read_delimited(&text)?,
                ..SourceTables::default()
            })
        }
    }
}

/// Decode delimited text into an ordered sequence of rows.
///
/// The first row names the columns. Cell values are trimmed strings;
/// blank cells become [`Cell::Empty`] under their column key. Records that
/// fail to parse are skipped with a warning rather than failing the load.
pub fn read_delimited(text: &str) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| BoardError::SourceUnreadable(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows: Vec<Row> = Vec::new();
    let mut records_skipped = 0u64;

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping malformed record: {}", e);
                records_skipped += 1;
                continue;
            }
        };

        let mut row: Row = HashMap::with_capacity(headers.len());
        for (index, name) in headers.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let value = record.get(index).unwrap_or("").trim();
            let cell = if value.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(value.to_string())
            };
            row.insert(name.clone(), cell);
        }
        rows.push(row);
    }

    debug!(
        "Delimited source: {} rows read, {} skipped",
        rows.len(),
        records_skipped
    );

    Ok(rows)
}

/// Decode workbook bytes into a mapping from table name to rows.
///
/// Each entry of `table_names` is present in the result; a table absent
/// from the workbook maps to an empty sequence. Typed cells survive as
/// their native type (numbers stay numbers, date cells surface as serial
/// numbers); text is trimmed and blank cells become [`Cell::Empty`].
pub fn read_workbook(bytes: &[u8], table_names: &[&str]) -> Result<HashMap<String, Vec<Row>>> {
    let cursor = std::io::Cursor::new(bytes);
    let mut workbook: Xlsx<_> =
        Xlsx::new(cursor).map_err(|e| BoardError::SourceUnreadable(e.to_string()))?;

    let mut tables: HashMap<String, Vec<Row>> = HashMap::with_capacity(table_names.len());

    for name in table_names {
        let rows = match workbook.worksheet_range(name) {
            Ok(range) => range_to_rows(&range),
            Err(e) => {
                debug!("Table {:?} not readable ({}); substituting empty", name, e);
                Vec::new()
            }
        };
        debug!("Table {:?}: {} rows", name, rows.len());
        tables.insert((*name).to_string(), rows);
    }

    Ok(tables)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Convert a worksheet range into rows, treating the first row as the
/// header. Columns with a blank header are dropped.
fn range_to_rows(range: &Range<Data>) -> Vec<Row> {
    let mut row_iter = range.rows();

    let Some(header_row) = row_iter.next() else {
        return Vec::new();
    };

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| match cell {
            Data::String(s) => s.trim().to_string(),
            Data::Empty => String::new(),
            other => other.to_string().trim().to_string(),
        })
        .collect();

    let mut rows: Vec<Row> = Vec::new();
    for data_row in row_iter {
        let mut row: Row = HashMap::with_capacity(headers.len());
        for (index, name) in headers.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let cell = data_row.get(index).map(convert_cell).unwrap_or(Cell::Empty);
            row.insert(name.clone(), cell);
        }
        // A row of nothing but empty cells is spreadsheet padding, not data.
        if row.values().any(|c| *c != Cell::Empty) {
            rows.push(row);
        }
    }

    rows
}

/// Map a calamine cell value onto the reader's [`Cell`] type.
fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(trimmed.to_string())
            }
        }
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // Date cells surface as their serial number; conversion to a
        // timestamp happens in the normalizer.
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.trim().to_string()),
        Data::Error(_) => Cell::Empty,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
