//! Raw cell and row types shared between the source reader and the
//! aggregation pipeline, plus the stateless processors that convert raw
//! values into typed fields.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

/// A single raw cell value as decoded from the source.
///
/// Text is always stored trimmed. Absent or blank cells are stored as
/// [`Cell::Empty`] under their column key so that downstream code can
/// distinguish "column missing" from "cell blank".
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

/// One source row: a mapping from header name to raw cell value.
pub type Row = HashMap<String, Cell>;

// ── CellReader ────────────────────────────────────────────────────────────────

/// Stateless accessors that read typed values out of a [`Row`].
///
/// All accessors treat a missing column the same as a blank cell and fall
/// back to a default, so a source with absent columns degrades to
/// default-valued fields rather than an error.
pub struct CellReader;

impl CellReader {
    /// First non-blank value among `columns`, as a trimmed string.
    ///
    /// Numbers are rendered without a trailing `.0` so that integer ids
    /// stored as numeric cells round-trip as `"42"`, not `"42.0"`.
    pub fn text(row: &Row, columns: &[&str]) -> Option<String> {
        for column in columns {
            match row.get(*column) {
                Some(Cell::Text(s)) if !s.trim().is_empty() => {
                    return Some(s.trim().to_string());
                }
                Some(Cell::Number(n)) => return Some(Self::render_number(*n)),
                Some(Cell::Bool(b)) => return Some(b.to_string()),
                _ => continue,
            }
        }
        None
    }

    /// First numeric value among `columns`. Numeric-looking text parses too.
    pub fn number(row: &Row, columns: &[&str]) -> Option<f64> {
        for column in columns {
            match row.get(*column) {
                Some(Cell::Number(n)) => return Some(*n),
                Some(Cell::Text(s)) => {
                    if let Ok(n) = s.trim().parse::<f64>() {
                        return Some(n);
                    }
                }
                _ => continue,
            }
        }
        None
    }

    /// Non-negative integer count, defaulting to 0 for blank, absent, or
    /// negative values.
    pub fn count(row: &Row, columns: &[&str]) -> u32 {
        Self::number(row, columns)
            .filter(|n| *n >= 0.0)
            .map(|n| n.round() as u32)
            .unwrap_or(0)
    }

    /// Win/loss style flag.
    ///
    /// Truthy values: boolean `true`, any non-zero number, and the strings
    /// `"true"`, `"yes"`, `"w"`, `"win"`, `"1"` (case-insensitive).
    pub fn flag(row: &Row, columns: &[&str]) -> bool {
        for column in columns {
            match row.get(*column) {
                Some(Cell::Bool(b)) => return *b,
                Some(Cell::Number(n)) => return *n != 0.0,
                Some(Cell::Text(s)) => {
                    let lower = s.trim().to_lowercase();
                    if lower.is_empty() {
                        continue;
                    }
                    return matches!(lower.as_str(), "true" | "yes" | "w" | "win" | "1");
                }
                _ => continue,
            }
        }
        false
    }

    /// Comma-separated tag list, trimmed, blanks dropped.
    pub fn tags(row: &Row, columns: &[&str]) -> Vec<String> {
        Self::text(row, columns)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Render a float the way spreadsheet text would show it.
    fn render_number(n: f64) -> String {
        if n.fract() == 0.0 && n.abs() < 1e15 {
            format!("{}", n as i64)
        } else {
            n.to_string()
        }
    }
}

// ── SerialDate ────────────────────────────────────────────────────────────────

/// Days between the spreadsheet serial epoch (1900 date system) and the
/// Unix epoch, 1970-01-01.
const SERIAL_EPOCH_OFFSET_DAYS: f64 = 25_569.0;

/// Milliseconds per day.
const MS_PER_DAY: f64 = 86_400_000.0;

/// Converts spreadsheet serial day counts into absolute timestamps.
pub struct SerialDate;

impl SerialDate {
    /// Convert a serial day count to a UTC timestamp.
    ///
    /// A zero or negative serial yields `None`, never the epoch itself:
    /// spreadsheet sources encode "no date" as an empty or zero cell.
    ///
    /// # Examples
    ///
    /// ```
    /// use board_core::cells::SerialDate;
    /// use chrono::{Datelike, Timelike};
    ///
    /// let date = SerialDate::to_datetime(45_292.0).unwrap();
    /// assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 1));
    /// assert_eq!(date.hour(), 0);
    ///
    /// assert!(SerialDate::to_datetime(0.0).is_none());
    /// ```
    pub fn to_datetime(serial: f64) -> Option<DateTime<Utc>> {
        if serial <= 0.0 {
            return None;
        }
        let millis = ((serial - SERIAL_EPOCH_OFFSET_DAYS) * MS_PER_DAY).round() as i64;
        Utc.timestamp_millis_opt(millis).single()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
