/// Format an integer count with thousands separators.
///
/// # Examples
///
/// ```
/// use board_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1_234), "1,234");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format an integer win-rate percentage for display.
///
/// # Examples
///
/// ```
/// use board_core::formatting::format_percent;
///
/// assert_eq!(format_percent(0), "0%");
/// assert_eq!(format_percent(57), "57%");
/// ```
pub fn format_percent(pct: u32) -> String {
    format!("{}%", pct)
}

/// Format an optional power estimate, using a dash placeholder when absent.
///
/// Whole numbers drop the fractional part; everything else keeps one
/// decimal place.
///
/// # Examples
///
/// ```
/// use board_core::formatting::format_power;
///
/// assert_eq!(format_power(Some(7.0)), "7");
/// assert_eq!(format_power(Some(7.5)), "7.5");
/// assert_eq!(format_power(None), "-");
/// ```
pub fn format_power(power: Option<f64>) -> String {
    match power {
        Some(p) if p.fract() == 0.0 => format!("{}", p as i64),
        Some(p) => format!("{:.1}", p),
        None => "-".to_string(),
    }
}

/// Render a themes list for a single table cell.
///
/// Empty lists render as the same dash placeholder as missing power.
pub fn format_themes(themes: &[String]) -> String {
    if themes.is_empty() {
        "-".to_string()
    } else {
        themes.join(", ")
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
