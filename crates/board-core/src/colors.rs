//! Static color-identity registry.
//!
//! Fixed code → display-name mappings, loaded once and read-only
//! thereafter. The registry order is the canonical display and tie-break
//! order for color tallies.

/// Immutable configuration record for a single color identity code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorInfo {
    /// Single-letter color code as returned by the card-metadata lookup.
    pub code: &'static str,
    /// Human-readable display name.
    pub name: &'static str,
}

/// The registry, in canonical order.
const REGISTRY: &[ColorInfo] = &[
    ColorInfo { code: "W", name: "White" },
    ColorInfo { code: "U", name: "Blue" },
    ColorInfo { code: "B", name: "Black" },
    ColorInfo { code: "R", name: "Red" },
    ColorInfo { code: "G", name: "Green" },
    ColorInfo { code: "C", name: "Colorless" },
];

/// Registry of all color identities with static helper methods.
pub struct Colors;

impl Colors {
    /// All color records in canonical order.
    pub fn all() -> &'static [ColorInfo] {
        REGISTRY
    }

    /// Display name for a code, or `None` for unknown codes.
    pub fn display_name(code: &str) -> Option<&'static str> {
        REGISTRY.iter().find(|c| c.code == code).map(|c| c.name)
    }

    /// Position of a code in the canonical order. Unknown codes sort after
    /// all known ones.
    pub fn sort_index(code: &str) -> usize {
        REGISTRY
            .iter()
            .position(|c| c.code == code)
            .unwrap_or(REGISTRY.len())
    }

    /// Returns `true` if `code` is a recognised color code.
    pub fn is_known(code: &str) -> bool {
        REGISTRY.iter().any(|c| c.code == code)
    }

    /// Compact label for a set of codes, in canonical order.
    ///
    /// An empty set renders as `"C"` (colorless).
    pub fn label(codes: &[String]) -> String {
        if codes.is_empty() {
            return "C".to_string();
        }
        let mut sorted: Vec<&str> = codes.iter().map(String::as_str).collect();
        sorted.sort_by_key(|code| Self::sort_index(code));
        sorted.dedup();
        sorted.concat()
    }
}
