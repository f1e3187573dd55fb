use crate::models::Deck;

/// Win rate as an integer percentage in `[0, 100]`.
///
/// Returns 0 when `games` is 0 (explicit division-by-zero guard).
/// Rounds to the nearest integer, half away from zero: 37.5 % → 38.
///
/// # Examples
///
/// ```
/// use board_core::stats::win_rate;
///
/// assert_eq!(win_rate(0, 0), 0);
/// assert_eq!(win_rate(1, 2), 50);
/// assert_eq!(win_rate(3, 8), 38);
/// ```
pub fn win_rate(wins: u32, games: u32) -> u32 {
    if games == 0 {
        return 0;
    }
    ((100.0 * wins as f64) / games as f64).round() as u32
}

/// Interface for any record that carries a win/game tally and can therefore
/// report a win rate.
pub trait WinLoss {
    /// Games won.
    fn wins(&self) -> u32;
    /// Games recorded.
    fn games(&self) -> u32;

    /// Win rate as an integer percentage; see [`win_rate`].
    fn win_rate(&self) -> u32 {
        win_rate(self.wins(), self.games())
    }
}

impl WinLoss for Deck {
    fn wins(&self) -> u32 {
        self.wins
    }

    fn games(&self) -> u32 {
        self.games
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
