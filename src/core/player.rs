//! Player identification.
//!
//! Turn order is index order; APNAP order starts at the active player and
//! wraps around.

use serde::{Deserialize, Serialize};

/// Player identifier. Indices are 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all player IDs for a game with `player_count` players.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }

    /// The player after this one in turn order.
    #[must_use]
    pub fn next(self, player_count: usize) -> PlayerId {
        PlayerId(((self.index() + 1) % player_count) as u8)
    }

    /// All players in APNAP order: `active` first, then the rest in turn order.
    ///
    /// ```
    /// use ccg_rules::core::PlayerId;
    ///
    /// let order: Vec<_> = PlayerId::apnap(PlayerId::new(2), 4).collect();
    /// assert_eq!(order, vec![PlayerId::new(2), PlayerId::new(3), PlayerId::new(0), PlayerId::new(1)]);
    /// ```
    pub fn apnap(active: PlayerId, player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count).map(move |offset| PlayerId(((active.index() + offset) % player_count) as u8))
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_basics() {
        assert_eq!(PlayerId::new(1).index(), 1);
        assert_eq!(format!("{}", PlayerId::new(0)), "Player 0");
        assert_eq!(PlayerId::new(1).next(2), PlayerId::new(0));
        assert_eq!(PlayerId::new(1).next(3), PlayerId::new(2));
    }

    #[test]
    fn test_apnap_two_player() {
        let order: Vec<_> = PlayerId::apnap(PlayerId::new(1), 2).collect();
        assert_eq!(order, vec![PlayerId::new(1), PlayerId::new(0)]);
    }
}
