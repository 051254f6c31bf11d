//! Entity identification.
//!
//! Every game object (player, card, token, ability on the stack) has a
//! stable `EntityId`. A card keeps its id as it moves between zones.
//!
//! ## ID Layout
//!
//! - `0..player_count`: players
//! - `player_count..`: cards, tokens and stack abilities, allocated in order
//!
//! ```
//! use ccg_rules::core::{EntityId, PlayerId};
//!
//! let p1 = EntityId::player(PlayerId::new(1));
//! assert!(p1.is_player(2));
//! assert_eq!(p1.as_player(2), Some(PlayerId::new(1)));
//!
//! let card = EntityId(10);
//! assert!(!card.is_player(2));
//! ```

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Unique identifier for any game entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Entity id of a player.
    #[must_use]
    pub const fn player(id: PlayerId) -> Self {
        Self(id.0 as u32)
    }

    /// First id available for non-player entities.
    #[must_use]
    pub const fn first_non_player(player_count: usize) -> u32 {
        player_count as u32
    }

    /// Check if this id refers to a player in a game of `player_count`.
    #[must_use]
    pub const fn is_player(self, player_count: usize) -> bool {
        self.0 < player_count as u32
    }

    /// Convert to `PlayerId` if this is a player entity.
    #[must_use]
    pub fn as_player(self, player_count: usize) -> Option<PlayerId> {
        if self.is_player(player_count) {
            Some(PlayerId::new(self.0 as u8))
        } else {
            None
        }
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<PlayerId> for EntityId {
    fn from(player: PlayerId) -> Self {
        Self::player(player)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_range() {
        assert!(EntityId(0).is_player(2));
        assert!(EntityId(1).is_player(2));
        assert!(!EntityId(2).is_player(2));
        assert!(EntityId(3).is_player(4));
        assert_eq!(EntityId::first_non_player(4), 4);
    }

    #[test]
    fn test_as_player() {
        assert_eq!(EntityId(1).as_player(2), Some(PlayerId::new(1)));
        assert_eq!(EntityId(2).as_player(2), None);
        assert_eq!(EntityId::from(PlayerId::new(3)), EntityId(3));
    }

    #[test]
    fn test_ordering_is_numeric() {
        let mut ids = vec![EntityId(12), EntityId(3), EntityId(7)];
        ids.sort();
        assert_eq!(ids, vec![EntityId(3), EntityId(7), EntityId(12)]);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", EntityId(42)), "Entity(42)");
    }
}
