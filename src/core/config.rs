//! Game configuration.
//!
//! `GameConfig` carries the tunable numbers of the rulebook: player count,
//! starting life, land drops, the state-check safety bound and the shuffle
//! seed. It is immutable once handed to the `Engine`.

use serde::{Deserialize, Serialize};

/// Complete game configuration.
///
/// ```
/// use ccg_rules::core::GameConfig;
///
/// let config = GameConfig::new(2)
///     .with_starting_life(30)
///     .with_seed(7);
/// assert_eq!(config.starting_life, 30);
/// assert!(config.skip_first_draw);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of players (2-8).
    pub player_count: usize,

    /// Life total each player starts with.
    pub starting_life: i64,

    /// Lands a player may play each turn.
    pub land_drops_per_turn: u32,

    /// Maximum state-based action passes before reporting divergence.
    pub sba_iteration_cap: u32,

    /// Poison counters at which a player loses.
    pub poison_threshold: u32,

    /// The starting player skips the draw of turn 1.
    pub skip_first_draw: bool,

    /// Seed for library shuffles.
    pub seed: u64,
}

impl GameConfig {
    /// Create a configuration with rulebook defaults.
    pub fn new(player_count: usize) -> Self {
        assert!(player_count >= 2, "Must have at least 2 players");
        assert!(player_count <= 8, "At most 8 players supported");

        Self {
            player_count,
            starting_life: 20,
            land_drops_per_turn: 1,
            sba_iteration_cap: 64,
            poison_threshold: 10,
            skip_first_draw: true,
            seed: 0,
        }
    }

    #[must_use]
    pub fn with_starting_life(mut self, life: i64) -> Self {
        self.starting_life = life;
        self
    }

    #[must_use]
    pub fn with_land_drops(mut self, drops: u32) -> Self {
        self.land_drops_per_turn = drops;
        self
    }

    /// Set the state-based action pass cap.
    #[must_use]
    pub fn with_sba_cap(mut self, cap: u32) -> Self {
        self.sba_iteration_cap = cap;
        self
    }

    #[must_use]
    pub fn with_poison_threshold(mut self, threshold: u32) -> Self {
        self.poison_threshold = threshold;
        self
    }

    /// Whether the first player draws on turn 1.
    #[must_use]
    pub fn with_first_draw(mut self, draw: bool) -> Self {
        self.skip_first_draw = !draw;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(2)
    }
}
