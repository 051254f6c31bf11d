//! The driver surface as a trait.
//!
//! `RulesEngine` is what a driver (a test harness, a bot, a UI server)
//! needs to play a game: enumerate legal actions, apply one, and learn
//! when the game is over. `stack::Engine` implements it.

use serde::{Deserialize, Serialize};

use crate::core::{GameConfig, GameState, PlayerAction, PlayerId};
use crate::error::Result;

/// How a finished game ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Winner(PlayerId),
    /// Every remaining player lost at the same time.
    Draw,
}

impl GameOutcome {
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, GameOutcome::Winner(p) if *p == player)
    }
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `legal_actions`: empty when the player can neither act nor answer
/// - `apply_action`: atomic; a rules failure leaves the state unchanged
/// - `outcome`: `None` while the game continues
pub trait RulesEngine {
    fn config(&self) -> &GameConfig;

    /// Every action `player` may take right now.
    fn legal_actions(&self, state: &GameState, player: PlayerId) -> Vec<PlayerAction>;

    /// Apply one action and run the game forward until the next point
    /// where a player must act.
    fn apply_action(&self, state: &mut GameState, player: PlayerId, action: PlayerAction) -> Result<()>;

    fn outcome(&self, state: &GameState) -> Option<GameOutcome> {
        state.outcome().cloned()
    }

    fn is_terminal(&self, state: &GameState) -> bool {
        self.outcome(state).is_some()
    }

    /// The player expected to act next: the one a decision waits on, or
    /// the priority holder.
    fn acting_player(&self, state: &GameState) -> Option<PlayerId> {
        match state.pending_decision() {
            Some(decision) => Some(decision.player),
            None => state.turn().priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_is_winner() {
        let outcome = GameOutcome::Winner(PlayerId::new(1));
        assert!(!outcome.is_winner(PlayerId::new(0)));
        assert!(outcome.is_winner(PlayerId::new(1)));
        assert!(!GameOutcome::Draw.is_winner(PlayerId::new(0)));
    }
}
