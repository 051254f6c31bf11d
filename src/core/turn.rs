//! Turn structure: steps and the turn pointer.
//!
//! A turn is a fixed sequence of twelve steps. The `TurnState` records
//! where the game is in that sequence, who the active player is and who
//! holds priority.

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Steps of a turn, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    Untap,
    Upkeep,
    Draw,
    PreCombatMain,
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    CombatDamage,
    EndCombat,
    PostCombatMain,
    End,
    Cleanup,
}

impl Step {
    pub const ALL: [Step; 12] = [
        Step::Untap,
        Step::Upkeep,
        Step::Draw,
        Step::PreCombatMain,
        Step::BeginCombat,
        Step::DeclareAttackers,
        Step::DeclareBlockers,
        Step::CombatDamage,
        Step::EndCombat,
        Step::PostCombatMain,
        Step::End,
        Step::Cleanup,
    ];

    /// The following step of the same turn. `None` after cleanup.
    #[must_use]
    pub fn next(self) -> Option<Step> {
        let index = Step::ALL.iter().position(|s| *s == self)?;
        Step::ALL.get(index + 1).copied()
    }

    /// Players receive priority in every step except untap and cleanup.
    #[must_use]
    pub fn grants_priority(self) -> bool {
        !matches!(self, Step::Untap | Step::Cleanup)
    }

    #[must_use]
    pub fn is_main(self) -> bool {
        matches!(self, Step::PreCombatMain | Step::PostCombatMain)
    }

    /// Skipped when no attackers were declared this turn.
    #[must_use]
    pub fn needs_attackers(self) -> bool {
        matches!(self, Step::DeclareBlockers | Step::CombatDamage)
    }
}

/// Where the game is in the turn sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Turn number, starting at 1.
    pub turn: u32,
    pub step: Step,
    pub active: PlayerId,
    /// `None` while no player may act (turn-based actions, untap, cleanup).
    pub priority: Option<PlayerId>,
    /// Consecutive passes since the last action or resolution.
    pub passes: u32,
    pub attackers_declared: bool,
    /// Players received priority during this cleanup step, so another
    /// cleanup step follows.
    pub cleanup_again: bool,
    /// Set once the game has been started.
    pub started: bool,
}

impl TurnState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            turn: 1,
            step: Step::Untap,
            active: PlayerId::new(0),
            priority: None,
            passes: 0,
            attackers_declared: false,
            cleanup_again: false,
            started: false,
        }
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_sequence() {
        assert_eq!(Step::Untap.next(), Some(Step::Upkeep));
        assert_eq!(Step::CombatDamage.next(), Some(Step::EndCombat));
        assert_eq!(Step::Cleanup.next(), None);
        assert_eq!(Step::ALL.len(), 12);
    }

    #[test]
    fn test_priority_steps() {
        assert!(!Step::Untap.grants_priority());
        assert!(!Step::Cleanup.grants_priority());
        assert!(Step::Upkeep.grants_priority());
        assert!(Step::PostCombatMain.is_main());
        assert!(Step::DeclareBlockers.needs_attackers());
        assert!(!Step::DeclareAttackers.needs_attackers());
    }

    #[test]
    fn test_initial_turn() {
        let turn = TurnState::new();
        assert_eq!(turn.turn, 1);
        assert_eq!(turn.step, Step::Untap);
        assert_eq!(turn.priority, None);
        assert!(!turn.started);
    }
}
