//! Priority passing.
//!
//! Priority passes in turn order among the players still in the game.
//! When every remaining player has passed in succession, the top stack
//! object resolves, or the step ends if the stack is empty. Any action
//! or resolution resets the count.

use crate::core::{GameState, PlayerId, Step};

use super::agenda::Work;

/// What a pass led to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PassOutcome {
    /// Priority moves on to this player.
    Next(PlayerId),
    /// Everyone passed in succession.
    AllPassed,
}

/// Record a pass by the priority holder.
pub(crate) fn pass(state: &mut GameState, player: PlayerId) -> PassOutcome {
    let remaining = state.remaining_players().len() as u32;
    let next = state.first_remaining_from(player.next(state.player_count()));

    let turn = state.turn_mut();
    turn.passes += 1;
    match next {
        Some(next) if turn.passes < remaining => {
            turn.priority = Some(next);
            PassOutcome::Next(next)
        }
        _ => {
            turn.passes = 0;
            turn.priority = None;
            PassOutcome::AllPassed
        }
    }
}

/// End of a cycle: the active player (or `keep_priority`) receives
/// priority. Steps without priority move on once the stack is empty; a
/// cleanup step that hands out priority is followed by another one.
pub(crate) fn finish_cycle(state: &mut GameState, keep_priority: Option<PlayerId>) {
    if !state.turn().step.grants_priority() && state.stack_is_empty() {
        state.push_work(Work::AdvanceStep);
        return;
    }
    if state.turn().step == Step::Cleanup {
        state.turn_mut().cleanup_again = true;
    }

    let holder = keep_priority
        .filter(|player| !state.has_lost(*player))
        .or_else(|| state.first_remaining_from(state.turn().active));
    let turn = state.turn_mut();
    turn.priority = holder;
    turn.passes = 0;
}
