//! The work agenda.
//!
//! Everything the engine does after an action is a `Work` item on the
//! state's agenda, popped from the back. An item that needs a player's
//! choice leaves a decision pending and pushes itself back; the answer is
//! handed to it when the driver responds, so execution resumes exactly
//! where it stopped.
//!
//! ## Cycle
//!
//! An action, a resolution or a step's turn-based action is followed by
//! the same cycle:
//!
//! ```text
//! first item -> StateChecks (until stable) -> DetectTriggers
//!            -> PlaceTriggers -> FinishCycle (priority)
//! ```

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameState, PlayerId, Step};
use crate::decision::{Decision, DecisionKind, DecisionOption};
use crate::error::{Result, RulesError};
use crate::layers::project;
use crate::rules;

use super::commit::{self, CommitQueue};
use super::engine::Engine;
use super::placement::{self, TriggerPlacement};
use super::resolve::{self, ResolutionFrame};
use super::{priority, turn};

/// One unit of pending engine work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Work {
    /// A stack object resolving, effect by effect.
    Resolve(Box<ResolutionFrame>),
    /// Proposed events to run through replacement effects and commit as one batch.
    Commit(CommitQueue),
    /// State-based actions until nothing applies. `keepers` are legend-rule
    /// choices already made this pass.
    StateChecks { passes: u32, keepers: Vec<EntityId> },
    /// Scan the log from `since` for triggered abilities.
    DetectTriggers { since: usize },
    PlaceTriggers(TriggerPlacement),
    /// The turn-based action of a step that has just begun.
    TurnBased(Step),
    DeclareAttackers,
    /// Ask each defending player in turn.
    DeclareBlockers { defenders: Vec<PlayerId>, index: usize },
    AdvanceStep,
    /// Hand out priority, or move on if the step grants none.
    FinishCycle { keep_priority: Option<PlayerId> },
}

/// A validated answer to the decision the top work item left pending.
#[derive(Clone, Debug)]
pub(crate) struct Answer {
    pub decision: Decision,
    pub chosen: Vec<usize>,
}

impl Answer {
    /// The single option chosen.
    pub fn option(&self) -> Option<&DecisionOption> {
        self.decision.option(&self.chosen)
    }

    /// Every option chosen, in the order given.
    pub fn options(&self) -> impl Iterator<Item = &DecisionOption> {
        self.chosen.iter().filter_map(|index| self.decision.options.get(*index))
    }
}

/// Leave a decision pending for `player`.
pub(crate) fn ask(state: &mut GameState, player: PlayerId, kind: DecisionKind, options: Vec<DecisionOption>) {
    let decision = Decision {
        id: state.next_decision_id(),
        player,
        kind,
        options,
    };
    state.set_pending(decision);
}

/// Queue a cycle: `first`, then state-based actions, trigger detection
/// over every event logged from `since`, and priority.
pub(crate) fn begin_cycle(state: &mut GameState, since: usize, first: Option<Work>, keep_priority: Option<PlayerId>) {
    state.push_work(Work::FinishCycle { keep_priority });
    state.push_work(Work::DetectTriggers { since });
    state.push_work(Work::StateChecks {
        passes: 0,
        keepers: Vec::new(),
    });
    if let Some(first) = first {
        state.push_work(first);
    }
}

/// Run the agenda until a decision is pending, the game is over or no
/// work is left.
pub(crate) fn run(engine: &Engine, state: &mut GameState, mut answer: Option<Answer>) -> Result<()> {
    while !state.is_paused() && state.outcome().is_none() {
        let Some(work) = state.pop_work() else {
            break;
        };
        let answer = answer.take();
        match work {
            Work::Resolve(frame) => resolve::step(engine, state, *frame, answer)?,
            Work::Commit(queue) => commit::step(engine, state, queue, answer)?,
            Work::StateChecks { passes, keepers } => state_checks(engine, state, passes, keepers, answer)?,
            Work::DetectTriggers { since } => placement::detect_triggers(engine, state, since),
            Work::PlaceTriggers(waiting) => placement::step(engine, state, waiting, answer),
            Work::TurnBased(step) => turn::begin_step(engine, state, step)?,
            Work::DeclareAttackers => turn::declare_attackers(engine, state, answer),
            Work::DeclareBlockers { defenders, index } => turn::declare_blockers(engine, state, defenders, index, answer),
            Work::AdvanceStep => turn::advance(state),
            Work::FinishCycle { keep_priority } => priority::finish_cycle(state, keep_priority),
        }
    }
    Ok(())
}

fn state_checks(
    engine: &Engine,
    state: &mut GameState,
    passes: u32,
    mut keepers: Vec<EntityId>,
    answer: Option<Answer>,
) -> Result<()> {
    if let Some(DecisionOption::Entity(keeper)) = answer.as_ref().and_then(Answer::option) {
        keepers.push(*keeper);
    }

    let view = project(state, engine.registry());
    let pass = rules::check(state, &view, engine.registry(), engine.config(), &keepers);

    if let Some(choice) = pass.legend {
        let options = choice.candidates.into_iter().map(DecisionOption::Entity).collect();
        state.push_work(Work::StateChecks { passes, keepers });
        ask(state, choice.player, DecisionKind::ChooseEntity, options);
        return Ok(());
    }
    if pass.events.is_empty() {
        return Ok(());
    }

    let passes = passes + 1;
    if passes > engine.config().sba_iteration_cap {
        return Err(RulesError::StateCheckDivergence { passes });
    }
    log::debug!("state-based actions, pass {}: {} events", passes, pass.events.len());
    state.push_work(Work::StateChecks {
        passes,
        keepers: Vec::new(),
    });
    state.push_work(Work::Commit(CommitQueue::new(pass.events)));
    Ok(())
}
