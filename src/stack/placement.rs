//! Putting triggered abilities on the stack.
//!
//! Triggers detected over a cycle's events go on the stack in APNAP
//! order: every trigger of the active player first (so they resolve
//! last), then each other player in turn order. A player with several
//! triggers picks them one at a time; each pick goes on the stack next.
//! Targets are chosen as a trigger is put on the stack. A target slot
//! with a single legal choice is filled automatically; one with none
//! removes the trigger.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameState, PlayerId, Targets};
use crate::decision::{DecisionKind, DecisionOption};
use crate::effects::{legal_targets, FilterContext};
use crate::layers::project;
use crate::triggers::{detect, detect_state_triggers, QueuedTrigger, TriggerOrigin};

use super::agenda::{ask, Answer, Work};
use super::engine::Engine;
use super::object::{StackObject, StackObjectKind};

/// A trigger whose targets are being chosen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targeting {
    pub trigger: QueuedTrigger,
    pub chosen: Vec<EntityId>,
}

/// Triggers still waiting to be put on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerPlacement {
    pub queue: Vec<QueuedTrigger>,
    pub current: Option<Targeting>,
}

enum TargetNeed {
    Complete,
    Unfillable,
    Ask(Vec<EntityId>),
}

/// Scan the events logged since `since` and queue what triggered.
pub(crate) fn detect_triggers(engine: &Engine, state: &mut GameState, since: usize) {
    let events = state.log_since(since);
    let view = project(state, engine.registry());
    let detection = detect(&events, state, engine.registry(), &view);
    for fired in &detection.fired_delayed {
        state.remove_delayed_trigger(*fired);
    }

    let mut queue = detection.triggers;
    let waiting: Vec<TriggerOrigin> = queue.iter().map(|trigger| trigger.origin).collect();
    let state_triggers = detect_state_triggers(state, engine.registry(), &view, &waiting);
    for (id, reached) in state_triggers.reached {
        if let Err(err) = state.set(id, reached) {
            log::warn!("threshold record not stored: {err}");
        }
    }
    queue.extend(state_triggers.triggers);
    if queue.is_empty() {
        return;
    }

    log::debug!("{} triggered abilities queued", queue.len());
    state.push_work(Work::PlaceTriggers(TriggerPlacement { queue, current: None }));
}

pub(crate) fn step(engine: &Engine, state: &mut GameState, mut placement: TriggerPlacement, mut answer: Option<Answer>) {
    placement.queue.retain(|trigger| !state.has_lost(trigger.controller));

    loop {
        if let Some(mut current) = placement.current.take() {
            if let Some(DecisionOption::Entity(target)) = answer.take().as_ref().and_then(Answer::option) {
                current.chosen.push(*target);
            }
            match next_target(engine, state, &mut current) {
                TargetNeed::Complete => put_on_stack(state, current),
                TargetNeed::Unfillable => {
                    log::debug!("{:?} has no legal targets and is removed", current.trigger.origin);
                }
                TargetNeed::Ask(options) => {
                    let player = current.trigger.controller;
                    placement.current = Some(current);
                    state.push_work(Work::PlaceTriggers(placement));
                    let options = options.into_iter().map(DecisionOption::Entity).collect();
                    ask(state, player, DecisionKind::ChooseTargets, options);
                    return;
                }
            }
            continue;
        }

        let Some(player) = next_player(state, &placement.queue) else {
            return;
        };
        let theirs: Vec<usize> = placement
            .queue
            .iter()
            .enumerate()
            .filter(|(_, trigger)| trigger.controller == player)
            .map(|(index, _)| index)
            .collect();

        let picked = match (theirs.as_slice(), answer.take()) {
            ([only], _) => Some(*only),
            (_, Some(answer)) => answer.chosen.first().and_then(|choice| theirs.get(*choice)).copied(),
            (_, None) => None,
        };
        let Some(index) = picked else {
            let options = theirs
                .iter()
                .map(|index| {
                    let trigger = &placement.queue[*index];
                    DecisionOption::Trigger {
                        origin: trigger.origin,
                        source: trigger.source,
                    }
                })
                .collect();
            state.push_work(Work::PlaceTriggers(placement));
            ask(state, player, DecisionKind::OrderTriggers, options);
            return;
        };

        let trigger = placement.queue.remove(index);
        placement.current = Some(Targeting {
            trigger,
            chosen: Vec::new(),
        });
    }
}

/// The first player in APNAP order with a trigger waiting.
fn next_player(state: &GameState, queue: &[QueuedTrigger]) -> Option<PlayerId> {
    PlayerId::apnap(state.turn().active, state.player_count())
        .find(|player| queue.iter().any(|trigger| trigger.controller == *player))
}

/// Fill target slots that have a single legal choice; stop at the first
/// slot that needs the controller or cannot be filled.
fn next_target(engine: &Engine, state: &GameState, current: &mut Targeting) -> TargetNeed {
    let view = project(state, engine.registry());
    let ctx = FilterContext::new(state, view.characteristics(), current.trigger.controller)
        .with_source(current.trigger.source);

    while let Some(spec) = current.trigger.targets.get(current.chosen.len()) {
        let legal: Vec<EntityId> = legal_targets(spec, &ctx)
            .into_iter()
            .filter(|target| !current.chosen.contains(target))
            .collect();
        match legal.as_slice() {
            [] => return TargetNeed::Unfillable,
            [only] => current.chosen.push(*only),
            _ => return TargetNeed::Ask(legal),
        }
    }
    TargetNeed::Complete
}

fn put_on_stack(state: &mut GameState, current: Targeting) {
    let Targeting { trigger, chosen } = current;
    let id = state.create_ability(trigger.controller);
    let targets: Targets = chosen.into_iter().chain(trigger.bound_targets).collect();
    log::debug!("{:?} goes on the stack as {}", trigger.origin, id);
    state.push_stack_object(StackObject {
        id,
        controller: trigger.controller,
        source: trigger.source,
        kind: StackObjectKind::Triggered { origin: trigger.origin },
        effects: trigger.effects,
        target_specs: trigger.targets,
        targets,
        x: 0,
        triggering: trigger.triggering,
    });
}
