//! Resolving the top stack object.
//!
//! A `ResolutionFrame` walks the object's effects in order. Targets are
//! checked once, when resolution begins: if every target has become
//! illegal the object fizzles, otherwise illegal targets are skipped by
//! the effects that name them. Each effect's events commit as their own
//! batch before the next effect runs.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameState};
use crate::decision::DecisionOption;
use crate::effects::resolver::{resolve_choices, resolve_effect, Choice, EffectStep, Registration, ResolverContext};
use crate::effects::{check_target, Effect, FilterContext};
use crate::error::{Result, RulesError};
use crate::layers::{project, AffectedSet, ContinuousEffect, ProjectedView};
use crate::replacement::RegisteredReplacement;
use crate::triggers::{DelayedTrigger, GameEvent, ProposedEvent};
use crate::zones::{ZoneKey, ZoneKind, ZonePosition};

use super::agenda::{ask, Answer, Work};
use super::commit::CommitQueue;
use super::engine::Engine;
use super::object::{StackObject, StackObjectKind};

/// An effect waiting on one or more choices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChoice {
    pub effect: Effect,
    pub choices: Vec<Choice>,
    pub chosen: Vec<DecisionOption>,
}

/// Progress through a resolving stack object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionFrame {
    pub object: StackObject,
    /// Targets as checked on resolution; `None` where one became illegal.
    pub legal: Vec<Option<EntityId>>,
    /// Effects still to run, next first.
    pub effects: VecDeque<Effect>,
    pub started: bool,
    pub choice: Option<PendingChoice>,
}

impl ResolutionFrame {
    #[must_use]
    pub fn new(object: StackObject) -> Self {
        Self {
            effects: object.effects.iter().cloned().collect(),
            object,
            legal: Vec::new(),
            started: false,
            choice: None,
        }
    }
}

pub(crate) fn step(engine: &Engine, state: &mut GameState, mut frame: ResolutionFrame, mut answer: Option<Answer>) -> Result<()> {
    let registry = engine.registry();

    if !frame.started {
        frame.started = true;
        log::debug!("resolving {} ({:?})", frame.object.id, frame.object.kind);
        frame.legal = recheck_targets(engine, state, &frame.object);
        let slots = frame.object.target_specs.len().min(frame.legal.len());
        if slots > 0 && frame.legal[..slots].iter().all(Option::is_none) {
            return fizzle(state, &frame.object);
        }
    }

    loop {
        if let Some(mut pending) = frame.choice.take() {
            if let Some(option) = answer.take().as_ref().and_then(Answer::option) {
                pending.chosen.push(option.clone());
            }
            if let Some(next) = pending.choices.get(pending.chosen.len()).cloned() {
                frame.choice = Some(pending);
                state.push_work(Work::Resolve(Box::new(frame)));
                ask(state, next.player, next.kind, next.options);
                return Ok(());
            }
            let view = project(state, registry);
            let ctx = context(state, &view, engine, &frame);
            let outcome = resolve_choices(&pending.effect, &ctx, &pending.chosen);
            if carry_out(state, &mut frame, pending.effect, outcome) {
                return Ok(());
            }
            continue;
        }

        let Some(effect) = frame.effects.pop_front() else {
            return finish(engine, state, &frame);
        };
        let view = project(state, registry);
        let ctx = context(state, &view, engine, &frame);
        let outcome = resolve_effect(&effect, &ctx);
        if carry_out(state, &mut frame, effect, outcome) {
            return Ok(());
        }
    }
}

fn context<'a>(
    state: &'a GameState,
    view: &'a ProjectedView,
    engine: &'a Engine,
    frame: &'a ResolutionFrame,
) -> ResolverContext<'a> {
    ResolverContext {
        state,
        view,
        registry: engine.registry(),
        controller: frame.object.controller,
        source: frame.object.source,
        targets: &frame.legal,
        x: frame.object.x,
        triggering: frame.object.triggering,
    }
}

/// Act on one interpreted effect. Returns `true` when the frame has been
/// handed back to the agenda and the current step must end.
fn carry_out(state: &mut GameState, frame: &mut ResolutionFrame, effect: Effect, outcome: EffectStep) -> bool {
    match outcome {
        EffectStep::Done => false,
        EffectStep::Events(events) => {
            state.push_work(Work::Resolve(Box::new(frame.clone())));
            state.push_work(Work::Commit(CommitQueue::new(events)));
            true
        }
        EffectStep::Register(registrations) => {
            for registration in registrations {
                register(state, &frame.object, registration);
            }
            false
        }
        EffectStep::Choose(choices) => {
            frame.choice = Some(PendingChoice {
                effect,
                choices,
                chosen: Vec::new(),
            });
            false
        }
        EffectStep::Splice(effects) => {
            for effect in effects.into_iter().rev() {
                frame.effects.push_front(effect);
            }
            false
        }
    }
}

fn register(state: &mut GameState, object: &StackObject, registration: Registration) {
    match registration {
        Registration::Continuous {
            modification,
            affected,
            duration,
        } => {
            let effect = ContinuousEffect {
                id: state.next_effect_id(),
                source: object.source,
                controller: object.controller,
                modification,
                affected: AffectedSet::Entities(affected),
                duration,
                timestamp: state.next_timestamp(),
            };
            log::trace!("continuous effect {:?} from {}", effect.id, object.id);
            state.add_effect(effect);
        }
        Registration::Replacement { effect, duration } => {
            let registered = RegisteredReplacement {
                id: state.next_replacement_id(),
                source: object.source,
                controller: object.controller,
                effect,
                duration,
            };
            state.add_replacement(registered);
        }
        Registration::Delayed { when, effects, targets } => {
            let trigger = DelayedTrigger {
                id: state.next_delayed_id(),
                controller: object.controller,
                source: object.source,
                when,
                effects,
                targets,
            };
            state.add_delayed_trigger(trigger);
        }
    }
}

/// Check each chosen target against its slot. Targets beyond the slots
/// were fixed earlier and stay as they are.
fn recheck_targets(engine: &Engine, state: &GameState, object: &StackObject) -> Vec<Option<EntityId>> {
    let view = project(state, engine.registry());
    let ctx = FilterContext::new(state, view.characteristics(), object.controller).with_source(object.source);
    object
        .targets
        .iter()
        .enumerate()
        .map(|(index, target)| match object.target_specs.get(index) {
            Some(spec) => check_target(spec, *target, &ctx).ok().map(|()| *target),
            None => Some(*target),
        })
        .collect()
}

/// Remove an object whose targets are all gone, without any effect.
fn fizzle(state: &mut GameState, object: &StackObject) -> Result<()> {
    log::debug!("{} fizzles", object.id);
    state.begin_batch();
    if object.is_spell() {
        let owner = state.entity(object.id).ok_or(RulesError::NoSuchEntity(object.id))?.owner;
        let moved = state.move_entity(object.id, ZoneKey::stack(), ZoneKey::graveyard(owner), ZonePosition::Top)?;
        state.log_event(moved, None);
    } else {
        state.remove_entity(object.id)?;
    }
    state.log_event(GameEvent::Fizzled { object: object.id }, None);
    Ok(())
}

/// After the last effect: a permanent spell enters the battlefield, any
/// other spell goes to its owner's graveyard, an ability ceases to exist.
fn finish(engine: &Engine, state: &mut GameState, frame: &ResolutionFrame) -> Result<()> {
    let object = &frame.object;
    if state.stack_object(object.id).is_none() {
        return Ok(());
    }
    log::debug!("{} resolved", object.id);

    match object.kind {
        StackObjectKind::Spell => {
            let definition = state
                .entity(object.id)
                .and_then(|record| record.definition)
                .and_then(|card| engine.registry().get(card))
                .ok_or(RulesError::NoSuchEntity(object.id))?;

            let mut events = Vec::new();
            if definition.is_permanent() {
                events.push(ProposedEvent::MoveZone {
                    entity: object.id,
                    from: ZoneKind::Stack,
                    to: ZoneKind::Battlefield,
                    position: ZonePosition::Top,
                });
                if let Some(Some(host)) = frame.legal.first().filter(|_| definition.is_aura()) {
                    events.push(ProposedEvent::Attach {
                        entity: object.id,
                        to: *host,
                    });
                }
            } else {
                events.push(ProposedEvent::MoveZone {
                    entity: object.id,
                    from: ZoneKind::Stack,
                    to: ZoneKind::Graveyard,
                    position: ZonePosition::Top,
                });
            }
            state.push_work(Work::Commit(CommitQueue::new(events)));
        }
        StackObjectKind::Activated { .. } | StackObjectKind::Triggered { .. } => {
            state.remove_entity(object.id)?;
        }
    }
    Ok(())
}
