//! Triggered-ability detection.
//!
//! Detection runs once per action cycle over every event the cycle logged:
//! the action's own events and those of every state-based batch chained
//! from it. An ability triggers once per matching event.
//!
//! ## Which abilities can see an event
//!
//! - Permanents on the battlefield that were present when the event
//!   happened. A permanent entering in the same batch as the event counts
//!   as present, so simultaneous entries see each other.
//! - Permanents that have since left the battlefield, using their last
//!   known abilities and controller, if they were present for the event.
//!   This is how a creature killed by a state-based action still sees its
//!   own death.
//! - Delayed triggers registered on the state. They fire once.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cards::{CardId, CardRegistry, TriggeredAbility};
use crate::core::{EnteredAt, EntityId, GameState, PlayerId, Step, ThresholdsReached};
use crate::effects::{Effect, TargetSpec};
use crate::layers::ProjectedView;
use crate::stack::StackObjectKind;

use super::condition::{TriggerCondition, TriggerContext, TriggerMatch};
use super::event::{GameEvent, LoggedEvent};

/// Identifier of a registered delayed trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DelayedTriggerId(pub u32);

/// When a delayed trigger fires, bound to concrete objects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelayedWhen {
    StepBegins(Step),
    LeavesBattlefield(EntityId),
}

/// A one-shot trigger created by a resolving spell or ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayedTrigger {
    pub id: DelayedTriggerId,
    pub controller: PlayerId,
    pub source: EntityId,
    pub when: DelayedWhen,
    pub effects: Vec<Effect>,
    /// Objects the effects refer to as `Target(n)`, fixed at creation.
    pub targets: Vec<EntityId>,
}

/// Which ability a queued trigger belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TriggerOrigin {
    Printed { source: EntityId, index: usize },
    Delayed(DelayedTriggerId),
}

/// A triggered ability waiting to be put on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedTrigger {
    pub origin: TriggerOrigin,
    pub controller: PlayerId,
    pub source: EntityId,
    pub triggering: Option<EntityId>,
    /// Target slots still to be chosen.
    pub targets: Vec<TargetSpec>,
    /// Targets already fixed (delayed triggers).
    pub bound_targets: Vec<EntityId>,
    pub effects: Vec<Effect>,
}

impl QueuedTrigger {
    fn printed(source: EntityId, index: usize, controller: PlayerId, ability: &TriggeredAbility, found: TriggerMatch) -> Self {
        Self {
            origin: TriggerOrigin::Printed { source, index },
            controller,
            source,
            triggering: found.triggering,
            targets: ability.targets.clone(),
            bound_targets: Vec::new(),
            effects: ability.effects.clone(),
        }
    }
}

/// Result of scanning a cycle's events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Detection {
    pub triggers: Vec<QueuedTrigger>,
    /// Delayed triggers that fired and must be removed.
    pub fired_delayed: Vec<DelayedTriggerId>,
}

/// An object that could see an event: id, controller and its abilities.
struct Observer<'a> {
    source: EntityId,
    controller: PlayerId,
    abilities: &'a [TriggeredAbility],
}

fn abilities_of(registry: &CardRegistry, definition: Option<CardId>) -> &[TriggeredAbility] {
    definition
        .and_then(|card| registry.get(card))
        .map_or(&[], |definition| definition.triggers.as_slice())
}

/// Objects that were on the battlefield when `at` happened.
fn observers<'a>(
    at: &LoggedEvent,
    events: &[LoggedEvent],
    state: &GameState,
    registry: &'a CardRegistry,
    view: &ProjectedView,
) -> Vec<Observer<'a>> {
    let mut found: BTreeMap<EntityId, Observer<'a>> = BTreeMap::new();

    for (id, chars) in view.battlefield() {
        let entered = state.get::<EnteredAt>(id).map_or(0, |e| e.batch);
        if entered > at.batch || chars.abilities_removed {
            continue;
        }
        found.insert(
            id,
            Observer {
                source: id,
                controller: chars.controller,
                abilities: abilities_of(registry, chars.definition),
            },
        );
    }

    for departure in events.iter().filter(|e| e.batch >= at.batch) {
        let (Some(id), Some(last_known)) = (departure.event.left_battlefield(), departure.last_known.as_ref()) else {
            continue;
        };
        if found.contains_key(&id) || last_known.entered_batch > at.batch || last_known.abilities_removed {
            continue;
        }
        found.insert(
            id,
            Observer {
                source: id,
                controller: last_known.controller,
                abilities: abilities_of(registry, last_known.definition),
            },
        );
    }

    found.into_values().collect()
}

fn delayed_fires(trigger: &DelayedTrigger, event: &GameEvent) -> Option<Option<EntityId>> {
    match (&trigger.when, event) {
        (DelayedWhen::StepBegins(step), GameEvent::StepBegan { step: began, .. }) if step == began => Some(None),
        (DelayedWhen::LeavesBattlefield(watched), event) if event.left_battlefield() == Some(*watched) => {
            Some(Some(*watched))
        }
        _ => None,
    }
}

/// Find every ability that triggers on `events`.
pub fn detect(events: &[LoggedEvent], state: &GameState, registry: &CardRegistry, view: &ProjectedView) -> Detection {
    let mut detection = Detection::default();

    for event in events {
        for observer in observers(event, events, state, registry, view) {
            for (index, ability) in observer.abilities.iter().enumerate() {
                if ability.condition.is_state_trigger() {
                    continue;
                }
                let ctx = TriggerContext {
                    source: observer.source,
                    controller: observer.controller,
                    view,
                };
                if let Some(found) = ability.condition.matches(event, &ctx) {
                    detection.triggers.push(QueuedTrigger::printed(
                        observer.source,
                        index,
                        observer.controller,
                        ability,
                        found,
                    ));
                }
            }
        }

        for delayed in state.delayed_triggers() {
            if detection.fired_delayed.contains(&delayed.id) {
                continue;
            }
            if let Some(triggering) = delayed_fires(delayed, &event.event) {
                detection.fired_delayed.push(delayed.id);
                detection.triggers.push(QueuedTrigger {
                    origin: TriggerOrigin::Delayed(delayed.id),
                    controller: delayed.controller,
                    source: delayed.source,
                    triggering,
                    targets: Vec::new(),
                    bound_targets: delayed.targets.clone(),
                    effects: delayed.effects.clone(),
                });
            }
        }
    }

    if !detection.triggers.is_empty() {
        log::debug!("{} abilities triggered over {} events", detection.triggers.len(), events.len());
    }
    detection
}

/// State triggers found at the end of a cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateDetection {
    pub triggers: Vec<QueuedTrigger>,
    /// New reached-threshold sets for permanents whose set changed.
    pub reached: Vec<(EntityId, ThresholdsReached)>,
}

/// Find counter thresholds crossed since the last check.
///
/// A threshold ability fires when its count is at or above the threshold
/// now but was not at the previous check, and no instance of it is
/// already waiting or on the stack. The reached sets returned must be
/// stored so the next check compares against them.
pub fn detect_state_triggers(
    state: &GameState,
    registry: &CardRegistry,
    view: &ProjectedView,
    waiting: &[TriggerOrigin],
) -> StateDetection {
    let on_stack: Vec<TriggerOrigin> = state
        .stack_objects()
        .filter_map(|object| match object.kind {
            StackObjectKind::Triggered { origin } => Some(origin),
            _ => None,
        })
        .collect();

    let mut detection = StateDetection::default();
    for (id, chars) in view.battlefield() {
        let before = state.get::<ThresholdsReached>(id).cloned().unwrap_or_default();
        let mut now = ThresholdsReached::default();
        if !chars.abilities_removed {
            for (index, ability) in abilities_of(registry, chars.definition).iter().enumerate() {
                let TriggerCondition::CounterThreshold { kind, at_least } = &ability.condition else {
                    continue;
                };
                if chars.counters.count(kind) < *at_least {
                    continue;
                }
                now.0.insert(index);
                let origin = TriggerOrigin::Printed { source: id, index };
                if before.0.contains(&index) || waiting.contains(&origin) || on_stack.contains(&origin) {
                    continue;
                }
                log::debug!("state trigger of {id} reached {at_least} {kind} counters");
                detection.triggers.push(QueuedTrigger::printed(
                    id,
                    index,
                    chars.controller,
                    ability,
                    TriggerMatch { triggering: Some(id) },
                ));
            }
        }
        if now != before {
            detection.reached.push((id, now));
        }
    }
    detection
}
