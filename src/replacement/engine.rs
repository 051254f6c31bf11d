//! Applying replacement effects to a proposed event.
//!
//! Each replacement effect applies at most once to an event and to
//! everything that event turns into. When more than one applies, the
//! affected object's controller (or the affected player) picks which goes
//! first; the rest are checked again against the modified event.

use serde::{Deserialize, Serialize};

use crate::cards::CardRegistry;
use crate::core::{EntityId, GameState, PlayerId};
use crate::layers::{Duration, ProjectedView};
use crate::triggers::ProposedEvent;
use crate::zones::{ZoneKey, ZoneKind};

use super::effect::{ReplacementAction, ReplacementEffect, ReplacementKey, ReplacementMatcher};

/// An event on its way to being committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCommit {
    pub event: ProposedEvent,
    /// Replacement effects already applied to this event.
    pub applied: Vec<ReplacementKey>,
}

impl PendingCommit {
    #[must_use]
    pub fn new(event: ProposedEvent) -> Self {
        Self {
            event,
            applied: Vec::new(),
        }
    }
}

impl From<ProposedEvent> for PendingCommit {
    fn from(event: ProposedEvent) -> Self {
        Self::new(event)
    }
}

/// Result of running an event through the replacement effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplacementOutcome {
    /// No further replacement applies; commit this event.
    Commit(ProposedEvent),
    /// The event was replaced by nothing.
    Prevented,
    /// Several replacements apply; `chooser` picks one of `options`.
    Choose {
        pending: PendingCommit,
        chooser: PlayerId,
        options: Vec<ReplacementKey>,
    },
}

struct Candidate<'a> {
    key: ReplacementKey,
    source: EntityId,
    controller: PlayerId,
    effect: &'a ReplacementEffect,
}

fn candidates<'a>(state: &'a GameState, view: &ProjectedView, registry: &'a CardRegistry) -> Vec<Candidate<'a>> {
    let mut found = Vec::new();
    for (source, chars) in view.battlefield() {
        if chars.abilities_removed {
            continue;
        }
        let Some(definition) = chars.definition.and_then(|card| registry.get(card)) else {
            continue;
        };
        for (index, effect) in definition.replacements.iter().enumerate() {
            found.push(Candidate {
                key: ReplacementKey::Static { source, index },
                source,
                controller: chars.controller,
                effect,
            });
        }
    }
    for registered in state.replacements() {
        let active = match &registered.duration {
            Duration::UntilEndOfTurn | Duration::Indefinite => true,
            Duration::WhileSourceOnBattlefield => state.zones().zone_of(registered.source) == Some(ZoneKey::battlefield()),
            Duration::While(condition) => condition.holds(registered.source, registered.controller, state),
        };
        if active {
            found.push(Candidate {
                key: ReplacementKey::Registered(registered.id),
                source: registered.source,
                controller: registered.controller,
                effect: &registered.effect,
            });
        }
    }
    found
}

impl Candidate<'_> {
    fn matches(&self, event: &ProposedEvent, view: &ProjectedView, player_count: usize) -> bool {
        let includes = |subject: &super::Subject, entity: EntityId| {
            subject.includes(entity, self.source, self.controller, view, player_count)
        };
        match (&self.effect.matcher, event) {
            (
                ReplacementMatcher::WouldDie(subject),
                ProposedEvent::MoveZone {
                    entity,
                    from: ZoneKind::Battlefield,
                    to: ZoneKind::Graveyard,
                    ..
                },
            ) => view.is_creature(*entity) && includes(subject, *entity),
            (ReplacementMatcher::WouldBeDealtDamage(subject), ProposedEvent::Damage(damage)) => {
                includes(subject, damage.target)
            }
            (ReplacementMatcher::WouldGainLife(subject), ProposedEvent::GainLife { player, .. }) => {
                includes(subject, EntityId::player(*player))
            }
            (ReplacementMatcher::WouldPutCounters(subject), ProposedEvent::PutCounters { entity, .. }) => {
                includes(subject, *entity)
            }
            (ReplacementMatcher::WouldDraw(subject), ProposedEvent::Draw { player }) => {
                includes(subject, EntityId::player(*player))
            }
            _ => false,
        }
    }

    /// The event after this replacement, or `None` if nothing happens instead.
    fn replace(&self, event: ProposedEvent) -> Option<ProposedEvent> {
        match (&self.effect.action, event) {
            (ReplacementAction::Prevent, _) | (ReplacementAction::SkipDraw, ProposedEvent::Draw { .. }) => None,
            (ReplacementAction::ChangeDestination(zone), ProposedEvent::MoveZone { entity, from, position, .. }) => {
                Some(ProposedEvent::MoveZone {
                    entity,
                    from,
                    to: *zone,
                    position,
                })
            }
            (ReplacementAction::RedirectDamage(subject), ProposedEvent::Damage(mut damage)) => {
                if let Some(target) = subject.resolve(self.source, self.controller) {
                    damage.target = target;
                }
                Some(ProposedEvent::Damage(damage))
            }
            (ReplacementAction::ModifyAmount(change), event) => match event {
                ProposedEvent::Damage(mut damage) => {
                    damage.amount = change.apply(damage.amount);
                    (damage.amount > 0).then_some(ProposedEvent::Damage(damage))
                }
                ProposedEvent::GainLife { player, amount } => {
                    let amount = change.apply(amount);
                    (amount > 0).then_some(ProposedEvent::GainLife { player, amount })
                }
                ProposedEvent::PutCounters { entity, kind, amount } => {
                    let amount = change.apply(amount);
                    (amount > 0).then_some(ProposedEvent::PutCounters { entity, kind, amount })
                }
                other => Some(other),
            },
            (_, event) => Some(event),
        }
    }
}

fn chooser(event: &ProposedEvent, state: &GameState, view: &ProjectedView) -> PlayerId {
    let affected = event.affected();
    if let Some(player) = affected.as_player(state.player_count()) {
        return player;
    }
    view.controller(affected)
        .or_else(|| state.entity(affected).map(|record| record.owner))
        .unwrap_or(state.turn().active)
}

/// Run an event through every applicable replacement effect.
#[must_use]
pub fn apply(
    mut pending: PendingCommit,
    state: &GameState,
    view: &ProjectedView,
    registry: &CardRegistry,
) -> ReplacementOutcome {
    let player_count = state.player_count();
    loop {
        let all = candidates(state, view, registry);
        let applicable: Vec<&Candidate> = all
            .iter()
            .filter(|c| !pending.applied.contains(&c.key) && c.matches(&pending.event, view, player_count))
            .collect();

        match applicable.as_slice() {
            [] => return ReplacementOutcome::Commit(pending.event),
            [only] => {
                log::trace!("replacement {:?} applies to {:?}", only.key, pending.event);
                pending.applied.push(only.key);
                match only.replace(pending.event) {
                    Some(event) => pending.event = event,
                    None => return ReplacementOutcome::Prevented,
                }
            }
            several => {
                let options = several.iter().map(|c| c.key).collect();
                let chooser = chooser(&pending.event, state, view);
                return ReplacementOutcome::Choose {
                    pending,
                    chooser,
                    options,
                };
            }
        }
    }
}

/// Apply the replacement `key` a player chose, then continue with the rest.
#[must_use]
pub fn apply_chosen(
    mut pending: PendingCommit,
    key: ReplacementKey,
    state: &GameState,
    view: &ProjectedView,
    registry: &CardRegistry,
) -> ReplacementOutcome {
    let all = candidates(state, view, registry);
    let chosen = all
        .iter()
        .find(|c| c.key == key && !pending.applied.contains(&key) && c.matches(&pending.event, view, state.player_count()));
    if let Some(candidate) = chosen {
        log::trace!("replacement {:?} chosen for {:?}", key, pending.event);
        pending.applied.push(key);
        match candidate.replace(pending.event) {
            Some(event) => pending.event = event,
            None => return ReplacementOutcome::Prevented,
        }
    }
    apply(pending, state, view, registry)
}
