//! State-based actions.
//!
//! Checked after every action, before anyone receives priority. One call
//! to [`check`] is one pass: every qualifying action is collected and the
//! engine commits them together as a single batch, then checks again until
//! nothing qualifies.
//!
//! ## Pass order
//!
//! 1. Players at zero life, who drew from an empty library, or at the
//!    poison threshold lose.
//! 2. Creatures with toughness 0 or less go to the graveyard; creatures
//!    with lethal or deathtouch damage are destroyed unless indestructible.
//! 3. Auras attached to an illegal or missing object go to the graveyard;
//!    Equipment attached to a non-creature becomes unattached.
//! 4. `+1/+1` and `-1/-1` counters annihilate in pairs.
//! 5. Legend rule.
//! 6. Tokens outside the battlefield cease to exist.

use std::collections::{BTreeMap, BTreeSet};

use crate::cards::{CardRegistry, CounterKind, Keyword};
use crate::core::{
    AttachedTo, Counters, Damage, DeathtouchDamage, DrewFromEmpty, EntityId, EntityKind, GameConfig, GameState,
    LossReason, PlayerId,
};
use crate::effects::FilterContext;
use crate::layers::{Characteristics, ProjectedView};
use crate::triggers::ProposedEvent;
use crate::zones::{ZoneKey, ZoneKind};

/// A legend-rule violation its controller must resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegendChoice {
    pub player: PlayerId,
    /// The same-named legendary permanents, in id order. One is kept.
    pub candidates: Vec<EntityId>,
}

/// Result of one state-based pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatePass {
    pub events: Vec<ProposedEvent>,
    /// A legend-rule group with no keeper chosen yet. When set, `events`
    /// is incomplete and the pass must be repeated once a keeper is known.
    pub legend: Option<LegendChoice>,
}

impl StatePass {
    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.events.is_empty() && self.legend.is_none()
    }
}

/// Collect every state-based action that currently applies.
///
/// `keepers` are legendary permanents already chosen to stay this pass.
#[must_use]
pub fn check(
    state: &GameState,
    view: &ProjectedView,
    registry: &CardRegistry,
    config: &GameConfig,
    keepers: &[EntityId],
) -> StatePass {
    let mut pass = StatePass::default();
    let mut moved = BTreeSet::new();

    check_players(state, config, &mut pass.events);
    check_creatures(state, view, &mut pass.events, &mut moved);
    check_attachments(state, view, registry, &mut pass.events, &mut moved);
    check_counters(view, &mut pass.events, &moved);
    pass.legend = check_legend_rule(view, keepers, &mut pass.events, &mut moved);
    check_tokens(state, &mut pass.events);

    if !pass.events.is_empty() {
        log::debug!("state-based pass: {} actions", pass.events.len());
    }
    pass
}

fn check_players(state: &GameState, config: &GameConfig, events: &mut Vec<ProposedEvent>) {
    for player in state.remaining_players() {
        let id = EntityId::player(player);
        let poison = state
            .get::<Counters>(id)
            .map_or(0, |counters| counters.count(&CounterKind::Poison));

        let reason = if state.life(player) <= 0 {
            Some(LossReason::ZeroLife)
        } else if state.has::<DrewFromEmpty>(id) {
            Some(LossReason::EmptyLibrary)
        } else if poison >= config.poison_threshold {
            Some(LossReason::Poison)
        } else {
            None
        };
        if let Some(reason) = reason {
            events.push(ProposedEvent::Lose { player, reason });
        }
    }
}

fn check_creatures(
    state: &GameState,
    view: &ProjectedView,
    events: &mut Vec<ProposedEvent>,
    moved: &mut BTreeSet<EntityId>,
) {
    for (id, chars) in view.creatures() {
        let Some(toughness) = chars.toughness else {
            continue;
        };
        let dies = if toughness <= 0 {
            true
        } else {
            let damage = state.get::<Damage>(id).map_or(0, |d| d.0);
            let lethal = damage >= toughness as u32 || (damage > 0 && state.has::<DeathtouchDamage>(id));
            lethal && !chars.has_keyword(Keyword::Indestructible)
        };
        if dies {
            events.push(ProposedEvent::leave_battlefield(id, ZoneKind::Graveyard));
            moved.insert(id);
        }
    }
}

fn is_attachment(chars: &Characteristics, subtype: &str) -> bool {
    chars.subtypes.contains(subtype)
}

fn check_attachments(
    state: &GameState,
    view: &ProjectedView,
    registry: &CardRegistry,
    events: &mut Vec<ProposedEvent>,
    moved: &mut BTreeSet<EntityId>,
) {
    let on_battlefield = |id: EntityId| state.zones().zone_of(id) == Some(ZoneKey::battlefield());

    for (id, chars) in view.battlefield() {
        if moved.contains(&id) {
            continue;
        }
        let attached = state.get::<AttachedTo>(id).map(|a| a.0);

        if is_attachment(chars, "Aura") {
            let enchant = chars
                .definition
                .and_then(|card| registry.get(card))
                .and_then(|definition| definition.enchant.as_ref());
            let legal = match (attached, enchant) {
                (Some(host), Some(filter)) => {
                    let ctx = FilterContext::new(state, view.characteristics(), chars.controller).with_source(id);
                    host != id && on_battlefield(host) && !moved.contains(&host) && filter.matches(host, &ctx)
                }
                (Some(host), None) => host != id && on_battlefield(host),
                (None, _) => false,
            };
            if !legal {
                events.push(ProposedEvent::leave_battlefield(id, ZoneKind::Graveyard));
                moved.insert(id);
            }
        } else if is_attachment(chars, "Equipment") {
            if let Some(host) = attached {
                if !view.is_creature(host) || !on_battlefield(host) {
                    events.push(ProposedEvent::Unattach { entity: id });
                }
            }
        }
    }
}

fn check_counters(view: &ProjectedView, events: &mut Vec<ProposedEvent>, moved: &BTreeSet<EntityId>) {
    for (id, chars) in view.battlefield() {
        if moved.contains(&id) {
            continue;
        }
        let pairs = chars
            .counters
            .count(&CounterKind::PlusOne)
            .min(chars.counters.count(&CounterKind::MinusOne));
        if pairs > 0 {
            events.push(ProposedEvent::AnnihilateCounters { entity: id, amount: pairs });
        }
    }
}

/// Apply the legend rule for groups with a keeper; return the first group
/// that still needs one.
fn check_legend_rule(
    view: &ProjectedView,
    keepers: &[EntityId],
    events: &mut Vec<ProposedEvent>,
    moved: &mut BTreeSet<EntityId>,
) -> Option<LegendChoice> {
    let mut groups: BTreeMap<(PlayerId, &str), Vec<EntityId>> = BTreeMap::new();
    for (id, chars) in view.battlefield() {
        if chars.is_legendary() && !moved.contains(&id) {
            groups.entry((chars.controller, chars.name.as_str())).or_default().push(id);
        }
    }

    let mut unresolved = None;
    for ((player, _), candidates) in groups {
        if candidates.len() < 2 {
            continue;
        }
        match candidates.iter().find(|id| keepers.contains(id)) {
            Some(keeper) => {
                for id in candidates.iter().filter(|id| *id != keeper) {
                    events.push(ProposedEvent::leave_battlefield(*id, ZoneKind::Graveyard));
                    moved.insert(*id);
                }
            }
            None if unresolved.is_none() => unresolved = Some(LegendChoice { player, candidates }),
            None => {}
        }
    }
    unresolved
}

fn check_tokens(state: &GameState, events: &mut Vec<ProposedEvent>) {
    for (id, record) in state.entities() {
        if record.kind != EntityKind::Token {
            continue;
        }
        if state.zones().zone_of(id) != Some(ZoneKey::battlefield()) {
            events.push(ProposedEvent::CeaseToExist { entity: id });
        }
    }
}
