//! The continuous-effects projector.
//!
//! `project` derives the current characteristics of every card and token
//! from the state: printed values from the registry, then each layer in
//! order. It never writes to the state and caches nothing, so projecting
//! the same state twice yields equal views.
//!
//! ## Effect Sources
//!
//! - stored effects created by resolving spells and abilities
//! - static abilities of permanents on the battlefield (gathered after the
//!   copy layer, so a copy gains the copied card's statics)
//! - characteristic-defining statics, which function in every zone
//! - `+1/+1` and `-1/-1` counters, applied in their own sublayer

use std::collections::{BTreeMap, BTreeSet};

use crate::cards::{CardDefinition, CardId, CardRegistry, CardType, Color, CounterKind, Keyword, ManaCost, Supertype};
use crate::core::{AttachedTo, Counters, EnteredAt, EntityId, GameState, PlayerId};
use crate::effects::FilterContext;
use crate::zones::{ZoneKey, ZoneKind};

use super::dependency;
use super::effect::{AffectedSet, Duration, EffectId, Layer, Modification, PtSublayer, PtValue, StaticCondition};

/// Characteristics of every projected object, in id order.
pub type CharacteristicsMap = BTreeMap<EntityId, Characteristics>;

/// Current characteristics of one card or token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Characteristics {
    /// Definition whose copiable values the object has (after copy effects).
    pub definition: Option<CardId>,
    pub name: String,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub mana_cost: ManaCost,
    pub card_types: BTreeSet<CardType>,
    pub supertypes: BTreeSet<Supertype>,
    pub subtypes: BTreeSet<String>,
    pub colors: BTreeSet<Color>,
    pub keywords: BTreeSet<Keyword>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub counters: Counters,
    /// Set by "loses all abilities"; the definition's abilities stop working.
    pub abilities_removed: bool,
    pub zone: Option<ZoneKey>,
    /// Subtype words rewritten by text-changing effects (`from -> to`).
    pub text_changes: BTreeMap<String, String>,
}

impl Characteristics {
    /// An object with no characteristics beyond its owner.
    #[must_use]
    pub fn blank(owner: PlayerId) -> Self {
        Self {
            definition: None,
            name: String::new(),
            owner,
            controller: owner,
            mana_cost: ManaCost::free(),
            card_types: BTreeSet::new(),
            supertypes: BTreeSet::new(),
            subtypes: BTreeSet::new(),
            colors: BTreeSet::new(),
            keywords: BTreeSet::new(),
            power: None,
            toughness: None,
            counters: Counters::default(),
            abilities_removed: false,
            zone: None,
            text_changes: BTreeMap::new(),
        }
    }

    /// Printed characteristics of a definition.
    #[must_use]
    pub fn printed(definition: &CardDefinition, owner: PlayerId) -> Self {
        let mut chars = Self::blank(owner);
        chars.copy_from(definition);
        chars
    }

    /// Overwrite the copiable values with those of `definition`.
    fn copy_from(&mut self, definition: &CardDefinition) {
        self.definition = Some(definition.id);
        self.name = definition.name.clone();
        self.mana_cost = definition.mana_cost.clone();
        self.card_types = definition.card_types.clone();
        self.supertypes = definition.supertypes.clone();
        self.subtypes = definition.subtypes.clone();
        self.colors = definition.colors.clone();
        self.keywords = definition.keywords.clone();
        self.power = definition.power;
        self.toughness = definition.toughness;
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.card_types.contains(&CardType::Creature)
    }

    #[must_use]
    pub fn is_legendary(&self) -> bool {
        self.supertypes.contains(&Supertype::Legendary)
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    #[must_use]
    pub fn on_battlefield(&self) -> bool {
        self.zone == Some(ZoneKey::battlefield())
    }
}

/// The projected characteristics of all objects.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectedView {
    chars: CharacteristicsMap,
}

impl ProjectedView {
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&Characteristics> {
        self.chars.get(&entity)
    }

    #[must_use]
    pub fn characteristics(&self) -> &CharacteristicsMap {
        &self.chars
    }

    #[must_use]
    pub fn power(&self, entity: EntityId) -> Option<i32> {
        self.get(entity).and_then(|c| c.power)
    }

    #[must_use]
    pub fn toughness(&self, entity: EntityId) -> Option<i32> {
        self.get(entity).and_then(|c| c.toughness)
    }

    #[must_use]
    pub fn has_keyword(&self, entity: EntityId, keyword: Keyword) -> bool {
        self.get(entity).is_some_and(|c| c.has_keyword(keyword))
    }

    #[must_use]
    pub fn is_creature(&self, entity: EntityId) -> bool {
        self.get(entity).is_some_and(Characteristics::is_creature)
    }

    #[must_use]
    pub fn controller(&self, entity: EntityId) -> Option<PlayerId> {
        self.get(entity).map(|c| c.controller)
    }

    /// Permanents on the battlefield, in id order.
    pub fn battlefield(&self) -> impl Iterator<Item = (EntityId, &Characteristics)> {
        self.chars
            .iter()
            .filter(|(_, c)| c.on_battlefield())
            .map(|(id, c)| (*id, c))
    }

    /// Permanents `player` controls, in id order.
    pub fn permanents_controlled_by(&self, player: PlayerId) -> impl Iterator<Item = EntityId> + '_ {
        self.battlefield()
            .filter(move |(_, c)| c.controller == player)
            .map(|(id, _)| id)
    }

    /// Creatures on the battlefield, in id order.
    pub fn creatures(&self) -> impl Iterator<Item = (EntityId, &Characteristics)> {
        self.battlefield().filter(|(_, c)| c.is_creature())
    }
}

/// Where an active effect came from. Also the final ordering tiebreak.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EffectOrigin {
    Stored(EffectId),
    Static { source: EntityId, index: usize },
}

/// A continuous effect being applied during one projection.
#[derive(Clone, Debug)]
pub(crate) struct ActiveEffect<'a> {
    pub origin: EffectOrigin,
    pub source: EntityId,
    /// Controller when created; statics use the source's current controller.
    pub controller: PlayerId,
    pub modification: &'a Modification,
    pub affected: &'a AffectedSet,
    pub timestamp: u64,
    pub characteristic_defining: bool,
    pub duration: Option<&'a Duration>,
    pub condition: Option<&'a StaticCondition>,
}

impl ActiveEffect<'_> {
    pub fn layer(&self) -> Layer {
        self.modification.layer()
    }

    pub fn sublayer(&self) -> Option<PtSublayer> {
        self.modification.pt_sublayer(self.characteristic_defining)
    }

    fn is_static(&self) -> bool {
        matches!(self.origin, EffectOrigin::Static { .. })
    }

    /// Sort key within a layer: characteristic-defining first, then
    /// timestamp, then origin.
    pub fn sort_key(&self) -> (bool, u64, EffectOrigin) {
        (!self.characteristic_defining, self.timestamp, self.origin)
    }

    /// "You" for this effect's filters and conditions.
    fn current_controller(&self, chars: &CharacteristicsMap) -> PlayerId {
        if self.is_static() {
            chars.get(&self.source).map_or(self.controller, |c| c.controller)
        } else {
            self.controller
        }
    }

    /// Whether the effect currently applies at all.
    pub fn is_active(&self, state: &GameState, chars: &CharacteristicsMap) -> bool {
        if self.is_static() && !self.characteristic_defining && self.layer() >= Layer::Ability {
            let removed = chars.get(&self.source).is_some_and(|c| c.abilities_removed);
            if removed {
                return false;
            }
        }
        let duration_holds = match self.duration {
            None | Some(Duration::UntilEndOfTurn) | Some(Duration::Indefinite) => true,
            Some(Duration::WhileSourceOnBattlefield) => {
                state.zones().zone_of(self.source) == Some(ZoneKey::battlefield())
            }
            Some(Duration::While(condition)) => self.condition_holds(condition, state, chars),
        };
        duration_holds
            && self
                .condition
                .map_or(true, |condition| self.condition_holds(condition, state, chars))
    }

    fn condition_holds(&self, condition: &StaticCondition, state: &GameState, chars: &CharacteristicsMap) -> bool {
        condition.holds(self.source, self.current_controller(chars), state)
    }

    /// The objects this effect applies to right now.
    pub fn affected_entities(&self, state: &GameState, chars: &CharacteristicsMap) -> Vec<EntityId> {
        match self.affected {
            AffectedSet::Entities(ids) => ids.iter().copied().filter(|id| chars.contains_key(id)).collect(),
            AffectedSet::Matching(filter) => {
                let ctx = FilterContext::new(state, chars, self.current_controller(chars)).with_source(self.source);
                chars
                    .iter()
                    .filter(|(_, c)| c.on_battlefield())
                    .map(|(id, _)| *id)
                    .filter(|id| filter.matches(*id, &ctx))
                    .collect()
            }
            AffectedSet::Source => {
                if chars.contains_key(&self.source) {
                    vec![self.source]
                } else {
                    Vec::new()
                }
            }
            AffectedSet::AttachedTo => {
                let source_on_battlefield = chars.get(&self.source).is_some_and(Characteristics::on_battlefield);
                state
                    .get::<AttachedTo>(self.source)
                    .map(|attached| attached.0)
                    .filter(|id| source_on_battlefield && chars.contains_key(id))
                    .into_iter()
                    .collect()
            }
        }
    }

    /// Apply the effect to every object it affects.
    pub fn apply(&self, state: &GameState, registry: &CardRegistry, chars: &mut CharacteristicsMap) {
        if !self.is_active(state, chars) {
            return;
        }
        for id in self.affected_entities(state, chars) {
            let Some(current) = chars.get(&id) else {
                continue;
            };
            let mut updated = current.clone();
            modify(&mut updated, self.modification, state, registry, chars);
            chars.insert(id, updated);
        }
    }
}

fn modify(
    target: &mut Characteristics,
    modification: &Modification,
    state: &GameState,
    registry: &CardRegistry,
    chars: &CharacteristicsMap,
) {
    match modification {
        Modification::CopyOf(card) => {
            if let Some(definition) = registry.get(*card) {
                target.copy_from(definition);
            }
        }
        Modification::SetController(player) => target.controller = *player,
        Modification::ReplaceSubtypeWord { from, to } => {
            if target.subtypes.remove(from) {
                target.subtypes.insert(to.clone());
            }
            target.text_changes.insert(from.clone(), to.clone());
        }
        Modification::AddCardType(card_type) => {
            target.card_types.insert(*card_type);
        }
        Modification::RemoveCardType(card_type) => {
            target.card_types.remove(card_type);
        }
        Modification::AddSubtype(subtype) => {
            target.subtypes.insert(subtype.clone());
        }
        Modification::SetSubtypes(subtypes) => {
            target.subtypes = subtypes.iter().cloned().collect();
        }
        Modification::SetColors(colors) => {
            target.colors = colors.iter().copied().collect();
        }
        Modification::AddColor(color) => {
            target.colors.insert(*color);
        }
        Modification::AddKeyword(keyword) => {
            target.keywords.insert(*keyword);
        }
        Modification::RemoveKeyword(keyword) => {
            target.keywords.remove(keyword);
        }
        Modification::RemoveAllAbilities => {
            target.abilities_removed = true;
            target.keywords.clear();
        }
        Modification::SetPowerToughness(value) => {
            let (power, toughness) = evaluate_pt(value, target.controller, state, chars);
            target.power = Some(power);
            target.toughness = Some(toughness);
        }
        Modification::ModifyPowerToughness { power, toughness } => {
            if let (Some(p), Some(t)) = (target.power, target.toughness) {
                target.power = Some(p + power);
                target.toughness = Some(t + toughness);
            }
        }
        Modification::SwitchPowerToughness => {
            if let (Some(p), Some(t)) = (target.power, target.toughness) {
                target.power = Some(t);
                target.toughness = Some(p);
            }
        }
    }
}

fn evaluate_pt(value: &PtValue, controller: PlayerId, state: &GameState, chars: &CharacteristicsMap) -> (i32, i32) {
    match value {
        PtValue::Fixed(power, toughness) => (*power, *toughness),
        PtValue::CardsInControllerGraveyard => {
            let count = state.zones().size(ZoneKey::graveyard(controller)) as i32;
            (count, count)
        }
        PtValue::CreaturesControllerControls => {
            let count = chars
                .values()
                .filter(|c| c.on_battlefield() && c.is_creature() && c.controller == controller)
                .count() as i32;
            (count, count)
        }
    }
}

/// Printed characteristics of every card and token, before any layer.
fn base_characteristics(state: &GameState, registry: &CardRegistry) -> CharacteristicsMap {
    let mut chars = CharacteristicsMap::new();
    for (id, record) in state.entities() {
        let Some(definition) = record.definition.and_then(|card| registry.get(card)) else {
            continue;
        };
        let Some(zone) = state.zones().zone_of(id) else {
            continue;
        };
        let mut base = Characteristics::printed(definition, record.owner);
        base.zone = Some(zone);
        if zone.kind == ZoneKind::Stack {
            if let Some(object) = state.stack_object(id) {
                base.controller = object.controller;
            }
        }
        base.counters = state.get::<Counters>(id).cloned().unwrap_or_default();
        chars.insert(id, base);
    }
    chars
}

/// Static abilities of the projected objects, as active effects.
fn static_effects<'a>(
    state: &GameState,
    registry: &'a CardRegistry,
    chars: &CharacteristicsMap,
) -> Vec<ActiveEffect<'a>> {
    let mut effects = Vec::new();
    for (id, c) in chars {
        let Some(definition) = c.definition.and_then(|card| registry.get(card)) else {
            continue;
        };
        let on_battlefield = c.on_battlefield();
        let timestamp = state.get::<EnteredAt>(*id).map_or(0, |entered| entered.timestamp);
        for (index, ability) in definition.statics.iter().enumerate() {
            if !on_battlefield && !ability.characteristic_defining {
                continue;
            }
            effects.push(ActiveEffect {
                origin: EffectOrigin::Static { source: *id, index },
                source: *id,
                controller: c.controller,
                modification: &ability.modification,
                affected: &ability.affected,
                timestamp,
                characteristic_defining: ability.characteristic_defining,
                duration: None,
                condition: ability.condition.as_ref(),
            });
        }
    }
    effects
}

/// Effects stored on the state by resolved spells and abilities.
fn stored_effects(state: &GameState) -> Vec<ActiveEffect<'_>> {
    state
        .effects()
        .map(|effect| ActiveEffect {
            origin: EffectOrigin::Stored(effect.id),
            source: effect.source,
            controller: effect.controller,
            modification: &effect.modification,
            affected: &effect.affected,
            timestamp: effect.timestamp,
            characteristic_defining: false,
            duration: Some(&effect.duration),
            condition: None,
        })
        .collect()
}

fn apply_counters(chars: &mut CharacteristicsMap) {
    for c in chars.values_mut() {
        if !c.on_battlefield() {
            continue;
        }
        let delta = c.counters.count(&CounterKind::PlusOne) as i32 - c.counters.count(&CounterKind::MinusOne) as i32;
        if let (Some(p), Some(t)) = (c.power, c.toughness) {
            c.power = Some(p + delta);
            c.toughness = Some(t + delta);
        }
    }
}

fn apply_group(group: Vec<ActiveEffect<'_>>, state: &GameState, registry: &CardRegistry, chars: &mut CharacteristicsMap) {
    for effect in dependency::order(group, state, registry, chars) {
        effect.apply(state, registry, chars);
    }
}

/// Project the current characteristics of every card and token.
///
/// ```
/// use ccg_rules::cards::{CardDefinition, CardRegistry, CardType};
/// use ccg_rules::core::{GameState, PlayerId};
/// use ccg_rules::layers::project;
/// use ccg_rules::zones::ZoneKind;
///
/// let mut registry = CardRegistry::new();
/// let bear = registry.register(CardDefinition::new("Bear").with_type(CardType::Creature).with_pt(2, 2));
///
/// let mut state = GameState::new(2, 20, 0);
/// let id = state.create_card(bear, PlayerId::new(0), ZoneKind::Battlefield).unwrap();
///
/// let view = project(&state, &registry);
/// assert_eq!(view.power(id), Some(2));
/// assert_eq!(view, project(&state, &registry));
/// ```
#[must_use]
pub fn project(state: &GameState, registry: &CardRegistry) -> ProjectedView {
    let mut chars = base_characteristics(state, registry);
    let stored = stored_effects(state);

    let (copy, mut rest): (Vec<_>, Vec<_>) = stored.into_iter().partition(|e| e.layer() == Layer::Copy);
    apply_group(copy, state, registry, &mut chars);

    rest.extend(static_effects(state, registry, &chars));

    for layer in &Layer::ALL[1..] {
        let (in_layer, remaining): (Vec<_>, Vec<_>) = rest.into_iter().partition(|e| e.layer() == *layer);
        rest = remaining;
        if *layer != Layer::PowerToughness {
            apply_group(in_layer, state, registry, &mut chars);
            continue;
        }

        let mut by_sublayer: BTreeMap<PtSublayer, Vec<ActiveEffect<'_>>> = BTreeMap::new();
        for effect in in_layer {
            if let Some(sublayer) = effect.sublayer() {
                by_sublayer.entry(sublayer).or_default().push(effect);
            }
        }
        for sublayer in [PtSublayer::CharacteristicDefining, PtSublayer::SetBase] {
            apply_group(by_sublayer.remove(&sublayer).unwrap_or_default(), state, registry, &mut chars);
        }
        apply_counters(&mut chars);
        for sublayer in [PtSublayer::Modify, PtSublayer::Switch] {
            apply_group(by_sublayer.remove(&sublayer).unwrap_or_default(), state, registry, &mut chars);
        }
    }

    ProjectedView { chars }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameState, PlayerId};
    use crate::effects::TargetFilter;
    use crate::layers::{ContinuousEffect, StaticAbility};

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn registry() -> (CardRegistry, CardId, CardId, CardId) {
        let mut registry = CardRegistry::new();
        let bear = registry.register(
            CardDefinition::new("Grizzly Bears")
                .with_type(CardType::Creature)
                .with_subtype("Bear")
                .with_pt(2, 2),
        );
        let lord = registry.register(
            CardDefinition::new("Bear Lord")
                .with_type(CardType::Creature)
                .with_pt(1, 1)
                .with_static(StaticAbility::anthem(
                    TargetFilter::Subtype("Bear".into()).and(TargetFilter::Other),
                    1,
                    1,
                )),
        );
        let goyf = registry.register(
            CardDefinition::new("Grave Beast")
                .with_type(CardType::Creature)
                .with_static(StaticAbility::defining(PtValue::CardsInControllerGraveyard)),
        );
        (registry, bear, lord, goyf)
    }

    fn stored(state: &mut GameState, source: EntityId, modification: Modification, affected: Vec<EntityId>) {
        let id = state.next_effect_id();
        let timestamp = state.next_timestamp();
        state.add_effect(ContinuousEffect {
            id,
            source,
            controller: P0,
            modification,
            affected: AffectedSet::Entities(affected),
            duration: Duration::UntilEndOfTurn,
            timestamp,
        });
    }

    #[test]
    fn test_printed_values() {
        let (registry, bear, _, _) = registry();
        let mut state = GameState::new(2, 20, 0);
        let id = state.create_card(bear, P0, ZoneKind::Hand).unwrap();

        let view = project(&state, &registry);
        let chars = view.get(id).unwrap();
        assert_eq!(chars.name, "Grizzly Bears");
        assert_eq!(chars.zone, Some(ZoneKey::hand(P0)));
        assert_eq!((chars.power, chars.toughness), (Some(2), Some(2)));
    }

    #[test]
    fn test_anthem_applies_to_matching_permanents_only() {
        let (registry, bear, lord, _) = registry();
        let mut state = GameState::new(2, 20, 0);
        let bear_id = state.create_card(bear, P0, ZoneKind::Battlefield).unwrap();
        let lord_id = state.create_card(lord, P0, ZoneKind::Battlefield).unwrap();
        let in_hand = state.create_card(bear, P0, ZoneKind::Hand).unwrap();

        let view = project(&state, &registry);
        assert_eq!(view.power(bear_id), Some(3));
        assert_eq!(view.power(lord_id), Some(1));
        assert_eq!(view.power(in_hand), Some(2));
    }

    #[test]
    fn test_characteristic_defining_in_every_zone() {
        let (registry, bear, _, goyf) = registry();
        let mut state = GameState::new(2, 20, 0);
        let beast = state.create_card(goyf, P0, ZoneKind::Hand).unwrap();
        state.create_card(bear, P0, ZoneKind::Graveyard).unwrap();
        state.create_card(bear, P0, ZoneKind::Graveyard).unwrap();

        let view = project(&state, &registry);
        assert_eq!(view.power(beast), Some(2));
        assert_eq!(view.toughness(beast), Some(2));
    }

    #[test]
    fn test_sublayer_order_set_counters_modify_switch() {
        let (registry, bear, _, _) = registry();
        let mut state = GameState::new(2, 20, 0);
        let id = state.create_card(bear, P0, ZoneKind::Battlefield).unwrap();

        // Stored in reverse layer order; sublayers still apply in order.
        stored(&mut state, id, Modification::SwitchPowerToughness, vec![id]);
        stored(&mut state, id, Modification::ModifyPowerToughness { power: 3, toughness: 0 }, vec![id]);
        stored(&mut state, id, Modification::SetPowerToughness(PtValue::Fixed(0, 4)), vec![id]);
        let mut counters = Counters::default();
        counters.add(CounterKind::PlusOne, 1);
        state.set(id, counters).unwrap();

        // set 0/4, counters 1/5, modify 4/5, switch 5/4
        let view = project(&state, &registry);
        assert_eq!((view.power(id), view.toughness(id)), (Some(5), Some(4)));
    }

    #[test]
    fn test_control_change_moves_anthem_controller() {
        let (registry, bear, lord, _) = registry();
        let mut state = GameState::new(2, 20, 0);
        let their_bear = state.create_card(bear, P1, ZoneKind::Battlefield).unwrap();
        let lord_id = state.create_card(lord, P0, ZoneKind::Battlefield).unwrap();

        // The lord's filter has no controller restriction; it pumps every other bear.
        let view = project(&state, &registry);
        assert_eq!(view.power(their_bear), Some(3));

        stored(&mut state, lord_id, Modification::SetController(P1), vec![lord_id]);
        let view = project(&state, &registry);
        assert_eq!(view.controller(lord_id), Some(P1));
        assert_eq!(view.permanents_controlled_by(P1).count(), 2);
    }

    #[test]
    fn test_lost_abilities_stop_later_layer_statics() {
        let (registry, bear, lord, _) = registry();
        let mut state = GameState::new(2, 20, 0);
        let bear_id = state.create_card(bear, P0, ZoneKind::Battlefield).unwrap();
        let lord_id = state.create_card(lord, P0, ZoneKind::Battlefield).unwrap();

        stored(&mut state, lord_id, Modification::RemoveAllAbilities, vec![lord_id]);
        let view = project(&state, &registry);
        assert!(view.get(lord_id).unwrap().abilities_removed);
        assert_eq!(view.power(bear_id), Some(2));
    }

    #[test]
    fn test_type_change_feeds_later_filters() {
        let (registry, bear, lord, _) = registry();
        let mut state = GameState::new(2, 20, 0);
        let lord_id = state.create_card(lord, P0, ZoneKind::Battlefield).unwrap();
        let other = state.create_card(bear, P0, ZoneKind::Battlefield).unwrap();

        stored(&mut state, lord_id, Modification::SetSubtypes(vec!["Wolf".into()]), vec![other]);
        let view = project(&state, &registry);
        assert_eq!(view.power(other), Some(2));
        assert!(view.get(other).unwrap().subtypes.contains("Wolf"));
    }

    #[test]
    fn test_copy_gains_statics_of_copied_card() {
        let (registry, bear, lord, _) = registry();
        let mut state = GameState::new(2, 20, 0);
        let bear_id = state.create_card(bear, P0, ZoneKind::Battlefield).unwrap();
        let clone = state.create_card(bear, P0, ZoneKind::Battlefield).unwrap();

        stored(&mut state, clone, Modification::CopyOf(lord), vec![clone]);
        let view = project(&state, &registry);
        assert_eq!(view.get(clone).unwrap().name, "Bear Lord");
        assert_eq!(view.power(bear_id), Some(3));
    }

    #[test]
    fn test_projection_does_not_mutate() {
        let (registry, bear, lord, _) = registry();
        let mut state = GameState::new(2, 20, 0);
        state.create_card(bear, P0, ZoneKind::Battlefield).unwrap();
        state.create_card(lord, P1, ZoneKind::Battlefield).unwrap();

        let before = state.clone();
        let first = project(&state, &registry);
        let second = project(&state, &registry);
        assert_eq!(first, second);
        assert_eq!(state, before);
    }
}
