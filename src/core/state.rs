//! The game state store.
//!
//! `GameState` owns everything that changes during a game: entities and
//! their components, zone contents, the turn pointer, stack objects,
//! stored continuous effects, registered replacement effects, delayed
//! triggers, the event log, the outcome, the pending decision and the
//! engine's work agenda.
//!
//! ## Snapshots
//!
//! Every collection is an `im` persistent structure, so `clone()` is O(1)
//! and shares storage with the original. The engine takes a snapshot
//! before each action and restores it if the action turns out to be
//! illegal. All maps are ordered, which keeps iteration (and therefore
//! every rule built on it) deterministic.

use im::{OrdMap, Vector};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::hash::Hasher;

use super::component::{
    Attacking, AttachedTo, Blocked, Blocking, Component, ComponentKind, ComponentValue, Counters, Damage,
    DeathtouchDamage, EnteredAt, Life, Lost, SummoningSick, Tapped, ThresholdsReached,
};
use super::entity::EntityId;
use super::player::PlayerId;
use super::rng::GameRng;
use super::turn::TurnState;
use crate::cards::CardId;
use crate::decision::{Decision, DecisionId};
use crate::error::{Result, RulesError};
use crate::layers::{AffectedSet, ContinuousEffect, Duration, EffectId};
use crate::replacement::{RegisteredReplacement, ReplacementId, Subject};
use crate::rules::GameOutcome;
use crate::stack::{StackObject, StackObjectKind, Work};
use crate::triggers::{DelayedTrigger, DelayedTriggerId, GameEvent, LastKnown, LoggedEvent};
use crate::zones::{ZoneKey, ZoneKind, ZoneManager, ZonePosition};

/// What an entity is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Card,
    /// Ceases to exist outside the battlefield.
    Token,
    /// An activated or triggered ability on the stack.
    Ability,
}

/// Identity of an entity: its kind, owner and printed definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub kind: EntityKind,
    pub owner: PlayerId,
    /// `None` for players and abilities.
    pub definition: Option<CardId>,
}

/// Complete game state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    player_count: usize,

    entities: OrdMap<EntityId, EntityRecord>,
    components: OrdMap<EntityId, OrdMap<ComponentKind, ComponentValue>>,
    zones: ZoneManager,
    turn: TurnState,

    stack: OrdMap<EntityId, StackObject>,
    effects: OrdMap<EffectId, ContinuousEffect>,
    replacements: OrdMap<ReplacementId, RegisteredReplacement>,
    delayed: OrdMap<DelayedTriggerId, DelayedTrigger>,

    log: Vector<LoggedEvent>,
    outcome: Option<GameOutcome>,
    pending: Option<Decision>,
    agenda: Vector<Work>,

    rng: GameRng,

    // === Allocators ===
    next_entity: u32,
    next_effect: u32,
    next_timestamp: u64,
    batch: u64,
    next_replacement: u32,
    next_delayed: u32,
    next_decision: u32,
}

impl GameState {
    /// Create a state with `player_count` players at `starting_life`.
    #[must_use]
    pub fn new(player_count: usize, starting_life: i64, seed: u64) -> Self {
        assert!(player_count >= 2, "Must have at least 2 players");

        let mut entities = OrdMap::new();
        let mut components = OrdMap::new();
        for player in PlayerId::all(player_count) {
            let id = EntityId::player(player);
            entities.insert(
                id,
                EntityRecord {
                    kind: EntityKind::Player,
                    owner: player,
                    definition: None,
                },
            );
            let mut facets = OrdMap::new();
            facets.insert(ComponentKind::Life, Life(starting_life).into());
            components.insert(id, facets);
        }

        Self {
            player_count,
            entities,
            components,
            zones: ZoneManager::new(),
            turn: TurnState::new(),
            stack: OrdMap::new(),
            effects: OrdMap::new(),
            replacements: OrdMap::new(),
            delayed: OrdMap::new(),
            log: Vector::new(),
            outcome: None,
            pending: None,
            agenda: Vector::new(),
            rng: GameRng::new(seed),
            next_entity: EntityId::first_non_player(player_count),
            next_effect: 0,
            next_timestamp: 1,
            batch: 0,
            next_replacement: 0,
            next_delayed: 0,
            next_decision: 0,
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    // === Entities ===

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &EntityRecord)> {
        self.entities.iter().map(|(id, record)| (*id, record))
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&EntityRecord> {
        self.entities.get(&id)
    }

    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    fn allocate(&mut self, kind: EntityKind, owner: PlayerId, definition: Option<CardId>) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        self.entities.insert(id, EntityRecord { kind, owner, definition });
        id
    }

    // === Components ===

    #[must_use]
    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.components.get(&id)?.get(&T::KIND).and_then(T::from_value)
    }

    #[must_use]
    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        self.components.get(&id).is_some_and(|facets| facets.contains_key(&T::KIND))
    }

    /// Attach or overwrite a component.
    pub fn set<T: Component>(&mut self, id: EntityId, value: T) -> Result<()> {
        if !self.exists(id) {
            return Err(RulesError::NoSuchEntity(id));
        }
        self.components
            .entry(id)
            .or_insert_with(OrdMap::new)
            .insert(T::KIND, value.into());
        Ok(())
    }

    /// Detach a component, returning its old value.
    pub fn remove<T: Component>(&mut self, id: EntityId) -> Result<Option<T>> {
        if !self.exists(id) {
            return Err(RulesError::NoSuchEntity(id));
        }
        Ok(self.clear::<T>(id))
    }

    /// `remove` for ids known to exist.
    pub(crate) fn clear<T: Component>(&mut self, id: EntityId) -> Option<T> {
        let value = self.components.get_mut(&id)?.remove(&T::KIND)?;
        T::from_value(&value).cloned()
    }

    // === Zones ===

    #[must_use]
    pub fn zones(&self) -> &ZoneManager {
        &self.zones
    }

    /// Put a new card into one of `owner`'s zones (or a shared zone).
    ///
    /// Cards placed directly onto the battlefield count as having been
    /// there since before the game started: they are not summoning sick.
    pub fn create_card(&mut self, card: CardId, owner: PlayerId, zone: ZoneKind) -> Result<EntityId> {
        if zone == ZoneKind::Stack {
            return Err(RulesError::IllegalZoneTransition {
                entity: EntityId(self.next_entity),
                to: ZoneKey::stack(),
            });
        }
        let id = self.allocate(EntityKind::Card, owner, Some(card));
        let key = ZoneKey::for_owner(owner, zone);
        self.zones.insert(id, key, ZonePosition::Top);
        if zone == ZoneKind::Battlefield {
            let entered = EnteredAt {
                timestamp: self.next_timestamp(),
                batch: self.batch,
            };
            self.set(id, entered)?;
        }
        Ok(id)
    }

    /// Create a token on the battlefield.
    pub fn create_token(&mut self, card: CardId, controller: PlayerId) -> Result<EntityId> {
        let id = self.allocate(EntityKind::Token, controller, Some(card));
        self.zones.insert(id, ZoneKey::battlefield(), ZonePosition::Top);
        self.mark_entered(id)?;
        Ok(id)
    }

    /// Allocate the entity for an ability about to be put on the stack.
    pub(crate) fn create_ability(&mut self, controller: PlayerId) -> EntityId {
        self.allocate(EntityKind::Ability, controller, None)
    }

    fn mark_entered(&mut self, id: EntityId) -> Result<()> {
        let entered = EnteredAt {
            timestamp: self.next_timestamp(),
            batch: self.batch,
        };
        self.set(id, entered)?;
        self.set(id, SummoningSick)
    }

    /// Move a card between zones.
    ///
    /// The card becomes a new object: per-object state (damage, tapped
    /// status, counters, combat state, attachments) is cleared and effects
    /// locked to it are forgotten. Entering the battlefield stamps a new
    /// timestamp and marks it summoning sick.
    pub fn move_entity(&mut self, id: EntityId, from: ZoneKey, to: ZoneKey, position: ZonePosition) -> Result<GameEvent> {
        if id.is_player(self.player_count) {
            return Err(RulesError::IllegalZoneTransition { entity: id, to });
        }
        let owner = self.entity(id).ok_or(RulesError::NoSuchEntity(id))?.owner;
        if self.zones.zone_of(id) != Some(from) {
            return Err(RulesError::NoSuchEntity(id));
        }
        if !to.accepts_owner(owner) {
            return Err(RulesError::IllegalZoneTransition { entity: id, to });
        }

        self.zones.move_to(id, to, position);
        self.clear::<Damage>(id);
        self.clear::<DeathtouchDamage>(id);
        self.clear::<Tapped>(id);
        self.clear::<Counters>(id);
        self.clear::<SummoningSick>(id);
        self.clear::<EnteredAt>(id);
        self.clear::<AttachedTo>(id);
        self.clear::<Attacking>(id);
        self.clear::<Blocking>(id);
        self.clear::<Blocked>(id);
        self.clear::<ThresholdsReached>(id);

        if from.kind == ZoneKind::Stack {
            self.stack.remove(&id);
        }
        if to.kind == ZoneKind::Battlefield {
            self.mark_entered(id)?;
        }
        self.forget_object(id, from.kind == ZoneKind::Battlefield);

        Ok(GameEvent::ZoneChanged { entity: id, from, to })
    }

    /// Drop effects that were locked to an object that no longer exists.
    fn forget_object(&mut self, id: EntityId, left_battlefield: bool) {
        let mut ended = Vec::new();
        for (effect_id, effect) in &self.effects {
            let source_gone =
                left_battlefield && effect.source == id && effect.duration == Duration::WhileSourceOnBattlefield;
            if source_gone {
                ended.push(*effect_id);
            }
        }
        for effect_id in ended {
            self.effects.remove(&effect_id);
        }

        let locked: Vec<EffectId> = self
            .effects
            .iter()
            .filter(|(_, effect)| matches!(&effect.affected, AffectedSet::Entities(ids) if ids.contains(&id)))
            .map(|(effect_id, _)| *effect_id)
            .collect();
        for effect_id in locked {
            let Some(effect) = self.effects.get_mut(&effect_id) else {
                continue;
            };
            let emptied = match &mut effect.affected {
                AffectedSet::Entities(ids) => {
                    ids.retain(|entity| *entity != id);
                    ids.is_empty()
                }
                _ => false,
            };
            if emptied {
                self.effects.remove(&effect_id);
            }
        }

        let stale: Vec<ReplacementId> = self
            .replacements
            .iter()
            .filter(|(_, registered)| {
                let watches_it = registered.effect.subject() == &Subject::Entity(id);
                let source_gone = left_battlefield
                    && registered.source == id
                    && registered.duration == Duration::WhileSourceOnBattlefield;
                watches_it || source_gone
            })
            .map(|(replacement_id, _)| *replacement_id)
            .collect();
        for replacement_id in stale {
            self.replacements.remove(&replacement_id);
        }
    }

    /// Remove an entity from the game entirely.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<()> {
        if id.is_player(self.player_count) {
            return Err(RulesError::IllegalZoneTransition {
                entity: id,
                to: ZoneKey::exile(),
            });
        }
        let left_battlefield = self.zones.zone_of(id) == Some(ZoneKey::battlefield());
        self.entities.remove(&id).ok_or(RulesError::NoSuchEntity(id))?;
        self.zones.remove(id);
        self.components.remove(&id);
        self.stack.remove(&id);
        self.forget_object(id, left_battlefield);
        Ok(())
    }

    /// Shuffle a player's library with the game's deterministic RNG.
    pub fn shuffle_library(&mut self, player: PlayerId) {
        self.zones.shuffle(ZoneKey::library(player), &mut self.rng);
    }

    // === Stack ===

    #[must_use]
    pub fn stack_object(&self, id: EntityId) -> Option<&StackObject> {
        self.stack.get(&id)
    }

    /// Stack objects, bottom to top.
    pub fn stack_objects(&self) -> impl Iterator<Item = &StackObject> {
        self.zones
            .contents(ZoneKey::stack())
            .filter_map(move |id| self.stack.get(&id))
    }

    #[must_use]
    pub fn top_of_stack(&self) -> Option<EntityId> {
        self.zones.top(ZoneKey::stack())
    }

    #[must_use]
    pub fn stack_is_empty(&self) -> bool {
        self.zones.size(ZoneKey::stack()) == 0
    }

    /// Whether `id` is a spell (not an ability) on the stack.
    #[must_use]
    pub fn is_spell(&self, id: EntityId) -> bool {
        self.stack
            .get(&id)
            .is_some_and(|object| object.kind == StackObjectKind::Spell)
    }

    /// Put an object on top of the stack. A spell's card must already be
    /// in the stack zone; an ability's entity is placed there now.
    pub(crate) fn push_stack_object(&mut self, object: StackObject) {
        if !self.zones.contains(object.id) {
            self.zones.insert(object.id, ZoneKey::stack(), ZonePosition::Top);
        }
        self.stack.insert(object.id, object);
    }

    // === Continuous effects ===

    pub fn effects(&self) -> impl Iterator<Item = &ContinuousEffect> {
        self.effects.values()
    }

    pub fn add_effect(&mut self, effect: ContinuousEffect) {
        self.effects.insert(effect.id, effect);
    }

    pub fn next_effect_id(&mut self) -> EffectId {
        let id = EffectId::new(self.next_effect);
        self.next_effect += 1;
        id
    }

    pub fn next_timestamp(&mut self) -> u64 {
        let timestamp = self.next_timestamp;
        self.next_timestamp += 1;
        timestamp
    }

    /// End every effect, replacement and delayed trigger lasting "until end of turn".
    pub(crate) fn end_turn_effects(&mut self) {
        let ended: Vec<EffectId> = self
            .effects
            .iter()
            .filter(|(_, effect)| effect.duration == Duration::UntilEndOfTurn)
            .map(|(id, _)| *id)
            .collect();
        for id in ended {
            self.effects.remove(&id);
        }
        let ended: Vec<ReplacementId> = self
            .replacements
            .iter()
            .filter(|(_, registered)| registered.duration == Duration::UntilEndOfTurn)
            .map(|(id, _)| *id)
            .collect();
        for id in ended {
            self.replacements.remove(&id);
        }
    }

    // === Replacement effects ===

    pub fn replacements(&self) -> impl Iterator<Item = &RegisteredReplacement> {
        self.replacements.values()
    }

    pub fn add_replacement(&mut self, replacement: RegisteredReplacement) {
        self.replacements.insert(replacement.id, replacement);
    }

    pub fn next_replacement_id(&mut self) -> ReplacementId {
        let id = ReplacementId(self.next_replacement);
        self.next_replacement += 1;
        id
    }

    // === Delayed triggers ===

    pub fn delayed_triggers(&self) -> impl Iterator<Item = &DelayedTrigger> {
        self.delayed.values()
    }

    pub fn add_delayed_trigger(&mut self, trigger: DelayedTrigger) {
        self.delayed.insert(trigger.id, trigger);
    }

    pub(crate) fn remove_delayed_trigger(&mut self, id: DelayedTriggerId) {
        self.delayed.remove(&id);
    }

    pub fn next_delayed_id(&mut self) -> DelayedTriggerId {
        let id = DelayedTriggerId(self.next_delayed);
        self.next_delayed += 1;
        id
    }

    // === Event log ===

    #[must_use]
    pub fn log(&self) -> &Vector<LoggedEvent> {
        &self.log
    }

    /// Events logged at or after position `since`.
    #[must_use]
    pub fn log_since(&self, since: usize) -> Vec<LoggedEvent> {
        self.log.iter().skip(since).cloned().collect()
    }

    /// Start a new batch of simultaneous events.
    pub fn begin_batch(&mut self) -> u64 {
        self.batch += 1;
        self.batch
    }

    #[must_use]
    pub fn current_batch(&self) -> u64 {
        self.batch
    }

    /// Append a committed event to the log in the current batch.
    pub fn log_event(&mut self, event: GameEvent, last_known: Option<LastKnown>) {
        log::trace!("batch {}: {:?}", self.batch, event);
        let seq = self.log.len() as u64;
        self.log.push_back(LoggedEvent {
            seq,
            batch: self.batch,
            event,
            last_known,
        });
    }

    /// Last known information of a permanent that left the battlefield.
    #[must_use]
    pub fn last_known(&self, entity: EntityId) -> Option<&LastKnown> {
        self.log
            .iter()
            .rev()
            .find(|logged| logged.event.left_battlefield() == Some(entity))
            .and_then(|logged| logged.last_known.as_ref())
    }

    // === Players ===

    #[must_use]
    pub fn life(&self, player: PlayerId) -> i64 {
        self.get::<Life>(EntityId::player(player)).map_or(0, |life| life.0)
    }

    #[must_use]
    pub fn has_lost(&self, player: PlayerId) -> bool {
        self.has::<Lost>(EntityId::player(player))
    }

    /// Players still in the game, in turn order.
    #[must_use]
    pub fn remaining_players(&self) -> Vec<PlayerId> {
        PlayerId::all(self.player_count)
            .filter(|player| !self.has_lost(*player))
            .collect()
    }

    /// The first player still in the game, starting from `player` in turn order.
    #[must_use]
    pub fn first_remaining_from(&self, player: PlayerId) -> Option<PlayerId> {
        PlayerId::apnap(player, self.player_count).find(|p| !self.has_lost(*p))
    }

    /// Remove everything a player who left the game owns or controls on the stack.
    pub(crate) fn remove_player_objects(&mut self, player: PlayerId) {
        let owned: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(id, record)| record.owner == player && !id.is_player(self.player_count))
            .map(|(id, _)| *id)
            .collect();
        let controlled: Vec<EntityId> = self
            .stack
            .values()
            .filter(|object| object.controller == player)
            .map(|object| object.id)
            .collect();
        for id in owned.into_iter().chain(controlled) {
            // Already gone when both owned and controlled.
            let _ = self.remove_entity(id);
        }

        let effects: Vec<EffectId> = self
            .effects
            .iter()
            .filter(|(_, effect)| effect.controller == player)
            .map(|(id, _)| *id)
            .collect();
        for id in effects {
            self.effects.remove(&id);
        }
        let replacements: Vec<ReplacementId> = self
            .replacements
            .iter()
            .filter(|(_, registered)| registered.controller == player)
            .map(|(id, _)| *id)
            .collect();
        for id in replacements {
            self.replacements.remove(&id);
        }
        let delayed: Vec<DelayedTriggerId> = self
            .delayed
            .iter()
            .filter(|(_, trigger)| trigger.controller == player)
            .map(|(id, _)| *id)
            .collect();
        for id in delayed {
            self.delayed.remove(&id);
        }
    }

    // === Turn, outcome, decisions ===

    #[must_use]
    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub(crate) fn turn_mut(&mut self) -> &mut TurnState {
        &mut self.turn
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    /// Record the end of the game. Pending work and priority are dropped.
    pub(crate) fn set_outcome(&mut self, outcome: GameOutcome) {
        log::debug!("game over: {:?}", outcome);
        self.outcome = Some(outcome);
        self.agenda.clear();
        self.pending = None;
        self.turn.priority = None;
    }

    #[must_use]
    pub fn pending_decision(&self) -> Option<&Decision> {
        self.pending.as_ref()
    }

    /// Whether execution is suspended on a decision.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn set_pending(&mut self, decision: Decision) {
        log::debug!("{} waits on {} ({:?})", decision.id, decision.player, decision.kind);
        self.pending = Some(decision);
    }

    pub(crate) fn take_pending(&mut self) -> Option<Decision> {
        self.pending.take()
    }

    pub(crate) fn next_decision_id(&mut self) -> DecisionId {
        let id = DecisionId(self.next_decision);
        self.next_decision += 1;
        id
    }

    // === Agenda ===

    pub(crate) fn push_work(&mut self, work: Work) {
        self.agenda.push_back(work);
    }

    pub(crate) fn pop_work(&mut self) -> Option<Work> {
        self.agenda.pop_back()
    }

    /// Number of work items waiting to run.
    #[must_use]
    pub fn agenda_len(&self) -> usize {
        self.agenda.len()
    }

    // === Fingerprint ===

    /// Hash of the serialized state. Equal states have equal fingerprints.
    pub fn fingerprint(&self) -> Result<u64> {
        let bytes = bincode::serialize(self).map_err(|err| RulesError::Serialization(err.to_string()))?;
        let mut hasher = FxHasher::default();
        hasher.write(&bytes);
        Ok(hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardId;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);
    const BEAR: CardId = CardId::new(0);

    #[test]
    fn test_new_state() {
        let state = GameState::new(3, 20, 0);
        assert_eq!(state.player_count(), 3);
        assert_eq!(state.life(PlayerId::new(2)), 20);
        assert_eq!(state.remaining_players().len(), 3);
        assert!(!state.is_paused());
        assert_eq!(state.entity(EntityId(1)).map(|r| r.kind), Some(EntityKind::Player));
    }

    #[test]
    fn test_component_access() {
        let mut state = GameState::new(2, 20, 0);
        let id = state.create_card(BEAR, P0, ZoneKind::Battlefield).unwrap();

        assert!(!state.has::<Tapped>(id));
        state.set(id, Tapped).unwrap();
        assert!(state.has::<Tapped>(id));
        assert_eq!(state.remove::<Tapped>(id).unwrap(), Some(Tapped));
        assert_eq!(state.remove::<Tapped>(id).unwrap(), None);

        assert_eq!(state.set(EntityId(99), Damage(1)), Err(RulesError::NoSuchEntity(EntityId(99))));
        assert!(state.remove::<Damage>(EntityId(99)).is_err());
    }

    #[test]
    fn test_move_clears_object_state() {
        let mut state = GameState::new(2, 20, 0);
        let id = state.create_card(BEAR, P0, ZoneKind::Battlefield).unwrap();
        state.set(id, Damage(2)).unwrap();
        state.set(id, Tapped).unwrap();

        let event = state
            .move_entity(id, ZoneKey::battlefield(), ZoneKey::graveyard(P0), ZonePosition::Top)
            .unwrap();
        assert_eq!(
            event,
            GameEvent::ZoneChanged {
                entity: id,
                from: ZoneKey::battlefield(),
                to: ZoneKey::graveyard(P0)
            }
        );
        assert!(!state.has::<Damage>(id));
        assert!(!state.has::<Tapped>(id));

        state
            .move_entity(id, ZoneKey::graveyard(P0), ZoneKey::battlefield(), ZonePosition::Top)
            .unwrap();
        assert!(state.has::<SummoningSick>(id));
        assert!(state.has::<EnteredAt>(id));
    }

    #[test]
    fn test_move_errors() {
        let mut state = GameState::new(2, 20, 0);
        let id = state.create_card(BEAR, P0, ZoneKind::Hand).unwrap();

        let wrong_from = state.move_entity(id, ZoneKey::library(P0), ZoneKey::hand(P0), ZonePosition::Top);
        assert_eq!(wrong_from, Err(RulesError::NoSuchEntity(id)));

        let foreign = state.move_entity(id, ZoneKey::hand(P0), ZoneKey::graveyard(P1), ZonePosition::Top);
        assert!(matches!(foreign, Err(RulesError::IllegalZoneTransition { .. })));

        let player = state.move_entity(EntityId(0), ZoneKey::hand(P0), ZoneKey::exile(), ZonePosition::Top);
        assert!(matches!(player, Err(RulesError::IllegalZoneTransition { .. })));

        assert_eq!(state.zones().zone_of(id), Some(ZoneKey::hand(P0)));
    }

    #[test]
    fn test_tokens_and_removal() {
        let mut state = GameState::new(2, 20, 0);
        let token = state.create_token(BEAR, P1).unwrap();
        assert_eq!(state.entity(token).map(|r| r.kind), Some(EntityKind::Token));
        assert!(state.has::<SummoningSick>(token));

        state.remove_entity(token).unwrap();
        assert!(!state.exists(token));
        assert!(!state.zones().contains(token));
        assert_eq!(state.remove_entity(token), Err(RulesError::NoSuchEntity(token)));
    }

    #[test]
    fn test_snapshot_and_fingerprint() {
        let mut state = GameState::new(2, 20, 7);
        state.create_card(BEAR, P0, ZoneKind::Library).unwrap();
        let snapshot = state.clone();
        assert_eq!(snapshot.fingerprint().unwrap(), state.fingerprint().unwrap());

        state.create_card(BEAR, P0, ZoneKind::Library).unwrap();
        assert_ne!(snapshot, state);
        assert_ne!(snapshot.fingerprint().unwrap(), state.fingerprint().unwrap());
    }

    #[test]
    fn test_log_batches() {
        let mut state = GameState::new(2, 20, 0);
        let batch = state.begin_batch();
        state.log_event(GameEvent::Tapped { entity: EntityId(5) }, None);
        state.log_event(GameEvent::Untapped { entity: EntityId(5) }, None);
        assert_eq!(state.log().len(), 2);
        assert!(state.log().iter().all(|e| e.batch == batch));
        assert_eq!(state.log_since(1).len(), 1);
    }
}
