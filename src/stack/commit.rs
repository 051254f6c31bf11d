//! Committing proposed events.
//!
//! A `CommitQueue` is one batch: every event in it happens simultaneously.
//! Each event goes through the replacement engine first; when several
//! replacement effects apply, the affected player picks one and the queue
//! waits on the agenda. After the batch, a game with at most one player
//! left is over.

use serde::{Deserialize, Serialize};

use crate::cards::{CounterKind, Keyword};
use crate::core::{
    AttachedTo, Attacking, Blocked, Blocking, Counters, Damage, DeathtouchDamage, DrewFromEmpty, EnteredAt, EntityId,
    GameState, Life, Lost, ManaPool, PlayerId, Tapped,
};
use crate::decision::{DecisionKind, DecisionOption};
use crate::error::{Result, RulesError};
use crate::layers::{project, ProjectedView};
use crate::replacement::{self, PendingCommit, ReplacementOutcome};
use crate::rules::GameOutcome;
use crate::triggers::{DamageEvent, GameEvent, LastKnown, ProposedEvent};
use crate::zones::{ZoneKey, ZoneKind, ZonePosition};

use super::agenda::{ask, Answer, Work};
use super::engine::Engine;

/// Events waiting to commit as one batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitQueue {
    pub events: Vec<ProposedEvent>,
    /// Whether the batch has been opened.
    pub started: bool,
    /// An event waiting on a replacement-order decision.
    pub choosing: Option<PendingCommit>,
}

impl CommitQueue {
    #[must_use]
    pub fn new(events: Vec<ProposedEvent>) -> Self {
        Self {
            events,
            started: false,
            choosing: None,
        }
    }
}

pub(crate) fn step(engine: &Engine, state: &mut GameState, mut queue: CommitQueue, answer: Option<Answer>) -> Result<()> {
    let registry = engine.registry();
    if !queue.started {
        queue.started = true;
        state.begin_batch();
    }

    let mut resumed = None;
    if let Some(pending) = queue.choosing.take() {
        let key = match answer.as_ref().and_then(Answer::option) {
            Some(DecisionOption::Replacement(key)) => *key,
            _ => return Err(RulesError::InvalidResponse("expected a replacement effect".into())),
        };
        let view = project(state, registry);
        resumed = Some(replacement::apply_chosen(pending, key, state, &view, registry));
    }

    loop {
        let outcome = match resumed.take() {
            Some(outcome) => outcome,
            None => {
                if queue.events.is_empty() {
                    break;
                }
                let event = queue.events.remove(0);
                let view = project(state, registry);
                replacement::apply(PendingCommit::new(event), state, &view, registry)
            }
        };

        match outcome {
            ReplacementOutcome::Commit(event) => {
                let view = project(state, registry);
                let follow_ups = apply_event(state, &view, event)?;
                queue.events.splice(0..0, follow_ups);
            }
            ReplacementOutcome::Prevented => {}
            ReplacementOutcome::Choose {
                pending,
                chooser,
                options,
            } => {
                queue.choosing = Some(pending);
                state.push_work(Work::Commit(queue));
                let options = options.into_iter().map(DecisionOption::Replacement).collect();
                ask(state, chooser, DecisionKind::OrderReplacements, options);
                return Ok(());
            }
        }
    }

    check_outcome(state);
    Ok(())
}

/// Record the end of the game once at most one player is left.
fn check_outcome(state: &mut GameState) {
    if state.outcome().is_some() {
        return;
    }
    match state.remaining_players().as_slice() {
        [] => state.set_outcome(GameOutcome::Draw),
        [winner] => state.set_outcome(GameOutcome::Winner(*winner)),
        _ => {}
    }
}

fn last_known(state: &GameState, view: &ProjectedView, entity: EntityId) -> Option<LastKnown> {
    let chars = view.get(entity)?;
    Some(LastKnown {
        controller: chars.controller,
        definition: chars.definition,
        was_creature: chars.is_creature(),
        power: chars.power,
        abilities_removed: chars.abilities_removed,
        entered_batch: state.get::<EnteredAt>(entity).map_or(0, |entered| entered.batch),
    })
}

/// Carry out one event that survived replacement. Returns events that
/// happen as a consequence in the same batch (lifelink).
pub(crate) fn apply_event(state: &mut GameState, view: &ProjectedView, event: ProposedEvent) -> Result<Vec<ProposedEvent>> {
    if !state.exists(event.affected()) {
        return Ok(Vec::new());
    }
    let player_count = state.player_count();

    match event {
        ProposedEvent::MoveZone {
            entity,
            from,
            to,
            position,
        } => {
            let Some(current) = state.zones().zone_of(entity).filter(|zone| zone.kind == from) else {
                return Ok(Vec::new());
            };
            let owner = state.entity(entity).ok_or(RulesError::NoSuchEntity(entity))?.owner;
            let known = if from == ZoneKind::Battlefield {
                last_known(state, view, entity)
            } else {
                None
            };
            let moved = state.move_entity(entity, current, ZoneKey::for_owner(owner, to), position)?;
            state.log_event(moved, known);
        }

        ProposedEvent::Damage(damage) => return deal_damage(state, damage),

        ProposedEvent::GainLife { player, amount } | ProposedEvent::LoseLife { player, amount }
            if amount == 0 || state.has_lost(player) => {}
        ProposedEvent::GainLife { player, amount } => change_life(state, player, i64::from(amount))?,
        ProposedEvent::LoseLife { player, amount } => change_life(state, player, -i64::from(amount))?,

        ProposedEvent::Draw { player } => {
            let library = ZoneKey::library(player);
            match state.zones().top(library) {
                Some(card) => {
                    let moved = state.move_entity(card, library, ZoneKey::hand(player), ZonePosition::Top)?;
                    state.log_event(moved, None);
                    state.log_event(GameEvent::CardDrawn { player, card }, None);
                }
                None => {
                    state.set(EntityId::player(player), DrewFromEmpty)?;
                    state.log_event(GameEvent::DrewFromEmptyLibrary { player }, None);
                }
            }
        }

        ProposedEvent::PutCounters { entity, kind, amount } => {
            let mut counters = state.get::<Counters>(entity).cloned().unwrap_or_default();
            counters.add(kind.clone(), amount);
            state.set(entity, counters)?;
            state.log_event(GameEvent::CountersAdded { entity, kind, amount }, None);
        }
        ProposedEvent::RemoveCounters { entity, kind, amount } => {
            let mut counters = state.get::<Counters>(entity).cloned().unwrap_or_default();
            let removed = counters.remove(&kind, amount);
            if removed > 0 {
                state.set(entity, counters)?;
                state.log_event(
                    GameEvent::CountersRemoved {
                        entity,
                        kind,
                        amount: removed,
                    },
                    None,
                );
            }
        }
        ProposedEvent::AnnihilateCounters { entity, amount } => {
            let mut counters = state.get::<Counters>(entity).cloned().unwrap_or_default();
            let removed = counters.remove(&CounterKind::PlusOne, amount);
            counters.remove(&CounterKind::MinusOne, removed);
            if removed > 0 {
                state.set(entity, counters)?;
                state.log_event(GameEvent::CountersAnnihilated { entity, amount: removed }, None);
            }
        }

        ProposedEvent::Tap { entity } => {
            if !state.has::<Tapped>(entity) {
                state.set(entity, Tapped)?;
                state.log_event(GameEvent::Tapped { entity }, None);
            }
        }
        ProposedEvent::Untap { entity } => {
            if state.remove::<Tapped>(entity)?.is_some() {
                state.log_event(GameEvent::Untapped { entity }, None);
            }
        }

        ProposedEvent::AddMana { player, mana, amount } => {
            let id = EntityId::player(player);
            let mut pool = state.get::<ManaPool>(id).cloned().unwrap_or_default();
            pool.add(mana, amount);
            state.set(id, pool)?;
            state.log_event(GameEvent::ManaAdded { player, mana, amount }, None);
        }

        ProposedEvent::Lose { player, reason } => {
            if !state.has_lost(player) {
                state.set(EntityId::player(player), Lost(reason))?;
                state.log_event(GameEvent::PlayerLost { player, reason }, None);
                log::debug!("{} lost ({:?})", player, reason);
                state.remove_player_objects(player);
            }
        }

        ProposedEvent::Attach { entity, to } => {
            if state.exists(to) {
                state.set(entity, AttachedTo(to))?;
                state.log_event(GameEvent::Attached { entity, to }, None);
            }
        }
        ProposedEvent::Unattach { entity } => {
            if let Some(AttachedTo(from)) = state.remove::<AttachedTo>(entity)? {
                state.log_event(GameEvent::Unattached { entity, from }, None);
            }
        }

        ProposedEvent::CreateToken { card, controller } => {
            if !state.has_lost(controller) {
                let token = state.create_token(card, controller)?;
                state.log_event(GameEvent::TokenCreated { token, controller }, None);
            }
        }
        ProposedEvent::CeaseToExist { entity } => {
            if !entity.is_player(player_count) {
                state.remove_entity(entity)?;
                state.log_event(GameEvent::CeasedToExist { entity }, None);
            }
        }

        ProposedEvent::DeclareAttacker { attacker, defender } => {
            state.set(attacker, Attacking(defender))?;
            if !view.has_keyword(attacker, Keyword::Vigilance) && !state.has::<Tapped>(attacker) {
                state.set(attacker, Tapped)?;
                state.log_event(GameEvent::Tapped { entity: attacker }, None);
            }
            state.log_event(GameEvent::AttackerDeclared { attacker, defender }, None);
        }
        ProposedEvent::DeclareBlocker { blocker, attacker } => {
            if state.exists(attacker) {
                state.set(blocker, Blocking(attacker))?;
                state.set(attacker, Blocked)?;
                state.log_event(GameEvent::BlockerDeclared { blocker, attacker }, None);
            }
        }
    }
    Ok(Vec::new())
}

fn change_life(state: &mut GameState, player: PlayerId, delta: i64) -> Result<()> {
    let id = EntityId::player(player);
    let life = state.life(player) + delta;
    state.set(id, Life(life))?;
    state.log_event(GameEvent::LifeChanged { player, delta }, None);
    Ok(())
}

fn deal_damage(state: &mut GameState, damage: DamageEvent) -> Result<Vec<ProposedEvent>> {
    let DamageEvent {
        source,
        target,
        amount,
        combat,
        deathtouch,
        lifelink,
        source_controller,
    } = damage;
    if amount == 0 {
        return Ok(Vec::new());
    }

    match target.as_player(state.player_count()) {
        Some(player) => {
            if state.has_lost(player) {
                return Ok(Vec::new());
            }
            state.log_event(
                GameEvent::DamageDealt {
                    source,
                    target,
                    amount,
                    combat,
                },
                None,
            );
            change_life(state, player, -i64::from(amount))?;
        }
        None => {
            if state.zones().zone_of(target) != Some(ZoneKey::battlefield()) {
                return Ok(Vec::new());
            }
            let marked = state.get::<Damage>(target).map_or(0, |d| d.0);
            state.set(target, Damage(marked + amount))?;
            if deathtouch {
                state.set(target, DeathtouchDamage)?;
            }
            state.log_event(
                GameEvent::DamageDealt {
                    source,
                    target,
                    amount,
                    combat,
                },
                None,
            );
        }
    }

    if lifelink && !state.has_lost(source_controller) {
        return Ok(vec![ProposedEvent::GainLife {
            player: source_controller,
            amount,
        }]);
    }
    Ok(Vec::new())
}
