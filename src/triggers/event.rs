//! Game events.
//!
//! Two kinds of event exist:
//!
//! - `ProposedEvent`: something about to happen. Replacement effects see
//!   and may rewrite it before it commits.
//! - `GameEvent`: something that happened. Committed events are appended
//!   to the state's log as `LoggedEvent`s, where state-based actions and
//!   trigger detection read them.
//!
//! Every logged event carries the batch it committed in. Events of one
//! batch happened simultaneously.

use serde::{Deserialize, Serialize};

use crate::cards::{CardId, CounterKind, ManaType};
use crate::core::{EntityId, LossReason, PlayerId, Step};
use crate::zones::{ZoneKey, ZoneKind, ZonePosition};

/// Damage about to be dealt, with the source's relevant keywords captured
/// when the damage was proposed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub source: EntityId,
    pub target: EntityId,
    pub amount: u32,
    pub combat: bool,
    pub deathtouch: bool,
    pub lifelink: bool,
    pub source_controller: PlayerId,
}

/// An event that has not happened yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposedEvent {
    /// Skipped on commit if the entity is no longer in `from`.
    MoveZone {
        entity: EntityId,
        from: ZoneKind,
        to: ZoneKind,
        position: ZonePosition,
    },
    Damage(DamageEvent),
    GainLife { player: PlayerId, amount: u32 },
    LoseLife { player: PlayerId, amount: u32 },
    /// One card. Drawing several cards is several events.
    Draw { player: PlayerId },
    PutCounters { entity: EntityId, kind: CounterKind, amount: u32 },
    RemoveCounters { entity: EntityId, kind: CounterKind, amount: u32 },
    /// `+1/+1` and `-1/-1` counters cancelling in pairs.
    AnnihilateCounters { entity: EntityId, amount: u32 },
    Tap { entity: EntityId },
    Untap { entity: EntityId },
    AddMana { player: PlayerId, mana: ManaType, amount: u32 },
    Lose { player: PlayerId, reason: LossReason },
    Attach { entity: EntityId, to: EntityId },
    Unattach { entity: EntityId },
    CreateToken { card: CardId, controller: PlayerId },
    CeaseToExist { entity: EntityId },
    DeclareAttacker { attacker: EntityId, defender: PlayerId },
    DeclareBlocker { blocker: EntityId, attacker: EntityId },
}

impl ProposedEvent {
    /// Move a permanent from the battlefield to its owner's `to` zone.
    #[must_use]
    pub fn leave_battlefield(entity: EntityId, to: ZoneKind) -> Self {
        ProposedEvent::MoveZone {
            entity,
            from: ZoneKind::Battlefield,
            to,
            position: ZonePosition::Top,
        }
    }

    /// The object or player the event happens to.
    #[must_use]
    pub fn affected(&self) -> EntityId {
        match self {
            ProposedEvent::MoveZone { entity, .. }
            | ProposedEvent::PutCounters { entity, .. }
            | ProposedEvent::RemoveCounters { entity, .. }
            | ProposedEvent::AnnihilateCounters { entity, .. }
            | ProposedEvent::Tap { entity }
            | ProposedEvent::Untap { entity }
            | ProposedEvent::Attach { entity, .. }
            | ProposedEvent::Unattach { entity }
            | ProposedEvent::CeaseToExist { entity } => *entity,
            ProposedEvent::Damage(damage) => damage.target,
            ProposedEvent::GainLife { player, .. }
            | ProposedEvent::LoseLife { player, .. }
            | ProposedEvent::Draw { player }
            | ProposedEvent::AddMana { player, .. }
            | ProposedEvent::Lose { player, .. }
            | ProposedEvent::CreateToken { controller: player, .. } => EntityId::player(*player),
            ProposedEvent::DeclareAttacker { attacker, .. } => *attacker,
            ProposedEvent::DeclareBlocker { blocker, .. } => *blocker,
        }
    }
}

/// Information about a permanent as it last existed on the battlefield.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastKnown {
    pub controller: PlayerId,
    pub definition: Option<CardId>,
    pub was_creature: bool,
    pub power: Option<i32>,
    pub abilities_removed: bool,
    /// Batch in which it had entered the battlefield.
    pub entered_batch: u64,
}

/// Something that happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    ZoneChanged { entity: EntityId, from: ZoneKey, to: ZoneKey },
    DamageDealt { source: EntityId, target: EntityId, amount: u32, combat: bool },
    LifeChanged { player: PlayerId, delta: i64 },
    CountersAdded { entity: EntityId, kind: CounterKind, amount: u32 },
    CountersRemoved { entity: EntityId, kind: CounterKind, amount: u32 },
    CountersAnnihilated { entity: EntityId, amount: u32 },
    Tapped { entity: EntityId },
    Untapped { entity: EntityId },
    CardDrawn { player: PlayerId, card: EntityId },
    DrewFromEmptyLibrary { player: PlayerId },
    PlayerLost { player: PlayerId, reason: LossReason },
    SpellCast { spell: EntityId, controller: PlayerId },
    AbilityActivated { ability: EntityId, source: EntityId, controller: PlayerId },
    StepBegan { turn: u32, step: Step, active: PlayerId },
    AttackerDeclared { attacker: EntityId, defender: PlayerId },
    BlockerDeclared { blocker: EntityId, attacker: EntityId },
    Attached { entity: EntityId, to: EntityId },
    Unattached { entity: EntityId, from: EntityId },
    ManaAdded { player: PlayerId, mana: ManaType, amount: u32 },
    TokenCreated { token: EntityId, controller: PlayerId },
    CeasedToExist { entity: EntityId },
    /// A stack object left the stack without resolving because its targets were gone.
    Fizzled { object: EntityId },
}

impl GameEvent {
    /// The entity that left the battlefield, if this is such a move.
    #[must_use]
    pub fn left_battlefield(&self) -> Option<EntityId> {
        match self {
            GameEvent::ZoneChanged { entity, from, .. } if from.kind == ZoneKind::Battlefield => Some(*entity),
            _ => None,
        }
    }

    /// The entity that entered the battlefield, if this is such a move
    /// or a token being created.
    #[must_use]
    pub fn entered_battlefield(&self) -> Option<EntityId> {
        match self {
            GameEvent::ZoneChanged { entity, to, .. } if to.kind == ZoneKind::Battlefield => Some(*entity),
            GameEvent::TokenCreated { token, .. } => Some(*token),
            _ => None,
        }
    }
}

/// A committed event in the state's log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Position in the log.
    pub seq: u64,
    /// Events sharing a batch happened simultaneously.
    pub batch: u64,
    pub event: GameEvent,
    /// Set when a permanent left the battlefield.
    pub last_known: Option<LastKnown>,
}

impl LoggedEvent {
    /// The creature that died (battlefield to graveyard), if any.
    #[must_use]
    pub fn died(&self) -> Option<EntityId> {
        match (&self.event, &self.last_known) {
            (GameEvent::ZoneChanged { entity, from, to }, Some(last_known))
                if from.kind == ZoneKind::Battlefield
                    && to.kind == ZoneKind::Graveyard
                    && last_known.was_creature =>
            {
                Some(*entity)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P0: PlayerId = PlayerId::new(0);

    fn last_known(was_creature: bool) -> LastKnown {
        LastKnown {
            controller: P0,
            definition: None,
            was_creature,
            power: Some(2),
            abilities_removed: false,
            entered_batch: 0,
        }
    }

    #[test]
    fn test_died_requires_creature_to_graveyard() {
        let dies = LoggedEvent {
            seq: 0,
            batch: 1,
            event: GameEvent::ZoneChanged {
                entity: EntityId(5),
                from: ZoneKey::battlefield(),
                to: ZoneKey::graveyard(P0),
            },
            last_known: Some(last_known(true)),
        };
        assert_eq!(dies.died(), Some(EntityId(5)));

        let exiled = LoggedEvent {
            event: GameEvent::ZoneChanged {
                entity: EntityId(5),
                from: ZoneKey::battlefield(),
                to: ZoneKey::exile(),
            },
            ..dies.clone()
        };
        assert_eq!(exiled.died(), None);
        assert_eq!(exiled.event.left_battlefield(), Some(EntityId(5)));

        let artifact = LoggedEvent {
            last_known: Some(last_known(false)),
            ..dies
        };
        assert_eq!(artifact.died(), None);
    }

    #[test]
    fn test_affected_entity() {
        let damage = ProposedEvent::Damage(DamageEvent {
            source: EntityId(4),
            target: EntityId(1),
            amount: 2,
            combat: false,
            deathtouch: false,
            lifelink: false,
            source_controller: P0,
        });
        assert_eq!(damage.affected(), EntityId(1));
        assert_eq!(ProposedEvent::Draw { player: PlayerId::new(1) }.affected(), EntityId(1));
    }

    #[test]
    fn test_event_serialization() {
        let event = GameEvent::StepBegan {
            turn: 3,
            step: Step::Upkeep,
            active: P0,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
