//! Effect definitions.
//!
//! `Effect` is the closed set of one-shot instructions a spell or ability
//! can carry. Every variant is handled by the single interpreter in
//! `effects::resolver`; adding a variant is a compile-checked change there.
//!
//! Effects name their subjects through `EffectTarget` and their numbers
//! through `Amount`, both bound when the stack object resolves.

use serde::{Deserialize, Serialize};

use crate::cards::{CardId, CounterKind, Keyword, ManaType};
use crate::core::Step;
use crate::layers::{Duration, Modification};

use super::targeting::TargetFilter;

/// A number an effect uses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Amount {
    Fixed(i64),
    /// The X chosen when the spell was cast.
    X,
    /// The source's current power (last known if it left the battlefield).
    SourcePower,
}

/// Who or what an effect applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectTarget {
    /// The n-th chosen target. Skipped if it became illegal.
    Target(usize),
    /// The controller of the resolving object.
    Controller,
    /// The source of the resolving object.
    Source,
    /// The entity whose event fired the trigger.
    TriggeringEntity,
    /// The object the source is attached to.
    AttachedToSource,
    EachOpponent,
    EachPlayer,
    /// Every permanent matching the filter, evaluated on resolution.
    Each(TargetFilter),
}

/// When a delayed trigger fires.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelayedCondition {
    /// The next time the given step begins.
    NextStep(Step),
    /// When the given target (or source) leaves the battlefield.
    LeavesBattlefield(EffectTarget),
}

/// A one-shot effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    DealDamage { amount: Amount, to: EffectTarget },
    GainLife { amount: Amount, player: EffectTarget },
    LoseLife { amount: Amount, player: EffectTarget },
    DrawCards { amount: Amount, player: EffectTarget },

    Destroy { target: EffectTarget },
    Exile { target: EffectTarget },
    ReturnToHand { target: EffectTarget },
    Sacrifice { target: EffectTarget },
    /// The player chooses a permanent they control matching `filter` and sacrifices it.
    SacrificeChosen { player: EffectTarget, filter: TargetFilter },

    AddCounters { kind: CounterKind, amount: Amount, target: EffectTarget },
    RemoveCounters { kind: CounterKind, amount: Amount, target: EffectTarget },
    Tap { target: EffectTarget },
    Untap { target: EffectTarget },

    /// +N/+N until end of turn.
    Pump { target: EffectTarget, power: i32, toughness: i32 },
    GrantKeyword { target: EffectTarget, keyword: Keyword },
    /// A continuous effect locked to the objects `target` names now.
    ApplyContinuous {
        target: EffectTarget,
        modification: Modification,
        duration: Duration,
    },

    /// "If that creature would die this turn, exile it instead."
    ExileIfWouldDieThisTurn { target: EffectTarget },
    /// Prevent all damage that would be dealt to the target this turn.
    PreventDamageThisTurn { target: EffectTarget },

    /// Counter the target spell.
    CounterSpell { target: EffectTarget },
    /// Attach the source to the target (Equip, Aura movement).
    AttachSource { to: EffectTarget },

    CreateToken { card: CardId, count: u32, controller: EffectTarget },
    AddMana { mana: ManaType, amount: u32 },

    /// Register a one-shot trigger for later.
    CreateDelayedTrigger {
        condition: DelayedCondition,
        effects: Vec<Effect>,
    },

    /// The controller chooses one mode on resolution.
    Modal { modes: Vec<Vec<Effect>> },
}

impl Effect {
    /// Deal a fixed amount of damage (convenience).
    pub fn damage(amount: i64, to: EffectTarget) -> Self {
        Effect::DealDamage {
            amount: Amount::Fixed(amount),
            to,
        }
    }

    /// The controller gains a fixed amount of life (convenience).
    pub fn gain_life(amount: i64) -> Self {
        Effect::GainLife {
            amount: Amount::Fixed(amount),
            player: EffectTarget::Controller,
        }
    }

    /// The controller draws cards (convenience).
    pub fn draw(amount: i64) -> Self {
        Effect::DrawCards {
            amount: Amount::Fixed(amount),
            player: EffectTarget::Controller,
        }
    }

    /// Put counters on a target (convenience).
    pub fn add_counters(kind: CounterKind, amount: i64, target: EffectTarget) -> Self {
        Effect::AddCounters {
            kind,
            amount: Amount::Fixed(amount),
            target,
        }
    }

    /// Whether this effect only adds mana (mana abilities resolve immediately).
    #[must_use]
    pub fn is_mana(&self) -> bool {
        matches!(self, Effect::AddMana { .. })
    }
}
