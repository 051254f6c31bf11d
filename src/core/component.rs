//! Typed components attached to entities.
//!
//! An entity's mutable facets (marked damage, tapped status, counters,
//! life, ...) are stored as components. Absence means the default or
//! inactive value. The set of components is closed: each one is a struct
//! implementing [`Component`], wrapped in [`ComponentValue`] for storage.
//!
//! ```
//! use ccg_rules::core::{Component, ComponentKind, Damage};
//!
//! assert_eq!(Damage::KIND, ComponentKind::Damage);
//! let stored = Damage(3).into();
//! assert_eq!(Damage::from_value(&stored), Some(&Damage(3)));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{EntityId, PlayerId};
use crate::cards::{CounterKind, ManaCost, ManaType};

/// Typed access to one component kind.
pub trait Component: Clone + Into<ComponentValue> {
    const KIND: ComponentKind;

    /// Borrow the typed value out of storage, if the kinds match.
    fn from_value(value: &ComponentValue) -> Option<&Self>;
}

macro_rules! components {
    ($($name:ident),* $(,)?) => {
        /// Discriminant of a stored component.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum ComponentKind {
            $($name),*
        }

        /// Storage form of any component.
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        pub enum ComponentValue {
            $($name($name)),*
        }

        impl ComponentValue {
            #[must_use]
            pub fn kind(&self) -> ComponentKind {
                match self {
                    $(ComponentValue::$name(_) => ComponentKind::$name),*
                }
            }
        }

        $(
            impl From<$name> for ComponentValue {
                fn from(value: $name) -> Self {
                    ComponentValue::$name(value)
                }
            }

            impl Component for $name {
                const KIND: ComponentKind = ComponentKind::$name;

                fn from_value(value: &ComponentValue) -> Option<&Self> {
                    match value {
                        ComponentValue::$name(inner) => Some(inner),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )*
    };
}

components!(
    Damage,
    DeathtouchDamage,
    Tapped,
    Counters,
    Life,
    LandDrops,
    Lost,
    DrewFromEmpty,
    SummoningSick,
    EnteredAt,
    ManaPool,
    AttachedTo,
    Attacking,
    Blocking,
    Blocked,
    ThresholdsReached,
);

/// Damage marked on a permanent this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Damage(pub u32);

/// Marker: a source with deathtouch dealt damage to this permanent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathtouchDamage;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tapped;

/// Counters by kind. Kinds with a zero count are not stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters(pub BTreeMap<CounterKind, u32>);

impl Counters {
    #[must_use]
    pub fn count(&self, kind: &CounterKind) -> u32 {
        self.0.get(kind).copied().unwrap_or(0)
    }

    pub fn add(&mut self, kind: CounterKind, amount: u32) {
        if amount > 0 {
            *self.0.entry(kind).or_insert(0) += amount;
        }
    }

    /// Remove up to `amount`, returning how many were removed.
    pub fn remove(&mut self, kind: &CounterKind, amount: u32) -> u32 {
        let Some(current) = self.0.get_mut(kind) else {
            return 0;
        };
        let removed = amount.min(*current);
        *current -= removed;
        if *current == 0 {
            self.0.remove(kind);
        }
        removed
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A player's life total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Life(pub i64);

/// Land drops remaining this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandDrops(pub u32);

/// Why a player lost the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LossReason {
    ZeroLife,
    EmptyLibrary,
    Poison,
}

/// Marker carrying the reason a player has lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lost(pub LossReason);

/// Marker: the player attempted to draw from an empty library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrewFromEmpty;

/// Marker: the permanent came under its controller's control this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummoningSick;

/// When the permanent entered the battlefield.
///
/// `timestamp` orders its static abilities; `batch` tells trigger detection
/// which events the permanent was present for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnteredAt {
    pub timestamp: u64,
    pub batch: u64,
}

/// Unspent mana.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool(pub BTreeMap<ManaType, u32>);

impl ManaPool {
    pub fn add(&mut self, mana: ManaType, amount: u32) {
        if amount > 0 {
            *self.0.entry(mana).or_insert(0) += amount;
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    /// Pool left after paying `cost` with X = `x`, or `None` if it cannot pay.
    ///
    /// Colored pips are paid first; generic mana is then taken from
    /// colorless mana before colored mana, in color order.
    #[must_use]
    pub fn after_paying(&self, cost: &ManaCost, x: u32) -> Option<ManaPool> {
        let mut pool = self.clone();
        for (color, needed) in &cost.colored {
            let slot = pool.0.get_mut(&ManaType::Colored(*color))?;
            if *slot < *needed {
                return None;
            }
            *slot -= needed;
        }

        let mut generic = cost.generic + if cost.has_x { x } else { 0 };
        for available in pool.0.values_mut().rev() {
            let used = generic.min(*available);
            *available -= used;
            generic -= used;
        }
        if generic > 0 {
            return None;
        }

        pool.0.retain(|_, amount| *amount > 0);
        Some(pool)
    }
}

/// The object an Aura or Equipment is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedTo(pub EntityId);

/// The player this creature is attacking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attacking(pub PlayerId);

/// The attacker this creature is blocking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocking(pub EntityId);

/// Marker: this attacker was blocked, even if its blockers are gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocked;

/// Counter-threshold abilities of a permanent, by index, whose threshold
/// was met at the last check. Such an ability fires again only after its
/// count drops below the threshold and climbs back.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdsReached(pub BTreeSet<usize>);
