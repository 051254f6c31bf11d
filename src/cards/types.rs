//! Card vocabulary: colors, mana, type line, keywords and counter kinds.
//!
//! These are closed enums: the engine interprets them directly, and card
//! data combines them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

/// One unit of mana in a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ManaType {
    Colored(Color),
    Colorless,
}

/// A mana cost: colored pips, a generic part and an optional X.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaCost {
    pub generic: u32,
    pub colored: BTreeMap<Color, u32>,
    pub has_x: bool,
}

impl ManaCost {
    /// A cost with no mana.
    #[must_use]
    pub fn free() -> Self {
        Self::default()
    }

    /// Only generic mana.
    #[must_use]
    pub fn generic(amount: u32) -> Self {
        Self {
            generic: amount,
            ..Self::default()
        }
    }

    /// Add colored pips (builder pattern).
    #[must_use]
    pub fn with(mut self, color: Color, amount: u32) -> Self {
        *self.colored.entry(color).or_insert(0) += amount;
        self
    }

    /// Mark the cost as containing `{X}` (builder pattern).
    #[must_use]
    pub fn with_x(mut self) -> Self {
        self.has_x = true;
        self
    }

    /// Mana value with X counted as `x`.
    #[must_use]
    pub fn total(&self, x: u32) -> u32 {
        self.generic + self.colored.values().sum::<u32>() + if self.has_x { x } else { 0 }
    }

    #[must_use]
    pub fn is_free(&self) -> bool {
        self.total(0) == 0 && !self.has_x
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardType {
    Artifact,
    Creature,
    Enchantment,
    Instant,
    Land,
    Sorcery,
}

impl CardType {
    /// Whether a card of this type becomes a permanent when it resolves.
    #[must_use]
    pub fn is_permanent(self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Supertype {
    Basic,
    Legendary,
}

/// Keyword abilities the engine interprets directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Flying,
    Reach,
    Deathtouch,
    Defender,
    Flash,
    Haste,
    Hexproof,
    Indestructible,
    Lifelink,
    Trample,
    Vigilance,
}

/// Kinds of counters that can sit on a permanent or a player.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CounterKind {
    PlusOne,
    MinusOne,
    Poison,
    Charge,
    Depletion,
    Named(String),
}

impl std::fmt::Display for CounterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CounterKind::PlusOne => write!(f, "+1/+1"),
            CounterKind::MinusOne => write!(f, "-1/-1"),
            CounterKind::Poison => write!(f, "poison"),
            CounterKind::Charge => write!(f, "charge"),
            CounterKind::Depletion => write!(f, "depletion"),
            CounterKind::Named(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mana_cost_total() {
        let cost = ManaCost::generic(2).with(Color::Red, 1).with(Color::Red, 1);
        assert_eq!(cost.total(0), 4);
        assert_eq!(cost.colored[&Color::Red], 2);

        let fireball = ManaCost::free().with(Color::Red, 1).with_x();
        assert_eq!(fireball.total(5), 6);
        assert!(!fireball.is_free());
        assert!(ManaCost::free().is_free());
    }

    #[test]
    fn test_permanent_types() {
        assert!(CardType::Creature.is_permanent());
        assert!(CardType::Land.is_permanent());
        assert!(!CardType::Instant.is_permanent());
        assert!(!CardType::Sorcery.is_permanent());
    }

    #[test]
    fn test_counter_display() {
        assert_eq!(CounterKind::PlusOne.to_string(), "+1/+1");
        assert_eq!(CounterKind::Named("oil".into()).to_string(), "oil");
    }
}
