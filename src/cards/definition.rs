//! Card definitions - static card data.
//!
//! `CardDefinition` holds the printed properties of a card: cost, type
//! line, base power/toughness, keywords and its abilities expressed as
//! data (effects, target specs, costs). Everything that changes during a
//! game (damage, counters, zone, controller) lives on the `GameState`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::effects::{Effect, TargetFilter, TargetSpec};
use crate::layers::StaticAbility;
use crate::replacement::ReplacementEffect;
use crate::triggers::TriggerCondition;

use super::types::{CardType, Color, CounterKind, Keyword, ManaCost, Supertype};

/// Unique identifier for a card definition.
///
/// This identifies the "type" of card (e.g., "Lightning Bolt"),
/// not a specific instance in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// "When/Whenever/At ..., do ..."
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredAbility {
    pub condition: TriggerCondition,
    pub targets: Vec<TargetSpec>,
    pub effects: Vec<Effect>,
}

impl TriggeredAbility {
    #[must_use]
    pub fn new(condition: TriggerCondition, effects: Vec<Effect>) -> Self {
        Self {
            condition,
            targets: Vec::new(),
            effects,
        }
    }

    #[must_use]
    pub fn with_target(mut self, spec: TargetSpec) -> Self {
        self.targets.push(spec);
        self
    }
}

/// Costs of an activated ability.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityCost {
    pub mana: ManaCost,
    /// `{T}`
    pub tap: bool,
    pub sacrifice_self: bool,
    pub remove_counters: Option<(CounterKind, u32)>,
}

impl AbilityCost {
    /// Just `{T}`.
    #[must_use]
    pub fn tap() -> Self {
        Self {
            tap: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mana(cost: ManaCost) -> Self {
        Self {
            mana: cost,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sacrifice(mut self) -> Self {
        self.sacrifice_self = true;
        self
    }

    #[must_use]
    pub fn with_tap(mut self) -> Self {
        self.tap = true;
        self
    }

    /// "Remove `amount` `kind` counters from this."
    #[must_use]
    pub fn with_counter_removal(mut self, kind: CounterKind, amount: u32) -> Self {
        self.remove_counters = Some((kind, amount));
        self
    }
}

/// "Cost: Effect."
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedAbility {
    pub cost: AbilityCost,
    pub targets: Vec<TargetSpec>,
    pub effects: Vec<Effect>,
    /// Only as a sorcery (main step, empty stack, your turn).
    pub sorcery_speed: bool,
}

impl ActivatedAbility {
    #[must_use]
    pub fn new(cost: AbilityCost, effects: Vec<Effect>) -> Self {
        Self {
            cost,
            targets: Vec::new(),
            effects,
            sorcery_speed: false,
        }
    }

    #[must_use]
    pub fn with_target(mut self, spec: TargetSpec) -> Self {
        self.targets.push(spec);
        self
    }

    #[must_use]
    pub fn sorcery_speed(mut self) -> Self {
        self.sorcery_speed = true;
        self
    }

    /// Mana abilities have no targets and only add mana. They do not use the stack.
    #[must_use]
    pub fn is_mana_ability(&self) -> bool {
        self.targets.is_empty() && !self.effects.is_empty() && self.effects.iter().all(Effect::is_mana)
    }
}

/// Printed card data.
///
/// ## Example
///
/// ```
/// use ccg_rules::cards::{CardDefinition, CardType, Color, Keyword, ManaCost};
///
/// let drake = CardDefinition::new("Wind Drake")
///     .with_cost(ManaCost::generic(2).with(Color::Blue, 1))
///     .with_type(CardType::Creature)
///     .with_subtype("Drake")
///     .with_pt(2, 2)
///     .with_keyword(Keyword::Flying);
///
/// assert!(drake.is_permanent());
/// assert!(drake.colors.contains(&Color::Blue));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Assigned by the registry.
    pub id: CardId,

    pub name: String,
    pub mana_cost: ManaCost,

    // === Type line ===
    pub card_types: BTreeSet<CardType>,
    pub supertypes: BTreeSet<Supertype>,
    pub subtypes: BTreeSet<String>,

    pub colors: BTreeSet<Color>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub keywords: BTreeSet<Keyword>,

    // === Abilities ===
    pub statics: Vec<StaticAbility>,
    pub triggers: Vec<TriggeredAbility>,
    pub activated: Vec<ActivatedAbility>,
    pub replacements: Vec<ReplacementEffect>,

    /// What an instant or sorcery does on resolution.
    pub spell_effects: Vec<Effect>,
    /// Targets chosen on casting.
    pub spell_targets: Vec<TargetSpec>,

    /// For Auras: what the Aura can legally be attached to.
    pub enchant: Option<TargetFilter>,
}

impl CardDefinition {
    /// Create an empty definition. The registry assigns the id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CardId::new(0),
            name: name.into(),
            mana_cost: ManaCost::free(),
            card_types: BTreeSet::new(),
            supertypes: BTreeSet::new(),
            subtypes: BTreeSet::new(),
            colors: BTreeSet::new(),
            power: None,
            toughness: None,
            keywords: BTreeSet::new(),
            statics: Vec::new(),
            triggers: Vec::new(),
            activated: Vec::new(),
            replacements: Vec::new(),
            spell_effects: Vec::new(),
            spell_targets: Vec::new(),
            enchant: None,
        }
    }

    /// Set the mana cost. Colored pips also set the card's colors.
    #[must_use]
    pub fn with_cost(mut self, cost: ManaCost) -> Self {
        self.colors.extend(cost.colored.keys().copied());
        self.mana_cost = cost;
        self
    }

    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        self.card_types.insert(card_type);
        self
    }

    #[must_use]
    pub fn with_supertype(mut self, supertype: Supertype) -> Self {
        self.supertypes.insert(supertype);
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtypes.insert(subtype.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.colors.insert(color);
        self
    }

    #[must_use]
    pub fn with_pt(mut self, power: i32, toughness: i32) -> Self {
        self.power = Some(power);
        self.toughness = Some(toughness);
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.insert(keyword);
        self
    }

    #[must_use]
    pub fn with_static(mut self, ability: StaticAbility) -> Self {
        self.statics.push(ability);
        self
    }

    #[must_use]
    pub fn with_trigger(mut self, ability: TriggeredAbility) -> Self {
        self.triggers.push(ability);
        self
    }

    #[must_use]
    pub fn with_activated(mut self, ability: ActivatedAbility) -> Self {
        self.activated.push(ability);
        self
    }

    #[must_use]
    pub fn with_replacement(mut self, replacement: ReplacementEffect) -> Self {
        self.replacements.push(replacement);
        self
    }

    /// Add a resolution effect (instants and sorceries).
    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.spell_effects.push(effect);
        self
    }

    /// Add a target chosen on casting.
    #[must_use]
    pub fn with_target(mut self, spec: TargetSpec) -> Self {
        self.spell_targets.push(spec);
        self
    }

    /// Make this an Aura that enchants permanents matching `filter`.
    #[must_use]
    pub fn enchanting(mut self, filter: TargetFilter) -> Self {
        self.subtypes.insert("Aura".into());
        self.spell_targets.push(TargetSpec::new(filter.clone()));
        self.enchant = Some(filter);
        self
    }

    #[must_use]
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    /// Whether the card becomes a permanent when it resolves.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        !self.card_types.is_empty() && self.card_types.iter().all(|t| t.is_permanent())
    }

    #[must_use]
    pub fn is_land(&self) -> bool {
        self.has_type(CardType::Land)
    }

    #[must_use]
    pub fn is_aura(&self) -> bool {
        self.enchant.is_some()
    }

    #[must_use]
    pub fn is_equipment(&self) -> bool {
        self.subtypes.contains("Equipment")
    }

    /// Instants and cards with flash may be cast any time their controller has priority.
    #[must_use]
    pub fn has_instant_timing(&self) -> bool {
        self.has_type(CardType::Instant) || self.keywords.contains(&Keyword::Flash)
    }
}
