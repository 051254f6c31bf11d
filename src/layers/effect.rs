//! Continuous effects: what they change, whom they affect and how long
//! they last.
//!
//! A `Modification` determines its layer (and power/toughness sublayer), so
//! an effect can never be filed under the wrong layer.

use serde::{Deserialize, Serialize};

use crate::cards::{CardId, CardType, Color, CounterKind, Keyword};
use crate::core::{Counters, EntityId, GameState, Life, PlayerId};
use crate::effects::TargetFilter;

/// Unique identifier for a stored continuous effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u32);

impl EffectId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.0)
    }
}

/// The layers, in application order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    Copy,
    Control,
    Text,
    Type,
    Color,
    Ability,
    PowerToughness,
}

impl Layer {
    pub const ALL: [Layer; 7] = [
        Layer::Copy,
        Layer::Control,
        Layer::Text,
        Layer::Type,
        Layer::Color,
        Layer::Ability,
        Layer::PowerToughness,
    ];
}

/// Sublayers of the power/toughness layer, in application order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PtSublayer {
    CharacteristicDefining,
    SetBase,
    Counters,
    Modify,
    Switch,
}

/// A value a "set power/toughness" effect computes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PtValue {
    Fixed(i32, i32),
    /// Both equal the number of cards in the controller's graveyard.
    CardsInControllerGraveyard,
    /// Both equal the number of creatures the controller controls.
    CreaturesControllerControls,
}

/// What a continuous effect changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modification {
    // Layer 1
    /// Copiable values become those of another card.
    CopyOf(CardId),

    // Layer 2
    SetController(PlayerId),

    // Layer 3
    /// Every instance of one subtype word becomes another.
    ReplaceSubtypeWord { from: String, to: String },

    // Layer 4
    AddCardType(CardType),
    RemoveCardType(CardType),
    AddSubtype(String),
    SetSubtypes(Vec<String>),

    // Layer 5
    SetColors(Vec<Color>),
    AddColor(Color),

    // Layer 6
    AddKeyword(Keyword),
    RemoveKeyword(Keyword),
    RemoveAllAbilities,

    // Layer 7
    SetPowerToughness(PtValue),
    ModifyPowerToughness { power: i32, toughness: i32 },
    SwitchPowerToughness,
}

impl Modification {
    #[must_use]
    pub fn layer(&self) -> Layer {
        match self {
            Modification::CopyOf(_) => Layer::Copy,
            Modification::SetController(_) => Layer::Control,
            Modification::ReplaceSubtypeWord { .. } => Layer::Text,
            Modification::AddCardType(_)
            | Modification::RemoveCardType(_)
            | Modification::AddSubtype(_)
            | Modification::SetSubtypes(_) => Layer::Type,
            Modification::SetColors(_) | Modification::AddColor(_) => Layer::Color,
            Modification::AddKeyword(_)
            | Modification::RemoveKeyword(_)
            | Modification::RemoveAllAbilities => Layer::Ability,
            Modification::SetPowerToughness(_)
            | Modification::ModifyPowerToughness { .. }
            | Modification::SwitchPowerToughness => Layer::PowerToughness,
        }
    }

    /// Sublayer within power/toughness. `None` for the other layers.
    #[must_use]
    pub fn pt_sublayer(&self, characteristic_defining: bool) -> Option<PtSublayer> {
        match self {
            Modification::SetPowerToughness(_) if characteristic_defining => {
                Some(PtSublayer::CharacteristicDefining)
            }
            Modification::SetPowerToughness(_) => Some(PtSublayer::SetBase),
            Modification::ModifyPowerToughness { .. } => Some(PtSublayer::Modify),
            Modification::SwitchPowerToughness => Some(PtSublayer::Switch),
            _ => None,
        }
    }
}

/// The objects a continuous effect applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AffectedSet {
    /// A fixed set, locked when the effect was created.
    Entities(Vec<EntityId>),
    /// Every permanent matching the filter, re-evaluated at each layer.
    Matching(TargetFilter),
    /// The source object itself.
    Source,
    /// The permanent the source is attached to.
    AttachedTo,
}

/// A condition checked each time effects are projected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaticCondition {
    ControllerLifeAtMost(i64),
    SourceCountersAtLeast { kind: CounterKind, count: u32 },
}

impl StaticCondition {
    /// Evaluate for an ability of `source` controlled by `controller`.
    #[must_use]
    pub fn holds(&self, source: EntityId, controller: PlayerId, state: &GameState) -> bool {
        match self {
            StaticCondition::ControllerLifeAtMost(limit) => state
                .get::<Life>(EntityId::player(controller))
                .is_some_and(|life| life.0 <= *limit),
            StaticCondition::SourceCountersAtLeast { kind, count } => state
                .get::<Counters>(source)
                .is_some_and(|counters| counters.count(kind) >= *count),
        }
    }
}

/// How long a stored effect lasts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Duration {
    /// Ends during the cleanup step.
    UntilEndOfTurn,
    WhileSourceOnBattlefield,
    While(StaticCondition),
    Indefinite,
}

/// A static ability printed on a card definition.
///
/// Generates one continuous effect while the card is on the battlefield
/// (in every zone when it is characteristic-defining).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAbility {
    pub modification: Modification,
    pub affected: AffectedSet,
    pub condition: Option<StaticCondition>,
    pub characteristic_defining: bool,
}

impl StaticAbility {
    #[must_use]
    pub fn new(modification: Modification, affected: AffectedSet) -> Self {
        Self {
            modification,
            affected,
            condition: None,
            characteristic_defining: false,
        }
    }

    /// "Creatures you control get +N/+M" and similar anthems.
    #[must_use]
    pub fn anthem(filter: TargetFilter, power: i32, toughness: i32) -> Self {
        Self::new(
            Modification::ModifyPowerToughness { power, toughness },
            AffectedSet::Matching(filter),
        )
    }

    /// A characteristic-defining power/toughness ability ("*/*").
    #[must_use]
    pub fn defining(value: PtValue) -> Self {
        Self {
            characteristic_defining: true,
            ..Self::new(Modification::SetPowerToughness(value), AffectedSet::Source)
        }
    }

    #[must_use]
    pub fn with_condition(mut self, condition: StaticCondition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// A continuous effect created by a resolving spell or ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuousEffect {
    pub id: EffectId,
    pub source: EntityId,
    pub controller: PlayerId,
    pub modification: Modification,
    pub affected: AffectedSet,
    pub duration: Duration,
    pub timestamp: u64,
}

impl ContinuousEffect {
    #[must_use]
    pub fn layer(&self) -> Layer {
        self.modification.layer()
    }

    /// Whether the effect names `entity` in a locked affected set.
    #[must_use]
    pub fn is_locked_to(&self, entity: EntityId) -> bool {
        matches!(&self.affected, AffectedSet::Entities(ids) if ids.contains(&entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_classification() {
        assert_eq!(Modification::CopyOf(CardId::new(1)).layer(), Layer::Copy);
        assert_eq!(Modification::SetController(PlayerId::new(1)).layer(), Layer::Control);
        assert_eq!(Modification::AddSubtype("Elf".into()).layer(), Layer::Type);
        assert_eq!(Modification::RemoveAllAbilities.layer(), Layer::Ability);
        assert_eq!(Modification::SwitchPowerToughness.layer(), Layer::PowerToughness);
        assert!(Layer::Copy < Layer::Ability);
    }

    #[test]
    fn test_pt_sublayers() {
        let set = Modification::SetPowerToughness(PtValue::Fixed(0, 1));
        assert_eq!(set.pt_sublayer(true), Some(PtSublayer::CharacteristicDefining));
        assert_eq!(set.pt_sublayer(false), Some(PtSublayer::SetBase));
        assert_eq!(
            Modification::ModifyPowerToughness { power: 1, toughness: 1 }.pt_sublayer(false),
            Some(PtSublayer::Modify)
        );
        assert_eq!(Modification::AddColor(Color::Red).pt_sublayer(false), None);
        assert!(PtSublayer::Counters < PtSublayer::Modify);
    }

    #[test]
    fn test_locked_effect() {
        let effect = ContinuousEffect {
            id: EffectId::new(0),
            source: EntityId(4),
            controller: PlayerId::new(0),
            modification: Modification::AddKeyword(Keyword::Flying),
            affected: AffectedSet::Entities(vec![EntityId(7)]),
            duration: Duration::UntilEndOfTurn,
            timestamp: 3,
        };
        assert!(effect.is_locked_to(EntityId(7)));
        assert!(!effect.is_locked_to(EntityId(4)));
    }
}
