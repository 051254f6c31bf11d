//! Continuous effects and the layer system.
//!
//! ## Key Types
//!
//! - `Modification`: what an effect changes; determines its layer
//! - `ContinuousEffect`: an effect stored on the state by a resolved spell or ability
//! - `StaticAbility`: a printed ability generating an effect while its card is on the battlefield
//! - `ProjectedView`: current characteristics after all layers
//!
//! ## Layers
//!
//! Copy, Control, Text, Type, Color, Ability, Power/Toughness. Power and
//! toughness has sublayers: characteristic-defining, set, counters,
//! modify, switch.

pub mod dependency;
pub mod effect;
pub mod projector;

pub use effect::{
    AffectedSet, ContinuousEffect, Duration, EffectId, Layer, Modification, PtSublayer, PtValue, StaticAbility,
    StaticCondition,
};
pub use projector::{project, Characteristics, CharacteristicsMap, EffectOrigin, ProjectedView};
