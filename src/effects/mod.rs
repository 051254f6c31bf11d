//! Effect system for card abilities.
//!
//! - `Effect`: the closed set of one-shot instructions spells and abilities carry
//! - `TargetSpec` / `TargetFilter`: what may be targeted, checked on
//!   declaration and again on resolution
//! - `resolver`: the single interpreter that turns effects into proposed events
//!
//! Effects never touch the state directly. The resolver turns each one into
//! proposed events, which pass through replacement effects before they
//! commit.

mod effect;
pub mod resolver;
mod targeting;

pub use effect::{Amount, DelayedCondition, Effect, EffectTarget};
pub use targeting::{check_target, legal_targets, FilterContext, TargetFilter, TargetSpec};
