//! Game rules that are not tied to a single card.
//!
//! - `state_based`: the state-based actions checked after every action
//! - `combat`: attack and block legality, combat damage assignment
//! - `engine`: the `RulesEngine` driver trait and `GameOutcome`

pub mod combat;
pub mod engine;
pub mod state_based;

pub use engine::{GameOutcome, RulesEngine};
pub use state_based::{check, LegendChoice, StatePass};
