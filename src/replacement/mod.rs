//! Replacement effects.
//!
//! A replacement effect watches for a proposed event and modifies it before
//! it happens: a different destination, a different amount, a different
//! recipient, or nothing at all. Replacement effects come from two places:
//!
//! - printed on the definitions of permanents on the battlefield
//! - registered on the state by resolving spells and abilities, with a duration
//!
//! Every proposed event passes through [`apply`] before it commits.

mod effect;
mod engine;

pub use effect::{
    AmountChange, RegisteredReplacement, ReplacementAction, ReplacementEffect, ReplacementId, ReplacementKey,
    ReplacementMatcher, Subject,
};
pub use engine::{apply, apply_chosen, PendingCommit, ReplacementOutcome};
