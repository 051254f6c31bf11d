//! The decision/response protocol.
//!
//! When a rule needs a player's choice (a mode, a target for a trigger, the
//! order of simultaneous triggers or replacement effects, attackers,
//! blockers, the legend rule), execution stops and a [`Decision`] is left
//! pending on the state. The driver answers with a [`Response`]; the engine
//! resumes exactly where it stopped.
//!
//! While a decision is pending every other action fails with
//! `IllegalAction`. An invalid response fails with `InvalidResponse` and
//! leaves the same decision pending.

mod protocol;

pub use protocol::{ChosenValue, Decision, DecisionId, DecisionKind, DecisionOption, Response};
