//! Events and triggered abilities.
//!
//! ## Key Components
//!
//! - [`ProposedEvent`]: something about to happen, open to replacement
//! - [`GameEvent`] / [`LoggedEvent`]: something that happened, in the state's log
//! - [`TriggerCondition`]: when a printed triggered ability triggers
//! - [`detect`]: scans a cycle's log slice for triggered abilities
//! - [`DelayedTrigger`]: one-shot triggers created by resolving effects
//!
//! ## Look-back
//!
//! Detection runs after state-based actions, over the events of the whole
//! cycle. A permanent that has already left the battlefield still sees
//! the events it was present for, using its last known information, so a
//! creature killed by a state-based action triggers on its own death.

mod condition;
mod detector;
mod event;

pub use condition::{PlayerScope, TriggerCondition, TriggerContext, TriggerMatch};
pub use detector::{
    detect, detect_state_triggers, DelayedTrigger, DelayedTriggerId, DelayedWhen, Detection, QueuedTrigger,
    StateDetection, TriggerOrigin,
};
pub use event::{DamageEvent, GameEvent, LastKnown, LoggedEvent, ProposedEvent};
