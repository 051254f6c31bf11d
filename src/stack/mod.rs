//! The stack, priority and the turn structure.
//!
//! Spells and abilities go on a shared LIFO stack. Priority passes in turn
//! order; when every remaining player has passed in succession the top
//! object resolves, or the step ends if the stack is empty.
//!
//! ## Design
//!
//! All engine work after a player action is queued on the state's agenda
//! (`Work` items) and run until a player decision is needed. Pausing for a
//! decision is just stopping the loop: the agenda is part of `GameState`,
//! so a paused game can be cloned, serialized or resumed.
//!
//! ## Modules
//!
//! - `engine`: the `Engine` driver and its actions
//! - `agenda`: work items and the run loop
//! - `commit`: applying proposed events through replacement effects
//! - `resolve`: resolving a stack object effect by effect
//! - `placement`: putting triggered abilities on the stack
//! - `turn`: steps and turn-based actions
//! - `priority`: passing priority

mod agenda;
mod commit;
mod engine;
mod object;
mod placement;
mod priority;
mod resolve;
mod turn;

pub use agenda::Work;
pub use commit::CommitQueue;
pub use engine::Engine;
pub use object::{StackObject, StackObjectKind};
pub use placement::{Targeting, TriggerPlacement};
pub use resolve::{PendingChoice, ResolutionFrame};
