//! Objects on the stack.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId, Targets};
use crate::effects::{Effect, TargetSpec};
use crate::triggers::TriggerOrigin;

/// What kind of object is on the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackObjectKind {
    Spell,
    /// The `index`-th activated ability of its source.
    Activated { index: usize },
    Triggered { origin: TriggerOrigin },
}

/// A spell or ability waiting to resolve.
///
/// A spell's id is its card's entity id; an ability gets an entity of its
/// own that ceases to exist once it leaves the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackObject {
    pub id: EntityId,
    pub controller: PlayerId,
    /// The card (for a spell) or permanent whose ability this is.
    pub source: EntityId,
    pub kind: StackObjectKind,
    pub effects: Vec<Effect>,
    /// Target slots; `targets[i]` was chosen for `target_specs[i]`.
    /// Targets beyond the slots were fixed when a delayed trigger was created.
    pub target_specs: Vec<TargetSpec>,
    pub targets: Targets,
    pub x: u32,
    /// The entity whose event triggered this ability.
    pub triggering: Option<EntityId>,
}

impl StackObject {
    #[must_use]
    pub fn is_spell(&self) -> bool {
        self.kind == StackObjectKind::Spell
    }
}
