//! Player actions.
//!
//! A `PlayerAction` is one thing a player can do: pass priority, play a
//! land, cast a spell, activate an ability, or answer a pending decision.
//! Casting and activation carry their targets as entity pointers, chosen
//! up front and checked for legality before anything changes.
//!
//! ```
//! use ccg_rules::core::{CastRequest, EntityId, Payment, PlayerAction};
//!
//! let bolt = CastRequest::new(EntityId(10)).with_targets(&[EntityId(1)]);
//! assert_eq!(bolt.payment, Payment::Pool);
//! let action = PlayerAction::CastSpell(bolt);
//! assert!(!action.is_pass());
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::entity::EntityId;
use crate::decision::Response;

/// Target pointers. Most spells and abilities have at most two.
pub type Targets = SmallVec<[EntityId; 2]>;

/// How a cost is paid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Payment {
    /// From the player's mana pool.
    #[default]
    Pool,
    /// Without paying the mana cost.
    Free,
}

/// Cast a spell from hand.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastRequest {
    pub card: EntityId,
    pub targets: Targets,
    /// Value of X, for costs containing X.
    pub x: u32,
    pub payment: Payment,
}

impl CastRequest {
    #[must_use]
    pub fn new(card: EntityId) -> Self {
        Self {
            card,
            targets: SmallVec::new(),
            x: 0,
            payment: Payment::Pool,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, targets: &[EntityId]) -> Self {
        self.targets = SmallVec::from_slice(targets);
        self
    }

    #[must_use]
    pub fn with_x(mut self, x: u32) -> Self {
        self.x = x;
        self
    }

    #[must_use]
    pub fn free(mut self) -> Self {
        self.payment = Payment::Free;
        self
    }
}

/// Activate the `index`-th activated ability of a permanent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivateRequest {
    pub source: EntityId,
    pub index: usize,
    pub targets: Targets,
    pub x: u32,
    pub payment: Payment,
}

impl ActivateRequest {
    #[must_use]
    pub fn new(source: EntityId, index: usize) -> Self {
        Self {
            source,
            index,
            targets: SmallVec::new(),
            x: 0,
            payment: Payment::Pool,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, targets: &[EntityId]) -> Self {
        self.targets = SmallVec::from_slice(targets);
        self
    }

    #[must_use]
    pub fn free(mut self) -> Self {
        self.payment = Payment::Free;
        self
    }
}

/// Something a player does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    PassPriority,
    /// Special action: play a land from hand.
    PlayLand(EntityId),
    CastSpell(CastRequest),
    ActivateAbility(ActivateRequest),
    /// Answer the pending decision.
    Respond(Response),
}

impl PlayerAction {
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, PlayerAction::PassPriority)
    }
}
