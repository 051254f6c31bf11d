//! Error types for the rules engine.
//!
//! Game-rules failures (`IllegalAction`, `IllegalTarget`, `InvalidResponse`)
//! are recoverable: the engine restores the state it had before the failed
//! call. Store misuse and state-check divergence indicate a defect in the
//! caller or in card data and are propagated without rollback.

use thiserror::Error;

use crate::core::EntityId;
use crate::zones::ZoneKey;

/// Main error type for the rules engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("Illegal action: {0}")]
    IllegalAction(String),

    #[error("Illegal target {entity}: {reason}")]
    IllegalTarget { entity: EntityId, reason: String },

    #[error("No such entity: {0}")]
    NoSuchEntity(EntityId),

    #[error("Illegal zone transition: {entity} cannot move to {to}")]
    IllegalZoneTransition { entity: EntityId, to: ZoneKey },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("State-based actions did not stabilize after {passes} passes")]
    StateCheckDivergence { passes: u32 },

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl RulesError {
    /// Shorthand for an `IllegalAction` with a formatted reason.
    pub fn illegal(reason: impl Into<String>) -> Self {
        Self::IllegalAction(reason.into())
    }

    /// Shorthand for an `IllegalTarget`.
    pub fn illegal_target(entity: EntityId, reason: impl Into<String>) -> Self {
        Self::IllegalTarget {
            entity,
            reason: reason.into(),
        }
    }

    /// Whether the failed call leaves the game state untouched.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::IllegalAction(_) | Self::IllegalTarget { .. } | Self::InvalidResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RulesError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::ZoneKind;

    #[test]
    fn test_recoverable_classification() {
        assert!(RulesError::illegal("not your turn").is_recoverable());
        assert!(RulesError::illegal_target(EntityId(4), "hexproof").is_recoverable());
        assert!(RulesError::InvalidResponse("stale id".into()).is_recoverable());

        assert!(!RulesError::NoSuchEntity(EntityId(99)).is_recoverable());
        assert!(!RulesError::StateCheckDivergence { passes: 64 }.is_recoverable());
        assert!(!RulesError::Serialization("size limit".into()).is_recoverable());
        assert!(!RulesError::IllegalZoneTransition {
            entity: EntityId(0),
            to: ZoneKey::shared(ZoneKind::Battlefield),
        }
        .is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = RulesError::NoSuchEntity(EntityId(7));
        assert_eq!(err.to_string(), "No such entity: Entity(7)");

        let err = RulesError::StateCheckDivergence { passes: 3 };
        assert!(err.to_string().contains("3 passes"));
    }
}
