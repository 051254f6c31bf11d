//! Decisions and responses.
//!
//! A `Decision` lists every option explicitly; a `Response` picks from that
//! list by index. Validation is structural: the right decision id, indices
//! in range and not repeated, the value shape the kind accepts, and for
//! declarations no creature used twice.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::error::{Result, RulesError};
use crate::replacement::ReplacementKey;
use crate::triggers::TriggerOrigin;

/// Identifier of a decision. Never reused within a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub u32);

impl std::fmt::Display for DecisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Decision({})", self.0)
    }
}

/// What is being decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionKind {
    ChooseMode,
    ChooseTargets,
    /// Pick one object (sacrifice, legend rule).
    ChooseEntity,
    /// Pick the next trigger to put on the stack.
    OrderTriggers,
    /// Pick the replacement effect that applies first.
    OrderReplacements,
    DeclareAttackers,
    DeclareBlockers,
}

impl DecisionKind {
    /// Declarations take a set of options; every other kind takes exactly one.
    #[must_use]
    pub fn takes_many(self) -> bool {
        matches!(self, DecisionKind::DeclareAttackers | DecisionKind::DeclareBlockers)
    }
}

/// One choosable option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionOption {
    Mode(usize),
    Entity(EntityId),
    Trigger { origin: TriggerOrigin, source: EntityId },
    Replacement(ReplacementKey),
    Attack { attacker: EntityId, defender: PlayerId },
    Block { blocker: EntityId, attacker: EntityId },
}

impl DecisionOption {
    /// The creature an option commits, for declarations.
    fn declared_creature(&self) -> Option<EntityId> {
        match self {
            DecisionOption::Attack { attacker, .. } => Some(*attacker),
            DecisionOption::Block { blocker, .. } => Some(*blocker),
            _ => None,
        }
    }
}

/// A question for one player. Execution is suspended until it is answered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    pub player: PlayerId,
    pub kind: DecisionKind,
    pub options: Vec<DecisionOption>,
}

/// The chosen value of a response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChosenValue {
    Option(usize),
    Options(Vec<usize>),
}

/// An answer to a pending decision.
///
/// ```
/// use ccg_rules::decision::{ChosenValue, DecisionId, Response};
///
/// let response = Response::pick(DecisionId(3), 1);
/// let json = serde_json::to_string(&response).unwrap();
/// let back: Response = serde_json::from_str(&json).unwrap();
/// assert_eq!(back.value, ChosenValue::Option(1));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub decision: DecisionId,
    pub value: ChosenValue,
}

impl Response {
    /// Pick a single option.
    #[must_use]
    pub fn pick(decision: DecisionId, index: usize) -> Self {
        Self {
            decision,
            value: ChosenValue::Option(index),
        }
    }

    /// Pick a set of options (declarations).
    #[must_use]
    pub fn pick_many(decision: DecisionId, indices: Vec<usize>) -> Self {
        Self {
            decision,
            value: ChosenValue::Options(indices),
        }
    }
}

impl Decision {
    /// Check a response and return the chosen option indices.
    pub fn validate(&self, response: &Response) -> Result<Vec<usize>> {
        if response.decision != self.id {
            return Err(RulesError::InvalidResponse(format!(
                "{} is not the pending {}",
                response.decision, self.id
            )));
        }
        let chosen = match (&response.value, self.kind.takes_many()) {
            (ChosenValue::Option(index), false) => vec![*index],
            (ChosenValue::Options(indices), true) => indices.clone(),
            (value, _) => {
                return Err(RulesError::InvalidResponse(format!(
                    "{:?} does not accept {:?}",
                    self.kind, value
                )))
            }
        };

        let mut seen = Vec::with_capacity(chosen.len());
        let mut declared = Vec::with_capacity(chosen.len());
        for &index in &chosen {
            let Some(option) = self.options.get(index) else {
                return Err(RulesError::InvalidResponse(format!(
                    "option {index} out of range (0..{})",
                    self.options.len()
                )));
            };
            if seen.contains(&index) {
                return Err(RulesError::InvalidResponse(format!("option {index} chosen twice")));
            }
            seen.push(index);
            if let Some(creature) = option.declared_creature() {
                if declared.contains(&creature) {
                    return Err(RulesError::InvalidResponse(format!("{creature} declared twice")));
                }
                declared.push(creature);
            }
        }
        Ok(chosen)
    }

    /// The option chosen by a validated single-choice answer.
    #[must_use]
    pub fn option(&self, chosen: &[usize]) -> Option<&DecisionOption> {
        chosen.first().and_then(|index| self.options.get(*index))
    }
}
