//! Replacement effect data: what an effect watches for and what it does
//! instead.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::layers::Duration;
use crate::layers::ProjectedView;
use crate::zones::ZoneKind;

/// Identifier of a replacement effect registered by a resolved spell or ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReplacementId(pub u32);

impl std::fmt::Display for ReplacementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Replacement({})", self.0)
    }
}

/// Who or what a replacement effect watches, relative to its source and controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    /// The effect's source.
    Source,
    Entity(EntityId),
    AnyCreature,
    CreatureYouControl,
    You,
    Opponent,
    AnyPlayer,
}

impl Subject {
    /// Whether the subject covers `entity` (a player or an object).
    #[must_use]
    pub fn includes(&self, entity: EntityId, source: EntityId, controller: PlayerId, view: &ProjectedView, player_count: usize) -> bool {
        if let Some(player) = entity.as_player(player_count) {
            return match self {
                Subject::You => player == controller,
                Subject::Opponent => player != controller,
                Subject::AnyPlayer => true,
                Subject::Entity(id) => *id == entity,
                _ => false,
            };
        }
        match self {
            Subject::Source => entity == source,
            Subject::Entity(id) => *id == entity,
            Subject::AnyCreature => view.is_creature(entity),
            Subject::CreatureYouControl => view.is_creature(entity) && view.controller(entity) == Some(controller),
            Subject::You | Subject::Opponent | Subject::AnyPlayer => false,
        }
    }

    /// A single entity this subject names, for redirection.
    #[must_use]
    pub fn resolve(&self, source: EntityId, controller: PlayerId) -> Option<EntityId> {
        match self {
            Subject::Source => Some(source),
            Subject::Entity(id) => Some(*id),
            Subject::You => Some(EntityId::player(controller)),
            _ => None,
        }
    }
}

/// The kind of event a replacement effect watches for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplacementMatcher {
    /// A creature would move from the battlefield to a graveyard.
    WouldDie(Subject),
    WouldBeDealtDamage(Subject),
    WouldGainLife(Subject),
    WouldPutCounters(Subject),
    WouldDraw(Subject),
}

/// A change to the number an event carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountChange {
    Add(u32),
    Multiply(u32),
    Subtract(u32),
}

impl AmountChange {
    #[must_use]
    pub fn apply(self, amount: u32) -> u32 {
        match self {
            AmountChange::Add(n) => amount.saturating_add(n),
            AmountChange::Multiply(n) => amount.saturating_mul(n),
            AmountChange::Subtract(n) => amount.saturating_sub(n),
        }
    }
}

/// What happens instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplacementAction {
    /// Put the object into another zone instead.
    ChangeDestination(ZoneKind),
    /// The event does not happen.
    Prevent,
    /// The damage is dealt to another object or player instead.
    RedirectDamage(Subject),
    /// Damage, life gain or counters change by the given amount.
    ModifyAmount(AmountChange),
    SkipDraw,
}

/// "If [event] would happen, [action] instead."
///
/// ```
/// use ccg_rules::replacement::{ReplacementAction, ReplacementEffect, ReplacementMatcher, Subject};
/// use ccg_rules::zones::ZoneKind;
///
/// let rest_in_peace = ReplacementEffect::new(
///     ReplacementMatcher::WouldDie(Subject::AnyCreature),
///     ReplacementAction::ChangeDestination(ZoneKind::Exile),
/// );
/// assert_eq!(rest_in_peace.action, ReplacementAction::ChangeDestination(ZoneKind::Exile));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementEffect {
    pub matcher: ReplacementMatcher,
    pub action: ReplacementAction,
}

impl ReplacementEffect {
    #[must_use]
    pub fn new(matcher: ReplacementMatcher, action: ReplacementAction) -> Self {
        Self { matcher, action }
    }

    /// Who or what the effect watches.
    #[must_use]
    pub fn subject(&self) -> &Subject {
        match &self.matcher {
            ReplacementMatcher::WouldDie(subject)
            | ReplacementMatcher::WouldBeDealtDamage(subject)
            | ReplacementMatcher::WouldGainLife(subject)
            | ReplacementMatcher::WouldPutCounters(subject)
            | ReplacementMatcher::WouldDraw(subject) => subject,
        }
    }

    /// "Prevent all damage that would be dealt to [subject]."
    #[must_use]
    pub fn prevent_damage_to(subject: Subject) -> Self {
        Self::new(ReplacementMatcher::WouldBeDealtDamage(subject), ReplacementAction::Prevent)
    }

    /// "If [subject] would die, exile it instead."
    #[must_use]
    pub fn exile_if_would_die(subject: Subject) -> Self {
        Self::new(
            ReplacementMatcher::WouldDie(subject),
            ReplacementAction::ChangeDestination(ZoneKind::Exile),
        )
    }
}

/// A replacement effect created by a resolved spell or ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredReplacement {
    pub id: ReplacementId,
    pub source: EntityId,
    pub controller: PlayerId,
    pub effect: ReplacementEffect,
    pub duration: Duration,
}

/// Identifies one replacement effect, whichever way it exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReplacementKey {
    Registered(ReplacementId),
    /// The `index`-th replacement printed on a permanent's definition.
    Static { source: EntityId, index: usize },
}
