//! Trigger conditions.
//!
//! A `TriggerCondition` is matched against one logged event from the point
//! of view of the ability's source and controller. `CounterThreshold` is a
//! state trigger: it never matches an event and is checked against the
//! projected view instead.

use serde::{Deserialize, Serialize};

use crate::cards::CounterKind;
use crate::core::{EntityId, PlayerId, Step};
use crate::layers::ProjectedView;

use super::event::{GameEvent, LoggedEvent};

/// Whose events a condition listens to, relative to the ability's controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerScope {
    You,
    Opponent,
    Any,
}

impl PlayerScope {
    #[must_use]
    pub fn includes(self, you: PlayerId, player: PlayerId) -> bool {
        match self {
            PlayerScope::You => player == you,
            PlayerScope::Opponent => player != you,
            PlayerScope::Any => true,
        }
    }
}

/// When a triggered ability triggers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerCondition {
    ThisEntersBattlefield,
    ThisDies,
    ThisLeavesBattlefield,
    /// "Whenever a creature [you control] dies". `other` excludes the source.
    CreatureDies { scope: PlayerScope, other: bool },
    CreatureEntersBattlefield { scope: PlayerScope, other: bool },
    ThisDealsDamage { combat_only: bool },
    ThisIsDealtDamage,
    /// "At the beginning of [your] upkeep"; the scope applies to the active player.
    BeginningOfStep { step: Step, scope: PlayerScope },
    SpellCast { scope: PlayerScope },
    PlayerLosesLife { scope: PlayerScope },
    /// State trigger: the source has at least `at_least` counters of `kind`.
    CounterThreshold { kind: CounterKind, at_least: u32 },
}

/// The ability's point of view when matching an event.
pub struct TriggerContext<'a> {
    pub source: EntityId,
    pub controller: PlayerId,
    pub view: &'a ProjectedView,
}

/// A successful match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerMatch {
    /// The entity the event happened to or came from ("it", "that player").
    pub triggering: Option<EntityId>,
}

impl TriggerMatch {
    fn on(entity: EntityId) -> Option<Self> {
        Some(Self {
            triggering: Some(entity),
        })
    }
}

impl TriggerCondition {
    /// Whether this is checked against state rather than events.
    #[must_use]
    pub fn is_state_trigger(&self) -> bool {
        matches!(self, TriggerCondition::CounterThreshold { .. })
    }

    /// Whether this is about the source itself leaving the battlefield.
    /// Such abilities look back in time to the source's last known state.
    #[must_use]
    pub fn is_leave_trigger(&self) -> bool {
        matches!(self, TriggerCondition::ThisDies | TriggerCondition::ThisLeavesBattlefield)
    }

    /// Match one logged event.
    #[must_use]
    pub fn matches(&self, logged: &LoggedEvent, ctx: &TriggerContext) -> Option<TriggerMatch> {
        match (self, &logged.event) {
            (TriggerCondition::ThisEntersBattlefield, event) => {
                let entered = event.entered_battlefield()?;
                (entered == ctx.source).then_some(TriggerMatch { triggering: Some(entered) })
            }
            (TriggerCondition::ThisDies, _) => {
                let died = logged.died()?;
                (died == ctx.source).then_some(TriggerMatch { triggering: Some(died) })
            }
            (TriggerCondition::ThisLeavesBattlefield, event) => {
                let left = event.left_battlefield()?;
                (left == ctx.source).then_some(TriggerMatch { triggering: Some(left) })
            }
            (TriggerCondition::CreatureDies { scope, other }, _) => {
                let died = logged.died()?;
                let controller = logged.last_known.as_ref()?.controller;
                if *other && died == ctx.source {
                    return None;
                }
                if !scope.includes(ctx.controller, controller) {
                    return None;
                }
                TriggerMatch::on(died)
            }
            (TriggerCondition::CreatureEntersBattlefield { scope, other }, event) => {
                let entered = event.entered_battlefield()?;
                if *other && entered == ctx.source {
                    return None;
                }
                let chars = ctx.view.get(entered)?;
                if !chars.is_creature() || !scope.includes(ctx.controller, chars.controller) {
                    return None;
                }
                TriggerMatch::on(entered)
            }
            (
                TriggerCondition::ThisDealsDamage { combat_only },
                GameEvent::DamageDealt {
                    source,
                    target,
                    combat,
                    amount,
                },
            ) => {
                if *source != ctx.source || *amount == 0 || (*combat_only && !*combat) {
                    return None;
                }
                TriggerMatch::on(*target)
            }
            (TriggerCondition::ThisIsDealtDamage, GameEvent::DamageDealt { source, target, amount, .. }) => {
                if *target != ctx.source || *amount == 0 {
                    return None;
                }
                TriggerMatch::on(*source)
            }
            (TriggerCondition::BeginningOfStep { step, scope }, GameEvent::StepBegan { step: began, active, .. }) => {
                if step != began || !scope.includes(ctx.controller, *active) {
                    return None;
                }
                TriggerMatch::on(EntityId::player(*active))
            }
            (TriggerCondition::SpellCast { scope }, GameEvent::SpellCast { spell, controller }) => {
                scope
                    .includes(ctx.controller, *controller)
                    .then_some(TriggerMatch { triggering: Some(*spell) })
            }
            (TriggerCondition::PlayerLosesLife { scope }, GameEvent::LifeChanged { player, delta }) => {
                if *delta >= 0 || !scope.includes(ctx.controller, *player) {
                    return None;
                }
                TriggerMatch::on(EntityId::player(*player))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::LastKnown;
    use crate::zones::ZoneKey;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn logged(event: GameEvent, last_known: Option<LastKnown>) -> LoggedEvent {
        LoggedEvent {
            seq: 0,
            batch: 0,
            event,
            last_known,
        }
    }

    fn death(entity: EntityId, controller: PlayerId) -> LoggedEvent {
        logged(
            GameEvent::ZoneChanged {
                entity,
                from: ZoneKey::battlefield(),
                to: ZoneKey::graveyard(controller),
            },
            Some(LastKnown {
                controller,
                definition: None,
                was_creature: true,
                power: Some(1),
                abilities_removed: false,
                entered_batch: 0,
            }),
        )
    }

    #[test]
    fn test_player_scope() {
        assert!(PlayerScope::You.includes(P0, P0));
        assert!(!PlayerScope::You.includes(P0, P1));
        assert!(PlayerScope::Opponent.includes(P0, P1));
        assert!(PlayerScope::Any.includes(P0, P1));
    }

    #[test]
    fn test_this_dies_vs_creature_dies() {
        let view = ProjectedView::default();
        let ctx = TriggerContext {
            source: EntityId(5),
            controller: P0,
            view: &view,
        };

        let own_death = death(EntityId(5), P0);
        assert!(TriggerCondition::ThisDies.matches(&own_death, &ctx).is_some());
        assert!(TriggerCondition::CreatureDies {
            scope: PlayerScope::Any,
            other: true
        }
        .matches(&own_death, &ctx)
        .is_none());

        let their_death = death(EntityId(9), P1);
        assert!(TriggerCondition::ThisDies.matches(&their_death, &ctx).is_none());
        let matched = TriggerCondition::CreatureDies {
            scope: PlayerScope::Opponent,
            other: true,
        }
        .matches(&their_death, &ctx);
        assert_eq!(matched.and_then(|m| m.triggering), Some(EntityId(9)));
    }

    #[test]
    fn test_step_and_damage_conditions() {
        let view = ProjectedView::default();
        let ctx = TriggerContext {
            source: EntityId(5),
            controller: P0,
            view: &view,
        };
        let upkeep = logged(
            GameEvent::StepBegan {
                turn: 2,
                step: Step::Upkeep,
                active: P1,
            },
            None,
        );
        let yours = TriggerCondition::BeginningOfStep {
            step: Step::Upkeep,
            scope: PlayerScope::You,
        };
        assert!(yours.matches(&upkeep, &ctx).is_none());

        let hit = logged(
            GameEvent::DamageDealt {
                source: EntityId(5),
                target: EntityId(1),
                amount: 2,
                combat: false,
            },
            None,
        );
        assert!(TriggerCondition::ThisDealsDamage { combat_only: true }.matches(&hit, &ctx).is_none());
        assert!(TriggerCondition::ThisDealsDamage { combat_only: false }.matches(&hit, &ctx).is_some());
    }

    #[test]
    fn test_state_trigger_never_matches_events() {
        let view = ProjectedView::default();
        let ctx = TriggerContext {
            source: EntityId(5),
            controller: P0,
            view: &view,
        };
        let condition = TriggerCondition::CounterThreshold {
            kind: CounterKind::Depletion,
            at_least: 3,
        };
        assert!(condition.is_state_trigger());
        assert!(condition.matches(&death(EntityId(5), P0), &ctx).is_none());
    }
}
