//! Effect resolution: the single interpreter for `Effect`.
//!
//! The resolver never writes to the state. Each effect becomes an
//! [`EffectStep`]: proposed events for the commit path, registrations of
//! continuous effects, replacement effects or delayed triggers, or a
//! choice a player must make first. The resolution frame in `stack`
//! carries the step out and comes back for the next effect.

use serde::{Deserialize, Serialize};

use crate::cards::{CardRegistry, Keyword};
use crate::core::{AttachedTo, EntityId, GameState, PlayerId};
use crate::decision::{DecisionKind, DecisionOption};
use crate::layers::{Duration, Modification, ProjectedView};
use crate::replacement::{ReplacementEffect, Subject};
use crate::triggers::{DamageEvent, DelayedWhen, ProposedEvent};
use crate::zones::{ZoneKey, ZoneKind, ZonePosition};

use super::effect::{Amount, DelayedCondition, Effect, EffectTarget};
use super::targeting::{FilterContext, TargetFilter};

/// What a resolving spell or ability knows about itself.
pub struct ResolverContext<'a> {
    pub state: &'a GameState,
    pub view: &'a ProjectedView,
    pub registry: &'a CardRegistry,
    pub controller: PlayerId,
    pub source: EntityId,
    /// Chosen targets; `None` where a target became illegal.
    pub targets: &'a [Option<EntityId>],
    pub x: u32,
    pub triggering: Option<EntityId>,
}

/// Something a resolving effect leaves on the state besides events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Registration {
    Continuous {
        modification: Modification,
        affected: Vec<EntityId>,
        duration: Duration,
    },
    Replacement {
        effect: ReplacementEffect,
        duration: Duration,
    },
    Delayed {
        when: DelayedWhen,
        effects: Vec<Effect>,
        targets: Vec<EntityId>,
    },
}

/// A choice the resolving effect needs before it can continue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub player: PlayerId,
    pub kind: DecisionKind,
    pub options: Vec<DecisionOption>,
}

/// Result of interpreting one effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EffectStep {
    /// Nothing to do (every subject was gone or illegal).
    Done,
    Events(Vec<ProposedEvent>),
    Register(Vec<Registration>),
    /// Ask these in order, then call [`resolve_choices`].
    Choose(Vec<Choice>),
    /// Replace this effect with others (a chosen mode).
    Splice(Vec<Effect>),
}

impl EffectStep {
    fn events(events: Vec<ProposedEvent>) -> Self {
        if events.is_empty() {
            EffectStep::Done
        } else {
            EffectStep::Events(events)
        }
    }
}

impl ResolverContext<'_> {
    fn on_battlefield(&self, entity: EntityId) -> bool {
        self.state.zones().zone_of(entity) == Some(ZoneKey::battlefield())
    }

    fn filter_ctx(&self, controller: PlayerId) -> FilterContext<'_> {
        FilterContext::new(self.state, self.view.characteristics(), controller).with_source(self.source)
    }

    fn amount(&self, amount: &Amount) -> u32 {
        let value = match amount {
            Amount::Fixed(n) => *n,
            Amount::X => i64::from(self.x),
            Amount::SourcePower => self
                .view
                .power(self.source)
                .or_else(|| self.state.last_known(self.source).and_then(|lk| lk.power))
                .map_or(0, i64::from),
        };
        u32::try_from(value.max(0)).unwrap_or(u32::MAX)
    }

    /// Entities an effect target names right now, in a stable order.
    fn subjects(&self, target: &EffectTarget) -> Vec<EntityId> {
        let remaining = || self.state.remaining_players().into_iter();
        match target {
            EffectTarget::Target(index) => self.targets.get(*index).copied().flatten().into_iter().collect(),
            EffectTarget::Controller => vec![EntityId::player(self.controller)],
            EffectTarget::Source => vec![self.source],
            EffectTarget::TriggeringEntity => self.triggering.into_iter().collect(),
            EffectTarget::AttachedToSource => self
                .state
                .get::<AttachedTo>(self.source)
                .map(|attached| attached.0)
                .into_iter()
                .collect(),
            EffectTarget::EachOpponent => remaining()
                .filter(|p| *p != self.controller)
                .map(EntityId::player)
                .collect(),
            EffectTarget::EachPlayer => remaining().map(EntityId::player).collect(),
            EffectTarget::Each(filter) => {
                let ctx = self.filter_ctx(self.controller);
                self.view
                    .battlefield()
                    .map(|(id, _)| id)
                    .filter(|id| filter.matches(*id, &ctx))
                    .collect()
            }
        }
    }

    fn players(&self, target: &EffectTarget) -> Vec<PlayerId> {
        let count = self.state.player_count();
        self.subjects(target)
            .into_iter()
            .filter_map(|id| id.as_player(count))
            .filter(|p| !self.state.has_lost(*p))
            .collect()
    }

    fn permanents(&self, target: &EffectTarget) -> Vec<EntityId> {
        self.subjects(target)
            .into_iter()
            .filter(|id| self.on_battlefield(*id))
            .collect()
    }

    fn leave(&self, target: &EffectTarget, to: ZoneKind, skip_indestructible: bool) -> EffectStep {
        let events = self
            .permanents(target)
            .into_iter()
            .filter(|id| !(skip_indestructible && self.view.has_keyword(*id, Keyword::Indestructible)))
            .map(|id| ProposedEvent::leave_battlefield(id, to))
            .collect();
        EffectStep::events(events)
    }

    /// Permanents `player` could sacrifice to a `SacrificeChosen`.
    fn sacrifice_candidates(&self, player: PlayerId, filter: &TargetFilter) -> Vec<EntityId> {
        let ctx = FilterContext::new(self.state, self.view.characteristics(), player);
        self.view
            .permanents_controlled_by(player)
            .filter(|id| filter.matches(*id, &ctx))
            .collect()
    }
}

/// Interpret one effect.
#[must_use]
pub fn resolve_effect(effect: &Effect, ctx: &ResolverContext) -> EffectStep {
    match effect {
        Effect::DealDamage { amount, to } => {
            let amount = ctx.amount(amount);
            let deathtouch = ctx.view.has_keyword(ctx.source, Keyword::Deathtouch);
            let lifelink = ctx.view.has_keyword(ctx.source, Keyword::Lifelink);
            let targets = ctx.subjects(to).into_iter().filter(|id| {
                id.as_player(ctx.state.player_count())
                    .map_or_else(|| ctx.on_battlefield(*id), |p| !ctx.state.has_lost(p))
            });
            let events = targets
                .map(|target| {
                    ProposedEvent::Damage(DamageEvent {
                        source: ctx.source,
                        target,
                        amount,
                        combat: false,
                        deathtouch,
                        lifelink,
                        source_controller: ctx.controller,
                    })
                })
                .filter(|_| amount > 0)
                .collect();
            EffectStep::events(events)
        }
        Effect::GainLife { amount, player } => {
            let amount = ctx.amount(amount);
            let events = ctx
                .players(player)
                .into_iter()
                .filter(|_| amount > 0)
                .map(|player| ProposedEvent::GainLife { player, amount })
                .collect();
            EffectStep::events(events)
        }
        Effect::LoseLife { amount, player } => {
            let amount = ctx.amount(amount);
            let events = ctx
                .players(player)
                .into_iter()
                .filter(|_| amount > 0)
                .map(|player| ProposedEvent::LoseLife { player, amount })
                .collect();
            EffectStep::events(events)
        }
        Effect::DrawCards { amount, player } => {
            let amount = ctx.amount(amount);
            let events = ctx
                .players(player)
                .into_iter()
                .flat_map(|player| (0..amount).map(move |_| ProposedEvent::Draw { player }))
                .collect();
            EffectStep::events(events)
        }

        Effect::Destroy { target } => ctx.leave(target, ZoneKind::Graveyard, true),
        Effect::Exile { target } => ctx.leave(target, ZoneKind::Exile, false),
        Effect::ReturnToHand { target } => ctx.leave(target, ZoneKind::Hand, false),
        Effect::Sacrifice { target } => {
            let events = ctx
                .permanents(target)
                .into_iter()
                .filter(|id| ctx.view.controller(*id) == Some(ctx.controller))
                .map(|id| ProposedEvent::leave_battlefield(id, ZoneKind::Graveyard))
                .collect();
            EffectStep::events(events)
        }
        Effect::SacrificeChosen { player, filter } => {
            let choices: Vec<Choice> = ctx
                .players(player)
                .into_iter()
                .filter_map(|player| {
                    let candidates = ctx.sacrifice_candidates(player, filter);
                    (candidates.len() > 1).then(|| Choice {
                        player,
                        kind: DecisionKind::ChooseEntity,
                        options: candidates.into_iter().map(DecisionOption::Entity).collect(),
                    })
                })
                .collect();
            if choices.is_empty() {
                resolve_choices(effect, ctx, &[])
            } else {
                EffectStep::Choose(choices)
            }
        }

        Effect::AddCounters { kind, amount, target } => {
            let amount = ctx.amount(amount);
            let count = ctx.state.player_count();
            let events = ctx
                .subjects(target)
                .into_iter()
                .filter(|id| id.is_player(count) || ctx.on_battlefield(*id))
                .filter(|_| amount > 0)
                .map(|entity| ProposedEvent::PutCounters {
                    entity,
                    kind: kind.clone(),
                    amount,
                })
                .collect();
            EffectStep::events(events)
        }
        Effect::RemoveCounters { kind, amount, target } => {
            let amount = ctx.amount(amount);
            let events = ctx
                .subjects(target)
                .into_iter()
                .filter(|_| amount > 0)
                .map(|entity| ProposedEvent::RemoveCounters {
                    entity,
                    kind: kind.clone(),
                    amount,
                })
                .collect();
            EffectStep::events(events)
        }
        Effect::Tap { target } => EffectStep::events(
            ctx.permanents(target)
                .into_iter()
                .map(|entity| ProposedEvent::Tap { entity })
                .collect(),
        ),
        Effect::Untap { target } => EffectStep::events(
            ctx.permanents(target)
                .into_iter()
                .map(|entity| ProposedEvent::Untap { entity })
                .collect(),
        ),

        Effect::Pump { target, power, toughness } => continuous(
            ctx.permanents(target),
            Modification::ModifyPowerToughness {
                power: *power,
                toughness: *toughness,
            },
            Duration::UntilEndOfTurn,
        ),
        Effect::GrantKeyword { target, keyword } => continuous(
            ctx.permanents(target),
            Modification::AddKeyword(*keyword),
            Duration::UntilEndOfTurn,
        ),
        Effect::ApplyContinuous {
            target,
            modification,
            duration,
        } => continuous(ctx.permanents(target), modification.clone(), duration.clone()),

        Effect::ExileIfWouldDieThisTurn { target } => {
            let registrations: Vec<Registration> = ctx
                .permanents(target)
                .into_iter()
                .map(|id| Registration::Replacement {
                    effect: ReplacementEffect::exile_if_would_die(Subject::Entity(id)),
                    duration: Duration::UntilEndOfTurn,
                })
                .collect();
            register(registrations)
        }
        Effect::PreventDamageThisTurn { target } => {
            let registrations: Vec<Registration> = ctx
                .subjects(target)
                .into_iter()
                .map(|id| Registration::Replacement {
                    effect: ReplacementEffect::prevent_damage_to(Subject::Entity(id)),
                    duration: Duration::UntilEndOfTurn,
                })
                .collect();
            register(registrations)
        }

        Effect::CounterSpell { target } => {
            let events = ctx
                .subjects(target)
                .into_iter()
                .filter(|id| ctx.state.is_spell(*id))
                .map(|entity| ProposedEvent::MoveZone {
                    entity,
                    from: ZoneKind::Stack,
                    to: ZoneKind::Graveyard,
                    position: ZonePosition::Top,
                })
                .collect();
            EffectStep::events(events)
        }
        Effect::AttachSource { to } => {
            let host = ctx.permanents(to).into_iter().next();
            match host {
                Some(host) if ctx.on_battlefield(ctx.source) && host != ctx.source => {
                    EffectStep::Events(vec![ProposedEvent::Attach {
                        entity: ctx.source,
                        to: host,
                    }])
                }
                _ => EffectStep::Done,
            }
        }

        Effect::CreateToken { card, count, controller } => {
            let events = ctx
                .players(controller)
                .into_iter()
                .flat_map(|controller| (0..*count).map(move |_| ProposedEvent::CreateToken { card: *card, controller }))
                .collect();
            EffectStep::events(events)
        }
        Effect::AddMana { mana, amount } => EffectStep::events(
            (*amount > 0)
                .then_some(ProposedEvent::AddMana {
                    player: ctx.controller,
                    mana: *mana,
                    amount: *amount,
                })
                .into_iter()
                .collect(),
        ),

        Effect::CreateDelayedTrigger { condition, effects } => {
            let when = match condition {
                DelayedCondition::NextStep(step) => Some(DelayedWhen::StepBegins(*step)),
                DelayedCondition::LeavesBattlefield(target) => ctx
                    .permanents(target)
                    .into_iter()
                    .next()
                    .map(DelayedWhen::LeavesBattlefield),
            };
            match when {
                Some(when) => EffectStep::Register(vec![Registration::Delayed {
                    when,
                    effects: effects.clone(),
                    targets: ctx.targets.iter().flatten().copied().collect(),
                }]),
                None => EffectStep::Done,
            }
        }

        Effect::Modal { modes } => {
            if modes.len() == 1 {
                return EffectStep::Splice(modes[0].clone());
            }
            EffectStep::Choose(vec![Choice {
                player: ctx.controller,
                kind: DecisionKind::ChooseMode,
                options: (0..modes.len()).map(DecisionOption::Mode).collect(),
            }])
        }
    }
}

fn continuous(affected: Vec<EntityId>, modification: Modification, duration: Duration) -> EffectStep {
    if affected.is_empty() {
        return EffectStep::Done;
    }
    EffectStep::Register(vec![Registration::Continuous {
        modification,
        affected,
        duration,
    }])
}

fn register(registrations: Vec<Registration>) -> EffectStep {
    if registrations.is_empty() {
        EffectStep::Done
    } else {
        EffectStep::Register(registrations)
    }
}

/// Finish an effect that asked for choices, given the chosen options in
/// the order the choices were asked.
#[must_use]
pub fn resolve_choices(effect: &Effect, ctx: &ResolverContext, chosen: &[DecisionOption]) -> EffectStep {
    match effect {
        Effect::Modal { modes } => match chosen.first() {
            Some(DecisionOption::Mode(index)) => EffectStep::Splice(modes.get(*index).cloned().unwrap_or_default()),
            _ => EffectStep::Done,
        },
        Effect::SacrificeChosen { player, filter } => {
            let mut answers = chosen.iter();
            let mut events = Vec::new();
            for player in ctx.players(player) {
                let candidates = ctx.sacrifice_candidates(player, filter);
                let victim = match candidates.as_slice() {
                    [] => None,
                    [only] => Some(*only),
                    _ => match answers.next() {
                        Some(DecisionOption::Entity(id)) if candidates.contains(id) => Some(*id),
                        _ => None,
                    },
                };
                if let Some(victim) = victim {
                    events.push(ProposedEvent::leave_battlefield(victim, ZoneKind::Graveyard));
                }
            }
            EffectStep::events(events)
        }
        other => resolve_effect(other, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardType, CounterKind};
    use crate::layers::project;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    struct Fixture {
        state: GameState,
        registry: CardRegistry,
        bear: EntityId,
        other_bear: EntityId,
        wall: EntityId,
    }

    fn fixture() -> Fixture {
        let mut registry = CardRegistry::new();
        let bear = registry.register(CardDefinition::new("Bear").with_type(CardType::Creature).with_pt(2, 2));
        let wall = registry.register(
            CardDefinition::new("Wall")
                .with_type(CardType::Creature)
                .with_pt(0, 4)
                .with_keyword(Keyword::Indestructible),
        );
        let mut state = GameState::new(2, 20, 0);
        let bear_id = state.create_card(bear, P1, ZoneKind::Battlefield).unwrap();
        let other = state.create_card(bear, P1, ZoneKind::Battlefield).unwrap();
        let wall_id = state.create_card(wall, P1, ZoneKind::Battlefield).unwrap();
        Fixture {
            state,
            registry,
            bear: bear_id,
            other_bear: other,
            wall: wall_id,
        }
    }

    fn run(fixture: &Fixture, effect: &Effect, targets: &[Option<EntityId>]) -> EffectStep {
        let view = project(&fixture.state, &fixture.registry);
        let ctx = ResolverContext {
            state: &fixture.state,
            view: &view,
            registry: &fixture.registry,
            controller: P0,
            source: EntityId(0),
            targets,
            x: 3,
            triggering: None,
        };
        resolve_effect(effect, &ctx)
    }

    #[test]
    fn test_damage_to_target() {
        let f = fixture();
        let step = run(&f, &Effect::damage(3, EffectTarget::Target(0)), &[Some(f.bear)]);
        let EffectStep::Events(events) = step else {
            panic!("expected events");
        };
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].affected(), f.bear);
    }

    #[test]
    fn test_illegal_target_is_skipped() {
        let f = fixture();
        assert_eq!(run(&f, &Effect::damage(3, EffectTarget::Target(0)), &[None]), EffectStep::Done);
    }

    #[test]
    fn test_x_amount() {
        let f = fixture();
        let effect = Effect::DrawCards {
            amount: Amount::X,
            player: EffectTarget::Controller,
        };
        assert_eq!(
            run(&f, &effect, &[]),
            EffectStep::Events(vec![ProposedEvent::Draw { player: P0 }; 3])
        );
    }

    #[test]
    fn test_destroy_skips_indestructible() {
        let f = fixture();
        let effect = Effect::Destroy {
            target: EffectTarget::Each(TargetFilter::Creature),
        };
        assert_eq!(
            run(&f, &effect, &[]),
            EffectStep::Events(vec![
                ProposedEvent::leave_battlefield(f.bear, ZoneKind::Graveyard),
                ProposedEvent::leave_battlefield(f.other_bear, ZoneKind::Graveyard),
            ])
        );
    }

    #[test]
    fn test_sacrifice_chosen_asks_and_resolves() {
        let f = fixture();
        let effect = Effect::SacrificeChosen {
            player: EffectTarget::EachOpponent,
            filter: TargetFilter::Creature,
        };
        let EffectStep::Choose(choices) = run(&f, &effect, &[]) else {
            panic!("expected a choice");
        };
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].player, P1);
        assert_eq!(choices[0].options.len(), 3);

        let view = project(&f.state, &f.registry);
        let ctx = ResolverContext {
            state: &f.state,
            view: &view,
            registry: &f.registry,
            controller: P0,
            source: EntityId(0),
            targets: &[],
            x: 0,
            triggering: None,
        };
        assert_eq!(
            resolve_choices(&effect, &ctx, &[DecisionOption::Entity(f.wall)]),
            EffectStep::Events(vec![ProposedEvent::leave_battlefield(f.wall, ZoneKind::Graveyard)])
        );
    }

    #[test]
    fn test_modal_asks_for_mode() {
        let f = fixture();
        let effect = Effect::Modal {
            modes: vec![vec![Effect::draw(1)], vec![Effect::gain_life(2)]],
        };
        let EffectStep::Choose(choices) = run(&f, &effect, &[]) else {
            panic!("expected a choice");
        };
        assert_eq!(choices[0].kind, DecisionKind::ChooseMode);
    }

    #[test]
    fn test_pump_registers_locked_effect() {
        let f = fixture();
        let step = run(
            &f,
            &Effect::Pump {
                target: EffectTarget::Target(0),
                power: 2,
                toughness: 2,
            },
            &[Some(f.bear)],
        );
        assert_eq!(
            step,
            EffectStep::Register(vec![Registration::Continuous {
                modification: Modification::ModifyPowerToughness { power: 2, toughness: 2 },
                affected: vec![f.bear],
                duration: Duration::UntilEndOfTurn,
            }])
        );
    }

    #[test]
    fn test_counters_on_player() {
        let f = fixture();
        let effect = Effect::add_counters(CounterKind::Poison, 2, EffectTarget::EachOpponent);
        assert_eq!(
            run(&f, &effect, &[]),
            EffectStep::Events(vec![ProposedEvent::PutCounters {
                entity: EntityId(1),
                kind: CounterKind::Poison,
                amount: 2
            }])
        );
    }
}
