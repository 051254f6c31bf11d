//! Shared card kit and driving helpers for the integration tests.
#![allow(dead_code)]

use ccg_rules::cards::{
    AbilityCost, ActivatedAbility, CardDefinition, CardRegistry, CardType, Color, CounterKind, Keyword, ManaCost,
    ManaType, Supertype, TriggeredAbility,
};
use ccg_rules::core::{CastRequest, EntityId, GameConfig, GameState, PlayerId, Step};
use ccg_rules::decision::{Decision, Response};
use ccg_rules::effects::{Amount, DelayedCondition, Effect, EffectTarget, TargetFilter, TargetSpec};
use ccg_rules::layers::StaticAbility;
use ccg_rules::replacement::{
    AmountChange, ReplacementAction, ReplacementEffect, ReplacementMatcher, Subject,
};
use ccg_rules::stack::Engine;
use ccg_rules::triggers::{PlayerScope, TriggerCondition};
use ccg_rules::zones::{ZoneKey, ZoneKind};

pub const P0: PlayerId = PlayerId::new(0);
pub const P1: PlayerId = PlayerId::new(1);
pub const P2: PlayerId = PlayerId::new(2);
pub const P3: PlayerId = PlayerId::new(3);

fn creature(name: &str, power: i32, toughness: i32) -> CardDefinition {
    CardDefinition::new(name)
        .with_type(CardType::Creature)
        .with_cost(ManaCost::generic(1).with(Color::Green, 1))
        .with_pt(power, toughness)
}

fn instant(name: &str) -> CardDefinition {
    CardDefinition::new(name).with_type(CardType::Instant)
}

/// A small card pool covering every rules area under test.
pub fn registry() -> CardRegistry {
    let mut registry = CardRegistry::new();

    // === Creatures ===
    registry.register(creature("Grizzly Bears", 2, 2));
    registry.register(creature("Hill Giant", 3, 3));
    registry.register(creature("Craw Wurm", 6, 4));
    registry.register(creature("Siege Mastodon", 3, 5));
    registry.register(creature("Giant Spider", 2, 4).with_keyword(Keyword::Reach));
    registry.register(creature("Typhoid Rats", 1, 1).with_keyword(Keyword::Deathtouch));
    registry.register(creature("Serra Angel", 4, 4).with_keyword(Keyword::Flying).with_keyword(Keyword::Vigilance));
    registry.register(creature("Colossal Dreadmaw", 6, 6).with_keyword(Keyword::Trample));
    registry.register(creature("Vampire Nighthawk", 2, 3).with_keyword(Keyword::Lifelink));
    registry.register(creature("Darksteel Myr", 0, 1).with_keyword(Keyword::Indestructible));
    registry.register(
        creature("Carrion Thrull", 2, 2).with_trigger(TriggeredAbility::new(
            TriggerCondition::ThisDies,
            vec![Effect::gain_life(3)],
        )),
    );
    registry.register(
        creature("Blood Artist", 0, 1).with_trigger(TriggeredAbility::new(
            TriggerCondition::CreatureDies {
                scope: PlayerScope::Any,
                other: false,
            },
            vec![Effect::LoseLife {
                amount: Amount::Fixed(1),
                player: EffectTarget::EachOpponent,
            }],
        )),
    );
    registry.register(
        creature("Soul Warden", 1, 1).with_trigger(TriggeredAbility::new(
            TriggerCondition::CreatureEntersBattlefield {
                scope: PlayerScope::Any,
                other: true,
            },
            vec![Effect::gain_life(1)],
        )),
    );
    registry.register(
        creature("Flametongue Kavu", 4, 2).with_trigger(
            TriggeredAbility::new(
                TriggerCondition::ThisEntersBattlefield,
                vec![Effect::damage(4, EffectTarget::Target(0))],
            )
            .with_target(TargetSpec::creature()),
        ),
    );
    registry.register(
        creature("Isamaru, Hound of Konda", 2, 2).with_supertype(Supertype::Legendary),
    );
    registry.register(
        creature("Prodigal Pyromancer", 1, 1).with_activated(
            ActivatedAbility::new(AbilityCost::tap(), vec![Effect::damage(1, EffectTarget::Target(0))])
                .with_target(TargetSpec::any_target()),
        ),
    );

    registry.register(
        creature("Mogg Fanatic", 1, 1).with_activated(
            ActivatedAbility::new(
                AbilityCost::mana(ManaCost::free()).with_sacrifice(),
                vec![Effect::damage(1, EffectTarget::Target(0))],
            )
            .with_target(TargetSpec::any_target()),
        ),
    );
    registry.register(
        creature("Triskelion", 1, 1).with_activated(
            ActivatedAbility::new(
                AbilityCost::mana(ManaCost::free()).with_counter_removal(CounterKind::PlusOne, 1),
                vec![Effect::damage(1, EffectTarget::Target(0))],
            )
            .with_target(TargetSpec::any_target()),
        ),
    );
    registry.register(
        creature("Palisade Giant", 2, 7).with_replacement(ReplacementEffect::new(
            ReplacementMatcher::WouldBeDealtDamage(Subject::You),
            ReplacementAction::RedirectDamage(Subject::Source),
        )),
    );
    registry.register(
        creature("Maralen of the Mornsong", 2, 3)
            .with_supertype(Supertype::Legendary)
            .with_replacement(ReplacementEffect::new(
                ReplacementMatcher::WouldDraw(Subject::AnyPlayer),
                ReplacementAction::SkipDraw,
            )),
    );

    // === Lands and mana ===
    registry.register(
        CardDefinition::new("Mountain")
            .with_type(CardType::Land)
            .with_supertype(Supertype::Basic)
            .with_activated(ActivatedAbility::new(
                AbilityCost::tap(),
                vec![Effect::AddMana {
                    mana: ManaType::Colored(Color::Red),
                    amount: 1,
                }],
            )),
    );

    // === Spells ===
    registry.register(
        instant("Shock")
            .with_cost(ManaCost::free().with(Color::Red, 1))
            .with_target(TargetSpec::any_target())
            .with_effect(Effect::damage(2, EffectTarget::Target(0))),
    );
    registry.register(
        instant("Lightning Bolt")
            .with_cost(ManaCost::free().with(Color::Red, 1))
            .with_target(TargetSpec::any_target())
            .with_effect(Effect::damage(3, EffectTarget::Target(0))),
    );
    registry.register(
        CardDefinition::new("Lava Axe")
            .with_type(CardType::Sorcery)
            .with_target(TargetSpec::player())
            .with_effect(Effect::damage(5, EffectTarget::Target(0))),
    );
    registry.register(
        CardDefinition::new("Fireball")
            .with_type(CardType::Sorcery)
            .with_cost(ManaCost::free().with(Color::Red, 1).with_x())
            .with_target(TargetSpec::any_target())
            .with_effect(Effect::DealDamage {
                amount: Amount::X,
                to: EffectTarget::Target(0),
            }),
    );
    registry.register(
        CardDefinition::new("Pyroclasm")
            .with_type(CardType::Sorcery)
            .with_effect(Effect::damage(2, EffectTarget::Each(TargetFilter::Creature))),
    );
    registry.register(
        instant("Giant Growth")
            .with_target(TargetSpec::creature())
            .with_effect(Effect::Pump {
                target: EffectTarget::Target(0),
                power: 3,
                toughness: 3,
            }),
    );
    registry.register(
        instant("Counterspell")
            .with_target(TargetSpec::spell())
            .with_effect(Effect::CounterSpell {
                target: EffectTarget::Target(0),
            }),
    );
    registry.register(
        CardDefinition::new("Diabolic Edict")
            .with_type(CardType::Instant)
            .with_target(TargetSpec::player())
            .with_effect(Effect::SacrificeChosen {
                player: EffectTarget::Target(0),
                filter: TargetFilter::Creature,
            }),
    );
    registry.register(
        instant("Healing Salve").with_effect(Effect::gain_life(3)),
    );
    registry.register(
        instant("Syncopate Charm").with_effect(Effect::Modal {
            modes: vec![vec![Effect::gain_life(4)], vec![Effect::draw(2)]],
        }),
    );
    registry.register(
        instant("Charge Up")
            .with_target(TargetSpec::new(TargetFilter::Object))
            .with_effect(Effect::add_counters(CounterKind::Depletion, 2, EffectTarget::Target(0)))
            .with_effect(Effect::add_counters(CounterKind::Depletion, 2, EffectTarget::Target(0))),
    );
    registry.register(
        instant("Wither Touch")
            .with_target(TargetSpec::creature())
            .with_effect(Effect::add_counters(CounterKind::MinusOne, 1, EffectTarget::Target(0))),
    );
    registry.register(
        instant("Feed the Pack")
            .with_target(TargetSpec::creature())
            .with_effect(Effect::add_counters(CounterKind::PlusOne, 2, EffectTarget::Target(0))),
    );
    registry.register(
        instant("Scorching Lava")
            .with_target(TargetSpec::creature())
            .with_effect(Effect::ExileIfWouldDieThisTurn {
                target: EffectTarget::Target(0),
            })
            .with_effect(Effect::damage(3, EffectTarget::Target(0))),
    );
    registry.register(
        CardDefinition::new("Divination")
            .with_type(CardType::Sorcery)
            .with_effect(Effect::draw(2)),
    );
    registry.register(
        instant("Smoldering Fuse")
            .with_target(TargetSpec::player())
            .with_effect(Effect::CreateDelayedTrigger {
                condition: DelayedCondition::NextStep(Step::End),
                effects: vec![Effect::damage(3, EffectTarget::Target(0))],
            }),
    );
    registry.register(
        instant("Final Vigil")
            .with_target(TargetSpec::creature())
            .with_effect(Effect::CreateDelayedTrigger {
                condition: DelayedCondition::LeavesBattlefield(EffectTarget::Target(0)),
                effects: vec![Effect::gain_life(4)],
            }),
    );
    registry.register(
        instant("Lingering Ember").with_effect(Effect::CreateDelayedTrigger {
            condition: DelayedCondition::NextStep(Step::Cleanup),
            effects: vec![Effect::gain_life(2)],
        }),
    );
    registry.register(
        instant("Mutual Ruin").with_effect(Effect::LoseLife {
            amount: Amount::Fixed(20),
            player: EffectTarget::EachPlayer,
        }),
    );

    // === Permanents with static and replacement abilities ===
    registry.register(
        CardDefinition::new("Glorious Anthem")
            .with_type(CardType::Enchantment)
            .with_static(StaticAbility::anthem(
                TargetFilter::Creature.and(TargetFilter::ControlledByYou),
                1,
                1,
            )),
    );
    registry.register(
        CardDefinition::new("Rest in Peace")
            .with_type(CardType::Enchantment)
            .with_replacement(ReplacementEffect::exile_if_would_die(Subject::AnyCreature)),
    );
    registry.register(
        CardDefinition::new("Homeward Path")
            .with_type(CardType::Enchantment)
            .with_replacement(ReplacementEffect::new(
                ReplacementMatcher::WouldDie(Subject::AnyCreature),
                ReplacementAction::ChangeDestination(ZoneKind::Hand),
            )),
    );
    registry.register(
        CardDefinition::new("Furnace of Rath")
            .with_type(CardType::Enchantment)
            .with_replacement(ReplacementEffect::new(
                ReplacementMatcher::WouldBeDealtDamage(Subject::AnyCreature),
                ReplacementAction::ModifyAmount(AmountChange::Multiply(2)),
            )),
    );
    registry.register(
        CardDefinition::new("Boon Reflection")
            .with_type(CardType::Enchantment)
            .with_replacement(ReplacementEffect::new(
                ReplacementMatcher::WouldGainLife(Subject::You),
                ReplacementAction::ModifyAmount(AmountChange::Multiply(2)),
            )),
    );
    registry.register(
        CardDefinition::new("Hardened Scales")
            .with_type(CardType::Enchantment)
            .with_replacement(ReplacementEffect::new(
                ReplacementMatcher::WouldPutCounters(Subject::CreatureYouControl),
                ReplacementAction::ModifyAmount(AmountChange::Add(1)),
            )),
    );
    registry.register(
        CardDefinition::new("Depletion Gauge")
            .with_type(CardType::Artifact)
            .with_trigger(TriggeredAbility::new(
                TriggerCondition::CounterThreshold {
                    kind: CounterKind::Depletion,
                    at_least: 3,
                },
                vec![Effect::gain_life(1)],
            )),
    );
    registry.register(
        CardDefinition::new("Depletion Engine")
            .with_type(CardType::Artifact)
            .with_trigger(TriggeredAbility::new(
                TriggerCondition::CounterThreshold {
                    kind: CounterKind::Depletion,
                    at_least: 3,
                },
                vec![Effect::Sacrifice {
                    target: EffectTarget::Source,
                }],
            )),
    );

    registry
}

pub fn engine() -> Engine {
    Engine::new(registry(), GameConfig::new(2))
}

pub fn engine_for(config: GameConfig) -> Engine {
    Engine::new(registry(), config)
}

/// Put `name` into a zone of `owner` before or during the game.
pub fn add(engine: &Engine, state: &mut GameState, name: &str, owner: PlayerId, zone: ZoneKind) -> EntityId {
    engine.add_card(state, name, owner, zone).unwrap()
}

pub fn on_battlefield(engine: &Engine, state: &mut GameState, name: &str, owner: PlayerId) -> EntityId {
    add(engine, state, name, owner, ZoneKind::Battlefield)
}

pub fn in_hand(engine: &Engine, state: &mut GameState, name: &str, owner: PlayerId) -> EntityId {
    add(engine, state, name, owner, ZoneKind::Hand)
}

pub fn zone_of(state: &GameState, id: EntityId) -> Option<ZoneKind> {
    state.zones().zone_of(id).map(|key| key.kind)
}

pub fn is_on_battlefield(state: &GameState, id: EntityId) -> bool {
    state.zones().zone_of(id) == Some(ZoneKey::battlefield())
}

/// The pending decision; panics if there is none.
pub fn pending(state: &GameState) -> Decision {
    state.pending_decision().cloned().expect("a decision should be pending")
}

/// Answer an empty declaration.
pub fn decline(engine: &Engine, state: &mut GameState) {
    let decision = pending(state);
    engine
        .respond(state, decision.player, Response::pick_many(decision.id, Vec::new()))
        .unwrap();
}

/// Pass priority around once; returns when the stack top resolved or the
/// step ended (or a decision became pending).
pub fn pass_round(engine: &Engine, state: &mut GameState) {
    let step = state.turn().step;
    let top = state.top_of_stack();
    while state.turn().step == step && state.top_of_stack() == top && !state.is_paused() {
        let Some(holder) = state.turn().priority else {
            return;
        };
        engine.pass_priority(state, holder).unwrap();
        if state.outcome().is_some() {
            return;
        }
    }
}

/// Resolve everything on the stack, stopping at decisions.
pub fn resolve_all(engine: &Engine, state: &mut GameState) {
    while !state.stack_is_empty() && !state.is_paused() && state.outcome().is_none() {
        pass_round(engine, state);
    }
}

/// Pass until `step` of the current or a later turn begins, declining
/// every combat declaration on the way.
pub fn advance_to(engine: &Engine, state: &mut GameState, step: Step) {
    let start_turn = state.turn().turn;
    loop {
        if state.turn().step == step && state.turn().priority.is_some() {
            return;
        }
        if state.outcome().is_some() {
            return;
        }
        if state.is_paused() {
            decline(engine, state);
            continue;
        }
        let holder = state.turn().priority.expect("someone holds priority");
        engine.pass_priority(state, holder).unwrap();
        assert!(state.turn().turn <= start_turn + 2, "never reached {step:?}");
    }
}

/// A started two-player game in player 0's first precombat main step.
pub fn main_phase(engine: &Engine, state: &mut GameState) {
    engine.start(state).unwrap();
    advance_to(engine, state, Step::PreCombatMain);
}

/// Cast `card` for free with the given targets.
pub fn cast(engine: &Engine, state: &mut GameState, player: PlayerId, card: EntityId, targets: &[EntityId]) {
    engine
        .cast_spell(state, player, CastRequest::new(card).with_targets(targets).free())
        .unwrap();
}

/// From a main step with an empty stack, pass until the attack
/// declaration is pending.
pub fn to_attack_declaration(engine: &Engine, state: &mut GameState) {
    pass_round(engine, state);
    assert_eq!(state.turn().step, Step::BeginCombat);
    pass_round(engine, state);
    assert_eq!(state.turn().step, Step::DeclareAttackers);
    assert_eq!(pending(state).kind, ccg_rules::decision::DecisionKind::DeclareAttackers);
}

/// Stack objects from bottom to top.
pub fn stack_controllers(state: &GameState) -> Vec<PlayerId> {
    state.stack_objects().map(|object| object.controller).collect()
}
