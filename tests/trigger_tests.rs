//! Triggered ability integration tests.
//!
//! Detection over the whole cycle log (including state-based deaths),
//! look-back for objects that left the battlefield, target choice when a
//! trigger goes on the stack, APNAP placement, ordering decisions,
//! counter-threshold state triggers and delayed triggers.

mod common;

use ccg_rules::cards::CounterKind;
use ccg_rules::core::{Counters, Step};
use ccg_rules::decision::{DecisionKind, DecisionOption, Response};
use ccg_rules::stack::StackObjectKind;
use ccg_rules::triggers::GameEvent;
use ccg_rules::zones::ZoneKind;

use common::*;

// =============================================================================
// Death Triggers
// =============================================================================

/// Lethal damage is a state-based death; the dies trigger still fires in
/// the same cycle.
#[test]
fn test_dies_trigger_after_state_based_death() {
    let engine = engine();
    let mut state = engine.new_game();
    let thrull = on_battlefield(&engine, &mut state, "Carrion Thrull", P1);
    let shock = in_hand(&engine, &mut state, "Shock", P0);
    main_phase(&engine, &mut state);

    cast(&engine, &mut state, P0, shock, &[thrull]);
    pass_round(&engine, &mut state);

    assert_eq!(zone_of(&state, thrull), Some(ZoneKind::Graveyard));
    assert_eq!(stack_controllers(&state), vec![P1]);
    let top = state.top_of_stack().unwrap();
    let object = state.stack_object(top).unwrap();
    assert_eq!(object.source, thrull);
    assert!(matches!(object.kind, StackObjectKind::Triggered { .. }));

    resolve_all(&engine, &mut state);
    assert_eq!(state.life(P1), 23);
}

/// Combat damage deaths feed "when this dies" in the combat damage step.
#[test]
fn test_combat_death_triggers() {
    let engine = engine();
    let mut state = engine.new_game();
    let giant = on_battlefield(&engine, &mut state, "Hill Giant", P0);
    let thrull = on_battlefield(&engine, &mut state, "Carrion Thrull", P1);
    main_phase(&engine, &mut state);

    to_attack_declaration(&engine, &mut state);
    engine.declare_attackers(&mut state, P0, &[(giant, P1)]).unwrap();
    pass_round(&engine, &mut state);
    assert_eq!(pending(&state).kind, DecisionKind::DeclareBlockers);
    engine.declare_blockers(&mut state, P1, &[(thrull, giant)]).unwrap();
    pass_round(&engine, &mut state);

    assert_eq!(state.turn().step, Step::CombatDamage);
    assert_eq!(zone_of(&state, thrull), Some(ZoneKind::Graveyard));
    assert!(is_on_battlefield(&state, giant));
    assert_eq!(stack_controllers(&state), vec![P1]);
    assert_eq!(state.turn().priority, Some(P0));

    resolve_all(&engine, &mut state);
    assert_eq!(state.life(P1), 23);
    assert_eq!(state.life(P0), 20);
}

/// A creature that dies alongside others sees every death.
#[test]
fn test_simultaneous_deaths_seen_by_dying_observer() {
    let engine = engine();
    let mut state = engine.new_game();
    on_battlefield(&engine, &mut state, "Blood Artist", P0);
    on_battlefield(&engine, &mut state, "Grizzly Bears", P1);
    let pyroclasm = in_hand(&engine, &mut state, "Pyroclasm", P0);
    main_phase(&engine, &mut state);

    cast(&engine, &mut state, P0, pyroclasm, &[]);
    pass_round(&engine, &mut state);

    // Two identical triggers: the controller orders them.
    let decision = pending(&state);
    assert_eq!(decision.player, P0);
    assert_eq!(decision.kind, DecisionKind::OrderTriggers);
    assert_eq!(decision.options.len(), 2);
    engine.respond(&mut state, P0, Response::pick(decision.id, 1)).unwrap();

    assert_eq!(stack_controllers(&state), vec![P0, P0]);
    resolve_all(&engine, &mut state);
    assert_eq!(state.life(P1), 18);
}

// =============================================================================
// Enters-the-Battlefield Triggers and Targets
// =============================================================================

/// A trigger with several legal targets asks its controller.
#[test]
fn test_trigger_target_choice() {
    let engine = engine();
    let mut state = engine.new_game();
    let bears = on_battlefield(&engine, &mut state, "Grizzly Bears", P1);
    let kavu = in_hand(&engine, &mut state, "Flametongue Kavu", P0);
    main_phase(&engine, &mut state);

    cast(&engine, &mut state, P0, kavu, &[]);
    pass_round(&engine, &mut state);

    let decision = pending(&state);
    assert_eq!(decision.kind, DecisionKind::ChooseTargets);
    assert_eq!(
        decision.options,
        vec![DecisionOption::Entity(bears), DecisionOption::Entity(kavu)]
    );
    engine.respond(&mut state, P0, Response::pick(decision.id, 0)).unwrap();

    let top = state.top_of_stack().unwrap();
    assert_eq!(state.stack_object(top).unwrap().targets.as_slice(), &[bears]);
    resolve_all(&engine, &mut state);
    assert_eq!(zone_of(&state, bears), Some(ZoneKind::Graveyard));
    assert!(is_on_battlefield(&state, kavu));
}

/// A single legal target is chosen automatically.
#[test]
fn test_trigger_single_target_is_automatic() {
    let engine = engine();
    let mut state = engine.new_game();
    let kavu = in_hand(&engine, &mut state, "Flametongue Kavu", P0);
    main_phase(&engine, &mut state);

    cast(&engine, &mut state, P0, kavu, &[]);
    pass_round(&engine, &mut state);
    assert!(!state.is_paused());

    resolve_all(&engine, &mut state);
    assert_eq!(zone_of(&state, kavu), Some(ZoneKind::Graveyard));
}

/// "Whenever another creature enters" does not see its own entry.
#[test]
fn test_other_creature_enters() {
    let engine = engine();
    let mut state = engine.new_game();
    let warden = in_hand(&engine, &mut state, "Soul Warden", P0);
    let bears = in_hand(&engine, &mut state, "Grizzly Bears", P0);
    main_phase(&engine, &mut state);

    cast(&engine, &mut state, P0, warden, &[]);
    resolve_all(&engine, &mut state);
    assert_eq!(state.life(P0), 20);

    cast(&engine, &mut state, P0, bears, &[]);
    resolve_all(&engine, &mut state);
    assert_eq!(state.life(P0), 21);
}

// =============================================================================
// APNAP
// =============================================================================

/// The active player's triggers go on the stack first and resolve last.
#[test]
fn test_apnap_placement() {
    let engine = engine();
    let mut state = engine.new_game();
    on_battlefield(&engine, &mut state, "Carrion Thrull", P0);
    on_battlefield(&engine, &mut state, "Carrion Thrull", P1);
    let pyroclasm = in_hand(&engine, &mut state, "Pyroclasm", P0);
    main_phase(&engine, &mut state);

    cast(&engine, &mut state, P0, pyroclasm, &[]);
    pass_round(&engine, &mut state);

    assert!(!state.is_paused());
    assert_eq!(stack_controllers(&state), vec![P0, P1]);

    pass_round(&engine, &mut state);
    assert_eq!(state.life(P1), 23);
    assert_eq!(state.life(P0), 20);
    pass_round(&engine, &mut state);
    assert_eq!(state.life(P0), 23);
}

// =============================================================================
// State Triggers
// =============================================================================

/// The threshold trigger fires once, at the crossing, even when the
/// counters arrive in one resolution.
#[test]
fn test_counter_threshold_fires_once() {
    let engine = engine();
    let mut state = engine.new_game();
    let depletion = on_battlefield(&engine, &mut state, "Depletion Engine", P0);
    let charge = in_hand(&engine, &mut state, "Charge Up", P0);
    main_phase(&engine, &mut state);

    cast(&engine, &mut state, P0, charge, &[depletion]);
    pass_round(&engine, &mut state);

    let counters = state.get::<Counters>(depletion).map_or(0, |c| c.count(&CounterKind::Depletion));
    assert_eq!(counters, 4);
    assert_eq!(stack_controllers(&state), vec![P0]);

    resolve_all(&engine, &mut state);
    assert_eq!(zone_of(&state, depletion), Some(ZoneKind::Graveyard));
    assert!(state.stack_is_empty());
}

/// Below the threshold nothing triggers.
#[test]
fn test_counter_threshold_not_reached() {
    let engine = engine();
    let mut state = engine.new_game();
    let depletion = on_battlefield(&engine, &mut state, "Depletion Engine", P0);
    main_phase(&engine, &mut state);

    let mut counters = Counters::default();
    counters.add(CounterKind::Depletion, 2);
    state.set(depletion, counters).unwrap();
    pass_round(&engine, &mut state);

    assert!(state.stack_is_empty());
    assert!(is_on_battlefield(&state, depletion));
}

/// A threshold already reached does not fire again when more counters
/// arrive, and the game moves on.
#[test]
fn test_counter_threshold_does_not_refire() {
    let engine = engine();
    let mut state = engine.new_game();
    let gauge = on_battlefield(&engine, &mut state, "Depletion Gauge", P0);
    let first = in_hand(&engine, &mut state, "Charge Up", P0);
    let second = in_hand(&engine, &mut state, "Charge Up", P0);
    main_phase(&engine, &mut state);

    cast(&engine, &mut state, P0, first, &[gauge]);
    resolve_all(&engine, &mut state);
    assert_eq!(state.life(P0), 21);
    assert!(state.stack_is_empty());

    cast(&engine, &mut state, P0, second, &[gauge]);
    resolve_all(&engine, &mut state);
    let counters = state.get::<Counters>(gauge).map_or(0, |c| c.count(&CounterKind::Depletion));
    assert_eq!(counters, 8);
    assert_eq!(state.life(P0), 21);
    assert!(state.stack_is_empty());

    pass_round(&engine, &mut state);
    assert_eq!(state.turn().step, Step::BeginCombat);
}

// =============================================================================
// Delayed Triggers
// =============================================================================

/// A delayed trigger waits for its step, fires once and is gone.
#[test]
fn test_delayed_trigger_at_next_end_step() {
    let engine = engine();
    let mut state = engine.new_game();
    let fuse = in_hand(&engine, &mut state, "Smoldering Fuse", P0);
    main_phase(&engine, &mut state);

    cast(&engine, &mut state, P0, fuse, &[P1.into()]);
    resolve_all(&engine, &mut state);
    assert_eq!(state.life(P1), 20);
    assert_eq!(state.delayed_triggers().count(), 1);

    advance_to(&engine, &mut state, Step::End);
    assert_eq!(stack_controllers(&state), vec![P0]);
    resolve_all(&engine, &mut state);
    assert_eq!(state.life(P1), 17);
    assert_eq!(state.delayed_triggers().count(), 0);

    pass_round(&engine, &mut state);
    advance_to(&engine, &mut state, Step::End);
    assert_eq!(state.turn().active, P1);
    assert!(state.stack_is_empty());
    assert_eq!(state.life(P1), 17);
}

/// A delayed trigger watching a creature fires when it leaves.
#[test]
fn test_delayed_trigger_on_leaving() {
    let engine = engine();
    let mut state = engine.new_game();
    let bears = on_battlefield(&engine, &mut state, "Grizzly Bears", P0);
    let vigil = in_hand(&engine, &mut state, "Final Vigil", P0);
    let shock = in_hand(&engine, &mut state, "Shock", P0);
    main_phase(&engine, &mut state);

    cast(&engine, &mut state, P0, vigil, &[bears]);
    resolve_all(&engine, &mut state);
    assert_eq!(state.delayed_triggers().count(), 1);

    cast(&engine, &mut state, P0, shock, &[bears]);
    resolve_all(&engine, &mut state);
    assert_eq!(zone_of(&state, bears), Some(ZoneKind::Graveyard));
    assert_eq!(state.life(P0), 24);
    assert_eq!(state.delayed_triggers().count(), 0);
}

/// A trigger during cleanup gives players priority, and another cleanup
/// step follows before the turn ends.
#[test]
fn test_cleanup_repeats_after_trigger() {
    let engine = engine();
    let mut state = engine.new_game();
    let ember = in_hand(&engine, &mut state, "Lingering Ember", P0);
    main_phase(&engine, &mut state);

    cast(&engine, &mut state, P0, ember, &[]);
    resolve_all(&engine, &mut state);
    advance_to(&engine, &mut state, Step::Upkeep);

    assert_eq!(state.turn().turn, 2);
    assert_eq!(state.life(P0), 22);
    let cleanups = state
        .log()
        .iter()
        .filter(|logged| matches!(logged.event, GameEvent::StepBegan { turn: 1, step: Step::Cleanup, .. }))
        .count();
    assert_eq!(cleanups, 2);
}
