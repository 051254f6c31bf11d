//! Steps and their turn-based actions.

use crate::core::{
    Attacking, Blocked, Blocking, Damage, DeathtouchDamage, EntityId, GameState, LandDrops, ManaPool, PlayerId, Step,
    SummoningSick, Tapped,
};
use crate::decision::{DecisionKind, DecisionOption};
use crate::error::Result;
use crate::layers::project;
use crate::rules::combat;
use crate::triggers::{GameEvent, ProposedEvent};
use crate::zones::ZoneKey;

use super::agenda::{ask, begin_cycle, Answer, Work};
use super::commit::CommitQueue;
use super::engine::Engine;

fn commit(state: &mut GameState, events: Vec<ProposedEvent>) {
    if !events.is_empty() {
        state.push_work(Work::Commit(CommitQueue::new(events)));
    }
}

/// Log the start of `step` and queue its turn-based action.
pub(crate) fn begin_step(engine: &Engine, state: &mut GameState, step: Step) -> Result<()> {
    let turn = state.turn().turn;
    let active = state.turn().active;
    state.begin_batch();
    state.log_event(GameEvent::StepBegan { turn, step, active }, None);
    log::debug!("turn {}, {:?}, active {}", turn, step, active);

    match step {
        Step::Untap => {
            let view = project(state, engine.registry());
            let permanents: Vec<EntityId> = view.permanents_controlled_by(active).collect();
            for id in &permanents {
                state.clear::<SummoningSick>(*id);
            }
            state.set(EntityId::player(active), LandDrops(engine.config().land_drops_per_turn))?;
            let untaps = permanents
                .into_iter()
                .filter(|id| state.has::<Tapped>(*id))
                .map(|entity| ProposedEvent::Untap { entity })
                .collect();
            commit(state, untaps);
        }
        Step::Draw => {
            if turn > 1 || !engine.config().skip_first_draw {
                commit(state, vec![ProposedEvent::Draw { player: active }]);
            }
        }
        Step::DeclareAttackers => state.push_work(Work::DeclareAttackers),
        Step::DeclareBlockers => {
            let defenders = combat::defending_players(state);
            state.push_work(Work::DeclareBlockers { defenders, index: 0 });
        }
        Step::CombatDamage => {
            let view = project(state, engine.registry());
            let events = combat::damage_events(state, &view);
            commit(state, events);
        }
        Step::EndCombat => {
            let permanents: Vec<EntityId> = state.zones().contents(ZoneKey::battlefield()).collect();
            for id in permanents {
                state.clear::<Attacking>(id);
                state.clear::<Blocking>(id);
                state.clear::<Blocked>(id);
            }
        }
        Step::Cleanup => {
            let permanents: Vec<EntityId> = state.zones().contents(ZoneKey::battlefield()).collect();
            for id in permanents {
                state.clear::<Damage>(id);
                state.clear::<DeathtouchDamage>(id);
            }
            state.end_turn_effects();
            state.turn_mut().attackers_declared = false;
        }
        Step::Upkeep | Step::PreCombatMain | Step::BeginCombat | Step::PostCombatMain | Step::End => {}
    }
    Ok(())
}

/// The active player declares attackers; creatures that cannot attack
/// are not offered.
pub(crate) fn declare_attackers(engine: &Engine, state: &mut GameState, answer: Option<Answer>) {
    let active = state.turn().active;
    let Some(answer) = answer else {
        let view = project(state, engine.registry());
        let options = combat::attack_options(state, &view, active);
        if options.is_empty() {
            state.turn_mut().attackers_declared = false;
            return;
        }
        state.push_work(Work::DeclareAttackers);
        ask(state, active, DecisionKind::DeclareAttackers, options);
        return;
    };

    let events: Vec<ProposedEvent> = answer
        .options()
        .filter_map(|option| match option {
            DecisionOption::Attack { attacker, defender } => Some(ProposedEvent::DeclareAttacker {
                attacker: *attacker,
                defender: *defender,
            }),
            _ => None,
        })
        .collect();
    log::debug!("{} declares {} attackers", active, events.len());
    state.turn_mut().attackers_declared = !events.is_empty();
    commit(state, events);
}

/// Each defending player, in turn order, declares blockers.
pub(crate) fn declare_blockers(
    engine: &Engine,
    state: &mut GameState,
    defenders: Vec<PlayerId>,
    index: usize,
    answer: Option<Answer>,
) {
    let Some(&defender) = defenders.get(index) else {
        return;
    };

    if let Some(answer) = answer {
        let events: Vec<ProposedEvent> = answer
            .options()
            .filter_map(|option| match option {
                DecisionOption::Block { blocker, attacker } => Some(ProposedEvent::DeclareBlocker {
                    blocker: *blocker,
                    attacker: *attacker,
                }),
                _ => None,
            })
            .collect();
        state.push_work(Work::DeclareBlockers {
            defenders,
            index: index + 1,
        });
        commit(state, events);
        return;
    }

    let view = project(state, engine.registry());
    let options = if state.has_lost(defender) {
        Vec::new()
    } else {
        combat::block_options(state, &view, defender)
    };
    if options.is_empty() {
        state.push_work(Work::DeclareBlockers {
            defenders,
            index: index + 1,
        });
        return;
    }
    state.push_work(Work::DeclareBlockers { defenders, index });
    ask(state, defender, DecisionKind::DeclareBlockers, options);
}

/// Move to the next step, or the next turn after cleanup. Mana pools
/// empty; blocker and damage steps are skipped without attackers. A
/// cleanup step in which players received priority is repeated.
pub(crate) fn advance(state: &mut GameState) {
    let player_count = state.player_count();
    for player in PlayerId::all(player_count) {
        state.clear::<ManaPool>(EntityId::player(player));
    }

    let current = state.turn().clone();
    let mut next = if current.step == Step::Cleanup && current.cleanup_again {
        Some(Step::Cleanup)
    } else {
        current.step.next()
    };
    while let Some(step) = next.filter(|step| step.needs_attackers() && !current.attackers_declared) {
        next = step.next();
    }
    let next_active = state
        .first_remaining_from(current.active.next(player_count))
        .unwrap_or(current.active);
    let since = state.log().len();

    let turn = state.turn_mut();
    match next {
        Some(step) => turn.step = step,
        None => {
            turn.turn += 1;
            turn.step = Step::Untap;
            turn.active = next_active;
            turn.attackers_declared = false;
        }
    }
    turn.priority = None;
    turn.passes = 0;
    turn.cleanup_again = false;
    let step = turn.step;

    begin_cycle(state, since, Some(Work::TurnBased(step)), None);
}
