//! Combat: who may attack, who may block, and how damage is assigned.
//!
//! Attack and block declarations are surfaced as decisions; this module
//! only lists the legal options and turns a finished board into the
//! combat damage batch.

use smallvec::SmallVec;

use crate::cards::Keyword;
use crate::core::{Attacking, Blocked, Blocking, Damage, EntityId, GameState, PlayerId, SummoningSick, Tapped};
use crate::decision::DecisionOption;
use crate::layers::{Characteristics, ProjectedView};
use crate::triggers::{DamageEvent, ProposedEvent};

/// Whether a creature can be declared as an attacker.
#[must_use]
pub fn can_attack(id: EntityId, chars: &Characteristics, state: &GameState) -> bool {
    chars.is_creature()
        && !state.has::<Tapped>(id)
        && (!state.has::<SummoningSick>(id) || chars.has_keyword(Keyword::Haste))
        && !chars.has_keyword(Keyword::Defender)
}

/// Whether `blocker` can block `attacker`.
#[must_use]
pub fn can_block(blocker: &Characteristics, attacker: &Characteristics) -> bool {
    if !blocker.is_creature() {
        return false;
    }
    if attacker.has_keyword(Keyword::Flying) {
        return blocker.has_keyword(Keyword::Flying) || blocker.has_keyword(Keyword::Reach);
    }
    true
}

/// Every (attacker, defending player) pair `active` may declare.
#[must_use]
pub fn attack_options(state: &GameState, view: &ProjectedView, active: PlayerId) -> Vec<DecisionOption> {
    let defenders: Vec<PlayerId> = state
        .remaining_players()
        .into_iter()
        .filter(|player| *player != active)
        .collect();

    let mut options = Vec::new();
    for (id, chars) in view.creatures() {
        if chars.controller != active || !can_attack(id, chars, state) {
            continue;
        }
        for defender in &defenders {
            options.push(DecisionOption::Attack {
                attacker: id,
                defender: *defender,
            });
        }
    }
    options
}

/// Players being attacked, in turn order from the active player.
#[must_use]
pub fn defending_players(state: &GameState) -> Vec<PlayerId> {
    let active = state.turn().active;
    PlayerId::apnap(active, state.player_count())
        .filter(|player| {
            !state.has_lost(*player)
                && state
                    .zones()
                    .contents(crate::zones::ZoneKey::battlefield())
                    .any(|id| state.get::<Attacking>(id).is_some_and(|a| a.0 == *player))
        })
        .collect()
}

/// Every (blocker, attacker) pair `defender` may declare.
#[must_use]
pub fn block_options(state: &GameState, view: &ProjectedView, defender: PlayerId) -> Vec<DecisionOption> {
    let attackers: Vec<(EntityId, &Characteristics)> = view
        .creatures()
        .filter(|(id, _)| state.get::<Attacking>(*id).is_some_and(|a| a.0 == defender))
        .collect();

    let mut options = Vec::new();
    for (blocker, chars) in view.creatures() {
        if chars.controller != defender || state.has::<Tapped>(blocker) {
            continue;
        }
        for (attacker, attacker_chars) in &attackers {
            if can_block(chars, attacker_chars) {
                options.push(DecisionOption::Block {
                    blocker,
                    attacker: *attacker,
                });
            }
        }
    }
    options
}

fn damage(source: EntityId, target: EntityId, amount: u32, chars: &Characteristics) -> ProposedEvent {
    ProposedEvent::Damage(DamageEvent {
        source,
        target,
        amount,
        combat: true,
        deathtouch: chars.has_keyword(Keyword::Deathtouch),
        lifelink: chars.has_keyword(Keyword::Lifelink),
        source_controller: chars.controller,
    })
}

/// Damage a blocker needs to be dealt to be destroyed.
fn lethal_for(blocker: EntityId, attacker: &Characteristics, state: &GameState, view: &ProjectedView) -> u32 {
    if attacker.has_keyword(Keyword::Deathtouch) {
        return 1;
    }
    let toughness = view.toughness(blocker).unwrap_or(0).max(0) as u32;
    let marked = state.get::<Damage>(blocker).map_or(0, |d| d.0);
    toughness.saturating_sub(marked).max(1)
}

/// All combat damage, dealt simultaneously.
///
/// Each attacker assigns lethal damage to its blockers in id order, the
/// last blocker taking whatever is left; trample sends the excess to the
/// defending player. An attacker whose blockers have all left combat
/// deals no damage unless it has trample.
#[must_use]
pub fn damage_events(state: &GameState, view: &ProjectedView) -> Vec<ProposedEvent> {
    let mut events = Vec::new();

    for (attacker, chars) in view.creatures() {
        let Some(defender) = state.get::<Attacking>(attacker).map(|a| a.0) else {
            continue;
        };
        let blockers: SmallVec<[EntityId; 4]> = view
            .creatures()
            .filter(|(id, _)| state.get::<Blocking>(*id).is_some_and(|b| b.0 == attacker))
            .map(|(id, _)| id)
            .collect();

        for blocker in &blockers {
            if let Some(blocker_chars) = view.get(*blocker) {
                let power = blocker_chars.power.unwrap_or(0).max(0) as u32;
                if power > 0 {
                    events.push(damage(*blocker, attacker, power, blocker_chars));
                }
            }
        }

        let mut remaining = chars.power.unwrap_or(0).max(0) as u32;
        if remaining == 0 {
            continue;
        }
        let player = EntityId::player(defender);
        let trample = chars.has_keyword(Keyword::Trample);

        if !state.has::<Blocked>(attacker) {
            events.push(damage(attacker, player, remaining, chars));
            continue;
        }

        for (index, blocker) in blockers.iter().enumerate() {
            let last = index + 1 == blockers.len();
            let assigned = if last && !trample {
                remaining
            } else {
                remaining.min(lethal_for(*blocker, chars, state, view))
            };
            if assigned > 0 {
                events.push(damage(attacker, *blocker, assigned, chars));
            }
            remaining -= assigned;
        }
        if trample && remaining > 0 {
            events.push(damage(attacker, player, remaining, chars));
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardRegistry, CardType};
    use crate::layers::project;
    use crate::zones::ZoneKind;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn amounts(events: &[ProposedEvent]) -> Vec<(EntityId, EntityId, u32)> {
        events
            .iter()
            .filter_map(|event| match event {
                ProposedEvent::Damage(d) => Some((d.source, d.target, d.amount)),
                _ => None,
            })
            .collect()
    }

    fn registry() -> CardRegistry {
        let mut registry = CardRegistry::new();
        registry.register(CardDefinition::new("Bear").with_type(CardType::Creature).with_pt(2, 2));
        registry.register(
            CardDefinition::new("Drake")
                .with_type(CardType::Creature)
                .with_pt(2, 2)
                .with_keyword(Keyword::Flying),
        );
        registry.register(
            CardDefinition::new("Trampler")
                .with_type(CardType::Creature)
                .with_pt(5, 5)
                .with_keyword(Keyword::Trample),
        );
        registry.register(
            CardDefinition::new("Wall")
                .with_type(CardType::Creature)
                .with_pt(0, 4)
                .with_keyword(Keyword::Defender),
        );
        registry
    }

    fn card(registry: &CardRegistry, name: &str) -> crate::cards::CardId {
        registry.id_of(name).unwrap()
    }

    #[test]
    fn test_attack_options() {
        let registry = registry();
        let mut state = GameState::new(3, 20, 0);
        let bear = state.create_card(card(&registry, "Bear"), P0, ZoneKind::Battlefield).unwrap();
        state.create_card(card(&registry, "Wall"), P0, ZoneKind::Battlefield).unwrap();
        let tapped = state.create_card(card(&registry, "Bear"), P0, ZoneKind::Battlefield).unwrap();
        state.set(tapped, Tapped).unwrap();

        let view = project(&state, &registry);
        let options = attack_options(&state, &view, P0);
        assert_eq!(
            options,
            vec![
                DecisionOption::Attack { attacker: bear, defender: P1 },
                DecisionOption::Attack { attacker: bear, defender: PlayerId::new(2) },
            ]
        );
    }

    #[test]
    fn test_flying_needs_flying_or_reach() {
        let registry = registry();
        let mut state = GameState::new(2, 20, 0);
        let drake = state.create_card(card(&registry, "Drake"), P0, ZoneKind::Battlefield).unwrap();
        let bear = state.create_card(card(&registry, "Bear"), P0, ZoneKind::Battlefield).unwrap();
        state.create_card(card(&registry, "Bear"), P1, ZoneKind::Battlefield).unwrap();
        let their_drake = state.create_card(card(&registry, "Drake"), P1, ZoneKind::Battlefield).unwrap();
        state.set(drake, Attacking(P1)).unwrap();

        let view = project(&state, &registry);
        let options = block_options(&state, &view, P1);
        assert_eq!(options, vec![DecisionOption::Block { blocker: their_drake, attacker: drake }]);

        state.set(bear, Attacking(P1)).unwrap();
        let view = project(&state, &registry);
        assert_eq!(block_options(&state, &view, P1).len(), 3);
        assert_eq!(defending_players(&state), vec![P1]);
    }

    #[test]
    fn test_unblocked_damage() {
        let registry = registry();
        let mut state = GameState::new(2, 20, 0);
        let bear = state.create_card(card(&registry, "Bear"), P0, ZoneKind::Battlefield).unwrap();
        state.set(bear, Attacking(P1)).unwrap();

        let view = project(&state, &registry);
        assert_eq!(amounts(&damage_events(&state, &view)), vec![(bear, EntityId(1), 2)]);
    }

    #[test]
    fn test_trample_assigns_lethal_then_player() {
        let registry = registry();
        let mut state = GameState::new(2, 20, 0);
        let trampler = state.create_card(card(&registry, "Trampler"), P0, ZoneKind::Battlefield).unwrap();
        let blocker = state.create_card(card(&registry, "Bear"), P1, ZoneKind::Battlefield).unwrap();
        state.set(trampler, Attacking(P1)).unwrap();
        state.set(trampler, Blocked).unwrap();
        state.set(blocker, Blocking(trampler)).unwrap();

        let view = project(&state, &registry);
        assert_eq!(
            amounts(&damage_events(&state, &view)),
            vec![(blocker, trampler, 2), (trampler, blocker, 2), (trampler, EntityId(1), 3)]
        );
    }

    #[test]
    fn test_blocked_without_blockers_deals_nothing() {
        let registry = registry();
        let mut state = GameState::new(2, 20, 0);
        let bear = state.create_card(card(&registry, "Bear"), P0, ZoneKind::Battlefield).unwrap();
        state.set(bear, Attacking(P1)).unwrap();
        state.set(bear, Blocked).unwrap();

        let view = project(&state, &registry);
        assert!(damage_events(&state, &view).is_empty());
    }
}
