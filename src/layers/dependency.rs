//! Dependency ordering within a layer.
//!
//! Effect A depends on effect B when both sit in the same layer (and
//! sublayer), both or neither are characteristic-defining, and either
//!
//! - applying B changes the set of objects A applies to, or
//! - B removes the abilities of the object whose static ability is A.
//!
//! Dependencies apply first. Among independent effects the order is
//! characteristic-defining, timestamp, then origin. When every remaining
//! effect waits on another (a cycle), the earliest one by that same key
//! applies next. The graph is rebuilt on every projection.

use crate::cards::CardRegistry;
use crate::core::GameState;

use super::effect::{AffectedSet, Modification};
use super::projector::{ActiveEffect, CharacteristicsMap, EffectOrigin};

/// Whether `a` depends on `b` in the current characteristics.
fn depends_on(
    a: &ActiveEffect<'_>,
    b: &ActiveEffect<'_>,
    state: &GameState,
    registry: &CardRegistry,
    chars: &CharacteristicsMap,
) -> bool {
    if a.characteristic_defining != b.characteristic_defining {
        return false;
    }

    if matches!(a.origin, EffectOrigin::Static { .. })
        && matches!(b.modification, Modification::RemoveAllAbilities)
        && b.affected_entities(state, chars).contains(&a.source)
    {
        return true;
    }

    if !matches!(a.affected, AffectedSet::Matching(_)) {
        return false;
    }
    let before = a.affected_entities(state, chars);
    let mut after_b = chars.clone();
    b.apply(state, registry, &mut after_b);
    a.affected_entities(state, &after_b) != before
}

/// Order the effects of one layer or sublayer for application.
pub(crate) fn order<'a>(
    effects: Vec<ActiveEffect<'a>>,
    state: &GameState,
    registry: &CardRegistry,
    chars: &CharacteristicsMap,
) -> Vec<ActiveEffect<'a>> {
    if effects.len() < 2 {
        return effects;
    }

    // waits_on[i] holds the indices i depends on
    let waits_on: Vec<Vec<usize>> = effects
        .iter()
        .enumerate()
        .map(|(i, a)| {
            effects
                .iter()
                .enumerate()
                .filter(|(j, b)| *j != i && depends_on(a, b, state, registry, chars))
                .map(|(j, _)| j)
                .collect()
        })
        .collect();

    let mut placed = vec![false; effects.len()];
    let mut sequence = Vec::with_capacity(effects.len());
    while sequence.len() < effects.len() {
        let remaining = || (0..effects.len()).filter(|&i| !placed[i]);
        let ready = remaining()
            .filter(|&i| waits_on[i].iter().all(|&j| placed[j]))
            .min_by_key(|&i| effects[i].sort_key());
        let next = ready.or_else(|| remaining().min_by_key(|&i| effects[i].sort_key()));
        let Some(next) = next else {
            break;
        };
        if ready.is_none() {
            log::trace!("dependency cycle in {:?}; falling back to timestamp order", effects[next].layer());
        }
        placed[next] = true;
        sequence.push(next);
    }

    let mut slots: Vec<Option<ActiveEffect<'a>>> = effects.into_iter().map(Some).collect();
    sequence.into_iter().filter_map(|i| slots[i].take()).collect()
}
