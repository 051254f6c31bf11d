//! The driver surface.
//!
//! `Engine` holds the immutable card registry and configuration; every
//! call takes the `GameState` it acts on. Each public action is atomic:
//! the state is snapshotted first (an O(1) clone of persistent
//! structures) and restored if the action fails with a rules error.
//!
//! ## Example
//!
//! ```
//! use ccg_rules::cards::{CardDefinition, CardRegistry, CardType};
//! use ccg_rules::core::{CastRequest, GameConfig, PlayerId};
//! use ccg_rules::effects::{Effect, EffectTarget, TargetSpec};
//! use ccg_rules::stack::Engine;
//! use ccg_rules::zones::ZoneKind;
//!
//! let mut registry = CardRegistry::new();
//! registry.register(
//!     CardDefinition::new("Shock")
//!         .with_type(CardType::Instant)
//!         .with_target(TargetSpec::any_target())
//!         .with_effect(Effect::damage(2, EffectTarget::Target(0))),
//! );
//! let engine = Engine::new(registry, GameConfig::new(2));
//! let mut state = engine.new_game();
//! let p0 = PlayerId::new(0);
//! let p1 = PlayerId::new(1);
//! let shock = engine.add_card(&mut state, "Shock", p0, ZoneKind::Hand).unwrap();
//! engine.start(&mut state).unwrap();
//!
//! engine
//!     .cast_spell(&mut state, p0, CastRequest::new(shock).with_targets(&[p1.into()]).free())
//!     .unwrap();
//! engine.pass_priority(&mut state, p0).unwrap();
//! engine.pass_priority(&mut state, p1).unwrap();
//! assert_eq!(state.life(p1), 18);
//! ```

use crate::cards::{CardDefinition, CardRegistry, Keyword, ManaCost, ManaType};
use crate::core::{
    ActivateRequest, CastRequest, Counters, EntityId, GameConfig, GameState, LandDrops, ManaPool, Payment,
    PlayerAction, PlayerId, Step, SummoningSick, Tapped, Targets,
};
use crate::decision::{DecisionKind, DecisionOption, Response};
use crate::effects::resolver::{resolve_effect, EffectStep, ResolverContext};
use crate::effects::{check_target, legal_targets, FilterContext, TargetSpec};
use crate::error::{Result, RulesError};
use crate::layers::{project, ProjectedView};
use crate::rules::RulesEngine;
use crate::triggers::{GameEvent, ProposedEvent};
use crate::zones::{ZoneKey, ZoneKind, ZonePosition};

use super::agenda::{self, begin_cycle, Answer, Work};
use super::commit::CommitQueue;
use super::object::{StackObject, StackObjectKind};
use super::priority::{self, PassOutcome};
use super::resolve::ResolutionFrame;

/// Rules engine over a fixed card pool and configuration.
#[derive(Clone, Debug)]
pub struct Engine {
    registry: CardRegistry,
    config: GameConfig,
}

impl Engine {
    #[must_use]
    pub fn new(registry: CardRegistry, config: GameConfig) -> Self {
        Self { registry, config }
    }

    #[must_use]
    pub fn registry(&self) -> &CardRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    // === Setup ===

    /// A fresh game in the untap step of turn 1.
    #[must_use]
    pub fn new_game(&self) -> GameState {
        GameState::new(self.config.player_count, self.config.starting_life, self.config.seed)
    }

    /// Put a card, by name, into a zone of `owner`.
    pub fn add_card(&self, state: &mut GameState, name: &str, owner: PlayerId, zone: ZoneKind) -> Result<EntityId> {
        let card = self
            .registry
            .id_of(name)
            .ok_or_else(|| RulesError::illegal(format!("unknown card {name:?}")))?;
        state.create_card(card, owner, zone)
    }

    /// Fill a library. The first name ends up at the bottom.
    pub fn seed_library(&self, state: &mut GameState, player: PlayerId, names: &[&str]) -> Result<Vec<EntityId>> {
        names
            .iter()
            .map(|name| self.add_card(state, name, player, ZoneKind::Library))
            .collect()
    }

    pub fn shuffle_library(&self, state: &mut GameState, player: PlayerId) {
        state.shuffle_library(player);
    }

    /// Add mana to a player's pool directly (setup and tests).
    pub fn add_mana(&self, state: &mut GameState, player: PlayerId, mana: ManaType, amount: u32) -> Result<()> {
        let id = EntityId::player(player);
        let mut pool = state.get::<ManaPool>(id).cloned().unwrap_or_default();
        pool.add(mana, amount);
        state.set(id, pool)
    }

    /// Begin the game: the first untap step, then on to the first point
    /// where a player receives priority.
    pub fn start(&self, state: &mut GameState) -> Result<()> {
        if state.turn().started {
            return Err(RulesError::illegal("the game has already started"));
        }
        let since = state.log().len();
        let turn = state.turn_mut();
        turn.started = true;
        turn.step = Step::Untap;
        begin_cycle(state, since, Some(Work::TurnBased(Step::Untap)), None);
        agenda::run(self, state, None)
    }

    /// Characteristics of every object after continuous effects.
    #[must_use]
    pub fn project(&self, state: &GameState) -> ProjectedView {
        project(state, &self.registry)
    }

    // === Actions ===

    fn atomically(&self, state: &mut GameState, action: impl FnOnce(&mut GameState) -> Result<()>) -> Result<()> {
        let snapshot = state.clone();
        match action(state) {
            Err(err) if err.is_recoverable() => {
                log::debug!("action rejected: {}", err);
                *state = snapshot;
                Err(err)
            }
            other => other,
        }
    }

    /// Fail unless `player` may take an action that needs priority.
    fn ensure_priority(state: &GameState, player: PlayerId) -> Result<()> {
        if state.outcome().is_some() {
            return Err(RulesError::illegal("the game is over"));
        }
        if let Some(decision) = state.pending_decision() {
            return Err(RulesError::illegal(format!("{} is waiting on {}", decision.id, decision.player)));
        }
        if state.turn().priority != Some(player) {
            return Err(RulesError::illegal(format!("{player} does not have priority")));
        }
        Ok(())
    }

    fn sorcery_timing(state: &GameState, player: PlayerId) -> bool {
        let turn = state.turn();
        turn.step.is_main() && turn.active == player && state.stack_is_empty()
    }

    fn definition_of(&self, state: &GameState, id: EntityId) -> Result<&CardDefinition> {
        state
            .entity(id)
            .and_then(|record| record.definition)
            .and_then(|card| self.registry.get(card))
            .ok_or(RulesError::NoSuchEntity(id))
    }

    fn check_targets(specs: &[TargetSpec], targets: &Targets, ctx: &FilterContext) -> Result<()> {
        if specs.len() != targets.len() {
            return Err(RulesError::illegal(format!(
                "expected {} targets, got {}",
                specs.len(),
                targets.len()
            )));
        }
        specs
            .iter()
            .zip(targets.iter())
            .try_for_each(|(spec, target)| check_target(spec, *target, ctx))
    }

    fn pay(state: &mut GameState, player: PlayerId, cost: &ManaCost, x: u32, payment: Payment) -> Result<()> {
        if payment == Payment::Free {
            return Ok(());
        }
        let id = EntityId::player(player);
        let pool = state.get::<ManaPool>(id).cloned().unwrap_or_default();
        let remaining = pool
            .after_paying(cost, x)
            .ok_or_else(|| RulesError::illegal(format!("{player} cannot pay {cost:?} with X={x}")))?;
        state.set(id, remaining)
    }

    /// Cast a spell from hand. Targets are checked before anything
    /// changes; priority then goes to the active player.
    pub fn cast_spell(&self, state: &mut GameState, player: PlayerId, request: CastRequest) -> Result<()> {
        self.atomically(state, |state| {
            Self::ensure_priority(state, player)?;
            let card = request.card;
            if state.zones().zone_of(card) != Some(ZoneKey::hand(player)) {
                return Err(RulesError::illegal(format!("{card} is not in {player}'s hand")));
            }
            let definition = self.definition_of(state, card)?;
            if definition.is_land() {
                return Err(RulesError::illegal("lands are played, not cast"));
            }
            if !definition.has_instant_timing() && !Self::sorcery_timing(state, player) {
                return Err(RulesError::illegal(format!("{} can only be cast at sorcery speed", definition.name)));
            }
            if request.x > 0 && !definition.mana_cost.has_x {
                return Err(RulesError::illegal(format!("{} has no X in its cost", definition.name)));
            }
            {
                let view = project(state, &self.registry);
                let ctx = FilterContext::new(state, view.characteristics(), player).with_source(card);
                Self::check_targets(&definition.spell_targets, &request.targets, &ctx)?;
            }
            Self::pay(state, player, &definition.mana_cost, request.x, request.payment)?;

            let since = state.log().len();
            state.begin_batch();
            let moved = state.move_entity(card, ZoneKey::hand(player), ZoneKey::stack(), ZonePosition::Top)?;
            state.log_event(moved, None);
            state.push_stack_object(StackObject {
                id: card,
                controller: player,
                source: card,
                kind: StackObjectKind::Spell,
                effects: definition.spell_effects.clone(),
                target_specs: definition.spell_targets.clone(),
                targets: request.targets.clone(),
                x: request.x,
                triggering: None,
            });
            state.log_event(GameEvent::SpellCast { spell: card, controller: player }, None);
            log::debug!("{} casts {} ({})", player, definition.name, card);

            begin_cycle(state, since, None, None);
            agenda::run(self, state, None)
        })
    }

    /// Activate an ability of a permanent `player` controls. Mana
    /// abilities resolve at once and `player` keeps priority.
    pub fn activate_ability(&self, state: &mut GameState, player: PlayerId, request: ActivateRequest) -> Result<()> {
        self.atomically(state, |state| {
            Self::ensure_priority(state, player)?;
            let source = request.source;
            let view = project(state, &self.registry);
            let chars = view.get(source).ok_or(RulesError::NoSuchEntity(source))?;
            if !chars.on_battlefield() || chars.controller != player {
                return Err(RulesError::illegal(format!("{player} does not control {source}")));
            }
            if chars.abilities_removed {
                return Err(RulesError::illegal(format!("{source} has no abilities")));
            }
            let definition = chars
                .definition
                .and_then(|card| self.registry.get(card))
                .ok_or(RulesError::NoSuchEntity(source))?;
            let ability = definition
                .activated
                .get(request.index)
                .ok_or_else(|| RulesError::illegal(format!("{source} has no ability {}", request.index)))?;

            if ability.sorcery_speed && !Self::sorcery_timing(state, player) {
                return Err(RulesError::illegal("this ability can only be activated at sorcery speed"));
            }
            let cost = &ability.cost;
            if cost.tap {
                if state.has::<Tapped>(source) {
                    return Err(RulesError::illegal(format!("{source} is tapped")));
                }
                if chars.is_creature() && state.has::<SummoningSick>(source) && !chars.has_keyword(Keyword::Haste) {
                    return Err(RulesError::illegal(format!("{source} has summoning sickness")));
                }
            }
            if let Some((kind, amount)) = &cost.remove_counters {
                let have = state.get::<Counters>(source).map_or(0, |counters| counters.count(kind));
                if have < *amount {
                    return Err(RulesError::illegal(format!("{source} has {have} {kind} counters, needs {amount}")));
                }
            }
            {
                let ctx = FilterContext::new(state, view.characteristics(), player).with_source(source);
                Self::check_targets(&ability.targets, &request.targets, &ctx)?;
            }
            Self::pay(state, player, &cost.mana, request.x, request.payment)?;

            let since = state.log().len();
            state.begin_batch();
            if cost.tap {
                state.set(source, Tapped)?;
                state.log_event(GameEvent::Tapped { entity: source }, None);
            }
            if let Some((kind, amount)) = &cost.remove_counters {
                let mut counters = state.get::<Counters>(source).cloned().unwrap_or_default();
                counters.remove(kind, *amount);
                state.set(source, counters)?;
                state.log_event(
                    GameEvent::CountersRemoved {
                        entity: source,
                        kind: kind.clone(),
                        amount: *amount,
                    },
                    None,
                );
            }

            if ability.is_mana_ability() {
                let events = self.mana_events(state, &view, player, source, &ability.effects);
                let mut first = events;
                if cost.sacrifice_self {
                    first.push(ProposedEvent::leave_battlefield(source, ZoneKind::Graveyard));
                }
                log::trace!("{} activates mana ability {} of {}", player, request.index, source);
                begin_cycle(state, since, Some(Work::Commit(CommitQueue::new(first))), Some(player));
                return agenda::run(self, state, None);
            }

            let id = state.create_ability(player);
            state.push_stack_object(StackObject {
                id,
                controller: player,
                source,
                kind: StackObjectKind::Activated { index: request.index },
                effects: ability.effects.clone(),
                target_specs: ability.targets.clone(),
                targets: request.targets.clone(),
                x: request.x,
                triggering: None,
            });
            state.log_event(
                GameEvent::AbilityActivated {
                    ability: id,
                    source,
                    controller: player,
                },
                None,
            );
            log::debug!("{} activates ability {} of {} ({})", player, request.index, source, id);

            // The sacrifice is part of the cost: it commits, through replacement
            // effects, before anyone receives priority.
            let sacrifice = cost
                .sacrifice_self
                .then(|| Work::Commit(CommitQueue::new(vec![ProposedEvent::leave_battlefield(source, ZoneKind::Graveyard)])));
            begin_cycle(state, since, sacrifice, None);
            agenda::run(self, state, None)
        })
    }

    /// Events a mana ability produces. Mana abilities have no targets and
    /// never ask for choices.
    fn mana_events(
        &self,
        state: &GameState,
        view: &ProjectedView,
        player: PlayerId,
        source: EntityId,
        effects: &[crate::effects::Effect],
    ) -> Vec<ProposedEvent> {
        let ctx = ResolverContext {
            state,
            view,
            registry: &self.registry,
            controller: player,
            source,
            targets: &[],
            x: 0,
            triggering: None,
        };
        effects
            .iter()
            .flat_map(|effect| match resolve_effect(effect, &ctx) {
                EffectStep::Events(events) => events,
                _ => Vec::new(),
            })
            .collect()
    }

    /// Play a land from hand (a special action: no stack).
    pub fn play_land(&self, state: &mut GameState, player: PlayerId, card: EntityId) -> Result<()> {
        self.atomically(state, |state| {
            Self::ensure_priority(state, player)?;
            if state.zones().zone_of(card) != Some(ZoneKey::hand(player)) {
                return Err(RulesError::illegal(format!("{card} is not in {player}'s hand")));
            }
            let definition = self.definition_of(state, card)?;
            if !definition.is_land() {
                return Err(RulesError::illegal(format!("{} is not a land", definition.name)));
            }
            if !Self::sorcery_timing(state, player) {
                return Err(RulesError::illegal("lands are played in your main step with an empty stack"));
            }
            let player_id = EntityId::player(player);
            let drops = state.get::<LandDrops>(player_id).map_or(0, |drops| drops.0);
            if drops == 0 {
                return Err(RulesError::illegal(format!("{player} has no land drops left")));
            }
            state.set(player_id, LandDrops(drops - 1))?;

            let since = state.log().len();
            state.begin_batch();
            let moved = state.move_entity(card, ZoneKey::hand(player), ZoneKey::battlefield(), ZonePosition::Top)?;
            state.log_event(moved, None);
            log::debug!("{} plays {} ({})", player, definition.name, card);

            begin_cycle(state, since, None, None);
            agenda::run(self, state, None)
        })
    }

    /// Pass priority. When every remaining player has passed in
    /// succession the top object resolves, or the step ends.
    pub fn pass_priority(&self, state: &mut GameState, player: PlayerId) -> Result<()> {
        self.atomically(state, |state| {
            Self::ensure_priority(state, player)?;
            if priority::pass(state, player) == PassOutcome::AllPassed {
                let since = state.log().len();
                match state.top_of_stack() {
                    Some(top) => {
                        let object = state.stack_object(top).cloned().ok_or(RulesError::NoSuchEntity(top))?;
                        let frame = ResolutionFrame::new(object);
                        begin_cycle(state, since, Some(Work::Resolve(Box::new(frame))), None);
                    }
                    None => state.push_work(Work::AdvanceStep),
                }
                agenda::run(self, state, None)?;
            }
            Ok(())
        })
    }

    /// Answer the pending decision.
    pub fn respond(&self, state: &mut GameState, player: PlayerId, response: Response) -> Result<()> {
        self.atomically(state, |state| {
            if state.outcome().is_some() {
                return Err(RulesError::illegal("the game is over"));
            }
            let decision = state
                .pending_decision()
                .ok_or_else(|| RulesError::illegal("no decision is pending"))?;
            if decision.player != player {
                return Err(RulesError::illegal(format!("{} waits on {}", decision.id, decision.player)));
            }
            let chosen = decision.validate(&response)?;
            let decision = state
                .take_pending()
                .ok_or_else(|| RulesError::illegal("no decision is pending"))?;
            agenda::run(self, state, Some(Answer { decision, chosen }))
        })
    }

    /// Answer a pending attack declaration with (attacker, defender) pairs.
    pub fn declare_attackers(&self, state: &mut GameState, player: PlayerId, attacks: &[(EntityId, PlayerId)]) -> Result<()> {
        let wanted: Vec<DecisionOption> = attacks
            .iter()
            .map(|&(attacker, defender)| DecisionOption::Attack { attacker, defender })
            .collect();
        let response = Self::declaration(state, DecisionKind::DeclareAttackers, &wanted)?;
        self.respond(state, player, response)
    }

    /// Answer a pending block declaration with (blocker, attacker) pairs.
    pub fn declare_blockers(&self, state: &mut GameState, player: PlayerId, blocks: &[(EntityId, EntityId)]) -> Result<()> {
        let wanted: Vec<DecisionOption> = blocks
            .iter()
            .map(|&(blocker, attacker)| DecisionOption::Block { blocker, attacker })
            .collect();
        let response = Self::declaration(state, DecisionKind::DeclareBlockers, &wanted)?;
        self.respond(state, player, response)
    }

    fn declaration(state: &GameState, kind: DecisionKind, wanted: &[DecisionOption]) -> Result<Response> {
        let decision = state
            .pending_decision()
            .filter(|decision| decision.kind == kind)
            .ok_or_else(|| RulesError::illegal(format!("no {kind:?} decision is pending")))?;
        let indices = wanted
            .iter()
            .map(|option| {
                decision
                    .options
                    .iter()
                    .position(|offered| offered == option)
                    .ok_or_else(|| RulesError::InvalidResponse(format!("{option:?} is not a legal choice")))
            })
            .collect::<Result<Vec<usize>>>()?;
        Ok(Response::pick_many(decision.id, indices))
    }

    // === Enumeration ===

    /// Every combination of legal targets for `specs`, distinct per object.
    fn target_choices(specs: &[TargetSpec], ctx: &FilterContext) -> Vec<Targets> {
        let mut combinations = vec![Targets::new()];
        for spec in specs {
            let legal = legal_targets(spec, ctx);
            combinations = combinations
                .into_iter()
                .flat_map(|chosen| {
                    legal.iter().map(move |target| {
                        let mut next = chosen.clone();
                        next.push(*target);
                        next
                    })
                })
                .collect();
        }
        combinations
    }

    fn candidate_actions(&self, state: &GameState, player: PlayerId) -> Vec<PlayerAction> {
        let view = project(state, &self.registry);
        let mut candidates = Vec::new();

        for card in state.zones().contents(ZoneKey::hand(player)) {
            let Ok(definition) = self.definition_of(state, card) else {
                continue;
            };
            if definition.is_land() {
                candidates.push(PlayerAction::PlayLand(card));
                continue;
            }
            let ctx = FilterContext::new(state, view.characteristics(), player).with_source(card);
            for targets in Self::target_choices(&definition.spell_targets, &ctx) {
                let mut request = CastRequest::new(card);
                request.targets = targets;
                candidates.push(PlayerAction::CastSpell(request));
            }
        }

        for source in view.permanents_controlled_by(player) {
            let Some(definition) = view
                .get(source)
                .filter(|chars| !chars.abilities_removed)
                .and_then(|chars| chars.definition)
                .and_then(|card| self.registry.get(card))
            else {
                continue;
            };
            let ctx = FilterContext::new(state, view.characteristics(), player).with_source(source);
            for (index, ability) in definition.activated.iter().enumerate() {
                for targets in Self::target_choices(&ability.targets, &ctx) {
                    let mut request = ActivateRequest::new(source, index);
                    request.targets = targets;
                    candidates.push(PlayerAction::ActivateAbility(request));
                }
            }
        }
        candidates
    }
}

impl RulesEngine for Engine {
    fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Answers to the pending decision (for declarations: no creatures,
    /// or each single option), or every action that would succeed now.
    fn legal_actions(&self, state: &GameState, player: PlayerId) -> Vec<PlayerAction> {
        if state.outcome().is_some() {
            return Vec::new();
        }
        if let Some(decision) = state.pending_decision() {
            if decision.player != player {
                return Vec::new();
            }
            if decision.kind.takes_many() {
                return std::iter::once(Response::pick_many(decision.id, Vec::new()))
                    .chain((0..decision.options.len()).map(|index| Response::pick_many(decision.id, vec![index])))
                    .map(PlayerAction::Respond)
                    .collect();
            }
            return (0..decision.options.len())
                .map(|index| PlayerAction::Respond(Response::pick(decision.id, index)))
                .collect();
        }
        if state.turn().priority != Some(player) {
            return Vec::new();
        }

        let mut actions = vec![PlayerAction::PassPriority];
        for action in self.candidate_actions(state, player) {
            let mut trial = state.clone();
            if self.apply_action(&mut trial, player, action.clone()).is_ok() {
                actions.push(action);
            }
        }
        actions
    }

    fn apply_action(&self, state: &mut GameState, player: PlayerId, action: PlayerAction) -> Result<()> {
        match action {
            PlayerAction::PassPriority => self.pass_priority(state, player),
            PlayerAction::PlayLand(card) => self.play_land(state, player, card),
            PlayerAction::CastSpell(request) => self.cast_spell(state, player, request),
            PlayerAction::ActivateAbility(request) => self.activate_ability(state, player, request),
            PlayerAction::Respond(response) => self.respond(state, player, response),
        }
    }
}
