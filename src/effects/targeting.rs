//! Effect targeting and legality.
//!
//! - `TargetFilter`: predicate over players and objects
//! - `TargetSpec`: one target slot (a filter plus the zone it searches)
//! - `FilterContext`: what a filter is evaluated against
//!
//! Filters read characteristics from a projected characteristics map, never
//! from card definitions directly, so layer effects (type changes,
//! granted keywords, control changes) are always respected. The same
//! checks run when targets are declared and again on resolution.

use serde::{Deserialize, Serialize};

use crate::cards::{CardType, Color, Keyword, Supertype};
use crate::core::{Attacking, EntityId, GameState, PlayerId, Tapped};
use crate::error::{Result, RulesError};
use crate::layers::{Characteristics, CharacteristicsMap};
use crate::zones::{ZoneKey, ZoneKind};

/// Filters for players and objects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFilter {
    /// Any player or object.
    Any,

    // === Player Filters ===
    Player,
    Opponent,
    You,

    // === Object Filters ===
    /// Any card or token (no further restriction).
    Object,
    Creature,
    CardType(CardType),
    Subtype(String),
    Supertype(Supertype),
    Colored(Color),
    HasKeyword(Keyword),
    ControlledByYou,
    ControlledByOpponent,
    Tapped,
    Untapped,
    Attacking,
    /// Not the source itself.
    Other,
    PowerAtMost(i32),

    // === Combinators ===
    And(Vec<TargetFilter>),
    Or(Vec<TargetFilter>),
    Not(Box<TargetFilter>),
}

impl TargetFilter {
    /// "creature or player".
    pub fn any_target() -> Self {
        TargetFilter::Or(vec![TargetFilter::Creature, TargetFilter::Player])
    }

    /// Combine with another filter.
    #[must_use]
    pub fn and(self, other: TargetFilter) -> Self {
        match self {
            TargetFilter::And(mut filters) => {
                filters.push(other);
                TargetFilter::And(filters)
            }
            _ => TargetFilter::And(vec![self, other]),
        }
    }

    /// Check whether `entity` passes this filter.
    pub fn matches(&self, entity: EntityId, ctx: &FilterContext) -> bool {
        let player_count = ctx.state.player_count();
        if let Some(player) = entity.as_player(player_count) {
            return self.matches_player(player, ctx);
        }
        match ctx.chars.get(&entity) {
            Some(chars) => self.matches_object(entity, chars, ctx),
            None => false,
        }
    }

    fn matches_player(&self, player: PlayerId, ctx: &FilterContext) -> bool {
        if ctx.state.has_lost(player) {
            return false;
        }
        match self {
            TargetFilter::Any | TargetFilter::Player => true,
            TargetFilter::Opponent => player != ctx.controller,
            TargetFilter::You => player == ctx.controller,
            TargetFilter::Other => Some(EntityId::player(player)) != ctx.source,
            TargetFilter::And(filters) => filters.iter().all(|f| f.matches_player(player, ctx)),
            TargetFilter::Or(filters) => filters.iter().any(|f| f.matches_player(player, ctx)),
            TargetFilter::Not(inner) => !inner.matches_player(player, ctx),
            _ => false,
        }
    }

    fn matches_object(&self, entity: EntityId, chars: &Characteristics, ctx: &FilterContext) -> bool {
        match self {
            TargetFilter::Any | TargetFilter::Object => true,
            TargetFilter::Player | TargetFilter::Opponent | TargetFilter::You => false,
            TargetFilter::Creature => chars.is_creature(),
            TargetFilter::CardType(card_type) => chars.card_types.contains(card_type),
            TargetFilter::Subtype(word) => chars.subtypes.contains(ctx.word(word)),
            TargetFilter::Supertype(supertype) => chars.supertypes.contains(supertype),
            TargetFilter::Colored(color) => chars.colors.contains(color),
            TargetFilter::HasKeyword(keyword) => chars.keywords.contains(keyword),
            TargetFilter::ControlledByYou => chars.controller == ctx.controller,
            TargetFilter::ControlledByOpponent => chars.controller != ctx.controller,
            TargetFilter::Tapped => ctx.state.has::<Tapped>(entity),
            TargetFilter::Untapped => !ctx.state.has::<Tapped>(entity),
            TargetFilter::Attacking => ctx.state.has::<Attacking>(entity),
            TargetFilter::Other => Some(entity) != ctx.source,
            TargetFilter::PowerAtMost(max) => chars.power.is_some_and(|p| p <= *max),
            TargetFilter::And(filters) => filters.iter().all(|f| f.matches_object(entity, chars, ctx)),
            TargetFilter::Or(filters) => filters.iter().any(|f| f.matches_object(entity, chars, ctx)),
            TargetFilter::Not(inner) => !inner.matches_object(entity, chars, ctx),
        }
    }
}

/// One target slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub filter: TargetFilter,
    /// Zone searched for object targets. Players are always candidates.
    pub zone: ZoneKind,
}

impl TargetSpec {
    /// Target a permanent (or player) matching `filter`.
    pub fn new(filter: TargetFilter) -> Self {
        Self {
            filter,
            zone: ZoneKind::Battlefield,
        }
    }

    /// "any target": a creature or a player.
    pub fn any_target() -> Self {
        Self::new(TargetFilter::any_target())
    }

    pub fn creature() -> Self {
        Self::new(TargetFilter::Creature)
    }

    pub fn player() -> Self {
        Self::new(TargetFilter::Player)
    }

    /// Target a spell on the stack.
    pub fn spell() -> Self {
        Self {
            filter: TargetFilter::Object,
            zone: ZoneKind::Stack,
        }
    }
}

/// What a filter is evaluated against.
pub struct FilterContext<'a> {
    pub state: &'a GameState,
    pub chars: &'a CharacteristicsMap,
    /// The player "you" refers to.
    pub controller: PlayerId,
    /// The object whose ability is asking.
    pub source: Option<EntityId>,
}

impl<'a> FilterContext<'a> {
    pub fn new(state: &'a GameState, chars: &'a CharacteristicsMap, controller: PlayerId) -> Self {
        Self {
            state,
            chars,
            controller,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    /// Apply the source's text-changing effects to a subtype word.
    fn word<'w>(&'w self, word: &'w String) -> &'w String {
        self.source
            .and_then(|source| self.chars.get(&source))
            .and_then(|chars| chars.text_changes.get(word))
            .unwrap_or(word)
    }
}

/// All legal choices for a target slot, in id order.
pub fn legal_targets(spec: &TargetSpec, ctx: &FilterContext) -> Vec<EntityId> {
    let players = PlayerId::all(ctx.state.player_count()).map(EntityId::player);
    let objects = ctx.state.zones().contents_of_kind(spec.zone);
    let mut targets: Vec<EntityId> = players
        .chain(objects)
        .filter(|&entity| check_target(spec, entity, ctx).is_ok())
        .collect();
    targets.sort();
    targets
}

/// Check a single target against its slot.
pub fn check_target(spec: &TargetSpec, target: EntityId, ctx: &FilterContext) -> Result<()> {
    let is_player = target.is_player(ctx.state.player_count());
    if !is_player {
        let zone = ctx.state.zones().zone_of(target);
        if zone.map(|z| z.kind) != Some(spec.zone) {
            return Err(RulesError::illegal_target(target, format!("not in {:?}", spec.zone)));
        }
        if spec.zone == ZoneKind::Stack && !ctx.state.is_spell(target) {
            return Err(RulesError::illegal_target(target, "not a spell"));
        }
    }
    if !spec.filter.matches(target, ctx) {
        return Err(RulesError::illegal_target(target, "does not match the target filter"));
    }
    if let Some(chars) = ctx.chars.get(&target) {
        if zone_is_battlefield(ctx.state, target)
            && chars.keywords.contains(&Keyword::Hexproof)
            && chars.controller != ctx.controller
        {
            return Err(RulesError::illegal_target(target, "hexproof"));
        }
    }
    Ok(())
}

fn zone_is_battlefield(state: &GameState, entity: EntityId) -> bool {
    state.zones().zone_of(entity) == Some(ZoneKey::battlefield())
}
