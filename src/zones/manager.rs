//! Zone manager for card locations and movement.
//!
//! The `ZoneManager` tracks where every non-player entity is and keeps
//! each zone as an ordered sequence: index 0 is the bottom, the last
//! element is the top. Order is preserved in every zone, including the
//! battlefield, so that iteration is deterministic.
//!
//! Both maps are `im` persistent structures, so cloning the manager as
//! part of a `GameState` snapshot is O(1).

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameRng, PlayerId};

/// The seven zone kinds of the rulebook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Exile,
    Stack,
    Command,
}

impl ZoneKind {
    /// Library, hand and graveyard exist once per player.
    #[must_use]
    pub fn is_per_player(self) -> bool {
        matches!(self, ZoneKind::Library | ZoneKind::Hand | ZoneKind::Graveyard)
    }
}

/// A concrete zone: a kind plus its owner for per-player zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneKey {
    pub owner: Option<PlayerId>,
    pub kind: ZoneKind,
}

impl ZoneKey {
    /// A per-player zone.
    #[must_use]
    pub const fn owned(owner: PlayerId, kind: ZoneKind) -> Self {
        Self {
            owner: Some(owner),
            kind,
        }
    }

    /// A shared zone.
    #[must_use]
    pub const fn shared(kind: ZoneKind) -> Self {
        Self { owner: None, kind }
    }

    /// The zone of `kind` a card owned by `owner` would go to.
    #[must_use]
    pub fn for_owner(owner: PlayerId, kind: ZoneKind) -> Self {
        if kind.is_per_player() {
            Self::owned(owner, kind)
        } else {
            Self::shared(kind)
        }
    }

    #[must_use]
    pub const fn library(owner: PlayerId) -> Self {
        Self::owned(owner, ZoneKind::Library)
    }

    #[must_use]
    pub const fn hand(owner: PlayerId) -> Self {
        Self::owned(owner, ZoneKind::Hand)
    }

    #[must_use]
    pub const fn graveyard(owner: PlayerId) -> Self {
        Self::owned(owner, ZoneKind::Graveyard)
    }

    #[must_use]
    pub const fn battlefield() -> Self {
        Self::shared(ZoneKind::Battlefield)
    }

    #[must_use]
    pub const fn exile() -> Self {
        Self::shared(ZoneKind::Exile)
    }

    #[must_use]
    pub const fn stack() -> Self {
        Self::shared(ZoneKind::Stack)
    }

    /// Whether a card owned by `owner` may live in this zone.
    #[must_use]
    pub fn accepts_owner(self, owner: PlayerId) -> bool {
        match self.owner {
            Some(zone_owner) => self.kind.is_per_player() && zone_owner == owner,
            None => !self.kind.is_per_player(),
        }
    }
}

impl std::fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.owner {
            Some(owner) => write!(f, "{:?}({})", self.kind, owner),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

/// Position for inserting into an ordered zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Add to top of zone (e.g., top of library).
    Top,
    /// Add to bottom of zone.
    Bottom,
    /// Insert at specific index (0 = bottom).
    Index(usize),
}

/// Tracks card locations across zones.
///
/// ```
/// use ccg_rules::core::{EntityId, PlayerId};
/// use ccg_rules::zones::{ZoneKey, ZoneManager, ZonePosition};
///
/// let mut zones = ZoneManager::new();
/// let library = ZoneKey::library(PlayerId::new(0));
///
/// zones.insert(EntityId(10), library, ZonePosition::Top);
/// zones.insert(EntityId(11), library, ZonePosition::Bottom);
///
/// assert_eq!(zones.top(library), Some(EntityId(10)));
/// assert_eq!(zones.zone_of(EntityId(11)), Some(library));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneManager {
    /// entity -> zone
    locations: OrdMap<EntityId, ZoneKey>,

    /// zone -> ordered contents (bottom first)
    contents: OrdMap<ZoneKey, Vector<EntityId>>,
}

impl ZoneManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an untracked entity into a zone.
    ///
    /// Returns `false` (and changes nothing) if the entity is already tracked.
    pub fn insert(&mut self, entity: EntityId, zone: ZoneKey, position: ZonePosition) -> bool {
        if self.locations.contains_key(&entity) {
            return false;
        }
        self.locations.insert(entity, zone);
        let order = self.contents.entry(zone).or_insert_with(Vector::new);
        Self::place(order, entity, position);
        true
    }

    /// Move a tracked entity to another zone.
    ///
    /// Returns the old zone, or `None` if the entity is not tracked.
    pub fn move_to(&mut self, entity: EntityId, to: ZoneKey, position: ZonePosition) -> Option<ZoneKey> {
        let from = self.remove(entity)?;
        self.locations.insert(entity, to);
        let order = self.contents.entry(to).or_insert_with(Vector::new);
        Self::place(order, entity, position);
        Some(from)
    }

    /// Stop tracking an entity entirely.
    pub fn remove(&mut self, entity: EntityId) -> Option<ZoneKey> {
        let zone = self.locations.remove(&entity)?;
        if let Some(order) = self.contents.get_mut(&zone) {
            if let Some(index) = order.index_of(&entity) {
                order.remove(index);
            }
        }
        Some(zone)
    }

    fn place(order: &mut Vector<EntityId>, entity: EntityId, position: ZonePosition) {
        match position {
            ZonePosition::Top => order.push_back(entity),
            ZonePosition::Bottom => order.push_front(entity),
            ZonePosition::Index(i) => {
                let idx = i.min(order.len());
                order.insert(idx, entity);
            }
        }
    }

    #[must_use]
    pub fn zone_of(&self, entity: EntityId) -> Option<ZoneKey> {
        self.locations.get(&entity).copied()
    }

    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.locations.contains_key(&entity)
    }

    /// Entities in a zone, bottom to top.
    pub fn contents(&self, zone: ZoneKey) -> impl Iterator<Item = EntityId> + '_ {
        self.contents.get(&zone).into_iter().flat_map(|order| order.iter().copied())
    }

    /// Entities in every zone of a kind, ordered by zone key then position.
    pub fn contents_of_kind(&self, kind: ZoneKind) -> impl Iterator<Item = EntityId> + '_ {
        self.contents
            .iter()
            .filter(move |(key, _)| key.kind == kind)
            .flat_map(|(_, order)| order.iter().copied())
    }

    #[must_use]
    pub fn size(&self, zone: ZoneKey) -> usize {
        self.contents.get(&zone).map_or(0, Vector::len)
    }

    #[must_use]
    pub fn top(&self, zone: ZoneKey) -> Option<EntityId> {
        self.contents.get(&zone)?.last().copied()
    }

    /// Shuffle an ordered zone.
    pub fn shuffle(&mut self, zone: ZoneKey, rng: &mut GameRng) {
        if let Some(order) = self.contents.get_mut(&zone) {
            let mut cards: Vec<EntityId> = order.iter().copied().collect();
            rng.shuffle(&mut cards);
            *order = cards.into_iter().collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P0: PlayerId = PlayerId::new(0);

    #[test]
    fn test_zone_key_ownership() {
        assert!(ZoneKey::hand(P0).accepts_owner(P0));
        assert!(!ZoneKey::hand(P0).accepts_owner(PlayerId::new(1)));
        assert!(ZoneKey::battlefield().accepts_owner(P0));
        assert!(!ZoneKey::owned(P0, ZoneKind::Battlefield).accepts_owner(P0));
        assert_eq!(ZoneKey::for_owner(P0, ZoneKind::Exile), ZoneKey::exile());
        assert_eq!(ZoneKey::for_owner(P0, ZoneKind::Graveyard), ZoneKey::graveyard(P0));
    }

    #[test]
    fn test_ordered_insertion() {
        let mut zones = ZoneManager::new();
        let library = ZoneKey::library(P0);

        zones.insert(EntityId(10), library, ZonePosition::Top);
        zones.insert(EntityId(11), library, ZonePosition::Bottom);
        zones.insert(EntityId(12), library, ZonePosition::Top);
        zones.insert(EntityId(13), library, ZonePosition::Index(1));

        let order: Vec<_> = zones.contents(library).collect();
        assert_eq!(order, vec![EntityId(11), EntityId(13), EntityId(10), EntityId(12)]);
        assert_eq!(zones.top(library), Some(EntityId(12)));
    }

    #[test]
    fn test_move_between_zones() {
        let mut zones = ZoneManager::new();
        let hand = ZoneKey::hand(P0);

        zones.insert(EntityId(10), hand, ZonePosition::Top);
        let old = zones.move_to(EntityId(10), ZoneKey::battlefield(), ZonePosition::Top);

        assert_eq!(old, Some(hand));
        assert_eq!(zones.zone_of(EntityId(10)), Some(ZoneKey::battlefield()));
        assert_eq!(zones.size(hand), 0);
        assert_eq!(zones.size(ZoneKey::battlefield()), 1);
        assert_eq!(zones.move_to(EntityId(99), hand, ZonePosition::Top), None);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut zones = ZoneManager::new();
        assert!(zones.insert(EntityId(10), ZoneKey::exile(), ZonePosition::Top));
        assert!(!zones.insert(EntityId(10), ZoneKey::battlefield(), ZonePosition::Top));
        assert_eq!(zones.zone_of(EntityId(10)), Some(ZoneKey::exile()));
    }

    #[test]
    fn test_contents_of_kind_spans_owners() {
        let mut zones = ZoneManager::new();
        zones.insert(EntityId(20), ZoneKey::graveyard(PlayerId::new(1)), ZonePosition::Top);
        zones.insert(EntityId(21), ZoneKey::graveyard(P0), ZonePosition::Top);

        let all: Vec<_> = zones.contents_of_kind(ZoneKind::Graveyard).collect();
        assert_eq!(all, vec![EntityId(21), EntityId(20)]);
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let library = ZoneKey::library(P0);
        let build = || {
            let mut zones = ZoneManager::new();
            for i in 0..20 {
                zones.insert(EntityId(i), library, ZonePosition::Top);
            }
            zones
        };

        let mut a = build();
        let mut b = build();
        a.shuffle(library, &mut GameRng::new(3));
        b.shuffle(library, &mut GameRng::new(3));

        let before: Vec<_> = build().contents(library).collect();
        let after: Vec<_> = a.contents(library).collect();
        assert_ne!(before, after);
        assert_eq!(a, b);
    }
}
