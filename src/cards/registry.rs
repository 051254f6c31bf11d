//! Card registry for definition lookup.
//!
//! The `CardRegistry` stores all card definitions for a game and assigns
//! their ids. Lookup works by `CardId` (what entities carry) and by name
//! (what drivers and card data refer to).

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardId};

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use ccg_rules::cards::{CardDefinition, CardRegistry, CardType};
///
/// let mut registry = CardRegistry::new();
/// let id = registry.register(CardDefinition::new("Grizzly Bears").with_type(CardType::Creature));
///
/// assert_eq!(registry.get(id).unwrap().name, "Grizzly Bears");
/// assert_eq!(registry.id_of("Grizzly Bears"), Some(id));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, CardDefinition>,
    by_name: FxHashMap<String, CardId>,
    next_id: u32,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under a fresh id and return the id.
    ///
    /// A later definition with the same name takes over the name lookup;
    /// the earlier one stays reachable by id.
    pub fn register(&mut self, mut card: CardDefinition) -> CardId {
        let id = CardId::new(self.next_id);
        self.next_id += 1;

        card.id = id;
        self.by_name.insert(card.name.clone(), id);
        self.cards.insert(id, card);
        id
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    /// Get a card definition by name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&CardDefinition> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<CardId> {
        self.by_name.get(name).copied()
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        let mut cards: Vec<_> = self.cards.values().collect();
        cards.sort_by_key(|c| c.id);
        cards.into_iter()
    }
}
