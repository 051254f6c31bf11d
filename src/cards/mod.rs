//! Card data: vocabulary, definitions and the registry.
//!
//! ## Key Types
//!
//! - `CardId`: identifier of a definition (not of a card in a game)
//! - `CardDefinition`: printed card data with abilities expressed as effects
//! - `CardRegistry`: lookup by id and by name
//! - `ManaCost`, `CardType`, `Keyword`, `CounterKind`: closed vocabulary the engine interprets

pub mod definition;
pub mod registry;
pub mod types;

pub use definition::{AbilityCost, ActivatedAbility, CardDefinition, CardId, TriggeredAbility};
pub use registry::CardRegistry;
pub use types::{CardType, Color, CounterKind, Keyword, ManaCost, ManaType, Supertype};
