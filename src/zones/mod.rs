//! Zone system for card locations.
//!
//! ## Key Types
//!
//! - `ZoneKind`: Library, Hand, Battlefield, Graveyard, Exile, Stack, Command
//! - `ZoneKey`: a zone kind plus its owner (per-player zones) or none (shared)
//! - `ZoneManager`: ordered contents and entity locations
//! - `ZonePosition`: position specifier for insertion

pub mod manager;

pub use manager::{ZoneKey, ZoneKind, ZoneManager, ZonePosition};
