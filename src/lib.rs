//! # ccg-rules
//!
//! A rules-resolution core for a trading card game in the style of the
//! classic stack-and-priority games: continuous effects in layers, a
//! shared stack, triggered abilities, replacement effects and
//! state-based actions.
//!
//! ## Design Principles
//!
//! 1. **N-Player First**: Turn order, APNAP ordering and priority work for
//!    any number of players. Nothing assumes two.
//!
//! 2. **Data Over Code**: Cards are data (`CardDefinition`) built from a
//!    closed vocabulary of effects, conditions and modifications. The
//!    engine interprets them; there are no per-card callbacks.
//!
//! 3. **Deterministic**: Given the same seed and the same actions, a game
//!    produces the same state. The RNG state is part of `GameState`.
//!
//! ## Architecture
//!
//! - **Persistent State**: `GameState` is built on `im-rs` structures, so
//!   snapshots are O(1). Every action is atomic: on a rules error the
//!   state is exactly as before.
//!
//! - **Projection**: Current characteristics are never stored. They are
//!   computed on demand from printed values and the active continuous
//!   effects (`layers::project`).
//!
//! - **Resumable Work**: After an action the engine runs queued work until
//!   it needs a player's choice. The pending decision and the queue live in
//!   the state; `Engine::respond` resumes exactly where it stopped.
//!
//! ## Modules
//!
//! - `core`: Entity ids, players, components, state, turn, actions, config
//! - `zones`: Libraries, hands, graveyards, battlefield, stack, exile
//! - `cards`: Card definitions and the registry
//! - `layers`: Continuous effects and characteristic projection
//! - `effects`: One-shot effects, targeting and effect resolution
//! - `triggers`: Game events and triggered ability detection
//! - `replacement`: Replacement and prevention effects
//! - `decision`: Player decisions and responses
//! - `rules`: State-based actions, combat and the `RulesEngine` trait
//! - `stack`: The stack, priority, steps and the `Engine` driver

pub mod error;
pub mod core;
pub mod zones;
pub mod cards;
pub mod layers;
pub mod effects;
pub mod triggers;
pub mod replacement;
pub mod decision;
pub mod rules;
pub mod stack;

// Re-export commonly used types
pub use crate::error::{Result, RulesError};

pub use crate::core::{
    ActivateRequest, CastRequest, EntityId, GameConfig, GameState, Payment, PlayerAction, PlayerId, Step, Targets,
};

pub use crate::zones::{ZoneKey, ZoneKind, ZonePosition};

pub use crate::cards::{CardDefinition, CardId, CardRegistry, CardType, Color, CounterKind, Keyword, ManaCost, ManaType};

pub use crate::layers::{project, Characteristics, ContinuousEffect, Duration, Modification, ProjectedView};

pub use crate::effects::{Effect, EffectTarget, TargetFilter, TargetSpec};

pub use crate::triggers::{GameEvent, LoggedEvent, ProposedEvent, TriggerCondition};

pub use crate::replacement::ReplacementEffect;

pub use crate::decision::{Decision, DecisionKind, DecisionOption, Response};

pub use crate::rules::{GameOutcome, RulesEngine};

pub use crate::stack::{Engine, StackObject, StackObjectKind};
