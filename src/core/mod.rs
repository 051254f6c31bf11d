//! Core types: entities, players, components, the state store, actions,
//! turn structure, RNG and configuration.

pub mod action;
pub mod component;
pub mod config;
pub mod entity;
pub mod player;
pub mod rng;
pub mod state;
pub mod turn;

pub use action::{ActivateRequest, CastRequest, Payment, PlayerAction, Targets};
pub use component::{
    Attacking, AttachedTo, Blocked, Blocking, Component, ComponentKind, ComponentValue, Counters, Damage,
    DeathtouchDamage, DrewFromEmpty, EnteredAt, LandDrops, Life, LossReason, Lost, ManaPool, SummoningSick, Tapped,
    ThresholdsReached,
};
pub use config::GameConfig;
pub use entity::EntityId;
pub use player::PlayerId;
pub use rng::{GameRng, GameRngState};
pub use state::{EntityKind, EntityRecord, GameState};
pub use turn::{Step, TurnState};
