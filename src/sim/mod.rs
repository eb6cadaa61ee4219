//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - Timers are tick deadlines, never callbacks
//! - No rendering or platform dependencies

pub mod arena;
pub mod collision;
pub mod events;
pub mod spawner;
pub mod state;
pub mod steering;
pub mod tick;

pub use arena::{Arena, Edge};
pub use collision::{
    CollisionOutcome, CollisionResult, ImpactRule, circle_contact, resolve_collision,
};
pub use events::{EndReason, GameEvent, ImpactKind, Presenter, dispatch_all};
pub use spawner::{Spawner, try_spawn};
pub use state::{Body, Deadline, Entity, GamePhase, GameState, Player, Pursuer};
pub use steering::{Steer, Steering, chase, decelerate, sample_jitter, turn_toward};
pub use tick::{TickInput, tick};
