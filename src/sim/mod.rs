//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod effects;
pub mod geometry;
pub mod slice;
pub mod spawn;
pub mod state;
pub mod tick;

pub use effects::{EffectTimer, Effects};
pub use geometry::distance_point_to_segment;
pub use slice::{PointerPath, SliceOutcome, handle_slice};
pub use spawn::{choose_kind, spawn_batch, spawn_fruit};
pub use state::{
    Fruit, FruitKind, GameEvent, GamePhase, Particle, SessionState, SpawnZone, Viewport,
};
pub use tick::tick;
