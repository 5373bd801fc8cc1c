//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick per 60 Hz frame)
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies; display goes through [`Scene`]

pub mod collision;
pub mod effects;
pub mod obstacles;
pub mod particles;
pub mod scene;
pub mod schedule;
pub mod state;
pub mod tick;

pub use collision::{Inset, Rect, lands_on};
pub use effects::{Effect, EffectHandle, EffectKind, EffectSystem, ExplosionConfig, FlashConfig};
pub use obstacles::{AlienLook, Obstacle, ObstacleManager};
pub use particles::{Particle, ParticleShape, Wobble};
pub use scene::{NodeId, NodeProps, NodeSnapshot, Scene, SceneGraph, Sprite};
pub use schedule::Scheduler;
pub use state::{Coin, GameEvent, GamePhase, GameState, Player};
pub use tick::{TickInput, tick};

use rand::Rng;

/// Uniform in `[lo, hi)`, or `lo` when the range is empty
pub(crate) fn rand_in<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}
