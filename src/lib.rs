//! Alien Runner - a 2D platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (obstacles, particle effects, game loop)
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Player preferences
//! - `tuning`: Data-driven game balance

pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{QualityPreset, Settings};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Milliseconds per tick
    pub const TICK_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta fed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Convert a wall-clock delay to a whole number of ticks (rounded)
#[inline]
pub fn ms_to_ticks(ms: f32) -> u64 {
    (ms / consts::TICK_MS).round().max(0.0) as u64
}

/// Elapsed milliseconds represented by a tick count
#[inline]
pub fn ticks_to_ms(ticks: u64) -> f32 {
    ticks as f32 * consts::TICK_MS
}
