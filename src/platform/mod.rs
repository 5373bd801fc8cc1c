//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame timing (fixed-step accumulator)
//! - Keyboard input
//! - The wasm-bindgen bridge the JS renderer talks to

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, SceneGraph, TickInput, tick};
use crate::tuning::{Bounds, Tuning};

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Turns variable frame deltas into a whole number of fixed ticks
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
    last_time_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a `requestAnimationFrame` timestamp. The first call counts as one tick.
    pub fn advance_to(&mut self, time_ms: f64) -> u32 {
        let dt = match self.last_time_ms {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_time_ms = Some(time_ms);
        self.advance(dt)
    }

    /// Accumulate `dt` seconds and return how many ticks to run
    pub fn advance(&mut self, dt: f32) -> u32 {
        // Tab switches produce huge deltas; never try to catch up on them
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Fraction of a tick left in the accumulator (for render interpolation)
    pub fn alpha(&self) -> f32 {
        self.accumulator / SIM_DT
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Held keys mapped to tick input
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    left: bool,
    right: bool,
    jump: bool,
    /// One-shot, cleared after the next tick
    restart: bool,
    idle_mode: bool,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false for keys the game does not use
    pub fn key_down(&mut self, key: &str) -> bool {
        match key {
            "ArrowLeft" | "a" | "A" => self.left = true,
            "ArrowRight" | "d" | "D" => self.right = true,
            "ArrowUp" | "w" | "W" | " " => self.jump = true,
            "Enter" | "r" | "R" => self.restart = true,
            "i" | "I" => {
                self.idle_mode = !self.idle_mode;
                log::info!("Idle mode: {}", self.idle_mode);
            }
            _ => return false,
        }
        true
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        match key {
            "ArrowLeft" | "a" | "A" => self.left = false,
            "ArrowRight" | "d" | "D" => self.right = false,
            "ArrowUp" | "w" | "W" | " " => self.jump = false,
            _ => return false,
        }
        true
    }

    pub fn idle_mode(&self) -> bool {
        self.idle_mode
    }

    pub fn set_idle_mode(&mut self, on: bool) {
        self.idle_mode = on;
    }

    pub fn input(&self) -> TickInput {
        TickInput {
            left: self.left,
            right: self.right,
            jump: self.jump,
            restart: self.restart,
            idle_mode: self.idle_mode,
        }
    }

    fn consume_one_shots(&mut self) {
        self.restart = false;
    }
}

/// Owns a run plus its retained scene and drives it from frame timestamps
pub struct GameHost {
    pub state: GameState,
    pub scene: SceneGraph,
    pub clock: FrameClock,
    pub keys: KeyState,
}

impl GameHost {
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        log::info!(
            "New run: seed {} on a {}x{} screen",
            seed,
            tuning.bounds.width,
            tuning.bounds.height
        );
        Self {
            state: GameState::new(seed, tuning, settings),
            scene: SceneGraph::new(),
            clock: FrameClock::new(),
            keys: KeyState::new(),
        }
    }

    /// Run every tick owed for this frame; returns the tick count
    pub fn frame(&mut self, time_ms: f64) -> u32 {
        let steps = self.clock.advance_to(time_ms);
        for _ in 0..steps {
            self.step();
        }
        steps
    }

    /// Exactly one tick with the current keys
    pub fn step(&mut self) {
        let input = self.keys.input();
        tick(&mut self.state, &input, &mut self.scene);
        self.keys.consume_one_shots();
    }

    /// Forget the last frame timestamp so a long pause is not replayed
    pub fn resume(&mut self) {
        self.clock.reset();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.resize(Bounds { width, height });
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }
}
