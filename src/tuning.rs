//! Data-driven game balance
//!
//! Every gameplay constant lives here so a level designer can override it
//! with a JSON blob. Missing fields fall back to the defaults below.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::collision::{Inset, Rect};

/// Tuning load/validation failures
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field}: range [{min}, {max}) is empty or inverted")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("spawn interval floor {floor} must be in 1..={initial}")]
    SpawnFloor { floor: u32, initial: u32 },
    #[error("screen bounds must be positive, got {width}x{height}")]
    Bounds { width: f32, height: f32 },
}

/// Visible play area (read-only during a run)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Player movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub size: Vec2,
    /// Top-left spawn position
    pub start: Vec2,
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Vertical velocity applied on jump (negative is up)
    pub jump_force: f32,
    pub move_speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            size: Vec2::new(50.0, 50.0),
            start: Vec2::new(100.0, 300.0),
            gravity: 0.5,
            jump_force: -15.0,
            move_speed: 5.0,
        }
    }
}

/// Alien spawning and motion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    /// Ticks between spawns at the start of a run
    pub initial_interval: u32,
    /// Spawn interval never drops below this
    pub min_interval: u32,
    /// Interval reduction per spawn
    pub interval_step: u32,
    /// Leftward speed range (pixels per tick)
    pub speed_min: f32,
    pub speed_max: f32,
    /// Alien size range (whole pixels, max exclusive)
    pub size_min: u32,
    pub size_max: u32,
    /// Hit box half-extent as a fraction of size
    pub hitbox_scale: f32,
    /// Spawn band: y in `[spawn_top, height - spawn_bottom)`
    pub spawn_top: f32,
    pub spawn_bottom: f32,
    /// Vertical bob amplitude (pixels)
    pub float_amplitude: f32,
    /// Bob phase advance per elapsed millisecond
    pub float_speed_min: f32,
    pub float_speed_max: f32,
    /// Pruned once `x + despawn_margin < 0`
    pub despawn_margin: f32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            initial_interval: 120,
            min_interval: 60,
            interval_step: 1,
            speed_min: 3.0,
            speed_max: 5.0,
            size_min: 25,
            size_max: 35,
            hitbox_scale: 0.8,
            spawn_top: 100.0,
            spawn_bottom: 50.0,
            float_amplitude: 10.0,
            float_speed_min: 0.05,
            float_speed_max: 0.08,
            despawn_margin: 50.0,
        }
    }
}

/// Coin layout and pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinTuning {
    /// Hand-placed coins (centers)
    pub fixed: Vec<Vec2>,
    /// Extra coins scattered at random inside `random_area`
    pub random_count: usize,
    pub random_area: Rect,
    /// Pickup box half-extent around a coin center
    pub half_extent: f32,
    pub value: u32,
}

impl Default for CoinTuning {
    fn default() -> Self {
        Self {
            fixed: vec![
                Vec2::new(400.0, 400.0),
                Vec2::new(550.0, 300.0),
                Vec2::new(275.0, 200.0),
                Vec2::new(600.0, 150.0),
            ],
            random_count: 15,
            random_area: Rect::new(300.0, 100.0, 400.0, 300.0),
            half_extent: 10.0,
            value: 50,
        }
    }
}

/// Complete balance sheet for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub bounds: Bounds,
    pub player: PlayerTuning,
    pub ground_height: f32,
    pub platforms: Vec<Rect>,
    pub coins: CoinTuning,
    pub obstacles: ObstacleTuning,
    /// Player box inset used against alien hit boxes (forgiving)
    pub obstacle_inset: Inset,
    /// Player box inset used against coins (generous)
    pub coin_inset: Inset,
    pub survival_score_per_tick: f64,
    /// Delay before the game-over / victory screen appears
    pub end_screen_delay_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            player: PlayerTuning::default(),
            ground_height: 50.0,
            platforms: vec![
                Rect::new(300.0, 450.0, 200.0, 20.0),
                Rect::new(500.0, 350.0, 100.0, 20.0),
                Rect::new(200.0, 250.0, 150.0, 20.0),
                Rect::new(500.0, 200.0, 200.0, 20.0),
            ],
            coins: CoinTuning::default(),
            obstacles: ObstacleTuning::default(),
            obstacle_inset: Inset { near: 0.2, far: 0.8 },
            coin_inset: Inset::FULL,
            survival_score_per_tick: 0.1,
            end_screen_delay_ms: 2000.0,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON override
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Defaults resized to a canvas
    pub fn with_bounds(width: f32, height: f32) -> Self {
        Self {
            bounds: Bounds { width, height },
            ..Self::default()
        }
    }

    /// Tuning for a browser canvas: an optional JSON override resized to the
    /// canvas, then validated. Bad overrides fall back to the defaults, and a
    /// canvas too small for the defaults falls back to the default screen.
    pub fn for_canvas(width: f32, height: f32, json: Option<&str>) -> Self {
        if let Some(json) = json {
            let resized = Self::from_json(json).and_then(|mut tuning| {
                tuning.bounds = Bounds { width, height };
                tuning.validate().map(|_| tuning)
            });
            match resized {
                Ok(tuning) => return tuning,
                Err(e) => log::warn!("Ignoring tuning override: {}", e),
            }
        }

        let fitted = Self::with_bounds(width, height);
        match fitted.validate() {
            Ok(()) => fitted,
            Err(e) => {
                let fallback = Bounds::default();
                log::warn!(
                    "Canvas {}x{} rejected ({}), playing at {}x{}",
                    width,
                    height,
                    e,
                    fallback.width,
                    fallback.height
                );
                Self::default()
            }
        }
    }

    /// Total coins in a run
    pub fn total_coins(&self) -> usize {
        self.coins.fixed.len() + self.coins.random_count
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let b = self.bounds;
        if !(b.width > 0.0 && b.height > 0.0) {
            return Err(TuningError::Bounds {
                width: b.width,
                height: b.height,
            });
        }

        let o = &self.obstacles;
        if o.min_interval == 0 || o.min_interval > o.initial_interval {
            return Err(TuningError::SpawnFloor {
                floor: o.min_interval,
                initial: o.initial_interval,
            });
        }
        check_range("obstacles.speed", o.speed_min, o.speed_max)?;
        check_range("obstacles.size", o.size_min as f32, o.size_max as f32)?;
        check_range("obstacles.float_speed", o.float_speed_min, o.float_speed_max)?;
        check_range(
            "obstacles.spawn_band",
            o.spawn_top,
            b.height - o.spawn_bottom,
        )?;
        check_range("obstacle_inset", self.obstacle_inset.near, self.obstacle_inset.far)?;
        check_range("coin_inset", self.coin_inset.near, self.coin_inset.far)?;
        Ok(())
    }
}

fn check_range(field: &'static str, min: f32, max: f32) -> Result<(), TuningError> {
    if min < max {
        Ok(())
    } else {
        Err(TuningError::InvertedRange { field, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.total_coins(), 19);
    }

    #[test]
    fn test_partial_override() {
        let tuning =
            Tuning::from_json(r#"{"obstacles": {"initial_interval": 90}, "ground_height": 40}"#)
                .unwrap();
        assert_eq!(tuning.obstacles.initial_interval, 90);
        assert_eq!(tuning.obstacles.min_interval, 60);
        assert_eq!(tuning.ground_height, 40.0);
        assert_eq!(tuning.platforms.len(), 4);
    }

    #[test]
    fn test_bad_json() {
        let err = Tuning::from_json("{not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_floor_above_initial_rejected() {
        let err = Tuning::from_json(r#"{"obstacles": {"initial_interval": 30}}"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::SpawnFloor {
                floor: 60,
                initial: 30
            }
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = Tuning::from_json(r#"{"obstacles": {"speed_min": 6.0}}"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::InvertedRange {
                field: "obstacles.speed",
                ..
            }
        ));
        assert!(err.to_string().contains("obstacles.speed"));
    }

    #[test]
    fn test_for_canvas_resizes_override() {
        let tuning = Tuning::for_canvas(1024.0, 768.0, Some(r#"{"ground_height": 40}"#));
        assert_eq!(tuning.bounds, Bounds { width: 1024.0, height: 768.0 });
        assert_eq!(tuning.ground_height, 40.0);
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_for_canvas_always_valid() {
        // Bad override: defaults at the canvas size
        let tuning = Tuning::for_canvas(1024.0, 768.0, Some("{oops"));
        assert_eq!(tuning.bounds.width, 1024.0);
        assert_eq!(tuning.ground_height, 50.0);

        // Canvas shorter than the spawn band: default screen
        for json in [None, Some(r#"{"ground_height": 40}"#)] {
            let tuning = Tuning::for_canvas(800.0, 140.0, json);
            assert!(tuning.validate().is_ok());
            assert_eq!(tuning.bounds, Bounds::default());
        }
    }

    #[test]
    fn test_tiny_screen_rejected() {
        // Spawn band collapses on a 120px tall screen
        assert!(Tuning::with_bounds(800.0, 120.0).validate().is_err());
        assert!(Tuning::with_bounds(0.0, 600.0).validate().is_err());
    }
}
