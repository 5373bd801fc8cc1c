//! Alien obstacles: spawning, motion, pruning and collision
//!
//! Aliens enter from the right edge and drift left at a constant speed while
//! bobbing vertically. The spawn interval shrinks by a fixed step after every
//! spawn down to a floor, which is the whole difficulty curve.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::collision::{Inset, Rect};
use super::rand_in;
use super::scene::{NodeId, NodeProps, Scene, Sprite};
use crate::ticks_to_ms;
use crate::tuning::{Bounds, ObstacleTuning};

/// Alien body colors (purple, green, red, orange)
pub const ALIEN_COLORS: [u32; 4] = [0x8E44AD, 0x27AE60, 0xE74C3C, 0xF39C12];

/// Cosmetic alien traits, rolled at spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlienLook {
    pub color: u32,
    pub size: f32,
    /// 1-3 teeth
    pub teeth: u8,
    /// 1-2 antennae
    pub antennae: u8,
}

impl AlienLook {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, size_min: u32, size_max: u32) -> Self {
        Self {
            color: ALIEN_COLORS[rng.random_range(0..ALIEN_COLORS.len())],
            size: rng.random_range(size_min..size_max.max(size_min + 1)) as f32,
            teeth: rng.random_range(1..=3),
            antennae: rng.random_range(1..=2),
        }
    }
}

/// A live alien
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub node: NodeId,
    /// Current (floated) center
    pub pos: Vec2,
    /// Center height the bob oscillates around
    pub base_y: f32,
    /// Horizontal velocity (negative, pixels per tick)
    pub vx: f32,
    pub float_speed: f32,
    pub float_phase: f32,
    pub look: AlienLook,
    half_extent: f32,
}

impl Obstacle {
    /// Hit box centered on the current floated position
    pub fn hit_box(&self) -> Rect {
        Rect::centered(self.pos, Vec2::splat(self.half_extent))
    }

    fn props(&self) -> NodeProps {
        NodeProps::at(self.pos)
    }
}

/// Owns every live alien and the spawn ramp
pub struct ObstacleManager {
    tuning: ObstacleTuning,
    obstacles: Vec<Obstacle>,
    spawn_timer: u32,
    spawn_interval: u32,
    spawned: u64,
}

impl ObstacleManager {
    pub fn new(tuning: ObstacleTuning) -> Self {
        let spawn_interval = tuning.initial_interval;
        Self {
            tuning,
            obstacles: Vec::new(),
            spawn_timer: 0,
            spawn_interval,
            spawned: 0,
        }
    }

    /// Live aliens in spawn order
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Current ticks between spawns
    pub fn spawn_interval(&self) -> u32 {
        self.spawn_interval
    }

    /// Aliens spawned since the last reset
    pub fn spawn_count(&self) -> u64 {
        self.spawned
    }

    /// Count down to the next spawn. Returns true if an alien spawned this tick.
    pub fn spawn_tick<R: Rng + ?Sized>(
        &mut self,
        scene: &mut dyn Scene,
        rng: &mut R,
        bounds: &Bounds,
    ) -> bool {
        self.spawn_timer += 1;
        if self.spawn_timer < self.spawn_interval {
            return false;
        }

        let t = &self.tuning;
        // A canvas shorter than the spawn band pins aliens to its top edge
        let y = rand_in(rng, t.spawn_top, bounds.height - t.spawn_bottom);
        let speed = rand_in(rng, t.speed_min, t.speed_max);
        let float_speed = rand_in(rng, t.float_speed_min, t.float_speed_max);
        let float_phase = rng.random_range(0.0..std::f32::consts::TAU);
        let look = AlienLook::random(rng, t.size_min, t.size_max);

        match self.spawn_at(scene, Vec2::new(bounds.width, y), -speed, look) {
            Some(o) => {
                o.float_speed = float_speed;
                o.float_phase = float_phase;
            }
            None => log::warn!("Scene refused alien node; spawn skipped"),
        }

        self.spawn_timer = 0;
        self.spawn_interval = self
            .spawn_interval
            .saturating_sub(self.tuning.interval_step)
            .max(self.tuning.min_interval);
        self.spawned += 1;

        log::debug!(
            "Alien spawned at y={:.0} vx={:.2}, next in {} ticks ({} live)",
            y,
            -speed,
            self.spawn_interval,
            self.obstacles.len()
        );
        true
    }

    /// Place an alien directly (spawn ramp untouched). `pos` is its center.
    pub fn spawn_at(
        &mut self,
        scene: &mut dyn Scene,
        pos: Vec2,
        vx: f32,
        look: AlienLook,
    ) -> Option<&mut Obstacle> {
        let node = scene.attach(NodeId::ROOT, Sprite::Alien(look), NodeProps::at(pos))?;
        self.obstacles.push(Obstacle {
            node,
            pos,
            base_y: pos.y,
            vx,
            float_speed: 0.0,
            float_phase: 0.0,
            look,
            half_extent: look.size * self.tuning.hitbox_scale,
        });
        self.obstacles.last_mut()
    }

    /// Move every alien: constant drift plus a bob driven by the global clock
    pub fn advance(&mut self, scene: &mut dyn Scene, now: u64) {
        let elapsed_ms = ticks_to_ms(now);
        let amplitude = self.tuning.float_amplitude;
        for o in &mut self.obstacles {
            o.pos.x += o.vx;
            o.pos.y = o.base_y + (elapsed_ms * o.float_speed + o.float_phase).sin() * amplitude;
            scene.set_props(o.node, o.props());
        }
    }

    /// Detach and drop aliens that have left through the left edge
    pub fn prune(&mut self, scene: &mut dyn Scene) -> usize {
        let margin = self.tuning.despawn_margin;
        let before = self.obstacles.len();
        self.obstacles.retain(|o| {
            if o.pos.x + margin < 0.0 {
                scene.detach(o.node);
                false
            } else {
                true
            }
        });
        before - self.obstacles.len()
    }

    /// One frame of obstacle work: spawn, move, prune
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        scene: &mut dyn Scene,
        rng: &mut R,
        bounds: &Bounds,
        now: u64,
    ) {
        self.spawn_tick(scene, rng, bounds);
        self.advance(scene, now);
        self.prune(scene);
    }

    /// Whether the inset player box overlaps any alien hit box
    pub fn test_collision(&self, player: &Rect, inset: &Inset) -> bool {
        let body = inset.apply(player);
        self.obstacles.iter().any(|o| body.overlaps(&o.hit_box()))
    }

    /// Remove every alien and restart the spawn ramp
    pub fn reset(&mut self, scene: &mut dyn Scene) {
        for o in self.obstacles.drain(..) {
            scene.detach(o.node);
        }
        self.spawn_timer = 0;
        self.spawn_interval = self.tuning.initial_interval;
        self.spawned = 0;
    }
}
