//! Particle physics shared by every effect
//!
//! One update routine covers explosions, fireworks and confetti. The per-effect
//! feel comes from per-particle fields (gravity, fade, wobble), not from
//! separate code paths.

use glam::Vec2;
use serde::Serialize;

use super::collision::Rect;
use super::scene::{NodeId, NodeProps};
use crate::consts::TICK_MS;

/// Alpha at or below this counts as fully faded (absorbs f32 drift)
pub const ALPHA_EPSILON: f32 = 1e-4;

/// How far past the screen edges a particle may travel before it is culled
pub const CULL_MARGIN: f32 = 50.0;

/// Particle outline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ParticleShape {
    Circle { radius: f32 },
    Rect { w: f32, h: f32 },
}

/// Sideways sway for falling particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wobble {
    /// Phase advance per millisecond
    pub speed: f32,
    /// Horizontal displacement amplitude per tick
    pub strength: f32,
    /// Current phase (starts at a random offset)
    pub phase: f32,
}

/// A single particle. Position is relative to its effect's group node.
#[derive(Debug, Clone)]
pub struct Particle {
    pub node: NodeId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub gravity: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub alpha: f32,
    pub fade_speed: f32,
    pub wobble: Option<Wobble>,
}

impl Particle {
    /// A still, unrotated particle at `pos`
    pub fn new(node: NodeId, pos: Vec2) -> Self {
        Self {
            node,
            pos,
            vel: Vec2::ZERO,
            gravity: 0.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            alpha: 1.0,
            fade_speed: 0.0,
            wobble: None,
        }
    }

    /// Advance one tick: velocity, gravity, spin, wobble, fade (in that order)
    pub fn step(&mut self) {
        self.pos += self.vel;
        self.vel.y += self.gravity;
        self.rotation += self.rotation_speed;
        if let Some(w) = self.wobble.as_mut() {
            w.phase += w.speed * TICK_MS;
            self.pos.x += w.phase.sin() * w.strength;
        }
        // Negative fade would make alpha grow
        self.alpha -= self.fade_speed.max(0.0);
    }

    pub fn is_faded(&self) -> bool {
        self.alpha <= ALPHA_EPSILON
    }

    /// Faded out, or left the screen (`origin` is the group's world position).
    ///
    /// Particles may fly above the top edge; they come back down.
    pub fn is_dead(&self, origin: Vec2, bounds: &Rect) -> bool {
        if self.is_faded() {
            return true;
        }
        let world = origin + self.pos;
        world.y > bounds.bottom() + CULL_MARGIN
            || world.x < bounds.left() - CULL_MARGIN
            || world.x > bounds.right() + CULL_MARGIN
    }

    pub fn props(&self) -> NodeProps {
        NodeProps {
            pos: self.pos,
            alpha: self.alpha.max(0.0),
            rotation: self.rotation,
            scale: 1.0,
        }
    }
}
