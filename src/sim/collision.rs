//! Axis-aligned bounding box collision
//!
//! Everything in Alien Runner collides as rectangles: the player against
//! platforms, coins and aliens. Screen space has y pointing down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle centered on `center` with the given half extents
    pub fn centered(center: Vec2, half: Vec2) -> Self {
        Self {
            x: center.x - half.x,
            y: center.y - half.y,
            w: half.x * 2.0,
            h: half.y * 2.0,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Sub-rectangle spanning `[near, far]` of the width and height.
    ///
    /// `inset(0.2, 0.8)` keeps the middle 60% on both axes.
    pub fn inset(&self, near: f32, far: f32) -> Self {
        Self {
            x: self.x + self.w * near,
            y: self.y + self.h * near,
            w: self.w * (far - near),
            h: self.h * (far - near),
        }
    }

    /// Strict overlap on both axes (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.right() > other.left()
            && self.left() < other.right()
            && self.bottom() > other.top()
            && self.top() < other.bottom()
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }
}

/// Fractional inset applied to a box before overlap tests
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Inset {
    pub near: f32,
    pub far: f32,
}

impl Inset {
    /// No inset: the full box
    pub const FULL: Inset = Inset { near: 0.0, far: 1.0 };

    pub fn apply(&self, rect: &Rect) -> Rect {
        rect.inset(self.near, self.far)
    }
}

/// Whether a falling body lands on a platform this tick.
///
/// Requires horizontal overlap, the body's feet strictly inside the platform's
/// vertical span, and a non-negative vertical velocity (moving down or resting).
pub fn lands_on(body: &Rect, vel_y: f32, platform: &Rect) -> bool {
    vel_y >= 0.0
        && body.right() > platform.left()
        && body.left() < platform.right()
        && body.bottom() > platform.top()
        && body.bottom() < platform.bottom()
}
