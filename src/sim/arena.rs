//! Elliptical arena boundary
//!
//! Containment is tested in normalized ellipse coordinates, where the arena
//! becomes the unit circle. The soft wall (`containment_force`) nudges bodies
//! back before they ever reach the hard boundary (`is_outside`), so a hard exit
//! is always a deliberate ring-out or loss, never integration drift.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SessionError;

/// The arena ellipse, fixed for a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub center: Vec2,
    pub radius_x: f32,
    pub radius_y: f32,
}

impl Arena {
    /// Create an arena, rejecting non-positive or non-finite radii
    pub fn new(center: Vec2, radius_x: f32, radius_y: f32) -> Result<Self, SessionError> {
        let valid = |r: f32| r.is_finite() && r > 0.0;
        if !valid(radius_x) || !valid(radius_y) || !center.is_finite() {
            return Err(SessionError::InvalidArena { radius_x, radius_y });
        }
        Ok(Self {
            center,
            radius_x,
            radius_y,
        })
    }

    /// Arena sized to a viewport, centered in it
    pub fn for_viewport(width: f32, height: f32) -> Result<Self, SessionError> {
        Self::new(
            Vec2::new(width / 2.0, height / 2.0),
            width * ARENA_WIDTH_FRACTION / 2.0,
            height * ARENA_HEIGHT_FRACTION / 2.0,
        )
    }

    /// Point in normalized ellipse space (arena boundary is the unit circle)
    #[inline]
    pub fn normalized(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            (point.x - self.center.x) / self.radius_x,
            (point.y - self.center.y) / self.radius_y,
        )
    }

    /// Normalized squared distance from center (1.0 on the boundary)
    #[inline]
    pub fn normalized_distance_sq(&self, point: Vec2) -> f32 {
        self.normalized(point).length_squared()
    }

    /// True when the point lies strictly outside the ellipse (boundary counts as inside)
    #[inline]
    pub fn is_outside(&self, point: Vec2) -> bool {
        self.normalized_distance_sq(point) > 1.0
    }

    /// Soft-wall push toward center, zero inside `inner_threshold`
    ///
    /// The push grows with how far the normalized squared distance exceeds the
    /// threshold, clamped to `max_push`, then multiplied by `scale`.
    pub fn containment_force(
        &self,
        point: Vec2,
        inner_threshold: f32,
        max_push: f32,
        scale: f32,
    ) -> Vec2 {
        let n = self.normalized(point);
        let d = n.length_squared();
        if d <= inner_threshold {
            return Vec2::ZERO;
        }
        let push = (d - inner_threshold).min(max_push) * scale;
        let angle = n.y.atan2(n.x);
        -push * Vec2::new(angle.cos(), angle.sin())
    }

    /// Point on an axis anchor at `factor` of the radius from center
    pub fn anchor(&self, edge: Edge, factor: f32) -> Vec2 {
        let c = self.center;
        match edge {
            Edge::Top => Vec2::new(c.x, c.y - self.radius_y * factor),
            Edge::Right => Vec2::new(c.x + self.radius_x * factor, c.y),
            Edge::Bottom => Vec2::new(c.x, c.y + self.radius_y * factor),
            Edge::Left => Vec2::new(c.x - self.radius_x * factor, c.y),
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            center: Vec2::new(VIEW_WIDTH / 2.0, VIEW_HEIGHT / 2.0),
            radius_x: VIEW_WIDTH * ARENA_WIDTH_FRACTION / 2.0,
            radius_y: VIEW_HEIGHT * ARENA_HEIGHT_FRACTION / 2.0,
        }
    }
}

/// Cardinal spawn anchors (screen space, +y down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];
}
