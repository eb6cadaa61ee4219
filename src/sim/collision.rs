//! Player/pursuer contact and its resolution
//!
//! The heart of the game: a moving player dominates, a slow one is
//! vulnerable. Contact is an explicit sum-of-radii check so this rule stays
//! authoritative regardless of any physics the host runs.

use glam::Vec2;

use super::state::{Body, Pursuer};
use crate::tuning::Tuning;

/// Result of a contact check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the bodies overlap
    pub hit: bool,
    /// Unit vector from the first body toward the second (zero if centers coincide)
    pub normal: Vec2,
    /// Overlap depth
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between two circular bodies
pub fn circle_contact(a: &Body, b: &Body) -> CollisionResult {
    let delta = b.pos - a.pos;
    let distance = delta.length();
    let reach = a.radius + b.radius;
    if distance >= reach {
        return CollisionResult::miss();
    }
    CollisionResult {
        hit: true,
        normal: delta.normalize_or_zero(),
        penetration: reach - distance,
    }
}

/// How a contact was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// No overlap, or the player was invulnerable; nothing changed
    Ignored,
    /// Player was fast enough: pursuer launched away
    Push,
    /// Player was too slow: both recoil and the round is lost
    Bump,
}

/// Impulses and offsets applied on contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactRule {
    /// Player speed must be strictly greater than this to push
    pub threshold: f32,
    pub launch_speed: f32,
    pub launch_spin: f32,
    pub push_recoil: f32,
    pub push_player_offset: f32,
    pub push_pursuer_offset: f32,
    pub bump_player_impulse: f32,
    pub bump_pursuer_impulse: f32,
    pub bump_separation: f32,
}

impl ImpactRule {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            threshold: tuning.impact_threshold,
            launch_speed: tuning.launch_speed,
            launch_spin: tuning.launch_spin,
            push_recoil: tuning.push_recoil,
            push_player_offset: tuning.push_player_offset,
            push_pursuer_offset: tuning.push_pursuer_offset,
            bump_player_impulse: tuning.bump_player_impulse,
            bump_pursuer_impulse: tuning.bump_pursuer_impulse,
            bump_separation: tuning.bump_separation,
        }
    }
}

/// Resolve an overlap between the player and a pursuer
///
/// `contact` is the player-to-pursuer result from [`circle_contact`]. The
/// outcome depends only on `invulnerable` and the player's speed. When the
/// centers coincide the contact normal is zero, so velocities and positions
/// are left untouched but the outcome still stands.
pub fn resolve_collision(
    player: &mut Body,
    invulnerable: bool,
    pursuer: &mut Pursuer,
    contact: &CollisionResult,
    rule: &ImpactRule,
) -> CollisionOutcome {
    if invulnerable || !contact.hit {
        return CollisionOutcome::Ignored;
    }

    let dir = contact.normal.try_normalize();
    let speed = player.speed();

    if speed > rule.threshold {
        if let Some(n) = dir {
            pursuer.body.vel = n * rule.launch_speed;
            pursuer.spin = rule.launch_spin;
            player.vel = -n * rule.push_recoil;
            player.pos -= n * rule.push_player_offset;
            pursuer.body.pos += n * rule.push_pursuer_offset;
        }
        CollisionOutcome::Push
    } else {
        // Bumped from the pursuer's side: player knocked on, pursuer recoils less
        if let Some(n) = dir {
            player.vel = n * rule.bump_player_impulse;
            pursuer.body.vel = -n * rule.bump_pursuer_impulse;
            player.pos += n * rule.bump_separation;
            pursuer.body.pos -= n * rule.bump_separation;
        }
        CollisionOutcome::Bump
    }
}
