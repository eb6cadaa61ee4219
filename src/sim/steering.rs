//! Steering for the player and pursuers
//!
//! The player eases toward its pointer target with exponential smoothing
//! (`v' = v + (target_v - v) * blend`), so motion builds up and bleeds off
//! instead of snapping. Pursuers steer directly at the player.

use glam::Vec2;
use rand::Rng;

use super::state::Body;
use crate::normalize_angle;
use crate::tuning::Tuning;

/// Player steering parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    pub max_speed: f32,
    pub blend_factor: f32,
    pub movement_threshold: f32,
    pub rotation_speed: f32,
}

impl Steering {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            max_speed: tuning.player_speed,
            blend_factor: tuning.blend_factor,
            movement_threshold: tuning.movement_threshold,
            rotation_speed: tuning.rotation_speed,
        }
    }

    /// Blend a body's velocity toward `target` at full speed
    ///
    /// `jitter` is added to the unit direction before scaling (see
    /// [`sample_jitter`]). Returns `None` when the target is within the movement
    /// threshold, in which case velocity and facing are left alone.
    pub fn steer_toward_target(&self, body: &Body, target: Vec2, jitter: Vec2) -> Option<Steer> {
        let delta = target - body.pos;
        let distance = delta.length();
        if distance <= self.movement_threshold {
            return None;
        }

        let dir = delta / distance;
        let target_vel = (dir + jitter) * self.max_speed;
        let velocity = body.vel + (target_vel - body.vel) * self.blend_factor;
        let rotation = turn_toward(body.rotation, delta.y.atan2(delta.x), self.rotation_speed);

        Some(Steer { velocity, rotation })
    }
}

/// Result of one steering step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steer {
    pub velocity: Vec2,
    pub rotation: f32,
}

/// Random per-axis perturbation in `[-amount, amount]`
pub fn sample_jitter<R: Rng + ?Sized>(rng: &mut R, amount: f32) -> Vec2 {
    if amount <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        rng.random_range(-amount..=amount),
        rng.random_range(-amount..=amount),
    )
}

/// Rotate `current` toward `target` by a fraction of the shortest angular gap
#[inline]
pub fn turn_toward(current: f32, target: f32, fraction: f32) -> f32 {
    let diff = normalize_angle(target - current);
    current + diff * fraction
}

/// Velocity that heads straight from `from` to `to` at `speed`
///
/// Returns `None` when the two positions coincide; callers keep the prior
/// velocity.
#[inline]
pub fn chase(from: Vec2, to: Vec2, speed: f32) -> Option<Vec2> {
    let dir = (to - from).try_normalize()?;
    Some(dir * speed)
}

/// Passive slowdown applied while the player has no active input
pub fn decelerate(vel: Vec2, damping: f32, rest_speed: f32) -> Vec2 {
    let vel = vel * damping;
    if vel.x.abs() < rest_speed && vel.y.abs() < rest_speed {
        Vec2::ZERO
    } else {
        vel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::PI;

    fn steering() -> Steering {
        Steering::from_tuning(&Tuning::default())
    }

    fn body_at(pos: Vec2) -> Body {
        Body::new(pos, 10.0)
    }

    #[test]
    fn test_steer_within_threshold_is_noop() {
        let body = body_at(Vec2::new(100.0, 100.0));
        assert!(
            steering()
                .steer_toward_target(&body, Vec2::new(103.0, 100.0), Vec2::ZERO)
                .is_none()
        );
    }

    #[test]
    fn test_steer_converges_monotonically() {
        let s = steering();
        let mut body = body_at(Vec2::ZERO);
        let target = Vec2::new(500.0, 0.0);
        let mut last_speed = 0.0;
        for _ in 0..200 {
            let steer = s.steer_toward_target(&body, target, Vec2::ZERO).unwrap();
            body.vel = steer.velocity;
            let speed = body.vel.length();
            assert!(speed >= last_speed);
            assert!(speed <= s.max_speed + 1e-3);
            last_speed = speed;
        }
        assert!((body.vel - Vec2::new(s.max_speed, 0.0)).length() < 0.5);
    }

    #[test]
    fn test_steer_blend_is_partial() {
        let s = steering();
        let body = body_at(Vec2::ZERO);
        let steer = s
            .steer_toward_target(&body, Vec2::new(0.0, 100.0), Vec2::ZERO)
            .unwrap();
        assert!((steer.velocity.y - s.max_speed * s.blend_factor).abs() < 1e-3);
        // Facing turns only part of the way to +y
        assert!((steer.rotation - PI / 2.0 * s.rotation_speed).abs() < 1e-4);
    }

    #[test]
    fn test_turn_toward_takes_short_way() {
        // From just below +π to just above -π is a small positive turn
        let r = turn_toward(3.0, -3.0, 1.0);
        assert!((r - (3.0 + (2.0 * PI - 6.0))).abs() < 1e-4);
        let r = turn_toward(0.0, 1.0, 0.5);
        assert!((r - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_jitter_is_bounded() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let j = sample_jitter(&mut rng, 0.05);
            assert!(j.x.abs() <= 0.05 && j.y.abs() <= 0.05);
        }
        assert_eq!(sample_jitter(&mut rng, 0.0), Vec2::ZERO);
    }

    #[test]
    fn test_chase_direction_and_speed() {
        let v = chase(Vec2::new(0.0, -100.0), Vec2::ZERO, 100.0).unwrap();
        assert!((v - Vec2::new(0.0, 100.0)).length() < 1e-4);
        assert!(chase(Vec2::ONE, Vec2::ONE, 100.0).is_none());
    }

    #[test]
    fn test_decelerate_snaps_to_rest() {
        let v = decelerate(Vec2::new(100.0, 0.0), 0.95, 5.0);
        assert!((v.x - 95.0).abs() < 1e-4);
        assert_eq!(decelerate(Vec2::new(5.0, -4.0), 0.95, 5.0), Vec2::ZERO);
        // Only snaps when both axes are slow
        assert_ne!(decelerate(Vec2::new(3.0, 40.0), 0.95, 5.0), Vec2::ZERO);
    }
}
