//! Fixed timestep simulation tick
//!
//! Core game loop that advances the session by one frame.

use glam::Vec2;

use super::collision::{CollisionOutcome, ImpactRule, circle_contact, resolve_collision};
use super::events::{EndReason, GameEvent, ImpactKind};
use super::spawner::run_timers;
use super::state::{Deadline, GamePhase, GameState};
use super::steering::{Steering, chase, decelerate, sample_jitter};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position if pressed or dragged since the last tick
    pub pointer: Option<Vec2>,
}

impl TickInput {
    /// Input from a pointer sample; a hover with nothing pressed does not steer
    pub fn from_pointer(pos: Vec2, pressed: bool) -> Self {
        Self {
            pointer: pressed.then_some(pos),
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Idle waits for `start`, Ended waits for a new session
    if !state.is_active() {
        return;
    }

    state.time_ticks += 1;

    expire_timers(state);
    run_timers(state);

    if !update_player(state, input, dt) {
        return;
    }
    if !update_pursuers(state, dt) {
        return;
    }

    state.sweep_removed();
    state.normalize_order();
}

/// Combo window, invulnerability and input-activity deadlines
fn expire_timers(state: &mut GameState) {
    let now = state.time_ticks;

    state.expire_combo();

    if state.player.invulnerable_until.is_some_and(|d| d.is_due(now)) {
        state.player.invulnerable = false;
        state.player.invulnerable_until = None;
        if state.phase == GamePhase::Entering {
            state.set_phase(GamePhase::Active);
        }
    }

    if state.player.input_until.is_some_and(|d| d.is_due(now)) {
        state.player.input_active = false;
        state.player.input_until = None;
    }
}

/// Steer, contain and move the player; false if the session ended
fn update_player(state: &mut GameState, input: &TickInput, dt: f32) -> bool {
    let now = state.time_ticks;
    let t = &state.tuning;
    let steering = Steering::from_tuning(t);
    let (jitter_amount, idle_damping, rest_speed, drag) =
        (t.steering_jitter, t.idle_damping, t.rest_speed, t.player_drag);
    let (threshold, max_push, scale) = (
        t.containment_threshold,
        t.containment_max_push,
        t.containment_scale,
    );
    let input_secs = t.input_active_secs;

    if let Some(target) = input.pointer {
        state.player.target = target;
        state.player.input_active = true;
        state.player.input_until = Some(Deadline::after_secs(now, input_secs));

        let jitter = sample_jitter(&mut state.rng, jitter_amount);
        if let Some(steer) = steering.steer_toward_target(&state.player.body, target, jitter) {
            state.player.body.vel = steer.velocity;
            state.player.body.rotation = steer.rotation;
        }
    } else if !state.player.input_active {
        state.player.body.vel = decelerate(state.player.body.vel, idle_damping, rest_speed);
    }

    let body = &mut state.player.body;
    body.vel += state.arena.containment_force(body.pos, threshold, max_push, scale);
    body.vel *= drag.powf(dt);
    body.integrate(dt);

    if !state.player.body.is_finite() {
        // Nothing sane to continue from; treat as leaving the arena
        log::warn!("Player motion became non-finite, ending session");
        state.end_session(EndReason::BoundaryExit);
        return false;
    }

    if !state.player.invulnerable && state.arena.is_outside(state.player.body.pos) {
        state.events.push(GameEvent::Impact(ImpactKind::BoundaryLoss));
        state.end_session(EndReason::BoundaryExit);
        return false;
    }
    true
}

/// Chase, ring-outs and contacts for every pursuer; false if the session ended
///
/// Each pursuer is processed independently: one that faults is dropped and
/// the rest still run this tick.
fn update_pursuers(state: &mut GameState, dt: f32) -> bool {
    let now = state.time_ticks;
    let multiplier = state.speed_multiplier();
    let rule = ImpactRule::from_tuning(&state.tuning);
    let (decay, knockback_secs, ring_out_points) = (
        state.tuning.pursuer_decay,
        state.tuning.knockback_secs,
        state.tuning.ring_out_points,
    );

    let mut faulted = Vec::new();

    for i in 0..state.pursuers.len() {
        if state.pursuers[i].removal.is_some() {
            continue;
        }

        let player_pos = state.player.body.pos;
        let pursuer = &mut state.pursuers[i];

        if pursuer.knockback_until.is_some_and(|d| d.is_due(now)) {
            pursuer.knockback_until = None;
        }
        if pursuer.knockback_until.is_some() {
            pursuer.body.vel *= decay;
            pursuer.spin *= decay;
        } else {
            pursuer.spin = 0.0;
            let speed = pursuer.base_speed * multiplier;
            if let Some(vel) = chase(pursuer.body.pos, player_pos, speed) {
                pursuer.body.vel = vel;
                pursuer.body.rotation = vel.y.atan2(vel.x);
            }
        }
        pursuer.body.integrate(dt);
        pursuer.body.rotation += pursuer.spin * dt;

        if !pursuer.body.is_finite() {
            log::warn!("Pursuer {} motion became non-finite, dropping it", pursuer.id);
            faulted.push(pursuer.id);
            continue;
        }

        let pos = pursuer.body.pos;
        if state.arena.is_outside(pos) {
            log::debug!("Pursuer {} rang out at {:?}", state.pursuers[i].id, pos);
            state.events.push(GameEvent::Impact(ImpactKind::RingOut));
            state.update_score(ring_out_points, pos);
            state.begin_removal(i);
            continue;
        }

        let contact = circle_contact(&state.player.body, &state.pursuers[i].body);
        if !contact.hit {
            continue;
        }
        log::debug!(
            "Contact with pursuer {} (depth {:.1})",
            state.pursuers[i].id,
            contact.penetration
        );

        let invulnerable = state.player.invulnerable;
        let outcome = resolve_collision(
            &mut state.player.body,
            invulnerable,
            &mut state.pursuers[i],
            &contact,
            &rule,
        );
        match outcome {
            CollisionOutcome::Ignored => {}
            CollisionOutcome::Push => {
                state.pursuers[i].knockback_until = Some(Deadline::after_secs(now, knockback_secs));
                state.events.push(GameEvent::Impact(ImpactKind::Push));
            }
            CollisionOutcome::Bump => {
                state.events.push(GameEvent::Impact(ImpactKind::Bump));
                state.end_session(EndReason::Bumped);
                return false;
            }
        }
    }

    if !faulted.is_empty() {
        state.pursuers.retain(|p| !faulted.contains(&p.id));
    }
    true
}
