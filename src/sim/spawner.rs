//! Pursuer spawning and difficulty escalation
//!
//! All cadence is deadline-driven: the spawner stores when its next spawn and
//! next escalation fall due, and `run_timers` fires whatever is due on the
//! current tick. Disarming clears every deadline at once.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arena::Edge;
use super::state::{Deadline, GameState, Pursuer};
use crate::secs_to_ticks;
use crate::tuning::Tuning;

/// Spawn and escalation timers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spawner {
    /// Opening pair (top and bottom)
    pub opening: Option<Deadline>,
    pub next_spawn: Option<Deadline>,
    pub next_escalation: Option<Deadline>,
    /// Escalation steps applied so far
    pub escalation_level: u32,
}

impl Spawner {
    /// Schedule the opening spawn and the first escalation
    pub fn arm(&mut self, now: u64, tuning: &Tuning) {
        self.opening = Some(Deadline::after_secs(now, tuning.spawn_delay_secs));
        self.next_spawn = None;
        self.next_escalation = Some(Deadline::after_secs(now, tuning.escalation_interval_secs));
    }

    pub fn disarm(&mut self) {
        self.opening = None;
        self.next_spawn = None;
        self.next_escalation = None;
    }

    pub fn is_armed(&self) -> bool {
        self.opening.is_some() || self.next_spawn.is_some() || self.next_escalation.is_some()
    }

    /// `min(1 + step * level, cap)`
    pub fn speed_multiplier(&self, tuning: &Tuning) -> f32 {
        (1.0 + tuning.escalation_step * self.escalation_level as f32)
            .min(tuning.speed_multiplier_cap)
    }

    /// Raise the speed multiplier one step unless already at the cap
    pub fn escalate(&mut self, tuning: &Tuning) -> f32 {
        if self.speed_multiplier(tuning) < tuning.speed_multiplier_cap {
            self.escalation_level += 1;
        }
        self.speed_multiplier(tuning)
    }
}

/// Spawn a pursuer at an edge anchor unless the pursuer cap is reached
///
/// Pursuers playing their removal effect still occupy a slot until they are
/// physically removed.
///
/// Scale is drawn uniformly; radius grows and chase speed shrinks with it, so
/// small pursuers are the fast ones.
pub fn try_spawn(state: &mut GameState, edge: Edge, edge_factor: f32) -> Option<&Pursuer> {
    if !state.is_active() || state.pursuer_count() >= state.tuning.max_pursuers {
        return None;
    }

    let t = &state.tuning;
    let (jitter, scale_min, scale_max) = (t.spawn_jitter, t.pursuer_scale_min, t.pursuer_scale_max);
    let (base_radius, base_speed) = (t.pursuer_radius, t.pursuer_base_speed);

    let mut pos = state.arena.anchor(edge, edge_factor);
    if jitter > 0.0 {
        pos += Vec2::new(
            state.rng.random_range(-jitter..=jitter) * state.arena.radius_x,
            state.rng.random_range(-jitter..=jitter) * state.arena.radius_y,
        );
    }
    let scale = if scale_max > scale_min {
        state.rng.random_range(scale_min..=scale_max)
    } else {
        scale_min
    };

    let id = state.next_entity_id();
    let mut pursuer = Pursuer::new(id, pos, base_radius * scale, base_speed * (2.0 - scale), scale);
    pursuer.body.rotation = state.rng.random_range(-0.2..=0.2);
    log::debug!(
        "Spawned pursuer {} at {:?} ({:?}, scale {:.2})",
        id,
        pos,
        edge,
        scale
    );
    state.pursuers.push(pursuer);
    state.pursuers.last()
}

/// Fire any spawn or escalation deadline that is due this tick
pub fn run_timers(state: &mut GameState) {
    let now = state.time_ticks;

    if state.spawner.opening.is_some_and(|d| d.is_due(now)) {
        state.spawner.opening = None;
        let factor = state.tuning.opening_edge_factor;
        try_spawn(state, Edge::Top, factor);
        try_spawn(state, Edge::Bottom, factor);
        let interval = state.tuning.spawn_interval_secs;
        state.spawner.next_spawn = Some(Deadline::after_secs(now, interval));
    }

    if state.spawner.next_spawn.is_some_and(|d| d.is_due(now)) {
        let edge = Edge::ALL[state.rng.random_range(0..Edge::ALL.len())];
        let factor = state.tuning.edge_factor;
        try_spawn(state, edge, factor);
        let interval = state.tuning.spawn_interval_secs;
        state.spawner.next_spawn = Some(Deadline::after_secs(now, interval));
    }

    if state.spawner.next_escalation.is_some_and(|d| d.is_due(now)) {
        let multiplier = state.spawner.escalate(&state.tuning);
        log::info!("Pursuer speed multiplier now {:.1}", multiplier);
        state.spawner.next_escalation = Some(Deadline::after(
            now,
            secs_to_ticks(state.tuning.escalation_interval_secs),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena::Arena;
    use proptest::prelude::*;

    fn active_state(tuning: Tuning) -> GameState {
        let mut state = GameState::new(42, Arena::default(), tuning, 0).unwrap();
        state.start();
        state
    }

    fn exact_tuning() -> Tuning {
        Tuning {
            spawn_jitter: 0.0,
            ..Tuning::default()
        }
    }

    #[test]
    fn test_spawn_at_top_anchor() {
        let mut state = active_state(exact_tuning());
        let pursuer = try_spawn(&mut state, Edge::Top, 0.9).unwrap();
        assert!((pursuer.body.pos.x - 195.0).abs() < 1e-3);
        assert!((pursuer.body.pos.y - (422.0 - 208.89)).abs() < 1e-2);
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut state = active_state(exact_tuning());
        for _ in 0..6 {
            assert!(try_spawn(&mut state, Edge::Left, 0.85).is_some());
        }
        assert!(try_spawn(&mut state, Edge::Left, 0.85).is_none());
        assert_eq!(state.pursuers.len(), 6);

        // A pursuer in its removal effect holds its slot until it is gone
        state.begin_removal(0);
        assert!(try_spawn(&mut state, Edge::Left, 0.85).is_none());
        let id = state.pursuers[0].id;
        assert!(state.finish_removal(id));
        assert!(try_spawn(&mut state, Edge::Left, 0.85).is_some());
    }

    #[test]
    fn test_spawn_requires_active_session() {
        let mut state = GameState::new(1, Arena::default(), Tuning::default(), 0).unwrap();
        assert!(try_spawn(&mut state, Edge::Top, 0.9).is_none());
    }

    #[test]
    fn test_smaller_pursuers_are_faster() {
        let mut state = active_state(exact_tuning());
        for _ in 0..6 {
            try_spawn(&mut state, Edge::Right, 0.85);
        }
        let mut by_size: Vec<_> = state
            .pursuers
            .iter()
            .map(|p| (p.body.radius, p.base_speed))
            .collect();
        by_size.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in by_size.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn test_opening_pair_then_interval() {
        let mut state = active_state(exact_tuning());
        state.time_ticks = 179;
        run_timers(&mut state);
        assert!(state.pursuers.is_empty());

        state.time_ticks = 180;
        run_timers(&mut state);
        assert_eq!(state.pursuers.len(), 2);
        assert!(state.pursuers[0].body.pos.y < state.arena.center.y);
        assert!(state.pursuers[1].body.pos.y > state.arena.center.y);

        state.time_ticks = 360;
        run_timers(&mut state);
        assert_eq!(state.pursuers.len(), 3);
    }

    #[test]
    fn test_escalation_on_schedule() {
        let mut state = active_state(exact_tuning());
        for n in 1..=8u64 {
            state.time_ticks = n * 900;
            run_timers(&mut state);
        }
        assert!((state.speed_multiplier() - 1.5).abs() < 1e-6);
        assert_eq!(state.spawner.escalation_level, 5);
    }

    #[test]
    fn test_disarmed_spawner_is_silent() {
        let mut state = active_state(exact_tuning());
        state.spawner.disarm();
        state.time_ticks = 10_000;
        run_timers(&mut state);
        assert!(state.pursuers.is_empty());
        assert_eq!(state.spawner.escalation_level, 0);
    }

    proptest! {
        #[test]
        fn prop_escalation_saturates(n in 0u32..40) {
            let tuning = Tuning::default();
            let mut spawner = Spawner::default();
            for _ in 0..n {
                spawner.escalate(&tuning);
            }
            let expected = (1.0 + 0.1 * n as f32).min(1.5);
            prop_assert!((spawner.speed_multiplier(&tuning) - expected).abs() < 1e-5);
        }
    }
}
