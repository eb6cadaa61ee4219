//! Game state and core simulation types
//!
//! `GameState` is the session: it owns the player, the pursuer collection,
//! the spawner and every gameplay timer. Nothing else holds a mutable
//! reference to the pursuers.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::events::{EndReason, GameEvent};
use super::spawner::Spawner;
use crate::error::SessionError;
use crate::secs_to_ticks;
use crate::tuning::Tuning;

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Session built, round not started
    Idle,
    /// Invulnerable grace period
    Entering,
    /// Normal play
    Active,
    /// Terminal; only a fresh session restarts play
    Ended,
}

/// A tick deadline: fires once `now >= scheduled_at + duration`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub scheduled_at: u64,
    pub duration: u64,
}

impl Deadline {
    pub fn after(now: u64, duration: u64) -> Self {
        Self {
            scheduled_at: now,
            duration,
        }
    }

    pub fn after_secs(now: u64, secs: f32) -> Self {
        Self::after(now, secs_to_ticks(secs))
    }

    #[inline]
    pub fn due_at(&self) -> u64 {
        self.scheduled_at.saturating_add(self.duration)
    }

    #[inline]
    pub fn is_due(&self, now: u64) -> bool {
        now >= self.due_at()
    }
}

/// Kinematic data shared by every entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Facing (radians)
    pub rotation: f32,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            rotation: 0.0,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// False once a NaN or infinity has crept into the motion state
    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite() && self.rotation.is_finite()
    }
}

/// Read-only view a presentation adapter needs to draw an entity
pub trait Entity {
    fn body(&self) -> &Body;
    /// Removal in progress: drawn, but never stepped, collided or scored
    fn is_removing(&self) -> bool {
        false
    }
}

/// The pointer-controlled player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    /// Last pointer position
    pub target: Vec2,
    /// Pointer pressed or dragged recently
    pub input_active: bool,
    pub input_until: Option<Deadline>,
    pub invulnerable: bool,
    pub invulnerable_until: Option<Deadline>,
}

impl Player {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            body: Body::new(pos, radius),
            target: pos,
            input_active: false,
            input_until: None,
            invulnerable: false,
            invulnerable_until: None,
        }
    }
}

impl Entity for Player {
    fn body(&self) -> &Body {
        &self.body
    }
}

/// A chasing enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pursuer {
    pub id: u32,
    pub body: Body,
    /// Chase speed before the session speed multiplier
    pub base_speed: f32,
    /// Size relative to the base pursuer radius
    pub scale: f32,
    /// Cosmetic angular velocity (radians/s)
    pub spin: f32,
    /// Coasting after a push; chase steering resumes when due
    pub knockback_until: Option<Deadline>,
    /// Set when removal starts; physically removed when due
    pub removal: Option<Deadline>,
}

impl Pursuer {
    pub fn new(id: u32, pos: Vec2, radius: f32, base_speed: f32, scale: f32) -> Self {
        Self {
            id,
            body: Body::new(pos, radius),
            base_speed,
            scale,
            spin: 0.0,
            knockback_until: None,
            removal: None,
        }
    }
}

impl Entity for Pursuer {
    fn body(&self) -> &Body {
        &self.body
    }

    fn is_removing(&self) -> bool {
        self.removal.is_some()
    }
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub arena: Arena,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub score: u64,
    /// Consecutive scoring events inside the combo window
    pub combo: u32,
    pub combo_until: Option<Deadline>,
    pub last_scored_tick: Option<u64>,
    /// Vestigial: no gameplay path spends lives (see `lose_life`)
    pub lives: u8,
    /// Best score known when the session started, raised on a new record
    pub high_score: u64,
    pub end_reason: Option<EndReason>,
    pub spawner: Spawner,
    pub player: Player,
    /// Live pursuers (sorted by id)
    pub pursuers: Vec<Pursuer>,
    /// Events produced since the host last drained them
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a session in `Idle` with the player at the arena center
    pub fn new(
        seed: u64,
        arena: Arena,
        tuning: Tuning,
        high_score: u64,
    ) -> Result<Self, SessionError> {
        let arena = Arena::new(arena.center, arena.radius_x, arena.radius_y)?;
        let player = Player::new(arena.center, tuning.player_radius);
        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            arena,
            phase: GamePhase::Idle,
            time_ticks: 0,
            score: 0,
            combo: 0,
            combo_until: None,
            last_scored_tick: None,
            lives: tuning.starting_lives,
            high_score,
            end_reason: None,
            spawner: Spawner::default(),
            player,
            pursuers: Vec::new(),
            events: Vec::new(),
            next_id: 1,
            tuning,
        })
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// True while ticks advance the simulation
    pub fn is_active(&self) -> bool {
        matches!(self.phase, GamePhase::Entering | GamePhase::Active)
    }

    /// Begin the round: grace period, then spawning and escalation
    pub fn start(&mut self) {
        if self.phase != GamePhase::Idle {
            log::warn!("start ignored in phase {:?}", self.phase);
            return;
        }
        self.spawner.arm(self.time_ticks, &self.tuning);
        let grace = self.tuning.invulnerable_secs;
        self.make_invulnerable(grace);
        log::info!("Session started (seed {})", self.seed);
    }

    /// Grant invulnerability; the session sits in `Entering` until it expires
    pub fn make_invulnerable(&mut self, secs: f32) {
        if !matches!(self.phase, GamePhase::Idle | GamePhase::Entering | GamePhase::Active) {
            return;
        }
        self.player.invulnerable = true;
        self.player.invulnerable_until = Some(Deadline::after_secs(self.time_ticks, secs));
        self.set_phase(GamePhase::Entering);
    }

    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::debug!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            self.events.push(GameEvent::PhaseChanged(phase));
        }
    }

    /// Current pursuer speed multiplier
    pub fn speed_multiplier(&self) -> f32 {
        self.spawner.speed_multiplier(&self.tuning)
    }

    /// Pursuers in the collection, including those still in their removal effect
    pub fn pursuer_count(&self) -> usize {
        self.pursuers.len()
    }

    /// Drop the combo once its window has lapsed
    pub(crate) fn expire_combo(&mut self) {
        if let Some(deadline) = self.combo_until {
            if deadline.is_due(self.time_ticks) {
                self.combo = 0;
                self.combo_until = None;
            }
        }
    }

    /// Award points with the running combo bonus; returns the total awarded
    ///
    /// Each call extends the combo window. The bonus is
    /// `min(combo - 1, cap) * step`. A finished session awards nothing.
    pub fn update_score(&mut self, base_points: u64, pos: Vec2) -> u64 {
        if self.phase == GamePhase::Ended {
            log::debug!("update_score ignored: session ended");
            return 0;
        }
        self.expire_combo();
        self.combo += 1;
        self.combo_until = Some(Deadline::after_secs(
            self.time_ticks,
            self.tuning.combo_window_secs,
        ));
        self.last_scored_tick = Some(self.time_ticks);

        let bonus_steps = (self.combo - 1).min(self.tuning.combo_bonus_cap) as u64;
        let total = base_points + bonus_steps * self.tuning.combo_bonus_step;
        self.score += total;

        self.events.push(GameEvent::Score {
            total,
            combo: self.combo,
            pos,
        });
        total
    }

    /// Begin the two-phase removal of a pursuer
    pub(crate) fn begin_removal(&mut self, index: usize) {
        let now = self.time_ticks;
        let linger = self.tuning.removal_effect_secs;
        let pursuer = &mut self.pursuers[index];
        if pursuer.removal.is_some() {
            return;
        }
        pursuer.removal = Some(Deadline::after_secs(now, linger));
        pursuer.knockback_until = None;
        self.events.push(GameEvent::PursuerRemoved(pursuer.clone()));
    }

    /// Complete a removal early once the host's defeat effect has finished
    pub fn finish_removal(&mut self, id: u32) -> bool {
        let before = self.pursuers.len();
        self.pursuers
            .retain(|p| !(p.id == id && p.removal.is_some()));
        self.pursuers.len() != before
    }

    /// Physically drop pursuers whose removal effect has elapsed
    pub(crate) fn sweep_removed(&mut self) {
        let now = self.time_ticks;
        self.pursuers
            .retain(|p| !p.removal.is_some_and(|d| d.is_due(now)));
    }

    /// Terminal transition; calling it again is a no-op
    ///
    /// Disarms every timer, stops the player and discards all pursuers so
    /// nothing scheduled earlier can touch the session afterwards.
    pub fn end_session(&mut self, reason: EndReason) {
        if self.phase == GamePhase::Ended {
            log::debug!("end_session({:?}) ignored: already ended", reason);
            return;
        }

        self.spawner.disarm();
        self.combo_until = None;
        self.player.invulnerable = false;
        self.player.invulnerable_until = None;
        self.player.input_active = false;
        self.player.input_until = None;
        self.player.body.vel = Vec2::ZERO;
        self.pursuers.clear();
        self.end_reason = Some(reason);
        self.set_phase(GamePhase::Ended);

        let new_high_score = self.score > self.high_score;
        if new_high_score {
            self.high_score = self.score;
        }
        log::info!(
            "Game over ({:?}): score {}, new high score: {}",
            reason,
            self.score,
            new_high_score
        );
        self.events.push(GameEvent::SessionEnded {
            final_score: self.score,
            new_high_score,
            reason,
        });
    }

    /// Spend a life and return how many remain
    ///
    /// Bumps end the session outright, so gameplay never calls this.
    pub fn lose_life(&mut self) -> u8 {
        if self.phase == GamePhase::Ended {
            return self.lives;
        }
        self.lives = self.lives.saturating_sub(1);
        log::info!("Life lost. Remaining lives: {}", self.lives);
        self.lives
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure pursuers are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.pursuers.sort_by_key(|p| p.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_state() -> GameState {
        GameState::new(1234, Arena::default(), Tuning::default(), 0).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_arena() {
        let arena = Arena {
            center: Vec2::ZERO,
            radius_x: 0.0,
            radius_y: 10.0,
        };
        let err = GameState::new(1, arena, Tuning::default(), 0).unwrap_err();
        assert!(matches!(err, SessionError::InvalidArena { .. }));
    }

    #[test]
    fn test_start_enters_grace() {
        let mut state = new_state();
        assert_eq!(state.phase, GamePhase::Idle);
        state.start();
        assert_eq!(state.phase, GamePhase::Entering);
        assert!(state.player.invulnerable);
        assert_eq!(state.player.invulnerable_until.unwrap().due_at(), 60);
    }

    #[test]
    fn test_deadline_due() {
        let d = Deadline::after(10, 5);
        assert!(!d.is_due(14));
        assert!(d.is_due(15));
    }

    #[test]
    fn test_deadline_saturates_instead_of_overflowing() {
        let d = Deadline::after(500, u64::MAX);
        assert_eq!(d.due_at(), u64::MAX);
        assert!(!d.is_due(1_000_000));
        assert!(Deadline::after_secs(10, 1e30).due_at() == u64::MAX);
    }

    #[test]
    fn test_ended_session_ignores_score_and_lives() {
        let mut state = new_state();
        state.start();
        state.update_score(25, Vec2::ZERO);
        state.end_session(EndReason::Bumped);
        state.drain_events();

        assert_eq!(state.update_score(25, Vec2::ZERO), 0);
        assert_eq!(state.score, 25);
        assert_eq!(state.lose_life(), 3);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_combo_bonus_progression_and_cap() {
        let mut state = new_state();
        let mut bonuses = Vec::new();
        for _ in 0..15 {
            let total = state.update_score(25, Vec2::ZERO);
            bonuses.push(total - 25);
        }
        assert_eq!(&bonuses[..12], &[0, 5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 50]);
        assert!(bonuses.iter().all(|&b| b <= 50));
        assert_eq!(state.combo, 15);
    }

    #[test]
    fn test_combo_resets_after_window() {
        let mut state = new_state();
        state.update_score(25, Vec2::ZERO);
        state.update_score(25, Vec2::ZERO);
        assert_eq!(state.combo, 2);

        state.time_ticks += 119;
        assert_eq!(state.update_score(25, Vec2::ZERO), 35);

        state.time_ticks += 120;
        assert_eq!(state.update_score(25, Vec2::ZERO), 25);
        assert_eq!(state.combo, 1);
        assert_eq!(state.score, 25 + 30 + 35 + 25);
    }

    #[test]
    fn test_end_session_is_idempotent() {
        let mut state = new_state();
        state.start();
        state.update_score(25, Vec2::ZERO);
        state.end_session(EndReason::Bumped);
        let events_after_first = state.drain_events();
        let snapshot = serde_json::to_string(&state).unwrap();

        state.end_session(EndReason::BoundaryExit);
        assert_eq!(serde_json::to_string(&state).unwrap(), snapshot);
        assert!(state.drain_events().is_empty());
        assert_eq!(state.end_reason, Some(EndReason::Bumped));
        assert_eq!(
            events_after_first
                .iter()
                .filter(|e| matches!(e, GameEvent::SessionEnded { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_end_session_disarms_timers_and_records_high_score() {
        let mut state = GameState::new(1, Arena::default(), Tuning::default(), 20).unwrap();
        state.start();
        state.update_score(25, Vec2::ZERO);
        state.end_session(EndReason::BoundaryExit);

        assert!(state.combo_until.is_none());
        assert!(state.player.invulnerable_until.is_none());
        assert!(!state.spawner.is_armed());
        assert_eq!(state.high_score, 25);
        assert!(state.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::SessionEnded {
                final_score: 25,
                new_high_score: true,
                ..
            }
        )));
    }

    #[test]
    fn test_lose_life_saturates() {
        let mut state = new_state();
        assert_eq!(state.lose_life(), 2);
        assert_eq!(state.lose_life(), 1);
        assert_eq!(state.lose_life(), 0);
        assert_eq!(state.lose_life(), 0);
    }

    #[test]
    fn test_two_phase_removal() {
        let mut state = new_state();
        let id = state.next_entity_id();
        state
            .pursuers
            .push(Pursuer::new(id, Vec2::ZERO, 20.0, 100.0, 1.0));
        state.begin_removal(0);
        assert!(state.pursuers[0].is_removing());
        state.begin_removal(0);
        let removed = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::PursuerRemoved(_)))
            .count();
        assert_eq!(removed, 1);

        state.sweep_removed();
        assert_eq!(state.pursuers.len(), 1);
        state.time_ticks += 90;
        state.sweep_removed();
        assert!(state.pursuers.is_empty());
    }

    #[test]
    fn test_finish_removal_only_for_removing() {
        let mut state = new_state();
        let id = state.next_entity_id();
        state
            .pursuers
            .push(Pursuer::new(id, Vec2::ZERO, 20.0, 100.0, 1.0));
        assert!(!state.finish_removal(id));
        state.begin_removal(0);
        assert!(state.finish_removal(id));
        assert!(state.pursuers.is_empty());
    }
}
