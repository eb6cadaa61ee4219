//! Data-driven game balance
//!
//! Every gameplay constant lives here so a tuning pass never touches the
//! simulation code. Per-tick factors (blend, damping, decay) assume the fixed
//! 60 Hz step in [`crate::consts::SIM_DT`]; durations are in seconds.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// Gameplay tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player steering ===
    /// Pointer must be farther than this before the player steers
    pub movement_threshold: f32,
    /// Player top speed (units/s)
    pub player_speed: f32,
    /// Fraction of the velocity gap closed per steering tick
    pub blend_factor: f32,
    /// Fraction of the facing-angle gap closed per steering tick
    pub rotation_speed: f32,
    /// Per-axis random perturbation of the steering direction
    pub steering_jitter: f32,
    /// Fraction of velocity kept per second (continuous drag)
    pub player_drag: f32,
    /// Velocity multiplier per tick when no input is active
    pub idle_damping: f32,
    /// Per-axis speed below which an idle player snaps to rest
    pub rest_speed: f32,
    /// How long a pointer press keeps the player "attacking"
    pub input_active_secs: f32,
    pub player_radius: f32,

    // === Arena containment ===
    /// Normalized squared distance where the soft wall starts
    pub containment_threshold: f32,
    pub containment_max_push: f32,
    pub containment_scale: f32,

    // === Collision ===
    /// Player speed above which a contact pushes the pursuer away
    pub impact_threshold: f32,
    pub launch_speed: f32,
    /// Spin given to a launched pursuer (radians/s)
    pub launch_spin: f32,
    pub push_recoil: f32,
    pub push_player_offset: f32,
    pub push_pursuer_offset: f32,
    pub bump_player_impulse: f32,
    pub bump_pursuer_impulse: f32,
    pub bump_separation: f32,
    /// Pushed pursuers coast instead of chasing for this long
    pub knockback_secs: f32,

    // === Spawning ===
    pub spawn_delay_secs: f32,
    pub spawn_interval_secs: f32,
    pub max_pursuers: usize,
    /// Edge factor for the opening pair of pursuers
    pub opening_edge_factor: f32,
    pub edge_factor: f32,
    /// Random offset around an edge anchor, as a fraction of the arena radii
    pub spawn_jitter: f32,
    pub pursuer_base_speed: f32,
    pub pursuer_radius: f32,
    pub pursuer_scale_min: f32,
    pub pursuer_scale_max: f32,
    /// Velocity multiplier per tick for coasting pursuers
    pub pursuer_decay: f32,

    // === Difficulty ===
    pub escalation_interval_secs: f32,
    pub escalation_step: f32,
    pub speed_multiplier_cap: f32,

    // === Scoring ===
    pub ring_out_points: u64,
    pub combo_window_secs: f32,
    pub combo_bonus_step: u64,
    pub combo_bonus_cap: u32,

    // === Session ===
    pub invulnerable_secs: f32,
    /// Time a ringed-out pursuer lingers for its defeat animation
    pub removal_effect_secs: f32,
    pub starting_lives: u8,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            movement_threshold: 5.0,
            player_speed: 380.0,
            blend_factor: 0.18,
            rotation_speed: 0.15,
            steering_jitter: 0.05,
            player_drag: 0.8,
            idle_damping: 0.95,
            rest_speed: 5.0,
            input_active_secs: 0.3,
            player_radius: 24.0,

            containment_threshold: 0.85,
            containment_max_push: 0.2,
            containment_scale: 100.0,

            impact_threshold: 10.0,
            launch_speed: 1200.0,
            launch_spin: 300.0_f32.to_radians(),
            push_recoil: 20.0,
            push_player_offset: 10.0,
            push_pursuer_offset: 30.0,
            bump_player_impulse: 150.0,
            bump_pursuer_impulse: 100.0,
            bump_separation: 10.0,
            knockback_secs: 0.4,

            spawn_delay_secs: 3.0,
            spawn_interval_secs: 3.0,
            max_pursuers: 6,
            opening_edge_factor: 0.9,
            edge_factor: 0.85,
            spawn_jitter: 0.05,
            pursuer_base_speed: 100.0,
            pursuer_radius: 20.0,
            pursuer_scale_min: 0.75,
            pursuer_scale_max: 1.25,
            pursuer_decay: 0.99,

            escalation_interval_secs: 15.0,
            escalation_step: 0.1,
            speed_multiplier_cap: 1.5,

            ring_out_points: 25,
            combo_window_secs: 2.0,
            combo_bonus_step: 5,
            combo_bonus_cap: 10,

            invulnerable_secs: 1.0,
            removal_effect_secs: 1.5,
            starting_lives: 3,
        }
    }
}

impl Tuning {
    /// Longest duration any timer may be tuned to
    pub const MAX_DURATION_SECS: f32 = 3600.0;

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "catfight_tuning";

    /// Parse and validate a JSON override; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.blend_factor > 0.0 && self.blend_factor <= 1.0) {
            return Err(TuningError::Invalid("blend_factor"));
        }
        if !(self.rotation_speed >= 0.0 && self.rotation_speed <= 1.0) {
            return Err(TuningError::Invalid("rotation_speed"));
        }
        if !(self.steering_jitter >= 0.0) {
            return Err(TuningError::Invalid("steering_jitter"));
        }
        if !(self.player_speed > 0.0) {
            return Err(TuningError::Invalid("player_speed"));
        }
        if !(self.player_radius > 0.0 && self.pursuer_radius > 0.0) {
            return Err(TuningError::Invalid("radius"));
        }
        if !(self.containment_threshold > 0.0 && self.containment_threshold < 1.0) {
            return Err(TuningError::Invalid("containment_threshold"));
        }
        if !(self.spawn_interval_secs > 0.0 && self.escalation_interval_secs > 0.0) {
            return Err(TuningError::Invalid("interval"));
        }
        if !(self.pursuer_scale_min > 0.0 && self.pursuer_scale_min <= self.pursuer_scale_max)
        {
            return Err(TuningError::Invalid("pursuer_scale"));
        }
        if self.pursuer_scale_max >= 2.0 {
            return Err(TuningError::Invalid("pursuer_scale_max"));
        }
        if !(self.speed_multiplier_cap >= 1.0 && self.escalation_step >= 0.0) {
            return Err(TuningError::Invalid("speed_multiplier_cap"));
        }
        if !(self.combo_window_secs > 0.0) {
            return Err(TuningError::Invalid("combo_window_secs"));
        }
        let durations = [
            ("input_active_secs", self.input_active_secs),
            ("knockback_secs", self.knockback_secs),
            ("spawn_delay_secs", self.spawn_delay_secs),
            ("spawn_interval_secs", self.spawn_interval_secs),
            ("escalation_interval_secs", self.escalation_interval_secs),
            ("combo_window_secs", self.combo_window_secs),
            ("invulnerable_secs", self.invulnerable_secs),
            ("removal_effect_secs", self.removal_effect_secs),
        ];
        for (name, secs) in durations {
            if !(0.0..=Self::MAX_DURATION_SECS).contains(&secs) {
                return Err(TuningError::Invalid(name));
            }
        }
        Ok(())
    }

    /// Load a tuning override from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning override from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring tuning override: {}", e),
                }
            }
        }

        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "launch_speed": 900.0, "max_pursuers": 4 }"#)
            .expect("valid override");
        assert_eq!(tuning.launch_speed, 900.0);
        assert_eq!(tuning.max_pursuers, 4);
        assert_eq!(tuning.impact_threshold, Tuning::default().impact_threshold);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = Tuning::from_json(r#"{ "blend_factor": 0.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid("blend_factor")));

        let err = Tuning::from_json(r#"{ "combo_window_secs": 1e30 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid("combo_window_secs")));

        let err = Tuning::from_json(r#"{ "knockback_secs": -1.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid("knockback_secs")));

        let err = Tuning::from_json("not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }
}
