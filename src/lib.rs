//! Catfight - An elliptical arena ring-out arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (steering, boundary, collisions, session)
//! - `tuning`: Data-driven game balance
//! - `settings`: Presentation preferences
//! - `highscores`: The persisted best score
//! - `error`: Construction and configuration errors

pub mod error;
pub mod highscores;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{SessionError, TuningError};
pub use highscores::HighScore;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Logical viewport (portrait phone)
    pub const VIEW_WIDTH: f32 = 390.0;
    pub const VIEW_HEIGHT: f32 = 844.0;

    /// Arena ellipse size as a fraction of the viewport
    pub const ARENA_WIDTH_FRACTION: f32 = 0.7;
    pub const ARENA_HEIGHT_FRACTION: f32 = 0.55;
}

/// Convert a duration in seconds to a whole number of simulation ticks (at least 1)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u64 {
    ((secs / consts::SIM_DT).round() as u64).max(1)
}

/// Normalize angle to (-π, π]
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle <= -PI {
        angle += 2.0 * PI;
    }
    angle
}
