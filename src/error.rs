//! Errors for session construction and tuning overrides
//!
//! Expected gameplay outcomes (pursuer cap reached, bumps while invulnerable,
//! ending an already-ended session) are normal control flow, never errors.

use std::fmt;

/// Rejected session construction
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionError {
    /// Arena radii must be finite and strictly positive
    InvalidArena { radius_x: f32, radius_y: f32 },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArena { radius_x, radius_y } => write!(
                f,
                "invalid arena: radii must be positive, got rx={radius_x}, ry={radius_y}"
            ),
        }
    }
}

impl std::error::Error for SessionError {}

/// Rejected tuning override
#[derive(Debug)]
pub enum TuningError {
    /// Payload was not valid tuning JSON
    Parse(serde_json::Error),
    /// A value was out of its allowed range
    Invalid(&'static str),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "tuning parse error: {err}"),
            Self::Invalid(field) => write!(f, "tuning value out of range: {field}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}
