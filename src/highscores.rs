//! Best-score persistence
//!
//! One integer in LocalStorage, read at startup (absent or unreadable means 0)
//! and written whenever a round beats it.

use serde::{Deserialize, Serialize};

/// The best score achieved on this device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub best: u64,
}

impl HighScore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "catfightHighScore";

    pub fn new(best: u64) -> Self {
        Self { best }
    }

    /// Check if a score would set a new record
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.best
    }

    /// Record a finished round's score; returns true on a new record
    pub fn record(&mut self, score: u64) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.best = score;
        true
    }

    /// Parse a stored value; anything but a non-negative integer reads as 0
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<u64>(raw.trim()) {
            Ok(best) => Self { best },
            Err(e) => {
                log::warn!("Ignoring stored high score {:?}: {}", raw, e);
                Self::default()
            }
        }
    }

    /// Load the high score from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(raw)) = storage.get_item(Self::STORAGE_KEY) {
                let score = Self::parse(&raw);
                log::info!("Loaded high score: {}", score.best);
                return score;
            }
        }

        log::info!("No saved high score found");
        Self::default()
    }

    /// Save the high score to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if storage
                .set_item(Self::STORAGE_KEY, &self.best.to_string())
                .is_ok()
            {
                log::info!("New high score saved: {}", self.best);
            } else {
                log::warn!("Failed to save high score");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_only_on_strictly_higher() {
        let mut high = HighScore::new(100);
        assert!(!high.record(100));
        assert!(!high.record(40));
        assert!(high.record(101));
        assert_eq!(high.best, 101);
    }

    #[test]
    fn test_parse_stored_values() {
        assert_eq!(HighScore::parse("250").best, 250);
        assert_eq!(HighScore::parse(" 7\n").best, 7);
        assert_eq!(HighScore::parse("-3").best, 0);
        assert_eq!(HighScore::parse("abc").best, 0);
        assert_eq!(HighScore::parse("").best, 0);
    }
}
