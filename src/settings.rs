//! Presentation preferences
//!
//! Persisted separately from the high score in LocalStorage. The simulation
//! never reads these; only the host's presenter does.

use serde::{Deserialize, Serialize};

use crate::sim::ImpactKind;

/// Player-facing preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Camera shake on impacts
    pub screen_shake: bool,
    /// Floating "+25" text where points are scored
    pub floating_scores: bool,
    /// Show the combo counter
    pub show_combo: bool,
    /// Reduced motion (no shake, no blinking)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_shake: true,
            floating_scores: true,
            show_combo: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "catfight_settings";

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Flip reduced motion; returns the new value
    pub fn toggle_reduced_motion(&mut self) -> bool {
        self.reduced_motion = !self.reduced_motion;
        self.reduced_motion
    }

    /// Shake strength (0-1) for an impact, 0 when shake is off
    pub fn shake_for(&self, kind: ImpactKind) -> f32 {
        if !self.effective_screen_shake() {
            return 0.0;
        }
        match kind {
            ImpactKind::Push => 0.4,
            ImpactKind::Bump => 0.3,
            ImpactKind::RingOut => 0.8,
            ImpactKind::BoundaryLoss => 1.0,
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
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
