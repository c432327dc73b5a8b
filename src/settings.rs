//! Game settings and preferences
//!
//! Persisted separately from the save slot, in the same key-value store.

use serde::{Deserialize, Serialize};

use crate::consts::{CHECKPOINT_GLOW_LAYERS, LAVA_GLOW_LAYERS, VICTORY_GLOW_LAYERS};
use crate::platform::storage::{KeyValueStore, StorageError};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Glow layers drawn around each lava pool
    pub fn lava_glow_layers(&self) -> u32 {
        match self {
            QualityPreset::Low => 0,
            QualityPreset::Medium => LAVA_GLOW_LAYERS / 2,
            QualityPreset::High => LAVA_GLOW_LAYERS,
        }
    }

    /// Glow layers drawn around the checkpoint
    pub fn checkpoint_glow_layers(&self) -> u32 {
        match self {
            QualityPreset::Low => 1,
            QualityPreset::Medium => CHECKPOINT_GLOW_LAYERS / 2,
            QualityPreset::High => CHECKPOINT_GLOW_LAYERS,
        }
    }

    /// Glow copies behind the victory text
    pub fn victory_glow_layers(&self) -> u32 {
        match self {
            QualityPreset::Low => 0,
            QualityPreset::Medium => 2,
            QualityPreset::High => VICTORY_GLOW_LAYERS,
        }
    }
}

/// When the on-screen touch zones are used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TouchControls {
    /// Enabled once a touch event is seen
    #[default]
    Auto,
    Always,
    Never,
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Controls ===
    pub touch_controls: TouchControls,

    // === HUD ===
    /// Draw the pulsing fall-out line
    pub show_death_line: bool,
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// Reduced motion (no checkpoint pulse, no death blink)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            touch_controls: TouchControls::Auto,
            show_death_line: true,
            show_fps: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "islandCrisisSettings";

    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Checkpoint pulse (respects reduced_motion)
    pub fn effective_checkpoint_pulse(&self) -> bool {
        !self.reduced_motion
    }

    /// Player blink during the death sequence (respects reduced_motion)
    pub fn effective_death_blink(&self) -> bool {
        !self.reduced_motion
    }

    /// Load settings, falling back to defaults when missing or unreadable
    pub fn load_from(store: &dyn KeyValueStore) -> Self {
        let Some(json) = store.get_item(Self::STORAGE_KEY) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings
            }
            Err(e) => {
                log::warn!("Ignoring corrupt settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self).map_err(|e| StorageError::Encode(e.to_string()))?;
        store.set_item(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
