//! Autosave configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the autosave controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    /// Quiet period after the last edit before a save fires, in milliseconds
    #[serde(rename = "debounce-ms", default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How long the `saved` status is displayed before decaying to `idle`
    #[serde(rename = "saved-display-ms", default = "default_saved_display_ms")]
    pub saved_display_ms: u64,
}

fn default_debounce_ms() -> u64 {
    2000
}

fn default_saved_display_ms() -> u64 {
    2000
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 2000,
            saved_display_ms: 2000,
        }
    }
}

impl AutosaveConfig {
    /// Debounce window as a Duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// `saved` display window as a Duration
    pub fn saved_display(&self) -> Duration {
        Duration::from_millis(self.saved_display_ms)
    }
}
