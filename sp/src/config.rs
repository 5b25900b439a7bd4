//! Planner configuration types and loading

use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::autosave::AutosaveConfig;
use crate::store::DEFAULT_UNDO_CAPACITY;

/// Main planner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Autosave timing
    pub autosave: AutosaveConfig,

    /// Undo history limits
    pub undo: UndoConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Planner defaults
    pub planner: PlannerConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .semplan.yml
        let local_config = PathBuf::from(".semplan.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/semplan/semplan.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("semplan").join("semplan.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Undo history limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoConfig {
    /// Snapshots retained before the oldest is evicted
    pub capacity: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_UNDO_CAPACITY,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the plan file and pending-change store
    #[serde(rename = "data-dir")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Resolve the data directory, expanding a leading ~/
    pub fn resolved_data_dir(&self) -> PathBuf {
        let raw = self.data_dir.to_string_lossy();
        if let Some(rest) = raw.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        self.data_dir.clone()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/semplan on Linux)
        let data_dir = dirs::data_dir()
            .map(|d| d.join("semplan"))
            .unwrap_or_else(|| PathBuf::from(".semplan"));

        Self { data_dir }
    }
}

/// Planner defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Default per-semester credit cap for generated plans
    #[serde(rename = "max-credits")]
    pub max_credits: u32,

    /// Default admission year for onboarding when none is given
    #[serde(rename = "admitted-year")]
    pub admitted_year: i32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_credits: 18,
            admitted_year: 2024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.autosave.debounce_ms, 2000);
        assert_eq!(config.undo.capacity, DEFAULT_UNDO_CAPACITY);
        assert_eq!(config.planner.max_credits, 18);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
autosave:
  debounce-ms: 500
  saved-display-ms: 1000

undo:
  capacity: 25

storage:
  data-dir: /tmp/semplan

planner:
  max-credits: 21
  admitted-year: 2025
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.autosave.debounce_ms, 500);
        assert_eq!(config.autosave.saved_display_ms, 1000);
        assert_eq!(config.undo.capacity, 25);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/semplan"));
        assert_eq!(config.planner.max_credits, 21);
        assert_eq!(config.planner.admitted_year, 2025);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
undo:
  capacity: 3
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.undo.capacity, 3);

        // Defaults for unspecified
        assert_eq!(config.autosave.debounce_ms, 2000);
        assert_eq!(config.planner.max_credits, 18);
    }

    #[test]
    fn test_tilde_expansion() {
        let storage = StorageConfig {
            data_dir: PathBuf::from("~/planner-data"),
        };
        let resolved = storage.resolved_data_dir();
        assert!(!resolved.to_string_lossy().starts_with("~/"));
        assert!(resolved.ends_with("planner-data"));
    }
}
