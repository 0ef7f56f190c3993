//! Configuration file support for Limber.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/limber/config.toml`.

use crate::workout::WorkoutTiming;
use crate::{Difficulty, Error, Result, SessionConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub session: SessionDefaults,

    #[serde(default)]
    pub workout: WorkoutConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            user_id: default_user_id(),
        }
    }
}

/// Default session configuration offered to the user
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionDefaults {
    #[serde(default = "default_effort_duration")]
    pub effort_duration: u32,

    #[serde(default = "default_pause_duration")]
    pub pause_duration: u32,

    #[serde(default = "default_exercise_duration")]
    pub exercise_duration: u32,

    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            effort_duration: default_effort_duration(),
            pause_duration: default_pause_duration(),
            exercise_duration: default_exercise_duration(),
            difficulty: default_difficulty(),
        }
    }
}

impl SessionDefaults {
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            effort_duration: self.effort_duration,
            pause_duration: self.pause_duration,
            exercise_duration: self.exercise_duration,
            difficulty: self.difficulty,
        }
    }
}

/// Workout timing configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutConfig {
    #[serde(default = "default_lead_in_seconds")]
    pub lead_in_seconds: u32,

    #[serde(default = "default_lead_in_cap_seconds")]
    pub lead_in_cap_seconds: u32,

    /// Real time between two countdown ticks
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,

    #[serde(default = "default_end_rest_cue_lead")]
    pub end_rest_cue_lead: u32,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            lead_in_seconds: default_lead_in_seconds(),
            lead_in_cap_seconds: default_lead_in_cap_seconds(),
            tick_millis: default_tick_millis(),
            end_rest_cue_lead: default_end_rest_cue_lead(),
        }
    }
}

impl WorkoutConfig {
    pub fn timing(&self) -> WorkoutTiming {
        WorkoutTiming {
            lead_in: self.lead_in_seconds,
            lead_in_cap: self.lead_in_cap_seconds,
            end_rest_cue_lead: self.end_rest_cue_lead,
        }
    }
}

/// Exercise pool configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// JSON exercise list replacing the built-in catalog
    #[serde(default)]
    pub exercises_file: Option<PathBuf>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        PathBuf::from(home).join(".local/share")
    });
    base.join("limber")
}

fn default_user_id() -> String {
    "local".into()
}

fn default_effort_duration() -> u32 {
    10 * 60
}

fn default_pause_duration() -> u32 {
    10
}

fn default_exercise_duration() -> u32 {
    30
}

fn default_difficulty() -> Difficulty {
    Difficulty::Medium
}

fn default_lead_in_seconds() -> u32 {
    5
}

fn default_lead_in_cap_seconds() -> u32 {
    60
}

fn default_tick_millis() -> u64 {
    1000
}

fn default_end_rest_cue_lead() -> u32 {
    2
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values the workout cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.session.exercise_duration == 0 {
            return Err(Error::Config(
                "session.exercise_duration must be greater than zero".into(),
            ));
        }
        if self.workout.lead_in_seconds > self.workout.lead_in_cap_seconds {
            return Err(Error::Config(format!(
                "workout.lead_in_seconds ({}) exceeds workout.lead_in_cap_seconds ({})",
                self.workout.lead_in_seconds, self.workout.lead_in_cap_seconds
            )));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
        base.join("limber").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.user_id, "local");
        assert_eq!(config.session.effort_duration, 600);
        assert_eq!(config.session.difficulty, Difficulty::Medium);
        assert_eq!(config.workout.timing(), WorkoutTiming::default());
        assert!(config.catalog.exercises_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.session.difficulty = Difficulty::Hard;
        config.workout.tick_millis = 250;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.session.difficulty, Difficulty::Hard);
        assert_eq!(loaded.workout.tick_millis, 250);
        assert_eq!(loaded.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[session]
exercise_duration = 45
difficulty = 3
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.exercise_duration, 45);
        assert_eq!(config.session.difficulty, Difficulty::Hard);
        assert_eq!(config.session.pause_duration, 10); // default
        assert_eq!(config.workout.lead_in_seconds, 5); // default
    }

    #[test]
    fn test_invalid_difficulty_rejected() {
        let toml_str = r#"
[session]
difficulty = 7
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_zero_exercise_duration_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[session]\nexercise_duration = 0\n").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
