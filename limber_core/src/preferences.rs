//! User preferences persisted with file locking.
//!
//! Preferences are small and read on every start, so a missing or corrupt
//! file never blocks the user: it yields defaults with a warning.

use crate::{Error, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;
use tempfile::NamedTempFile;

/// Language used for generated text such as session titles
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            other => Err(Error::Config(format!("Unsupported language: {}", other))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => f.write_str("en"),
            Language::Fr => f.write_str("fr"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preferences {
    #[serde(default = "default_sounds_enabled")]
    pub sounds_enabled: bool,

    #[serde(default)]
    pub language: Language,
}

fn default_sounds_enabled() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sounds_enabled: default_sounds_enabled(),
            language: Language::default(),
        }
    }
}

impl Preferences {
    /// Load preferences from a file with shared locking
    ///
    /// Returns defaults if the file doesn't exist or cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No preferences file found, using defaults");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open preferences file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock preferences file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read preferences file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<Preferences>(&contents) {
            Ok(preferences) => Ok(preferences),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse preferences file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save preferences atomically (temp file, fsync, rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Storage(format!("{:?} has no parent directory", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved preferences to {:?}", path);
        Ok(())
    }

    /// Load, modify and save back
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut Preferences),
    {
        let mut preferences = Self::load(path)?;
        f(&mut preferences);
        preferences.save(path)?;
        Ok(preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("preferences.json");

        let preferences = Preferences {
            sounds_enabled: false,
            language: Language::Fr,
        };
        preferences.save(&path).unwrap();

        assert_eq!(Preferences::load(&path).unwrap(), preferences);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let preferences = Preferences::load(&temp_dir.path().join("missing.json")).unwrap();
        assert!(preferences.sounds_enabled);
        assert_eq!(preferences.language, Language::En);
    }

    #[test]
    fn test_corrupted_file_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("preferences.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(Preferences::load(&path).unwrap(), Preferences::default());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("preferences.json");
        std::fs::write(&path, r#"{"language":"fr"}"#).unwrap();

        let preferences = Preferences::load(&path).unwrap();
        assert!(preferences.sounds_enabled);
        assert_eq!(preferences.language, Language::Fr);
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("preferences.json");

        Preferences::update(&path, |p| p.sounds_enabled = !p.sounds_enabled).unwrap();

        assert!(!Preferences::load(&path).unwrap().sounds_enabled);
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("FR".parse::<Language>().unwrap(), Language::Fr);
        assert!("de".parse::<Language>().is_err());
    }
}
