//! Roster configuration loaded from TOML.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::store::JsonFileStore;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Where and how characters are persisted.
///
/// ```toml
/// data_file = "data/characters.json"
/// backups = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Path of the JSON document holding all characters.
    pub data_file: PathBuf,

    /// Keep a `.backup` copy of the previous document on every write.
    pub backups: bool,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/characters.json"),
            backups: true,
        }
    }
}

impl RosterConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Open the file store this config describes.
    ///
    /// Each call returns an independent store; open once and share it.
    pub fn open_store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.data_file).with_backups(self.backups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{NewCharacter, RosterService};
    use sheet_rules::{AbilityScores, ReferenceCatalog, ReferenceProvider};
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = RosterConfig::from_toml_str("").unwrap();
        assert_eq!(config, RosterConfig::default());
        assert_eq!(config.data_file, PathBuf::from("data/characters.json"));
        assert!(config.backups);
    }

    #[test]
    fn test_partial_override() {
        let config = RosterConfig::from_toml_str("backups = false").unwrap();
        assert!(!config.backups);
        assert_eq!(config.data_file, PathBuf::from("data/characters.json"));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            RosterConfig::from_toml_str("backups = \"sometimes\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = RosterConfig::load(dir.path().join("roster.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_and_open_store() {
        let dir = TempDir::new().unwrap();
        let data_file = dir.path().join("characters.json");
        let config_path = dir.path().join("roster.toml");
        std::fs::write(
            &config_path,
            format!("data_file = {:?}\nbackups = false\n", data_file.display().to_string()),
        )
        .unwrap();

        let config = RosterConfig::load(&config_path).unwrap();
        assert_eq!(config.data_file, data_file);

        let catalog = ReferenceCatalog::srd().unwrap();
        let service = RosterService::new(config.open_store());
        let created = service
            .create(NewCharacter::new(
                "Grog",
                catalog.race("half-orc").unwrap().clone(),
                catalog.class("barbarian").unwrap().clone(),
                1,
                AbilityScores::new(15, 13, 14, 8, 12, 10),
            ))
            .unwrap();

        let stats = created.calculated_stats.as_ref().unwrap();
        // d12 + CON (14 + 1 racial = 15, +2).
        assert_eq!(stats.max_hit_points, 14);
        assert_eq!(stats.saving_throws.strength.value, 3 + 2);
        assert!(data_file.exists());
        assert!(!service.store().backup_path().exists());
    }
}
