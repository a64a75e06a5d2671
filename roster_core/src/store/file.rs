//! JSON file-backed character store.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use sheet_rules::{Character, CharacterId};

use super::{apply, CharacterStore, StoreError};

/// On-disk document layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    characters: Vec<Character>,
}

/// A store backed by a single JSON document.
///
/// Every write copies the previous file to `<file>.backup` (when backups are
/// on), writes the new document to `<file>.tmp`, and renames it into place.
/// A missing data file is created empty on first read.
///
/// Updates are serialized per instance only. Two stores opened on the same
/// file do not coordinate, so share one instance (e.g. behind an `Arc`).
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    backups: bool,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backups: true,
            guard: Mutex::new(()),
        }
    }

    pub fn with_backups(mut self, backups: bool) -> Self {
        self.backups = backups;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        sibling(&self.path, "backup")
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.guard.lock().map_err(|_| StoreError::Poisoned)
    }

    fn read(&self) -> Result<Vec<Character>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => {
                let document: Document = serde_json::from_str(&data)?;
                Ok(document.characters)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "data file missing, creating it");
                self.write(&[])?;
                Ok(Vec::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, characters: &[Character]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        if self.backups {
            if let Err(err) = fs::copy(&self.path, self.backup_path()) {
                if err.kind() != ErrorKind::NotFound {
                    warn!(path = %self.path.display(), error = %err, "failed to create backup");
                }
            }
        }

        #[derive(Serialize)]
        struct DocumentRef<'a> {
            characters: &'a [Character],
        }

        let data = serde_json::to_string_pretty(&DocumentRef { characters })?;
        let temp = sibling(&self.path, "tmp");
        fs::write(&temp, data)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

impl CharacterStore for JsonFileStore {
    fn insert(&self, character: Character) -> Result<Character, StoreError> {
        let _guard = self.lock()?;
        let mut characters = self.read()?;
        if characters.iter().any(|c| c.id == character.id) {
            return Err(StoreError::DuplicateId(character.id));
        }
        characters.push(character.clone());
        self.write(&characters)?;
        Ok(character)
    }

    fn get(&self, id: CharacterId) -> Result<Option<Character>, StoreError> {
        let _guard = self.lock()?;
        Ok(self.read()?.into_iter().find(|c| c.id == id))
    }

    fn list(&self) -> Result<Vec<Character>, StoreError> {
        let _guard = self.lock()?;
        self.read()
    }

    fn modify<F, E>(&self, id: CharacterId, f: F) -> Result<Option<Character>, E>
    where
        F: FnOnce(&mut Character) -> Result<(), E>,
        E: From<StoreError>,
    {
        let _guard = self.lock()?;
        let mut characters = self.read()?;
        let Some(character) = characters.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        apply(character, f)?;
        let updated = character.clone();
        self.write(&characters)?;
        Ok(Some(updated))
    }

    fn remove(&self, id: CharacterId) -> Result<bool, StoreError> {
        let _guard = self.lock()?;
        let mut characters = self.read()?;
        let before = characters.len();
        characters.retain(|c| c.id != id);
        if characters.len() == before {
            return Ok(false);
        }
        self.write(&characters)?;
        Ok(true)
    }
}
