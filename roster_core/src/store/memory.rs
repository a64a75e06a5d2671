//! In-memory character store.

use std::collections::HashMap;
use std::sync::Mutex;

use sheet_rules::{Character, CharacterId};

use super::{apply, CharacterStore, StoreError};

#[derive(Debug, Default)]
struct Records {
    by_id: HashMap<CharacterId, Character>,
    order: Vec<CharacterId>,
}

/// A store that keeps records in a map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Records>, StoreError> {
        self.records.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl CharacterStore for MemoryStore {
    fn insert(&self, character: Character) -> Result<Character, StoreError> {
        let mut records = self.lock()?;
        if records.by_id.contains_key(&character.id) {
            return Err(StoreError::DuplicateId(character.id));
        }
        records.order.push(character.id);
        records.by_id.insert(character.id, character.clone());
        Ok(character)
    }

    fn get(&self, id: CharacterId) -> Result<Option<Character>, StoreError> {
        Ok(self.lock()?.by_id.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Character>, StoreError> {
        let records = self.lock()?;
        Ok(records
            .order
            .iter()
            .filter_map(|id| records.by_id.get(id).cloned())
            .collect())
    }

    fn modify<F, E>(&self, id: CharacterId, f: F) -> Result<Option<Character>, E>
    where
        F: FnOnce(&mut Character) -> Result<(), E>,
        E: From<StoreError>,
    {
        let mut records = self.lock()?;
        match records.by_id.get_mut(&id) {
            Some(character) => {
                apply(character, f)?;
                Ok(Some(character.clone()))
            }
            None => Ok(None),
        }
    }

    fn remove(&self, id: CharacterId) -> Result<bool, StoreError> {
        let mut records = self.lock()?;
        if records.by_id.remove(&id).is_none() {
            return Ok(false);
        }
        records.order.retain(|existing| *existing != id);
        Ok(true)
    }
}
