//! Character storage.
//!
//! Stores hold complete character records keyed by id. `modify` is the only
//! way to change a stored record: the read, the mutation and the write happen
//! under one lock so concurrent updates to a character never interleave.

mod file;
mod memory;

pub use file::*;
pub use memory::*;

use chrono::Utc;
use sheet_rules::{Character, CharacterId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored data is malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("character {0} already exists")]
    DuplicateId(CharacterId),

    #[error("store lock poisoned")]
    Poisoned,
}

/// A key-value store of character records.
pub trait CharacterStore {
    /// Insert a new record. Fails if the id is taken.
    fn insert(&self, character: Character) -> Result<Character, StoreError>;

    fn get(&self, id: CharacterId) -> Result<Option<Character>, StoreError>;

    /// All records in insertion order.
    fn list(&self) -> Result<Vec<Character>, StoreError>;

    /// Read, mutate and write back one record as a single unit.
    ///
    /// Returns `Ok(None)` if the id is unknown. If `f` fails nothing is
    /// written. The id and creation time survive whatever `f` does, and
    /// `updated_at` is refreshed.
    fn modify<F, E>(&self, id: CharacterId, f: F) -> Result<Option<Character>, E>
    where
        F: FnOnce(&mut Character) -> Result<(), E>,
        E: From<StoreError>;

    /// Remove a record. Returns `false` if the id is unknown.
    fn remove(&self, id: CharacterId) -> Result<bool, StoreError>;
}

/// Apply `f` to a record in place, pinning its identity.
fn apply<F, E>(character: &mut Character, f: F) -> Result<(), E>
where
    F: FnOnce(&mut Character) -> Result<(), E>,
{
    let mut draft = character.clone();
    f(&mut draft)?;
    draft.id = character.id;
    draft.created_at = character.created_at;
    draft.updated_at = Utc::now();
    *character = draft;
    Ok(())
}
