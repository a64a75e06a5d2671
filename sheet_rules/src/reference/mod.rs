//! Reference data: race and class definitions used as calculator inputs.

use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::entities::{CharacterClass, Race};

const SRD_CATALOG: &str = include_str!("../../data/srd.toml");

/// Errors raised while loading a reference catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse reference catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate {kind} index: {index}")]
    DuplicateIndex { kind: &'static str, index: String },
}

/// Source of validated race and class data.
pub trait ReferenceProvider {
    /// Look up a race by index.
    fn race(&self, index: &str) -> Option<&Race>;

    /// Look up a class by index.
    fn class(&self, index: &str) -> Option<&CharacterClass>;

    fn races(&self) -> &[Race];

    fn classes(&self) -> &[CharacterClass];
}

/// An in-memory catalog of races and classes parsed from TOML.
///
/// ```toml
/// [[races]]
/// name = "Half-Elf"
/// index = "half-elf"
/// speed = 30
/// abilityBonuses = [{ abilityScore = "charisma", bonus = 2 }]
///
/// [[classes]]
/// name = "Bard"
/// index = "bard"
/// hitDie = 8
/// savingThrows = ["dexterity", "charisma"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferenceCatalog {
    #[serde(default)]
    races: Vec<Race>,
    #[serde(default)]
    classes: Vec<CharacterClass>,
}

impl ReferenceCatalog {
    /// Parse a catalog, rejecting duplicate indexes.
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let catalog: ReferenceCatalog = toml::from_str(source)?;
        check_unique("race", catalog.races.iter().map(|r| r.index.as_str()))?;
        check_unique("class", catalog.classes.iter().map(|c| c.index.as_str()))?;
        Ok(catalog)
    }

    /// The bundled SRD catalog: nine core races and twelve core classes.
    pub fn srd() -> Result<Self, CatalogError> {
        Self::from_toml_str(SRD_CATALOG)
    }
}

fn check_unique<'a>(
    kind: &'static str,
    indexes: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for index in indexes {
        if !seen.insert(index.to_lowercase()) {
            return Err(CatalogError::DuplicateIndex {
                kind,
                index: index.to_string(),
            });
        }
    }
    Ok(())
}

impl ReferenceProvider for ReferenceCatalog {
    fn race(&self, index: &str) -> Option<&Race> {
        self.races.iter().find(|r| r.index.eq_ignore_ascii_case(index))
    }

    fn class(&self, index: &str) -> Option<&CharacterClass> {
        self.classes
            .iter()
            .find(|c| c.index.eq_ignore_ascii_case(index))
    }

    fn races(&self) -> &[Race] {
        &self.races
    }

    fn classes(&self) -> &[CharacterClass] {
        &self.classes
    }
}
