//! Roster service - character CRUD around the stat calculator.
//!
//! Stats are recomputed on creation and whenever an update touches level,
//! ability scores, race, class or equipment. Free-text edits and the quick
//! actions (hit points, spell slots) write through without recomputing.

mod input;

pub use input::*;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use sheet_rules::{Character, CharacterId, HitDice, SpellSlot, StatCalculator};

use crate::store::{CharacterStore, StoreError};

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("character {0} not found")]
    NotFound(CharacterId),

    #[error("character {0} is not a spellcaster")]
    NotASpellcaster(CharacterId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RosterError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Character operations over a store.
pub struct RosterService<S> {
    store: S,
    calculator: StatCalculator,
}

impl<S: CharacterStore> RosterService<S> {
    pub fn new(store: S) -> Self {
        Self::with_calculator(store, StatCalculator::with_defaults())
    }

    pub fn with_calculator(store: S, calculator: StatCalculator) -> Self {
        Self { store, calculator }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate a request, assign an id, compute stats and store the result.
    pub fn create(&self, request: NewCharacter) -> Result<Character, RosterError> {
        let missing = request.missing_fields();
        let NewCharacter {
            name: Some(name),
            race: Some(race),
            class: Some(class),
            level: Some(level),
            ability_scores: Some(ability_scores),
            background,
            skills,
            equipment,
            spellcasting,
            features,
            hit_dice,
            backstory,
            notes,
        } = request
        else {
            return Err(missing_fields_error(&missing));
        };
        if !missing.is_empty() {
            return Err(missing_fields_error(&missing));
        }

        validate_level(level)?;

        let hit_dice = hit_dice.unwrap_or_else(|| HitDice::for_class(level, &class));
        let mut character = Character::new(name, race, class, level, ability_scores);
        character.background = background;
        character.skills = skills;
        character.equipment = equipment;
        character.spellcasting = spellcasting;
        character.features = features;
        character.hit_dice = hit_dice;
        character.backstory = backstory;
        character.notes = notes;

        let created_at = character.created_at;
        let character = self.calculator.recompute_at(character, created_at);
        let saved = self.store.insert(character)?;
        info!(character = %saved.id, name = %saved.name, "created character");
        Ok(saved)
    }

    pub fn get(&self, id: CharacterId) -> Result<Character, RosterError> {
        self.store.get(id)?.ok_or(RosterError::NotFound(id))
    }

    pub fn list(&self) -> Result<Vec<Character>, RosterError> {
        Ok(self.store.list()?)
    }

    /// Merge a patch into a stored character, recomputing if needed.
    pub fn update(&self, id: CharacterId, patch: CharacterPatch) -> Result<Character, RosterError> {
        if let Some(level) = patch.level {
            validate_level(level)?;
        }
        let recompute = patch.requires_recompute();

        let updated = self.store.modify(id, |character| -> Result<(), RosterError> {
            apply_patch(character, patch);
            if recompute {
                *character = self.calculator.recompute_at(character.clone(), Utc::now());
            }
            Ok(())
        })?;

        debug!(character = %id, recompute, "updated character");
        updated.ok_or(RosterError::NotFound(id))
    }

    /// Set current and/or temporary hit points without recomputing.
    ///
    /// A record that has never been computed gets its stats computed first.
    pub fn update_hit_points(
        &self,
        id: CharacterId,
        current: Option<i32>,
        temporary: Option<i32>,
    ) -> Result<Character, RosterError> {
        let calculator = &self.calculator;
        let updated = self.store.modify(id, |character| -> Result<(), RosterError> {
            if character.calculated_stats.is_none() {
                *character = calculator.recompute_at(character.clone(), Utc::now());
            }
            if let Some(stats) = character.calculated_stats.as_mut() {
                if let Some(current) = current {
                    stats.current_hit_points = current;
                }
                if let Some(temporary) = temporary {
                    stats.temporary_hit_points = Some(temporary);
                }
            }
            Ok(())
        })?;

        updated.ok_or(RosterError::NotFound(id))
    }

    /// Replace spell slot usage. Fails for characters without spellcasting.
    pub fn update_spell_slots(
        &self,
        id: CharacterId,
        slots: Vec<SpellSlot>,
    ) -> Result<Character, RosterError> {
        let updated = self.store.modify(id, |character| -> Result<(), RosterError> {
            let spellcasting = character
                .spellcasting
                .as_mut()
                .ok_or(RosterError::NotASpellcaster(id))?;
            spellcasting.spell_slots = slots;
            Ok(())
        })?;

        updated.ok_or(RosterError::NotFound(id))
    }

    pub fn delete(&self, id: CharacterId) -> Result<(), RosterError> {
        if !self.store.remove(id)? {
            return Err(RosterError::NotFound(id));
        }
        info!(character = %id, "deleted character");
        Ok(())
    }
}

fn missing_fields_error(missing: &[&str]) -> RosterError {
    RosterError::validation(format!("missing required fields: {}", missing.join(", ")))
}

fn validate_level(level: u8) -> Result<(), RosterError> {
    if !(1..=20).contains(&level) {
        return Err(RosterError::validation(format!(
            "level must be between 1 and 20, got {}",
            level
        )));
    }
    Ok(())
}

fn apply_patch(character: &mut Character, patch: CharacterPatch) {
    let CharacterPatch {
        name,
        race,
        class,
        level,
        ability_scores,
        background,
        skills,
        equipment,
        spellcasting,
        features,
        hit_dice,
        backstory,
        notes,
    } = patch;

    if let Some(name) = name {
        character.name = name;
    }
    if let Some(race) = race {
        character.race = race;
    }
    if let Some(class) = class {
        character.class = class;
    }
    if let Some(level) = level {
        character.level = level;
    }
    if let Some(scores) = ability_scores {
        character.ability_scores = scores;
    }
    if let Some(background) = background {
        character.background = background;
    }
    if let Some(skills) = skills {
        character.skills = skills;
    }
    if let Some(equipment) = equipment {
        character.equipment = equipment;
    }
    if let Some(spellcasting) = spellcasting {
        character.spellcasting = spellcasting;
    }
    if let Some(features) = features {
        character.features = features;
    }
    if let Some(hit_dice) = hit_dice {
        character.hit_dice = hit_dice;
    }
    if let Some(backstory) = backstory {
        character.backstory = backstory;
    }
    if let Some(notes) = notes {
        character.notes = notes;
    }
}
