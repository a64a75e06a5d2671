//! Character definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    AbilityScores, CalculatedStats, CharacterClass, CharacterId, EquipmentItem, Race, SkillEntry,
    Spellcasting,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub name: String,
    #[serde(default)]
    pub feature: serde_json::Value,
    #[serde(default)]
    pub proficiencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitDice {
    pub total: u32,
    pub current: u32,
    /// Die notation, e.g. "d10".
    #[serde(rename = "type")]
    pub die: String,
}

impl HitDice {
    /// One die per level, all available, sized by the class hit die (d8 if unset).
    pub fn for_class(level: u8, class: &CharacterClass) -> Self {
        let size = class.hit_die.filter(|d| *d > 0).unwrap_or(8);
        Self {
            total: u32::from(level),
            current: u32::from(level),
            die: format!("d{}", size),
        }
    }
}

/// A full character record: user inputs plus the derived stats block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub race: Race,
    pub class: CharacterClass,
    pub level: u8,
    pub ability_scores: AbilityScores,

    #[serde(default)]
    pub background: Option<Background>,
    #[serde(default)]
    pub skills: Vec<SkillEntry>,
    #[serde(default)]
    pub equipment: Vec<EquipmentItem>,
    #[serde(default)]
    pub spellcasting: Option<Spellcasting>,
    #[serde(default)]
    pub features: Vec<Feature>,
    pub hit_dice: HitDice,

    // Free text
    #[serde(default)]
    pub backstory: String,
    #[serde(default)]
    pub notes: String,

    /// Absent until the first recompute.
    #[serde(default)]
    pub calculated_stats: Option<CalculatedStats>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    /// Create a character with a fresh id and default sheet contents.
    ///
    /// Stats are not computed; run the calculator before storing.
    pub fn new(
        name: impl Into<String>,
        race: Race,
        class: CharacterClass,
        level: u8,
        ability_scores: AbilityScores,
    ) -> Self {
        let now = Utc::now();
        let hit_dice = HitDice::for_class(level, &class);
        Self {
            id: CharacterId::new(),
            name: name.into(),
            race,
            class,
            level,
            ability_scores,
            background: None,
            skills: Vec::new(),
            equipment: Vec::new(),
            spellcasting: None,
            features: Vec::new(),
            hit_dice,
            backstory: String::new(),
            notes: String::new(),
            calculated_stats: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the character declares a spellcasting ability.
    pub fn is_spellcaster(&self) -> bool {
        self.spellcasting
            .as_ref()
            .is_some_and(|s| s.spellcasting_ability.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanics::Ability;

    fn fighter() -> Character {
        Character::new(
            "Roland",
            Race::new("Human").with_speed(30),
            CharacterClass::new("Fighter").with_hit_die(10),
            3,
            AbilityScores::new(16, 12, 14, 10, 10, 8),
        )
    }

    #[test]
    fn test_new_character() {
        let character = fighter();
        assert_eq!(character.name, "Roland");
        assert_eq!(character.hit_dice.die, "d10");
        assert_eq!(character.hit_dice.total, 3);
        assert!(character.calculated_stats.is_none());
        assert_eq!(character.created_at, character.updated_at);
    }

    #[test]
    fn test_hit_dice_default_size() {
        let dice = HitDice::for_class(2, &CharacterClass::new("Commoner"));
        assert_eq!(dice.die, "d8");
        assert_eq!(dice.current, 2);
    }

    #[test]
    fn test_is_spellcaster() {
        let mut character = fighter();
        assert!(!character.is_spellcaster());

        character.spellcasting = Some(Spellcasting::default());
        assert!(!character.is_spellcaster());

        character.spellcasting = Some(Spellcasting::with_ability(Ability::Intelligence));
        assert!(character.is_spellcaster());
    }

    #[test]
    fn test_wire_format_uses_class_key() {
        let json = serde_json::to_value(fighter()).unwrap();
        assert_eq!(json["class"]["name"], "Fighter");
        assert_eq!(json["abilityScores"]["strength"], 16);
        assert_eq!(json["hitDice"]["type"], "d10");
        assert!(json["calculatedStats"].is_null());
    }
}
