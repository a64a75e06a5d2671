//! Race and class reference entities.

use serde::{Deserialize, Serialize};

/// A racial ability bonus as it appears in reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityBonus {
    /// Ability name, matched case-insensitively.
    pub ability_score: String,
    pub bonus: i32,
}

impl AbilityBonus {
    pub fn new(ability_score: impl Into<String>, bonus: i32) -> Self {
        Self {
            ability_score: ability_score.into(),
            bonus,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceTrait {
    pub name: String,
    pub description: String,
}

/// Race reference data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub name: String,
    #[serde(default)]
    pub index: String,
    /// Scanned in order; the first entry for an ability wins.
    #[serde(default)]
    pub ability_bonuses: Vec<AbilityBonus>,
    #[serde(default)]
    pub size: Option<String>,
    /// Base walking speed in feet.
    #[serde(default)]
    pub speed: Option<u32>,
    #[serde(default)]
    pub traits: Vec<RaceTrait>,
}

impl Race {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_bonus(mut self, ability: impl Into<String>, bonus: i32) -> Self {
        self.ability_bonuses.push(AbilityBonus::new(ability, bonus));
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = Some(speed);
        self
    }
}

/// Class reference data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterClass {
    pub name: String,
    #[serde(default)]
    pub index: String,
    /// Hit die size, e.g. 10 for a d10.
    #[serde(default)]
    pub hit_die: Option<u32>,
    #[serde(default)]
    pub proficiencies: Vec<String>,
    /// Ability names granted saving-throw proficiency, matched exactly.
    #[serde(default)]
    pub saving_throws: Vec<String>,
}

impl CharacterClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_hit_die(mut self, hit_die: u32) -> Self {
        self.hit_die = Some(hit_die);
        self
    }

    pub fn with_saving_throws<I, S>(mut self, abilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.saving_throws.extend(abilities.into_iter().map(Into::into));
        self
    }
}
