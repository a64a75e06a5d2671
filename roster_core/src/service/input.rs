//! Request shapes accepted by the roster service.

use serde::{Deserialize, Deserializer, Serialize};

use sheet_rules::{
    AbilityScores, Background, CharacterClass, EquipmentItem, Feature, HitDice, Race, SkillEntry,
    Spellcasting,
};

/// A character creation request.
///
/// Required fields are optional here so that a request missing them can be
/// reported as a validation failure naming every absent field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCharacter {
    pub name: Option<String>,
    pub race: Option<Race>,
    pub class: Option<CharacterClass>,
    pub level: Option<u8>,
    pub ability_scores: Option<AbilityScores>,
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
    #[serde(default)]
    pub hit_dice: Option<HitDice>,
    #[serde(default)]
    pub backstory: String,
    #[serde(default)]
    pub notes: String,
}

impl NewCharacter {
    /// A request with every required field set.
    pub fn new(
        name: impl Into<String>,
        race: Race,
        class: CharacterClass,
        level: u8,
        ability_scores: AbilityScores,
    ) -> Self {
        Self {
            name: Some(name.into()),
            race: Some(race),
            class: Some(class),
            level: Some(level),
            ability_scores: Some(ability_scores),
            ..Default::default()
        }
    }

    /// Names of required fields that are absent or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            missing.push("name");
        }
        if self.race.is_none() {
            missing.push("race");
        }
        if self.class.is_none() {
            missing.push("class");
        }
        if self.level.map_or(true, |l| l == 0) {
            missing.push("level");
        }
        if self.ability_scores.is_none() {
            missing.push("abilityScores");
        }
        missing
    }
}

/// A partial update. `None` leaves the stored field alone.
///
/// `background` and `spellcasting` can be cleared: an explicit `null` on the
/// wire arrives as `Some(None)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterPatch {
    pub name: Option<String>,
    pub race: Option<Race>,
    pub class: Option<CharacterClass>,
    pub level: Option<u8>,
    pub ability_scores: Option<AbilityScores>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub background: Option<Option<Background>>,
    pub skills: Option<Vec<SkillEntry>>,
    pub equipment: Option<Vec<EquipmentItem>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub spellcasting: Option<Option<Spellcasting>>,
    pub features: Option<Vec<Feature>>,
    pub hit_dice: Option<HitDice>,
    pub backstory: Option<String>,
    pub notes: Option<String>,
}

impl CharacterPatch {
    /// Whether the patch touches an input the derived stats depend on.
    pub fn requires_recompute(&self) -> bool {
        self.level.is_some()
            || self.ability_scores.is_some()
            || self.race.is_some()
            || self.class.is_some()
            || self.equipment.is_some()
    }
}

/// Marks a field as present, so `null` becomes `Some(None)`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
