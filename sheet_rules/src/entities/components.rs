//! Component definitions for character sheets.

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::mechanics::{ability_modifier, Ability, Skill};

/// Six ability scores. Missing fields deserialize to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

impl AbilityScores {
    pub fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        intelligence: i32,
        wisdom: i32,
        charisma: i32,
    ) -> Self {
        Self {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        }
    }

    /// Build a score set by evaluating `f` once per ability.
    pub fn from_fn(mut f: impl FnMut(Ability) -> i32) -> Self {
        Self {
            strength: f(Ability::Strength),
            dexterity: f(Ability::Dexterity),
            constitution: f(Ability::Constitution),
            intelligence: f(Ability::Intelligence),
            wisdom: f(Ability::Wisdom),
            charisma: f(Ability::Charisma),
        }
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    /// Modifiers for every score in this set.
    pub fn modifiers(&self) -> AbilityModifiers {
        AbilityModifiers(Self::from_fn(|ability| ability_modifier(self.get(ability))))
    }
}

/// Six ability modifiers, derived from final scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityModifiers(AbilityScores);

impl AbilityModifiers {
    pub fn get(&self, ability: Ability) -> i32 {
        self.0.get(ability)
    }
}

impl Default for AbilityModifiers {
    fn default() -> Self {
        Self(AbilityScores::from_fn(|_| 0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SavingThrow {
    pub value: i32,
    pub proficient: bool,
}

/// Saving throw per ability, keyed by ability name on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SavingThrows {
    pub strength: SavingThrow,
    pub dexterity: SavingThrow,
    pub constitution: SavingThrow,
    pub intelligence: SavingThrow,
    pub wisdom: SavingThrow,
    pub charisma: SavingThrow,
}

impl SavingThrows {
    pub fn from_fn(mut f: impl FnMut(Ability) -> SavingThrow) -> Self {
        Self {
            strength: f(Ability::Strength),
            dexterity: f(Ability::Dexterity),
            constitution: f(Ability::Constitution),
            intelligence: f(Ability::Intelligence),
            wisdom: f(Ability::Wisdom),
            charisma: f(Ability::Charisma),
        }
    }

    pub fn get(&self, ability: Ability) -> SavingThrow {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }
}

/// A skill line on the sheet.
///
/// On input only `name`, `proficient` and `expertise` matter; the rest is
/// filled in by recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEntry {
    pub name: String,
    #[serde(default, deserialize_with = "optional_ability")]
    pub ability_score: Option<Ability>,
    #[serde(default)]
    pub proficient: bool,
    #[serde(default)]
    pub expertise: bool,
    #[serde(default)]
    pub value: i32,
}

impl SkillEntry {
    /// A declared skill with the given flags and no computed value yet.
    pub fn declared(skill: Skill, proficient: bool, expertise: bool) -> Self {
        Self {
            name: skill.name().to_string(),
            ability_score: Some(skill.ability()),
            proficient,
            expertise,
            value: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentItem {
    pub name: String,
    #[serde(default)]
    pub index: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub equipped: bool,
    /// Free-form category, e.g. "Armor" or "Weapon".
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    /// Literal armor class granted when worn.
    #[serde(default)]
    pub ac: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

impl EquipmentItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: String::new(),
            quantity: 1,
            equipped: false,
            item_type: None,
            ac: None,
            description: None,
        }
    }

    /// Worn armor granting the given literal AC.
    pub fn armor(name: impl Into<String>, ac: i32) -> Self {
        Self {
            equipped: true,
            item_type: Some("Armor".to_string()),
            ac: Some(ac),
            ..Self::new(name)
        }
    }

    /// Whether this item is equipped and categorized as armor.
    pub fn is_worn_armor(&self) -> bool {
        self.equipped
            && self
                .item_type
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains("armor"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellSlot {
    pub level: u8,
    pub total: u32,
    pub used: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownSpell {
    pub name: String,
    #[serde(default)]
    pub index: String,
    pub level: u8,
    #[serde(default)]
    pub prepared: bool,
}

/// Spellcasting block. Slots and known spells are carried, never computed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spellcasting {
    #[serde(default, deserialize_with = "optional_ability")]
    pub spellcasting_ability: Option<Ability>,
    /// Set by recomputation only when an ability is declared.
    #[serde(
        default,
        rename = "spellSaveDC",
        skip_serializing_if = "Option::is_none"
    )]
    pub spell_save_dc: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spell_attack_bonus: Option<i32>,
    #[serde(default)]
    pub spell_slots: Vec<SpellSlot>,
    #[serde(default)]
    pub spells_known: Vec<KnownSpell>,
}

impl Spellcasting {
    pub fn with_ability(ability: Ability) -> Self {
        Self {
            spellcasting_ability: Some(ability),
            ..Default::default()
        }
    }
}

/// An ability name where a blank string means "none declared".
fn optional_ability<'de, D>(deserializer: D) -> Result<Option<Ability>, D::Error>
where
    D: Deserializer<'de>,
{
    let name = Option::<String>::deserialize(deserializer)?;
    match name.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => Ability::from_name(name)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unknown ability `{}`", name))),
    }
}

/// Every derived value on the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedStats {
    pub proficiency_bonus: i32,
    pub final_ability_scores: AbilityScores,
    pub ability_modifiers: AbilityModifiers,
    pub saving_throws: SavingThrows,
    pub initiative: i32,
    pub armor_class: i32,
    pub speed: u32,
    pub max_hit_points: i32,
    /// Carried across recomputation, never reset.
    pub current_hit_points: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary_hit_points: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_scores_default_to_ten() {
        let scores: AbilityScores =
            serde_json::from_str(r#"{"strength": 15, "charisma": 8}"#).unwrap();
        assert_eq!(scores.strength, 15);
        assert_eq!(scores.dexterity, 10);
        assert_eq!(scores.wisdom, 10);
        assert_eq!(scores.charisma, 8);
    }

    #[test]
    fn test_modifiers() {
        let scores = AbilityScores::new(18, 14, 12, 8, 10, 9);
        let mods = scores.modifiers();
        assert_eq!(mods.get(Ability::Strength), 4);
        assert_eq!(mods.get(Ability::Dexterity), 2);
        assert_eq!(mods.get(Ability::Constitution), 1);
        assert_eq!(mods.get(Ability::Intelligence), -1);
        assert_eq!(mods.get(Ability::Wisdom), 0);
        assert_eq!(mods.get(Ability::Charisma), -1);
    }

    #[test]
    fn test_worn_armor_detection() {
        let mut mail = EquipmentItem::armor("Chain Mail", 16);
        assert!(mail.is_worn_armor());

        mail.item_type = Some("Heavy ARMOR".to_string());
        assert!(mail.is_worn_armor());

        mail.equipped = false;
        assert!(!mail.is_worn_armor());

        let mut sword = EquipmentItem::new("Longsword");
        sword.equipped = true;
        sword.item_type = Some("Weapon".to_string());
        assert!(!sword.is_worn_armor());
    }

    #[test]
    fn test_equipment_wire_format() {
        let item: EquipmentItem = serde_json::from_str(
            r#"{"name": "Leather", "index": "leather-armor", "equipped": true, "type": "Armor", "ac": 11}"#,
        )
        .unwrap();
        assert_eq!(item.item_type.as_deref(), Some("Armor"));
        assert_eq!(item.ac, Some(11));
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_spellcasting_wire_keys() {
        let block = Spellcasting {
            spell_save_dc: Some(13),
            ..Spellcasting::with_ability(Ability::Intelligence)
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["spellcastingAbility"], "intelligence");
        assert_eq!(json["spellSaveDC"], 13);
        assert!(json["spellSlots"].as_array().unwrap().is_empty());
        assert!(json.get("spellAttackBonus").is_none());
    }

    #[test]
    fn test_blank_ability_means_none_declared() {
        let block: Spellcasting =
            serde_json::from_str(r#"{"spellcastingAbility": "  ", "spellSlots": []}"#).unwrap();
        assert_eq!(block.spellcasting_ability, None);

        let block: Spellcasting =
            serde_json::from_str(r#"{"spellcastingAbility": "Wisdom"}"#).unwrap();
        assert_eq!(block.spellcasting_ability, Some(Ability::Wisdom));

        let skill: SkillEntry =
            serde_json::from_str(r#"{"name": "arcana", "abilityScore": ""}"#).unwrap();
        assert_eq!(skill.ability_score, None);

        assert!(serde_json::from_str::<Spellcasting>(r#"{"spellcastingAbility": "luck"}"#).is_err());
    }
}
