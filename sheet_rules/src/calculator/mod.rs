//! Stat Calculator - derives every calculated field of a character sheet.
//!
//! Recomputation runs in a fixed order over shared intermediates:
//! 1. **Abilities**: final scores (base + racial bonus) and their modifiers
//! 2. **Proficiency**: level-tiered bonus
//! 3. **Combat**: max HP, armor class, initiative
//! 4. **Proficiencies**: saving throws and the full skill table
//! 5. **Spellcasting**: save DC and attack bonus, if the character casts
//! 6. **Speed**: from the race
//!
//! The result is a fresh stats block with mutable state (current and
//! temporary HP) overlaid from the previous one.

mod racial;

pub use racial::*;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::entities::{
    AbilityModifiers, AbilityScores, CalculatedStats, Character, CharacterClass, EquipmentItem,
    Race, SavingThrow, SavingThrows, SkillEntry, Spellcasting,
};
use crate::mechanics::{proficiency_bonus, Ability, Skill};

/// Fallbacks used when reference data leaves a value unset.
#[derive(Debug, Clone)]
pub struct CalculatorConfig {
    /// Hit die size when the class has none.
    pub default_hit_die: u32,

    /// Walking speed when the race has none.
    pub default_speed: u32,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            default_hit_die: 8,
            default_speed: 30,
        }
    }
}

/// Mutable sheet state that survives recomputation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreservedState {
    pub current_hit_points: Option<i32>,
    pub temporary_hit_points: Option<i32>,
}

impl PreservedState {
    /// Capture the carried fields from a previous stats block.
    pub fn capture(previous: Option<&CalculatedStats>) -> Self {
        previous
            .map(|stats| Self {
                current_hit_points: Some(stats.current_hit_points),
                temporary_hit_points: stats.temporary_hit_points,
            })
            .unwrap_or_default()
    }

    /// Overlay the carried fields onto freshly derived stats.
    ///
    /// Without a prior value, current HP starts at max HP.
    pub fn overlay(self, mut stats: CalculatedStats) -> CalculatedStats {
        stats.current_hit_points = self.current_hit_points.unwrap_or(stats.max_hit_points);
        stats.temporary_hit_points = self.temporary_hit_points;
        stats
    }
}

/// The calculator. Pure: every call maps one snapshot to a new one.
#[derive(Debug, Clone, Default)]
pub struct StatCalculator {
    config: CalculatorConfig,
}

impl StatCalculator {
    /// Create a calculator with the given fallbacks.
    pub fn new(config: CalculatorConfig) -> Self {
        Self { config }
    }

    /// Create a calculator with default fallbacks.
    pub fn with_defaults() -> Self {
        Self::new(CalculatorConfig::default())
    }

    /// Recompute all derived fields, stamping `updated_at` with the current time.
    pub fn recompute(&self, character: Character) -> Character {
        self.recompute_at(character, Utc::now())
    }

    /// Recompute all derived fields, stamping `updated_at` with `now`.
    ///
    /// Skills are replaced by the full eighteen-entry table. A spellcasting
    /// block without a declared ability passes through untouched. Every other
    /// input field is left as is.
    pub fn recompute_at(&self, mut character: Character, now: DateTime<Utc>) -> Character {
        let bonuses = RacialBonuses::from_race(&character.race);
        let final_scores = final_ability_scores(&character.ability_scores, &bonuses);
        let modifiers = final_scores.modifiers();

        let proficiency = proficiency_bonus(character.level);
        let max_hp = max_hit_points(
            self.hit_die(&character.class),
            character.level,
            modifiers.get(Ability::Constitution),
        );
        let ac = armor_class(&character.equipment, modifiers.get(Ability::Dexterity));
        let init = initiative(&modifiers);
        let saves = saving_throws(&character.class, &modifiers, proficiency);
        let skills = skill_table(&character.skills, &modifiers, proficiency);
        let spellcasting =
            recompute_spellcasting(character.spellcasting.take(), &modifiers, proficiency);
        let speed = speed(&character.race, self.config.default_speed);

        let preserved = PreservedState::capture(character.calculated_stats.as_ref());
        let stats = preserved.overlay(CalculatedStats {
            proficiency_bonus: proficiency,
            final_ability_scores: final_scores,
            ability_modifiers: modifiers,
            saving_throws: saves,
            initiative: init,
            armor_class: ac,
            speed,
            max_hit_points: max_hp,
            current_hit_points: max_hp,
            temporary_hit_points: None,
        });

        debug!(
            character = %character.id,
            level = character.level,
            max_hp = stats.max_hit_points,
            ac = stats.armor_class,
            "recomputed character stats"
        );

        character.calculated_stats = Some(stats);
        character.skills = skills;
        character.spellcasting = spellcasting;
        character.updated_at = now;
        character
    }

    fn hit_die(&self, class: &CharacterClass) -> u32 {
        class
            .hit_die
            .filter(|d| *d > 0)
            .unwrap_or(self.config.default_hit_die)
    }
}

/// Racial bonus for a single ability; 0 without a race or listed bonus.
pub fn racial_bonus(race: Option<&Race>, ability: Ability) -> i32 {
    RacialBonuses::for_race(race).get(ability)
}

/// Base scores plus racial bonuses.
pub fn final_ability_scores(base: &AbilityScores, bonuses: &RacialBonuses) -> AbilityScores {
    AbilityScores::from_fn(|ability| base.get(ability).saturating_add(bonuses.get(ability)))
}

/// Maximum hit points using the fixed average roll for levels past the first.
///
/// Level 1 is never below 1 HP; higher levels are never below 1 HP per level.
/// Arithmetic saturates, so oversized hit dice cap at `i32::MAX`.
pub fn max_hit_points(hit_die: u32, level: u8, con_modifier: i32) -> i32 {
    let hit_die = i32::try_from(hit_die).unwrap_or(i32::MAX);
    let level = i32::from(level.max(1));
    let first_level = hit_die.saturating_add(con_modifier);

    if level == 1 {
        return first_level.max(1);
    }

    let per_level = (hit_die / 2 + 1).saturating_add(con_modifier);
    first_level
        .saturating_add((level - 1).saturating_mul(per_level))
        .max(level)
}

/// Unarmored AC is 10 + DEX. The first worn armor item with a literal AC
/// replaces it outright, with no DEX contribution.
pub fn armor_class(equipment: &[EquipmentItem], dex_modifier: i32) -> i32 {
    let base = 10 + dex_modifier;
    equipment
        .iter()
        .find(|item| item.is_worn_armor())
        .and_then(|armor| armor.ac)
        .filter(|ac| *ac != 0)
        .unwrap_or(base)
}

pub fn initiative(modifiers: &AbilityModifiers) -> i32 {
    modifiers.get(Ability::Dexterity)
}

/// Saving throws, proficient where the class lists the ability name exactly.
pub fn saving_throws(
    class: &CharacterClass,
    modifiers: &AbilityModifiers,
    proficiency: i32,
) -> SavingThrows {
    SavingThrows::from_fn(|ability| {
        let proficient = class.saving_throws.iter().any(|name| name == ability.name());
        SavingThrow {
            value: modifiers.get(ability) + if proficient { proficiency } else { 0 },
            proficient,
        }
    })
}

/// The full skill table in sheet order.
///
/// Flags come from the matching declared entry (name ignoring case); expertise
/// adds the proficiency bonus a second time.
pub fn skill_table(
    declared: &[SkillEntry],
    modifiers: &AbilityModifiers,
    proficiency: i32,
) -> Vec<SkillEntry> {
    Skill::ALL
        .iter()
        .map(|skill| {
            let entry = declared
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(skill.name()));
            let proficient = entry.is_some_and(|s| s.proficient);
            let expertise = entry.is_some_and(|s| s.expertise);

            let mut value = modifiers.get(skill.ability());
            if proficient {
                value += proficiency;
            }
            if expertise {
                value += proficiency;
            }

            SkillEntry {
                value,
                ..SkillEntry::declared(*skill, proficient, expertise)
            }
        })
        .collect()
}

/// The race's walking speed, or `default_speed` if it declares none.
pub fn speed(race: &Race, default_speed: u32) -> u32 {
    race.speed.filter(|s| *s > 0).unwrap_or(default_speed)
}

/// Spell save DC and attack bonus for a casting block.
///
/// Returns the block unchanged when it is absent or declares no ability.
pub fn recompute_spellcasting(
    block: Option<Spellcasting>,
    modifiers: &AbilityModifiers,
    proficiency: i32,
) -> Option<Spellcasting> {
    let mut block = block?;
    if let Some(ability) = block.spellcasting_ability {
        let modifier = modifiers.get(ability);
        block.spell_save_dc = Some(8 + modifier + proficiency);
        block.spell_attack_bonus = Some(modifier + proficiency);
    }
    Some(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{KnownSpell, SpellSlot};
    use chrono::TimeZone;

    fn wizard() -> Character {
        let mut character = Character::new(
            "Elminster",
            Race::new("High Elf").with_bonus("dexterity", 2).with_bonus("intelligence", 1),
            CharacterClass::new("Wizard")
                .with_hit_die(6)
                .with_saving_throws(["intelligence", "wisdom"]),
            5,
            AbilityScores::new(8, 14, 13, 15, 12, 10),
        );
        character.spellcasting = Some(Spellcasting {
            spell_slots: vec![SpellSlot {
                level: 1,
                total: 4,
                used: 2,
            }],
            spells_known: vec![KnownSpell {
                name: "Magic Missile".to_string(),
                index: "magic-missile".to_string(),
                level: 1,
                prepared: true,
            }],
            ..Spellcasting::with_ability(Ability::Intelligence)
        });
        character
    }

    fn fixed_time(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_max_hp_level_one_floor() {
        assert_eq!(max_hit_points(8, 1, -2), 6);
        assert_eq!(max_hit_points(6, 1, -5), 1);
    }

    #[test]
    fn test_max_hp_average_roll() {
        // 10 + 2 at first level, then (5 + 1 + 2) for four more levels.
        assert_eq!(max_hit_points(10, 5, 2), 44);
        assert_eq!(max_hit_points(12, 2, 0), 12 + 7);
    }

    #[test]
    fn test_max_hp_one_per_level_floor() {
        // 6 - 5 = 1 at first level, then (3 + 1 - 5) = -1 for each extra level.
        assert_eq!(max_hit_points(6, 4, -5), 4);
    }

    #[test]
    fn test_max_hp_saturates() {
        assert_eq!(max_hit_points(300_000_000, 20, 0), i32::MAX);
        assert_eq!(max_hit_points(u32::MAX, 1, 2), i32::MAX);
        assert_eq!(max_hit_points(u32::MAX, 3, -5), i32::MAX);
    }

    #[test]
    fn test_armor_class() {
        assert_eq!(armor_class(&[], 3), 13);
        assert_eq!(armor_class(&[], -1), 9);

        let plate = [EquipmentItem::armor("Chain Mail", 16)];
        assert_eq!(armor_class(&plate, 3), 16);
        assert_eq!(armor_class(&plate, -2), 16);
    }

    #[test]
    fn test_armor_class_first_worn_armor_only() {
        let mut stowed = EquipmentItem::armor("Plate", 18);
        stowed.equipped = false;
        let mut no_ac = EquipmentItem::armor("Padded", 0);
        no_ac.ac = None;
        let leather = EquipmentItem::armor("Leather", 11);

        assert_eq!(armor_class(&[stowed.clone(), leather.clone()], 2), 11);
        // The first worn armor has no AC, so the later one is ignored.
        assert_eq!(armor_class(&[no_ac, leather], 2), 12);
    }

    #[test]
    fn test_saving_throws_exact_match() {
        let class = CharacterClass::new("Rogue").with_saving_throws(["dexterity", "Intelligence"]);
        let mods = AbilityScores::new(10, 16, 10, 14, 10, 10).modifiers();
        let saves = saving_throws(&class, &mods, 2);

        assert_eq!(saves.dexterity, SavingThrow { value: 5, proficient: true });
        // Capitalized name in class data does not match.
        assert_eq!(saves.intelligence, SavingThrow { value: 2, proficient: false });
        assert_eq!(saves.strength.value, 0);
        assert_eq!(saves.get(Ability::Dexterity), saves.dexterity);
    }

    #[test]
    fn test_skill_expertise_stacks() {
        let declared = vec![SkillEntry::declared(Skill::Stealth, true, true)];
        let mods = AbilityScores::new(10, 12, 10, 10, 10, 10).modifiers();
        let skills = skill_table(&declared, &mods, 3);

        let stealth = skills.iter().find(|s| s.name == "stealth").unwrap();
        assert_eq!(stealth.value, 1 + 3 + 3);
        assert_eq!(stealth.ability_score, Some(Ability::Dexterity));
    }

    #[test]
    fn test_skill_table_is_complete_and_ordered() {
        let declared = vec![SkillEntry {
            name: "Animal Handling".to_string(),
            ability_score: None,
            proficient: true,
            expertise: false,
            value: 99,
        }];
        let mods = AbilityModifiers::default();
        let skills = skill_table(&declared, &mods, 2);

        assert_eq!(skills.len(), 18);
        let names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();
        let expected: Vec<&str> = Skill::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names, expected);
        assert_eq!(skills[1].value, 2);
        assert!(skills[1].proficient);
        assert!(skills.iter().filter(|s| s.proficient).count() == 1);
    }

    #[test]
    fn test_spellcasting_passthrough() {
        let mods = AbilityModifiers::default();
        assert_eq!(recompute_spellcasting(None, &mods, 2), None);

        let inert = Spellcasting {
            spell_save_dc: Some(42),
            ..Default::default()
        };
        let result = recompute_spellcasting(Some(inert.clone()), &mods, 2);
        assert_eq!(result, Some(inert));
    }

    #[test]
    fn test_racial_bonus_applied() {
        let race = Race::new("Half-Elf").with_bonus("charisma", 2);
        let base = AbilityScores {
            charisma: 15,
            ..Default::default()
        };
        let scores = final_ability_scores(&base, &RacialBonuses::from_race(&race));
        assert_eq!(scores.charisma, 17);
        assert_eq!(scores.modifiers().get(Ability::Charisma), 3);
        assert_eq!(racial_bonus(Some(&race), Ability::Charisma), 2);
        assert_eq!(racial_bonus(None, Ability::Charisma), 0);
    }

    #[test]
    fn test_recompute_wizard() {
        let calculator = StatCalculator::with_defaults();
        let character = calculator.recompute_at(wizard(), fixed_time(12));
        let stats = character.calculated_stats.as_ref().unwrap();

        assert_eq!(stats.proficiency_bonus, 3);
        assert_eq!(stats.final_ability_scores.dexterity, 16);
        assert_eq!(stats.final_ability_scores.intelligence, 16);
        assert_eq!(stats.ability_modifiers.get(Ability::Intelligence), 3);
        assert_eq!(stats.initiative, 3);
        assert_eq!(stats.armor_class, 13);
        assert_eq!(stats.speed, 30);
        // 6 + 1, then four levels of (3 + 1 + 1).
        assert_eq!(stats.max_hit_points, 27);
        assert_eq!(stats.current_hit_points, 27);
        assert_eq!(stats.saving_throws.intelligence.value, 6);
        assert_eq!(stats.saving_throws.strength.value, -1);

        let casting = character.spellcasting.as_ref().unwrap();
        assert_eq!(casting.spell_save_dc, Some(14));
        assert_eq!(casting.spell_attack_bonus, Some(6));
        assert_eq!(casting.spell_slots[0].used, 2);
        assert_eq!(casting.spells_known.len(), 1);

        assert_eq!(character.skills.len(), 18);
        assert_eq!(character.updated_at, fixed_time(12));
    }

    #[test]
    fn test_recompute_preserves_current_hp() {
        let calculator = StatCalculator::with_defaults();
        let mut character = calculator.recompute_at(wizard(), fixed_time(12));
        if let Some(stats) = character.calculated_stats.as_mut() {
            stats.current_hit_points = 0;
            stats.temporary_hit_points = Some(5);
        }

        character.level = 6;
        let character = calculator.recompute_at(character, fixed_time(13));
        let stats = character.calculated_stats.unwrap();

        assert_eq!(stats.max_hit_points, 32);
        assert_eq!(stats.current_hit_points, 0);
        assert_eq!(stats.temporary_hit_points, Some(5));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let calculator = StatCalculator::with_defaults();
        let once = calculator.recompute_at(wizard(), fixed_time(12));
        let twice = calculator.recompute_at(once.clone(), fixed_time(14));

        assert_eq!(once.calculated_stats, twice.calculated_stats);
        assert_eq!(once.skills, twice.skills);
        assert_eq!(once.spellcasting, twice.spellcasting);
        assert_ne!(once.updated_at, twice.updated_at);
    }

    #[test]
    fn test_non_caster_has_no_spellcasting() {
        let calculator = StatCalculator::with_defaults();
        let mut character = wizard();
        character.spellcasting = None;
        let character = calculator.recompute(character);
        assert!(character.spellcasting.is_none());
    }

    #[test]
    fn test_undeclared_spellcasting_gains_no_dc() {
        let calculator = StatCalculator::with_defaults();
        let mut character = wizard();
        character.spellcasting = Some(Spellcasting {
            spell_slots: vec![SpellSlot {
                level: 1,
                total: 2,
                used: 0,
            }],
            ..Default::default()
        });
        let character = calculator.recompute(character);
        assert!(!character.is_spellcaster());

        let json = serde_json::to_value(character.spellcasting.as_ref().unwrap()).unwrap();
        assert!(json.get("spellSaveDC").is_none());
        assert!(json.get("spellAttackBonus").is_none());
        assert_eq!(json["spellSlots"][0]["total"], 2);
    }

    #[test]
    fn test_speed() {
        assert_eq!(speed(&Race::new("Dwarf").with_speed(25), 30), 25);
        assert_eq!(speed(&Race::new("Unknown"), 30), 30);
    }

    #[test]
    fn test_config_fallbacks() {
        let calculator = StatCalculator::new(CalculatorConfig {
            default_hit_die: 10,
            default_speed: 25,
        });
        let character = Character::new(
            "Nobody",
            Race::new("Unknown"),
            CharacterClass::new("Unknown"),
            1,
            AbilityScores::default(),
        );
        let stats = calculator.recompute(character).calculated_stats.unwrap();
        assert_eq!(stats.max_hit_points, 10);
        assert_eq!(stats.speed, 25);
    }

    #[test]
    fn test_armor_overrides_dex_in_recompute() {
        let calculator = StatCalculator::with_defaults();
        let mut character = wizard();
        character.equipment.push(EquipmentItem::armor("Chain Mail", 16));
        let stats = calculator.recompute(character).calculated_stats.unwrap();
        assert_eq!(stats.armor_class, 16);
    }
}
