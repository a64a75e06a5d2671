//! Game mechanics: abilities, skills, proficiency, and modifiers.

use serde::{Deserialize, Serialize};

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    /// All abilities in canonical sheet order.
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    /// Lowercase name as used in reference data.
    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "strength",
            Ability::Dexterity => "dexterity",
            Ability::Constitution => "constitution",
            Ability::Intelligence => "intelligence",
            Ability::Wisdom => "wisdom",
            Ability::Charisma => "charisma",
        }
    }

    /// Parse an ability name, ignoring case.
    pub fn from_name(name: &str) -> Option<Ability> {
        Ability::ALL
            .into_iter()
            .find(|ability| ability.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The eighteen skills, each bound to one governing ability.
///
/// On the sheet a skill is identified by its lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Skill {
    Acrobatics,
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    SleightOfHand,
    Stealth,
    Survival,
}

/// Skill table: name and governing ability, in sheet order.
static SKILL_TABLE: [(Skill, &str, Ability); 18] = [
    (Skill::Acrobatics, "acrobatics", Ability::Dexterity),
    (Skill::AnimalHandling, "animal handling", Ability::Wisdom),
    (Skill::Arcana, "arcana", Ability::Intelligence),
    (Skill::Athletics, "athletics", Ability::Strength),
    (Skill::Deception, "deception", Ability::Charisma),
    (Skill::History, "history", Ability::Intelligence),
    (Skill::Insight, "insight", Ability::Wisdom),
    (Skill::Intimidation, "intimidation", Ability::Charisma),
    (Skill::Investigation, "investigation", Ability::Intelligence),
    (Skill::Medicine, "medicine", Ability::Wisdom),
    (Skill::Nature, "nature", Ability::Intelligence),
    (Skill::Perception, "perception", Ability::Wisdom),
    (Skill::Performance, "performance", Ability::Charisma),
    (Skill::Persuasion, "persuasion", Ability::Charisma),
    (Skill::Religion, "religion", Ability::Intelligence),
    (Skill::SleightOfHand, "sleight of hand", Ability::Dexterity),
    (Skill::Stealth, "stealth", Ability::Dexterity),
    (Skill::Survival, "survival", Ability::Wisdom),
];

impl Skill {
    /// All skills in sheet order.
    pub const ALL: [Skill; 18] = [
        Skill::Acrobatics,
        Skill::AnimalHandling,
        Skill::Arcana,
        Skill::Athletics,
        Skill::Deception,
        Skill::History,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Investigation,
        Skill::Medicine,
        Skill::Nature,
        Skill::Perception,
        Skill::Performance,
        Skill::Persuasion,
        Skill::Religion,
        Skill::SleightOfHand,
        Skill::Stealth,
        Skill::Survival,
    ];

    fn entry(&self) -> &'static (Skill, &'static str, Ability) {
        // SKILL_TABLE is indexed by discriminant.
        &SKILL_TABLE[*self as usize]
    }

    /// Lowercase display name ("sleight of hand").
    pub fn name(&self) -> &'static str {
        self.entry().1
    }

    /// The ability that governs this skill.
    pub fn ability(&self) -> Ability {
        self.entry().2
    }

    /// Parse a skill name, ignoring case.
    pub fn from_name(name: &str) -> Option<Skill> {
        Skill::ALL
            .into_iter()
            .find(|skill| skill.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Proficiency bonus for a character level.
pub fn proficiency_bonus(level: u8) -> i32 {
    match level {
        0..=4 => 2,
        5..=8 => 3,
        9..=12 => 4,
        13..=16 => 5,
        _ => 6,
    }
}

/// Modifier for an ability score, rounding toward negative infinity.
pub fn ability_modifier(score: i32) -> i32 {
    score.saturating_sub(10).div_euclid(2)
}
