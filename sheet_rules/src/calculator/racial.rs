//! Racial ability bonuses resolved into a per-ability map.

use std::collections::HashMap;

use crate::entities::Race;
use crate::mechanics::Ability;

/// Ability bonuses granted by a race, keyed by ability.
///
/// Built once per race from its bonus list. Names are matched ignoring case,
/// unknown names are skipped, and when an ability is listed more than once the
/// first entry wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RacialBonuses {
    bonuses: HashMap<Ability, i32>,
}

impl RacialBonuses {
    /// No bonuses at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_race(race: &Race) -> Self {
        let mut bonuses = HashMap::new();
        for entry in &race.ability_bonuses {
            if let Some(ability) = Ability::from_name(&entry.ability_score) {
                bonuses.entry(ability).or_insert(entry.bonus);
            }
        }
        Self { bonuses }
    }

    /// Bonuses for an optional race; absent race grants nothing.
    pub fn for_race(race: Option<&Race>) -> Self {
        race.map(Self::from_race).unwrap_or_default()
    }

    /// Bonus for one ability, 0 if none is listed.
    pub fn get(&self, ability: Ability) -> i32 {
        self.bonuses.get(&ability).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonus_lookup_ignores_case() {
        let race = Race::new("Half-Elf").with_bonus("CHA", 2).with_bonus("Charisma", 2);
        let bonuses = RacialBonuses::from_race(&race);
        // "CHA" is not an ability name, so only the second entry applies.
        assert_eq!(bonuses.get(Ability::Charisma), 2);
        assert_eq!(bonuses.get(Ability::Wisdom), 0);
    }

    #[test]
    fn test_first_duplicate_wins() {
        let race = Race::new("Odd")
            .with_bonus("strength", 2)
            .with_bonus("STRENGTH", 5);
        assert_eq!(RacialBonuses::from_race(&race).get(Ability::Strength), 2);
    }

    #[test]
    fn test_absent_race_grants_nothing() {
        let bonuses = RacialBonuses::for_race(None);
        assert!(bonuses.is_empty());
        assert_eq!(bonuses, RacialBonuses::none());
        for ability in Ability::ALL {
            assert_eq!(bonuses.get(ability), 0);
        }
    }
}
