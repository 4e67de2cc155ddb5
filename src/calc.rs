//! Derived-stat calculation.
//!
//! Pure, stateless query functions over a [`CharacterSnapshot`]: modifiers,
//! proficiency bonus, armor class, hit points, skill and saving-throw
//! bonuses, and the melee damage expression. These never fail a query;
//! unresolved lookups degrade to safe defaults (AC 10, HP 0).

use crate::character::{Ability, CharacterSnapshot, Skill};
use crate::classes::ClassStrategy;
use crate::dataset::{self, FeatureMechanic};
use crate::items::ArmorCategory;

/// The ability modifier for a raw score: `floor((score - 10) / 2)`.
pub fn ability_modifier(score: u8) -> i32 {
    (score as i32 - 10).div_euclid(2)
}

/// Level-scaled proficiency bonus.
pub fn proficiency_bonus(level: u8) -> i32 {
    match level {
        0..=4 => 2,
        5..=8 => 3,
        9..=12 => 4,
        13..=16 => 5,
        _ => 6,
    }
}

/// Racial bonus to one ability: the race's (and subrace's) fixed assignment
/// plus any floating bonuses assigned to this ability at creation.
pub fn racial_ability_bonus(snapshot: &CharacterSnapshot, ability: Ability) -> i32 {
    let race = dataset::race_def(snapshot.race);
    let mut bonus: i32 = race
        .fixed_bonuses
        .iter()
        .filter(|(a, _)| *a == ability)
        .map(|(_, b)| *b as i32)
        .sum();

    if let Some(subrace) = snapshot.subrace {
        bonus += dataset::subrace_def(subrace)
            .fixed_bonuses
            .iter()
            .filter(|(a, _)| *a == ability)
            .map(|(_, b)| *b as i32)
            .sum::<i32>();
    }

    for (idx, amount) in race.floating_bonuses.iter().enumerate() {
        if snapshot.floating_bonus_choices.get(idx) == Some(&ability) {
            bonus += *amount as i32;
        }
    }

    bonus
}

/// Effective ability score: base plus racial bonuses.
pub fn effective_ability(snapshot: &CharacterSnapshot, ability: Ability) -> u8 {
    let score = snapshot.abilities.get(ability) as i32 + racial_ability_bonus(snapshot, ability);
    score.clamp(0, u8::MAX as i32) as u8
}

/// Modifier of the effective ability score.
pub fn modifier(snapshot: &CharacterSnapshot, ability: Ability) -> i32 {
    ability_modifier(effective_ability(snapshot, ability))
}

/// Armor class from equipped items, DEX, and any class unarmored-defense
/// formula. A shield's flat bonus stacks on every armor category.
pub fn armor_class(snapshot: &CharacterSnapshot) -> i32 {
    let dex = modifier(snapshot, Ability::Dexterity);

    let base = match &snapshot.equipment.body {
        None => {
            let unarmored = 10 + dex;
            match ClassStrategy::new(snapshot).unarmored_defense() {
                Some(class_formula) => unarmored.max(class_formula),
                None => unarmored,
            }
        }
        Some(armor) => {
            let base_ac = armor.base_ac.unwrap_or(10) as i32;
            match armor.armor_category {
                Some(ArmorCategory::Light) => base_ac + dex,
                Some(ArmorCategory::Medium) => base_ac + dex.min(2),
                Some(ArmorCategory::Heavy) => base_ac,
                None => 10 + dex,
            }
        }
    };

    let shield = snapshot
        .equipment
        .off_hand
        .as_ref()
        .and_then(|i| i.shield_bonus)
        .unwrap_or(0) as i32;

    base + shield
}

/// Accrued maximum hit points. Later levels add frozen level-up rolls; this
/// never re-derives them.
pub fn hit_points(snapshot: &CharacterSnapshot) -> i32 {
    snapshot.max_hp.max(0)
}

/// Maximum hit points at level 1: hit die size + CON modifier, plus any
/// flat per-level HP features.
pub fn level_one_hit_points(snapshot: &CharacterSnapshot) -> i32 {
    let hit_die = dataset::class_def(snapshot.class).hit_die.sides() as i32;
    let base = hit_die + modifier(snapshot, Ability::Constitution) + hp_bonus_per_level(snapshot);
    base.max(0)
}

/// Sum of flat per-level HP grants across acquired features (Dwarven
/// Toughness, Draconic Resilience, Tough).
pub fn hp_bonus_per_level(snapshot: &CharacterSnapshot) -> i32 {
    snapshot
        .features
        .iter()
        .chain(snapshot.feats.iter())
        .filter_map(dataset::feature)
        .filter_map(|def| match def.mechanic {
            FeatureMechanic::HpBonusPerLevel(amount) => Some(amount),
            _ => None,
        })
        .sum()
}

/// Whether the character is proficient in a skill. Proficiency is
/// OR-combined across the background grant, race-trait grant, and class
/// choice; the sources never stack.
pub fn is_proficient(snapshot: &CharacterSnapshot, skill: Skill) -> bool {
    dataset::background_def(snapshot.background)
        .skill_grants
        .contains(&skill)
        || dataset::race_def(snapshot.race).skill_grants.contains(&skill)
        || snapshot.class_skill_choices.contains(&skill)
}

/// Skill check bonus: governing-ability modifier, plus proficiency bonus if
/// proficient (doubled if the skill is in the expertise set).
pub fn skill_bonus(snapshot: &CharacterSnapshot, skill: Skill) -> i32 {
    let ability_mod = modifier(snapshot, skill.ability());
    if !is_proficient(snapshot, skill) {
        return ability_mod;
    }
    let multiplier = if snapshot.expertise.contains(&skill) {
        2
    } else {
        1
    };
    ability_mod + proficiency_bonus(snapshot.level) * multiplier
}

/// Saving-throw bonus: ability modifier plus proficiency bonus when the
/// class grants that save.
pub fn saving_throw_bonus(snapshot: &CharacterSnapshot, ability: Ability) -> i32 {
    let ability_mod = modifier(snapshot, ability);
    if dataset::class_def(snapshot.class)
        .saving_throws
        .contains(&ability)
    {
        ability_mod + proficiency_bonus(snapshot.level)
    } else {
        ability_mod
    }
}

/// Passive perception: 10 + the Perception skill bonus.
pub fn passive_perception(snapshot: &CharacterSnapshot) -> i32 {
    10 + skill_bonus(snapshot, Skill::Perception)
}

/// The melee damage expression for the current main hand: weapon dice plus
/// the attack ability modifier, substituting the two-handed dice when a
/// versatile weapon is held in both hands. Unarmed is `1 + STR modifier`
/// unless the class supplies an unarmed die.
pub fn melee_damage_expression(snapshot: &CharacterSnapshot) -> String {
    let str_mod = modifier(snapshot, Ability::Strength);
    let dex_mod = modifier(snapshot, Ability::Dexterity);

    if let Some(weapon) = &snapshot.equipment.main_hand {
        if let Some(dice) = &weapon.damage_dice {
            let dice = if snapshot.two_handed_grip {
                weapon.versatile_dice().unwrap_or(dice.as_str())
            } else {
                dice.as_str()
            };
            let attack_mod = if weapon.is_finesse() {
                str_mod.max(dex_mod)
            } else {
                str_mod
            };
            return with_modifier(dice, attack_mod);
        }
    }

    match ClassStrategy::new(snapshot).martial_arts_die() {
        Some(die) => with_modifier(&format!("1{die}"), str_mod.max(dex_mod)),
        None => format!("{}", (1 + str_mod).max(0)),
    }
}

/// Append a signed modifier to a dice notation.
fn with_modifier(dice: &str, modifier: i32) -> String {
    if modifier > 0 {
        format!("{dice}+{modifier}")
    } else if modifier < 0 {
        format!("{dice}{modifier}")
    } else {
        dice.to_string()
    }
}
