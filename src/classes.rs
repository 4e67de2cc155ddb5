//! Class rule sets behind one strategy contract.
//!
//! Every class implements [`ClassRules`]; [`ClassStrategy`] pairs the rules
//! with a snapshot and exposes the full query surface. Strategies are cheap
//! to construct and hold no state beyond the snapshot borrow, so they are
//! built fresh for every query and never cached across mutations.
//!
//! Querying a capability a class does not have returns `None` or a neutral
//! value, never an error. Subclass-gated hooks branch on feature-key
//! presence in the snapshot, not on subclass identity.

use crate::calc;
use crate::character::{Ability, CharacterSnapshot, ClassKind};
use crate::dataset::{self, FeatureMechanic};
use crate::dice::DieType;
use crate::resources::{PoolKind, RechargeRule, ResourcePool};
use crate::spells::{DamageType, SpellSchool};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three spell-quantity shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellQuantityModel {
    /// A flat per-level known-spells table (Bard, Sorcerer, Warlock, Ranger).
    KnownSpells,
    /// `max(1, ability modifier + level)` prepared from the full class list
    /// (Cleric, Druid, Paladin).
    PreparedSpells,
    /// The prepared-count formula, drawing from the spellbook (Wizard).
    Spellbook,
}

/// Metamagic options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metamagic {
    CarefulSpell,
    DistantSpell,
    EmpoweredSpell,
    ExtendedSpell,
    HeightenedSpell,
    QuickenedSpell,
    SubtleSpell,
    TwinnedSpell,
}

impl Metamagic {
    pub fn name(&self) -> &'static str {
        match self {
            Metamagic::CarefulSpell => "Careful Spell",
            Metamagic::DistantSpell => "Distant Spell",
            Metamagic::EmpoweredSpell => "Empowered Spell",
            Metamagic::ExtendedSpell => "Extended Spell",
            Metamagic::HeightenedSpell => "Heightened Spell",
            Metamagic::QuickenedSpell => "Quickened Spell",
            Metamagic::SubtleSpell => "Subtle Spell",
            Metamagic::TwinnedSpell => "Twinned Spell",
        }
    }
}

impl fmt::Display for Metamagic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Strategy
// ============================================================================

/// Class rules paired with the snapshot they answer for.
pub struct ClassStrategy<'a> {
    snapshot: &'a CharacterSnapshot,
    rules: &'static dyn ClassRules,
}

impl<'a> ClassStrategy<'a> {
    /// Build the strategy for the snapshot's class.
    pub fn new(snapshot: &'a CharacterSnapshot) -> Self {
        Self {
            snapshot,
            rules: rules_for(snapshot.class),
        }
    }

    pub fn class(&self) -> ClassKind {
        self.rules.class()
    }

    /// The class's fixed pair of saving-throw proficiencies.
    pub fn saving_throw_proficiencies(&self) -> [Ability; 2] {
        dataset::class_def(self.class()).saving_throws
    }

    // ------------------------------------------------------------------
    // Spellcasting
    // ------------------------------------------------------------------

    pub fn spellcasting_ability(&self) -> Option<Ability> {
        self.rules.spellcasting_ability()
    }

    /// Whether the character casts spells at the current level. Half
    /// casters have no slots at level 1 and are not yet casters.
    pub fn is_spellcaster(&self) -> bool {
        self.spellcasting_ability().is_some()
            && dataset::max_spell_level(self.class(), self.snapshot.level) > 0
    }

    /// Spell save DC: `8 + proficiency bonus + casting ability modifier`.
    /// `None` for non-casters.
    pub fn spell_save_dc(&self) -> Option<i32> {
        if !self.is_spellcaster() {
            return None;
        }
        let ability = self.spellcasting_ability()?;
        Some(
            8 + calc::proficiency_bonus(self.snapshot.level)
                + calc::modifier(self.snapshot, ability),
        )
    }

    /// Spell attack bonus: `proficiency bonus + casting ability modifier`.
    pub fn spell_attack_bonus(&self) -> Option<i32> {
        if !self.is_spellcaster() {
            return None;
        }
        let ability = self.spellcasting_ability()?;
        Some(calc::proficiency_bonus(self.snapshot.level) + calc::modifier(self.snapshot, ability))
    }

    pub fn spell_quantity_model(&self) -> Option<SpellQuantityModel> {
        self.rules.quantity_model()
    }

    /// How many leveled spells the character may know or prepare right now.
    pub fn spell_capacity(&self) -> Option<u8> {
        let model = self.spell_quantity_model()?;
        match model {
            SpellQuantityModel::KnownSpells => {
                dataset::spells_known(self.class(), self.snapshot.level)
            }
            SpellQuantityModel::PreparedSpells | SpellQuantityModel::Spellbook => {
                let ability = self.spellcasting_ability()?;
                let count = calc::modifier(self.snapshot, ability) + self.snapshot.level as i32;
                Some(count.max(1) as u8)
            }
        }
    }

    // ------------------------------------------------------------------
    // Resource pool
    // ------------------------------------------------------------------

    /// The class's signature resource pool at the snapshot's level, if any.
    /// The pool comes back full; the caller preserves spent counts.
    pub fn resource_pool(&self) -> Option<(PoolKind, ResourcePool)> {
        self.rules.resource_pool(self.snapshot)
    }

    // ------------------------------------------------------------------
    // Feature-bonus hooks
    // ------------------------------------------------------------------

    /// Class unarmored-defense AC, from feature mechanics (`10 + DEX + X`).
    pub fn unarmored_defense(&self) -> Option<i32> {
        let dex = calc::modifier(self.snapshot, Ability::Dexterity);
        self.feature_mechanics()
            .filter_map(|mechanic| match mechanic {
                FeatureMechanic::UnarmoredDefense(second) => {
                    Some(10 + dex + calc::modifier(self.snapshot, *second))
                }
                _ => None,
            })
            .max()
    }

    /// Monk martial-arts die at the current level.
    pub fn martial_arts_die(&self) -> Option<DieType> {
        self.rules.martial_arts_die(self.snapshot)
    }

    /// Rage damage bonus by level tier.
    pub fn rage_damage_bonus(&self) -> Option<i32> {
        self.rules.rage_damage_bonus(self.snapshot)
    }

    /// Sneak-attack dice, e.g. `"3d6"`.
    pub fn sneak_attack_dice(&self) -> Option<String> {
        self.rules.sneak_attack_dice(self.snapshot)
    }

    /// Divine smite dice for a slot level, e.g. `"2d8"`.
    pub fn divine_smite_dice(&self, slot_level: u8, vs_fiend_or_undead: bool) -> Option<String> {
        self.rules
            .divine_smite_dice(self.snapshot, slot_level, vs_fiend_or_undead)
    }

    /// Divine Strike bonus dice and damage type, shared across the domain
    /// variants that carry the feature.
    pub fn divine_strike(&self) -> Option<(String, DamageType)> {
        let damage_type = self
            .feature_mechanics()
            .find_map(|mechanic| match mechanic {
                FeatureMechanic::DivineStrike { damage_type } => Some(*damage_type),
                _ => None,
            })?;
        let dice = if self.snapshot.level >= 14 { "2d8" } else { "1d8" };
        Some((dice.to_string(), damage_type))
    }

    /// CHA modifier added once to spell damage matching the draconic
    /// ancestry; 0 otherwise.
    pub fn elemental_affinity_bonus(&self, damage_type: DamageType) -> i32 {
        self.rules
            .elemental_affinity_bonus(self.snapshot, damage_type)
    }

    /// INT modifier added once to evocation spell damage; 0 otherwise.
    pub fn empowered_evocation_bonus(&self, school: SpellSchool) -> i32 {
        self.rules.empowered_evocation_bonus(self.snapshot, school)
    }

    /// Sorcery-point cost of a metamagic option on a spell of the given
    /// level. `None` when metamagic is not available.
    pub fn metamagic_cost(&self, metamagic: Metamagic, spell_level: u8) -> Option<u8> {
        self.rules
            .metamagic_cost(self.snapshot, metamagic, spell_level)
    }

    /// Natural d20 face on which attacks critically hit: 20, or 19/18 with
    /// the widened-range features.
    pub fn critical_hit_floor(&self) -> u32 {
        self.feature_mechanics()
            .filter_map(|mechanic| match mechanic {
                FeatureMechanic::ImprovedCritical { floor } => Some(*floor),
                _ => None,
            })
            .min()
            .unwrap_or(20)
    }

    /// Attacks per attack action.
    pub fn attacks_per_action(&self) -> u8 {
        self.rules.attacks_per_action(self.snapshot)
    }

    /// Battle Master superiority die size, feature-gated.
    pub fn superiority_die(&self) -> Option<DieType> {
        self.feature_mechanics()
            .filter_map(|mechanic| match mechanic {
                FeatureMechanic::SuperiorityDieSize(die) => Some(*die),
                _ => None,
            })
            .max_by_key(|die| die.sides())
    }

    /// Mechanics of every acquired feature that still resolves. Unresolved
    /// keys grant nothing.
    fn feature_mechanics(&self) -> impl Iterator<Item = &'static FeatureMechanic> + '_ {
        self.snapshot
            .features
            .iter()
            .chain(self.snapshot.feats.iter())
            .filter_map(dataset::feature)
            .map(|def| &def.mechanic)
    }
}

// ============================================================================
// Per-class rules
// ============================================================================

/// The shared contract. Defaults are the neutral answers; each class
/// overrides what applies to it.
trait ClassRules: Sync {
    fn class(&self) -> ClassKind;

    fn spellcasting_ability(&self) -> Option<Ability> {
        None
    }

    fn quantity_model(&self) -> Option<SpellQuantityModel> {
        None
    }

    fn resource_pool(&self, _snapshot: &CharacterSnapshot) -> Option<(PoolKind, ResourcePool)> {
        None
    }

    fn martial_arts_die(&self, _snapshot: &CharacterSnapshot) -> Option<DieType> {
        None
    }

    fn rage_damage_bonus(&self, _snapshot: &CharacterSnapshot) -> Option<i32> {
        None
    }

    fn sneak_attack_dice(&self, _snapshot: &CharacterSnapshot) -> Option<String> {
        None
    }

    fn divine_smite_dice(
        &self,
        _snapshot: &CharacterSnapshot,
        _slot_level: u8,
        _vs_fiend_or_undead: bool,
    ) -> Option<String> {
        None
    }

    fn elemental_affinity_bonus(
        &self,
        _snapshot: &CharacterSnapshot,
        _damage_type: DamageType,
    ) -> i32 {
        0
    }

    fn empowered_evocation_bonus(
        &self,
        _snapshot: &CharacterSnapshot,
        _school: SpellSchool,
    ) -> i32 {
        0
    }

    fn metamagic_cost(
        &self,
        _snapshot: &CharacterSnapshot,
        _metamagic: Metamagic,
        _spell_level: u8,
    ) -> Option<u8> {
        None
    }

    fn attacks_per_action(&self, snapshot: &CharacterSnapshot) -> u8 {
        if snapshot.has_feature_key("extra_attack") {
            2
        } else {
            1
        }
    }
}

fn rules_for(class: ClassKind) -> &'static dyn ClassRules {
    match class {
        ClassKind::Barbarian => &Barbarian,
        ClassKind::Bard => &Bard,
        ClassKind::Cleric => &Cleric,
        ClassKind::Druid => &Druid,
        ClassKind::Fighter => &Fighter,
        ClassKind::Monk => &Monk,
        ClassKind::Paladin => &Paladin,
        ClassKind::Ranger => &Ranger,
        ClassKind::Rogue => &Rogue,
        ClassKind::Sorcerer => &Sorcerer,
        ClassKind::Warlock => &Warlock,
        ClassKind::Wizard => &Wizard,
    }
}

struct Barbarian;

impl ClassRules for Barbarian {
    fn class(&self) -> ClassKind {
        ClassKind::Barbarian
    }

    fn resource_pool(&self, snapshot: &CharacterSnapshot) -> Option<(PoolKind, ResourcePool)> {
        if !snapshot.has_feature_key("rage") {
            return None;
        }
        let pool = if snapshot.level >= 20 {
            ResourcePool::unlimited(RechargeRule::Both)
        } else {
            let max = match snapshot.level {
                0..=2 => 2,
                3..=5 => 3,
                6..=11 => 4,
                12..=16 => 5,
                _ => 6,
            };
            ResourcePool::full(max, RechargeRule::Both)
        };
        Some((PoolKind::RageUses, pool))
    }

    fn rage_damage_bonus(&self, snapshot: &CharacterSnapshot) -> Option<i32> {
        if !snapshot.has_feature_key("rage") {
            return None;
        }
        Some(match snapshot.level {
            0..=8 => 2,
            9..=15 => 3,
            _ => 4,
        })
    }
}

struct Bard;

impl ClassRules for Bard {
    fn class(&self) -> ClassKind {
        ClassKind::Bard
    }

    fn spellcasting_ability(&self) -> Option<Ability> {
        Some(Ability::Charisma)
    }

    fn quantity_model(&self) -> Option<SpellQuantityModel> {
        Some(SpellQuantityModel::KnownSpells)
    }
}

struct Cleric;

impl ClassRules for Cleric {
    fn class(&self) -> ClassKind {
        ClassKind::Cleric
    }

    fn spellcasting_ability(&self) -> Option<Ability> {
        Some(Ability::Wisdom)
    }

    fn quantity_model(&self) -> Option<SpellQuantityModel> {
        Some(SpellQuantityModel::PreparedSpells)
    }
}

struct Druid;

impl ClassRules for Druid {
    fn class(&self) -> ClassKind {
        ClassKind::Druid
    }

    fn spellcasting_ability(&self) -> Option<Ability> {
        Some(Ability::Wisdom)
    }

    fn quantity_model(&self) -> Option<SpellQuantityModel> {
        Some(SpellQuantityModel::PreparedSpells)
    }
}

struct Fighter;

impl ClassRules for Fighter {
    fn class(&self) -> ClassKind {
        ClassKind::Fighter
    }

    fn resource_pool(&self, snapshot: &CharacterSnapshot) -> Option<(PoolKind, ResourcePool)> {
        if !snapshot.has_feature_key("combat_superiority") {
            return None;
        }
        let max = match snapshot.level {
            0..=6 => 4,
            7..=14 => 5,
            _ => 6,
        };
        Some((
            PoolKind::SuperiorityDice,
            ResourcePool::full(max, RechargeRule::Both),
        ))
    }

    fn attacks_per_action(&self, snapshot: &CharacterSnapshot) -> u8 {
        match snapshot.level {
            0..=4 => 1,
            5..=10 => 2,
            11..=19 => 3,
            _ => 4,
        }
    }
}

struct Monk;

impl ClassRules for Monk {
    fn class(&self) -> ClassKind {
        ClassKind::Monk
    }

    fn resource_pool(&self, snapshot: &CharacterSnapshot) -> Option<(PoolKind, ResourcePool)> {
        if !snapshot.has_feature_key("ki") {
            return None;
        }
        Some((
            PoolKind::Ki,
            ResourcePool::full(snapshot.level, RechargeRule::Both),
        ))
    }

    fn martial_arts_die(&self, snapshot: &CharacterSnapshot) -> Option<DieType> {
        if !snapshot.has_feature_key("martial_arts") {
            return None;
        }
        Some(match snapshot.level {
            0..=4 => DieType::D4,
            5..=10 => DieType::D6,
            11..=16 => DieType::D8,
            _ => DieType::D10,
        })
    }
}

struct Paladin;

impl ClassRules for Paladin {
    fn class(&self) -> ClassKind {
        ClassKind::Paladin
    }

    fn spellcasting_ability(&self) -> Option<Ability> {
        Some(Ability::Charisma)
    }

    fn quantity_model(&self) -> Option<SpellQuantityModel> {
        Some(SpellQuantityModel::PreparedSpells)
    }

    fn divine_smite_dice(
        &self,
        snapshot: &CharacterSnapshot,
        slot_level: u8,
        vs_fiend_or_undead: bool,
    ) -> Option<String> {
        if !snapshot.has_feature_key("divine_smite") {
            return None;
        }
        let mut dice = (1 + slot_level).min(5);
        if vs_fiend_or_undead {
            dice = (dice + 1).min(6);
        }
        Some(format!("{dice}d8"))
    }
}

struct Ranger;

impl ClassRules for Ranger {
    fn class(&self) -> ClassKind {
        ClassKind::Ranger
    }

    fn spellcasting_ability(&self) -> Option<Ability> {
        Some(Ability::Wisdom)
    }

    fn quantity_model(&self) -> Option<SpellQuantityModel> {
        Some(SpellQuantityModel::KnownSpells)
    }
}

struct Rogue;

impl ClassRules for Rogue {
    fn class(&self) -> ClassKind {
        ClassKind::Rogue
    }

    fn sneak_attack_dice(&self, snapshot: &CharacterSnapshot) -> Option<String> {
        if !snapshot.has_feature_key("sneak_attack") {
            return None;
        }
        let count = (snapshot.level as u32).div_ceil(2).min(10);
        Some(format!("{count}d6"))
    }
}

struct Sorcerer;

impl ClassRules for Sorcerer {
    fn class(&self) -> ClassKind {
        ClassKind::Sorcerer
    }

    fn spellcasting_ability(&self) -> Option<Ability> {
        Some(Ability::Charisma)
    }

    fn quantity_model(&self) -> Option<SpellQuantityModel> {
        Some(SpellQuantityModel::KnownSpells)
    }

    fn resource_pool(&self, snapshot: &CharacterSnapshot) -> Option<(PoolKind, ResourcePool)> {
        // Font of Magic arrives at level 2; no sorcery points before that.
        if !snapshot.has_feature_key("font_of_magic") {
            return None;
        }
        Some((
            PoolKind::SorceryPoints,
            ResourcePool::full(snapshot.level, RechargeRule::LongRest),
        ))
    }

    fn elemental_affinity_bonus(
        &self,
        snapshot: &CharacterSnapshot,
        damage_type: DamageType,
    ) -> i32 {
        if snapshot.has_feature_key("elemental_affinity")
            && snapshot.draconic_ancestry == Some(damage_type)
        {
            calc::modifier(snapshot, Ability::Charisma)
        } else {
            0
        }
    }

    fn metamagic_cost(
        &self,
        snapshot: &CharacterSnapshot,
        metamagic: Metamagic,
        spell_level: u8,
    ) -> Option<u8> {
        if !snapshot.has_feature_key("metamagic") {
            return None;
        }
        Some(match metamagic {
            // Twinning costs the spell level, minimum 1 for cantrips.
            Metamagic::TwinnedSpell => spell_level.max(1),
            Metamagic::QuickenedSpell => 2,
            Metamagic::HeightenedSpell => 3,
            _ => 1,
        })
    }
}

struct Warlock;

impl ClassRules for Warlock {
    fn class(&self) -> ClassKind {
        ClassKind::Warlock
    }

    fn spellcasting_ability(&self) -> Option<Ability> {
        Some(Ability::Charisma)
    }

    fn quantity_model(&self) -> Option<SpellQuantityModel> {
        Some(SpellQuantityModel::KnownSpells)
    }

    fn resource_pool(&self, snapshot: &CharacterSnapshot) -> Option<(PoolKind, ResourcePool)> {
        if !snapshot.has_feature_key("pact_magic") {
            return None;
        }
        // Pact slots come back on a short rest, the sole exception among
        // spellcasters; a long rest refills them too.
        Some((
            PoolKind::PactSlots,
            ResourcePool::full(dataset::pact_slot_count(snapshot.level), RechargeRule::Both),
        ))
    }
}

struct Wizard;

impl ClassRules for Wizard {
    fn class(&self) -> ClassKind {
        ClassKind::Wizard
    }

    fn spellcasting_ability(&self) -> Option<Ability> {
        Some(Ability::Intelligence)
    }

    fn quantity_model(&self) -> Option<SpellQuantityModel> {
        Some(SpellQuantityModel::Spellbook)
    }

    fn resource_pool(&self, snapshot: &CharacterSnapshot) -> Option<(PoolKind, ResourcePool)> {
        if !snapshot.has_feature_key("arcane_ward") {
            return None;
        }
        let max = (2 * snapshot.level as i32 + calc::modifier(snapshot, Ability::Intelligence))
            .clamp(0, u8::MAX as i32) as u8;
        Some((
            PoolKind::ArcaneWard,
            ResourcePool::full(max, RechargeRule::LongRest),
        ))
    }

    fn empowered_evocation_bonus(
        &self,
        snapshot: &CharacterSnapshot,
        school: SpellSchool,
    ) -> i32 {
        if snapshot.has_feature_key("empowered_evocation") && school == SpellSchool::Evocation {
            calc::modifier(snapshot, Ability::Intelligence)
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{leveled_snapshot, snapshot_of, with_subclass};

    #[test]
    fn test_saving_throws_per_class() {
        let snapshot = snapshot_of(ClassKind::Fighter);
        let strategy = ClassStrategy::new(&snapshot);
        assert_eq!(
            strategy.saving_throw_proficiencies(),
            [Ability::Strength, Ability::Constitution]
        );
    }

    #[test]
    fn test_non_caster_returns_none() {
        let snapshot = snapshot_of(ClassKind::Barbarian);
        let strategy = ClassStrategy::new(&snapshot);
        assert!(!strategy.is_spellcaster());
        assert_eq!(strategy.spell_save_dc(), None);
        assert_eq!(strategy.spell_attack_bonus(), None);
        assert_eq!(strategy.spell_quantity_model(), None);
    }

    #[test]
    fn test_half_casters_start_casting_at_level_2() {
        let snapshot = leveled_snapshot(ClassKind::Paladin, 1);
        assert!(!ClassStrategy::new(&snapshot).is_spellcaster());

        let snapshot = leveled_snapshot(ClassKind::Paladin, 2);
        assert!(ClassStrategy::new(&snapshot).is_spellcaster());
    }

    #[test]
    fn test_spell_save_dc_formula() {
        let mut snapshot = snapshot_of(ClassKind::Wizard);
        snapshot.abilities.intelligence = 15; // 16 effective with Human +1, mod +3
        let strategy = ClassStrategy::new(&snapshot);
        assert_eq!(strategy.spell_save_dc(), Some(8 + 2 + 3));
        assert_eq!(strategy.spell_attack_bonus(), Some(2 + 3));
    }

    #[test]
    fn test_quantity_models() {
        let known = snapshot_of(ClassKind::Bard);
        assert_eq!(
            ClassStrategy::new(&known).spell_quantity_model(),
            Some(SpellQuantityModel::KnownSpells)
        );

        let mut prepared = snapshot_of(ClassKind::Cleric);
        prepared.abilities.wisdom = 15; // +3 with Human bonus
        prepared.level = 3;
        let strategy = ClassStrategy::new(&prepared);
        assert_eq!(
            strategy.spell_quantity_model(),
            Some(SpellQuantityModel::PreparedSpells)
        );
        assert_eq!(strategy.spell_capacity(), Some(6)); // 3 + 3

        let wizard = snapshot_of(ClassKind::Wizard);
        assert_eq!(
            ClassStrategy::new(&wizard).spell_quantity_model(),
            Some(SpellQuantityModel::Spellbook)
        );
    }

    #[test]
    fn test_prepared_count_has_floor_of_one() {
        let mut snapshot = snapshot_of(ClassKind::Cleric);
        snapshot.abilities.wisdom = 1;
        let strategy = ClassStrategy::new(&snapshot);
        assert_eq!(strategy.spell_capacity(), Some(1));
    }

    #[test]
    fn test_rage_pool_tiers() {
        for (level, expected) in [(1u8, 2u8), (3, 3), (6, 4), (12, 5), (17, 6)] {
            let snapshot = leveled_snapshot(ClassKind::Barbarian, level);
            let (kind, pool) = ClassStrategy::new(&snapshot).resource_pool().unwrap();
            assert_eq!(kind, PoolKind::RageUses);
            assert_eq!(pool.max, expected, "level {level}");
            assert_eq!(pool.recharge, RechargeRule::Both);
        }

        let snapshot = leveled_snapshot(ClassKind::Barbarian, 20);
        let (_, pool) = ClassStrategy::new(&snapshot).resource_pool().unwrap();
        assert!(pool.unlimited);
    }

    #[test]
    fn test_rage_damage_tiers() {
        for (level, expected) in [(1u8, 2), (9, 3), (16, 4)] {
            let snapshot = leveled_snapshot(ClassKind::Barbarian, level);
            assert_eq!(
                ClassStrategy::new(&snapshot).rage_damage_bonus(),
                Some(expected)
            );
        }
    }

    #[test]
    fn test_monk_ki_absent_at_level_1() {
        let snapshot = leveled_snapshot(ClassKind::Monk, 1);
        assert!(ClassStrategy::new(&snapshot).resource_pool().is_none());

        let snapshot = leveled_snapshot(ClassKind::Monk, 5);
        let (kind, pool) = ClassStrategy::new(&snapshot).resource_pool().unwrap();
        assert_eq!(kind, PoolKind::Ki);
        assert_eq!(pool.max, 5);
    }

    #[test]
    fn test_martial_arts_die_progression() {
        for (level, expected) in [
            (1u8, DieType::D4),
            (5, DieType::D6),
            (11, DieType::D8),
            (17, DieType::D10),
        ] {
            let snapshot = leveled_snapshot(ClassKind::Monk, level);
            assert_eq!(
                ClassStrategy::new(&snapshot).martial_arts_die(),
                Some(expected)
            );
        }
    }

    #[test]
    fn test_sorcery_points_long_rest_only() {
        let snapshot = leveled_snapshot(ClassKind::Sorcerer, 5);
        let (kind, pool) = ClassStrategy::new(&snapshot).resource_pool().unwrap();
        assert_eq!(kind, PoolKind::SorceryPoints);
        assert_eq!(pool.max, 5);
        assert_eq!(pool.recharge, RechargeRule::LongRest);

        let snapshot = leveled_snapshot(ClassKind::Sorcerer, 1);
        assert!(ClassStrategy::new(&snapshot).resource_pool().is_none());
    }

    #[test]
    fn test_pact_slot_tiers() {
        for (level, expected) in [(1u8, 1u8), (2, 2), (11, 3), (17, 4)] {
            let snapshot = leveled_snapshot(ClassKind::Warlock, level);
            let (kind, pool) = ClassStrategy::new(&snapshot).resource_pool().unwrap();
            assert_eq!(kind, PoolKind::PactSlots);
            assert_eq!(pool.max, expected, "level {level}");
        }
    }

    #[test]
    fn test_sneak_attack_dice_by_level() {
        for (level, expected) in [(1u8, "1d6"), (3, "2d6"), (11, "6d6"), (20, "10d6")] {
            let snapshot = leveled_snapshot(ClassKind::Rogue, level);
            assert_eq!(
                ClassStrategy::new(&snapshot).sneak_attack_dice().as_deref(),
                Some(expected),
                "level {level}"
            );
        }
    }

    #[test]
    fn test_divine_smite_dice() {
        let snapshot = leveled_snapshot(ClassKind::Paladin, 5);
        let strategy = ClassStrategy::new(&snapshot);
        assert_eq!(strategy.divine_smite_dice(1, false).as_deref(), Some("2d8"));
        assert_eq!(strategy.divine_smite_dice(4, false).as_deref(), Some("5d8"));
        assert_eq!(strategy.divine_smite_dice(4, true).as_deref(), Some("6d8"));
        // Caps at 6d8 even with a level 5 slot against a fiend.
        assert_eq!(strategy.divine_smite_dice(5, true).as_deref(), Some("6d8"));
    }

    #[test]
    fn test_divine_smite_requires_feature() {
        let snapshot = leveled_snapshot(ClassKind::Paladin, 1);
        assert_eq!(ClassStrategy::new(&snapshot).divine_smite_dice(1, false), None);
    }

    #[test]
    fn test_unarmored_defense_variants() {
        let mut barbarian = snapshot_of(ClassKind::Barbarian);
        barbarian.abilities.dexterity = 13; // +2 with Human bonus
        barbarian.abilities.constitution = 15; // +3
        assert_eq!(
            ClassStrategy::new(&barbarian).unarmored_defense(),
            Some(10 + 2 + 3)
        );

        let mut monk = snapshot_of(ClassKind::Monk);
        monk.abilities.dexterity = 15; // +3
        monk.abilities.wisdom = 13; // +2
        assert_eq!(ClassStrategy::new(&monk).unarmored_defense(), Some(10 + 3 + 2));

        let fighter = snapshot_of(ClassKind::Fighter);
        assert_eq!(ClassStrategy::new(&fighter).unarmored_defense(), None);
    }

    #[test]
    fn test_critical_floor_widens_with_features() {
        let snapshot = leveled_snapshot(ClassKind::Fighter, 3);
        assert_eq!(ClassStrategy::new(&snapshot).critical_hit_floor(), 20);

        let snapshot = with_subclass(leveled_snapshot(ClassKind::Fighter, 3), "champion");
        assert_eq!(ClassStrategy::new(&snapshot).critical_hit_floor(), 19);

        let snapshot = with_subclass(leveled_snapshot(ClassKind::Fighter, 15), "champion");
        assert_eq!(ClassStrategy::new(&snapshot).critical_hit_floor(), 18);
    }

    #[test]
    fn test_extra_attack_tiers() {
        for (level, expected) in [(1u8, 1u8), (5, 2), (11, 3), (20, 4)] {
            let snapshot = leveled_snapshot(ClassKind::Fighter, level);
            assert_eq!(
                ClassStrategy::new(&snapshot).attacks_per_action(),
                expected,
                "level {level}"
            );
        }

        // Non-fighters cap at two attacks.
        let snapshot = leveled_snapshot(ClassKind::Barbarian, 11);
        assert_eq!(ClassStrategy::new(&snapshot).attacks_per_action(), 2);
    }

    #[test]
    fn test_superiority_dice_feature_gated() {
        let snapshot = leveled_snapshot(ClassKind::Fighter, 3);
        assert!(ClassStrategy::new(&snapshot).resource_pool().is_none());

        let snapshot = with_subclass(leveled_snapshot(ClassKind::Fighter, 3), "battle_master");
        let strategy = ClassStrategy::new(&snapshot);
        let (kind, pool) = strategy.resource_pool().unwrap();
        assert_eq!(kind, PoolKind::SuperiorityDice);
        assert_eq!(pool.max, 4);
        assert_eq!(strategy.superiority_die(), Some(DieType::D8));

        let snapshot = with_subclass(leveled_snapshot(ClassKind::Fighter, 10), "battle_master");
        let strategy = ClassStrategy::new(&snapshot);
        assert_eq!(strategy.resource_pool().unwrap().1.max, 5);
        assert_eq!(strategy.superiority_die(), Some(DieType::D10));

        let snapshot = with_subclass(leveled_snapshot(ClassKind::Fighter, 18), "battle_master");
        let strategy = ClassStrategy::new(&snapshot);
        assert_eq!(strategy.resource_pool().unwrap().1.max, 6);
        assert_eq!(strategy.superiority_die(), Some(DieType::D12));
    }

    #[test]
    fn test_elemental_affinity_needs_matching_ancestry() {
        let mut snapshot = with_subclass(leveled_snapshot(ClassKind::Sorcerer, 6), "draconic_bloodline");
        snapshot.abilities.charisma = 17; // +4 with Human bonus
        snapshot.draconic_ancestry = Some(DamageType::Fire);
        let strategy = ClassStrategy::new(&snapshot);
        assert_eq!(strategy.elemental_affinity_bonus(DamageType::Fire), 4);
        assert_eq!(strategy.elemental_affinity_bonus(DamageType::Cold), 0);
    }

    #[test]
    fn test_metamagic_costs() {
        let snapshot = leveled_snapshot(ClassKind::Sorcerer, 3);
        let strategy = ClassStrategy::new(&snapshot);
        assert_eq!(strategy.metamagic_cost(Metamagic::TwinnedSpell, 0), Some(1));
        assert_eq!(strategy.metamagic_cost(Metamagic::TwinnedSpell, 3), Some(3));
        assert_eq!(strategy.metamagic_cost(Metamagic::QuickenedSpell, 3), Some(2));

        let snapshot = leveled_snapshot(ClassKind::Sorcerer, 2);
        assert_eq!(
            ClassStrategy::new(&snapshot).metamagic_cost(Metamagic::TwinnedSpell, 1),
            None
        );
    }

    #[test]
    fn test_empowered_evocation() {
        let mut snapshot = with_subclass(leveled_snapshot(ClassKind::Wizard, 10), "school_of_evocation");
        snapshot.abilities.intelligence = 17; // +4 with Human bonus
        let strategy = ClassStrategy::new(&snapshot);
        assert_eq!(strategy.empowered_evocation_bonus(SpellSchool::Evocation), 4);
        assert_eq!(strategy.empowered_evocation_bonus(SpellSchool::Conjuration), 0);
    }

    #[test]
    fn test_divine_strike_shared_shape() {
        let life = with_subclass(leveled_snapshot(ClassKind::Cleric, 8), "life_domain");
        assert_eq!(
            ClassStrategy::new(&life).divine_strike(),
            Some(("1d8".to_string(), DamageType::Radiant))
        );

        let tempest = with_subclass(leveled_snapshot(ClassKind::Cleric, 14), "tempest_domain");
        assert_eq!(
            ClassStrategy::new(&tempest).divine_strike(),
            Some(("2d8".to_string(), DamageType::Thunder))
        );

        let young = with_subclass(leveled_snapshot(ClassKind::Cleric, 5), "life_domain");
        assert_eq!(ClassStrategy::new(&young).divine_strike(), None);
    }

    #[test]
    fn test_arcane_ward_pool() {
        let mut snapshot = with_subclass(leveled_snapshot(ClassKind::Wizard, 2), "school_of_abjuration");
        snapshot.abilities.intelligence = 15; // +3 with Human bonus
        let (kind, pool) = ClassStrategy::new(&snapshot).resource_pool().unwrap();
        assert_eq!(kind, PoolKind::ArcaneWard);
        assert_eq!(pool.max, 7); // 2 * 2 + 3
        assert_eq!(pool.recharge, RechargeRule::LongRest);
    }
}
