//! Spell database.
//!
//! Spell definitions carry the effect declarations the engine resolves:
//! damage dice and type, attack-roll or saving-throw delivery, scaling
//! rules, and per-class eligibility.

use crate::character::{Ability, ClassKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Damage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Slashing,
    Piercing,
    Bludgeoning,
    Fire,
    Cold,
    Lightning,
    Thunder,
    Acid,
    Poison,
    Necrotic,
    Radiant,
    Force,
    Psychic,
}

impl DamageType {
    pub fn name(&self) -> &'static str {
        match self {
            DamageType::Slashing => "slashing",
            DamageType::Piercing => "piercing",
            DamageType::Bludgeoning => "bludgeoning",
            DamageType::Fire => "fire",
            DamageType::Cold => "cold",
            DamageType::Lightning => "lightning",
            DamageType::Thunder => "thunder",
            DamageType::Acid => "acid",
            DamageType::Poison => "poison",
            DamageType::Necrotic => "necrotic",
            DamageType::Radiant => "radiant",
            DamageType::Force => "force",
            DamageType::Psychic => "psychic",
        }
    }
}

/// Schools of magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellSchool {
    Abjuration,
    Conjuration,
    Divination,
    Enchantment,
    Evocation,
    Illusion,
    Necromancy,
    Transmutation,
}

/// What happens to the damage when a target passes its saving throw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveEffect {
    HalfDamage,
    Negates,
}

/// How spell damage scales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageScaling {
    /// Cantrip scaling: extra dice at caster levels 5, 11 and 17.
    CantripTiers,
    /// Extra dice per slot level above the spell's base level.
    PerSlotLevel { extra_dice: String },
    None,
}

/// Complete spell definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellData {
    pub name: String,
    /// 0 for cantrips.
    pub level: u8,
    pub school: SpellSchool,
    pub classes: Vec<ClassKind>,

    pub damage_dice: Option<String>,
    pub damage_type: Option<DamageType>,
    pub scaling: DamageScaling,
    /// Saving throw the targets make, if the spell is save-delivered.
    pub save: Option<Ability>,
    pub save_effect: Option<SaveEffect>,
    /// Whether the spell is delivered by a spell attack roll against AC.
    pub attack: bool,
}

impl SpellData {
    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }

    /// Damage dice count multiplier for cantrips, by caster level tier.
    pub fn cantrip_dice_count(caster_level: u8) -> u8 {
        match caster_level {
            0..=4 => 1,
            5..=10 => 2,
            11..=16 => 3,
            _ => 4,
        }
    }

    /// The damage dice notation for a given caster level and slot level,
    /// with scaling applied. `None` for spells without damage.
    pub fn effective_damage_dice(&self, caster_level: u8, slot_level: u8) -> Option<String> {
        let base_dice = self.damage_dice.as_ref()?;

        match &self.scaling {
            DamageScaling::CantripTiers => {
                let count = Self::cantrip_dice_count(caster_level);
                if count == 1 {
                    return Some(base_dice.clone());
                }
                // Base cantrip dice are a single component, e.g. "1d10".
                base_dice.find('d').map(|d_pos| {
                    let base_count: u8 = base_dice[..d_pos].parse().unwrap_or(1);
                    format!("{}{}", base_count * count, &base_dice[d_pos..])
                })
            }
            DamageScaling::PerSlotLevel { extra_dice } => {
                if slot_level <= self.level {
                    return Some(base_dice.clone());
                }
                let extra_levels = slot_level - self.level;
                extra_dice.find('d').map(|d_pos| {
                    let extra_count: u8 = extra_dice[..d_pos].parse().unwrap_or(1);
                    format!(
                        "{}+{}{}",
                        base_dice,
                        extra_count * extra_levels,
                        &extra_dice[d_pos..]
                    )
                })
            }
            DamageScaling::None => Some(base_dice.clone()),
        }
    }
}

// ============================================================================
// Spell Database
// ============================================================================

struct SpellBuilder {
    spell: SpellData,
}

impl SpellBuilder {
    fn new(name: &str, level: u8, school: SpellSchool, classes: &[ClassKind]) -> Self {
        Self {
            spell: SpellData {
                name: name.to_string(),
                level,
                school,
                classes: classes.to_vec(),
                damage_dice: None,
                damage_type: None,
                scaling: DamageScaling::None,
                save: None,
                save_effect: None,
                attack: false,
            },
        }
    }

    fn damage(mut self, dice: &str, damage_type: DamageType) -> Self {
        self.spell.damage_dice = Some(dice.to_string());
        self.spell.damage_type = Some(damage_type);
        self
    }

    fn cantrip_scaling(mut self) -> Self {
        self.spell.scaling = DamageScaling::CantripTiers;
        self
    }

    fn slot_scaling(mut self, extra_dice: &str) -> Self {
        self.spell.scaling = DamageScaling::PerSlotLevel {
            extra_dice: extra_dice.to_string(),
        };
        self
    }

    fn save(mut self, ability: Ability, effect: SaveEffect) -> Self {
        self.spell.save = Some(ability);
        self.spell.save_effect = Some(effect);
        self
    }

    fn attack(mut self) -> Self {
        self.spell.attack = true;
        self
    }

    fn build(self) -> SpellData {
        self.spell
    }
}

fn build_spell_database() -> HashMap<String, SpellData> {
    use ClassKind::*;
    use SpellSchool::*;

    let spells = vec![
        // Cantrips
        SpellBuilder::new("Fire Bolt", 0, Evocation, &[Sorcerer, Wizard])
            .damage("1d10", DamageType::Fire)
            .cantrip_scaling()
            .attack()
            .build(),
        SpellBuilder::new("Ray of Frost", 0, Evocation, &[Sorcerer, Wizard])
            .damage("1d8", DamageType::Cold)
            .cantrip_scaling()
            .attack()
            .build(),
        SpellBuilder::new("Shocking Grasp", 0, Evocation, &[Sorcerer, Wizard])
            .damage("1d8", DamageType::Lightning)
            .cantrip_scaling()
            .attack()
            .build(),
        SpellBuilder::new("Acid Splash", 0, Conjuration, &[Sorcerer, Wizard])
            .damage("1d6", DamageType::Acid)
            .cantrip_scaling()
            .save(Ability::Dexterity, SaveEffect::Negates)
            .build(),
        SpellBuilder::new("Poison Spray", 0, Conjuration, &[Druid, Sorcerer, Warlock, Wizard])
            .damage("1d12", DamageType::Poison)
            .cantrip_scaling()
            .save(Ability::Constitution, SaveEffect::Negates)
            .build(),
        SpellBuilder::new("Eldritch Blast", 0, Evocation, &[Warlock])
            .damage("1d10", DamageType::Force)
            .cantrip_scaling()
            .attack()
            .build(),
        SpellBuilder::new("Sacred Flame", 0, Evocation, &[Cleric])
            .damage("1d8", DamageType::Radiant)
            .cantrip_scaling()
            .save(Ability::Dexterity, SaveEffect::Negates)
            .build(),
        SpellBuilder::new("Produce Flame", 0, Conjuration, &[Druid])
            .damage("1d8", DamageType::Fire)
            .cantrip_scaling()
            .attack()
            .build(),
        SpellBuilder::new("Vicious Mockery", 0, Enchantment, &[Bard])
            .damage("1d4", DamageType::Psychic)
            .cantrip_scaling()
            .save(Ability::Wisdom, SaveEffect::Negates)
            .build(),
        SpellBuilder::new("Light", 0, Evocation, &[Bard, Cleric, Sorcerer, Wizard]).build(),
        SpellBuilder::new("Mage Hand", 0, Conjuration, &[Bard, Sorcerer, Warlock, Wizard])
            .build(),
        SpellBuilder::new("Guidance", 0, Divination, &[Cleric, Druid]).build(),
        SpellBuilder::new("Minor Illusion", 0, Illusion, &[Bard, Sorcerer, Warlock, Wizard])
            .build(),
        // Level 1
        SpellBuilder::new("Burning Hands", 1, Evocation, &[Sorcerer, Wizard])
            .damage("3d6", DamageType::Fire)
            .slot_scaling("1d6")
            .save(Ability::Dexterity, SaveEffect::HalfDamage)
            .build(),
        SpellBuilder::new("Thunderwave", 1, Evocation, &[Bard, Druid, Sorcerer, Wizard])
            .damage("2d8", DamageType::Thunder)
            .slot_scaling("1d8")
            .save(Ability::Constitution, SaveEffect::HalfDamage)
            .build(),
        SpellBuilder::new("Guiding Bolt", 1, Evocation, &[Cleric])
            .damage("4d6", DamageType::Radiant)
            .slot_scaling("1d6")
            .attack()
            .build(),
        SpellBuilder::new("Witch Bolt", 1, Evocation, &[Sorcerer, Warlock, Wizard])
            .damage("1d12", DamageType::Lightning)
            .slot_scaling("1d12")
            .attack()
            .build(),
        SpellBuilder::new("Cure Wounds", 1, Evocation, &[Bard, Cleric, Druid, Paladin, Ranger])
            .build(),
        SpellBuilder::new("Healing Word", 1, Evocation, &[Bard, Cleric, Druid]).build(),
        SpellBuilder::new("Shield", 1, Abjuration, &[Sorcerer, Wizard]).build(),
        SpellBuilder::new("Bless", 1, Enchantment, &[Cleric, Paladin]).build(),
        SpellBuilder::new("Hex", 1, Enchantment, &[Warlock]).build(),
        SpellBuilder::new("Hunter's Mark", 1, Divination, &[Ranger]).build(),
        SpellBuilder::new("Faerie Fire", 1, Evocation, &[Bard, Druid]).build(),
        SpellBuilder::new("Entangle", 1, Conjuration, &[Druid, Ranger]).build(),
        SpellBuilder::new(
            "Charm Person",
            1,
            Enchantment,
            &[Bard, Druid, Sorcerer, Warlock, Wizard],
        )
        .build(),
        // Level 2
        SpellBuilder::new("Scorching Ray", 2, Evocation, &[Sorcerer, Wizard])
            .damage("2d6", DamageType::Fire)
            .slot_scaling("1d6")
            .attack()
            .build(),
        SpellBuilder::new("Shatter", 2, Evocation, &[Bard, Sorcerer, Warlock, Wizard])
            .damage("3d8", DamageType::Thunder)
            .slot_scaling("1d8")
            .save(Ability::Constitution, SaveEffect::HalfDamage)
            .build(),
        SpellBuilder::new("Misty Step", 2, Conjuration, &[Sorcerer, Warlock, Wizard]).build(),
        SpellBuilder::new(
            "Hold Person",
            2,
            Enchantment,
            &[Bard, Cleric, Druid, Sorcerer, Warlock, Wizard],
        )
        .build(),
        SpellBuilder::new(
            "Invisibility",
            2,
            Illusion,
            &[Bard, Sorcerer, Warlock, Wizard],
        )
        .build(),
        SpellBuilder::new("Spike Growth", 2, Transmutation, &[Druid, Ranger]).build(),
        // Level 3
        SpellBuilder::new("Fireball", 3, Evocation, &[Sorcerer, Wizard])
            .damage("8d6", DamageType::Fire)
            .slot_scaling("1d6")
            .save(Ability::Dexterity, SaveEffect::HalfDamage)
            .build(),
        SpellBuilder::new("Lightning Bolt", 3, Evocation, &[Sorcerer, Wizard])
            .damage("8d6", DamageType::Lightning)
            .slot_scaling("1d6")
            .save(Ability::Dexterity, SaveEffect::HalfDamage)
            .build(),
        SpellBuilder::new("Spirit Guardians", 3, Conjuration, &[Cleric])
            .damage("3d8", DamageType::Radiant)
            .slot_scaling("1d8")
            .save(Ability::Wisdom, SaveEffect::HalfDamage)
            .build(),
        SpellBuilder::new("Dispel Magic", 3, Abjuration, &[Bard, Cleric, Druid, Paladin, Sorcerer, Warlock, Wizard])
            .build(),
    ];

    spells
        .into_iter()
        .map(|s| (s.name.to_lowercase(), s))
        .collect()
}

/// Global spell database.
static SPELL_DATABASE: LazyLock<HashMap<String, SpellData>> = LazyLock::new(build_spell_database);

/// Look up a spell by name (case-insensitive).
pub fn get_spell(name: &str) -> Option<&'static SpellData> {
    SPELL_DATABASE.get(&name.to_lowercase())
}

/// All spells in the database.
pub fn all_spells() -> impl Iterator<Item = &'static SpellData> {
    SPELL_DATABASE.values()
}

/// All spells a class can learn at or below a maximum spell level.
/// Cantrips are excluded; they have their own selection pool.
pub fn leveled_spells_for(
    class: ClassKind,
    max_level: u8,
) -> impl Iterator<Item = &'static SpellData> {
    SPELL_DATABASE
        .values()
        .filter(move |s| s.level >= 1 && s.level <= max_level && s.classes.contains(&class))
}

/// All cantrips a class can learn.
pub fn cantrips_for(class: ClassKind) -> impl Iterator<Item = &'static SpellData> {
    SPELL_DATABASE
        .values()
        .filter(move |s| s.is_cantrip() && s.classes.contains(&class))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_spell_case_insensitive() {
        assert!(get_spell("fireball").is_some());
        assert!(get_spell("FIREBALL").is_some());
        assert!(get_spell("Fire Bolt").is_some());
        assert!(get_spell("meteor storm").is_none());
    }

    #[test]
    fn test_cantrip_tier_scaling() {
        let fire_bolt = get_spell("Fire Bolt").unwrap();
        assert_eq!(fire_bolt.effective_damage_dice(1, 0).as_deref(), Some("1d10"));
        assert_eq!(fire_bolt.effective_damage_dice(5, 0).as_deref(), Some("2d10"));
        assert_eq!(fire_bolt.effective_damage_dice(11, 0).as_deref(), Some("3d10"));
        assert_eq!(fire_bolt.effective_damage_dice(17, 0).as_deref(), Some("4d10"));
    }

    #[test]
    fn test_slot_level_scaling() {
        let fireball = get_spell("Fireball").unwrap();
        assert_eq!(fireball.effective_damage_dice(10, 3).as_deref(), Some("8d6"));
        assert_eq!(
            fireball.effective_damage_dice(10, 5).as_deref(),
            Some("8d6+2d6")
        );
    }

    #[test]
    fn test_class_pools() {
        assert!(cantrips_for(ClassKind::Warlock).any(|s| s.name == "Eldritch Blast"));
        assert!(leveled_spells_for(ClassKind::Wizard, 3).any(|s| s.name == "Fireball"));
        assert!(!leveled_spells_for(ClassKind::Wizard, 2).any(|s| s.name == "Fireball"));
        assert!(leveled_spells_for(ClassKind::Cleric, 1).any(|s| s.name == "Guiding Bolt"));
    }

    #[test]
    fn test_save_declarations() {
        let fireball = get_spell("Fireball").unwrap();
        assert_eq!(fireball.save, Some(Ability::Dexterity));
        assert_eq!(fireball.save_effect, Some(SaveEffect::HalfDamage));
        assert!(!fireball.attack);

        let sacred_flame = get_spell("Sacred Flame").unwrap();
        assert_eq!(sacred_flame.save_effect, Some(SaveEffect::Negates));
    }
}
