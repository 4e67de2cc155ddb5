//! Character snapshot types.
//!
//! A [`CharacterSnapshot`] is an immutable description of one character.
//! Every mutation in the engine (equip, grant XP, level up, rest) is a pure
//! transform that consumes a snapshot reference and returns a new snapshot.

use crate::dataset::FeatureKey;
use crate::items::{Item, ItemKind};
use crate::resources::{PoolKind, ResourcePool};
use crate::spells::DamageType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Error from equipping an item into a slot it cannot occupy.
#[derive(Debug, Clone, Error)]
pub enum EquipError {
    #[error("{0} cannot be equipped")]
    NotEquippable(String),
    #[error("{0} is not in the inventory")]
    NotInInventory(String),
}

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Ability Scores
// ============================================================================

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Base ability scores, before racial bonuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl AbilityScores {
    pub fn new(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn standard_array() -> Self {
        Self::new(15, 14, 13, 12, 10, 8)
    }

    pub fn get(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: u8) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Constitution => self.constitution = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Charisma => self.charisma = value,
        }
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

// ============================================================================
// Skills
// ============================================================================

/// Skills, each governed by one ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Skill {
    Athletics,
    Acrobatics,
    SleightOfHand,
    Stealth,
    Arcana,
    History,
    Investigation,
    Nature,
    Religion,
    AnimalHandling,
    Insight,
    Medicine,
    Perception,
    Survival,
    Deception,
    Intimidation,
    Performance,
    Persuasion,
}

impl Skill {
    pub fn ability(&self) -> Ability {
        match self {
            Skill::Athletics => Ability::Strength,
            Skill::Acrobatics | Skill::SleightOfHand | Skill::Stealth => Ability::Dexterity,
            Skill::Arcana
            | Skill::History
            | Skill::Investigation
            | Skill::Nature
            | Skill::Religion => Ability::Intelligence,
            Skill::AnimalHandling
            | Skill::Insight
            | Skill::Medicine
            | Skill::Perception
            | Skill::Survival => Ability::Wisdom,
            Skill::Deception | Skill::Intimidation | Skill::Performance | Skill::Persuasion => {
                Ability::Charisma
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Skill::Athletics => "Athletics",
            Skill::Acrobatics => "Acrobatics",
            Skill::SleightOfHand => "Sleight of Hand",
            Skill::Stealth => "Stealth",
            Skill::Arcana => "Arcana",
            Skill::History => "History",
            Skill::Investigation => "Investigation",
            Skill::Nature => "Nature",
            Skill::Religion => "Religion",
            Skill::AnimalHandling => "Animal Handling",
            Skill::Insight => "Insight",
            Skill::Medicine => "Medicine",
            Skill::Perception => "Perception",
            Skill::Survival => "Survival",
            Skill::Deception => "Deception",
            Skill::Intimidation => "Intimidation",
            Skill::Performance => "Performance",
            Skill::Persuasion => "Persuasion",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Classes
// ============================================================================

/// The twelve character classes. The set is closed: class rules dispatch
/// over this enum rather than any open registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassKind {
    Barbarian,
    Bard,
    Cleric,
    Druid,
    Fighter,
    Monk,
    Paladin,
    Ranger,
    Rogue,
    Sorcerer,
    Warlock,
    Wizard,
}

impl ClassKind {
    pub fn name(&self) -> &'static str {
        match self {
            ClassKind::Barbarian => "Barbarian",
            ClassKind::Bard => "Bard",
            ClassKind::Cleric => "Cleric",
            ClassKind::Druid => "Druid",
            ClassKind::Fighter => "Fighter",
            ClassKind::Monk => "Monk",
            ClassKind::Paladin => "Paladin",
            ClassKind::Ranger => "Ranger",
            ClassKind::Rogue => "Rogue",
            ClassKind::Sorcerer => "Sorcerer",
            ClassKind::Warlock => "Warlock",
            ClassKind::Wizard => "Wizard",
        }
    }

    pub fn all() -> &'static [ClassKind] {
        &[
            ClassKind::Barbarian,
            ClassKind::Bard,
            ClassKind::Cleric,
            ClassKind::Druid,
            ClassKind::Fighter,
            ClassKind::Monk,
            ClassKind::Paladin,
            ClassKind::Ranger,
            ClassKind::Rogue,
            ClassKind::Sorcerer,
            ClassKind::Warlock,
            ClassKind::Wizard,
        ]
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Races
// ============================================================================

/// Playable races.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RaceKind {
    Human,
    Elf,
    Dwarf,
    Halfling,
    HalfOrc,
    HalfElf,
    Tiefling,
    Gnome,
    Dragonborn,
}

impl RaceKind {
    pub fn name(&self) -> &'static str {
        match self {
            RaceKind::Human => "Human",
            RaceKind::Elf => "Elf",
            RaceKind::Dwarf => "Dwarf",
            RaceKind::Halfling => "Halfling",
            RaceKind::HalfOrc => "Half-Orc",
            RaceKind::HalfElf => "Half-Elf",
            RaceKind::Tiefling => "Tiefling",
            RaceKind::Gnome => "Gnome",
            RaceKind::Dragonborn => "Dragonborn",
        }
    }

    pub fn all() -> &'static [RaceKind] {
        &[
            RaceKind::Human,
            RaceKind::Elf,
            RaceKind::Dwarf,
            RaceKind::Halfling,
            RaceKind::HalfOrc,
            RaceKind::HalfElf,
            RaceKind::Tiefling,
            RaceKind::Gnome,
            RaceKind::Dragonborn,
        ]
    }
}

impl fmt::Display for RaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Subraces for the races that have them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subrace {
    HillDwarf,
    MountainDwarf,
    HighElf,
    WoodElf,
}

impl Subrace {
    pub fn name(&self) -> &'static str {
        match self {
            Subrace::HillDwarf => "Hill Dwarf",
            Subrace::MountainDwarf => "Mountain Dwarf",
            Subrace::HighElf => "High Elf",
            Subrace::WoodElf => "Wood Elf",
        }
    }

    /// The parent race this subrace belongs to.
    pub fn race(&self) -> RaceKind {
        match self {
            Subrace::HillDwarf | Subrace::MountainDwarf => RaceKind::Dwarf,
            Subrace::HighElf | Subrace::WoodElf => RaceKind::Elf,
        }
    }
}

impl fmt::Display for Subrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Backgrounds
// ============================================================================

/// Character backgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackgroundKind {
    Acolyte,
    Criminal,
    Entertainer,
    FolkHero,
    Noble,
    Outlander,
    Sage,
    Sailor,
    Soldier,
    Urchin,
}

impl BackgroundKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackgroundKind::Acolyte => "Acolyte",
            BackgroundKind::Criminal => "Criminal",
            BackgroundKind::Entertainer => "Entertainer",
            BackgroundKind::FolkHero => "Folk Hero",
            BackgroundKind::Noble => "Noble",
            BackgroundKind::Outlander => "Outlander",
            BackgroundKind::Sage => "Sage",
            BackgroundKind::Sailor => "Sailor",
            BackgroundKind::Soldier => "Soldier",
            BackgroundKind::Urchin => "Urchin",
        }
    }

    pub fn all() -> &'static [BackgroundKind] {
        &[
            BackgroundKind::Acolyte,
            BackgroundKind::Criminal,
            BackgroundKind::Entertainer,
            BackgroundKind::FolkHero,
            BackgroundKind::Noble,
            BackgroundKind::Outlander,
            BackgroundKind::Sage,
            BackgroundKind::Sailor,
            BackgroundKind::Soldier,
            BackgroundKind::Urchin,
        ]
    }
}

impl fmt::Display for BackgroundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Equipment
// ============================================================================

/// Equipment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Body,
    MainHand,
    OffHand,
}

impl Slot {
    pub fn name(&self) -> &'static str {
        match self {
            Slot::Body => "body",
            Slot::MainHand => "main hand",
            Slot::OffHand => "off hand",
        }
    }
}

/// What the character has equipped, by slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub body: Option<Item>,
    pub main_hand: Option<Item>,
    pub off_hand: Option<Item>,
}

impl Equipment {
    pub fn get(&self, slot: Slot) -> Option<&Item> {
        match slot {
            Slot::Body => self.body.as_ref(),
            Slot::MainHand => self.main_hand.as_ref(),
            Slot::OffHand => self.off_hand.as_ref(),
        }
    }

    /// Whether a shield is in the off-hand slot.
    pub fn has_shield(&self) -> bool {
        self.off_hand
            .as_ref()
            .map(|i| i.kind == ItemKind::Shield)
            .unwrap_or(false)
    }
}

/// A stack of identical items in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: Item,
    pub quantity: u32,
}

impl ItemStack {
    pub fn single(item: Item) -> Self {
        Self { item, quantity: 1 }
    }
}

// ============================================================================
// Pending Level-Up
// ============================================================================

/// The computed, unresolved set of decisions needed to advance one level.
///
/// Attached by progression when an XP threshold is crossed, cleared on
/// commit. At most one is attached at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLevelUp {
    pub target_level: u8,
    /// Hit-die roll formula, e.g. `1d10+2` (CON modifier folded in).
    pub hit_die_formula: String,
    /// An ability-score-improvement feature lands on the target level.
    pub asi: bool,
    /// The class's subclass-selection feature lands on the target level and
    /// no subclass has been chosen yet.
    pub subclass: bool,
    /// Newly learnable cantrips at the target level.
    pub new_cantrips: u8,
    /// Newly learnable leveled spells at the target level.
    pub new_spells: u8,
    /// The class permits swapping one previously known spell this level-up.
    pub allows_swap: bool,
    /// Weapon-mastery selections unlocked at the target level.
    pub mastery_picks: u8,
}

// ============================================================================
// Character Snapshot
// ============================================================================

/// Immutable description of a single character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    pub id: CharacterId,
    pub name: String,

    // Core stats. Ability scores are stored pre-racial-bonus; racial bonuses
    // are derived from race/subrace plus the floating choices below.
    pub abilities: AbilityScores,
    pub race: RaceKind,
    pub subrace: Option<Subrace>,
    /// Ability assignments for the race's floating bonuses, index-aligned
    /// with the race's floating-bonus list. Empty if the race has none.
    pub floating_bonus_choices: Vec<Ability>,
    pub class: ClassKind,
    /// Subclass key into the class's subclass list. Permanent once set.
    pub subclass: Option<String>,
    pub background: BackgroundKind,

    pub level: u8,
    pub experience: u32,
    /// Accrued maximum HP. Level-1 value is derived once at finalization;
    /// later levels add frozen level-up rolls and are never re-derived.
    pub max_hp: i32,

    // Proficiencies chosen at creation (background and race grants are
    // derived from the dataset, not stored).
    pub class_skill_choices: Vec<Skill>,
    pub expertise: Vec<Skill>,

    // Acquisition-ordered grants.
    pub features: Vec<FeatureKey>,
    pub feats: Vec<FeatureKey>,
    pub weapon_masteries: Vec<String>,
    /// Damage type chosen with the Draconic Bloodline ancestry, if any.
    pub draconic_ancestry: Option<DamageType>,

    // Equipment and inventory.
    pub equipment: Equipment,
    /// Versatile main-hand weapon held in both hands.
    pub two_handed_grip: bool,
    pub inventory: Vec<ItemStack>,

    // Spell lists. Which lists are populated depends on the class's spell
    // quantity model.
    pub cantrips: Vec<String>,
    pub known_spells: Vec<String>,
    pub prepared_spells: Vec<String>,
    pub spellbook: Vec<String>,

    // Per-class resource counters.
    pub pools: BTreeMap<PoolKind, ResourcePool>,

    pub pending_level_up: Option<PendingLevelUp>,
}

impl CharacterSnapshot {
    /// Whether the character has acquired a feature (class, subclass, race
    /// or feat granted). Subclass-gated rules branch on this, never on
    /// subclass identity.
    pub fn has_feature(&self, key: &FeatureKey) -> bool {
        self.features.contains(key) || self.feats.contains(key)
    }

    /// `has_feature` by raw key string.
    pub fn has_feature_key(&self, key: &str) -> bool {
        self.features
            .iter()
            .chain(self.feats.iter())
            .any(|k| k.as_str() == key)
    }

    /// Look up a resource pool.
    pub fn pool(&self, kind: PoolKind) -> Option<&ResourcePool> {
        self.pools.get(&kind)
    }

    /// Add an item to the inventory, stacking with an existing entry when
    /// the item stacks.
    pub(crate) fn add_to_inventory(&mut self, item: Item) {
        if item.stackable() {
            if let Some(stack) = self.inventory.iter_mut().find(|s| s.item.name == item.name) {
                stack.quantity += 1;
                return;
            }
        }
        self.inventory.push(ItemStack::single(item));
    }

    /// Remove one item by name from the inventory, returning it.
    pub(crate) fn take_from_inventory(&mut self, name: &str) -> Option<Item> {
        let idx = self
            .inventory
            .iter()
            .position(|s| s.item.name.eq_ignore_ascii_case(name))?;
        let stack = &mut self.inventory[idx];
        let item = stack.item.clone();
        if stack.quantity > 1 {
            stack.quantity -= 1;
        } else {
            self.inventory.remove(idx);
        }
        Some(item)
    }

    /// Equip an item into its compatible slot, returning the new snapshot.
    ///
    /// Anything displaced goes to the inventory. Equipping a two-handed
    /// weapon evicts the off-hand item; equipping an off-hand item evicts a
    /// two-handed main-hand weapon.
    pub fn equip(&self, item: Item) -> Result<CharacterSnapshot, EquipError> {
        let mut next = self.clone();
        match item.kind {
            ItemKind::Weapon => {
                if let Some(previous) = next.equipment.main_hand.take() {
                    next.add_to_inventory(previous);
                }
                if item.is_two_handed() {
                    if let Some(off_hand) = next.equipment.off_hand.take() {
                        next.add_to_inventory(off_hand);
                    }
                }
                next.two_handed_grip = false;
                tracing::debug!(character = %next.name, item = %item.name, "equipped main hand");
                next.equipment.main_hand = Some(item);
            }
            ItemKind::Shield => {
                let two_handed_main = next
                    .equipment
                    .main_hand
                    .as_ref()
                    .is_some_and(|w| w.is_two_handed());
                if two_handed_main {
                    if let Some(main_hand) = next.equipment.main_hand.take() {
                        next.add_to_inventory(main_hand);
                    }
                }
                if let Some(previous) = next.equipment.off_hand.take() {
                    next.add_to_inventory(previous);
                }
                next.two_handed_grip = false;
                tracing::debug!(character = %next.name, item = %item.name, "equipped off hand");
                next.equipment.off_hand = Some(item);
            }
            ItemKind::Armor => {
                if let Some(previous) = next.equipment.body.take() {
                    next.add_to_inventory(previous);
                }
                tracing::debug!(character = %next.name, item = %item.name, "equipped armor");
                next.equipment.body = Some(item);
            }
            ItemKind::Gear => return Err(EquipError::NotEquippable(item.name)),
        }
        Ok(next)
    }

    /// Take an item out of the inventory by name and equip it.
    pub fn equip_from_inventory(&self, name: &str) -> Result<CharacterSnapshot, EquipError> {
        let mut next = self.clone();
        let item = next
            .take_from_inventory(name)
            .ok_or_else(|| EquipError::NotInInventory(name.to_string()))?;
        next.equip(item)
    }

    /// Unequip a slot into the inventory.
    pub fn unequip(&self, slot: Slot) -> CharacterSnapshot {
        let mut next = self.clone();
        let removed = match slot {
            Slot::Body => next.equipment.body.take(),
            Slot::MainHand => {
                next.two_handed_grip = false;
                next.equipment.main_hand.take()
            }
            Slot::OffHand => next.equipment.off_hand.take(),
        };
        if let Some(item) = removed {
            next.add_to_inventory(item);
        }
        next
    }

    /// Toggle a versatile main-hand weapon between one- and two-handed
    /// grips. Taking the two-handed grip evicts any off-hand item; the
    /// toggle is a no-op without a versatile weapon in the main hand.
    pub fn set_two_handed_grip(&self, enabled: bool) -> CharacterSnapshot {
        let mut next = self.clone();
        if !enabled {
            next.two_handed_grip = false;
            return next;
        }
        let versatile = next
            .equipment
            .main_hand
            .as_ref()
            .is_some_and(|w| w.versatile_dice().is_some());
        if versatile {
            if let Some(off_hand) = next.equipment.off_hand.take() {
                next.add_to_inventory(off_hand);
            }
            next.two_handed_grip = true;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_governing_abilities() {
        assert_eq!(Skill::Athletics.ability(), Ability::Strength);
        assert_eq!(Skill::Stealth.ability(), Ability::Dexterity);
        assert_eq!(Skill::Arcana.ability(), Ability::Intelligence);
        assert_eq!(Skill::Perception.ability(), Ability::Wisdom);
        assert_eq!(Skill::Persuasion.ability(), Ability::Charisma);
    }

    #[test]
    fn test_subrace_parent_race() {
        assert_eq!(Subrace::HillDwarf.race(), RaceKind::Dwarf);
        assert_eq!(Subrace::HighElf.race(), RaceKind::Elf);
    }

    #[test]
    fn test_twelve_classes() {
        assert_eq!(ClassKind::all().len(), 12);
    }

    #[test]
    fn test_ability_scores_get_set() {
        let mut scores = AbilityScores::standard_array();
        assert_eq!(scores.get(Ability::Strength), 15);
        scores.set(Ability::Strength, 16);
        assert_eq!(scores.get(Ability::Strength), 16);
    }

    #[test]
    fn test_two_handed_equip_evicts_off_hand() {
        let snapshot = crate::testing::snapshot_of(ClassKind::Fighter);
        let snapshot = snapshot
            .equip(crate::items::get_shield("Shield").unwrap())
            .unwrap();
        assert!(snapshot.equipment.has_shield());
        let inventory_before = snapshot.inventory.len();

        let snapshot = snapshot
            .equip(crate::items::get_weapon("Greatsword").unwrap())
            .unwrap();
        assert!(snapshot.equipment.off_hand.is_none());
        assert_eq!(snapshot.inventory.len(), inventory_before + 1);
        assert_eq!(snapshot.inventory[0].item.name, "Shield");
    }

    #[test]
    fn test_off_hand_equip_evicts_two_handed_weapon() {
        let snapshot = crate::testing::snapshot_of(ClassKind::Fighter);
        let snapshot = snapshot
            .equip(crate::items::get_weapon("Greataxe").unwrap())
            .unwrap();
        let snapshot = snapshot
            .equip(crate::items::get_shield("Shield").unwrap())
            .unwrap();
        assert!(snapshot.equipment.main_hand.is_none());
        assert!(snapshot.inventory.iter().any(|s| s.item.name == "Greataxe"));
    }

    #[test]
    fn test_grip_toggle_requires_versatile_weapon() {
        let snapshot = crate::testing::snapshot_of(ClassKind::Fighter);
        let snapshot = snapshot
            .equip(crate::items::get_weapon("Shortsword").unwrap())
            .unwrap();
        let snapshot = snapshot.set_two_handed_grip(true);
        assert!(!snapshot.two_handed_grip);

        let snapshot = snapshot
            .equip(crate::items::get_weapon("Longsword").unwrap())
            .unwrap();
        let snapshot = snapshot.set_two_handed_grip(true);
        assert!(snapshot.two_handed_grip);
    }

    #[test]
    fn test_gear_is_not_equippable() {
        let snapshot = crate::testing::snapshot_of(ClassKind::Fighter);
        assert!(snapshot.equip(crate::items::Item::gear("Torch", 1.0)).is_err());
    }

    #[test]
    fn test_equip_from_inventory_round_trip() {
        let snapshot = crate::testing::snapshot_of(ClassKind::Fighter);
        let snapshot = snapshot
            .equip(crate::items::get_shield("Shield").unwrap())
            .unwrap();
        // The greatsword evicts the shield, then the shield comes back out
        // of the pack and evicts the greatsword.
        let snapshot = snapshot
            .equip(crate::items::get_weapon("Greatsword").unwrap())
            .unwrap();
        let snapshot = snapshot.equip_from_inventory("Shield").unwrap();
        assert!(snapshot.equipment.has_shield());
        assert!(snapshot.equipment.main_hand.is_none());
        assert!(snapshot.inventory.iter().any(|s| s.item.name == "Greatsword"));
        assert!(!snapshot.inventory.iter().any(|s| s.item.name == "Shield"));

        assert!(snapshot.equip_from_inventory("Vorpal Sword").is_err());
    }

    #[test]
    fn test_unequip_returns_item_to_inventory() {
        let snapshot = crate::testing::snapshot_of(ClassKind::Fighter);
        let snapshot = snapshot
            .equip(crate::items::get_armor("Chain Mail").unwrap())
            .unwrap();
        let snapshot = snapshot.unequip(Slot::Body);
        assert!(snapshot.equipment.body.is_none());
        assert!(snapshot.inventory.iter().any(|s| s.item.name == "Chain Mail"));
    }
}
