//! Item definitions and the standard equipment catalog.
//!
//! Items carry a slot-compatibility kind, weight, damage or armor numbers,
//! and property tags. The catalog is a read-only dataset looked up by name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which slot an item is compatible with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon,
    Armor,
    Shield,
    Gear,
}

/// Armor weight categories, which govern the DEX contribution to AC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmorCategory {
    Light,
    Medium,
    Heavy,
}

/// Weapon property tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemProperty {
    Finesse,
    Light,
    Heavy,
    TwoHanded,
    /// Larger damage dice when wielded in both hands.
    Versatile(String),
    Thrown,
    Reach,
}

/// A single item definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub kind: ItemKind,
    pub weight: f32,
    /// One-handed damage dice for weapons.
    pub damage_dice: Option<String>,
    /// Base AC for armor.
    pub base_ac: Option<u8>,
    pub armor_category: Option<ArmorCategory>,
    /// Flat AC bonus for shields.
    pub shield_bonus: Option<u8>,
    pub properties: Vec<ItemProperty>,
}

impl Item {
    pub fn weapon(name: impl Into<String>, damage_dice: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Weapon,
            weight: 0.0,
            damage_dice: Some(damage_dice.into()),
            base_ac: None,
            armor_category: None,
            shield_bonus: None,
            properties: Vec::new(),
        }
    }

    pub fn armor(name: impl Into<String>, category: ArmorCategory, base_ac: u8) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Armor,
            weight: 0.0,
            damage_dice: None,
            base_ac: Some(base_ac),
            armor_category: Some(category),
            shield_bonus: None,
            properties: Vec::new(),
        }
    }

    pub fn shield(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Shield,
            weight: 6.0,
            damage_dice: None,
            base_ac: None,
            armor_category: None,
            shield_bonus: Some(2),
            properties: Vec::new(),
        }
    }

    pub fn gear(name: impl Into<String>, weight: f32) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Gear,
            weight,
            damage_dice: None,
            base_ac: None,
            armor_category: None,
            shield_bonus: None,
            properties: Vec::new(),
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_properties(mut self, properties: Vec<ItemProperty>) -> Self {
        self.properties = properties;
        self
    }

    pub fn is_two_handed(&self) -> bool {
        self.properties.contains(&ItemProperty::TwoHanded)
    }

    pub fn is_finesse(&self) -> bool {
        self.properties.contains(&ItemProperty::Finesse)
    }

    pub fn is_light(&self) -> bool {
        self.properties.contains(&ItemProperty::Light)
    }

    /// The two-handed damage dice of a versatile weapon, if any.
    pub fn versatile_dice(&self) -> Option<&str> {
        self.properties.iter().find_map(|p| match p {
            ItemProperty::Versatile(dice) => Some(dice.as_str()),
            _ => None,
        })
    }

    /// Weapons, armor and shields are distinct objects; gear stacks.
    pub fn stackable(&self) -> bool {
        self.kind == ItemKind::Gear
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ============================================================================
// Catalog
// ============================================================================

lazy_static::lazy_static! {
    /// Standard weapons.
    pub static ref WEAPONS: Vec<Item> = vec![
        Item::weapon("Club", "1d4")
            .with_weight(2.0)
            .with_properties(vec![ItemProperty::Light]),
        Item::weapon("Dagger", "1d4")
            .with_weight(1.0)
            .with_properties(vec![ItemProperty::Finesse, ItemProperty::Light, ItemProperty::Thrown]),
        Item::weapon("Greatclub", "1d8")
            .with_weight(10.0)
            .with_properties(vec![ItemProperty::TwoHanded]),
        Item::weapon("Handaxe", "1d6")
            .with_weight(2.0)
            .with_properties(vec![ItemProperty::Light, ItemProperty::Thrown]),
        Item::weapon("Javelin", "1d6")
            .with_weight(2.0)
            .with_properties(vec![ItemProperty::Thrown]),
        Item::weapon("Mace", "1d6").with_weight(4.0),
        Item::weapon("Quarterstaff", "1d6")
            .with_weight(4.0)
            .with_properties(vec![ItemProperty::Versatile("1d8".to_string())]),
        Item::weapon("Spear", "1d6")
            .with_weight(3.0)
            .with_properties(vec![ItemProperty::Thrown, ItemProperty::Versatile("1d8".to_string())]),
        Item::weapon("Battleaxe", "1d8")
            .with_weight(4.0)
            .with_properties(vec![ItemProperty::Versatile("1d10".to_string())]),
        Item::weapon("Glaive", "1d10")
            .with_weight(6.0)
            .with_properties(vec![ItemProperty::Heavy, ItemProperty::Reach, ItemProperty::TwoHanded]),
        Item::weapon("Greataxe", "1d12")
            .with_weight(7.0)
            .with_properties(vec![ItemProperty::Heavy, ItemProperty::TwoHanded]),
        Item::weapon("Greatsword", "2d6")
            .with_weight(6.0)
            .with_properties(vec![ItemProperty::Heavy, ItemProperty::TwoHanded]),
        Item::weapon("Longsword", "1d8")
            .with_weight(3.0)
            .with_properties(vec![ItemProperty::Versatile("1d10".to_string())]),
        Item::weapon("Maul", "2d6")
            .with_weight(10.0)
            .with_properties(vec![ItemProperty::Heavy, ItemProperty::TwoHanded]),
        Item::weapon("Rapier", "1d8")
            .with_weight(2.0)
            .with_properties(vec![ItemProperty::Finesse]),
        Item::weapon("Scimitar", "1d6")
            .with_weight(3.0)
            .with_properties(vec![ItemProperty::Finesse, ItemProperty::Light]),
        Item::weapon("Shortsword", "1d6")
            .with_weight(2.0)
            .with_properties(vec![ItemProperty::Finesse, ItemProperty::Light]),
        Item::weapon("Warhammer", "1d8")
            .with_weight(2.0)
            .with_properties(vec![ItemProperty::Versatile("1d10".to_string())]),
    ];

    /// Standard armor.
    pub static ref ARMORS: Vec<Item> = vec![
        Item::armor("Padded", ArmorCategory::Light, 11).with_weight(8.0),
        Item::armor("Leather", ArmorCategory::Light, 11).with_weight(10.0),
        Item::armor("Studded Leather", ArmorCategory::Light, 12).with_weight(13.0),
        Item::armor("Hide", ArmorCategory::Medium, 12).with_weight(12.0),
        Item::armor("Chain Shirt", ArmorCategory::Medium, 13).with_weight(20.0),
        Item::armor("Scale Mail", ArmorCategory::Medium, 14).with_weight(45.0),
        Item::armor("Breastplate", ArmorCategory::Medium, 14).with_weight(20.0),
        Item::armor("Half Plate", ArmorCategory::Medium, 15).with_weight(40.0),
        Item::armor("Ring Mail", ArmorCategory::Heavy, 14).with_weight(40.0),
        Item::armor("Chain Mail", ArmorCategory::Heavy, 16).with_weight(55.0),
        Item::armor("Splint", ArmorCategory::Heavy, 17).with_weight(60.0),
        Item::armor("Plate", ArmorCategory::Heavy, 18).with_weight(65.0),
    ];

    /// Shields.
    pub static ref SHIELDS: Vec<Item> = vec![
        Item::shield("Shield"),
    ];
}

/// Look up a weapon by name (case-insensitive).
pub fn get_weapon(name: &str) -> Option<Item> {
    WEAPONS
        .iter()
        .find(|w| w.name.eq_ignore_ascii_case(name))
        .cloned()
}

/// Look up an armor piece by name (case-insensitive).
pub fn get_armor(name: &str) -> Option<Item> {
    ARMORS
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
        .cloned()
}

/// Look up a shield by name (case-insensitive).
pub fn get_shield(name: &str) -> Option<Item> {
    SHIELDS
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .cloned()
}

/// Try to find any catalog item by name.
pub fn find_item(name: &str) -> Option<Item> {
    get_weapon(name)
        .or_else(|| get_armor(name))
        .or_else(|| get_shield(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup_is_case_insensitive() {
        assert!(get_weapon("longsword").is_some());
        assert!(get_armor("CHAIN MAIL").is_some());
        assert!(get_shield("shield").is_some());
        assert!(find_item("No Such Thing").is_none());
    }

    #[test]
    fn test_greatsword_is_two_handed() {
        let greatsword = get_weapon("Greatsword").unwrap();
        assert!(greatsword.is_two_handed());
        assert_eq!(greatsword.damage_dice.as_deref(), Some("2d6"));
    }

    #[test]
    fn test_longsword_versatile_dice() {
        let longsword = get_weapon("Longsword").unwrap();
        assert!(!longsword.is_two_handed());
        assert_eq!(longsword.versatile_dice(), Some("1d10"));
    }

    #[test]
    fn test_armor_categories() {
        assert_eq!(
            get_armor("Leather").unwrap().armor_category,
            Some(ArmorCategory::Light)
        );
        assert_eq!(
            get_armor("Scale Mail").unwrap().armor_category,
            Some(ArmorCategory::Medium)
        );
        assert_eq!(
            get_armor("Plate").unwrap().armor_category,
            Some(ArmorCategory::Heavy)
        );
    }

    #[test]
    fn test_only_gear_stacks() {
        assert!(!get_weapon("Dagger").unwrap().stackable());
        assert!(Item::gear("Torch", 1.0).stackable());
    }
}
