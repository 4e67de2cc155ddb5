//! QA tests for the character lifecycle.
//!
//! Build a character, equip gear, query derived stats, grant XP, and walk
//! the level-up wizard end to end.

use charsheet_core::builder::SnapshotBuilder;
use charsheet_core::character::{Ability, AbilityScores, BackgroundKind, ClassKind, RaceKind, Skill, Slot};
use charsheet_core::progression::{grant_experience, LevelUpStep, LevelUpWizard};
use charsheet_core::resources::{take_rest, PoolKind, RestKind};
use charsheet_core::{calc, items};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn roland() -> charsheet_core::CharacterSnapshot {
    SnapshotBuilder::new()
        .name("Roland")
        .race(RaceKind::Human)
        .class(ClassKind::Fighter)
        .background(BackgroundKind::Soldier)
        .standard_array(AbilityScores::new(15, 14, 13, 12, 10, 8))
        .skills(vec![Skill::Athletics, Skill::Perception])
        .build()
        .expect("valid fighter")
}

#[test]
fn test_created_fighter_stats() {
    let roland = roland();
    // STR 15 + 1 = 16, CON 13 + 1 = 14.
    assert_eq!(calc::effective_ability(&roland, Ability::Strength), 16);
    assert_eq!(calc::hit_points(&roland), 12); // d10 + 2
    assert_eq!(calc::armor_class(&roland), 12); // 10 + DEX 2
    assert_eq!(calc::skill_bonus(&roland, Skill::Athletics), 5); // +3 STR, +2 prof
    assert_eq!(calc::saving_throw_bonus(&roland, Ability::Strength), 5);
    assert_eq!(calc::saving_throw_bonus(&roland, Ability::Wisdom), 0);
    assert_eq!(calc::passive_perception(&roland), 12);
}

#[test]
fn test_equipment_changes_are_pure_transforms() {
    let roland = roland();
    let armored = roland
        .equip(items::get_armor("Chain Mail").unwrap())
        .unwrap()
        .equip(items::get_shield("Shield").unwrap())
        .unwrap()
        .equip(items::get_weapon("Longsword").unwrap())
        .unwrap();

    // The original snapshot is untouched.
    assert_eq!(calc::armor_class(&roland), 12);
    assert_eq!(calc::armor_class(&armored), 18); // 16 heavy + 2 shield
    assert_eq!(calc::melee_damage_expression(&armored), "1d8+3");

    // Switching to a greatsword sends the shield back to the pack.
    let two_handed = armored.equip(items::get_weapon("Greatsword").unwrap()).unwrap();
    assert!(two_handed.equipment.off_hand.is_none());
    assert_eq!(calc::armor_class(&two_handed), 16);
    assert_eq!(calc::melee_damage_expression(&two_handed), "2d6+3");
    assert!(two_handed.inventory.iter().any(|s| s.item.name == "Shield"));

    let bare = two_handed.unequip(Slot::MainHand);
    assert_eq!(calc::melee_damage_expression(&bare), "4"); // 1 + STR
}

#[test]
fn test_level_up_flow_to_level_three() {
    let mut rng = StdRng::seed_from_u64(99);
    let roland = roland();

    // Enough XP for level 3 in one grant: the wizard resolves one level at
    // a time and immediately re-attaches.
    let mut snapshot = grant_experience(&roland, 900);
    assert_eq!(snapshot.pending_level_up.as_ref().unwrap().target_level, 2);

    let mut wizard = LevelUpWizard::new(&snapshot).unwrap();
    let rolled = wizard.roll_hp(&snapshot, &mut rng).unwrap();
    assert!(rolled.total >= 1 && rolled.total <= 12); // 1d10 + 2
    wizard.advance(&snapshot).unwrap();
    assert_eq!(wizard.current_step(), LevelUpStep::Summary);
    snapshot = wizard.commit(&snapshot).unwrap();

    assert_eq!(snapshot.level, 2);
    assert!(snapshot.has_feature_key("action_surge"));
    assert_eq!(snapshot.pending_level_up.as_ref().unwrap().target_level, 3);

    // Level 3 picks the martial archetype.
    let mut wizard = LevelUpWizard::new(&snapshot).unwrap();
    wizard.roll_hp(&snapshot, &mut rng).unwrap();
    wizard.advance(&snapshot).unwrap();
    assert_eq!(wizard.current_step(), LevelUpStep::Subclass);
    wizard.choose_subclass("battle_master");
    wizard.advance(&snapshot).unwrap();
    snapshot = wizard.commit(&snapshot).unwrap();

    assert_eq!(snapshot.level, 3);
    assert_eq!(snapshot.subclass.as_deref(), Some("battle_master"));
    assert!(snapshot.pending_level_up.is_none());

    // Combat superiority arrived with the subclass.
    let pool = snapshot.pool(PoolKind::SuperiorityDice).unwrap();
    assert_eq!(pool.max, 4);
    assert_eq!(pool.current, 4);
}

#[test]
fn test_rest_cycle() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut snapshot = roland();
    snapshot = grant_experience(&snapshot, 900);
    let mut wizard = LevelUpWizard::new(&snapshot).unwrap();
    wizard.roll_hp(&snapshot, &mut rng).unwrap();
    wizard.advance(&snapshot).unwrap();
    snapshot = wizard.commit(&snapshot).unwrap();
    let mut wizard = LevelUpWizard::new(&snapshot).unwrap();
    wizard.roll_hp(&snapshot, &mut rng).unwrap();
    wizard.advance(&snapshot).unwrap();
    wizard.choose_subclass("battle_master");
    wizard.advance(&snapshot).unwrap();
    snapshot = wizard.commit(&snapshot).unwrap();

    let spent = charsheet_core::resources::spend_resource(&snapshot, PoolKind::SuperiorityDice, 3)
        .unwrap();
    assert_eq!(spent.pool(PoolKind::SuperiorityDice).unwrap().current, 1);

    let rested = take_rest(&spent, RestKind::Short);
    assert_eq!(rested.pool(PoolKind::SuperiorityDice).unwrap().current, 4);
}

#[test]
fn test_experience_is_monotonic() {
    let roland = roland();
    let snapshot = grant_experience(&roland, 100);
    let snapshot = grant_experience(&snapshot, 0);
    assert_eq!(snapshot.experience, 100);
}
