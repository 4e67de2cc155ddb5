//! QA tests for class-specific rules through the public API.

use charsheet_core::character::ClassKind;
use charsheet_core::classes::ClassStrategy;
use charsheet_core::resources::{spend_resource, take_rest, PoolKind, RestKind};
use charsheet_core::testing::{leveled_snapshot, snapshot_of, with_subclass};

// =============================================================================
// WARLOCK PACT SLOTS
// =============================================================================

#[test]
fn test_warlock_pact_slots_return_on_short_rest() {
    let warlock = leveled_snapshot(ClassKind::Warlock, 5);
    assert_eq!(warlock.pool(PoolKind::PactSlots).unwrap().max, 2);

    let spent = spend_resource(&warlock, PoolKind::PactSlots, 2).unwrap();
    assert_eq!(spent.pool(PoolKind::PactSlots).unwrap().current, 0);

    let rested = take_rest(&spent, RestKind::Short);
    assert_eq!(rested.pool(PoolKind::PactSlots).unwrap().current, 2);
}

#[test]
fn test_overspending_pact_slots_fails_without_partial_spend() {
    let warlock = leveled_snapshot(ClassKind::Warlock, 5);
    let spent = spend_resource(&warlock, PoolKind::PactSlots, 1).unwrap();
    let err = spend_resource(&spent, PoolKind::PactSlots, 2).unwrap_err();
    assert_eq!(err.needed, 2);
    assert_eq!(err.available, 1);
    // The failed spend changed nothing.
    assert_eq!(spent.pool(PoolKind::PactSlots).unwrap().current, 1);
}

// =============================================================================
// SORCERER SORCERY POINTS
// =============================================================================

#[test]
fn test_sorcery_points_only_return_on_long_rest() {
    let sorcerer = leveled_snapshot(ClassKind::Sorcerer, 5);
    let spent = spend_resource(&sorcerer, PoolKind::SorceryPoints, 2).unwrap();
    assert_eq!(spent.pool(PoolKind::SorceryPoints).unwrap().current, 3);

    let short = take_rest(&spent, RestKind::Short);
    assert_eq!(short.pool(PoolKind::SorceryPoints).unwrap().current, 3);

    let long = take_rest(&spent, RestKind::Long);
    assert_eq!(long.pool(PoolKind::SorceryPoints).unwrap().current, 5);
}

// =============================================================================
// MONK KI AND BARBARIAN RAGE
// =============================================================================

#[test]
fn test_ki_and_rage_return_on_either_rest() {
    let monk = leveled_snapshot(ClassKind::Monk, 6);
    let spent = spend_resource(&monk, PoolKind::Ki, 6).unwrap();
    assert_eq!(take_rest(&spent, RestKind::Short).pool(PoolKind::Ki).unwrap().current, 6);
    assert_eq!(take_rest(&spent, RestKind::Long).pool(PoolKind::Ki).unwrap().current, 6);

    let barbarian = leveled_snapshot(ClassKind::Barbarian, 6);
    let spent = spend_resource(&barbarian, PoolKind::RageUses, 4).unwrap();
    assert_eq!(
        take_rest(&spent, RestKind::Short)
            .pool(PoolKind::RageUses)
            .unwrap()
            .current,
        4
    );
}

// =============================================================================
// NAMED BONUS HOOKS
// =============================================================================

#[test]
fn test_divine_smite_table() {
    let paladin = leveled_snapshot(ClassKind::Paladin, 5);
    let strategy = ClassStrategy::new(&paladin);
    assert_eq!(strategy.divine_smite_dice(4, false).as_deref(), Some("5d8"));
    assert_eq!(strategy.divine_smite_dice(4, true).as_deref(), Some("6d8"));
    assert_eq!(strategy.divine_smite_dice(5, true).as_deref(), Some("6d8"));
}

#[test]
fn test_sneak_attack_table() {
    for (level, expected) in [(1u8, "1d6"), (3, "2d6"), (11, "6d6"), (20, "10d6")] {
        let rogue = leveled_snapshot(ClassKind::Rogue, level);
        assert_eq!(
            ClassStrategy::new(&rogue).sneak_attack_dice().as_deref(),
            Some(expected)
        );
    }
}

#[test]
fn test_hooks_are_neutral_for_other_classes() {
    let fighter = snapshot_of(ClassKind::Fighter);
    let strategy = ClassStrategy::new(&fighter);
    assert_eq!(strategy.sneak_attack_dice(), None);
    assert_eq!(strategy.divine_smite_dice(3, false), None);
    assert_eq!(strategy.rage_damage_bonus(), None);
    assert_eq!(strategy.martial_arts_die(), None);
}

#[test]
fn test_strategies_answer_from_the_snapshot_they_see() {
    // Same character, two snapshots at different levels: strategies are
    // constructed per query and never cache across mutations.
    let low = leveled_snapshot(ClassKind::Rogue, 3);
    let mut high = low.clone();
    high.level = 11;
    assert_eq!(ClassStrategy::new(&low).sneak_attack_dice().as_deref(), Some("2d6"));
    assert_eq!(ClassStrategy::new(&high).sneak_attack_dice().as_deref(), Some("6d6"));
}

#[test]
fn test_battle_master_progression() {
    let bm = with_subclass(leveled_snapshot(ClassKind::Fighter, 15), "battle_master");
    let strategy = ClassStrategy::new(&bm);
    assert_eq!(bm.pool(PoolKind::SuperiorityDice).unwrap().max, 6);
    assert_eq!(
        strategy.superiority_die(),
        Some(charsheet_core::dice::DieType::D10)
    );
}
