//! QA tests for the persistence contract: serialize then deserialize yields
//! an equivalent snapshot.

use charsheet_core::builder::SnapshotBuilder;
use charsheet_core::character::{AbilityScores, BackgroundKind, CharacterSnapshot, ClassKind, RaceKind, Skill};
use charsheet_core::progression::grant_experience;
use charsheet_core::spells::DamageType;
use charsheet_core::items;

fn sample_snapshot() -> CharacterSnapshot {
    let snapshot = SnapshotBuilder::new()
        .name("Zara")
        .race(RaceKind::Dragonborn)
        .class(ClassKind::Sorcerer)
        .background(BackgroundKind::Noble)
        .standard_array(AbilityScores::new(10, 13, 14, 8, 12, 15))
        .skills(vec![Skill::Arcana, Skill::Persuasion])
        .subclass("draconic_bloodline")
        .draconic_ancestry(DamageType::Fire)
        .cantrips(vec![
            "Fire Bolt".into(),
            "Ray of Frost".into(),
            "Shocking Grasp".into(),
            "Light".into(),
        ])
        .spells(vec!["Burning Hands".into(), "Shield".into()])
        .build()
        .expect("valid sorcerer");

    let snapshot = snapshot
        .equip(items::get_weapon("Quarterstaff").unwrap())
        .unwrap()
        .set_two_handed_grip(true);

    // Leave a pending level-up attached so the descriptor round-trips too.
    grant_experience(&snapshot, 300)
}

#[test]
fn test_snapshot_round_trips_through_json() {
    let snapshot = sample_snapshot();
    let json = serde_json::to_string_pretty(&snapshot).expect("serializes");
    let restored: CharacterSnapshot = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(snapshot, restored);
}

#[test]
fn test_round_trip_preserves_derived_queries() {
    use charsheet_core::calc;
    use charsheet_core::classes::ClassStrategy;

    let snapshot = sample_snapshot();
    let json = serde_json::to_string(&snapshot).expect("serializes");
    let restored: CharacterSnapshot = serde_json::from_str(&json).expect("deserializes");

    assert_eq!(calc::armor_class(&snapshot), calc::armor_class(&restored));
    assert_eq!(
        calc::melee_damage_expression(&snapshot),
        calc::melee_damage_expression(&restored)
    );
    assert_eq!(
        ClassStrategy::new(&snapshot).spell_save_dc(),
        ClassStrategy::new(&restored).spell_save_dc()
    );
    assert_eq!(snapshot.pending_level_up, restored.pending_level_up);
}
