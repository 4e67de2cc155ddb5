//! Test support: canned snapshots.
//!
//! Builds plain level-N characters (Human, Soldier background, straight 10s)
//! so unit and integration tests can set exactly the scores and gear they
//! care about.

use crate::calc;
use crate::character::{
    AbilityScores, BackgroundKind, CharacterId, CharacterSnapshot, ClassKind, Equipment, RaceKind,
};
use crate::dataset::{self, FeatureKey};
use crate::resources;
use std::collections::BTreeMap;

/// A fresh level-1 snapshot of the given class.
pub fn snapshot_of(class: ClassKind) -> CharacterSnapshot {
    leveled_snapshot(class, 1)
}

/// A snapshot at `level` with every class and race feature granted up to
/// that level. No subclass is chosen; see [`with_subclass`].
pub fn leveled_snapshot(class: ClassKind, level: u8) -> CharacterSnapshot {
    let def = dataset::class_def(class);
    let race = RaceKind::Human;

    let mut features: Vec<FeatureKey> = Vec::new();
    for (feature_level, key) in def.features {
        if *feature_level <= level {
            features.push(FeatureKey::known(key));
        }
    }
    for key in dataset::race_def(race).features {
        features.push(FeatureKey::known(key));
    }

    let mut snapshot = CharacterSnapshot {
        id: CharacterId::new(),
        name: format!("Test {}", class.name()),
        abilities: AbilityScores::default(),
        race,
        subrace: None,
        floating_bonus_choices: Vec::new(),
        class,
        subclass: None,
        background: BackgroundKind::Soldier,
        level,
        experience: dataset::xp_threshold(level).unwrap_or(0),
        max_hp: 0,
        class_skill_choices: Vec::new(),
        expertise: Vec::new(),
        features,
        feats: Vec::new(),
        weapon_masteries: Vec::new(),
        draconic_ancestry: None,
        equipment: Equipment::default(),
        two_handed_grip: false,
        inventory: Vec::new(),
        cantrips: Vec::new(),
        known_spells: Vec::new(),
        prepared_spells: Vec::new(),
        spellbook: Vec::new(),
        pools: BTreeMap::new(),
        pending_level_up: None,
    };
    snapshot.max_hp = calc::level_one_hit_points(&snapshot);
    snapshot.pools = resources::recompute_pools(&snapshot);
    snapshot
}

/// Set the subclass and grant its features up to the snapshot's level.
pub fn with_subclass(mut snapshot: CharacterSnapshot, subclass_key: &str) -> CharacterSnapshot {
    let def = dataset::class_def(snapshot.class);
    let subclass = def
        .subclass(subclass_key)
        .unwrap_or_else(|| panic!("{} has no subclass {subclass_key}", snapshot.class));

    snapshot.subclass = Some(subclass.key.to_string());
    for (feature_level, key) in subclass.features {
        if *feature_level <= snapshot.level {
            snapshot.features.push(FeatureKey::known(key));
        }
    }
    snapshot.pools = resources::recompute_pools(&snapshot);
    snapshot
}
