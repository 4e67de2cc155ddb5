//! Tabletop RPG character rules engine.
//!
//! This crate provides:
//! - Derived-stat queries over an immutable character snapshot
//! - Twelve class rule sets behind one strategy contract
//! - Depletable, rest-rechargeable resource pools
//! - A validated level-up state machine driven by XP thresholds
//! - Spell effect resolution against target lists
//!
//! Presentation, persistence and combat resolution are external
//! collaborators: the engine is a synchronous in-process library whose
//! query functions are pure and whose transforms return new snapshots.
//!
//! # Quick Start
//!
//! ```
//! use charsheet_core::builder::SnapshotBuilder;
//! use charsheet_core::character::{AbilityScores, BackgroundKind, ClassKind, RaceKind, Skill};
//! use charsheet_core::{calc, progression};
//!
//! let snapshot = SnapshotBuilder::new()
//!     .name("Roland")
//!     .race(RaceKind::Human)
//!     .class(ClassKind::Fighter)
//!     .background(BackgroundKind::Soldier)
//!     .standard_array(AbilityScores::new(15, 14, 13, 12, 10, 8))
//!     .skills(vec![Skill::Athletics, Skill::Perception])
//!     .build()
//!     .expect("valid character");
//!
//! assert_eq!(calc::armor_class(&snapshot), 12);
//!
//! let snapshot = progression::grant_experience(&snapshot, 300);
//! assert!(snapshot.pending_level_up.is_some());
//! ```

pub mod builder;
pub mod calc;
pub mod character;
pub mod classes;
pub mod dataset;
pub mod dice;
pub mod items;
pub mod progression;
pub mod resources;
pub mod spellcast;
pub mod spells;
pub mod testing;

// Primary public API
pub use builder::SnapshotBuilder;
pub use character::{
    Ability, AbilityScores, BackgroundKind, CharacterSnapshot, ClassKind, PendingLevelUp,
    RaceKind, Skill,
};
pub use classes::{ClassStrategy, Metamagic, SpellQuantityModel};
pub use progression::{grant_experience, ChoiceError, LevelUpStep, LevelUpWizard};
pub use resources::{PoolKind, ResourcePool, RestKind};
pub use spellcast::{resolve_spell, SpellTarget};
