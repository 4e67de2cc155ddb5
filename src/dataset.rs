//! The read-only rules dataset.
//!
//! Class, race, background, feature and progression tables, keyed by string
//! identifiers. The engine only ever reads from this module. Feature keys
//! are typed and validated against the registry so a typo surfaces as a
//! [`DatasetError`] at load time instead of silently granting nothing.

use crate::character::{Ability, BackgroundKind, ClassKind, RaceKind, Skill, Subrace};
use crate::dice::DieType;
use crate::spells::DamageType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Error type for dataset lookups.
#[derive(Debug, Clone, Error)]
pub enum DatasetError {
    #[error("Unknown feature key: {0}")]
    MissingReference(String),
}

// ============================================================================
// Feature Keys
// ============================================================================

/// A validated identifier for a feature in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureKey(String);

impl FeatureKey {
    /// Resolve a string against the feature registry.
    pub fn resolve(key: &str) -> Result<FeatureKey, DatasetError> {
        if FEATURES.contains_key(key) {
            Ok(FeatureKey(key.to_string()))
        } else {
            Err(DatasetError::MissingReference(key.to_string()))
        }
    }

    /// Construct a key the dataset itself declares. Only used on strings
    /// that appear in the registry; `validate()` proves that.
    pub(crate) fn known(key: &str) -> FeatureKey {
        FeatureKey(key.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The mechanics payload attached to a feature definition.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureMechanic {
    /// Descriptive feature with no engine hook.
    None,
    /// An ability-score-improvement-or-feat decision lands on this level.
    AbilityScoreImprovement,
    /// A subclass must be chosen at this level.
    SubclassChoice,
    /// Flat HP added per character level (Dwarven Toughness, Tough).
    HpBonusPerLevel(i32),
    /// Unarmored AC is 10 + DEX + the given second ability.
    UnarmoredDefense(Ability),
    /// Extra weapon damage on hit, by damage type (Divine Strike variants).
    DivineStrike { damage_type: DamageType },
    /// Critical hits land on this natural roll or higher.
    ImprovedCritical { floor: u32 },
    /// An additional attack per attack action.
    ExtraAttack,
    /// CHA modifier added to spell damage matching the draconic ancestry.
    ElementalAffinity,
    /// INT modifier added once to evocation spell damage.
    EmpoweredEvocation,
    /// Abjurer ward hit-point pool.
    ArcaneWard,
    /// Battle Master superiority dice become the given size.
    SuperiorityDieSize(DieType),
    /// Feat granting a cantrip/spell package; requires sub-choices.
    MagicInitiate,
    /// Metamagic options unlock.
    Metamagic,
}

/// A feature definition in the registry.
#[derive(Debug, Clone)]
pub struct FeatureDef {
    pub key: &'static str,
    pub name: &'static str,
    pub mechanic: FeatureMechanic,
    /// Whether this feature is acquired as a feat.
    pub feat: bool,
}

macro_rules! feature {
    ($key:literal, $name:literal) => {
        FeatureDef { key: $key, name: $name, mechanic: FeatureMechanic::None, feat: false }
    };
    ($key:literal, $name:literal, $mech:expr) => {
        FeatureDef { key: $key, name: $name, mechanic: $mech, feat: false }
    };
    (feat $key:literal, $name:literal, $mech:expr) => {
        FeatureDef { key: $key, name: $name, mechanic: $mech, feat: true }
    };
}

static FEATURE_DEFS: &[FeatureDef] = &[
    // Shared
    feature!("ability_score_improvement", "Ability Score Improvement", FeatureMechanic::AbilityScoreImprovement),
    feature!("spellcasting", "Spellcasting"),
    feature!("extra_attack", "Extra Attack", FeatureMechanic::ExtraAttack),
    feature!("fighting_style", "Fighting Style"),
    feature!("expertise", "Expertise"),
    // Barbarian
    feature!("rage", "Rage"),
    feature!("unarmored_defense_barbarian", "Unarmored Defense", FeatureMechanic::UnarmoredDefense(Ability::Constitution)),
    feature!("reckless_attack", "Reckless Attack"),
    feature!("danger_sense", "Danger Sense"),
    feature!("primal_path", "Primal Path", FeatureMechanic::SubclassChoice),
    feature!("fast_movement", "Fast Movement"),
    feature!("feral_instinct", "Feral Instinct"),
    feature!("brutal_critical", "Brutal Critical"),
    feature!("relentless_rage", "Relentless Rage"),
    feature!("persistent_rage", "Persistent Rage"),
    feature!("primal_champion", "Primal Champion"),
    feature!("frenzy", "Frenzy"),
    feature!("mindless_rage", "Mindless Rage"),
    feature!("intimidating_presence", "Intimidating Presence"),
    feature!("totem_spirit", "Totem Spirit"),
    feature!("aspect_of_the_beast", "Aspect of the Beast"),
    feature!("totemic_attunement", "Totemic Attunement"),
    // Bard
    feature!("bardic_inspiration", "Bardic Inspiration"),
    feature!("jack_of_all_trades", "Jack of All Trades"),
    feature!("song_of_rest", "Song of Rest"),
    feature!("bard_college", "Bard College", FeatureMechanic::SubclassChoice),
    feature!("font_of_inspiration", "Font of Inspiration"),
    feature!("countercharm", "Countercharm"),
    feature!("superior_inspiration", "Superior Inspiration"),
    feature!("cutting_words", "Cutting Words"),
    feature!("additional_magical_secrets", "Additional Magical Secrets"),
    feature!("peerless_skill", "Peerless Skill"),
    feature!("combat_inspiration", "Combat Inspiration"),
    feature!("battle_magic", "Battle Magic"),
    // Cleric
    feature!("divine_domain", "Divine Domain", FeatureMechanic::SubclassChoice),
    feature!("channel_divinity", "Channel Divinity"),
    feature!("destroy_undead", "Destroy Undead"),
    feature!("divine_intervention", "Divine Intervention"),
    feature!("disciple_of_life", "Disciple of Life"),
    feature!("preserve_life", "Preserve Life"),
    feature!("divine_strike_radiant", "Divine Strike", FeatureMechanic::DivineStrike { damage_type: DamageType::Radiant }),
    feature!("wrath_of_the_storm", "Wrath of the Storm"),
    feature!("destructive_wrath", "Destructive Wrath"),
    feature!("divine_strike_thunder", "Divine Strike", FeatureMechanic::DivineStrike { damage_type: DamageType::Thunder }),
    // Druid
    feature!("druidic", "Druidic"),
    feature!("wild_shape", "Wild Shape"),
    feature!("druid_circle", "Druid Circle", FeatureMechanic::SubclassChoice),
    feature!("timeless_body", "Timeless Body"),
    feature!("archdruid", "Archdruid"),
    feature!("natural_recovery", "Natural Recovery"),
    feature!("combat_wild_shape", "Combat Wild Shape"),
    // Fighter
    feature!("second_wind", "Second Wind"),
    feature!("action_surge", "Action Surge"),
    feature!("martial_archetype", "Martial Archetype", FeatureMechanic::SubclassChoice),
    feature!("indomitable", "Indomitable"),
    feature!("improved_critical", "Improved Critical", FeatureMechanic::ImprovedCritical { floor: 19 }),
    feature!("remarkable_athlete", "Remarkable Athlete"),
    feature!("superior_critical", "Superior Critical", FeatureMechanic::ImprovedCritical { floor: 18 }),
    feature!("survivor", "Survivor"),
    feature!("combat_superiority", "Combat Superiority", FeatureMechanic::SuperiorityDieSize(DieType::D8)),
    feature!("know_your_enemy", "Know Your Enemy"),
    feature!("improved_combat_superiority_d10", "Improved Combat Superiority", FeatureMechanic::SuperiorityDieSize(DieType::D10)),
    feature!("relentless", "Relentless"),
    feature!("improved_combat_superiority_d12", "Improved Combat Superiority", FeatureMechanic::SuperiorityDieSize(DieType::D12)),
    // Monk
    feature!("unarmored_defense_monk", "Unarmored Defense", FeatureMechanic::UnarmoredDefense(Ability::Wisdom)),
    feature!("martial_arts", "Martial Arts"),
    feature!("ki", "Ki"),
    feature!("unarmored_movement", "Unarmored Movement"),
    feature!("monastic_tradition", "Monastic Tradition", FeatureMechanic::SubclassChoice),
    feature!("deflect_missiles", "Deflect Missiles"),
    feature!("slow_fall", "Slow Fall"),
    feature!("stunning_strike", "Stunning Strike"),
    feature!("perfect_self", "Perfect Self"),
    feature!("open_hand_technique", "Open Hand Technique"),
    feature!("wholeness_of_body", "Wholeness of Body"),
    feature!("shadow_arts", "Shadow Arts"),
    // Paladin
    feature!("divine_sense", "Divine Sense"),
    feature!("lay_on_hands", "Lay on Hands"),
    feature!("divine_smite", "Divine Smite"),
    feature!("divine_health", "Divine Health"),
    feature!("sacred_oath", "Sacred Oath", FeatureMechanic::SubclassChoice),
    feature!("aura_of_protection", "Aura of Protection"),
    feature!("aura_of_courage", "Aura of Courage"),
    feature!("improved_divine_smite", "Improved Divine Smite"),
    feature!("cleansing_touch", "Cleansing Touch"),
    feature!("sacred_weapon", "Sacred Weapon"),
    feature!("aura_of_devotion", "Aura of Devotion"),
    feature!("vow_of_enmity", "Vow of Enmity"),
    // Ranger
    feature!("favored_enemy", "Favored Enemy"),
    feature!("natural_explorer", "Natural Explorer"),
    feature!("ranger_archetype", "Ranger Archetype", FeatureMechanic::SubclassChoice),
    feature!("primeval_awareness", "Primeval Awareness"),
    feature!("hide_in_plain_sight", "Hide in Plain Sight"),
    feature!("vanish", "Vanish"),
    feature!("feral_senses", "Feral Senses"),
    feature!("foe_slayer", "Foe Slayer"),
    feature!("hunters_prey", "Hunter's Prey"),
    feature!("rangers_companion", "Ranger's Companion"),
    // Rogue
    feature!("sneak_attack", "Sneak Attack"),
    feature!("thieves_cant", "Thieves' Cant"),
    feature!("cunning_action", "Cunning Action"),
    feature!("roguish_archetype", "Roguish Archetype", FeatureMechanic::SubclassChoice),
    feature!("uncanny_dodge", "Uncanny Dodge"),
    feature!("evasion", "Evasion"),
    feature!("reliable_talent", "Reliable Talent"),
    feature!("blindsense", "Blindsense"),
    feature!("slippery_mind", "Slippery Mind"),
    feature!("elusive", "Elusive"),
    feature!("stroke_of_luck", "Stroke of Luck"),
    feature!("fast_hands", "Fast Hands"),
    feature!("second_story_work", "Second-Story Work"),
    feature!("supreme_sneak", "Supreme Sneak"),
    feature!("assassinate", "Assassinate"),
    // Sorcerer
    feature!("sorcerous_origin", "Sorcerous Origin", FeatureMechanic::SubclassChoice),
    feature!("font_of_magic", "Font of Magic"),
    feature!("metamagic", "Metamagic", FeatureMechanic::Metamagic),
    feature!("sorcerous_restoration", "Sorcerous Restoration"),
    feature!("draconic_resilience", "Draconic Resilience", FeatureMechanic::HpBonusPerLevel(1)),
    feature!("elemental_affinity", "Elemental Affinity", FeatureMechanic::ElementalAffinity),
    feature!("dragon_wings", "Dragon Wings"),
    feature!("wild_magic_surge", "Wild Magic Surge"),
    feature!("bend_luck", "Bend Luck"),
    // Warlock
    feature!("otherworldly_patron", "Otherworldly Patron", FeatureMechanic::SubclassChoice),
    feature!("pact_magic", "Pact Magic"),
    feature!("eldritch_invocations", "Eldritch Invocations"),
    feature!("pact_boon", "Pact Boon"),
    feature!("mystic_arcanum", "Mystic Arcanum"),
    feature!("eldritch_master", "Eldritch Master"),
    feature!("dark_ones_blessing", "Dark One's Blessing"),
    feature!("dark_ones_own_luck", "Dark One's Own Luck"),
    feature!("fey_presence", "Fey Presence"),
    // Wizard
    feature!("arcane_recovery", "Arcane Recovery"),
    feature!("arcane_tradition", "Arcane Tradition", FeatureMechanic::SubclassChoice),
    feature!("spell_mastery", "Spell Mastery"),
    feature!("signature_spells", "Signature Spells"),
    feature!("sculpt_spells", "Sculpt Spells"),
    feature!("empowered_evocation", "Empowered Evocation", FeatureMechanic::EmpoweredEvocation),
    feature!("overchannel", "Overchannel"),
    feature!("arcane_ward", "Arcane Ward", FeatureMechanic::ArcaneWard),
    feature!("projected_ward", "Projected Ward"),
    // Race traits
    feature!("darkvision", "Darkvision"),
    feature!("keen_senses", "Keen Senses"),
    feature!("fey_ancestry", "Fey Ancestry"),
    feature!("fleet_of_foot", "Fleet of Foot"),
    feature!("dwarven_resilience", "Dwarven Resilience"),
    feature!("dwarven_toughness", "Dwarven Toughness", FeatureMechanic::HpBonusPerLevel(1)),
    feature!("dwarven_armor_training", "Dwarven Armor Training"),
    feature!("lucky", "Lucky"),
    feature!("brave", "Brave"),
    feature!("menacing", "Menacing"),
    feature!("relentless_endurance", "Relentless Endurance"),
    feature!("savage_attacks", "Savage Attacks"),
    feature!("hellish_resistance", "Hellish Resistance"),
    feature!("infernal_legacy", "Infernal Legacy"),
    feature!("gnome_cunning", "Gnome Cunning"),
    feature!("breath_weapon", "Breath Weapon"),
    feature!("draconic_damage_resistance", "Damage Resistance"),
    // Feats
    feature!(feat "alert", "Alert", FeatureMechanic::None),
    feature!(feat "magic_initiate", "Magic Initiate", FeatureMechanic::MagicInitiate),
    feature!(feat "savage_attacker", "Savage Attacker", FeatureMechanic::None),
    feature!(feat "skilled", "Skilled", FeatureMechanic::None),
    feature!(feat "tough", "Tough", FeatureMechanic::HpBonusPerLevel(2)),
    feature!(feat "weapon_master", "Weapon Master", FeatureMechanic::None),
];

/// Global feature registry.
static FEATURES: LazyLock<HashMap<&'static str, &'static FeatureDef>> =
    LazyLock::new(|| FEATURE_DEFS.iter().map(|def| (def.key, def)).collect());

/// Look up a feature definition.
pub fn feature(key: &FeatureKey) -> Option<&'static FeatureDef> {
    FEATURES.get(key.as_str()).copied()
}

/// Look up a feature definition by raw string.
pub fn feature_by_str(key: &str) -> Option<&'static FeatureDef> {
    FEATURES.get(key).copied()
}

/// All feat definitions.
pub fn all_feats() -> impl Iterator<Item = &'static FeatureDef> {
    FEATURE_DEFS.iter().filter(|def| def.feat)
}

// ============================================================================
// Class Definitions
// ============================================================================

/// Per-class static data.
pub struct ClassDef {
    pub class: ClassKind,
    pub hit_die: DieType,
    pub saving_throws: [Ability; 2],
    pub skill_count: usize,
    pub skill_options: &'static [Skill],
    /// Level at which the subclass is chosen.
    pub subclass_level: u8,
    /// Level-indexed feature grants, ascending by level.
    pub features: &'static [(u8, &'static str)],
    pub subclasses: &'static [SubclassDef],
}

/// A subclass with its own level-indexed feature list.
pub struct SubclassDef {
    pub key: &'static str,
    pub name: &'static str,
    pub features: &'static [(u8, &'static str)],
}

impl ClassDef {
    /// Find a subclass by key.
    pub fn subclass(&self, key: &str) -> Option<&'static SubclassDef> {
        self.subclasses.iter().find(|s| s.key == key)
    }

    /// Feature keys this class grants exactly at `level`.
    pub fn features_at(&self, level: u8) -> impl Iterator<Item = &'static str> + '_ {
        self.features
            .iter()
            .filter(move |(l, _)| *l == level)
            .map(|(_, key)| *key)
    }
}

impl SubclassDef {
    pub fn features_at(&self, level: u8) -> impl Iterator<Item = &'static str> + '_ {
        self.features
            .iter()
            .filter(move |(l, _)| *l == level)
            .map(|(_, key)| *key)
    }
}

static BARBARIAN: ClassDef = ClassDef {
    class: ClassKind::Barbarian,
    hit_die: DieType::D12,
    saving_throws: [Ability::Strength, Ability::Constitution],
    skill_count: 2,
    skill_options: &[
        Skill::AnimalHandling,
        Skill::Athletics,
        Skill::Intimidation,
        Skill::Nature,
        Skill::Perception,
        Skill::Survival,
    ],
    subclass_level: 3,
    features: &[
        (1, "rage"),
        (1, "unarmored_defense_barbarian"),
        (2, "reckless_attack"),
        (2, "danger_sense"),
        (3, "primal_path"),
        (4, "ability_score_improvement"),
        (5, "extra_attack"),
        (5, "fast_movement"),
        (7, "feral_instinct"),
        (8, "ability_score_improvement"),
        (9, "brutal_critical"),
        (11, "relentless_rage"),
        (12, "ability_score_improvement"),
        (15, "persistent_rage"),
        (16, "ability_score_improvement"),
        (19, "ability_score_improvement"),
        (20, "primal_champion"),
    ],
    subclasses: &[
        SubclassDef {
            key: "berserker",
            name: "Path of the Berserker",
            features: &[(3, "frenzy"), (6, "mindless_rage"), (10, "intimidating_presence")],
        },
        SubclassDef {
            key: "totem_warrior",
            name: "Path of the Totem Warrior",
            features: &[(3, "totem_spirit"), (6, "aspect_of_the_beast"), (14, "totemic_attunement")],
        },
    ],
};

static BARD: ClassDef = ClassDef {
    class: ClassKind::Bard,
    hit_die: DieType::D8,
    saving_throws: [Ability::Dexterity, Ability::Charisma],
    skill_count: 3,
    skill_options: &[
        Skill::Athletics,
        Skill::Acrobatics,
        Skill::SleightOfHand,
        Skill::Stealth,
        Skill::Arcana,
        Skill::History,
        Skill::Investigation,
        Skill::Nature,
        Skill::Religion,
        Skill::AnimalHandling,
        Skill::Insight,
        Skill::Medicine,
        Skill::Perception,
        Skill::Survival,
        Skill::Deception,
        Skill::Intimidation,
        Skill::Performance,
        Skill::Persuasion,
    ],
    subclass_level: 3,
    features: &[
        (1, "spellcasting"),
        (1, "bardic_inspiration"),
        (2, "jack_of_all_trades"),
        (2, "song_of_rest"),
        (3, "bard_college"),
        (3, "expertise"),
        (4, "ability_score_improvement"),
        (5, "font_of_inspiration"),
        (6, "countercharm"),
        (8, "ability_score_improvement"),
        (10, "expertise"),
        (12, "ability_score_improvement"),
        (16, "ability_score_improvement"),
        (19, "ability_score_improvement"),
        (20, "superior_inspiration"),
    ],
    subclasses: &[
        SubclassDef {
            key: "college_of_lore",
            name: "College of Lore",
            features: &[(3, "cutting_words"), (6, "additional_magical_secrets"), (14, "peerless_skill")],
        },
        SubclassDef {
            key: "college_of_valor",
            name: "College of Valor",
            features: &[(3, "combat_inspiration"), (6, "extra_attack"), (14, "battle_magic")],
        },
    ],
};

static CLERIC: ClassDef = ClassDef {
    class: ClassKind::Cleric,
    hit_die: DieType::D8,
    saving_throws: [Ability::Wisdom, Ability::Charisma],
    skill_count: 2,
    skill_options: &[
        Skill::History,
        Skill::Insight,
        Skill::Medicine,
        Skill::Persuasion,
        Skill::Religion,
    ],
    subclass_level: 1,
    features: &[
        (1, "spellcasting"),
        (1, "divine_domain"),
        (2, "channel_divinity"),
        (4, "ability_score_improvement"),
        (5, "destroy_undead"),
        (8, "ability_score_improvement"),
        (10, "divine_intervention"),
        (12, "ability_score_improvement"),
        (16, "ability_score_improvement"),
        (19, "ability_score_improvement"),
    ],
    subclasses: &[
        SubclassDef {
            key: "life_domain",
            name: "Life Domain",
            features: &[(1, "disciple_of_life"), (2, "preserve_life"), (8, "divine_strike_radiant")],
        },
        SubclassDef {
            key: "tempest_domain",
            name: "Tempest Domain",
            features: &[(1, "wrath_of_the_storm"), (2, "destructive_wrath"), (8, "divine_strike_thunder")],
        },
    ],
};

static DRUID: ClassDef = ClassDef {
    class: ClassKind::Druid,
    hit_die: DieType::D8,
    saving_throws: [Ability::Intelligence, Ability::Wisdom],
    skill_count: 2,
    skill_options: &[
        Skill::Arcana,
        Skill::AnimalHandling,
        Skill::Insight,
        Skill::Medicine,
        Skill::Nature,
        Skill::Perception,
        Skill::Religion,
        Skill::Survival,
    ],
    subclass_level: 2,
    features: &[
        (1, "druidic"),
        (1, "spellcasting"),
        (2, "wild_shape"),
        (2, "druid_circle"),
        (4, "ability_score_improvement"),
        (8, "ability_score_improvement"),
        (12, "ability_score_improvement"),
        (16, "ability_score_improvement"),
        (18, "timeless_body"),
        (19, "ability_score_improvement"),
        (20, "archdruid"),
    ],
    subclasses: &[
        SubclassDef {
            key: "circle_of_the_land",
            name: "Circle of the Land",
            features: &[(2, "natural_recovery")],
        },
        SubclassDef {
            key: "circle_of_the_moon",
            name: "Circle of the Moon",
            features: &[(2, "combat_wild_shape")],
        },
    ],
};

static FIGHTER: ClassDef = ClassDef {
    class: ClassKind::Fighter,
    hit_die: DieType::D10,
    saving_throws: [Ability::Strength, Ability::Constitution],
    skill_count: 2,
    skill_options: &[
        Skill::Acrobatics,
        Skill::AnimalHandling,
        Skill::Athletics,
        Skill::History,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Perception,
        Skill::Survival,
    ],
    subclass_level: 3,
    features: &[
        (1, "fighting_style"),
        (1, "second_wind"),
        (2, "action_surge"),
        (3, "martial_archetype"),
        (4, "ability_score_improvement"),
        (5, "extra_attack"),
        (6, "ability_score_improvement"),
        (8, "ability_score_improvement"),
        (9, "indomitable"),
        (11, "extra_attack"),
        (12, "ability_score_improvement"),
        (14, "ability_score_improvement"),
        (16, "ability_score_improvement"),
        (19, "ability_score_improvement"),
        (20, "extra_attack"),
    ],
    subclasses: &[
        SubclassDef {
            key: "champion",
            name: "Champion",
            features: &[
                (3, "improved_critical"),
                (7, "remarkable_athlete"),
                (15, "superior_critical"),
                (18, "survivor"),
            ],
        },
        SubclassDef {
            key: "battle_master",
            name: "Battle Master",
            features: &[
                (3, "combat_superiority"),
                (7, "know_your_enemy"),
                (10, "improved_combat_superiority_d10"),
                (15, "relentless"),
                (18, "improved_combat_superiority_d12"),
            ],
        },
    ],
};

static MONK: ClassDef = ClassDef {
    class: ClassKind::Monk,
    hit_die: DieType::D8,
    saving_throws: [Ability::Strength, Ability::Dexterity],
    skill_count: 2,
    skill_options: &[
        Skill::Acrobatics,
        Skill::Athletics,
        Skill::History,
        Skill::Insight,
        Skill::Religion,
        Skill::Stealth,
    ],
    subclass_level: 3,
    features: &[
        (1, "unarmored_defense_monk"),
        (1, "martial_arts"),
        (2, "ki"),
        (2, "unarmored_movement"),
        (3, "monastic_tradition"),
        (3, "deflect_missiles"),
        (4, "ability_score_improvement"),
        (4, "slow_fall"),
        (5, "extra_attack"),
        (5, "stunning_strike"),
        (8, "ability_score_improvement"),
        (12, "ability_score_improvement"),
        (16, "ability_score_improvement"),
        (19, "ability_score_improvement"),
        (20, "perfect_self"),
    ],
    subclasses: &[
        SubclassDef {
            key: "way_of_the_open_hand",
            name: "Way of the Open Hand",
            features: &[(3, "open_hand_technique"), (6, "wholeness_of_body")],
        },
        SubclassDef {
            key: "way_of_shadow",
            name: "Way of Shadow",
            features: &[(3, "shadow_arts")],
        },
    ],
};

static PALADIN: ClassDef = ClassDef {
    class: ClassKind::Paladin,
    hit_die: DieType::D10,
    saving_throws: [Ability::Wisdom, Ability::Charisma],
    skill_count: 2,
    skill_options: &[
        Skill::Athletics,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Medicine,
        Skill::Persuasion,
        Skill::Religion,
    ],
    subclass_level: 3,
    features: &[
        (1, "divine_sense"),
        (1, "lay_on_hands"),
        (2, "fighting_style"),
        (2, "spellcasting"),
        (2, "divine_smite"),
        (3, "sacred_oath"),
        (3, "divine_health"),
        (4, "ability_score_improvement"),
        (5, "extra_attack"),
        (6, "aura_of_protection"),
        (8, "ability_score_improvement"),
        (10, "aura_of_courage"),
        (11, "improved_divine_smite"),
        (12, "ability_score_improvement"),
        (14, "cleansing_touch"),
        (16, "ability_score_improvement"),
        (19, "ability_score_improvement"),
    ],
    subclasses: &[
        SubclassDef {
            key: "oath_of_devotion",
            name: "Oath of Devotion",
            features: &[(3, "sacred_weapon"), (7, "aura_of_devotion")],
        },
        SubclassDef {
            key: "oath_of_vengeance",
            name: "Oath of Vengeance",
            features: &[(3, "vow_of_enmity")],
        },
    ],
};

static RANGER: ClassDef = ClassDef {
    class: ClassKind::Ranger,
    hit_die: DieType::D10,
    saving_throws: [Ability::Strength, Ability::Dexterity],
    skill_count: 3,
    skill_options: &[
        Skill::AnimalHandling,
        Skill::Athletics,
        Skill::Insight,
        Skill::Investigation,
        Skill::Nature,
        Skill::Perception,
        Skill::Stealth,
        Skill::Survival,
    ],
    subclass_level: 3,
    features: &[
        (1, "favored_enemy"),
        (1, "natural_explorer"),
        (2, "fighting_style"),
        (2, "spellcasting"),
        (3, "ranger_archetype"),
        (3, "primeval_awareness"),
        (4, "ability_score_improvement"),
        (5, "extra_attack"),
        (8, "ability_score_improvement"),
        (10, "hide_in_plain_sight"),
        (12, "ability_score_improvement"),
        (14, "vanish"),
        (16, "ability_score_improvement"),
        (18, "feral_senses"),
        (19, "ability_score_improvement"),
        (20, "foe_slayer"),
    ],
    subclasses: &[
        SubclassDef {
            key: "hunter",
            name: "Hunter",
            features: &[(3, "hunters_prey")],
        },
        SubclassDef {
            key: "beast_master",
            name: "Beast Master",
            features: &[(3, "rangers_companion")],
        },
    ],
};

static ROGUE: ClassDef = ClassDef {
    class: ClassKind::Rogue,
    hit_die: DieType::D8,
    saving_throws: [Ability::Dexterity, Ability::Intelligence],
    skill_count: 4,
    skill_options: &[
        Skill::Acrobatics,
        Skill::Athletics,
        Skill::Deception,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Investigation,
        Skill::Perception,
        Skill::Performance,
        Skill::Persuasion,
        Skill::SleightOfHand,
        Skill::Stealth,
    ],
    subclass_level: 3,
    features: &[
        (1, "expertise"),
        (1, "sneak_attack"),
        (1, "thieves_cant"),
        (2, "cunning_action"),
        (3, "roguish_archetype"),
        (4, "ability_score_improvement"),
        (5, "uncanny_dodge"),
        (6, "expertise"),
        (7, "evasion"),
        (8, "ability_score_improvement"),
        (10, "ability_score_improvement"),
        (11, "reliable_talent"),
        (12, "ability_score_improvement"),
        (14, "blindsense"),
        (15, "slippery_mind"),
        (16, "ability_score_improvement"),
        (18, "elusive"),
        (19, "ability_score_improvement"),
        (20, "stroke_of_luck"),
    ],
    subclasses: &[
        SubclassDef {
            key: "thief",
            name: "Thief",
            features: &[(3, "fast_hands"), (3, "second_story_work"), (9, "supreme_sneak")],
        },
        SubclassDef {
            key: "assassin",
            name: "Assassin",
            features: &[(3, "assassinate")],
        },
    ],
};

static SORCERER: ClassDef = ClassDef {
    class: ClassKind::Sorcerer,
    hit_die: DieType::D6,
    saving_throws: [Ability::Constitution, Ability::Charisma],
    skill_count: 2,
    skill_options: &[
        Skill::Arcana,
        Skill::Deception,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Persuasion,
        Skill::Religion,
    ],
    subclass_level: 1,
    features: &[
        (1, "spellcasting"),
        (1, "sorcerous_origin"),
        (2, "font_of_magic"),
        (3, "metamagic"),
        (4, "ability_score_improvement"),
        (8, "ability_score_improvement"),
        (10, "metamagic"),
        (12, "ability_score_improvement"),
        (16, "ability_score_improvement"),
        (17, "metamagic"),
        (19, "ability_score_improvement"),
        (20, "sorcerous_restoration"),
    ],
    subclasses: &[
        SubclassDef {
            key: "draconic_bloodline",
            name: "Draconic Bloodline",
            features: &[(1, "draconic_resilience"), (6, "elemental_affinity"), (14, "dragon_wings")],
        },
        SubclassDef {
            key: "wild_magic",
            name: "Wild Magic",
            features: &[(1, "wild_magic_surge"), (6, "bend_luck")],
        },
    ],
};

static WARLOCK: ClassDef = ClassDef {
    class: ClassKind::Warlock,
    hit_die: DieType::D8,
    saving_throws: [Ability::Wisdom, Ability::Charisma],
    skill_count: 2,
    skill_options: &[
        Skill::Arcana,
        Skill::Deception,
        Skill::History,
        Skill::Intimidation,
        Skill::Investigation,
        Skill::Nature,
        Skill::Religion,
    ],
    subclass_level: 1,
    features: &[
        (1, "otherworldly_patron"),
        (1, "pact_magic"),
        (2, "eldritch_invocations"),
        (3, "pact_boon"),
        (4, "ability_score_improvement"),
        (8, "ability_score_improvement"),
        (11, "mystic_arcanum"),
        (12, "ability_score_improvement"),
        (16, "ability_score_improvement"),
        (19, "ability_score_improvement"),
        (20, "eldritch_master"),
    ],
    subclasses: &[
        SubclassDef {
            key: "the_fiend",
            name: "The Fiend",
            features: &[(1, "dark_ones_blessing"), (6, "dark_ones_own_luck")],
        },
        SubclassDef {
            key: "the_archfey",
            name: "The Archfey",
            features: &[(1, "fey_presence")],
        },
    ],
};

static WIZARD: ClassDef = ClassDef {
    class: ClassKind::Wizard,
    hit_die: DieType::D6,
    saving_throws: [Ability::Intelligence, Ability::Wisdom],
    skill_count: 2,
    skill_options: &[
        Skill::Arcana,
        Skill::History,
        Skill::Insight,
        Skill::Investigation,
        Skill::Medicine,
        Skill::Religion,
    ],
    subclass_level: 2,
    features: &[
        (1, "spellcasting"),
        (1, "arcane_recovery"),
        (2, "arcane_tradition"),
        (4, "ability_score_improvement"),
        (8, "ability_score_improvement"),
        (12, "ability_score_improvement"),
        (16, "ability_score_improvement"),
        (18, "spell_mastery"),
        (19, "ability_score_improvement"),
        (20, "signature_spells"),
    ],
    subclasses: &[
        SubclassDef {
            key: "school_of_evocation",
            name: "School of Evocation",
            features: &[(2, "sculpt_spells"), (10, "empowered_evocation"), (14, "overchannel")],
        },
        SubclassDef {
            key: "school_of_abjuration",
            name: "School of Abjuration",
            features: &[(2, "arcane_ward"), (6, "projected_ward")],
        },
    ],
};

/// Look up the definition for a class.
pub fn class_def(class: ClassKind) -> &'static ClassDef {
    match class {
        ClassKind::Barbarian => &BARBARIAN,
        ClassKind::Bard => &BARD,
        ClassKind::Cleric => &CLERIC,
        ClassKind::Druid => &DRUID,
        ClassKind::Fighter => &FIGHTER,
        ClassKind::Monk => &MONK,
        ClassKind::Paladin => &PALADIN,
        ClassKind::Ranger => &RANGER,
        ClassKind::Rogue => &ROGUE,
        ClassKind::Sorcerer => &SORCERER,
        ClassKind::Warlock => &WARLOCK,
        ClassKind::Wizard => &WIZARD,
    }
}

// ============================================================================
// Race Definitions
// ============================================================================

/// Per-race static data. Ability bonuses are a fixed per-ability assignment
/// plus an optional floating list whose entries are assigned to abilities of
/// the player's choice at creation.
pub struct RaceDef {
    pub race: RaceKind,
    pub fixed_bonuses: &'static [(Ability, i8)],
    pub floating_bonuses: &'static [i8],
    pub speed: u32,
    pub features: &'static [&'static str],
    pub skill_grants: &'static [Skill],
}

pub struct SubraceDef {
    pub subrace: Subrace,
    pub fixed_bonuses: &'static [(Ability, i8)],
    pub features: &'static [&'static str],
}

/// Look up the definition for a race.
pub fn race_def(race: RaceKind) -> &'static RaceDef {
    match race {
        RaceKind::Human => &RaceDef {
            race: RaceKind::Human,
            fixed_bonuses: &[
                (Ability::Strength, 1),
                (Ability::Dexterity, 1),
                (Ability::Constitution, 1),
                (Ability::Intelligence, 1),
                (Ability::Wisdom, 1),
                (Ability::Charisma, 1),
            ],
            floating_bonuses: &[],
            speed: 30,
            features: &[],
            skill_grants: &[],
        },
        RaceKind::Elf => &RaceDef {
            race: RaceKind::Elf,
            fixed_bonuses: &[(Ability::Dexterity, 2)],
            floating_bonuses: &[],
            speed: 30,
            features: &["darkvision", "keen_senses", "fey_ancestry"],
            skill_grants: &[Skill::Perception],
        },
        RaceKind::Dwarf => &RaceDef {
            race: RaceKind::Dwarf,
            fixed_bonuses: &[(Ability::Constitution, 2)],
            floating_bonuses: &[],
            speed: 25,
            features: &["darkvision", "dwarven_resilience"],
            skill_grants: &[],
        },
        RaceKind::Halfling => &RaceDef {
            race: RaceKind::Halfling,
            fixed_bonuses: &[(Ability::Dexterity, 2)],
            floating_bonuses: &[],
            speed: 25,
            features: &["lucky", "brave"],
            skill_grants: &[],
        },
        RaceKind::HalfOrc => &RaceDef {
            race: RaceKind::HalfOrc,
            fixed_bonuses: &[(Ability::Strength, 2), (Ability::Constitution, 1)],
            floating_bonuses: &[],
            speed: 30,
            features: &["darkvision", "menacing", "relentless_endurance", "savage_attacks"],
            skill_grants: &[Skill::Intimidation],
        },
        RaceKind::HalfElf => &RaceDef {
            race: RaceKind::HalfElf,
            fixed_bonuses: &[(Ability::Charisma, 2)],
            floating_bonuses: &[1, 1],
            speed: 30,
            features: &["darkvision", "fey_ancestry"],
            skill_grants: &[],
        },
        RaceKind::Tiefling => &RaceDef {
            race: RaceKind::Tiefling,
            fixed_bonuses: &[(Ability::Charisma, 2), (Ability::Intelligence, 1)],
            floating_bonuses: &[],
            speed: 30,
            features: &["darkvision", "hellish_resistance", "infernal_legacy"],
            skill_grants: &[],
        },
        RaceKind::Gnome => &RaceDef {
            race: RaceKind::Gnome,
            fixed_bonuses: &[(Ability::Intelligence, 2)],
            floating_bonuses: &[],
            speed: 25,
            features: &["darkvision", "gnome_cunning"],
            skill_grants: &[],
        },
        RaceKind::Dragonborn => &RaceDef {
            race: RaceKind::Dragonborn,
            fixed_bonuses: &[(Ability::Strength, 2), (Ability::Charisma, 1)],
            floating_bonuses: &[],
            speed: 30,
            features: &["breath_weapon", "draconic_damage_resistance"],
            skill_grants: &[],
        },
    }
}

/// Look up the definition for a subrace.
pub fn subrace_def(subrace: Subrace) -> &'static SubraceDef {
    match subrace {
        Subrace::HillDwarf => &SubraceDef {
            subrace: Subrace::HillDwarf,
            fixed_bonuses: &[(Ability::Wisdom, 1)],
            features: &["dwarven_toughness"],
        },
        Subrace::MountainDwarf => &SubraceDef {
            subrace: Subrace::MountainDwarf,
            fixed_bonuses: &[(Ability::Strength, 2)],
            features: &["dwarven_armor_training"],
        },
        Subrace::HighElf => &SubraceDef {
            subrace: Subrace::HighElf,
            fixed_bonuses: &[(Ability::Intelligence, 1)],
            features: &[],
        },
        Subrace::WoodElf => &SubraceDef {
            subrace: Subrace::WoodElf,
            fixed_bonuses: &[(Ability::Wisdom, 1)],
            features: &["fleet_of_foot"],
        },
    }
}

// ============================================================================
// Background Definitions
// ============================================================================

pub struct BackgroundDef {
    pub background: BackgroundKind,
    pub skill_grants: [Skill; 2],
}

/// Look up the definition for a background.
pub fn background_def(background: BackgroundKind) -> BackgroundDef {
    let skill_grants = match background {
        BackgroundKind::Acolyte => [Skill::Insight, Skill::Religion],
        BackgroundKind::Criminal => [Skill::Deception, Skill::Stealth],
        BackgroundKind::Entertainer => [Skill::Acrobatics, Skill::Performance],
        BackgroundKind::FolkHero => [Skill::AnimalHandling, Skill::Survival],
        BackgroundKind::Noble => [Skill::History, Skill::Persuasion],
        BackgroundKind::Outlander => [Skill::Athletics, Skill::Survival],
        BackgroundKind::Sage => [Skill::Arcana, Skill::History],
        BackgroundKind::Sailor => [Skill::Athletics, Skill::Perception],
        BackgroundKind::Soldier => [Skill::Athletics, Skill::Intimidation],
        BackgroundKind::Urchin => [Skill::SleightOfHand, Skill::Stealth],
    };
    BackgroundDef {
        background,
        skill_grants,
    }
}

// ============================================================================
// Progression Tables
// ============================================================================

/// XP required to reach each level; index 0 is level 1.
static XP_THRESHOLDS: [u32; 20] = [
    0, 300, 900, 2_700, 6_500, 14_000, 23_000, 34_000, 48_000, 64_000, 85_000, 100_000, 120_000,
    140_000, 165_000, 195_000, 225_000, 265_000, 305_000, 355_000,
];

/// XP required to reach `level`. `None` outside [1, 20].
pub fn xp_threshold(level: u8) -> Option<u32> {
    if (1..=20).contains(&level) {
        Some(XP_THRESHOLDS[level as usize - 1])
    } else {
        None
    }
}

/// Full-caster spell slots by class level; one row per level, columns are
/// slot levels 1-9.
static FULL_CASTER_SLOTS: [[u8; 9]; 20] = [
    [2, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 2, 1, 1],
];

/// Half-caster (Paladin/Ranger) spell slots by class level.
static HALF_CASTER_SLOTS: [[u8; 9]; 20] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [2, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
];

/// Spell slots for a class at a level. Warlock pact slots are a resource
/// pool, not a slot table, so the warlock row is all zeros here.
pub fn spell_slots(class: ClassKind, level: u8) -> [u8; 9] {
    let idx = (level.clamp(1, 20) - 1) as usize;
    match class {
        ClassKind::Bard
        | ClassKind::Cleric
        | ClassKind::Druid
        | ClassKind::Sorcerer
        | ClassKind::Wizard => FULL_CASTER_SLOTS[idx],
        ClassKind::Paladin | ClassKind::Ranger => HALF_CASTER_SLOTS[idx],
        _ => [0; 9],
    }
}

/// Highest castable spell level for a class at a level.
pub fn max_spell_level(class: ClassKind, level: u8) -> u8 {
    if class == ClassKind::Warlock {
        return pact_slot_level(level);
    }
    let slots = spell_slots(class, level);
    slots
        .iter()
        .rposition(|&count| count > 0)
        .map(|idx| idx as u8 + 1)
        .unwrap_or(0)
}

/// Warlock pact slot count by level tier.
pub fn pact_slot_count(level: u8) -> u8 {
    match level {
        0 => 0,
        1 => 1,
        2..=10 => 2,
        11..=16 => 3,
        _ => 4,
    }
}

/// Warlock pact slot level by level tier.
pub fn pact_slot_level(level: u8) -> u8 {
    match level {
        0 => 0,
        1..=2 => 1,
        3..=4 => 2,
        5..=6 => 3,
        7..=8 => 4,
        _ => 5,
    }
}

/// Cantrips known for a class at a level. Zero for classes without cantrips.
pub fn cantrips_known(class: ClassKind, level: u8) -> u8 {
    let tier = |base: u8| match level {
        0 => 0,
        1..=3 => base,
        4..=9 => base + 1,
        _ => base + 2,
    };
    match class {
        ClassKind::Bard => tier(2),
        ClassKind::Cleric => tier(3),
        ClassKind::Druid => tier(2),
        ClassKind::Sorcerer => tier(4),
        ClassKind::Warlock => tier(2),
        ClassKind::Wizard => tier(3),
        _ => 0,
    }
}

static BARD_SPELLS_KNOWN: [u8; 20] =
    [4, 5, 6, 7, 8, 9, 10, 11, 12, 14, 15, 15, 16, 18, 19, 19, 20, 22, 22, 22];
static SORCERER_SPELLS_KNOWN: [u8; 20] =
    [2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 12, 13, 13, 14, 14, 15, 15, 15, 15];
static WARLOCK_SPELLS_KNOWN: [u8; 20] =
    [2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 11, 11, 12, 12, 13, 13, 14, 14, 15, 15];
static RANGER_SPELLS_KNOWN: [u8; 20] =
    [0, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11];

/// Spells known for the known-spells classes. `None` for classes on the
/// prepared or spellbook models.
pub fn spells_known(class: ClassKind, level: u8) -> Option<u8> {
    let idx = (level.clamp(1, 20) - 1) as usize;
    match class {
        ClassKind::Bard => Some(BARD_SPELLS_KNOWN[idx]),
        ClassKind::Sorcerer => Some(SORCERER_SPELLS_KNOWN[idx]),
        ClassKind::Warlock => Some(WARLOCK_SPELLS_KNOWN[idx]),
        ClassKind::Ranger => Some(RANGER_SPELLS_KNOWN[idx]),
        _ => None,
    }
}

/// Weapon-mastery selections for a class at a level.
pub fn mastery_count(class: ClassKind, level: u8) -> u8 {
    match class {
        ClassKind::Fighter => match level {
            0 => 0,
            1..=3 => 3,
            4..=9 => 4,
            10..=15 => 5,
            _ => 6,
        },
        ClassKind::Barbarian => match level {
            0 => 0,
            1..=3 => 2,
            4..=9 => 3,
            _ => 4,
        },
        ClassKind::Paladin | ClassKind::Ranger => match level {
            0 => 0,
            1..=3 => 2,
            _ => 3,
        },
        ClassKind::Monk | ClassKind::Rogue => match level {
            0 => 0,
            _ => 2,
        },
        _ => 0,
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Check that every feature key the dataset references resolves against the
/// registry. Run once at load; a failure is a dataset defect.
pub fn validate() -> Result<(), DatasetError> {
    let check = |key: &str| -> Result<(), DatasetError> {
        FeatureKey::resolve(key).map(|_| ())
    };

    for class in ClassKind::all() {
        let def = class_def(*class);
        for (_, key) in def.features {
            check(key)?;
        }
        for subclass in def.subclasses {
            for (_, key) in subclass.features {
                check(key)?;
            }
        }
    }
    for race in RaceKind::all() {
        for key in race_def(*race).features {
            check(key)?;
        }
    }
    for subrace in [
        Subrace::HillDwarf,
        Subrace::MountainDwarf,
        Subrace::HighElf,
        Subrace::WoodElf,
    ] {
        for key in subrace_def(subrace).features {
            check(key)?;
        }
    }
    Ok(())
}
