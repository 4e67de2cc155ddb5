//! Character finalization.
//!
//! Step-by-step builder producing the initial [`CharacterSnapshot`]:
//! ability-score methods (standard array, point buy, rolled), class skill
//! choices, racial floating bonuses, creation-time subclass picks, and
//! starting spell lists. The snapshot is created exactly once here; every
//! later change is a transform on the snapshot itself.

use crate::calc;
use crate::character::{
    Ability, AbilityScores, BackgroundKind, CharacterId, CharacterSnapshot, ClassKind, Equipment,
    RaceKind, Skill, Subrace,
};
use crate::classes::{ClassStrategy, SpellQuantityModel};
use crate::dataset::{self, FeatureKey};
use crate::resources;
use crate::spells::{self, DamageType};
use rand::Rng;
use std::collections::BTreeMap;
use thiserror::Error;

/// Method for determining ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbilityMethod {
    /// Assign 15, 14, 13, 12, 10, 8.
    #[default]
    StandardArray,
    /// Spend 27 points on scores in the 8-15 range.
    PointBuy,
    /// Roll 4d6 drop lowest, six times.
    Rolled,
}

/// Standard array values.
pub const STANDARD_ARRAY: [u8; 6] = [15, 14, 13, 12, 10, 8];

/// Total points available for point buy.
pub const POINT_BUY_TOTAL: u8 = 27;

/// Point-buy cost of a score. `None` outside the 8-15 range.
pub fn point_buy_cost(score: u8) -> Option<u8> {
    match score {
        8 => Some(0),
        9 => Some(1),
        10 => Some(2),
        11 => Some(3),
        12 => Some(4),
        13 => Some(5),
        14 => Some(7),
        15 => Some(9),
        _ => None,
    }
}

/// Roll one ability score: 4d6, drop the lowest.
pub fn roll_ability_score<R: Rng>(rng: &mut R) -> u8 {
    let mut dice: Vec<u8> = (0..4).map(|_| rng.gen_range(1..=6)).collect();
    dice.sort_unstable();
    dice[1..].iter().sum()
}

/// Roll a full set of six scores.
pub fn roll_ability_scores<R: Rng>(rng: &mut R) -> [u8; 6] {
    std::array::from_fn(|_| roll_ability_score(rng))
}

/// Error from character finalization.
#[derive(Debug, Clone, Error)]
pub enum BuilderError {
    #[error("Character name is required")]
    MissingName,
    #[error("Race selection is required")]
    MissingRace,
    #[error("Class selection is required")]
    MissingClass,
    #[error("Background selection is required")]
    MissingBackground,
    #[error("Ability scores are required")]
    MissingAbilityScores,
    #[error("Ability scores must be between 3 and 20 (got {0})")]
    ScoreOutOfRange(u8),
    #[error("Point buy allows {POINT_BUY_TOTAL} points (spent {0})")]
    PointBuyOverspent(u8),
    #[error("Score {0} is not valid for point buy")]
    PointBuyScoreInvalid(u8),
    #[error("{0} is not a subrace of {1}")]
    SubraceMismatch(Subrace, RaceKind),
    #[error("Expected {expected} skill choices, got {got}")]
    InvalidSkillCount { expected: usize, got: usize },
    #[error("Skill {0} is not available for this class")]
    SkillNotAvailable(Skill),
    #[error("Duplicate skill choice: {0}")]
    DuplicateSkill(Skill),
    #[error("This race grants {expected} floating ability bonuses, got {got}")]
    InvalidFloatingBonusCount { expected: usize, got: usize },
    #[error("Floating bonuses must go to distinct abilities")]
    DuplicateFloatingBonus,
    #[error("{0} chooses a subclass at creation")]
    SubclassRequired(ClassKind),
    #[error("{0} does not choose a subclass at creation")]
    SubclassNotYetAvailable(ClassKind),
    #[error("Unknown subclass: {0}")]
    UnknownSubclass(String),
    #[error("Draconic Bloodline requires a draconic ancestry damage type")]
    AncestryRequired,
    #[error("Expected {expected} starting cantrips, got {got}")]
    InvalidCantripCount { expected: usize, got: usize },
    #[error("Expected {expected} starting spells, got {got}")]
    InvalidSpellCount { expected: usize, got: usize },
    #[error("{0} is not eligible for this class")]
    IneligibleSpell(String),
}

/// Builder for the initial snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    name: Option<String>,
    race: Option<RaceKind>,
    subrace: Option<Subrace>,
    class: Option<ClassKind>,
    background: Option<BackgroundKind>,
    abilities: Option<AbilityScores>,
    ability_method: AbilityMethod,
    floating_bonus_choices: Vec<Ability>,
    skills: Vec<Skill>,
    subclass: Option<String>,
    draconic_ancestry: Option<DamageType>,
    cantrips: Vec<String>,
    spells: Vec<String>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn race(mut self, race: RaceKind) -> Self {
        self.race = Some(race);
        self
    }

    pub fn subrace(mut self, subrace: Subrace) -> Self {
        self.subrace = Some(subrace);
        self
    }

    pub fn class(mut self, class: ClassKind) -> Self {
        self.class = Some(class);
        self
    }

    pub fn background(mut self, background: BackgroundKind) -> Self {
        self.background = Some(background);
        self
    }

    /// Scores assigned from the standard array.
    pub fn standard_array(mut self, scores: AbilityScores) -> Self {
        self.abilities = Some(scores);
        self.ability_method = AbilityMethod::StandardArray;
        self
    }

    /// Scores purchased with point buy; validated on build.
    pub fn point_buy(mut self, scores: AbilityScores) -> Self {
        self.abilities = Some(scores);
        self.ability_method = AbilityMethod::PointBuy;
        self
    }

    /// Rolled scores.
    pub fn rolled(mut self, scores: AbilityScores) -> Self {
        self.abilities = Some(scores);
        self.ability_method = AbilityMethod::Rolled;
        self
    }

    /// Ability assignments for the race's floating bonuses.
    pub fn floating_bonuses(mut self, abilities: Vec<Ability>) -> Self {
        self.floating_bonus_choices = abilities;
        self
    }

    pub fn skills(mut self, skills: Vec<Skill>) -> Self {
        self.skills = skills;
        self
    }

    /// Creation-time subclass, for the classes that pick at level 1.
    pub fn subclass(mut self, key: impl Into<String>) -> Self {
        self.subclass = Some(key.into());
        self
    }

    pub fn draconic_ancestry(mut self, damage_type: DamageType) -> Self {
        self.draconic_ancestry = Some(damage_type);
        self
    }

    pub fn cantrips(mut self, cantrips: Vec<String>) -> Self {
        self.cantrips = cantrips;
        self
    }

    pub fn spells(mut self, spells: Vec<String>) -> Self {
        self.spells = spells;
        self
    }

    /// Finalize the character.
    pub fn build(self) -> Result<CharacterSnapshot, BuilderError> {
        let SnapshotBuilder {
            name,
            race,
            subrace,
            class,
            background,
            abilities,
            ability_method,
            floating_bonus_choices,
            skills,
            subclass,
            draconic_ancestry,
            cantrips: chosen_cantrips,
            spells: chosen_spells,
        } = self;

        let name = name.ok_or(BuilderError::MissingName)?;
        let race = race.ok_or(BuilderError::MissingRace)?;
        let class = class.ok_or(BuilderError::MissingClass)?;
        let background = background.ok_or(BuilderError::MissingBackground)?;
        let abilities = abilities.ok_or(BuilderError::MissingAbilityScores)?;

        for ability in Ability::all() {
            let score = abilities.get(ability);
            if !(3..=20).contains(&score) {
                return Err(BuilderError::ScoreOutOfRange(score));
            }
        }
        if ability_method == AbilityMethod::PointBuy {
            validate_point_buy(&abilities)?;
        }

        if let Some(subrace) = subrace {
            if subrace.race() != race {
                return Err(BuilderError::SubraceMismatch(subrace, race));
            }
        }

        let race_def = dataset::race_def(race);
        if floating_bonus_choices.len() != race_def.floating_bonuses.len() {
            return Err(BuilderError::InvalidFloatingBonusCount {
                expected: race_def.floating_bonuses.len(),
                got: floating_bonus_choices.len(),
            });
        }
        for (idx, ability) in floating_bonus_choices.iter().enumerate() {
            if floating_bonus_choices[..idx].contains(ability) {
                return Err(BuilderError::DuplicateFloatingBonus);
            }
        }

        let class_def = dataset::class_def(class);
        if skills.len() != class_def.skill_count {
            return Err(BuilderError::InvalidSkillCount {
                expected: class_def.skill_count,
                got: skills.len(),
            });
        }
        for (idx, skill) in skills.iter().enumerate() {
            if !class_def.skill_options.contains(skill) {
                return Err(BuilderError::SkillNotAvailable(*skill));
            }
            if skills[..idx].contains(skill) {
                return Err(BuilderError::DuplicateSkill(*skill));
            }
        }

        // Subclass at creation for the classes that choose at level 1.
        let subclass = match (&subclass, class_def.subclass_level) {
            (Some(key), 1) => {
                let def = class_def
                    .subclass(key)
                    .ok_or_else(|| BuilderError::UnknownSubclass(key.clone()))?;
                Some(def)
            }
            (None, 1) => return Err(BuilderError::SubclassRequired(class)),
            (Some(_), _) => return Err(BuilderError::SubclassNotYetAvailable(class)),
            (None, _) => None,
        };
        let draconic = subclass.map(|s| s.key) == Some("draconic_bloodline");
        if draconic && draconic_ancestry.is_none() {
            return Err(BuilderError::AncestryRequired);
        }

        let mut features: Vec<FeatureKey> = Vec::new();
        for key in class_def.features_at(1) {
            features.push(FeatureKey::known(key));
        }
        if let Some(sub) = subclass {
            for key in sub.features_at(1) {
                features.push(FeatureKey::known(key));
            }
        }
        for key in race_def.features {
            features.push(FeatureKey::known(key));
        }
        if let Some(subrace) = subrace {
            for key in dataset::subrace_def(subrace).features {
                features.push(FeatureKey::known(key));
            }
        }

        let mut snapshot = CharacterSnapshot {
            id: CharacterId::new(),
            name,
            abilities,
            race,
            subrace,
            floating_bonus_choices,
            class,
            subclass: subclass.map(|s| s.key.to_string()),
            background,
            level: 1,
            experience: 0,
            max_hp: 0,
            class_skill_choices: skills,
            expertise: Vec::new(),
            features,
            feats: Vec::new(),
            weapon_masteries: Vec::new(),
            draconic_ancestry: if draconic { draconic_ancestry } else { None },
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

        place_spells(&mut snapshot, &chosen_cantrips, &chosen_spells)?;

        snapshot.max_hp = calc::level_one_hit_points(&snapshot);
        snapshot.pools = resources::recompute_pools(&snapshot);
        tracing::info!(character = %snapshot.name, class = %snapshot.class, "character finalized");
        Ok(snapshot)
    }
}

/// Validate the starting spell choices against the class's level-1 counts
/// and eligibility pools, then place them on the right lists.
fn place_spells(
    snapshot: &mut CharacterSnapshot,
    chosen_cantrips: &[String],
    chosen_spells: &[String],
) -> Result<(), BuilderError> {
    let class = snapshot.class;
    let strategy = ClassStrategy::new(snapshot);
    if !strategy.is_spellcaster() {
        return Ok(());
    }

    let expected_cantrips = dataset::cantrips_known(class, 1) as usize;
    if chosen_cantrips.len() != expected_cantrips {
        return Err(BuilderError::InvalidCantripCount {
            expected: expected_cantrips,
            got: chosen_cantrips.len(),
        });
    }
    for name in chosen_cantrips {
        if !spells::cantrips_for(class).any(|s| s.name.eq_ignore_ascii_case(name)) {
            return Err(BuilderError::IneligibleSpell(name.clone()));
        }
    }

    let model = strategy.spell_quantity_model();
    let expected_spells = match model {
        Some(SpellQuantityModel::KnownSpells) => {
            dataset::spells_known(class, 1).unwrap_or(0) as usize
        }
        // Six spells seed the spellbook.
        Some(SpellQuantityModel::Spellbook) => 6,
        // Prepared casters pick from the full list each day.
        Some(SpellQuantityModel::PreparedSpells) | None => 0,
    };
    if chosen_spells.len() != expected_spells {
        return Err(BuilderError::InvalidSpellCount {
            expected: expected_spells,
            got: chosen_spells.len(),
        });
    }
    for name in chosen_spells {
        if !spells::leveled_spells_for(class, 1).any(|s| s.name.eq_ignore_ascii_case(name)) {
            return Err(BuilderError::IneligibleSpell(name.clone()));
        }
    }

    snapshot.cantrips = chosen_cantrips.to_vec();
    match model {
        Some(SpellQuantityModel::Spellbook) => snapshot.spellbook = chosen_spells.to_vec(),
        _ => snapshot.known_spells = chosen_spells.to_vec(),
    }
    Ok(())
}

/// Check a point-buy assignment: every score in 8-15 and the total cost
/// within the budget.
pub fn validate_point_buy(scores: &AbilityScores) -> Result<(), BuilderError> {
    let mut spent: u8 = 0;
    for ability in Ability::all() {
        let score = scores.get(ability);
        let cost = point_buy_cost(score).ok_or(BuilderError::PointBuyScoreInvalid(score))?;
        spent += cost;
    }
    if spent > POINT_BUY_TOTAL {
        return Err(BuilderError::PointBuyOverspent(spent));
    }
    Ok(())
}
