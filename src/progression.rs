//! Level-up progression.
//!
//! XP-threshold detection attaches a [`PendingLevelUp`] descriptor to the
//! snapshot; a [`LevelUpWizard`] walks the decision steps, validates each
//! selection, and commits an atomic snapshot transform. Validation failures
//! block advancement without mutating anything and carry a user-facing
//! message; they are always recoverable.

use crate::calc;
use crate::character::{Ability, CharacterSnapshot, PendingLevelUp};
use crate::classes::{ClassStrategy, SpellQuantityModel};
use crate::dataset::{self, FeatureKey, FeatureMechanic};
use crate::dice::{DiceExpression, RollResult};
use crate::items;
use crate::spells;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A level-up step selection that violates a rule. Blocks advancement,
/// mutates nothing.
#[derive(Debug, Clone, Error)]
pub enum ChoiceError {
    #[error("No level-up is pending")]
    NoPendingLevelUp,
    #[error("The pending level-up changed since this wizard was created")]
    StalePending,
    #[error("Roll hit points before continuing")]
    HpNotRolled,
    #[error("The hit-die roll is frozen once you advance past it")]
    HpRollFrozen,
    #[error("Nothing further to advance; commit from the summary")]
    AtSummary,
    #[error("Finish the remaining steps before committing")]
    StepsRemaining,
    #[error("This level-up has already been applied")]
    AlreadyApplied,
    #[error("Choose an ability improvement or a feat before continuing")]
    AbilityOrFeatRequired,
    #[error("Allocate exactly 2 improvement points (got {0})")]
    WrongPointTotal(u8),
    #[error("At most 2 points may go into one ability")]
    TooManyPointsOnOneAbility,
    #[error("{0} cannot be raised above 20")]
    AbilityCapExceeded(Ability),
    #[error("Unknown feat: {0}")]
    UnknownFeat(String),
    #[error("The feat {0} is already taken")]
    FeatAlreadyOwned(String),
    #[error("{0} needs two cantrips and one level-1 spell chosen before it validates")]
    FeatChoicesUnresolved(String),
    #[error("Choose a subclass before continuing")]
    SubclassRequired,
    #[error("Unknown subclass: {0}")]
    UnknownSubclass(String),
    #[error("A subclass is permanent once chosen")]
    SubclassAlreadyChosen,
    #[error("Choose exactly {expected} new cantrips (got {got})")]
    WrongCantripCount { expected: u8, got: u8 },
    #[error("Choose exactly {expected} new spells (got {got})")]
    WrongSpellCount { expected: u8, got: u8 },
    #[error("{0} is not eligible for this class at this level")]
    IneligibleSpell(String),
    #[error("{0} is already known")]
    DuplicateSpell(String),
    #[error("This class does not swap spells on level-up")]
    SwapNotAllowed,
    #[error("Cannot swap out {0}: it is not a known spell")]
    UnknownSwapSpell(String),
    #[error("This class does not prepare spells")]
    NotAPreparedCaster,
    #[error("At most {capacity} spells can be prepared (got {got})")]
    TooManyPreparedSpells { capacity: u8, got: u8 },
    #[error("{0} is not in the spellbook")]
    NotInSpellbook(String),
    #[error("Choose exactly {expected} weapon masteries (got {got})")]
    WrongMasteryCount { expected: u8, got: u8 },
    #[error("Unknown weapon: {0}")]
    UnknownWeapon(String),
    #[error("{0} is already mastered")]
    DuplicateMastery(String),
}

// ============================================================================
// Threshold detection
// ============================================================================

/// Grant experience and attach a pending level-up when a threshold is
/// crossed. Experience only ever increases.
pub fn grant_experience(snapshot: &CharacterSnapshot, amount: u32) -> CharacterSnapshot {
    let mut next = snapshot.clone();
    next.experience = next.experience.saturating_add(amount);
    if next.pending_level_up.is_none() {
        next.pending_level_up = detect_pending(&next);
    }
    next
}

/// Compute the pending level-up descriptor when the XP threshold for the
/// next level has been met. One level at a time, however large the grant.
pub fn detect_pending(snapshot: &CharacterSnapshot) -> Option<PendingLevelUp> {
    if snapshot.level >= 20 {
        return None;
    }
    let target = snapshot.level + 1;
    let threshold = dataset::xp_threshold(target)?;
    if snapshot.experience < threshold {
        return None;
    }
    tracing::debug!(character = %snapshot.name, target, "level-up threshold crossed");
    Some(compute_pending(snapshot, target))
}

fn compute_pending(snapshot: &CharacterSnapshot, target: u8) -> PendingLevelUp {
    let def = dataset::class_def(snapshot.class);
    let con_mod = calc::modifier(snapshot, Ability::Constitution);
    let hit_die_formula = DiceExpression::single(1, def.hit_die, con_mod).original;

    let landing: Vec<&FeatureMechanic> = features_landing_at(snapshot, target)
        .filter_map(dataset::feature_by_str)
        .map(|f| &f.mechanic)
        .collect();

    let asi = landing
        .iter()
        .any(|m| **m == FeatureMechanic::AbilityScoreImprovement);
    let subclass = snapshot.subclass.is_none()
        && landing.iter().any(|m| **m == FeatureMechanic::SubclassChoice);

    let (new_cantrips, new_spells, allows_swap) = spell_deltas(snapshot, target);

    let mastery_picks =
        dataset::mastery_count(snapshot.class, target) - dataset::mastery_count(snapshot.class, target - 1);

    PendingLevelUp {
        target_level: target,
        hit_die_formula,
        asi,
        subclass,
        new_cantrips,
        new_spells,
        allows_swap,
        mastery_picks,
    }
}

/// Class and chosen-subclass feature keys landing exactly on `level`.
fn features_landing_at<'a>(
    snapshot: &'a CharacterSnapshot,
    level: u8,
) -> impl Iterator<Item = &'static str> + 'a {
    let def = dataset::class_def(snapshot.class);
    let subclass_features = snapshot
        .subclass
        .as_deref()
        .and_then(|key| def.subclass(key))
        .map(|sub| sub.features_at(level))
        .into_iter()
        .flatten();
    def.features_at(level).chain(subclass_features)
}

/// Newly learnable cantrip and leveled-spell counts at the target level,
/// and whether a one-for-one swap is permitted.
fn spell_deltas(snapshot: &CharacterSnapshot, target: u8) -> (u8, u8, bool) {
    let class = snapshot.class;
    let cantrip_delta =
        dataset::cantrips_known(class, target).saturating_sub(dataset::cantrips_known(class, target - 1));

    let strategy = ClassStrategy::new(snapshot);
    let (spell_delta, allows_swap) = match strategy.spell_quantity_model() {
        Some(SpellQuantityModel::KnownSpells) => {
            let now = dataset::spells_known(class, target).unwrap_or(0);
            let before = dataset::spells_known(class, target - 1).unwrap_or(0);
            (now.saturating_sub(before), now > 0)
        }
        // The spellbook grows by two spells per level.
        Some(SpellQuantityModel::Spellbook) => (2, false),
        // Prepared casters re-prepare from the full list; nothing is
        // learned at level-up.
        Some(SpellQuantityModel::PreparedSpells) | None => (0, false),
    };

    (cantrip_delta, spell_delta, allows_swap)
}

/// Replace the prepared-spell list for a prepared or spellbook caster.
/// Count is bounded by the class's prepared capacity; a spellbook caster
/// prepares only from the book, a prepared caster from the full class list.
pub fn prepare_spells(
    snapshot: &CharacterSnapshot,
    names: Vec<String>,
) -> Result<CharacterSnapshot, ChoiceError> {
    let strategy = ClassStrategy::new(snapshot);
    let model = strategy.spell_quantity_model();
    if !matches!(
        model,
        Some(SpellQuantityModel::PreparedSpells) | Some(SpellQuantityModel::Spellbook)
    ) {
        return Err(ChoiceError::NotAPreparedCaster);
    }

    let capacity = strategy.spell_capacity().unwrap_or(0);
    if names.len() as u8 > capacity {
        return Err(ChoiceError::TooManyPreparedSpells {
            capacity,
            got: names.len() as u8,
        });
    }

    let max_level = dataset::max_spell_level(snapshot.class, snapshot.level);
    for name in &names {
        let eligible = spells::leveled_spells_for(snapshot.class, max_level)
            .any(|s| s.name.eq_ignore_ascii_case(name));
        if !eligible {
            return Err(ChoiceError::IneligibleSpell(name.clone()));
        }
        if model == Some(SpellQuantityModel::Spellbook) && !contains_spell(&snapshot.spellbook, name)
        {
            return Err(ChoiceError::NotInSpellbook(name.clone()));
        }
    }

    let mut next = snapshot.clone();
    next.prepared_spells = names;
    Ok(next)
}

// ============================================================================
// Wizard state machine
// ============================================================================

/// The ordered decision steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelUpStep {
    RollHp,
    AbilityOrFeat,
    Subclass,
    Spells,
    WeaponMastery,
    Summary,
    Applied,
}

/// The frozen hit-die roll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolledHp {
    pub roll: RollResult,
    /// Flat per-level HP features added at roll time.
    pub flat_bonus: i32,
    /// Total HP gained on commit; never below 1.
    pub total: i32,
}

/// The ability-or-feat decision: exactly one of the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityOrFeat {
    /// Improvement point allocations, two points total.
    Improvement(Vec<(Ability, u8)>),
    Feat {
        key: String,
        /// Resolved sub-choices for feats that require them.
        sub_choices: Vec<String>,
    },
}

/// One-for-one replacement of a previously known spell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellSwap {
    pub drop: String,
    pub add: String,
}

/// The spells-step selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellChoice {
    pub new_cantrips: Vec<String>,
    pub new_spells: Vec<String>,
    pub swap: Option<SpellSwap>,
}

/// Walks one pending level-up from RollHp to the committed snapshot.
///
/// Dropping the wizard abandons the flow: the snapshot's descriptor is
/// untouched and the flow can be restarted later. Only `commit` persists.
#[derive(Debug, Clone)]
pub struct LevelUpWizard {
    pending: PendingLevelUp,
    steps: Vec<LevelUpStep>,
    step_index: usize,
    applied: bool,

    rolled_hp: Option<RolledHp>,
    hp_frozen: bool,
    ability_or_feat: Option<AbilityOrFeat>,
    subclass_choice: Option<String>,
    spell_choice: Option<SpellChoice>,
    mastery_choice: Vec<String>,
}

impl LevelUpWizard {
    /// Start the wizard for the snapshot's pending level-up. The transition
    /// table is computed once from the descriptor.
    pub fn new(snapshot: &CharacterSnapshot) -> Result<Self, ChoiceError> {
        let pending = snapshot
            .pending_level_up
            .clone()
            .ok_or(ChoiceError::NoPendingLevelUp)?;

        let mut steps = vec![LevelUpStep::RollHp];
        if pending.asi {
            steps.push(LevelUpStep::AbilityOrFeat);
        }
        if pending.subclass {
            steps.push(LevelUpStep::Subclass);
        }
        if pending.new_cantrips + pending.new_spells > 0 {
            steps.push(LevelUpStep::Spells);
        }
        if pending.mastery_picks > 0 {
            steps.push(LevelUpStep::WeaponMastery);
        }
        steps.push(LevelUpStep::Summary);

        Ok(Self {
            pending,
            steps,
            step_index: 0,
            applied: false,
            rolled_hp: None,
            hp_frozen: false,
            ability_or_feat: None,
            subclass_choice: None,
            spell_choice: None,
            mastery_choice: Vec::new(),
        })
    }

    pub fn pending(&self) -> &PendingLevelUp {
        &self.pending
    }

    /// The computed step sequence (always ends in Summary).
    pub fn steps(&self) -> &[LevelUpStep] {
        &self.steps
    }

    pub fn current_step(&self) -> LevelUpStep {
        if self.applied {
            LevelUpStep::Applied
        } else {
            self.steps[self.step_index]
        }
    }

    pub fn rolled_hp(&self) -> Option<&RolledHp> {
        self.rolled_hp.as_ref()
    }

    /// Roll (or re-roll) the hit-die formula. Permitted any number of times
    /// until the flow advances past RollHp; frozen afterwards.
    pub fn roll_hp<R: Rng>(
        &mut self,
        snapshot: &CharacterSnapshot,
        rng: &mut R,
    ) -> Result<RolledHp, ChoiceError> {
        if self.hp_frozen {
            return Err(ChoiceError::HpRollFrozen);
        }
        let expr = DiceExpression::parse(&self.pending.hit_die_formula)
            .unwrap_or_else(|_| DiceExpression::single(1, dataset::class_def(snapshot.class).hit_die, 0));
        let roll = expr.roll_with_rng(rng);
        let flat_bonus = calc::hp_bonus_per_level(snapshot);
        let total = (roll.total + flat_bonus).max(1);
        let rolled = RolledHp {
            roll,
            flat_bonus,
            total,
        };
        self.rolled_hp = Some(rolled.clone());
        Ok(rolled)
    }

    pub fn choose_ability_improvement(&mut self, allocations: Vec<(Ability, u8)>) {
        self.ability_or_feat = Some(AbilityOrFeat::Improvement(allocations));
    }

    pub fn choose_feat(&mut self, key: impl Into<String>, sub_choices: Vec<String>) {
        self.ability_or_feat = Some(AbilityOrFeat::Feat {
            key: key.into(),
            sub_choices,
        });
    }

    pub fn choose_subclass(&mut self, key: impl Into<String>) {
        self.subclass_choice = Some(key.into());
    }

    pub fn choose_spells(&mut self, choice: SpellChoice) {
        self.spell_choice = Some(choice);
    }

    pub fn choose_masteries(&mut self, weapons: Vec<String>) {
        self.mastery_choice = weapons;
    }

    /// Validate the current step's selection and move to the next step.
    /// On error nothing changes and the step is re-presented.
    pub fn advance(&mut self, snapshot: &CharacterSnapshot) -> Result<LevelUpStep, ChoiceError> {
        if self.applied {
            return Err(ChoiceError::AlreadyApplied);
        }
        match self.current_step() {
            LevelUpStep::RollHp => {
                if self.rolled_hp.is_none() {
                    return Err(ChoiceError::HpNotRolled);
                }
                self.hp_frozen = true;
            }
            LevelUpStep::AbilityOrFeat => self.validate_ability_or_feat(snapshot)?,
            LevelUpStep::Subclass => self.validate_subclass(snapshot)?,
            LevelUpStep::Spells => self.validate_spells(snapshot)?,
            LevelUpStep::WeaponMastery => self.validate_masteries(snapshot)?,
            LevelUpStep::Summary => return Err(ChoiceError::AtSummary),
            LevelUpStep::Applied => return Err(ChoiceError::AlreadyApplied),
        }
        self.step_index += 1;
        Ok(self.current_step())
    }

    fn validate_ability_or_feat(&self, snapshot: &CharacterSnapshot) -> Result<(), ChoiceError> {
        match self
            .ability_or_feat
            .as_ref()
            .ok_or(ChoiceError::AbilityOrFeatRequired)?
        {
            AbilityOrFeat::Improvement(allocations) => {
                let total: u8 = allocations.iter().map(|(_, points)| points).sum();
                if total != 2 {
                    return Err(ChoiceError::WrongPointTotal(total));
                }
                for ability in Ability::all() {
                    let on_ability: u8 = allocations
                        .iter()
                        .filter(|(a, _)| *a == ability)
                        .map(|(_, points)| points)
                        .sum();
                    if on_ability > 2 {
                        return Err(ChoiceError::TooManyPointsOnOneAbility);
                    }
                    // The cap applies to the effective score; racial bonuses
                    // granted at creation count toward it.
                    let effective = calc::effective_ability(snapshot, ability) as u32;
                    if on_ability > 0 && effective + on_ability as u32 > 20 {
                        return Err(ChoiceError::AbilityCapExceeded(ability));
                    }
                }
                Ok(())
            }
            AbilityOrFeat::Feat { key, sub_choices } => {
                let def = dataset::feature_by_str(key)
                    .filter(|def| def.feat)
                    .ok_or_else(|| ChoiceError::UnknownFeat(key.clone()))?;
                if snapshot.has_feature_key(key) {
                    return Err(ChoiceError::FeatAlreadyOwned(def.name.to_string()));
                }
                if def.mechanic == FeatureMechanic::MagicInitiate {
                    // Two cantrips plus one level-1 spell, all resolvable.
                    let resolved = sub_choices.len() == 3
                        && sub_choices
                            .iter()
                            .all(|name| spells::get_spell(name).is_some());
                    if !resolved {
                        return Err(ChoiceError::FeatChoicesUnresolved(def.name.to_string()));
                    }
                }
                Ok(())
            }
        }
    }

    fn validate_subclass(&self, snapshot: &CharacterSnapshot) -> Result<(), ChoiceError> {
        if snapshot.subclass.is_some() {
            return Err(ChoiceError::SubclassAlreadyChosen);
        }
        let key = self
            .subclass_choice
            .as_deref()
            .ok_or(ChoiceError::SubclassRequired)?;
        dataset::class_def(snapshot.class)
            .subclass(key)
            .ok_or_else(|| ChoiceError::UnknownSubclass(key.to_string()))?;
        Ok(())
    }

    fn validate_spells(&self, snapshot: &CharacterSnapshot) -> Result<(), ChoiceError> {
        let choice = self.spell_choice.clone().unwrap_or_default();
        let class = snapshot.class;
        let target = self.pending.target_level;

        if choice.new_cantrips.len() as u8 != self.pending.new_cantrips {
            return Err(ChoiceError::WrongCantripCount {
                expected: self.pending.new_cantrips,
                got: choice.new_cantrips.len() as u8,
            });
        }
        if choice.new_spells.len() as u8 != self.pending.new_spells {
            return Err(ChoiceError::WrongSpellCount {
                expected: self.pending.new_spells,
                got: choice.new_spells.len() as u8,
            });
        }

        for name in &choice.new_cantrips {
            let eligible = spells::cantrips_for(class).any(|s| s.name.eq_ignore_ascii_case(name));
            if !eligible {
                return Err(ChoiceError::IneligibleSpell(name.clone()));
            }
            if contains_spell(&snapshot.cantrips, name) {
                return Err(ChoiceError::DuplicateSpell(name.clone()));
            }
        }

        let max_level = dataset::max_spell_level(class, target);
        let known_list = known_spell_list(snapshot);
        for name in &choice.new_spells {
            let eligible =
                spells::leveled_spells_for(class, max_level).any(|s| s.name.eq_ignore_ascii_case(name));
            if !eligible {
                return Err(ChoiceError::IneligibleSpell(name.clone()));
            }
            if contains_spell(known_list, name) {
                return Err(ChoiceError::DuplicateSpell(name.clone()));
            }
        }

        if let Some(swap) = &choice.swap {
            if !self.pending.allows_swap {
                return Err(ChoiceError::SwapNotAllowed);
            }
            if !contains_spell(known_list, &swap.drop) {
                return Err(ChoiceError::UnknownSwapSpell(swap.drop.clone()));
            }
            let eligible =
                spells::leveled_spells_for(class, max_level).any(|s| s.name.eq_ignore_ascii_case(&swap.add));
            if !eligible {
                return Err(ChoiceError::IneligibleSpell(swap.add.clone()));
            }
            if contains_spell(known_list, &swap.add)
                || choice.new_spells.iter().any(|n| n.eq_ignore_ascii_case(&swap.add))
            {
                return Err(ChoiceError::DuplicateSpell(swap.add.clone()));
            }
        }

        Ok(())
    }

    fn validate_masteries(&self, snapshot: &CharacterSnapshot) -> Result<(), ChoiceError> {
        if self.mastery_choice.len() as u8 != self.pending.mastery_picks {
            return Err(ChoiceError::WrongMasteryCount {
                expected: self.pending.mastery_picks,
                got: self.mastery_choice.len() as u8,
            });
        }
        for name in &self.mastery_choice {
            if items::get_weapon(name).is_none() {
                return Err(ChoiceError::UnknownWeapon(name.clone()));
            }
            let already = snapshot
                .weapon_masteries
                .iter()
                .any(|m| m.eq_ignore_ascii_case(name));
            if already {
                return Err(ChoiceError::DuplicateMastery(name.clone()));
            }
        }
        Ok(())
    }

    /// Commit from the summary: produce the next snapshot, clear the
    /// descriptor, and immediately re-run threshold detection so a large XP
    /// grant chains into the next pending level-up. Pure in its inputs.
    pub fn commit(&mut self, snapshot: &CharacterSnapshot) -> Result<CharacterSnapshot, ChoiceError> {
        if self.applied {
            return Err(ChoiceError::AlreadyApplied);
        }
        if self.current_step() != LevelUpStep::Summary {
            // Surface the current step's blocking message if there is one.
            let mut probe = self.clone();
            return match probe.advance(snapshot) {
                Ok(_) => Err(ChoiceError::StepsRemaining),
                Err(err) => Err(err),
            };
        }
        if snapshot.pending_level_up.as_ref() != Some(&self.pending) {
            return Err(ChoiceError::StalePending);
        }
        let hp_gained = self
            .rolled_hp
            .as_ref()
            .ok_or(ChoiceError::HpNotRolled)?
            .total;

        let mut next = snapshot.clone();
        let target = self.pending.target_level;
        next.level = target;
        next.max_hp += hp_gained;

        if let Some(choice) = &self.ability_or_feat {
            match choice {
                AbilityOrFeat::Improvement(allocations) => {
                    for (ability, points) in allocations {
                        let score = next.abilities.get(*ability) + points;
                        next.abilities.set(*ability, score);
                    }
                }
                AbilityOrFeat::Feat { key, .. } => {
                    // Validated against the registry when the step advanced.
                    if let Ok(feat_key) = FeatureKey::resolve(key) {
                        next.feats.push(feat_key);
                    }
                }
            }
        }

        if let Some(key) = &self.subclass_choice {
            next.subclass = Some(key.clone());
        }

        // Everything unlocked exactly at the target level, class and
        // subclass both. A subclass chosen this level grants its features
        // up to the target level.
        let def = dataset::class_def(next.class);
        for key in def.features_at(target) {
            next.features.push(FeatureKey::known(key));
        }
        if let Some(sub) = next.subclass.as_deref().and_then(|key| def.subclass(key)) {
            let newly_chosen = self.subclass_choice.is_some();
            for (level, key) in sub.features {
                let granted = if newly_chosen {
                    *level <= target
                } else {
                    *level == target
                };
                if granted {
                    next.features.push(FeatureKey::known(key));
                }
            }
        }

        if let Some(choice) = &self.spell_choice {
            next.cantrips.extend(choice.new_cantrips.iter().cloned());
            match ClassStrategy::new(&next).spell_quantity_model() {
                Some(SpellQuantityModel::Spellbook) => {
                    next.spellbook.extend(choice.new_spells.iter().cloned());
                }
                _ => next.known_spells.extend(choice.new_spells.iter().cloned()),
            }
            if let Some(swap) = &choice.swap {
                next.known_spells.retain(|s| !s.eq_ignore_ascii_case(&swap.drop));
                next.known_spells.push(swap.add.clone());
            }
        }

        next.weapon_masteries.extend(self.mastery_choice.iter().cloned());

        next.pools = crate::resources::recompute_pools(&next);
        next.pending_level_up = detect_pending(&next);
        self.applied = true;

        tracing::info!(
            character = %next.name,
            level = next.level,
            hp_gained,
            chained = next.pending_level_up.is_some(),
            "level-up committed"
        );
        Ok(next)
    }
}

fn contains_spell(list: &[String], name: &str) -> bool {
    list.iter().any(|s| s.eq_ignore_ascii_case(name))
}

/// The list a class learns leveled spells into.
fn known_spell_list(snapshot: &CharacterSnapshot) -> &[String] {
    match ClassStrategy::new(snapshot).spell_quantity_model() {
        Some(SpellQuantityModel::Spellbook) => &snapshot.spellbook,
        _ => &snapshot.known_spells,
    }
}
