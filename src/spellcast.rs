//! Spell effect resolution.
//!
//! Resolves a spell's declared damage effect against a target list: scaling
//! by caster level (cantrip tiers) or slot level, an attack roll against AC
//! or a saving throw against the caster's DC per target, the spell's
//! on-save modifier, and the class strategy's bonus hooks. Targets never
//! share a roll.

use crate::character::CharacterSnapshot;
use crate::classes::ClassStrategy;
use crate::dice::{DiceExpression, DieType, RollResult};
use crate::spells::{self, DamageType, SaveEffect};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error from resolving a cast.
#[derive(Debug, Clone, Error)]
pub enum CastError {
    #[error("Unknown spell: {0}")]
    UnknownSpell(String),
    #[error("This character cannot cast spells")]
    NotASpellcaster,
}

/// One target of a spell, as the caller sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellTarget {
    pub name: String,
    pub armor_class: i32,
    /// The target's saving-throw bonus for the spell's save ability.
    pub save_bonus: i32,
}

/// Per-target outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetResolution {
    pub target: String,
    pub attack_roll: Option<RollResult>,
    pub save_roll: Option<RollResult>,
    /// The effect landed: the attack hit, or the save failed.
    pub landed: bool,
    pub critical: bool,
    pub damage: i32,
    pub damage_type: Option<DamageType>,
}

/// The resolved cast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellResolution {
    pub spell: String,
    pub slot_level: u8,
    pub targets: Vec<TargetResolution>,
}

/// Resolve a spell against each target independently.
pub fn resolve_spell<R: Rng>(
    snapshot: &CharacterSnapshot,
    spell_name: &str,
    slot_level: u8,
    targets: &[SpellTarget],
    rng: &mut R,
) -> Result<SpellResolution, CastError> {
    let spell = spells::get_spell(spell_name)
        .ok_or_else(|| CastError::UnknownSpell(spell_name.to_string()))?;
    let strategy = ClassStrategy::new(snapshot);
    if !strategy.is_spellcaster() {
        return Err(CastError::NotASpellcaster);
    }

    let damage_dice = spell.effective_damage_dice(snapshot.level, slot_level);
    let mut resolutions = Vec::with_capacity(targets.len());

    for target in targets {
        let mut attack_roll = None;
        let mut save_roll = None;
        let mut landed = true;
        let mut critical = false;
        let mut halved = false;

        if spell.attack {
            let bonus = strategy.spell_attack_bonus().unwrap_or(0);
            let roll = DiceExpression::single(1, DieType::D20, bonus).roll_with_rng(rng);
            critical = roll
                .natural_d20()
                .is_some_and(|face| face >= strategy.critical_hit_floor());
            landed = critical || roll.meets_dc(target.armor_class);
            attack_roll = Some(roll);
        } else if spell.save.is_some() {
            let dc = strategy.spell_save_dc().unwrap_or(10);
            let roll = DiceExpression::single(1, DieType::D20, target.save_bonus).roll_with_rng(rng);
            let saved = roll.meets_dc(dc);
            match spell.save_effect {
                Some(SaveEffect::HalfDamage) => halved = saved,
                Some(SaveEffect::Negates) | None => landed = !saved,
            }
            save_roll = Some(roll);
        }

        let mut damage = 0;
        if landed {
            if let Some(dice) = &damage_dice {
                damage = roll_damage(dice, critical, rng);
                if halved {
                    damage /= 2;
                }
                if damage > 0 {
                    if let Some(damage_type) = spell.damage_type {
                        damage += strategy.elemental_affinity_bonus(damage_type);
                    }
                    damage += strategy.empowered_evocation_bonus(spell.school);
                    damage = damage.max(0);
                }
            }
        }

        resolutions.push(TargetResolution {
            target: target.name.clone(),
            attack_roll,
            save_roll,
            landed,
            critical,
            damage,
            damage_type: spell.damage_type,
        });
    }

    tracing::debug!(
        caster = %snapshot.name,
        spell = %spell.name,
        slot_level,
        targets = resolutions.len(),
        "spell resolved"
    );

    Ok(SpellResolution {
        spell: spell.name.clone(),
        slot_level,
        targets: resolutions,
    })
}

/// Roll a damage expression; a critical hit rolls the dice twice.
fn roll_damage<R: Rng>(dice: &str, critical: bool, rng: &mut R) -> i32 {
    let Ok(expr) = DiceExpression::parse(dice) else {
        return 0;
    };
    let mut damage = expr.roll_with_rng(rng).total;
    if critical {
        damage += expr.roll_with_rng(rng).total;
    }
    damage.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::ClassKind;
    use crate::testing::{leveled_snapshot, snapshot_of, with_subclass};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn target(name: &str, armor_class: i32, save_bonus: i32) -> SpellTarget {
        SpellTarget {
            name: name.to_string(),
            armor_class,
            save_bonus,
        }
    }

    #[test]
    fn test_unknown_spell_is_an_error() {
        let snapshot = snapshot_of(ClassKind::Wizard);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            resolve_spell(&snapshot, "meteor storm", 0, &[], &mut rng),
            Err(CastError::UnknownSpell(_))
        ));
    }

    #[test]
    fn test_non_caster_cannot_cast() {
        let snapshot = snapshot_of(ClassKind::Barbarian);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            resolve_spell(&snapshot, "Fire Bolt", 0, &[target("goblin", 13, 0)], &mut rng),
            Err(CastError::NotASpellcaster)
        ));
    }

    #[test]
    fn test_attack_spell_always_hits_ac_zero() {
        let snapshot = snapshot_of(ClassKind::Wizard);
        let mut rng = StdRng::seed_from_u64(7);
        let resolution = resolve_spell(
            &snapshot,
            "Fire Bolt",
            0,
            &[target("dummy", -30, 0)],
            &mut rng,
        )
        .unwrap();
        let outcome = &resolution.targets[0];
        assert!(outcome.landed);
        assert!(outcome.attack_roll.is_some());
        assert!(outcome.damage >= 1 && outcome.damage <= 20); // 1d10, doubled on a crit
        assert_eq!(outcome.damage_type, Some(DamageType::Fire));
    }

    #[test]
    fn test_half_on_save() {
        let mut snapshot = leveled_snapshot(ClassKind::Wizard, 5);
        snapshot.spellbook.push("Fireball".to_string());
        let mut rng = StdRng::seed_from_u64(11);

        // A target that cannot fail the save still takes half damage.
        let resolution = resolve_spell(
            &snapshot,
            "Fireball",
            3,
            &[target("veteran", 15, 1000)],
            &mut rng,
        )
        .unwrap();
        let outcome = &resolution.targets[0];
        assert!(outcome.landed);
        assert!(outcome.save_roll.is_some());
        assert!(outcome.damage >= 4 && outcome.damage <= 24); // half of 8d6
    }

    #[test]
    fn test_negate_on_save() {
        let snapshot = snapshot_of(ClassKind::Cleric);
        let mut rng = StdRng::seed_from_u64(13);
        let resolution = resolve_spell(
            &snapshot,
            "Sacred Flame",
            0,
            &[target("zealot", 10, 1000)],
            &mut rng,
        )
        .unwrap();
        let outcome = &resolution.targets[0];
        assert!(!outcome.landed);
        assert_eq!(outcome.damage, 0);
    }

    #[test]
    fn test_failed_save_takes_full_damage() {
        let mut snapshot = leveled_snapshot(ClassKind::Wizard, 5);
        snapshot.spellbook.push("Fireball".to_string());
        let mut rng = StdRng::seed_from_u64(17);
        let resolution = resolve_spell(
            &snapshot,
            "Fireball",
            3,
            &[target("straggler", 12, -1000)],
            &mut rng,
        )
        .unwrap();
        let outcome = &resolution.targets[0];
        assert!(outcome.landed);
        assert!(outcome.damage >= 8 && outcome.damage <= 48);
    }

    #[test]
    fn test_targets_roll_independently() {
        let mut snapshot = leveled_snapshot(ClassKind::Wizard, 5);
        snapshot.spellbook.push("Fireball".to_string());
        let mut rng = StdRng::seed_from_u64(19);
        let targets: Vec<SpellTarget> = (0..8).map(|i| target(&format!("g{i}"), 12, -1000)).collect();
        let resolution = resolve_spell(&snapshot, "Fireball", 3, &targets, &mut rng).unwrap();

        // Eight identical targets all failing the save: with per-target
        // damage rolls the totals cannot all collapse to one value.
        let first = resolution.targets[0].damage;
        assert!(resolution.targets.iter().any(|t| t.damage != first));
    }

    #[test]
    fn test_slot_scaling_raises_damage_ceiling() {
        let mut snapshot = leveled_snapshot(ClassKind::Wizard, 9);
        snapshot.spellbook.push("Fireball".to_string());
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..20 {
            let resolution = resolve_spell(
                &snapshot,
                "Fireball",
                5,
                &[target("dummy", 10, -1000)],
                &mut rng,
            )
            .unwrap();
            // 10d6 at slot 5.
            let damage = resolution.targets[0].damage;
            assert!(damage >= 10 && damage <= 60);
        }
    }

    #[test]
    fn test_empowered_evocation_adds_int_once() {
        let mut snapshot = with_subclass(leveled_snapshot(ClassKind::Wizard, 10), "school_of_evocation");
        snapshot.abilities.intelligence = 19; // +5 with Human bonus
        let mut rng = StdRng::seed_from_u64(29);
        let resolution = resolve_spell(
            &snapshot,
            "Fire Bolt",
            0,
            &[target("dummy", -30, 0)],
            &mut rng,
        )
        .unwrap();
        // 2d10 at caster level 10, plus INT modifier; crits double dice only.
        let damage = resolution.targets[0].damage;
        assert!(damage >= 2 + 5 && damage <= 40 + 5);
    }
}
