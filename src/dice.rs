//! Dice notation parsing and rolling.
//!
//! Supports the notation the engine needs: `XdY+Z`, multiple components,
//! and keep-highest/keep-lowest (`4d6kh3` for rolled ability scores).

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for dice parsing.
#[derive(Debug, Error)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("No dice specified")]
    NoDice,
    #[error("Cannot keep {keep} dice when only rolling {count} (in {notation})")]
    InvalidKeepCount {
        keep: u32,
        count: u32,
        notation: String,
    },
}

/// Standard die types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DieType {
    pub fn sides(&self) -> u32 {
        match self {
            DieType::D4 => 4,
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
            DieType::D20 => 20,
        }
    }

    pub fn from_sides(sides: u32) -> Option<DieType> {
        match sides {
            4 => Some(DieType::D4),
            6 => Some(DieType::D6),
            8 => Some(DieType::D8),
            10 => Some(DieType::D10),
            12 => Some(DieType::D12),
            20 => Some(DieType::D20),
            _ => None,
        }
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// A single die component of a dice expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiceComponent {
    pub count: u32,
    pub die_type: DieType,
    pub keep_highest: Option<u32>,
    pub keep_lowest: Option<u32>,
}

/// A complete dice expression (e.g., `1d10+2`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiceExpression {
    pub components: Vec<DiceComponent>,
    pub modifier: i32,
    pub original: String,
}

impl DiceExpression {
    /// Build an expression from parts, bypassing the parser.
    pub fn single(count: u32, die_type: DieType, modifier: i32) -> Self {
        let original = if modifier > 0 {
            format!("{count}{die_type}+{modifier}")
        } else if modifier < 0 {
            format!("{count}{die_type}{modifier}")
        } else {
            format!("{count}{die_type}")
        };
        Self {
            components: vec![DiceComponent {
                count,
                die_type,
                keep_highest: None,
                keep_lowest: None,
            }],
            modifier,
            original,
        }
    }

    /// Parse a dice notation string.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let notation = notation.trim().to_lowercase();
        if notation.is_empty() {
            return Err(DiceError::NoDice);
        }

        let mut components = Vec::new();
        let mut modifier: i32 = 0;
        let mut current = String::new();
        let mut sign: i32 = 1;

        for ch in notation.chars() {
            match ch {
                '+' | '-' => {
                    if !current.is_empty() {
                        Self::parse_component(&current, sign, &mut components, &mut modifier)?;
                        current.clear();
                    }
                    sign = if ch == '+' { 1 } else { -1 };
                }
                ' ' => continue,
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            Self::parse_component(&current, sign, &mut components, &mut modifier)?;
        }

        if components.is_empty() && modifier == 0 {
            return Err(DiceError::NoDice);
        }

        Ok(DiceExpression {
            components,
            modifier,
            original: notation,
        })
    }

    fn parse_component(
        s: &str,
        sign: i32,
        components: &mut Vec<DiceComponent>,
        modifier: &mut i32,
    ) -> Result<(), DiceError> {
        if let Some(d_pos) = s.find('d') {
            let count_str = &s[..d_pos];
            let rest = &s[d_pos + 1..];

            let count: u32 = if count_str.is_empty() {
                1
            } else {
                count_str
                    .parse()
                    .map_err(|_| DiceError::InvalidNotation(s.to_string()))?
            };

            let (sides_str, keep_highest, keep_lowest) = if let Some(kh_pos) = rest.find("kh") {
                let keep: u32 = rest[kh_pos + 2..]
                    .parse()
                    .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
                (&rest[..kh_pos], Some(keep), None)
            } else if let Some(kl_pos) = rest.find("kl") {
                let keep: u32 = rest[kl_pos + 2..]
                    .parse()
                    .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
                (&rest[..kl_pos], None, Some(keep))
            } else {
                (rest, None, None)
            };

            let sides: u32 = sides_str
                .parse()
                .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
            let die_type = DieType::from_sides(sides).ok_or(DiceError::InvalidDieSize(sides))?;

            if let Some(keep) = keep_highest.or(keep_lowest) {
                if keep > count {
                    return Err(DiceError::InvalidKeepCount {
                        keep,
                        count,
                        notation: s.to_string(),
                    });
                }
            }

            components.push(DiceComponent {
                count,
                die_type,
                keep_highest,
                keep_lowest,
            });
        } else {
            let value: i32 = s
                .parse()
                .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
            *modifier += sign * value;
        }

        Ok(())
    }

    /// Roll the expression with the thread RNG.
    pub fn roll(&self) -> RollResult {
        self.roll_with_rng(&mut rand::thread_rng())
    }

    /// Roll with a specific RNG (useful for testing).
    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> RollResult {
        let mut component_results = Vec::new();

        for component in &self.components {
            let mut rolls: Vec<u32> = (0..component.count)
                .map(|_| rng.gen_range(1..=component.die_type.sides()))
                .collect();

            let kept = if let Some(keep) = component.keep_highest {
                let mut sorted = rolls.clone();
                sorted.sort_by(|a, b| b.cmp(a));
                sorted.truncate(keep as usize);
                sorted
            } else if let Some(keep) = component.keep_lowest {
                rolls.sort();
                rolls.truncate(keep as usize);
                rolls.clone()
            } else {
                rolls.clone()
            };

            let subtotal: u32 = kept.iter().sum();
            component_results.push(ComponentResult {
                die_type: component.die_type,
                rolls,
                kept,
                subtotal,
            });
        }

        let dice_total: i32 = component_results.iter().map(|c| c.subtotal as i32).sum();

        RollResult {
            expression: self.clone(),
            component_results,
            modifier: self.modifier,
            total: dice_total + self.modifier,
        }
    }

    /// Minimum possible total for this expression.
    pub fn minimum(&self) -> i32 {
        let dice: i32 = self
            .components
            .iter()
            .map(|c| c.keep_highest.or(c.keep_lowest).unwrap_or(c.count) as i32)
            .sum();
        dice + self.modifier
    }

    /// Maximum possible total for this expression.
    pub fn maximum(&self) -> i32 {
        let dice: i32 = self
            .components
            .iter()
            .map(|c| {
                let kept = c.keep_highest.or(c.keep_lowest).unwrap_or(c.count);
                (kept * c.die_type.sides()) as i32
            })
            .sum();
        dice + self.modifier
    }
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpression::parse(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// Result of rolling a single dice component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentResult {
    pub die_type: DieType,
    pub rolls: Vec<u32>,
    pub kept: Vec<u32>,
    pub subtotal: u32,
}

/// Complete result of a dice roll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollResult {
    pub expression: DiceExpression,
    pub component_results: Vec<ComponentResult>,
    pub modifier: i32,
    pub total: i32,
}

impl RollResult {
    /// The natural face of a single-d20 roll, if this was one.
    ///
    /// Attack resolution compares this against a class's critical-hit floor,
    /// which may be 19 or 18 rather than 20.
    pub fn natural_d20(&self) -> Option<u32> {
        match self.component_results.as_slice() {
            [c] if c.die_type == DieType::D20 && c.rolls.len() == 1 => c.rolls.first().copied(),
            _ => None,
        }
    }

    /// Check if the roll meets or exceeds a DC.
    pub fn meets_dc(&self, dc: i32) -> bool {
        self.total >= dc
    }

    /// Format the individual dice results for display.
    pub fn dice_display(&self) -> String {
        let dice_parts: Vec<String> = self
            .component_results
            .iter()
            .map(|c| {
                format!(
                    "[{}]",
                    c.kept
                        .iter()
                        .map(|r| r.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
            .collect();

        let dice_str = dice_parts.join(" + ");
        if self.modifier > 0 {
            format!("{} + {}", dice_str, self.modifier)
        } else if self.modifier < 0 {
            format!("{} - {}", dice_str, self.modifier.abs())
        } else {
            dice_str
        }
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.dice_display(), self.total)
    }
}

/// Convenience function to roll dice from a notation string.
pub fn roll(notation: &str) -> Result<RollResult, DiceError> {
    let expr = DiceExpression::parse(notation)?;
    Ok(expr.roll())
}

/// Roll with a caller-supplied RNG.
pub fn roll_with_rng<R: Rng>(notation: &str, rng: &mut R) -> Result<RollResult, DiceError> {
    let expr = DiceExpression::parse(notation)?;
    Ok(expr.roll_with_rng(rng))
}
