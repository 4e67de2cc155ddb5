//! Resource pools and rest recovery.
//!
//! A [`ResourcePool`] is a depletable, rest-rechargeable counter: rage uses,
//! ki, sorcery points, pact slots, superiority dice, arcane ward hit points.
//! Pools never grow except via an explicit rest, and spending never goes
//! negative.

use crate::character::CharacterSnapshot;
use crate::classes::ClassStrategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Error from spending more of a resource than is available.
#[derive(Debug, Clone, Error)]
#[error("Insufficient {kind}: needed {needed}, have {available}")]
pub struct InsufficientResource {
    pub kind: PoolKind,
    pub needed: u8,
    pub available: u8,
}

/// The kinds of per-class resource pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PoolKind {
    RageUses,
    Ki,
    SorceryPoints,
    PactSlots,
    SuperiorityDice,
    ArcaneWard,
}

impl PoolKind {
    pub fn name(&self) -> &'static str {
        match self {
            PoolKind::RageUses => "rage uses",
            PoolKind::Ki => "ki points",
            PoolKind::SorceryPoints => "sorcery points",
            PoolKind::PactSlots => "pact slots",
            PoolKind::SuperiorityDice => "superiority dice",
            PoolKind::ArcaneWard => "arcane ward hit points",
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// When a pool refills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RechargeRule {
    ShortRest,
    LongRest,
    Both,
}

impl RechargeRule {
    /// Whether a rest of `kind` triggers this rule.
    pub fn triggers_on(&self, kind: RestKind) -> bool {
        match (self, kind) {
            (RechargeRule::Both, _) => true,
            (RechargeRule::ShortRest, RestKind::Short) => true,
            (RechargeRule::LongRest, RestKind::Long) => true,
            _ => false,
        }
    }
}

/// The two rest kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestKind {
    Short,
    Long,
}

/// A depletable, rechargeable counter. Invariant: `current <= max`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub current: u8,
    pub max: u8,
    pub recharge: RechargeRule,
    /// A pool that never depletes (Barbarian rage at level 20).
    #[serde(default)]
    pub unlimited: bool,
}

impl ResourcePool {
    /// A full pool.
    pub fn full(max: u8, recharge: RechargeRule) -> Self {
        Self {
            current: max,
            max,
            recharge,
            unlimited: false,
        }
    }

    pub fn unlimited(recharge: RechargeRule) -> Self {
        Self {
            current: 0,
            max: 0,
            recharge,
            unlimited: true,
        }
    }

    /// Spend `n` uses. Fails without partial spend when `n` exceeds the
    /// current value.
    pub fn spend(&self, kind: PoolKind, n: u8) -> Result<Self, InsufficientResource> {
        if self.unlimited {
            return Ok(self.clone());
        }
        if n > self.current {
            return Err(InsufficientResource {
                kind,
                needed: n,
                available: self.current,
            });
        }
        Ok(Self {
            current: self.current - n,
            ..self.clone()
        })
    }

    /// Refill iff the recharge rule matches the rest kind; no-op otherwise.
    pub fn apply_rest(&self, kind: RestKind) -> Self {
        if self.recharge.triggers_on(kind) {
            Self {
                current: self.max,
                ..self.clone()
            }
        } else {
            self.clone()
        }
    }

    /// Carry an old current value into a recomputed pool, clamped to the
    /// new maximum. Leveling up never refills a pool by itself.
    pub fn carrying(self, previous: Option<&ResourcePool>) -> Self {
        match previous {
            Some(prev) => Self {
                current: prev.current.min(self.max),
                ..self
            },
            None => self,
        }
    }
}

// ============================================================================
// Snapshot transforms
// ============================================================================

/// Recompute every pool's maximum from the snapshot's level and features,
/// preserving current values (clamped to the new maxima).
pub fn recompute_pools(snapshot: &CharacterSnapshot) -> BTreeMap<PoolKind, ResourcePool> {
    let mut pools = BTreeMap::new();
    if let Some((kind, pool)) = ClassStrategy::new(snapshot).resource_pool() {
        let pool = pool.carrying(snapshot.pools.get(&kind));
        pools.insert(kind, pool);
    }
    pools
}

/// Take a rest: every pool whose recharge rule matches refills.
pub fn take_rest(snapshot: &CharacterSnapshot, kind: RestKind) -> CharacterSnapshot {
    let mut next = snapshot.clone();
    for pool in next.pools.values_mut() {
        *pool = pool.apply_rest(kind);
    }
    tracing::debug!(character = %next.name, rest = ?kind, "rest applied");
    next
}

/// Spend from one of the snapshot's pools, returning the new snapshot.
/// No partial spend: on failure the snapshot is unchanged.
pub fn spend_resource(
    snapshot: &CharacterSnapshot,
    kind: PoolKind,
    n: u8,
) -> Result<CharacterSnapshot, InsufficientResource> {
    let pool = snapshot.pools.get(&kind).ok_or(InsufficientResource {
        kind,
        needed: n,
        available: 0,
    })?;
    let spent = pool.spend(kind, n)?;
    let mut next = snapshot.clone();
    next.pools.insert(kind, spent);
    Ok(next)
}
