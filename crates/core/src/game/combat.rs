//! Damage resolution shared by player and enemy strikes.
//! This module exists so melee, ranged, and skill hits run one pipeline.
//! It does not own targeting rules or turn order.

use super::*;
use crate::content::{SkillKind, SkillSpec, StatusApplication};
use crate::rng::RandomSource;
use crate::state::Entity;

/// Critical hits land at one and a half times the rolled damage.
const CRIT_MULTIPLIER: f64 = 1.5;

/// What a single melee or ranged strike did. An evaded strike carries zero
/// damage and no crit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackOutcome {
    pub damage: i32,
    pub evaded: bool,
    pub crit: bool,
}

/// [`AttackOutcome`] plus the status a connecting skill wants on its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkillOutcome {
    pub damage: i32,
    pub evaded: bool,
    pub crit: bool,
    pub applies: Option<StatusApplication>,
}

/// Adjacent weapon strike, physical attack against physical defense.
pub fn resolve_melee(attacker: &Entity, defender: &Entity, rng: &mut RandomSource) -> AttackOutcome {
    resolve_hit(attacker, defender, attacker.stats.attack, defender.stats.defense, rng)
}

/// Projectile strike. Same physical pipeline as melee; range checks are the
/// caller's business.
pub fn resolve_ranged(attacker: &Entity, defender: &Entity, rng: &mut RandomSource) -> AttackOutcome {
    resolve_hit(attacker, defender, attacker.stats.attack, defender.stats.defense, rng)
}

/// Skill strike scaled by the skill's coefficient off the matching stat pair.
///
/// Self-targeted skills (range zero) skip the pipeline entirely and only
/// carry their status application. For the rest, the application is dropped
/// when the target evades.
pub fn resolve_skill(
    attacker: &Entity,
    defender: &Entity,
    spec: &SkillSpec,
    rng: &mut RandomSource,
) -> SkillOutcome {
    if spec.range == 0 {
        return SkillOutcome { damage: 0, evaded: false, crit: false, applies: spec.applies };
    }

    let (attack, defense) = match spec.kind {
        SkillKind::Physical => (attacker.stats.attack, defender.stats.defense),
        SkillKind::Magic => (attacker.stats.magic_attack, defender.stats.magic_defense),
    };
    let scaled = (f64::from(attack) * f64::from(spec.coefficient)) as i32;
    let outcome = resolve_hit(attacker, defender, scaled, defense, rng);
    let applies = if outcome.evaded { None } else { spec.applies };

    SkillOutcome { damage: outcome.damage, evaded: outcome.evaded, crit: outcome.crit, applies }
}

/// One strike through the full pipeline: evasion roll, base damage with a
/// small additive roll, crit roll, then the attacker's Mark penalty and the
/// defender's Guard and Absorb reductions. A connecting hit always deals at
/// least one damage.
fn resolve_hit(
    attacker: &Entity,
    defender: &Entity,
    attack: i32,
    defense: i32,
    rng: &mut RandomSource,
) -> AttackOutcome {
    if rng.chance(evade_chance(defender)) {
        return AttackOutcome { damage: 0, evaded: true, crit: false };
    }

    let mut damage = (attack - defense + rng.range_i32(0, 2)).max(1);

    let crit = rng.chance(attacker.stats.crit_chance.clamp(0.0, 1.0));
    if crit {
        damage = (f64::from(damage) * CRIT_MULTIPLIER) as i32;
    }

    let mark = attacker.status_magnitude(StatusKind::Mark);
    if mark > 0 {
        damage -= damage * mark / 100;
    }

    for effect in &defender.statuses {
        if effect.kind == StatusKind::Guard {
            damage = damage * (100 - effect.magnitude).max(0) / 100;
        }
    }

    if defender.has_status(StatusKind::Absorb) {
        damage -= damage / 4;
    }

    AttackOutcome { damage: damage.max(1), evaded: false, crit }
}

/// Chance for the defender to slip the strike entirely. Nimble stacks add
/// percentage points on top of the base evasion stat.
fn evade_chance(defender: &Entity) -> f32 {
    let nimble = defender.status_magnitude(StatusKind::Nimble) as f32 / 100.0;
    (defender.stats.evasion + nimble).clamp(0.0, 1.0)
}
