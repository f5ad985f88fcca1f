//! Per-enemy decision making for one simulation turn.
//! This module exists to turn an enemy plus its surroundings into one action.
//! It does not own combat math or the tick loop that applies actions.

use super::*;
use crate::rng::RandomSource;
use crate::state::{Entity, Map};

/// Aggressive pursuit keys on proximity even without a sightline.
const SENSE_RADIUS: u32 = 8;
/// Pack hunters coordinate with allies this close to themselves.
const FLANK_RADIUS: u32 = 5;

/// Position and tag snapshot of a live enemy other than the one deciding.
/// These double as solid obstacles when candidate steps are checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NearbyEnemy {
    pub pos: Pos,
    pub behavior: Option<BehaviorTag>,
}

/// Chooses what `enemy` does this turn.
///
/// Status bookkeeping happens here too: stun and slow burn their charges
/// before anything else, then damage over time ticks. A slowed enemy acts
/// on alternating turns, starting with a skipped one.
pub fn decide(
    enemy: &mut Entity,
    player: &Entity,
    others: &[NearbyEnemy],
    map: &Map,
    rng: &mut RandomSource,
) -> Action {
    if enemy.status_turns(StatusKind::Stun) > 0 {
        enemy.tick_down_status(StatusKind::Stun);
        return Action::Stunned;
    }

    if enemy.status_turns(StatusKind::Slow) > 0 {
        enemy.tick_down_status(StatusKind::Slow);
        enemy.slow_phase = !enemy.slow_phase;
        if enemy.slow_phase {
            return Action::Slowed;
        }
    } else {
        enemy.slow_phase = false;
    }

    enemy.tick_statuses(&[StatusKind::Stun, StatusKind::Slow]);
    if enemy.hp <= 0 {
        return Action::Perish;
    }

    let dist = enemy.pos.manhattan(player.pos);

    if player.has_status(StatusKind::Veiled) && dist > 2 {
        return Action::Wait;
    }

    if dist == 1 {
        return Action::Attack;
    }

    if let Some(profile) = enemy.ranged
        && dist > 1
        && dist <= profile.max_range
        && visibility::has_line_of_sight(map, enemy.pos, player.pos)
    {
        if !profile.prefers_melee {
            return Action::RangedAttack;
        }
        let desperate = enemy.hp * 100 < enemy.max_hp * 30;
        if dist >= 4 || desperate || rng.chance(0.25) {
            return Action::RangedAttack;
        }
        return advance(enemy, player, others, map);
    }

    match enemy.behavior {
        Some(BehaviorTag::Aggressive) => {
            if visibility::has_line_of_sight(map, enemy.pos, player.pos) || dist <= SENSE_RADIUS {
                advance(enemy, player, others, map)
            } else {
                Action::Wait
            }
        }
        Some(BehaviorTag::Cautious) => cautious_spacing(enemy, player, others, map, rng, dist),
        Some(BehaviorTag::Pack) => {
            let ally = others.iter().find(|other| {
                other.behavior == Some(BehaviorTag::Pack)
                    && other.pos.manhattan(enemy.pos) <= FLANK_RADIUS
            });
            match ally {
                Some(ally) => {
                    let goal = Pos {
                        y: player.pos.y + (player.pos.y - ally.pos.y).signum(),
                        x: player.pos.x + (player.pos.x - ally.pos.x).signum(),
                    };
                    step_toward(enemy, goal, player, others, map)
                }
                None => advance(enemy, player, others, map),
            }
        }
        Some(BehaviorTag::Ambush) => {
            if dist <= 3 {
                advance(enemy, player, others, map)
            } else {
                Action::Wait
            }
        }
        Some(BehaviorTag::Boss) => {
            if dist <= 2 && rng.chance(0.3) {
                retreat(enemy, player, others, map)
            } else {
                advance(enemy, player, others, map)
            }
        }
        None => Action::Wait,
    }
}

/// Holds distance near the preferred band, strafing now and then so the
/// enemy does not stand on a single tile forever.
fn cautious_spacing(
    enemy: &Entity,
    player: &Entity,
    others: &[NearbyEnemy],
    map: &Map,
    rng: &mut RandomSource,
    dist: u32,
) -> Action {
    let optimal = preferred_range(enemy);
    if rng.chance(0.2) {
        return strafe(enemy, player, others, map, rng);
    }
    if dist < optimal {
        if dist <= optimal / 2 || rng.chance(0.6) {
            return retreat(enemy, player, others, map);
        }
        return Action::Wait;
    }
    if dist > optimal {
        return advance(enemy, player, others, map);
    }
    Action::Wait
}

/// Spacing a cautious enemy tries to hold, roughly 70% of its reach.
fn preferred_range(enemy: &Entity) -> u32 {
    let base = match enemy.ranged {
        Some(profile) => (f64::from(profile.max_range) * 0.7) as u32,
        None => 4,
    };
    base.max(2)
}

/// Step toward the player, asking the pathfinder first and falling back to
/// a direct unit step when no full route resolves. The pathfinder ignores
/// bodies, so its proposal is re-checked before use.
fn advance(enemy: &Entity, player: &Entity, others: &[NearbyEnemy], map: &Map) -> Action {
    if let Some(step) = pathfinding::next_step(enemy.pos, player.pos, map)
        && step_is_open(step, player, others, map)
    {
        return Action::Move(step);
    }
    step_toward(enemy, player.pos, player, others, map)
}

fn retreat(enemy: &Entity, player: &Entity, others: &[NearbyEnemy], map: &Map) -> Action {
    let goal = Pos {
        y: enemy.pos.y + (enemy.pos.y - player.pos.y),
        x: enemy.pos.x + (enemy.pos.x - player.pos.x),
    };
    step_toward(enemy, goal, player, others, map)
}

/// Sidesteps perpendicular to the player, trying both sides in an order the
/// roll picks.
fn strafe(
    enemy: &Entity,
    player: &Entity,
    others: &[NearbyEnemy],
    map: &Map,
    rng: &mut RandomSource,
) -> Action {
    let toward_y = (player.pos.y - enemy.pos.y).signum();
    let toward_x = (player.pos.x - enemy.pos.x).signum();
    let mut sides = [
        Pos { y: enemy.pos.y + toward_x, x: enemy.pos.x - toward_y },
        Pos { y: enemy.pos.y - toward_x, x: enemy.pos.x + toward_y },
    ];
    if rng.chance(0.5) {
        sides.swap(0, 1);
    }
    for side in sides {
        if side != enemy.pos && step_is_open(side, player, others, map) {
            return Action::Move(side);
        }
    }
    Action::Wait
}

/// One unit step from the enemy toward `goal`. Candidates run longest axis
/// first, then the other axis, then the diagonal, and the first open tile
/// wins. No open candidate means standing still.
fn step_toward(
    enemy: &Entity,
    goal: Pos,
    player: &Entity,
    others: &[NearbyEnemy],
    map: &Map,
) -> Action {
    let from = enemy.pos;
    let dy = goal.y - from.y;
    let dx = goal.x - from.x;
    let step_y = Pos { y: from.y + dy.signum(), x: from.x };
    let step_x = Pos { y: from.y, x: from.x + dx.signum() };
    let diagonal = Pos { y: from.y + dy.signum(), x: from.x + dx.signum() };
    let ordered = if dx.abs() >= dy.abs() {
        [step_x, step_y, diagonal]
    } else {
        [step_y, step_x, diagonal]
    };
    for candidate in ordered {
        if candidate != from && step_is_open(candidate, player, others, map) {
            return Action::Move(candidate);
        }
    }
    Action::Wait
}

/// Enemies keep to bare floor and stairs. Door thresholds, the player's
/// tile, and tiles under other bodies all block.
fn step_is_open(step: Pos, player: &Entity, others: &[NearbyEnemy], map: &Map) -> bool {
    if step == player.pos {
        return false;
    }
    if others.iter().any(|other| other.pos == step) {
        return false;
    }
    matches!(map.tile_at(step), Tile::Floor | Tile::StairsDown | Tile::StairsUp)
}
