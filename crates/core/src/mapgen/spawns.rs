//! Enemy scatter, boss placement, and level-driven stat scaling.

use crate::content::{ContentPack, EnemyArchetype};
use crate::rng::RandomSource;
use crate::state::Map;
use crate::types::{Pos, Tile};

use super::model::EnemySeed;
use super::rooms::Room;

const SCATTER_ATTEMPTS: usize = 100;
/// An archetype this many levels past its minimum is mostly phased out.
const STALE_LEVEL_GAP: u32 = 4;
const STALE_SKIP_CHANCE: f32 = 0.8;

pub(super) fn offense_factor(player_level: u32, dungeon_level: u32) -> f32 {
    1.0 + 0.08 * player_level as f32 + 0.05 * dungeon_level as f32
}

pub(super) fn defense_factor(player_level: u32) -> f32 {
    1.0 + 0.03 * player_level as f32
}

pub(super) fn exp_factor(player_level: u32) -> f32 {
    1.0 + 0.05 * player_level as f32
}

fn scale(base: i32, factor: f32) -> i32 {
    (base as f32 * factor) as i32
}

/// Offense scales with both levels, defense only mildly with the player's,
/// so deep enemies hit harder without becoming damage sponges.
pub(super) fn scaled_seed(
    archetype: &EnemyArchetype,
    pos: Pos,
    dungeon_level: u32,
    player_level: u32,
    is_boss: bool,
) -> EnemySeed {
    let offense = offense_factor(player_level, dungeon_level);
    let defense = defense_factor(player_level);
    let mut stats = archetype.stats;
    stats.attack = scale(stats.attack, offense);
    stats.magic_attack = scale(stats.magic_attack, offense);
    stats.defense = scale(stats.defense, defense);
    stats.magic_defense = scale(stats.magic_defense, defense);
    EnemySeed {
        archetype_key: archetype.key,
        pos,
        hp: scale(archetype.base_hp, offense),
        mp: archetype.base_mp,
        stats,
        behavior: archetype.behavior,
        ranged: archetype.ranged,
        exp_reward: scale(archetype.base_exp, exp_factor(player_level)),
        is_boss,
    }
}

/// Level-eligible archetypes, with long-outgrown entries mostly skipped. If
/// the stale filter empties the pool the plain level filter is used instead.
fn eligible_archetypes<'a>(
    content: &'a ContentPack,
    dungeon_level: u32,
    rng: &mut RandomSource,
) -> Vec<&'a EnemyArchetype> {
    let mut eligible = Vec::new();
    for archetype in &content.enemies {
        if archetype.min_level > dungeon_level {
            continue;
        }
        let stale = dungeon_level > archetype.min_level + STALE_LEVEL_GAP;
        if stale && rng.chance(STALE_SKIP_CHANCE) {
            continue;
        }
        eligible.push(archetype);
    }
    if eligible.is_empty() {
        eligible = content
            .enemies
            .iter()
            .filter(|archetype| archetype.min_level <= dungeon_level)
            .collect();
    }
    eligible
}

/// Scatters the non-boss population over the interior rooms. The entry and
/// exit rooms stay clear so arrivals and the boss fight are not crowded.
pub(super) fn place_enemies(
    map: &Map,
    rooms: &[Room],
    content: &ContentPack,
    dungeon_level: u32,
    player_level: u32,
    rng: &mut RandomSource,
) -> Vec<EnemySeed> {
    let target = 4 + 2 * dungeon_level as usize + rng.range_usize(0, 1);
    let eligible = eligible_archetypes(content, dungeon_level, rng);
    let spawn_rooms: Vec<&Room> = rooms[1..rooms.len() - 1].iter().collect();
    // Overlapping halls can fold the entry center into a spawn room, so the
    // player's arrival tile is excluded by position as well.
    let entry_center = rooms[0].center();

    let mut seeds = Vec::new();
    if spawn_rooms.is_empty() || eligible.is_empty() {
        return seeds;
    }
    for _ in 0..SCATTER_ATTEMPTS {
        if seeds.len() >= target {
            break;
        }
        let room = *rng.pick(&spawn_rooms);
        let pos = Pos {
            y: rng.range_usize(room.y, room.bottom()) as i32,
            x: rng.range_usize(room.x, room.right()) as i32,
        };
        if map.tile_at(pos) != Tile::Floor || pos == entry_center {
            continue;
        }
        if seeds.iter().any(|seed: &EnemySeed| seed.pos == pos) {
            continue;
        }
        let archetype = *rng.pick(&eligible);
        seeds.push(scaled_seed(archetype, pos, dungeon_level, player_level, false));
    }
    seeds
}

// Cardinals first, then diagonals.
const BOSS_OFFSETS: [(i32, i32); 8] =
    [(-1, 0), (0, 1), (1, 0), (0, -1), (-1, 1), (1, 1), (1, -1), (-1, -1)];

pub(super) fn place_boss(
    map: &Map,
    rooms: &[Room],
    content: &ContentPack,
    dungeon_level: u32,
    player_level: u32,
    stairs_down: Pos,
    enemies: &[EnemySeed],
) -> EnemySeed {
    let archetype = content.boss_for_level(dungeon_level);
    let pos = boss_position(map, rooms, stairs_down, enemies);
    scaled_seed(archetype, pos, dungeon_level, player_level, true)
}

/// The boss guards the descent: first free floor tile around the stairs, or
/// failing that the free exit-room tile nearest to them.
fn boss_position(map: &Map, rooms: &[Room], stairs_down: Pos, enemies: &[EnemySeed]) -> Pos {
    let free = |candidate: Pos| {
        map.tile_at(candidate) == Tile::Floor
            && !enemies.iter().any(|enemy| enemy.pos == candidate)
    };
    for (dy, dx) in BOSS_OFFSETS {
        let candidate = Pos { y: stairs_down.y + dy, x: stairs_down.x + dx };
        if free(candidate) {
            return candidate;
        }
    }
    let exit_room = rooms.last().expect("generation always keeps at least two rooms");
    let mut fallback: Option<Pos> = None;
    for y in exit_room.y..=exit_room.bottom() {
        for x in exit_room.x..=exit_room.right() {
            let candidate = Pos { y: y as i32, x: x as i32 };
            if !free(candidate) {
                continue;
            }
            let replace = match fallback {
                None => true,
                Some(best) => {
                    (candidate.manhattan(stairs_down), candidate.y, candidate.x)
                        < (best.manhattan(stairs_down), best.y, best.x)
                }
            };
            if replace {
                fallback = Some(candidate);
            }
        }
    }
    fallback.expect("exit room always holds a free floor tile for the boss")
}
