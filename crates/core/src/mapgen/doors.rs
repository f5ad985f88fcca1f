//! Door placement at corridor choke points along room walls.

use crate::rng::RandomSource;
use crate::state::Map;
use crate::types::{Pos, Tile};

use super::rooms::Room;

const DOOR_CHANCE: f32 = 0.8;

#[derive(Clone, Copy, Debug)]
enum Wall {
    North,
    South,
    East,
    West,
}

/// Scans the four wall rings of every room for doorway choke points. Walls
/// are visited in shuffled order so doors are not biased toward north walls.
pub(super) fn place_doors(map: &mut Map, rooms: &[Room], rng: &mut RandomSource) {
    for room in rooms {
        let mut walls = [Wall::North, Wall::South, Wall::East, Wall::West];
        rng.shuffle(&mut walls);
        for wall in walls {
            let candidates = choke_points(map, room, wall);
            if candidates.is_empty() || candidates.len() > 3 {
                continue;
            }
            let doorway = candidates[candidates.len() / 2];
            if door_within_neighborhood(map, doorway) {
                continue;
            }
            if rng.chance(DOOR_CHANCE) {
                map.set_tile(doorway, Tile::Door { open: false });
            }
        }
    }
}

/// A choke point is a floor tile on the wall ring whose two neighbors along
/// the same wall are still wall: the single-tile gap a corridor punched.
fn choke_points(map: &Map, room: &Room, wall: Wall) -> Vec<Pos> {
    let mut candidates = Vec::new();
    match wall {
        Wall::North | Wall::South => {
            let y = match wall {
                Wall::North => room.y as i32 - 1,
                _ => room.bottom() as i32 + 1,
            };
            for x in room.x as i32..=room.right() as i32 {
                let pos = Pos { y, x };
                if map.tile_at(pos) == Tile::Floor
                    && map.tile_at(Pos { y, x: x - 1 }) == Tile::Wall
                    && map.tile_at(Pos { y, x: x + 1 }) == Tile::Wall
                {
                    candidates.push(pos);
                }
            }
        }
        Wall::East | Wall::West => {
            let x = match wall {
                Wall::West => room.x as i32 - 1,
                _ => room.right() as i32 + 1,
            };
            for y in room.y as i32..=room.bottom() as i32 {
                let pos = Pos { y, x };
                if map.tile_at(pos) == Tile::Floor
                    && map.tile_at(Pos { y: y - 1, x }) == Tile::Wall
                    && map.tile_at(Pos { y: y + 1, x }) == Tile::Wall
                {
                    candidates.push(pos);
                }
            }
        }
    }
    candidates
}

/// Keeps doors from clustering: no second door inside the 3x3 block.
fn door_within_neighborhood(map: &Map, pos: Pos) -> bool {
    for dy in -1..=1 {
        for dx in -1..=1 {
            if matches!(map.tile_at(Pos { y: pos.y + dy, x: pos.x + dx }), Tile::Door { .. }) {
                return true;
            }
        }
    }
    false
}
