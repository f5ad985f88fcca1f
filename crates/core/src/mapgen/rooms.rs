//! Two-phase room placement: large organic halls, then rejection-sampled chambers.

use crate::rng::RandomSource;
use crate::state::Map;
use crate::types::{Pos, Tile};

const HALL_SIDE_MIN: usize = 10;
const HALL_SIDE_MAX: usize = 18;
const CHAMBER_SIDE_MIN: usize = 5;
const CHAMBER_SIDE_MAX: usize = 11;
const CHAMBER_ATTEMPTS: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoomKind {
    /// Early-phase room placed without overlap checks; halls merging into one
    /// another is what gives the layout its cavernous open areas.
    Hall,
    /// Later-phase room kept clear of every other room by a padding margin.
    Chamber,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Room {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub kind: RoomKind,
}

impl Room {
    pub fn right(self) -> usize {
        self.x + self.width - 1
    }

    pub fn bottom(self) -> usize {
        self.y + self.height - 1
    }

    pub fn center(self) -> Pos {
        Pos { y: (self.y + self.height / 2) as i32, x: (self.x + self.width / 2) as i32 }
    }

    pub fn expanded(self, margin: usize) -> Self {
        let expanded_x = self.x.saturating_sub(margin);
        let expanded_y = self.y.saturating_sub(margin);
        let expanded_right = self.right().saturating_add(margin);
        let expanded_bottom = self.bottom().saturating_add(margin);
        Self {
            x: expanded_x,
            y: expanded_y,
            width: expanded_right - expanded_x + 1,
            height: expanded_bottom - expanded_y + 1,
            kind: self.kind,
        }
    }

    pub fn intersects(self, other: &Self) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    pub fn contains(self, pos: Pos) -> bool {
        if pos.x < 0 || pos.y < 0 {
            return false;
        }
        let px = pos.x as usize;
        let py = pos.y as usize;
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// Carves both placement phases into the map and returns the rooms in
/// insertion order: the first room is the level entry, the last is the exit.
pub(super) fn place_rooms(map: &mut Map, dungeon_level: u32, rng: &mut RandomSource) -> Vec<Room> {
    let mut rooms = Vec::new();

    let hall_count = rng.range_usize(3, 4);
    for _ in 0..hall_count {
        let room_width = rng.range_usize(HALL_SIDE_MIN, HALL_SIDE_MAX).min(map.width - 2);
        let room_height = rng.range_usize(HALL_SIDE_MIN, HALL_SIDE_MAX).min(map.height - 2);
        let max_x = map.width - room_width - 1;
        let max_y = map.height - room_height - 1;
        let hall = Room {
            x: rng.range_usize(1, max_x),
            y: rng.range_usize(1, max_y),
            width: room_width,
            height: room_height,
            kind: RoomKind::Hall,
        };
        carve_room(map, &hall);
        rooms.push(hall);
    }

    let chamber_target = 8 + dungeon_level as usize + rng.range_usize(0, 3);
    let mut placed_chambers = 0_usize;
    for _ in 0..CHAMBER_ATTEMPTS {
        if placed_chambers >= chamber_target {
            break;
        }
        let room_width = rng.range_usize(CHAMBER_SIDE_MIN, CHAMBER_SIDE_MAX);
        let room_height = rng.range_usize(CHAMBER_SIDE_MIN, CHAMBER_SIDE_MAX);
        if room_width + 2 >= map.width || room_height + 2 >= map.height {
            continue;
        }
        let max_x = map.width - room_width - 1;
        let max_y = map.height - room_height - 1;
        let candidate = Room {
            x: rng.range_usize(1, max_x),
            y: rng.range_usize(1, max_y),
            width: room_width,
            height: room_height,
            kind: RoomKind::Chamber,
        };
        let candidate_with_margin = candidate.expanded(1);
        if rooms.iter().any(|existing: &Room| {
            existing.expanded(1).intersects(&candidate_with_margin)
        }) {
            continue;
        }
        carve_room(map, &candidate);
        rooms.push(candidate);
        placed_chambers += 1;
    }

    rooms
}

fn carve_room(map: &mut Map, room: &Room) {
    for y in room.y..=room.bottom() {
        for x in room.x..=room.right() {
            map.set_tile(Pos { y: y as i32, x: x as i32 }, Tile::Floor);
        }
    }
}
