//! Corridor carving between rooms and the reachability repair pass.

use std::collections::{BTreeSet, VecDeque};

use crate::rng::RandomSource;
use crate::state::Map;
use crate::types::{Pos, Tile};

use super::model::ConnectivityReport;
use super::rooms::Room;

const MAX_REPAIR_PASSES: u32 = 10;

/// Joins each consecutive room pair with an L-shaped corridor, flipping the
/// bend orientation at random so the chains do not all look alike.
pub(super) fn carve_corridors(map: &mut Map, rooms: &[Room], rng: &mut RandomSource) {
    for pair in rooms.windows(2) {
        carve_l_corridor(map, pair[0].center(), pair[1].center(), rng.chance(0.5));
    }
}

pub(super) fn carve_l_corridor(map: &mut Map, start: Pos, end: Pos, horizontal_first: bool) {
    if horizontal_first {
        carve_horizontal_line(map, start.y, start.x, end.x);
        carve_vertical_line(map, end.x, start.y, end.y);
    } else {
        carve_vertical_line(map, start.x, start.y, end.y);
        carve_horizontal_line(map, end.y, start.x, end.x);
    }
}

fn carve_horizontal_line(map: &mut Map, y: i32, left_x: i32, right_x: i32) {
    let from_x = left_x.min(right_x);
    let to_x = left_x.max(right_x);
    for x in from_x..=to_x {
        carve_corridor_tile(map, Pos { y, x });
    }
}

fn carve_vertical_line(map: &mut Map, x: i32, top_y: i32, bottom_y: i32) {
    let from_y = top_y.min(bottom_y);
    let to_y = top_y.max(bottom_y);
    for y in from_y..=to_y {
        carve_corridor_tile(map, Pos { y, x });
    }
}

fn carve_corridor_tile(map: &mut Map, pos: Pos) {
    // Corridors never chew through the outer border.
    if pos.x <= 0 || pos.y <= 0 {
        return;
    }
    if pos.x as usize >= map.width - 1 || pos.y as usize >= map.height - 1 {
        return;
    }
    map.set_tile(pos, Tile::Floor);
}

/// 4-directional BFS over non-wall tiles.
pub(super) fn flood_fill(map: &Map, start: Pos) -> BTreeSet<Pos> {
    let mut reached = BTreeSet::new();
    if !map.is_walkable(start) {
        return reached;
    }
    let mut queue = VecDeque::new();
    reached.insert(start);
    queue.push_back(start);
    while let Some(current) = queue.pop_front() {
        let neighbors = [
            Pos { y: current.y - 1, x: current.x },
            Pos { y: current.y, x: current.x + 1 },
            Pos { y: current.y + 1, x: current.x },
            Pos { y: current.y, x: current.x - 1 },
        ];
        for neighbor in neighbors {
            if map.is_walkable(neighbor) && reached.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    reached
}

/// Bridges rooms whose centers the entry flood cannot reach, a bounded number
/// of times. A run that exhausts the passes reports `fully_connected: false`
/// and the layout is kept as is.
pub(super) fn repair_connectivity(
    map: &mut Map,
    rooms: &[Room],
    rng: &mut RandomSource,
) -> ConnectivityReport {
    let entry = rooms[0].center();
    let mut repair_passes = 0_u32;
    loop {
        let reached = flood_fill(map, entry);
        let unreached: Vec<&Room> =
            rooms.iter().filter(|room| !reached.contains(&room.center())).collect();
        if unreached.is_empty() {
            return ConnectivityReport { fully_connected: true, repair_passes };
        }
        if repair_passes >= MAX_REPAIR_PASSES {
            return ConnectivityReport { fully_connected: false, repair_passes };
        }
        repair_passes += 1;

        let reached_centers: Vec<Pos> =
            rooms.iter().map(|room| room.center()).filter(|center| reached.contains(center)).collect();
        for room in unreached {
            let center = room.center();
            map.set_tile(center, Tile::Floor);
            let nearest = reached_centers
                .iter()
                .copied()
                .min_by_key(|candidate| (candidate.manhattan(center), candidate.y, candidate.x))
                .expect("entry room center is always reached by its own flood");
            carve_l_corridor(map, center, nearest, rng.chance(0.5));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::rooms::RoomKind;

    fn room(x: usize, y: usize, width: usize, height: usize) -> Room {
        Room { x, y, width, height, kind: RoomKind::Chamber }
    }

    fn carve(map: &mut Map, room: &Room) {
        for y in room.y..=room.bottom() {
            for x in room.x..=room.right() {
                map.set_tile(Pos { y: y as i32, x: x as i32 }, Tile::Floor);
            }
        }
    }

    #[test]
    fn sequential_corridors_join_the_room_chain() {
        let mut map = Map::new(30, 20);
        let rooms = [room(2, 2, 5, 5), room(20, 2, 5, 5), room(12, 12, 5, 5)];
        for r in &rooms {
            carve(&mut map, r);
        }
        let mut rng = RandomSource::from_seed(5);
        carve_corridors(&mut map, &rooms, &mut rng);

        let reached = flood_fill(&map, rooms[0].center());
        for r in &rooms {
            assert!(reached.contains(&r.center()), "room center unreachable: {:?}", r.center());
        }
    }

    #[test]
    fn repair_bridges_an_isolated_room() {
        let mut map = Map::new(30, 20);
        let connected = [room(2, 2, 5, 5), room(10, 2, 5, 5)];
        let isolated = room(22, 12, 5, 5);
        for r in &connected {
            carve(&mut map, r);
        }
        carve(&mut map, &isolated);
        let mut rng = RandomSource::from_seed(9);
        carve_corridors(&mut map, &connected, &mut rng);

        let all_rooms = [connected[0], connected[1], isolated];
        let report = repair_connectivity(&mut map, &all_rooms, &mut rng);
        assert!(report.fully_connected);
        assert!(report.repair_passes >= 1, "the isolated room must cost at least one pass");
        let reached = flood_fill(&map, all_rooms[0].center());
        assert!(reached.contains(&isolated.center()));
    }

    #[test]
    fn already_connected_layouts_report_zero_passes() {
        let mut map = Map::new(30, 20);
        let rooms = [room(2, 2, 6, 6), room(12, 2, 6, 6)];
        for r in &rooms {
            carve(&mut map, r);
        }
        let mut rng = RandomSource::from_seed(3);
        carve_corridors(&mut map, &rooms, &mut rng);
        let report = repair_connectivity(&mut map, &rooms, &mut rng);
        assert_eq!(report, ConnectivityReport { fully_connected: true, repair_passes: 0 });
    }

    #[test]
    fn corridors_leave_the_border_intact() {
        let mut map = Map::new(30, 20);
        let rooms = [room(1, 1, 5, 5), room(24, 14, 5, 4)];
        for r in &rooms {
            carve(&mut map, r);
        }
        let mut rng = RandomSource::from_seed(11);
        carve_corridors(&mut map, &rooms, &mut rng);
        for x in 0..map.width as i32 {
            assert_eq!(map.tile_at(Pos { y: 0, x }), Tile::Wall);
            assert_eq!(map.tile_at(Pos { y: map.height as i32 - 1, x }), Tile::Wall);
        }
        for y in 0..map.height as i32 {
            assert_eq!(map.tile_at(Pos { y, x: 0 }), Tile::Wall);
            assert_eq!(map.tile_at(Pos { y, x: map.width as i32 - 1 }), Tile::Wall);
        }
    }
}
