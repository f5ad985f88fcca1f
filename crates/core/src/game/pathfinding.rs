//! Deterministic single-step A* used by enemy movement and tooling.
//! This module exists so every mover shares one set of navigation rules.
//! It does not own behavior policy or the rules for who may enter a tile.

use std::collections::{BTreeMap, BTreeSet};

use super::*;
use crate::state::Map;

/// Hard cap on node expansions per query. Searches that blow past it give up
/// and report the target as unreachable.
const SEARCH_BUDGET: usize = 2000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    y: i32,
    x: i32,
}

/// One A* step from `start` toward `target`, or `None` when the two already
/// coincide or no route resolves within the search budget.
///
/// The frontier is a `BTreeSet` ordered by `(f, h, y, x)`, so ties always
/// break the same way and the returned step is a pure function of the map.
/// The target tile itself is treated as enterable even when it is a wall,
/// which keeps searches aimed at an occupant of that tile resolvable.
pub fn next_step(start: Pos, target: Pos, map: &Map) -> Option<Pos> {
    if start == target {
        return None;
    }

    let mut open_set: BTreeSet<OpenNode> = BTreeSet::new();
    let mut came_from: BTreeMap<Pos, Pos> = BTreeMap::new();
    let mut g_score: BTreeMap<Pos, u32> = BTreeMap::new();

    let start_h = start.manhattan(target);
    open_set.insert(OpenNode { f: start_h, h: start_h, y: start.y, x: start.x });
    g_score.insert(start, 0);

    let mut expanded = 0usize;
    while let Some(current) = open_set.pop_first() {
        expanded += 1;
        if expanded > SEARCH_BUDGET {
            return None;
        }

        let pos = Pos { y: current.y, x: current.x };
        if pos == target {
            return Some(first_step(&came_from, start, target));
        }

        let current_g = *g_score.get(&pos).expect("expanded node must have a g-score");
        for neighbor in neighbors(pos) {
            if !traversable(map, neighbor, target) {
                continue;
            }
            let tentative = current_g + 1;
            if tentative < g_score.get(&neighbor).copied().unwrap_or(u32::MAX) {
                came_from.insert(neighbor, pos);
                g_score.insert(neighbor, tentative);
                let h = neighbor.manhattan(target);
                open_set.insert(OpenNode { f: tentative + h, h, y: neighbor.y, x: neighbor.x });
            }
        }
    }

    None
}

/// Walks the `came_from` chain back from `goal` and returns the tile right
/// after `start`.
fn first_step(came_from: &BTreeMap<Pos, Pos>, start: Pos, goal: Pos) -> Pos {
    let mut cursor = goal;
    loop {
        let previous = *came_from.get(&cursor).expect("path must be reconstructible");
        if previous == start {
            return cursor;
        }
        cursor = previous;
    }
}

fn traversable(map: &Map, pos: Pos, target: Pos) -> bool {
    pos == target || map.tile_at(pos) != Tile::Wall
}

/// Cardinal neighbors in fixed N, E, S, W order.
fn neighbors(p: Pos) -> [Pos; 4] {
    [
        Pos { y: p.y - 1, x: p.x },
        Pos { y: p.y, x: p.x + 1 },
        Pos { y: p.y + 1, x: p.x },
        Pos { y: p.y, x: p.x - 1 },
    ]
}

#[cfg(test)]
mod tests {
    #![allow(unused_imports)]

    use super::*;
    use crate::game::test_support::*;
    use crate::*;

    #[test]
    fn straight_corridor_yields_the_adjacent_tile() {
        let mut map = Map::new(10, 7);
        for x in 1..=8 {
            map.set_tile(Pos { y: 3, x }, Tile::Floor);
        }

        let step = next_step(Pos { y: 3, x: 2 }, Pos { y: 3, x: 7 }, &map);
        assert_eq!(step, Some(Pos { y: 3, x: 3 }));
    }

    #[test]
    fn reaching_the_tile_already_stood_on_needs_no_step() {
        let map = open_arena(8, 8);
        assert_eq!(next_step(Pos { y: 4, x: 4 }, Pos { y: 4, x: 4 }, &map), None);
    }

    #[test]
    fn sealed_off_targets_are_unreachable() {
        let mut map = open_arena(12, 12);
        // Box in the target with walls on all four sides.
        let target = Pos { y: 5, x: 8 };
        for (dy, dx) in [(-1, 0), (0, 1), (1, 0), (0, -1)] {
            map.set_tile(Pos { y: target.y + dy, x: target.x + dx }, Tile::Wall);
        }

        assert_eq!(next_step(Pos { y: 5, x: 2 }, target, &map), None);
    }

    #[test]
    fn detours_around_a_wall_break_ties_the_same_way_every_time() {
        let mut map = open_arena(7, 7);
        map.set_tile(Pos { y: 3, x: 3 }, Tile::Wall);

        // Both the northern and southern detour cost the same. The ordered
        // frontier always expands the lower y first.
        let step = next_step(Pos { y: 3, x: 2 }, Pos { y: 3, x: 4 }, &map);
        assert_eq!(step, Some(Pos { y: 2, x: 2 }));
    }

    #[test]
    fn a_walled_target_tile_is_still_reachable() {
        let mut map = Map::new(10, 7);
        for x in 1..=6 {
            map.set_tile(Pos { y: 3, x }, Tile::Floor);
        }

        // The tile past the corridor end stays a wall, yet a search aimed at
        // it resolves because the target tile is exempt from the wall check.
        let step = next_step(Pos { y: 3, x: 2 }, Pos { y: 3, x: 7 }, &map);
        assert_eq!(step, Some(Pos { y: 3, x: 3 }));
    }

    #[test]
    fn doors_do_not_stop_the_search() {
        let mut map = Map::new(10, 7);
        for x in 1..=8 {
            map.set_tile(Pos { y: 3, x }, Tile::Floor);
        }
        map.set_tile(Pos { y: 3, x: 5 }, Tile::Door { open: false });

        let step = next_step(Pos { y: 3, x: 2 }, Pos { y: 3, x: 8 }, &map);
        assert_eq!(step, Some(Pos { y: 3, x: 3 }));
    }
}
