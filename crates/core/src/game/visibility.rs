//! Line-of-sight between grid cells for ranged attacks and skill targeting.
//! This module exists to keep sight rules deterministic and isolated.
//! It does not own movement planning or combat resolution.

use super::*;
use crate::state::Map;

/// Whether a straight sightline from `from` to `to` crosses no wall.
///
/// The ray walks one axis at a time, stepping both at once on an exact
/// diagonal tie, and never tests the two endpoint tiles themselves. Only
/// walls block; door thresholds are see-through in either state.
pub fn has_line_of_sight(map: &Map, from: Pos, to: Pos) -> bool {
    let delta_x = to.x - from.x;
    let delta_y = to.y - from.y;
    let step_x = delta_x.signum();
    let step_y = delta_y.signum();
    let total_dist_x = delta_x.abs();
    let total_dist_y = delta_y.abs();

    let mut x = from.x;
    let mut y = from.y;
    let mut current_step_x = 0;
    let mut current_step_y = 0;

    while current_step_x < total_dist_x || current_step_y < total_dist_y {
        let lhs = (1 + 2 * current_step_x) * total_dist_y;
        let rhs = (1 + 2 * current_step_y) * total_dist_x;
        if lhs == rhs {
            x += step_x;
            y += step_y;
            current_step_x += 1;
            current_step_y += 1;
        } else if lhs < rhs {
            x += step_x;
            current_step_x += 1;
        } else {
            y += step_y;
            current_step_y += 1;
        }

        if x == to.x && y == to.y {
            break;
        }
        if map.tile_at(Pos { y, x }) == Tile::Wall {
            return false;
        }
    }

    true
}
