//! Runtime simulation layer that plays out on a generated dungeon.
//! This file wires the focused game submodules together.

use crate::types::*;

pub mod ai;
pub mod combat;
pub mod engine;
pub mod pathfinding;
pub mod visibility;

#[cfg(test)]
mod test_support;
