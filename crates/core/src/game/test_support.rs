//! Shared test fixtures for the `game` submodule test suites.
//! This module exists to avoid repeating map and entity setup across many tests.
//! It does not own production gameplay logic.

use std::collections::BTreeMap;

use slotmap::SlotMap;

use super::*;
use crate::state::{DungeonState, Entity, Map, PLAYER_ARCHETYPE};

/// Map whose interior is all floor with a one tile wall rim.
pub(super) fn open_arena(width: usize, height: usize) -> Map {
    let mut map = Map::new(width, height);
    for y in 1..(height as i32 - 1) {
        for x in 1..(width as i32 - 1) {
            map.set_tile(Pos { y, x }, Tile::Floor);
        }
    }
    map
}

/// Player entity with flat stats. Crit and evasion stay zero so combat
/// assertions only range over the explicit damage roll.
pub(super) fn player_at(pos: Pos) -> Entity {
    Entity {
        id: EntityId::default(),
        archetype: PLAYER_ARCHETYPE,
        pos,
        hp: 30,
        max_hp: 30,
        mp: 20,
        max_mp: 20,
        stats: StatBlock {
            attack: 6,
            defense: 2,
            magic_attack: 5,
            magic_defense: 2,
            crit_chance: 0.0,
            evasion: 0.0,
        },
        behavior: None,
        ranged: None,
        statuses: Vec::new(),
        slow_phase: false,
        is_boss: false,
        exp_reward: 0,
    }
}

/// Melee enemy with flat stats and the given behavior tag.
pub(super) fn enemy_at(pos: Pos, behavior: BehaviorTag) -> Entity {
    Entity {
        id: EntityId::default(),
        archetype: "drill-dummy",
        pos,
        hp: 12,
        max_hp: 12,
        mp: 0,
        max_mp: 0,
        stats: StatBlock {
            attack: 4,
            defense: 1,
            magic_attack: 0,
            magic_defense: 0,
            crit_chance: 0.0,
            evasion: 0.0,
        },
        behavior: Some(behavior),
        ranged: None,
        statuses: Vec::new(),
        slow_phase: false,
        is_boss: false,
        exp_reward: 5,
    }
}

/// Ranged variant of [`enemy_at`].
pub(super) fn archer_at(
    pos: Pos,
    behavior: BehaviorTag,
    max_range: u32,
    prefers_melee: bool,
) -> Entity {
    let mut entity = enemy_at(pos, behavior);
    entity.archetype = "drill-archer";
    entity.ranged = Some(RangedProfile { max_range, prefers_melee });
    entity
}

/// Dungeon state holding just the player on an open arena.
pub(super) fn arena_state(width: usize, height: usize) -> DungeonState {
    let map = open_arena(width, height);
    let mut entities: SlotMap<EntityId, Entity> = SlotMap::with_key();
    let center = Pos { y: height as i32 / 2, x: width as i32 / 2 };
    let player_id = entities.insert_with_key(|id| {
        let mut player = player_at(center);
        player.id = id;
        player
    });

    DungeonState {
        map,
        entities,
        player_id,
        turn: 0,
        dungeon_level: 1,
        stairs_down: Pos { y: 1, x: 1 },
        stairs_up: None,
        cooldowns: BTreeMap::new(),
    }
}

/// Inserts `entity` into `state` and fixes up its id.
pub(super) fn spawn(state: &mut DungeonState, mut entity: Entity) -> EntityId {
    state.entities.insert_with_key(|id| {
        entity.id = id;
        entity
    })
}
