//! Procedural dungeon generation split into coherent submodules.

pub mod model;

mod corridors;
mod doors;
mod rooms;
mod spawns;

pub use model::{
    ConnectivityReport, EnemySeed, GenerateError, GeneratedDungeon, GenerationConfig, MIN_HEIGHT,
    MIN_WIDTH,
};
pub use rooms::{Room, RoomKind};

use crate::content::ContentPack;
use crate::rng::{RandomSource, derive_stream};
use crate::state::Map;
use crate::types::Tile;

const GENERATION_ATTEMPTS: u64 = 8;

/// Builds a complete level: rooms, corridors, repair, doors, stairs, and a
/// scaled enemy population. Degenerate layouts are retried with freshly
/// derived seeds before giving up.
pub fn generate_dungeon(
    config: GenerationConfig,
    content: &ContentPack,
    seed: u64,
) -> Result<GeneratedDungeon, GenerateError> {
    if config.width < MIN_WIDTH || config.height < MIN_HEIGHT {
        return Err(GenerateError::MapTooSmall { width: config.width, height: config.height });
    }
    for attempt in 0..GENERATION_ATTEMPTS {
        let mut rng = RandomSource::from_seed(derive_stream(seed, attempt));
        if let Some(dungeon) = try_generate(config, content, &mut rng) {
            return Ok(dungeon);
        }
    }
    Err(GenerateError::TooFewRooms)
}

fn try_generate(
    config: GenerationConfig,
    content: &ContentPack,
    rng: &mut RandomSource,
) -> Option<GeneratedDungeon> {
    let mut map = Map::new(config.width, config.height);
    let rooms = rooms::place_rooms(&mut map, config.dungeon_level, rng);
    if rooms.len() < 2 {
        return None;
    }

    corridors::carve_corridors(&mut map, &rooms, rng);
    let connectivity = corridors::repair_connectivity(&mut map, &rooms, rng);
    doors::place_doors(&mut map, &rooms, rng);

    let entry = rooms[0].center();
    let exit = rooms[rooms.len() - 1].center();
    if entry == exit {
        return None;
    }
    map.set_tile(exit, Tile::StairsDown);
    let stairs_up = if config.dungeon_level > 1 {
        map.set_tile(entry, Tile::StairsUp);
        Some(entry)
    } else {
        None
    };

    let enemies = spawns::place_enemies(
        &map,
        &rooms,
        content,
        config.dungeon_level,
        config.player_level,
        rng,
    );
    let boss = spawns::place_boss(
        &map,
        &rooms,
        content,
        config.dungeon_level,
        config.player_level,
        exit,
        &enemies,
    );

    Some(GeneratedDungeon {
        map,
        rooms,
        enemies,
        boss,
        player_spawn: entry,
        stairs_down: exit,
        stairs_up,
        connectivity,
        dungeon_level: config.dungeon_level,
    })
}
