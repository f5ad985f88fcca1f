//! Flat persistence boundary for a mid-run dungeon.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::content::ContentPack;
use crate::state::{DungeonState, Entity, Map, PLAYER_ARCHETYPE};
use crate::types::*;

#[derive(Debug, PartialEq, Eq)]
pub enum SnapshotError {
    TileCountMismatch { expected: usize, actual: usize },
    UnknownTileCode(u8),
    UnknownArchetype(String),
    NoPlayer,
    MultiplePlayers,
}

/// One entity flattened to plain data. The archetype travels as a string
/// key and is resolved against the content pack on restore.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub archetype: String,
    pub is_player: bool,
    pub pos: Pos,
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub stats: StatBlock,
    pub behavior: Option<BehaviorTag>,
    pub ranged: Option<RangedProfile>,
    pub statuses: Vec<StatusEffect>,
    pub slow_phase: bool,
    pub is_boss: bool,
    pub exp_reward: i32,
}

/// Serializable view of a whole [`DungeonState`]: tile codes row by row plus
/// entity records in live iteration order. Restoring re-inserts the records
/// in that same order, so a restored state walks its enemies exactly as the
/// captured one did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DungeonSnapshot {
    pub format_version: u16,
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<u8>,
    pub turn: u64,
    pub dungeon_level: u32,
    pub stairs_down: Pos,
    pub stairs_up: Option<Pos>,
    pub cooldowns: BTreeMap<SkillKey, u32>,
    pub entities: Vec<EntityRecord>,
}

impl DungeonSnapshot {
    pub fn capture(state: &DungeonState) -> Self {
        let entities = state
            .entities
            .iter()
            .map(|(id, entity)| EntityRecord {
                archetype: entity.archetype.to_string(),
                is_player: id == state.player_id,
                pos: entity.pos,
                hp: entity.hp,
                max_hp: entity.max_hp,
                mp: entity.mp,
                max_mp: entity.max_mp,
                stats: entity.stats,
                behavior: entity.behavior,
                ranged: entity.ranged,
                statuses: entity.statuses.clone(),
                slow_phase: entity.slow_phase,
                is_boss: entity.is_boss,
                exp_reward: entity.exp_reward,
            })
            .collect();

        Self {
            format_version: 1,
            width: state.map.width,
            height: state.map.height,
            tiles: state.map.tiles.iter().map(|tile| tile.code()).collect(),
            turn: state.turn,
            dungeon_level: state.dungeon_level,
            stairs_down: state.stairs_down,
            stairs_up: state.stairs_up,
            cooldowns: state.cooldowns.clone(),
            entities,
        }
    }

    pub fn restore(&self, content: &ContentPack) -> Result<DungeonState, SnapshotError> {
        if self.tiles.len() != self.width * self.height {
            return Err(SnapshotError::TileCountMismatch {
                expected: self.width * self.height,
                actual: self.tiles.len(),
            });
        }
        let mut tiles = Vec::with_capacity(self.tiles.len());
        for code in &self.tiles {
            tiles.push(Tile::from_code(*code).ok_or(SnapshotError::UnknownTileCode(*code))?);
        }
        let map = Map { width: self.width, height: self.height, tiles };

        let mut entities: SlotMap<EntityId, Entity> = SlotMap::with_key();
        let mut player_id = None;
        for record in &self.entities {
            let archetype = if record.is_player {
                PLAYER_ARCHETYPE
            } else {
                content
                    .archetype(&record.archetype)
                    .ok_or_else(|| SnapshotError::UnknownArchetype(record.archetype.clone()))?
                    .key
            };
            let id = entities.insert_with_key(|id| Entity {
                id,
                archetype,
                pos: record.pos,
                hp: record.hp,
                max_hp: record.max_hp,
                mp: record.mp,
                max_mp: record.max_mp,
                stats: record.stats,
                behavior: record.behavior,
                ranged: record.ranged,
                statuses: record.statuses.clone(),
                slow_phase: record.slow_phase,
                is_boss: record.is_boss,
                exp_reward: record.exp_reward,
            });
            if record.is_player {
                if player_id.is_some() {
                    return Err(SnapshotError::MultiplePlayers);
                }
                player_id = Some(id);
            }
        }
        let player_id = player_id.ok_or(SnapshotError::NoPlayer)?;

        Ok(DungeonState {
            map,
            entities,
            player_id,
            turn: self.turn,
            dungeon_level: self.dungeon_level,
            stairs_down: self.stairs_down,
            stairs_up: self.stairs_up,
            cooldowns: self.cooldowns.clone(),
        })
    }
}
