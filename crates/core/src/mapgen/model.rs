//! Public data models for generation input and output.

use serde::{Deserialize, Serialize};

use crate::state::{Entity, Map};
use crate::types::{BehaviorTag, EntityId, Pos, RangedProfile, StatBlock};

use super::rooms::{Room, RoomKind};

pub const MIN_WIDTH: usize = 24;
pub const MIN_HEIGHT: usize = 18;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub width: usize,
    pub height: usize,
    pub dungeon_level: u32,
    pub player_level: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum GenerateError {
    /// The requested grid cannot fit the hall phase.
    MapTooSmall { width: usize, height: usize },
    /// Every retry produced a degenerate layout.
    TooFewRooms,
}

/// How the corridor repair pass ended. A false `fully_connected` means some
/// room center stayed unreachable after the bounded number of passes; the
/// layout is still usable, callers decide whether to keep it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub fully_connected: bool,
    pub repair_passes: u32,
}

/// A placed, scaled enemy waiting to become a live entity.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySeed {
    pub archetype_key: &'static str,
    pub pos: Pos,
    pub hp: i32,
    pub mp: i32,
    pub stats: StatBlock,
    pub behavior: BehaviorTag,
    pub ranged: Option<RangedProfile>,
    pub exp_reward: i32,
    pub is_boss: bool,
}

impl EnemySeed {
    pub fn into_entity(self, id: EntityId) -> Entity {
        Entity {
            id,
            archetype: self.archetype_key,
            pos: self.pos,
            hp: self.hp,
            max_hp: self.hp,
            mp: self.mp,
            max_mp: self.mp,
            stats: self.stats,
            behavior: Some(self.behavior),
            ranged: self.ranged,
            statuses: Vec::new(),
            slow_phase: false,
            is_boss: self.is_boss,
            exp_reward: self.exp_reward,
        }
    }

    fn write_canonical(&self, bytes: &mut Vec<u8>) {
        bytes.extend((self.archetype_key.len() as u32).to_le_bytes());
        bytes.extend(self.archetype_key.as_bytes());
        bytes.extend(self.pos.y.to_le_bytes());
        bytes.extend(self.pos.x.to_le_bytes());
        bytes.extend(self.hp.to_le_bytes());
        bytes.extend(self.mp.to_le_bytes());
        bytes.extend(self.stats.attack.to_le_bytes());
        bytes.extend(self.stats.defense.to_le_bytes());
        bytes.extend(self.stats.magic_attack.to_le_bytes());
        bytes.extend(self.stats.magic_defense.to_le_bytes());
        bytes.extend(self.stats.crit_chance.to_bits().to_le_bytes());
        bytes.extend(self.stats.evasion.to_bits().to_le_bytes());
        bytes.push(self.behavior as u8);
        match self.ranged {
            None => bytes.push(0),
            Some(profile) => {
                bytes.push(1);
                bytes.extend(profile.max_range.to_le_bytes());
                bytes.push(u8::from(profile.prefers_melee));
            }
        }
        bytes.extend(self.exp_reward.to_le_bytes());
        bytes.push(u8::from(self.is_boss));
    }
}

pub struct GeneratedDungeon {
    pub map: Map,
    pub rooms: Vec<Room>,
    pub enemies: Vec<EnemySeed>,
    pub boss: EnemySeed,
    pub player_spawn: Pos,
    pub stairs_down: Pos,
    pub stairs_up: Option<Pos>,
    pub connectivity: ConnectivityReport,
    pub dungeon_level: u32,
}

impl GeneratedDungeon {
    /// Stable little-endian serialization of everything generation decided,
    /// used to fingerprint output across runs.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.map.width as u32).to_le_bytes());
        bytes.extend((self.map.height as u32).to_le_bytes());
        for tile in &self.map.tiles {
            bytes.push(tile.code());
        }
        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            bytes.extend((room.x as u32).to_le_bytes());
            bytes.extend((room.y as u32).to_le_bytes());
            bytes.extend((room.width as u32).to_le_bytes());
            bytes.extend((room.height as u32).to_le_bytes());
            bytes.push(match room.kind {
                RoomKind::Hall => 0,
                RoomKind::Chamber => 1,
            });
        }
        bytes.extend(self.player_spawn.y.to_le_bytes());
        bytes.extend(self.player_spawn.x.to_le_bytes());
        bytes.extend(self.stairs_down.y.to_le_bytes());
        bytes.extend(self.stairs_down.x.to_le_bytes());
        match self.stairs_up {
            None => bytes.push(0),
            Some(up) => {
                bytes.push(1);
                bytes.extend(up.y.to_le_bytes());
                bytes.extend(up.x.to_le_bytes());
            }
        }

        bytes.extend((self.enemies.len() as u32).to_le_bytes());
        for seed in self.enemies.iter().chain(std::iter::once(&self.boss)) {
            seed.write_canonical(&mut bytes);
        }

        bytes.push(u8::from(self.connectivity.fully_connected));
        bytes.extend(self.connectivity.repair_passes.to_le_bytes());
        bytes.extend(self.dungeon_level.to_le_bytes());
        bytes
    }
}
