use std::collections::BTreeMap;
use std::hash::Hasher;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use xxhash_rust::xxh3::Xxh3;

use crate::mapgen::GeneratedDungeon;
use crate::types::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Map {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<Tile>,
}

impl Map {
    /// Starts fully walled; generation carves floors out of the rock.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, tiles: vec![Tile::Wall; width * height] }
    }

    pub fn tile_at(&self, pos: Pos) -> Tile {
        if pos.x < 0 || pos.y < 0 {
            return Tile::Wall;
        }
        let xu = pos.x as usize;
        let yu = pos.y as usize;
        if xu >= self.width || yu >= self.height {
            return Tile::Wall;
        }
        self.tiles[yu * self.width + xu]
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height
    }

    pub fn set_tile(&mut self, pos: Pos, tile: Tile) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.tiles[idx] = tile;
    }

    /// Anything the player can step onto or through. Doors count; enemies
    /// apply their own stricter tile check.
    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.tile_at(pos) != Tile::Wall
    }

    /// Swings a closed door open. Returns whether anything changed.
    pub fn open_door(&mut self, pos: Pos) -> bool {
        if self.tile_at(pos) == (Tile::Door { open: false }) {
            self.set_tile(pos, Tile::Door { open: true });
            return true;
        }
        false
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub archetype: &'static str,
    pub pos: Pos,
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub stats: StatBlock,
    /// `None` for the player, who is driven by input rather than `ai::decide`.
    pub behavior: Option<BehaviorTag>,
    pub ranged: Option<RangedProfile>,
    pub statuses: Vec<StatusEffect>,
    /// Alternation flag while slowed; set on turns the entity sits out.
    pub slow_phase: bool,
    pub is_boss: bool,
    pub exp_reward: i32,
}

impl Entity {
    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.statuses.iter().any(|effect| effect.kind == kind)
    }

    /// Longest remaining duration among effects of this kind.
    pub fn status_turns(&self, kind: StatusKind) -> u32 {
        self.statuses
            .iter()
            .filter(|effect| effect.kind == kind)
            .map(|effect| effect.remaining_turns)
            .max()
            .unwrap_or(0)
    }

    /// Combined magnitude across stacked effects of this kind.
    pub fn status_magnitude(&self, kind: StatusKind) -> i32 {
        self.statuses
            .iter()
            .filter(|effect| effect.kind == kind)
            .map(|effect| effect.magnitude)
            .sum()
    }

    pub fn add_status(&mut self, effect: StatusEffect) {
        self.statuses.push(effect);
    }

    /// Spends one turn off the first effect of this kind, dropping it at zero.
    pub fn tick_down_status(&mut self, kind: StatusKind) {
        if let Some(index) = self.statuses.iter().position(|effect| effect.kind == kind) {
            let effect = &mut self.statuses[index];
            effect.remaining_turns = effect.remaining_turns.saturating_sub(1);
            if effect.remaining_turns == 0 {
                self.statuses.remove(index);
            }
        }
    }

    /// Applies damage-over-time, then spends a turn off every status whose
    /// kind is not in `handled`, dropping expired ones. Returns the damage
    /// dealt and the kinds that ran out.
    pub fn tick_statuses(&mut self, handled: &[StatusKind]) -> (i32, Vec<StatusKind>) {
        let dot_damage: i32 = self
            .statuses
            .iter()
            .filter(|effect| {
                effect.kind.is_damage_over_time() && !handled.contains(&effect.kind)
            })
            .map(|effect| effect.magnitude)
            .sum();
        self.apply_damage(dot_damage);

        let mut expired = Vec::new();
        self.statuses.retain_mut(|effect| {
            if handled.contains(&effect.kind) {
                return true;
            }
            effect.remaining_turns = effect.remaining_turns.saturating_sub(1);
            if effect.remaining_turns == 0 {
                expired.push(effect.kind);
                return false;
            }
            true
        });
        (dot_damage, expired)
    }

    /// Hp stays clamped to `[0, max_hp]`.
    pub fn apply_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).clamp(0, self.max_hp);
    }
}

/// Starting loadout for the player; owned by the caller and recorded in the
/// run journal so replays rebuild the same entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub hp: i32,
    pub mp: i32,
    pub stats: StatBlock,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            hp: 30,
            mp: 20,
            stats: StatBlock {
                attack: 6,
                defense: 2,
                magic_attack: 5,
                magic_defense: 2,
                crit_chance: 0.10,
                evasion: 0.05,
            },
        }
    }
}

pub const PLAYER_ARCHETYPE: &str = "player";

#[derive(Debug)]
pub struct DungeonState {
    pub map: Map,
    pub entities: SlotMap<EntityId, Entity>,
    pub player_id: EntityId,
    pub turn: u64,
    pub dungeon_level: u32,
    pub stairs_down: Pos,
    pub stairs_up: Option<Pos>,
    /// Remaining cooldown turns per player skill; absent means ready.
    pub cooldowns: BTreeMap<SkillKey, u32>,
}

/// Field-wise equality; `SlotMap` has no `PartialEq` impl, so entities are
/// compared as (id, entity) pairs in slot order.
impl PartialEq for DungeonState {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
            && self.entities.iter().eq(other.entities.iter())
            && self.player_id == other.player_id
            && self.turn == other.turn
            && self.dungeon_level == other.dungeon_level
            && self.stairs_down == other.stairs_down
            && self.stairs_up == other.stairs_up
            && self.cooldowns == other.cooldowns
    }
}

impl DungeonState {
    /// Builds the live simulation state from a generated dungeon. The player
    /// enters at the first room's center; insertion order (player, boss,
    /// scattered enemies) fixes the enemy turn order for the whole run.
    pub fn new(dungeon: GeneratedDungeon, player: &PlayerConfig) -> Self {
        let spawn = dungeon.player_spawn;
        let mut entities: SlotMap<EntityId, Entity> = SlotMap::with_key();
        let player_id = entities.insert_with_key(|id| Entity {
            id,
            archetype: PLAYER_ARCHETYPE,
            pos: spawn,
            hp: player.hp,
            max_hp: player.hp,
            mp: player.mp,
            max_mp: player.mp,
            stats: player.stats,
            behavior: None,
            ranged: None,
            statuses: Vec::new(),
            slow_phase: false,
            is_boss: false,
            exp_reward: 0,
        });
        entities.insert_with_key(|id| dungeon.boss.into_entity(id));
        for seed in dungeon.enemies {
            entities.insert_with_key(|id| seed.into_entity(id));
        }
        Self {
            map: dungeon.map,
            entities,
            player_id,
            turn: 0,
            dungeon_level: dungeon.dungeon_level,
            stairs_down: dungeon.stairs_down,
            stairs_up: dungeon.stairs_up,
            cooldowns: BTreeMap::new(),
        }
    }

    pub fn player(&self) -> &Entity {
        &self.entities[self.player_id]
    }

    pub fn entity_at(&self, pos: Pos) -> Option<EntityId> {
        self.entities.iter().find(|(_, entity)| entity.pos == pos).map(|(id, _)| id)
    }

    /// Stable fingerprint of everything the simulation can observe, used to
    /// compare replays against live runs.
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.turn);
        hasher.write_u32(self.dungeon_level);
        hasher.write_usize(self.map.width);
        hasher.write_usize(self.map.height);
        for tile in &self.map.tiles {
            hasher.write_u8(tile.code());
        }
        hasher.write_i32(self.stairs_down.x);
        hasher.write_i32(self.stairs_down.y);
        if let Some(up) = self.stairs_up {
            hasher.write_i32(up.x);
            hasher.write_i32(up.y);
        }
        for (key, remaining) in &self.cooldowns {
            hasher.write_u8(*key as u8);
            hasher.write_u32(*remaining);
        }
        for (_, entity) in &self.entities {
            hasher.write(entity.archetype.as_bytes());
            hasher.write_i32(entity.pos.x);
            hasher.write_i32(entity.pos.y);
            hasher.write_i32(entity.hp);
            hasher.write_i32(entity.mp);
            hasher.write_u8(u8::from(entity.slow_phase));
            for effect in &entity.statuses {
                hasher.write_u8(effect.kind as u8);
                hasher.write_u32(effect.remaining_turns);
                hasher.write_i32(effect.magnitude);
            }
        }
        hasher.finish()
    }
}
