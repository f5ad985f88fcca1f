use slotmap::new_key_type;

use serde::{Deserialize, Serialize};

new_key_type! {
    pub struct EntityId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn manhattan(self, other: Pos) -> u32 {
        self.y.abs_diff(other.y) + self.x.abs_diff(other.x)
    }

    pub fn chebyshev(self, other: Pos) -> u32 {
        self.y.abs_diff(other.y).max(self.x.abs_diff(other.x))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tile {
    Wall,
    Floor,
    Door { open: bool },
    StairsDown,
    StairsUp,
}

impl Tile {
    /// Stable byte code used by the flat serialization boundary.
    pub fn code(self) -> u8 {
        match self {
            Tile::Wall => 0,
            Tile::Floor => 1,
            Tile::Door { open: false } => 2,
            Tile::Door { open: true } => 3,
            Tile::StairsDown => 4,
            Tile::StairsUp => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Tile> {
        match code {
            0 => Some(Tile::Wall),
            1 => Some(Tile::Floor),
            2 => Some(Tile::Door { open: false }),
            3 => Some(Tile::Door { open: true }),
            4 => Some(Tile::StairsDown),
            5 => Some(Tile::StairsUp),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BehaviorTag {
    Aggressive,
    Cautious,
    Pack,
    Ambush,
    Boss,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    pub attack: i32,
    pub defense: i32,
    pub magic_attack: i32,
    pub magic_defense: i32,
    pub crit_chance: f32,
    pub evasion: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Stun,
    Slow,
    Poison,
    Bleed,
    Mark,
    Veiled,
    Guard,
    Absorb,
    Nimble,
}

impl StatusKind {
    /// Poison and bleed deal their magnitude as damage each tick.
    pub fn is_damage_over_time(self) -> bool {
        matches!(self, StatusKind::Poison | StatusKind::Bleed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub remaining_turns: u32,
    pub magnitude: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangedProfile {
    pub max_range: u32,
    pub prefers_melee: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillKey {
    HeavyStrike,
    PiercingBolt,
    StunningBlow,
    Hamstring,
    MarkPrey,
    ShadowVeil,
    ArcaneBurst,
}

/// One queued player input for a tick. Targets are grid positions rather than
/// entity ids so journaled actions stay meaningful across replays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    Wait,
    Move(Pos),
    Attack { target: Pos },
    Skill { key: SkillKey, target: Pos },
}

/// What one enemy does with its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Attack,
    RangedAttack,
    Move(Pos),
    Wait,
    Stunned,
    Slowed,
    Perish,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionRejection {
    PlayerStunned,
    NotAdjacent,
    BlockedTile,
    TileOccupied,
    NoTarget,
    TargetOutOfRange,
    NoLineOfSight,
    NotEnoughMana,
    SkillOnCooldown,
    UnknownSkill,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Victory,
    Defeat,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickEvent {
    PlayerMoved { from: Pos, to: Pos },
    DoorOpened { pos: Pos },
    PlayerStruck { target: EntityId, damage: i32, evaded: bool, crit: bool },
    PlayerCast { key: SkillKey, target: EntityId, damage: i32, evaded: bool, applied: Option<StatusKind> },
    EnemyMoved { enemy: EntityId, from: Pos, to: Pos },
    EnemyStruck { enemy: EntityId, damage: i32, evaded: bool, crit: bool },
    EnemyShot { enemy: EntityId, damage: i32, evaded: bool, crit: bool },
    EnemyHeld { enemy: EntityId, kind: StatusKind },
    StatusDamage { entity: EntityId, damage: i32 },
    StatusExpired { entity: EntityId, kind: StatusKind },
}

/// On-death data handed back to the caller; exp grants and loot rolls are the
/// caller's side of the contract.
#[derive(Clone, Debug, PartialEq)]
pub struct DeathReport {
    pub entity: EntityId,
    pub archetype: &'static str,
    pub pos: Pos,
    pub exp_reward: i32,
    pub was_boss: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickResult {
    pub turn: u64,
    pub events: Vec<TickEvent>,
    pub deaths: Vec<DeathReport>,
    pub rejection: Option<ActionRejection>,
    pub outcome: Option<RunOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_codes_round_trip() {
        let tiles = [
            Tile::Wall,
            Tile::Floor,
            Tile::Door { open: false },
            Tile::Door { open: true },
            Tile::StairsDown,
            Tile::StairsUp,
        ];
        for tile in tiles {
            assert_eq!(Tile::from_code(tile.code()), Some(tile));
        }
        assert_eq!(Tile::from_code(6), None);
    }
}
