pub mod content;
pub mod game;
pub mod journal;
pub mod mapgen;
pub mod replay;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod types;

pub use content::{
    ContentError, ContentPack, EnemyArchetype, SkillKind, SkillSpec, StatusApplication,
};
pub use game::ai::{NearbyEnemy, decide};
pub use game::combat::{AttackOutcome, SkillOutcome, resolve_melee, resolve_ranged, resolve_skill};
pub use game::engine::tick;
pub use game::pathfinding::next_step;
pub use game::visibility::has_line_of_sight;
pub use journal::{ActionRecord, RunJournal};
pub use mapgen::{
    ConnectivityReport, GenerateError, GeneratedDungeon, GenerationConfig, generate_dungeon,
};
pub use replay::*;
pub use rng::{RandomSource, derive_stream};
pub use snapshot::{DungeonSnapshot, SnapshotError};
pub use state::{DungeonState, Entity, Map, PLAYER_ARCHETYPE, PlayerConfig};
pub use types::*;
