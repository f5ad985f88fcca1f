use serde::{Deserialize, Serialize};

use crate::mapgen::GenerationConfig;
use crate::state::PlayerConfig;
use crate::types::PlayerAction;

/// Everything needed to reproduce a run: the seed and configs that built the
/// dungeon, and every player action in order. Actions target positions, not
/// entity ids, so records stay stable across regenerated runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunJournal {
    pub format_version: u16,
    pub seed: u64,
    pub config: GenerationConfig,
    pub player: PlayerConfig,
    pub actions: Vec<ActionRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub seq: u64,
    pub action: PlayerAction,
}

impl RunJournal {
    pub fn new(seed: u64, config: GenerationConfig, player: PlayerConfig) -> Self {
        Self { format_version: 1, seed, config, player, actions: Vec::new() }
    }

    /// Appends the next action, numbering it after the last record.
    pub fn append(&mut self, action: PlayerAction) {
        let seq = self.actions.len() as u64;
        self.actions.push(ActionRecord { seq, action });
    }
}
