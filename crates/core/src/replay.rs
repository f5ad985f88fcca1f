use crate::{
    content::ContentPack,
    game::engine,
    journal::RunJournal,
    mapgen::{GenerateError, generate_dungeon},
    rng::{RandomSource, derive_stream},
    state::DungeonState,
    types::RunOutcome,
};

/// Stream tag for the runtime action rng, well clear of the generation
/// attempt tags.
const SIM_STREAM: u64 = 100;

#[derive(Debug, PartialEq)]
pub enum ReplayError {
    Generation(GenerateError),
    OutOfOrderRecord { seq: u64, expected: u64 },
    ActionAfterEnd { seq: u64 },
}

#[derive(Debug, PartialEq)]
pub struct ReplayOutcome {
    pub final_turn: u64,
    pub snapshot_hash: u64,
    pub outcome: Option<RunOutcome>,
}

/// Seeds a fresh rng for the runtime action stream of a run. Live drivers
/// and replays must draw from this same stream to stay in lockstep.
pub fn simulation_rng(seed: u64) -> RandomSource {
    RandomSource::from_seed(derive_stream(seed, SIM_STREAM))
}

/// Regenerates the dungeon from the journal's seed and plays every recorded
/// action back through the scheduler. A journal that ends mid-run yields
/// `outcome: None`, which doubles as the save-game path.
pub fn replay_to_end(
    content: &ContentPack,
    journal: &RunJournal,
) -> Result<ReplayOutcome, ReplayError> {
    let dungeon = generate_dungeon(journal.config, content, journal.seed)
        .map_err(ReplayError::Generation)?;
    let mut state = DungeonState::new(dungeon, &journal.player);
    let mut rng = simulation_rng(journal.seed);

    let mut outcome = None;
    for (index, record) in journal.actions.iter().enumerate() {
        let expected = index as u64;
        if record.seq != expected {
            return Err(ReplayError::OutOfOrderRecord { seq: record.seq, expected });
        }
        if outcome.is_some() {
            return Err(ReplayError::ActionAfterEnd { seq: record.seq });
        }
        let result = engine::tick(&mut state, record.action, content, &mut rng);
        outcome = result.outcome;
    }

    Ok(ReplayOutcome { final_turn: state.turn, snapshot_hash: state.snapshot_hash(), outcome })
}
