use std::fs;

use delve_core::journal::RunJournal;
use delve_core::replay::{ReplayError, replay_to_end, simulation_rng};
use delve_core::{
    ContentPack, DungeonState, GenerationConfig, PlayerAction, PlayerConfig, Pos, RunOutcome,
    StatBlock, generate_dungeon, tick,
};

fn wander_config() -> GenerationConfig {
    GenerationConfig { width: 40, height: 28, dungeon_level: 1, player_level: 1 }
}

/// Deep health pool so a scripted window stays mid-run; replaying a partial
/// journal is only meaningful while the run is still alive.
fn tanky_loadout() -> PlayerConfig {
    PlayerConfig {
        hp: 5000,
        mp: 40,
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

/// Walks a fixed square pattern, bumping walls without caring, and records
/// every action. Returns the journal, the hash after each tick, and the
/// outcome if the run ended inside the budget.
fn record_wandering_run(
    seed: u64,
    ticks: usize,
    player: PlayerConfig,
    content: &ContentPack,
) -> (RunJournal, Vec<u64>, Option<RunOutcome>) {
    let config = wander_config();
    let dungeon = generate_dungeon(config, content, seed).expect("wander dungeon should generate");
    let mut state = DungeonState::new(dungeon, &player);
    let mut rng = simulation_rng(seed);
    let mut journal = RunJournal::new(seed, config, player);
    let mut hashes = Vec::new();
    let mut outcome = None;

    for step in 0..ticks {
        let at = state.player().pos;
        let action = match step % 5 {
            0 => PlayerAction::Move(Pos { y: at.y, x: at.x + 1 }),
            1 => PlayerAction::Move(Pos { y: at.y + 1, x: at.x }),
            2 => PlayerAction::Move(Pos { y: at.y, x: at.x - 1 }),
            3 => PlayerAction::Move(Pos { y: at.y - 1, x: at.x }),
            _ => PlayerAction::Wait,
        };
        journal.append(action);
        let result = tick(&mut state, action, content, &mut rng);
        hashes.push(state.snapshot_hash());
        if result.outcome.is_some() {
            outcome = result.outcome;
            break;
        }
    }
    (journal, hashes, outcome)
}

#[test]
fn test_journal_survives_a_file_round_trip_and_replays_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.journal.json");
    let content = ContentPack::build_default();

    let (journal, hashes, outcome) = record_wandering_run(4242, 30, tanky_loadout(), &content);
    assert_eq!(outcome, None, "the tanky wanderer should survive thirty ticks");

    fs::write(&path, serde_json::to_string_pretty(&journal).unwrap()).unwrap();
    let loaded: RunJournal = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded, journal, "the journal must survive the file round trip unchanged");

    let replayed = replay_to_end(&content, &loaded).unwrap();
    assert_eq!(
        replayed.snapshot_hash,
        *hashes.last().unwrap(),
        "file-journal replay must produce the same snapshot hash"
    );
    assert_eq!(replayed.final_turn, 30);
    assert_eq!(replayed.outcome, None);
}

#[test]
fn test_a_truncated_journal_reconstructs_the_mid_run_save_point() {
    let content = ContentPack::build_default();
    let (journal, hashes, _) = record_wandering_run(777, 30, tanky_loadout(), &content);

    let mut partial = journal;
    partial.actions.truncate(12);

    let reconstructed = replay_to_end(&content, &partial).unwrap();
    assert_eq!(reconstructed.final_turn, 12);
    assert_eq!(reconstructed.outcome, None, "a twelve-tick prefix is still mid-run");
    assert_eq!(
        reconstructed.snapshot_hash, hashes[11],
        "replaying twelve records must land on the hash seen after tick twelve"
    );
}

#[test]
fn test_a_corrupted_journal_file_fails_to_parse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.journal.json");

    let mut journal = RunJournal::new(7, wander_config(), PlayerConfig::default());
    journal.append(PlayerAction::Wait);
    journal.append(PlayerAction::Move(Pos { y: 4, x: 5 }));

    let text = serde_json::to_string_pretty(&journal).unwrap();
    fs::write(&path, text.replace("\"Wait\"", "\"Slumber\"")).unwrap();

    let result: Result<RunJournal, _> = serde_json::from_str(&fs::read_to_string(&path).unwrap());
    assert!(result.is_err(), "an unknown action variant must fail to parse");
}

#[test]
fn test_records_after_the_run_ends_are_rejected() {
    let content = ContentPack::build_default();
    let fragile = PlayerConfig {
        hp: 1,
        mp: 10,
        stats: StatBlock {
            attack: 1,
            defense: 0,
            magic_attack: 1,
            magic_defense: 0,
            crit_chance: 0.0,
            evasion: 0.0,
        },
    };

    // A one-hp wanderer dies to the first landed hit; scan seeds until a run
    // actually ends inside the budget.
    for seed in 0..24u64 {
        let (mut journal, _, outcome) = record_wandering_run(seed, 200, fragile.clone(), &content);
        if outcome.is_none() {
            continue;
        }
        let trailing_seq = journal.actions.len() as u64;
        journal.append(PlayerAction::Wait);

        let result = replay_to_end(&content, &journal);
        assert_eq!(result, Err(ReplayError::ActionAfterEnd { seq: trailing_seq }));
        return;
    }
    panic!("no wandering run ended within the seed budget");
}
