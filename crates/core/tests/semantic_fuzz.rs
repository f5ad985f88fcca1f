use std::collections::BTreeSet;

use delve_core::replay::simulation_rng;
use delve_core::{
    ContentPack, DungeonState, GenerationConfig, PlayerAction, PlayerConfig, Pos, RunOutcome,
    SkillKey, Tile, generate_dungeon, tick,
};
use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

const FUZZ_SKILLS: [SkillKey; 4] =
    [SkillKey::HeavyStrike, SkillKey::PiercingBolt, SkillKey::StunningBlow, SkillKey::ShadowVeil];

fn offset(rng: &mut ChaCha8Rng, spread: i32) -> i32 {
    (rng.next_u64() % (2 * spread as u64 + 1)) as i32 - spread
}

/// Draws a random player action around the current position. Illegal targets
/// are deliberately common; the scheduler must reject them without corrupting
/// anything.
fn random_action(rng: &mut ChaCha8Rng, player: Pos) -> PlayerAction {
    match rng.next_u64() % 10 {
        0 => PlayerAction::Wait,
        1..=5 => {
            PlayerAction::Move(Pos { y: player.y + offset(rng, 1), x: player.x + offset(rng, 1) })
        }
        6 | 7 => PlayerAction::Attack {
            target: Pos { y: player.y + offset(rng, 1), x: player.x + offset(rng, 1) },
        },
        8 => {
            let key = FUZZ_SKILLS[rng.next_u64() as usize % FUZZ_SKILLS.len()];
            PlayerAction::Skill {
                key,
                target: Pos { y: player.y + offset(rng, 3), x: player.x + offset(rng, 3) },
            }
        }
        _ => PlayerAction::Skill { key: SkillKey::ShadowVeil, target: player },
    }
}

fn run_fuzz_simulation(map_seed: u64, action_seed: u64, max_ticks: u64) -> Result<(), String> {
    let content = ContentPack::build_default();
    let config = GenerationConfig { width: 48, height: 32, dungeon_level: 2, player_level: 2 };
    let dungeon = generate_dungeon(config, &content, map_seed)
        .map_err(|error| format!("generation failed on map_seed {map_seed}: {error:?}"))?;
    let mut state = DungeonState::new(dungeon, &PlayerConfig::default());
    let mut rng = simulation_rng(map_seed);
    let mut driver = ChaCha8Rng::seed_from_u64(action_seed);

    for _ in 0..max_ticks {
        let turn_before = state.turn;
        let pos_before = state.player().pos;
        let action = random_action(&mut driver, pos_before);
        let result = tick(&mut state, action, &content, &mut rng);

        if state.turn != turn_before + 1 {
            return Err(format!("turn went {} -> {}", turn_before, state.turn));
        }
        if result.turn != state.turn {
            return Err(format!("result turn {} disagrees with state turn {}", result.turn, state.turn));
        }
        let pos_after = state.player().pos;
        if pos_before.chebyshev(pos_after) > 1 {
            return Err(format!("player teleported {pos_before:?} -> {pos_after:?}"));
        }
        if result.rejection.is_some() && pos_after != pos_before {
            return Err("rejected action still moved the player".to_string());
        }
        if state.player().mp < 0 {
            return Err(format!("player mana went negative: {}", state.player().mp));
        }

        let mut occupied = BTreeSet::new();
        for (id, entity) in &state.entities {
            let tile = state.map.tile_at(entity.pos);
            if tile == Tile::Wall {
                return Err(format!("{} is standing in a wall at {:?}", entity.archetype, entity.pos));
            }
            if id != state.player_id && matches!(tile, Tile::Door { .. }) {
                return Err(format!("{} is standing in a doorway at {:?}", entity.archetype, entity.pos));
            }
            if entity.hp < 0 || entity.hp > entity.max_hp {
                return Err(format!("{} has {} hp of {} max", entity.archetype, entity.hp, entity.max_hp));
            }
            if id != state.player_id && entity.hp == 0 {
                return Err(format!("dead {} survived the prune pass", entity.archetype));
            }
            if !occupied.insert((entity.pos.y, entity.pos.x)) {
                return Err(format!("two entities share tile {:?}", entity.pos));
            }
        }

        if let Some(outcome) = result.outcome {
            if outcome == RunOutcome::Defeat && state.player().hp > 0 {
                return Err("defeat reported while the player still lives".to_string());
            }
            break;
        }
    }
    Ok(())
}

#[test]
fn test_random_runs_uphold_simulation_invariants() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(16));
    runner
        .run(&(any::<u64>(), any::<u64>()), |(map_seed, action_seed)| {
            run_fuzz_simulation(map_seed, action_seed, 240).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("fuzzed runs should uphold the simulation invariants");
}

#[test]
fn test_rejected_garbage_never_desyncs_a_replayable_run() {
    // Two interleavings of the same garbage: rejections must consume a turn
    // and exactly zero simulation rolls, so the traces stay identical.
    let content = ContentPack::build_default();
    let config = GenerationConfig { width: 40, height: 28, dungeon_level: 1, player_level: 1 };

    let garbage = |state: &DungeonState| {
        let player = state.player().pos;
        PlayerAction::Move(Pos { y: player.y + 9, x: player.x - 9 })
    };

    let mut trace_a = Vec::new();
    let mut trace_b = Vec::new();
    for trace in [&mut trace_a, &mut trace_b] {
        let dungeon = generate_dungeon(config, &content, 31).expect("generation failed");
        let mut state = DungeonState::new(dungeon, &PlayerConfig::default());
        let mut rng = simulation_rng(31);
        for _ in 0..50 {
            let action = garbage(&state);
            let result = tick(&mut state, action, &content, &mut rng);
            assert!(result.rejection.is_some(), "a nine-tile move should never be accepted");
            trace.push(state.snapshot_hash());
            if result.outcome.is_some() {
                break;
            }
        }
    }

    assert_eq!(trace_a, trace_b, "identical garbage must leave identical traces");
}
