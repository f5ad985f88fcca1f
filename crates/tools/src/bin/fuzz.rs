use anyhow::Result;
use clap::Parser;
use game_core::replay::simulation_rng;
use game_core::{
    ContentPack, DungeonState, GenerationConfig, PlayerAction, PlayerConfig, Pos, SkillKey, Tile,
    generate_dungeon, tick,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 20)]
    runs: u64,
    #[arg(short, long, default_value_t = 1000)]
    ticks: u32,
    #[arg(long, default_value_t = 48)]
    width: usize,
    #[arg(long, default_value_t = 32)]
    height: usize,
    #[arg(short, long, default_value_t = 2)]
    level: u32,
}

const SKILLS: [SkillKey; 5] = [
    SkillKey::HeavyStrike,
    SkillKey::PiercingBolt,
    SkillKey::StunningBlow,
    SkillKey::MarkPrey,
    SkillKey::ShadowVeil,
];

fn offset(rng: &mut ChaCha8Rng, spread: i32) -> i32 {
    (rng.next_u64() % (2 * spread as u64 + 1)) as i32 - spread
}

fn random_action(rng: &mut ChaCha8Rng, player: Pos) -> PlayerAction {
    match rng.next_u64() % 10 {
        0 => PlayerAction::Wait,
        1..=5 => {
            PlayerAction::Move(Pos { y: player.y + offset(rng, 1), x: player.x + offset(rng, 1) })
        }
        6 | 7 => PlayerAction::Attack {
            target: Pos { y: player.y + offset(rng, 1), x: player.x + offset(rng, 1) },
        },
        _ => {
            let key = SKILLS[rng.next_u64() as usize % SKILLS.len()];
            PlayerAction::Skill {
                key,
                target: Pos { y: player.y + offset(rng, 4), x: player.x + offset(rng, 4) },
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!(
        "Fuzzing {} runs of up to {} ticks from seed {} ({}x{}, level {})...",
        args.runs, args.ticks, args.seed, args.width, args.height, args.level
    );
    let content = ContentPack::build_default();
    let config = GenerationConfig {
        width: args.width,
        height: args.height,
        dungeon_level: args.level,
        player_level: args.level,
    };

    for run in 0..args.runs {
        let map_seed = args.seed.wrapping_add(run);
        let dungeon = generate_dungeon(config, &content, map_seed)
            .map_err(|e| anyhow::anyhow!("Generation failed on seed {}: {:?}", map_seed, e))?;
        let mut state = DungeonState::new(dungeon, &PlayerConfig::default());
        let mut rng = simulation_rng(map_seed);
        let mut driver = ChaCha8Rng::seed_from_u64(map_seed ^ 0x5eed);

        let mut ended = None;
        for _ in 0..args.ticks {
            let action = random_action(&mut driver, state.player().pos);
            let result = tick(&mut state, action, &content, &mut rng);

            // Assert invariants
            for (_, entity) in state.entities.iter() {
                assert!(entity.hp <= entity.max_hp, "Invariant failed: HP > Max HP");
                let tile = state.map.tile_at(entity.pos);
                assert!(tile != Tile::Wall, "Invariant failed: entity inside wall");
            }

            if let Some(outcome) = result.outcome {
                ended = Some(outcome);
                break;
            }
        }

        match ended {
            Some(outcome) => println!(
                "run {:>3} seed {:>6}: {:?} on turn {} (hash {:016x})",
                run,
                map_seed,
                outcome,
                state.turn,
                state.snapshot_hash()
            ),
            None => println!(
                "run {:>3} seed {:>6}: still alive after {} ticks (hash {:016x})",
                run,
                map_seed,
                args.ticks,
                state.snapshot_hash()
            ),
        }
    }

    println!("Fuzzing completed successfully.");
    Ok(())
}
