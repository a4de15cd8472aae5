use criterion::{black_box, criterion_group, criterion_main, Criterion};

use magnate::board::Board;
use magnate::decision::NullDecisionMaker;
use magnate::events::EventBus;
use magnate::orchestrator::{Orchestrator, OrchestratorConfig};
use magnate::state::{GameRules, GameState, PlayerId};

fn seeded_orchestrator(turns: u64, players: u32, seed: u64) -> Orchestrator {
    let state = GameState::new(Board::standard(), players, GameRules::default());
    let mut orch = Orchestrator::new(
        state,
        OrchestratorConfig {
            turn_limit: Some(turns),
            seed,
        },
    );
    for i in 1..=players {
        orch.set_decider(PlayerId(i), Box::new(NullDecisionMaker));
    }
    orch
}

fn bench_play_turns(c: &mut Criterion) {
    c.bench_function("play_50_turns_4_players", |b| {
        b.iter(|| {
            let mut orch = seeded_orchestrator(50, 4, 42);
            orch.run().unwrap();
            black_box(orch.state().turn)
        })
    });
}

fn bench_replay(c: &mut Criterion) {
    let mut orch = seeded_orchestrator(50, 4, 42);
    orch.run().unwrap();
    let (_, log) = orch.into_parts();

    c.bench_function("replay_50_turn_log", |b| {
        b.iter(|| {
            let initial = GameState::new(Board::standard(), 4, GameRules::default());
            EventBus::replay(initial, black_box(&log)).unwrap()
        })
    });
}

fn bench_game_setup(c: &mut Criterion) {
    c.bench_function("game_setup_4_players", |b| {
        b.iter(|| {
            black_box(GameState::new(
                Board::standard(),
                black_box(4),
                GameRules::default(),
            ))
        })
    });
}

criterion_group!(benches, bench_play_turns, bench_replay, bench_game_setup);
criterion_main!(benches);
