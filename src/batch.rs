//! Batch simulation.
//!
//! Runs many independent games, optionally in parallel, and summarizes
//! the outcomes. Each game gets its own orchestrator and a seed derived
//! from the batch seed, so a batch is reproducible end to end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::decision::NullDecisionMaker;
use crate::economy::CreditRating;
use crate::events::{EngineError, Event};
use crate::orchestrator::{DecisionTally, Orchestrator, OrchestratorConfig};
use crate::state::{GameRules, GameState, PlayerId};

/// Configuration for a simulation batch.
#[derive(Clone)]
pub struct SimConfig {
    /// Number of games to run.
    pub num_games: usize,
    /// Players per game.
    pub num_players: u32,
    /// Global turns per game.
    pub turn_limit: u64,
    /// Table rules shared by every game in the batch.
    pub rules: GameRules,
    /// Batch seed (0 = use entropy; games are then not reproducible).
    pub seed: u64,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Suppress per-game progress output.
    pub quiet: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            num_games: 10,
            num_players: 4,
            turn_limit: 50,
            rules: GameRules::default(),
            seed: 0,
            threads: 4,
            quiet: false,
        }
    }
}

/// Final standing of one player in a completed game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player: PlayerId,
    pub cash: f64,
    pub net_worth: f64,
    pub credit_rating: CreditRating,
    pub properties: usize,
    pub loans_outstanding: usize,
}

/// Summary of one completed game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub game_id: usize,
    pub turns_played: u64,
    pub events_logged: usize,
    /// Standings ordered by descending net worth.
    pub players: Vec<PlayerSummary>,
    #[serde(skip)]
    pub tally: DecisionTally,
}

impl GameSummary {
    /// The player with the highest final net worth.
    pub fn leader(&self) -> Option<&PlayerSummary> {
        self.players.first()
    }
}

/// Derives the per-game seed from the batch seed. Entropy batches stay
/// entropy per game.
fn game_seed(batch_seed: u64, game_id: usize) -> u64 {
    if batch_seed == 0 {
        0
    } else {
        batch_seed.wrapping_add(game_id as u64)
    }
}

/// Plays one full game and returns its summary along with the event log.
pub fn run_game(game_id: usize, config: &SimConfig) -> Result<(GameSummary, Vec<Event>), EngineError> {
    let state = GameState::new(Board::standard(), config.num_players, config.rules.clone());
    let mut orch = Orchestrator::new(
        state,
        OrchestratorConfig {
            turn_limit: Some(config.turn_limit),
            seed: game_seed(config.seed, game_id),
        },
    );
    for i in 1..=config.num_players {
        orch.set_decider(PlayerId(i), Box::new(NullDecisionMaker));
    }
    orch.run()?;

    let tally = orch.tally();
    let (state, log) = orch.into_parts();

    let mut players: Vec<PlayerSummary> = state
        .players
        .iter()
        .map(|p| PlayerSummary {
            player: p.id,
            cash: p.cash(),
            net_worth: p.net_worth,
            credit_rating: p.credit_rating,
            properties: p.properties.len(),
            loans_outstanding: p.debt_loans.len(),
        })
        .collect();
    players.sort_by(|a, b| {
        b.net_worth
            .partial_cmp(&a.net_worth)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.player.cmp(&b.player))
    });

    Ok((
        GameSummary {
            game_id,
            turns_played: state.turn,
            events_logged: log.len(),
            players,
            tally,
        },
        log,
    ))
}

/// Runs the batch, collecting every game summary.
pub fn run_batch(config: &SimConfig) -> Result<Vec<GameSummary>, EngineError> {
    let mut summaries = Vec::with_capacity(config.num_games);
    run_batch_with_callback(config, |summary, _log| {
        summaries.push(summary);
    })?;
    Ok(summaries)
}

/// Runs the batch, calling `on_game` with each completed game's summary
/// and event log. Lets the caller stream logs to disk instead of holding
/// every game in memory.
pub fn run_batch_with_callback<F>(config: &SimConfig, on_game: F) -> Result<(), EngineError>
where
    F: FnMut(GameSummary, Vec<Event>) + Send,
{
    if config.threads > 1 {
        run_batch_parallel(config, on_game)
    } else {
        run_batch_sequential(config, on_game)
    }
}

fn run_batch_sequential<F>(config: &SimConfig, mut on_game: F) -> Result<(), EngineError>
where
    F: FnMut(GameSummary, Vec<Event>),
{
    for i in 0..config.num_games {
        let start = Instant::now();
        let (summary, log) = run_game(i, config)?;
        if !config.quiet {
            report_game(i + 1, config.num_games, &summary, start.elapsed().as_secs_f64());
        }
        on_game(summary, log);
    }
    Ok(())
}

/// Parallel batch: games run concurrently on a rayon pool, results are
/// delivered to the callback over a channel on the calling thread.
fn run_batch_parallel<F>(config: &SimConfig, mut on_game: F) -> Result<(), EngineError>
where
    F: FnMut(GameSummary, Vec<Event>) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<Result<(GameSummary, Vec<Event>), EngineError>>();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|e| EngineError::ThreadPool(e.to_string()))?;

    let config_clone = config.clone();
    let handle = std::thread::spawn(move || {
        pool.install(|| {
            (0..config_clone.num_games)
                .into_par_iter()
                .for_each_with(tx, |tx, i| {
                    let start = Instant::now();
                    let result = run_game(i, &config_clone);
                    if let Ok((summary, _)) = &result {
                        if !config_clone.quiet {
                            let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                            report_game(
                                n,
                                config_clone.num_games,
                                summary,
                                start.elapsed().as_secs_f64(),
                            );
                        }
                    }
                    let _ = tx.send(result);
                });
        });
    });

    let mut first_err = None;
    for result in rx {
        match result {
            Ok((summary, log)) => on_game(summary, log),
            Err(e) if first_err.is_none() => first_err = Some(e),
            Err(_) => {}
        }
    }

    handle.join().expect("batch worker thread panicked");
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn report_game(n: usize, total: usize, summary: &GameSummary, elapsed: f64) {
    let leader = match summary.leader() {
        Some(p) => format!("{} leads with {:.0}", p.player, p.net_worth),
        None => "no players".to_string(),
    };
    eprintln!(
        "Game {}/{}: {} turns, {} events, {} ({:.2}s)",
        n, total, summary.turns_played, summary.events_logged, leader, elapsed,
    );
}

/// Prints a batch summary to stderr.
pub fn print_summary(summaries: &[GameSummary]) {
    let total = summaries.len();
    let mut total_turns = 0u64;
    let mut total_events = 0usize;
    let mut tally = DecisionTally::default();
    let mut leader_wins: std::collections::BTreeMap<PlayerId, usize> =
        std::collections::BTreeMap::new();

    for summary in summaries {
        total_turns += summary.turns_played;
        total_events += summary.events_logged;
        tally.accepted += summary.tally.accepted;
        tally.declined += summary.tally.declined;
        tally.unsupported += summary.tally.unsupported;
        tally.timed_out += summary.tally.timed_out;
        if let Some(leader) = summary.leader() {
            *leader_wins.entry(leader.player).or_default() += 1;
        }
    }

    eprintln!("=== Batch Summary ===");
    eprintln!("Games: {}", total);
    eprintln!(
        "Avg turns/game: {:.1}",
        total_turns as f64 / total.max(1) as f64
    );
    eprintln!(
        "Avg events/game: {:.1}",
        total_events as f64 / total.max(1) as f64
    );
    eprintln!(
        "Decisions: {} accepted, {} declined, {} unsupported, {} timed out",
        tally.accepted, tally.declined, tally.unsupported, tally.timed_out,
    );
    eprintln!("Leaders:");
    for (player, wins) in &leader_wins {
        let pct = 100.0 * *wins as f64 / total.max(1) as f64;
        eprintln!("  {}: {} ({:.1}%)", player, wins, pct);
    }
}
