//! Batch simulation CLI.
//!
//! Runs a batch of games, prints a summary, and optionally writes game 0's
//! event journal as JSONL.
//!
//! Usage:
//!   cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --games N       Number of games to run (default: 10)
//!   --players N     Players per game (default: 4)
//!   --turns N       Global turns per game (default: 50)
//!   --seed N        Batch seed, 0 for entropy (default: 0)
//!   --threads N     Number of parallel threads (default: 4)
//!   --journal FILE  Write game 0's event log to FILE as JSONL
//!   --quiet         Suppress progress and summary output

use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

use magnate::batch::{self, SimConfig};
use magnate::journal::write_journal;

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut config = SimConfig::default();
    let mut journal_path: Option<String> = None;
    let mut quiet = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                config.num_games = args[i].parse().expect("invalid --games value");
            }
            "--players" => {
                i += 1;
                config.num_players = args[i].parse().expect("invalid --players value");
            }
            "--turns" => {
                i += 1;
                config.turn_limit = args[i].parse().expect("invalid --turns value");
            }
            "--seed" => {
                i += 1;
                config.seed = args[i].parse().expect("invalid --seed value");
            }
            "--threads" => {
                i += 1;
                config.threads = args[i].parse().expect("invalid --threads value");
            }
            "--journal" => {
                i += 1;
                journal_path = Some(args[i].clone());
            }
            "--quiet" => {
                quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    config.quiet = quiet;

    if !quiet {
        eprintln!(
            "Batch: {} games, {} players, {} turns, seed {}, {} threads",
            config.num_games, config.num_players, config.turn_limit, config.seed, config.threads,
        );
    }

    let start = Instant::now();
    let mut summaries = Vec::with_capacity(config.num_games);
    let result = batch::run_batch_with_callback(&config, |summary, log| {
        if summary.game_id == 0 {
            if let Some(path) = &journal_path {
                let file = File::create(path).expect("failed to create journal file");
                let mut writer = BufWriter::new(file);
                write_journal(&mut writer, &log).expect("failed to write journal");
                if !quiet {
                    eprintln!("Wrote {} events to {}", log.len(), path);
                }
            }
        }
        summaries.push(summary);
    });
    if let Err(e) = result {
        eprintln!("Batch failed: {}", e);
        std::process::exit(1);
    }
    let elapsed = start.elapsed();

    if !quiet {
        eprintln!(
            "Completed {} games in {:.2}s",
            summaries.len(),
            elapsed.as_secs_f64(),
        );
        batch::print_summary(&summaries);
    }
}

fn print_usage() {
    eprintln!("Usage: magnate [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N       Number of games to run (default: 10)");
    eprintln!("  --players N     Players per game (default: 4)");
    eprintln!("  --turns N       Global turns per game (default: 50)");
    eprintln!("  --seed N        Batch seed, 0 for entropy (default: 0)");
    eprintln!("  --threads N     Number of parallel threads (default: 4)");
    eprintln!("  --journal FILE  Write game 0's event log to FILE as JSONL");
    eprintln!("  --quiet         Suppress progress and summary output");
    eprintln!("  --help          Show this help");
}
