#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless batch runner for autonomous snake rounds.
//!
//! Plays a configurable number of rounds with the autopilot steering,
//! prints a summary line per round, and closes with the session
//! aggregate. Diagnostics go through `tracing`; tune them with
//! `RUST_LOG`.

use anyhow::Context;
use clap::Parser;
use rand::Rng;
use tracing::{debug, info};

use snake_pilot_core::{Command, Event, GridSize, Mode, Outcome};
use snake_pilot_system_autopilot::{Autopilot, Config as PilotConfig};
use snake_pilot_world::query::RoundStats;
use snake_pilot_world::{apply, query, Config, Round, AUTONOMOUS_STEP_DELAY};

/// Runs autonomous snake rounds and reports per-round and session
/// statistics.
#[derive(Debug, Parser)]
#[command(name = "snake-pilot")]
struct Args {
    /// Side length of the square playing field.
    #[arg(long, default_value_t = 17)]
    grid_size: u32,

    /// Number of rounds to play.
    #[arg(long, default_value_t = 1)]
    rounds: u32,

    /// Base seed for the session; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Safety cap on movement steps per round.
    #[arg(long, default_value_t = 10_000_000)]
    max_steps: u32,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let base_seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(
        base_seed,
        grid_size = args.grid_size,
        rounds = args.rounds,
        "starting session"
    );

    let mut results = Vec::new();
    for index in 0..args.rounds {
        let seed = base_seed.wrapping_add(u64::from(index));
        let (outcome, stats) = play_round(GridSize::new(args.grid_size), seed, args.max_steps)
            .with_context(|| format!("round {} aborted", index + 1))?;
        report_round(index + 1, outcome, &stats);
        results.push((outcome, stats));
    }

    report_session(&results);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Drives one round to its terminal verdict: every loop iteration
/// advances the clock by one step quantum, lets the autopilot react to
/// the events, and applies whatever it commanded.
fn play_round(size: GridSize, seed: u64, max_steps: u32) -> anyhow::Result<(Outcome, RoundStats)> {
    let config = Config::new(size, Mode::Autonomous, seed);
    let mut round = Round::new(config).context("invalid round configuration")?;
    let mut autopilot = Autopilot::new(PilotConfig::new(seed.rotate_left(32)));

    let mut steps = 0u32;
    while query::outcome(&round) == Outcome::Playing {
        anyhow::ensure!(steps < max_steps, "round exceeded {max_steps} steps");
        steps += 1;

        let mut events = Vec::new();
        apply(
            &mut round,
            Command::Tick {
                dt: AUTONOMOUS_STEP_DELAY,
            },
            &mut events,
        );

        let mut commands = Vec::new();
        autopilot.handle(&events, &query::pilot_view(&round), &mut commands);
        for command in commands {
            apply(&mut round, command, &mut events);
        }

        for event in &events {
            if let Event::TargetEaten { cell, moves_taken } = *event {
                debug!(?cell, moves_taken, "target eaten");
            }
        }
    }

    Ok((query::outcome(&round), query::stats(&round)))
}

fn report_round(index: u32, outcome: Outcome, stats: &RoundStats) {
    println!(
        "round {index}: {} | score {} | moves {} | avg moves/target {:.1} | {:.1}s",
        outcome_label(outcome),
        stats.score,
        stats.total_moves,
        mean(&stats.moves_per_target),
        stats.elapsed.as_secs_f64(),
    );
}

fn report_session(results: &[(Outcome, RoundStats)]) {
    let games = results.len();
    let wins = results
        .iter()
        .filter(|(outcome, _)| *outcome == Outcome::Win)
        .count();
    let best_score = results
        .iter()
        .map(|(_, stats)| stats.score)
        .max()
        .unwrap_or(0);
    let mean_score = if games == 0 {
        0.0
    } else {
        results.iter().map(|(_, stats)| f64::from(stats.score)).sum::<f64>() / games as f64
    };
    let all_moves: Vec<u32> = results
        .iter()
        .flat_map(|(_, stats)| stats.moves_per_target.iter().copied())
        .collect();

    println!(
        "session: {games} rounds | wins {wins} | best score {best_score} | \
         mean score {mean_score:.1} | mean moves/target {:.1}",
        mean(&all_moves),
    );
}

fn mean(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&value| f64::from(value)).sum::<f64>() / values.len() as f64
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Playing => "playing",
        Outcome::Win => "win",
        Outcome::Dead => "dead",
        Outcome::Timeout => "timeout",
    }
}
