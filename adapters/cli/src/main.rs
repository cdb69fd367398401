#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line host that boots and runs a Quiz Defence session.

mod autoplay;
mod clock;
mod script;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use quiz_defence_core::{RunStatus, RunSummary};
use quiz_defence_simulation::Simulation;
use quiz_defence_system_bootstrap::Bootstrap;
use quiz_defence_world::query;

use crate::{autoplay::AutoPlayer, clock::Clock, script::Script};

/// Command-line arguments accepted by the host.
#[derive(Debug, Parser)]
#[command(name = "quiz-defence", about = "Runs a headless Quiz Defence session")]
struct CliArgs {
    /// TOML configuration overriding the standard tables.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Maximum number of ticks to simulate.
    #[arg(long, default_value_t = 6_000)]
    ticks: u64,
    /// Simulated milliseconds per tick. Defaults to the configured interval.
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,
    /// TOML script of player commands keyed by tick.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,
    /// Let the built-in strategy play.
    #[arg(long)]
    auto: bool,
    /// Pace ticks against the wall clock, sleeping one tick interval per frame.
    #[arg(long)]
    realtime: bool,
}

/// Entry point for the Quiz Defence command-line interface.
fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    let args = CliArgs::parse();
    let bootstrap = Bootstrap::default();
    let world = bootstrap
        .world(args.config.as_deref())
        .context("failed to load game configuration")?;
    println!("{}", bootstrap.welcome_banner(&world));

    let script = match args.script.as_deref() {
        Some(path) => {
            let script = Script::load(path)?;
            info!("loaded {} scripted steps from {}", script.len(), path.display());
            Some(script)
        }
        None => None,
    };
    let autoplayer = args.auto.then(|| AutoPlayer::new(&world));
    if let Some(player) = &autoplayer {
        info!("auto-play considering {} build spots", player.candidate_count());
    }

    let rules = query::config(&world).simulation;
    let dt = args
        .tick_ms
        .map(Duration::from_millis)
        .unwrap_or(rules.tick_interval);
    let mut clock = if args.realtime {
        info!("pacing ticks in real time, {dt:?} per frame");
        Clock::realtime(dt, rules.max_tick)
    } else {
        Clock::Fixed(dt)
    };
    let mut simulation = Simulation::new(world);

    for tick in 0..args.ticks {
        if let Some(script) = &script {
            for command in script.commands_at(tick) {
                let _ = simulation.submit(command);
            }
        }
        if let Some(player) = &autoplayer {
            let mut commands = Vec::new();
            player.plan(tick, simulation.world(), &mut commands);
            for command in commands {
                let _ = simulation.submit(command);
            }
        }
        let _ = simulation.tick(clock.step());

        let finished = query::run_state(simulation.world()).status != RunStatus::Playing;
        let more_script = script
            .as_ref()
            .and_then(Script::last_tick)
            .is_some_and(|last| last > tick);
        if finished && !more_script {
            break;
        }
    }

    info!(
        "session ended after {:?} of simulated time",
        query::now(simulation.world())
    );
    print_summary(&query::run_summary(simulation.world()));
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("status: {:?}", summary.status);
    println!("waves reached: {}", summary.waves_reached);
    println!("enemies killed: {}", summary.enemies_killed);
    println!("towers placed: {}", summary.towers_placed);
    println!("gold earned: {}", summary.gold_earned);
}
