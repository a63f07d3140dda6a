#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Horde Survival headless and reports the
//! outcome of the run.

mod autopilot;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use horde_survival_core::{GameConfig, GameMode};
use horde_survival_session::{PlayerInput, Session, Summary};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use autopilot::Autopilot;

const WELCOME_BANNER: &str = "Welcome to Horde Survival.";

/// Runs a scripted Horde Survival session without a window.
#[derive(Debug, Parser)]
#[command(name = "horde-survival", version, about)]
struct Args {
    /// Number of gameplay ticks to simulate (60 per second).
    #[arg(long, default_value_t = 3600)]
    ticks: u64,
    /// TOML file overriding the default tunables.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for enemy spawning, overriding the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Keep the run alive when the player's health runs out.
    #[arg(long)]
    god_mode: bool,
}

/// Entry point for the Horde Survival command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = resolve_config(&args)?;

    let mut session = Session::new(config).context("invalid configuration")?;
    println!("{WELCOME_BANNER}");

    let mut events = Vec::new();
    session.step(
        &PlayerInput {
            start: true,
            ..PlayerInput::default()
        },
        &mut events,
    );

    let mut autopilot = Autopilot;
    for _ in 0..args.ticks {
        if session.summary().mode != GameMode::Gameplay {
            break;
        }
        let input = autopilot.input(session.world());
        events.clear();
        session.step(&input, &mut events);
    }

    print_summary(&session.summary());
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn resolve_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => GameConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.spawning.seed = seed;
    }
    if args.god_mode {
        config.cheats.god_mode = true;
    }
    if config.cheats.god_mode {
        info!("god mode enabled");
    }
    if args.ticks == 0 {
        warn!("--ticks 0 requested; the run ends before it starts");
    }
    Ok(config)
}

fn print_summary(summary: &Summary) {
    let progress = summary.progress;
    let seconds = progress.seconds_survived();
    println!("mode: {:?}", summary.mode);
    println!(
        "time survived: {:02}:{:02}",
        (seconds / 60) % 60,
        seconds % 60
    );
    println!("ticks: {}", progress.ticks);
    println!("score: {}", progress.score);
    println!("level: {}", progress.level);
    println!("kills: {}", progress.kills);
    println!("health: {}", summary.health);
    println!("enemies alive: {}", summary.enemies);
    println!("flow field rebuilds: {}", summary.rebuilds);
}
