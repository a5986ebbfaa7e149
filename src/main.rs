//! Hex Popper headless harness
//!
//! Drives the simulation with autoplay input and reports the outcome.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use hex_popper::GameConfig;
use hex_popper::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

/// Run the hex-grid matching simulation without a display.
#[derive(Debug, Parser)]
#[command(name = "hex-popper", version, about)]
struct Args {
    /// RNG seed for level layout, shooter colours and power picks.
    #[arg(long, default_value = "1")]
    seed: u64,

    /// Stop after this many ticks even if the game is still running.
    #[arg(long, default_value = "20000", value_name = "N")]
    max_ticks: u64,

    /// JSON config file; missing fields use defaults.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the final snapshot as JSON instead of a summary line.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };

    log::info!("Hex Popper (headless) starting with seed {}", args.seed);
    let mut state = GameState::new(config, args.seed);
    let input = TickInput {
        autoplay: true,
        ..Default::default()
    };

    let mut shots = 0u32;
    for _ in 0..args.max_ticks {
        tick(&mut state, &input);
        for event in state.drain_events() {
            match event {
                GameEvent::Launched { .. } => shots += 1,
                GameEvent::LevelCleared { level } => log::info!("Level {level} cleared"),
                GameEvent::PowerActivated { color, count, .. } => {
                    log::debug!("Power removed {count} pieces of {color:?}");
                }
                _ => {}
            }
        }
        if matches!(state.phase, GamePhase::GameLost | GamePhase::GameWon) {
            break;
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
    } else {
        println!(
            "phase={:?} level={} score={} shots={} ticks={} pieces_left={}",
            state.phase,
            state.level,
            state.score,
            shots,
            state.time_ticks,
            state.grid.len()
        );
    }
    Ok(())
}
