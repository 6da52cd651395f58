//! Runs a Kuiper session with no window and prints a JSON summary.
//!
//! ```text
//! kuiper-headless --ticks 4000 --seed 7 --play
//! kuiper-headless --config session.json --log-level debug
//! ```
//!
//! Without `--play` the session stays in attract mode and the demo flies
//! itself. With `--play` a player game is started and the same autopilot
//! flies the player ship. Logs go to stderr; the summary goes to stdout.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kuiper_core::{EntityKind, Mode, NullCanvas, Phase, Session, SessionConfig};

#[derive(Parser, Debug)]
#[command(name = "kuiper-headless")]
#[command(about = "Run the Kuiper simulation without a window")]
#[command(version)]
struct Args {
    /// Number of 25 ms ticks to run
    #[arg(short, long, default_value = "4000")]
    ticks: u64,

    /// Master seed for the game and demo universes
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Session configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start a player game flown by the autopilot
    #[arg(short, long)]
    play: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Logical canvas width
    #[arg(long, default_value = "800")]
    width: f64,

    /// Logical canvas height
    #[arg(long, default_value = "600")]
    height: f64,
}

/// Final state of the active universe.
#[derive(Serialize, Debug)]
struct Summary {
    ticks: u64,
    seed: u64,
    mode: Mode,
    phase: Phase,
    score: u64,
    hi_score: u64,
    lives: u32,
    deaths: u32,
    entities: BTreeMap<String, usize>,
}

impl Summary {
    fn capture(session: &Session, ticks: u64, seed: u64) -> Self {
        let universe = session.active();
        let entities = EntityKind::ALL
            .iter()
            .map(|kind| (kind.to_string(), universe.count_of(*kind)))
            .filter(|(_, n)| *n > 0)
            .collect();
        Self {
            ticks,
            seed,
            mode: session.mode(),
            phase: universe.phase(),
            score: universe.score(),
            hi_score: universe.hi_score(),
            lives: universe.life_count(),
            deaths: universe.death_count(),
            entities,
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    SessionConfig::from_json_str(&source)
        .with_context(|| format!("parsing config {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = load_config(args.config.as_ref())?;
    let mut session = Session::with_config(config, args.seed).context("invalid session config")?;
    let mut canvas = NullCanvas::new(args.width, args.height);

    if args.play {
        session.set_game_autopilot(true);
        session.start_game();
    }
    info!(ticks = args.ticks, seed = args.seed, play = args.play, "running");

    for _ in 0..args.ticks {
        session.advance(&mut canvas);
        session.draw(&mut canvas);
    }

    let summary = Summary::capture(&session, args.ticks, args.seed);
    let json = serde_json::to_string_pretty(&summary).context("serializing summary")?;
    println!("{json}");
    Ok(())
}
