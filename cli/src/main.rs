use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use catgrid::{DEFAULT_CONFIG, DragConfig};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::info;

mod scenario;

use scenario::{Replay, ReplayError, Scenario};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("replay failed: {0}")]
    Replay(#[from] ReplayError),
}

#[derive(Parser, Debug)]
#[command(name = "catgrid-cli", about = "Replay pointer scenarios against catgrid grids")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scenario file and print every notification as a JSON line.
    Replay(ReplayArgs),
    /// Print the default grid configuration.
    Defaults,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    #[arg(default_value = "-", help = "Scenario file path, or - for stdin")]
    scenario: PathBuf,

    #[arg(long, env = "CATGRID_MOVE_INTERVAL_MS", help = "Minimum spacing of accepted pointer moves")]
    move_interval_ms: Option<u64>,

    #[arg(long, env = "CATGRID_SCREEN_TOLERANCE_PX", help = "Screen distance treated as the same pointer sample")]
    screen_tolerance: Option<f64>,

    #[arg(long, env = "CATGRID_REPLAY_STEP_MS", default_value_t = 16, help = "Virtual time between steps")]
    step_ms: u64,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Replay(args) => run_replay(args),
        Command::Defaults => print_json(&serde_json::to_value(DEFAULT_CONFIG)?, true),
    }
}

fn run_replay(args: ReplayArgs) -> Result<(), CliError> {
    let raw = read_input(&args.scenario)?;
    let scenario: Scenario = serde_json::from_str(&raw)?;

    let mut config = DragConfig::default();
    if let Some(ms) = args.move_interval_ms {
        config.move_interval = Duration::from_millis(ms);
    }
    if let Some(tolerance) = args.screen_tolerance {
        config.screen_tolerance = tolerance;
    }

    let grid_count = scenario.grids.len();
    let mut replay = Replay::new(scenario.grids, config, Duration::from_millis(args.step_ms))?;
    let lines = replay.run(&scenario.steps)?;
    for line in &lines {
        print_json(line, false)?;
    }
    print_json(&replay.snapshot(), false)?;
    info!(grids = grid_count, steps = scenario.steps.len(), notifications = lines.len(), "replay finished");
    Ok(())
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw)?;
        return Ok(raw);
    }
    Ok(fs::read_to_string(path)?)
}

fn print_json(value: &Value, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };
    println!("{rendered}");
    Ok(())
}
