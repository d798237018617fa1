//! Engine binary for the Lattice simulation kernel.
//!
//! Loads configuration, builds one of the demonstration models on the
//! configured space and schedule, runs it, and logs a JSON run report.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `lattice-config.yaml` (or the path given as
//!    the first argument)
//! 3. Build the schedule from the `schedule` section
//! 4. Build and populate the model named by `model.kind`
//! 5. Run for at most `run.max_steps` ticks
//! 6. Log the report

mod error;
mod flock;
mod schelling;

use std::path::{Path, PathBuf};

use lattice_core::RunSummary;
use lattice_core::config::{ModelKind, SimulationConfig};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::flock::FlockReport;
use crate::schelling::SchellingReport;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "lattice-config.yaml";

/// Model-specific results.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Outcome {
    /// Segregation results.
    Schelling(SchellingReport),
    /// Flocking results.
    Flock(FlockReport),
}

/// Everything logged at the end of a run.
#[derive(Debug, Serialize)]
struct Report<'a> {
    /// Run name.
    name: &'a str,
    /// Seed the model was built with.
    seed: u64,
    /// Activation regime.
    regime: &'static str,
    /// Counters.
    run: RunSummary,
    /// Model-specific results.
    outcome: Outcome,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, model construction, or the run fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);

    // Logging comes first, but its fallback level lives in the config.
    let loaded = load_config(&path);
    let fallback = loaded
        .as_ref()
        .map_or_else(|_| "info".to_owned(), |config| config.logging.level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(true)
        .init();

    info!("lattice-engine starting");
    let config = loaded?;
    info!(
        name = config.world.name,
        seed = config.world.seed,
        model = ?config.model.kind,
        regime = ?config.schedule.regime,
        max_steps = config.run.max_steps,
        "Configuration loaded"
    );

    let json = run(&config)?;
    info!(report = %json, "run report");
    Ok(())
}

/// Build, run, and report on the configured model.
fn run(config: &SimulationConfig) -> Result<String, EngineError> {
    config.model.validate()?;
    let schedule = config.schedule.build()?;
    let regime = schedule.regime();
    let seed = config.world.seed;
    let max_steps = config.run.max_steps;

    let (run, outcome) = match config.model.kind {
        ModelKind::Schelling => {
            let space = config.space.single_grid()?;
            let mut model = schelling::build(space, schedule, seed, &config.model)?;
            let summary = model.run_until(max_steps, schelling::all_happy)?;
            (summary, Outcome::Schelling(SchellingReport::of(&model)))
        }
        ModelKind::Flock => {
            let space = config.space.continuous()?;
            let mut model = flock::build(space, schedule, seed, &config.model)?;
            let summary = model.run(max_steps)?;
            (summary, Outcome::Flock(FlockReport::of(&model)))
        }
    };

    let report = Report {
        name: &config.world.name,
        seed,
        regime,
        run,
        outcome,
    };
    Ok(serde_json::to_string(&report)?)
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
fn load_config(path: &Path) -> Result<SimulationConfig, EngineError> {
    if path.exists() {
        let config = SimulationConfig::from_file(path)?;
        Ok(config)
    } else {
        Ok(SimulationConfig::default())
    }
}
