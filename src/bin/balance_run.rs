//! Headless balance runner
//!
//! Runs one simulated playthrough and prints the run summary as JSON.
//! Typical use:
//!
//! ```text
//! balance_run --persona speedrunner --days 30 --seed 7 \
//!     --overrides tweaks.json --trace-out trace.json
//! ```

use clap::Parser;
use croft::content::{load_content, ContentTable, OverrideSet};
use croft::core::config::SimulationConfig;
use croft::engine::{load_personas, Persona, Simulation};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "balance_run", about = "Run a headless balance simulation")]
struct Args {
    /// Persona to play as (builtin name, or one defined in --personas)
    #[arg(long, default_value = "casual")]
    persona: String,

    /// TOML file with additional persona definitions
    #[arg(long)]
    personas: Option<PathBuf>,

    /// Simulated days to run
    #[arg(long, default_value_t = 30.0)]
    days: f64,

    /// RNG seed; identical seeds reproduce identical runs
    #[arg(long)]
    seed: Option<u64>,

    /// Content table TOML; defaults to the built-in content set
    #[arg(long)]
    content: Option<PathBuf>,

    /// JSON file of parameter overrides to merge before the run
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Milestone that ends the run as a victory
    #[arg(long)]
    victory: Option<String>,

    /// Write the full decision trace to this path
    #[arg(long)]
    trace_out: Option<PathBuf>,
}

fn find_persona(args: &Args) -> croft::Result<Persona> {
    if let Some(path) = &args.personas {
        if let Some(persona) = load_personas(path)?
            .into_iter()
            .find(|p| p.name() == args.persona)
        {
            return Ok(persona);
        }
    }
    Persona::builtin(&args.persona).ok_or_else(|| {
        croft::CroftError::ConfigError(format!(
            "unknown persona '{}' (builtins: {})",
            args.persona,
            Persona::builtin_names().join(", ")
        ))
    })
}

fn run(args: Args) -> croft::Result<()> {
    let mut config = SimulationConfig::default();
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(victory) = args.victory.clone() {
        config.victory_milestone = Some(victory);
    }

    let mut content = match &args.content {
        Some(path) => load_content(path)?,
        None => ContentTable::with_defaults(),
    };

    if let Some(path) = &args.overrides {
        let overrides = OverrideSet::load(path)?;
        let applied = overrides.apply(&mut config, &mut content)?;
        info!(count = applied.len(), "applied parameter overrides");
    }

    let persona = find_persona(&args)?;
    let mut sim = Simulation::new(config, content, persona)?;
    let summary = sim.run_days(args.days)?;

    if let Some(path) = &args.trace_out {
        sim.trace().write_to(path)?;
        info!(path = %path.display(), decisions = sim.trace().len(), "trace written");
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "run failed");
            ExitCode::FAILURE
        }
    }
}
