//! City influence simulation
//!
//! Runs a scenario file or a seeded random city through the metrics engine
//! and writes per-tick metrics.

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use city_model::LayoutError;
use city_sim::{
    format_reports, generate_city, write_summary, City, GeneratorConfig, MetricsLogger,
    OutputError, Scenario, ScenarioError,
};
use metrics_engine::{default_tuning_toml, EngineError, MetricsEngine};

/// Ticks to run when neither the command line nor the scenario says
const DEFAULT_TICKS: u64 = 10;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "city_sim")]
#[command(about = "Influence-based city metrics simulation")]
struct Args {
    /// Scenario file (JSON); a random city is generated when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Random seed for the generated city
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of buildings in the generated city
    #[arg(long, default_value_t = 40)]
    buildings: usize,

    /// Coefficient file (TOML); built-in tuning when omitted
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long)]
    ticks: Option<u64>,

    /// Per-tick metrics log (JSONL)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run summary (JSON)
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Print per-building accessibility after the run
    #[arg(long)]
    inspect: bool,

    /// Print the default tuning file and exit
    #[arg(long)]
    print_default_tuning: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "city_sim=info,metrics_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if args.print_default_tuning {
        print!("{}", default_tuning_toml());
        return;
    }

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let engine = match &args.tuning {
        Some(path) => {
            info!("Loading tuning from {}", path.display());
            MetricsEngine::from_config_file(path)?
        }
        None => MetricsEngine::with_defaults(),
    };

    let scenario = match &args.scenario {
        Some(path) => {
            info!("Loading scenario from {}", path.display());
            Scenario::from_file(path)?
        }
        None => {
            let config = GeneratorConfig {
                buildings: args.buildings,
                ..GeneratorConfig::default()
            };
            info!("Generating city from seed {}", args.seed);
            Scenario::from_layout(format!("random-{}", args.seed), generate_city(args.seed, &config))
        }
    };

    let ticks = args.ticks.or(scenario.ticks).unwrap_or(DEFAULT_TICKS);

    let mut city = City::new(&scenario.layout, engine)?;
    if let Some(path) = &args.output {
        city = city.with_logger(MetricsLogger::new(path)?);
    }

    let summary = scenario.run(&mut city, ticks)?;
    city.flush_log()?;

    if let Some(snapshot) = summary.final_snapshot {
        info!("Final metrics after {} ticks: {}", summary.total_ticks, snapshot);
    }
    if let Some(path) = &args.output {
        info!("Wrote metrics log to {}", path.display());
    }
    if let Some(path) = &args.summary {
        write_summary(&summary, path)?;
        info!("Wrote run summary to {}", path.display());
    }

    if args.inspect {
        println!();
        print!("{}", format_reports(&city.inspect()));
    }

    Ok(())
}
