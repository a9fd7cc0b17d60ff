use clap::{Parser, Subcommand};
use std::path::Path;

use theorysim::cli::commands;
use theorysim::config::settings::SimulatorConfig;
use theorysim::simulation::{Cap, Recovery, SimInput};

#[derive(Parser)]
#[command(name = "theorysim")]
#[command(about = "A tick-driven publication simulator for incremental-game theories")]
#[command(version)]
struct Cli {
    /// Path to the simulator configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a theory until it publishes
    Run {
        /// Theory identifier
        #[arg(short, long, default_value = "LT-c4")]
        theory: String,

        /// Strategy name
        #[arg(short, long, default_value = "LT-c4")]
        strategy: String,

        /// Log-space rho of the previous publication
        #[arg(long, default_value_t = 0.0)]
        rho: f64,

        /// Student count carried into the run
        #[arg(long, default_value_t = 0)]
        sigma: u32,

        /// Force publication once rho reaches 1e<CAP>
        #[arg(long)]
        cap: Option<f64>,

        /// Log-space rho of the recovery point
        #[arg(long, default_value_t = 0.0)]
        recovery_value: f64,

        /// Sim time of the recovery point, in seconds
        #[arg(long)]
        recovery_time: Option<f64>,

        /// Report the recovery time itself instead of the elapsed time
        #[arg(long)]
        report_recovery_time: bool,

        /// Emit the raw publication record as JSON
        #[arg(long)]
        json: bool,

        /// Print the full purchase history
        #[arg(long)]
        purchases: bool,
    },

    /// List configured theories and their strategies
    Theories,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match SimulatorConfig::from_file(Path::new(&cli.config)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.log_level);

    match cli.command {
        Commands::Run {
            theory,
            strategy,
            rho,
            sigma,
            cap,
            recovery_value,
            recovery_time,
            report_recovery_time,
            json,
            purchases,
        } => {
            let input = SimInput {
                theory,
                strategy,
                rho,
                sigma,
                cap: cap.map(|value| Cap {
                    value,
                    enabled: true,
                }),
                recovery: recovery_time.map(|time| Recovery {
                    value: recovery_value,
                    time,
                    recovery_time: report_recovery_time,
                }),
            };
            if let Err(e) = commands::run_simulation(&config, input, json, purchases).await {
                eprintln!("Simulation error: {e}");
                std::process::exit(1);
            }
        }

        Commands::Theories => {
            if let Err(e) = commands::list_theories(&config) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
