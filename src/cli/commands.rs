use std::path::Path;

use tracing::info;

use crate::cli::format::{format_duration, format_number, log_to_exp};
use crate::config::settings::SimulatorConfig;
use crate::config::theories::TheoryFile;
use crate::error::ConfigError;
use crate::simulation::recorder::{PublicationRecord, RunHistory, history_channel};
use crate::simulation::{CancelFlag, RunOutcome, SimInput, engine_for, run_to_publication};
use crate::theory::strategy;

/// Run one simulation to publication, wiring ctrl-c to cooperative
/// cancellation.
pub async fn run_simulation(
    config: &SimulatorConfig,
    input: SimInput,
    json: bool,
    show_purchases: bool,
) -> Result<(), ConfigError> {
    let theories = TheoryFile::from_file(Path::new(&config.theory_file))?;
    let (sink, mut history_rx) = history_channel();
    let engine = engine_for(&input, &theories, config.dt, config.ddt, sink)?;

    eprintln!(
        "Simulating {} ({}) from rho {} (dt {}, ddt {})",
        input.theory,
        input.strategy,
        log_to_exp(input.rho, 2),
        config.dt,
        config.ddt,
    );

    let cancel = CancelFlag::new();
    let run = run_to_publication(engine, &cancel, config.yield_interval);
    tokio::pin!(run);

    let outcome = tokio::select! {
        outcome = &mut run => outcome,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nCancellation requested, stopping run");
            cancel.cancel();
            (&mut run).await
        }
    };

    match outcome {
        RunOutcome::Published(record) => {
            info!(
                theory = %record.theory,
                pub_rho = record.pub_rho,
                purchases = record.purchases.len(),
                "publication complete"
            );
            let history: Vec<RunHistory> =
                std::iter::from_fn(|| history_rx.try_recv().ok()).collect();
            if json {
                match serde_json::to_string_pretty(&record) {
                    Ok(rendered) => println!("{rendered}"),
                    Err(e) => eprintln!("Cannot serialize record: {e}"),
                }
            } else {
                print_publication(&record);
                if show_purchases {
                    for run in &history {
                        print_purchases(run);
                    }
                }
            }
        }
        RunOutcome::Cancelled => {
            eprintln!("Run cancelled before publication; partial state discarded");
        }
    }

    Ok(())
}

/// List configured theories, their constants, and the published strategies.
pub fn list_theories(config: &SimulatorConfig) -> Result<(), ConfigError> {
    let theories = TheoryFile::from_file(Path::new(&config.theory_file))?;

    let mut ids: Vec<&String> = theories.theories.keys().collect();
    ids.sort();

    for id in ids {
        let params = &theories.theories[id];
        println!(
            "{} (tau factor {}, publishes at rho {})",
            id,
            params.tau_factor,
            log_to_exp(params.publish_rho, 2)
        );
        println!(
            "  cycles: time {}s, laplace {}s",
            params.time_cycle, params.laplace_cycle
        );
        println!("  variables:");
        for variable in &params.variables {
            println!(
                "    {:<10} cost {} x {}^level in {:?}, buys in {:?} phase",
                variable.name,
                variable.cost_base,
                variable.cost_scale,
                variable.currency,
                variable.unlock,
            );
        }
        let names = strategy::names_for(id);
        if names.is_empty() {
            println!("  strategies: (none published)");
        } else {
            println!("  strategies: {}", names.join(", "));
        }
    }

    Ok(())
}

fn print_publication(record: &PublicationRecord) {
    println!("=== Publication: {} ===", record.theory);
    println!("Strategy:      {}", record.strategy);
    println!("Sigma:         {}", record.sigma);
    println!("Last pub rho:  {}", log_to_exp(record.last_pub, 2));
    println!("Published rho: {}", log_to_exp(record.pub_rho, 2));
    println!("Tau gained:    {}", log_to_exp(record.delta_tau, 2));
    println!("Multiplier:    {}", format_number(record.pub_multi));
    println!("Max tau/hour:  {}", format_number(record.max_tau_per_hour));
    println!("Sim time:      {}", format_duration(record.elapsed));
    println!("Purchases:     {}", record.purchases.len());
}

fn print_purchases(history: &RunHistory) {
    println!(
        "--- purchase history for {} ({}) ---",
        history.theory, history.strategy
    );
    for purchase in &history.purchases {
        println!(
            "  [{}] {} -> level {} for {} {:?}",
            format_duration(purchase.timestamp),
            purchase.variable,
            purchase.level,
            log_to_exp(purchase.cost, 2),
            purchase.symbol,
        );
    }
}
