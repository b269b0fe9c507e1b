//! Event loop simulator CLI
//!
//! Entry point for `loopsim`. Parses CLI arguments, runs the selected
//! scenarios and prints their reports.

use clap::Parser;
use loop_cli::runner::render_text;
use loop_cli::{Cli, CliError, CliResult, Runner, Scenario};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_filter());

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> CliResult<()> {
    if cli.list {
        for scenario in Scenario::ALL {
            println!("{:<22}{}", scenario.name(), scenario.description());
        }
        return Ok(());
    }

    let scenarios = cli.selected();
    if scenarios.is_empty() {
        return Err(CliError::NoScenario);
    }

    let runner = Runner::new(cli.loop_config()?);
    let reports = runner.run_all(&scenarios);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print!("{}", render_text(report));
        }
    }

    let failed = reports.iter().filter(|r| !r.passed()).count();
    if failed > 0 {
        return Err(CliError::Failed { failed });
    }
    Ok(())
}
