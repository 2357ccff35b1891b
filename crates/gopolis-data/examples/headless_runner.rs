//! Headless runner for scenario files.
//!
//! Loads a scenario (the bundled gopher town when no path is given), runs
//! it twice for its configured number of days, prints the final report and
//! compares the state hashes of the two runs.
//!
//! Run with: `cargo run -p gopolis-data --example headless_runner [scenario.toml]`

use std::path::PathBuf;
use std::process::ExitCode;

use gopolis_data::{DataLoadError, Scenario, gopher_town, load_scenario};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn load() -> Result<Scenario, DataLoadError> {
    match std::env::args_os().nth(1) {
        Some(path) => load_scenario(&PathBuf::from(path)),
        None => gopher_town(),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let scenario = match load() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to load scenario");
            return ExitCode::FAILURE;
        }
    };
    let days = scenario.config.days;

    let mut first = scenario.simulation();
    first.run(days);
    let mut second = scenario.into_simulation();
    second.run(days);

    println!("{}", first.snapshot());
    println!();
    println!("run 1 hash: {:016x}", first.state_hash());
    println!("run 2 hash: {:016x}", second.state_hash());

    if first.state_hash() == second.state_hash() {
        println!("deterministic: yes");
        ExitCode::SUCCESS
    } else {
        println!("deterministic: NO");
        ExitCode::FAILURE
    }
}
