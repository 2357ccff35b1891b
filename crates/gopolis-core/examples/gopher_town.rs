//! The reference town, headless.
//!
//! Runs 20 gophers through ten days, prints the per-day reports, the final
//! city summary, and checks that a second run with the same seed agrees.
//!
//! Run with: `cargo run -p gopolis-core --example gopher_town --features test-utils`

use gopolis_core::driver::Simulation;
use gopolis_core::fixed::fixed64_to_f64;
use gopolis_core::test_utils::gopher_town;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut sim = Simulation::new(gopher_town(), 42);
    for report in sim.run(10) {
        println!(
            "day {:>2}: {:>2} shopped, {:>2} worked, {:>2} employed, mean happiness {:.2}",
            report.day,
            report.shopped,
            report.worked,
            report.employed,
            fixed64_to_f64(report.mean_happiness),
        );
    }

    println!();
    println!("{}", sim.snapshot());

    let mut again = Simulation::new(gopher_town(), 42);
    again.run(10);
    println!();
    println!(
        "state hash {:016x} (second run {})",
        sim.state_hash(),
        if again.state_hash() == sim.state_hash() {
            "matches"
        } else {
            "DIVERGED"
        }
    );
}
