//! Symposium — dining philosophers around a shared table monitor.
//!
//! Run a dinner and write the state log for later inspection.

use std::env;
use std::fs::File;
use std::sync::Arc;

use symposium_dinner::{DinnerPolicy, Symposium, DEFAULT_SEATS, DEFAULT_STEPS};
use symposium_events::EventLog;

const LOG_PATH: &str = "dinner.log";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Parse command line args
    let args: Vec<String> = env::args().collect();

    let seats: usize = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEATS);

    let steps: usize = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_STEPS);

    let seed: u64 = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(rand::random);

    println!("Symposium");
    println!("=========");
    println!();
    println!("{seats} philosopher(s) came in for a dinner.");
    println!("  Cycles per philosopher: {steps}");
    println!("  Seed: {seed}");
    println!();

    let log = EventLog::to_writer(File::create(LOG_PATH)?)?;
    let policy = DinnerPolicy::default().with_steps(steps);
    let symposium = Symposium::new(seats, policy, seed, Arc::new(log.sender()));

    symposium.start()?;
    let summary = symposium.join();

    println!("All philosophers have left ({summary}).");
    println!("State log written to {LOG_PATH}");

    log.finish();
    Ok(())
}
