//! Headless run - simulate a forest without a window and print composition reports
//! Run with: cargo run --bin headless --release -- [ticks] [seed]

use forest_rs::config::ForestConfig;
use forest_rs::debug;
use forest_rs::diagnostics;
use forest_rs::forest::Forest;

const DEFAULT_TICKS: u64 = 5000;
const REPORT_EVERY: u64 = 1000;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    debug::init();
    // counters are process-wide; start this run from zero
    debug::reset_stats();

    let mut args = std::env::args().skip(1);
    let ticks = args
        .next()
        .and_then(|a| a.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TICKS);
    let seed = args.next().and_then(|a| a.parse::<u64>().ok());

    let config = ForestConfig::from_env();
    let created = match seed {
        Some(seed) => Forest::with_seed(config, seed),
        None => Forest::new(config),
    };
    let mut forest = match created {
        Ok(forest) => forest,
        Err(err) => {
            eprintln!("invalid forest configuration: {err}");
            std::process::exit(1);
        }
    };

    println!("=== FOREST HEADLESS RUN ===");
    println!(
        "Canvas {}x{}, {} species, policy {}, {} ticks",
        forest.config().width,
        forest.config().height,
        forest.config().number_species,
        forest.config().policy.name(),
        ticks
    );

    for i in 1..=ticks {
        forest.tick();
        if i % REPORT_EVERY == 0 {
            println!(
                "Tick {}: trees={} seeds={} births={} deaths={}",
                i,
                forest.population(),
                forest.total_seeds,
                forest.total_births,
                forest.total_deaths
            );
        }
    }

    diagnostics::analyze(&forest).print_report();

    println!("\nRecent events:");
    for event in debug::get_recent_events(10) {
        println!("  {}", event);
    }
    debug::print_stats();
}

// The headless runner only makes sense with a terminal
#[cfg(target_arch = "wasm32")]
fn main() {}
