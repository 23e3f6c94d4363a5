mod achievements;
mod auth;
mod browse;
mod cities;
mod cli;
mod config;
mod itinerary;
mod model;
mod storage;

use std::{env, process};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use storage::Storage;

/// Environment variable holding the log filter, e.g. `wayfarer=debug`.
const LOG_ENV: &str = "WAYFARER_LOG";

fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    init_tracing(&config);

    let Some(root) = config.data_dir() else {
        eprintln!("Could not determine home directory.");
        process::exit(1);
    };

    let storage = match Storage::open(&root) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize storage at {}: {e}", root.display());
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(&config, &storage) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays clean for IDs and JSON.
fn init_tracing(config: &Config) {
    let filter = env::var(LOG_ENV)
        .ok()
        .or_else(|| config.log.clone())
        .unwrap_or_else(|| "warn".to_string());

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
