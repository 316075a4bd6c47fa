//! # Daily Briefing
//!
//! Assembles a personal daily briefing from public web sources and prints it
//! to stdout: a one-day weather forecast, the top headlines from a fixed set
//! of news feeds, and optionally a random fact, a joke and an "on this day"
//! event.
//!
//! ## Usage
//!
//! ```sh
//! OPENWEATHERMAP_API_KEY=... daily_briefing london
//! ```
//!
//! ## Architecture
//!
//! A single linear pass:
//! 1. **Configuration**: parse flags/env, validate the API key, resolve the location
//! 2. **News**: read each feed in order, optionally fetch article previews, deduplicate, truncate
//! 3. **Weather & novelties**: one request each, skipped when disabled
//! 4. **Output**: render text to stdout (and optionally JSON to a file)
//!
//! Every upstream failure degrades its own section only. Logs go to stderr.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod models;
mod outputs;
mod pipeline;
mod sources;
mod utils;
#[cfg(test)]
mod testing;

use cli::Cli;
use config::load_feeds;
use outputs::{json, text};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // --- Tracing init ---
    let default_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("daily_briefing starting up");

    let (config, location) = match args.resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    debug!(?config, ?location, feeds_file = ?args.feeds_file, json_output = ?args.json_output, "Resolved configuration");

    let feeds = match load_feeds(args.feeds_file.as_deref()).await {
        Ok(feeds) => feeds,
        Err(e) => {
            error!(error = %e, "Could not load feeds");
            return Err(e.into());
        }
    };

    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

    let now = Local::now().naive_local();
    let data = pipeline::assemble(&client, &config, &location, &feeds, now.date()).await;

    if let Some(path) = &args.json_output {
        if let Err(e) = json::write_briefing_json(&data, path).await {
            warn!(path = %path.display(), error = %e, "Failed to write briefing JSON; continuing");
        }
    }

    println!("{}", text::render_briefing(&data, &config, now));

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        news = data.news.len(),
        weather = data.weather.is_some(),
        "Execution complete"
    );
    Ok(())
}
