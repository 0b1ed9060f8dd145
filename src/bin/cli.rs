//! Clima CLI
//!
//! Local execution entry point for the weather pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clima::{
    error::Result,
    models::{Config, Snapshot},
    pipeline::WeatherPipeline,
    storage::{LocalStorage, SnapshotStore},
};

/// clima - San Luis weather bulletin scraper
#[derive(Parser, Debug)]
#[command(
    name = "clima",
    version,
    about = "Scrapes the San Luis provincial weather bulletin"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the bulletin and print the snapshot as JSON
    Fetch,

    /// Print one station by name
    Station {
        /// Station name, case-insensitive
        name: String,
    },

    /// List stations with a temperature reading, warmest first
    Stations,

    /// Validate the configuration file
    Validate,

    /// Show the saved snapshot info
    Info,
}

/// Initialize logging: verbose wins, then the configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn report(snapshot: &Snapshot) {
    if !snapshot.success {
        log::error!(
            "No weather data available: {}",
            snapshot.error.as_deref().unwrap_or("unknown error")
        );
    } else if snapshot.using_cache {
        log::warn!(
            "Serving saved snapshot from {}",
            snapshot
                .saved_at
                .map_or_else(|| "unknown time".to_string(), |t| t.to_rfc3339())
        );
    }

    if let Some(forecast) = snapshot.forecast.as_ref().filter(|f| f.has_alert()) {
        let zone = forecast
            .alert
            .as_ref()
            .and_then(|a| a.affected_zone.as_deref())
            .unwrap_or("zone not given");
        log::warn!("Weather alert in effect: {}", zone);
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, load_error) = match Config::load(&cli.config) {
        Ok(config) => (config.apply_env(), None),
        Err(e) => (Config::default().apply_env(), Some(e)),
    };
    init_logging(cli.verbose, &config.logging.level);

    if let Some(e) = &load_error {
        log::warn!(
            "Config load failed from {:?}: {}. Using defaults.",
            cli.config,
            e
        );
    } else {
        log::info!("Loaded configuration from {}", cli.config.display());
    }

    match cli.command {
        Command::Fetch => {
            let pipeline = WeatherPipeline::from_config(&config)?;
            let snapshot = pipeline.get_weather().await;
            report(&snapshot);
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        Command::Station { name } => {
            let pipeline = WeatherPipeline::from_config(&config)?;
            let snapshot = pipeline.get_weather().await;
            report(&snapshot);

            match snapshot.find_station(&name) {
                Some(station) => println!("{}", serde_json::to_string_pretty(station)?),
                None => log::warn!("No station named '{}'", name),
            }
        }

        Command::Stations => {
            let pipeline = WeatherPipeline::from_config(&config)?;
            let snapshot = pipeline.get_weather().await;
            report(&snapshot);

            for station in snapshot.stations_with_reading() {
                println!(
                    "{:>6.1}°C  {:>6.1} mm  {}",
                    station.temperature.unwrap_or_default(),
                    station.precipitation,
                    station.name
                );
            }

            let silent = snapshot.stations_without_reading();
            if !silent.is_empty() {
                log::info!("{} station(s) without a temperature reading", silent.len());
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Some(e) = load_error {
                log::error!("Config could not be loaded: {}", e);
                return Err(e);
            }
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info => {
            let storage = LocalStorage::new(&config.cache.path);
            log::info!("Source URL: {}", config.source.url);
            log::info!("Cache file: {}", storage.path().display());

            match storage.load().await {
                Ok(Some(snapshot)) => {
                    match snapshot.saved_at {
                        Some(saved_at) => log::info!("Last saved: {}", saved_at.to_rfc3339()),
                        None => log::info!("Last saved: unknown"),
                    }
                    log::info!("Stations in saved snapshot: {}", snapshot.stations.len());
                }
                Ok(None) => log::info!("No snapshot saved yet."),
                Err(e) => log::warn!("Saved snapshot unreadable: {}", e),
            }
        }
    }

    Ok(())
}
