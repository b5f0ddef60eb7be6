mod location;
mod sink;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use offie_core::{DistanceUnit, SearchSettings, SortKey};
use offie_places::GoogleMapsClient;
use offie_search::{SearchCoordinator, SearchOutcome};
use tracing_subscriber::EnvFilter;

use crate::location::FixedLocation;
use crate::sink::TerminalSink;

#[derive(Debug, Parser)]
#[command(name = "offie")]
#[command(about = "Find shops open near you")]
struct Cli {
    /// Order results by distance, rating or name
    #[arg(long, global = true)]
    sort: Option<SortKey>,
    /// Show distances in miles or km
    #[arg(long, global = true)]
    units: Option<DistanceUnit>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search around a street address, post code or zip code
    Address {
        /// Free-text address to geocode
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Search around the current position
    Here {
        /// Latitude in degrees
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude in degrees
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = offie_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let categories = offie_core::load_categories(&config.categories_path)?;
    let mut settings = SearchSettings::from_config(&config, categories);
    if let Some(sort) = cli.sort {
        settings.sort_key = sort;
    }
    if let Some(units) = cli.units {
        settings.unit = units;
    }
    tracing::debug!(env = %config.env, ?settings, "starting search");

    let client = Arc::new(
        GoogleMapsClient::new(&config.google_maps_api_key, config.request_timeout_secs)?
            .with_retry_policy(config.max_retries, config.retry_backoff_base_ms)
            .with_open_now(config.open_now),
    );
    let geolocation = match &cli.command {
        Commands::Here {
            lat: Some(lat),
            lng: Some(lng),
        } => FixedLocation::at(*lat, *lng),
        _ => FixedLocation::unknown(),
    };
    let coordinator = SearchCoordinator::new(
        Arc::new(geolocation),
        client.clone(),
        client,
        Arc::new(TerminalSink::stdout()),
        settings,
    );

    let outcome = match &cli.command {
        Commands::Address { text } => coordinator.search_by_address(&text.join(" ")).await,
        Commands::Here { .. } => coordinator.search_by_location().await,
    };

    match outcome {
        Ok(SearchOutcome::Completed(results)) if results.failures.is_empty() => {
            Ok(ExitCode::SUCCESS)
        }
        // Partial results were shown; signal that some categories are missing.
        Ok(SearchOutcome::Completed(_)) => Ok(ExitCode::from(2)),
        Ok(SearchOutcome::Superseded) | Err(_) => Ok(ExitCode::FAILURE),
    }
}

#[cfg(test)]
mod tests;
