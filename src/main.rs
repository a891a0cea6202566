//! touchpoint-attribution CLI
//!
//! Usage: `touchpoint-attribution <journeys.json>`
//!
//! Reads a JSON array of journeys, runs every attribution model plus the
//! insights pass, and prints one JSON document to stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing::info;

use touchpoint_attribution::adapters::ConversionValueResolver;
use touchpoint_attribution::application::{
    AllModelRuns, AttributionError, InsightsOptions, JourneyInsights, JourneyInsightsHandler,
    RunAllModelsHandler,
};
use touchpoint_attribution::config::{AppConfig, ConfigError, LoggingConfig};
use touchpoint_attribution::domain::attribution::AttributionModel;
use touchpoint_attribution::domain::journey::Journey;

/// Runs every attribution model and the journey insights over a journey file
#[derive(Parser, Debug)]
#[command(name = "touchpoint-attribution", version, about)]
struct Args {
    /// Path to a JSON array of journeys
    journeys: PathBuf,
}

#[derive(Serialize)]
struct Report {
    default_model: AttributionModel,
    models: AllModelRuns,
    insights: JourneyInsights,
}

fn main() -> Result<(), AttributionError> {
    let config = AppConfig::load()?;
    config.validate().map_err(ConfigError::from)?;
    init_tracing(&config.logging)?;

    let args = Args::parse();
    let path = args.journeys;

    let raw = std::fs::read_to_string(&path)?;
    let journeys: Vec<Journey> = serde_json::from_str(&raw)?;
    info!(path = %path.display(), journeys = journeys.len(), "Journeys loaded");

    let resolver = Arc::new(ConversionValueResolver::new());
    let options = config.attribution.to_options();

    let models = RunAllModelsHandler::new(resolver.clone()).run_all_models(&journeys, &options);
    let insights = JourneyInsightsHandler::new(resolver).analyze(
        &journeys,
        &InsightsOptions {
            include_non_converted: true,
            campaign_level: options.campaign_level,
        },
    );

    let report = Report {
        default_model: config.attribution.default_model().map_err(ConfigError::from)?,
        models,
        insights,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = logging.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
