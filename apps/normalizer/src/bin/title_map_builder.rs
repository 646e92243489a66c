//! Offline batch job: clusters the raw job-title universe into synonym
//! groups via the Orion oracle and writes the canonical mapping file the
//! ingestion daemon loads at startup.
//!
//! Usage: `title-map-builder [titles.json]` — the input file is a JSON
//! array of distinct raw titles (defaults to `hh_job_titles.json`).

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use normalizer::config::{Config, OracleConfig};
use normalizer::llm_client::OrionClient;
use normalizer::titles::builder;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    let oracle_config = OracleConfig::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "hh_job_titles.json".to_string());
    let raw = std::fs::read_to_string(&input_path)
        .with_context(|| format!("reading title universe from {input_path}"))?;
    let titles: Vec<String> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {input_path}"))?;
    info!("Loaded {} raw titles from {input_path}", titles.len());

    let oracle = OrionClient::new(oracle_config);
    let outcome = builder::run_build(
        &oracle,
        &titles,
        Path::new(&config.title_mappings_path),
        Path::new(&config.failed_buckets_path),
    )
    .await?;

    info!(
        "Done: {} canonical titles written to {}; {} failed buckets in {}",
        outcome.mappings.len(),
        config.title_mappings_path,
        outcome.failed_buckets.len(),
        config.failed_buckets_path
    );
    Ok(())
}
