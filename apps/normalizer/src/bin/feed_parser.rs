//! Parser-side stage: turns already-fetched raw HH.ru vacancy JSON into
//! normalized 4-part entries and publishes them onto the processing queue
//! in fixed-size chunks.
//!
//! Usage: `feed-parser <raw_vacancies.json>` — a JSON array of vacancy
//! detail payloads. Fetching itself (pagination, rate limits) lives in the
//! upstream parser service.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use normalizer::config::Config;
use normalizer::models::raw::RawVacancy;
use normalizer::models::VacancyEntry;
use normalizer::normalize::{normalize_vacancy, Outcome};

/// Entries per queue message, matching the upstream parser's batching.
const CHUNK_SIZE: usize = 10;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let input_path = std::env::args()
        .nth(1)
        .context("usage: feed-parser <raw_vacancies.json>")?;
    let raw = std::fs::read_to_string(&input_path)
        .with_context(|| format!("reading raw vacancies from {input_path}"))?;
    let payloads: Vec<serde_json::Value> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {input_path}"))?;
    info!("Loaded {} raw payloads from {input_path}", payloads.len());

    let mut entries: Vec<VacancyEntry> = Vec::new();
    let mut skipped = 0u64;
    let mut undecodable = 0u64;
    for payload in payloads {
        let raw: RawVacancy = match serde_json::from_value(payload) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Undecodable raw payload: {e}");
                undecodable += 1;
                continue;
            }
        };
        match normalize_vacancy(&raw) {
            Outcome::Entry(entry) => entries.push(*entry),
            Outcome::Skipped(reason) => {
                warn!("Vacancy {} skipped: {}", raw.id, reason.as_str());
                skipped += 1;
            }
        }
    }

    let redis = redis::Client::open(config.redis_url.clone())?;
    let mut conn = redis.get_multiplexed_async_connection().await?;

    let mut published = 0usize;
    for chunk in entries.chunks(CHUNK_SIZE) {
        let body = serde_json::to_string(chunk)?;
        redis::cmd("RPUSH")
            .arg(&config.queue_name)
            .arg(body)
            .query_async::<_, ()>(&mut conn)
            .await?;
        published += 1;
        info!("Published chunk of {} vacancies", chunk.len());
    }

    info!(
        "Done: {} entries in {published} message(s), {skipped} skipped, {undecodable} undecodable",
        entries.len()
    );
    Ok(())
}
