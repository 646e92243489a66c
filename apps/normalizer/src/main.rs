use std::path::Path;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use normalizer::config::Config;
use normalizer::consumer::Consumer;
use normalizer::db;
use normalizer::titles::SynonymMap;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting vacancy normalizer v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = db::create_pool(&config.database_url).await?;
    db::ensure_schema(&pool).await?;

    // Initialize the queue transport
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Load the synonym lookup; a missing map degrades to passthrough
    let titles = SynonymMap::load(Path::new(&config.title_mappings_path));

    Consumer::new(pool, redis, config.queue_name.clone(), titles)
        .run()
        .await?;

    Ok(())
}
