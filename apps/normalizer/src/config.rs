use anyhow::{Context, Result};
use std::time::Duration;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub queue_name: String,
    pub title_mappings_path: String,
    pub failed_buckets_path: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            queue_name: env_or("QUEUE_NAME", "json_processing_queue"),
            title_mappings_path: env_or("TITLE_MAPPINGS_PATH", "job_title_mappings.json"),
            failed_buckets_path: env_or("FAILED_BUCKETS_PATH", "failed_data.json"),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

/// Connection and polling parameters for the Orion clustering oracle.
/// Loaded separately — only the title-map builder needs these, and the
/// ingestion daemon must start without them.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_url: String,
    pub api_key: String,
    pub user_domain: String,
    pub operating_system_code: u32,
    pub ai_model_code: u32,
    pub poll_attempts: u32,
    pub poll_delay: Duration,
}

impl OracleConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(OracleConfig {
            api_url: env_or("ORION_API_URL", "https://gpt.orionsoft.ru/api/External"),
            api_key: require_env("ORION_API_KEY")?,
            user_domain: require_env("ORION_USER_DOMAIN")?,
            operating_system_code: parse_env("ORION_OS_CODE", 12)?,
            ai_model_code: parse_env("ORION_AI_MODEL_CODE", 1)?,
            poll_attempts: parse_env("ORACLE_POLL_ATTEMPTS", 10)?,
            poll_delay: Duration::from_secs(parse_env("ORACLE_POLL_DELAY_SECS", 3)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}
