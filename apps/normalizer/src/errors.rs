use thiserror::Error;

/// Application-level error type shared by all pipeline stages.
///
/// Skipped records (no salary, no description) are NOT errors — they are
/// counted separately by the coordinator and never surface here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] redis::RedisError),

    #[error("Clustering oracle error: {0}")]
    Oracle(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
