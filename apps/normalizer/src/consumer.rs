//! Ingestion coordinator: drains the queue transport and runs each message
//! through prepare -> reconcile inside one transaction.
//!
//! One message is processed fully (decode, normalize, reconcile, commit,
//! acknowledge) before the next is pulled — no overlap between messages.
//! The transport is a redis list consumed with the reliable-queue pattern:
//! `BLMOVE` parks the payload on a processing list until it is either
//! acknowledged (removed) or rejected (moved to the dead-letter list,
//! never requeued — a failing message is presumed permanently malformed).

use redis::aio::MultiplexedConnection;
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::records::MessageBody;
use crate::normalize;
use crate::reconcile::reconcile;
use crate::titles::SynonymMap;

pub struct Consumer {
    pool: PgPool,
    redis: redis::Client,
    queue: String,
    titles: SynonymMap,
    processed: u64,
    errors: u64,
    skipped: u64,
}

impl Consumer {
    pub fn new(pool: PgPool, redis: redis::Client, queue: String, titles: SynonymMap) -> Self {
        Self {
            pool,
            redis,
            queue,
            titles,
            processed: 0,
            errors: 0,
            skipped: 0,
        }
    }

    fn processing_key(&self) -> String {
        format!("{}:processing", self.queue)
    }

    fn dead_letter_key(&self) -> String {
        format!("{}:dead", self.queue)
    }

    /// Blocks on the queue until CTRL+C. Infrastructure failures (store or
    /// transport unreachable) abort the loop; the in-flight payload stays
    /// on the processing list and is requeued at next startup.
    pub async fn run(mut self) -> Result<(), AppError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        self.recover(&mut conn).await?;

        info!(
            "Consumer started, waiting for messages on '{}' (CTRL+C to stop)",
            self.queue
        );

        loop {
            let payload = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping consumer");
                    break;
                }
                result = self.next_message(&mut conn) => result?,
            };

            match self.handle_message(&payload).await {
                Ok((written, skipped)) => {
                    self.processed += 1;
                    self.skipped += skipped;
                    self.ack(&mut conn, &payload).await?;
                    info!(
                        "Message done: {written} vacancies written, {skipped} skipped (messages total: {})",
                        self.processed
                    );
                }
                Err(e) if is_fatal(&e) => {
                    // Not acknowledged on purpose: the payload survives on
                    // the processing list for the next run.
                    error!("Infrastructure failure, stopping consumer: {e}");
                    return Err(e);
                }
                Err(e) => {
                    self.errors += 1;
                    warn!("Message rejected without requeue: {e}");
                    self.reject(&mut conn, &payload).await?;
                }
            }
        }

        info!(
            "Consumer stopped. Processed: {}, errors: {}, skipped records: {}",
            self.processed, self.errors, self.skipped
        );
        Ok(())
    }

    /// Decodes and persists one message. Batched sub-records share the
    /// message's single transaction: one bad entry rolls back the whole
    /// message. Returns (written, skipped) counts on success.
    async fn handle_message(&self, payload: &str) -> Result<(usize, u64), AppError> {
        let body: MessageBody = serde_json::from_str(payload)
            .map_err(|e| AppError::Malformed(format!("undecodable message body: {e}")))?;
        let entries = body.into_entries();
        if entries.is_empty() {
            return Ok((0, 0));
        }

        let mut tx = self.pool.begin().await?;
        let mut written = 0usize;
        let mut skipped = 0u64;
        for mut entry in entries {
            match normalize::prepare_for_ingest(&mut entry, &self.titles) {
                None => {
                    reconcile(&mut tx, &entry).await?;
                    written += 1;
                }
                Some(reason) => {
                    warn!(
                        "Vacancy {} skipped: {}",
                        entry.vacancies.external_id,
                        reason.as_str()
                    );
                    skipped += 1;
                }
            }
        }
        tx.commit().await?;
        Ok((written, skipped))
    }

    async fn next_message(&self, conn: &mut MultiplexedConnection) -> Result<String, AppError> {
        let payload: String = redis::cmd("BLMOVE")
            .arg(&self.queue)
            .arg(self.processing_key())
            .arg("LEFT")
            .arg("RIGHT")
            .arg(0) // block until a message arrives
            .query_async(conn)
            .await?;
        Ok(payload)
    }

    async fn ack(&self, conn: &mut MultiplexedConnection, payload: &str) -> Result<(), AppError> {
        redis::cmd("LREM")
            .arg(self.processing_key())
            .arg(1)
            .arg(payload)
            .query_async::<_, ()>(conn)
            .await?;
        Ok(())
    }

    async fn reject(&self, conn: &mut MultiplexedConnection, payload: &str) -> Result<(), AppError> {
        redis::cmd("LREM")
            .arg(self.processing_key())
            .arg(1)
            .arg(payload)
            .query_async::<_, ()>(conn)
            .await?;
        redis::cmd("RPUSH")
            .arg(self.dead_letter_key())
            .arg(payload)
            .query_async::<_, ()>(conn)
            .await?;
        Ok(())
    }

    /// Moves payloads a previous run left on the processing list back to
    /// the inbound queue. Redelivery is safe: reconciliation is idempotent.
    async fn recover(&self, conn: &mut MultiplexedConnection) -> Result<(), AppError> {
        let mut recovered = 0u64;
        loop {
            let moved: Option<String> = redis::cmd("LMOVE")
                .arg(self.processing_key())
                .arg(&self.queue)
                .arg("LEFT")
                .arg("LEFT")
                .query_async(conn)
                .await?;
            if moved.is_none() {
                break;
            }
            recovered += 1;
        }
        if recovered > 0 {
            info!("Requeued {recovered} in-flight message(s) from a previous run");
        }
        Ok(())
    }
}

/// Store/transport unreachability is a hard failure for the whole loop;
/// everything else fails only the current message.
fn is_fatal(error: &AppError) -> bool {
    match error {
        AppError::Transport(_) => true,
        AppError::Database(e) => matches!(
            e,
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undecodable_body_is_malformed() {
        let err = serde_json::from_str::<MessageBody>("{broken")
            .map_err(|e| AppError::Malformed(e.to_string()))
            .unwrap_err();
        assert!(!is_fatal(&err));
    }

    #[test]
    fn test_pool_exhaustion_is_fatal() {
        assert!(is_fatal(&AppError::Database(sqlx::Error::PoolTimedOut)));
    }

    #[test]
    fn test_constraint_style_errors_fail_one_message_only() {
        assert!(!is_fatal(&AppError::Database(sqlx::Error::RowNotFound)));
        assert!(!is_fatal(&AppError::Malformed("missing key".into())));
    }
}
