//! Clustering oracle client — the single point of entry for all Orion LLM
//! API calls in the pipeline.
//!
//! The oracle speaks a three-call protocol: `PostNewRequest` submits a
//! prompt under a fresh dialog id, `GetNewResponse` is polled until the
//! answer materializes, `CompleteSession` discards the dialog context.
//! Callers only ever see `cluster(titles) -> Option<mapping>` — polling
//! mechanics and retry budget stay behind this module.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::OracleConfig;
use crate::titles::prompts::cluster_prompt;

/// A synonym clustering produced by the oracle: canonical title -> all
/// input variants assigned to it.
pub type TitleClusters = HashMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("API rejected request: {0}")]
    Rejected(String),
}

/// The clustering capability the title-map builder depends on. `Ok(None)`
/// means the oracle produced nothing within the polling budget; the caller
/// records the bucket as failed and moves on — never a fatal error.
#[async_trait]
pub trait ClusteringOracle: Send + Sync {
    async fn cluster(&self, titles: &[String]) -> Result<Option<TitleClusters>, OracleError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    operating_system_code: u32,
    api_key: &'a str,
    user_domain_name: &'a str,
    dialog_identifier: &'a str,
    ai_model_code: u32,
    #[serde(rename = "Message")]
    message: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DialogRequest<'a> {
    operating_system_code: u32,
    api_key: &'a str,
    dialog_identifier: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    is_success: bool,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PollResponse {
    data: Option<PollData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PollData {
    last_message: Option<String>,
}

/// Orion-backed oracle implementation. Poll budget and delay come from
/// configuration, not from call sites.
pub struct OrionClient {
    client: Client,
    config: OracleConfig,
}

impl OrionClient {
    pub fn new(config: OracleConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            config,
        }
    }

    async fn submit(&self, dialog_id: &str, message: &str) -> Result<(), OracleError> {
        let body = SubmitRequest {
            operating_system_code: self.config.operating_system_code,
            api_key: &self.config.api_key,
            user_domain_name: &self.config.user_domain,
            dialog_identifier: dialog_id,
            ai_model_code: self.config.ai_model_code,
            message,
        };

        let response = self
            .client
            .post(format!("{}/PostNewRequest", self.config.api_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let submitted: SubmitResponse = response.json().await?;
        if !submitted.is_success {
            return Err(OracleError::Rejected(
                submitted
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            ));
        }
        Ok(())
    }

    /// One poll round. `Ok(None)` covers both "no answer yet" and a
    /// malformed answer — the retry path is the same for either.
    async fn fetch_clusters(&self, dialog_id: &str) -> Result<Option<TitleClusters>, OracleError> {
        let body = DialogRequest {
            operating_system_code: self.config.operating_system_code,
            api_key: &self.config.api_key,
            dialog_identifier: dialog_id,
        };

        let response = self
            .client
            .post(format!("{}/GetNewResponse", self.config.api_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let poll: PollResponse = response.json().await?;
        let Some(text) = poll.data.and_then(|d| d.last_message) else {
            return Ok(None);
        };

        match serde_json::from_str::<TitleClusters>(strip_json_fences(&text)) {
            Ok(clusters) => Ok(Some(clusters)),
            Err(e) => {
                warn!("Oracle answer for dialog {dialog_id} is not a valid clustering: {e}");
                Ok(None)
            }
        }
    }

    async fn complete_session(&self, dialog_id: &str) {
        let body = DialogRequest {
            operating_system_code: self.config.operating_system_code,
            api_key: &self.config.api_key,
            dialog_identifier: dialog_id,
        };

        let result = self
            .client
            .post(format!("{}/CompleteSession", self.config.api_url))
            .json(&body)
            .send()
            .await;
        if let Err(e) = result {
            warn!("Failed to complete oracle session {dialog_id}: {e}");
        }
    }
}

#[async_trait]
impl ClusteringOracle for OrionClient {
    async fn cluster(&self, titles: &[String]) -> Result<Option<TitleClusters>, OracleError> {
        let dialog_id = format!("{}_{}", self.config.user_domain, Uuid::new_v4());
        let prompt = cluster_prompt(titles);

        self.submit(&dialog_id, &prompt).await?;

        for attempt in 1..=self.config.poll_attempts {
            tokio::time::sleep(self.config.poll_delay).await;
            match self.fetch_clusters(&dialog_id).await {
                Ok(Some(clusters)) => {
                    debug!(
                        "Dialog {dialog_id}: clustering of {} titles ready on attempt {attempt}",
                        titles.len()
                    );
                    self.complete_session(&dialog_id).await;
                    return Ok(Some(clusters));
                }
                Ok(None) => {
                    debug!(
                        "Dialog {dialog_id}: no answer yet (attempt {attempt}/{})",
                        self.config.poll_attempts
                    );
                }
                // Poll-round errors burn an attempt but never abort the
                // dialog; the budget decides.
                Err(e) => warn!("Dialog {dialog_id}: poll attempt {attempt} failed: {e}"),
            }
        }

        self.complete_session(&dialog_id).await;
        warn!(
            "Dialog {dialog_id}: no clustering after {} attempts",
            self.config.poll_attempts
        );
        Ok(None)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences the model sometimes
/// wraps around its JSON answer.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
