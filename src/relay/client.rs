use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::api::{API_VERSION, ApiRequest, ApiResponse, error_message};
use super::prompt::build_prompt;
use crate::config::Config;
use crate::error::AnalysisError;
use crate::models::AnalysisRequest;

/// Sources shorter than this (in characters) are rejected without a network call
pub const MIN_SOURCE_LENGTH: usize = 10;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Stateless client for one-shot security analyses.
///
/// Each [`Relay::analyze`] call is independent: one POST, one response, no
/// retries and no shared mutable state between calls.
#[derive(Debug, Clone)]
pub struct Relay {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl Relay {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key().map(str::to_string),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout: config.timeout(),
        })
    }

    /// Point the relay at a different endpoint
    pub fn with_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn default_model(&self) -> &str {
        &self.model
    }

    /// Run one analysis, returning the report text verbatim.
    ///
    /// Validation failures return before any network activity. Cancelling
    /// `cancel` abandons the in-flight request.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<String, AnalysisError> {
        let length = request.source_text.chars().count();
        if length < MIN_SOURCE_LENGTH {
            return Err(AnalysisError::TooShort { length, minimum: MIN_SOURCE_LENGTH });
        }
        let api_key = self.api_key.as_deref().ok_or(AnalysisError::MissingApiKey)?;

        let model = request.model.as_deref().unwrap_or(&self.model);
        let body = ApiRequest::user(model, self.max_tokens, build_prompt(&request.source_text));
        info!(model, source_chars = length, "Starting security analysis");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Analysis cancelled");
                Err(AnalysisError::Cancelled)
            }
            result = self.send(api_key, &body) => result,
        }
    }

    async fn send(&self, api_key: &str, body: &ApiRequest) -> Result<String, AnalysisError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!(status = status.as_u16(), bytes = text.len(), "Inference API responded");

        if !status.is_success() {
            let message = error_message(&text).unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            warn!(status = status.as_u16(), %message, "Inference API returned an error");
            return Err(AnalysisError::Api { status: status.as_u16(), message });
        }

        let parsed: ApiResponse =
            serde_json::from_str(&text).map_err(|_| AnalysisError::MalformedResponse)?;
        match parsed.first_text() {
            Some(report) => {
                info!(report_chars = report.chars().count(), "Analysis complete");
                Ok(report.to_string())
            }
            None => {
                warn!("Inference API response has no text content");
                Err(AnalysisError::MalformedResponse)
            }
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> AnalysisError {
        if error.is_timeout() {
            warn!(timeout_secs = self.timeout.as_secs(), "Inference API request timed out");
            AnalysisError::Timeout(self.timeout.as_secs())
        } else {
            warn!(%error, "Inference API request failed");
            AnalysisError::Network(error.to_string())
        }
    }
}
