//! Inbound message contract shared with the browser extension.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::service::AnalysisPort;
use crate::models::AnalysisRequest;

pub const UNKNOWN_ACTION: &str = "Unknown action";

/// `{"action": "analyzeCode", "code": "...", "model": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum RelayRequest {
    #[serde(rename = "analyzeCode")]
    AnalyzeCode {
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// `{"result": "..."}` or `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayResponse {
    Result { result: String },
    Error { error: String },
}

impl RelayResponse {
    pub fn error(message: impl Into<String>) -> Self {
        RelayResponse::Error { error: message.into() }
    }
}

/// Answer one decoded request through the analysis port
pub async fn handle_request<P>(
    port: &P,
    request: RelayRequest,
    cancel: &CancellationToken,
) -> RelayResponse
where
    P: AnalysisPort + ?Sized,
{
    match request {
        RelayRequest::AnalyzeCode { code, model } => {
            let request = AnalysisRequest { source_text: code, model };
            match port.analyze(request, cancel.child_token()).await {
                Ok(result) => RelayResponse::Result { result: result.into_report_text() },
                Err(err) => RelayResponse::error(err.to_string()),
            }
        }
        RelayRequest::Unknown => RelayResponse::error(UNKNOWN_ACTION),
    }
}

/// Decode and answer one raw JSON message.
///
/// Any JSON value without a string `action` is an unknown action; only
/// unparseable bytes or a malformed `analyzeCode` are invalid messages.
pub async fn handle_message<P>(
    port: &P,
    payload: &[u8],
    cancel: &CancellationToken,
) -> RelayResponse
where
    P: AnalysisPort + ?Sized,
{
    match parse_request(payload) {
        Ok(request) => handle_request(port, request, cancel).await,
        Err(err) => RelayResponse::error(format!("Invalid message: {err}")),
    }
}

fn parse_request(payload: &[u8]) -> serde_json::Result<RelayRequest> {
    let value: Value = serde_json::from_slice(payload)?;
    match value.get("action") {
        Some(Value::String(_)) => serde_json::from_value(value),
        _ => Ok(RelayRequest::Unknown),
    }
}
