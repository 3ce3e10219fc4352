//! Anthropic Messages API wire types.

use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "2023-06-01";

/// Request body for a single non-streamed completion
#[derive(Debug, Serialize)]
pub struct ApiRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ApiMessage>,
}

#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

impl ApiRequest {
    pub fn user(model: impl Into<String>, max_tokens: u32, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            messages: vec![ApiMessage { role: "user".to_string(), content: content.into() }],
        }
    }
}

/// Successful response body; only the content blocks matter here
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub text: Option<String>,
}

impl ApiResponse {
    /// Text of the first content block
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().and_then(|block| block.text.as_deref())
    }
}

/// Error body: `{"error": {"type": "...", "message": "..."}}`
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
}

/// Extract `error.message` from an error body, if present
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|detail| detail.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ApiRequest::user("claude-sonnet-4-20250514", 4000, "hello");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "claude-sonnet-4-20250514",
                "max_tokens": 4000,
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[test]
    fn test_first_text() {
        let response: ApiResponse = serde_json::from_str(
            r#"{"id":"msg_1","content":[{"type":"text","text":"SUMMARY:\n1. XSS"}],"stop_reason":"end_turn"}"#,
        )
        .unwrap();
        assert_eq!(response.first_text(), Some("SUMMARY:\n1. XSS"));
    }

    #[test]
    fn test_first_text_missing() {
        let empty: ApiResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert_eq!(empty.first_text(), None);

        let no_content: ApiResponse = serde_json::from_str(r#"{"id":"msg_1"}"#).unwrap();
        assert_eq!(no_content.first_text(), None);

        let tool_only: ApiResponse =
            serde_json::from_str(r#"{"content":[{"type":"tool_use","id":"t1"}]}"#).unwrap();
        assert_eq!(tool_only.first_text(), None);
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"type":"error","error":{"type":"rate_limit_error","message":"rate limited"}}"#;
        assert_eq!(error_message(body).as_deref(), Some("rate limited"));
        assert_eq!(error_message("<html>bad gateway</html>"), None);
        assert_eq!(error_message(r#"{"error":{}}"#), None);
    }
}
