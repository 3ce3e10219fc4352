//! Error taxonomy for a scan attempt.
//!
//! Every variant is terminal for the current attempt: nothing is retried
//! automatically and the `Display` text is what the user sees in the result area.

use thiserror::Error;

/// Reasons a scan can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Input below the minimum length; no network call was made
    #[error("Selected code is too short ({length} characters, need at least {minimum}). Please select more code.")]
    TooShort { length: usize, minimum: usize },

    /// Neither the selection nor the page fallback produced any text
    #[error("No text selected. Please select some code first.")]
    NoSelection,

    /// The inference API rejected or failed the request
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The inference API answered with an unexpected body shape
    #[error("Invalid response format from the inference API")]
    MalformedResponse,

    /// The link between the UI and the relay was lost
    #[error("Relay unavailable: {0}")]
    Channel(String),

    /// No API credential was configured
    #[error("No API key configured. Set CODESCOPE_API_KEY or api_key in the config file.")]
    MissingApiKey,

    /// Transport failure before a response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// The inference API did not answer within the configured bound
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// The scan was abandoned because the UI went away
    #[error("Scan cancelled")]
    Cancelled,
}

impl AnalysisError {
    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            AnalysisError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
