use serde::{Deserialize, Serialize};

use crate::report::derive_score;

/// Source text handed to the relay for a single scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub source_text: String,
    /// Model id chosen in the UI; the relay falls back to its configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl AnalysisRequest {
    pub fn new(source_text: impl Into<String>) -> Self {
        Self { source_text: source_text.into(), model: None }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// A successful scan: the verbatim report and the score derived from it
///
/// Fields are private so the score can only come from [`derive_score`]:
///
/// ```compile_fail
/// let forged = codescope::AnalysisResult {
///     report_text: "critical exploit".to_string(),
///     derived_score: 100,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    report_text: String,
    derived_score: u8,
}

impl AnalysisResult {
    /// Build a result, deriving the score from the report text
    pub fn from_report(report_text: impl Into<String>) -> Self {
        let report_text = report_text.into();
        let derived_score = derive_score(&report_text);
        Self { report_text, derived_score }
    }

    pub fn report_text(&self) -> &str {
        &self.report_text
    }

    pub fn derived_score(&self) -> u8 {
        self.derived_score
    }

    pub fn into_report_text(self) -> String {
        self.report_text
    }
}

/// Selectable model catalogue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    pub label: &'static str,
    pub id: &'static str,
}

pub const MODEL_OPTIONS: &[ModelOption] = &[
    ModelOption { label: "Claude Sonnet 4", id: "claude-sonnet-4-20250514" },
    ModelOption { label: "Claude 3.5 Sonnet", id: "claude-3-5-sonnet-20241022" },
    ModelOption { label: "Claude 3.5 Haiku", id: "claude-3-5-haiku-20241022" },
];

/// Display label for a model id; unknown ids are shown as-is
pub fn model_label(id: &str) -> String {
    MODEL_OPTIONS
        .iter()
        .find(|option| option.id == id)
        .map(|option| option.label.to_string())
        .unwrap_or_else(|| id.to_string())
}
