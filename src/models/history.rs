use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::report::derive_score;

/// One persisted past scan
///
/// The score is always recomputed from `report_text`: the serialized value is
/// kept for readers of the file but ignored when loading. Neither can be set
/// directly:
///
/// ```compile_fail
/// let mut entry = codescope::HistoryEntry::new("eval(x)", "critical", "Claude Sonnet 4", 0);
/// entry.derived_score = 100;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredHistoryEntry")]
pub struct HistoryEntry {
    pub source_text: String,
    report_text: String,
    derived_score: u8,
    pub model_label: String,
    pub timestamp_millis: i64,
}

/// On-disk shape of a history entry
#[derive(Deserialize)]
struct StoredHistoryEntry {
    source_text: String,
    report_text: String,
    #[serde(default, rename = "derived_score")]
    _derived_score: Option<u8>,
    model_label: String,
    timestamp_millis: i64,
}

impl From<StoredHistoryEntry> for HistoryEntry {
    fn from(stored: StoredHistoryEntry) -> Self {
        HistoryEntry::new(
            stored.source_text,
            stored.report_text,
            stored.model_label,
            stored.timestamp_millis,
        )
    }
}

impl HistoryEntry {
    pub fn new(
        source_text: impl Into<String>,
        report_text: impl Into<String>,
        model_label: impl Into<String>,
        timestamp_millis: i64,
    ) -> Self {
        let report_text = report_text.into();
        let derived_score = derive_score(&report_text);
        Self {
            source_text: source_text.into(),
            report_text,
            derived_score,
            model_label: model_label.into(),
            timestamp_millis,
        }
    }

    /// Entry stamped with the current time
    pub fn now(
        source_text: impl Into<String>,
        report_text: impl Into<String>,
        model_label: impl Into<String>,
    ) -> Self {
        Self::new(source_text, report_text, model_label, Utc::now().timestamp_millis())
    }

    pub fn report_text(&self) -> &str {
        &self.report_text
    }

    pub fn derived_score(&self) -> u8 {
        self.derived_score
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp_millis).single().unwrap_or_default()
    }
}
