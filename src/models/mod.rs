//! Data models shared by the relay, the report pipeline and the UI.
//!
//! - [`AnalysisRequest`] - Source text handed to the relay for one scan
//! - [`AnalysisResult`] - Report text plus its derived score
//! - [`HistoryEntry`] - One persisted past scan
//! - [`ModelOption`] - Selectable model catalogue entry
//!
//! Scores are never trusted from storage: [`HistoryEntry`] deserializes through
//! a stored form and recomputes the score from the report text.

pub mod analysis;
pub mod history;

pub use analysis::{AnalysisRequest, AnalysisResult, MODEL_OPTIONS, ModelOption, model_label};
pub use history::HistoryEntry;
