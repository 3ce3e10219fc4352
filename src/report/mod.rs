//! Client-side processing of a returned report.
//!
//! - [`score`] - Heuristic keyword-count security score
//! - [`sections`] - Lexer splitting a report into text and code sections
//! - [`export`] - Plain-text report files with a fixed header

pub mod export;
pub mod score;
pub mod sections;

pub use export::{ExportedReport, read_export, render_export, write_export};
pub use score::{ScoreBand, derive_score};
pub use sections::{Section, Sections, format_sections, is_heading};
