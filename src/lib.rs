//! CodeScope - AI-assisted security review of selected code
//!
//! Reads the code the user selected (or the first code block of a saved
//! page), sends it to the Anthropic Messages API for a vulnerability review and
//! presents the report split into sections with a heuristic security score.
//! Past scans are kept in a small history; reports can be copied or exported.
//!
//! - [`selection`]: where the code comes from
//! - [`relay`]: the single-call analysis client, its request/response port and
//!   the native-messaging host for the browser extension
//! - [`report`]: score derivation, section formatting and export files
//! - [`history`]: bounded history and its persistence
//! - [`tui`]: the interactive terminal interface
//!
//! # Example
//!
//! ```
//! use codescope::{derive_score, format_sections};
//!
//! let report = "SUMMARY:\n1. Critical SQL injection\n\nSOLUTION:\n```sql\nSELECT ?\n```";
//! assert_eq!(derive_score(report), 85);
//! assert_eq!(format_sections(report).count(), 3);
//! ```

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod models;
pub mod relay;
pub mod report;
pub mod selection;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::AnalysisError;
pub use history::{History, HistoryStore, JsonFileStore};
pub use models::{AnalysisRequest, AnalysisResult, HistoryEntry};
pub use relay::{AnalysisPort, Relay, RelayService};
pub use report::{Section, derive_score, format_sections};
pub use selection::SelectionReader;
