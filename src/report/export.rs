//! Plain-text report export.
//!
//! An export is a fixed four-line header, a blank line, then the report text
//! exactly as rendered:
//!
//! ```text
//! CodeScope Security Analysis Report
//! Generated: 2024-05-01 14:03:22
//! Model: Claude Sonnet 4
//! Security Score: 70
//!
//! SUMMARY:
//! ...
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Local};
use tracing::info;

pub const REPORT_TITLE: &str = "CodeScope Security Analysis Report";
const GENERATED_PREFIX: &str = "Generated: ";
const MODEL_PREFIX: &str = "Model: ";
const SCORE_PREFIX: &str = "Security Score: ";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A report file read back from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedReport {
    pub generated: String,
    pub model_label: String,
    pub score: u8,
    pub report_text: String,
}

/// Render the export file body
pub fn render_export(
    report_text: &str,
    model_label: &str,
    score: u8,
    generated_at: DateTime<Local>,
) -> String {
    format!(
        "{REPORT_TITLE}\n{GENERATED_PREFIX}{}\n{MODEL_PREFIX}{model_label}\n{SCORE_PREFIX}{score}\n\n{report_text}",
        generated_at.format(TIMESTAMP_FORMAT),
    )
}

/// File name for an export created at the given time
pub fn export_file_name(timestamp_millis: i64) -> String {
    format!("codescope-report-{}.txt", timestamp_millis)
}

/// Write a report into `dir`, returning the created file path
pub fn write_export(
    dir: &Path,
    report_text: &str,
    model_label: &str,
    score: u8,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let now = Local::now();
    let path = dir.join(export_file_name(now.timestamp_millis()));
    let body = render_export(report_text, model_label, score, now);

    fs::write(&path, body)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    info!(path = %path.display(), score, "report exported");
    Ok(path)
}

/// Read an export file back, returning the header fields and the verbatim report
pub fn read_export(path: &Path) -> Result<ExportedReport> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read report: {}", path.display()))?;
    parse_export(&content)
}

/// Parse export file content
pub fn parse_export(content: &str) -> Result<ExportedReport> {
    let mut rest = content;

    let title = next_line(&mut rest)?;
    if title != REPORT_TITLE {
        bail!("Not a CodeScope report (first line: {:?})", title);
    }

    let generated = header_value(next_line(&mut rest)?, GENERATED_PREFIX)?.to_string();
    let model_label = header_value(next_line(&mut rest)?, MODEL_PREFIX)?.to_string();
    let score = header_value(next_line(&mut rest)?, SCORE_PREFIX)?
        .parse::<u8>()
        .context("Invalid security score in report header")?;

    let separator = next_line(&mut rest)?;
    if !separator.is_empty() {
        bail!("Expected blank line after report header");
    }

    Ok(ExportedReport { generated, model_label, score, report_text: rest.to_string() })
}

fn next_line<'a>(rest: &mut &'a str) -> Result<&'a str> {
    let (line, remainder) =
        rest.split_once('\n').ok_or_else(|| anyhow!("Report header is truncated"))?;
    *rest = remainder;
    Ok(line)
}

fn header_value<'a>(line: &'a str, prefix: &str) -> Result<&'a str> {
    line.strip_prefix(prefix)
        .ok_or_else(|| anyhow!("Expected header line starting with {:?}, found {:?}", prefix, line))
}
