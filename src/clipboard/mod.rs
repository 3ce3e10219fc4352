use anyhow::{Context, Result};
use arboard::Clipboard;
use tracing::debug;

/// Largest report accepted for copying (10MB)
pub const MAX_CLIPBOARD_SIZE: usize = 10 * 1024 * 1024;

/// Destination for copied reports (allows mocking in tests)
pub trait ClipboardProvider {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard via arboard.
///
/// The connection is opened on first use and kept for the lifetime of the
/// value: on X11 the copied text is only served while its owner is alive.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn connection(&mut self) -> Result<&mut Clipboard> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new().context("Failed to initialize clipboard")?);
        }
        self.clipboard.as_mut().context("Clipboard unavailable")
    }
}

impl ClipboardProvider for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.connection()?.set_text(text).context("Failed to set clipboard contents")?;
        Ok(())
    }
}

/// Reject reports that are empty or too large to copy
fn validate_clipboard_text(text: &str) -> Result<()> {
    if text.is_empty() {
        anyhow::bail!("No report to copy");
    }

    if text.len() > MAX_CLIPBOARD_SIZE {
        anyhow::bail!(
            "Report too large for clipboard ({} bytes, max {})",
            text.len(),
            MAX_CLIPBOARD_SIZE
        );
    }

    Ok(())
}

/// Copy a report to the clipboard.
///
/// Validation runs before the provider is touched, so an empty or oversized
/// report never opens a clipboard connection.
pub fn copy_report(report_text: &str, provider: &mut dyn ClipboardProvider) -> Result<()> {
    validate_clipboard_text(report_text)?;
    provider.set_text(report_text)?;
    debug!(bytes = report_text.len(), "Copied report to clipboard");
    Ok(())
}

/// In-memory clipboard for tests
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryClipboard {
    pub text: Option<String>,
    pub fail: bool,
}

#[cfg(test)]
impl ClipboardProvider for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.fail {
            anyhow::bail!("Clipboard locked");
        }
        self.text = Some(text.to_string());
        Ok(())
    }
}
