use tracing::debug;

use super::SelectionSource;

/// The desktop's active selection.
///
/// On Linux this is the PRIMARY selection (highlighted text); elsewhere the
/// clipboard. A missing display or empty selection reads as empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSelection;

impl SelectionSource for SystemSelection {
    fn read(&self) -> String {
        match read_system_selection() {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "System selection unavailable");
                String::new()
            }
        }
    }
}

#[cfg(target_os = "linux")]
fn read_system_selection() -> Result<String, arboard::Error> {
    use arboard::{GetExtLinux, LinuxClipboardKind};

    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.get().clipboard(LinuxClipboardKind::Primary).text()
}

#[cfg(not(target_os = "linux"))]
fn read_system_selection() -> Result<String, arboard::Error> {
    arboard::Clipboard::new()?.get_text()
}
