use std::path::PathBuf;

use anyhow::{Context, Result};

/// Directory name used under every platform base directory
pub const APP_DIR_NAME: &str = "codescope";

/// Platform config directory for CodeScope (e.g. `~/.config/codescope`)
pub fn get_config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Failed to get platform config directory")?;
    Ok(base.join(APP_DIR_NAME))
}

/// Platform data directory for CodeScope (e.g. `~/.local/share/codescope`)
pub fn get_data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("Failed to get platform data directory")?;
    Ok(base.join(APP_DIR_NAME))
}

/// Directory for rolling log files (e.g. `~/.cache/codescope/logs`)
pub fn get_log_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Failed to get platform cache directory")?;
    Ok(base.join(APP_DIR_NAME).join("logs"))
}

/// Where downloaded reports go when no export directory is configured
pub fn get_default_export_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
