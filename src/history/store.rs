//! History persistence port and its implementations.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::History;
use crate::models::HistoryEntry;

/// Where history lives between sessions
///
/// Several processes may share one store (the UI and `codescope scan`), so
/// every mutation goes through [`HistoryStore::update`], which applies the
/// change to the freshly stored entries rather than to a cached copy.
pub trait HistoryStore: Send {
    /// Stored entries, most recent first
    fn load(&self) -> Result<Vec<HistoryEntry>>;
    /// Replace the stored entries
    fn save(&self, entries: &[HistoryEntry]) -> Result<()>;
    /// Remove all stored entries
    fn clear(&self) -> Result<()>;
    /// Reload, apply `mutate` and store the result in one exclusive step
    fn update(&self, mutate: &mut dyn FnMut(&mut History)) -> Result<History>;
}

/// History kept as a single JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling_path(".tmp")
    }

    fn lock_path(&self) -> PathBuf {
        self.sibling_path(".lock")
    }

    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn create_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create history directory")?;
        }
        Ok(())
    }

    /// Advisory lock shared by every process using this path, released on drop
    fn lock(&self) -> Result<File> {
        self.create_parent()?;
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open history lock {}", lock_path.display()))?;
        file.lock().context("Failed to lock history file")?;
        Ok(file)
    }
}

impl HistoryStore for JsonFileStore {
    /// A missing file is an empty history; so is a corrupt one, which is logged
    fn load(&self) -> Result<Vec<HistoryEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read history file {}", self.path.display())
                });
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&content) {
            Ok(entries) => {
                debug!(path = %self.path.display(), count = entries.len(), "Loaded history");
                Ok(entries)
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "History file is corrupt, starting empty"
                );
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        self.create_parent()?;

        // Atomic replace: write a sibling temp file, then rename over the target
        let temp = self.temp_path();
        let json = serde_json::to_string_pretty(entries).context("Failed to serialize history")?;
        fs::write(&temp, json).context("Failed to write history temp file")?;
        fs::rename(&temp, &self.path).context("Failed to rename history temp file")?;

        debug!(path = %self.path.display(), count = entries.len(), "Saved history");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove history file"),
        }
    }

    fn update(&self, mutate: &mut dyn FnMut(&mut History)) -> Result<History> {
        let _guard = self.lock()?;
        let mut history = History::from_entries(self.load()?);
        mutate(&mut history);

        if history.is_empty() {
            self.clear()?;
        } else {
            self.save(history.entries())?;
        }
        Ok(history)
    }
}

/// History held in memory only
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<HistoryEntry>) -> Self {
        Self { entries: Mutex::new(entries) }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<HistoryEntry>>> {
        self.entries.lock().map_err(|_| anyhow::anyhow!("History store lock poisoned"))
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        *self.lock()? = entries.to_vec();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn update(&self, mutate: &mut dyn FnMut(&mut History)) -> Result<History> {
        let mut entries = self.lock()?;
        let mut history = History::from_entries(std::mem::take(&mut *entries));
        mutate(&mut history);
        *entries = history.entries().to_vec();
        Ok(history)
    }
}
