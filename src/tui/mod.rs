//! Interactive terminal UI
mod app;
mod events;
mod layout;
mod rendering;
mod terminal;
mod timestamps;

use std::sync::Arc;

use anyhow::Result;
pub use app::{App, AppOptions, Phase, ReportView};
use tokio::runtime::Handle;

use self::terminal::TerminalManager;
use crate::history::HistoryStore;
use crate::relay::AnalysisPort;
use crate::selection::SelectionReader;

/// Run the interactive TUI until the user quits
pub fn run_interactive(
    port: Arc<dyn AnalysisPort>,
    runtime: Handle,
    selection: SelectionReader,
    store: Box<dyn HistoryStore>,
    options: AppOptions,
) -> Result<()> {
    let mut app = App::new(port, runtime, selection, store, options);

    let mut manager = TerminalManager::new()?;
    let res = app.run(manager.terminal_mut());
    manager.restore()?;

    res
}
