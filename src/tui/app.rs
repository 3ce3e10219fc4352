//! TUI application state and event handling.
//!
//! The `App` owns everything the screen shows and runs the event loop via
//! `run()`. It manages:
//!
//! - **Scans**: selection is read on the UI thread, the analysis itself runs on
//!   the tokio runtime behind an [`AnalysisPort`]; the outcome comes back over a
//!   oneshot channel that is polled every tick
//! - **History**: the single writer of the bounded history, persisted through a
//!   [`HistoryStore`] after every change
//! - **Report actions**: copy to clipboard and download to the export directory
//! - **Status messages**: transient feedback that expires on its own
//! - **Dirty state tracking**: redraw only when state changes

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::events::{Action, poll_event};
use super::rendering::{RenderState, render_ui, report_line_count};
use crate::clipboard::{ClipboardProvider, SystemClipboard, copy_report};
use crate::error::AnalysisError;
use crate::history::{History, HistoryStore};
use crate::models::{AnalysisRequest, AnalysisResult, HistoryEntry, MODEL_OPTIONS, model_label};
use crate::relay::AnalysisPort;
use crate::report::write_export;
use crate::selection::SelectionReader;

/// Duration for success status messages (milliseconds)
const STATUS_SUCCESS_DURATION_MS: u64 = 3000;
/// Duration for error status messages (milliseconds)
const STATUS_ERROR_DURATION_MS: u64 = 5000;
/// Lines moved by PageUp/PageDown
const PAGE_SIZE: usize = 10;

/// Type of status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Instant,
}

/// A report on screen, fresh or reopened from history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    pub report_text: String,
    pub score: u8,
    pub model_label: String,
}

/// What the body area shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Welcome,
    Analyzing,
    Failed(String),
    Report(ReportView),
}

type ScanOutcome = Result<AnalysisResult, AnalysisError>;

/// An analysis in flight
struct PendingScan {
    source_text: String,
    model_label: String,
    started_at: Instant,
    cancel: CancellationToken,
    outcome: oneshot::Receiver<ScanOutcome>,
}

/// Settings the UI needs from the configuration
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub model: String,
    pub export_dir: PathBuf,
}

pub struct App {
    port: Arc<dyn AnalysisPort>,
    runtime: Handle,
    selection: SelectionReader,
    store: Box<dyn HistoryStore>,
    clipboard: Box<dyn ClipboardProvider>,
    export_dir: PathBuf,
    model: String,
    phase: Phase,
    pending: Option<PendingScan>,
    history: History,
    show_history: bool,
    history_idx: usize,
    scroll: usize,
    should_quit: bool,
    // Status message (clipboard feedback, etc.)
    status_message: Option<StatusMessage>,
    // Dirty state tracking for efficient rendering
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl App {
    pub fn new(
        port: Arc<dyn AnalysisPort>,
        runtime: Handle,
        selection: SelectionReader,
        store: Box<dyn HistoryStore>,
        options: AppOptions,
    ) -> Self {
        let mut load_error = None;
        let history = match store.load() {
            Ok(entries) => History::from_entries(entries),
            Err(e) => {
                warn!(error = %e, "Failed to load history");
                load_error = Some(format!("✗ History unavailable: {}", e));
                History::new()
            }
        };

        let mut app = Self {
            port,
            runtime,
            selection,
            store,
            clipboard: Box::new(SystemClipboard::new()),
            export_dir: options.export_dir,
            model: options.model,
            phase: Phase::Welcome,
            pending: None,
            history,
            show_history: false,
            history_idx: 0,
            scroll: 0,
            should_quit: false,
            status_message: None,
            needs_redraw: true, // Initial draw needed
            last_draw_time: Instant::now(),
        };
        if let Some(message) = load_error {
            app.set_status(message, MessageType::Error, STATUS_ERROR_DURATION_MS);
        }
        app
    }

    /// Replace the clipboard backend
    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardProvider>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Set a transient status message with automatic expiry
    fn set_status(&mut self, text: impl Into<String>, message_type: MessageType, duration_ms: u64) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: Instant::now() + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    fn set_success(&mut self, text: impl Into<String>) {
        self.set_status(text, MessageType::Success, STATUS_SUCCESS_DURATION_MS);
    }

    fn set_error(&mut self, text: impl Into<String>) {
        self.set_status(text, MessageType::Error, STATUS_ERROR_DURATION_MS);
    }

    /// Check and clear expired status messages
    fn check_and_clear_expired_status(&mut self) {
        let should_clear = self
            .status_message
            .as_ref()
            .map(|msg| Instant::now() >= msg.expires_at)
            .unwrap_or(false);
        if should_clear {
            self.status_message = None;
            self.needs_redraw = true;
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.check_and_clear_expired_status();
            self.poll_scan();

            // Draw if dirty, while analyzing (spinner), or if it's been >100ms (resize)
            let now = Instant::now();
            let elapsed = now.duration_since(self.last_draw_time);
            if self.needs_redraw || self.pending.is_some() || elapsed >= Duration::from_millis(100)
            {
                let model_label = self.model_label();
                terminal.draw(|f| {
                    let state = RenderState {
                        model_label: &model_label,
                        phase: &self.phase,
                        history: &self.history,
                        show_history: self.show_history,
                        history_idx: self.history_idx,
                        scroll: self.scroll,
                        spinner_tick: self.spinner_tick(),
                        status_message: self.status_message.as_ref(),
                    };
                    render_ui(f, &state);
                })?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            let action = poll_event(Duration::from_millis(100))?;
            self.handle_action(action);
        }

        Ok(())
    }

    fn model_label(&self) -> String {
        model_label(&self.model)
    }

    fn spinner_tick(&self) -> usize {
        self.pending
            .as_ref()
            .map(|scan| (scan.started_at.elapsed().as_millis() / 100) as usize)
            .unwrap_or(0)
    }

    /// Handle a user action (extracted for testing)
    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.quit(),
            Action::Scan => self.start_scan(),
            Action::Confirm => {
                if self.show_history && !self.history.is_empty() {
                    self.open_history_entry(self.history_idx);
                } else {
                    self.start_scan();
                }
            }
            Action::CycleModel => self.cycle_model(),
            Action::CopyReport => self.copy_report(),
            Action::DownloadReport => self.download_report(),
            Action::ToggleHistory => {
                self.show_history = !self.show_history;
                if self.show_history {
                    self.refresh_history();
                }
                self.needs_redraw = true;
            }
            Action::ClearHistory => self.clear_history(),
            Action::MoveUp => self.move_cursor(-1),
            Action::MoveDown => self.move_cursor(1),
            Action::PageUp => self.move_cursor(-(PAGE_SIZE as isize)),
            Action::PageDown => self.move_cursor(PAGE_SIZE as isize),
            Action::None => {}
        }
    }

    fn quit(&mut self) {
        if let Some(scan) = &self.pending {
            scan.cancel.cancel();
        }
        self.should_quit = true;
    }

    /// Read the selection and hand it to the relay; ignored while a scan is running
    fn start_scan(&mut self) {
        if self.pending.is_some() {
            return;
        }

        let source_text = match self.selection.require_selection() {
            Ok(text) => text,
            Err(e) => {
                self.phase = Phase::Failed(e.to_string());
                self.needs_redraw = true;
                return;
            }
        };

        let request = AnalysisRequest::new(source_text.clone()).with_model(self.model.clone());
        let cancel = CancellationToken::new();
        let (reply, outcome) = oneshot::channel();

        let port = Arc::clone(&self.port);
        let token = cancel.clone();
        self.runtime.spawn(async move {
            let result = port.analyze(request, token).await;
            let _ = reply.send(result);
        });

        info!(chars = source_text.chars().count(), model = %self.model, "Scan started");
        self.pending = Some(PendingScan {
            source_text,
            model_label: self.model_label(),
            started_at: Instant::now(),
            cancel,
            outcome,
        });
        self.phase = Phase::Analyzing;
        self.scroll = 0;
        self.needs_redraw = true;
    }

    /// Collect the outcome of the scan in flight, if it has arrived
    fn poll_scan(&mut self) {
        let Some(mut scan) = self.pending.take() else { return };

        let outcome = match scan.outcome.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => {
                self.pending = Some(scan);
                return;
            }
            Err(TryRecvError::Closed) => {
                Err(AnalysisError::Channel("scan task ended without a result".to_string()))
            }
        };

        match outcome {
            Ok(result) => self.finish_scan(scan.source_text, scan.model_label, result),
            Err(e) => {
                warn!(error = %e, "Scan failed");
                self.phase = Phase::Failed(e.to_string());
            }
        }
        self.needs_redraw = true;
    }

    fn finish_scan(&mut self, source_text: String, model_label: String, result: AnalysisResult) {
        info!(score = result.derived_score(), "Scan finished");
        let entry = HistoryEntry::now(source_text, result.report_text(), model_label.clone());
        if let Err(e) = self.update_history(|history| history.record(entry.clone())) {
            warn!(error = %e, "Failed to save history");
            self.set_error(format!("✗ Failed to save history: {}", e));
        }
        self.history_idx = 0;

        let score = result.derived_score();
        self.phase = Phase::Report(ReportView {
            report_text: result.into_report_text(),
            score,
            model_label,
        });
    }

    /// Apply a change to the stored history and adopt the stored result.
    ///
    /// Other processes may have written the store since it was last read, so
    /// the change is made on the stored entries, not on `self.history`. When the
    /// store fails the change still applies to the on-screen history.
    fn update_history(&mut self, mut mutate: impl FnMut(&mut History)) -> Result<()> {
        match self.store.update(&mut mutate) {
            Ok(history) => {
                self.history = history;
                Ok(())
            }
            Err(e) => {
                mutate(&mut self.history);
                Err(e)
            }
        }
    }

    /// Pick up entries written by other processes
    fn refresh_history(&mut self) {
        match self.store.load() {
            Ok(entries) => self.history = History::from_entries(entries),
            Err(e) => warn!(error = %e, "Failed to reload history"),
        }
        self.history_idx = self.history_idx.min(self.history.len().saturating_sub(1));
    }

    fn open_history_entry(&mut self, index: usize) {
        let Some(entry) = self.history.get(index) else { return };
        self.phase = Phase::Report(ReportView {
            report_text: entry.report_text().to_string(),
            score: entry.derived_score(),
            model_label: entry.model_label.clone(),
        });
        self.scroll = 0;
        self.needs_redraw = true;
    }

    fn current_report(&self) -> Option<&ReportView> {
        match &self.phase {
            Phase::Report(view) => Some(view),
            _ => None,
        }
    }

    fn cycle_model(&mut self) {
        let next = MODEL_OPTIONS
            .iter()
            .position(|option| option.id == self.model)
            .map(|idx| (idx + 1) % MODEL_OPTIONS.len())
            .unwrap_or(0);
        self.model = MODEL_OPTIONS[next].id.to_string();
        let label = self.model_label();
        self.set_success(format!("Model: {}", label));
    }

    fn copy_report(&mut self) {
        let Some(report) = self.current_report().map(|view| view.report_text.clone()) else {
            self.set_error("✗ No report to copy");
            return;
        };
        match copy_report(&report, self.clipboard.as_mut()) {
            Ok(()) => self.set_success("✓ Copied to clipboard"),
            Err(e) => self.set_error(format!("✗ Clipboard error: {}", e)),
        }
    }

    fn download_report(&mut self) {
        let Some(view) = self.current_report().cloned() else {
            self.set_error("✗ No report to download");
            return;
        };
        match write_export(&self.export_dir, &view.report_text, &view.model_label, view.score) {
            Ok(path) => self.set_success(format!("✓ Saved {}", path.display())),
            Err(e) => self.set_error(format!("✗ Download failed: {}", e)),
        }
    }

    fn clear_history(&mut self) {
        self.history_idx = 0;
        match self.update_history(History::clear) {
            Ok(()) => self.set_success("✓ History cleared"),
            Err(e) => {
                warn!(error = %e, "Failed to clear stored history");
                self.set_error(format!("✗ Failed to clear history: {}", e));
            }
        }
    }

    /// Move the history selection when the pane is shown, else scroll the report
    fn move_cursor(&mut self, delta: isize) {
        if self.show_history {
            let total = self.history.len();
            if total == 0 {
                self.history_idx = 0;
                return;
            }
            let old_idx = self.history_idx;
            let new_idx = (self.history_idx as isize + delta).max(0) as usize;
            self.history_idx = new_idx.min(total - 1);
            if old_idx != self.history_idx {
                self.needs_redraw = true;
            }
        } else {
            let max_scroll = self
                .current_report()
                .map_or(0, |view| report_line_count(&view.report_text).saturating_sub(1));
            let old_scroll = self.scroll;
            self.scroll = ((self.scroll as isize + delta).max(0) as usize).min(max_scroll);
            if old_scroll != self.scroll {
                self.needs_redraw = true;
            }
        }
    }
}
