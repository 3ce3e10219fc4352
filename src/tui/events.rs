use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// User actions from keyboard events
#[derive(Debug, PartialEq)]
pub enum Action {
    Quit,
    Scan,
    /// Enter: scan, or open the highlighted history entry when the pane is shown
    Confirm,
    CycleModel,
    CopyReport,
    DownloadReport,
    ToggleHistory,
    ClearHistory,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    None,
}

/// Poll for keyboard events and convert to actions
pub fn poll_event(timeout: Duration) -> anyhow::Result<Action> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind == KeyEventKind::Press
    {
        return Ok(key_to_action(key));
    }
    Ok(Action::None)
}

fn key_to_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Esc, _) => Action::Quit,

        // Scrolling / history selection
        (KeyCode::Up, _) => Action::MoveUp,
        (KeyCode::Down, _) => Action::MoveDown,
        (KeyCode::PageUp, _) => Action::PageUp,
        (KeyCode::PageDown, _) => Action::PageDown,

        // Actions
        (KeyCode::Enter, _) => Action::Confirm,
        (KeyCode::Char('s'), KeyModifiers::NONE) => Action::Scan,
        (KeyCode::Char('m'), KeyModifiers::NONE) => Action::CycleModel,
        (KeyCode::Char('c'), KeyModifiers::NONE) => Action::CopyReport,
        (KeyCode::Char('y'), KeyModifiers::CONTROL) => Action::CopyReport,
        (KeyCode::Char('d'), KeyModifiers::NONE) => Action::DownloadReport,
        (KeyCode::Char('h'), KeyModifiers::NONE) => Action::ToggleHistory,
        (KeyCode::Char('x'), KeyModifiers::NONE) => Action::ClearHistory,

        _ => Action::None,
    }
}
