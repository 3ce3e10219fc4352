//! Selection reader: where the code to scan comes from.
//!
//! The active selection is tried first; when it is blank after trimming the
//! page document (if any) is scanned for the first code container.

pub mod page;
pub mod system;

use std::path::PathBuf;

use crate::error::AnalysisError;

pub use page::{PageSelection, extract_code};
pub use system::SystemSelection;

/// Anything that can produce the currently selected text
pub trait SelectionSource: Send {
    /// Selected text, or an empty string when nothing is available
    fn read(&self) -> String;
}

/// A selection known up front (file contents, piped stdin, tests)
#[derive(Debug, Clone, Default)]
pub struct FixedSelection(pub String);

impl SelectionSource for FixedSelection {
    fn read(&self) -> String {
        self.0.clone()
    }
}

pub struct SelectionReader {
    selection: Box<dyn SelectionSource>,
    page: Option<Box<dyn SelectionSource>>,
}

impl SelectionReader {
    pub fn new(selection: impl SelectionSource + 'static) -> Self {
        Self { selection: Box::new(selection), page: None }
    }

    /// System selection, with an optional HTML page as fallback
    pub fn system(page: Option<PathBuf>) -> Self {
        let reader = Self::new(SystemSelection);
        match page {
            Some(path) => reader.with_page(PageSelection::new(path)),
            None => reader,
        }
    }

    pub fn with_page(mut self, page: impl SelectionSource + 'static) -> Self {
        self.page = Some(Box::new(page));
        self
    }

    /// Trimmed selection, falling back to the page; empty when neither has text
    pub fn read_selection(&self) -> String {
        let selected = self.selection.read();
        let selected = selected.trim();
        if !selected.is_empty() {
            return selected.to_string();
        }

        self.page
            .as_ref()
            .map(|page| page.read().trim().to_string())
            .unwrap_or_default()
    }

    /// Like [`read_selection`](Self::read_selection), but empty is an error
    pub fn require_selection(&self) -> Result<String, AnalysisError> {
        let text = self.read_selection();
        if text.is_empty() { Err(AnalysisError::NoSelection) } else { Ok(text) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(text: &str) -> FixedSelection {
        FixedSelection(text.to_string())
    }

    #[test]
    fn test_selection_is_trimmed() {
        let reader = SelectionReader::new(fixed("  \n eval(input)\n  "));
        assert_eq!(reader.read_selection(), "eval(input)");
    }

    #[test]
    fn test_selection_wins_over_page() {
        let reader = SelectionReader::new(fixed("selected")).with_page(fixed("from page"));
        assert_eq!(reader.read_selection(), "selected");
    }

    #[test]
    fn test_blank_selection_falls_back_to_page() {
        let reader = SelectionReader::new(fixed(" \t\n")).with_page(fixed("  from page  "));
        assert_eq!(reader.read_selection(), "from page");
    }

    #[test]
    fn test_nothing_available_is_empty() {
        let reader = SelectionReader::new(fixed("")).with_page(fixed("   "));
        assert_eq!(reader.read_selection(), "");
        assert_eq!(reader.require_selection(), Err(AnalysisError::NoSelection));
    }

    #[test]
    fn test_require_selection_without_page() {
        let reader = SelectionReader::new(fixed(""));
        assert_eq!(reader.require_selection(), Err(AnalysisError::NoSelection));

        let reader = SelectionReader::new(fixed("x = 1"));
        assert_eq!(reader.require_selection(), Ok("x = 1".to_string()));
    }
}
