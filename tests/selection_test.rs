//! Selection reading with the saved-page fallback
use std::fs;

use codescope::AnalysisError;
use codescope::SelectionReader;
use codescope::selection::FixedSelection;
use codescope::selection::page::PageSelection;
use tempfile::TempDir;

const REPOSITORY_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>app/views.py at main</title>
  <script>var code = "<code>not this</code>";</script>
</head>
<body>
  <!-- <div class="blob-code-inner">commented out</div> -->
  <nav><a href="/">Home</a></nav>
  <table class="highlight tab-size js-file-line-container">
    <tr><td class="blob-num" data-line-number="1"></td>
        <td class="blob-code blob-code-inner js-file-line">def view(request):</td></tr>
    <tr><td class="blob-num" data-line-number="2"></td>
        <td class="blob-code blob-code-inner js-file-line">    return HttpResponse(request.GET[&quot;q&quot;])</td></tr>
  </table>
  <p>Inline <code>view()</code> mention.</p>
</body>
</html>
"#;

fn page_reader(dir: &TempDir, html: &str, selection: &str) -> SelectionReader {
    let path = dir.path().join("page.html");
    fs::write(&path, html).unwrap();
    SelectionReader::new(FixedSelection(selection.to_string())).with_page(PageSelection::new(path))
}

#[test]
fn test_selection_wins_over_page() {
    let temp_dir = TempDir::new().unwrap();
    let reader = page_reader(&temp_dir, REPOSITORY_PAGE, "  SELECT * FROM t  \n");
    assert_eq!(reader.read_selection(), "SELECT * FROM t");
}

#[test]
fn test_page_fallback_uses_first_code_line() {
    let temp_dir = TempDir::new().unwrap();
    let reader = page_reader(&temp_dir, REPOSITORY_PAGE, "");
    assert_eq!(reader.read_selection(), "def view(request):");
}

#[test]
fn test_page_without_code_is_no_selection() {
    let temp_dir = TempDir::new().unwrap();
    let reader = page_reader(&temp_dir, "<html><body><p>Nothing here</p></body></html>", "   ");
    assert_eq!(reader.require_selection(), Err(AnalysisError::NoSelection));
}

#[test]
fn test_missing_page_file_is_no_selection() {
    let temp_dir = TempDir::new().unwrap();
    let reader = SelectionReader::new(FixedSelection(String::new()))
        .with_page(PageSelection::new(temp_dir.path().join("gone.html")));
    assert_eq!(reader.require_selection(), Err(AnalysisError::NoSelection));
}
