//! Report section lexer.
//!
//! Splits a model report into an ordered sequence of [`Section`]s for display.
//! The input is read line by line by a small finite-state lexer producing three
//! token kinds:
//!
//! ```text
//! heading-line    := [A-Z] [A-Z \t]+ ':' ...     (only outside a fence)
//! fence-delimiter := ws* '```' info?             (info must not contain '`')
//! plain-text      := any other line, and every line inside a fence
//! ```
//!
//! # Segmentation
//!
//! - Each heading line starts a new segment (`SUMMARY:`, `IMPACT:`, `SOLUTION:`).
//! - Within a segment, text lines accumulate into a [`Section::Text`]; a closed
//!   fence flushes that text and emits a [`Section::Code`] with the fence markers
//!   and language tag removed.
//! - Text and code content is trimmed; whitespace-only text is dropped.
//! - Heading-like lines inside a fence are code, not segment boundaries.
//! - An unterminated fence degrades to text: its opener and body are emitted
//!   verbatim as part of the segment's text.
//!
//! Nothing checks that the model followed the requested structure. Free prose
//! comes back as a single text section.
//!
//! # Example
//!
//! ```
//! use codescope::report::{Section, format_sections};
//!
//! let report = "SUMMARY:\n1. SQL Injection\n\nSOLUTION:\n```sql\nSELECT ?\n```";
//! let sections: Vec<Section> = format_sections(report).collect();
//! assert_eq!(sections.len(), 3);
//! assert!(sections[2].is_code());
//! ```

use std::collections::VecDeque;
use std::iter::Peekable;
use std::str::Lines;

const FENCE: &str = "```";

/// A unit of rendered output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Text { content: String },
    Code { language: Option<String>, content: String },
}

impl Section {
    pub fn content(&self) -> &str {
        match self {
            Section::Text { content } | Section::Code { content, .. } => content,
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Section::Code { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Heading(&'a str),
    FenceOpen { line: &'a str, language: &'a str },
    FenceClose,
    Text(&'a str),
}

#[derive(Debug, Clone)]
struct Lexer<'a> {
    lines: Lines<'a>,
    in_fence: bool,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { lines: input.lines(), in_fence: false }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let line = self.lines.next()?;

        if let Some(language) = fence_info(line) {
            if self.in_fence {
                self.in_fence = false;
                return Some(Token::FenceClose);
            }
            self.in_fence = true;
            return Some(Token::FenceOpen { line, language });
        }

        if !self.in_fence && is_heading(line) {
            return Some(Token::Heading(line));
        }

        Some(Token::Text(line))
    }
}

/// Info string of a fence delimiter line, or None if the line is not one
fn fence_info(line: &str) -> Option<&str> {
    let info = line.trim_start().strip_prefix(FENCE)?.trim();
    if info.contains('`') {
        return None;
    }
    Some(info)
}

/// Uppercase word (optionally several, blank separated) followed by a colon
pub fn is_heading(line: &str) -> bool {
    let mut chars = line.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_uppercase()) {
        return false;
    }

    let mut body_len = 0;
    for c in chars {
        match c {
            ':' => return body_len > 0,
            'A'..='Z' | ' ' | '\t' => body_len += 1,
            _ => return false,
        }
    }
    false
}

struct CodeBlock<'a> {
    opener: &'a str,
    language: &'a str,
    lines: Vec<&'a str>,
}

impl CodeBlock<'_> {
    fn into_section(self) -> Section {
        let language = self.language.split_whitespace().next().map(str::to_string);
        Section::Code { language, content: self.lines.join("\n").trim().to_string() }
    }
}

/// Lazy, restartable iterator over the sections of a report
///
/// Sections are produced one heading-delimited segment at a time. Cloning the
/// iterator yields an independent cursor over the same report.
#[derive(Debug, Clone)]
pub struct Sections<'a> {
    tokens: Peekable<Lexer<'a>>,
    pending: VecDeque<Section>,
}

/// Split a report into text and code sections
pub fn format_sections(report_text: &str) -> Sections<'_> {
    Sections { tokens: Lexer::new(report_text).peekable(), pending: VecDeque::new() }
}

impl Iterator for Sections<'_> {
    type Item = Section;

    fn next(&mut self) -> Option<Section> {
        loop {
            if let Some(section) = self.pending.pop_front() {
                return Some(section);
            }
            self.tokens.peek()?;
            self.lex_segment();
        }
    }
}

impl<'a> Sections<'a> {
    /// Consume one segment: the tokens up to (not including) the next heading
    fn lex_segment(&mut self) {
        let mut text: Vec<&'a str> = Vec::new();
        let mut code: Option<CodeBlock<'a>> = None;
        let mut at_start = true;

        while let Some(token) =
            self.tokens.next_if(|token| at_start || !matches!(token, Token::Heading(_)))
        {
            at_start = false;
            match token {
                Token::Heading(line) | Token::Text(line) => match code.as_mut() {
                    Some(block) => block.lines.push(line),
                    None => text.push(line),
                },
                Token::FenceOpen { line, language } => {
                    code = Some(CodeBlock { opener: line, language, lines: Vec::new() });
                }
                Token::FenceClose => {
                    if let Some(block) = code.take() {
                        self.flush_text(&mut text);
                        self.pending.push_back(block.into_section());
                    }
                }
            }
        }

        // Unterminated fence
        if let Some(block) = code {
            text.push(block.opener);
            text.extend(block.lines);
        }
        self.flush_text(&mut text);
    }

    fn flush_text(&mut self, text: &mut Vec<&'a str>) {
        let joined = text.join("\n");
        text.clear();
        let content = joined.trim();
        if !content.is_empty() {
            self.pending.push_back(Section::Text { content: content.to_string() });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(input: &str) -> Vec<Section> {
        format_sections(input).collect()
    }

    fn text(content: &str) -> Section {
        Section::Text { content: content.to_string() }
    }

    fn code(language: Option<&str>, content: &str) -> Section {
        Section::Code { language: language.map(str::to_string), content: content.to_string() }
    }

    #[test]
    fn test_empty_input_has_no_sections() {
        assert!(sections("").is_empty());
        assert!(sections("  \n\n ").is_empty());
    }

    #[test]
    fn test_prose_is_single_text_section() {
        let result = sections("The code looks fine.\nNo issues were found.");
        assert_eq!(result, vec![text("The code looks fine.\nNo issues were found.")]);
    }

    #[test]
    fn test_splits_on_headings() {
        let report = "SUMMARY:\n1. SQL Injection\n\nIMPACT:\n1. Data theft\n\nSOLUTION:\n1. Use bind parameters";
        let result = sections(report);

        assert_eq!(
            result,
            vec![
                text("SUMMARY:\n1. SQL Injection"),
                text("IMPACT:\n1. Data theft"),
                text("SOLUTION:\n1. Use bind parameters"),
            ]
        );
        assert!(result.iter().all(|s| !s.is_code()));
    }

    #[test]
    fn test_text_before_first_heading() {
        let result = sections("Here is the report.\nSUMMARY:\n1. XSS");
        assert_eq!(result, vec![text("Here is the report."), text("SUMMARY:\n1. XSS")]);
    }

    #[test]
    fn test_multi_word_heading() {
        let result = sections("RISK LEVEL: high\nnotes\nOTHER NOTES:\nmore");
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].content(), "OTHER NOTES:\nmore");
    }

    #[test]
    fn test_not_headings() {
        // Single letter, lowercase, leading blank, numbered
        let result = sections("intro\nA: x\nSummary: y\n  IMPACT: z\n1. FIX: w");
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_single_fenced_block() {
        let result = sections("Use this:\n```rust\nlet q = query(&id)?;\n```\nDone.");
        assert_eq!(
            result,
            vec![text("Use this:"), code(Some("rust"), "let q = query(&id)?;"), text("Done.")]
        );
    }

    #[test]
    fn test_block_spanning_whole_input() {
        let result = sections("```\n  x = 1\n```");
        assert_eq!(result, vec![code(None, "x = 1")]);
    }

    #[test]
    fn test_language_tag_stripped() {
        let result = sections("```python title=\"fix.py\"\nprint('ok')\n```");
        assert_eq!(result, vec![code(Some("python"), "print('ok')")]);
    }

    #[test]
    fn test_heading_inside_fence_does_not_split() {
        let report = "SOLUTION:\n```yaml\nSUMMARY: not a heading\nkey: value\n```\nafter";
        let result = sections(report);
        assert_eq!(
            result,
            vec![
                text("SOLUTION:"),
                code(Some("yaml"), "SUMMARY: not a heading\nkey: value"),
                text("after"),
            ]
        );
    }

    #[test]
    fn test_unterminated_fence_degrades_to_text() {
        let report = "SOLUTION:\n1. Escape output\n```js\nel.textContent = v;\nIMPACT: none";
        let result = sections(report);
        assert_eq!(
            result,
            vec![text("SOLUTION:\n1. Escape output\n```js\nel.textContent = v;\nIMPACT: none")]
        );
    }

    #[test]
    fn test_inline_backticks_are_text() {
        let result = sections("```inline``` code is not a fence");
        assert_eq!(result, vec![text("```inline``` code is not a fence")]);
    }

    #[test]
    fn test_indented_fence() {
        let result = sections("1. Fix:\n   ```\n   escape(x)\n   ```");
        assert_eq!(result, vec![text("1. Fix:"), code(None, "escape(x)")]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let result = sections("SUMMARY:\r\n1. XSS\r\nIMPACT:\r\n1. Bad");
        assert_eq!(result, vec![text("SUMMARY:\n1. XSS"), text("IMPACT:\n1. Bad")]);
    }

    #[test]
    fn test_restartable() {
        let report = "SUMMARY:\n1. A\n```\nx\n```\nIMPACT:\n1. B";
        let mut iter = format_sections(report);
        let first = iter.next();
        let resumed = iter.clone();

        let rest: Vec<Section> = iter.collect();
        let rest_again: Vec<Section> = resumed.collect();
        assert_eq!(rest, rest_again);
        assert_eq!(first, Some(text("SUMMARY:\n1. A")));

        let all: Vec<Section> = format_sections(report).collect();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_lexer_tokens() {
        let tokens: Vec<Token> = Lexer::new("SUMMARY:\n```c\nIMPACT:\n```\nx").collect();
        assert_eq!(
            tokens,
            vec![
                Token::Heading("SUMMARY:"),
                Token::FenceOpen { line: "```c", language: "c" },
                Token::Text("IMPACT:"),
                Token::FenceClose,
                Token::Text("x"),
            ]
        );
    }
}
