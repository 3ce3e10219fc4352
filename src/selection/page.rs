//! Code extraction from a saved HTML page.
//!
//! A small tag scanner, not a full HTML parser: it tracks the open-element
//! stack with each element's classes, which is enough to evaluate the three
//! code-container selectors in priority order.

use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use super::SelectionSource;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<![^>]*>|<(/?)([A-Za-z][A-Za-z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#,
    )
    .expect("tag pattern is a valid regex")
});

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)class\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("class attribute pattern is a valid regex")
});

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9A-Fa-f]+|[A-Za-z]+);").expect("entity pattern is a valid regex")
});

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Code-container selectors, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selector {
    /// `.highlight pre`
    HighlightPre,
    /// `.blob-code-inner`
    BlobCodeInner,
    /// `code`
    Code,
}

const SELECTORS: [Selector; 3] = [Selector::HighlightPre, Selector::BlobCodeInner, Selector::Code];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node<'a> {
    Open { name: String, classes: Vec<String>, self_closing: bool },
    Close { name: String },
    Text(&'a str),
}

#[derive(Debug)]
struct OpenElement {
    name: String,
    classes: Vec<String>,
}

fn tokenize(html: &str) -> Vec<Node<'_>> {
    let mut nodes = Vec::new();
    let mut last = 0;

    for caps in TAG_RE.captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            nodes.push(Node::Text(&html[last..whole.start()]));
        }
        last = whole.end();

        // Comments and doctype carry no name group
        let Some(name) = caps.get(2) else { continue };
        let name = name.as_str().to_ascii_lowercase();
        let attrs = caps.get(3).map_or("", |m| m.as_str());

        if caps.get(1).is_some_and(|slash| !slash.as_str().is_empty()) {
            nodes.push(Node::Close { name });
        } else {
            let self_closing =
                attrs.trim_end().ends_with('/') || VOID_ELEMENTS.contains(&name.as_str());
            nodes.push(Node::Open { name, classes: parse_classes(attrs), self_closing });
        }
    }

    if last < html.len() {
        nodes.push(Node::Text(&html[last..]));
    }
    nodes
}

fn parse_classes(attrs: &str) -> Vec<String> {
    CLASS_RE
        .captures(attrs)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|value| value.as_str().split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn matches(selector: Selector, name: &str, classes: &[String], ancestors: &[OpenElement]) -> bool {
    match selector {
        Selector::HighlightPre => {
            name == "pre"
                && ancestors.iter().any(|el| el.classes.iter().any(|c| c == "highlight"))
        }
        Selector::BlobCodeInner => classes.iter().any(|c| c == "blob-code-inner"),
        Selector::Code => name == "code",
    }
}

fn pop_until(stack: &mut Vec<OpenElement>, name: &str) {
    // Stray close tags without a matching open element are ignored
    if let Some(index) = stack.iter().rposition(|el| el.name == name) {
        stack.truncate(index);
    }
}

/// Text content of the first element matching `selector`, if any
fn first_match(nodes: &[Node<'_>], selector: Selector) -> Option<String> {
    let mut stack: Vec<OpenElement> = Vec::new();
    // Stack depth of the matched element while its content is collected
    let mut capture: Option<(usize, String)> = None;

    for node in nodes {
        match node {
            Node::Open { name, classes, self_closing } => {
                if capture.is_none() && matches(selector, name, classes, &stack) {
                    if *self_closing {
                        return Some(String::new());
                    }
                    capture = Some((stack.len(), String::new()));
                }
                if !self_closing {
                    stack.push(OpenElement { name: name.clone(), classes: classes.clone() });
                }
            }
            Node::Close { name } => {
                pop_until(&mut stack, name);
                match &capture {
                    Some((depth, text)) if stack.len() <= *depth => {
                        return Some(decode_entities(text));
                    }
                    _ => {}
                }
            }
            Node::Text(text) => {
                if let Some((_, collected)) = capture.as_mut() {
                    collected.push_str(text);
                }
            }
        }
    }

    // Element left open until end of document
    capture.map(|(_, text)| decode_entities(&text))
}

/// Decode the common named entities plus decimal and hex character references
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = if let Some(hex) =
                entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "amp" => Some('&'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// Trimmed text of the first code container in `html`, honouring selector
/// priority; empty when the page has none.
pub fn extract_code(html: &str) -> String {
    let nodes = tokenize(html);
    SELECTORS
        .iter()
        .find_map(|selector| first_match(&nodes, *selector))
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

/// Page document on disk, scanned on every read
#[derive(Debug, Clone)]
pub struct PageSelection {
    path: PathBuf,
}

impl PageSelection {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SelectionSource for PageSelection {
    fn read(&self) -> String {
        match fs::read_to_string(&self.path) {
            Ok(html) => {
                let code = extract_code(&html);
                debug!(
                    path = %self.path.display(),
                    chars = code.chars().count(),
                    "Scanned page for code"
                );
                code
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read page");
                String::new()
            }
        }
    }
}
