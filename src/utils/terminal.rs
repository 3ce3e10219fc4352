//! Terminal output sanitization.
//!
//! Report text comes from a remote model and source text from whatever the user
//! selected; both are untrusted. Escape sequences in either could move the
//! cursor, recolor the screen or set the window title when drawn, so everything
//! shown in the UI or printed by `scan` passes through [`sanitize_for_display`].

const TAB_WIDTH: usize = 4;

/// Strips ANSI escape sequences and control characters
///
/// Removes CSI sequences (`ESC [ ... letter`), OSC sequences
/// (`ESC ] ... BEL` or `ESC ] ... ESC \`) and every other control character
/// except tab, newline and carriage return.
///
/// ```
/// use codescope::utils::terminal::strip_ansi_codes;
///
/// assert_eq!(strip_ansi_codes("\x1b[31mRed\x1b[0m"), "Red");
/// ```
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    for next_ch in chars.by_ref() {
                        if next_ch.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(next_ch) = chars.next() {
                        if next_ch == '\x07' {
                            break;
                        }
                        if next_ch == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        if ch.is_control() && ch != '\t' && ch != '\n' && ch != '\r' {
            continue;
        }

        result.push(ch);
    }

    result
}

/// Prepares untrusted text for a ratatui paragraph
///
/// Strips escape sequences, drops carriage returns and expands tabs.
pub fn sanitize_for_display(text: &str) -> String {
    strip_ansi_codes(text).replace('\r', "").replace('\t', &" ".repeat(TAB_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_color_codes() {
        let text = "\x1b[31mCRITICAL\x1b[0m finding";
        assert_eq!(strip_ansi_codes(text), "CRITICAL finding");
    }

    #[test]
    fn test_strip_cursor_movement() {
        let text = "\x1b[2J\x1b[H SUMMARY:";
        assert_eq!(strip_ansi_codes(text), " SUMMARY:");
    }

    #[test]
    fn test_strip_osc_title_sequence() {
        assert_eq!(strip_ansi_codes("a\x1b]0;pwned\x07b"), "ab");
        assert_eq!(strip_ansi_codes("a\x1b]8;;http://x\x1b\\link"), "alink");
    }

    #[test]
    fn test_strip_bell_and_backspace() {
        assert_eq!(strip_ansi_codes("Alert!\x07\x08"), "Alert!");
    }

    #[test]
    fn test_preserves_plain_text_and_whitespace() {
        let text = "fn main() {\n\tlet x = 1;\r\n}";
        assert_eq!(strip_ansi_codes(text), text);
    }

    #[test]
    fn test_unicode_survives() {
        assert_eq!(strip_ansi_codes("🔒 \x1b[1mSecure\x1b[0m ✓"), "🔒 Secure ✓");
    }

    #[test]
    fn test_sanitize_expands_tabs_and_drops_cr() {
        assert_eq!(sanitize_for_display("a\tb\r\nc"), "a    b\nc");
    }

    #[test]
    fn test_empty() {
        assert_eq!(strip_ansi_codes(""), "");
        assert_eq!(sanitize_for_display(""), "");
    }
}
