use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap};

use super::app::{MessageType, Phase, ReportView, StatusMessage};
use super::layout::AppLayout;
use super::timestamps::format_timestamp;
use crate::history::{HISTORY_CAPACITY, History};
use crate::report::{ScoreBand, Section, format_sections, is_heading};
use crate::utils::sanitize_for_display;

const TEXT: Color = Color::Rgb(250, 250, 250);
const MUTED: Color = Color::Rgb(113, 113, 122);
const ACCENT: Color = Color::Rgb(16, 185, 129);
const ERROR: Color = Color::Rgb(239, 68, 68);
const BAR_BG: Color = Color::Rgb(24, 24, 27);
const CODE_BG: Color = Color::Rgb(39, 39, 42);

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Everything needed to draw one frame
pub struct RenderState<'a> {
    pub model_label: &'a str,
    pub phase: &'a Phase,
    pub history: &'a History,
    pub show_history: bool,
    pub history_idx: usize,
    pub scroll: usize,
    pub spinner_tick: usize,
    pub status_message: Option<&'a StatusMessage>,
}

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let layout = AppLayout::new(frame.area(), state.show_history);

    render_header(frame, layout.header_area, state.model_label);
    match state.phase {
        Phase::Welcome => render_welcome(frame, layout.body_area),
        Phase::Analyzing => render_analyzing(frame, layout.body_area, state.spinner_tick),
        Phase::Failed(message) => render_error(frame, layout.body_area, message),
        Phase::Report(view) => render_report(frame, layout.body_area, view, state.scroll),
    }
    if let Some(area) = layout.history_area {
        render_history(frame, area, state.history, state.history_idx);
    }
    render_status_bar(frame, layout.status_area, state);
}

fn band_color(band: ScoreBand) -> Color {
    match band {
        ScoreBand::Secure => ACCENT,
        ScoreBand::Moderate => Color::Rgb(234, 179, 8),
        ScoreBand::Vulnerable => Color::Rgb(249, 115, 22),
        ScoreBand::Critical => ERROR,
    }
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title(title)
}

fn render_header(frame: &mut Frame, area: Rect, model_label: &str) {
    let line = Line::from(vec![
        Span::styled(
            " CodeScope ",
            Style::default().fg(TEXT).bg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" AI security scanner", Style::default().fg(MUTED)),
        Span::raw("  "),
        Span::styled("Model: ", Style::default().fg(MUTED)),
        Span::styled(model_label.to_string(), Style::default().fg(TEXT)),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(BAR_BG)), area);
}

fn render_welcome(frame: &mut Frame, area: Rect) {
    let muted = Style::default().fg(MUTED);
    let lines = vec![
        Line::from(Span::styled(
            "Ready to scan",
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Select code in any window, then press s or Enter.", muted)),
        Line::from(Span::styled(
            "With --page, the first code block of the page is used when nothing is selected.",
            muted,
        )),
        Line::from(""),
        Line::from(Span::styled(
            "The report lists vulnerabilities, their impact and fixes,",
            muted,
        )),
        Line::from(Span::styled("with a heuristic security score out of 100.", muted)),
    ];

    let paragraph =
        Paragraph::new(Text::from(lines)).block(bordered(" Welcome ")).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_analyzing(frame: &mut Frame, area: Rect, spinner_tick: usize) {
    let spinner = SPINNER[spinner_tick % SPINNER.len()];
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} ANALYZING CODE...", spinner),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled("Waiting for the security report", Style::default().fg(MUTED))),
    ];
    let paragraph = Paragraph::new(Text::from(lines)).block(bordered(" Scan "));
    frame.render_widget(paragraph, area);
}

fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let paragraph = Paragraph::new(sanitize_for_display(message))
        .style(Style::default().fg(ERROR))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ERROR))
                .title(" Error "),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_report(frame: &mut Frame, area: Rect, view: &ReportView, scroll: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let band = ScoreBand::from_score(view.score);
    let gauge = Gauge::default()
        .block(bordered(" Security Score "))
        .gauge_style(Style::default().fg(band_color(band)).bg(BAR_BG))
        .percent(u16::from(view.score))
        .label(format!("{}/100 {}", view.score, band.label()));
    frame.render_widget(gauge, chunks[0]);

    let title = format!(" Report ({}) ", view.model_label);
    let paragraph = Paragraph::new(report_text(&view.report_text))
        .block(bordered(&title))
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, chunks[1]);
}

/// Number of lines a report occupies before wrapping
pub(super) fn report_line_count(report: &str) -> usize {
    report_text(report).lines.len()
}

/// Styled lines for a report: headings bold, code blocks set apart
fn report_text(report: &str) -> Text<'static> {
    let sanitized = sanitize_for_display(report);
    let mut lines: Vec<Line<'static>> = Vec::new();

    for section in format_sections(&sanitized) {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        match section {
            Section::Text { content } => {
                for line in content.lines() {
                    let style = if is_heading(line) {
                        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(TEXT)
                    };
                    lines.push(Line::from(Span::styled(line.to_string(), style)));
                }
            }
            Section::Code { language, content } => {
                let code_style = Style::default().fg(Color::Rgb(125, 211, 252)).bg(CODE_BG);
                if let Some(language) = language {
                    lines.push(Line::from(Span::styled(
                        format!(" {} ", language),
                        Style::default().fg(MUTED).bg(CODE_BG),
                    )));
                }
                for line in content.lines() {
                    lines.push(Line::from(vec![
                        Span::styled("│ ", Style::default().fg(MUTED).bg(CODE_BG)),
                        Span::styled(line.to_string(), code_style),
                    ]));
                }
            }
        }
    }

    Text::from(lines)
}

fn render_history(frame: &mut Frame, area: Rect, history: &History, selected_idx: usize) {
    let title = format!(" History ({}/{}) ", history.len(), HISTORY_CAPACITY);

    if history.is_empty() {
        let paragraph = Paragraph::new(Span::styled("No scans yet", Style::default().fg(MUTED)))
            .block(bordered(&title));
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = history
        .entries()
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let band = ScoreBand::from_score(entry.derived_score());
            let preview = sanitize_for_display(entry.source_text.lines().next().unwrap_or(""))
                .chars()
                .take(40)
                .collect::<String>();

            let (badge_style, text_style) = if idx == selected_idx {
                let selected = Style::default().fg(TEXT).bg(ACCENT).add_modifier(Modifier::BOLD);
                (selected, selected)
            } else {
                (Style::default().fg(band_color(band)), Style::default().fg(MUTED))
            };

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{:>3} ", entry.derived_score()), badge_style),
                    Span::styled(
                        format!("{} | {}", entry.model_label, format_timestamp(&entry.timestamp())),
                        text_style,
                    ),
                ]),
                Line::from(Span::styled(format!("    {}", preview), text_style)),
            ])
        })
        .collect();

    let mut list_state = ListState::default().with_selected(Some(selected_idx));
    let list = List::new(items).block(bordered(&title));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let (status_text, style) = if let Some(message) = state.status_message {
        let fg = match message.message_type {
            MessageType::Success => ACCENT,
            MessageType::Error => ERROR,
        };
        (format!(" {} ", sanitize_for_display(&message.text)), Style::default().fg(fg).bg(BAR_BG))
    } else {
        let mut parts = vec!["s: scan", "m: model"];
        if matches!(state.phase, Phase::Report(_)) {
            parts.extend(["c: copy", "d: download"]);
        }
        if state.show_history {
            parts.extend(["Enter: open", "x: clear", "h: hide history"]);
        } else {
            parts.push("h: history");
        }
        parts.push("q: quit");
        (format!(" {} ", parts.join(" | ")), Style::default().fg(TEXT).bg(BAR_BG))
    };

    frame.render_widget(Paragraph::new(status_text).style(style), area);
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::models::HistoryEntry;

    const REPORT: &str = "SUMMARY:\n1. SQL Injection\n\nSOLUTION:\n```python\ncursor.execute(\"SELECT * FROM t WHERE id = %s\", (id,))\n```";

    fn state<'a>(phase: &'a Phase, history: &'a History) -> RenderState<'a> {
        RenderState {
            model_label: "Claude Sonnet 4",
            phase,
            history,
            show_history: false,
            history_idx: 0,
            scroll: 0,
            spinner_tick: 0,
            status_message: None,
        }
    }

    fn draw(width: u16, height: u16, state: &RenderState) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render_ui(f, state)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut screen = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                screen.push_str(buffer[(x, y)].symbol());
            }
            screen.push('\n');
        }
        screen
    }

    fn report_phase(report: &str, score: u8) -> Phase {
        Phase::Report(ReportView {
            report_text: report.to_string(),
            score,
            model_label: "Claude Sonnet 4".to_string(),
        })
    }

    #[test]
    fn test_render_welcome() {
        let history = History::new();
        let screen = draw(100, 20, &state(&Phase::Welcome, &history));
        assert!(screen.contains("CodeScope"));
        assert!(screen.contains("Claude Sonnet 4"));
        assert!(screen.contains("Ready to scan"));
        assert!(screen.contains("s: scan"));
    }

    #[test]
    fn test_render_analyzing() {
        let history = History::new();
        let screen = draw(100, 20, &state(&Phase::Analyzing, &history));
        assert!(screen.contains("ANALYZING CODE..."));
    }

    #[test]
    fn test_render_error() {
        let history = History::new();
        let phase = Phase::Failed("rate limited".to_string());
        let screen = draw(100, 20, &state(&phase, &history));
        assert!(screen.contains("Error"));
        assert!(screen.contains("rate limited"));
    }

    #[test]
    fn test_render_report_with_score_and_code() {
        let history = History::new();
        let phase = report_phase(REPORT, 85);
        let screen = draw(100, 30, &state(&phase, &history));

        assert!(screen.contains("85/100 MODERATE"));
        assert!(screen.contains("SUMMARY:"));
        assert!(screen.contains("1. SQL Injection"));
        assert!(screen.contains(" python "));
        assert!(screen.contains("│ cursor.execute"));
        // Fence markers are not shown
        assert!(!screen.contains("```"));
        assert!(screen.contains("c: copy"));
    }

    #[test]
    fn test_report_text_strips_escape_sequences() {
        let text = report_text("SUMMARY:\n1. \x1b[31mXSS\x1b[0m");
        let rendered: String = text
            .lines
            .iter()
            .flat_map(|line| line.spans.iter().map(|span| span.content.to_string()))
            .collect();
        assert!(rendered.contains("1. XSS"));
        assert!(!rendered.contains('\x1b'));
    }

    #[test]
    fn test_report_text_heading_style() {
        let text = report_text("IMPACT:\n1. Data leak");
        let heading = &text.lines[0].spans[0];
        assert_eq!(heading.content, "IMPACT:");
        assert!(heading.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_render_history_pane() {
        let mut history = History::new();
        history.record(HistoryEntry::now("query(userInput)", "critical", "Claude 3.5 Haiku"));
        let phase = Phase::Welcome;
        let mut render_state = state(&phase, &history);
        render_state.show_history = true;

        let screen = draw(120, 20, &render_state);
        assert!(screen.contains("History (1/10)"));
        assert!(screen.contains("Claude 3.5 Haiku"));
        assert!(screen.contains("just now"));
        assert!(screen.contains("query(userInput)"));
    }

    #[test]
    fn test_render_empty_history_pane() {
        let history = History::new();
        let phase = Phase::Welcome;
        let mut render_state = state(&phase, &history);
        render_state.show_history = true;

        let screen = draw(120, 20, &render_state);
        assert!(screen.contains("No scans yet"));
    }

    #[test]
    fn test_render_status_message() {
        let history = History::new();
        let message = StatusMessage {
            text: "✓ Copied to clipboard".to_string(),
            message_type: MessageType::Success,
            expires_at: Instant::now() + Duration::from_secs(3),
        };
        let phase = Phase::Welcome;
        let mut render_state = state(&phase, &history);
        render_state.status_message = Some(&message);

        let screen = draw(100, 10, &render_state);
        assert!(screen.contains("Copied to clipboard"));
        assert!(!screen.contains("q: quit"));
    }

    #[test]
    fn test_render_tiny_terminal() {
        let history = History::new();
        let phase = report_phase(REPORT, 40);
        // Must not panic when there is barely any room
        draw(10, 4, &state(&phase, &history));
    }
}
