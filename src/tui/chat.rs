//! Chat panel rendering helpers.

use crate::model::{Message, Origin};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

fn wrap_chars(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for raw in text.split('\n') {
        let chars: Vec<char> = raw.chars().collect();
        if chars.is_empty() {
            out.push(String::new());
            continue;
        }
        for chunk in chars.chunks(width) {
            out.push(chunk.iter().collect());
        }
    }
    out
}

/// Transcript rendered as wrapped lines, or the welcome text when empty.
pub fn chat_lines(transcript: &[Message], width: u16) -> Vec<Line<'static>> {
    if transcript.is_empty() {
        return vec![
            Line::from("Welcome! Describe your deployment needs, for example:"),
            Line::from(Span::styled(
                "  • \"I need a Node.js service with 1GB memory and auto-scaling\"",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "  • \"Deploy a Python application with Redis\"",
                Style::default().fg(Color::Gray),
            )),
        ];
    }

    let mut lines = Vec::new();
    for msg in transcript {
        let (label, color) = match msg.origin {
            Origin::User => ("You", Color::Cyan),
            Origin::System => ("Assistant", Color::Green),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for l in wrap_chars(&msg.text, width.saturating_sub(2) as usize) {
            lines.push(Line::from(vec![Span::raw("  "), Span::raw(l)]));
        }
        lines.push(Line::from(""));
    }
    lines
}

/// Scroll offset that keeps the newest of `total` lines in a `visible`-row pane.
pub fn bottom_scroll(total: usize, visible: u16) -> u16 {
    u16::try_from(total)
        .unwrap_or(u16::MAX)
        .saturating_sub(visible)
}

/// Slice of the input that fits `width`, and the cursor column within it.
pub fn input_view(input: &str, cursor: usize, width: u16) -> (String, u16) {
    let width = (width as usize).max(1);
    let offset = (cursor + 1).saturating_sub(width);
    let visible: String = input.chars().skip(offset).take(width).collect();
    (visible, (cursor - offset) as u16)
}
