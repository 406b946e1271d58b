//! Read-only YAML display: line numbers on, tabs rendered 2 columns wide.

use crate::model::ValidationResult;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

pub const PLACEHOLDER: &str = "# Your YAML configuration will appear here";
const TAB_WIDTH: usize = 2;

/// Text shown in the panel: the document, or the placeholder when empty.
fn shown(yaml: &str) -> &str {
    if yaml.is_empty() {
        PLACEHOLDER
    } else {
        yaml
    }
}

pub fn line_count(yaml: &str) -> usize {
    shown(yaml).lines().count().max(1)
}

fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut col = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = TAB_WIDTH - (col % TAB_WIDTH);
            out.extend(std::iter::repeat(' ').take(pad));
            col += pad;
        } else {
            out.push(c);
            col += 1;
        }
    }
    out
}

/// Gutter + content lines for the YAML panel.
pub fn numbered_lines(yaml: &str) -> Vec<Line<'static>> {
    let text = shown(yaml);
    let total = line_count(yaml);
    let gutter = total.to_string().len();
    let body_style = if yaml.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let mut lines: Vec<Line<'static>> = text
        .lines()
        .enumerate()
        .map(|(i, l)| {
            Line::from(vec![
                Span::styled(
                    format!("{:>gutter$} ", i + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(expand_tabs(l), body_style),
            ])
        })
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("{:>gutter$} ", 1),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

pub fn validation_lines(v: &ValidationResult) -> Vec<Line<'static>> {
    if v.valid {
        return vec![Line::from(Span::styled(
            "✓ YAML configuration is valid",
            Style::default().fg(Color::Green),
        ))];
    }
    let mut out = vec![Line::from(Span::styled(
        "⚠ YAML has issues:",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))];
    for e in &v.errors {
        out.push(Line::from(vec![
            Span::styled("  • ", Style::default().fg(Color::Yellow)),
            Span::raw(e.clone()),
        ]));
    }
    out
}
