use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn keybind(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        keybind("Enter", 7, "Send"),
        keybind("Esc", 9, "Quit"),
        keybind("Ctrl-C", 6, "Quit"),
        keybind("Ctrl-Y", 6, "Copy YAML to clipboard"),
        keybind("Ctrl-S", 6, "Save YAML to current directory"),
        keybind("PgUp/PgDn", 3, "Scroll YAML"),
        keybind("←/→", 9, "Move cursor"),
        keybind("F1", 10, "Toggle this help"),
        Line::from(""),
        Line::from("The first message generates a configuration;"),
        Line::from("later messages refine it."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}
