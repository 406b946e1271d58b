use crate::conversation::Conversation;
use ratatui::{
    style::Color,
    style::Style,
    text::{Line, Span},
};
use std::path::PathBuf;

pub struct UiState {
    pub conversation: Conversation,
    /// Cursor position in `conversation.input`, counted in chars.
    pub cursor: usize,
    pub info: String,
    pub show_help: bool,
    pub base_url: String,
    pub yaml_scroll: u16,
    pub last_saved_path: Option<PathBuf>,
    // Animation state for the "Processing..." indicator
    pub animation_frame: u8,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            conversation: Conversation::new(),
            cursor: 0,
            info: String::new(),
            show_help: false,
            base_url: String::new(),
            yaml_scroll: 0,
            last_saved_path: None,
            animation_frame: 0,
        }
    }
}

impl UiState {
    fn byte_index(&self, char_idx: usize) -> usize {
        self.conversation
            .input
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.conversation.input.len())
    }

    fn input_len(&self) -> usize {
        self.conversation.input.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        if self.conversation.is_pending() {
            return;
        }
        let idx = self.byte_index(self.cursor);
        self.conversation.input.insert(idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.conversation.is_pending() || self.cursor == 0 {
            return;
        }
        let idx = self.byte_index(self.cursor - 1);
        self.conversation.input.remove(idx);
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        if self.conversation.is_pending() || self.cursor >= self.input_len() {
            return;
        }
        let idx = self.byte_index(self.cursor);
        self.conversation.input.remove(idx);
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input_len());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input_len();
    }

    /// Keep the cursor inside the input after the conversation cleared it.
    pub fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.input_len());
    }

    pub fn scroll_yaml(&mut self, delta: i32, visible_rows: u16) {
        let total = crate::tui::yaml_view::line_count(self.conversation.document());
        let max = i64::try_from(total.saturating_sub(visible_rows as usize)).unwrap_or(i64::MAX);
        let next = (i64::from(self.yaml_scroll) + i64::from(delta)).clamp(0, max);
        self.yaml_scroll = u16::try_from(next).unwrap_or(u16::MAX);
    }

    pub fn tick(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;
    }
}

pub fn push_wrapped_status_kv(
    out: &mut Vec<Line<'static>>,
    label: &str,
    value: &str,
    status_area_width: u16,
) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    // Account for borders (2 chars on each side)
    let usable_width = status_area_width.saturating_sub(4).max(1);
    let label_text = format!("{label}:");
    let label_width = label_text.chars().count() as u16;

    let value_chars: Vec<char> = value.chars().collect();
    let mut remaining = value_chars.as_slice();
    let mut first = true;

    while !remaining.is_empty() {
        let line_width = if first {
            usable_width.saturating_sub(label_width + 1).max(1)
        } else {
            usable_width.saturating_sub(2).max(1)
        };

        let chars_to_take = (remaining.len() as u16).min(line_width) as usize;
        let (line_chars, rest) = remaining.split_at(chars_to_take);
        let line_text: String = line_chars.iter().collect();

        if first {
            out.push(Line::from(vec![
                Span::styled(label_text.clone(), Style::default().fg(Color::Gray)),
                Span::raw(" "),
                Span::raw(line_text),
            ]));
            first = false;
        } else {
            out.push(Line::from(vec![Span::raw("  "), Span::raw(line_text)]));
        }

        remaining = rest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> UiState {
        let mut state = UiState::default();
        for c in s.chars() {
            state.insert_char(c);
        }
        state
    }

    #[test]
    fn editing_handles_multibyte_chars() {
        let mut state = typed("añb");
        state.cursor_left();
        state.backspace();
        assert_eq!(state.conversation.input, "ab");
        assert_eq!(state.cursor, 1);
        state.cursor_home();
        state.delete();
        assert_eq!(state.conversation.input, "b");
    }

    #[test]
    fn input_is_locked_while_pending() {
        let mut state = typed("deploy");
        let _ = state.conversation.begin_input();
        state.insert_char('x');
        state.backspace();
        assert_eq!(state.conversation.input, "deploy");
    }

    #[test]
    fn cursor_clamps_after_input_cleared() {
        let mut state = typed("deploy");
        let _ = state.conversation.begin_input();
        state
            .conversation
            .resolve(Err(crate::service::ServiceError::Status(500)));
        state.clamp_cursor();
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn yaml_scroll_stays_in_range() {
        let mut state = UiState::default();
        state.scroll_yaml(5, 10);
        assert_eq!(state.yaml_scroll, 0);
    }

    #[test]
    fn yaml_scroll_saturates_past_u16_range() {
        let mut state = UiState::default();
        let _ = state.conversation.begin("huge");
        state.conversation.resolve(Ok(crate::model::YamlResponse {
            yaml: "a: 1\n".repeat(70_000),
            validation: Default::default(),
            parsed_requirements: None,
        }));
        state.scroll_yaml(i32::MAX, 10);
        assert_eq!(state.yaml_scroll, u16::MAX);
        state.scroll_yaml(-10, 10);
        assert_eq!(state.yaml_scroll, u16::MAX - 10);
    }

    #[test]
    fn wrapped_kv_splits_long_values() {
        let mut out = Vec::new();
        push_wrapped_status_kv(&mut out, "Service", "http://localhost:5000/very/long", 20);
        assert!(out.len() > 1);
        let mut none = Vec::new();
        push_wrapped_status_kv(&mut none, "Empty", "   ", 20);
        assert!(none.is_empty());
    }
}
