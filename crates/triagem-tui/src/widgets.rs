//! Widget state behind the controller's UI handles

use triagem_core::{InputField, Message, MessageSink, SendControl, Transcript, IDLE_PLACEHOLDER};

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Multi-line symptom input with a character cursor
#[derive(Debug, Clone)]
pub struct TextInput {
    buffer: String,
    cursor: usize,
    enabled: bool,
    placeholder: String,
    focused: bool,
}

impl Default for TextInput {
    fn default() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            enabled: true,
            placeholder: IDLE_PLACEHOLDER.to_string(),
            focused: true,
        }
    }
}

impl TextInput {
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.buffer, self.cursor);
        self.buffer.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.buffer, self.cursor);
            self.buffer.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.buffer.chars().count() {
            let byte_pos = char_to_byte_index(&self.buffer, self.cursor);
            self.buffer.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.buffer.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.buffer.chars().count();
    }

    /// Cursor as (line, column), both in characters
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before: String = self.buffer.chars().take(self.cursor).collect();
        let line = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map(|tail| tail.chars().count())
            .unwrap_or(0);
        (line, col)
    }

    pub fn line_count(&self) -> usize {
        self.buffer.split('\n').count()
    }
}

impl InputField for TextInput {
    fn value(&self) -> String {
        self.buffer.clone()
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn set_placeholder(&mut self, placeholder: &str) {
        self.placeholder = placeholder.to_string();
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}

#[derive(Debug, Clone)]
pub struct SendButton {
    enabled: bool,
    focused: bool,
}

impl Default for SendButton {
    fn default() -> Self {
        Self {
            enabled: true,
            focused: false,
        }
    }
}

impl SendButton {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

impl SendControl for SendButton {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Transcript plus scroll position. New entries pin the view to the bottom.
#[derive(Debug, Clone)]
pub struct ChatLog {
    transcript: Transcript,
    pub scroll: u16,
    pub follow: bool,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self {
            transcript: Transcript::new(),
            scroll: 0,
            follow: true,
        }
    }
}

impl ChatLog {
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }
}

impl MessageSink for ChatLog {
    fn append(&mut self, message: Message) {
        self.transcript.append(message);
        self.follow = true;
    }

    fn show_typing(&mut self) {
        self.transcript.show_typing();
        self.follow = true;
    }

    fn hide_typing(&mut self) {
        self.transcript.hide_typing();
    }
}
