//! # InputBox Component
//!
//! Handles user input and shows where the current send stands.
//!
//! ## Responsibilities
//!
//! - Capture text input (typing, paste, Ctrl+J newlines)
//! - Handle editing (backspace, delete, cursor movement)
//! - Emit `Submit` on Enter
//! - Display the buffer, wrapped, with at most `MAX_VISIBLE_LINES` rows
//!
//! The buffer is internal state. Whether a send is outstanding or failed is a
//! prop from the composer. The buffer is cleared by the parent once the core
//! accepts a submit, so a rejected submit never loses text.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Top + bottom borders consumed vertically
const VERTICAL_OVERHEAD: u16 = 2;
/// Left + right borders consumed horizontally
const HORIZONTAL_OVERHEAD: u16 = 2;
/// Maximum visible content lines before internal scrolling kicks in
const MAX_VISIBLE_LINES: u16 = 5;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User asked to send the text (Enter pressed)
    Submit(String),
    /// Text content changed
    ContentChanged,
}

/// What the composer is doing, as far as the input box cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputStatus {
    #[default]
    Ready,
    Sending,
    Failed,
}

impl InputStatus {
    fn title(self) -> &'static str {
        match self {
            InputStatus::Ready => "Message (Enter send · Ctrl+J newline)",
            InputStatus::Sending => "Sending... (Esc cancels)",
            InputStatus::Failed => "Send failed (Ctrl+R retry · Ctrl+E edit · Esc dismiss)",
        }
    }

    fn border_color(self) -> Color {
        match self {
            InputStatus::Ready => Color::Green,
            InputStatus::Sending => Color::DarkGray,
            InputStatus::Failed => Color::Red,
        }
    }
}

#[derive(Default)]
pub struct InputBox {
    buffer: String,
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    cursor: usize,
    /// Prop: composer status
    pub status: InputStatus,
}

fn wrap_options(width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Wrap `text` to `width`, keeping a trailing empty line for a trailing newline.
fn wrapped_lines(text: &str, width: u16) -> Vec<String> {
    if width == 0 {
        return vec![String::new()];
    }
    let mut lines: Vec<String> = textwrap::wrap(text, wrap_options(width))
        .into_iter()
        .map(|l| l.into_owned())
        .collect();
    if lines.is_empty() {
        lines.push(String::new());
    }
    if text.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
        lines.push(String::new());
    }
    lines
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replace the contents and put the cursor at the end.
    pub fn set_text(&mut self, text: String) {
        self.cursor = text.len();
        self.buffer = text;
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Height needed for the current buffer at `width`, clamped to
    /// `[1, MAX_VISIBLE_LINES]` content rows plus borders.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(HORIZONTAL_OVERHEAD);
        let lines = wrapped_lines(&self.buffer, inner).len() as u16;
        lines.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    /// Cursor (row, column) within the wrapped buffer.
    fn cursor_cell(&self, inner_width: u16) -> (u16, u16) {
        let prefix = &self.buffer[..self.cursor];
        let lines = wrapped_lines(prefix, inner_width);
        let row = lines.len().saturating_sub(1) as u16;
        let col = lines.last().map(|l| l.width()).unwrap_or(0) as u16;
        (row, col.min(inner_width.saturating_sub(1)))
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.buffer.len())
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner_width = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        let lines = wrapped_lines(&self.buffer, inner_width);
        let (cursor_row, cursor_col) = self.cursor_cell(inner_width);

        // Keep the cursor row inside the visible window
        let first = cursor_row.saturating_sub(MAX_VISIBLE_LINES - 1) as usize;
        let visible = lines
            .iter()
            .skip(first)
            .take(MAX_VISIBLE_LINES as usize)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");

        let border = Style::default().fg(self.status.border_color());
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(self.status.title());
        let input = Paragraph::new(visible).block(block);
        frame.render_widget(input, area);

        if self.status != InputStatus::Sending {
            let x = area.x + 1 + cursor_col;
            let y = area.y + 1 + cursor_row - first as u16;
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Normalize CRLF from some terminals
                let text = text.replace("\r\n", "\n");
                self.buffer.insert_str(self.cursor, &text);
                self.cursor += text.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = self.prev_boundary();
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete if self.cursor < self.buffer.len() => {
                let next = self.next_boundary();
                self.buffer.drain(self.cursor..next);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft => {
                self.cursor = self.prev_boundary();
                None
            }
            TuiEvent::CursorRight => {
                self.cursor = self.next_boundary();
                None
            }
            TuiEvent::CursorHome => {
                self.cursor = self.buffer[..self.cursor]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer[self.cursor..]
                    .find('\n')
                    .map(|i| self.cursor + i)
                    .unwrap_or(self.buffer.len());
                None
            }
            TuiEvent::Submit if !self.buffer.trim().is_empty() => {
                Some(InputEvent::Submit(self.buffer.clone()))
            }
            _ => None,
        }
    }
}
