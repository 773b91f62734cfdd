//! # TitleBar Component
//!
//! Top status bar: which backend we talk to, what just happened, and
//! whether there is unread transcript below the fold.
//!
//! Purely presentational. All three props come from elsewhere:
//! - `backend_url`: resolved configuration
//! - `status_message`: core App state, set by `update()`
//! - `has_unseen_content`: TUI scroll state
//!
//! Formats, in priority order:
//!
//! 1. `"wealthchat (http://localhost:8000) | Sending... | ↓ New"`
//! 2. `"wealthchat (http://localhost:8000) | Sending..."`
//! 3. `"wealthchat (http://localhost:8000)"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar {
    pub backend_url: String,
    pub status_message: String,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(backend_url: String, status_message: String, has_unseen_content: bool) -> Self {
        Self {
            backend_url,
            status_message,
            has_unseen_content,
        }
    }

    fn text(&self) -> String {
        let mut title = format!("wealthchat ({})", self.backend_url);
        if !self.status_message.is_empty() {
            title.push_str(" | ");
            title.push_str(&self.status_message);
        }
        if self.has_unseen_content {
            title.push_str(" | ↓ New");
        }
        title
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = Line::from(Span::styled(
            self.text(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(line, area);
    }
}
