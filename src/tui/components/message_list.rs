//! # MessageList Component
//!
//! Scrollable view of the transcript.
//!
//! ## Responsibilities
//!
//! - Display every entry of the conversation store
//! - Manage scrolling and stick-to-bottom
//! - Show a waiting indicator while a reply is outstanding
//! - Cache entry heights so only visible entries are drawn
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the entries (props).

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::conversation::Entry;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;

const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
/// Rows reserved under the last entry for the waiting indicator.
const WAITING_ROWS: u16 = 1;

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true, // Start attached to bottom
            viewport_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout.total_height().saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// True when some content sits below the viewport.
    pub fn has_unseen_content(&self) -> bool {
        !self.stick_to_bottom && self.scroll_state.offset().y < self.max_offset()
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub entries: &'a [Entry],
    pub is_busy: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        entries: &'a [Entry],
        is_busy: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            entries,
            is_busy,
            spinner_frame,
        }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area

        // 1. Refresh the layout cache
        self.state.layout.refresh(self.entries, content_width);
        let total_height = self.state.layout.total_height();
        let waiting_rows = if self.is_busy { WAITING_ROWS } else { 0 };
        let canvas_height = total_height + waiting_rows;

        // 2. Clamp scroll offset to prevent overscrolling past content
        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible entries into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible_range.start > 0 {
            self.state.layout.prefix_heights[visible_range.start - 1]
        } else {
            0
        };

        for i in visible_range {
            let height = self.state.layout.heights[i];
            let rect = Rect::new(0, y_offset, content_width, height);
            scroll_view.render_widget(Message::new(&self.entries[i]), rect);
            y_offset += height;
        }

        if self.is_busy {
            let glyph = SPINNER[self.spinner_frame % SPINNER.len()];
            let indicator = Span::styled(
                format!(" {glyph} waiting for the advisor..."),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            );
            scroll_view.render_widget(
                indicator,
                Rect::new(0, total_height, content_width, WAITING_ROWS),
            );
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// EventHandler is implemented on `MessageListState` rather than `MessageList`
/// because scrolling mutates persistent state, and `MessageList` is rebuilt
/// every frame.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollToBottom => {
                self.stick_to_bottom = true;
                self.scroll_state.scroll_to_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached entry heights for one width.
///
/// The store can be replaced wholesale by an agent reply, so the cache is
/// keyed on the entries themselves rather than on a count.
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    entries: Vec<Entry>,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            entries: Vec::new(),
            content_width: 0,
        }
    }

    /// How many leading cached heights are still valid for `entries` at `content_width`.
    pub fn reusable_count(&self, entries: &[Entry], content_width: u16) -> usize {
        if self.content_width != content_width {
            return 0;
        }
        self.entries
            .iter()
            .zip(entries)
            .take_while(|(cached, current)| cached == current)
            .count()
    }

    /// Recompute heights for every entry past the reusable prefix.
    pub fn refresh(&mut self, entries: &[Entry], content_width: u16) {
        let reusable = self.reusable_count(entries, content_width);
        self.heights.truncate(reusable);
        for entry in &entries[reusable..] {
            self.heights
                .push(Message::calculate_height(entry, content_width));
        }
        self.entries = entries.to_vec();
        self.content_width = content_width;
        self.rebuild_prefix_heights();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    /// Entries overlapping the viewport, plus half a viewport of slack either side.
    pub fn visible_range(
        &self,
        scroll_offset: u16,
        viewport_height: u16,
    ) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end.max(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Message as ChatMessage;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn confirmed(texts: &[&str]) -> Vec<Entry> {
        texts
            .iter()
            .map(|t| Entry::Confirmed(ChatMessage::bot(*t)))
            .collect()
    }

    #[test]
    fn cache_reuses_unchanged_prefix() {
        let mut cache = LayoutCache::new();
        let entries = confirmed(&["a", "b", "c"]);
        cache.refresh(&entries, 40);

        let mut grown = entries.clone();
        grown.push(Entry::PendingLocal(ChatMessage::user("d")));
        assert_eq!(cache.reusable_count(&grown, 40), 3);
        assert_eq!(cache.reusable_count(&entries, 20), 0);
    }

    #[test]
    fn cache_invalidates_on_replacement() {
        let mut cache = LayoutCache::new();
        let mut entries = vec![Entry::PendingLocal(ChatMessage::user("Hello"))];
        cache.refresh(&entries, 40);

        // Pending → Confirmed is a different entry even with the same text.
        entries[0] = Entry::Confirmed(ChatMessage::user("Hello"));
        assert_eq!(cache.reusable_count(&entries, 40), 0);
    }

    #[test]
    fn refresh_tracks_replace_all() {
        let mut cache = LayoutCache::new();
        cache.refresh(&confirmed(&["one", "two", "three"]), 40);
        assert_eq!(cache.heights.len(), 3);

        cache.refresh(&confirmed(&["only"]), 40);
        assert_eq!(cache.heights.len(), 1);
        assert_eq!(cache.total_height(), cache.heights[0]);
    }

    #[test]
    fn prefix_heights_accumulate() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![3, 4, 5];
        cache.rebuild_prefix_heights();
        assert_eq!(cache.prefix_heights, vec![3, 7, 12]);
        assert_eq!(cache.total_height(), 12);
    }

    #[test]
    fn visible_range_covers_viewport() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![10; 10];
        cache.rebuild_prefix_heights();

        // Viewport rows 40..60 with 10 rows of slack each side → rows 30..70
        let range = cache.visible_range(40, 20);
        assert_eq!(range, 3..7);
        assert_eq!(cache.visible_range(0, 20), 0..3);
    }

    #[test]
    fn empty_cache_has_empty_range() {
        let cache = LayoutCache::new();
        assert!(cache.visible_range(0, 20).is_empty());
    }

    #[test]
    fn scroll_up_detaches_and_down_repins() {
        let mut state = MessageListState::new();
        state.layout.heights = vec![10; 5];
        state.layout.rebuild_prefix_heights();
        state.viewport_height = 10;
        state.scroll_state.set_offset(Position { x: 0, y: 40 });

        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
        assert!(state.has_unseen_content());

        state.scroll_state.set_offset(Position { x: 0, y: 40 });
        state.handle_event(&TuiEvent::ScrollDown);
        assert!(state.stick_to_bottom);
        assert!(!state.has_unseen_content());
    }

    #[test]
    fn render_shows_entries_and_waiting_indicator() {
        let entries = vec![Entry::PendingLocal(ChatMessage::user("Hello"))];
        let mut state = MessageListState::new();
        let mut terminal = Terminal::new(TestBackend::new(50, 12)).unwrap();
        terminal
            .draw(|f| MessageList::new(&mut state, &entries, true, 0).render(f, f.area()))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Hello"));
        assert!(text.contains("waiting for the advisor"));
    }
}
