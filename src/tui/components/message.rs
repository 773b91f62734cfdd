use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::api::Sender;
use crate::core::conversation::Entry;
use crate::tui::component::Component;
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// A stateless component that renders one transcript entry.
///
/// `Message` is a **transient component**: it's created fresh each frame with
/// the entry it renders and holds no state of its own.
///
/// # Styling
///
/// - **User** (green): confirmed messages from the human
/// - **Bot** (blue): replies from the advisor
/// - **PendingLocal**: dimmed, titled "sending"
/// - **Failed**: red border, titled "not delivered"
///
/// Text goes through [`markdown::render_message`], which normalizes user
/// lines and renders advisor replies as delivered.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub entry: &'a Entry,
}

impl<'a> Message<'a> {
    pub fn new(entry: &'a Entry) -> Self {
        Self { entry }
    }

    /// Calculate the height required for this entry given a width.
    ///
    /// Heights come from `Paragraph::line_count` on the same text and wrap
    /// settings used by `render`, so the list can lay out the scroll canvas
    /// before drawing anything.
    pub fn calculate_height(entry: &Entry, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Degenerate case: terminal too narrow for borders + padding.
            return 1;
        }
        let lines = body(entry).line_count(content_width) as u16;
        lines.max(1) + VERTICAL_OVERHEAD
    }
}

fn sender_color(sender: Sender) -> Color {
    match sender {
        Sender::User => Color::Green,
        Sender::Bot => Color::Blue,
    }
}

fn title(entry: &Entry) -> &'static str {
    match (entry, entry.message().sender) {
        (Entry::PendingLocal(_), _) => "you · sending",
        (Entry::Failed(_), _) => "you · not delivered",
        (Entry::Confirmed(_), Sender::User) => "you",
        (Entry::Confirmed(_), Sender::Bot) => "advisor",
    }
}

fn content_text(entry: &Entry) -> Text<'static> {
    let message = entry.message();
    markdown::render_message(message, sender_color(message.sender))
}

fn body(entry: &Entry) -> Paragraph<'static> {
    let style = match entry {
        Entry::PendingLocal(_) => Style::default().add_modifier(Modifier::DIM),
        _ => Style::default(),
    };
    Paragraph::new(content_text(entry))
        .style(style)
        .wrap(Wrap { trim: false })
}

fn border_style(entry: &Entry) -> Style {
    match entry {
        Entry::Failed(_) => Style::default().fg(Color::Red),
        Entry::PendingLocal(_) => Style::default()
            .fg(sender_color(entry.message().sender))
            .add_modifier(Modifier::DIM),
        Entry::Confirmed(m) => Style::default().fg(sender_color(m.sender)),
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let border = border_style(self.entry);
        let block = Block::bordered()
            .title(title(self.entry))
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title_style(border)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);
        body(self.entry).render(inner_area, buf);
    }
}

impl<'a> Component for Message<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
