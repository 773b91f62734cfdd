//! Markdown → ratatui `Text` for chat messages.
//!
//! The two authors are rendered differently. Advisor replies are markdown as
//! delivered. User messages go through `core::normalize` first, which ends
//! every plain line with an `&nbsp;` marker so that lines the user typed
//! stay separate. The parser decodes the marker to U+00A0; once it has
//! shaped the paragraphs it is stripped from line ends, leaving marker-only
//! lines as visible blank rows.
//!
//! A single newline inside a paragraph starts a new line (soft breaks are
//! hard breaks). Tables are laid out in aligned columns since the advisor
//! likes to tabulate fund comparisons.

use std::sync::LazyLock;

use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::api::{Message, Sender};
use crate::core::normalize::normalize;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const NBSP: char = '\u{a0}';

/// Renders one chat message in its author's colour.
pub fn render_message(message: &Message, base_fg: Color) -> Text<'static> {
    match message.sender {
        Sender::User => {
            let mut text = render(&normalize(&message.text), base_fg);
            for line in &mut text.lines {
                strip_break_marker(line);
            }
            text
        }
        Sender::Bot => render(&message.text, base_fg),
    }
}

/// Parses markdown into styled, owned `Text` with `base_fg` as body colour.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);

    let mut r = Renderer::new(base_fg);
    for event in Parser::new_ext(content, opts) {
        r.handle(event);
    }
    Text::from(r.lines)
}

/// Drops trailing U+00A0 from a line. A line that was only a marker keeps
/// its row but loses its spans.
fn strip_break_marker(line: &mut Line<'static>) {
    while let Some(last) = line.spans.last_mut() {
        let trimmed = last.content.trim_end_matches(NBSP).to_string();
        if trimmed.len() == last.content.len() {
            break;
        }
        if trimmed.is_empty() {
            line.spans.pop();
        } else {
            last.content = trimmed.into();
            break;
        }
    }
}

enum CodeBlock {
    Highlighted(HighlightLines<'static>),
    Plain,
}

/// Rows of a table, buffered until the column widths are known.
struct TableBuilder {
    alignments: Vec<Alignment>,
    rows: Vec<Vec<Vec<Span<'static>>>>,
    header_rows: usize,
}

impl TableBuilder {
    fn new(alignments: Vec<Alignment>) -> Self {
        Self {
            alignments,
            rows: Vec::new(),
            header_rows: 0,
        }
    }

    fn start_row(&mut self) {
        self.rows.push(Vec::new());
    }

    fn start_cell(&mut self) {
        if let Some(row) = self.rows.last_mut() {
            row.push(Vec::new());
        }
    }

    fn push(&mut self, span: Span<'static>) {
        if let Some(cell) = self.rows.last_mut().and_then(|row| row.last_mut()) {
            cell.push(span);
        }
    }

    fn into_lines(self) -> Vec<Line<'static>> {
        let rule = Style::default().fg(Color::DarkGray);
        let cols = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let widths: Vec<usize> = (0..cols)
            .map(|c| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(c))
                    .map(|cell| cell_width(cell))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::new();
        for (i, row) in self.rows.into_iter().enumerate() {
            let mut cells = row.into_iter();
            let mut spans = Vec::new();
            for (c, &width) in widths.iter().enumerate() {
                if c > 0 {
                    spans.push(Span::styled(" │ ", rule));
                }
                let cell = cells.next().unwrap_or_default();
                let pad = width - cell_width(&cell);
                let (left, right) = match self.alignments.get(c) {
                    Some(Alignment::Right) => (pad, 0),
                    Some(Alignment::Center) => (pad / 2, pad - pad / 2),
                    _ => (0, pad),
                };
                if left > 0 {
                    spans.push(Span::raw(" ".repeat(left)));
                }
                spans.extend(cell);
                if right > 0 && c + 1 < cols {
                    spans.push(Span::raw(" ".repeat(right)));
                }
            }
            lines.push(Line::from(spans));

            if i + 1 == self.header_rows {
                let separator = widths
                    .iter()
                    .map(|w| "─".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("─┼─");
                lines.push(Line::from(Span::styled(separator, rule)));
            }
        }
        lines
    }
}

fn cell_width(cell: &[Span<'_>]) -> usize {
    cell.iter().map(Span::width).sum()
}

struct Renderer {
    lines: Vec<Line<'static>>,
    base_fg: Color,
    /// Inline styles; each entry is already patched onto its parent.
    styles: Vec<Style>,
    /// Left-hand prefixes for quotes and code blocks, outermost first.
    gutters: Vec<Span<'static>>,
    /// None = bullet list, Some(n) = ordered list at item n.
    lists: Vec<Option<u64>>,
    /// Set right after a list marker so a loose item's paragraph stays on
    /// the marker's line.
    fresh_item: bool,
    code: Option<CodeBlock>,
    table: Option<TableBuilder>,
    /// Destination and collected text of the open link.
    link: Option<(String, String)>,
    /// A blank row is owed before the next block.
    gap: bool,
}

impl Renderer {
    fn new(base_fg: Color) -> Self {
        Self {
            lines: Vec::new(),
            base_fg,
            styles: Vec::new(),
            gutters: Vec::new(),
            lists: Vec::new(),
            fresh_item: false,
            code: None,
            table: None,
            link: None,
            gap: false,
        }
    }

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn new_line(&mut self, spans: Vec<Span<'static>>) {
        let mut line: Vec<Span<'static>> = self.gutters.clone();
        line.extend(spans);
        self.lines.push(Line::from(line));
    }

    fn push_span(&mut self, span: Span<'static>) {
        if let Some(table) = &mut self.table {
            table.push(span);
            return;
        }
        match self.lines.last_mut() {
            Some(line) => line.push_span(span),
            None => self.new_line(vec![span]),
        }
    }

    fn open_block(&mut self) {
        if self.gap && !self.lines.is_empty() {
            self.new_line(Vec::new());
        }
        self.gap = false;
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => {
                self.fresh_item = false;
                self.push_span(Span::styled(c.to_string(), Style::default().fg(Color::Yellow)));
            }
            Event::SoftBreak | Event::HardBreak => self.new_line(Vec::new()),
            Event::Rule => {
                self.open_block();
                self.new_line(vec![Span::styled(
                    "─".repeat(40),
                    Style::default().fg(Color::DarkGray),
                )]);
                self.gap = true;
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if !self.fresh_item {
                    self.open_block();
                    self.new_line(Vec::new());
                }
            }
            Tag::Heading { level, .. } => {
                self.open_block();
                self.new_line(Vec::new());
                let mut heading = Style::default().add_modifier(Modifier::BOLD);
                if level == HeadingLevel::H1 {
                    heading = heading.add_modifier(Modifier::UNDERLINED);
                }
                self.push_style(heading);
            }
            Tag::BlockQuote(_) => {
                self.open_block();
                self.gutters
                    .push(Span::styled("▎ ", Style::default().fg(Color::DarkGray)));
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.open_block();
                let lang = match &kind {
                    CodeBlockKind::Fenced(l) => l.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                let gutter = Style::default().fg(Color::DarkGray);
                if !lang.is_empty() {
                    self.new_line(vec![Span::styled(lang.clone(), gutter.add_modifier(Modifier::ITALIC))]);
                }
                self.gutters.push(Span::styled("▏ ", gutter));
                self.code = Some(
                    SYNTAX_SET
                        .find_syntax_by_token(&lang)
                        .filter(|_| !lang.is_empty())
                        .map(|syntax| {
                            let theme = &THEME_SET.themes["base16-ocean.dark"];
                            CodeBlock::Highlighted(HighlightLines::new(syntax, theme))
                        })
                        .unwrap_or(CodeBlock::Plain),
                );
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.open_block();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{indent}{n}. ");
                        *n += 1;
                        m
                    }
                    _ => format!("{indent}• "),
                };
                self.new_line(vec![Span::styled(marker, Style::default().fg(Color::DarkGray))]);
                self.fresh_item = true;
            }
            Tag::Table(alignments) => {
                self.open_block();
                self.table = Some(TableBuilder::new(alignments));
            }
            Tag::TableHead => {
                if let Some(table) = &mut self.table {
                    table.start_row();
                }
                self.push_style(Style::default().add_modifier(Modifier::BOLD));
            }
            Tag::TableRow => {
                if let Some(table) = &mut self.table {
                    table.start_row();
                }
            }
            Tag::TableCell => {
                if let Some(table) = &mut self.table {
                    table.start_cell();
                }
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link = Some((dest_url.to_string(), String::new()));
                self.push_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.gap = true,
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.gutters.pop();
                self.styles.pop();
                self.gap = true;
            }
            TagEnd::CodeBlock => {
                self.code = None;
                self.gutters.pop();
                self.gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.gap = true;
            }
            TagEnd::Item => self.fresh_item = false,
            TagEnd::TableHead => {
                self.styles.pop();
                if let Some(table) = &mut self.table {
                    table.header_rows = table.rows.len();
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    for line in table.into_lines() {
                        self.new_line(line.spans);
                    }
                }
                self.gap = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link => {
                self.styles.pop();
                if let Some((url, text)) = self.link.take()
                    && !url.is_empty()
                    && url != text
                {
                    self.push_span(Span::styled(
                        format!(" ({url})"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, cow: CowStr<'_>) {
        self.fresh_item = false;
        // ratatui draws '\t' as zero width
        let text = cow.replace('\t', "    ");

        match &mut self.code {
            Some(CodeBlock::Highlighted(hl)) => {
                let mut rows = Vec::new();
                for line in LinesWithEndings::from(text.as_str()) {
                    let Ok(ranges) = hl.highlight_line(line, &SYNTAX_SET) else {
                        continue;
                    };
                    let spans: Vec<Span<'static>> = ranges
                        .into_iter()
                        .map(|(style, frag)| {
                            let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                            Span::styled(frag.trim_end_matches('\n').to_string(), Style::default().fg(fg))
                        })
                        .filter(|span| !span.content.is_empty())
                        .collect();
                    rows.push(spans);
                }
                for spans in rows {
                    self.new_line(spans);
                }
            }
            Some(CodeBlock::Plain) => {
                for line in text.lines() {
                    self.new_line(vec![Span::styled(line.to_string(), Style::default().fg(Color::White))]);
                }
            }
            None => {
                if let Some((_, link_text)) = &mut self.link {
                    link_text.push_str(&text);
                }
                let style = self.style();
                self.push_span(Span::styled(text, style));
            }
        }
    }
}
