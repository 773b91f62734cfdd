//! # FundCard Component
//!
//! One mutual fund in the sidebar: NAV, trailing returns, AUM, minimum
//! investment and CAGR. A fund that has not loaded yet says so, and a fund
//! that failed says "Unavailable"; neither is ever drawn as zeros.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Widget, Wrap};

use crate::api::FundSnapshot;
use crate::core::market::{
    FundPanel, Panel, Trend, format_aum, format_min_investment, format_nav, format_percent,
    format_return,
};

/// Borders plus four content rows.
pub const FUND_CARD_HEIGHT: u16 = 6;

pub struct FundCard<'a> {
    pub fund: &'a FundPanel,
}

fn trend_style(value: Option<f64>) -> Style {
    match value.map(Trend::of) {
        Some(Trend::Up) => Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        Some(Trend::Down) => Style::default().fg(Color::Red),
        None => Style::default().fg(Color::DarkGray),
    }
}

fn label(text: &'static str) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::Gray))
}

fn ready_lines(fund: &FundSnapshot) -> Vec<Line<'static>> {
    let returns = [("1Y ", fund.return_1y), ("3Y ", fund.return_3y), ("5Y ", fund.return_5y)];
    let mut return_spans = Vec::new();
    for (i, (name, value)) in returns.into_iter().enumerate() {
        if i > 0 {
            return_spans.push(Span::raw("  "));
        }
        return_spans.push(label(name));
        return_spans.push(Span::styled(format_return(value), trend_style(value)));
    }

    vec![
        Line::from(vec![
            label("NAV "),
            Span::styled(
                format_nav(fund.nav),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(return_spans),
        Line::from(vec![
            label("AUM "),
            Span::raw(format_aum(fund.aum)),
            label(" · Min "),
            Span::raw(format_min_investment(fund.min_investment)),
        ]),
        Line::from(vec![
            label("CAGR "),
            Span::styled(
                format_percent(fund.cagr),
                Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
            ),
        ]),
    ]
}

pub(crate) fn unavailable_lines(reason: &str) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "Unavailable",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            reason.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

pub(crate) fn loading_line() -> Line<'static> {
    Line::from(Span::styled(
        "Loading...",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    ))
}

impl<'a> Widget for FundCard<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::LightRed))
            .title(Span::styled(
                self.fund.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ));

        let lines = match &self.fund.panel {
            Panel::Loading => vec![loading_line()],
            Panel::Ready(fund) => ready_lines(fund),
            Panel::Unavailable(reason) => unavailable_lines(reason),
        };

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fund_snapshot;

    fn draw(panel: Panel<FundSnapshot>) -> String {
        let fund = FundPanel {
            name: "Baroda BNP Paribas Large Cap Fund".to_string(),
            panel,
        };
        let area = Rect::new(0, 0, 44, FUND_CARD_HEIGHT);
        let mut buf = Buffer::empty(area);
        FundCard { fund: &fund }.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn ready_card_shows_figures() {
        let text = draw(Panel::Ready(fund_snapshot("Baroda BNP Paribas Large Cap Fund")));
        assert!(text.contains("₹10.60"));
        assert!(text.contains("₹17635 Cr"));
        assert!(text.contains("₹500"));
        assert!(text.contains("13.46%"));
        assert!(text.contains("-1.25%"));
        assert!(text.contains("n/a"));
    }

    #[test]
    fn loading_card_shows_no_numbers() {
        let text = draw(Panel::Loading);
        assert!(text.contains("Loading..."));
        assert!(!text.contains('₹'));
        assert!(!text.contains("0.00"));
    }

    #[test]
    fn unavailable_card_explains() {
        let text = draw(Panel::Unavailable("network error: refused".to_string()));
        assert!(text.contains("Unavailable"));
        assert!(text.contains("refused"));
        assert!(!text.contains('₹'));
    }

    #[test]
    fn trend_colours() {
        assert_eq!(trend_style(Some(18.2)).fg, Some(Color::Blue));
        assert_eq!(trend_style(Some(0.0)).fg, Some(Color::Red));
        assert_eq!(trend_style(None).fg, Some(Color::DarkGray));
    }
}
