//! # StockCard Component
//!
//! The configured stocks, two rows each: company and price, then exchange
//! symbol and one-year change coloured by direction.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Widget, Wrap};

use crate::api::StockSnapshot;
use crate::core::market::{Panel, StockBoard, Trend, format_percent, format_price};
use crate::tui::components::fund_card::{loading_line, unavailable_lines};

const ROWS_PER_STOCK: u16 = 2;

pub struct StockCard<'a> {
    pub board: &'a StockBoard,
}

impl<'a> StockCard<'a> {
    /// Borders plus two rows per configured symbol.
    pub fn height(board: &StockBoard) -> u16 {
        2 + ROWS_PER_STOCK * (board.symbols.len().max(1) as u16)
    }
}

fn quote_lines(stock: &StockSnapshot) -> [Line<'static>; 2] {
    let change_color = match Trend::of(stock.one_year_change) {
        Trend::Up => Color::Green,
        Trend::Down => Color::Red,
    };
    [
        Line::from(vec![
            Span::styled(
                stock.company_name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::raw(format_price(stock.current_price)),
        ]),
        Line::from(vec![
            Span::styled(
                format!("NSE: {}", stock.symbol),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  "),
            Span::styled(
                format_percent(stock.one_year_change),
                Style::default().fg(change_color),
            ),
        ]),
    ]
}

fn board_lines(board: &StockBoard) -> Vec<Line<'static>> {
    match &board.panel {
        Panel::Loading => vec![loading_line()],
        Panel::Unavailable(reason) => unavailable_lines(reason),
        Panel::Ready(entries) => board
            .symbols
            .iter()
            .zip(entries)
            .flat_map(|(symbol, entry)| match entry {
                Panel::Ready(stock) => quote_lines(stock).to_vec(),
                Panel::Loading => vec![Line::from(symbol.clone()), loading_line()],
                Panel::Unavailable(reason) => vec![
                    Line::from(Span::styled(
                        symbol.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!("Unavailable: {reason}"),
                        Style::default().fg(Color::Red),
                    )),
                ],
            })
            .collect(),
    }
}

impl<'a> Widget for StockCard<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::LightRed))
            .title(Span::styled("Stocks", Style::default().add_modifier(Modifier::BOLD)));

        Paragraph::new(board_lines(self.board))
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::test_support::stock_snapshot;

    fn board(panel: Panel<Vec<Panel<StockSnapshot>>>) -> StockBoard {
        StockBoard {
            symbols: vec!["HDFCBANK.NS".to_string(), "RELIANCE.NS".to_string()],
            panel,
        }
    }

    fn draw(board: &StockBoard) -> String {
        let area = Rect::new(0, 0, 44, StockCard::height(board));
        let mut buf = Buffer::empty(area);
        StockCard { board }.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn height_scales_with_symbols() {
        assert_eq!(StockCard::height(&board(Panel::Loading)), 6);
        let empty = StockBoard {
            symbols: vec![],
            panel: Panel::Loading,
        };
        assert_eq!(StockCard::height(&empty), 4);
    }

    #[test]
    fn quotes_render_with_direction() {
        let mut down = stock_snapshot("RELIANCE.NS");
        down.one_year_change = -3.5;
        let b = board(Panel::Ready(vec![
            Panel::Ready(stock_snapshot("HDFCBANK.NS")),
            Panel::Ready(down.clone()),
        ]));
        let text = draw(&b);
        assert!(text.contains("NSE: HDFCBANK.NS"));
        assert!(text.contains("4.20%"));
        assert!(text.contains("-3.50%"));
        assert_eq!(quote_lines(&down)[1].spans[2].style.fg, Some(Color::Red));
    }

    #[test]
    fn one_failed_symbol_does_not_hide_others() {
        let b = board(Panel::from_result(Ok(vec![
            Panel::Ready(stock_snapshot("HDFCBANK.NS")),
            Panel::from_result(Err(ApiError::Server {
                status: 200,
                message: "Something went wrong.".to_string(),
            })),
        ])));
        let text = draw(&b);
        assert!(text.contains("HDFCBANK.NS"));
        assert!(text.contains("RELIANCE.NS"));
        assert!(text.contains("Unavailable"));
    }

    #[test]
    fn whole_board_unavailable() {
        let text = draw(&board(Panel::Unavailable("timed out".to_string())));
        assert!(text.contains("Unavailable"));
        assert!(!text.contains("NSE:"));
    }
}
