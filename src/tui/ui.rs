use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{
    FUND_CARD_HEIGHT, FundCard, InputStatus, MessageList, StockCard, TitleBar,
};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};

/// Below this terminal width the market sidebar is hidden.
pub const SIDEBAR_MIN_WIDTH: u16 = 90;
const SIDEBAR_WIDTH: u16 = 44;
const BANNER_HEIGHT: u16 = 3;

/// Screen regions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub title: Rect,
    pub chat: Rect,
    pub sidebar: Option<Rect>,
    pub banner: Option<Rect>,
    pub input: Rect,
}

pub fn compute_layout(
    area: Rect,
    input_height: u16,
    show_banner: bool,
    has_market: bool,
) -> AppLayout {
    use Constraint::{Length, Min};
    let banner_height = if show_banner { BANNER_HEIGHT } else { 0 };
    let [title, main, banner, input] = Layout::vertical([
        Length(1),
        Min(0),
        Length(banner_height),
        Length(input_height),
    ])
    .areas(area);

    let (chat, sidebar) = if has_market && area.width >= SIDEBAR_MIN_WIDTH {
        let [chat, sidebar] = Layout::horizontal([Min(0), Length(SIDEBAR_WIDTH)]).areas(main);
        (chat, Some(sidebar))
    } else {
        (main, None)
    };

    AppLayout {
        title,
        chat,
        sidebar,
        banner: show_banner.then_some(banner),
        input,
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    tui.input_box.status = if app.composer.is_sending() {
        InputStatus::Sending
    } else if app.composer.failure().is_some() {
        InputStatus::Failed
    } else {
        InputStatus::Ready
    };

    let area = frame.area();
    let input_height = tui.input_box.calculate_height(area.width);
    let layout = compute_layout(
        area,
        input_height,
        app.composer.failure().is_some(),
        !app.market.is_empty(),
    );

    MessageList::new(
        &mut tui.message_list,
        app.conversation.entries(),
        app.conversation.is_busy(),
        spinner_frame,
    )
    .render(frame, layout.chat);

    // Title is drawn after the list so it can reflect the fresh scroll state
    TitleBar::new(
        app.backend_url.clone(),
        app.status_message.clone(),
        tui.message_list.has_unseen_content(),
    )
    .render(frame, layout.title);

    if let Some(sidebar) = layout.sidebar {
        draw_sidebar(frame, sidebar, app);
    }
    if let Some(banner) = layout.banner {
        draw_error_banner(frame, banner, app);
    }

    tui.input_box.render(frame, layout.input);
}

fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let mut constraints: Vec<Constraint> = app
        .market
        .funds
        .iter()
        .map(|_| Constraint::Length(FUND_CARD_HEIGHT))
        .collect();
    if let Some(board) = &app.market.stocks {
        constraints.push(Constraint::Length(StockCard::height(board)));
    }
    constraints.push(Constraint::Min(0));

    let areas = Layout::vertical(constraints).split(area);
    for (fund, slot) in app.market.funds.iter().zip(areas.iter()) {
        frame.render_widget(FundCard { fund }, *slot);
    }
    if let Some(board) = &app.market.stocks {
        frame.render_widget(StockCard { board }, areas[app.market.funds.len()]);
    }
}

fn draw_error_banner(frame: &mut Frame, area: Rect, app: &App) {
    let Some(failure) = app.composer.failure() else {
        return;
    };
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Red))
        .title(Span::styled(
            format!("Send failed: {}", failure.kind.label()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    let line = Line::from(vec![
        Span::raw(failure.detail.clone()),
        Span::styled(
            "  Ctrl+R retry · Ctrl+E edit · Esc dismiss",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(line).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, Message};
    use crate::core::action::{Action, Effect, update};
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut tui = TuiState::new();
        terminal.draw(|f| draw_ui(f, app, &mut tui, 0)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn layout_hides_sidebar_on_narrow_terminals() {
        let wide = compute_layout(Rect::new(0, 0, 120, 40), 3, false, true);
        assert_eq!(wide.sidebar.map(|s| s.width), Some(SIDEBAR_WIDTH));
        assert_eq!(wide.chat.width, 120 - SIDEBAR_WIDTH);

        let narrow = compute_layout(Rect::new(0, 0, 80, 40), 3, false, true);
        assert!(narrow.sidebar.is_none());
        assert_eq!(narrow.chat.width, 80);
    }

    #[test]
    fn layout_without_market_has_no_sidebar() {
        let layout = compute_layout(Rect::new(0, 0, 120, 40), 3, false, false);
        assert!(layout.sidebar.is_none());
    }

    #[test]
    fn layout_reserves_banner_only_on_error() {
        let ok = compute_layout(Rect::new(0, 0, 100, 30), 3, false, true);
        assert!(ok.banner.is_none());
        assert_eq!(ok.chat.height, 30 - 1 - 3);

        let failed = compute_layout(Rect::new(0, 0, 100, 30), 3, true, true);
        assert_eq!(failed.banner.map(|b| b.height), Some(BANNER_HEIGHT));
        assert_eq!(failed.input.y, 30 - 3);
    }

    #[test]
    fn draws_welcome_and_loading_sidebar() {
        let app = test_app();
        let text = screen(&app, 120, 30);
        assert!(text.contains("wealthchat (http://localhost:8000)"));
        assert!(text.contains("Loading..."));
        assert!(text.contains("Stocks"));
        assert!(text.contains("Message (Enter send"));
    }

    #[test]
    fn draws_failed_send_banner() {
        let mut app = test_app();
        let Effect::SpawnRequest(request) = update(&mut app, Action::Submit("Hello".into())) else {
            panic!("submit should spawn a request");
        };
        update(
            &mut app,
            Action::AgentFailed {
                request_id: request.request_id,
                error: ApiError::Network("connection refused".to_string()),
            },
        );

        let text = screen(&app, 120, 30);
        assert!(text.contains("Send failed: network failure"));
        assert!(text.contains("not delivered"));
        assert!(text.contains("Hello"));
    }

    #[test]
    fn draws_confirmed_transcript() {
        let mut app = test_app();
        app.conversation.replace_all(vec![
            Message::user("Hello"),
            Message::bot("Hi! How can I help with your investments?"),
        ]);
        let text = screen(&app, 80, 20);
        assert!(text.contains("advisor"));
        assert!(text.contains("How can I help"));
        assert!(!text.contains("Stocks"), "sidebar hidden at 80 columns");
    }
}
