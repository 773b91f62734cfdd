//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (a send is outstanding): draws every ~80ms so the
//!   waiting spinner moves.
//! - **Idle**: sleeps up to 500ms, only redraws on events, on background
//!   results or on terminal resize.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::dispatch;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
        }
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol is pushed unconditionally; terminals without
        // it ignore the sequence.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!(
            "Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)"
        );
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let mut app = App::from_config(&config).map_err(std::io::Error::other)?;
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Results from background tasks
    let (tx, rx) = mpsc::channel();

    let effect = update(&mut app, Action::RefreshMarket);
    apply_effect(effect, &app, &mut tui, &tx);

    let start_time = Instant::now();
    let mut needs_redraw = true;

    loop {
        let animating = app.conversation.is_busy();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Drain every pending event before the next draw
        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let effect = handle_event(&mut app, &mut tui, event);
            if apply_effect(effect, &app, &mut tui, &tx) {
                should_quit = true;
                break;
            }
        }
        if should_quit {
            break;
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            if apply_effect(effect, &app, &mut tui, &tx) {
                should_quit = true;
            }
        }
        if should_quit {
            break;
        }
    }

    app.composer.shutdown();
    ratatui::restore();
    info!("wealthchat shut down");
    Ok(())
}

/// Routes one terminal event to the component or core action it belongs to.
fn handle_event(app: &mut App, tui: &mut TuiState, event: TuiEvent) -> Effect {
    match event {
        TuiEvent::Resize => Effect::None,
        TuiEvent::ForceQuit => update(app, Action::Quit),
        TuiEvent::Escape if app.composer.is_sending() => update(app, Action::CancelSend),
        TuiEvent::Escape => update(app, Action::DismissError),
        TuiEvent::Retry => update(app, Action::Retry),
        TuiEvent::RestoreDraft => update(app, Action::RestoreDraft),
        TuiEvent::ReloadMarket => update(app, Action::RefreshMarket),
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown
        | TuiEvent::ScrollToBottom => {
            tui.message_list.handle_event(&event);
            Effect::None
        }
        _ => match tui.input_box.handle_event(&event) {
            Some(InputEvent::ContentChanged) => {
                update(app, Action::EditDraft(tui.input_box.text().to_string()))
            }
            Some(InputEvent::Submit(text)) => {
                let effect = update(app, Action::Submit(text));
                // The editor only empties once the send is accepted
                if matches!(effect, Effect::SpawnRequest(_)) {
                    tui.input_box.clear();
                    tui.message_list.stick_to_bottom = true;
                }
                effect
            }
            None => Effect::None,
        },
    }
}

/// Carries out an effect. Returns true when the loop should exit.
fn apply_effect(effect: Effect, app: &App, tui: &mut TuiState, tx: &mpsc::Sender<Action>) -> bool {
    match effect {
        Effect::None => false,
        Effect::Quit => true,
        Effect::RestoreDraft(text) => {
            tui.input_box.set_text(text);
            false
        }
        Effect::SpawnRequest(request) => {
            info!("Spawning agent request {}", request.request_id);
            let agent = app.agent.clone();
            let timeout = app.request_timeout;
            let tx = tx.clone();
            tokio::spawn(async move {
                let action = dispatch::run_chat(agent, request, timeout).await;
                if tx.send(action).is_err() {
                    warn!("Failed to deliver agent result: receiver dropped");
                }
            });
            false
        }
        Effect::LoadMarketData { funds, symbols } => {
            info!(
                "Loading market data ({} funds, {} stocks)",
                funds.len(),
                symbols.len()
            );
            let market = app.market_client.clone();
            let timeout = app.request_timeout;
            let tx = tx.clone();
            tokio::spawn(async move {
                let action = dispatch::load_market(market, funds, symbols, timeout).await;
                if tx.send(action).is_err() {
                    warn!("Failed to deliver market data: receiver dropped");
                }
            });
            false
        }
    }
}
