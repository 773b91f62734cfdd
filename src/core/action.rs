//! # Actions
//!
//! Everything that can happen in wealthchat becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Agent answers? That's `Action::AgentReplied { request_id, transcript }`.
//!
//! The `update()` function takes the current state and an action, mutates the
//! state, and returns an `Effect` describing any I/O the caller must start.
//! No side effects here. I/O happens elsewhere.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! This makes everything testable without a terminal or a network.

use log::{debug, info, warn};

use crate::api::{ApiError, FundSnapshot, Message, StockSnapshot};
use crate::core::composer::SubmitRejected;
use crate::core::conversation::Entry;
use crate::core::dispatch::ChatRequest;
use crate::core::state::App;

#[derive(Debug)]
pub enum Action {
    /// The editor contents changed.
    EditDraft(String),
    Submit(String),
    /// Re-send the text of the last failed send.
    Retry,
    /// Move the text of the last failed send back into the editor.
    RestoreDraft,
    CancelSend,
    DismissError,
    AgentReplied {
        request_id: u64,
        transcript: Vec<Message>,
    },
    AgentFailed {
        request_id: u64,
        error: ApiError,
    },
    RefreshMarket,
    MarketLoaded {
        funds: Result<Vec<Result<FundSnapshot, ApiError>>, ApiError>,
        stocks: Result<Vec<Result<StockSnapshot, ApiError>>, ApiError>,
    },
    Quit,
}

/// I/O the event loop must perform after an `update()`.
#[derive(Debug)]
pub enum Effect {
    None,
    SpawnRequest(ChatRequest),
    /// Put this text back into the editor.
    RestoreDraft(String),
    LoadMarketData {
        funds: Vec<String>,
        symbols: Vec<String>,
    },
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::EditDraft(text) => {
            app.composer.set_draft(text);
            Effect::None
        }
        Action::Submit(text) => submit(app, text, false),
        Action::Retry => {
            let Some(failure) = app.composer.failure() else {
                debug!("Retry ignored: nothing failed");
                return Effect::None;
            };
            let text = failure.draft.clone();
            app.conversation.take_failed();
            info!("Retrying failed send ({} bytes)", text.len());
            submit(app, text, true)
        }
        Action::RestoreDraft => match app.composer.restore_draft() {
            Some(text) => {
                app.conversation.take_failed();
                app.status_message = String::from("Draft restored");
                Effect::RestoreDraft(text)
            }
            None => Effect::None,
        },
        Action::CancelSend => {
            if app.composer.cancel_outstanding() {
                info!("Cancelling outstanding request");
                app.status_message = String::from("Cancelling...");
            }
            Effect::None
        }
        Action::DismissError => {
            if app.composer.dismiss_error() {
                app.status_message = String::from("Ready");
            }
            Effect::None
        }
        Action::AgentReplied {
            request_id,
            transcript,
        } => {
            if !app.composer.complete(request_id) {
                warn!("Dropping stale reply for request {}", request_id);
                return Effect::None;
            }
            info!(
                "Request {} complete, transcript now {} messages",
                request_id,
                transcript.len()
            );
            app.conversation.replace_all(transcript);
            app.conversation.set_busy(false);
            app.status_message = String::from("Ready");
            Effect::None
        }
        Action::AgentFailed { request_id, error } => {
            let draft = last_pending_text(app).unwrap_or_default();
            if !app.composer.fail(request_id, &error, draft) {
                warn!("Dropping stale failure for request {}: {}", request_id, error);
                return Effect::None;
            }
            let kind = error.kind();
            info!("Request {} failed ({}): {}", request_id, kind.label(), error);
            app.conversation.mark_pending_failed();
            app.conversation.set_busy(false);
            app.status_message = format!(
                "Send failed: {}. Ctrl+R retries, Ctrl+E edits",
                kind.label()
            );
            Effect::None
        }
        Action::RefreshMarket => {
            if app.market.is_empty() {
                return Effect::None;
            }
            app.market.mark_loading();
            Effect::LoadMarketData {
                funds: app.market.fund_names(),
                symbols: app.market.stock_symbols(),
            }
        }
        Action::MarketLoaded { funds, stocks } => {
            app.market.apply_funds(funds);
            app.market.apply_stocks(stocks);
            Effect::None
        }
        Action::Quit => {
            app.composer.shutdown();
            Effect::Quit
        }
    }
}

/// `resend` sends failed text again without consuming the current draft.
fn submit(app: &mut App, text: String, resend: bool) -> Effect {
    let accepted = if resend {
        app.composer.begin_resend(&text)
    } else {
        app.composer.begin_send(&text)
    };
    let outbound = match accepted {
        Ok(outbound) => outbound,
        Err(SubmitRejected::Busy) => {
            debug!("Submit rejected: request still outstanding");
            app.status_message = String::from("Still waiting for the previous reply");
            return Effect::None;
        }
        Err(SubmitRejected::Empty) => return Effect::None,
    };

    let message = Message::user(text);
    let mut transcript = app.conversation.confirmed_transcript();
    transcript.push(message.clone());

    info!(
        "Submit accepted as request {} ({} messages)",
        outbound.request_id,
        transcript.len()
    );
    app.conversation.append_local(message);
    app.conversation.set_busy(true);
    app.status_message = String::from("Sending...");

    Effect::SpawnRequest(ChatRequest {
        request_id: outbound.request_id,
        transcript,
        cancel: outbound.cancel,
    })
}

fn last_pending_text(app: &App) -> Option<String> {
    app.conversation
        .entries()
        .iter()
        .rev()
        .find_map(|entry| match entry {
            Entry::PendingLocal(m) => Some(m.text.clone()),
            _ => None,
        })
}
