//! # Message Composer
//!
//! Owns the draft and the send lifecycle:
//!
//! ```text
//!            begin_send              complete(id)
//!   Idle ─────────────────▶ Sending ─────────────▶ Idle
//!    ▲                        │
//!    │ dismiss / restore      │ fail(id, err)
//!    └──────── Error ◀────────┘
//!                │ begin_send (new text) / begin_resend (retry)
//!                └──────────▶ Sending
//! ```
//!
//! A submit while `Sending` is rejected. Each send gets a fresh request id and
//! a cancellation token derived from the composer's lifetime token, so replies
//! for anything but the outstanding request are ignored and dropping the
//! composer cancels whatever is still in flight.

use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, FailureKind};

/// Why the last send did not go through. Keeps the text so it can be re-sent.
#[derive(Debug, Clone, PartialEq)]
pub struct SendFailure {
    pub kind: FailureKind,
    pub detail: String,
    pub draft: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComposerState {
    Idle,
    Sending { request_id: u64 },
    Error(SendFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// A reply is still outstanding.
    Busy,
    /// Nothing to send.
    Empty,
}

impl fmt::Display for SubmitRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitRejected::Busy => write!(f, "still waiting for the previous reply"),
            SubmitRejected::Empty => write!(f, "nothing to send"),
        }
    }
}

impl std::error::Error for SubmitRejected {}

/// A send that has been accepted and must now be dispatched.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub request_id: u64,
    pub cancel: CancellationToken,
}

pub struct Composer {
    draft: String,
    state: ComposerState,
    next_request_id: u64,
    lifetime: CancellationToken,
    in_flight: Option<CancellationToken>,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    pub fn new() -> Self {
        Self {
            draft: String::new(),
            state: ComposerState::Idle,
            next_request_id: 1,
            lifetime: CancellationToken::new(),
            in_flight: None,
        }
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: String) {
        self.draft = text;
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.state, ComposerState::Sending { .. })
    }

    pub fn failure(&self) -> Option<&SendFailure> {
        match &self.state {
            ComposerState::Error(failure) => Some(failure),
            _ => None,
        }
    }

    /// Accepts the draft `text` for sending. Clears the draft eagerly.
    pub fn begin_send(&mut self, text: &str) -> Result<Outbound, SubmitRejected> {
        let outbound = self.start(text)?;
        self.draft.clear();
        Ok(outbound)
    }

    /// Accepts a resend of previously failed text. The draft belongs to
    /// whatever the user typed since and is left alone.
    pub fn begin_resend(&mut self, text: &str) -> Result<Outbound, SubmitRejected> {
        self.start(text)
    }

    fn start(&mut self, text: &str) -> Result<Outbound, SubmitRejected> {
        if self.is_sending() {
            return Err(SubmitRejected::Busy);
        }
        if text.trim().is_empty() {
            return Err(SubmitRejected::Empty);
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let cancel = self.lifetime.child_token();
        self.in_flight = Some(cancel.clone());
        self.state = ComposerState::Sending { request_id };

        Ok(Outbound { request_id, cancel })
    }

    fn is_outstanding(&self, request_id: u64) -> bool {
        matches!(self.state, ComposerState::Sending { request_id: id } if id == request_id)
    }

    /// Sending → Idle. Returns false (and changes nothing) for a stale id.
    pub fn complete(&mut self, request_id: u64) -> bool {
        if !self.is_outstanding(request_id) {
            return false;
        }
        self.in_flight = None;
        self.state = ComposerState::Idle;
        true
    }

    /// Sending → Error, keeping `draft` for a retry. Returns false for a stale id.
    pub fn fail(&mut self, request_id: u64, error: &ApiError, draft: String) -> bool {
        if !self.is_outstanding(request_id) {
            return false;
        }
        self.in_flight = None;
        self.state = ComposerState::Error(SendFailure {
            kind: error.kind(),
            detail: error.to_string(),
            draft,
        });
        true
    }

    /// Error → Idle without touching the draft.
    pub fn dismiss_error(&mut self) -> bool {
        if self.failure().is_none() {
            return false;
        }
        self.state = ComposerState::Idle;
        true
    }

    /// Error → Idle, moving the failed text back into the draft. Anything
    /// typed since the failure is kept after it. Returns the new draft.
    pub fn restore_draft(&mut self) -> Option<String> {
        if self.failure().is_none() {
            return None;
        }
        let ComposerState::Error(failure) = std::mem::replace(&mut self.state, ComposerState::Idle)
        else {
            return None;
        };
        self.draft = if self.draft.trim().is_empty() {
            failure.draft
        } else {
            format!("{}\n{}", failure.draft, self.draft)
        };
        Some(self.draft.clone())
    }

    /// Cancels the outstanding request, if any. The dispatcher reports it
    /// back as `ApiError::Cancelled`.
    pub fn cancel_outstanding(&mut self) -> bool {
        match self.in_flight.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels everything this composer ever dispatched.
    pub fn shutdown(&self) {
        self.lifetime.cancel();
    }
}

impl Drop for Composer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
