use std::fmt;
use std::time::Duration;

/// Errors that can occur while talking to the advisor backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Client misconfigured (unusable base URL).
    Config(String),
    /// The request never completed (DNS, connection refused, reset).
    Network(String),
    /// The backend answered with a non-success HTTP status.
    Server { status: u16, message: String },
    /// The body could not be decoded or lacks the fields we need.
    MalformedResponse(String),
    /// No answer within the configured request timeout.
    Timeout(Duration),
    /// The request's cancellation token fired before it finished.
    Cancelled,
}

/// Coarse classification surfaced to the user when a send fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Server,
    MalformedResponse,
    Timeout,
    Cancelled,
}

impl FailureKind {
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::Network => "network failure",
            FailureKind::Server => "server error",
            FailureKind::MalformedResponse => "malformed response",
            FailureKind::Timeout => "timed out",
            FailureKind::Cancelled => "cancelled",
        }
    }
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            // A bad base URL means nothing was ever sent.
            ApiError::Config(_) | ApiError::Network(_) => FailureKind::Network,
            ApiError::Server { .. } => FailureKind::Server,
            ApiError::MalformedResponse(_) => FailureKind::MalformedResponse,
            ApiError::Timeout(_) => FailureKind::Timeout,
            ApiError::Cancelled => FailureKind::Cancelled,
        }
    }

    /// Maps a reqwest transport error onto our taxonomy.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::MalformedResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Server { status, message } => {
                write!(f, "server error (HTTP {status}): {message}")
            }
            ApiError::MalformedResponse(msg) => write!(f, "malformed response: {msg}"),
            ApiError::Timeout(after) => write!(f, "no reply after {}s", after.as_secs()),
            ApiError::Cancelled => write!(f, "request cancelled"),
        }
    }
}

impl std::error::Error for ApiError {}
