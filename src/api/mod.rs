//! # Backend API
//!
//! Typed clients for the advisor backend: the conversational agent and the
//! two read-only market data routes. Everything here is request/response;
//! the core decides when to call and what to do with the result.

pub mod agent;
pub mod error;
pub mod market;
pub mod types;

pub use agent::{AgentClient, HttpAgentClient};
pub use error::{ApiError, FailureKind};
pub use market::{FundDataClient, HttpMarketClient, MarketDataClient, StockDataClient};
pub use types::{ChatPayload, FundSnapshot, Message, Sender, StockSnapshot};

use reqwest::Url;

/// Joins `segments` onto `base_url`, percent-encoding each segment.
/// A trailing `""` segment yields a trailing slash.
pub(crate) fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ApiError::Config(format!("invalid base URL '{base_url}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::Config(format!("base URL '{base_url}' cannot hold a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
