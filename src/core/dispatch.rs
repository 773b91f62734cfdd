//! # Dispatch
//!
//! The async half of a round trip. Everything here runs on a tokio task and
//! ends by producing exactly one `Action` for the event loop to feed back into
//! `update()`. The reducer never awaits.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{join, join_all};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::api::{AgentClient, ApiError, MarketDataClient, Message};
use crate::core::action::Action;

/// Everything needed to run one agent round trip.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub request_id: u64,
    /// Confirmed transcript followed by the new user message.
    pub transcript: Vec<Message>,
    pub cancel: CancellationToken,
}

/// Runs one agent call, bounded by `timeout` and the request's cancel token.
pub async fn run_chat(
    agent: Arc<dyn AgentClient>,
    request: ChatRequest,
    timeout: Duration,
) -> Action {
    let ChatRequest {
        request_id,
        transcript,
        cancel,
    } = request;

    info!(
        "Dispatching request {} via {} ({} messages)",
        request_id,
        agent.name(),
        transcript.len()
    );

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApiError::Cancelled),
        result = tokio::time::timeout(timeout, agent.chat(&transcript)) => {
            result.unwrap_or(Err(ApiError::Timeout(timeout)))
        }
    };

    match outcome {
        Ok(transcript) => {
            debug!(
                "Request {} answered with {} messages",
                request_id,
                transcript.len()
            );
            Action::AgentReplied {
                request_id,
                transcript,
            }
        }
        Err(error) => {
            warn!("Request {} failed: {}", request_id, error);
            Action::AgentFailed { request_id, error }
        }
    }
}

/// Fetches every configured fund and stock concurrently.
///
/// Funds are fetched one request per name so a single bad name only blanks
/// its own card. Stocks go through the batch route.
pub async fn load_market(
    market: Arc<dyn MarketDataClient>,
    fund_names: Vec<String>,
    stock_symbols: Vec<String>,
    timeout: Duration,
) -> Action {
    let funds = async {
        let per_fund = fund_names.iter().map(|name| async {
            tokio::time::timeout(timeout, market.get_fund(name))
                .await
                .unwrap_or(Err(ApiError::Timeout(timeout)))
        });
        Ok::<_, ApiError>(join_all(per_fund).await)
    };
    let stocks = async {
        if stock_symbols.is_empty() {
            Ok(Vec::new())
        } else {
            tokio::time::timeout(timeout, market.get_stocks(&stock_symbols))
                .await
                .unwrap_or(Err(ApiError::Timeout(timeout)))
        }
    };

    let (funds, stocks) = join(funds, stocks).await;
    info!(
        "Market data loaded: funds_ok={}, stocks_ok={}",
        funds.is_ok(),
        stocks.is_ok()
    );
    Action::MarketLoaded { funds, stocks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{EchoAgent, FailingAgent, HangingAgent, StaticMarket};

    fn request(transcript: Vec<Message>) -> ChatRequest {
        ChatRequest {
            request_id: 7,
            transcript,
            cancel: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn success_becomes_agent_replied() {
        let agent = Arc::new(EchoAgent::default());
        let action = run_chat(
            agent.clone(),
            request(vec![Message::user("Hello")]),
            Duration::from_secs(5),
        )
        .await;

        match action {
            Action::AgentReplied {
                request_id,
                transcript,
            } => {
                assert_eq!(request_id, 7);
                assert_eq!(transcript[0], Message::user("Hello"));
                assert_eq!(transcript.len(), 2);
            }
            other => panic!("expected AgentReplied, got {other:?}"),
        }
        assert_eq!(agent.requests(), vec![vec![Message::user("Hello")]]);
    }

    #[tokio::test]
    async fn failure_becomes_agent_failed() {
        let agent = Arc::new(FailingAgent(ApiError::Server {
            status: 500,
            message: "Internal Server Error".to_string(),
        }));
        let action = run_chat(agent, request(vec![]), Duration::from_secs(5)).await;
        assert!(matches!(
            action,
            Action::AgentFailed {
                request_id: 7,
                error: ApiError::Server { status: 500, .. }
            }
        ));
    }

    #[tokio::test]
    async fn hung_request_times_out() {
        let action = run_chat(
            Arc::new(HangingAgent),
            request(vec![Message::user("Hello")]),
            Duration::from_millis(20),
        )
        .await;
        assert!(matches!(
            action,
            Action::AgentFailed {
                error: ApiError::Timeout(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn cancelled_token_wins() {
        let req = request(vec![Message::user("Hello")]);
        req.cancel.cancel();
        let action = run_chat(Arc::new(HangingAgent), req, Duration::from_secs(60)).await;
        assert!(matches!(
            action,
            Action::AgentFailed {
                error: ApiError::Cancelled,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn request_stays_pending_until_cancelled() {
        let req = request(vec![Message::user("Hello")]);
        let cancel = req.cancel.clone();
        let mut task = tokio_test::task::spawn(run_chat(
            Arc::new(HangingAgent),
            req,
            Duration::from_secs(60),
        ));

        tokio_test::assert_pending!(task.poll());
        cancel.cancel();
        assert!(task.is_woken());
        let action = tokio_test::assert_ready!(task.poll());
        assert!(matches!(
            action,
            Action::AgentFailed {
                error: ApiError::Cancelled,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn market_load_skips_empty_lists() {
        let market = Arc::new(StaticMarket::default());
        let action = load_market(market.clone(), vec![], vec![], Duration::from_secs(5)).await;
        match action {
            Action::MarketLoaded { funds, stocks } => {
                assert_eq!(funds.unwrap().len(), 0);
                assert_eq!(stocks.unwrap().len(), 0);
            }
            other => panic!("expected MarketLoaded, got {other:?}"),
        }
        assert_eq!(market.calls(), 0);
    }

    #[tokio::test]
    async fn market_load_fetches_both() {
        let market = Arc::new(StaticMarket::default());
        let action = load_market(
            market.clone(),
            vec!["Baroda BNP Paribas Large Cap Fund".to_string()],
            vec!["HDFCBANK.NS".to_string()],
            Duration::from_secs(5),
        )
        .await;
        match action {
            Action::MarketLoaded { funds, stocks } => {
                let funds = funds.unwrap();
                assert_eq!(funds[0].as_ref().unwrap().nav, 10.6);
                assert_eq!(stocks.unwrap().len(), 1);
            }
            other => panic!("expected MarketLoaded, got {other:?}"),
        }
        assert_eq!(market.calls(), 2);
    }
}
