//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{
    AgentClient, ApiError, FundDataClient, FundSnapshot, Message, StockDataClient, StockSnapshot,
};
use crate::core::config::ResolvedConfig;
use crate::core::state::App;

/// Echoes the transcript back with one bot reply appended. Records every
/// transcript it was sent.
#[derive(Default)]
pub struct EchoAgent {
    requests: Mutex<Vec<Vec<Message>>>,
}

impl EchoAgent {
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentClient for EchoAgent {
    fn name(&self) -> &str {
        "echo"
    }

    async fn chat(&self, transcript: &[Message]) -> Result<Vec<Message>, ApiError> {
        self.requests.lock().unwrap().push(transcript.to_vec());
        let mut reply = transcript.to_vec();
        reply.push(Message::bot("Hi! How can I help with your investments?"));
        Ok(reply)
    }
}

/// Always fails with the given error.
pub struct FailingAgent(pub ApiError);

#[async_trait]
impl AgentClient for FailingAgent {
    fn name(&self) -> &str {
        "failing"
    }

    async fn chat(&self, _transcript: &[Message]) -> Result<Vec<Message>, ApiError> {
        Err(self.0.clone())
    }
}

/// Never answers.
pub struct HangingAgent;

#[async_trait]
impl AgentClient for HangingAgent {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn chat(&self, _transcript: &[Message]) -> Result<Vec<Message>, ApiError> {
        std::future::pending().await
    }
}

/// Canned market data. Counts every call.
#[derive(Default)]
pub struct StaticMarket {
    calls: AtomicUsize,
}

impl StaticMarket {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn fund_snapshot(name: &str) -> FundSnapshot {
    FundSnapshot {
        name: name.to_string(),
        nav: 10.6,
        aum: 17635.4,
        min_investment: 500.0,
        cagr: 13.456,
        return_1y: Some(18.2),
        return_3y: Some(-1.25),
        return_5y: None,
    }
}

pub fn stock_snapshot(symbol: &str) -> StockSnapshot {
    StockSnapshot {
        company_name: format!("{symbol} Ltd"),
        symbol: symbol.to_string(),
        current_price: 1642.35,
        one_year_change: 4.2,
    }
}

#[async_trait]
impl FundDataClient for StaticMarket {
    async fn get_fund(&self, name: &str) -> Result<FundSnapshot, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(fund_snapshot(name))
    }

    async fn get_funds(
        &self,
        names: &[String],
    ) -> Result<Vec<Result<FundSnapshot, ApiError>>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(names.iter().map(|n| Ok(fund_snapshot(n))).collect())
    }
}

#[async_trait]
impl StockDataClient for StaticMarket {
    async fn get_stock(&self, symbol: &str) -> Result<StockSnapshot, ApiError> {
        Ok(stock_snapshot(symbol))
    }

    async fn get_stocks(
        &self,
        symbols: &[String],
    ) -> Result<Vec<Result<StockSnapshot, ApiError>>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(symbols.iter().map(|s| Ok(stock_snapshot(s))).collect())
    }
}

pub fn test_config() -> ResolvedConfig {
    ResolvedConfig {
        base_url: "http://localhost:8000".to_string(),
        request_timeout: Duration::from_secs(5),
        funds: vec!["Baroda BNP Paribas Large Cap Fund".to_string()],
        stocks: vec!["HDFCBANK.NS".to_string(), "RELIANCE.NS".to_string()],
    }
}

/// Creates a test App backed by an `EchoAgent` and a `StaticMarket`.
pub fn test_app() -> App {
    App::new(
        Arc::new(EchoAgent::default()),
        Arc::new(StaticMarket::default()),
        &test_config(),
    )
}
