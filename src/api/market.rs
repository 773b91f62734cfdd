//! Read-only market data: mutual fund and stock snapshots.
//!
//! Batch endpoints answer per item, so a batch call yields one `Result` per
//! requested name. A failure of the whole call is the outer `Err`.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::types::{Envelope, FundData, FundSnapshot, StockEntry, StockSnapshot};
use super::{ApiError, endpoint};

#[async_trait]
pub trait FundDataClient: Send + Sync {
    async fn get_fund(&self, name: &str) -> Result<FundSnapshot, ApiError>;

    async fn get_funds(
        &self,
        names: &[String],
    ) -> Result<Vec<Result<FundSnapshot, ApiError>>, ApiError>;
}

#[async_trait]
pub trait StockDataClient: Send + Sync {
    async fn get_stock(&self, symbol: &str) -> Result<StockSnapshot, ApiError>;

    async fn get_stocks(
        &self,
        symbols: &[String],
    ) -> Result<Vec<Result<StockSnapshot, ApiError>>, ApiError>;
}

/// Both market clients behind one object, for callers that need the pair.
pub trait MarketDataClient: FundDataClient + StockDataClient {}

impl<T: FundDataClient + StockDataClient> MarketDataClient for T {}

/// HTTP implementation for `/api/mutual-funds/` and `/api/stocks/`.
pub struct HttpMarketClient {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpMarketClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            // Validate once up front; per-call URLs are derived from this.
            base_url: endpoint(base_url, &[])?,
            client: reqwest::Client::new(),
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GETs `url` and decodes the JSON body, mapping transport and status failures.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<(u16, T), ApiError> {
        debug!("Market GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Market API error: {} - {}", status, body);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await.map_err(ApiError::from_transport)?;
        let decoded = serde_json::from_str(&body)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        Ok((status.as_u16(), decoded))
    }
}

fn stock_entry(entry: StockEntry, http_status: u16) -> Result<StockSnapshot, ApiError> {
    match entry {
        StockEntry::Quote(snapshot) => Ok(snapshot),
        StockEntry::Failed { message } => Err(ApiError::Server {
            status: http_status,
            message,
        }),
    }
}

#[async_trait]
impl FundDataClient for HttpMarketClient {
    async fn get_fund(&self, name: &str) -> Result<FundSnapshot, ApiError> {
        let url = self.url(&["api", "mutual-funds", name]);
        let (status, envelope): (u16, Envelope<FundData>) = self.get_json(url).await?;
        let snapshot = FundSnapshot::from_wire(name, envelope.into_result(status)?);
        info!("Loaded fund '{}' (nav={})", name, snapshot.nav);
        Ok(snapshot)
    }

    async fn get_funds(
        &self,
        names: &[String],
    ) -> Result<Vec<Result<FundSnapshot, ApiError>>, ApiError> {
        let mut url = self.url(&["api", "mutual-funds", ""]);
        url.query_pairs_mut()
            .append_pair("mutual_funds", &names.join(","));

        let (status, envelopes): (u16, Vec<Envelope<FundData>>) = self.get_json(url).await?;
        if envelopes.len() != names.len() {
            return Err(ApiError::MalformedResponse(format!(
                "asked for {} funds, got {}",
                names.len(),
                envelopes.len()
            )));
        }

        Ok(names
            .iter()
            .zip(envelopes)
            .map(|(name, env)| {
                env.into_result(status)
                    .map(|data| FundSnapshot::from_wire(name, data))
            })
            .collect())
    }
}

#[async_trait]
impl StockDataClient for HttpMarketClient {
    async fn get_stock(&self, symbol: &str) -> Result<StockSnapshot, ApiError> {
        let url = self.url(&["api", "stocks", symbol]);
        let (status, envelope): (u16, Envelope<StockEntry>) = self.get_json(url).await?;
        stock_entry(envelope.into_result(status)?, status)
    }

    async fn get_stocks(
        &self,
        symbols: &[String],
    ) -> Result<Vec<Result<StockSnapshot, ApiError>>, ApiError> {
        let mut url = self.url(&["api", "stocks", ""]);
        url.query_pairs_mut().append_pair("stocks", &symbols.join(","));

        let (status, envelope): (u16, Envelope<Vec<StockEntry>>) = self.get_json(url).await?;
        let entries = envelope.into_result(status)?;
        if entries.len() != symbols.len() {
            return Err(ApiError::MalformedResponse(format!(
                "asked for {} stocks, got {}",
                symbols.len(),
                entries.len()
            )));
        }
        info!("Loaded {} stock entries for {} symbols", entries.len(), symbols.len());
        Ok(entries
            .into_iter()
            .map(|entry| stock_entry(entry, status))
            .collect())
    }
}
