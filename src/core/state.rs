//! # Application State
//!
//! Core business state for wealthchat. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── agent: Arc<dyn AgentClient>             // conversational backend
//! ├── market_client: Arc<dyn MarketDataClient> // fund + stock lookups
//! ├── conversation: ConversationStore         // transcript + busy flag
//! ├── composer: Composer                      // draft + send FSM
//! ├── market: MarketState                     // sidebar panels
//! ├── status_message: String                  // status bar text
//! ├── backend_url: String                     // shown in the title bar
//! └── request_timeout: Duration               // per-request bound
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use std::sync::Arc;
use std::time::Duration;

use crate::api::{AgentClient, ApiError, HttpAgentClient, HttpMarketClient, MarketDataClient};
use crate::core::composer::Composer;
use crate::core::config::ResolvedConfig;
use crate::core::conversation::ConversationStore;
use crate::core::market::MarketState;

pub struct App {
    pub agent: Arc<dyn AgentClient>,
    pub market_client: Arc<dyn MarketDataClient>,
    pub conversation: ConversationStore,
    pub composer: Composer,
    pub market: MarketState,
    pub status_message: String,
    pub backend_url: String,
    pub request_timeout: Duration,
}

impl App {
    pub fn new(
        agent: Arc<dyn AgentClient>,
        market_client: Arc<dyn MarketDataClient>,
        config: &ResolvedConfig,
    ) -> Self {
        Self {
            agent,
            market_client,
            conversation: ConversationStore::new(),
            composer: Composer::new(),
            market: MarketState::new(&config.funds, &config.stocks),
            status_message: String::from("Welcome to wealthchat!"),
            backend_url: config.base_url.clone(),
            request_timeout: config.request_timeout,
        }
    }

    /// Builds the HTTP clients for `config.base_url` and wires them in.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, ApiError> {
        let agent = Arc::new(HttpAgentClient::new(&config.base_url)?);
        let market = Arc::new(HttpMarketClient::new(&config.base_url)?);
        Ok(Self::new(agent, market, config))
    }
}
