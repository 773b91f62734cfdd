//! # Core Application Logic
//!
//! This module contains wealthchat's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No UI. Reducer never   │
//!                    │  awaits.                │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │  dispatch  │      │    API     │
//!     │  Adapter   │      │  (tokio    │      │  (reqwest  │
//!     │ (ratatui)  │      │   tasks)   │      │  clients)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`conversation`]: Transcript entries and the busy flag
//! - [`composer`]: Draft text and the Idle/Sending/Error machine
//! - [`normalize`]: Line-break normalization for user-authored text
//! - [`market`]: Fund and stock panel state plus number formatting
//! - [`dispatch`]: The async side of a round trip
//! - [`config`]: File, env and CLI configuration

pub mod action;
pub mod composer;
pub mod config;
pub mod conversation;
pub mod dispatch;
pub mod market;
pub mod normalize;
pub mod state;
