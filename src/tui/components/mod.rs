//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Simple display components that receive all data as fields:
//! - `TitleBar`: Top status bar showing backend and status
//! - `Message`: One transcript entry
//! - `FundCard` / `StockCard`: Market sidebar cards
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that manage local state and emit events:
//! - `InputBox`: Text input showing the composer status
//! - `MessageList`: Scrollable transcript with layout caching
//!
//! Components receive external data as props, never by reaching into `App`,
//! which keeps every one of them testable against a `TestBackend`.
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top status bar)
//! ├── message.rs       (Single entry renderer)
//! ├── message_list.rs  (Scrollable transcript)
//! ├── input_box.rs     (Text input)
//! ├── fund_card.rs     (Mutual fund card)
//! └── stock_card.rs    (Stock card)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod fund_card;
pub mod input_box;
pub mod message;
pub mod message_list;
pub mod stock_card;

pub use fund_card::{FUND_CARD_HEIGHT, FundCard};
pub use input_box::{InputBox, InputEvent, InputStatus};
pub use message_list::{MessageList, MessageListState};
pub use stock_card::StockCard;
