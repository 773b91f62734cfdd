use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

use wealthchat::core::config::{self, CliOverrides};
use wealthchat::tui;

#[derive(Parser)]
#[command(name = "wealthchat", about = "Terminal chat with a wealth-advice agent")]
struct Args {
    /// Backend base URL (overrides config and WEALTHCHAT_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Seconds to wait for an agent reply
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Mutual fund to show in the sidebar (repeatable)
    #[arg(long = "fund")]
    funds: Vec<String>,

    /// Stock symbol to show in the sidebar (repeatable)
    #[arg(long = "stock")]
    stocks: Vec<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to wealthchat.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("wealthchat.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("{}; falling back to defaults", e);
        config::WealthConfig::default()
    });
    let cli = CliOverrides {
        base_url: args.base_url,
        timeout_secs: args.timeout_secs,
        funds: args.funds,
        stocks: args.stocks,
    };
    let resolved = config::resolve(&file_config, &cli);

    log::info!(
        "wealthchat starting up against {} (timeout {}s)",
        resolved.base_url,
        resolved.request_timeout.as_secs()
    );

    tui::run(resolved)
}
