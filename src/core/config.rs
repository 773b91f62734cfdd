//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.wealthchat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//! Nothing else is ever written: conversations are not persisted.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WealthConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub widgets: WidgetConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WidgetConfig {
    pub funds: Option<Vec<String>>,
    pub stocks: Option<Vec<String>>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_FUNDS: &[&str] = &["Baroda BNP Paribas Large Cap Fund"];
pub const DEFAULT_STOCKS: &[&str] = &["HDFCBANK.NS", "RELIANCE.NS"];

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub funds: Vec<String>,
    pub stocks: Vec<String>,
}

/// Values given on the command line. `None`/empty = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub funds: Vec<String>,
    pub stocks: Vec<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.wealthchat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".wealthchat").join("config.toml"))
}

/// Load config from `~/.wealthchat/config.toml`.
pub fn load_config() -> Result<WealthConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(WealthConfig::default())
        }
    }
}

/// Load config from `path`. A missing file is generated with commented-out
/// defaults and yields `WealthConfig::default()`; a malformed one is an error.
pub fn load_config_from(path: &Path) -> Result<WealthConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(WealthConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: WealthConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# wealthchat configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# base_url = "http://localhost:8000"     # Or set WEALTHCHAT_BASE_URL
# request_timeout_secs = 120             # Or set WEALTHCHAT_TIMEOUT_SECS

# [widgets]
# funds = ["Baroda BNP Paribas Large Cap Fund"]
# stocks = ["HDFCBANK.NS", "RELIANCE.NS"]
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &WealthConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], with the environment lookup injected.
pub fn resolve_with_env(
    config: &WealthConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| env("WEALTHCHAT_BASE_URL"))
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Timeout: CLI → env → config → default. Unparseable env values are ignored.
    let env_timeout = env("WEALTHCHAT_TIMEOUT_SECS").and_then(|raw| match raw.trim().parse() {
        Ok(secs) => Some(secs),
        Err(_) => {
            warn!("Ignoring WEALTHCHAT_TIMEOUT_SECS={:?}: not a number", raw);
            None
        }
    });
    let timeout_secs = cli
        .timeout_secs
        .or(env_timeout)
        .or(config.server.request_timeout_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
        .max(1);

    let funds = pick_list(&cli.funds, config.widgets.funds.as_ref(), DEFAULT_FUNDS);
    let stocks = pick_list(&cli.stocks, config.widgets.stocks.as_ref(), DEFAULT_STOCKS);

    ResolvedConfig {
        base_url,
        request_timeout: Duration::from_secs(timeout_secs),
        funds,
        stocks,
    }
}

/// CLI list if given, else the config list (even if empty), else defaults.
fn pick_list(cli: &[String], config: Option<&Vec<String>>, default: &[&str]) -> Vec<String> {
    if !cli.is_empty() {
        return cli.to_vec();
    }
    match config {
        Some(list) => list.clone(),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}
