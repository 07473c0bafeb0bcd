// ===============================
// src/config.rs
// ===============================
/*
=============================================================================
Project : futures_cli — interactive Binance Futures order client in Rust
Module  : config.rs
Version : 0.1.0
Author  : futures_cli contributors
License : MIT (see LICENSE)

Summary : Menu-driven CLI that validates user input, places MARKET / LIMIT /
          STOP_LIMIT orders on Binance USDⓈ-M Futures (testnet by default),
          looks up order status and margin balance, and logs every call.

(c) 2025 futures_cli contributors.
=============================================================================
*/
use std::env;
use std::fmt;
use std::io;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use thiserror::Error;

/// Venue yang dituju (testnet / mainnet)
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum VenueMode {
    Testnet,
    Mainnet,
}

impl VenueMode {
    // Endpoint default per mode
    pub fn default_rest_url(&self) -> &'static str {
        match self {
            VenueMode::Testnet => "https://testnet.binancefuture.com",
            VenueMode::Mainnet => "https://fapi.binance.com",
        }
    }

    /// (key var, secret var)
    pub fn credential_vars(&self) -> (&'static str, &'static str) {
        match self {
            VenueMode::Testnet => ("BINANCE_TEST_KEY", "BINANCE_TEST_SECRET"),
            VenueMode::Mainnet => ("BINANCE_API_KEY", "BINANCE_API_SECRET"),
        }
    }
}

impl fmt::Display for VenueMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VenueMode::Testnet => "testnet",
            VenueMode::Mainnet => "mainnet",
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "futures_cli")]
#[command(about = "Interactive Binance Futures order client (testnet by default)")]
#[command(version)]
pub struct Cli {
    /// Which venue to trade against
    #[arg(long, env = "VENUE_MODE", value_enum, default_value_t = VenueMode::Testnet)]
    pub mode: VenueMode,

    /// REST base URL (default depends on --mode)
    #[arg(long, env = "BINANCE_REST_URL")]
    pub rest_url: Option<String>,

    /// Margin asset whose balance is reported
    #[arg(long, env = "MARGIN_ASSET", default_value = "USDT")]
    pub asset: String,

    /// recvWindow for signed requests, in ms
    #[arg(long, env = "BINANCE_RECV_WINDOW", default_value_t = 5000)]
    pub recv_window: u64,

    /// Append-mode log file
    #[arg(long, env = "LOG_FILE", default_value = "logs/trading_bot.log")]
    pub log_file: PathBuf,
}

impl Cli {
    pub fn rest_url(&self) -> String {
        self.rest_url
            .clone()
            .unwrap_or_else(|| self.mode.default_rest_url().to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API Key and Secret are required ({0} is empty)")]
    Missing(&'static str),
    #[error("reading {var} from terminal: {source}")]
    Prompt {
        var: &'static str,
        #[source]
        source: io::Error,
    },
}

#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

// secret tidak boleh bocor ke log
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Look each var up with `lookup`; ask `prompt` for the missing ones.
    pub fn resolve(
        mode: VenueMode,
        lookup: impl Fn(&str) -> Option<String>,
        mut prompt: impl FnMut(&'static str) -> io::Result<String>,
    ) -> Result<Self, ConfigError> {
        let (key_var, secret_var) = mode.credential_vars();
        let mut fetch = |var: &'static str| -> Result<String, ConfigError> {
            let value = match lookup(var) {
                Some(v) => v,
                None => prompt(var).map_err(|source| ConfigError::Prompt { var, source })?,
            };
            let value = value.trim().to_string();
            if value.is_empty() {
                return Err(ConfigError::Missing(var));
            }
            Ok(value)
        };
        let api_key = fetch(key_var)?;
        let api_secret = fetch(secret_var)?;
        Ok(Self { api_key, api_secret })
    }
}

/// Non-empty env var, after `.env` has been loaded.
pub fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Read a secret from the terminal without echo.
pub fn prompt_secret(label: &str) -> io::Result<String> {
    let term = console::Term::stderr();
    term.write_str(label)?;
    term.read_secure_line()
}
