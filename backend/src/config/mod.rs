//! # Configuration Module
//!
//! This module handles loading and validating configuration from
//! environment variables. All settings are centralized here and read
//! exactly once at startup; a missing required value is fatal.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = AppConfig::from_env()?;
//! println!("RPC URL: {}", config.rpc_url_redacted());
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Description | Example |
//! |----------|-------------|---------|
//! | `RPC_URL` | Full RPC endpoint (overrides Infura) | `http://localhost:8545` |
//! | `INFURA_SEPOLIA_API_KEY` | Infura project key for Sepolia | `9aa3d95b...` |
//! | `PRIVATE_KEY` | Signer private key (hex) | `0xac09...` |
//! | `OPTION_VAULT_CONTRACT_ADDRESS` | Deployed OptionsVault | `0x5FbD...` |
//! | `OPTION_TOKEN_CONTRACT_ADDRESS` | Deployed OptionToken | `0xe7f1...` |
//! | `SERVER_HOST` | HTTP server host | `127.0.0.1` |
//! | `SERVER_PORT` | HTTP server port | `8080` |
//! | `CONFIRMATION_TIMEOUT_SECS` | Max wait for a receipt | `120` |
//! | `RECEIPT_POLL_INTERVAL_MS` | Receipt poll interval | `2000` |

use std::env;
use std::fmt;
use std::time::Duration;

use alloy_primitives::Address;
use thiserror::Error;

/// Base URL of the Infura Sepolia endpoint; the API key is appended.
const INFURA_SEPOLIA_BASE: &str = "https://sepolia.infura.io/v3/";

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is missing
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    /// Failed to parse a value
    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

/// Application configuration loaded from environment variables.
///
/// Built once in `main` and handed to the Ethereum client and the
/// submission pipeline. Nothing reads the environment after startup.
#[derive(Clone)]
pub struct AppConfig {
    // ==========================================
    // NETWORK SETTINGS
    // ==========================================

    /// JSON-RPC endpoint used to send transactions and read state.
    ///
    /// Either `RPC_URL` verbatim or the Infura Sepolia URL built from
    /// `INFURA_SEPOLIA_API_KEY`. May embed a credential, so log it
    /// through [`AppConfig::rpc_url_redacted`].
    pub rpc_url: String,

    /// Hex-encoded private key of the signing account.
    pub private_key: String,

    // ==========================================
    // CONTRACT SETTINGS
    // ==========================================

    /// Deployed OptionsVault contract.
    pub option_vault_address: Address,

    /// Deployed OptionToken contract.
    pub option_token_address: Address,

    // ==========================================
    // SERVER SETTINGS
    // ==========================================

    /// HTTP server host address.
    ///
    /// Use `127.0.0.1` for localhost only, `0.0.0.0` to accept
    /// connections from any interface.
    pub server_host: String,

    /// HTTP server port number.
    ///
    /// Default: 8080
    pub server_port: u16,

    // ==========================================
    // CONFIRMATION SETTINGS
    // ==========================================

    /// Upper bound on waiting for a receipt after dispatch.
    ///
    /// Expiry is reported as a confirmation error; the transaction may
    /// still be mined afterwards.
    pub confirmation_timeout: Duration,

    /// How often the receipt is polled while waiting.
    pub receipt_poll_interval: Duration,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("rpc_url", &self.rpc_url_redacted())
            .field("private_key", &"<redacted>")
            .field("option_vault_address", &self.option_vault_address)
            .field("option_token_address", &self.option_token_address)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("confirmation_timeout", &self.confirmation_timeout)
            .field("receipt_poll_interval", &self.receipt_poll_interval)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Use `dotenvy::dotenv()` before calling this to load from `.env` file.
    ///
    /// ## Returns
    ///
    /// - `Ok(AppConfig)` - Configuration loaded successfully
    /// - `Err(ConfigError)` - A required variable is missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// `from_env` is this with `std::env::var`; tests pass a map so they
    /// never touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };
        let get_or = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        // An explicit endpoint wins; otherwise the Infura key is required.
        let rpc_url = match get("RPC_URL") {
            Ok(url) => url,
            Err(_) => {
                let key = get("INFURA_SEPOLIA_API_KEY")?;
                format!("{}{}", INFURA_SEPOLIA_BASE, key.trim())
            }
        };

        Ok(Self {
            rpc_url,
            private_key: get("PRIVATE_KEY")?,

            option_vault_address: parse_address(
                "OPTION_VAULT_CONTRACT_ADDRESS",
                &get("OPTION_VAULT_CONTRACT_ADDRESS")?,
            )?,
            option_token_address: parse_address(
                "OPTION_TOKEN_CONTRACT_ADDRESS",
                &get("OPTION_TOKEN_CONTRACT_ADDRESS")?,
            )?,

            server_host: get_or("SERVER_HOST", "127.0.0.1"),
            server_port: parse_number("SERVER_PORT", &get_or("SERVER_PORT", "8080"))?,

            confirmation_timeout: Duration::from_secs(parse_positive(
                "CONFIRMATION_TIMEOUT_SECS",
                &get_or("CONFIRMATION_TIMEOUT_SECS", "120"),
            )?),
            receipt_poll_interval: Duration::from_millis(parse_positive(
                "RECEIPT_POLL_INTERVAL_MS",
                &get_or("RECEIPT_POLL_INTERVAL_MS", "2000"),
            )?),
        })
    }

    /// The RPC URL with any Infura key replaced, safe for logs.
    pub fn rpc_url_redacted(&self) -> String {
        match self.rpc_url.strip_prefix(INFURA_SEPOLIA_BASE) {
            Some(_) => format!("{}<redacted>", INFURA_SEPOLIA_BASE),
            None => self.rpc_url.clone(),
        }
    }
}

fn parse_address(key: &str, raw: &str) -> Result<Address, ConfigError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::ParseError(key.to_string(), e.to_string()))
}

/// Durations of zero would fail every write or spin the receipt poll.
fn parse_positive(key: &str, raw: &str) -> Result<u64, ConfigError> {
    match parse_number(key, raw)? {
        0 => Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be greater than zero".to_string(),
        )),
        value => Ok(value),
    }
}
