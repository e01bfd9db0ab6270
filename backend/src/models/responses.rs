//! # API Response Models
//!
//! Structures for outgoing API response bodies.
//!
//! Write endpoints answer with a [`TransactionResponse`]; read endpoints
//! answer with the decoded contract outputs as a flat JSON object; every
//! failure answers with an [`ErrorResponse`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body returned after a write call is confirmed.
///
/// ## Example Response
///
/// ```json
/// {
///     "message": "Tokens burned successfully",
///     "txHash": "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Human-readable confirmation.
    pub message: String,

    /// 0x-prefixed transaction hash.
    pub tx_hash: String,
}

/// Body returned on any failure.
///
/// ## Example Response
///
/// ```json
/// {
///     "error": "Missing required parameters",
///     "code": "MISSING_PARAMETERS"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,

    /// Machine-readable error code (e.g. `EXECUTION_REVERTED`).
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status: "healthy" or "unhealthy".
    pub status: String,

    /// Whether the RPC endpoint answered.
    pub ethereum_rpc: bool,

    /// Latest block seen, if the RPC answered.
    pub latest_block: Option<u64>,

    /// Account that signs transactions.
    pub signer: String,

    /// Service version.
    pub version: String,

    /// Current timestamp.
    pub timestamp: DateTime<Utc>,
}
