//! # REST API Module
//!
//! This module defines all HTTP endpoints for the Options Vault API.
//!
//! ## Endpoint Overview
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | POST | `/options` | Initialize the option token |
//! | POST | `/option/admin-transfer` | Move tokens as admin |
//! | POST | `/option/burn` | Burn tokens |
//! | POST | `/option/calculate-profit` | Quote exercise profit |
//! | GET | `/option/asset1-price` | Asset1 spot price |
//! | POST | `/option/convert-asset2-to-asset1` | Convert an amount |
//! | GET | `/option/terms` | Option terms |
//! | POST | `/vault/options` | Create an option |
//! | POST | `/vault/options/buy` | Buy an option |
//! | POST | `/vault/options/exercise` | Exercise an option |
//! | POST | `/vault/options/claim` | Claim underlying tokens |
//! | GET | `/vault/options/:optionAddress/premium` | Quote a premium |
//! | GET | `/vault/options/:optionAddress` | Option details |
//! | GET | `/vault/uniswap-nft-manager` | NFT manager address |
//! | GET | `/vault/uniswap-factory` | Uniswap V3 factory address |
//! | GET | `/health` | Health check |
//!
//! ## Request/Response Format
//!
//! All requests and responses use JSON:
//!
//! ```json
//! // Write call
//! {
//!     "message": "Option bought successfully",
//!     "txHash": "0x..."
//! }
//!
//! // Read call: decoded contract outputs
//! {
//!     "premium": "1500"
//! }
//!
//! // Error response
//! {
//!     "error": "Human readable message",
//!     "code": "ERROR_CODE"
//! }
//! ```

pub mod routes;
pub mod handlers;

pub use routes::configure_routes;
