//! # API Request Models
//!
//! Structures for incoming API request bodies.
//! Each struct represents the expected JSON body for an endpoint.
//!
//! Every field is optional at the serde level so that a missing field
//! produces the API's own `400 Missing required parameters` response
//! instead of a deserializer error. Values are kept as [`CallArg`] and
//! only coerced to Solidity types when the call is encoded.

use serde::{Deserialize, Serialize};

use crate::contracts::CallArg;

/// Request to initialize the option token.
///
/// ## Example JSON
///
/// ```json
/// {
///     "optionData": ["2000", "15", "1735689600", true],
///     "name": "ETH Call 2000",
///     "symbol": "ETHC2000",
///     "poolAddress": "0x88e6A0c2dDD26FEEb64F039a2c41296FcB3f5640",
///     "asset1Amt": "1000000000000000000",
///     "asset2Amt": "2000000000",
///     "admin": "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
/// }
/// ```
///
/// `optionData` is `[strikePrice, premium, expiry, isCall]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeOptionRequest {
    pub option_data: Option<CallArg>,
    pub name: Option<CallArg>,
    pub symbol: Option<CallArg>,
    pub pool_address: Option<CallArg>,
    pub asset1_amt: Option<CallArg>,
    pub asset2_amt: Option<CallArg>,
    pub admin: Option<CallArg>,
}

/// Request to move option tokens between accounts as admin.
///
/// ## Example JSON
///
/// ```json
/// {
///     "from": "0x7099...",
///     "to": "0x3C44...",
///     "amount": "500"
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTransferRequest {
    pub from: Option<CallArg>,
    pub to: Option<CallArg>,
    pub amount: Option<CallArg>,
}

/// Request to burn option tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnRequest {
    /// Holder whose tokens are burned.
    pub account: Option<CallArg>,
    pub amount: Option<CallArg>,
}

/// Request to quote the profit of exercising `amount` tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateProfitRequest {
    pub user: Option<CallArg>,
    pub amount: Option<CallArg>,
}

/// Request carrying only an amount.
///
/// Used by `POST /option/convert-asset2-to-asset1` and as the query
/// string of `GET /vault/options/{optionAddress}/premium`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountRequest {
    pub amount: Option<CallArg>,
}

/// Request to create a new option in the vault.
///
/// ## Example JSON
///
/// ```json
/// {
///     "tokenId": 4821,
///     "strikePrice": "2000",
///     "premium": "15",
///     "expiry": 1735689600,
///     "isCall": false
/// }
/// ```
///
/// `isCall: false` is a valid put; only an absent `isCall` is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptionRequest {
    /// Uniswap V3 LP position NFT locked behind the option.
    pub token_id: Option<CallArg>,
    pub strike_price: Option<CallArg>,
    pub premium: Option<CallArg>,
    pub expiry: Option<CallArg>,
    pub is_call: Option<CallArg>,
}

/// Request to buy or exercise `amount` of an option.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionAmountRequest {
    pub option_address: Option<CallArg>,
    pub amount: Option<CallArg>,
}

/// Request to claim the underlying tokens of an option.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimTokensRequest {
    pub option_address: Option<CallArg>,
}
