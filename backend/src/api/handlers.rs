//! # API Request Handlers
//!
//! This module contains the handler functions for each API endpoint.
//! Each handler:
//! 1. Extracts request data
//! 2. Checks that required fields are present
//! 3. Builds a [`CallDescription`] and hands it to the submitter
//! 4. Returns a formatted response
//!
//! Argument values are not validated here. A malformed address or
//! amount is rejected when the call is encoded, before anything is sent.
//!
//! ## Error Handling
//!
//! All errors are returned as JSON:
//!
//! ```json
//! {
//!     "error": "Transaction 0x5c50... was mined but execution reverted",
//!     "code": "EXECUTION_REVERTED"
//! }
//! ```
//!
//! | Failure | Status | Code |
//! |---------|--------|------|
//! | Body or query does not parse | 400 | `INVALID_REQUEST` |
//! | Missing field | 400 | `MISSING_PARAMETERS` |
//! | Call does not fit the ABI | 400 | `SUBMISSION_ERROR` |
//! | Network/contract refused the call | 502 | `SUBMISSION_ERROR` |
//! | Outcome unknown after dispatch | 504 | `CONFIRMATION_ERROR` |
//! | Mined but reverted | 422 | `EXECUTION_REVERTED` |

use std::sync::Arc;

use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

use crate::contracts::{BoundContract, CallArg, CallDescription};
use crate::models::{
    AdminTransferRequest, AmountRequest, BurnRequest, CalculateProfitRequest, ClaimTokensRequest,
    CreateOptionRequest, ErrorResponse, HealthResponse, InitializeOptionRequest,
    OptionAmountRequest, TransactionResponse,
};
use crate::services::{PipelineError, SubmissionError, TransactionSubmitter};
use crate::utils::truncate_string;
use crate::AppState;

const MISSING_PARAMETERS: &str = "Missing required parameters";

/// A field is present unless absent, empty, zero, or `false`.
fn is_present(field: &Option<CallArg>) -> bool {
    field.as_ref().is_some_and(|arg| !arg.is_blank())
}

/// Unwrap required fields, or produce the 400 response.
fn required<const N: usize>(fields: [Option<CallArg>; N]) -> Result<Vec<CallArg>, HttpResponse> {
    if !fields.iter().all(is_present) {
        return Err(missing_parameters());
    }
    Ok(fields.into_iter().flatten().collect())
}

/// Forward an unscreened field as given.
///
/// An absent value is sent as empty text, which the encoder rejects for
/// every numeric or address parameter.
fn passthrough(field: Option<CallArg>) -> CallArg {
    field.unwrap_or_else(|| CallArg::Text(String::new()))
}

fn missing_parameters() -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new("MISSING_PARAMETERS", MISSING_PARAMETERS))
}

fn submission_error_response(e: &SubmissionError) -> HttpResponse {
    let status = if e.is_malformed_call() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    };
    HttpResponse::build(status).json(ErrorResponse::new("SUBMISSION_ERROR", e.to_string()))
}

fn pipeline_error_response(e: &PipelineError) -> HttpResponse {
    match e {
        PipelineError::Submission(inner) => submission_error_response(inner),
        PipelineError::Confirmation(_) => HttpResponse::GatewayTimeout()
            .json(ErrorResponse::new("CONFIRMATION_ERROR", e.to_string())),
        PipelineError::ExecutionReverted { .. } => HttpResponse::UnprocessableEntity()
            .json(ErrorResponse::new("EXECUTION_REVERTED", e.to_string())),
    }
}

/// Answer a body that failed to deserialize with a JSON error.
///
/// Registered through `JsonConfig`. Integers beyond `i64` must be sent as
/// strings, so this is also what a too-large JSON number produces.
pub fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid request body: {}", err);
    warn!("{}", message);
    let response = HttpResponse::BadRequest().json(ErrorResponse::new("INVALID_REQUEST", message));
    error::InternalError::from_response(err, response).into()
}

/// Answer a query string that failed to deserialize with a JSON error.
pub fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid query string: {}", err);
    warn!("{}", message);
    let response = HttpResponse::BadRequest().json(ErrorResponse::new("INVALID_REQUEST", message));
    error::InternalError::from_response(err, response).into()
}

/// Run a write call through the pipeline and answer with its hash.
async fn submit_call(
    submitter: &TransactionSubmitter,
    contract: &BoundContract,
    call: CallDescription,
    message: &str,
) -> HttpResponse {
    match submitter.submit(contract, &call).await {
        Ok(receipt) => HttpResponse::Ok().json(TransactionResponse {
            message: message.to_string(),
            tx_hash: receipt.transaction_hash,
        }),
        Err(e) => {
            error!("{} failed: {}", call.method(), e);
            pipeline_error_response(&e)
        }
    }
}

/// Run a read call and answer with its decoded outputs.
async fn query_call(
    submitter: &TransactionSubmitter,
    contract: &BoundContract,
    call: CallDescription,
) -> HttpResponse {
    match submitter.query(contract, &call).await {
        Ok(output) => HttpResponse::Ok().json(output.into_json()),
        Err(e) => {
            error!("{} failed: {}", call.method(), e);
            submission_error_response(&e)
        }
    }
}

/// API information endpoint (root).
///
/// `GET /`
pub async fn api_info(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let info = json!({
        "name": "Options Vault API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "REST facade over the OptionsVault and OptionToken contracts",
        "contracts": {
            "optionToken": state.option_token.address().to_checksum(None),
            "optionsVault": state.options_vault.address().to_checksum(None),
        },
        "confirmationTimeoutSecs": state.submitter.policy().timeout.as_secs(),
        "endpoints": {
            "health": { "method": "GET", "path": "/health" },
            "optionToken": [
                { "method": "POST", "path": "/options", "call": "initialize" },
                { "method": "POST", "path": "/option/admin-transfer", "call": "adminTransfer" },
                { "method": "POST", "path": "/option/burn", "call": "burn" },
                { "method": "POST", "path": "/option/calculate-profit", "call": "calculateProfit" },
                { "method": "GET", "path": "/option/asset1-price", "call": "getAsset1Price" },
                { "method": "POST", "path": "/option/convert-asset2-to-asset1", "call": "convertAsset2ToAsset1" },
                { "method": "GET", "path": "/option/terms", "call": "terms" }
            ],
            "optionsVault": [
                { "method": "POST", "path": "/vault/options", "call": "createOption" },
                { "method": "POST", "path": "/vault/options/buy", "call": "buyOption" },
                { "method": "POST", "path": "/vault/options/exercise", "call": "exerciseOption" },
                { "method": "POST", "path": "/vault/options/claim", "call": "claimTokens" },
                { "method": "GET", "path": "/vault/options/{optionAddress}/premium?amount=", "call": "calculatePremium" },
                { "method": "GET", "path": "/vault/options/{optionAddress}", "call": "optionByAddress" },
                { "method": "GET", "path": "/vault/uniswap-nft-manager", "call": "getUniswapNFTManager" },
                { "method": "GET", "path": "/vault/uniswap-factory", "call": "getUniswapV3Factory" }
            ]
        }
    });

    HttpResponse::Ok().json(info)
}

/// Health check endpoint.
///
/// Healthy when the RPC endpoint reports a block number.
///
/// ## Endpoint
///
/// `GET /health`
///
/// ## Response
///
/// ```json
/// {
///     "status": "healthy",
///     "ethereumRpc": true,
///     "latestBlock": 7012345,
///     "signer": "0xf39F...",
///     "version": "0.1.0",
///     "timestamp": "2025-12-08T12:00:00Z"
/// }
/// ```
pub async fn health_check(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let latest_block = match state.submitter.latest_block().await {
        Ok(block) => Some(block),
        Err(e) => {
            warn!("RPC health check failed: {}", e);
            None
        }
    };
    let healthy = latest_block.is_some();

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        ethereum_rpc: healthy,
        latest_block,
        signer: state.submitter.signer_address().to_checksum(None),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    HttpResponse::build(status_code).json(response)
}

// ==========================================
// OPTION TOKEN
// ==========================================

/// Initialize the option token.
///
/// ## Endpoint
///
/// `POST /options`
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/options \
///   -H "Content-Type: application/json" \
///   -d '{
///     "optionData": ["2000", "15", "1735689600", true],
///     "name": "ETH Call 2000",
///     "symbol": "ETHC2000",
///     "poolAddress": "0x88e6A0c2dDD26FEEb64F039a2c41296FcB3f5640",
///     "asset1Amt": "1000000000000000000",
///     "asset2Amt": "2000000000",
///     "admin": "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
///   }'
/// ```
///
/// `asset1Amt` and `asset2Amt` are not screened: a zero leg is valid.
pub async fn initialize_option(
    state: web::Data<Arc<AppState>>,
    body: web::Json<InitializeOptionRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    let screened = [
        &body.option_data,
        &body.name,
        &body.symbol,
        &body.pool_address,
        &body.admin,
    ];
    if !screened.into_iter().all(is_present) {
        return missing_parameters();
    }

    // Asset amounts are forwarded unscreened; a zero leg is valid.
    let args: Vec<CallArg> = [
        body.option_data,
        body.name,
        body.symbol,
        body.pool_address,
        body.asset1_amt,
        body.asset2_amt,
        body.admin,
    ]
    .into_iter()
    .map(passthrough)
    .collect();

    info!("Initialize option token request");
    submit_call(
        &state.submitter,
        &state.option_token,
        CallDescription::new("initialize", args),
        "Option token initialized successfully",
    )
    .await
}

/// Transfer option tokens between two accounts as admin.
///
/// `POST /option/admin-transfer` with `{ "from", "to", "amount" }`.
pub async fn admin_transfer(
    state: web::Data<Arc<AppState>>,
    body: web::Json<AdminTransferRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    let args = match required([body.from, body.to, body.amount]) {
        Ok(args) => args,
        Err(response) => return response,
    };

    info!(
        "Admin transfer {} -> {}",
        truncate_string(&args[0].to_string(), 13),
        truncate_string(&args[1].to_string(), 13)
    );
    submit_call(
        &state.submitter,
        &state.option_token,
        CallDescription::new("adminTransfer", args),
        "Tokens transferred successfully",
    )
    .await
}

/// Burn option tokens.
///
/// ## Endpoint
///
/// `POST /option/burn`
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/option/burn \
///   -H "Content-Type: application/json" \
///   -d '{ "account": "0x7099...", "amount": "100" }'
/// ```
///
/// **Response:**
/// ```json
/// {
///     "message": "Tokens burned successfully",
///     "txHash": "0x5c504ed4..."
/// }
/// ```
pub async fn burn_option(
    state: web::Data<Arc<AppState>>,
    body: web::Json<BurnRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    let args = match required([body.account, body.amount]) {
        Ok(args) => args,
        Err(response) => return response,
    };

    info!("Burn {} from {}", args[1], truncate_string(&args[0].to_string(), 13));
    submit_call(
        &state.submitter,
        &state.option_token,
        CallDescription::new("burn", args),
        "Tokens burned successfully",
    )
    .await
}

/// Quote the profit of exercising `amount` tokens for `user`.
///
/// `POST /option/calculate-profit` → `{ "profitable": true, "profit": "..." }`
pub async fn calculate_profit(
    state: web::Data<Arc<AppState>>,
    body: web::Json<CalculateProfitRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    let args = match required([body.user, body.amount]) {
        Ok(args) => args,
        Err(response) => return response,
    };

    query_call(
        &state.submitter,
        &state.option_token,
        CallDescription::new("calculateProfit", args),
    )
    .await
}

/// `GET /option/asset1-price` → `{ "price": "..." }`
pub async fn get_asset1_price(state: web::Data<Arc<AppState>>) -> HttpResponse {
    query_call(
        &state.submitter,
        &state.option_token,
        CallDescription::no_args("getAsset1Price"),
    )
    .await
}

/// `POST /option/convert-asset2-to-asset1` → `{ "convertedAmount": "..." }`
pub async fn convert_asset2_to_asset1(
    state: web::Data<Arc<AppState>>,
    body: web::Json<AmountRequest>,
) -> HttpResponse {
    let args = match required([body.into_inner().amount]) {
        Ok(args) => args,
        Err(response) => return response,
    };

    query_call(
        &state.submitter,
        &state.option_token,
        CallDescription::new("convertAsset2ToAsset1", args),
    )
    .await
}

/// Terms of the option token.
///
/// ## Endpoint
///
/// `GET /option/terms`
///
/// ## Response
///
/// ```json
/// {
///     "strikePrice": "2000",
///     "premium": "15",
///     "expiry": "1735689600",
///     "isCall": true,
///     "uniswapPool": "0x88e6...",
///     "creator": "0x7099...",
///     "asset1Reserve": "1000000000000000000",
///     "asset2Reserve": "2000000000"
/// }
/// ```
pub async fn get_option_terms(state: web::Data<Arc<AppState>>) -> HttpResponse {
    query_call(
        &state.submitter,
        &state.option_token,
        CallDescription::no_args("terms"),
    )
    .await
}

// ==========================================
// OPTIONS VAULT
// ==========================================

/// Create an option backed by a locked LP position.
///
/// ## Endpoint
///
/// `POST /vault/options`
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/vault/options \
///   -H "Content-Type: application/json" \
///   -d '{
///     "tokenId": 4821,
///     "strikePrice": "2000",
///     "premium": "15",
///     "expiry": 1735689600,
///     "isCall": true
///   }'
/// ```
pub async fn create_option(
    state: web::Data<Arc<AppState>>,
    body: web::Json<CreateOptionRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    let mut args = match required([body.token_id, body.strike_price, body.premium, body.expiry]) {
        Ok(args) => args,
        Err(response) => return response,
    };
    // `false` is a put, not a missing field.
    match body.is_call {
        Some(is_call) => args.push(is_call),
        None => return missing_parameters(),
    }

    info!("Create option for LP token {}", args[0]);
    submit_call(
        &state.submitter,
        &state.options_vault,
        CallDescription::new("createOption", args),
        "Option created successfully",
    )
    .await
}

/// `POST /vault/options/buy` with `{ "optionAddress", "amount" }`.
pub async fn buy_option(
    state: web::Data<Arc<AppState>>,
    body: web::Json<OptionAmountRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    let args = match required([body.option_address, body.amount]) {
        Ok(args) => args,
        Err(response) => return response,
    };

    info!("Buy {} of option {}", args[1], truncate_string(&args[0].to_string(), 13));
    submit_call(
        &state.submitter,
        &state.options_vault,
        CallDescription::new("buyOption", args),
        "Option bought successfully",
    )
    .await
}

/// `POST /vault/options/exercise` with `{ "optionAddress", "amount" }`.
pub async fn exercise_option(
    state: web::Data<Arc<AppState>>,
    body: web::Json<OptionAmountRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    let args = match required([body.option_address, body.amount]) {
        Ok(args) => args,
        Err(response) => return response,
    };

    info!("Exercise {} of option {}", args[1], truncate_string(&args[0].to_string(), 13));
    submit_call(
        &state.submitter,
        &state.options_vault,
        CallDescription::new("exerciseOption", args),
        "Option exercised successfully",
    )
    .await
}

/// `POST /vault/options/claim` with `{ "optionAddress" }`.
pub async fn claim_tokens(
    state: web::Data<Arc<AppState>>,
    body: web::Json<ClaimTokensRequest>,
) -> HttpResponse {
    let args = match required([body.into_inner().option_address]) {
        Ok(args) => args,
        Err(response) => return response,
    };

    submit_call(
        &state.submitter,
        &state.options_vault,
        CallDescription::new("claimTokens", args),
        "Tokens claimed successfully",
    )
    .await
}

/// Premium for buying `amount` of an option.
///
/// ## Endpoint
///
/// `GET /vault/options/{optionAddress}/premium?amount=100`
///
/// Older clients send `{ "amount": "100" }` as the body of the GET
/// instead; the query string wins when both are given.
///
/// **Response:** `{ "premium": "1500" }`
pub async fn calculate_premium(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    query: web::Query<AmountRequest>,
    body: Option<web::Json<AmountRequest>>,
) -> HttpResponse {
    let option_address = CallArg::Text(path.into_inner());
    let amount = Some(query.into_inner().amount)
        .filter(is_present)
        .unwrap_or_else(|| body.and_then(|body| body.into_inner().amount));

    let args = match required([Some(option_address), amount]) {
        Ok(args) => args,
        Err(response) => return response,
    };

    query_call(
        &state.submitter,
        &state.options_vault,
        CallDescription::new("calculatePremium", args),
    )
    .await
}

/// `GET /vault/options/{optionAddress}`
///
/// **Response:** `{ "creator", "tokenId", "asset1Amount", "asset2Amount" }`
pub async fn get_option_by_address(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> HttpResponse {
    let args = match required([Some(CallArg::Text(path.into_inner()))]) {
        Ok(args) => args,
        Err(response) => return response,
    };

    query_call(
        &state.submitter,
        &state.options_vault,
        CallDescription::new("optionByAddress", args),
    )
    .await
}

/// `GET /vault/uniswap-nft-manager` → `{ "nftManagerAddress": "0x..." }`
pub async fn get_uniswap_nft_manager(state: web::Data<Arc<AppState>>) -> HttpResponse {
    query_call(
        &state.submitter,
        &state.options_vault,
        CallDescription::no_args("getUniswapNFTManager"),
    )
    .await
}

/// `GET /vault/uniswap-factory` → `{ "factoryAddress": "0x..." }`
pub async fn get_uniswap_v3_factory(state: web::Data<Arc<AppState>>) -> HttpResponse {
    query_call(
        &state.submitter,
        &state.options_vault,
        CallDescription::no_args("getUniswapV3Factory"),
    )
    .await
}
