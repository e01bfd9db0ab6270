//! # API Route Configuration
//!
//! This module sets up all the HTTP routes for the API.

use actix_web::web;

use super::handlers;

/// Configure all API routes.
///
/// This function is called from main.rs to set up
/// all the endpoint routes.
///
/// ## Route Structure
///
/// ```text
/// /
/// ├── /health                          GET  - Health check
/// ├── /options                         POST - initialize
/// ├── /option
/// │   ├── /admin-transfer              POST - adminTransfer
/// │   ├── /burn                        POST - burn
/// │   ├── /calculate-profit            POST - calculateProfit (read)
/// │   ├── /asset1-price                GET  - getAsset1Price
/// │   ├── /convert-asset2-to-asset1    POST - convertAsset2ToAsset1 (read)
/// │   └── /terms                       GET  - terms
/// └── /vault
///     ├── /options                     POST - createOption
///     ├── /options/buy                 POST - buyOption
///     ├── /options/exercise            POST - exerciseOption
///     ├── /options/claim               POST - claimTokens
///     ├── /options/:address/premium    GET  - calculatePremium
///     ├── /options/:address            GET  - optionByAddress
///     ├── /uniswap-nft-manager         GET  - getUniswapNFTManager
///     └── /uniswap-factory             GET  - getUniswapV3Factory
/// ```
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Extractor failures answer with the same JSON error body
        .app_data(web::JsonConfig::default().error_handler(handlers::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(handlers::query_error_handler))

        // Root endpoint - API information
        .route("/", web::get().to(handlers::api_info))

        // Health check endpoint
        .route("/health", web::get().to(handlers::health_check))

        // Option token initialization
        .route("/options", web::post().to(handlers::initialize_option))

        // Option token endpoints
        .service(
            web::scope("/option")
                .route("/admin-transfer", web::post().to(handlers::admin_transfer))
                .route("/burn", web::post().to(handlers::burn_option))
                .route("/calculate-profit", web::post().to(handlers::calculate_profit))
                .route("/asset1-price", web::get().to(handlers::get_asset1_price))
                .route(
                    "/convert-asset2-to-asset1",
                    web::post().to(handlers::convert_asset2_to_asset1),
                )
                .route("/terms", web::get().to(handlers::get_option_terms))
        )

        // Options vault endpoints
        .service(
            web::scope("/vault")
                .route("/options", web::post().to(handlers::create_option))

                // Fixed segments before the `{optionAddress}` matcher
                .route("/options/buy", web::post().to(handlers::buy_option))
                .route("/options/exercise", web::post().to(handlers::exercise_option))
                .route("/options/claim", web::post().to(handlers::claim_tokens))
                .route(
                    "/options/{optionAddress}/premium",
                    web::get().to(handlers::calculate_premium),
                )
                .route(
                    "/options/{optionAddress}",
                    web::get().to(handlers::get_option_by_address),
                )
                .route(
                    "/uniswap-nft-manager",
                    web::get().to(handlers::get_uniswap_nft_manager),
                )
                .route("/uniswap-factory", web::get().to(handlers::get_uniswap_v3_factory))
        );
}
