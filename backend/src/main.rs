//! # Options Vault Backend Service
//!
//! This is the main entry point for the backend service that fronts the
//! OptionToken and OptionsVault contracts. It provides:
//!
//! - REST API for option lifecycle calls (create, buy, exercise, claim)
//! - Read endpoints that return decoded contract state
//! - A submission pipeline that waits for every write to be mined and
//!   reports its true outcome
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        BACKEND SERVICE                          │
//! │                                                                 │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │                     REST API (Actix)                      │  │
//! │  │  /options  /option/*  /vault/*  /health                   │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                          │                                      │
//! │  ┌───────────────────────┴───────────────────────────────────┐  │
//! │  │                    SERVICE LAYER                          │  │
//! │  │  ┌──────────────────┐        ┌─────────────────────────┐  │  │
//! │  │  │ BoundContract    │ ─────▶ │ TransactionSubmitter    │  │  │
//! │  │  │ (ABI encode)     │        │ dispatch → confirm →    │  │  │
//! │  │  └──────────────────┘        │ verify status           │  │  │
//! │  │                              └─────────────────────────┘  │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                          │                                      │
//! │                   ┌──────┴──────┐                               │
//! │                   │  Ethereum   │                               │
//! │                   │  JSON-RPC   │                               │
//! │                   └─────────────┘                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! 1. Copy `.env.example` to `.env` and configure
//! 2. Start the server: `cargo run`
//!
//! ## Environment Variables
//!
//! See [`config::AppConfig`] for all required configuration.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod contracts;
mod ethereum;
mod models;
mod services;
mod utils;

use config::AppConfig;
use contracts::BoundContract;
use ethereum::EthereumClient;
use services::{ConfirmationPolicy, TransactionSubmitter};

/// Application state shared across all handlers.
///
/// ## Why Arc?
/// `Arc` (Atomic Reference Counting) allows us to share ownership
/// of these resources across multiple threads safely.
pub struct AppState {
    /// Submission pipeline for writes, and the read path for views
    pub submitter: TransactionSubmitter,

    /// OptionToken contract at its configured address
    pub option_token: BoundContract,

    /// OptionsVault contract at its configured address
    pub options_vault: BoundContract,
}

/// Main entry point for the backend service.
///
/// This function:
/// 1. Loads configuration from environment
/// 2. Sets up the Ethereum client
/// 3. Binds the contract ABIs to their addresses
/// 4. Launches the HTTP server
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // =========================================
    // STEP 1: Load Configuration
    // =========================================
    // It's okay if .env doesn't exist
    dotenvy::dotenv().ok();

    // =========================================
    // STEP 2: Initialize Logging
    // =========================================
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("🚀 Starting Options Vault Backend Service");

    let config = AppConfig::from_env().expect("Failed to load configuration");

    info!("📋 Configuration loaded");
    info!("   RPC: {}", config.rpc_url_redacted());
    info!("   OptionsVault: {}", config.option_vault_address);
    info!("   OptionToken: {}", config.option_token_address);
    info!(
        "   Confirmation timeout: {:?} (poll every {:?})",
        config.confirmation_timeout, config.receipt_poll_interval
    );

    // =========================================
    // STEP 3: Initialize Ethereum Client
    // =========================================
    let client = Arc::new(
        EthereumClient::connect(&config)
            .await
            .expect("Failed to create Ethereum client"),
    );

    match client.chain_id().await {
        Ok(chain_id) => info!("⛓️  Connected to chain {}", chain_id),
        Err(e) => warn!("⚠️  RPC not reachable yet: {}", e),
    }

    // =========================================
    // STEP 4: Initialize Services
    // =========================================
    let submitter = TransactionSubmitter::new(
        client.clone(),
        client,
        ConfirmationPolicy::from(&config),
    );

    let option_token = BoundContract::option_token(config.option_token_address)
        .expect("Failed to parse OptionToken ABI");
    let options_vault = BoundContract::options_vault(config.option_vault_address)
        .expect("Failed to parse OptionsVault ABI");

    info!("🔧 Services initialized");

    // =========================================
    // STEP 5: Create Application State
    // =========================================
    let app_state = Arc::new(AppState {
        submitter,
        option_token,
        options_vault,
    });

    // =========================================
    // STEP 6: Start HTTP Server
    // =========================================
    let server_host = config.server_host.clone();
    let server_port = config.server_port;

    info!("🌐 Starting HTTP server on {}:{}", server_host, server_port);

    HttpServer::new(move || {
        App::new()
            // Attach shared application state
            .app_data(web::Data::new(app_state.clone()))

            // Browser clients call from other origins
            .wrap(Cors::permissive())

            // Add logging middleware
            .wrap(middleware::Logger::default())

            // Configure API routes
            .configure(api::configure_routes)
    })
    .bind(format!("{}:{}", server_host, server_port))?
    .run()
    .await
}
