//! # Ethereum Client Module
//!
//! Production signing agent and network endpoint, backed by an `alloy`
//! provider with a local-key wallet attached.
//!
//! ## Responsibilities
//!
//! - Sign and broadcast contract calls (nonce, gas and chain id are
//!   filled in by the provider's recommended fillers)
//! - Fetch transaction receipts
//! - Execute read-only `eth_call`s
//! - Report the latest block for health checks
//!
//! Gas estimation runs the call against the latest state before signing,
//! so a call that would revert fails at dispatch and is never broadcast.
//!
//! One client is built at startup and shared by every request. The
//! provider handles its own connection reuse; there is no locking here.

use alloy_network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::info;

use crate::config::AppConfig;
use crate::services::transaction_submitter::{
    ChainReceipt, NetworkEndpoint, SigningAgent, TransportError,
};

/// Errors that can occur when building the client.
#[derive(Debug, thiserror::Error)]
pub enum EthereumClientError {
    /// `PRIVATE_KEY` is not a valid secp256k1 key.
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// The RPC URL could not be turned into a transport.
    #[error("Failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },
}

/// Ethereum JSON-RPC client wrapper.
///
/// ## Usage
///
/// ```rust,ignore
/// let config = AppConfig::from_env()?;
/// let client = Arc::new(EthereumClient::connect(&config).await?);
///
/// let submitter = TransactionSubmitter::new(
///     client.clone(),
///     client,
///     ConfirmationPolicy::from(&config),
/// );
/// ```
#[derive(Clone)]
pub struct EthereumClient {
    /// Provider with the wallet filler attached.
    provider: DynProvider,

    /// Address derived from the private key.
    signer: Address,
}

impl EthereumClient {
    /// Build the client from configuration.
    ///
    /// For HTTP endpoints this does not contact the network; the first
    /// RPC request happens on first use.
    pub async fn connect(config: &AppConfig) -> Result<Self, EthereumClientError> {
        let signer: PrivateKeySigner = config
            .private_key
            .trim()
            .parse()
            .map_err(|e| EthereumClientError::InvalidKey(format!("{}", e)))?;
        let address = signer.address();

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect(&config.rpc_url)
            .await
            .map_err(|e| EthereumClientError::Connect {
                url: config.rpc_url_redacted(),
                reason: e.to_string(),
            })?
            .erased();

        info!("Ethereum client initialized:");
        info!("  RPC: {}", config.rpc_url_redacted());
        info!("  Signer: {}", address);

        Ok(Self {
            provider,
            signer: address,
        })
    }

    /// Chain id reported by the endpoint.
    pub async fn chain_id(&self) -> Result<u64, TransportError> {
        self.provider.get_chain_id().await.map_err(transport_error)
    }

    fn call_request(to: Address, calldata: Bytes) -> TransactionRequest {
        TransactionRequest::default().with_to(to).with_input(calldata)
    }
}

#[async_trait]
impl SigningAgent for EthereumClient {
    async fn dispatch(&self, to: Address, calldata: Bytes) -> Result<TxHash, TransportError> {
        let pending = self
            .provider
            .send_transaction(Self::call_request(to, calldata))
            .await
            .map_err(transport_error)?;

        Ok(*pending.tx_hash())
    }

    fn address(&self) -> Address {
        self.signer
    }
}

#[async_trait]
impl NetworkEndpoint for EthereumClient {
    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<ChainReceipt>, TransportError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(transport_error)?;

        Ok(receipt.map(|r| ChainReceipt {
            transaction_hash: r.transaction_hash(),
            block_number: r.block_number(),
            gas_used: r.gas_used(),
            success: r.status(),
        }))
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, TransportError> {
        self.provider
            .call(Self::call_request(to, calldata))
            .await
            .map_err(transport_error)
    }

    async fn block_number(&self) -> Result<u64, TransportError> {
        self.provider.get_block_number().await.map_err(transport_error)
    }
}

fn transport_error(e: impl std::fmt::Display) -> TransportError {
    TransportError::new(e.to_string())
}
