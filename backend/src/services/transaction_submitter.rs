//! # Transaction Submitter Service
//!
//! Every write endpoint funnels through [`TransactionSubmitter::submit`]:
//! encode the call, have the signing agent sign and broadcast it, wait
//! for the receipt, check its status.
//!
//! ## States
//!
//! ```text
//!  Dispatch ──ok──▶ Awaiting Confirmation ──receipt──▶ Verify Status ──success──▶ Completed
//!     │                     │                               │
//!     ▼                     ▼                               ▼
//!  SubmissionError    ConfirmationError              ExecutionReverted
//! ```
//!
//! Every failure is terminal. Nothing is retried here; a caller that
//! wants retries has to resubmit.
//!
//! ## Non-idempotence
//!
//! Once Dispatch succeeds the transaction is on the network and may move
//! value regardless of what happens to this invocation. A
//! [`ConfirmationError`] means the outcome is unknown, not that the
//! transaction failed. Dropping the `submit` future only stops the local
//! wait; it never cancels the transaction.
//!
//! Read-only methods go through [`TransactionSubmitter::query`], which
//! issues an `eth_call` and never creates a transaction.

use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy_primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::contracts::{AbiError, BoundContract, CallDescription, CallOutput, EncodedCall};

/// Failure reported by the signing agent or the network endpoint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Receipt fields the pipeline relies on, as reported by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReceipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// `false` when the transaction was mined but its execution reverted.
    pub success: bool,
}

/// Holds the signing key and broadcasts signed transactions.
///
/// Implementations fill in nonce, gas and chain id themselves. A
/// simulation-time revert surfaces here as an error.
#[async_trait]
pub trait SigningAgent: Send + Sync {
    /// Sign a transaction calling `to` with `calldata` and broadcast it.
    async fn dispatch(&self, to: Address, calldata: Bytes) -> Result<TxHash, TransportError>;

    /// Account that signs and pays for transactions.
    fn address(&self) -> Address;
}

/// Read access to the ledger.
#[async_trait]
pub trait NetworkEndpoint: Send + Sync {
    /// Receipt for `tx_hash`, or `None` while it is not yet mined.
    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<ChainReceipt>, TransportError>;

    /// Execute a read-only call against the latest block.
    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, TransportError>;

    /// Latest block number, used as a liveness probe.
    async fn block_number(&self) -> Result<u64, TransportError>;
}

/// The transaction never made it onto the network.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The call does not fit the bound contract interface.
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// The signing agent or endpoint refused the call.
    #[error("{method} rejected: {source}")]
    Rejected {
        method: String,
        source: TransportError,
    },
}

impl SubmissionError {
    /// Whether the caller sent a call that could never be encoded.
    pub fn is_malformed_call(&self) -> bool {
        matches!(
            self,
            SubmissionError::Abi(
                AbiError::UnknownMethod { .. }
                    | AbiError::ArgumentCount { .. }
                    | AbiError::InvalidArgument { .. }
            )
        )
    }
}

/// The pipeline lost track of a dispatched transaction.
///
/// The transaction may still be mined, successfully or not.
#[derive(Debug, Error)]
pub enum ConfirmationError {
    #[error("no receipt for {tx_hash} within {timeout:?}; outcome unknown, it may still be mined")]
    TimedOut { tx_hash: TxHash, timeout: Duration },

    #[error("lost track of {tx_hash}: {source}; outcome unknown, it may still be mined")]
    Provider {
        tx_hash: TxHash,
        source: TransportError,
    },
}

impl ConfirmationError {
    pub fn tx_hash(&self) -> TxHash {
        match self {
            ConfirmationError::TimedOut { tx_hash, .. } => *tx_hash,
            ConfirmationError::Provider { tx_hash, .. } => *tx_hash,
        }
    }
}

/// Terminal failure of one `submit` invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Submission failed: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Confirmation failed: {0}")]
    Confirmation(#[from] ConfirmationError),

    /// Mined, but execution reverted. Recorded on-chain; never retried.
    #[error("Transaction {tx_hash} was mined but execution reverted")]
    ExecutionReverted {
        tx_hash: TxHash,
        block_number: Option<u64>,
    },
}

/// Status of a confirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Reverted,
}

/// Confirmed outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// 0x-prefixed transaction hash.
    pub transaction_hash: String,
    pub status: TxStatus,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

impl From<ChainReceipt> for Receipt {
    fn from(receipt: ChainReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash.to_string(),
            status: if receipt.success {
                TxStatus::Success
            } else {
                TxStatus::Reverted
            },
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        }
    }
}

/// Handle to a transaction the signing agent has broadcast.
///
/// Owned by the invocation that dispatched it and never shared.
#[derive(Debug)]
pub struct SubmittedTransaction {
    tx_hash: TxHash,
    method: String,
    dispatched_at: Instant,
}

/// Bounds on the Awaiting Confirmation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Give up waiting after this long.
    pub timeout: Duration,

    /// Delay between receipt polls.
    pub poll_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(2),
        }
    }
}

impl From<&AppConfig> for ConfirmationPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout: config.confirmation_timeout,
            poll_interval: config.receipt_poll_interval,
        }
    }
}

/// Transaction Submitter service.
///
/// Cheap to clone; clones share the same agent and endpoint. There is
/// no state between invocations, so concurrent calls never coalesce:
/// two identical requests produce two transactions.
#[derive(Clone)]
pub struct TransactionSubmitter {
    agent: Arc<dyn SigningAgent>,
    endpoint: Arc<dyn NetworkEndpoint>,
    policy: ConfirmationPolicy,
}

impl TransactionSubmitter {
    /// Create a new TransactionSubmitter.
    pub fn new(
        agent: Arc<dyn SigningAgent>,
        endpoint: Arc<dyn NetworkEndpoint>,
        policy: ConfirmationPolicy,
    ) -> Self {
        Self {
            agent,
            endpoint,
            policy,
        }
    }

    pub fn policy(&self) -> ConfirmationPolicy {
        self.policy
    }

    pub fn signer_address(&self) -> Address {
        self.agent.address()
    }

    /// Submit `call` to `contract` and wait for it to be mined.
    ///
    /// ## Returns
    ///
    /// * `Ok(Receipt)` - mined with a success status
    /// * `Err(PipelineError::Submission)` - never accepted by the network
    /// * `Err(PipelineError::Confirmation)` - dispatched, outcome unknown
    /// * `Err(PipelineError::ExecutionReverted)` - mined and reverted
    pub async fn submit(
        &self,
        contract: &BoundContract,
        call: &CallDescription,
    ) -> Result<Receipt, PipelineError> {
        let span = info_span!(
            "submit",
            invocation = %Uuid::new_v4(),
            contract = contract.name(),
            method = call.method(),
        );

        self.run(contract, call).instrument(span).await
    }

    /// Execute a read-only `call` and decode its outputs.
    pub async fn query(
        &self,
        contract: &BoundContract,
        call: &CallDescription,
    ) -> Result<CallOutput, SubmissionError> {
        let encoded = contract.encode(call)?;
        debug!("eth_call {}.{}", contract.name(), encoded.method);

        let data = self
            .endpoint
            .call(encoded.to, encoded.calldata)
            .await
            .map_err(|source| SubmissionError::Rejected {
                method: encoded.method.clone(),
                source,
            })?;

        Ok(contract.decode_output(call.method(), &data)?)
    }

    /// Latest block number seen by the endpoint.
    pub async fn latest_block(&self) -> Result<u64, TransportError> {
        self.endpoint.block_number().await
    }

    async fn run(
        &self,
        contract: &BoundContract,
        call: &CallDescription,
    ) -> Result<Receipt, PipelineError> {
        let encoded = contract.encode(call).map_err(SubmissionError::from)?;
        let submitted = self.dispatch(encoded).await?;
        let receipt = self.await_confirmation(&submitted).await?;
        Self::verify_status(&submitted, receipt)
    }

    /// Dispatch state: sign and broadcast.
    async fn dispatch(&self, encoded: EncodedCall) -> Result<SubmittedTransaction, SubmissionError> {
        let EncodedCall { to, calldata, method } = encoded;

        match self.agent.dispatch(to, calldata).await {
            Ok(tx_hash) => {
                info!("📤 {} dispatched: {}", method, tx_hash);
                Ok(SubmittedTransaction {
                    tx_hash,
                    method,
                    dispatched_at: Instant::now(),
                })
            }
            Err(source) => {
                warn!("{} was not accepted by the network: {}", method, source);
                Err(SubmissionError::Rejected { method, source })
            }
        }
    }

    /// Awaiting Confirmation state: poll until mined, bounded by the policy.
    async fn await_confirmation(
        &self,
        submitted: &SubmittedTransaction,
    ) -> Result<ChainReceipt, ConfirmationError> {
        let tx_hash = submitted.tx_hash;

        let poll = async {
            loop {
                match self.endpoint.receipt(tx_hash).await {
                    Ok(Some(receipt)) => return Ok(receipt),
                    Ok(None) => {
                        debug!("{} not mined yet", tx_hash);
                        tokio::time::sleep(self.policy.poll_interval).await;
                    }
                    Err(source) => return Err(ConfirmationError::Provider { tx_hash, source }),
                }
            }
        };

        match tokio::time::timeout(self.policy.timeout, poll).await {
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(e)) => {
                warn!("⚠️ {}", e);
                Err(e)
            }
            Err(_) => {
                let e = ConfirmationError::TimedOut {
                    tx_hash,
                    timeout: self.policy.timeout,
                };
                warn!("⚠️ {}", e);
                Err(e)
            }
        }
    }

    /// Verify Status state.
    fn verify_status(
        submitted: &SubmittedTransaction,
        receipt: ChainReceipt,
    ) -> Result<Receipt, PipelineError> {
        if !receipt.success {
            warn!(
                "❌ {} ({}) reverted in block {:?}",
                submitted.method, submitted.tx_hash, receipt.block_number
            );
            return Err(PipelineError::ExecutionReverted {
                tx_hash: submitted.tx_hash,
                block_number: receipt.block_number,
            });
        }

        info!(
            "✅ {} confirmed in block {:?} after {:?}: {}",
            submitted.method,
            receipt.block_number,
            submitted.dispatched_at.elapsed(),
            submitted.tx_hash
        );
        Ok(Receipt::from(receipt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::CallArg;
    use crate::services::test_support::{FakeAgent, FakeEndpoint, ReceiptMode};
    use alloy_dyn_abi::DynSolValue;
    use alloy_primitives::U256;

    const ACCOUNT: &str = "0x00000000000000000000000000000000000000ab";

    fn token() -> BoundContract {
        BoundContract::option_token(Address::repeat_byte(0x11)).unwrap()
    }

    fn burn() -> CallDescription {
        CallDescription::new("burn", vec![ACCOUNT.into(), "100".into()])
    }

    fn submitter(agent: &Arc<FakeAgent>, endpoint: &Arc<FakeEndpoint>) -> TransactionSubmitter {
        TransactionSubmitter::new(
            agent.clone(),
            endpoint.clone(),
            ConfirmationPolicy {
                timeout: Duration::from_secs(30),
                poll_interval: Duration::from_secs(1),
            },
        )
    }

    #[tokio::test]
    async fn test_burn_completes_with_receipt() {
        let agent = Arc::new(FakeAgent::new());
        let endpoint = Arc::new(FakeEndpoint::new(ReceiptMode::Success));

        let receipt = submitter(&agent, &endpoint).submit(&token(), &burn()).await.unwrap();

        assert_eq!(receipt.status, TxStatus::Success);
        assert!(receipt.transaction_hash.starts_with("0x"));
        assert_eq!(receipt.transaction_hash.len(), 66);

        let dispatched = agent.dispatched();
        assert_eq!(dispatched.len(), 1);
        let expected = token().encode(&burn()).unwrap();
        assert_eq!(dispatched[0].0, expected.to);
        assert_eq!(dispatched[0].1, expected.calldata);
    }

    #[tokio::test(start_paused = true)]
    async fn test_receipt_found_after_several_polls() {
        let agent = Arc::new(FakeAgent::new());
        let endpoint = Arc::new(FakeEndpoint::new(ReceiptMode::AfterPolls(3)));

        let receipt = submitter(&agent, &endpoint).submit(&token(), &burn()).await;

        assert!(receipt.is_ok());
        assert_eq!(endpoint.receipt_polls(), 4);
    }

    #[tokio::test]
    async fn test_network_outage_is_submission_error() {
        let agent = Arc::new(FakeAgent::failing("connection refused"));
        let endpoint = Arc::new(FakeEndpoint::new(ReceiptMode::Success));

        let err = submitter(&agent, &endpoint)
            .submit(&token(), &burn())
            .await
            .unwrap_err();

        match err {
            PipelineError::Submission(SubmissionError::Rejected { method, source }) => {
                assert_eq!(method, "burn");
                assert_eq!(source.0, "connection refused");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(endpoint.receipt_polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_timeout_after_dispatch() {
        let agent = Arc::new(FakeAgent::new());
        let endpoint = Arc::new(FakeEndpoint::new(ReceiptMode::Never));

        let err = submitter(&agent, &endpoint)
            .submit(&token(), &burn())
            .await
            .unwrap_err();

        match err {
            PipelineError::Confirmation(ConfirmationError::TimedOut { timeout, .. }) => {
                assert_eq!(timeout, Duration::from_secs(30));
            }
            other => panic!("unexpected: {other:?}"),
        }
        // The transaction was broadcast; the timeout says nothing about its fate.
        assert_eq!(agent.dispatched().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_error_while_waiting() {
        let agent = Arc::new(FakeAgent::new());
        let endpoint = Arc::new(FakeEndpoint::new(ReceiptMode::Error("socket closed".into())));

        let err = submitter(&agent, &endpoint)
            .submit(&token(), &burn())
            .await
            .unwrap_err();

        match err {
            PipelineError::Confirmation(e @ ConfirmationError::Provider { .. }) => {
                assert_eq!(e.tx_hash(), agent.dispatched()[0].2);
                assert!(e.to_string().contains("may still be mined"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(endpoint.receipt_polls(), 1);
    }

    #[tokio::test]
    async fn test_reverted_execution_is_terminal() {
        let agent = Arc::new(FakeAgent::new());
        let endpoint = Arc::new(FakeEndpoint::new(ReceiptMode::Reverted));

        let err = submitter(&agent, &endpoint)
            .submit(&token(), &burn())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::ExecutionReverted { block_number: Some(_), .. }));
        assert_eq!(agent.dispatched().len(), 1);
        assert_eq!(endpoint.receipt_polls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_method_never_reaches_network() {
        let agent = Arc::new(FakeAgent::new());
        let endpoint = Arc::new(FakeEndpoint::new(ReceiptMode::Success));
        let call = CallDescription::new("mintForFree", vec![ACCOUNT.into()]);

        let err = submitter(&agent, &endpoint)
            .submit(&token(), &call)
            .await
            .unwrap_err();

        match err {
            PipelineError::Submission(e) => assert!(e.is_malformed_call()),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(agent.dispatched().is_empty());
        assert_eq!(endpoint.receipt_polls(), 0);
    }

    #[tokio::test]
    async fn test_argument_count_mismatch_never_reaches_network() {
        let agent = Arc::new(FakeAgent::new());
        let endpoint = Arc::new(FakeEndpoint::new(ReceiptMode::Success));
        let call = CallDescription::new("burn", vec![CallArg::from(ACCOUNT)]);

        let err = submitter(&agent, &endpoint)
            .submit(&token(), &call)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Submission(SubmissionError::Abi(AbiError::ArgumentCount { .. }))
        ));
        assert!(agent.dispatched().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_identical_calls_are_not_coalesced() {
        let agent = Arc::new(FakeAgent::new());
        let endpoint = Arc::new(FakeEndpoint::new(ReceiptMode::Success));
        let submitter = submitter(&agent, &endpoint);
        let contract = token();
        let call = burn();

        let results = futures::future::join_all(
            (0..3).map(|_| submitter.submit(&contract, &call)),
        )
        .await;

        let mut hashes: Vec<String> = results
            .into_iter()
            .map(|r| r.unwrap().transaction_hash)
            .collect();
        hashes.sort();
        hashes.dedup();
        assert_eq!(hashes.len(), 3);

        let dispatched = agent.dispatched();
        assert_eq!(dispatched.len(), 3);
        assert!(dispatched.iter().all(|(_, calldata, _)| calldata == &dispatched[0].1));
    }

    #[tokio::test]
    async fn test_query_decodes_outputs() {
        let agent = Arc::new(FakeAgent::new());
        let endpoint = Arc::new(FakeEndpoint::new(ReceiptMode::Success));
        endpoint.set_call_result(Ok(DynSolValue::Tuple(vec![DynSolValue::Uint(
            U256::from(1_850u64),
            256,
        )])
        .abi_encode_params()
        .into()));

        let output = submitter(&agent, &endpoint)
            .query(&token(), &CallDescription::no_args("getAsset1Price"))
            .await
            .unwrap();

        assert_eq!(output.get("price"), Some(&serde_json::json!("1850")));
        assert!(agent.dispatched().is_empty());
        assert_eq!(endpoint.eth_calls(), 1);
    }

    #[tokio::test]
    async fn test_query_rejection() {
        let agent = Arc::new(FakeAgent::new());
        let endpoint = Arc::new(FakeEndpoint::new(ReceiptMode::Success));
        endpoint.set_call_result(Err(TransportError::new("execution reverted")));

        let err = submitter(&agent, &endpoint)
            .query(&token(), &CallDescription::no_args("getAsset1Price"))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::Rejected { .. }));
        assert!(!err.is_malformed_call());
    }

    #[test]
    fn test_receipt_from_chain_receipt() {
        let receipt = Receipt::from(ChainReceipt {
            transaction_hash: TxHash::repeat_byte(0x01),
            block_number: Some(7),
            gas_used: 21_000,
            success: true,
        });

        assert_eq!(receipt.status, TxStatus::Success);
        assert_eq!(receipt.transaction_hash, format!("0x{}", "01".repeat(32)));
        assert_eq!(receipt.block_number, Some(7));
    }
}
