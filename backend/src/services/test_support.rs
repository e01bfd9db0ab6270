//! In-memory signing agent and network endpoint for tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use alloy_primitives::{Address, Bytes, TxHash, B256};
use async_trait::async_trait;

use super::transaction_submitter::{ChainReceipt, NetworkEndpoint, SigningAgent, TransportError};

/// Signing agent that hands out sequential hashes and records dispatches.
#[derive(Debug, Default)]
pub struct FakeAgent {
    /// Error to return from every dispatch, if set.
    fail_with: Option<String>,
    /// Number of successful dispatches so far.
    sequence: AtomicU64,
    /// `(to, calldata, hash)` per successful dispatch.
    dispatched: Mutex<Vec<(Address, Bytes, TxHash)>>,
}

impl FakeAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn dispatched(&self) -> Vec<(Address, Bytes, TxHash)> {
        self.dispatched.lock().unwrap().clone()
    }
}

#[async_trait]
impl SigningAgent for FakeAgent {
    async fn dispatch(&self, to: Address, calldata: Bytes) -> Result<TxHash, TransportError> {
        if let Some(message) = &self.fail_with {
            return Err(TransportError::new(message.clone()));
        }

        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let tx_hash = B256::left_padding_from(&n.to_be_bytes());
        self.dispatched.lock().unwrap().push((to, calldata, tx_hash));
        Ok(tx_hash)
    }

    fn address(&self) -> Address {
        Address::repeat_byte(0xee)
    }
}

/// How [`FakeEndpoint`] answers receipt polls.
#[derive(Debug, Clone)]
pub enum ReceiptMode {
    /// Mined with success on the first poll.
    Success,
    /// Mined with a reverted status on the first poll.
    Reverted,
    /// Never mined.
    Never,
    /// Not mined for the first `n` polls, then mined with success.
    AfterPolls(u64),
    /// Every poll fails.
    Error(String),
}

/// Network endpoint with scripted receipts and `eth_call` results.
#[derive(Debug)]
pub struct FakeEndpoint {
    mode: ReceiptMode,
    polls: AtomicU64,
    eth_calls: AtomicU64,
    call_result: Mutex<Result<Bytes, TransportError>>,
}

impl FakeEndpoint {
    pub fn new(mode: ReceiptMode) -> Self {
        Self {
            mode,
            polls: AtomicU64::new(0),
            eth_calls: AtomicU64::new(0),
            call_result: Mutex::new(Ok(Bytes::new())),
        }
    }

    pub fn set_call_result(&self, result: Result<Bytes, TransportError>) {
        *self.call_result.lock().unwrap() = result;
    }

    pub fn receipt_polls(&self) -> u64 {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn eth_calls(&self) -> u64 {
        self.eth_calls.load(Ordering::SeqCst)
    }

    fn mined(tx_hash: TxHash, success: bool) -> ChainReceipt {
        ChainReceipt {
            transaction_hash: tx_hash,
            block_number: Some(5_000_000),
            gas_used: 52_000,
            success,
        }
    }
}

#[async_trait]
impl NetworkEndpoint for FakeEndpoint {
    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<ChainReceipt>, TransportError> {
        let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;

        match &self.mode {
            ReceiptMode::Success => Ok(Some(Self::mined(tx_hash, true))),
            ReceiptMode::Reverted => Ok(Some(Self::mined(tx_hash, false))),
            ReceiptMode::Never => Ok(None),
            ReceiptMode::AfterPolls(n) if poll <= *n => Ok(None),
            ReceiptMode::AfterPolls(_) => Ok(Some(Self::mined(tx_hash, true))),
            ReceiptMode::Error(message) => Err(TransportError::new(message.clone())),
        }
    }

    async fn call(&self, _to: Address, _calldata: Bytes) -> Result<Bytes, TransportError> {
        self.eth_calls.fetch_add(1, Ordering::SeqCst);
        self.call_result.lock().unwrap().clone()
    }

    async fn block_number(&self) -> Result<u64, TransportError> {
        match &self.mode {
            ReceiptMode::Error(message) => Err(TransportError::new(message.clone())),
            _ => Ok(5_000_000),
        }
    }
}
