//! # Services Module
//!
//! Business logic behind the HTTP handlers. There is one service: the
//! transaction submitter, which every contract call goes through.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      TransactionSubmitter                     │
//! │  submit()  ─ write calls: dispatch, confirm, verify status    │
//! │  query()   ─ read calls: eth_call + decode                    │
//! └──────────────────────────────────────────────────────────────┘
//!              │                              │
//!       ┌──────┴───────┐              ┌───────┴────────┐
//!       │ SigningAgent │              │ NetworkEndpoint│
//!       └──────────────┘              └────────────────┘
//! ```

pub mod transaction_submitter;

#[cfg(test)]
pub mod test_support;

pub use transaction_submitter::{
    ConfirmationPolicy, PipelineError, SubmissionError, TransactionSubmitter,
};
