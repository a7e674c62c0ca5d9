//! # Tally Settlement
//!
//! The fee settlement engine. For every admitted transaction it deducts a
//! deterministic fee from the signer and credits it to the treasury, whether
//! the transaction's call succeeded or failed. Total issuance is never
//! changed by settlement.
//!
//! - [`engine`]: admission holds, `settle`, and `settle_on_outcome`.
//! - [`block`]: per-block settlement sessions and summaries.
//! - [`config`]: YAML engine configuration.
//!
//! A block is settled inside [`AccountStore::batch`](tally_accounts::AccountStore::batch):
//! a fatal [`SettlementError`] returned from the batch closure discards every
//! balance change the block made.

pub mod block;
pub mod config;
pub mod engine;
pub mod error;
pub mod transaction;

pub use {
    block::{BlockSettlement, BlockSettlementSummary},
    config::{EngineConfig, EraConfig},
    engine::{Admission, FeeSettlementEngine, SettlementReceipt, SettlementResult},
    error::{AdmissionError, ConfigError, SettlementError},
    transaction::{
        DispatchError, DispatchOutcome, ExecutionReport, Transaction, TxHash, SIGNED_ENVELOPE_LEN,
    },
};

use tally_accounts::AccountId;

/// Module id the treasury account is derived from.
pub const TREASURY_MODULE_ID: [u8; 8] = *b"py/trsry";

/// The default treasury account.
pub fn treasury_account() -> AccountId {
    AccountId::from_module_id(&TREASURY_MODULE_ID)
}
