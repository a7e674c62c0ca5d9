//! # Tally Accounts
//!
//! The account store settlement runs against: free and reserved balances per
//! [`AccountId`], a tracked total issuance, and an atomic two-leg
//! [`transfer`](BalanceLedger::transfer).
//!
//! Only [`AccountStore::mint`] changes total issuance. Transfers and holds
//! move value between accounts or between an account's free and reserved
//! balance, so `total_issuance() == computed_issuance()` holds after every
//! operation.

pub mod account_id;
pub mod error;
pub mod ledger;
pub mod store;

pub use {
    account_id::{AccountId, ParseAccountIdError},
    error::AccountsError,
    ledger::{AccountBalance, BalanceLedger, TransferReceipt},
    store::{AccountBatch, AccountStore},
};

/// Balance in the smallest indivisible unit.
pub type Balance = u128;
