use {
    crate::transaction::TxHash,
    std::{io, path::PathBuf},
    tally_accounts::{AccountId, AccountsError},
    tally_fee_market::{Balance, FeeError},
    thiserror::Error,
};

/// Errors raised while settling an admitted transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error(
        "Insufficient funds at settlement: account {account} owes fee {fee} but has {available}"
    )]
    InsufficientFundsAtSettlement {
        account: AccountId,
        fee: Balance,
        available: Balance,
    },

    #[error("No fee parameters available at height {height}")]
    FeeParameterUnavailable { height: u64 },

    #[error("Transaction {tx_hash} already settled in this block")]
    DuplicateSettlement { tx_hash: TxHash },

    #[error("Admission hold of {held} on account {account} is gone ({reserved} reserved)")]
    HoldMismatch {
        account: AccountId,
        held: Balance,
        reserved: Balance,
    },

    #[error("Fee {fee} for {tx_hash} exceeds its admission hold of {held}")]
    FeeExceedsHold {
        tx_hash: TxHash,
        fee: Balance,
        held: Balance,
    },

    #[error("Transaction {tx_hash} was admitted but never settled")]
    UnsettledAdmission { tx_hash: TxHash },

    #[error("Treasury account {account} cannot pay fees")]
    TreasuryPayer { account: AccountId },

    #[error("Transaction admitted at height {admitted} cannot settle in block {block}")]
    WrongBlock { block: u64, admitted: u64 },

    #[error(transparent)]
    Fee(#[from] FeeError),

    #[error(transparent)]
    Accounts(#[from] AccountsError),
}

impl SettlementError {
    /// Whether this error breaks a settlement invariant. A fatal error aborts
    /// the enclosing block; nothing the block did may be committed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InsufficientFundsAtSettlement { .. }
                | Self::FeeParameterUnavailable { .. }
                | Self::DuplicateSettlement { .. }
                | Self::HoldMismatch { .. }
                | Self::FeeExceedsHold { .. }
                | Self::UnsettledAdmission { .. }
        )
    }
}

/// Reasons a transaction is refused before it reaches execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("Treasury account {account} cannot sign transactions")]
    TreasuryCannotPay { account: AccountId },

    #[error("No fee parameters available at height {height}")]
    FeeParameterUnavailable { height: u64 },

    #[error("Payload of {len} bytes is too large")]
    PayloadTooLarge { len: usize },

    #[error(transparent)]
    Fee(#[from] FeeError),

    #[error(transparent)]
    Accounts(#[from] AccountsError),
}

/// Errors loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Config declares no fee eras")]
    NoEras,

    #[error("Fee eras must start at strictly increasing heights ({previous} then {next})")]
    UnorderedEras { previous: u64, next: u64 },

    #[error("Fee era starting at height {start_height} is invalid: {source}")]
    InvalidEra {
        start_height: u64,
        #[source]
        source: FeeError,
    },

    #[error("Fee adjustment is invalid: {0}")]
    InvalidAdjustment(#[source] FeeError),
}
