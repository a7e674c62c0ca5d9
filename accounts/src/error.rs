use {
    crate::{AccountId, Balance},
    thiserror::Error,
};

/// Errors returned by the account store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountsError {
    #[error("Account {account} has {available} free, {required} required")]
    InsufficientBalance {
        account: AccountId,
        required: Balance,
        available: Balance,
    },

    #[error("Account {account} has {available} reserved, {required} required")]
    InsufficientReserved {
        account: AccountId,
        required: Balance,
        available: Balance,
    },

    #[error("Balance of account {account} would overflow")]
    BalanceOverflow { account: AccountId },

    #[error("Total issuance would overflow")]
    IssuanceOverflow,

    #[error("Account {account} cannot transfer to itself")]
    SelfTransfer { account: AccountId },
}
