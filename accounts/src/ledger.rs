use {
    crate::{error::AccountsError, AccountId, Balance},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

/// Balances held by one account.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct AccountBalance {
    /// Spendable balance.
    pub free: Balance,
    /// Balance on hold; still counted in total issuance.
    pub reserved: Balance,
}

impl AccountBalance {
    pub const fn new(free: Balance) -> Self {
        Self { free, reserved: 0 }
    }

    /// `free + reserved`, or `None` on overflow.
    pub fn total(&self) -> Option<Balance> {
        self.free.checked_add(self.reserved)
    }

    pub fn is_empty(&self) -> bool {
        self.free == 0 && self.reserved == 0
    }
}

/// Outcome of a completed two-leg transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Balance,
    /// Free balance of `from` after the debit.
    pub from_free_after: Balance,
    /// Free balance of `to` after the credit.
    pub to_free_after: Balance,
}

/// Balance mutation surface used by settlement and call execution.
///
/// Every mutation is all-or-nothing: on `Err` no balance has changed.
pub trait BalanceLedger {
    fn free_balance(&self, id: &AccountId) -> Balance;

    fn reserved_balance(&self, id: &AccountId) -> Balance;

    fn total_issuance(&self) -> Balance;

    /// Move `amount` of free balance from `from` to `to`.
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Balance,
    ) -> Result<TransferReceipt, AccountsError>;

    /// Move `amount` from free to reserved on `id`.
    fn reserve(&mut self, id: &AccountId, amount: Balance) -> Result<(), AccountsError>;

    /// Move `amount` from reserved back to free on `id`.
    fn unreserve(&mut self, id: &AccountId, amount: Balance) -> Result<(), AccountsError>;
}
