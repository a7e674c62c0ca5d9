//! In-memory account store.
//!
//! All mutations go through a single [`RwLock`]. A two-leg transfer is applied
//! under one write guard, so concurrent readers observe either both legs or
//! neither.

use {
    crate::{
        error::AccountsError,
        ledger::{AccountBalance, BalanceLedger, TransferReceipt},
        AccountId, Balance,
    },
    log::{debug, trace},
    parking_lot::RwLock,
    std::collections::{BTreeMap, HashMap},
};

/// Read/write access to account balances, shared by the store and batches.
trait BalanceStorage {
    fn get(&self, id: &AccountId) -> AccountBalance;
    fn put(&mut self, id: AccountId, balance: AccountBalance);
    fn issuance(&self) -> Balance;
    fn set_issuance(&mut self, issuance: Balance);
}

#[derive(Debug, Default)]
struct StoreState {
    accounts: HashMap<AccountId, AccountBalance>,
    total_issuance: Balance,
}

impl BalanceStorage for StoreState {
    fn get(&self, id: &AccountId) -> AccountBalance {
        self.accounts.get(id).copied().unwrap_or_default()
    }

    fn put(&mut self, id: AccountId, balance: AccountBalance) {
        self.accounts.insert(id, balance);
    }

    fn issuance(&self) -> Balance {
        self.total_issuance
    }

    fn set_issuance(&mut self, issuance: Balance) {
        self.total_issuance = issuance;
    }
}

fn mint(
    storage: &mut impl BalanceStorage,
    id: &AccountId,
    amount: Balance,
) -> Result<Balance, AccountsError> {
    let issuance = storage
        .issuance()
        .checked_add(amount)
        .ok_or(AccountsError::IssuanceOverflow)?;
    let mut account = storage.get(id);
    account.free = account
        .free
        .checked_add(amount)
        .ok_or(AccountsError::BalanceOverflow { account: *id })?;
    storage.put(*id, account);
    storage.set_issuance(issuance);
    debug!("minted {amount} to {id}; total issuance {issuance}");
    Ok(account.free)
}

fn transfer(
    storage: &mut impl BalanceStorage,
    from: &AccountId,
    to: &AccountId,
    amount: Balance,
) -> Result<TransferReceipt, AccountsError> {
    if from == to {
        return Err(AccountsError::SelfTransfer { account: *from });
    }
    let mut source = storage.get(from);
    let mut dest = storage.get(to);

    source.free =
        source
            .free
            .checked_sub(amount)
            .ok_or(AccountsError::InsufficientBalance {
                account: *from,
                required: amount,
                available: source.free,
            })?;
    dest.free = dest
        .free
        .checked_add(amount)
        .ok_or(AccountsError::BalanceOverflow { account: *to })?;

    storage.put(*from, source);
    storage.put(*to, dest);
    trace!("transfer {amount} {from} -> {to}");

    Ok(TransferReceipt {
        from: *from,
        to: *to,
        amount,
        from_free_after: source.free,
        to_free_after: dest.free,
    })
}

fn reserve(
    storage: &mut impl BalanceStorage,
    id: &AccountId,
    amount: Balance,
) -> Result<(), AccountsError> {
    let mut account = storage.get(id);
    account.free = account
        .free
        .checked_sub(amount)
        .ok_or(AccountsError::InsufficientBalance {
            account: *id,
            required: amount,
            available: account.free,
        })?;
    account.reserved = account
        .reserved
        .checked_add(amount)
        .ok_or(AccountsError::BalanceOverflow { account: *id })?;
    storage.put(*id, account);
    Ok(())
}

fn unreserve(
    storage: &mut impl BalanceStorage,
    id: &AccountId,
    amount: Balance,
) -> Result<(), AccountsError> {
    let mut account = storage.get(id);
    account.reserved =
        account
            .reserved
            .checked_sub(amount)
            .ok_or(AccountsError::InsufficientReserved {
                account: *id,
                required: amount,
                available: account.reserved,
            })?;
    account.free = account
        .free
        .checked_add(amount)
        .ok_or(AccountsError::BalanceOverflow { account: *id })?;
    storage.put(*id, account);
    Ok(())
}

/// Thread-safe store of account balances and total issuance.
#[derive(Debug, Default)]
pub struct AccountStore {
    state: RwLock<StoreState>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the given genesis endowments.
    pub fn with_endowments<I>(endowments: I) -> Result<Self, AccountsError>
    where
        I: IntoIterator<Item = (AccountId, Balance)>,
    {
        let store = Self::new();
        for (id, amount) in endowments {
            store.mint(&id, amount)?;
        }
        Ok(store)
    }

    /// Endow `id` with newly issued `amount`. Returns the new free balance.
    ///
    /// This is the only operation that changes total issuance.
    pub fn mint(&self, id: &AccountId, amount: Balance) -> Result<Balance, AccountsError> {
        mint(&mut *self.state.write(), id, amount)
    }

    pub fn account(&self, id: &AccountId) -> AccountBalance {
        self.state.read().get(id)
    }

    pub fn free_balance(&self, id: &AccountId) -> Balance {
        self.account(id).free
    }

    pub fn reserved_balance(&self, id: &AccountId) -> Balance {
        self.account(id).reserved
    }

    /// The tracked issuance counter.
    pub fn total_issuance(&self) -> Balance {
        self.state.read().total_issuance
    }

    /// Issuance recomputed as the sum over all accounts.
    pub fn computed_issuance(&self) -> Balance {
        self.state
            .read()
            .accounts
            .values()
            .fold(0, |sum: Balance, account| {
                sum.saturating_add(account.free)
                    .saturating_add(account.reserved)
            })
    }

    pub fn len(&self) -> usize {
        self.state.read().accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().accounts.is_empty()
    }

    /// Point-in-time copy of every account, ordered by id.
    pub fn snapshot(&self) -> BTreeMap<AccountId, AccountBalance> {
        self.state
            .read()
            .accounts
            .iter()
            .map(|(id, balance)| (*id, *balance))
            .collect()
    }

    pub fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Balance,
    ) -> Result<TransferReceipt, AccountsError> {
        transfer(&mut *self.state.write(), from, to, amount)
    }

    pub fn reserve(&self, id: &AccountId, amount: Balance) -> Result<(), AccountsError> {
        reserve(&mut *self.state.write(), id, amount)
    }

    pub fn unreserve(&self, id: &AccountId, amount: Balance) -> Result<(), AccountsError> {
        unreserve(&mut *self.state.write(), id, amount)
    }

    /// Run `f` against a staging batch and commit its changes only if it
    /// returns `Ok`.
    ///
    /// The write lock is held for the whole call, so other writers wait and
    /// readers never see a partially applied batch.
    pub fn batch<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut AccountBatch<'_>) -> Result<T, E>,
    {
        let mut guard = self.state.write();
        let (result, changes, total_issuance) = {
            let mut batch = AccountBatch {
                base: &*guard,
                changes: HashMap::new(),
                total_issuance: guard.total_issuance,
            };
            let result = f(&mut batch);
            let AccountBatch {
                changes,
                total_issuance,
                ..
            } = batch;
            (result, changes, total_issuance)
        };

        if result.is_ok() {
            trace!("committing batch of {} account changes", changes.len());
            guard.accounts.extend(changes);
            guard.total_issuance = total_issuance;
        }
        result
    }
}

/// Staged changes over an [`AccountStore`], created by [`AccountStore::batch`].
pub struct AccountBatch<'a> {
    base: &'a StoreState,
    changes: HashMap<AccountId, AccountBalance>,
    total_issuance: Balance,
}

impl AccountBatch<'_> {
    pub fn account(&self, id: &AccountId) -> AccountBalance {
        self.get(id)
    }

    /// Number of accounts touched so far.
    pub fn touched(&self) -> usize {
        self.changes.len()
    }
}

impl BalanceStorage for AccountBatch<'_> {
    fn get(&self, id: &AccountId) -> AccountBalance {
        self.changes
            .get(id)
            .copied()
            .unwrap_or_else(|| self.base.get(id))
    }

    fn put(&mut self, id: AccountId, balance: AccountBalance) {
        self.changes.insert(id, balance);
    }

    fn issuance(&self) -> Balance {
        self.total_issuance
    }

    fn set_issuance(&mut self, issuance: Balance) {
        self.total_issuance = issuance;
    }
}

impl BalanceLedger for AccountBatch<'_> {
    fn free_balance(&self, id: &AccountId) -> Balance {
        self.get(id).free
    }

    fn reserved_balance(&self, id: &AccountId) -> Balance {
        self.get(id).reserved
    }

    fn total_issuance(&self) -> Balance {
        self.total_issuance
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Balance,
    ) -> Result<TransferReceipt, AccountsError> {
        transfer(self, from, to, amount)
    }

    fn reserve(&mut self, id: &AccountId, amount: Balance) -> Result<(), AccountsError> {
        reserve(self, id, amount)
    }

    fn unreserve(&mut self, id: &AccountId, amount: Balance) -> Result<(), AccountsError> {
        unreserve(self, id, amount)
    }
}
