//! Shared helpers for Tally benchmarks.

use {
    rand::Rng,
    tally_accounts::{AccountId, AccountStore},
    tally_fee_market::{weights, Balance, FeeParameters, FeeSchedule, UNIT},
    tally_settlement::{treasury_account, FeeSettlementEngine, Transaction},
};

/// Engine over the genesis fee parameters.
pub fn genesis_engine() -> FeeSettlementEngine<FeeSchedule> {
    let schedule = FeeSchedule::with_genesis(FeeParameters::default())
        .expect("genesis parameters are valid");
    FeeSettlementEngine::new(schedule, treasury_account())
}

/// `n` accounts holding `balance` each.
pub fn funded_store(n: usize, balance: Balance) -> (AccountStore, Vec<AccountId>) {
    let accounts: Vec<AccountId> = (0..n).map(|_| AccountId::new_unique()).collect();
    let store = AccountStore::with_endowments(accounts.iter().map(|a| (*a, balance)))
        .expect("endowments fit in the issuance");
    (store, accounts)
}

/// `n` balance-transfer-sized transactions spread over `signers`, with
/// payload lengths jittered around the reference 49 bytes.
pub fn random_transactions(n: usize, signers: &[AccountId]) -> Vec<Transaction> {
    let mut rng = rand::rng();
    (0..n)
        .map(|i| {
            let signer = signers[i % signers.len()];
            let payload_len = rng.random_range(32..=96);
            Transaction::new(
                signer,
                i as u64,
                weights::balances::transfer(),
                vec![0; payload_len],
            )
            .with_tip(rng.random_range(0..=UNIT / 1_000))
        })
        .collect()
}
