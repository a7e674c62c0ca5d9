//! Property-based tests for fee settlement against the account store.
//!
//! Properties tested:
//! 1. Settlement never changes total issuance
//! 2. The payer loses exactly the fee and the treasury gains exactly the fee
//! 3. A failed call is charged the same fee as a successful one
//! 4. A block aborted by a fatal error leaves every balance untouched
//! 5. No hold survives settlement

#[cfg(test)]
mod tests {
    use {
        proptest::prelude::*,
        tally_accounts::{AccountId, AccountStore, BalanceLedger},
        tally_fee_market::{Balance, FeeParameters, FeeSchedule, Weight, UNIT},
        tally_settlement::{
            treasury_account, DispatchError, ExecutionReport, FeeSettlementEngine,
            SettlementError, Transaction,
        },
    };

    const PAYERS: usize = 4;
    const ENDOWMENT: Balance = 1_000 * UNIT;

    #[derive(Debug, Clone)]
    struct TxSpec {
        payer: usize,
        weight_limit: Weight,
        actual_weight: Weight,
        payload_len: usize,
        tip: Balance,
        succeeds: bool,
    }

    prop_compose! {
        fn tx_spec()(
            payer in 0..PAYERS,
            weight_limit in 0..=10_000_000_000u64,
            actual_weight in 0..=20_000_000_000u64,
            payload_len in 0..=256usize,
            tip in 0..=1_000_000_000_000u128,
            succeeds in any::<bool>(),
        ) -> TxSpec {
            TxSpec { payer, weight_limit, actual_weight, payload_len, tip, succeeds }
        }
    }

    fn engine() -> FeeSettlementEngine<FeeSchedule> {
        FeeSettlementEngine::new(
            FeeSchedule::with_genesis(FeeParameters::default()).unwrap(),
            treasury_account(),
        )
    }

    fn payers() -> Vec<AccountId> {
        (0..PAYERS)
            .map(|i| AccountId::from_dev_seed(&format!("payer-{i}")))
            .collect()
    }

    fn funded_store(payers: &[AccountId]) -> AccountStore {
        AccountStore::with_endowments(payers.iter().map(|payer| (*payer, ENDOWMENT))).unwrap()
    }

    fn transaction(payers: &[AccountId], nonce: u64, spec: &TxSpec) -> Transaction {
        Transaction::new(
            payers[spec.payer],
            nonce,
            spec.weight_limit,
            vec![7; spec.payload_len],
        )
        .with_tip(spec.tip)
    }

    fn report(spec: &TxSpec) -> ExecutionReport {
        if spec.succeeds {
            ExecutionReport::success(spec.actual_weight)
        } else {
            ExecutionReport::failure(DispatchError::BadOrigin, spec.actual_weight)
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn settlement_conserves_issuance_and_moves_exact_fee(
            specs in proptest::collection::vec(tx_spec(), 1..48),
        ) {
            let engine = engine();
            let payers = payers();
            let store = funded_store(&payers);
            let treasury = *engine.treasury();

            let total_fees = store
                .batch(|batch| -> Result<Balance, TestCaseError> {
                    let mut block = engine.begin_block(0);
                    for (nonce, spec) in specs.iter().enumerate() {
                        let tx = transaction(&payers, nonce as u64, spec);
                        let payer_before = batch.free_balance(&tx.signer);
                        let treasury_before = batch.free_balance(&treasury);

                        let admission = block.admit(batch, &tx).unwrap();
                        let receipt = block.settle(batch, &admission, &report(spec)).unwrap();
                        let fee = receipt.fee.total_fee;

                        prop_assert_eq!(batch.free_balance(&tx.signer), payer_before - fee);
                        prop_assert_eq!(batch.free_balance(&treasury), treasury_before + fee);
                        prop_assert_eq!(receipt.result.payer_balance_after, payer_before - fee);
                        prop_assert_eq!(receipt.result.treasury_balance_after, treasury_before + fee);
                        prop_assert_eq!(batch.reserved_balance(&tx.signer), 0);
                        prop_assert!(receipt.weight_charged <= spec.weight_limit);
                        prop_assert!(fee <= admission.held);
                    }
                    let summary = block
                        .finish()
                        .map_err(|err| TestCaseError::fail(err.to_string()))?;
                    Ok(summary.total_fees)
                })?;

            prop_assert_eq!(store.total_issuance(), PAYERS as Balance * ENDOWMENT);
            prop_assert_eq!(store.computed_issuance(), store.total_issuance());
            prop_assert_eq!(store.free_balance(&treasury), total_fees);
            let paid: Balance = payers
                .iter()
                .map(|payer| ENDOWMENT - store.free_balance(payer))
                .sum();
            prop_assert_eq!(paid, total_fees);
        }

        #[test]
        fn failed_call_pays_the_same_fee(spec in tx_spec()) {
            let engine = engine();
            let payers = payers();

            let settle = |succeeds: bool| {
                let store = funded_store(&payers);
                let spec = TxSpec { succeeds, ..spec.clone() };
                let tx = transaction(&payers, 0, &spec);
                store
                    .batch(|batch| -> Result<_, SettlementError> {
                        let admission = engine.admit(batch, 0, &tx).unwrap();
                        engine.settle_on_outcome(batch, &admission, &report(&spec))
                    })
                    .unwrap()
            };

            let ok = settle(true);
            let failed = settle(false);
            prop_assert!(ok.outcome.is_success());
            prop_assert!(!failed.outcome.is_success());
            prop_assert_eq!(ok.fee, failed.fee);
            prop_assert_eq!(ok.result.payer_balance_after, failed.result.payer_balance_after);
        }

        #[test]
        fn aborted_block_leaves_store_untouched(
            specs in proptest::collection::vec(tx_spec(), 1..24),
            abort_after in 0..24usize,
        ) {
            let engine = engine();
            let payers = payers();
            let store = funded_store(&payers);
            let before = store.snapshot();

            let result = store.batch(|batch| -> Result<(), SettlementError> {
                let mut block = engine.begin_block(0);
                for (nonce, spec) in specs.iter().enumerate() {
                    let tx = transaction(&payers, nonce as u64, spec);
                    let admission = block.admit(batch, &tx).unwrap();
                    block.settle(batch, &admission, &report(spec))?;
                    if nonce == abort_after.min(specs.len() - 1) {
                        // Settling the same admission again is fatal.
                        block.settle(batch, &admission, &report(spec))?;
                    }
                }
                Ok(())
            });

            let is_duplicate = matches!(result, Err(SettlementError::DuplicateSettlement { .. }));
            prop_assert!(is_duplicate);
            prop_assert_eq!(store.snapshot(), before);
            prop_assert_eq!(store.total_issuance(), PAYERS as Balance * ENDOWMENT);
        }
    }
}
