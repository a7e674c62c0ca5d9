//! Fuzz block settlement with random transactions and execution reports.
//!
//! Goals:
//! - Find panics in admission, settlement, or the account-store batch.
//! - Verify total issuance never changes.
//! - Verify every settled fee moved from its payer to the treasury.
//! - Verify an aborted block leaves no balance change behind.

#![no_main]

use {
    arbitrary::Arbitrary,
    libfuzzer_sys::fuzz_target,
    tally_accounts::{AccountId, AccountStore, BalanceLedger},
    tally_fee_market::{FeeParameters, FeeSchedule, RoundingMode},
    tally_settlement::{
        treasury_account, DispatchError, ExecutionReport, FeeSettlementEngine, SettlementError,
        Transaction,
    },
};

#[derive(Debug, Arbitrary)]
struct FuzzTx {
    payer: u8,
    weight_limit: u64,
    actual_weight: u64,
    payload_len: u8,
    tip: u64,
    succeeds: bool,
    /// Settle this admission a second time, which must abort the block.
    replay: bool,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    balances: [u64; 4],
    weight_fee_numerator: u32,
    weight_fee_denominator: u32,
    rounding: u8,
    transactions: Vec<FuzzTx>,
}

fuzz_target!(|input: FuzzInput| {
    let params = FeeParameters {
        weight_fee_numerator: input.weight_fee_numerator as u128,
        weight_fee_denominator: (input.weight_fee_denominator as u128).max(1),
        rounding: match input.rounding % 3 {
            0 => RoundingMode::Down,
            1 => RoundingMode::Up,
            _ => RoundingMode::HalfUp,
        },
        ..FeeParameters::default()
    };
    let engine = FeeSettlementEngine::new(
        FeeSchedule::with_genesis(params).unwrap(),
        treasury_account(),
    );

    let payers: Vec<AccountId> = (0..4u8)
        .map(|i| AccountId::new_from_array([i.wrapping_add(1); 32]))
        .collect();
    let store = AccountStore::with_endowments(
        payers
            .iter()
            .zip(input.balances)
            .map(|(payer, balance)| (*payer, balance as u128 * 1_000_000_000)),
    )
    .unwrap();
    let issuance = store.total_issuance();
    let before = store.snapshot();

    let result = store.batch(|batch| -> Result<(), SettlementError> {
        let mut block = engine.begin_block(0);
        for (nonce, fuzz_tx) in input.transactions.iter().enumerate() {
            let tx = Transaction::new(
                payers[fuzz_tx.payer as usize % payers.len()],
                nonce as u64,
                fuzz_tx.weight_limit,
                vec![0; fuzz_tx.payload_len as usize],
            )
            .with_tip(fuzz_tx.tip as u128);

            let payer_before = batch.free_balance(&tx.signer);
            let treasury_before = batch.free_balance(engine.treasury());

            let Ok(admission) = block.admit(batch, &tx) else {
                assert_eq!(batch.free_balance(&tx.signer), payer_before);
                continue;
            };
            let report = if fuzz_tx.succeeds {
                ExecutionReport::success(fuzz_tx.actual_weight)
            } else {
                ExecutionReport::failure(DispatchError::BadOrigin, fuzz_tx.actual_weight)
            };
            let receipt = block.settle(batch, &admission, &report)?;
            let fee = receipt.fee.total_fee;

            assert!(fee <= admission.held);
            assert!(receipt.weight_charged <= tx.weight_limit);
            assert_eq!(batch.free_balance(&tx.signer), payer_before - fee);
            assert_eq!(batch.free_balance(engine.treasury()), treasury_before + fee);
            assert_eq!(batch.reserved_balance(&tx.signer), 0);
            assert_eq!(batch.total_issuance(), issuance);

            if fuzz_tx.replay {
                block.settle(batch, &admission, &report)?;
                unreachable!("a replayed settlement must fail");
            }
        }
        block.finish()?;
        Ok(())
    });

    assert_eq!(store.total_issuance(), issuance);
    assert_eq!(store.computed_issuance(), issuance);
    match result {
        Ok(()) => {}
        Err(err) => {
            assert!(matches!(err, SettlementError::DuplicateSettlement { .. }));
            assert_eq!(store.snapshot(), before);
        }
    }
});
