//! E2E Test: Full Fee Lifecycle
//!
//! Verifies the complete fee lifecycle:
//! - A signed transfer pays its fee to the treasury on top of the amount moved
//! - Failed calls pay exactly like successful ones
//! - Reference calls land inside the expected fee band
//! - Total issuance never moves
//! - The weight fee follows block utilization and past fees stay reproducible

use {
    tally_e2e_tests::helpers::*,
    tally_fee_market::{weights, FeeAdjustmentConfig, FeeError, UNIT},
    tally_settlement::{AdmissionError, DispatchError, DispatchOutcome},
};

// ─────────────────────────────────────────────────────────────────────────────
// Test: Transfer pays amount to the destination and fee to the treasury
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_transfer_fee_goes_to_treasury() {
    init_logging();
    println!("\n========================================");
    println!("  FEE LIFECYCLE: Transfer fee to treasury");
    println!("========================================\n");

    let (mut chain, accounts) = dev_chain(2);
    let (alice, bob) = (accounts[0], accounts[1]);
    let treasury = chain.treasury();

    let tx = chain.submit(
        alice,
        &Call::Transfer {
            dest: bob,
            amount: UNIT,
        },
    );
    assert_eq!(tx.encoded_len(), Some(181));

    let record = chain.produce_block().unwrap().clone();
    assert_eq!(record.receipts.len(), 1);
    let receipt = &record.receipts[0];
    let fee = receipt.fee.total_fee;

    assert_eq!(receipt.outcome, DispatchOutcome::Success);
    assert_eq!(fee, 100_305_068_000_000);
    assert!(fee_in_band(fee), "fee {fee} outside the reference band");
    assert_eq!(chain.free_balance(&alice), DEV_ENDOWMENT - UNIT - fee);
    assert_eq!(chain.free_balance(&bob), DEV_ENDOWMENT + UNIT);
    assert_eq!(chain.free_balance(&treasury), fee);
    assert_eq!(chain.store.reserved_balance(&alice), 0);
    assert_eq!(chain.height(), 1);

    println!("✓ Alice paid {fee} to the treasury for a 1 UNIT transfer");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: A failed call is still charged
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_failed_call_still_pays() {
    init_logging();
    println!("\n========================================");
    println!("  FEE LIFECYCLE: Failed call still pays");
    println!("========================================\n");

    let (mut chain, accounts) = dev_chain(1);
    let alice = accounts[0];
    let treasury = chain.treasury();

    let tx = chain.submit(
        alice,
        &Call::SetBalance {
            who: alice,
            free: 1_000_000 * UNIT,
            reserved: 0,
        },
    );
    assert_eq!(tx.encoded_len(), Some(197));

    let record = chain.produce_block().unwrap().clone();
    let receipt = &record.receipts[0];

    assert_eq!(
        receipt.outcome,
        DispatchOutcome::Failure(DispatchError::BadOrigin)
    );
    assert_eq!(receipt.fee.total_fee, 75_177_000_000_000);
    assert_eq!(
        chain.free_balance(&alice),
        DEV_ENDOWMENT - receipt.fee.total_fee
    );
    assert_eq!(chain.free_balance(&treasury), receipt.fee.total_fee);
    assert_eq!(record.summary.failed, 1);
    assert_eq!(record.summary.succeeded, 0);

    println!(
        "✓ set_balance failed with BadOrigin and paid {}",
        receipt.fee.total_fee
    );
}

#[test]
fn test_call_cannot_spend_its_own_fee() {
    init_logging();

    let (mut chain, accounts) = dev_chain(2);
    let (alice, bob) = (accounts[0], accounts[1]);

    // Moving the whole endowment leaves nothing for the fee, so the call fails.
    chain.submit(
        alice,
        &Call::Transfer {
            dest: bob,
            amount: DEV_ENDOWMENT,
        },
    );
    let record = chain.produce_block().unwrap().clone();
    let receipt = &record.receipts[0];

    assert_eq!(
        receipt.outcome,
        DispatchOutcome::Failure(DispatchError::InsufficientBalance)
    );
    assert_eq!(receipt.fee.total_fee, 100_305_068_000_000);
    assert_eq!(
        chain.free_balance(&alice),
        DEV_ENDOWMENT - receipt.fee.total_fee
    );
    assert_eq!(chain.free_balance(&bob), DEV_ENDOWMENT);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: Reference calls land in the fee band
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_nft_transfer_fee_in_band() {
    init_logging();

    let (mut chain, accounts) = dev_chain(2);
    let tx = chain.submit(
        accounts[0],
        &Call::NftTransfer {
            collection: 0,
            item: 1,
            to: accounts[1],
            amount: 1,
        },
    );
    assert_eq!(tx.encoded_len(), Some(189));
    assert_eq!(tx.weight_limit, weights::nft::transfer_normal());

    let record = chain.produce_block().unwrap().clone();
    let fee = record.receipts[0].fee.total_fee;
    assert_eq!(fee, 99_732_124_000_000);
    assert!(fee_in_band(fee));
    assert!(fee < UNIT / 9);

    println!("✓ NFT transfer fee {fee} is within UNIT/10 ± 1.2e12");
}

#[test]
fn test_tip_is_paid_to_treasury() {
    init_logging();

    let (mut chain, accounts) = dev_chain(2);
    let tip = 5 * UNIT / 1_000;
    chain.submit_with_tip(
        accounts[0],
        &Call::Remark { data: vec![1; 10] },
        tip,
    );
    let record = chain.produce_block().unwrap().clone();
    let fee = record.receipts[0].fee;

    assert_eq!(fee.tip, tip);
    assert_eq!(
        fee.total_fee,
        fee.base_fee + fee.length_fee + fee.weight_fee + tip
    );
    assert_eq!(chain.free_balance(&chain.treasury()), fee.total_fee);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: NFT calls pay the treasury
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_collection_creation_pays_treasury() {
    init_logging();
    println!("\n========================================");
    println!("  FEE LIFECYCLE: Collection creation");
    println!("========================================\n");

    let (mut chain, accounts) = dev_chain(1);
    let alice = accounts[0];
    let treasury = chain.treasury();
    let issuance = chain.store.total_issuance();

    let tx = chain.submit(
        alice,
        &Call::CreateCollection {
            name: b"Tally".to_vec(),
        },
    );
    assert_eq!(tx.encoded_len(), Some(142));

    let record = chain.produce_block().unwrap().clone();
    let receipt = &record.receipts[0];
    let fee = receipt.fee.total_fee;
    assert_eq!(receipt.outcome, DispatchOutcome::Success);
    assert_eq!(fee, 191_101_268_000_000);

    let charged = DEV_ENDOWMENT - chain.free_balance(&alice);
    assert_eq!(charged, COLLECTION_DEPOSIT + fee);
    assert_eq!(chain.free_balance(&treasury), charged);
    assert_eq!(chain.store.total_issuance(), issuance);

    // Sane: the fee part stays within [0.05, 0.5] UNIT.
    assert!(fee > UNIT / 20 && fee < UNIT / 2);
    assert!(charged / UNIT < 101);

    println!("✓ Collection creation paid {charged} to the treasury");
}

#[test]
fn test_nft_calls_charge_benchmarked_weight() {
    init_logging();

    let (mut chain, accounts) = dev_chain(2);
    let (alice, bob) = (accounts[0], accounts[1]);
    let calls = [
        Call::CreateItem {
            collection: 1,
            owner: alice,
        },
        Call::Approve {
            collection: 1,
            item: 1,
            spender: bob,
            amount: 1,
        },
        Call::TransferFrom {
            collection: 1,
            item: 1,
            from: alice,
            to: bob,
            amount: 1,
        },
        Call::BurnItem {
            collection: 1,
            item: 1,
            amount: 1,
        },
    ];
    for call in &calls {
        chain.submit(alice, call);
    }

    let record = chain.produce_block().unwrap().clone();
    let charged: Vec<_> = record.receipts.iter().map(|r| r.weight_charged).collect();
    assert_eq!(
        charged,
        vec![
            weights::nft::create_item(),
            weights::nft::approve(),
            weights::nft::transfer_from_normal(),
            weights::nft::burn_item_partial(),
        ]
    );
    assert_eq!(record.summary.succeeded, 4);
    assert_eq!(
        DEV_ENDOWMENT - chain.free_balance(&alice),
        chain.free_balance(&chain.treasury())
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: Refused transactions pay nothing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unaffordable_transaction_is_refused() {
    init_logging();

    let accounts = dev_accounts(2);
    let poor = accounts[1];
    let mut chain = SimChain::new(&[(accounts[0], DEV_ENDOWMENT), (poor, UNIT / 100)]);

    chain.submit(
        poor,
        &Call::Transfer {
            dest: accounts[0],
            amount: 1,
        },
    );
    let record = chain.produce_block().unwrap().clone();

    assert!(record.receipts.is_empty());
    assert_eq!(record.refused.len(), 1);
    assert!(matches!(
        record.refused[0].1,
        AdmissionError::Fee(FeeError::InsufficientFee { .. })
    ));
    assert_eq!(chain.free_balance(&poor), UNIT / 100);
    assert_eq!(chain.free_balance(&chain.treasury()), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: Issuance is conserved across many blocks
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_issuance_unchanged_across_blocks() {
    init_logging();
    println!("\n========================================");
    println!("  FEE LIFECYCLE: Issuance conservation");
    println!("========================================\n");

    let (mut chain, accounts) = dev_chain(4);
    let issuance = chain.store.total_issuance();
    let mut total_fees = 0;

    for round in 0..20u32 {
        for (i, signer) in accounts.iter().enumerate() {
            let dest = accounts[(i + 1) % accounts.len()];
            let call = match (round + i as u32) % 4 {
                0 => Call::Transfer {
                    dest,
                    amount: UNIT / 3,
                },
                1 => Call::NftTransfer {
                    collection: round,
                    item: i as u32,
                    to: dest,
                    amount: 1,
                },
                2 => Call::SetBalance {
                    who: dest,
                    free: 0,
                    reserved: 0,
                },
                _ => Call::Remark {
                    data: vec![round as u8; 32],
                },
            };
            chain.submit(*signer, &call);
        }
        let record = chain.produce_block().unwrap();
        assert_eq!(record.summary.settled, accounts.len() as u64);
        total_fees += record.summary.total_fees;

        assert_eq!(chain.store.total_issuance(), issuance);
        assert_eq!(chain.store.computed_issuance(), issuance);
    }

    assert_eq!(chain.free_balance(&chain.treasury()), total_fees);
    chain.print_summary();
    println!("✓ Issuance stayed at {issuance} over 20 blocks, fees {total_fees}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: Congestion moves the weight fee
// ─────────────────────────────────────────────────────────────────────────────

fn small_block_adjustment() -> FeeAdjustmentConfig {
    FeeAdjustmentConfig {
        max_block_weight: 1_000_000_000,
        ..FeeAdjustmentConfig::default()
    }
}

#[test]
fn test_congestion_raises_fees() {
    init_logging();
    println!("\n========================================");
    println!("  FEE LIFECYCLE: Congestion raises fees");
    println!("========================================\n");

    let (chain, accounts) = dev_chain(3);
    let mut chain = chain.with_adjustment(small_block_adjustment());
    let transfer = |dest| Call::Transfer { dest, amount: 1 };

    let first_tx = chain.submit(accounts[0], &transfer(accounts[1]));
    let first_fee = chain.produce_block().unwrap().receipts[0].fee.total_fee;
    let genesis_numerator = chain.engine.parameters_at(0).unwrap().weight_fee_numerator;

    // Three transfers per block put utilization well above the 50% target.
    for _ in 0..10 {
        for signer in &accounts {
            chain.submit(*signer, &transfer(accounts[2]));
        }
        chain.produce_block().unwrap();
    }

    let numerator = chain.state.weight_fee_numerator;
    assert!(numerator > genesis_numerator);
    assert_eq!(
        chain.engine.parameters_at(chain.height()).unwrap().weight_fee_numerator,
        numerator
    );

    let later = chain.submit(accounts[0], &transfer(accounts[1]));
    let later_fee = chain.produce_block().unwrap().receipts[0].fee.total_fee;
    assert!(later_fee > first_fee);

    // The first block's fee is still recomputable from its own parameters.
    assert_eq!(
        chain
            .engine
            .compute_fee(0, &first_tx, weights::balances::transfer())
            .unwrap()
            .total_fee,
        first_fee
    );
    assert_eq!(first_tx.encoded_len(), later.encoded_len());

    println!("✓ Weight fee numerator rose {genesis_numerator} → {numerator}, fee {first_fee} → {later_fee}");
}

#[test]
fn test_empty_blocks_return_fee_to_floor() {
    init_logging();

    let (chain, accounts) = dev_chain(3);
    let config = small_block_adjustment();
    let mut chain = chain.with_adjustment(config.clone());

    for _ in 0..5 {
        for signer in &accounts {
            chain.submit(
                *signer,
                &Call::Transfer {
                    dest: accounts[0],
                    amount: 1,
                },
            );
        }
        chain.produce_block().unwrap();
    }
    assert!(chain.state.weight_fee_numerator > config.min_weight_fee);

    chain.produce_empty_blocks(100);
    assert_eq!(chain.state.weight_fee_numerator, config.min_weight_fee);
}
