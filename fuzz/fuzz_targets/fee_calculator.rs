//! Fuzz the weight fee calculator with random and extreme inputs.
//!
//! Goals:
//! - Find panics, overflows, or division-by-zero.
//! - Verify that a computed fee is always the exact sum of its components.
//! - Verify that the adjusted numerator stays within [min_weight_fee, max_weight_fee].
//! - Verify monotonicity: more weight never costs less, higher utilization
//!   never lowers the next numerator.

#![no_main]

use {
    arbitrary::{Arbitrary, Unstructured},
    libfuzzer_sys::fuzz_target,
    tally_fee_market::{
        calculator::{
            calculate_next_weight_fee, calculate_transaction_fee, validate_adjustment_config,
            validate_transaction_fee,
        },
        BlockWeightState, FeeAdjustmentConfig, FeeError, FeeParameters, RoundingMode,
    },
};

/// Fuzz input: random fee parameters, adjustment config, and usage.
#[derive(Debug)]
struct FuzzInput {
    // Parameters
    base_fee: u128,
    length_fee_per_byte: u128,
    weight_fee_numerator: u128,
    weight_fee_denominator: u128,
    extrinsic_base_weight: u64,
    rounding: u8,

    // Adjustment
    min_weight_fee: u128,
    max_weight_fee: u128,
    target_utilization_pct: u8,
    max_block_weight: u64,
    change_denominator: u64,
    parent_weight_used: u64,

    // Transaction
    encoded_len: u32,
    consumed_weight: u64,
    tip: u128,
    offered: u128,

    // Multi-block sequence length
    sequence_len: u8,
}

impl<'a> Arbitrary<'a> for FuzzInput {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(FuzzInput {
            base_fee: u.arbitrary()?,
            length_fee_per_byte: u.arbitrary()?,
            weight_fee_numerator: u.arbitrary()?,
            weight_fee_denominator: u.arbitrary()?,
            extrinsic_base_weight: u.arbitrary()?,
            rounding: u.int_in_range(0..=2)?,
            min_weight_fee: u.arbitrary()?,
            max_weight_fee: u.arbitrary()?,
            target_utilization_pct: u.int_in_range(0..=100)?,
            max_block_weight: u.arbitrary()?,
            change_denominator: u.arbitrary()?,
            parent_weight_used: u.arbitrary()?,
            encoded_len: u.arbitrary()?,
            consumed_weight: u.arbitrary()?,
            tip: u.arbitrary()?,
            offered: u.arbitrary()?,
            sequence_len: u.int_in_range(1..=50)?,
        })
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let input: FuzzInput = match u.arbitrary() {
        Ok(i) => i,
        Err(_) => return,
    };

    let params = FeeParameters {
        base_fee: input.base_fee,
        length_fee_per_byte: input.length_fee_per_byte,
        weight_fee_numerator: input.weight_fee_numerator,
        weight_fee_denominator: input.weight_fee_denominator,
        extrinsic_base_weight: input.extrinsic_base_weight,
        rounding: match input.rounding {
            0 => RoundingMode::Down,
            1 => RoundingMode::Up,
            _ => RoundingMode::HalfUp,
        },
    };

    // ── Test 1: calculate_transaction_fee must not panic ──

    match calculate_transaction_fee(&params, input.encoded_len, input.consumed_weight, input.tip) {
        Ok(fee) => {
            // Invariant: components sum exactly to the total.
            let sum = fee
                .base_fee
                .checked_add(fee.length_fee)
                .and_then(|s| s.checked_add(fee.weight_fee))
                .and_then(|s| s.checked_add(fee.tip));
            assert_eq!(sum, Some(fee.total_fee));
            assert_eq!(fee.base_fee, params.base_fee);
            assert_eq!(fee.tip, input.tip);

            // Invariant: the same inputs always price the same.
            assert_eq!(
                calculate_transaction_fee(
                    &params,
                    input.encoded_len,
                    input.consumed_weight,
                    input.tip
                ),
                Ok(fee)
            );

            // Invariant: less weight never costs more.
            if let Ok(lighter) =
                calculate_transaction_fee(&params, input.encoded_len, input.consumed_weight / 2, input.tip)
            {
                assert!(lighter.total_fee <= fee.total_fee);
            }
        }
        Err(FeeError::Overflow) => {}
        Err(FeeError::InvalidConfig { .. }) => assert_eq!(params.weight_fee_denominator, 0),
        Err(err) => panic!("unexpected error {err:?}"),
    }

    // ── Test 2: validate_transaction_fee must not panic ──

    if let Ok(fee) = validate_transaction_fee(
        input.offered,
        &params,
        input.encoded_len,
        input.consumed_weight,
        input.tip,
        input.max_block_weight,
    ) {
        assert!(input.offered >= fee.total_fee);
        assert!(input.consumed_weight <= input.max_block_weight);
    }

    // ── Test 3: calculate_next_weight_fee must not panic ──

    let config = FeeAdjustmentConfig {
        min_weight_fee: input.min_weight_fee,
        max_weight_fee: input.max_weight_fee,
        target_utilization_pct: input.target_utilization_pct,
        max_block_weight: input.max_block_weight,
        change_denominator: input.change_denominator,
    };
    let state = BlockWeightState {
        weight_fee_numerator: input.weight_fee_numerator,
        parent_weight_used: input.parent_weight_used,
        current_weight_used: 0,
        height: 0,
    };
    let next = calculate_next_weight_fee(&config, &state);

    if validate_adjustment_config(&config).is_err() {
        return;
    }

    // ── Invariant: output is clamped to [min, max] ──
    assert!(
        next >= config.min_weight_fee && next <= config.max_weight_fee,
        "next ({next}) outside [{}, {}]",
        config.min_weight_fee,
        config.max_weight_fee
    );

    // ── Test 4: Multi-block sequence stability ──
    let mut current = state;
    for i in 0..input.sequence_len as u64 {
        let next = calculate_next_weight_fee(&config, &current);
        assert!(
            next >= config.min_weight_fee && next <= config.max_weight_fee,
            "Block {i}: numerator {next} out of bounds [{}, {}]",
            config.min_weight_fee,
            config.max_weight_fee
        );
        current = BlockWeightState {
            weight_fee_numerator: next,
            parent_weight_used: input.parent_weight_used, // same utilization pattern
            current_weight_used: 0,
            height: i + 1,
        };
    }

    // ── Test 5: Monotonicity in utilization ──
    let low = BlockWeightState {
        parent_weight_used: input.parent_weight_used.min(input.parent_weight_used.wrapping_add(1000)),
        ..state
    };
    let high = BlockWeightState {
        parent_weight_used: input.parent_weight_used.max(input.parent_weight_used.wrapping_add(1000)),
        ..state
    };
    let fee_low = calculate_next_weight_fee(&config, &low);
    let fee_high = calculate_next_weight_fee(&config, &high);
    assert!(
        fee_high >= fee_low,
        "Monotonicity violation: usage {} → {fee_low}, usage {} → {fee_high}",
        low.parent_weight_used,
        high.parent_weight_used,
    );
});
