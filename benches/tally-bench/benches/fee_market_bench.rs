//! Fee Market benchmarks.
//!
//! Measures:
//! - Transaction fee calculation throughput per rounding mode
//! - Fee validation throughput
//! - Weight-fee adjustment and multi-block schedule advancement

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tally_fee_market::{
    calculator, weights, BlockWeightState, FeeAdjustmentConfig, FeeParameters, FeeSchedule,
    RoundingMode, UNIT,
};

// ---------------------------------------------------------------------------
// Transaction fee calculation
// ---------------------------------------------------------------------------

fn bench_transaction_fee_calculation(c: &mut Criterion) {
    let mut group = c.benchmark_group("fee_market/tx_fee_calc");
    group.throughput(Throughput::Elements(1));

    for rounding in [RoundingMode::Down, RoundingMode::Up, RoundingMode::HalfUp] {
        let params = FeeParameters {
            rounding,
            // Inexact division so every mode does real work.
            weight_fee_denominator: 7,
            ..FeeParameters::default()
        };
        group.bench_function(format!("{rounding:?}"), |b| {
            b.iter(|| {
                calculator::calculate_transaction_fee(
                    &params,
                    181,                           // encoded_len
                    weights::balances::transfer(), // consumed weight
                    0,                             // tip
                )
            })
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Fee validation
// ---------------------------------------------------------------------------

fn bench_fee_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("fee_market/validation");
    let params = FeeParameters::default();
    group.throughput(Throughput::Elements(1));

    group.bench_function("valid_tx", |b| {
        b.iter(|| {
            calculator::validate_transaction_fee(
                10 * UNIT,
                &params,
                181,
                weights::balances::transfer(),
                0,
                u64::MAX,
            )
        })
    });

    // Insufficient fee (expect Err)
    group.bench_function("insufficient_fee", |b| {
        b.iter(|| {
            let _ = calculator::validate_transaction_fee(
                1, // too little
                &params,
                181,
                weights::balances::transfer(),
                0,
                u64::MAX,
            );
        })
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Weight-fee adjustment
// ---------------------------------------------------------------------------

fn bench_next_weight_fee(c: &mut Criterion) {
    let mut group = c.benchmark_group("fee_market/next_weight_fee");

    let config = FeeAdjustmentConfig::default();
    let target = config.target_weight();
    let state = |parent_weight_used| BlockWeightState {
        weight_fee_numerator: config.min_weight_fee.saturating_mul(4),
        parent_weight_used,
        current_weight_used: 0,
        height: 1,
    };

    let at_target = state(target);
    let above = state(target.saturating_mul(3) / 2); // 150% of target
    let below = state(target / 4); // 25% of target

    group.throughput(Throughput::Elements(1));
    group.bench_function("at_target", |b| {
        b.iter(|| calculator::calculate_next_weight_fee(&config, &at_target))
    });
    group.bench_function("above_target_150pct", |b| {
        b.iter(|| calculator::calculate_next_weight_fee(&config, &above))
    });
    group.bench_function("below_target_25pct", |b| {
        b.iter(|| calculator::calculate_next_weight_fee(&config, &below))
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Multi-block schedule advancement
// ---------------------------------------------------------------------------

fn bench_schedule_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("fee_market/schedule_advance");
    group.sample_size(20);

    for &n_blocks in &[100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(n_blocks));
        group.bench_with_input(BenchmarkId::new("blocks", n_blocks), &n_blocks, |b, &n| {
            let config = FeeAdjustmentConfig::default();

            b.iter(|| {
                let mut schedule = FeeSchedule::with_genesis(FeeParameters::default())
                    .expect("genesis parameters are valid");
                let mut state = BlockWeightState::genesis(config.min_weight_fee);

                for height in 0..n {
                    // Alternating congestion: odd blocks are busy, even are light.
                    let weight_used = if height % 2 == 1 {
                        config.target_weight().saturating_mul(3) / 2
                    } else {
                        config.target_weight() / 3
                    };
                    state.record_weight(weight_used);
                    state = schedule
                        .advance_block(&config, &state)
                        .expect("configuration is valid");
                }

                schedule.len()
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_transaction_fee_calculation,
    bench_fee_validation,
    bench_next_weight_fee,
    bench_schedule_advance,
);
criterion_main!(benches);
