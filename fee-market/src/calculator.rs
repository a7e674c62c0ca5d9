use crate::{
    config::{FeeAdjustmentConfig, FeeParameters, RoundingMode},
    error::FeeError,
    state::{BlockWeightState, FeeBreakdown},
    Balance, Weight,
};

/// Calculate the fee breakdown for a single transaction.
///
/// # Formula
///
/// ```text
/// total_weight = extrinsic_base_weight + consumed_weight
/// weight_fee   = round(total_weight × weight_fee_numerator / weight_fee_denominator)
/// length_fee   = length_fee_per_byte × encoded_len
/// total_fee    = base_fee + length_fee + weight_fee + tip
/// ```
///
/// `round` is the parameter set's [`RoundingMode`].  The result depends only
/// on the arguments.  Every step is checked: an overflow is reported as
/// [`FeeError::Overflow`] instead of producing a clamped fee.
pub fn calculate_transaction_fee(
    params: &FeeParameters,
    encoded_len: u32,
    consumed_weight: Weight,
    tip: Balance,
) -> Result<FeeBreakdown, FeeError> {
    validate_parameters(params)?;

    let total_weight = params
        .extrinsic_base_weight
        .checked_add(consumed_weight)
        .ok_or(FeeError::Overflow)?;
    let weight_fee = weight_to_fee(params, total_weight)?;
    let length_fee = params
        .length_fee_per_byte
        .checked_mul(encoded_len as Balance)
        .ok_or(FeeError::Overflow)?;

    let total_fee = params
        .base_fee
        .checked_add(length_fee)
        .and_then(|fee| fee.checked_add(weight_fee))
        .and_then(|fee| fee.checked_add(tip))
        .ok_or(FeeError::Overflow)?;

    Ok(FeeBreakdown {
        base_fee: params.base_fee,
        length_fee,
        weight_fee,
        tip,
        total_fee,
    })
}

/// Convert a weight into its fee under `params`, applying the rounding rule.
pub fn weight_to_fee(params: &FeeParameters, weight: Weight) -> Result<Balance, FeeError> {
    let scaled = (weight as Balance)
        .checked_mul(params.weight_fee_numerator)
        .ok_or(FeeError::Overflow)?;
    divide_rounded(scaled, params.weight_fee_denominator, params.rounding)
}

fn divide_rounded(
    numerator: Balance,
    denominator: Balance,
    rounding: RoundingMode,
) -> Result<Balance, FeeError> {
    if denominator == 0 {
        return Err(FeeError::InvalidConfig {
            reason: "weight_fee_denominator must be > 0".to_string(),
        });
    }
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    let round_up = match rounding {
        RoundingMode::Down => false,
        RoundingMode::Up => remainder > 0,
        // remainder < denominator, so the subtraction cannot underflow.
        RoundingMode::HalfUp => remainder > 0 && remainder >= denominator - remainder,
    };

    if round_up {
        quotient.checked_add(1).ok_or(FeeError::Overflow)
    } else {
        Ok(quotient)
    }
}

/// Validate that a transaction can afford its fee at the declared weight
/// bound.
///
/// * `offered`: what the payer can put up (free balance).
/// * `weight_limit`: the weight the transaction declares; the fee charged
///   later is computed from actual consumption, which never exceeds this.
/// * `max_block_weight`: hard ceiling for a single transaction's weight.
pub fn validate_transaction_fee(
    offered: Balance,
    params: &FeeParameters,
    encoded_len: u32,
    weight_limit: Weight,
    tip: Balance,
    max_block_weight: Weight,
) -> Result<FeeBreakdown, FeeError> {
    if weight_limit > max_block_weight {
        return Err(FeeError::WeightExceedsBlockMax {
            requested: weight_limit,
            max_block_weight,
        });
    }

    let fee = calculate_transaction_fee(params, encoded_len, weight_limit, tip)?;

    if offered < fee.total_fee {
        return Err(FeeError::InsufficientFee {
            offered,
            required: fee.total_fee,
            weight_limit,
            encoded_len,
        });
    }

    Ok(fee)
}

/// Validate that a parameter snapshot is usable.
pub fn validate_parameters(params: &FeeParameters) -> Result<(), FeeError> {
    if params.weight_fee_denominator == 0 {
        return Err(FeeError::InvalidConfig {
            reason: "weight_fee_denominator must be > 0".to_string(),
        });
    }
    Ok(())
}

/// Calculate the next block's weight-fee numerator using the EIP-1559 rule.
///
/// # Formula
///
/// ```text
/// target = max_block_weight × target_utilization_pct / 100
///
/// if parent_weight_used == target:
///     next = current                                (no change)
///
/// if parent_weight_used > target:
///     delta = current × (parent_weight_used - target) / target / denominator
///     next  = current + max(delta, 1)
///
/// if parent_weight_used < target:
///     delta = current × (target - parent_weight_used) / target / denominator
///     next  = current - delta
/// ```
///
/// The result is clamped to `[min_weight_fee, max_weight_fee]`.
///
/// The `max(delta, 1)` step guarantees the fee keeps rising under sustained
/// congestion even when the current numerator is very small.
pub fn calculate_next_weight_fee(
    config: &FeeAdjustmentConfig,
    state: &BlockWeightState,
) -> Balance {
    let target = config.target_weight();

    // target = 0: every non-empty block is "above target".
    if target == 0 {
        return if state.parent_weight_used > 0 {
            config.max_weight_fee
        } else {
            clamp(
                state.weight_fee_numerator,
                config.min_weight_fee,
                config.max_weight_fee,
            )
        };
    }

    let current = state.weight_fee_numerator;
    let divisor = (target as Balance).saturating_mul(config.change_denominator as Balance);

    let next = if state.parent_weight_used == target {
        current
    } else if state.parent_weight_used > target {
        let excess = state.parent_weight_used.saturating_sub(target);
        let scaled = current.saturating_mul(excess as Balance);
        let delta = if divisor == 0 {
            current
        } else {
            (scaled / divisor).max(1)
        };
        current.saturating_add(delta)
    } else {
        let deficit = target.saturating_sub(state.parent_weight_used);
        let scaled = current.saturating_mul(deficit as Balance);
        let delta = if divisor == 0 { 0 } else { scaled / divisor };
        current.saturating_sub(delta)
    };

    clamp(next, config.min_weight_fee, config.max_weight_fee)
}

/// Validate that a `FeeAdjustmentConfig` is internally consistent.
pub fn validate_adjustment_config(config: &FeeAdjustmentConfig) -> Result<(), FeeError> {
    if config.min_weight_fee > config.max_weight_fee {
        return Err(FeeError::InvalidConfig {
            reason: format!(
                "min_weight_fee ({}) > max_weight_fee ({})",
                config.min_weight_fee, config.max_weight_fee
            ),
        });
    }
    if config.change_denominator == 0 {
        return Err(FeeError::InvalidConfig {
            reason: "change_denominator must be > 0".to_string(),
        });
    }
    if config.target_utilization_pct > 100 {
        return Err(FeeError::InvalidConfig {
            reason: format!(
                "target_utilization_pct ({}) must be 0–100",
                config.target_utilization_pct
            ),
        });
    }
    if config.max_block_weight == 0 {
        return Err(FeeError::InvalidConfig {
            reason: "max_block_weight must be > 0".to_string(),
        });
    }
    Ok(())
}

#[inline]
fn clamp(value: Balance, min: Balance, max: Balance) -> Balance {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
