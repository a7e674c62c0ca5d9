use {
    crate::{Balance, Weight, MILLI_UNIT},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

/// Rounding applied to the weight component of a fee.
///
/// The weight fee is `total_weight × numerator / denominator`; whenever the
/// division is inexact, this rule decides the last smallest unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Floor towards zero.
    #[default]
    Down,
    /// Ceiling: any remainder adds one unit.
    Up,
    /// Round to nearest, ties away from zero.
    HalfUp,
}

/// The fee parameter snapshot in effect at a given height.
///
/// ```text
/// fee = base_fee
///     + length_fee_per_byte × encoded_len
///     + round((extrinsic_base_weight + consumed) × weight_fee_numerator / weight_fee_denominator)
///     + tip
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct FeeParameters {
    /// Flat fee charged once per transaction.
    pub base_fee: Balance,

    /// Fee per encoded byte of the signed transaction.
    pub length_fee_per_byte: Balance,

    /// Numerator of the per-weight-unit fee coefficient.
    /// This is the value the weight-fee adjustment moves block to block.
    pub weight_fee_numerator: Balance,

    /// Denominator of the per-weight-unit fee coefficient. Must be non-zero.
    pub weight_fee_denominator: Balance,

    /// Weight charged for every transaction on top of what its call consumed
    /// (signature checks, nonce bump, fee withdrawal).
    pub extrinsic_base_weight: Weight,

    /// Rounding rule for the weight component.
    #[serde(default)]
    pub rounding: RoundingMode,
}

impl Default for FeeParameters {
    /// Genesis calibration.
    ///
    /// A reference NFT transfer (189 bytes, 267 733 000 weight) costs
    /// 0.099732124 UNIT; a reference balance transfer (181 bytes,
    /// 270 281 000 weight) costs 0.100305068 UNIT.
    fn default() -> Self {
        Self {
            base_fee: 10 * MILLI_UNIT,         // 0.01 UNIT per transaction
            length_fee_per_byte: 1_000_000_000, // 0.000001 UNIT per byte
            weight_fee_numerator: 228_000_000,  // 228 000 per weight unit
            weight_fee_denominator: 1_000,
            extrinsic_base_weight: 125_000_000,
            rounding: RoundingMode::Down,
        }
    }
}

impl FeeParameters {
    /// Copy of these parameters with a different weight-fee numerator.
    pub fn with_weight_fee_numerator(&self, weight_fee_numerator: Balance) -> Self {
        Self {
            weight_fee_numerator,
            ..self.clone()
        }
    }
}

/// Configuration for the utilization-driven weight-fee adjustment.
///
/// Mirrors EIP-1559 with weight in place of gas:
/// - The weight-fee numerator adjusts each block based on utilization vs. target.
/// - The change per block is bounded by `1 / change_denominator`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct FeeAdjustmentConfig {
    /// Floor for the weight-fee numerator.
    pub min_weight_fee: Balance,

    /// Ceiling for the weight-fee numerator.
    pub max_weight_fee: Balance,

    /// Target block utilization as a percentage (0–100).
    pub target_utilization_pct: u8,

    /// Maximum weight a single block may consume.
    pub max_block_weight: Weight,

    /// Each block, the numerator can change by at most `1 / change_denominator`.
    /// 8 means ±12.5 % per block.
    pub change_denominator: u64,
}

impl FeeAdjustmentConfig {
    /// Target weight per block, derived from max weight and utilization %.
    ///
    /// ```text
    /// target_weight = max_block_weight * target_utilization_pct / 100
    /// ```
    #[inline]
    pub fn target_weight(&self) -> Weight {
        self.max_block_weight
            .saturating_mul(self.target_utilization_pct as u64)
            / 100
    }
}

impl Default for FeeAdjustmentConfig {
    fn default() -> Self {
        let genesis = FeeParameters::default();
        Self {
            min_weight_fee: genesis.weight_fee_numerator,
            max_weight_fee: genesis.weight_fee_numerator.saturating_mul(1_000),
            target_utilization_pct: 50,
            max_block_weight: 2_000_000_000_000,
            change_denominator: 8,
        }
    }
}
