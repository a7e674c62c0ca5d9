use {
    crate::{Balance, Weight},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Per-block weight state that drives the weight-fee adjustment.
///
/// Each block carries a `BlockWeightState` that records:
/// - The **current weight-fee numerator** (set when the block was created).
/// - The **parent's weight usage** (used to derive this block's numerator).
/// - A running tally of **current weight used** (updated as transactions land).
/// - The **block height** for audit / indexing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct BlockWeightState {
    /// Weight-fee numerator in effect for this block.
    pub weight_fee_numerator: Balance,

    /// Weight consumed by the *parent* block.
    pub parent_weight_used: Weight,

    /// Running total of weight consumed in the *current* block so far.
    pub current_weight_used: Weight,

    /// Block height.
    pub height: u64,
}

impl BlockWeightState {
    /// Create the genesis (block-0) state with a given initial numerator.
    pub fn genesis(initial_weight_fee: Balance) -> Self {
        Self {
            weight_fee_numerator: initial_weight_fee,
            parent_weight_used: 0,
            current_weight_used: 0,
            height: 0,
        }
    }

    /// Record that `weight` was consumed by a transaction in the current
    /// block.  Returns the new running total.
    #[inline]
    pub fn record_weight(&mut self, weight: Weight) -> Weight {
        self.current_weight_used = self.current_weight_used.saturating_add(weight);
        self.current_weight_used
    }

    /// Derive the child block's state given the *next* numerator.
    pub fn next_block(&self, next_weight_fee: Balance, next_height: u64) -> Self {
        Self {
            weight_fee_numerator: next_weight_fee,
            parent_weight_used: self.current_weight_used,
            current_weight_used: 0,
            height: next_height,
        }
    }

    /// Block utilization as a ratio (0.0 – …).
    pub fn utilization(&self, max_block_weight: Weight) -> f64 {
        if max_block_weight == 0 {
            return 0.0;
        }
        self.current_weight_used as f64 / max_block_weight as f64
    }
}

/// Breakdown of a single transaction's fee.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct FeeBreakdown {
    /// Flat per-transaction component.
    pub base_fee: Balance,
    /// `length_fee_per_byte × encoded_len`.
    pub length_fee: Balance,
    /// Rounded weight component.
    pub weight_fee: Balance,
    /// Tip offered by the signer.
    pub tip: Balance,
    /// Sum of all components.
    pub total_fee: Balance,
}

impl fmt::Display for FeeBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Base fee:    {}", self.base_fee)?;
        writeln!(f, "Length fee:  {}", self.length_fee)?;
        writeln!(f, "Weight fee:  {}", self.weight_fee)?;
        writeln!(f, "Tip:         {}", self.tip)?;
        write!(f, "Total fee:   {}", self.total_fee)
    }
}
