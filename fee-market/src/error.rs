use {crate::Balance, thiserror::Error};

/// Errors produced by the fee model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeError {
    /// The payer's available balance does not cover the fee at the declared
    /// weight bound.
    #[error(
        "Insufficient fee: payer offers {offered} but the transaction requires up to \
         {required} ({weight_limit} weight, {encoded_len} bytes)"
    )]
    InsufficientFee {
        offered: Balance,
        required: Balance,
        weight_limit: u64,
        encoded_len: u32,
    },

    /// The parameter set (or adjustment config) is invalid.
    #[error("Invalid fee configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Declared weight exceeds what a single block can hold.
    #[error("Declared weight ({requested}) exceeds block maximum ({max_block_weight})")]
    WeightExceedsBlockMax {
        requested: u64,
        max_block_weight: u64,
    },

    /// The schedule has no era covering the requested height.
    #[error("No fee parameters in effect at height {height}")]
    MissingParameters { height: u64 },

    /// Eras are append-only; past fee parameters are never replaced.
    #[error("Fee era at height {start_height} does not follow the latest era at {latest_start}")]
    EraNotAppended { start_height: u64, latest_start: u64 },

    /// Arithmetic overflow during fee calculation.
    #[error("Fee calculation overflow")]
    Overflow,
}
