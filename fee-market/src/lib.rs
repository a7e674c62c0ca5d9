//! # Tally Fee Market
//!
//! A **weight-based transaction fee model** for the Tally settlement engine.
//!
//! Every transaction pays a flat base fee, a per-byte length fee, and a fee
//! proportional to the **weight** its call actually consumed.  The weight
//! component is a rational coefficient applied with a fixed, documented
//! rounding rule, so any fee can be recomputed offline from the parameters in
//! effect at the transaction's height.
//!
//! Parameters are versioned per height in a [`FeeSchedule`].  Optionally, the
//! weight-fee coefficient adjusts every block based on utilization, in the
//! style of EIP-1559 (see [`calculator::calculate_next_weight_fee`]).
//!
//! ## Quick start
//!
//! ```rust
//! use tally_fee_market::{calculator, weights, FeeParameters, UNIT};
//!
//! let params = FeeParameters::default();
//!
//! // Price an NFT transfer: 189 encoded bytes, no tip.
//! let fee = calculator::calculate_transaction_fee(
//!     &params,
//!     189,
//!     weights::nft::transfer_normal(),
//!     0,
//! )
//! .unwrap();
//!
//! assert_eq!(fee.total_fee, 99_732_124_000_000);
//! assert!(fee.total_fee < UNIT / 9);
//! ```
//!
//! See [`calculator`] for the formula and [`config`] for tunables.

pub mod calculator;
pub mod config;
pub mod error;
pub mod schedule;
pub mod state;
pub mod weights;


// Re-exports for convenience.
pub use config::{FeeAdjustmentConfig, FeeParameters, RoundingMode};
pub use error::FeeError;
pub use schedule::{FeeParameterSource, FeeSchedule};
pub use state::{BlockWeightState, FeeBreakdown};

/// Balance in the smallest indivisible unit.
pub type Balance = u128;

/// Resource consumption of a call.
pub type Weight = u64;

/// One whole token, in smallest units.
pub const UNIT: Balance = 1_000_000_000_000_000;

/// One thousandth of a token.
pub const MILLI_UNIT: Balance = 1_000_000_000_000;
