//! Height-versioned fee parameters.
//!
//! A [`FeeSchedule`] is a sequence of *eras*, each starting at a block height
//! and carrying the [`FeeParameters`] in effect until the next era starts.
//! Historical eras are never rewritten, so the fee of any past transaction
//! can be recomputed from the schedule and the transaction alone.

use {
    crate::{
        calculator::{calculate_next_weight_fee, validate_adjustment_config, validate_parameters},
        config::{FeeAdjustmentConfig, FeeParameters},
        error::FeeError,
        state::BlockWeightState,
    },
    log::info,
    serde::{Deserialize, Serialize},
    std::{collections::BTreeMap, sync::Arc},
};

/// Anything that can answer "which fee parameters apply at this height".
///
/// Returning `None` means no snapshot exists; callers must treat that as a
/// hard failure rather than substituting defaults.
pub trait FeeParameterSource {
    fn fee_parameters(&self, height: u64) -> Option<FeeParameters>;
}

impl<T: FeeParameterSource + ?Sized> FeeParameterSource for Arc<T> {
    fn fee_parameters(&self, height: u64) -> Option<FeeParameters> {
        (**self).fee_parameters(height)
    }
}

impl<T: FeeParameterSource + ?Sized> FeeParameterSource for &T {
    fn fee_parameters(&self, height: u64) -> Option<FeeParameters> {
        (**self).fee_parameters(height)
    }
}

/// Fee parameter eras keyed by start height.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    eras: BTreeMap<u64, FeeParameters>,
}

impl FeeSchedule {
    /// An empty schedule. Every lookup fails until an era is inserted.
    pub fn new() -> Self {
        Self::default()
    }

    /// A schedule with a single era starting at height 0.
    pub fn with_genesis(params: FeeParameters) -> Result<Self, FeeError> {
        let mut schedule = Self::new();
        schedule.insert_era(0, params)?;
        Ok(schedule)
    }

    /// Append an era starting at `start_height`.
    ///
    /// Eras only ever extend the schedule: a start height at or below the
    /// latest era is rejected with [`FeeError::EraNotAppended`].
    pub fn insert_era(&mut self, start_height: u64, params: FeeParameters) -> Result<(), FeeError> {
        validate_parameters(&params)?;
        if let Some(latest_start) = self.latest_era_start() {
            if start_height <= latest_start {
                return Err(FeeError::EraNotAppended {
                    start_height,
                    latest_start,
                });
            }
        }
        self.eras.insert(start_height, params);
        Ok(())
    }

    /// Start height of the last era, if any.
    pub fn latest_era_start(&self) -> Option<u64> {
        self.eras.keys().next_back().copied()
    }

    /// Parameters in effect at `height`: the era with the greatest start
    /// height `<= height`.
    pub fn parameters_at(&self, height: u64) -> Option<&FeeParameters> {
        self.eras
            .range(..=height)
            .next_back()
            .map(|(_, params)| params)
    }

    /// Start height of the era in effect at `height`.
    pub fn era_start_at(&self, height: u64) -> Option<u64> {
        self.eras.range(..=height).next_back().map(|(start, _)| *start)
    }

    /// All eras in ascending start-height order.
    pub fn eras(&self) -> impl Iterator<Item = (u64, &FeeParameters)> {
        self.eras.iter().map(|(start, params)| (*start, params))
    }

    pub fn len(&self) -> usize {
        self.eras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eras.is_empty()
    }

    /// Seal the block described by `state` and derive the next block's
    /// weight fee.
    ///
    /// When the numerator changes, a new era is recorded at `state.height + 1`.
    /// An era already scheduled at that height is left in place.  Returns the
    /// child block's weight state.
    pub fn advance_block(
        &mut self,
        config: &FeeAdjustmentConfig,
        state: &BlockWeightState,
    ) -> Result<BlockWeightState, FeeError> {
        validate_adjustment_config(config)?;

        let next_height = state.height.checked_add(1).ok_or(FeeError::Overflow)?;
        let current = self
            .parameters_at(state.height)
            .cloned()
            .ok_or(FeeError::MissingParameters {
                height: state.height,
            })?;

        if let Some(scheduled) = self.eras.get(&next_height) {
            return Ok(state.next_block(scheduled.weight_fee_numerator, next_height));
        }

        let sealed = state.next_block(current.weight_fee_numerator, next_height);
        let next_weight_fee = calculate_next_weight_fee(config, &sealed);

        if next_weight_fee != current.weight_fee_numerator {
            info!(
                "fee schedule: height={} weight_fee_numerator {} -> {} (weight_used={})",
                next_height,
                current.weight_fee_numerator,
                next_weight_fee,
                state.current_weight_used,
            );
            // `next_height` is vacant but may sit below an era scheduled
            // further ahead.
            let params = current.with_weight_fee_numerator(next_weight_fee);
            validate_parameters(&params)?;
            self.eras.insert(next_height, params);
        }

        Ok(state.next_block(next_weight_fee, next_height))
    }
}

impl FeeParameterSource for FeeSchedule {
    fn fee_parameters(&self, height: u64) -> Option<FeeParameters> {
        self.parameters_at(height).cloned()
    }
}
