//! Engine configuration, loaded from YAML.
//!
//! ```yaml
//! treasury: ~                 # omitted or null: the py/trsry module account
//! max_transaction_weight: 2000000000000
//! eras:
//!   - start_height: 0
//!     parameters:
//!       base_fee: 10000000000000
//!       length_fee_per_byte: 1000000000
//!       weight_fee_numerator: 228000000
//!       weight_fee_denominator: 1000
//!       extrinsic_base_weight: 125000000
//!       rounding: down
//! adjustment:                 # optional; fees are static without it
//!   min_weight_fee: 228000000
//!   max_weight_fee: 228000000000
//!   target_utilization_pct: 50
//!   max_block_weight: 2000000000000
//!   change_denominator: 8
//! ```

use {
    crate::{engine::FeeSettlementEngine, error::ConfigError, treasury_account},
    serde::{Deserialize, Serialize},
    std::{fs, path::Path},
    tally_accounts::AccountId,
    tally_fee_market::{
        calculator::{validate_adjustment_config, validate_parameters},
        FeeAdjustmentConfig, FeeParameters, FeeSchedule, Weight,
    },
};

/// Fee parameters taking effect at `start_height`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EraConfig {
    pub start_height: u64,
    pub parameters: FeeParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Account credited with fees. Defaults to the treasury module account.
    #[serde(default)]
    pub treasury: Option<AccountId>,

    /// Largest weight a single transaction may declare.
    #[serde(default)]
    pub max_transaction_weight: Option<Weight>,

    pub eras: Vec<EraConfig>,

    /// Utilization-driven weight-fee adjustment.
    #[serde(default)]
    pub adjustment: Option<FeeAdjustmentConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            treasury: None,
            max_transaction_weight: None,
            eras: vec![EraConfig {
                start_height: 0,
                parameters: FeeParameters::default(),
            }],
            adjustment: None,
        }
    }
}

impl EngineConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.eras.is_empty() {
            return Err(ConfigError::NoEras);
        }
        for pair in self.eras.windows(2) {
            let (previous, next) = (pair[0].start_height, pair[1].start_height);
            if next <= previous {
                return Err(ConfigError::UnorderedEras { previous, next });
            }
        }
        for era in &self.eras {
            validate_parameters(&era.parameters).map_err(|source| ConfigError::InvalidEra {
                start_height: era.start_height,
                source,
            })?;
        }
        if let Some(adjustment) = &self.adjustment {
            validate_adjustment_config(adjustment).map_err(ConfigError::InvalidAdjustment)?;
        }
        Ok(())
    }

    pub fn build_schedule(&self) -> Result<FeeSchedule, ConfigError> {
        self.validate()?;
        let mut schedule = FeeSchedule::new();
        for era in &self.eras {
            schedule
                .insert_era(era.start_height, era.parameters.clone())
                .map_err(|source| ConfigError::InvalidEra {
                    start_height: era.start_height,
                    source,
                })?;
        }
        Ok(schedule)
    }

    /// The configured treasury, or the module account derived from `py/trsry`.
    pub fn treasury_account(&self) -> AccountId {
        self.treasury.unwrap_or_else(treasury_account)
    }

    /// Largest weight one transaction may declare: the explicit limit, else
    /// the adjustment's block capacity, else unbounded.
    pub fn max_transaction_weight(&self) -> Weight {
        self.max_transaction_weight
            .or_else(|| self.adjustment.as_ref().map(|a| a.max_block_weight))
            .unwrap_or(Weight::MAX)
    }

    pub fn build_engine(&self) -> Result<FeeSettlementEngine<FeeSchedule>, ConfigError> {
        Ok(
            FeeSettlementEngine::new(self.build_schedule()?, self.treasury_account())
                .with_max_transaction_weight(self.max_transaction_weight()),
        )
    }
}
