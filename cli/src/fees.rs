use {
    crate::cli::{format_balance, CliCommand, CliConfig, CliError, ProcessResult},
    clap::{value_t_or_exit, App, Arg, ArgMatches, SubCommand},
    log::info,
    serde::Serialize,
    std::fmt,
    tally_fee_market::{
        calculator::calculate_transaction_fee, weights, Balance, BlockWeightState,
        FeeAdjustmentConfig, FeeParameters, RoundingMode, Weight,
    },
    tally_settlement::EngineConfig,
};

/// Encoded length of the reference balance transfer.
const REFERENCE_TRANSFER_LEN: u32 = 181;

// ── Output Structs ──────────────────────────────────────────────────
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliFeeEstimate {
    pub height: u64,
    pub era_start_height: u64,
    pub encoded_len: u32,
    pub weight: Weight,
    pub base_fee: Balance,
    pub length_fee: Balance,
    pub weight_fee: Balance,
    pub tip: Balance,
    pub total_fee: Balance,
}

impl fmt::Display for CliFeeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fee estimate at height {}", self.height)?;
        writeln!(f, "  Era start:     {}", self.era_start_height)?;
        writeln!(f, "  Encoded len:   {} bytes", self.encoded_len)?;
        writeln!(f, "  Weight:        {}", self.weight)?;
        writeln!(f, "  Base fee:      {}", self.base_fee)?;
        writeln!(f, "  Length fee:    {}", self.length_fee)?;
        writeln!(f, "  Weight fee:    {}", self.weight_fee)?;
        writeln!(f, "  Tip:           {}", self.tip)?;
        writeln!(
            f,
            "  Total fee:     {} ({} UNIT)",
            self.total_fee,
            format_balance(self.total_fee)
        )?;
        Ok(())
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliFeeParameters {
    pub base_fee: Balance,
    pub length_fee_per_byte: Balance,
    pub weight_fee_numerator: Balance,
    pub weight_fee_denominator: Balance,
    pub extrinsic_base_weight: Weight,
    pub rounding: RoundingMode,
}

impl From<&FeeParameters> for CliFeeParameters {
    fn from(params: &FeeParameters) -> Self {
        Self {
            base_fee: params.base_fee,
            length_fee_per_byte: params.length_fee_per_byte,
            weight_fee_numerator: params.weight_fee_numerator,
            weight_fee_denominator: params.weight_fee_denominator,
            extrinsic_base_weight: params.extrinsic_base_weight,
            rounding: params.rounding,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliFeeAdjustment {
    pub min_weight_fee: Balance,
    pub max_weight_fee: Balance,
    pub target_utilization_pct: u8,
    pub max_block_weight: Weight,
    pub change_denominator: u64,
}

impl From<&FeeAdjustmentConfig> for CliFeeAdjustment {
    fn from(config: &FeeAdjustmentConfig) -> Self {
        Self {
            min_weight_fee: config.min_weight_fee,
            max_weight_fee: config.max_weight_fee,
            target_utilization_pct: config.target_utilization_pct,
            max_block_weight: config.max_block_weight,
            change_denominator: config.change_denominator,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliFeeEra {
    pub start_height: u64,
    pub parameters: CliFeeParameters,
    pub reference_transfer_fee: Balance,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliFeeSchedule {
    pub treasury: String,
    pub eras: Vec<CliFeeEra>,
    pub adjustment: Option<CliFeeAdjustment>,
}

impl fmt::Display for CliFeeSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tally Fee Schedule")?;
        writeln!(f, "  Treasury: {}", self.treasury)?;
        for era in &self.eras {
            let p = &era.parameters;
            writeln!(f, "  From height {}:", era.start_height)?;
            writeln!(f, "    Base fee:         {}", p.base_fee)?;
            writeln!(f, "    Length fee/byte:  {}", p.length_fee_per_byte)?;
            writeln!(
                f,
                "    Weight fee:       {} / {} ({:?})",
                p.weight_fee_numerator, p.weight_fee_denominator, p.rounding
            )?;
            writeln!(f, "    Extrinsic weight: {}", p.extrinsic_base_weight)?;
            writeln!(
                f,
                "    Transfer fee:     {} UNIT",
                format_balance(era.reference_transfer_fee)
            )?;
        }
        match &self.adjustment {
            Some(adjustment) => {
                writeln!(
                    f,
                    "  Adjustment: target {}% of {}, step 1/{}, weight fee in [{}, {}]",
                    adjustment.target_utilization_pct,
                    adjustment.max_block_weight,
                    adjustment.change_denominator,
                    adjustment.min_weight_fee,
                    adjustment.max_weight_fee,
                )?;
            }
            None => writeln!(f, "  Adjustment: none (static fees)")?,
        }
        Ok(())
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliSimulatedBlock {
    pub height: u64,
    pub weight_fee_numerator: Balance,
    pub reference_transfer_fee: Balance,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliSimulation {
    pub utilization_pct: u8,
    pub weight_per_block: Weight,
    pub blocks: Vec<CliSimulatedBlock>,
}

impl fmt::Display for CliSimulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Simulated {} blocks at {}% utilization ({} weight per block)",
            self.blocks.len(),
            self.utilization_pct,
            self.weight_per_block
        )?;
        writeln!(f, "  {:>8}  {:>20}  {:>24}", "Height", "Weight fee", "Transfer fee (UNIT)")?;
        for block in &self.blocks {
            writeln!(
                f,
                "  {:>8}  {:>20}  {:>24}",
                block.height,
                block.weight_fee_numerator,
                format_balance(block.reference_transfer_fee)
            )?;
        }
        Ok(())
    }
}

// ── Subcommand Definition (clap) ────────────────────────────────────
pub trait FeeSubCommands {
    fn fee_subcommands(self) -> Self;
}

fn is_parsable<T: std::str::FromStr>(value: String) -> Result<(), String> {
    value
        .parse::<T>()
        .map(|_| ())
        .map_err(|_| format!("Unable to parse '{value}'"))
}

fn is_percentage(value: String) -> Result<(), String> {
    match value.parse::<u8>() {
        Ok(pct) if pct <= 100 => Ok(()),
        _ => Err(format!("'{value}' is not a percentage between 0 and 100")),
    }
}

impl FeeSubCommands for App<'_, '_> {
    fn fee_subcommands(self) -> Self {
        self.subcommand(
            SubCommand::with_name("estimate")
                .about("Compute the fee a transaction pays at a given height")
                .arg(
                    Arg::with_name("height")
                        .long("height")
                        .value_name("HEIGHT")
                        .takes_value(true)
                        .default_value("0")
                        .validator(is_parsable::<u64>)
                        .help("Block height whose fee parameters apply"),
                )
                .arg(
                    Arg::with_name("weight")
                        .long("weight")
                        .value_name("WEIGHT")
                        .takes_value(true)
                        .required(true)
                        .validator(is_parsable::<u64>)
                        .help("Weight consumed by the call"),
                )
                .arg(
                    Arg::with_name("length")
                        .long("length")
                        .value_name("BYTES")
                        .takes_value(true)
                        .required(true)
                        .validator(is_parsable::<u32>)
                        .help("Encoded length of the signed transaction"),
                )
                .arg(
                    Arg::with_name("tip")
                        .long("tip")
                        .value_name("AMOUNT")
                        .takes_value(true)
                        .default_value("0")
                        .validator(is_parsable::<u128>)
                        .help("Tip in smallest units"),
                ),
        )
        .subcommand(
            SubCommand::with_name("schedule").about("Print every fee era and the adjustment rule"),
        )
        .subcommand(
            SubCommand::with_name("simulate")
                .about("Simulate the weight-fee adjustment over a run of blocks")
                .arg(
                    Arg::with_name("blocks")
                        .long("blocks")
                        .value_name("COUNT")
                        .takes_value(true)
                        .default_value("10")
                        .validator(is_parsable::<u64>)
                        .help("Number of blocks to simulate"),
                )
                .arg(
                    Arg::with_name("utilization")
                        .long("utilization")
                        .value_name("PERCENT")
                        .takes_value(true)
                        .required(true)
                        .validator(is_percentage)
                        .help("Weight used by every block, as a percentage of capacity"),
                ),
        )
    }
}

// ── Argument Parsing ────────────────────────────────────────────────
pub fn parse_fee_command(matches: &ArgMatches<'_>) -> Result<CliCommand, CliError> {
    match matches.subcommand() {
        ("estimate", Some(matches)) => Ok(CliCommand::Estimate {
            height: value_t_or_exit!(matches, "height", u64),
            weight: value_t_or_exit!(matches, "weight", u64),
            length: value_t_or_exit!(matches, "length", u32),
            tip: value_t_or_exit!(matches, "tip", u128),
        }),
        ("schedule", Some(_matches)) => Ok(CliCommand::Schedule),
        ("simulate", Some(matches)) => Ok(CliCommand::Simulate {
            blocks: value_t_or_exit!(matches, "blocks", u64),
            utilization_pct: value_t_or_exit!(matches, "utilization", u8),
        }),
        (name, _) => Err(CliError::CommandNotRecognized(name.to_string())),
    }
}

// ── Command Processing ──────────────────────────────────────────────
pub fn process_command(config: &CliConfig, command: &CliCommand) -> ProcessResult {
    let engine_config = load_engine_config(config)?;
    match command {
        CliCommand::Estimate {
            height,
            weight,
            length,
            tip,
        } => process_estimate(config, &engine_config, *height, *weight, *length, *tip),
        CliCommand::Schedule => process_schedule(config, &engine_config),
        CliCommand::Simulate {
            blocks,
            utilization_pct,
        } => process_simulate(config, &engine_config, *blocks, *utilization_pct),
    }
}

fn load_engine_config(config: &CliConfig) -> Result<EngineConfig, CliError> {
    match &config.config_path {
        Some(path) => {
            info!("loading engine config from {}", path.display());
            Ok(EngineConfig::load(path)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn reference_transfer_fee(params: &FeeParameters) -> Result<Balance, CliError> {
    Ok(calculate_transaction_fee(
        params,
        REFERENCE_TRANSFER_LEN,
        weights::balances::transfer(),
        0,
    )?
    .total_fee)
}

fn process_estimate(
    config: &CliConfig,
    engine_config: &EngineConfig,
    height: u64,
    weight: Weight,
    length: u32,
    tip: Balance,
) -> ProcessResult {
    let schedule = engine_config.build_schedule()?;
    let (params, era_start_height) = schedule
        .parameters_at(height)
        .zip(schedule.era_start_at(height))
        .ok_or_else(|| CliError::BadParameter(format!("no fee parameters at height {height}")))?;
    let fee = calculate_transaction_fee(params, length, weight, tip)?;

    let estimate = CliFeeEstimate {
        height,
        era_start_height,
        encoded_len: length,
        weight,
        base_fee: fee.base_fee,
        length_fee: fee.length_fee,
        weight_fee: fee.weight_fee,
        tip: fee.tip,
        total_fee: fee.total_fee,
    };
    config.output_format.formatted_string(&estimate)
}

fn process_schedule(config: &CliConfig, engine_config: &EngineConfig) -> ProcessResult {
    let schedule = engine_config.build_schedule()?;
    let eras = schedule
        .eras()
        .map(|(start_height, params)| {
            Ok(CliFeeEra {
                start_height,
                parameters: CliFeeParameters::from(params),
                reference_transfer_fee: reference_transfer_fee(params)?,
            })
        })
        .collect::<Result<Vec<_>, CliError>>()?;

    let output = CliFeeSchedule {
        treasury: engine_config.treasury_account().to_string(),
        eras,
        adjustment: engine_config.adjustment.as_ref().map(CliFeeAdjustment::from),
    };
    config.output_format.formatted_string(&output)
}

fn process_simulate(
    config: &CliConfig,
    engine_config: &EngineConfig,
    blocks: u64,
    utilization_pct: u8,
) -> ProcessResult {
    let adjustment = engine_config.adjustment.clone().ok_or_else(|| {
        CliError::BadParameter("config has no adjustment section; fees are static".to_string())
    })?;
    if utilization_pct > 100 {
        return Err(CliError::BadParameter(format!(
            "utilization {utilization_pct}% is above 100%"
        )));
    }

    let mut schedule = engine_config.build_schedule()?;
    let genesis = schedule
        .parameters_at(0)
        .ok_or_else(|| CliError::BadParameter("no fee parameters at height 0".to_string()))?;
    let weight_per_block = adjustment
        .max_block_weight
        .saturating_mul(utilization_pct as u64)
        / 100;

    let mut state = BlockWeightState::genesis(genesis.weight_fee_numerator);
    let mut simulated = Vec::new();
    for _ in 0..blocks {
        state.record_weight(weight_per_block);
        state = schedule.advance_block(&adjustment, &state)?;
        let params = schedule.parameters_at(state.height).ok_or_else(|| {
            CliError::BadParameter(format!("no fee parameters at height {}", state.height))
        })?;
        simulated.push(CliSimulatedBlock {
            height: state.height,
            weight_fee_numerator: params.weight_fee_numerator,
            reference_transfer_fee: reference_transfer_fee(params)?,
        });
    }

    let output = CliSimulation {
        utilization_pct,
        weight_per_block,
        blocks: simulated,
    };
    config.output_format.formatted_string(&output)
}
