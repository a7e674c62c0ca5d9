use {
    std::{fmt, path::PathBuf},
    tally_fee_market::{Balance, FeeError, Weight, UNIT},
    tally_settlement::ConfigError,
    thiserror::Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Display,
    Json,
    JsonCompact,
}

impl OutputFormat {
    pub fn from_matches(value: Option<&str>) -> Self {
        match value {
            Some("json") => Self::Json,
            Some("json-compact") => Self::JsonCompact,
            _ => Self::Display,
        }
    }

    /// Render `item` as this format asks.
    pub fn formatted_string<T: fmt::Display + serde::Serialize>(
        &self,
        item: &T,
    ) -> Result<String, CliError> {
        Ok(match self {
            Self::Display => item.to_string(),
            Self::Json => serde_json::to_string_pretty(item)?,
            Self::JsonCompact => serde_json::to_value(item)?.to_string(),
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum CliCommand {
    Estimate {
        height: u64,
        weight: Weight,
        length: u32,
        tip: Balance,
    },
    Schedule,
    Simulate {
        blocks: u64,
        utilization_pct: u8,
    },
}

#[derive(Debug, Default)]
pub struct CliConfig {
    /// Engine config file; built-in genesis parameters when absent.
    pub config_path: Option<PathBuf>,
    pub output_format: OutputFormat,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Bad parameter: {0}")]
    BadParameter(String),
    #[error("Command not recognized: {0}")]
    CommandNotRecognized(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fee(#[from] FeeError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type ProcessResult = Result<String, CliError>;

/// Render `amount` in whole units, e.g. `0.099732124`.
pub fn format_balance(amount: Balance) -> String {
    let whole = amount / UNIT;
    let fraction = amount % UNIT;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{fraction:015}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
