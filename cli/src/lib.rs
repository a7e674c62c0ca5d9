//! Offline audit tool for Tally fees.
//!
//! Every fee the settlement engine charges can be recomputed here from the
//! engine configuration and the transaction's height, encoded length and
//! weight.

pub mod clap_app;
pub mod cli;
pub mod fees;

use {
    crate::cli::{CliCommand, CliConfig, CliError, OutputFormat},
    clap::ArgMatches,
};

/// Parse global options and the subcommand.
pub fn parse_command(matches: &ArgMatches<'_>) -> Result<(CliConfig, CliCommand), CliError> {
    let sub_matches = matches.subcommand().1;
    let global = |name: &str| {
        sub_matches
            .and_then(|sub| sub.value_of(name))
            .or_else(|| matches.value_of(name))
            .map(str::to_string)
    };

    let config = CliConfig {
        config_path: global("config_file").map(Into::into),
        output_format: OutputFormat::from_matches(global("output_format").as_deref()),
    };
    let command = fees::parse_fee_command(matches)?;
    Ok((config, command))
}
