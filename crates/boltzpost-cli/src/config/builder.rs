use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{RenumberConfig, SplitConfig};
use crate::cli::{RenumberArgs, SplitArgs};
use crate::error::{CliError, Result};
use boltzpost::engine::renumber::parse_start_index;
use std::path::Path;

/// Merges `renumber` arguments over the config file over the defaults.
pub fn build_renumber_config(
    args: &RenumberArgs,
    config_path: Option<&Path>,
) -> Result<RenumberConfig> {
    let defaults = DefaultsConfig::default();
    let file = FileConfig::load(config_path)?.renumber.unwrap_or_default();

    if args.output.is_some() && args.inputs.len() > 1 {
        return Err(CliError::Argument(format!(
            "--output can only be used with a single input, got {}",
            args.inputs.len()
        )));
    }
    let start_index =
        parse_start_index(&args.start).map_err(|e| CliError::Argument(e.to_string()))?;

    let output_suffix = file.output_suffix.unwrap_or(defaults.output_suffix);
    if output_suffix.is_empty() && args.output.is_none() {
        return Err(CliError::Config(
            "`renumber.output-suffix` must not be empty; it would overwrite the input".to_string(),
        ));
    }

    Ok(RenumberConfig {
        inputs: args.inputs.clone(),
        start_index,
        chain: args.chain.clone(),
        output: args.output.clone(),
        format: args.format.or(file.format).unwrap_or(defaults.format),
        output_suffix,
    })
}

/// Merges `split` arguments over the config file over the defaults.
pub fn build_split_config(args: &SplitArgs, config_path: Option<&Path>) -> Result<SplitConfig> {
    let defaults = DefaultsConfig::default();
    let file = FileConfig::load(config_path)?.split.unwrap_or_default();

    if args.sample == Some(0) {
        return Err(CliError::Argument(
            "--sample is 1-based; the first sample is 1".to_string(),
        ));
    }

    Ok(SplitConfig {
        inputs: args.inputs.clone(),
        sample: args.sample,
        output_dir: args.output_dir.clone().or(file.output_dir),
        write_csv: args
            .csv
            .choice()
            .or(file.csv)
            .unwrap_or(defaults.write_csv),
    })
}
