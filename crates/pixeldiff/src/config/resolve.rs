use anyhow::{Context, Result};

use super::{Config, load, validate_max_file_size_mib};
use pixeldiff::compare::CompareSettings;
use pixeldiff::load::{Limits, MIB};

const ENV_THRESHOLD: &str = "PIXELDIFF_THRESHOLD";
const ENV_MAX_FILE_SIZE_MIB: &str = "PIXELDIFF_MAX_FILE_SIZE_MIB";

/// Values extracted from the CLI that participate in the merge.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub threshold: Option<u8>,
    pub max_file_size_mib: Option<u64>,
}

/// CLI > env > file > defaults, reading the file from the working directory
/// and the process environment.
pub fn resolve_settings(cli: CliOverrides) -> Result<CompareSettings> {
    let file_config = load().context("Failed to load configuration")?;
    merge(file_config, |key| std::env::var(key).ok(), cli)
}

fn merge(
    file: Config,
    env: impl Fn(&str) -> Option<String>,
    cli: CliOverrides,
) -> Result<CompareSettings> {
    let env_threshold: Option<u8> = env(ENV_THRESHOLD)
        .map(|v| v.trim().parse::<u8>())
        .transpose()
        .with_context(|| format!("{ENV_THRESHOLD} must be an integer between 0 and 255"))?;
    let env_max_mib: Option<u64> = env(ENV_MAX_FILE_SIZE_MIB)
        .map(|v| v.trim().parse::<u64>())
        .transpose()
        .with_context(|| format!("{ENV_MAX_FILE_SIZE_MIB} must be a positive integer"))?;

    let threshold = cli
        .threshold
        .or(env_threshold)
        .unwrap_or(file.diff.threshold);

    let max_file_size_mib = cli
        .max_file_size_mib
        .or(env_max_mib)
        .unwrap_or(file.input.max_file_size_mib);
    validate_max_file_size_mib(max_file_size_mib).map_err(|e| anyhow::anyhow!("{e}"))?;

    Ok(CompareSettings {
        threshold,
        limits: Limits {
            max_file_size: max_file_size_mib.saturating_mul(MIB),
            allowed_formats: file.input.allowed_formats,
        },
    })
}
