use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config;

fn parse_max_file_size_mib(s: &str) -> Result<u64, String> {
    let v: u64 = s.parse().map_err(|e| format!("{e}"))?;
    config::validate_max_file_size_mib(v)
}

#[derive(Parser)]
#[command(
    name = "pixeldiff",
    about = "Compare two same-sized images and highlight the pixels that changed"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create .pixeldiff/config.toml with default settings
    Init {
        /// Overwrite an existing config
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Compare BEFORE against AFTER and report the difference percentage
    Compare {
        /// "Before" image (JPEG, PNG, GIF or WebP)
        before: Option<PathBuf>,
        /// "After" image, same dimensions as BEFORE
        after: Option<PathBuf>,
        /// Per-channel tolerance (0-255). Channels must differ by more than this.
        #[arg(long, short = 't')]
        threshold: Option<u8>,
        /// Largest accepted input file, in MiB (overrides config)
        #[arg(long, value_parser = parse_max_file_size_mib)]
        max_file_size_mib: Option<u64>,
        /// Save the overlay PNG into DIR
        #[arg(long, short = 'o', value_name = "DIR")]
        output: Option<PathBuf>,
        /// Print a JSON summary instead of the text report
        #[arg(long)]
        json: bool,
        /// Exit with status 1 when any pixel differs
        #[arg(long)]
        fail_on_diff: bool,
    },
}
