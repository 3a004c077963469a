mod cli;
mod commands;
mod config;
mod report;

use clap::Parser;
use config::CliOverrides;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pixeldiff=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Init { force } => {
            commands::init(force)?;
        }
        cli::Command::Compare {
            before,
            after,
            threshold,
            max_file_size_mib,
            output,
            json,
            fail_on_diff,
        } => {
            let settings = config::resolve_settings(CliOverrides {
                threshold,
                max_file_size_mib,
            })?;
            let args = commands::CompareArgs {
                before,
                after,
                output,
                json,
                fail_on_diff,
            };
            let code = commands::compare(settings, args).await?;
            std::process::exit(code);
        }
    }

    Ok(())
}
