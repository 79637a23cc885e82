use std::process::ExitCode;

use brrtcors::cli::{run_cli, Cli};
use brrtcors::logging::{init_logging_with_config, LogConfig};
use clap::Parser;

fn main() -> anyhow::Result<ExitCode> {
    init_logging_with_config(&LogConfig::from_env())?;
    let cli = Cli::parse();
    let allowed = run_cli(&cli, &mut std::io::stdout().lock())?;
    Ok(if allowed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
