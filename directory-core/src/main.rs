//! Customer directory entry-point: loads settings, bootstraps the store and
//! remote source, loads records, and runs one command.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use directory_core::inbound::{Cli, Command, run_command};
use directory_core::{DirectorySettings, build_directory};

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    // Logs go to stderr so command output on stdout stays machine-readable.
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = DirectorySettings::load_from_env()
        .map_err(|err| eyre!("failed to load settings: {err}"))?;

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build directory runtime")?;

    runtime.block_on(run(settings, cli.command))
}

async fn run(settings: DirectorySettings, command: Command) -> Result<ExitCode> {
    let directory = build_directory(&settings)
        .await
        .wrap_err("failed to start customer directory")?;
    directory.load_customers().await;

    let result = run_command(&directory, command, &mut io::stdout(), &mut io::stderr()).await;
    directory.shutdown().await;

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            if let Err(write_err) = writeln!(io::stderr(), "error: {err}") {
                drop(write_err);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
