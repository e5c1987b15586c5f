use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rangetest::{Dispatcher, ReferenceDataset, Suite};

use crate::cli::Args;

mod cli;

/// Exit status for `--strict` runs with at least one failed scenario.
const FAILED_SCENARIOS: u8 = 2;

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_args() -> std::result::Result<Args, ExitCode> {
    Args::try_parse().map_err(|err| match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            ExitCode::SUCCESS
        }
        _ => {
            // usage errors go to stderr with status 1
            let _ = err.print();
            ExitCode::from(1)
        }
    })
}

async fn run(args: Args) -> Result<ExitCode> {
    let dataset = ReferenceDataset::embedded().context("failed to load reference payload")?;
    let dispatcher = Dispatcher::new(args.url.clone(), &args.client_config())
        .context("failed to build HTTP client")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = Suite::new(dispatcher, dataset).run(&mut out).await?;
    out.flush()?;

    if args.strict && !report.all_passed() {
        return Ok(ExitCode::from(FAILED_SCENARIOS));
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };
    setup_tracing();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}
