use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cvzoo_lint::{exit_code, lint, ExternalCheckers, LintArgs, Linter};
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = LintArgs::parse();
    let linter = Linter::new(ExternalCheckers::new(args.config()));

    let mut stderr = std::io::stderr();
    let failed = lint(&linter, &args.request(), &mut stderr).context("lint run failed")?;
    Ok(ExitCode::from(exit_code(failed)))
}
