//! Command line arguments of the `cvzoo-lint` binary.

use std::{io::Write, path::PathBuf};

use clap::Parser;

use crate::{
    checker::Checker,
    config::{FileType, LintConfig},
    error::{LintError, LintResult},
    runner::{LintRequest, Linter},
};

#[derive(Parser, Debug, Clone)]
#[command(name = "cvzoo-lint")]
#[command(about = "Run cpplint and pylint over source trees and summarize the results")]
pub struct LintArgs {
    /// Project name, used in header guards of files under `src/`
    pub project: String,

    /// Languages to check
    #[arg(value_enum)]
    pub filetype: FileType,

    /// Files or directories to check
    #[arg(required = true, num_args = 1..)]
    pub path: Vec<PathBuf>,

    /// Files or directories to skip
    #[arg(long = "exclude_path", visible_alias = "exclude-path", num_args = 1.., value_name = "PATH")]
    pub exclude_path: Vec<PathBuf>,

    /// pylint rc file replacing the default pylint options
    #[arg(long = "pylint-rc", visible_alias = "pylint_rc", value_name = "FILE")]
    pub pylint_rc: Option<PathBuf>,

    /// Number of files checked concurrently
    #[arg(long, default_value_t = 1)]
    pub jobs: usize,
}

impl LintArgs {
    pub fn config(&self) -> LintConfig {
        let config = LintConfig::new(self.project.clone());
        match &self.pylint_rc {
            Some(rc_file) => config.with_pylint_rc(rc_file),
            None => config,
        }
    }

    pub fn request(&self) -> LintRequest {
        LintRequest::new(self.filetype, self.path.clone())
            .with_exclude_paths(self.exclude_path.clone())
            .with_jobs(self.jobs)
    }
}

/// Runs `request`, echoing checker output and then the summary to `out`.
/// Returns the number of failing files.
pub fn lint<C: Checker>(
    linter: &Linter<C>,
    request: &LintRequest,
    out: &mut dyn Write,
) -> LintResult<usize> {
    let report = linter.run(request, out)?;
    report.summarize(out).map_err(LintError::Output)
}
