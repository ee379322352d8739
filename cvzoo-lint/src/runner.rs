//! Walking the inputs and dispatching files to a [`Checker`].

use std::{
    collections::HashSet,
    io::Write,
    path::{Path, PathBuf},
};

use rayon::prelude::*;

use crate::{
    checker::{CheckOutcome, Checker},
    config::FileType,
    enumerate::{enumerate, enumerate_existing},
    error::{LintError, LintResult},
    report::LintReport,
    source::{classify, SourceKind},
};

/// What to lint in one run.
#[derive(Debug, Clone)]
pub struct LintRequest {
    pub file_type: FileType,
    pub paths: Vec<PathBuf>,
    pub exclude_paths: Vec<PathBuf>,
    pub jobs: usize,
}

impl LintRequest {
    pub fn new(file_type: FileType, paths: Vec<PathBuf>) -> Self {
        Self {
            file_type,
            paths,
            exclude_paths: Vec::new(),
            jobs: 1,
        }
    }

    pub fn with_exclude_paths(mut self, exclude_paths: Vec<PathBuf>) -> Self {
        self.exclude_paths = exclude_paths;
        self
    }

    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }
}

/// Drives a [`Checker`] over files and collects the results.
#[derive(Debug)]
pub struct Linter<C> {
    checker: C,
}

impl<C: Checker> Linter<C> {
    pub const fn new(checker: C) -> Self {
        Self { checker }
    }

    pub const fn checker(&self) -> &C {
        &self.checker
    }

    /// Checks `path` unless it is excluded, contains `#` or has an extension
    /// outside `allowed`. Returns whether the file was checked.
    pub fn classify_and_process(
        &self,
        path: &Path,
        allowed: &HashSet<&str>,
        excluded: &HashSet<PathBuf>,
        report: &mut LintReport,
        diagnostics: &mut dyn Write,
    ) -> LintResult<bool> {
        let Some(kind) = classify(path, allowed, excluded) else {
            tracing::trace!(path = %path.display(), "skipping file");
            return Ok(false);
        };
        let outcome = self.process(path, kind)?;
        echo(&outcome, diagnostics)?;
        report.record(kind, path.display().to_string(), outcome.errors);
        Ok(true)
    }

    fn process(&self, path: &Path, kind: SourceKind) -> LintResult<CheckOutcome> {
        tracing::debug!(path = %path.display(), %kind, "checking file");
        self.checker.check(path, kind)
    }

    /// Lints every file selected by `request`.
    ///
    /// Checker output is echoed to `diagnostics` as files complete.
    ///
    /// # Errors
    ///
    /// Fails on the first unreadable input or checker failure.
    pub fn run(&self, request: &LintRequest, diagnostics: &mut dyn Write) -> LintResult<LintReport> {
        let allowed = request.file_type.allowed_extensions();
        let excluded: HashSet<PathBuf> = enumerate_existing(&request.exclude_paths)?
            .into_iter()
            .collect();
        let files = enumerate(&request.paths)?;

        let report = if request.jobs <= 1 {
            let mut report = LintReport::new();
            for path in &files {
                self.classify_and_process(path, &allowed, &excluded, &mut report, diagnostics)?;
            }
            report
        } else {
            let selected: Vec<(PathBuf, SourceKind)> = files
                .into_iter()
                .filter_map(|path| {
                    let kind = classify(&path, &allowed, &excluded)?;
                    Some((path, kind))
                })
                .collect();
            self.run_parallel(&selected, request.jobs, diagnostics)?
        };

        tracing::info!(
            files = report.len(),
            failed = report.failed(),
            "lint run finished"
        );
        Ok(report)
    }

    fn run_parallel(
        &self,
        selected: &[(PathBuf, SourceKind)],
        jobs: usize,
        diagnostics: &mut dyn Write,
    ) -> LintResult<LintReport> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
        let partial = pool.install(|| {
            selected
                .par_iter()
                .map(|(path, kind)| {
                    let outcome = self.process(path, *kind)?;
                    let mut report = LintReport::new();
                    report.record(*kind, path.display().to_string(), outcome.errors);
                    Ok::<_, LintError>(PartialRun {
                        report,
                        messages: outcome.messages,
                    })
                })
                .try_reduce(PartialRun::default, |mut left, right| {
                    left.merge(right);
                    Ok(left)
                })
        })?;

        for message in &partial.messages {
            writeln!(diagnostics, "{message}").map_err(LintError::Output)?;
        }
        Ok(partial.report)
    }
}

/// Results of the files one worker has checked so far.
#[derive(Debug, Default)]
struct PartialRun {
    report: LintReport,
    messages: Vec<String>,
}

impl PartialRun {
    fn merge(&mut self, other: Self) {
        self.report.merge(other.report);
        self.messages.extend(other.messages);
    }
}

fn echo(outcome: &CheckOutcome, diagnostics: &mut dyn Write) -> LintResult<()> {
    for message in &outcome.messages {
        writeln!(diagnostics, "{message}").map_err(LintError::Output)?;
    }
    Ok(())
}
