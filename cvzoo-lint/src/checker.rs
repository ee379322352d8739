//! Checker dispatch and the external cpplint/pylint integrations.

use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

use crate::{
    config::LintConfig,
    error::{LintError, LintResult},
    header_guard::{check_header_guard, header_guard, repository_name},
    report::FileResult,
    source::{needs_header_guard, SourceKind, CXX_EXTENSIONS},
};

/// Template that puts the category after the last `:` of every pylint message.
pub const PYLINT_MSG_TEMPLATE: &str =
    "{path}:{line}:{column}: [{msg_id}] {msg}: {category} ({symbol})";

/// Pylint categories that count as lint errors.
pub const PYLINT_CATEGORIES: [&str; 4] = ["error", "warning", "convention", "refactor"];

/// Result of checking a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Error count per top-level category; zero counts are never stored.
    pub errors: FileResult,
    /// Checker output to echo to the user.
    pub messages: Vec<String>,
}

impl CheckOutcome {
    pub fn add_error(&mut self, category: &str) {
        *self.errors.entry(category.to_string()).or_default() += 1;
    }
}

/// Checks one file of a known kind.
pub trait Checker: Sync {
    fn check(&self, path: &Path, kind: SourceKind) -> LintResult<CheckOutcome>;
}

/// Runs cpplint or pylint in a child process per file.
#[derive(Debug, Clone)]
pub struct ExternalCheckers {
    config: LintConfig,
}

impl ExternalCheckers {
    pub const fn new(config: LintConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &LintConfig {
        &self.config
    }

    fn check_cpp(&self, path: &Path) -> LintResult<CheckOutcome> {
        let mut outcome = CheckOutcome::default();
        if needs_header_guard(path) {
            self.check_guard(path, &mut outcome)?;
        }

        let args = vec![
            format!("--extensions={}", CXX_EXTENSIONS.join(",")),
            format!("--filter={}", self.config.cpplint_filters.join(",")),
            "--counting=toplevel".to_string(),
            format!("--linelength={}", self.config.line_length),
        ];
        let output = run_checker(&self.config.cpplint_program, &args, path, 1)?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stderr.lines().chain(stdout.lines()) {
            if let Some(category) = parse_cpplint_line(line) {
                outcome.add_error(category);
                outcome.messages.push(line.to_string());
            }
        }
        Ok(outcome)
    }

    fn check_guard(&self, path: &Path, outcome: &mut CheckOutcome) -> LintResult<()> {
        let bytes = fs::read(path).map_err(|source| LintError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let contents = String::from_utf8_lossy(&bytes);
        let expected = header_guard(&repository_name(path), self.config.project());

        for violation in check_header_guard(&contents, &expected) {
            outcome.add_error("build");
            outcome.messages.push(format!(
                "{}:{}:  {}  [build/header_guard] [5]",
                path.display(),
                violation.line,
                violation.message
            ));
        }
        Ok(())
    }

    fn check_python(&self, path: &Path) -> LintResult<CheckOutcome> {
        let mut args = self.config.pylint_options.clone();
        args.push(format!("--msg-template={PYLINT_MSG_TEMPLATE}"));
        args.push("--reports=n".to_string());
        args.push("--score=n".to_string());
        // Bits 1..16 report message categories, 32 is a usage error.
        let output = run_checker(&self.config.pylint_program, &args, path, 31)?;

        let mut outcome = CheckOutcome::default();
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(category) = parse_pylint_line(line) {
                outcome.add_error(category);
            }
            outcome.messages.push(line.to_string());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            outcome.messages.push(stderr.trim_end().to_string());
        }
        Ok(outcome)
    }
}

impl Checker for ExternalCheckers {
    fn check(&self, path: &Path, kind: SourceKind) -> LintResult<CheckOutcome> {
        match kind {
            SourceKind::CppHeader | SourceKind::CppSource => self.check_cpp(path),
            SourceKind::Python => self.check_python(path),
        }
    }
}

/// Runs `program args path`; exit codes above `max_code` or death by signal fail.
fn run_checker(program: &str, args: &[String], path: &Path, max_code: i32) -> LintResult<Output> {
    tracing::debug!(program, ?args, path = %path.display(), "running checker");
    let output = Command::new(program)
        .args(args)
        .arg(path)
        .output()
        .map_err(|source| LintError::CheckerSpawn {
            program: program.to_string(),
            source,
        })?;

    match output.status.code() {
        Some(code) if (0..=max_code).contains(&code) => Ok(output),
        _ => Err(LintError::CheckerFailed {
            program: program.to_string(),
            path: path.to_path_buf(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        }),
    }
}

/// Top-level category of a cpplint diagnostic line.
///
/// Diagnostics look like `path:line:  message  [category/sub] [confidence]`.
pub fn parse_cpplint_line(line: &str) -> Option<&str> {
    let rest = line.trim_end().strip_suffix(']')?;
    let (rest, confidence) = rest.rsplit_once('[')?;
    if confidence.is_empty() || !confidence.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (location, category) = rest.trim_end().strip_suffix(']')?.rsplit_once('[')?;
    if !location.contains(':') {
        return None;
    }
    let (top, _) = category.split_once('/')?;
    (!top.is_empty()).then_some(top)
}

/// Category of a pylint message line: the text after the last `:` and before
/// the first `(`, if it is one of [`PYLINT_CATEGORIES`].
pub fn parse_pylint_line(line: &str) -> Option<&str> {
    let tail = line.rsplit(':').next()?;
    let category = tail.split('(').next()?.trim();
    PYLINT_CATEGORIES.contains(&category).then_some(category)
}
