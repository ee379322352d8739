//! Lint orchestration for mixed C++/Python source trees.
//!
//! Files under the given roots are classified by extension and checked one at a
//! time by `cpplint` or `pylint`, each in its own child process. Results are
//! collected in a [`LintReport`] and summarized as pass/fail counts.

pub mod checker;
pub mod cli;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod header_guard;
pub mod report;
pub mod runner;
pub mod source;

pub use checker::{CheckOutcome, Checker, ExternalCheckers};
pub use cli::{lint, LintArgs};
pub use config::{FileType, LintConfig};
pub use enumerate::{enumerate, normalize};
pub use error::{LintError, LintResult};
pub use header_guard::{header_guard, repository_name};
pub use report::{exit_code, FileResult, LintReport};
pub use runner::{LintRequest, Linter};
pub use source::SourceKind;
