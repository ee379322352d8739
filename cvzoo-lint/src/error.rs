//! Error types for lint runs.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Error type for lint runs. Every variant aborts the run.
#[derive(Error, Debug)]
pub enum LintError {
    /// A root path or source file could not be read.
    #[error("Failed to read {path}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Walking a directory tree failed.
    #[error("Failed to walk directory tree")]
    Walk(#[from] walkdir::Error),

    /// An external checker could not be started.
    #[error("Failed to launch checker `{program}`")]
    CheckerSpawn {
        /// The checker executable.
        program: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// An external checker terminated abnormally.
    #[error("Checker `{program}` failed on {path} ({status}): {stderr}")]
    CheckerFailed {
        /// The checker executable.
        program: String,
        /// The file being checked.
        path: PathBuf,
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },

    /// Writing diagnostics or the summary failed.
    #[error("Failed to write lint output")]
    Output(#[source] io::Error),

    /// The worker pool for parallel checking could not be created.
    #[error("Failed to start worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A specialized `Result` type for lint runs.
pub type LintResult<T> = Result<T, LintError>;
