//! Lint run configuration.

use std::{collections::HashSet, path::Path};

use clap::ValueEnum;

use crate::source::{CXX_EXTENSIONS, PYTHON_EXTENSIONS};

/// Which languages a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileType {
    Python,
    Cpp,
    All,
}

impl FileType {
    /// Extensions (without the dot) checked for this file type.
    pub fn allowed_extensions(&self) -> HashSet<&'static str> {
        let cpp = CXX_EXTENSIONS.iter();
        let python = PYTHON_EXTENSIONS.iter();
        match self {
            Self::Python => python.copied().collect(),
            Self::Cpp => cpp.copied().collect(),
            Self::All => cpp.chain(python).copied().collect(),
        }
    }
}

/// Default cpplint filters. The header guard check runs in-process instead.
pub const DEFAULT_CPPLINT_FILTERS: [&str; 6] = [
    "-build/c++11",
    "-build/namespaces",
    "-build/include",
    "+build/include_what_you_use",
    "+build/include_order",
    "-build/header_guard",
];

/// Default pylint options, used unless an rc file is given.
pub const DEFAULT_PYLINT_OPTIONS: [&str; 2] = [
    "--extension-pkg-whitelist=numpy",
    "--disable=superfluous-parens,too-many-instance-attributes,too-few-public-methods",
];

/// Settings shared by every checker invocation of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintConfig {
    /// Replaces the `src` directory in header guard names.
    pub project_name: String,
    pub pylint_options: Vec<String>,
    pub cpplint_filters: Vec<String>,
    pub line_length: usize,
    pub cpplint_program: String,
    pub pylint_program: String,
}

impl LintConfig {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            pylint_options: DEFAULT_PYLINT_OPTIONS.map(String::from).to_vec(),
            cpplint_filters: DEFAULT_CPPLINT_FILTERS.map(String::from).to_vec(),
            line_length: 100,
            cpplint_program: "cpplint".to_string(),
            pylint_program: "pylint".to_string(),
        }
    }

    /// Replaces the pylint options with a single `--rcfile`.
    pub fn with_pylint_rc(mut self, rc_file: &Path) -> Self {
        self.pylint_options = vec![format!("--rcfile={}", rc_file.display())];
        self
    }

    pub fn with_cpplint_program(mut self, program: impl Into<String>) -> Self {
        self.cpplint_program = program.into();
        self
    }

    pub fn with_pylint_program(mut self, program: impl Into<String>) -> Self {
        self.pylint_program = program.into();
        self
    }

    pub fn with_line_length(mut self, line_length: usize) -> Self {
        self.line_length = line_length;
        self
    }

    /// `None` when no project name is set.
    pub fn project(&self) -> Option<&str> {
        Some(self.project_name.as_str()).filter(|name| !name.is_empty())
    }
}
