//! Per-run lint results and the pass/fail summary.

use std::{collections::BTreeMap, io::Write};

use crate::source::SourceKind;

/// Error count per top-level lint category of one file.
pub type FileResult = BTreeMap<String, usize>;

/// Results of one lint run, one table per [`SourceKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub cpp_header: BTreeMap<String, FileResult>,
    pub cpp_source: BTreeMap<String, FileResult>,
    pub python: BTreeMap<String, FileResult>,
}

impl LintReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn table(&self, kind: SourceKind) -> &BTreeMap<String, FileResult> {
        match kind {
            SourceKind::CppHeader => &self.cpp_header,
            SourceKind::CppSource => &self.cpp_source,
            SourceKind::Python => &self.python,
        }
    }

    fn table_mut(&mut self, kind: SourceKind) -> &mut BTreeMap<String, FileResult> {
        match kind {
            SourceKind::CppHeader => &mut self.cpp_header,
            SourceKind::CppSource => &mut self.cpp_source,
            SourceKind::Python => &mut self.python,
        }
    }

    /// Stores the result for `path`, replacing any earlier one.
    pub fn record(&mut self, kind: SourceKind, path: impl Into<String>, result: FileResult) {
        self.table_mut(kind).insert(path.into(), result);
    }

    /// Moves every result of `other` into `self`.
    pub fn merge(&mut self, other: Self) {
        self.cpp_header.extend(other.cpp_header);
        self.cpp_source.extend(other.cpp_source);
        self.python.extend(other.python);
    }

    /// Number of files checked.
    pub fn len(&self) -> usize {
        self.cpp_header.len() + self.cpp_source.len() + self.python.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of files with at least one error.
    pub fn failed(&self) -> usize {
        KINDS
            .iter()
            .map(|&kind| self.table(kind).values().filter(|r| has_errors(r)).count())
            .sum()
    }

    /// Writes the per-kind summary and returns the number of failing files.
    pub fn summarize<W: Write + ?Sized>(&self, out: &mut W) -> std::io::Result<usize> {
        let mut nfail = 0;
        for kind in KINDS {
            let table = self.table(kind);
            if table.is_empty() {
                continue;
            }
            let npass = table.values().filter(|r| !has_errors(r)).count();
            writeln!(
                out,
                "====={npass}/{} {kind} files passed check=====",
                table.len()
            )?;
            for (path, result) in table.iter().filter(|(_, r)| has_errors(r)) {
                let total: usize = result.values().sum();
                writeln!(
                    out,
                    "{path}: {total} Errors of {} Categories map={}",
                    result.len(),
                    format_map(result)
                )?;
                nfail += 1;
            }
        }

        if nfail == 0 {
            writeln!(out, "All passed!")?;
        } else {
            writeln!(out, "{nfail} files failed lint")?;
        }
        Ok(nfail)
    }
}

const KINDS: [SourceKind; 3] = [
    SourceKind::CppHeader,
    SourceKind::CppSource,
    SourceKind::Python,
];

fn has_errors(result: &FileResult) -> bool {
    result.values().any(|&count| count > 0)
}

/// Renders `{'cat': n, ...}`.
fn format_map(result: &FileResult) -> String {
    let entries: Vec<String> = result
        .iter()
        .map(|(category, count)| format!("'{category}': {count}"))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Process exit code for a run with `failed` failing files.
pub const fn exit_code(failed: usize) -> u8 {
    if failed > 0 {
        1
    } else {
        0
    }
}
