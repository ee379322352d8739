//! File classification by extension.

use std::{collections::HashSet, fmt, path::Path};

/// Extensions handed to cpplint.
pub const CXX_EXTENSIONS: [&str; 6] = ["cc", "c", "cpp", "h", "cu", "hpp"];

/// Extensions whose files must carry an include guard.
pub const GUARDED_EXTENSIONS: [&str; 2] = ["h", "hpp"];

/// Extensions handed to pylint.
pub const PYTHON_EXTENSIONS: [&str; 1] = ["py"];

/// Which result table a checked file belongs to.
///
/// Only `.h` files count as headers; `.hpp` files are tabled with the sources
/// but still get the include guard check, see [`needs_header_guard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    CppHeader,
    CppSource,
    Python,
}

impl SourceKind {
    /// Kind for a file extension (without the dot), if it is checked at all.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "h" => Some(Self::CppHeader),
            "c" | "cc" | "cpp" | "cu" | "hpp" => Some(Self::CppSource),
            "py" => Some(Self::Python),
            _ => None,
        }
    }

    /// Label used in the summary lines.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CppHeader => "cpp-header",
            Self::CppSource => "cpp-source",
            Self::Python => "python",
        }
    }

    pub const fn is_cpp(&self) -> bool {
        matches!(self, Self::CppHeader | Self::CppSource)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether `path` has a header extension that requires an include guard.
pub fn needs_header_guard(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| GUARDED_EXTENSIONS.contains(&extension))
}

/// Decides whether `path` gets checked, and by which checker.
///
/// Excluded paths, paths containing `#` (editor swap files) and extensions outside
/// `allowed` are skipped. `path` and `excluded` are expected to be normalized.
pub fn classify(
    path: &Path,
    allowed: &HashSet<&str>,
    excluded: &HashSet<std::path::PathBuf>,
) -> Option<SourceKind> {
    if excluded.contains(path) || path.to_string_lossy().contains('#') {
        return None;
    }
    let extension = path.extension()?.to_str()?;
    if !allowed.contains(extension) {
        return None;
    }
    SourceKind::from_extension(extension)
}
