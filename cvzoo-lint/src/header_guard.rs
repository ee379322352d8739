//! Include-guard naming and checking.
//!
//! Guards are derived from the header's path relative to the repository root,
//! with the project source tree mapped onto the project name.

use std::path::{Component, Path, PathBuf};

const VCS_MARKERS: [&str; 3] = [".git", ".hg", ".svn"];

/// Directory prefixes that do not take part in guard names.
fn stripped_prefixes() -> &'static [&'static str] {
    if cfg!(windows) {
        &["include/", "api/", "wrapper/", "contrib/", "mshadow/"]
    } else {
        &["include/", "api/", "wrapper/", "contrib/"]
    }
}

/// `path` relative to the nearest enclosing repository root, `/`-separated.
///
/// Falls back to the path as given when no ancestor holds a `.git`, `.hg` or
/// `.svn` entry.
pub fn repository_name(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        std::env::current_dir().ok().map(|cwd| cwd.join(path))
    };

    let relative = absolute.and_then(|absolute| {
        let root = find_repository_root(&absolute)?;
        absolute.strip_prefix(&root).ok().map(Path::to_path_buf)
    });
    to_slash(relative.as_deref().unwrap_or(path))
}

fn find_repository_root(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .skip(1)
        .find(|dir| VCS_MARKERS.iter().any(|marker| dir.join(marker).exists()))
        .map(Path::to_path_buf)
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter(|component| matches!(component, Component::Normal(_) | Component::ParentDir))
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Expected guard macro for a header at `path_from_root`.
///
/// ```
/// use cvzoo_lint::header_guard;
///
/// assert_eq!(header_guard("include/foo/bar.h", None), "FOO_BAR_H_");
/// assert_eq!(header_guard("src/baz.h", Some("MyProj")), "MYPROJ_BAZ_H_");
/// ```
pub fn header_guard(path_from_root: &str, project_name: Option<&str>) -> String {
    let mut name = path_from_root.to_string();

    let project = project_name.filter(|project| !project.is_empty());
    match (project, name.find("src/")) {
        (Some(project), Some(pos)) => {
            name = format!("{project}{}", &name[pos + "src".len()..]);
        }
        _ => {
            if let Some(pos) = name.find("include/") {
                name = name[pos + "include/".len()..].to_string();
            }
            if let Some(rest) = stripped_prefixes()
                .iter()
                .find_map(|prefix| name.strip_prefix(prefix))
            {
                name = rest.to_string();
            }
        }
    }

    let mut guard: String = name
        .chars()
        .map(|c| match c {
            '-' | '.' | '/' => '_',
            c if c.is_whitespace() => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();
    guard.push('_');
    guard
}

/// A guard violation at a 1-based line (0 when it applies to the whole file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardViolation {
    pub line: usize,
    pub message: String,
}

/// Checks `contents` for an `#ifndef`/`#define`/`#endif` guard named `expected`.
///
/// Headers using `#pragma once` pass.
pub fn check_header_guard(contents: &str, expected: &str) -> Vec<GuardViolation> {
    let mut ifndef: Option<(usize, &str)> = None;
    let mut define: Option<&str> = None;
    let mut endif: Option<(usize, &str)> = None;

    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim_end();
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("#pragma") if tokens.next() == Some("once") => return Vec::new(),
            Some("#ifndef") if ifndef.is_none() => {
                ifndef = tokens.next().map(|name| (index + 1, name));
            }
            Some("#define") if ifndef.is_some() && define.is_none() => {
                define = tokens.next();
            }
            Some(token) if token.starts_with("#endif") => endif = Some((index + 1, line)),
            _ => {}
        }
    }

    let (Some((ifndef_line, ifndef_name)), Some(define_name)) = (ifndef, define) else {
        return vec![GuardViolation {
            line: 0,
            message: format!("No #ifndef header guard found, suggested CPP variable is: {expected}"),
        }];
    };

    let mut violations = Vec::new();
    if ifndef_name != expected {
        violations.push(GuardViolation {
            line: ifndef_line,
            message: format!("#ifndef header guard has wrong style, please use: {expected}"),
        });
    }
    if define_name != ifndef_name {
        violations.push(GuardViolation {
            line: ifndef_line + 1,
            message: format!(
                "#ifndef and #define don't match, suggested CPP variable is: {expected}"
            ),
        });
    }

    let endif_ok = |line: &str| {
        line == format!("#endif  // {expected}") || line == format!("#endif  /* {expected} */")
    };
    match endif {
        Some((_, line)) if endif_ok(line) => {}
        Some((line_no, _)) => violations.push(GuardViolation {
            line: line_no,
            message: format!("#endif line should be \"#endif  // {expected}\""),
        }),
        None => violations.push(GuardViolation {
            line: contents.lines().count(),
            message: format!("#endif line should be \"#endif  // {expected}\""),
        }),
    }
    violations
}
