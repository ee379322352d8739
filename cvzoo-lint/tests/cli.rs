use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use cvzoo_lint::{
    exit_code, lint, CheckOutcome, Checker, LintArgs, LintError, LintResult, Linter, SourceKind,
};
use tempfile::TempDir;

/// Reports one `readability` error per `TODO` line.
struct TodoChecker;

impl Checker for TodoChecker {
    fn check(&self, path: &Path, _kind: SourceKind) -> LintResult<CheckOutcome> {
        let contents = fs::read_to_string(path).map_err(|source| LintError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut outcome = CheckOutcome::default();
        for _ in contents.lines().filter(|line| line.contains("TODO")) {
            outcome.add_error("readability");
        }
        Ok(outcome)
    }
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (rel, contents) in files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}

fn run(args: &[&str], root: &Path) -> (u8, String) {
    let root = root.display().to_string();
    let argv: Vec<&str> = ["cvzoo-lint"]
        .into_iter()
        .chain(args.iter().map(|arg| if *arg == "ROOT" { root.as_str() } else { *arg }))
        .collect();
    let args = LintArgs::try_parse_from(argv).unwrap();

    let mut out = Vec::new();
    let failed = lint(&Linter::new(TodoChecker), &args.request(), &mut out).unwrap();
    (exit_code(failed), String::from_utf8(out).unwrap())
}

#[test]
fn clean_tree_exits_zero() {
    let dir = project(&[("src/a.cc", "int a;\n"), ("include/p/a.h", "int a;\n"), ("t.py", "x = 1\n")]);

    let (code, out) = run(&["proj", "all", "ROOT"], dir.path());
    assert_eq!(code, 0);
    assert!(out.contains("=====1/1 cpp-header files passed check====="));
    assert!(out.contains("=====1/1 cpp-source files passed check====="));
    assert!(out.contains("=====1/1 python files passed check====="));
    assert!(out.ends_with("All passed!\n"));
}

#[test]
fn failing_file_exits_nonzero() {
    let dir = project(&[("src/a.cc", "// TODO\n// TODO\n"), ("t.py", "x = 1\n")]);

    let (code, out) = run(&["proj", "all", "ROOT", "--jobs", "2"], dir.path());
    assert_eq!(code, 1);
    assert!(out.contains("2 Errors of 1 Categories map={'readability': 2}"));
    assert!(out.ends_with("1 files failed lint\n"));
}

#[test]
fn excluded_failure_is_ignored() {
    let dir = project(&[("src/a.cc", "int a;\n"), ("third_party/b.cc", "// TODO\n")]);
    let excluded: PathBuf = dir.path().join("third_party");
    let excluded = excluded.display().to_string();

    let (code, out) = run(
        &["proj", "cpp", "ROOT", "--exclude_path", excluded.as_str()],
        dir.path(),
    );
    assert_eq!(code, 0);
    assert!(out.contains("=====1/1 cpp-source files passed check====="));
}
