//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code, apart from frame limiting and the
//!   post-registration login delay
//! - No blocking I/O outside startup code
//! - HTTP stays behind the gateway and the planner core stays headless
//! - No panicking shortcuts in production code
//!
//! The scanners live here; each rule is a test under `tests/`.
//!
//! Production code is everything in a source file before its first
//! `#[cfg(test)]` line, with comments stripped.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Source directories with production code
pub const SOURCE_DIRS: [&str; 2] = ["planner/core/src", "tui/src"];

/// A rule broken at one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File, relative to the workspace root
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.file.display(), self.line, self.text)
    }
}

/// Workspace root, two levels above this crate
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Rust sources under `dir`, relative to the workspace root
pub fn rust_sources(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root();
    let mut files: Vec<PathBuf> = WalkDir::new(root.join(dir))
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .filter_map(|e| e.path().strip_prefix(&root).ok().map(Path::to_path_buf))
        .collect();
    files.sort();
    files
}

/// Code part of the non-test lines of a source, numbered from 1
pub fn production_lines(source: &str) -> Vec<(usize, &str)> {
    source
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|(i, line)| (i + 1, line.split("//").next().unwrap_or(line)))
        .filter(|(_, code)| !code.trim().is_empty())
        .collect()
}

/// Production lines under `dir` containing `pattern`
///
/// Files whose relative path starts with an entry of `allowed` are skipped.
pub fn find_violations(dir: &str, pattern: &str, allowed: &[&str]) -> Vec<Violation> {
    let root = workspace_root();
    let mut violations = Vec::new();

    for file in rust_sources(dir) {
        let relative = file.to_string_lossy().replace('\\', "/");
        if allowed.iter().any(|prefix| relative.starts_with(prefix)) {
            continue;
        }
        let Ok(source) = fs::read_to_string(root.join(&file)) else {
            continue;
        };
        for (line, code) in production_lines(&source) {
            if code.contains(pattern) {
                violations.push(Violation {
                    file: file.clone(),
                    line,
                    text: code.trim().to_string(),
                });
            }
        }
    }
    violations
}

/// Print violations and fail
///
/// # Panics
///
/// When `violations` is not empty.
pub fn report(rule: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {rule}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    panic!(
        "\nFound {} violation(s) of: {rule}\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let source = "fn a() {} // trailing\n/// doc\n#[cfg(test)]\nmod tests { fn b() { x.unwrap(); } }\n";
        assert_eq!(production_lines(source), vec![(1, "fn a() {} ")]);
    }

    #[test]
    fn test_sources_are_found() {
        for dir in SOURCE_DIRS {
            assert!(!rust_sources(dir).is_empty(), "no sources under {dir}");
        }
    }
}
