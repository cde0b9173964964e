//! Expand file patterns into concrete paths.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Characters that make a pattern a glob rather than a literal path.
const GLOB_META: &[char] = &['*', '?', '['];

/// Expand patterns into file paths, in pattern order.
///
/// Relative patterns are joined onto `working_dir` when one is given.
/// Existing files and other literal paths expand to themselves; globs expand
/// to their matching files. Nothing is deduplicated: a file matched by two
/// patterns appears twice.
pub fn expand_patterns(patterns: &[String], working_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let resolved = resolve(pattern, working_dir);

        if resolved.is_file() || !pattern.contains(GLOB_META) {
            files.push(resolved);
            continue;
        }

        let text = resolved.to_string_lossy();
        let matches: Vec<PathBuf> = glob::glob(&text)
            .map_err(|source| Error::Pattern {
                pattern: pattern.clone(),
                source,
            })?
            .filter_map(|entry| entry.ok())
            .filter(|p| p.is_file())
            .collect();

        if matches.is_empty() {
            warn!(pattern = %pattern, "no files matched");
        } else {
            debug!(pattern = %pattern, count = matches.len(), "expanded pattern");
        }
        files.extend(matches);
    }
    Ok(files)
}

fn resolve(pattern: &str, working_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(pattern);
    match working_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn literal_path_expands_to_itself() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "a.js");
        let files = expand_patterns(&[file.to_string_lossy().to_string()], None).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn missing_literal_is_kept() {
        let files = expand_patterns(&["nope/missing.js".to_string()], None).unwrap();
        assert_eq!(files, vec![PathBuf::from("nope/missing.js")]);
    }

    #[test]
    fn glob_expands_in_order_and_skips_directories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "routes/b.js");
        touch(dir.path(), "routes/a.js");
        fs::create_dir_all(dir.path().join("routes/sub.js")).unwrap();

        let files = expand_patterns(&["routes/*.js".to_string()], Some(dir.path())).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("routes/a.js"), dir.path().join("routes/b.js")]
        );
    }

    #[test]
    fn overlapping_patterns_are_not_deduplicated() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.yaml");
        let patterns = vec!["a.yaml".to_string(), "*.yaml".to_string()];
        let files = expand_patterns(&patterns, Some(dir.path())).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0], files[1]);
    }

    #[test]
    fn unmatched_glob_contributes_nothing() {
        let dir = TempDir::new().unwrap();
        let files = expand_patterns(&["*.nothing".to_string()], Some(dir.path())).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn invalid_glob_names_the_pattern() {
        let err = expand_patterns(&["src/[".to_string()], None).unwrap_err();
        match err {
            Error::Pattern { pattern, .. } => assert_eq!(pattern, "src/["),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn absolute_patterns_ignore_working_dir() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "x.js");
        let other = TempDir::new().unwrap();
        let files =
            expand_patterns(&[file.to_string_lossy().to_string()], Some(other.path())).unwrap();
        assert_eq!(files, vec![file]);
    }
}
