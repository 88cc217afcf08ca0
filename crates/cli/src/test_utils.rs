//! Shared unit test utilities.
//!
//! Provides common helpers for unit tests in the cli crate.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Creates a temp directory with a minimal scout.toml.
pub fn temp_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("scout.toml"), "version = 1\n").unwrap();
    dir
}

/// Creates a temp directory with custom settings content.
pub fn temp_workspace_with_settings(settings: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("scout.toml"), settings).unwrap();
    dir
}

/// Creates a directory tree from a list of (path, content) pairs.
///
/// Parent directories are created automatically and existing files are
/// overwritten.
///
/// # Example
///
/// ```ignore
/// let tmp = temp_workspace();
/// create_tree(tmp.path(), &[
///     ("nx.json", "{}"),
///     ("apps/web/project.json", r#"{"targets": {}}"#),
/// ]);
/// ```
pub fn create_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }
}
