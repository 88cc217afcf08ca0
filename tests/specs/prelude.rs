//! Test helpers for behavioral specifications.
//!
//! Provides high-level DSL for testing scout CLI behavior.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub use assert_cmd::prelude::*;
pub use predicates;
pub use predicates::prelude::{Predicate, PredicateBooleanExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Returns a Command configured to run the scout binary
pub fn scout_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("scout"));
    cmd.env_remove("SCOUT_CONFIG").env_remove("SCOUT_LOG");
    cmd
}

/// Create a `scout projects` builder
pub fn projects() -> ProjectsBuilder {
    ProjectsBuilder::new()
}

/// High-level builder for `scout projects` assertions
pub struct ProjectsBuilder {
    dir: Option<PathBuf>,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl ProjectsBuilder {
    fn new() -> Self {
        Self {
            dir: None,
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Set working directory
    pub fn pwd(mut self, path: impl AsRef<Path>) -> Self {
        self.dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add CLI arguments
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    fn command(&self) -> Command {
        let mut cmd = scout_cmd();
        cmd.arg("projects");
        cmd.args(&self.args);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run and assert success, returning text output
    pub fn passes(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            output.status.success(),
            "expected success, got {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and assert the given exit code
    pub fn exits(self, code: i32) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert_eq!(
            output.status.code(),
            Some(code),
            "stdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run with `-o json`, assert success and parse stdout
    pub fn json(self) -> serde_json::Value {
        let output = self.args(&["-o", "json"]).passes().output;
        serde_json::from_slice(&output.stdout).expect("output should be valid JSON")
    }
}

/// Result of a finished run
pub struct RunAssert {
    output: std::process::Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    /// Assert stdout contains `text`
    pub fn stdout_has(self, text: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(text), "stdout missing {:?}:\n{}", text, stdout);
        self
    }

    /// Assert stderr contains `text`
    pub fn stderr_has(self, text: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(text), "stderr missing {:?}:\n{}", text, stderr);
        self
    }
}

/// Path to a fixture workspace under tests/fixtures
pub fn fixture(name: &str) -> PathBuf {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR should be set");
    PathBuf::from(manifest_dir)
        .parent()
        .expect("parent should exist")
        .parent()
        .expect("grandparent should exist")
        .join("tests")
        .join("fixtures")
        .join(name)
}

// =============================================================================
// Workspace
// =============================================================================

/// Temporary workspace directory with helper methods.
///
/// A `.git` directory is created so settings discovery stops at the
/// workspace instead of walking into the host's directories.
///
/// # Examples
///
/// ```ignore
/// let temp = Workspace::empty();
/// temp.file("package.json", r#"{"name": "lib"}"#);
/// projects().pwd(temp.path()).passes().stdout_has("Standard");
/// ```
pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    /// Create an empty workspace with no files
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        Self { dir }
    }

    /// Get the workspace path
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write scout.toml (auto-prefixes with `version = 1` if not present)
    pub fn settings(&self, content: &str) {
        let content = if content.contains("version") {
            content.to_string()
        } else {
            format!("version = 1\n{}", content)
        };
        std::fs::write(self.dir.path().join("scout.toml"), content).unwrap();
    }

    /// Write a file at the given path (parent directories created automatically)
    pub fn file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.dir.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full_path, content).unwrap();
    }
}

/// Extract project names from `projects -o json` output
pub fn project_names(json: &serde_json::Value) -> Vec<&str> {
    json.get("projects")
        .and_then(|v| v.as_array())
        .unwrap()
        .iter()
        .filter_map(|p| p.get("projectName").and_then(|n| n.as_str()))
        .collect()
}
