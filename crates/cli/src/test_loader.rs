// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-project test loaders.
//!
//! A [`TestLoader`] tracks the test files of one project and reports
//! environment changes: test files appearing, disappearing or changing, and
//! edits to the application code or configuration the tests run against.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::event::{Emitter, Event};
use crate::repo::ProjectConfig;
use crate::watch::{FileChange, FileChangeKind};

/// Globs identifying test files, relative to the project root.
const TEST_FILE_PATTERNS: &[&str] = &["**/*.test.*", "**/*.spec.*", "**/__tests__/**"];

/// Globs for build output and vendored code, relative to the project root.
const IGNORED_PATTERNS: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/coverage/**",
    "**/.next/**",
];

/// Directories never descended into while scanning.
const SKIP_DIRECTORIES: &[&str] = &["node_modules", "dist", "build", "coverage", ".next"];

/// Extensions of files Jest can load.
const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"];

/// Test files of a project changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTestsChangedEvent {
    pub added_test_files: Vec<PathBuf>,
    pub removed_test_files: Vec<PathBuf>,
    pub modified_test_files: Vec<PathBuf>,
    /// Identifiers of test nodes whose results are stale.
    pub invalidated_test_ids: Vec<String>,
    /// Every test file known after the change.
    pub test_files: Vec<PathBuf>,
}

/// Application code or configuration of a project changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAppChangedEvent {
    pub changed_file: PathBuf,
}

/// Raw event emitted by a test loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentChangedEvent {
    Test(ProjectTestsChangedEvent),
    App(ProjectAppChangedEvent),
}

/// Tracks the tests of one project.
pub trait TestLoader: Send + Sync {
    fn config(&self) -> &ProjectConfig;

    fn environment_change(&self) -> Event<EnvironmentChangedEvent>;

    /// Known test files, sorted.
    fn test_files(&self) -> Vec<PathBuf>;

    fn on_file_change(&self, change: &FileChange);

    /// Release the loader. Later changes are ignored.
    fn dispose(&self);
}

/// Creates a loader for a discovered project.
#[async_trait]
pub trait TestLoaderFactory: Send + Sync {
    async fn create(&self, config: &ProjectConfig) -> Result<Arc<dyn TestLoader>>;
}

/// Factory producing [`FileTestLoader`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsTestLoaderFactory;

#[async_trait]
impl TestLoaderFactory for FsTestLoaderFactory {
    async fn create(&self, config: &ProjectConfig) -> Result<Arc<dyn TestLoader>> {
        Ok(Arc::new(FileTestLoader::load(config.clone()).await?))
    }
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| Error::Internal(format!("invalid glob `{}`: {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::Internal(format!("failed to build glob set: {}", e)))
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// File classification relative to one project root.
#[derive(Clone)]
struct Classifier {
    root: PathBuf,
    test_patterns: GlobSet,
    ignored: GlobSet,
}

impl Classifier {
    fn new(root: &Path) -> Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            test_patterns: build_globset(TEST_FILE_PATTERNS)?,
            ignored: build_globset(IGNORED_PATTERNS)?,
        })
    }

    fn relative<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        path.strip_prefix(&self.root).ok()
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.relative(path)
            .is_none_or(|relative| self.ignored.is_match(relative))
    }

    fn is_test_file(&self, path: &Path) -> bool {
        let Some(relative) = self.relative(path) else {
            return false;
        };
        has_source_extension(path)
            && !self.ignored.is_match(relative)
            && self.test_patterns.is_match(relative)
    }

    /// Walk the root, honouring `.gitignore`. Blocking.
    fn scan(&self) -> BTreeSet<PathBuf> {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(true)
            .require_git(false)
            .follow_links(false)
            .filter_entry(|entry| {
                !entry.file_type().is_some_and(|t| t.is_dir())
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| SKIP_DIRECTORIES.contains(&name))
            });

        let mut found = BTreeSet::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if self.is_test_file(entry.path()) {
                found.insert(entry.into_path());
            }
        }
        found
    }
}

/// Test loader backed by the file system.
///
/// [`FileTestLoader::load`] walks the project root once on a blocking
/// thread. Afterwards the file list is kept current from [`FileChange`]s.
pub struct FileTestLoader {
    config: ProjectConfig,
    classifier: Classifier,
    test_files: Mutex<BTreeSet<PathBuf>>,
    environment_change: Emitter<EnvironmentChangedEvent>,
    disposed: AtomicBool,
}

impl FileTestLoader {
    /// A loader that knows no test files yet.
    pub fn new(config: ProjectConfig) -> Result<Self> {
        Ok(Self {
            classifier: Classifier::new(&config.root_path)?,
            test_files: Mutex::new(BTreeSet::new()),
            environment_change: Emitter::new(),
            disposed: AtomicBool::new(false),
            config,
        })
    }

    /// A loader primed with the test files currently under the project root.
    pub async fn load(config: ProjectConfig) -> Result<Self> {
        let loader = Self::new(config)?;
        let classifier = loader.classifier.clone();
        let found = tokio::task::spawn_blocking(move || classifier.scan())
            .await
            .map_err(|e| Error::Internal(format!("test file scan failed: {}", e)))?;
        tracing::debug!(
            "{}: found {} test files",
            loader.config.project_name,
            found.len()
        );
        if let Ok(mut files) = loader.test_files.lock() {
            *files = found;
        }
        Ok(loader)
    }

    fn is_test_file(&self, path: &Path) -> bool {
        self.classifier.is_test_file(path)
    }

    fn is_app_file(&self, path: &Path) -> bool {
        let is_config = [&self.config.jest_config, &self.config.ts_config]
            .into_iter()
            .flatten()
            .any(|config| config == path);
        is_config || (has_source_extension(path) && !self.classifier.is_ignored(path))
    }

    fn test_change(&self, change: &FileChange) -> Option<ProjectTestsChangedEvent> {
        let mut files = self.test_files.lock().ok()?;
        let path = change.path.clone();
        let mut event = ProjectTestsChangedEvent::default();

        match change.kind {
            FileChangeKind::Created | FileChangeKind::Modified => {
                if files.insert(path.clone()) {
                    event.added_test_files.push(path.clone());
                } else {
                    event.modified_test_files.push(path.clone());
                }
            }
            FileChangeKind::Removed => {
                if !files.remove(&path) {
                    return None;
                }
                event.removed_test_files.push(path.clone());
            }
        }

        event.invalidated_test_ids.push(path.display().to_string());
        event.test_files = files.iter().cloned().collect();
        Some(event)
    }
}

impl TestLoader for FileTestLoader {
    fn config(&self) -> &ProjectConfig {
        &self.config
    }

    fn environment_change(&self) -> Event<EnvironmentChangedEvent> {
        self.environment_change.event()
    }

    fn test_files(&self) -> Vec<PathBuf> {
        self.test_files
            .lock()
            .map(|files| files.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn on_file_change(&self, change: &FileChange) {
        if self.disposed.load(Ordering::SeqCst) || !self.config.contains(&change.path) {
            return;
        }

        let event = if self.is_test_file(&change.path) {
            self.test_change(change).map(EnvironmentChangedEvent::Test)
        } else if self.is_app_file(&change.path) {
            Some(EnvironmentChangedEvent::App(ProjectAppChangedEvent {
                changed_file: change.path.clone(),
            }))
        } else {
            None
        };

        if let Some(event) = event {
            self.environment_change.fire(&event);
        }
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!("{}: test loader disposed", self.config.project_name);
        self.environment_change.dispose();
    }
}

#[cfg(test)]
#[path = "test_loader_tests.rs"]
mod tests;
