// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Behaviour shared by the layout parsers.
//!
//! Each parser embeds a [`ParserBase`] instead of inheriting from one. The
//! base knows the workspace root and settings, computes the generic Jest
//! command, and owns the `project_change` emitter plus the last project
//! snapshot used for incremental change detection.

use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::package_json::PackageJson;
use super::package_manager::PackageManager;
use super::types::{JestExecutionParams, ProjectChangeEvent, ProjectConfig};
use crate::config::Configuration;
use crate::event::{Emitter, Event};

pub struct ParserBase {
    workspace_root: PathBuf,
    settings: Arc<dyn Configuration>,
    project_change: Emitter<ProjectChangeEvent>,
    snapshot: Mutex<Option<Vec<ProjectConfig>>>,
}

impl ParserBase {
    pub fn new(workspace_root: impl Into<PathBuf>, settings: Arc<dyn Configuration>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            settings,
            project_change: Emitter::new(),
            snapshot: Mutex::new(None),
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn settings(&self) -> &dyn Configuration {
        self.settings.as_ref()
    }

    /// Absolute path for `relative`, resolved against the workspace root.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        resolve_path(&self.workspace_root, relative.as_ref())
    }

    /// Whether `relative` exists under the workspace root.
    ///
    /// I/O failures count as absence.
    pub async fn exists(&self, relative: impl AsRef<Path>) -> bool {
        tokio::fs::try_exists(self.resolve(relative))
            .await
            .unwrap_or(false)
    }

    /// Generic Jest invocation: the configured command, or `jest` through the
    /// detected package manager, run from the workspace root.
    pub async fn jest_execution_params(&self) -> JestExecutionParams {
        let jest_command = match self.settings.path_to_jest() {
            Some(command) => command,
            None => PackageManager::detect(&self.workspace_root)
                .await
                .exec_line("jest", &[]),
        };
        JestExecutionParams {
            jest_command,
            jest_execution_directory: self.workspace_root.clone(),
        }
    }

    /// The workspace `package.json`, or `None` if it is missing or unreadable.
    pub async fn package_file(&self) -> Option<PackageJson> {
        match PackageJson::read(&self.workspace_root).await {
            Ok(Some(package)) => Some(package),
            Ok(None) => {
                tracing::debug!("no package.json in {}", self.workspace_root.display());
                None
            }
            Err(e) => {
                tracing::warn!("ignoring unreadable package.json: {}", e);
                None
            }
        }
    }

    /// Display name for a single-project workspace.
    pub async fn project_name(&self) -> String {
        if let Some(name) = self.package_file().await.and_then(|p| p.name)
            && !name.is_empty()
        {
            return name;
        }
        self.workspace_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workspace".to_string())
    }

    pub fn project_change(&self) -> Event<ProjectChangeEvent> {
        self.project_change.event()
    }

    /// Record `projects` as the current snapshot without reporting changes.
    pub fn remember(&self, projects: &[ProjectConfig]) {
        if let Ok(mut snapshot) = self.snapshot.lock() {
            *snapshot = Some(projects.to_vec());
        }
    }

    /// Replace the snapshot and return the changes relative to the old one.
    ///
    /// The first snapshot produces no changes.
    pub fn replace_snapshot(&self, projects: &[ProjectConfig]) -> Vec<ProjectChangeEvent> {
        let Ok(mut snapshot) = self.snapshot.lock() else {
            return Vec::new();
        };
        let previous = snapshot.replace(projects.to_vec());
        match previous {
            Some(previous) => diff_projects(&previous, projects),
            None => Vec::new(),
        }
    }

    /// Fire `events` on the `project_change` stream, in order.
    pub fn publish(&self, events: &[ProjectChangeEvent]) {
        for event in events {
            self.project_change.fire(event);
        }
    }
}

/// Join `relative` onto `root` and collapse `.` and `..` lexically.
pub fn resolve_path(root: &Path, relative: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in root.join(relative).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}

/// Changes turning `previous` into `next`, keyed by project name.
///
/// A project whose config changed is reported as removed and re-added.
/// All removals come before all additions.
pub fn diff_projects(previous: &[ProjectConfig], next: &[ProjectConfig]) -> Vec<ProjectChangeEvent> {
    let find = |list: &[ProjectConfig], name: &str| -> Option<ProjectConfig> {
        list.iter().find(|p| p.project_name == name).cloned()
    };

    let removed = previous
        .iter()
        .filter(|old| find(next, &old.project_name).as_ref() != Some(*old))
        .map(ProjectChangeEvent::removed);

    let added = next
        .iter()
        .filter(|new| find(previous, &new.project_name).as_ref() != Some(*new))
        .map(|new| ProjectChangeEvent::Added {
            config: new.clone(),
        });

    removed.chain(added).collect()
}

#[cfg(test)]
#[path = "base_tests.rs"]
mod tests;
