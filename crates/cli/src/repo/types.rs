// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Values shared by every layout parser.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// How to invoke Jest for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JestExecutionParams {
    pub jest_command: String,
    pub jest_execution_directory: PathBuf,
}

/// One independently testable unit within a workspace.
///
/// Paths are absolute. A changed project is represented by a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub jest_command: String,
    pub jest_execution_directory: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jest_config: Option<PathBuf>,
    pub project_name: String,
    pub root_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_config: Option<PathBuf>,
}

impl ProjectConfig {
    /// Build a config from execution parameters and project location.
    pub fn new(
        project_name: impl Into<String>,
        root_path: impl Into<PathBuf>,
        execution: JestExecutionParams,
    ) -> Self {
        Self {
            jest_command: execution.jest_command,
            jest_execution_directory: execution.jest_execution_directory,
            jest_config: None,
            project_name: project_name.into(),
            root_path: root_path.into(),
            ts_config: None,
        }
    }

    pub fn with_jest_config(mut self, path: Option<PathBuf>) -> Self {
        self.jest_config = path;
        self
    }

    pub fn with_ts_config(mut self, path: Option<PathBuf>) -> Self {
        self.ts_config = path;
        self
    }

    /// Whether `path` lies inside this project's root.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root_path)
    }
}

/// Change to the set of projects a parser reports.
///
/// Projects are identified by name; several projects may share a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProjectChangeEvent {
    Added {
        config: ProjectConfig,
    },
    #[serde(rename_all = "camelCase")]
    Removed {
        project_name: String,
        root_path: PathBuf,
    },
}

impl ProjectChangeEvent {
    /// Removal of `config` from the project set.
    pub fn removed(config: &ProjectConfig) -> Self {
        Self::Removed {
            project_name: config.project_name.clone(),
            root_path: config.root_path.clone(),
        }
    }
}
