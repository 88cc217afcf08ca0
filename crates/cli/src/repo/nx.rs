// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Nx workspace parser.
//!
//! Projects are listed in `workspace.json` (or `angular.json` when present).
//! Each entry is either an inline project object or a path to a directory
//! holding `project.json`. Only projects whose `test` target runs the Nx Jest
//! executor are reported.
//!
//! When the `experimentalNxCli` feature toggle is on and the workspace
//! declares `@nrwl/jest` newer than 9.2.4, projects run through
//! `nx test <project>` instead of plain Jest.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use indexmap::IndexMap;
use semver::Version;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;

use super::base::ParserBase;
use super::package_json::{PackageJson, parse_declared_version};
use super::types::{JestExecutionParams, ProjectChangeEvent, ProjectConfig};
use super::RepoParser;
use crate::config::{Configuration, EXPERIMENTAL_NX_CLI_FEATURE_TOGGLE};
use crate::error::{Error, Result};
use crate::event::Event;

/// Executor a project's `test` target must use to be picked up.
pub const JEST_EXECUTOR: &str = "@nrwl/jest:jest";

const NX_JEST_PACKAGE: &str = "@nrwl/jest";
const NX_CONFIG: &str = "nx.json";
const ANGULAR_CONFIG: &str = "angular.json";
const WORKSPACE_CONFIG: &str = "workspace.json";
const PROJECT_CONFIG: &str = "project.json";

/// Newest `@nrwl/jest` release without `nx test` support.
const LAST_VERSION_WITHOUT_CLI: Version = Version::new(9, 2, 4);

#[derive(Debug, Deserialize)]
struct NxWorkspace {
    /// Manifest order is the reported order.
    #[serde(default)]
    projects: IndexMap<String, ProjectEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProjectEntry {
    /// Directory containing `project.json`, relative to the workspace root.
    Path(String),
    Inline(NxProject),
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
struct NxProject {
    #[serde(default, alias = "architect")]
    targets: BTreeMap<String, NxTarget>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
struct NxTarget {
    #[serde(default, alias = "builder")]
    executor: Option<String>,
    #[serde(default)]
    options: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NxJestOptions {
    jest_config: Option<String>,
    ts_config: Option<String>,
}

impl NxProject {
    fn jest_target(&self) -> Option<&NxTarget> {
        self.targets
            .get("test")
            .filter(|target| target.executor.as_deref() == Some(JEST_EXECUTOR))
    }
}

pub struct NxRepositoryParser {
    base: ParserBase,
    use_experimental_cli: OnceCell<bool>,
}

impl NxRepositoryParser {
    pub fn new(workspace_root: impl Into<PathBuf>, settings: Arc<dyn Configuration>) -> Self {
        Self {
            base: ParserBase::new(workspace_root, settings),
            use_experimental_cli: OnceCell::new(),
        }
    }

    /// `angular.json` when present, `workspace.json` otherwise.
    pub async fn config_file_name(&self) -> &'static str {
        if self.base.exists(ANGULAR_CONFIG).await {
            ANGULAR_CONFIG
        } else {
            WORKSPACE_CONFIG
        }
    }

    /// Whether projects run through `nx test`. Determined once per parser.
    pub async fn use_experimental_cli(&self) -> bool {
        *self
            .use_experimental_cli
            .get_or_init(|| self.determine_experimental_cli())
            .await
    }

    async fn determine_experimental_cli(&self) -> bool {
        let toggle_enabled = self
            .base
            .settings()
            .feature_toggles()
            .unwrap_or_default()
            .iter()
            .any(|toggle| toggle == EXPERIMENTAL_NX_CLI_FEATURE_TOGGLE);

        let Some(package) = self.base.package_file().await else {
            return false;
        };

        let version = nx_version(&package);
        let enabled = toggle_enabled && version > LAST_VERSION_WITHOUT_CLI;
        tracing::debug!(
            "nx cli execution {} (toggle: {}, @nrwl/jest: {})",
            if enabled { "enabled" } else { "disabled" },
            toggle_enabled,
            version
        );
        enabled
    }

    async fn read_manifest(&self) -> Result<(PathBuf, NxWorkspace)> {
        let path = self.base.resolve(self.config_file_name().await);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
        let workspace = serde_json::from_str(&content).map_err(|e| Error::parse(&path, e))?;
        Ok((path, workspace))
    }

    async fn resolve_entry(&self, entry: ProjectEntry) -> Result<NxProject> {
        let dir = match entry {
            ProjectEntry::Inline(project) => return Ok(project),
            ProjectEntry::Path(dir) => dir,
        };

        let path = self.base.resolve(Path::new(&dir).join(PROJECT_CONFIG));
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::parse(&path, "project file not found"));
            }
            Err(source) => return Err(Error::Io { path, source }),
        };
        serde_json::from_str(&content).map_err(|e| Error::parse(&path, e))
    }

    async fn load_projects(&self) -> Result<Vec<ProjectConfig>> {
        let experimental = self.use_experimental_cli().await;
        let (manifest_path, workspace) = self.read_manifest().await?;

        let names: Vec<String> = workspace.projects.keys().cloned().collect();
        let projects =
            try_join_all(workspace.projects.into_values().map(|e| self.resolve_entry(e))).await?;

        let fallback = if experimental {
            None
        } else {
            Some(self.base.jest_execution_params().await)
        };

        let mut configs = Vec::new();
        for (name, project) in names.into_iter().zip(projects) {
            let Some(target) = project.jest_target() else {
                continue;
            };
            let execution = match &fallback {
                Some(params) => params.clone(),
                None => JestExecutionParams {
                    jest_command: format!("nx test {}", name),
                    jest_execution_directory: self.base.workspace_root().to_path_buf(),
                },
            };
            configs.push(self.to_project_config(&manifest_path, name, target, execution)?);
        }

        tracing::debug!("found {} nx projects with a jest target", configs.len());
        Ok(configs)
    }

    fn to_project_config(
        &self,
        manifest_path: &Path,
        name: String,
        target: &NxTarget,
        execution: JestExecutionParams,
    ) -> Result<ProjectConfig> {
        let options: NxJestOptions = match &target.options {
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                Error::parse(manifest_path, format!("project `{}` test options: {}", name, e))
            })?,
            None => NxJestOptions::default(),
        };
        let jest_config = options.jest_config.ok_or_else(|| {
            Error::parse(
                manifest_path,
                format!("project `{}` test target has no options.jestConfig", name),
            )
        })?;

        let config_dir = Path::new(&jest_config)
            .parent()
            .unwrap_or_else(|| Path::new(""));
        let root_path = self.base.resolve(config_dir);

        Ok(ProjectConfig::new(name, root_path, execution)
            .with_jest_config(Some(self.base.resolve(&jest_config)))
            .with_ts_config(options.ts_config.map(|ts| self.base.resolve(ts))))
    }

    fn is_relevant_change(&self, path: &Path) -> bool {
        if !path.starts_with(self.base.workspace_root()) {
            return false;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        [NX_CONFIG, WORKSPACE_CONFIG, ANGULAR_CONFIG, PROJECT_CONFIG].contains(&file_name)
    }
}

/// Declared `@nrwl/jest` version, `0.0.0` when undeclared or unparseable.
fn nx_version(package: &PackageJson) -> Version {
    let Some(raw) = package.declared_version(NX_JEST_PACKAGE) else {
        return Version::new(0, 0, 0);
    };
    parse_declared_version(raw).unwrap_or_else(|| {
        tracing::warn!("cannot compare {} version `{}`", NX_JEST_PACKAGE, raw);
        Version::new(0, 0, 0)
    })
}

#[async_trait]
impl RepoParser for NxRepositoryParser {
    fn name(&self) -> &'static str {
        "Nx v2 Workspace"
    }

    async fn is_match(&self) -> bool {
        let manifest = self.config_file_name().await;
        self.base.exists(manifest).await && self.base.exists(NX_CONFIG).await
    }

    async fn get_projects(&self) -> Result<Vec<ProjectConfig>> {
        let projects = self.load_projects().await?;
        self.base.remember(&projects);
        Ok(projects)
    }

    fn project_change(&self) -> Event<ProjectChangeEvent> {
        self.base.project_change()
    }

    async fn on_workspace_change(&self, path: &Path) -> Result<()> {
        if !self.is_relevant_change(path) {
            return Ok(());
        }
        tracing::debug!("nx configuration changed: {}", path.display());

        let projects = self.load_projects().await?;
        let changes = self.base.replace_snapshot(&projects);
        if !changes.is_empty() {
            tracing::info!("nx project set changed ({} updates)", changes.len());
        }
        self.base.publish(&changes);
        Ok(())
    }
}

#[cfg(test)]
#[path = "nx_tests.rs"]
mod tests;
