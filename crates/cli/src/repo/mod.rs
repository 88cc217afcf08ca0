// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Repository layout detection.
//!
//! Each supported layout has a parser implementing [`RepoParser`]. Selection
//! asks every parser whether it matches and picks the highest-priority match:
//!
//! 1. Nx workspace (`nx.json` + `workspace.json`/`angular.json`)
//! 2. Create React App (`react-scripts` dependency)
//! 3. Standard single project (`package.json`)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

mod base;
mod create_react_app;
mod nx;
mod package_json;
mod package_manager;
mod standard;
mod types;

pub use base::{ParserBase, diff_projects, resolve_path};
pub use create_react_app::CreateReactAppParser;
pub use nx::{JEST_EXECUTOR, NxRepositoryParser};
pub use package_json::{PackageJson, parse_declared_version};
pub use package_manager::PackageManager;
pub use standard::StandardParser;
pub use types::{JestExecutionParams, ProjectChangeEvent, ProjectConfig};

use crate::config::Configuration;
use crate::error::Result;
use crate::event::Event;

/// A parser for one repository layout.
#[async_trait]
pub trait RepoParser: Send + Sync {
    /// Layout name for diagnostics (e.g., "Nx v2 Workspace").
    fn name(&self) -> &'static str;

    /// Whether the workspace has this layout's marker files.
    ///
    /// Missing files and I/O failures both mean "no match".
    async fn is_match(&self) -> bool;

    /// Enumerate the workspace's projects.
    ///
    /// Fails when a manifest exists but cannot be parsed or a referenced
    /// project file is missing. A matching layout without qualifying
    /// projects yields an empty list.
    async fn get_projects(&self) -> Result<Vec<ProjectConfig>>;

    /// Changes to the project set detected after `get_projects()`.
    ///
    /// Parsers without incremental detection return a stream that never fires.
    fn project_change(&self) -> Event<ProjectChangeEvent>;

    /// React to a change of `path` inside the workspace.
    async fn on_workspace_change(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// Select the highest-priority parser whose `is_match` succeeds.
///
/// All candidates are evaluated concurrently; the result depends only on the
/// order of `candidates`, never on which check finishes first.
pub async fn select_parser(candidates: Vec<Arc<dyn RepoParser>>) -> Option<Arc<dyn RepoParser>> {
    let matches = join_all(candidates.iter().map(|parser| parser.is_match())).await;

    let parser = candidates
        .into_iter()
        .zip(matches)
        .find_map(|(parser, matched)| matched.then_some(parser));

    tracing::info!(
        "Selected parser: {}",
        parser.as_ref().map(|p| p.name()).unwrap_or("none")
    );
    parser
}

/// Known parsers for `workspace_root`, in priority order.
pub fn known_parsers(
    workspace_root: &Path,
    settings: Arc<dyn Configuration>,
) -> Vec<Arc<dyn RepoParser>> {
    vec![
        Arc::new(NxRepositoryParser::new(workspace_root, Arc::clone(&settings))),
        Arc::new(CreateReactAppParser::new(workspace_root, Arc::clone(&settings))),
        Arc::new(StandardParser::new(workspace_root, settings)),
    ]
}

/// Returns the parser matching `workspace_root`, or `None` for an
/// unsupported or empty workspace.
pub async fn get_repo_parser(
    workspace_root: &Path,
    settings: Arc<dyn Configuration>,
) -> Option<Arc<dyn RepoParser>> {
    select_parser(known_parsers(workspace_root, settings)).await
}

/// Resolves the parser for a workspace. The seam [`crate::ProjectManager`]
/// memoizes.
#[async_trait]
pub trait ParserResolver: Send + Sync {
    async fn resolve(&self, workspace_root: &Path) -> Option<Arc<dyn RepoParser>>;
}

/// Resolver backed by [`get_repo_parser`].
pub struct LayoutResolver {
    settings: Arc<dyn Configuration>,
}

impl LayoutResolver {
    pub fn new(settings: Arc<dyn Configuration>) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl ParserResolver for LayoutResolver {
    async fn resolve(&self, workspace_root: &Path) -> Option<Arc<dyn RepoParser>> {
        get_repo_parser(workspace_root, Arc::clone(&self.settings)).await
    }
}

/// Absolute, lexically normalized form of a user-supplied workspace root.
pub fn workspace_root(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|source| crate::Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(resolve_path(&absolute, Path::new("")))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
