// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Create React App parser.
//!
//! A CRA workspace is one project driven by `react-scripts test`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use super::RepoParser;
use super::base::ParserBase;
use super::package_manager::PackageManager;
use super::types::{JestExecutionParams, ProjectChangeEvent, ProjectConfig};
use crate::config::Configuration;
use crate::error::Result;
use crate::event::Event;

const REACT_SCRIPTS: &str = "react-scripts";

pub struct CreateReactAppParser {
    base: ParserBase,
}

impl CreateReactAppParser {
    pub fn new(workspace_root: impl Into<PathBuf>, settings: Arc<dyn Configuration>) -> Self {
        Self {
            base: ParserBase::new(workspace_root, settings),
        }
    }

    async fn execution_params(&self) -> JestExecutionParams {
        let root = self.base.workspace_root();
        let jest_command = match self.base.settings().path_to_jest() {
            Some(command) => command,
            None => PackageManager::detect(root)
                .await
                .exec_line(REACT_SCRIPTS, &["test"]),
        };
        JestExecutionParams {
            jest_command,
            jest_execution_directory: root.to_path_buf(),
        }
    }
}

#[async_trait]
impl RepoParser for CreateReactAppParser {
    fn name(&self) -> &'static str {
        "Create React App"
    }

    async fn is_match(&self) -> bool {
        self.base
            .package_file()
            .await
            .is_some_and(|package| package.declares(REACT_SCRIPTS))
    }

    async fn get_projects(&self) -> Result<Vec<ProjectConfig>> {
        let name = self.base.project_name().await;
        let execution = self.execution_params().await;
        Ok(vec![ProjectConfig::new(
            name,
            self.base.workspace_root(),
            execution,
        )])
    }

    fn project_change(&self) -> Event<ProjectChangeEvent> {
        Event::never()
    }
}

#[cfg(test)]
#[path = "create_react_app_tests.rs"]
mod tests;
