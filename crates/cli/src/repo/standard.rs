// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Single-project parser for any repository with a `package.json`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use super::RepoParser;
use super::base::ParserBase;
use super::package_json::PACKAGE_JSON;
use super::types::{ProjectChangeEvent, ProjectConfig};
use crate::config::Configuration;
use crate::error::Result;
use crate::event::Event;

/// Jest config file names, checked in order.
const JEST_CONFIG_FILES: &[&str] = &[
    "jest.config.js",
    "jest.config.ts",
    "jest.config.mjs",
    "jest.config.cjs",
    "jest.config.json",
];

pub struct StandardParser {
    base: ParserBase,
}

impl StandardParser {
    pub fn new(workspace_root: impl Into<PathBuf>, settings: Arc<dyn Configuration>) -> Self {
        Self {
            base: ParserBase::new(workspace_root, settings),
        }
    }

    async fn jest_config(&self) -> Option<PathBuf> {
        if let Some(configured) = self.base.settings().path_to_config() {
            return Some(self.base.resolve(configured));
        }
        for candidate in JEST_CONFIG_FILES {
            if self.base.exists(candidate).await {
                return Some(self.base.resolve(candidate));
            }
        }
        None
    }
}

#[async_trait]
impl RepoParser for StandardParser {
    fn name(&self) -> &'static str {
        "Standard"
    }

    async fn is_match(&self) -> bool {
        self.base.exists(PACKAGE_JSON).await
    }

    async fn get_projects(&self) -> Result<Vec<ProjectConfig>> {
        let name = self.base.project_name().await;
        let execution = self.base.jest_execution_params().await;
        let jest_config = self.jest_config().await;
        Ok(vec![
            ProjectConfig::new(name, self.base.workspace_root(), execution)
                .with_jest_config(jest_config),
        ])
    }

    fn project_change(&self) -> Event<ProjectChangeEvent> {
        Event::never()
    }
}

#[cfg(test)]
#[path = "standard_tests.rs"]
mod tests;
