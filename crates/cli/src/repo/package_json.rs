// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed view of a workspace `package.json`.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use semver::Version;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

pub const PACKAGE_JSON: &str = "package.json";

/// The parts of `package.json` the parsers look at.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    pub name: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, Value>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, Value>,
}

impl PackageJson {
    /// Read `package.json` from `root`. Returns `Ok(None)` when it does not exist.
    pub async fn read(root: &Path) -> Result<Option<Self>> {
        let path = root.join(PACKAGE_JSON);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(Error::Io { path, source }),
        };
        Self::parse(&content, &path).map(Some)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::parse(path, e))
    }

    /// Declared version range of `package`.
    ///
    /// `dependencies` wins over `devDependencies`; empty entries are skipped.
    pub fn declared_version(&self, package: &str) -> Option<&str> {
        [&self.dependencies, &self.dev_dependencies]
            .into_iter()
            .filter_map(|deps| deps.get(package)?.as_str())
            .find(|version| !version.trim().is_empty())
    }

    /// Whether `package` appears in either dependency section.
    pub fn declares(&self, package: &str) -> bool {
        self.dependencies.contains_key(package) || self.dev_dependencies.contains_key(package)
    }
}

/// Parse a declared dependency version into a comparable semver version.
///
/// Range operators are stripped and missing minor/patch components are
/// filled with zero, so `^9.3` reads as `9.3.0`. Anything else that does not
/// parse (tags, URLs, workspace protocols) yields `None`.
pub fn parse_declared_version(raw: &str) -> Option<Version> {
    let trimmed = raw
        .trim()
        .trim_start_matches(['^', '~', '=', '>', '<', 'v', ' ']);
    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    let core = trimmed.split(['-', '+']).next().unwrap_or(trimmed);
    let mut parts = core.split('.').map(|p| p.parse::<u64>());
    let major = parts.next()?.ok()?;
    let minor = parts.next().transpose().ok()?.unwrap_or(0);
    let patch = parts.next().transpose().ok()?.unwrap_or(0);
    if parts.next().is_some() {
        return None;
    }
    Some(Version::new(major, minor, patch))
}

#[cfg(test)]
#[path = "package_json_tests.rs"]
mod tests;
