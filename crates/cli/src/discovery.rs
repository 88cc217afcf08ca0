//! Settings file discovery.
//!
//! A workspace is configured by the nearest `scout.toml` at or above its
//! root, within the same repository. Opening a package nested inside a
//! monorepo therefore picks up the monorepo's settings, while a separate
//! checkout never inherits settings from the directory it sits in.

use std::path::{Path, PathBuf};

use crate::config::{self, SETTINGS_FILE_NAME, Settings};
use crate::error::{Error, Result};

/// Where a workspace's settings come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    /// Given with `-C`/`--config` or `SCOUT_CONFIG`.
    Explicit(PathBuf),
    /// Found at or above the workspace root.
    Discovered(PathBuf),
    /// No settings file; built-in defaults apply.
    Defaults,
}

impl SettingsSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SettingsSource::Explicit(path) | SettingsSource::Discovered(path) => Some(path),
            SettingsSource::Defaults => None,
        }
    }
}

/// Nearest `scout.toml` from `workspace_root` up to the repository root.
///
/// The directory holding `.git` is the last one searched.
pub fn find_settings(workspace_root: &Path) -> Option<PathBuf> {
    for dir in workspace_root.ancestors() {
        let candidate = dir.join(SETTINGS_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    None
}

/// Decide which settings file applies to `workspace_root`.
///
/// An explicit path must exist; otherwise discovery runs.
pub fn resolve_settings(explicit: Option<&Path>, workspace_root: &Path) -> Result<SettingsSource> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(Error::Config {
                message: format!("config file not found: {}", path.display()),
                path: Some(path.to_path_buf()),
            });
        }
        return Ok(SettingsSource::Explicit(path.to_path_buf()));
    }

    Ok(match find_settings(workspace_root) {
        Some(path) => SettingsSource::Discovered(path),
        None => SettingsSource::Defaults,
    })
}

/// Resolve and load the settings for `workspace_root`.
pub fn load_settings(
    explicit: Option<&Path>,
    workspace_root: &Path,
) -> Result<(Settings, SettingsSource)> {
    let source = resolve_settings(explicit, workspace_root)?;
    let settings = match source.path() {
        Some(path) => {
            tracing::debug!("loading settings from {}", path.display());
            config::load(path)?
        }
        None => {
            tracing::debug!(
                "no {} for {}, using defaults",
                SETTINGS_FILE_NAME,
                workspace_root.display()
            );
            Settings::default()
        }
    };
    Ok((settings, source))
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
