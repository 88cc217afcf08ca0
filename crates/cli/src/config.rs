//! Settings parsing and validation.
//!
//! Handles scout.toml parsing with version validation and unknown key warnings,
//! and exposes the settings to parsers through the [`Configuration`] trait.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Settings file name looked up by discovery.
pub const SETTINGS_FILE_NAME: &str = "scout.toml";

/// Currently supported settings version.
pub const SUPPORTED_VERSION: i64 = 1;

/// Feature toggle enabling `nx test <project>` for Nx workspaces.
pub const EXPERIMENTAL_NX_CLI_FEATURE_TOGGLE: &str = "experimentalNxCli";

/// Known top-level keys.
const KNOWN_KEYS: &[&str] = &["version", "jest"];

/// Known `[jest]` keys.
const KNOWN_JEST_KEYS: &[&str] = &["path_to_jest", "path_to_config", "feature_toggles"];

/// Read-only view of the user settings that parsers consult.
pub trait Configuration: Send + Sync {
    /// Enabled feature toggles, `None` when the setting is absent.
    fn feature_toggles(&self) -> Option<Vec<String>>;

    /// Explicit Jest command, overriding package manager detection.
    fn path_to_jest(&self) -> Option<String>;

    /// Explicit Jest config path, relative to the workspace root.
    fn path_to_config(&self) -> Option<String>;
}

/// Raw settings, keeping unknown keys for warnings.
#[derive(Deserialize)]
struct RawSettings {
    version: Option<i64>,

    #[serde(default)]
    jest: Option<toml::Value>,

    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

/// Full settings.
#[derive(Debug, Default, Clone)]
pub struct Settings {
    /// Settings file version (must be 1).
    pub version: i64,

    /// Jest invocation settings.
    pub jest: JestSettings,
}

/// `[jest]` table.
#[derive(Debug, Default, Clone)]
pub struct JestSettings {
    /// Command used to run Jest (e.g. "node_modules/.bin/jest").
    pub path_to_jest: Option<String>,

    /// Jest config file, relative to the workspace root.
    pub path_to_config: Option<String>,

    /// Experimental behaviour switches (e.g. ["experimentalNxCli"]).
    pub feature_toggles: Option<Vec<String>>,
}

impl Settings {
    /// Settings with the given feature toggles and nothing else configured.
    pub fn with_feature_toggles<I, S>(toggles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            version: SUPPORTED_VERSION,
            jest: JestSettings {
                feature_toggles: Some(toggles.into_iter().map(Into::into).collect()),
                ..JestSettings::default()
            },
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

impl Configuration for Settings {
    fn feature_toggles(&self) -> Option<Vec<String>> {
        self.jest.feature_toggles.clone()
    }

    fn path_to_jest(&self) -> Option<String> {
        non_empty(&self.jest.path_to_jest)
    }

    fn path_to_config(&self) -> Option<String> {
        non_empty(&self.jest.path_to_config)
    }
}

/// Load and validate settings from a file path.
pub fn load(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse(&content, path)
}

fn config_error(path: &Path, message: impl Into<String>) -> Error {
    Error::Config {
        message: message.into(),
        path: Some(path.to_path_buf()),
    }
}

/// Parse settings, warning on unknown keys instead of failing.
///
/// Known keys with the wrong type are errors.
pub fn parse(content: &str, path: &Path) -> Result<Settings> {
    let raw: RawSettings =
        toml::from_str(content).map_err(|e| config_error(path, e.to_string()))?;

    let version = raw
        .version
        .ok_or_else(|| config_error(path, "missing required field: version"))?;
    check_version(version, path)?;

    for key in raw.unknown.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warn_unknown_key(path, key);
        }
    }

    let jest = match raw.jest {
        Some(toml::Value::Table(t)) => {
            for key in t.keys() {
                if !KNOWN_JEST_KEYS.contains(&key.as_str()) {
                    warn_unknown_key(path, &format!("jest.{}", key));
                }
            }
            JestSettings {
                path_to_jest: string_value(path, &t, "path_to_jest")?,
                path_to_config: string_value(path, &t, "path_to_config")?,
                feature_toggles: string_array(path, &t, "feature_toggles")?,
            }
        }
        Some(_) => return Err(config_error(path, "`jest` must be a table")),
        None => JestSettings::default(),
    };

    Ok(Settings { version, jest })
}

fn check_version(version: i64, path: &Path) -> Result<()> {
    if version != SUPPORTED_VERSION {
        return Err(config_error(
            path,
            format!(
                "unsupported config version {} (supported: {})\n  Upgrade scout to use this config.",
                version, SUPPORTED_VERSION
            ),
        ));
    }
    Ok(())
}

fn string_value(path: &Path, table: &toml::Table, key: &str) -> Result<Option<String>> {
    match table.get(key) {
        None => Ok(None),
        Some(toml::Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(config_error(path, format!("`jest.{}` must be a string", key))),
    }
}

fn string_array(path: &Path, table: &toml::Table, key: &str) -> Result<Option<Vec<String>>> {
    let Some(value) = table.get(key) else {
        return Ok(None);
    };
    let invalid = || config_error(path, format!("`jest.{}` must be an array of strings", key));
    let items = value.as_array().ok_or_else(invalid)?;
    items
        .iter()
        .map(|item| item.as_str().map(String::from).ok_or_else(invalid))
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

fn warn_unknown_key(path: &Path, key: &str) {
    eprintln!(
        "scout: warning: {}: unrecognized field `{}` (ignored)",
        path.display(),
        key
    );
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
