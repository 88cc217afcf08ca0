//! Settings file specs.

use crate::prelude::*;

fn standard_workspace() -> Workspace {
    let temp = Workspace::empty();
    temp.file("package.json", r#"{"name": "lib"}"#);
    temp
}

/// > [jest] path_to_jest overrides the Jest command
#[test]
fn path_to_jest_overrides_command() {
    let temp = standard_workspace();
    temp.settings("[jest]\npath_to_jest = \"node_modules/.bin/jest --ci\"\n");

    let json = projects().pwd(temp.path()).json();
    assert_eq!(
        json["projects"][0]["jestCommand"],
        "node_modules/.bin/jest --ci"
    );
}

/// > [jest] path_to_config selects the Jest config
#[test]
fn path_to_config_selects_config() {
    let temp = standard_workspace();
    temp.settings("[jest]\npath_to_config = \"config/jest.ci.js\"\n");

    let json = projects().pwd(temp.path()).json();
    assert!(
        json["projects"][0]["jestConfig"]
            .as_str()
            .unwrap()
            .ends_with("config/jest.ci.js")
    );
}

/// > Unknown keys are warnings (forward compatibility)
#[test]
fn unknown_key_warns() {
    let temp = standard_workspace();
    temp.settings("unknown_key = true\n");

    projects()
        .pwd(temp.path())
        .passes()
        .stderr_has("unrecognized field `unknown_key`");
}

/// > Unsupported versions are config errors (exit 2)
#[test]
fn unsupported_version_fails() {
    let temp = standard_workspace();
    temp.settings("version = 2\n");

    projects()
        .pwd(temp.path())
        .exits(2)
        .stderr_has("unsupported config version");
}

/// > SCOUT_CONFIG sets the settings file location
#[test]
fn env_config_sets_path() {
    let temp = standard_workspace();
    let settings = temp.path().join("ci.toml");
    std::fs::write(&settings, "version = 1\n[jest]\npath_to_jest = \"jest-ci\"\n").unwrap();

    let json = projects()
        .pwd(temp.path())
        .env("SCOUT_CONFIG", settings.to_str().unwrap())
        .json();
    assert_eq!(json["projects"][0]["jestCommand"], "jest-ci");
    assert!(json["settingsFile"].as_str().unwrap().ends_with("ci.toml"));
}

/// > A package inside a repository uses the repository's scout.toml
#[test]
fn nested_package_uses_repository_settings() {
    let temp = Workspace::empty();
    temp.settings("[jest]
path_to_jest = \"jest-mono\"\n");
    temp.file("packages/ui/package.json", r#"{"name": "ui"}"#);

    let json = projects()
        .pwd(temp.path())
        .args(&["packages/ui"])
        .json();
    assert_eq!(json["projects"][0]["jestCommand"], "jest-mono");
    assert!(
        json["settingsFile"]
            .as_str()
            .unwrap()
            .ends_with("scout.toml")
    );
}

/// > Without a scout.toml the defaults apply
#[test]
fn missing_settings_use_defaults() {
    let temp = standard_workspace();

    let json = projects().pwd(temp.path()).json();
    assert!(json["settingsFile"].is_null());

    projects()
        .pwd(temp.path())
        .passes()
        .stdout_has("settings: defaults");
}

/// > An explicit settings path that does not exist is a config error
#[test]
fn missing_explicit_settings_fails() {
    let temp = standard_workspace();

    projects()
        .pwd(temp.path())
        .args(&["-C", "nope.toml"])
        .exits(2)
        .stderr_has("config file not found");
}

/// > SCOUT_LOG enables debug logging to stderr
#[test]
fn env_log_enables_debug() {
    let temp = standard_workspace();

    let run = projects()
        .pwd(temp.path())
        .env("SCOUT_LOG", "debug")
        .passes();
    assert!(run.stderr().contains("Selected parser: Standard"));
}
