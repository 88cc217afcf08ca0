//! Layout detection specs.
//!
//! Fixture workspaces live in tests/fixtures.

use crate::prelude::*;

// =============================================================================
// NX WORKSPACE
// =============================================================================

/// > Only projects whose test target runs the Nx Jest executor are listed,
/// > inline and project.json entries alike, in manifest order
#[test]
fn nx_lists_jest_projects() {
    let json = projects().pwd(fixture("nx-workspace")).json();

    assert_eq!(json["layout"], "Nx v2 Workspace");
    assert_eq!(project_names(&json), vec!["web", "ui"]);
}

/// > With the experimentalNxCli toggle and @nrwl/jest newer than 9.2.4,
/// > projects run through `nx test`
#[test]
fn nx_experimental_cli_command() {
    let json = projects().pwd(fixture("nx-workspace")).json();
    let web = &json["projects"][0];

    assert_eq!(web["jestCommand"], "nx test web");
    assert!(
        web["rootPath"].as_str().unwrap().ends_with("apps/web"),
        "rootPath: {}",
        web["rootPath"]
    );
    assert!(web["tsConfig"].as_str().unwrap().ends_with("tsconfig.spec.json"));
    assert!(json["projects"][1].get("tsConfig").is_none());
}

/// > Without the toggle the generic Jest command is used
#[test]
fn nx_without_toggle_uses_jest() {
    let temp = Workspace::empty();
    temp.settings("");
    let json = projects()
        .pwd(fixture("nx-workspace"))
        .args(&["-C", temp.path().join("scout.toml").to_str().unwrap()])
        .json();

    assert_eq!(json["projects"][0]["jestCommand"], "npx jest");
    assert_eq!(json["projects"][1]["jestCommand"], "npx jest");
}

/// > A malformed manifest is reported as a parse error (exit 2)
#[test]
fn nx_malformed_manifest_fails() {
    let temp = Workspace::empty();
    temp.file("nx.json", "{}");
    temp.file("workspace.json", "{ \"projects\": ");

    projects()
        .pwd(temp.path())
        .exits(2)
        .stderr_has("failed to parse");
}

/// > A referenced project.json that does not exist is a parse error
#[test]
fn nx_missing_project_file_fails() {
    let temp = Workspace::empty();
    temp.file("nx.json", "{}");
    temp.file("workspace.json", r#"{"projects": {"ui": "libs/ui"}}"#);

    projects()
        .pwd(temp.path())
        .exits(2)
        .stderr_has("project.json");
}

// =============================================================================
// CREATE REACT APP
// =============================================================================

/// > react-scripts workspaces are one project run via `react-scripts test`
#[test]
fn cra_single_project() {
    projects()
        .pwd(fixture("cra-app"))
        .passes()
        .stdout_has("Create React App")
        .stdout_has("storefront")
        .stdout_has("command: yarn react-scripts test");
}

// =============================================================================
// STANDARD
// =============================================================================

/// > Any package.json workspace is one project with a detected jest config
#[test]
fn standard_single_project() {
    let json = projects().pwd(fixture("standard-lib")).json();

    assert_eq!(json["layout"], "Standard");
    assert_eq!(project_names(&json), vec!["left-pad"]);
    assert_eq!(json["projects"][0]["jestCommand"], "npx jest");
    assert!(
        json["projects"][0]["jestConfig"]
            .as_str()
            .unwrap()
            .ends_with("jest.config.js")
    );
}

/// > Path argument selects the workspace
#[test]
fn path_argument_selects_workspace() {
    projects()
        .args(&[fixture("standard-lib").to_str().unwrap()])
        .passes()
        .stdout_has("left-pad");
}

// =============================================================================
// PRIORITY
// =============================================================================

/// > Nx wins over Create React App and Standard
#[test]
fn nx_takes_priority_over_other_layouts() {
    let temp = Workspace::empty();
    temp.file("nx.json", "{}");
    temp.file("workspace.json", r#"{"projects": {}}"#);
    temp.file(
        "package.json",
        r#"{"dependencies": {"react-scripts": "4.0.3"}}"#,
    );

    let json = projects().pwd(temp.path()).json();
    assert_eq!(json["layout"], "Nx v2 Workspace");
    assert!(project_names(&json).is_empty());
}

/// > An empty directory matches no layout; this is not an error
#[test]
fn empty_workspace_has_no_layout() {
    let temp = Workspace::empty();

    projects()
        .pwd(temp.path())
        .passes()
        .stdout_has("no supported layout");

    let json = projects().pwd(temp.path()).json();
    assert!(json["layout"].is_null());
    assert!(project_names(&json).is_empty());
}
