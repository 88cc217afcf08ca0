// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use tempfile::TempDir;
use yare::parameterized;

use super::*;
use crate::repo::JestExecutionParams;
use crate::test_utils::create_tree;

fn project(root: &Path) -> ProjectConfig {
    ProjectConfig::new(
        "web",
        root,
        JestExecutionParams {
            jest_command: "npx jest".to_string(),
            jest_execution_directory: root.to_path_buf(),
        },
    )
    .with_jest_config(Some(root.join("jest.config.js")))
}

fn recorded(loader: &FileTestLoader) -> (Arc<Mutex<Vec<EnvironmentChangedEvent>>>, crate::event::Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = loader
        .environment_change()
        .subscribe(move |event: &EnvironmentChangedEvent| sink.lock().unwrap().push(event.clone()));
    (seen, sub)
}

#[parameterized(
    dot_test = { "src/app.test.ts", true },
    dot_spec = { "src/app.spec.jsx", true },
    tests_dir = { "src/__tests__/app.js", true },
    root_level = { "index.test.mjs", true },
    plain_source = { "src/app.ts", false },
    snapshot = { "src/__tests__/__snapshots__/app.test.ts.snap", false },
    build_output = { "dist/app.test.js", false },
    nested_vendor = { "packages/a/node_modules/x/y.test.js", false },
)]
fn classifies_test_files(relative: &str, expected: bool) {
    let dir = TempDir::new().unwrap();
    let loader = FileTestLoader::new(project(dir.path())).unwrap();
    assert_eq!(loader.is_test_file(&dir.path().join(relative)), expected);
}

#[tokio::test]
async fn initial_scan_finds_test_files() {
    let dir = TempDir::new().unwrap();
    create_tree(
        dir.path(),
        &[
            ("src/app.ts", ""),
            ("src/app.test.ts", ""),
            ("src/__tests__/util.js", ""),
            ("coverage/lcov-report/app.test.js", ""),
            ("node_modules/lib/lib.spec.js", ""),
        ],
    );

    let loader = FileTestLoader::load(project(dir.path())).await.unwrap();

    assert_eq!(
        loader.test_files(),
        vec![
            dir.path().join("src/__tests__/util.js"),
            dir.path().join("src/app.test.ts"),
        ]
    );
}

#[tokio::test]
async fn initial_scan_respects_gitignore() {
    let dir = TempDir::new().unwrap();
    create_tree(
        dir.path(),
        &[
            (".gitignore", "generated/\n"),
            ("generated/app.test.ts", ""),
            ("src/app.test.ts", ""),
        ],
    );

    let loader = FileTestLoader::load(project(dir.path())).await.unwrap();
    assert_eq!(loader.test_files(), vec![dir.path().join("src/app.test.ts")]);
}

#[tokio::test]
async fn created_test_file_fires_test_event() {
    let dir = TempDir::new().unwrap();
    create_tree(dir.path(), &[("a.test.ts", "")]);
    let loader = FileTestLoader::load(project(dir.path())).await.unwrap();
    let (seen, _sub) = recorded(&loader);

    let path = dir.path().join("b.test.ts");
    loader.on_file_change(&FileChange::created(&path));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let EnvironmentChangedEvent::Test(event) = &seen[0] else {
        panic!("expected test event, got {:?}", seen[0]);
    };
    assert_eq!(event.added_test_files, vec![path.clone()]);
    assert_eq!(event.invalidated_test_ids, vec![path.display().to_string()]);
    assert_eq!(
        event.test_files,
        vec![dir.path().join("a.test.ts"), path]
    );
}

#[tokio::test]
async fn modified_known_test_file_is_reported_as_modified() {
    let dir = TempDir::new().unwrap();
    create_tree(dir.path(), &[("a.test.ts", "")]);
    let loader = FileTestLoader::load(project(dir.path())).await.unwrap();
    let (seen, _sub) = recorded(&loader);

    loader.on_file_change(&FileChange::modified(dir.path().join("a.test.ts")));

    let seen = seen.lock().unwrap();
    let EnvironmentChangedEvent::Test(event) = &seen[0] else {
        panic!("expected test event");
    };
    assert!(event.added_test_files.is_empty());
    assert_eq!(event.modified_test_files, vec![dir.path().join("a.test.ts")]);
}

#[tokio::test]
async fn removed_test_file_updates_list() {
    let dir = TempDir::new().unwrap();
    create_tree(dir.path(), &[("a.test.ts", ""), ("b.test.ts", "")]);
    let loader = FileTestLoader::load(project(dir.path())).await.unwrap();
    let (seen, _sub) = recorded(&loader);

    loader.on_file_change(&FileChange::removed(dir.path().join("a.test.ts")));
    loader.on_file_change(&FileChange::removed(dir.path().join("unknown.test.ts")));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let EnvironmentChangedEvent::Test(event) = &seen[0] else {
        panic!("expected test event");
    };
    assert_eq!(event.removed_test_files, vec![dir.path().join("a.test.ts")]);
    assert_eq!(loader.test_files(), vec![dir.path().join("b.test.ts")]);
}

#[parameterized(
    source = { "src/app.tsx" },
    jest_config = { "jest.config.js" },
)]
fn app_changes_fire_app_event(relative: &str) {
    let dir = TempDir::new().unwrap();
    let loader = FileTestLoader::new(project(dir.path())).unwrap();
    let (seen, _sub) = recorded(&loader);

    let path = dir.path().join(relative);
    loader.on_file_change(&FileChange::modified(&path));

    assert_eq!(
        *seen.lock().unwrap(),
        vec![EnvironmentChangedEvent::App(ProjectAppChangedEvent {
            changed_file: path
        })]
    );
}

#[parameterized(
    readme = { "README.md" },
    build_output = { "dist/main.js" },
)]
fn irrelevant_changes_are_ignored(relative: &str) {
    let dir = TempDir::new().unwrap();
    let loader = FileTestLoader::new(project(dir.path())).unwrap();
    let (seen, _sub) = recorded(&loader);

    loader.on_file_change(&FileChange::modified(dir.path().join(relative)));

    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn changes_outside_project_are_ignored() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("apps/web");
    create_tree(&root, &[("a.test.ts", "")]);
    let loader = FileTestLoader::new(project(&root)).unwrap();
    let (seen, _sub) = recorded(&loader);

    loader.on_file_change(&FileChange::created(dir.path().join("apps/api/b.test.ts")));

    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn disposed_loader_ignores_changes() {
    let dir = TempDir::new().unwrap();
    let loader = FileTestLoader::new(project(dir.path())).unwrap();
    let (seen, sub) = recorded(&loader);

    loader.dispose();
    loader.dispose();
    loader.on_file_change(&FileChange::created(dir.path().join("a.test.ts")));

    assert!(seen.lock().unwrap().is_empty());
    assert!(loader.test_files().is_empty());
    drop(sub);
}

#[test]
fn new_loader_skips_the_scan() {
    let dir = TempDir::new().unwrap();
    create_tree(dir.path(), &[("a.spec.js", "")]);

    let loader = FileTestLoader::new(project(dir.path())).unwrap();

    assert!(loader.test_files().is_empty());
}

#[tokio::test]
async fn factory_creates_loader_for_config() {
    let dir = TempDir::new().unwrap();
    create_tree(dir.path(), &[("a.spec.js", "")]);

    let loader = FsTestLoaderFactory
        .create(&project(dir.path()))
        .await
        .unwrap();

    assert_eq!(loader.config().project_name, "web");
    assert_eq!(loader.test_files(), vec![dir.path().join("a.spec.js")]);
}
