// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Watch command implementation.

use serde_json::json;

use scout::cli::{Cli, OutputFormat, WatchArgs};
use scout::error::ExitCode;
use scout::project_manager::{ProjectManager, ProjectsChangedEvent};
use scout::watch::WorkspaceWatcher;

use crate::cmd_projects::{Workspace, prepare, settings_file};

/// Run the watch command until interrupted.
pub async fn run(cli: &Cli, args: &WatchArgs) -> anyhow::Result<ExitCode> {
    let Workspace {
        root,
        settings,
        settings_source,
    } = prepare(cli, args.path.as_ref())?;
    let format = args.output;

    let manager = ProjectManager::new(&root, settings);
    let state = manager.get_test_state().await?;
    let layout = state.parser.as_ref().map(|p| p.name());

    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "type": "started",
                "workspaceRoot": root,
                "settingsFile": settings_file(&settings_source),
                "layout": layout,
                "projects": state.projects(),
            })
        ),
        OutputFormat::Text => println!(
            "watching {} ({}, {} projects)",
            root.display(),
            layout.unwrap_or("no supported layout"),
            state.loaders.len()
        ),
    }

    let _events = manager.projects_changed(move |event| print_event(format, event));
    let (_watcher, mut changes) = WorkspaceWatcher::start(&root)?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            change = changes.recv() => {
                let Some(change) = change else { break };
                if let Err(e) = manager.handle_file_change(&change).await {
                    eprintln!("scout: {}", e);
                }
            }
            _ = &mut shutdown => break,
        }
    }

    manager.dispose();
    if format == OutputFormat::Json {
        println!("{}", json!({ "type": "shutdown" }));
    }
    Ok(ExitCode::Success)
}

fn print_event(format: OutputFormat, event: &ProjectsChangedEvent) {
    match format {
        OutputFormat::Json => match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!("cannot serialize event: {}", e),
        },
        OutputFormat::Text => println!("{}", describe(event)),
    }
}

fn describe(event: &ProjectsChangedEvent) -> String {
    match event {
        ProjectsChangedEvent::ProjectTestsUpdated { project, event } => format!(
            "{}: tests updated (+{} -{} ~{}, {} total)",
            project.project_name,
            event.added_test_files.len(),
            event.removed_test_files.len(),
            event.modified_test_files.len(),
            event.test_files.len()
        ),
        ProjectsChangedEvent::ProjectAppUpdated { project, event } => format!(
            "{}: app changed {}",
            project.project_name,
            event.changed_file.display()
        ),
        ProjectsChangedEvent::ProjectAdded { project } => format!(
            "project added: {} ({})",
            project.project_name,
            project.root_path.display()
        ),
        ProjectsChangedEvent::ProjectRemoved {
            project_name,
            root_path,
        } => format!(
            "project removed: {} ({})",
            project_name,
            root_path.display()
        ),
    }
}
