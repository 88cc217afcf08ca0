// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Projects command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;

use scout::cli::{Cli, OutputFormat, ProjectsArgs, root_arg};
use scout::config::Configuration;
use scout::discovery::{self, SettingsSource};
use scout::error::{Error, ExitCode};
use scout::repo::{self, ProjectConfig, get_repo_parser};

/// A workspace root with the settings that apply to it.
pub struct Workspace {
    pub root: PathBuf,
    pub settings: Arc<dyn Configuration>,
    pub settings_source: SettingsSource,
}

/// Resolve the workspace root and its settings for a subcommand.
pub fn prepare(cli: &Cli, path: Option<&PathBuf>) -> anyhow::Result<Workspace> {
    let root = repo::workspace_root(&root_arg(path))?;
    if !root.is_dir() {
        return Err(Error::Argument(format!("not a directory: {}", root.display())).into());
    }
    let (settings, settings_source) = discovery::load_settings(cli.config.as_deref(), &root)?;
    Ok(Workspace {
        root,
        settings: Arc::new(settings),
        settings_source,
    })
}

/// Settings file for display, `None` when defaults apply.
pub fn settings_file(source: &SettingsSource) -> Option<String> {
    source.path().map(|path| path.display().to_string())
}

/// Run the projects command.
pub async fn run(cli: &Cli, args: &ProjectsArgs) -> anyhow::Result<ExitCode> {
    let Workspace {
        root,
        settings,
        settings_source,
    } = prepare(cli, args.path.as_ref())?;
    let settings_file = settings_file(&settings_source);

    let parser = get_repo_parser(&root, settings).await;
    let (layout, projects) = match &parser {
        Some(parser) => (Some(parser.name()), parser.get_projects().await?),
        None => (None, Vec::new()),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Json => {
            let report = json!({
                "workspaceRoot": root,
                "settingsFile": settings_file,
                "layout": layout,
                "projects": projects,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        OutputFormat::Text => {
            write_text(&mut out, &root, settings_file.as_deref(), layout, &projects)?
        }
    }

    Ok(ExitCode::Success)
}

fn write_text(
    out: &mut impl Write,
    root: &Path,
    settings_file: Option<&str>,
    layout: Option<&str>,
    projects: &[ProjectConfig],
) -> std::io::Result<()> {
    let Some(layout) = layout else {
        writeln!(out, "{}: no supported layout", root.display())?;
        return Ok(());
    };

    writeln!(out, "{}: {}", root.display(), layout)?;
    writeln!(out, "  settings: {}", settings_file.unwrap_or("defaults"))?;
    if projects.is_empty() {
        writeln!(out, "  no test projects")?;
    }
    for project in projects {
        writeln!(out, "  {}", project.project_name)?;
        writeln!(out, "    root: {}", project.root_path.display())?;
        writeln!(out, "    command: {}", project.jest_command)?;
        writeln!(out, "    directory: {}", project.jest_execution_directory.display())?;
        if let Some(config) = &project.jest_config {
            writeln!(out, "    jest config: {}", config.display())?;
        }
        if let Some(config) = &project.ts_config {
            writeln!(out, "    ts config: {}", config.display())?;
        }
    }
    Ok(())
}
