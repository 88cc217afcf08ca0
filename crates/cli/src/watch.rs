// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace file watching.
//!
//! Wraps a recursive `notify` watcher and forwards relevant events as
//! [`FileChange`] values over a tokio channel.

use std::path::{Path, PathBuf};

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// Directories whose contents never reach subscribers.
const IGNORED_DIRECTORIES: &[&str] = &["node_modules", ".git"];

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FileChangeKind {
    Created,
    Modified,
    Removed,
}

/// A single file-system change inside the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub path: PathBuf,
    pub kind: FileChangeKind,
}

impl FileChange {
    pub fn new(path: impl Into<PathBuf>, kind: FileChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self::new(path, FileChangeKind::Created)
    }

    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(path, FileChangeKind::Modified)
    }

    pub fn removed(path: impl Into<PathBuf>) -> Self {
        Self::new(path, FileChangeKind::Removed)
    }
}

/// Whether `path` lies inside a directory that is never watched.
pub fn is_ignored(path: &Path) -> bool {
    path.components().any(|component| {
        component
            .as_os_str()
            .to_str()
            .is_some_and(|name| IGNORED_DIRECTORIES.contains(&name))
    })
}

/// Map a raw notify event kind onto a [`FileChangeKind`].
///
/// The two halves of a rename become a removal and a creation. Access and
/// metadata events carry no content change and yield `None`.
pub fn classify(kind: &EventKind) -> Option<FileChangeKind> {
    match kind {
        EventKind::Create(_) => Some(FileChangeKind::Created),
        EventKind::Remove(_) => Some(FileChangeKind::Removed),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Some(FileChangeKind::Removed),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(FileChangeKind::Created),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) => Some(FileChangeKind::Modified),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

/// Recursive watcher over a workspace root.
///
/// Watching stops when the value is dropped.
pub struct WorkspaceWatcher {
    _watcher: RecommendedWatcher,
}

impl WorkspaceWatcher {
    /// Start watching `root` and return the receiving end of the change stream.
    pub fn start(root: &Path) -> Result<(Self, mpsc::UnboundedReceiver<FileChange>)> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    let Some(kind) = classify(&event.kind) else {
                        return;
                    };
                    for path in event.paths {
                        if is_ignored(&path) {
                            continue;
                        }
                        // Receiver gone means the session ended.
                        let _ = tx.send(FileChange::new(path, kind));
                    }
                }
                Err(e) => tracing::warn!("watch error: {}", e),
            },
            Config::default(),
        )
        .map_err(|e| Error::Watch {
            message: format!("failed to create watcher: {}", e),
        })?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| Error::Watch {
                message: format!("failed to watch {}: {}", root.display(), e),
            })?;

        tracing::info!("watching {}", root.display());
        Ok((Self { _watcher: watcher }, rx))
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
