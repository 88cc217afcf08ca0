// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level project lifecycle.
//!
//! A [`ProjectManager`] resolves the repository layout once, keeps exactly
//! one test loader per discovered project, and republishes loader and parser
//! events as [`ProjectsChangedEvent`]s tagged with the originating project.
//!
//! Loaders are keyed by project name. Parser change events are queued when
//! they fire and applied in order by the next manager call, since creating
//! a loader is asynchronous.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::event::{Emitter, Subscription};
use crate::repo::{
    LayoutResolver, ParserResolver, ProjectChangeEvent, ProjectConfig, RepoParser, diff_projects,
};
use crate::test_loader::{
    EnvironmentChangedEvent, FsTestLoaderFactory, ProjectAppChangedEvent,
    ProjectTestsChangedEvent, TestLoader, TestLoaderFactory,
};
use crate::watch::FileChange;

/// Workspace-level change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProjectsChangedEvent {
    ProjectTestsUpdated {
        project: ProjectConfig,
        event: ProjectTestsChangedEvent,
    },
    ProjectAppUpdated {
        project: ProjectConfig,
        event: ProjectAppChangedEvent,
    },
    ProjectAdded {
        project: ProjectConfig,
    },
    #[serde(rename_all = "camelCase")]
    ProjectRemoved {
        project_name: String,
        root_path: PathBuf,
    },
}

/// Resolved parser and the loaders currently owned by the manager.
#[derive(Clone)]
pub struct TestState {
    /// `None` when no layout matched the workspace.
    pub parser: Option<Arc<dyn RepoParser>>,
    pub loaders: Vec<Arc<dyn TestLoader>>,
}

impl TestState {
    pub fn projects(&self) -> Vec<ProjectConfig> {
        self.loaders.iter().map(|l| l.config().clone()).collect()
    }
}

impl std::fmt::Debug for TestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestState")
            .field("parser", &self.parser.as_ref().map(|p| p.name()))
            .field("projects", &self.projects())
            .finish()
    }
}

/// A loader and the manager's subscription on its events.
struct LoaderEntry {
    project_name: String,
    loader: Arc<dyn TestLoader>,
    subscription: Subscription,
}

impl LoaderEntry {
    fn release(self) {
        self.subscription.dispose();
        self.loader.dispose();
    }
}

struct Inner {
    workspace_root: PathBuf,
    resolver: Arc<dyn ParserResolver>,
    loader_factory: Arc<dyn TestLoaderFactory>,
    parser: OnceCell<Option<Arc<dyn RepoParser>>>,
    initialized: OnceCell<()>,
    loaders: Mutex<Vec<LoaderEntry>>,
    parser_subscription: Mutex<Option<Subscription>>,
    pending_changes: Mutex<VecDeque<ProjectChangeEvent>>,
    /// Serializes application of queued project changes.
    apply_lock: tokio::sync::Mutex<()>,
    projects_changed: Emitter<ProjectsChangedEvent>,
    disposed: AtomicBool,
}

impl Inner {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_disposed() {
            return Err(Error::Disposed);
        }
        Ok(())
    }

    async fn parser(&self) -> Option<Arc<dyn RepoParser>> {
        self.parser
            .get_or_init(|| async {
                let parser = self.resolver.resolve(&self.workspace_root).await;
                if parser.is_none() {
                    tracing::warn!(
                        "no supported repository layout in {}",
                        self.workspace_root.display()
                    );
                }
                parser
            })
            .await
            .clone()
    }

    async fn initialize(self: &Arc<Self>) -> Result<()> {
        let Some(parser) = self.parser().await else {
            return Ok(());
        };
        let projects = parser.get_projects().await?;
        self.ensure_live()?;
        tracing::info!("{}: {} projects", parser.name(), projects.len());

        let created =
            join_all(projects.into_iter().map(|config| self.create_entry(config))).await;
        let mut entries = Vec::with_capacity(created.len());
        let mut failure = None;
        for result in created {
            match result {
                Ok(entry) => entries.push(entry),
                Err(e) => failure = failure.or(Some(e)),
            }
        }
        if let Some(e) = failure {
            entries.into_iter().for_each(LoaderEntry::release);
            return Err(e);
        }

        let weak = Arc::downgrade(self);
        let subscription = parser
            .project_change()
            .subscribe(move |event: &ProjectChangeEvent| {
                if let Some(inner) = Weak::upgrade(&weak) {
                    inner.enqueue(event.clone());
                }
            });

        let (Ok(mut loaders), Ok(mut parser_subscription)) =
            (self.loaders.lock(), self.parser_subscription.lock())
        else {
            return Err(Error::Internal("project manager state poisoned".to_string()));
        };
        if self.is_disposed() {
            drop(loaders);
            drop(parser_subscription);
            subscription.dispose();
            entries.into_iter().for_each(LoaderEntry::release);
            return Err(Error::Disposed);
        }
        *loaders = entries;
        *parser_subscription = Some(subscription);
        Ok(())
    }

    async fn create_entry(&self, config: ProjectConfig) -> Result<LoaderEntry> {
        let loader = self.loader_factory.create(&config).await?;
        let emitter = self.projects_changed.clone();
        let project = config.clone();
        let subscription = loader
            .environment_change()
            .subscribe(move |event: &EnvironmentChangedEvent| {
                let tagged = match event {
                    EnvironmentChangedEvent::Test(event) => {
                        ProjectsChangedEvent::ProjectTestsUpdated {
                            project: project.clone(),
                            event: event.clone(),
                        }
                    }
                    EnvironmentChangedEvent::App(event) => ProjectsChangedEvent::ProjectAppUpdated {
                        project: project.clone(),
                        event: event.clone(),
                    },
                };
                emitter.fire(&tagged);
            });

        Ok(LoaderEntry {
            project_name: config.project_name,
            loader,
            subscription,
        })
    }

    fn enqueue(&self, change: ProjectChangeEvent) {
        if self.is_disposed() {
            return;
        }
        if let Ok(mut pending) = self.pending_changes.lock() {
            pending.push_back(change);
        }
    }

    fn next_pending(&self) -> Option<ProjectChangeEvent> {
        self.pending_changes.lock().ok()?.pop_front()
    }

    /// Apply queued project changes in the order they were reported.
    async fn apply_pending(&self) {
        let _guard = self.apply_lock.lock().await;
        while let Some(change) = self.next_pending() {
            if self.is_disposed() {
                return;
            }
            match &change {
                ProjectChangeEvent::Added { config } => self.add_project(config).await,
                ProjectChangeEvent::Removed {
                    project_name,
                    root_path,
                } => self.remove_project(project_name, root_path),
            }
        }
    }

    async fn add_project(&self, config: &ProjectConfig) {
        let entry = match self.create_entry(config.clone()).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("cannot load tests for {}: {}", config.project_name, e);
                return;
            }
        };

        let replaced = {
            let Ok(mut loaders) = self.loaders.lock() else {
                entry.release();
                return;
            };
            if self.is_disposed() {
                drop(loaders);
                entry.release();
                return;
            }
            match loaders
                .iter()
                .position(|e| e.project_name == config.project_name)
            {
                Some(index) => Some(std::mem::replace(&mut loaders[index], entry)),
                None => {
                    loaders.push(entry);
                    None
                }
            }
        };
        if let Some(old) = replaced {
            old.release();
        }

        tracing::info!("project added: {}", config.project_name);
        self.projects_changed.fire(&ProjectsChangedEvent::ProjectAdded {
            project: config.clone(),
        });
    }

    fn remove_project(&self, project_name: &str, root_path: &Path) {
        let removed = match self.loaders.lock() {
            Ok(mut loaders) => loaders
                .iter()
                .position(|e| e.project_name == project_name)
                .map(|index| loaders.remove(index)),
            Err(_) => None,
        };
        let Some(entry) = removed else {
            tracing::debug!("ignoring removal of unknown project {}", project_name);
            return;
        };
        entry.release();

        tracing::info!("project removed: {}", project_name);
        self.projects_changed.fire(&ProjectsChangedEvent::ProjectRemoved {
            project_name: project_name.to_string(),
            root_path: root_path.to_path_buf(),
        });
    }

    fn loaders(&self) -> Vec<Arc<dyn TestLoader>> {
        self.loaders
            .lock()
            .map(|entries| entries.iter().map(|e| Arc::clone(&e.loader)).collect())
            .unwrap_or_default()
    }

    fn release_all(&self) {
        let subscription = self
            .parser_subscription
            .lock()
            .ok()
            .and_then(|mut slot| slot.take());
        if let Some(subscription) = subscription {
            subscription.dispose();
        }

        let entries = self
            .loaders
            .lock()
            .map(|mut loaders| std::mem::take(&mut *loaders))
            .unwrap_or_default();
        entries.into_iter().for_each(LoaderEntry::release);

        if let Ok(mut pending) = self.pending_changes.lock() {
            pending.clear();
        }
        self.projects_changed.dispose();
    }
}

/// Owns the parser and test loaders for one workspace.
pub struct ProjectManager {
    inner: Arc<Inner>,
}

impl ProjectManager {
    /// Manager using layout detection and file-system test loaders.
    pub fn new(workspace_root: impl Into<PathBuf>, settings: Arc<dyn Configuration>) -> Self {
        Self::with_parts(
            workspace_root,
            Arc::new(LayoutResolver::new(settings)),
            Arc::new(FsTestLoaderFactory),
        )
    }

    pub fn with_parts(
        workspace_root: impl Into<PathBuf>,
        resolver: Arc<dyn ParserResolver>,
        loader_factory: Arc<dyn TestLoaderFactory>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                workspace_root: workspace_root.into(),
                resolver,
                loader_factory,
                parser: OnceCell::new(),
                initialized: OnceCell::new(),
                loaders: Mutex::new(Vec::new()),
                parser_subscription: Mutex::new(None),
                pending_changes: Mutex::new(VecDeque::new()),
                apply_lock: tokio::sync::Mutex::new(()),
                projects_changed: Emitter::new(),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.inner.workspace_root
    }

    /// The parser and current loaders, initializing on first use.
    ///
    /// Concurrent first calls share one initialization. A failed
    /// initialization is not cached. Queued project changes are applied
    /// before the state is returned.
    pub async fn get_test_state(&self) -> Result<TestState> {
        self.inner.ensure_live()?;
        self.inner
            .initialized
            .get_or_try_init(|| self.inner.initialize())
            .await?;
        self.inner.apply_pending().await;
        self.inner.ensure_live()?;
        Ok(self.snapshot())
    }

    /// Re-enumerate projects and reconcile loaders with the result.
    pub async fn refresh(&self) -> Result<TestState> {
        self.get_test_state().await?;
        let Some(parser) = self.inner.parser().await else {
            return Ok(self.snapshot());
        };

        let projects = parser.get_projects().await?;
        self.inner.ensure_live()?;

        let current: Vec<ProjectConfig> = self
            .inner
            .loaders()
            .iter()
            .map(|l| l.config().clone())
            .collect();
        let changes = diff_projects(&current, &projects);
        tracing::debug!("refresh: {} project changes", changes.len());
        changes
            .into_iter()
            .for_each(|change| self.inner.enqueue(change));
        self.inner.apply_pending().await;
        self.inner.ensure_live()?;
        Ok(self.snapshot())
    }

    /// Subscribe to workspace-level change notifications.
    pub fn projects_changed<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ProjectsChangedEvent) + Send + Sync + 'static,
    {
        self.inner.projects_changed.event().subscribe(callback)
    }

    /// Route a file change to the parser and to every loader containing it.
    ///
    /// Project changes the parser reports in response are applied before the
    /// loaders see the file. Parser failures are logged and returned after
    /// the loaders have seen the change. Before initialization there is
    /// nothing to notify.
    pub async fn handle_file_change(&self, change: &FileChange) -> Result<()> {
        self.inner.ensure_live()?;
        if self.inner.initialized.get().is_none() {
            return Ok(());
        }

        let parser_result = match self.inner.parser.get().cloned().flatten() {
            Some(parser) => parser.on_workspace_change(&change.path).await,
            None => Ok(()),
        };
        if let Err(e) = &parser_result {
            tracing::warn!("workspace change {}: {}", change.path.display(), e);
        }
        self.inner.apply_pending().await;

        for loader in self.inner.loaders() {
            if loader.config().contains(&change.path) {
                loader.on_file_change(change);
            }
        }
        parser_result
    }

    /// Release every loader and subscription. Safe to call more than once.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!("disposing project manager for {}", self.workspace_root().display());
        self.inner.release_all();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    fn snapshot(&self) -> TestState {
        TestState {
            parser: self.inner.parser.get().cloned().flatten(),
            loaders: self.inner.loaders(),
        }
    }
}

impl Drop for ProjectManager {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "project_manager_tests.rs"]
mod tests;
