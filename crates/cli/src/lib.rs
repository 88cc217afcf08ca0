pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod event;
pub mod project_manager;
pub mod repo;
pub mod test_loader;
pub mod watch;

pub use cli::{Cli, Command, OutputFormat, ProjectsArgs, WatchArgs};
pub use config::{Configuration, Settings};
pub use error::{Error, ExitCode, Result};
pub use event::{Emitter, Event, Subscription};
pub use project_manager::{ProjectManager, ProjectsChangedEvent, TestState};
pub use repo::{
    ProjectChangeEvent, ProjectConfig, RepoParser, get_repo_parser, select_parser,
};
pub use test_loader::{EnvironmentChangedEvent, FileTestLoader, TestLoader, TestLoaderFactory};
pub use watch::{FileChange, FileChangeKind, WorkspaceWatcher};

#[cfg(test)]
pub mod test_utils;
