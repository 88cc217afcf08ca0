use std::path::PathBuf;

/// Scout error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Settings file not found or invalid
    #[error("config error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Workspace manifest or project fragment could not be parsed
    #[error("failed to parse {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// Invalid command-line arguments
    #[error("argument error: {0}")]
    Argument(String),

    /// File I/O error
    #[error("io error: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File watcher could not be set up.
    #[error("watch error: {message}")]
    Watch { message: String },

    /// The project manager was used after `dispose()`.
    #[error("project manager has been disposed")]
    Disposed,

    /// Internal error (bug)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::ConfigParse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Result type using scout Error
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Configuration or argument error
    ConfigError = 2,
    /// Internal error
    InternalError = 3,
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config { .. } | Error::ConfigParse { .. } | Error::Argument(_) => {
                ExitCode::ConfigError
            }
            Error::Io { .. } | Error::Watch { .. } => ExitCode::InternalError,
            Error::Disposed | Error::Internal(_) => ExitCode::InternalError,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
