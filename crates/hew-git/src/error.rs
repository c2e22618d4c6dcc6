//! Error types for hew-git.

use std::time::Duration;

use git2::Oid;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during git operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not inside a git repository.
    #[error("not a git repository")]
    NotARepository,

    /// The repository has no working directory.
    #[error("cannot run in a bare repository")]
    BareRepository,

    /// Reference or revision could not be verified.
    #[error("unknown revision: {0}")]
    RefNotFound(String),

    /// Revision text that git would misread (empty, or looks like a flag).
    #[error("invalid revision {0:?}")]
    InvalidRevision(String),

    /// Two commits share no history.
    #[error("no common ancestor between {0} and {1}")]
    NoMergeBase(Oid, Oid),

    /// A git subprocess could not be started or exited unsuccessfully.
    #[error("{command}: {message}")]
    Command {
        /// The command line that was run.
        command: String,
        /// Diagnostic output from git.
        message: String,
    },

    /// The engine subprocess was interrupted by the operator.
    #[error("interrupted")]
    Cancelled,

    /// The engine subprocess ran past its deadline and was killed.
    #[error("git did not finish within {}s", .0.as_secs())]
    TimedOut(Duration),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}

impl Error {
    pub(crate) fn command(command: &str, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.to_string(),
            message: message.into(),
        }
    }
}
