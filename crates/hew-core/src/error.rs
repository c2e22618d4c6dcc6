//! Error types for hew-core.

use std::time::Duration;

use crate::state::SessionKind;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning or driving a rewrite.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad flag combination or argument.
    #[error("{0}")]
    Usage(String),

    /// A revision the operator named does not resolve.
    #[error("unknown revision: {0}")]
    NotFound(String),

    /// No upstream is configured and no base or destination was given.
    #[error("{0} has no upstream; pass --base or --dst")]
    NoUpstream(String),

    /// The planned range holds no commits.
    #[error("nothing to rewrite: no commits between base and tip")]
    EmptyRange,

    /// A rewrite plan contains an action that cannot be applied.
    #[error("invalid plan: {0}")]
    InvalidAction(String),

    /// The edited commit message is empty.
    #[error("aborting due to empty commit message")]
    EmptyMessage,

    /// The operator's editor exited unsuccessfully.
    #[error("editor '{0}' failed")]
    EditorFailed(String),

    /// git exited abnormally for a reason hew doesn't recognize.
    #[error("{context} failed{}", code.map(|c| format!(" (exit code {c})")).unwrap_or_default())]
    EngineFailure {
        /// What hew asked git to do.
        context: String,
        /// git's exit code, absent when killed by a signal.
        code: Option<i32>,
        /// git's diagnostic output, already shown to the operator.
        stderr: String,
    },

    /// `--continue` or `--abort` with no paused rewrite.
    #[error("no rewrite in progress")]
    NoSessionInProgress,

    /// A new rewrite was requested while one is paused.
    #[error("a {0} is already in progress - run `hew {0} --continue` or `hew {0} --abort`")]
    SessionInProgress(SessionKind),

    /// The paused rewrite was started by the other command.
    #[error("the rewrite in progress was started by `hew {found}`; use `hew {found} --continue` or `hew {found} --abort`")]
    SessionKindMismatch {
        /// Command the operator ran.
        requested: SessionKind,
        /// Command that started the session.
        found: SessionKind,
    },

    /// Tracked files have uncommitted changes.
    #[error("working copy has uncommitted changes; commit or stash them first")]
    DirtyWorkingCopy,

    /// Files still contain conflict markers.
    #[error("unresolved conflicts in: {}", .0.join(", "))]
    UnresolvedConflicts(Vec<String>),

    /// Amending the current commit failed.
    #[error("amend failed: {0}")]
    AmendFailed(String),

    /// The operator interrupted git.
    #[error("interrupted; the rewrite was left as git stopped it")]
    Cancelled,

    /// git ran past the configured timeout.
    #[error("git did not finish within {}s; the rewrite was left as git stopped it", .0.as_secs())]
    TimedOut(Duration),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Git operation error.
    #[error("git error: {0}")]
    Git(hew_git::Error),
}

impl From<hew_git::Error> for Error {
    fn from(err: hew_git::Error) -> Self {
        match err {
            hew_git::Error::RefNotFound(name) | hew_git::Error::InvalidRevision(name) => {
                Self::NotFound(name)
            }
            hew_git::Error::Cancelled => Self::Cancelled,
            hew_git::Error::TimedOut(limit) => Self::TimedOut(limit),
            other => Self::Git(other),
        }
    }
}

impl Error {
    /// Process exit code for this error.
    ///
    /// Operator-correctable problems exit 1; engine failures exit 2.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::EngineFailure { .. }
            | Self::AmendFailed(_)
            | Self::TimedOut(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Toml(_) => 2,
            Self::Git(err) => match err {
                hew_git::Error::NotARepository
                | hew_git::Error::BareRepository
                | hew_git::Error::NoMergeBase(..) => 1,
                _ => 2,
            },
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::EmptyRange.exit_code(), 1);
        assert_eq!(Error::NoSessionInProgress.exit_code(), 1);
        assert_eq!(Error::Usage("bad".into()).exit_code(), 1);
        assert_eq!(
            Error::EngineFailure {
                context: "git rebase".into(),
                code: Some(128),
                stderr: String::new(),
            }
            .exit_code(),
            2
        );
        assert_eq!(Error::from(hew_git::Error::NotARepository).exit_code(), 1);
    }

    #[test]
    fn test_unresolvable_revision_becomes_not_found() {
        let err = Error::from(hew_git::Error::RefNotFound("nope".into()));
        assert!(matches!(err, Error::NotFound(ref name) if name == "nope"));
        assert_eq!(err.to_string(), "unknown revision: nope");
    }

    #[test]
    fn test_engine_failure_message() {
        let err = Error::EngineFailure {
            context: "git rebase".into(),
            code: Some(1),
            stderr: "fatal".into(),
        };
        assert_eq!(err.to_string(), "git rebase failed (exit code 1)");
    }
}
