//! Repository wrapper providing high-level git operations.

use std::path::Path;

use git2::{Status, StatusOptions};

use crate::error::{Error, Result};

/// High-level wrapper around a git repository.
pub struct Repository {
    inner: git2::Repository,
}

impl Repository {
    /// Open a repository at the given path.
    ///
    /// # Errors
    /// Returns error if no repository found at path or any parent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let inner = git2::Repository::discover(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::NotARepository
            } else {
                Error::Git2(e)
            }
        })?;
        Ok(Self { inner })
    }

    /// Open the repository containing the current directory.
    ///
    /// # Errors
    /// Returns error if not inside a git repository.
    pub fn open_current() -> Result<Self> {
        Self::open(".")
    }

    /// Get the path to the repository root (workdir).
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.inner.workdir()
    }

    /// Get the path to the .git directory.
    ///
    /// For linked worktrees this is the per-worktree directory, which is
    /// where git keeps its rebase state.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        self.inner.path()
    }

    // === Working directory state ===

    /// Check whether tracked files match HEAD.
    ///
    /// Untracked files are ignored: git replays over them happily.
    ///
    /// # Errors
    /// Returns error if status check fails.
    pub fn is_clean(&self) -> Result<bool> {
        self.reload_index()?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);
        let statuses = self.inner.statuses(Some(&mut opts))?;
        Ok(statuses.is_empty())
    }

    /// Check if the index differs from HEAD.
    ///
    /// # Errors
    /// Returns error if status check fails.
    pub fn has_staged_changes(&self) -> Result<bool> {
        self.reload_index()?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);
        let statuses = self.inner.statuses(Some(&mut opts))?;

        let staged = Status::INDEX_NEW
            | Status::INDEX_MODIFIED
            | Status::INDEX_DELETED
            | Status::INDEX_RENAMED
            | Status::INDEX_TYPECHANGE;
        Ok(statuses.iter().any(|s| s.status().intersects(staged)))
    }

    /// List files with unresolved merge conflicts.
    ///
    /// # Errors
    /// Returns error if the index cannot be read.
    pub fn conflicting_files(&self) -> Result<Vec<String>> {
        let index = self.reload_index()?;
        if !index.has_conflicts() {
            return Ok(vec![]);
        }

        let mut files = Vec::new();
        for conflict in index.conflicts()? {
            let conflict = conflict?;
            if let Some(entry) = conflict.our.or(conflict.their).or(conflict.ancestor) {
                files.push(String::from_utf8_lossy(&entry.path).into_owned());
            }
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Re-read the index from disk.
    ///
    /// git subprocesses rewrite the index behind libgit2's back.
    fn reload_index(&self) -> Result<git2::Index> {
        let mut index = self.inner.index()?;
        index.read(true)?;
        Ok(index)
    }

    // === Config ===

    /// Read a string value from the repository's layered git config.
    ///
    /// # Errors
    /// Returns error if the config cannot be opened.
    pub fn config_string(&self, key: &str) -> Result<Option<String>> {
        let config = self.inner.config()?;
        match config.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The prefix git uses for comment lines in messages and todo lists.
    ///
    /// # Errors
    /// Returns error if the config cannot be opened.
    pub fn comment_char(&self) -> Result<String> {
        Ok(match self.config_string("core.commentChar")? {
            Some(c) if !c.is_empty() && c != "auto" => c,
            _ => "#".to_string(),
        })
    }

    // === Low-level access ===

    /// Get a reference to the underlying git2 repository.
    ///
    /// Use sparingly - prefer high-level methods.
    #[must_use]
    pub const fn inner(&self) -> &git2::Repository {
        &self.inner
    }

    /// Directory git subprocesses should run in.
    pub(crate) fn command_dir(&self) -> Result<&Path> {
        self.workdir().ok_or(Error::BareRepository)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.git_dir())
            .finish()
    }
}
