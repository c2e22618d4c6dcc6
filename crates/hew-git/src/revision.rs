//! Revision parsing and commit graph queries.

use std::fmt;

use git2::Oid;

use crate::Repository;
use crate::error::{Error, Result};

const BRANCH_PREFIX: &str = "refs/heads/";

/// A commit identity plus the symbolic name it was reached through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitRef {
    /// The commit hash.
    pub id: Oid,
    /// Full reference name (`refs/heads/topic`), absent when detached.
    pub name: Option<String>,
}

impl CommitRef {
    /// Create a commit reference.
    #[must_use]
    pub const fn new(id: Oid, name: Option<String>) -> Self {
        Self { id, name }
    }

    /// Create a reference with no symbolic name.
    #[must_use]
    pub const fn detached(id: Oid) -> Self {
        Self { id, name: None }
    }

    /// The local branch name, if this reference names one.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.name.as_deref()?.strip_prefix(BRANCH_PREFIX)
    }

    /// First eight hex digits of the hash.
    #[must_use]
    pub fn short_id(&self) -> String {
        short(self.id)
    }
}

impl fmt::Display for CommitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.branch(), self.name.as_deref()) {
            (Some(branch), _) => f.write_str(branch),
            (None, Some(name)) => f.write_str(name),
            (None, None) => write!(f, "{}", self.id),
        }
    }
}

/// Metadata for a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// The commit hash.
    pub id: Oid,
    /// Parent hashes, first parent first.
    pub parents: Vec<Oid>,
    /// First line of the message.
    pub summary: String,
    /// Full message.
    pub message: String,
}

impl CommitInfo {
    /// The first parent, or `None` for a root commit.
    #[must_use]
    pub fn first_parent(&self) -> Option<Oid> {
        self.parents.first().copied()
    }

    /// Whether this commit has more than one parent.
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// First eight hex digits of a hash.
#[must_use]
pub(crate) fn short(id: Oid) -> String {
    let hex = id.to_string();
    hex[..8.min(hex.len())].to_string()
}

impl Repository {
    /// Resolve a revision to a commit.
    ///
    /// Accepts anything `git rev-parse` does. The symbolic name is recorded
    /// when the text names a reference.
    ///
    /// # Errors
    /// Returns `RefNotFound` if the revision doesn't resolve to a commit.
    pub fn resolve(&self, spec: &str) -> Result<CommitRef> {
        if spec.is_empty() || spec.starts_with('-') {
            return Err(Error::InvalidRevision(spec.to_string()));
        }
        if spec == "HEAD" {
            return self.head();
        }

        let object = self
            .inner()
            .revparse_single(spec)
            .map_err(|_| Error::RefNotFound(spec.to_string()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| Error::RefNotFound(spec.to_string()))?;

        let name = self
            .inner()
            .resolve_reference_from_short_name(spec)
            .ok()
            .and_then(|r| r.name().map(String::from));

        Ok(CommitRef::new(commit.id(), name))
    }

    /// Resolve HEAD, naming the checked-out branch if there is one.
    ///
    /// # Errors
    /// Returns `RefNotFound` on an unborn branch.
    pub fn head(&self) -> Result<CommitRef> {
        let head = self
            .inner()
            .head()
            .map_err(|_| Error::RefNotFound("HEAD".into()))?;
        let commit = head.peel_to_commit()?;
        let name = if head.is_branch() {
            head.name().map(String::from)
        } else {
            None
        };
        Ok(CommitRef::new(commit.id(), name))
    }

    /// Get the name of the current branch.
    ///
    /// # Errors
    /// Returns error if HEAD is detached.
    pub fn current_branch(&self) -> Result<String> {
        self.head()?
            .branch()
            .map(String::from)
            .ok_or(Error::RefNotFound("HEAD".into()))
    }

    /// Look up a commit's parents and message.
    ///
    /// # Errors
    /// Returns error if the commit doesn't exist.
    pub fn commit_info(&self, id: Oid) -> Result<CommitInfo> {
        let commit = self.inner().find_commit(id)?;
        Ok(CommitInfo {
            id,
            parents: commit.parent_ids().collect(),
            summary: commit.summary().unwrap_or_default().to_string(),
            message: commit.message().unwrap_or_default().to_string(),
        })
    }

    /// Check if `ancestor` is reachable from `descendant`.
    ///
    /// A commit counts as its own ancestor.
    ///
    /// # Errors
    /// Returns error if either commit is missing.
    pub fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        Ok(self.inner().graph_descendant_of(descendant, ancestor)?)
    }

    /// Get the merge base between two commits.
    ///
    /// # Errors
    /// Returns `NoMergeBase` if the histories are unrelated.
    pub fn merge_base(&self, one: Oid, two: Oid) -> Result<Oid> {
        self.inner().merge_base(one, two).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::NoMergeBase(one, two)
            } else {
                Error::Git2(e)
            }
        })
    }
}
