//! Revision resolution and upstream discovery.

use hew_git::{CommitRef, GitOps, Oid};

use crate::error::{Error, Result};

/// Resolves operator-supplied revisions and a branch's upstream.
pub struct Resolver<'a, G: GitOps> {
    git: &'a G,
}

impl<'a, G: GitOps> Resolver<'a, G> {
    #[must_use]
    pub const fn new(git: &'a G) -> Self {
        Self { git }
    }

    /// Resolve a name or hash to a commit.
    ///
    /// # Errors
    /// Returns `NotFound` if git cannot verify the revision.
    pub fn resolve(&self, spec: &str) -> Result<CommitRef> {
        self.git.resolve(spec).map_err(Error::from)
    }

    /// Check if `ancestor` is reachable from `descendant`.
    ///
    /// # Errors
    /// Returns error if either commit is missing.
    pub fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        Ok(self.git.is_ancestor(ancestor, descendant)?)
    }

    /// Find the branch's upstream.
    ///
    /// Tries the configured upstream first, then the branch's push target.
    /// A candidate that doesn't currently resolve (never fetched, deleted) is
    /// skipped; `None` means neither resolved.
    ///
    /// # Errors
    /// Returns error if git config cannot be read.
    pub fn upstream_of(&self, branch: &str) -> Result<Option<CommitRef>> {
        let tracking = self.git.branch_tracking(branch)?;
        let candidates = [tracking.upstream_ref(), tracking.push_ref(branch)];

        for refname in candidates.into_iter().flatten() {
            match self.git.resolve(&refname) {
                Ok(upstream) => {
                    tracing::debug!(branch, upstream = %refname, "found upstream");
                    return Ok(Some(upstream));
                }
                Err(hew_git::Error::RefNotFound(_) | hew_git::Error::InvalidRevision(_)) => {
                    tracing::debug!(branch, candidate = %refname, "upstream candidate missing");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }

    /// Re-read a named reference so decisions use its live value.
    ///
    /// Unnamed references are returned unchanged.
    ///
    /// # Errors
    /// Returns `NotFound` if the reference no longer exists.
    pub fn refresh(&self, reference: &CommitRef) -> Result<CommitRef> {
        match &reference.name {
            Some(name) => self.resolve(name),
            None => Ok(reference.clone()),
        }
    }

    /// Detect an upstream that was moved backward past work already on `tip`.
    ///
    /// Returns the newest former upstream value that `tip` contains but the
    /// live upstream does not.
    ///
    /// # Errors
    /// Returns error if the reflog cannot be read.
    pub fn detect_upstream_reset(&self, upstream: &CommitRef, tip: Oid) -> Result<Option<Oid>> {
        let Some(name) = upstream.name.as_deref() else {
            return Ok(None);
        };

        for former in self.git.reflog(name)? {
            if former == upstream.id {
                continue;
            }
            // Entries may point at commits that have since been pruned.
            let on_tip = self.git.is_ancestor(former, tip).unwrap_or(false);
            let on_upstream = self.git.is_ancestor(former, upstream.id).unwrap_or(true);
            if on_tip && !on_upstream {
                return Ok(Some(former));
            }
        }
        Ok(None)
    }
}
