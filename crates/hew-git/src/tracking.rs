//! Branch tracking configuration and reflog access.

use git2::Oid;

use crate::Repository;
use crate::error::{Error, Result};

/// Tracking configuration for one local branch.
///
/// Mirrors `branch.<name>.remote`, `branch.<name>.merge` and the push
/// remote (`branch.<name>.pushRemote`, then `remote.pushDefault`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchTracking {
    /// Remote the branch pulls from; `.` means the local repository.
    pub remote: Option<String>,
    /// Full ref name on the remote that the branch merges from.
    pub merge: Option<String>,
    /// Remote the branch pushes to, when configured.
    pub push_remote: Option<String>,
}

impl BranchTracking {
    /// The local ref that mirrors the configured upstream.
    ///
    /// `refs/heads/main` on remote `.` stays as is; on a named remote it
    /// becomes `refs/remotes/<remote>/main`.
    #[must_use]
    pub fn upstream_ref(&self) -> Option<String> {
        let remote = self.remote.as_deref()?;
        let merge = self.merge.as_deref()?;
        if remote == "." {
            return Some(merge.to_string());
        }
        let branch = merge.strip_prefix("refs/heads/").unwrap_or(merge);
        Some(format!("refs/remotes/{remote}/{branch}"))
    }

    /// The remote-tracking ref a push of `branch` would update.
    #[must_use]
    pub fn push_ref(&self, branch: &str) -> Option<String> {
        let remote = self.push_remote.as_deref().or(self.remote.as_deref())?;
        if remote == "." {
            return None;
        }
        Some(format!("refs/remotes/{remote}/{branch}"))
    }
}

impl Repository {
    /// Read the tracking configuration for a local branch.
    ///
    /// # Errors
    /// Returns error if git config cannot be read.
    pub fn branch_tracking(&self, branch: &str) -> Result<BranchTracking> {
        let remote = self.config_string(&format!("branch.{branch}.remote"))?;
        let merge = self.config_string(&format!("branch.{branch}.merge"))?;
        let push_remote = match self.config_string(&format!("branch.{branch}.pushRemote"))? {
            Some(remote) => Some(remote),
            None => self.config_string("remote.pushDefault")?,
        };

        Ok(BranchTracking {
            remote,
            merge,
            push_remote,
        })
    }

    /// Every value a reference has held, newest first.
    ///
    /// Returns an empty list when the reference keeps no reflog.
    ///
    /// # Errors
    /// Returns error if the reflog exists but cannot be read.
    pub fn reflog(&self, refname: &str) -> Result<Vec<Oid>> {
        let reflog = match self.inner().reflog(refname) {
            Ok(reflog) => reflog,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(vec![]),
            Err(e) => return Err(Error::Git2(e)),
        };

        let mut ids = Vec::with_capacity(reflog.len());
        for entry in reflog.iter() {
            let id = entry.id_new();
            if !id.is_zero() && !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::{commit_file, init_test_repo};

    #[test]
    fn test_upstream_ref_local_remote() {
        let tracking = BranchTracking {
            remote: Some(".".into()),
            merge: Some("refs/heads/main".into()),
            push_remote: None,
        };
        assert_eq!(tracking.upstream_ref().as_deref(), Some("refs/heads/main"));
        assert_eq!(tracking.push_ref("topic"), None);
    }

    #[test]
    fn test_upstream_ref_named_remote() {
        let tracking = BranchTracking {
            remote: Some("origin".into()),
            merge: Some("refs/heads/main".into()),
            push_remote: Some("fork".into()),
        };
        assert_eq!(
            tracking.upstream_ref().as_deref(),
            Some("refs/remotes/origin/main")
        );
        assert_eq!(
            tracking.push_ref("topic").as_deref(),
            Some("refs/remotes/fork/topic")
        );
    }

    #[test]
    fn test_untracked_branch_has_no_refs() {
        let tracking = BranchTracking::default();
        assert_eq!(tracking.upstream_ref(), None);
        assert_eq!(tracking.push_ref("topic"), None);
    }

    #[test]
    fn test_branch_tracking_reads_config() {
        let (_temp, repo) = init_test_repo();
        {
            let mut config = repo.inner().config().unwrap();
            config.set_str("branch.topic.remote", ".").unwrap();
            config.set_str("branch.topic.merge", "refs/heads/main").unwrap();
            config.set_str("remote.pushDefault", "fork").unwrap();
        }

        let tracking = repo.branch_tracking("topic").unwrap();
        assert_eq!(tracking.remote.as_deref(), Some("."));
        assert_eq!(tracking.merge.as_deref(), Some("refs/heads/main"));
        assert_eq!(tracking.push_remote.as_deref(), Some("fork"));
        assert_eq!(repo.branch_tracking("other").unwrap().merge, None);
    }

    #[test]
    fn test_reflog_newest_first() {
        let (temp, repo) = init_test_repo();
        let branch = format!("refs/heads/{}", repo.current_branch().unwrap());
        let c1 = commit_file(&temp, &repo, "foo.txt", "change 1");
        let c2 = commit_file(&temp, &repo, "bar.txt", "change 2");

        let log = repo.reflog(&branch).unwrap();
        assert_eq!(&log[..2], &[c2, c1]);
        assert!(repo.reflog("refs/heads/missing").unwrap().is_empty());
    }
}
