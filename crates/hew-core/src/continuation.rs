//! Resuming and aborting paused rewrites.
//!
//! Every invocation re-reads git's marker, so running `--continue` twice is
//! safe: git's own bookkeeping decides which step comes next.

use std::fs;
use std::path::Path;

use hew_git::{GitOps, SessionMarker};

use crate::driver::{Driver, Outcome};
use crate::error::{Error, Result};
use crate::hooks::HookCommand;
use crate::state::{SessionKind, SessionRecord};
use crate::traits::SessionStore;

/// Continues or aborts the rewrite git is holding.
pub struct Continuation<'a, G: GitOps, S: SessionStore> {
    git: &'a G,
    store: &'a S,
    driver: Driver<'a, G, S>,
}

impl<'a, G: GitOps, S: SessionStore> Continuation<'a, G, S> {
    /// # Errors
    /// Returns error if hew's config can't be loaded.
    pub fn new(git: &'a G, store: &'a S, hooks: HookCommand) -> Result<Self> {
        Ok(Self {
            git,
            store,
            driver: Driver::new(git, store, hooks)?,
        })
    }

    /// Apply the operator's fixes and let git carry on.
    ///
    /// Tracked changes are staged. At an edit stop with staged changes the
    /// stopped commit is amended first, through the message hook. A reword
    /// whose message was rejected is amended even with nothing staged, so
    /// the message is asked for once more.
    ///
    /// # Errors
    /// - `NoSessionInProgress` if git has nothing paused
    /// - `SessionKindMismatch` if the other command started the rewrite
    /// - `UnresolvedConflicts` if conflict markers remain
    /// - `AmendFailed` if amending the stopped commit fails
    pub fn resume(&self, kind: SessionKind) -> Result<Outcome> {
        let (marker, record) = self.paused_session(kind)?;

        let unresolved = self.unresolved_conflicts()?;
        if !unresolved.is_empty() {
            return Err(Error::UnresolvedConflicts(unresolved));
        }
        self.git.stage_tracked()?;

        let hooks = self.driver.hook_env(None, false)?;
        if self.should_amend(&marker)? {
            tracing::info!("amending stopped commit");
            self.git.amend_head(&hooks).map_err(|e| match e {
                hew_git::Error::Cancelled | hew_git::Error::TimedOut(_) => Error::from(e),
                other => Error::AmendFailed(other.to_string()),
            })?;
        }

        let outcome = self.git.rebase_continue(&hooks);
        let outcome = self.driver.engine_result(outcome, &record)?;
        self.driver
            .settle(record, outcome, &hooks, "git rebase --continue")
    }

    /// Throw the rewrite away, restoring the branch.
    ///
    /// # Errors
    /// - `NoSessionInProgress` if git has nothing paused
    /// - `SessionKindMismatch` if the other command started the rewrite
    pub fn abort(&self, kind: SessionKind) -> Result<()> {
        self.paused_session(kind)?;
        self.git.rebase_abort()?;
        self.store.clear_session()?;
        tracing::info!(kind = %kind, "rewrite aborted");
        Ok(())
    }

    /// Check there is a session and that `kind` may act on it.
    ///
    /// A session git holds without a hew record (started with plain git, or
    /// the record was lost) is adopted by whichever command asks.
    fn paused_session(&self, kind: SessionKind) -> Result<(SessionMarker, SessionRecord)> {
        let Some(marker) = self.git.session_marker()? else {
            self.store.clear_session()?;
            return Err(Error::NoSessionInProgress);
        };

        match self.store.load_session()? {
            Some(record) if record.kind != kind => Err(Error::SessionKindMismatch {
                requested: kind,
                found: record.kind,
            }),
            Some(record) => Ok((marker, record)),
            None => {
                let record = adopt(kind, &marker);
                Ok((marker, record))
            }
        }
    }

    /// Amend only when git stopped to let the operator amend the commit that
    /// is still HEAD, and there is something to amend with: staged changes,
    /// or a message still owed to a reword.
    fn should_amend(&self, marker: &SessionMarker) -> Result<bool> {
        let Some(stopped) = marker.amend else {
            return Ok(false);
        };
        if self.git.head()?.id != stopped {
            tracing::debug!("HEAD moved since the edit stop, leaving amend to git");
            return Ok(false);
        }
        if marker.awaiting_message() {
            return Ok(true);
        }
        Ok(self.git.has_staged_changes()?)
    }

    /// Unmerged files whose contents still carry conflict markers.
    fn unresolved_conflicts(&self) -> Result<Vec<String>> {
        let files = self.git.conflicting_files()?;
        let Some(workdir) = self.git.workdir() else {
            return Ok(files);
        };
        Ok(files
            .into_iter()
            .filter(|file| has_conflict_markers(&workdir.join(file)))
            .collect())
    }
}

fn adopt(kind: SessionKind, marker: &SessionMarker) -> SessionRecord {
    SessionRecord::new(
        kind,
        marker.onto.map(|id| id.to_string()).unwrap_or_default(),
        marker.branch().map(String::from),
    )
}

fn has_conflict_markers(path: &Path) -> bool {
    let Ok(content) = fs::read(path) else {
        return false;
    };
    let content = String::from_utf8_lossy(&content);
    let mut opened = false;
    for line in content.lines() {
        if line.starts_with("<<<<<<< ") || line == "<<<<<<<" {
            opened = true;
        } else if opened && (line.starts_with(">>>>>>> ") || line == ">>>>>>>") {
            return true;
        }
    }
    false
}
