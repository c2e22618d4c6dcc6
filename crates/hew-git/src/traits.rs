//! Trait abstractions for git operations.
//!
//! The orchestrator only talks to the engine through [`GitOps`], so its
//! decision logic can be exercised against an in-memory mock.

use std::path::Path;

use git2::Oid;

use crate::{
    BranchTracking, CommitInfo, CommitRef, DiffStatusEntry, EngineOutcome, HookEnv, Repository,
    Result, SessionMarker,
};

/// Which operator editor to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    /// Commit message editor (`GIT_EDITOR`, `core.editor`, ...).
    Message,
    /// Todo list editor (`GIT_SEQUENCE_EDITOR`, `sequence.editor`, then the
    /// message editor).
    Sequence,
}

/// Trait for git repository operations.
///
/// Note: git operations are synchronous; the engine subprocesses block the
/// caller until git exits.
#[allow(clippy::missing_errors_doc)]
pub trait GitOps {
    // === Repository Info ===

    /// Get the working directory path.
    fn workdir(&self) -> Option<&Path>;

    /// Get the path to the .git directory.
    fn git_dir(&self) -> &Path;

    /// Prefix git uses for comment lines.
    fn comment_char(&self) -> Result<String>;

    /// The editor command the operator has configured.
    fn operator_editor(&self, kind: EditorKind) -> Result<String>;

    // === Revisions ===

    /// Resolve a revision to a commit.
    fn resolve(&self, spec: &str) -> Result<CommitRef>;

    /// Resolve HEAD.
    fn head(&self) -> Result<CommitRef>;

    /// Look up a commit's parents and message.
    fn commit_info(&self, id: Oid) -> Result<CommitInfo>;

    /// Check if `ancestor` is reachable from `descendant`.
    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool>;

    /// Find the merge base of two commits.
    fn merge_base(&self, one: Oid, two: Oid) -> Result<Oid>;

    // === Tracking ===

    /// Read a branch's tracking configuration.
    fn branch_tracking(&self, branch: &str) -> Result<BranchTracking>;

    /// Every value a reference has held, newest first.
    fn reflog(&self, refname: &str) -> Result<Vec<Oid>>;

    // === Working Directory ===

    /// Check whether tracked files match HEAD.
    fn is_clean(&self) -> Result<bool>;

    /// Check if the index differs from HEAD.
    fn has_staged_changes(&self) -> Result<bool>;

    /// List files with unresolved merge conflicts.
    fn conflicting_files(&self) -> Result<Vec<String>>;

    /// Stage modifications of tracked files.
    fn stage_tracked(&self) -> Result<()>;

    /// List paths that differ between `from` and `to` (or the working copy).
    fn diff_status(
        &self,
        from: Oid,
        to: Option<Oid>,
        pathspecs: &[String],
    ) -> Result<Vec<DiffStatusEntry>>;

    // === Rewrites ===

    /// Start an interactive rebase of HEAD onto `onto`.
    fn rebase_interactive(&self, onto: Oid, hooks: &HookEnv) -> Result<EngineOutcome>;

    /// Resume a paused rebase.
    fn rebase_continue(&self, hooks: &HookEnv) -> Result<EngineOutcome>;

    /// Abort a paused rebase.
    fn rebase_abort(&self) -> Result<()>;

    /// Read git's rebase marker.
    fn session_marker(&self) -> Result<Option<SessionMarker>>;

    /// Amend HEAD through the message editor hook.
    fn amend_head(&self, hooks: &HookEnv) -> Result<Oid>;

    /// Amend HEAD with a ready-made message.
    fn amend(&self, message: &str, paths: &[String]) -> Result<Oid>;
}

impl GitOps for Repository {
    fn workdir(&self) -> Option<&Path> {
        Self::workdir(self)
    }

    fn git_dir(&self) -> &Path {
        Self::git_dir(self)
    }

    fn comment_char(&self) -> Result<String> {
        Self::comment_char(self)
    }

    fn operator_editor(&self, kind: EditorKind) -> Result<String> {
        Self::operator_editor(self, kind)
    }

    fn resolve(&self, spec: &str) -> Result<CommitRef> {
        Self::resolve(self, spec)
    }

    fn head(&self) -> Result<CommitRef> {
        Self::head(self)
    }

    fn commit_info(&self, id: Oid) -> Result<CommitInfo> {
        Self::commit_info(self, id)
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        Self::is_ancestor(self, ancestor, descendant)
    }

    fn merge_base(&self, one: Oid, two: Oid) -> Result<Oid> {
        Self::merge_base(self, one, two)
    }

    fn branch_tracking(&self, branch: &str) -> Result<BranchTracking> {
        Self::branch_tracking(self, branch)
    }

    fn reflog(&self, refname: &str) -> Result<Vec<Oid>> {
        Self::reflog(self, refname)
    }

    fn is_clean(&self) -> Result<bool> {
        Self::is_clean(self)
    }

    fn has_staged_changes(&self) -> Result<bool> {
        Self::has_staged_changes(self)
    }

    fn conflicting_files(&self) -> Result<Vec<String>> {
        Self::conflicting_files(self)
    }

    fn stage_tracked(&self) -> Result<()> {
        Self::stage_tracked(self)
    }

    fn diff_status(
        &self,
        from: Oid,
        to: Option<Oid>,
        pathspecs: &[String],
    ) -> Result<Vec<DiffStatusEntry>> {
        Self::diff_status(self, from, to, pathspecs)
    }

    fn rebase_interactive(&self, onto: Oid, hooks: &HookEnv) -> Result<EngineOutcome> {
        Self::rebase_interactive(self, onto, hooks)
    }

    fn rebase_continue(&self, hooks: &HookEnv) -> Result<EngineOutcome> {
        Self::rebase_continue(self, hooks)
    }

    fn rebase_abort(&self) -> Result<()> {
        Self::rebase_abort(self)
    }

    fn session_marker(&self) -> Result<Option<SessionMarker>> {
        Self::session_marker(self)
    }

    fn amend_head(&self, hooks: &HookEnv) -> Result<Oid> {
        Self::amend_head(self, hooks)
    }

    fn amend(&self, message: &str, paths: &[String]) -> Result<Oid> {
        Self::amend(self, message, paths)
    }
}
