//! Rewrite driver: runs git's interactive rebase with hew's plan.
//!
//! git is launched with hew's hooks standing in for the operator's editors.
//! When it returns, its marker directory decides the outcome: present means
//! paused, absent means finished or failed.

use std::path::PathBuf;

use hew_git::{CommitRef, EditorKind, EngineOutcome, GitOps, HookEnv, SessionMarker};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::hooks::{HookCommand, HookContext};
use crate::plan::RewritePlan;
use crate::state::{SessionKind, SessionRecord};
use crate::traits::SessionStore;

/// Why git stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PauseReason {
    /// An `edit` step, waiting for the operator to amend.
    Edit,
    /// A step that didn't apply cleanly.
    Conflict { files: Vec<String> },
    /// A `reword` step whose new message was rejected; HEAD keeps the old
    /// one until the next continue asks again.
    Message,
    /// Anything else git stopped for.
    Stopped,
}

/// A paused rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub record: SessionRecord,
    pub marker: SessionMarker,
    pub reason: PauseReason,
    /// The stop can be continued without operator input: a clean edit stop
    /// with nothing staged.
    pub can_auto_continue: bool,
}

/// How a rewrite ended for this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Paused(Session),
}

/// A rewrite ready to run.
#[derive(Debug, Clone)]
pub struct RewriteRequest {
    pub kind: SessionKind,
    /// Commit to replay onto.
    pub target: CommitRef,
    pub plan: RewritePlan,
    /// Show the plan in the operator's sequence editor first.
    pub edit_plan: bool,
    /// Branch being rewritten, for the session record.
    pub branch: Option<String>,
}

/// Runs rewrites and interprets what git leaves behind.
pub struct Driver<'a, G: GitOps, S: SessionStore> {
    git: &'a G,
    store: &'a S,
    hooks: HookCommand,
    config: Config,
}

impl<'a, G: GitOps, S: SessionStore> Driver<'a, G, S> {
    /// Create a driver, loading hew's config from `store`.
    ///
    /// # Errors
    /// Returns error if the config file exists but can't be parsed.
    pub fn new(git: &'a G, store: &'a S, hooks: HookCommand) -> Result<Self> {
        let config = store.load_config()?;
        Ok(Self {
            git,
            store,
            hooks,
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Run a rewrite from the start.
    ///
    /// # Errors
    /// - `SessionInProgress` if git already has a rebase paused
    /// - `DirtyWorkingCopy` if tracked files have changes
    /// - `EngineFailure` if git fails without pausing
    pub fn execute(&self, request: &RewriteRequest) -> Result<Outcome> {
        self.ensure_idle(request.kind)?;

        if !self.git.is_clean()? {
            return Err(Error::DirtyWorkingCopy);
        }
        if request.plan.is_empty() {
            return Err(Error::EmptyRange);
        }

        let plan_file = self.store.save_plan(&request.plan.serialize())?;
        let hooks = self.hook_env(Some(plan_file), request.edit_plan)?;
        let record = SessionRecord::new(
            request.kind,
            request.target.id.to_string(),
            request.branch.clone(),
        );

        tracing::info!(
            kind = %request.kind,
            target = %request.target,
            steps = request.plan.len(),
            "starting rewrite"
        );
        let outcome = self.git.rebase_interactive(request.target.id, &hooks);
        let cleared = self.store.clear_plan();
        let outcome = self.engine_result(outcome, &record)?;
        cleared?;

        self.settle(record, outcome, &hooks, "git rebase")
    }

    /// Refuse to start while git holds a paused rebase.
    ///
    /// A hew record with no marker behind it is discarded.
    ///
    /// # Errors
    /// Returns `SessionInProgress`, naming the command that owns the session
    /// (`kind` when hew has no record of it).
    pub fn ensure_idle(&self, kind: SessionKind) -> Result<()> {
        if self.git.session_marker()?.is_some() {
            let kind = self
                .store
                .load_session()?
                .map_or(kind, |record| record.kind);
            return Err(Error::SessionInProgress(kind));
        }
        // Left over from a rewrite finished with plain git.
        self.store.clear_session()
    }

    /// Environment for git so it calls back into hew.
    ///
    /// The sequence editor hook is only installed when there is a plan to
    /// supply.
    pub(crate) fn hook_env(&self, plan_file: Option<PathBuf>, edit_plan: bool) -> Result<HookEnv> {
        let message_editor = match self.git.operator_editor(EditorKind::Message) {
            Ok(editor) => Some(editor),
            Err(e) => {
                tracing::warn!("no commit message editor available: {e}");
                None
            }
        };
        let plan_editor = if edit_plan {
            Some(self.git.operator_editor(EditorKind::Sequence)?)
        } else {
            None
        };

        let mut env = HookEnv::new()
            .editor(self.hooks.message())
            .timeout(self.config.timeout());
        if plan_file.is_some() {
            env = env.sequence_editor(self.hooks.plan());
        }

        let ctx = HookContext {
            plan_file,
            plan_editor,
            message_editor,
            comment_char: self.git.comment_char()?,
        };
        Ok(ctx.export(env))
    }

    /// Turn an engine error into ours, keeping the session record when git
    /// was stopped partway.
    pub(crate) fn engine_result(
        &self,
        outcome: hew_git::Result<EngineOutcome>,
        record: &SessionRecord,
    ) -> Result<EngineOutcome> {
        match outcome {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                if self.git.session_marker()?.is_some() {
                    self.store.save_session(record)?;
                }
                Err(e.into())
            }
        }
    }

    /// Follow git until it completes, fails, or stops for the operator.
    ///
    /// Clean edit stops in a plain rebase are continued automatically.
    pub(crate) fn settle(
        &self,
        record: SessionRecord,
        mut outcome: EngineOutcome,
        hooks: &HookEnv,
        context: &str,
    ) -> Result<Outcome> {
        loop {
            match outcome {
                EngineOutcome::Completed => {
                    tracing::info!(kind = %record.kind, "rewrite completed");
                    self.store.clear_session()?;
                    return Ok(Outcome::Completed);
                }
                EngineOutcome::Failed { code, stderr } => {
                    self.store.clear_session()?;
                    return Err(Error::EngineFailure {
                        context: context.to_string(),
                        code,
                        stderr,
                    });
                }
                EngineOutcome::Paused => {
                    self.store.save_session(&record)?;
                    let session = self.inspect(record.clone())?;
                    tracing::info!(reason = ?session.reason, "rewrite paused");

                    if record.kind == SessionKind::Rebase
                        && self.config.rewrite.auto_continue_edits
                        && session.can_auto_continue
                    {
                        tracing::debug!("continuing through clean edit stop");
                        let next = self.git.rebase_continue(hooks);
                        outcome = self.engine_result(next, &record)?;
                        continue;
                    }
                    return Ok(Outcome::Paused(session));
                }
            }
        }
    }

    /// Describe the paused session git is holding.
    ///
    /// # Errors
    /// Returns `NoSessionInProgress` if git has no marker.
    pub fn inspect(&self, record: SessionRecord) -> Result<Session> {
        let marker = self
            .git
            .session_marker()?
            .ok_or(Error::NoSessionInProgress)?;
        let conflicts = self.git.conflicting_files()?;

        let reason = if !conflicts.is_empty() {
            PauseReason::Conflict { files: conflicts }
        } else if marker.awaiting_message() {
            PauseReason::Message
        } else if marker.awaiting_amend() {
            PauseReason::Edit
        } else {
            PauseReason::Stopped
        };
        let can_auto_continue = reason == PauseReason::Edit
            && self.git.is_clean()?
            && !self.git.has_staged_changes()?;

        Ok(Session {
            record,
            marker,
            reason,
            can_auto_continue,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{MESSAGE_EDITOR_VAR, PLAN_EDITOR_VAR, PLAN_FILE_VAR};
    use crate::plan::{RewriteAction, RewriteStep};
    use crate::test_mocks::{MockGit, MockStore, oid};

    fn request(kind: SessionKind, action: RewriteAction) -> RewriteRequest {
        RewriteRequest {
            kind,
            target: CommitRef::new(oid(2), Some("refs/heads/main".into())),
            plan: RewritePlan::new(vec![RewriteStep {
                action,
                commit: oid(3),
                subject: "change".into(),
            }])
            .unwrap(),
            edit_plan: false,
            branch: Some("topic".into()),
        }
    }

    fn edit_stop() -> SessionMarker {
        SessionMarker {
            amend: Some(oid(3)),
            ..SessionMarker::default()
        }
    }

    fn var<'e>(env: &'e HookEnv, key: &str) -> Option<&'e str> {
        env.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_completed_rewrite() {
        let git = MockGit::new().with_outcome(EngineOutcome::Completed, None);
        let store = MockStore::new();
        let driver = Driver::new(&git, &store, HookCommand::new("/bin/hew")).unwrap();

        let outcome = driver
            .execute(&request(SessionKind::Rebase, RewriteAction::Pick))
            .unwrap();
        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(git.calls(), vec![format!("rebase_interactive {}", oid(2))]);
        assert!(store.session.borrow().is_none());
        assert!(store.plan.borrow().is_none());

        let hooks = git.last_hooks().unwrap();
        assert_eq!(hooks.sequence_editor.as_deref(), Some("'/bin/hew' hook plan"));
        assert_eq!(hooks.editor.as_deref(), Some("'/bin/hew' hook message"));
        assert!(var(&hooks, PLAN_FILE_VAR).is_some());
        assert_eq!(var(&hooks, MESSAGE_EDITOR_VAR), Some("vi"));
        assert_eq!(var(&hooks, PLAN_EDITOR_VAR), None);
    }

    #[test]
    fn test_plan_written_for_hook() {
        let git = MockGit::new().with_outcome(EngineOutcome::Completed, None);
        let store = MockStore::new();
        let driver = Driver::new(&git, &store, HookCommand::new("hew")).unwrap();

        driver
            .execute(&request(SessionKind::Histedit, RewriteAction::Reword))
            .unwrap();
        assert_eq!(
            store.last_plan.borrow().as_deref(),
            Some(format!("reword {} change\n", oid(3)).as_str())
        );
    }

    #[test]
    fn test_edit_plan_passes_sequence_editor() {
        let git = MockGit::new().with_outcome(EngineOutcome::Completed, None);
        let store = MockStore::new();
        let driver = Driver::new(&git, &store, HookCommand::new("hew")).unwrap();
        let mut req = request(SessionKind::Histedit, RewriteAction::Pick);
        req.edit_plan = true;

        driver.execute(&req).unwrap();
        let hooks = git.last_hooks().unwrap();
        assert_eq!(var(&hooks, PLAN_EDITOR_VAR), Some("vi -c 'set ft=gitrebase'"));
    }

    #[test]
    fn test_histedit_edit_stop_stays_paused() {
        let git = MockGit::new().with_outcome(EngineOutcome::Paused, Some(edit_stop()));
        let store = MockStore::new();
        let driver = Driver::new(&git, &store, HookCommand::new("hew")).unwrap();

        let outcome = driver
            .execute(&request(SessionKind::Histedit, RewriteAction::Edit))
            .unwrap();
        let Outcome::Paused(session) = outcome else {
            panic!("expected pause");
        };
        assert_eq!(session.reason, PauseReason::Edit);
        assert!(session.can_auto_continue);
        assert_eq!(session.record.kind, SessionKind::Histedit);
        assert_eq!(
            store.session.borrow().as_ref().map(|r| r.kind),
            Some(SessionKind::Histedit)
        );
        assert_eq!(git.calls().len(), 1);
    }

    #[test]
    fn test_rebase_continues_through_clean_edit_stop() {
        let git = MockGit::new()
            .with_outcome(EngineOutcome::Paused, Some(edit_stop()))
            .with_outcome(EngineOutcome::Completed, None);
        let store = MockStore::new();
        let driver = Driver::new(&git, &store, HookCommand::new("hew")).unwrap();

        let outcome = driver
            .execute(&request(SessionKind::Rebase, RewriteAction::Edit))
            .unwrap();
        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(git.calls()[1], "rebase_continue");
        assert!(store.session.borrow().is_none());
    }

    #[test]
    fn test_auto_continue_can_be_disabled() {
        let git = MockGit::new().with_outcome(EngineOutcome::Paused, Some(edit_stop()));
        let mut config = Config::default();
        config.rewrite.auto_continue_edits = false;
        let store = MockStore::new().with_config(config);
        let driver = Driver::new(&git, &store, HookCommand::new("hew")).unwrap();

        let outcome = driver
            .execute(&request(SessionKind::Rebase, RewriteAction::Edit))
            .unwrap();
        assert!(matches!(outcome, Outcome::Paused(_)));
        assert_eq!(git.calls().len(), 1);
    }

    #[test]
    fn test_rejected_reword_is_not_an_edit_stop() {
        let marker = SessionMarker {
            amend: Some(oid(3)),
            done: vec![format!("reword {} change", oid(3))],
            ..SessionMarker::default()
        };
        let git = MockGit::new().with_outcome(EngineOutcome::Paused, Some(marker));
        let store = MockStore::new();
        let driver = Driver::new(&git, &store, HookCommand::new("hew")).unwrap();

        let outcome = driver
            .execute(&request(SessionKind::Rebase, RewriteAction::Reword))
            .unwrap();
        let Outcome::Paused(session) = outcome else {
            panic!("expected pause");
        };
        assert_eq!(session.reason, PauseReason::Message);
        assert!(!session.can_auto_continue);
        assert_eq!(git.calls().len(), 1);
    }

    #[test]
    fn test_conflict_never_auto_continues() {
        let git = MockGit::new()
            .with_outcome(EngineOutcome::Paused, Some(SessionMarker::default()))
            .with_conflicts(&["foo.txt"]);
        let store = MockStore::new();
        let driver = Driver::new(&git, &store, HookCommand::new("hew")).unwrap();

        let outcome = driver
            .execute(&request(SessionKind::Rebase, RewriteAction::Pick))
            .unwrap();
        let Outcome::Paused(session) = outcome else {
            panic!("expected pause");
        };
        assert_eq!(
            session.reason,
            PauseReason::Conflict {
                files: vec!["foo.txt".into()]
            }
        );
        assert!(!session.can_auto_continue);
        assert_eq!(git.calls().len(), 1);
    }

    #[test]
    fn test_engine_failure() {
        let git = MockGit::new().with_outcome(
            EngineOutcome::Failed {
                code: Some(128),
                stderr: "fatal: bad\n".into(),
            },
            None,
        );
        let store = MockStore::new();
        let driver = Driver::new(&git, &store, HookCommand::new("hew")).unwrap();

        let err = driver
            .execute(&request(SessionKind::Rebase, RewriteAction::Pick))
            .unwrap_err();
        assert!(matches!(err, Error::EngineFailure { code: Some(128), .. }));
        assert_eq!(err.exit_code(), 2);
        assert!(store.plan.borrow().is_none());
    }

    #[test]
    fn test_refuses_dirty_working_copy() {
        let git = MockGit::new().with_clean(false);
        let store = MockStore::new();
        let driver = Driver::new(&git, &store, HookCommand::new("hew")).unwrap();

        assert!(matches!(
            driver.execute(&request(SessionKind::Rebase, RewriteAction::Pick)),
            Err(Error::DirtyWorkingCopy)
        ));
        assert!(git.calls().is_empty());
    }

    #[test]
    fn test_refuses_while_session_paused() {
        let git = MockGit::new().with_marker(edit_stop());
        let store = MockStore::new().with_session(SessionRecord::new(
            SessionKind::Histedit,
            oid(1).to_string(),
            None,
        ));
        let driver = Driver::new(&git, &store, HookCommand::new("hew")).unwrap();

        assert!(matches!(
            driver.execute(&request(SessionKind::Rebase, RewriteAction::Pick)),
            Err(Error::SessionInProgress(SessionKind::Histedit))
        ));
    }

    #[test]
    fn test_stale_record_discarded() {
        let git = MockGit::new().with_outcome(EngineOutcome::Completed, None);
        let store = MockStore::new().with_session(SessionRecord::new(
            SessionKind::Histedit,
            oid(1).to_string(),
            None,
        ));
        let driver = Driver::new(&git, &store, HookCommand::new("hew")).unwrap();

        driver
            .execute(&request(SessionKind::Rebase, RewriteAction::Pick))
            .unwrap();
        assert!(store.session.borrow().is_none());
    }

    #[test]
    fn test_cancel_keeps_record_for_paused_engine() {
        let git = MockGit::new().with_error(hew_git::Error::Cancelled, Some(edit_stop()));
        let store = MockStore::new();
        let driver = Driver::new(&git, &store, HookCommand::new("hew")).unwrap();

        assert!(matches!(
            driver.execute(&request(SessionKind::Histedit, RewriteAction::Edit)),
            Err(Error::Cancelled)
        ));
        assert!(store.session.borrow().is_some());
        assert!(store.plan.borrow().is_none());
    }
}
