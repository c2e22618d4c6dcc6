//! Engine operations that have to go through the `git` executable.
//!
//! libgit2's rebase cannot call an editor between steps, so interactive
//! rewrites, continuation and amending shell out and let git run the hooks.

use std::process::Command as StdCommand;

use git2::Oid;
use tokio::process::Command;

use crate::Repository;
use crate::error::{Error, Result};
use crate::process::{EngineOutcome, HookEnv, ProcessExit, run_supervised};
use crate::session::SessionMarker;
use crate::traits::EditorKind;

impl Repository {
    /// Start an interactive rebase of HEAD onto `onto`.
    ///
    /// git computes its own todo list, which the sequence editor hook is
    /// expected to replace.
    ///
    /// # Errors
    /// Returns error if git cannot be started, is interrupted, or times out.
    pub fn rebase_interactive(&self, onto: Oid, hooks: &HookEnv) -> Result<EngineOutcome> {
        let onto = onto.to_string();
        let mut cmd = self.engine_command(hooks)?;
        cmd.args([
            "-c",
            "rebase.missingCommitsCheck=ignore",
            "-c",
            "rebase.abbreviateCommands=false",
            "rebase",
            "--interactive",
            "--no-autosquash",
            "--onto",
            &onto,
            &onto,
        ]);

        tracing::debug!(onto = %onto, "starting interactive rebase");
        let exit = run_supervised(cmd, "git rebase --interactive", hooks.timeout)?;
        Ok(self.classify(exit))
    }

    /// Resume a paused rebase.
    ///
    /// # Errors
    /// Returns error if git cannot be started, is interrupted, or times out.
    pub fn rebase_continue(&self, hooks: &HookEnv) -> Result<EngineOutcome> {
        let mut cmd = self.engine_command(hooks)?;
        cmd.args(["rebase", "--continue"]);

        let exit = run_supervised(cmd, "git rebase --continue", hooks.timeout)?;
        Ok(self.classify(exit))
    }

    /// Abort a paused rebase, restoring the original branch.
    ///
    /// # Errors
    /// Returns error if git refuses to abort.
    pub fn rebase_abort(&self) -> Result<()> {
        self.git_output(&["rebase", "--abort"]).map(|_| ())
    }

    /// Stage modifications and deletions of tracked files.
    ///
    /// # Errors
    /// Returns error if `git add` fails.
    pub fn stage_tracked(&self) -> Result<()> {
        self.git_output(&["add", "-u"]).map(|_| ())
    }

    /// Amend HEAD with the index, letting `hooks.editor` edit the message.
    ///
    /// # Errors
    /// Returns error if the commit fails, including when the editor hook
    /// rejects the message.
    pub fn amend_head(&self, hooks: &HookEnv) -> Result<Oid> {
        let mut cmd = self.engine_command(hooks)?;
        cmd.args(["commit", "--amend"]);

        let exit = run_supervised(cmd, "git commit --amend", hooks.timeout)?;
        if !exit.status.success() {
            return Err(Error::command("git commit --amend", exit.stderr.trim()));
        }
        Ok(self.head()?.id)
    }

    /// Amend HEAD with `message` verbatim.
    ///
    /// With no paths every tracked change is included; otherwise only the
    /// named paths are taken from the working copy.
    ///
    /// # Errors
    /// Returns error if the commit fails.
    pub fn amend(&self, message: &str, paths: &[String]) -> Result<Oid> {
        let mut args = vec!["commit", "--amend", "--cleanup=verbatim", "-m", message];
        if paths.is_empty() {
            args.push("-a");
        } else {
            args.extend(["--only", "--"]);
            args.extend(paths.iter().map(String::as_str));
        }
        self.git_output(&args)?;
        Ok(self.head()?.id)
    }

    /// The editor command the operator has configured.
    ///
    /// Must be called before any hook is installed, since hooks override
    /// the same environment variables.
    ///
    /// # Errors
    /// Returns error if git cannot report an editor.
    pub fn operator_editor(&self, kind: EditorKind) -> Result<String> {
        if kind == EditorKind::Sequence {
            if let Ok(editor) = std::env::var("GIT_SEQUENCE_EDITOR") {
                if !editor.is_empty() {
                    return Ok(editor);
                }
            }
            if let Some(editor) = self.config_string("sequence.editor")? {
                return Ok(editor);
            }
        }
        let editor = self.git_output(&["var", "GIT_EDITOR"])?;
        Ok(editor.trim().to_string())
    }

    /// Read git's rebase marker, if a session is in progress.
    ///
    /// # Errors
    /// Returns error if the marker exists but cannot be read.
    pub fn session_marker(&self) -> Result<Option<SessionMarker>> {
        SessionMarker::read(self.git_dir())
    }

    fn engine_command(&self, hooks: &HookEnv) -> Result<Command> {
        let mut cmd = Command::new("git");
        cmd.current_dir(self.command_dir()?);
        hooks.apply(&mut cmd);
        Ok(cmd)
    }

    fn classify(&self, exit: ProcessExit) -> EngineOutcome {
        if SessionMarker::exists(self.git_dir()) {
            EngineOutcome::Paused
        } else if exit.status.success() {
            EngineOutcome::Completed
        } else {
            EngineOutcome::Failed {
                code: exit.status.code(),
                stderr: exit.stderr,
            }
        }
    }

    /// Run a short, non-interactive git command and return its stdout.
    fn git_output(&self, args: &[&str]) -> Result<String> {
        let label = format!("git {}", args.first().copied().unwrap_or_default());
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(self.command_dir()?)
            .output()
            .map_err(|e| Error::command(&label, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::command(&label, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
