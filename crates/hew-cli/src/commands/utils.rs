use anyhow::{Context, Result, bail};
use hew_core::{
    Config, Continuation, HookCommand, Outcome, PauseReason, PlanWarning, Session, SessionKind,
    State,
};
use hew_git::{GitOps, Repository};

use crate::output;

/// Helper to open repo and state, applying hew's config.
pub fn open_repo_and_state() -> Result<(Repository, State)> {
    let repo = Repository::open_current().map_err(hew_core::Error::from)?;
    if repo.workdir().is_none() {
        return Err(hew_core::Error::from(hew_git::Error::BareRepository).into());
    }
    let state = State::new(repo.git_dir());
    apply_config(&state.load_config()?);
    Ok((repo, state))
}

fn apply_config(config: &Config) {
    if config.general.quiet {
        output::set_quiet(true);
    }
}

/// Point git's callbacks at this executable.
pub fn hook_command() -> Result<HookCommand> {
    HookCommand::current().context("Cannot locate the hew executable")
}

pub fn report_warnings(warnings: &[PlanWarning]) {
    for warning in warnings {
        output::warn(&warning.to_string());
    }
}

/// Tell the operator how a rewrite ended.
///
/// An edit stop is what the operator asked for and succeeds; any other stop
/// needs attention and fails with an already-printed explanation.
pub fn report_outcome<G: GitOps>(git: &G, outcome: Outcome, done: &str) -> Result<()> {
    match outcome {
        Outcome::Completed => {
            output::success(done);
            Ok(())
        }
        Outcome::Paused(session) => report_pause(git, &session),
    }
}

fn report_pause<G: GitOps>(git: &G, session: &Session) -> Result<()> {
    let kind = session.record.kind;
    let step = session
        .marker
        .current_step()
        .map_or_else(|| "current step".to_string(), String::from);

    match &session.reason {
        PauseReason::Edit => {
            let at = git
                .head()
                .map(|head| output::short_hash(&head.id.to_string()))
                .unwrap_or_default();
            output::info(&format!(
                "Stopped for {} at {at}: {step}",
                output::pause_label(&session.reason)
            ));
            report_remaining(session);
            output::detail("  Amend the commit by changing files, then run:");
            output::detail(&format!("    hew {kind} --continue"));
            Ok(())
        }
        PauseReason::Conflict { files } => {
            output::warn(&format!("Conflict while applying: {step}"));
            output::info("Conflicting files:");
            for file in files {
                output::detail(&format!("  → {file}"));
            }
            report_remaining(session);
            output::detail("");
            output::info(&format!("Resolve conflicts, then run: hew {kind} --continue"));
            output::info(&format!("Or abort with: hew {kind} --abort"));
            bail!("")
        }
        PauseReason::Message => {
            output::warn(&format!(
                "{} at: {step}",
                output::pause_label(&session.reason)
            ));
            report_remaining(session);
            output::info(&format!(
                "Run hew {kind} --continue to write the message again"
            ));
            output::info(&format!("Or abort with: hew {kind} --abort"));
            bail!("")
        }
        PauseReason::Stopped => {
            output::warn(&format!(
                "{} at: {step}",
                output::pause_label(&session.reason)
            ));
            report_remaining(session);
            output::info(&format!("Fix the problem, then run: hew {kind} --continue"));
            output::info(&format!("Or abort with: hew {kind} --abort"));
            bail!("")
        }
    }
}

/// Steps git has yet to apply.
fn report_remaining(session: &Session) {
    let remaining = &session.marker.remaining;
    if remaining.is_empty() {
        return;
    }
    output::info(&format!("{} step(s) left:", remaining.len()));
    for line in remaining {
        output::detail(&format!("  {line}"));
    }
}

/// `--continue` for either command.
pub fn resume(kind: SessionKind, done: &str) -> Result<()> {
    let (repo, state) = open_repo_and_state()?;
    let continuation = Continuation::new(&repo, &state, hook_command()?)?;

    output::info(&format!("Continuing {kind}..."));
    let outcome = continuation.resume(kind)?;
    report_outcome(&repo, outcome, done)
}

/// `--abort` for either command.
pub fn abort(kind: SessionKind) -> Result<()> {
    let (repo, state) = open_repo_and_state()?;
    let continuation = Continuation::new(&repo, &state, hook_command()?)?;

    continuation.abort(kind)?;
    output::success(&format!("Aborted {kind} - branch restored"));
    Ok(())
}
