//! `hew hook` - run by git, never by hand.
//!
//! git invokes these as its sequence and message editors while hew drives a
//! rewrite. A non-zero exit makes git stop at the current step.

use std::path::Path;

use anyhow::Result;
use hew_core::{CommandEditor, Editor, HookContext, hooks};
use hew_git::Repository;

/// Sequence editor: replace git's todo list with hew's plan.
pub fn run_plan(file: &Path) -> Result<()> {
    let ctx = HookContext::from_env();
    let repo = Repository::open_current().map_err(hew_core::Error::from)?;
    let editor = ctx
        .plan_editor
        .as_ref()
        .map(|cmd| CommandEditor::new(cmd.as_str()).suffix(".hew-plan"));

    let resolve = |hash: &str| {
        repo.resolve(hash)
            .map(|commit| commit.id)
            .map_err(hew_core::Error::from)
    };
    let plan = hooks::supply_plan(
        file,
        &ctx,
        editor.as_ref().map(|e| e as &dyn Editor),
        resolve,
    )?;

    tracing::debug!(steps = plan.len(), "plan handed to git");
    Ok(())
}

/// Commit message editor.
pub fn run_message(file: &Path) -> Result<()> {
    let ctx = HookContext::from_env();
    let editor = ctx.message_editor.as_ref().map(|cmd| CommandEditor::new(cmd.as_str()));

    hooks::edit_message(file, &ctx, editor.as_ref().map(|e| e as &dyn Editor))?;
    Ok(())
}
