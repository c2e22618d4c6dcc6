//! `hew histedit` command - edit the branch's own history in place.

use anyhow::Result;
use hew_core::{Driver, HisteditOptions, RewriteService, SessionKind};

use super::HisteditArgs;
use super::utils;
use crate::output;

/// Run the histedit command.
pub fn run(args: &HisteditArgs) -> Result<()> {
    if args.continue_ {
        return utils::resume(SessionKind::Histedit, "History edit complete");
    }
    if args.abort {
        return utils::abort(SessionKind::Histedit);
    }

    let (repo, state) = utils::open_repo_and_state()?;
    let driver = Driver::new(&repo, &state, utils::hook_command()?)?;
    driver.ensure_idle(SessionKind::Histedit)?;

    let options = HisteditOptions {
        upstream: args.upstream.clone(),
        edit: args.edit.clone(),
        reword: args.reword.clone(),
        drop: args.drop.clone(),
        interactive: args.interactive,
    };
    let prepared = RewriteService::new(&repo)
        .prepare_histedit(&options, driver.config().histedit.default_action)?;
    utils::report_warnings(prepared.warnings());

    output::info(&format!(
        "Editing {} commit(s) since {}",
        prepared.request.plan.len(),
        output::short_hash(&prepared.request.target.id.to_string())
    ));
    for step in prepared.request.plan.steps() {
        output::detail(&format!(
            "  {:<6} {} {}",
            step.action,
            output::short_hash(&step.commit.to_string()),
            step.subject
        ));
    }

    let outcome = driver.execute(&prepared.request)?;
    utils::report_outcome(&repo, outcome, "History edit complete")
}
