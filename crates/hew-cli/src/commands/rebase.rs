//! `hew rebase` command - replay the branch's own commits onto its upstream.

use anyhow::Result;
use hew_core::{Driver, PlanRequest, RewriteService, SessionKind};

use super::RebaseArgs;
use super::utils;
use crate::output;

/// Run the rebase command.
pub fn run(args: &RebaseArgs) -> Result<()> {
    if args.continue_ {
        return utils::resume(SessionKind::Rebase, "Rebase complete");
    }
    if args.abort {
        return utils::abort(SessionKind::Rebase);
    }

    let (repo, state) = utils::open_repo_and_state()?;
    let driver = Driver::new(&repo, &state, utils::hook_command()?)?;
    driver.ensure_idle(SessionKind::Rebase)?;

    let request = PlanRequest {
        src: args.src.clone(),
        base: args.base.clone(),
        dst: args.dst.clone(),
        in_place: false,
    };
    let prepared = RewriteService::new(&repo).prepare_rebase(&request)?;
    utils::report_warnings(prepared.warnings());

    let count = prepared.request.plan.len();
    let target = prepared.request.target.clone();
    output::info(&format!(
        "Rebasing {count} commit(s) onto {target} ({})",
        output::short_hash(&target.id.to_string())
    ));

    let outcome = driver.execute(&prepared.request)?;
    utils::report_outcome(
        &repo,
        outcome,
        &format!("Rebased {count} commit(s) onto {target}"),
    )
}
