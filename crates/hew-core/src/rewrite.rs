//! Turning `rebase` and `histedit` invocations into rewrite requests.

use std::collections::HashMap;

use hew_git::{CommitRef, GitOps, Oid};

use crate::driver::RewriteRequest;
use crate::error::{Error, Result};
use crate::plan::{RewriteAction, RewritePlan};
use crate::planner::{DivergencePlan, PlanRequest, PlanWarning, Planner};
use crate::resolver::Resolver;
use crate::state::SessionKind;

/// Options for `hew histedit`.
#[derive(Debug, Clone, Default)]
pub struct HisteditOptions {
    /// Where the branch's own history starts; defaults to its upstream.
    pub upstream: Option<String>,
    pub edit: Vec<String>,
    pub reword: Vec<String>,
    pub drop: Vec<String>,
    /// Show the plan in the operator's sequence editor.
    pub interactive: bool,
}

impl HisteditOptions {
    fn has_actions(&self) -> bool {
        !(self.edit.is_empty() && self.reword.is_empty() && self.drop.is_empty())
    }
}

/// A request ready for the driver, plus what planning noticed.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub request: RewriteRequest,
    pub divergence: DivergencePlan,
}

impl Prepared {
    #[must_use]
    pub fn warnings(&self) -> &[PlanWarning] {
        &self.divergence.warnings
    }
}

/// Builds rewrite requests from command-line revisions.
pub struct RewriteService<'a, G: GitOps> {
    git: &'a G,
}

impl<'a, G: GitOps> RewriteService<'a, G> {
    #[must_use]
    pub const fn new(git: &'a G) -> Self {
        Self { git }
    }

    /// Plan a plain rebase: every commit picked, replayed onto the target.
    ///
    /// # Errors
    /// Returns planning errors (`NotFound`, `NoUpstream`, `EmptyRange`, ...).
    pub fn prepare_rebase(&self, request: &PlanRequest) -> Result<Prepared> {
        let (divergence, branch) = self.divergence(request)?;
        let plan = RewritePlan::generate(&divergence, &HashMap::new())?;
        Ok(Prepared {
            request: RewriteRequest {
                kind: SessionKind::Rebase,
                target: divergence.target.clone(),
                plan,
                edit_plan: false,
                branch,
            },
            divergence,
        })
    }

    /// Plan a history edit of the branch's own commits, in place.
    ///
    /// Without explicit actions the oldest commit gets `default_action` and
    /// the plan is offered to the operator to adjust.
    ///
    /// # Errors
    /// - planning errors, as for [`Self::prepare_rebase`]
    /// - `InvalidAction` if a named commit is outside the edited range
    pub fn prepare_histedit(
        &self,
        options: &HisteditOptions,
        default_action: RewriteAction,
    ) -> Result<Prepared> {
        let request = PlanRequest {
            dst: options.upstream.clone(),
            in_place: true,
            ..PlanRequest::default()
        };
        let (divergence, branch) = self.divergence(&request)?;

        let actions = if options.has_actions() {
            self.named_actions(options)?
        } else {
            divergence
                .commits
                .first()
                .map(|oldest| HashMap::from([(oldest.id, default_action)]))
                .unwrap_or_default()
        };
        let plan = RewritePlan::generate(&divergence, &actions)?;

        Ok(Prepared {
            request: RewriteRequest {
                kind: SessionKind::Histedit,
                target: divergence.target.clone(),
                plan,
                edit_plan: options.interactive || !options.has_actions(),
                branch,
            },
            divergence,
        })
    }

    fn divergence(&self, request: &PlanRequest) -> Result<(DivergencePlan, Option<String>)> {
        let head = self.git.head()?;
        let branch = head.branch().map(String::from);
        let upstream = match &branch {
            Some(branch) => Resolver::new(self.git).upstream_of(branch)?,
            None => None,
        };
        if upstream.is_none() {
            tracing::debug!(head = %head, "no upstream configured");
        }

        let divergence = Planner::new(self.git).plan(request, upstream.as_ref())?;
        Ok((divergence, branch))
    }

    fn named_actions(&self, options: &HisteditOptions) -> Result<HashMap<Oid, RewriteAction>> {
        let resolver = Resolver::new(self.git);
        let mut actions = HashMap::new();
        for (revs, action) in [
            (&options.edit, RewriteAction::Edit),
            (&options.reword, RewriteAction::Reword),
            (&options.drop, RewriteAction::Drop),
        ] {
            for rev in revs {
                let CommitRef { id, .. } = resolver.resolve(rev)?;
                if let Some(previous) = actions.insert(id, action) {
                    if previous != action {
                        return Err(Error::Usage(format!(
                            "{rev} is marked both {previous} and {action}"
                        )));
                    }
                }
            }
        }
        Ok(actions)
    }
}
