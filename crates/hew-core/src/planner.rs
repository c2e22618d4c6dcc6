//! Divergence planning: which commits to replay, and onto what.

use std::fmt;

use hew_git::{CommitInfo, CommitRef, GitOps, Oid};

use crate::error::{Error, Result};
use crate::resolver::Resolver;

/// Revisions the operator passed on the command line.
#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    /// Replay this commit and its first-parent descendants up to the tip.
    pub src: Option<String>,
    /// Replay everything after the merge base of this revision and the tip.
    pub base: Option<String>,
    /// Replay onto this revision instead of the upstream.
    ///
    /// In place, this names where the branch's own history starts instead,
    /// taking precedence over the upstream.
    pub dst: Option<String>,
    /// Replay onto the base itself, rewriting history in place.
    pub in_place: bool,
}

/// Something odd about the plan that the operator should know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanWarning {
    /// A merge commit on the first-parent chain was left out.
    MergeSkipped(Oid),
    /// The base is not contained in the target.
    BaseNotAncestorOfTarget { base: Oid, target: Oid },
    /// The upstream was moved backward past `previous`, which the tip
    /// still contains.
    UpstreamReset { upstream: String, previous: Oid },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MergeSkipped(id) => write!(f, "skipping merge commit {}", short(*id)),
            Self::BaseNotAncestorOfTarget { base, target } => write!(
                f,
                "base {} is not an ancestor of {}; unrelated history will be replayed",
                short(*base),
                short(*target)
            ),
            Self::UpstreamReset { upstream, previous } => write!(
                f,
                "{upstream} was reset and no longer contains {}; using its current position",
                short(*previous)
            ),
        }
    }
}

fn short(id: Oid) -> String {
    CommitRef::detached(id).short_id()
}

/// The commits to replay and where they go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivergencePlan {
    /// Last commit that is not replayed.
    pub base: Oid,
    /// Commits to replay, oldest first.
    pub commits: Vec<CommitInfo>,
    /// Commit the replay starts from.
    pub target: CommitRef,
    /// Newest commit being replayed.
    pub tip: CommitRef,
    pub warnings: Vec<PlanWarning>,
}

/// Computes divergence plans against the repository.
pub struct Planner<'a, G: GitOps> {
    git: &'a G,
    resolver: Resolver<'a, G>,
}

impl<'a, G: GitOps> Planner<'a, G> {
    #[must_use]
    pub const fn new(git: &'a G) -> Self {
        Self {
            git,
            resolver: Resolver::new(git),
        }
    }

    /// Work out what to replay.
    ///
    /// `upstream` is the branch's upstream as found earlier; it is
    /// re-resolved here so a reset since then is honored.
    ///
    /// # Errors
    /// - `NotFound` if a named revision doesn't resolve
    /// - `NoUpstream` if neither a base nor a target can be inferred
    /// - `EmptyRange` if there is nothing between base and tip
    pub fn plan(
        &self,
        request: &PlanRequest,
        upstream: Option<&CommitRef>,
    ) -> Result<DivergencePlan> {
        if request.src.is_some() && request.base.is_some() {
            return Err(Error::Usage("--src and --base are mutually exclusive".into()));
        }

        let head = self.git.head()?;
        let src = self.resolve_opt(request.src.as_deref())?;
        let base_rev = self.resolve_opt(request.base.as_deref())?;
        let dst = self.resolve_opt(request.dst.as_deref())?;
        let upstream = upstream.map(|u| self.resolver.refresh(u)).transpose()?;

        let tip = match &src {
            Some(src) if !self.resolver.is_ancestor(src.id, head.id)? => src.clone(),
            _ => head,
        };

        let base = if let Some(base_rev) = &base_rev {
            self.git.merge_base(base_rev.id, tip.id)?
        } else if let Some(src) = &src {
            self.git
                .commit_info(src.id)?
                .first_parent()
                .ok_or_else(|| Error::Usage(format!("{src} is a root commit")))?
        } else {
            let reference = if request.in_place {
                dst.as_ref().or(upstream.as_ref())
            } else {
                upstream.as_ref().or(dst.as_ref())
            };
            let reference = reference.ok_or_else(|| Error::NoUpstream(tip.to_string()))?;
            self.git.merge_base(tip.id, reference.id)?
        };

        let target = if request.in_place {
            CommitRef::detached(base)
        } else {
            dst.or_else(|| upstream.clone())
                .ok_or_else(|| Error::NoUpstream(tip.to_string()))?
        };

        let mut warnings = Vec::new();
        let commits = self.first_parent_range(base, tip.id, &mut warnings)?;
        if commits.is_empty() {
            return Err(Error::EmptyRange);
        }

        if !self.resolver.is_ancestor(base, target.id)? {
            warnings.push(PlanWarning::BaseNotAncestorOfTarget {
                base,
                target: target.id,
            });
        }
        if let Some(upstream) = &upstream {
            if let Some(previous) = self.resolver.detect_upstream_reset(upstream, tip.id)? {
                warnings.push(PlanWarning::UpstreamReset {
                    upstream: upstream.to_string(),
                    previous,
                });
            }
        }

        tracing::debug!(
            base = %base,
            target = %target.id,
            tip = %tip.id,
            count = commits.len(),
            "planned rewrite"
        );

        Ok(DivergencePlan {
            base,
            commits,
            target,
            tip,
            warnings,
        })
    }

    fn resolve_opt(&self, spec: Option<&str>) -> Result<Option<CommitRef>> {
        spec.map(|s| self.resolver.resolve(s)).transpose()
    }

    /// First-parent chain in `(base, tip]`, oldest first, merges dropped.
    fn first_parent_range(
        &self,
        base: Oid,
        tip: Oid,
        warnings: &mut Vec<PlanWarning>,
    ) -> Result<Vec<CommitInfo>> {
        let mut commits = Vec::new();
        let mut current = Some(tip);

        while let Some(id) = current {
            // Stop once the walk reaches history the base already has, even
            // if the base itself sits off the first-parent chain.
            if self.resolver.is_ancestor(id, base)? {
                break;
            }
            let info = self.git.commit_info(id)?;
            current = info.first_parent();
            if info.is_merge() {
                warnings.push(PlanWarning::MergeSkipped(id));
            } else {
                commits.push(info);
            }
        }

        commits.reverse();
        warnings.reverse();
        Ok(commits)
    }
}
