//! Rewrite plans and their todo-list form.
//!
//! A plan is the ordered list of steps git's sequencer will run. hew writes
//! it in git's own todo syntax, one `<keyword> <hash> <subject>` per line.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use hew_git::Oid;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::planner::DivergencePlan;

/// What to do with one commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteAction {
    /// Replay unchanged.
    Pick,
    /// Replay, then edit the message.
    Reword,
    /// Replay, then stop so the commit can be amended.
    Edit,
    /// Fold into the previous commit, combining messages.
    Squash,
    /// Fold into the previous commit, keeping its message.
    Fixup,
    /// Leave out.
    Drop,
}

impl RewriteAction {
    /// The keyword git's sequencer understands.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Pick => "pick",
            Self::Reword => "reword",
            Self::Edit => "edit",
            Self::Squash => "squash",
            Self::Fixup => "fixup",
            Self::Drop => "drop",
        }
    }

    /// Whether the step folds into the step before it.
    #[must_use]
    pub const fn folds(self) -> bool {
        matches!(self, Self::Squash | Self::Fixup)
    }
}

impl fmt::Display for RewriteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.keyword())
    }
}

impl FromStr for RewriteAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pick" | "p" => Ok(Self::Pick),
            "reword" | "r" => Ok(Self::Reword),
            "edit" | "e" => Ok(Self::Edit),
            "squash" | "s" => Ok(Self::Squash),
            "fixup" | "f" => Ok(Self::Fixup),
            "drop" | "d" => Ok(Self::Drop),
            other => Err(Error::InvalidAction(format!("unknown action '{other}'"))),
        }
    }
}

/// One line of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteStep {
    pub action: RewriteAction,
    pub commit: Oid,
    /// Informational only; git ignores it.
    pub subject: String,
}

/// An ordered rewrite plan, oldest commit first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewritePlan {
    steps: Vec<RewriteStep>,
}

impl RewritePlan {
    /// Build a plan from explicit steps.
    ///
    /// # Errors
    /// Returns `InvalidAction` if the first step folds into nothing.
    pub fn new(steps: Vec<RewriteStep>) -> Result<Self> {
        let plan = Self { steps };
        plan.validate()?;
        Ok(plan)
    }

    /// Turn a divergence plan into a rewrite plan.
    ///
    /// Every commit is picked unless `edit_requests` names another action
    /// for it.
    ///
    /// # Errors
    /// Returns `InvalidAction` if a request names a commit outside the plan,
    /// or would fold the first step.
    pub fn generate(
        divergence: &DivergencePlan,
        edit_requests: &HashMap<Oid, RewriteAction>,
    ) -> Result<Self> {
        if let Some(unknown) = edit_requests
            .keys()
            .find(|id| !divergence.commits.iter().any(|c| c.id == **id))
        {
            return Err(Error::InvalidAction(format!(
                "commit {unknown} is not part of the rewrite"
            )));
        }

        let steps = divergence
            .commits
            .iter()
            .map(|commit| RewriteStep {
                action: edit_requests
                    .get(&commit.id)
                    .copied()
                    .unwrap_or(RewriteAction::Pick),
                commit: commit.id,
                subject: commit.summary.clone(),
            })
            .collect();
        Self::new(steps)
    }

    /// Parse a todo list.
    ///
    /// Blank lines and lines starting with `comment_char` are skipped.
    /// `resolve` turns the hash column into a commit, so abbreviated hashes
    /// can be accepted.
    ///
    /// # Errors
    /// Returns `InvalidAction` on unknown keywords, missing hashes, or a
    /// leading squash/fixup.
    pub fn parse(
        text: &str,
        comment_char: &str,
        resolve: impl Fn(&str) -> Result<Oid>,
    ) -> Result<Self> {
        let mut steps = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(comment_char) {
                continue;
            }

            let mut fields = line.splitn(3, char::is_whitespace);
            let action: RewriteAction = fields.next().unwrap_or_default().parse()?;
            let hash = fields.next().filter(|h| !h.is_empty()).ok_or_else(|| {
                Error::InvalidAction(format!("line {}: missing commit", lineno + 1))
            })?;
            let commit = resolve(hash).map_err(|_| {
                Error::InvalidAction(format!("line {}: unknown commit '{hash}'", lineno + 1))
            })?;
            let subject = fields.next().unwrap_or_default().trim().to_string();

            steps.push(RewriteStep {
                action,
                commit,
                subject,
            });
        }
        Self::new(steps)
    }

    fn validate(&self) -> Result<()> {
        if let Some(first) = self.steps.first() {
            if first.action.folds() {
                return Err(Error::InvalidAction(format!(
                    "cannot {} the first commit: there is no previous commit",
                    first.action
                )));
            }
        }
        Ok(())
    }

    /// Render in git's todo syntax.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            out.push_str(step.action.keyword());
            out.push(' ');
            out.push_str(&step.commit.to_string());
            if !step.subject.is_empty() {
                out.push(' ');
                out.push_str(&step.subject);
            }
            out.push('\n');
        }
        out
    }

    #[must_use]
    pub fn steps(&self) -> &[RewriteStep] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether git will stop at some step for the operator.
    #[must_use]
    pub fn stops(&self) -> bool {
        self.steps.iter().any(|s| s.action == RewriteAction::Edit)
    }
}
