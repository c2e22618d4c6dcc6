//! # hew-core
//!
//! The history-rewriting orchestrator behind hew: works out which commits
//! are the branch's own, turns a request into a plan for git's interactive
//! rebase, drives git through it, and resumes or aborts rewrites that
//! paused for the operator.

pub mod amend;
pub mod config;
pub mod continuation;
pub mod driver;
pub mod editor;
pub mod error;
pub mod hooks;
pub mod message;
pub mod plan;
pub mod planner;
pub mod resolver;
pub mod rewrite;
pub mod state;
pub mod traits;

#[cfg(test)]
mod test_mocks;

pub use amend::{AmendRequest, AmendService};
pub use config::Config;
pub use continuation::Continuation;
pub use driver::{Driver, Outcome, PauseReason, RewriteRequest, Session};
pub use editor::{CommandEditor, Editor};
pub use error::{Error, Result};
pub use hooks::{HookCommand, HookContext};
pub use plan::{RewriteAction, RewritePlan, RewriteStep};
pub use planner::{DivergencePlan, PlanRequest, PlanWarning, Planner};
pub use resolver::Resolver;
pub use rewrite::{HisteditOptions, Prepared, RewriteService};
pub use state::{SessionKind, SessionRecord, State};
pub use traits::SessionStore;
