//! # hew-git
//!
//! Git engine layer for hew, built on git2-rs.
//! Read-only queries (revisions, ancestry, tracking config, reflogs, status)
//! go through libgit2; the operations libgit2 cannot drive with editor
//! callbacks (interactive rebase, amend) run as supervised `git` subprocesses.

mod error;
mod process;
mod rebase;
mod repository;
mod revision;
mod session;
mod status;
mod tracking;
mod traits;

pub use error::{Error, Result};
pub use git2::Oid;
pub use process::{EngineOutcome, HookEnv};
pub use repository::Repository;
pub use revision::{CommitInfo, CommitRef};
pub use session::SessionMarker;
pub use status::{DiffStatusCode, DiffStatusEntry};
pub use tracking::BranchTracking;
pub use traits::{EditorKind, GitOps};
