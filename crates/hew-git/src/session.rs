//! Read-only view of git's on-disk rebase state.
//!
//! git owns everything under `rebase-merge/`; hew only reads it to decide
//! whether a rewrite is paused and why.

use std::fs;
use std::path::{Path, PathBuf};

use git2::Oid;

use crate::error::Result;

const MERGE_DIR: &str = "rebase-merge";
const APPLY_DIR: &str = "rebase-apply";

/// Snapshot of a paused rebase as recorded by git.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionMarker {
    /// Todo lines not yet applied, comments stripped.
    pub remaining: Vec<String>,
    /// Todo lines already applied; the last one is the current stop.
    pub done: Vec<String>,
    /// Commit the rewrite replays onto.
    pub onto: Option<Oid>,
    /// Branch being rewritten, absent when detached.
    pub head_name: Option<String>,
    /// Commit waiting to be amended by an `edit` or `reword` stop.
    pub amend: Option<Oid>,
}

impl SessionMarker {
    /// Directory holding the marker, if any session is in progress.
    #[must_use]
    pub fn dir(git_dir: &Path) -> Option<PathBuf> {
        [MERGE_DIR, APPLY_DIR]
            .iter()
            .map(|name| git_dir.join(name))
            .find(|path| path.is_dir())
    }

    /// Check if git has a rebase in progress.
    #[must_use]
    pub fn exists(git_dir: &Path) -> bool {
        Self::dir(git_dir).is_some()
    }

    /// Read the marker, returning `None` when no session is in progress.
    ///
    /// # Errors
    /// Returns error if a marker file exists but cannot be read.
    pub fn read(git_dir: &Path) -> Result<Option<Self>> {
        let Some(dir) = Self::dir(git_dir) else {
            return Ok(None);
        };

        let head_name = read_trimmed(&dir.join("head-name"))?
            .filter(|name| name != "detached HEAD");

        Ok(Some(Self {
            remaining: read_todo(&dir.join("git-rebase-todo"))?,
            done: read_todo(&dir.join("done"))?,
            onto: read_oid(&dir.join("onto"))?,
            head_name,
            amend: read_oid(&dir.join("amend"))?,
        }))
    }

    /// The todo line the engine stopped on.
    #[must_use]
    pub fn current_step(&self) -> Option<&str> {
        self.done.last().map(String::as_str)
    }

    /// Action keyword of the current stop, as git spelled it.
    #[must_use]
    pub fn current_action(&self) -> Option<&str> {
        self.current_step()?.split_whitespace().next()
    }

    /// Whether HEAD is waiting to be amended before the next step.
    #[must_use]
    pub const fn awaiting_amend(&self) -> bool {
        self.amend.is_some()
    }

    /// A `reword` stop: the commit was picked but its new message was
    /// rejected, so HEAD still carries the old one.
    #[must_use]
    pub fn awaiting_message(&self) -> bool {
        self.awaiting_amend() && matches!(self.current_action(), Some("reword" | "r"))
    }

    /// Short name of the branch being rewritten.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        let name = self.head_name.as_deref()?;
        Some(name.strip_prefix("refs/heads/").unwrap_or(name))
    }
}

fn read_trimmed(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let content = content.trim();
            Ok((!content.is_empty()).then(|| content.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn read_oid(path: &Path) -> Result<Option<Oid>> {
    // Oid::from_str pads short hex, so anything but a full hash is ignored.
    Ok(read_trimmed(path)?
        .filter(|hex| hex.len() == 40)
        .and_then(|hex| Oid::from_str(&hex).ok()))
}

fn read_todo(path: &Path) -> Result<Vec<String>> {
    Ok(read_trimmed(path)?
        .map(|content| {
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default())
}
