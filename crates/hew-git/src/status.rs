//! Name-status diffs between commits and the working copy.

use git2::{Delta, DiffFindOptions, DiffOptions, Oid};

use crate::Repository;
use crate::error::Result;

/// How a path changed, as in `git diff --name-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatusCode {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    TypeChanged,
}

impl DiffStatusCode {
    /// The single-letter code git prints.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Added => 'A',
            Self::Modified => 'M',
            Self::Deleted => 'D',
            Self::Renamed => 'R',
            Self::Copied => 'C',
            Self::TypeChanged => 'T',
        }
    }

    /// The word used in commit message templates.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "removed",
            Self::Renamed => "renamed",
            Self::Copied => "copied",
            Self::TypeChanged => "typechange",
        }
    }

    const fn from_delta(delta: Delta) -> Option<Self> {
        match delta {
            Delta::Added => Some(Self::Added),
            Delta::Modified => Some(Self::Modified),
            Delta::Deleted => Some(Self::Deleted),
            Delta::Renamed => Some(Self::Renamed),
            Delta::Copied => Some(Self::Copied),
            Delta::Typechange => Some(Self::TypeChanged),
            _ => None,
        }
    }
}

/// One changed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffStatusEntry {
    /// Path relative to the repository root (the new path for renames).
    pub path: String,
    pub code: DiffStatusCode,
}

impl DiffStatusEntry {
    #[must_use]
    pub fn new(path: impl Into<String>, code: DiffStatusCode) -> Self {
        Self {
            path: path.into(),
            code,
        }
    }
}

impl Repository {
    /// List paths that differ between `from` and `to`.
    ///
    /// With `to` absent the comparison is against the working copy through
    /// the index. Untracked files are not reported. An empty `pathspecs`
    /// matches everything; otherwise paths are matched literally.
    ///
    /// # Errors
    /// Returns error if either tree cannot be read.
    pub fn diff_status(
        &self,
        from: Oid,
        to: Option<Oid>,
        pathspecs: &[String],
    ) -> Result<Vec<DiffStatusEntry>> {
        let repo = self.inner();
        let old_tree = repo.find_commit(from)?.tree()?;

        let mut opts = DiffOptions::new();
        opts.include_untracked(false);
        if !pathspecs.is_empty() {
            opts.disable_pathspec_match(true);
            for spec in pathspecs {
                opts.pathspec(spec);
            }
        }

        let mut diff = match to {
            Some(to) => {
                let new_tree = repo.find_commit(to)?.tree()?;
                repo.diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut opts))?
            }
            None => {
                let mut index = repo.index()?;
                index.read(true)?;
                repo.diff_tree_to_workdir_with_index(Some(&old_tree), Some(&mut opts))?
            }
        };
        diff.find_similar(Some(DiffFindOptions::new().renames(true)))?;

        let entries = diff
            .deltas()
            .filter_map(|delta| {
                let code = DiffStatusCode::from_delta(delta.status())?;
                let file = if code == DiffStatusCode::Deleted {
                    delta.old_file()
                } else {
                    delta.new_file()
                };
                let path = file.path()?.to_string_lossy().into_owned();
                Some(DiffStatusEntry::new(path, code))
            })
            .collect();
        Ok(entries)
    }
}
