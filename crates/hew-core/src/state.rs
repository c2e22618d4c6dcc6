//! State persistence for the .git/hew/ directory.
//!
//! git owns the real session under `rebase-merge/`; hew only keeps a small
//! record of which command started it, plus the transient plan file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};

/// Which hew command started a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Rebase,
    Histedit,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rebase => "rebase",
            Self::Histedit => "histedit",
        })
    }
}

/// hew's record of a paused rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Command that started the rewrite.
    pub kind: SessionKind,

    /// Commit the rewrite replays onto.
    pub target: String,

    /// Branch being rewritten, absent when detached.
    pub branch: Option<String>,

    /// When the rewrite started.
    pub started_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a record for a rewrite starting now.
    #[must_use]
    pub fn new(kind: SessionKind, target: impl Into<String>, branch: Option<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            branch,
            started_at: Utc::now(),
        }
    }
}

/// Manages the .git/hew/ directory state.
#[derive(Debug)]
pub struct State {
    /// Path to the .git/hew/ directory.
    hew_dir: PathBuf,
}

impl State {
    /// File names within .git/hew/
    const SESSION_FILE: &'static str = "session.json";
    const CONFIG_FILE: &'static str = "config.toml";
    const PLAN_FILE: &'static str = "plan";

    /// Create a new State for the repository whose git directory is `git_dir`.
    ///
    /// Nothing is created on disk until something is saved.
    #[must_use]
    pub fn new(git_dir: impl AsRef<Path>) -> Self {
        Self {
            hew_dir: git_dir.as_ref().join("hew"),
        }
    }

    /// Get the path to the hew directory.
    #[must_use]
    pub fn hew_dir(&self) -> &Path {
        &self.hew_dir
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.hew_dir)?;
        Ok(())
    }

    // === Config ===

    /// Load the config, falling back to defaults if the file is missing.
    ///
    /// # Errors
    /// Returns error if the file exists but can't be parsed.
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.hew_dir.join(Self::CONFIG_FILE))
    }

    // === Session record ===

    fn session_path(&self) -> PathBuf {
        self.hew_dir.join(Self::SESSION_FILE)
    }

    /// Load the session record, if one was saved.
    ///
    /// # Errors
    /// Returns error if the file exists but can't be read.
    pub fn load_session(&self) -> Result<Option<SessionRecord>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        let record: SessionRecord = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    /// Save the session record.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save_session(&self, record: &SessionRecord) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(record)?;
        fs::write(self.session_path(), content)?;
        Ok(())
    }

    /// Clear the session record (called when a rewrite completes or aborts).
    ///
    /// # Errors
    /// Returns error if file removal fails.
    pub fn clear_session(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    // === Plan file ===

    /// Path git's sequence editor hook reads the plan from.
    #[must_use]
    pub fn plan_path(&self) -> PathBuf {
        self.hew_dir.join(Self::PLAN_FILE)
    }

    /// Write the serialized plan, returning its path.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn save_plan(&self, plan: &str) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.plan_path();
        fs::write(&path, plan)?;
        Ok(path)
    }

    /// Delete the plan file.
    ///
    /// # Errors
    /// Returns error if file removal fails.
    pub fn clear_plan(&self) -> Result<()> {
        match fs::remove_file(self.plan_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}
