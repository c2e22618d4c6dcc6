//! Trait abstractions for state storage operations.
//!
//! This module defines the `SessionStore` trait which abstracts hew's own
//! persistence, enabling dependency injection and testability.

use std::path::{Path, PathBuf};

use crate::Result;
use crate::config::Config;
use crate::state::{SessionRecord, State};

/// Trait for hew's on-disk state.
#[allow(clippy::missing_errors_doc)]
pub trait SessionStore {
    /// Get the path to the hew directory.
    fn hew_dir(&self) -> &Path;

    // === Config Operations ===

    /// Load the config, defaults if absent.
    fn load_config(&self) -> Result<Config>;

    // === Session Operations ===

    /// Load the session record, if any.
    fn load_session(&self) -> Result<Option<SessionRecord>>;

    /// Save the session record (called when a rewrite pauses).
    fn save_session(&self, record: &SessionRecord) -> Result<()>;

    /// Clear the session record (called when a rewrite completes or aborts).
    fn clear_session(&self) -> Result<()>;

    // === Plan Operations ===

    /// Write the serialized plan for the sequence editor hook.
    fn save_plan(&self, plan: &str) -> Result<PathBuf>;

    /// Delete the plan file.
    fn clear_plan(&self) -> Result<()>;
}

impl SessionStore for State {
    fn hew_dir(&self) -> &Path {
        Self::hew_dir(self)
    }

    fn load_config(&self) -> Result<Config> {
        Self::load_config(self)
    }

    fn load_session(&self) -> Result<Option<SessionRecord>> {
        Self::load_session(self)
    }

    fn save_session(&self, record: &SessionRecord) -> Result<()> {
        Self::save_session(self, record)
    }

    fn clear_session(&self) -> Result<()> {
        Self::clear_session(self)
    }

    fn save_plan(&self, plan: &str) -> Result<PathBuf> {
        Self::save_plan(self, plan)
    }

    fn clear_plan(&self) -> Result<()> {
        Self::clear_plan(self)
    }
}
