//! Configuration management for hew.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::plan::RewriteAction;

/// hew configuration loaded from .git/hew/config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Settings for every rewrite.
    #[serde(default)]
    pub rewrite: RewriteConfig,

    /// Settings for `hew histedit`.
    #[serde(default)]
    pub histedit: HisteditConfig,
}

impl Config {
    /// Load config from a TOML file.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// How long git may run before it is killed.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.rewrite
            .timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// General hew settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Suppress informational output.
    #[serde(default)]
    pub quiet: bool,
}

/// Rewrite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Kill git after this many seconds; unset or 0 waits forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Let `hew rebase` continue through clean edit stops on its own.
    #[serde(default = "default_true")]
    pub auto_continue_edits: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            auto_continue_edits: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// `hew histedit` settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HisteditConfig {
    /// Action placed on the oldest commit when no actions are requested.
    #[serde(default = "default_histedit_action")]
    pub default_action: RewriteAction,
}

impl Default for HisteditConfig {
    fn default() -> Self {
        Self {
            default_action: default_histedit_action(),
        }
    }
}

const fn default_histedit_action() -> RewriteAction {
    RewriteAction::Edit
}
