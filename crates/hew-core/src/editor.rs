//! The operator's text editor.

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};

/// Something that lets the operator edit a buffer.
///
/// Blocks until editing is finished.
#[allow(clippy::missing_errors_doc)]
pub trait Editor {
    /// Show `initial` to the operator and return what they saved.
    fn edit(&self, initial: &str) -> Result<String>;
}

/// Runs an editor command the way git does: through `sh -c`, with the file
/// appended as an argument.
#[derive(Debug, Clone)]
pub struct CommandEditor {
    command: String,
    workdir: Option<PathBuf>,
    suffix: &'static str,
}

impl CommandEditor {
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            workdir: None,
            suffix: ".txt",
        }
    }

    /// Run the editor from this directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Extension given to the scratch file, so editors pick a syntax.
    #[must_use]
    pub const fn suffix(mut self, suffix: &'static str) -> Self {
        self.suffix = suffix;
        self
    }
}

impl Editor for CommandEditor {
    fn edit(&self, initial: &str) -> Result<String> {
        let mut file = tempfile::Builder::new()
            .prefix("hew-")
            .suffix(self.suffix)
            .tempfile()?;
        file.write_all(initial.as_bytes())?;
        file.flush()?;

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(format!("{} \"$@\"", self.command))
            .arg(&self.command)
            .arg(file.path());
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        tracing::debug!(editor = %self.command, path = %file.path().display(), "launching editor");
        let status = cmd.status()?;
        if !status.success() {
            return Err(Error::EditorFailed(self.command.clone()));
        }

        Ok(fs::read_to_string(file.path())?)
    }
}
