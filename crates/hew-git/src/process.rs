//! Supervision of long-running git subprocesses.
//!
//! The engine child shares the terminal with the operator: stdin and stdout
//! are inherited so editors launched from hooks work, while stderr is relayed
//! byte for byte and captured for classification afterwards.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use crate::error::{Error, Result};

/// How git should call back into hew while it runs.
#[derive(Debug, Clone, Default)]
pub struct HookEnv {
    /// Command git runs as `GIT_SEQUENCE_EDITOR`.
    pub sequence_editor: Option<String>,
    /// Command git runs as `GIT_EDITOR`.
    pub editor: Option<String>,
    /// Extra environment for the hooks.
    pub vars: Vec<(String, String)>,
    /// Kill the engine if it runs longer than this.
    pub timeout: Option<Duration>,
}

impl HookEnv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sequence_editor(mut self, command: impl Into<String>) -> Self {
        self.sequence_editor = Some(command.into());
        self
    }

    #[must_use]
    pub fn editor(mut self, command: impl Into<String>) -> Self {
        self.editor = Some(command.into());
        self
    }

    #[must_use]
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn apply(&self, cmd: &mut Command) {
        if let Some(editor) = &self.sequence_editor {
            cmd.env("GIT_SEQUENCE_EDITOR", editor);
        }
        if let Some(editor) = &self.editor {
            cmd.env("GIT_EDITOR", editor);
        }
        cmd.envs(self.vars.iter().map(|(k, v)| (k, v)));
    }
}

/// Result of an engine invocation, before hew interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutcome {
    /// The engine finished and left no session behind.
    Completed,
    /// The engine stopped and left its session marker on disk.
    Paused,
    /// The engine exited unsuccessfully without a session.
    Failed {
        /// Exit code, absent when killed by a signal.
        code: Option<i32>,
        /// Everything the engine wrote to stderr.
        stderr: String,
    },
}

/// How a supervised child exited.
#[derive(Debug)]
pub(crate) struct ProcessExit {
    pub status: ExitStatus,
    pub stderr: String,
}

/// Run `cmd` to completion, racing it against Ctrl-C and `timeout`.
///
/// The child is killed on interrupt or timeout; nothing it left on disk is
/// touched.
pub(crate) fn run_supervised(
    mut cmd: Command,
    label: &str,
    timeout: Option<Duration>,
) -> Result<ProcessExit> {
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let mut child = cmd
            .spawn()
            .map_err(|e| Error::command(label, format!("failed to start: {e}")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::command(label, "stderr was not captured"))?;
        let relay = tokio::spawn(relay_stderr(stderr));

        let deadline = async {
            match timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            status = child.wait() => {
                let status = status?;
                let stderr = relay
                    .await
                    .map_err(|e| Error::command(label, e.to_string()))??;
                tracing::debug!(command = label, ?status, "engine exited");
                Ok(ProcessExit { status, stderr })
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!(command = label, "interrupted, killing engine");
                child.kill().await?;
                Err(Error::Cancelled)
            }
            () = deadline => {
                let limit = timeout.unwrap_or_default();
                tracing::warn!(command = label, secs = limit.as_secs(), "engine timed out");
                child.kill().await?;
                Err(Error::TimedOut(limit))
            }
        }
    })
}

async fn relay_stderr(mut stderr: tokio::process::ChildStderr) -> Result<String> {
    let mut captured = Vec::new();
    let mut buf = [0u8; 4096];
    let mut out = tokio::io::stderr();
    loop {
        let n = stderr.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n]).await?;
        out.flush().await?;
        captured.extend_from_slice(&buf[..n]);
    }
    Ok(String::from_utf8_lossy(&captured).into_owned())
}
