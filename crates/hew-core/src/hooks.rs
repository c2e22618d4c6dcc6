//! Callbacks git makes into hew while a rewrite runs.
//!
//! git is started with `GIT_SEQUENCE_EDITOR` and `GIT_EDITOR` pointing at
//! `hew hook plan` and `hew hook message`. Everything those need travels in
//! `HEW_*` environment variables, since the operator's own editor settings
//! are shadowed for the duration of the rewrite.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use hew_git::{HookEnv, Oid};

use crate::editor::Editor;
use crate::error::{Error, Result};
use crate::message::cleanup_message;
use crate::plan::RewritePlan;

pub const PLAN_FILE_VAR: &str = "HEW_PLAN_FILE";
pub const PLAN_EDITOR_VAR: &str = "HEW_PLAN_EDITOR";
pub const MESSAGE_EDITOR_VAR: &str = "HEW_MESSAGE_EDITOR";
pub const COMMENT_CHAR_VAR: &str = "HEW_COMMENT_CHAR";

/// The hew executable git should call back into.
#[derive(Debug, Clone)]
pub struct HookCommand {
    program: PathBuf,
}

impl HookCommand {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Call back into the running executable.
    ///
    /// # Errors
    /// Returns error if the executable path cannot be determined.
    pub fn current() -> Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    /// Shell command for `GIT_SEQUENCE_EDITOR`.
    #[must_use]
    pub fn plan(&self) -> String {
        format!("{} hook plan", shell_quote(&self.program.to_string_lossy()))
    }

    /// Shell command for `GIT_EDITOR`.
    #[must_use]
    pub fn message(&self) -> String {
        format!("{} hook message", shell_quote(&self.program.to_string_lossy()))
    }
}

/// Quote `s` for a POSIX shell.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// What the hooks need to know, passed through the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookContext {
    /// Serialized plan to hand to git.
    pub plan_file: Option<PathBuf>,
    /// Operator's sequence editor, set when they asked to edit the plan.
    pub plan_editor: Option<String>,
    /// Operator's commit message editor.
    pub message_editor: Option<String>,
    pub comment_char: String,
}

impl Default for HookContext {
    fn default() -> Self {
        Self {
            plan_file: None,
            plan_editor: None,
            message_editor: None,
            comment_char: "#".into(),
        }
    }
}

impl HookContext {
    /// Read the context from this process's environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the context through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            plan_file: get(PLAN_FILE_VAR).map(PathBuf::from),
            plan_editor: get(PLAN_EDITOR_VAR),
            message_editor: get(MESSAGE_EDITOR_VAR),
            comment_char: get(COMMENT_CHAR_VAR).unwrap_or_else(|| "#".into()),
        }
    }

    /// Add the context to a subprocess environment.
    #[must_use]
    pub fn export(&self, mut hooks: HookEnv) -> HookEnv {
        if let Some(path) = &self.plan_file {
            hooks = hooks.var(PLAN_FILE_VAR, path.to_string_lossy());
        }
        if let Some(editor) = &self.plan_editor {
            hooks = hooks.var(PLAN_EDITOR_VAR, editor);
        }
        if let Some(editor) = &self.message_editor {
            hooks = hooks.var(MESSAGE_EDITOR_VAR, editor);
        }
        hooks.var(COMMENT_CHAR_VAR, &self.comment_char)
    }
}

/// Run as git's sequence editor: replace `todo` with hew's plan.
///
/// With an `editor`, the operator gets to rearrange the plan first; the
/// result is parsed again so git never sees an action hew doesn't know.
///
/// # Errors
/// - `Usage` if no plan file was passed
/// - `InvalidAction` if the edited plan is malformed or empty
pub fn supply_plan(
    todo: &Path,
    ctx: &HookContext,
    editor: Option<&dyn Editor>,
    resolve: impl Fn(&str) -> Result<Oid>,
) -> Result<RewritePlan> {
    let plan_file = ctx.plan_file.as_deref().ok_or_else(|| {
        Error::Usage("`hew hook plan` is run by git during a hew rewrite".into())
    })?;
    let text = fs::read_to_string(plan_file)?;
    let mut plan = RewritePlan::parse(&text, &ctx.comment_char, &resolve)?;

    if let Some(editor) = editor {
        let mut buffer = plan.serialize();
        buffer.push_str(&plan_help(&ctx.comment_char));
        let edited = editor.edit(&buffer)?;
        plan = RewritePlan::parse(&edited, &ctx.comment_char, &resolve)?;
    }

    if plan.is_empty() {
        return Err(Error::InvalidAction("the plan is empty, nothing to do".into()));
    }

    tracing::debug!(steps = plan.len(), todo = %todo.display(), "supplying plan");
    fs::write(todo, plan.serialize())?;
    Ok(plan)
}

/// Run as git's commit message editor.
///
/// An unchanged buffer leaves the file alone; anything else is written back
/// verbatim.
///
/// # Errors
/// Returns `EmptyMessage` if the edited message has no content, which makes
/// git stop at this step.
pub fn edit_message(file: &Path, ctx: &HookContext, editor: Option<&dyn Editor>) -> Result<()> {
    let Some(editor) = editor else {
        return Ok(());
    };

    let original = fs::read_to_string(file)?;
    let edited = editor.edit(&original)?;
    if edited == original {
        return Ok(());
    }
    if cleanup_message(&edited, &ctx.comment_char).is_empty() {
        return Err(Error::EmptyMessage);
    }

    fs::write(file, edited)?;
    Ok(())
}

fn plan_help(c: &str) -> String {
    let mut out = String::from("\n");
    for line in [
        "Commands:",
        "p, pick <commit> = use commit",
        "r, reword <commit> = use commit, but edit the commit message",
        "e, edit <commit> = use commit, but stop for amending",
        "s, squash <commit> = use commit, but meld into previous commit",
        "f, fixup <commit> = like \"squash\", but discard this commit's message",
        "d, drop <commit> = remove commit",
        "",
        "Lines run from top to bottom. Removing every line aborts the rewrite.",
    ] {
        if line.is_empty() {
            let _ = writeln!(out, "{c}");
        } else {
            let _ = writeln!(out, "{c} {line}");
        }
    }
    out
}
