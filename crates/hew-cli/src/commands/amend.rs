//! `hew amend` command - fold working copy changes into HEAD.

use anyhow::Result;
use hew_core::{AmendRequest, AmendService, CommandEditor};
use hew_git::EditorKind;

use super::utils;
use crate::output;

/// Run the amend command.
pub fn run(message: Option<String>, files: Vec<String>) -> Result<()> {
    let (repo, _state) = utils::open_repo_and_state()?;

    let mut editor = CommandEditor::new(
        repo.operator_editor(EditorKind::Message)
            .map_err(hew_core::Error::from)?,
    )
    .suffix(".COMMIT_EDITMSG");
    if let Some(workdir) = repo.workdir() {
        editor = editor.current_dir(workdir);
    }

    let request = AmendRequest {
        message,
        paths: files,
    };
    let id = AmendService::new(&repo).run(&request, &editor)?;
    output::success(&format!(
        "Amended HEAD ({})",
        output::short_hash(&id.to_string())
    ));
    Ok(())
}
