//! Amending HEAD with some or all of the working copy changes.

use hew_git::{DiffStatusEntry, GitOps, Oid};

use crate::editor::Editor;
use crate::error::{Error, Result};
use crate::message::{amend_template, cleanup_message};

/// Files an amend of `paths` will leave in the commit.
///
/// `base` is what HEAD changes relative to its parent, `filter_base` the
/// same limited to the named paths, and `local` the working copy relative
/// to the parent, limited the same way. Named paths whose changes were
/// reverted locally drop out; the rest take their local status.
#[must_use]
pub fn reconcile(
    base: &[DiffStatusEntry],
    filter_base: &[DiffStatusEntry],
    local: &[DiffStatusEntry],
) -> Vec<DiffStatusEntry> {
    let in_local = |path: &str| local.iter().any(|e| e.path == path);
    let dropped = |path: &str| filter_base.iter().any(|e| e.path == path) && !in_local(path);

    let mut result: Vec<DiffStatusEntry> = base
        .iter()
        .filter(|entry| !dropped(&entry.path))
        .map(|entry| {
            local
                .iter()
                .find(|l| l.path == entry.path)
                .cloned()
                .unwrap_or_else(|| entry.clone())
        })
        .collect();

    for entry in local {
        if !result.iter().any(|e| e.path == entry.path) {
            result.push(entry.clone());
        }
    }
    result
}

/// What to amend HEAD with.
#[derive(Debug, Clone, Default)]
pub struct AmendRequest {
    /// Message to use instead of asking the operator.
    pub message: Option<String>,
    /// Only take changes to these files; empty means every tracked file.
    pub paths: Vec<String>,
}

/// Amends HEAD.
pub struct AmendService<'a, G: GitOps> {
    git: &'a G,
}

impl<'a, G: GitOps> AmendService<'a, G> {
    #[must_use]
    pub const fn new(git: &'a G) -> Self {
        Self { git }
    }

    /// Amend HEAD, returning the new commit.
    ///
    /// # Errors
    /// - `Usage` if HEAD is a root commit or the amend would leave it empty
    /// - `EmptyMessage` if the message has no content
    /// - `AmendFailed` if git refuses the commit
    pub fn run(&self, request: &AmendRequest, editor: &dyn Editor) -> Result<Oid> {
        let head = self.git.head()?;
        let info = self.git.commit_info(head.id)?;
        let parent = info
            .first_parent()
            .ok_or_else(|| Error::Usage(format!("cannot amend root commit {}", head.short_id())))?;

        let files = self.files(parent, head.id, &request.paths)?;
        if files.is_empty() {
            return Err(Error::Usage("amend would create an empty commit".into()));
        }

        let message = match &request.message {
            Some(message) => cleanup_message(message, ""),
            None => {
                let c = self.git.comment_char()?;
                let template = amend_template(&info.message, &c, head.branch(), &files);
                cleanup_message(&editor.edit(&template)?, &c)
            }
        };
        if message.is_empty() {
            return Err(Error::EmptyMessage);
        }

        let id = self
            .git
            .amend(&message, &request.paths)
            .map_err(|e| match e {
                hew_git::Error::Cancelled | hew_git::Error::TimedOut(_) => Error::from(e),
                other => Error::AmendFailed(other.to_string()),
            })?;
        tracing::info!(old = %head.id, new = %id, files = files.len(), "amended HEAD");
        Ok(id)
    }

    fn files(&self, parent: Oid, head: Oid, paths: &[String]) -> Result<Vec<DiffStatusEntry>> {
        let local = self.git.diff_status(parent, None, paths)?;
        if paths.is_empty() {
            return Ok(local);
        }
        let base = self.git.diff_status(parent, Some(head), &[])?;
        let filter_base = self.git.diff_status(parent, Some(head), paths)?;
        Ok(reconcile(&base, &filter_base, &local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_mocks::{MockGit, oid};
    use hew_git::DiffStatusCode::{Added, Deleted, Modified};
    use std::cell::RefCell;

    fn entry(path: &str, code: hew_git::DiffStatusCode) -> DiffStatusEntry {
        DiffStatusEntry::new(path, code)
    }

    struct ReplyEditor {
        reply: String,
        shown: RefCell<String>,
    }

    impl ReplyEditor {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.into(),
                shown: RefCell::new(String::new()),
            }
        }
    }

    impl Editor for ReplyEditor {
        fn edit(&self, initial: &str) -> Result<String> {
            *self.shown.borrow_mut() = initial.to_string();
            Ok(self.reply.clone())
        }
    }

    fn repo() -> MockGit {
        MockGit::new()
            .with_commit(1, &[], "initial")
            .with_commit(2, &[1], "add files")
            .with_head("refs/heads/topic", oid(2))
    }

    #[test]
    fn test_reconcile_local_status_wins() {
        let base = [entry("a", Added), entry("b", Modified)];
        let filter_base = [entry("a", Added)];
        let local = [entry("a", Modified)];
        assert_eq!(
            reconcile(&base, &filter_base, &local),
            vec![entry("a", Modified), entry("b", Modified)]
        );
    }

    #[test]
    fn test_reconcile_drops_reverted_paths() {
        let base = [entry("a", Added), entry("b", Modified)];
        let filter_base = [entry("a", Added)];
        assert_eq!(
            reconcile(&base, &filter_base, &[]),
            vec![entry("b", Modified)]
        );
    }

    #[test]
    fn test_reconcile_appends_new_local_paths() {
        let base = [entry("a", Added)];
        let local = [entry("c", Deleted)];
        assert_eq!(
            reconcile(&base, &[], &local),
            vec![entry("a", Added), entry("c", Deleted)]
        );
    }

    #[test]
    fn test_amend_with_message() {
        let git = repo().with_diff(oid(1), None, vec![entry("a", Modified)]);
        let service = AmendService::new(&git);
        let request = AmendRequest {
            message: Some("Better subject  \n\n".into()),
            paths: Vec::new(),
        };

        let id = service.run(&request, &ReplyEditor::new("unused")).unwrap();
        assert_eq!(id, oid(0xab));
        assert_eq!(
            git.amended.borrow().as_slice(),
            &[("Better subject\n".to_string(), Vec::new())]
        );
    }

    #[test]
    fn test_amend_template_lists_reconciled_files() {
        let git = repo()
            .with_diff(oid(1), Some(oid(2)), vec![entry("a", Added), entry("b", Added)])
            .with_diff(oid(1), None, vec![entry("a", Modified)]);
        let service = AmendService::new(&git);
        let editor = ReplyEditor::new("Edited\n# comment\n");
        let request = AmendRequest {
            message: None,
            paths: vec!["a".into()],
        };

        service.run(&request, &editor).unwrap();
        let shown = editor.shown.borrow().clone();
        assert!(shown.starts_with("add files\n\n# Please enter a commit message.\n"));
        assert!(shown.contains("# branch topic\n"));
        assert!(shown.contains("# modified a\n"));
        assert!(shown.contains("# added b\n"));
        assert_eq!(git.amended.borrow()[0].0, "Edited\n");
        assert_eq!(git.amended.borrow()[0].1, vec!["a".to_string()]);
    }

    #[test]
    fn test_amend_reverting_everything_is_empty() {
        let git = repo().with_diff(oid(1), Some(oid(2)), vec![entry("a", Added)]);
        let service = AmendService::new(&git);
        let request = AmendRequest {
            message: Some("msg".into()),
            paths: vec!["a".into()],
        };

        let err = service.run(&request, &ReplyEditor::new("")).unwrap_err();
        assert!(matches!(err, Error::Usage(ref m) if m.contains("empty commit")));
        assert!(git.amended.borrow().is_empty());
    }

    #[test]
    fn test_amend_empty_message() {
        let git = repo().with_diff(oid(1), None, vec![entry("a", Modified)]);
        let service = AmendService::new(&git);

        let err = service
            .run(&AmendRequest::default(), &ReplyEditor::new("# nothing\n"))
            .unwrap_err();
        assert!(matches!(err, Error::EmptyMessage));
    }

    #[test]
    fn test_amend_root_commit() {
        let git = MockGit::new()
            .with_commit(1, &[], "initial")
            .with_head("refs/heads/main", oid(1));
        let service = AmendService::new(&git);

        assert!(matches!(
            service.run(&AmendRequest::default(), &ReplyEditor::new("x")),
            Err(Error::Usage(_))
        ));
    }
}
