//! Commit message cleanup and templates.

use std::fmt::Write as _;

use hew_git::DiffStatusEntry;

/// Normalize an edited commit message.
///
/// Drops lines starting with `comment_prefix` (unless it is empty), strips
/// trailing whitespace from every line, and removes trailing blank lines.
/// Every remaining line ends in a newline, so an empty result means the
/// message was effectively empty.
#[must_use]
pub fn cleanup_message(text: &str, comment_prefix: &str) -> String {
    let mut lines: Vec<&str> = text
        .lines()
        .filter(|line| comment_prefix.is_empty() || !line.starts_with(comment_prefix))
        .map(str::trim_end)
        .collect();

    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Editor template for amending a commit.
///
/// The previous message comes first, followed by commented help, the branch,
/// and the files the amended commit will touch, sorted by path.
#[must_use]
pub fn amend_template(
    previous: &str,
    comment_prefix: &str,
    branch: Option<&str>,
    files: &[DiffStatusEntry],
) -> String {
    let c = comment_prefix;
    let mut out = String::from(previous);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    let _ = writeln!(out, "{c} Please enter a commit message.");
    let _ = writeln!(out, "{c} Lines starting with '{c}' will be ignored.");
    let _ = writeln!(out, "{c}");
    match branch {
        Some(branch) => {
            let _ = writeln!(out, "{c} branch {branch}");
        }
        None => {
            let _ = writeln!(out, "{c} detached HEAD");
        }
    }

    let mut files: Vec<&DiffStatusEntry> = files.iter().collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    for entry in files {
        let _ = writeln!(out, "{c} {} {}", entry.code.describe(), entry.path);
    }
    out
}
