//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use hew_core::PauseReason;

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a detail line without prefix (suppressed in quiet mode).
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Short label for why a rewrite stopped.
#[must_use]
pub fn pause_label(reason: &PauseReason) -> String {
    match reason {
        PauseReason::Edit => "edit".cyan().to_string(),
        PauseReason::Conflict { files } => format!("{} ({})", "conflict".red(), files.len()),
        PauseReason::Message => "message rejected".yellow().to_string(),
        PauseReason::Stopped => "stopped".yellow().to_string(),
    }
}

/// A commit hash shortened for display.
#[must_use]
pub fn short_hash(hash: &str) -> String {
    hash[..8.min(hash.len())].dimmed().to_string()
}
