//! Command definitions and dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

pub mod amend;
pub mod completions;
pub mod histedit;
pub mod hook;
pub mod rebase;
mod utils;

/// hew - safer history rewriting on top of git.
#[derive(Parser)]
#[command(name = "hew")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log what hew and git are doing to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay the branch's own commits onto its upstream
    Rebase(RebaseArgs),

    /// Edit, reword or drop commits in the branch's own history
    Histedit(HisteditArgs),

    /// Amend the current commit with working copy changes
    Amend {
        /// Use this message instead of opening the editor
        #[arg(short, long)]
        message: Option<String>,

        /// Only amend changes to these files
        files: Vec<String>,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Callbacks git runs during a rewrite
    #[command(hide = true)]
    Hook {
        #[command(subcommand)]
        kind: HookKind,
    },
}

#[derive(Args)]
pub struct RebaseArgs {
    /// Replay this commit and its descendants up to HEAD
    #[arg(short, long, conflicts_with = "base")]
    pub src: Option<String>,

    /// Replay everything after the merge base with this revision
    #[arg(short, long)]
    pub base: Option<String>,

    /// Replay onto this revision instead of the upstream
    #[arg(short, long)]
    pub dst: Option<String>,

    /// Resume a paused rebase
    #[arg(long = "continue", conflicts_with_all = ["abort", "src", "base", "dst"])]
    pub continue_: bool,

    /// Abandon a paused rebase and restore the branch
    #[arg(long, conflicts_with_all = ["src", "base", "dst"])]
    pub abort: bool,
}

#[derive(Args)]
pub struct HisteditArgs {
    /// Start of the branch's own history; defaults to its upstream
    pub upstream: Option<String>,

    /// Stop at this commit to amend it
    #[arg(long, value_name = "REV")]
    pub edit: Vec<String>,

    /// Edit this commit's message
    #[arg(long, value_name = "REV")]
    pub reword: Vec<String>,

    /// Remove this commit
    #[arg(long, value_name = "REV")]
    pub drop: Vec<String>,

    /// Review the plan in the sequence editor first
    #[arg(short, long)]
    pub interactive: bool,

    /// Resume a paused history edit
    #[arg(
        long = "continue",
        conflicts_with_all = ["abort", "upstream", "edit", "reword", "drop", "interactive"]
    )]
    pub continue_: bool,

    /// Abandon a paused history edit and restore the branch
    #[arg(long, conflicts_with_all = ["upstream", "edit", "reword", "drop", "interactive"])]
    pub abort: bool,
}

#[derive(Subcommand)]
pub enum HookKind {
    /// Sequence editor: supply hew's plan
    Plan { file: PathBuf },
    /// Commit message editor
    Message { file: PathBuf },
}
