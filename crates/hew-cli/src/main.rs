//! hew CLI - safer history rewriting on top of git.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{Cli, Commands, HookKind};

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "HEW_LOG";

/// Initialize tracing on stderr; stdout stays for command output.
fn init_tracing(verbose: bool) {
    let default = if verbose { "hew=debug,hew_core=debug,hew_git=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var(LOG_ENV).unwrap_or_else(|_| default.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are reported as errors by clap.
            let code = i32::from(e.use_stderr());
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.verbose);
    output::set_quiet(cli.quiet);

    let result = match cli.command {
        Commands::Rebase(args) => commands::rebase::run(&args),
        Commands::Histedit(args) => commands::histedit::run(&args),
        Commands::Amend { message, files } => commands::amend::run(message, files),
        Commands::Completions { shell } => commands::completions::run(shell),
        Commands::Hook { kind } => match kind {
            HookKind::Plan { file } => commands::hook::run_plan(&file),
            HookKind::Message { file } => commands::hook::run_message(&file),
        },
    };

    if let Err(e) = result {
        let msg = e.to_string();
        if !msg.is_empty() {
            output::error(&msg);
        }
        std::process::exit(exit_code(&e));
    }
}

/// 2 for failures git or the filesystem caused, 1 for everything the
/// operator can fix.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<hew_core::Error>()
        .map_or(1, hew_core::Error::exit_code)
}
