//! Assume CLI: the `assume` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Eval { case, json } => commands::eval::run(case, json),
        Commands::Call {
            function,
            args,
            json,
        } => commands::call::run(function, args, json),
        Commands::Functions { json } => commands::functions::run(json),
    }
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
