//! reap - sweep expired time buckets

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use reap_cli::cmd;
use reap_cli::{Cli, Commands};

fn main() -> Result<()> {
    // Warnings only unless RUST_LOG says otherwise; logs go to stderr so
    // they never mix with the sweep output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Sweep {
            root,
            policy,
            jobs,
            strict,
        } => cmd::sweep::sweep(&root, &policy, jobs, strict, quiet),
        Commands::Check { policy } => cmd::check::check(&policy),
    }
}
