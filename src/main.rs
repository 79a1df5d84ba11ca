use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use continuum::commands;
use continuum::context::ExecutionContext;
use continuum::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing with RUST_LOG env filter
    // e.g., RUST_LOG=continuum=debug
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = ExecutionContext::from_cli(&cli);

    tracing::debug!(
        workspace = %ctx.workspace.display(),
        dry_run = ctx.dry_run,
        assume_yes = ctx.assume_yes,
        "execution context created"
    );

    match cli.command {
        Commands::Init(args) => commands::init::run(args, &ctx),
        Commands::Install(args) => commands::install::run(args, &ctx),
        Commands::Pull(args) => commands::pull::run(args, &ctx),
        Commands::Create(args) => commands::create::run(args, &ctx),
        Commands::Doctor(args) => commands::doctor::run(args, &ctx),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
