//! Install command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::context::ExecutionContext;
use crate::domains;

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Target or bundle id to install (see --list)
    #[arg(required_unless_present = "list")]
    pub target: Option<String>,

    /// List available install targets and bundles
    #[arg(long)]
    pub list: bool,
}

pub fn run(args: InstallArgs, ctx: &ExecutionContext) -> Result<()> {
    let registry = domains::install::registry();
    if args.list {
        super::print_targets(&registry);
        return Ok(());
    }
    let target = args.target.context("missing install target")?;
    super::orchestrate(&registry, target, ctx, false)
}
