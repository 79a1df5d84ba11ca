//! Pull command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::context::ExecutionContext;
use crate::domains;

#[derive(Debug, Args)]
pub struct PullArgs {
    /// Target id to pull (see --list)
    #[arg(required_unless_present = "list")]
    pub target: Option<String>,

    /// List available pull targets
    #[arg(long)]
    pub list: bool,
}

pub fn run(args: PullArgs, ctx: &ExecutionContext) -> Result<()> {
    let registry = domains::pull::registry();
    if args.list {
        super::print_targets(&registry);
        return Ok(());
    }
    let target = args.target.context("missing pull target")?;
    super::orchestrate(&registry, target, ctx, false)
}
