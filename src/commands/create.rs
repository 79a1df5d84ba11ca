//! Create command implementation.
//!
//! Requires an initialized workspace: the Modelfiles it materializes
//! models from live under the workspace tree.

use anyhow::{Context, Result};
use clap::Args;

use crate::context::ExecutionContext;
use crate::domains;

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Target or bundle id to create (see --list)
    #[arg(required_unless_present = "list")]
    pub target: Option<String>,

    /// List available create targets and bundles
    #[arg(long)]
    pub list: bool,
}

pub fn run(args: CreateArgs, ctx: &ExecutionContext) -> Result<()> {
    let registry = domains::create::registry();
    if args.list {
        super::print_targets(&registry);
        return Ok(());
    }
    let target = args.target.context("missing create target")?;
    super::orchestrate(&registry, target, ctx, true)
}
