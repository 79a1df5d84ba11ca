//! Init command implementation.
//!
//! Creates the workspace directory tree, the default config, and
//! optionally a Python requirements file. Recorded in the run ledger.

use anyhow::Result;
use clap::Args;
use tracing::warn;

use crate::context::ExecutionContext;
use crate::output::Output;
use crate::runs::{self, RunStatus};
use crate::workspace::{self, Profile};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Also write requirements.txt for a Python venv profile
    #[arg(long, value_enum)]
    pub profile: Option<Profile>,
}

pub fn run(args: InitArgs, ctx: &ExecutionContext) -> Result<()> {
    let ws = &ctx.workspace;
    if ctx.dry_run {
        Output::dry_run(format!("would initialize workspace at {}", ws.display()));
        return Ok(());
    }

    let run = runs::create_run(ws, "init")?;
    let result = workspace::init_workspace(ws).and_then(|()| match args.profile {
        Some(profile) => workspace::generate_requirements(&ws.join("requirements.txt"), profile),
        None => Ok(()),
    });

    let status = if result.is_ok() {
        RunStatus::Success
    } else {
        RunStatus::Failed
    };
    if let Err(err) = runs::finish_run(&run, status) {
        warn!(run_id = %run.run_id, %err, "failed to close run ledger entry");
    }
    result?;

    Output::success(format!("Workspace initialized at {}", ws.display()));
    Output::info(format!("run {}", run.run_id));
    Ok(())
}
