//! Command implementations, one module per subcommand.

pub mod completions;
pub mod create;
pub mod doctor;
pub mod init;
pub mod install;
pub mod pull;

use anyhow::Result;
use tracing::warn;

use crate::context::ExecutionContext;
use crate::engine::{self, Registry};
use crate::output::Output;
use crate::runs::{self, RunStatus};
use crate::workspace;

/// Print every target with its description, then every bundle with its
/// members.
pub(crate) fn print_targets(registry: &Registry) {
    Output::subheader(format!("{} targets:", registry.domain().title()));
    for target in registry.targets() {
        Output::list_item(format!("{}: {}", target.id, target.description));
    }
    if !registry.bundles().is_empty() {
        Output::subheader("Bundles:");
        for bundle in registry.bundles() {
            Output::list_item(format!("{}: {}", bundle.id, bundle.members.join(", ")));
        }
    }
}

/// Shared orchestration wrapper: validate the workspace, open a run
/// ledger entry (real runs only), execute, close the ledger entry.
pub(crate) fn orchestrate(
    registry: &Registry,
    target: String,
    ctx: &ExecutionContext,
    require_init: bool,
) -> Result<()> {
    workspace::ensure_workspace(&ctx.workspace, require_init)?;

    let run = if ctx.dry_run {
        None
    } else {
        Some(runs::create_run(&ctx.workspace, registry.domain().verb())?)
    };

    let result = engine::execute(registry, std::slice::from_ref(&target), ctx);

    if let Some(run) = &run {
        let status = if result.is_ok() {
            RunStatus::Success
        } else {
            RunStatus::Failed
        };
        if let Err(err) = runs::finish_run(run, status) {
            warn!(run_id = %run.run_id, %err, "failed to close run ledger entry");
        }
    }
    result
}
