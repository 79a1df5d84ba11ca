//! Plan execution with check → apply → verify semantics.
//!
//! Strictly sequential: one target at a time, in plan order, with no
//! parallelism across independent branches. A failure anywhere halts
//! everything still queued; recovery is idempotent re-execution on the
//! next invocation, not rollback.

use anyhow::{bail, Context, Result};
use tracing::debug;

use super::resolver;
use super::state::{record, Outcome, StateStore};
use super::target::Registry;
use crate::context::ExecutionContext;
use crate::output::Output;

/// Resolve `requested` against `registry` and execute the resulting plan.
///
/// Returns `Ok(())` iff every planned target ended `success` or
/// `already_satisfied`. Resolution errors, a declined confirmation, and
/// target failures all surface as errors; only target failures write a
/// `failed` record before halting.
pub fn execute(registry: &Registry, requested: &[String], ctx: &ExecutionContext) -> Result<()> {
    let domain = registry.domain();
    let plan = resolver::resolve(registry, requested)?;
    Output::info(format!("Will {}: {}", domain.verb(), plan.join(", ")));

    let store = StateStore::for_domain(&ctx.workspace, domain);
    let mut state = store.load();
    let mut confirmed = ctx.assume_yes || ctx.dry_run;

    for (position, id) in plan.iter().enumerate() {
        let target = registry
            .target(id)
            .expect("resolved plan contains only registered targets");

        if (target.check)(ctx) {
            debug!(target = %id, "already satisfied");
            Output::success(format!("{id} already satisfied"));
            record(&mut state, id, Outcome::AlreadySatisfied, None);
            continue;
        }

        if ctx.dry_run {
            Output::dry_run(format!(
                "would {} {} ({})",
                domain.verb(),
                id,
                target.description
            ));
            continue;
        }

        // One prompt per invocation, and only if something actually mutates.
        if !confirmed {
            let proceed = cliclack::confirm(format!(
                "Proceed with {} of {}?",
                domain.verb(),
                plan.join(", ")
            ))
            .initial_value(false)
            .interact()
            .context("Failed to read confirmation")?;
            if !proceed {
                Output::warning("Aborted.");
                bail!("{} aborted: confirmation declined", domain.verb());
            }
            confirmed = true;
        }

        let label = format!("{} {}...", domain.gerund(), id);
        // Under --debug subprocess output streams to the terminal, so a
        // spinner would garble it.
        let spinner = if ctx.debug {
            Output::step(&label);
            None
        } else {
            Some(Output::spinner(label))
        };

        match (target.apply)(ctx).and_then(|()| (target.verify)(ctx)) {
            Ok(()) => {
                let msg = format!("{} {}", domain.past(), id);
                match spinner {
                    Some(spinner) => spinner.finish_success(&msg),
                    None => Output::success(&msg),
                }
                record(&mut state, id, Outcome::Success, None);
            }
            Err(err) => {
                let msg = format!("{id}: {err:#}");
                match spinner {
                    Some(spinner) => spinner.finish_error(&msg),
                    None => Output::error(&msg),
                }
                record(&mut state, id, Outcome::Failed, Some(format!("{err:#}")));
                store.save(&state)?;
                let unattempted = plan.len() - position - 1;
                bail!(
                    "target '{id}' failed ({unattempted} target(s) not attempted): {err:#}"
                );
            }
        }
    }

    if !ctx.dry_run {
        store.save(&state)?;
    }
    Ok(())
}
