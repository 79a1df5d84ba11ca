//! Per-invocation execution context.
//!
//! Built once from the parsed CLI and passed by reference through the
//! engine and the domain actions. Holds the flags that shape an
//! invocation plus the one-shot caches individual actions need (instead
//! of module-level mutable state, so orchestration stays testable).

use std::cell::Cell;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::Cli;
use crate::command_runner::{CommandRunner, RealCommandRunner};

/// Immutable per-invocation configuration for the orchestration engine.
pub struct ExecutionContext {
    /// Workspace root; state and run records live underneath it.
    pub workspace: PathBuf,
    /// Print pending actions instead of performing them.
    pub dry_run: bool,
    /// Stream subprocess output and keep stderr in error messages.
    pub debug: bool,
    /// Skip the confirmation prompt before mutating actions.
    pub assume_yes: bool,
    runner: Arc<dyn CommandRunner>,
    /// Whether `apt-get update` has already run this invocation.
    apt_updated: Cell<bool>,
}

impl ExecutionContext {
    /// Create a context with default flags and the real command runner.
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            dry_run: false,
            debug: false,
            assume_yes: false,
            runner: Arc::new(RealCommandRunner),
            apt_updated: Cell::new(false),
        }
    }

    /// Create a context from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self::new(cli.workspace.clone())
            .with_dry_run(cli.dry_run)
            .with_debug(cli.debug)
            .with_assume_yes(cli.yes)
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    /// The runner used for all external command invocations.
    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    /// Whether `apt-get update` has already run this invocation.
    pub fn apt_updated(&self) -> bool {
        self.apt_updated.get()
    }

    /// Mark `apt-get update` as done for the rest of this invocation.
    pub fn mark_apt_updated(&self) {
        self.apt_updated.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let ctx = ExecutionContext::new("/tmp/ws");
        assert!(!ctx.dry_run);
        assert!(!ctx.debug);
        assert!(!ctx.assume_yes);
        assert!(!ctx.apt_updated());
    }

    #[test]
    fn apt_update_marker_is_one_shot() {
        let ctx = ExecutionContext::new("/tmp/ws");
        assert!(!ctx.apt_updated());
        ctx.mark_apt_updated();
        assert!(ctx.apt_updated());
        ctx.mark_apt_updated();
        assert!(ctx.apt_updated());
    }

    #[test]
    fn builder_flags_stick() {
        let ctx = ExecutionContext::new("/tmp/ws")
            .with_dry_run(true)
            .with_assume_yes(true);
        assert!(ctx.dry_run);
        assert!(ctx.assume_yes);
        assert!(!ctx.debug);
    }
}
