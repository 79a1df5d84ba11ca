//! Abstraction over external command execution.
//!
//! All external invocations (apt-get, dpkg, ollama, systemctl) go through
//! the [`CommandRunner`] trait. The two methods cover both usage patterns:
//! - [`run_output`](CommandRunner::run_output): captures stdout + stderr +
//!   exit status, used for checks and quiet execution
//! - [`run_status`](CommandRunner::run_status): inherits stdio, used under
//!   `--debug` so subprocess output streams to the terminal

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output};

/// Trait for abstracting external command execution.
///
/// Stored as `Arc<dyn CommandRunner>` in
/// [`ExecutionContext`](crate::context::ExecutionContext).
pub trait CommandRunner: Send + Sync {
    /// Run a command and capture its full output (stdout + stderr + exit status).
    fn run_output(&self, program: &str, args: &[&str], options: &CommandOptions) -> Result<Output>;

    /// Run a command and return only its exit status (inherits stdio).
    fn run_status(
        &self,
        program: &str,
        args: &[&str],
        options: &CommandOptions,
    ) -> Result<ExitStatus>;
}

/// Options for command execution.
///
/// Most call sites use `CommandOptions::default()`; the apt paths add
/// `DEBIAN_FRONTEND=noninteractive`.
#[derive(Debug, Default, Clone)]
pub struct CommandOptions {
    /// Additional environment variables.
    pub env: Vec<(String, String)>,
}

impl CommandOptions {
    /// Create options with a single extra environment variable.
    pub fn with_env(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            env: vec![(key.into(), value.into())],
        }
    }
}

/// Production implementation that delegates to [`std::process::Command`].
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run_output(&self, program: &str, args: &[&str], options: &CommandOptions) -> Result<Output> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        for (k, v) in &options.env {
            cmd.env(k, v);
        }
        cmd.output()
            .with_context(|| format!("Failed to run '{program}'"))
    }

    fn run_status(
        &self,
        program: &str,
        args: &[&str],
        options: &CommandOptions,
    ) -> Result<ExitStatus> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        for (k, v) in &options.env {
            cmd.env(k, v);
        }
        cmd.status()
            .with_context(|| format!("Failed to run '{program}'"))
    }
}

/// Render a command line for diagnostics, shell-quoting where needed.
pub fn display_command(program: &str, args: &[&str]) -> String {
    let words = std::iter::once(program).chain(args.iter().copied());
    shlex::try_join(words)
        .unwrap_or_else(|_| format!("{} {}", program, args.join(" ")))
}

/// Check whether `cmd` resolves to an executable file on PATH.
pub fn command_exists(cmd: &str) -> bool {
    find_first_executable(cmd, &split_path_var()).is_some()
}

fn split_path_var() -> Vec<PathBuf> {
    let raw = std::env::var("PATH").unwrap_or_default();
    raw.split(':')
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .collect()
}

fn find_first_executable(cmd: &str, path: &[PathBuf]) -> Option<PathBuf> {
    for dir in path {
        let candidate = dir.join(cmd);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_options_default() {
        let opts = CommandOptions::default();
        assert!(opts.env.is_empty());
    }

    #[test]
    fn test_command_options_with_env() {
        let opts = CommandOptions::with_env("DEBIAN_FRONTEND", "noninteractive");
        assert_eq!(opts.env.len(), 1);
        assert_eq!(opts.env[0].0, "DEBIAN_FRONTEND");
    }

    #[test]
    fn test_real_runner_output() {
        let runner = RealCommandRunner;
        let output = runner
            .run_output("echo", &["hello"], &CommandOptions::default())
            .unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[test]
    fn test_real_runner_status() {
        let runner = RealCommandRunner;
        let status = runner
            .run_status("true", &[], &CommandOptions::default())
            .unwrap();
        assert!(status.success());
    }

    #[test]
    fn test_display_command_quotes_spaces() {
        assert_eq!(display_command("echo", &["a b"]), "echo 'a b'");
        assert_eq!(display_command("dpkg", &["-s", "curl"]), "dpkg -s curl");
    }

    #[test]
    fn test_command_exists_for_shell() {
        assert!(command_exists("sh"));
        assert!(!command_exists("definitely-not-a-real-command-xyz"));
    }
}
