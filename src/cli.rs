//! CLI argument definitions for continuum.
//!
//! This module contains the clap-derived `Cli` and `Commands` types.
//! Separated from `main.rs` so that library code (e.g.,
//! `ExecutionContext::from_cli`) and shell completion generation can
//! reference these types.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands;

#[derive(Debug, Parser)]
#[command(name = "continuum")]
#[command(about = "Continuum - provision machines and workspaces for local ML work")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the workspace folder
    #[arg(long, global = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Show what would be done without making changes
    #[arg(long, short = 'n', global = true)]
    pub dry_run: bool,

    /// Answer yes to confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Stream subprocess output and include stderr in error messages
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize a Continuum workspace
    Init(commands::init::InitArgs),

    /// Install system packages and runtimes
    ///
    /// Targets are idempotent: anything already installed is skipped.
    Install(commands::install::InstallArgs),

    /// Pull model artifacts into the local model runner
    Pull(commands::pull::PullArgs),

    /// Create derived models from workspace Modelfiles
    Create(commands::create::CreateArgs),

    /// Report provisioning health without changing anything
    Doctor(commands::doctor::DoctorArgs),

    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}
