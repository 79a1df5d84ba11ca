//! continuum - provision machines and workspaces for local ML work.
//!
//! A library for provisioning a local machine (system packages, model
//! runtimes), pulling model artifacts, and materializing derived models,
//! driven by named idempotent targets.
//!
//! # Orchestration
//!
//! The three provisioning domains (install, pull, create) share one engine:
//! a requested target or bundle id is resolved into a dependency-ordered
//! plan, each plan entry runs a check → apply → verify lifecycle, and the
//! last outcome per target is persisted under the workspace. The `doctor`
//! pass re-evaluates the same targets read-only and reports their health.

pub mod cli;
pub mod command_runner;
pub mod commands;
pub mod context;
pub mod domains;
pub mod engine;
pub mod error;
pub mod output;
pub mod runs;
pub mod workspace;

pub use cli::{Cli, Commands};
pub use context::ExecutionContext;
pub use engine::Domain;
