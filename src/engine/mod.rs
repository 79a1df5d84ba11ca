//! The target orchestration engine.
//!
//! One generic engine drives all three provisioning domains: a registry of
//! targets and bundles, a dependency resolver producing a linear plan, an
//! executor with check → apply → verify semantics, a persisted per-target
//! state store, and a read-only doctor pass.

pub mod doctor;
pub mod executor;
pub mod resolver;
pub mod state;
pub mod target;

pub use executor::execute;
pub use resolver::resolve;
pub use target::{Bundle, Registry, Target};

use std::fmt;

use clap::ValueEnum;

/// The three provisioning domains the engine serves.
///
/// Each domain has its own registry and its own persisted state artifact;
/// everything else is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Domain {
    /// System packages and runtimes (apt, ollama)
    Install,
    /// Model artifacts pulled into the local model runner
    Pull,
    /// Derived models materialized from workspace Modelfiles
    Create,
}

impl Domain {
    /// Imperative verb: "install curl".
    pub fn verb(self) -> &'static str {
        match self {
            Domain::Install => "install",
            Domain::Pull => "pull",
            Domain::Create => "create",
        }
    }

    /// Progressive form: "installing curl...".
    pub fn gerund(self) -> &'static str {
        match self {
            Domain::Install => "installing",
            Domain::Pull => "pulling",
            Domain::Create => "creating",
        }
    }

    /// Past participle: "installed curl".
    pub fn past(self) -> &'static str {
        match self {
            Domain::Install => "installed",
            Domain::Pull => "pulled",
            Domain::Create => "created",
        }
    }

    /// Capitalized form for listing headers.
    pub fn title(self) -> &'static str {
        match self {
            Domain::Install => "Install",
            Domain::Pull => "Pull",
            Domain::Create => "Create",
        }
    }

    /// File name of this domain's state artifact.
    pub fn state_file(self) -> &'static str {
        match self {
            Domain::Install => "install.json",
            Domain::Pull => "pull.json",
            Domain::Create => "create.json",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_word_forms() {
        assert_eq!(Domain::Install.to_string(), "install");
        assert_eq!(Domain::Pull.gerund(), "pulling");
        assert_eq!(Domain::Create.past(), "created");
        assert_eq!(Domain::Install.state_file(), "install.json");
    }
}
