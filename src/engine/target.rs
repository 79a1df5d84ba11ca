//! Target and bundle definitions and the per-domain registry.
//!
//! A target is a struct of function values rather than a trait object
//! hierarchy: each domain assembles closures over its own plumbing and
//! registers them at startup. The registry preserves declaration order,
//! which is what listings and doctor sweeps iterate in.

use std::collections::HashMap;

use anyhow::Result;

use super::Domain;
use crate::context::ExecutionContext;

/// Read-only probe: is this target already satisfied?
///
/// Probe failures (e.g. the probing command itself is absent) read as
/// "not satisfied".
pub type CheckFn = Box<dyn Fn(&ExecutionContext) -> bool>;

/// A mutating action or a post-action verification.
pub type StepFn = Box<dyn Fn(&ExecutionContext) -> Result<()>>;

/// Optional doctor-only probe naming missing sub-resources (e.g. which
/// models are absent even though the umbrella check passed).
pub type DiagnoseFn = Box<dyn Fn(&ExecutionContext) -> Vec<String>>;

/// One atomic, idempotent provisioning unit.
pub struct Target {
    pub id: String,
    pub description: String,
    /// Target ids that must be satisfied first, in order.
    pub dependencies: Vec<String>,
    pub check: CheckFn,
    pub apply: StepFn,
    pub verify: StepFn,
    pub diagnose: Option<DiagnoseFn>,
}

/// A named group of targets and/or bundles resolved as a unit.
pub struct Bundle {
    pub id: String,
    pub members: Vec<String>,
}

impl Bundle {
    pub fn new(id: impl Into<String>, members: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: id.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

enum Entry {
    Target(usize),
    Bundle(usize),
}

/// The set of targets and bundles for one domain.
///
/// Constructed fresh per invocation and never mutated afterwards. Targets
/// and bundles share one namespace; registering a duplicate id is a
/// construction defect and panics.
pub struct Registry {
    domain: Domain,
    targets: Vec<Target>,
    bundles: Vec<Bundle>,
    index: HashMap<String, Entry>,
}

impl Registry {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            targets: Vec::new(),
            bundles: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Register a target. Panics on a duplicate id.
    pub fn add(&mut self, target: Target) {
        assert!(
            !self.index.contains_key(&target.id),
            "duplicate {} id: {}",
            self.domain,
            target.id
        );
        self.index
            .insert(target.id.clone(), Entry::Target(self.targets.len()));
        self.targets.push(target);
    }

    /// Register a bundle. Panics on a duplicate id.
    pub fn add_bundle(&mut self, bundle: Bundle) {
        assert!(
            !self.index.contains_key(&bundle.id),
            "duplicate {} id: {}",
            self.domain,
            bundle.id
        );
        self.index
            .insert(bundle.id.clone(), Entry::Bundle(self.bundles.len()));
        self.bundles.push(bundle);
    }

    pub fn target(&self, id: &str) -> Option<&Target> {
        match self.index.get(id) {
            Some(Entry::Target(i)) => Some(&self.targets[*i]),
            _ => None,
        }
    }

    pub fn bundle(&self, id: &str) -> Option<&Bundle> {
        match self.index.get(id) {
            Some(Entry::Bundle(i)) => Some(&self.bundles[*i]),
            _ => None,
        }
    }

    /// All targets in declaration order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// All bundles in declaration order.
    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    /// All target ids in declaration order.
    pub fn target_ids(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.id.clone()).collect()
    }
}
