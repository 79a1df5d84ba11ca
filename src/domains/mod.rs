//! Domain-specific target definitions.
//!
//! Each domain assembles its registry at startup: closures over the
//! shared command runner satisfying the check/apply/verify contract.

pub mod create;
pub mod install;
pub mod pull;

use crate::engine::{Domain, Registry};

/// The registry for one domain, plus the default doctor target set.
pub fn registry_for(domain: Domain) -> (Registry, Vec<String>) {
    match domain {
        Domain::Install => {
            let registry = install::registry();
            let doctor = install::doctor_targets(&registry);
            (registry, doctor)
        }
        Domain::Pull => {
            let registry = pull::registry();
            let doctor = pull::doctor_targets(&registry);
            (registry, doctor)
        }
        Domain::Create => {
            let registry = create::registry();
            let doctor = create::doctor_targets(&registry);
            (registry, doctor)
        }
    }
}
