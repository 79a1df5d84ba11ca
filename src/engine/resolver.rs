//! Dependency resolution: requested ids to a linear execution plan.
//!
//! Depth-first expansion with explicit in-progress tracking. Bundles
//! expand their members in declaration order; targets expand their
//! dependencies first and are emitted exactly once, at the position of
//! their first full resolution. Revisiting an id that is still being
//! expanded is a cycle.

use std::collections::HashSet;

use super::target::Registry;
use crate::error::ResolveError;

/// Resolve requested target/bundle ids into a dependency-ordered,
/// duplicate-free sequence of atomic target ids.
pub fn resolve(registry: &Registry, requested: &[String]) -> Result<Vec<String>, ResolveError> {
    let mut resolved = Vec::new();
    let mut visiting = HashSet::new();
    let mut visited = HashSet::new();
    for id in requested {
        visit(registry, id, &mut resolved, &mut visiting, &mut visited)?;
    }
    Ok(resolved)
}

fn visit(
    registry: &Registry,
    id: &str,
    resolved: &mut Vec<String>,
    visiting: &mut HashSet<String>,
    visited: &mut HashSet<String>,
) -> Result<(), ResolveError> {
    if visited.contains(id) {
        return Ok(());
    }
    if !visiting.insert(id.to_string()) {
        return Err(ResolveError::CycleDetected {
            domain: registry.domain(),
            id: id.to_string(),
        });
    }
    if let Some(bundle) = registry.bundle(id) {
        for member in &bundle.members {
            visit(registry, member, resolved, visiting, visited)?;
        }
    } else if let Some(target) = registry.target(id) {
        for dep in &target.dependencies {
            visit(registry, dep, resolved, visiting, visited)?;
        }
        resolved.push(id.to_string());
    } else {
        return Err(ResolveError::UnknownTarget {
            domain: registry.domain(),
            id: id.to_string(),
        });
    }
    visiting.remove(id);
    visited.insert(id.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::target::test_support::stub;
    use crate::engine::{Bundle, Domain};

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_target_without_dependencies() {
        let mut registry = Registry::new(Domain::Install);
        registry.add(stub("curl", &[]));
        let plan = resolve(&registry, &ids(&["curl"])).unwrap();
        assert_eq!(plan, vec!["curl"]);
    }

    #[test]
    fn dependencies_come_first() {
        let mut registry = Registry::new(Domain::Install);
        registry.add(stub("x", &[]));
        registry.add(stub("y", &["x"]));
        let plan = resolve(&registry, &ids(&["y"])).unwrap();
        assert_eq!(plan, vec!["x", "y"]);
    }

    #[test]
    fn bundle_members_resolve_in_declaration_order_deduplicated() {
        let mut registry = Registry::new(Domain::Install);
        registry.add(stub("x", &[]));
        registry.add(stub("y", &["x"]));
        registry.add_bundle(Bundle::new("pair", ["x", "y"]));
        let plan = resolve(&registry, &ids(&["pair"])).unwrap();
        assert_eq!(plan, vec!["x", "y"]);
    }

    #[test]
    fn shared_dependency_emitted_once_at_first_resolution() {
        let mut registry = Registry::new(Domain::Install);
        registry.add(stub("c", &[]));
        registry.add(stub("a", &["c"]));
        registry.add(stub("b", &["c"]));
        registry.add_bundle(Bundle::new("all", ["a", "b"]));
        let plan = resolve(&registry, &ids(&["all"])).unwrap();
        assert_eq!(plan, vec!["c", "a", "b"]);
    }

    #[test]
    fn nested_bundles_flatten() {
        let mut registry = Registry::new(Domain::Create);
        registry.add(stub("one", &[]));
        registry.add(stub("two", &[]));
        registry.add_bundle(Bundle::new("inner", ["one"]));
        registry.add_bundle(Bundle::new("outer", ["inner", "two"]));
        let plan = resolve(&registry, &ids(&["outer"])).unwrap();
        assert_eq!(plan, vec!["one", "two"]);
    }

    #[test]
    fn requested_order_is_preserved() {
        let mut registry = Registry::new(Domain::Install);
        registry.add(stub("a", &[]));
        registry.add(stub("b", &[]));
        let plan = resolve(&registry, &ids(&["b", "a"])).unwrap();
        assert_eq!(plan, vec!["b", "a"]);
    }

    #[test]
    fn cycle_is_detected_from_any_entry_point() {
        let mut registry = Registry::new(Domain::Install);
        registry.add(stub("x", &["y"]));
        registry.add(stub("y", &["x"]));
        for entry in ["x", "y"] {
            let err = resolve(&registry, &ids(&[entry])).unwrap_err();
            assert!(matches!(err, ResolveError::CycleDetected { .. }), "{err}");
        }
    }

    #[test]
    fn self_cycle_is_detected() {
        let mut registry = Registry::new(Domain::Install);
        registry.add(stub("x", &["x"]));
        let err = resolve(&registry, &ids(&["x"])).unwrap_err();
        assert_eq!(
            err,
            ResolveError::CycleDetected {
                domain: Domain::Install,
                id: "x".to_string()
            }
        );
    }

    #[test]
    fn unknown_target_fails() {
        let registry = Registry::new(Domain::Pull);
        let err = resolve(&registry, &ids(&["nope"])).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownTarget {
                domain: Domain::Pull,
                id: "nope".to_string()
            }
        );
        assert_eq!(err.to_string(), "Unknown pull target: nope");
    }

    #[test]
    fn unknown_dependency_fails() {
        let mut registry = Registry::new(Domain::Install);
        registry.add(stub("a", &["ghost"]));
        let err = resolve(&registry, &ids(&["a"])).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownTarget { ref id, .. } if id == "ghost"));
    }
}
