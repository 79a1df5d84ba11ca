//! Read-only health reporting over a fixed target set.
//!
//! Doctor re-evaluates check and verify for each listed target without
//! dependency expansion and without touching the state store, so it is
//! safe to run at any time.

use anyhow::Result;
use serde::Serialize;
use std::fmt;

use super::target::Registry;
use crate::context::ExecutionContext;
use crate::output::Output;

/// Health of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoctorStatus {
    /// Check reports the target as not satisfied.
    Missing,
    /// Check passed and verify confirms it.
    Ready,
    /// Check passed but verify cannot confirm it.
    Broken,
}

impl fmt::Display for DoctorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DoctorStatus::Missing => "missing",
            DoctorStatus::Ready => "ready",
            DoctorStatus::Broken => "broken",
        })
    }
}

/// Doctor result for one target.
#[derive(Debug, Serialize)]
pub struct DoctorEntry {
    #[serde(skip)]
    pub id: String,
    pub status: DoctorStatus,
    /// Verify error, present when broken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Named sub-resources the target's diagnose hook reports as absent.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

/// Evaluate each listed target read-only. Ids with no registered target
/// are skipped; no dependency expansion happens.
pub fn examine(registry: &Registry, ids: &[String], ctx: &ExecutionContext) -> Vec<DoctorEntry> {
    let mut entries = Vec::new();
    for id in ids {
        let Some(target) = registry.target(id) else {
            continue;
        };
        let (status, reason) = if !(target.check)(ctx) {
            (DoctorStatus::Missing, None)
        } else {
            match (target.verify)(ctx) {
                Ok(()) => (DoctorStatus::Ready, None),
                Err(err) => (DoctorStatus::Broken, Some(format!("{err:#}"))),
            }
        };
        let missing = target
            .diagnose
            .as_ref()
            .map(|diagnose| diagnose(ctx))
            .unwrap_or_default();
        entries.push(DoctorEntry {
            id: id.clone(),
            status,
            reason,
            missing,
        });
    }
    entries
}

/// Print the line-oriented human report.
pub fn print_human(entries: &[DoctorEntry]) {
    for entry in entries {
        let mut line = format!("{}: {}", entry.id, entry.status);
        if entry.status == DoctorStatus::Broken {
            if let Some(reason) = &entry.reason {
                line.push_str(&format!(" ({reason})"));
            }
        }
        if !entry.missing.is_empty() {
            line.push_str(&format!(" (missing: {})", entry.missing.join(", ")));
        }
        Output::list_item(line);
    }
}

/// Build the JSON report: an object keyed by target id.
pub fn to_json(entries: &[DoctorEntry]) -> Result<serde_json::Value> {
    let mut map = serde_json::Map::new();
    for entry in entries {
        map.insert(entry.id.clone(), serde_json::to_value(entry)?);
    }
    Ok(serde_json::Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::StateStore;
    use crate::engine::target::test_support::stub;
    use crate::engine::Domain;
    use tempfile::TempDir;

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unsatisfied_target_reports_missing() {
        let mut registry = Registry::new(Domain::Install);
        registry.add(stub("curl", &[]));
        let ctx = ExecutionContext::new("/tmp/ws");
        let entries = examine(&registry, &ids(&["curl"]), &ctx);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, DoctorStatus::Missing);
        assert_eq!(entries[0].reason, None);
    }

    #[test]
    fn satisfied_and_verified_target_reports_ready() {
        let mut registry = Registry::new(Domain::Install);
        let mut target = stub("git", &[]);
        target.check = Box::new(|_| true);
        registry.add(target);
        let ctx = ExecutionContext::new("/tmp/ws");
        let entries = examine(&registry, &ids(&["git"]), &ctx);
        assert_eq!(entries[0].status, DoctorStatus::Ready);
    }

    #[test]
    fn unverifiable_target_reports_broken_with_reason() {
        let mut registry = Registry::new(Domain::Install);
        let mut target = stub("ollama", &[]);
        target.check = Box::new(|_| true);
        target.verify = Box::new(|_| anyhow::bail!("ollama service inactive"));
        registry.add(target);
        let ctx = ExecutionContext::new("/tmp/ws");
        let entries = examine(&registry, &ids(&["ollama"]), &ctx);
        assert_eq!(entries[0].status, DoctorStatus::Broken);
        assert_eq!(
            entries[0].reason.as_deref(),
            Some("ollama service inactive")
        );
    }

    #[test]
    fn diagnose_hook_attaches_missing_sub_resources() {
        let mut registry = Registry::new(Domain::Pull);
        let mut target = stub("data_models", &[]);
        target.diagnose = Some(Box::new(|_| vec!["phi3:mini".to_string()]));
        registry.add(target);
        let ctx = ExecutionContext::new("/tmp/ws");
        let entries = examine(&registry, &ids(&["data_models"]), &ctx);
        assert_eq!(entries[0].missing, vec!["phi3:mini"]);
    }

    #[test]
    fn unregistered_ids_are_skipped() {
        let mut registry = Registry::new(Domain::Install);
        registry.add(stub("curl", &[]));
        let ctx = ExecutionContext::new("/tmp/ws");
        let entries = examine(&registry, &ids(&["ghost", "curl"]), &ctx);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "curl");
    }

    #[test]
    fn doctor_never_writes_state() {
        let tmp = TempDir::new().unwrap();
        let mut registry = Registry::new(Domain::Install);
        registry.add(stub("curl", &[]));
        let ctx = ExecutionContext::new(tmp.path());
        examine(&registry, &ids(&["curl"]), &ctx);
        let store = StateStore::for_domain(tmp.path(), Domain::Install);
        assert!(!store.path().exists());
    }

    #[test]
    fn json_report_is_keyed_by_id() {
        let mut registry = Registry::new(Domain::Pull);
        let mut target = stub("data_models", &[]);
        target.diagnose = Some(Box::new(|_| vec!["phi3:mini".to_string()]));
        registry.add(target);
        let ctx = ExecutionContext::new("/tmp/ws");
        let entries = examine(&registry, &ids(&["data_models"]), &ctx);
        let json = to_json(&entries).unwrap();
        assert_eq!(json["data_models"]["status"], "missing");
        assert_eq!(json["data_models"]["missing"][0], "phi3:mini");
    }
}
