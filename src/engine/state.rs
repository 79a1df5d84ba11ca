//! Persisted per-target outcome state.
//!
//! One JSON artifact per domain under the workspace's internal metadata
//! directory. The whole map is loaded before a run and rewritten in a
//! single write; an absent or unparsable artifact reads as empty state.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Domain;

/// Terminal result of one target attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    AlreadySatisfied,
    Failed,
}

/// Last-outcome record for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    pub last_run: DateTime<Utc>,
    pub last_result: Outcome,
    pub last_error: Option<String>,
}

/// Target id to last outcome, for one domain.
pub type StateMap = BTreeMap<String, StateRecord>;

/// Update `state` with the outcome of one target attempt.
pub fn record(state: &mut StateMap, id: &str, result: Outcome, error: Option<String>) {
    state.insert(
        id.to_string(),
        StateRecord {
            last_run: Utc::now(),
            last_result: result,
            last_error: error,
        },
    );
}

/// Loads and saves one domain's state artifact.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn for_domain(workspace: &Path, domain: Domain) -> Self {
        Self {
            path: workspace
                .join(".continuum")
                .join("state")
                .join(domain.state_file()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state map. Missing or corrupt state reads as empty.
    pub fn load(&self) -> StateMap {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(_) => return StateMap::new(),
        };
        match serde_json::from_str(&text) {
            Ok(state) => state,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ignoring unparsable state artifact");
                StateMap::new()
            }
        }
    }

    /// Serialize the whole map in one write, creating the state directory
    /// as needed.
    pub fn save(&self, state: &StateMap) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_artifact_loads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::for_domain(tmp.path(), Domain::Install);
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_artifact_loads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::for_domain(tmp.path(), Domain::Pull);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json {").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_preserves_records() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::for_domain(tmp.path(), Domain::Create);
        let mut state = StateMap::new();
        record(&mut state, "phi3_mini_json", Outcome::Success, None);
        record(
            &mut state,
            "phi3_mini_agent",
            Outcome::Failed,
            Some("ollama show failed".to_string()),
        );
        store.save(&state).unwrap();

        let loaded = store.load();
        assert_eq!(loaded, state);
        assert_eq!(
            loaded["phi3_mini_agent"].last_error.as_deref(),
            Some("ollama show failed")
        );
    }

    #[test]
    fn artifact_path_is_per_domain() {
        let tmp = TempDir::new().unwrap();
        let install = StateStore::for_domain(tmp.path(), Domain::Install);
        let pull = StateStore::for_domain(tmp.path(), Domain::Pull);
        assert_ne!(install.path(), pull.path());
        assert!(install.path().ends_with(".continuum/state/install.json"));
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let json = serde_json::to_string(&Outcome::AlreadySatisfied).unwrap();
        assert_eq!(json, "\"already_satisfied\"");
    }
}
