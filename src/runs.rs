//! Run ledger: a timestamped record per mutating invocation.
//!
//! Each run gets a directory under `<workspace>/runs/` holding a
//! `run.json` with the invocation metadata and a `logs.txt`. The ledger
//! is an audit trail, not the engine's state store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Success,
    Failed,
}

/// Contents of `run.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub run_id: String,
    pub command: String,
    pub workspace: PathBuf,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Handle to one ledger entry.
#[derive(Debug, Clone)]
pub struct Run {
    pub run_id: String,
    pub run_dir: PathBuf,
    meta_path: PathBuf,
    pub log_path: PathBuf,
}

/// Open a new ledger entry: `runs/run_<date>_<seq>/` with `run.json` in
/// status `running` and an empty `logs.txt`.
pub fn create_run(workspace: &Path, command: &str) -> Result<Run> {
    let runs_root = workspace.join("runs");
    fs::create_dir_all(&runs_root)
        .with_context(|| format!("Failed to create {}", runs_root.display()))?;

    let started_at = Utc::now();
    let today = started_at.format("%Y-%m-%d").to_string();
    let prefix = format!("run_{today}_");
    let existing = fs::read_dir(&runs_root)
        .with_context(|| format!("Failed to read {}", runs_root.display()))?
        .flatten()
        .filter(|entry| {
            entry.path().is_dir() && entry.file_name().to_string_lossy().starts_with(&prefix)
        })
        .count();
    let run_id = format!("{prefix}{:03}", existing + 1);

    let run_dir = runs_root.join(&run_id);
    fs::create_dir(&run_dir).with_context(|| format!("Failed to create {}", run_dir.display()))?;

    let meta_path = run_dir.join("run.json");
    let log_path = run_dir.join("logs.txt");
    let meta = RunMeta {
        run_id: run_id.clone(),
        command: command.to_string(),
        workspace: workspace.to_path_buf(),
        status: RunStatus::Running,
        started_at,
        finished_at: None,
    };
    write_meta(&meta_path, &meta)?;
    fs::write(&log_path, "").with_context(|| format!("Failed to write {}", log_path.display()))?;

    Ok(Run {
        run_id,
        run_dir,
        meta_path,
        log_path,
    })
}

/// Close a ledger entry with its final status.
pub fn finish_run(run: &Run, status: RunStatus) -> Result<()> {
    let text = fs::read_to_string(&run.meta_path)
        .with_context(|| format!("Failed to read {}", run.meta_path.display()))?;
    let mut meta: RunMeta = serde_json::from_str(&text)
        .with_context(|| format!("Invalid run metadata in {}", run.meta_path.display()))?;
    meta.status = status;
    meta.finished_at = Some(Utc::now());
    write_meta(&run.meta_path, &meta)
}

fn write_meta(path: &Path, meta: &RunMeta) -> Result<()> {
    let json = serde_json::to_string_pretty(meta)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn run_ids_increment_within_a_day() {
        let tmp = TempDir::new().unwrap();
        let first = create_run(tmp.path(), "init").unwrap();
        let second = create_run(tmp.path(), "install").unwrap();
        assert!(first.run_id.ends_with("_001"));
        assert!(second.run_id.ends_with("_002"));
        assert!(first.run_dir.is_dir());
        assert!(first.log_path.is_file());
    }

    #[test]
    fn finish_updates_status_and_timestamp() {
        let tmp = TempDir::new().unwrap();
        let run = create_run(tmp.path(), "pull").unwrap();

        let text = fs::read_to_string(run.run_dir.join("run.json")).unwrap();
        let meta: RunMeta = serde_json::from_str(&text).unwrap();
        assert_eq!(meta.status, RunStatus::Running);
        assert_eq!(meta.command, "pull");
        assert!(meta.finished_at.is_none());

        finish_run(&run, RunStatus::Success).unwrap();
        let text = fs::read_to_string(run.run_dir.join("run.json")).unwrap();
        let meta: RunMeta = serde_json::from_str(&text).unwrap();
        assert_eq!(meta.status, RunStatus::Success);
        assert!(meta.finished_at.is_some());
    }
}
