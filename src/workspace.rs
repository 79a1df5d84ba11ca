//! Workspace layout, validation and configuration.
//!
//! A Continuum workspace is a directory tree for datasets, runs, model
//! checkpoints and caches, marked by a `continuum.yaml` at its root and a
//! `.continuum/` metadata directory.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Workspace config file name.
pub const CONFIG_FILE: &str = "continuum.yaml";

const LAYOUT_DIRS: &[&str] = &[
    "data/raw",
    "datasets",
    "runs",
    "models/checkpoints",
    "models/exports",
    "cache",
    "logs",
    ".continuum/state",
];

/// Contents of `continuum.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub workspace_name: String,
    pub stages: StageDirs,
}

/// Dataset stage directories, relative to the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDirs {
    pub stage1_raw_dir: String,
    pub stage2_curated_dir: String,
    pub stage3_annotated_dir: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            workspace_name: "continuum-workspace".to_string(),
            stages: StageDirs {
                stage1_raw_dir: "datasets/stage1_raw".to_string(),
                stage2_curated_dir: "datasets/stage2_curated".to_string(),
                stage3_annotated_dir: "datasets/stage3_annotated".to_string(),
            },
        }
    }
}

/// Create the workspace directory tree and write the default config if
/// none exists yet. Safe to re-run.
pub fn init_workspace(ws: &Path) -> Result<()> {
    for dir in LAYOUT_DIRS {
        let path = ws.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
    }

    let config_path = ws.join(CONFIG_FILE);
    if !config_path.exists() {
        let yaml = serde_yaml::to_string(&WorkspaceConfig::default())?;
        let contents = format!("# Continuum workspace config (V0)\n{yaml}");
        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
    }
    Ok(())
}

/// Validate a workspace path before operating on it.
pub fn ensure_workspace(ws: &Path, require_init: bool) -> Result<()> {
    if !ws.exists() {
        bail!("Workspace path does not exist: {}", ws.display());
    }
    if !ws.is_dir() {
        bail!("Workspace path is not a directory: {}", ws.display());
    }
    if require_init && !ws.join(".continuum").exists() {
        bail!("Not a Continuum workspace. Run `continuum init`.");
    }
    Ok(())
}

/// Python dependency profiles for the workspace venv.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// Tooling only
    Minimal,
    /// Tooling plus the training stack
    Full,
}

const MINIMAL_PKGS: &[&str] = &["pyyaml", "rich", "tqdm", "psutil", "jsonlines"];

const TRAINING_PKGS: &[&str] = &[
    "numpy",
    "torch",
    "transformers",
    "datasets",
    "accelerate",
    "safetensors",
];

/// Write a requirements.txt for the given profile.
pub fn generate_requirements(path: &Path, profile: Profile) -> Result<()> {
    let mut pkgs: Vec<&str> = MINIMAL_PKGS.to_vec();
    if profile == Profile::Full {
        pkgs.extend_from_slice(TRAINING_PKGS);
    }
    let contents = format!("{}\n", pkgs.join("\n"));
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
