//! Create domain: derived models materialized from workspace Modelfiles.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::command_runner::{command_exists, CommandOptions};
use crate::context::ExecutionContext;
use crate::engine::{Bundle, Domain, Registry, Target};

pub fn registry() -> Registry {
    let mut registry = Registry::new(Domain::Create);

    registry.add(Target {
        id: "phi3_mini_json".to_string(),
        description: "Create phi3-mini-json model".to_string(),
        dependencies: Vec::new(),
        check: Box::new(|ctx| model_exists(ctx, "phi3-mini-json:latest").unwrap_or(false)),
        apply: Box::new(|ctx| {
            let path = ctx
                .workspace
                .join("external/model_data_1o/models/phi3-mini-json/phi3-json-modelfile");
            if !path.exists() {
                bail!("Modelfile not found: {}", path.display());
            }
            create_model(ctx, "phi3-mini-json:latest", &path)
        }),
        verify: Box::new(|ctx| show_model(ctx, "phi3-mini-json:latest")),
        diagnose: None,
    });

    registry.add(Target {
        id: "phi3_mini_agent".to_string(),
        description: "Create phi3-mini-agent model".to_string(),
        dependencies: Vec::new(),
        check: Box::new(|ctx| model_exists(ctx, "phi3-mini-agent:latest").unwrap_or(false)),
        apply: Box::new(|ctx| {
            let base = ctx
                .workspace
                .join("external/model_data_1o/models/phi3-mini-agent");
            let Some(path) = find_modelfile(&base) else {
                bail!(
                    "Modelfile not found under: {}. Expected a file containing 'modelfile' or named 'Modelfile'.",
                    base.display()
                );
            };
            create_model(ctx, "phi3-mini-agent:latest", &path)
        }),
        verify: Box::new(|ctx| show_model(ctx, "phi3-mini-agent:latest")),
        diagnose: None,
    });

    registry.add_bundle(Bundle::new("engine", ["phi3_mini_json", "phi3_mini_agent"]));

    registry
}

/// Default doctor set: every create target.
pub fn doctor_targets(registry: &Registry) -> Vec<String> {
    registry.target_ids()
}

/// Whether `ollama show` knows the model. Errors when ollama itself is
/// not installed.
fn model_exists(ctx: &ExecutionContext, model: &str) -> Result<bool> {
    if !command_exists("ollama") {
        bail!("ollama not installed. Run: continuum install ollama");
    }
    let output = ctx
        .runner()
        .run_output("ollama", &["show", model], &CommandOptions::default())?;
    Ok(output.status.success())
}

fn show_model(ctx: &ExecutionContext, model: &str) -> Result<()> {
    if model_exists(ctx, model)? {
        Ok(())
    } else {
        bail!("ollama show failed")
    }
}

fn create_model(ctx: &ExecutionContext, tag: &str, modelfile: &Path) -> Result<()> {
    let path = modelfile.display().to_string();
    let args = ["create", tag, "-f", path.as_str()];
    let (ok, stderr) = if ctx.debug {
        let status = ctx
            .runner()
            .run_status("ollama", &args, &CommandOptions::default())?;
        (status.success(), String::new())
    } else {
        let output = ctx
            .runner()
            .run_output("ollama", &args, &CommandOptions::default())?;
        (
            output.status.success(),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        )
    };
    if ok {
        Ok(())
    } else {
        let base = if stderr.is_empty() {
            "ollama create failed".to_string()
        } else {
            stderr
        };
        bail!("{base}\nIf a base model is missing, run: continuum pull data_models")
    }
}

/// Search `base` recursively for a Modelfile: an exact `Modelfile` or any
/// file whose name contains "modelfile".
fn find_modelfile(base: &Path) -> Option<PathBuf> {
    if !base.is_dir() {
        return None;
    }
    let entries = fs::read_dir(base).ok()?;
    let mut dirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name == "Modelfile" || name.to_lowercase().contains("modelfile") {
            return Some(path);
        }
    }
    for dir in dirs {
        if let Some(found) = find_modelfile(&dir) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::resolve;
    use tempfile::TempDir;

    #[test]
    fn engine_bundle_resolves_both_models_in_order() {
        let registry = registry();
        let plan = resolve(&registry, &["engine".to_string()]).unwrap();
        assert_eq!(plan, vec!["phi3_mini_json", "phi3_mini_agent"]);
    }

    #[test]
    fn find_modelfile_matches_exact_name() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Modelfile");
        fs::write(&path, "FROM phi3:mini\n").unwrap();
        assert_eq!(find_modelfile(tmp.path()), Some(path));
    }

    #[test]
    fn find_modelfile_matches_nested_and_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("v2/final");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("notes.txt"), "").unwrap();
        let path = nested.join("agent-ModelFile.txt");
        fs::write(&path, "FROM phi3:mini\n").unwrap();
        assert_eq!(find_modelfile(tmp.path()), Some(path));
    }

    #[test]
    fn find_modelfile_handles_missing_directory() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_modelfile(&tmp.path().join("nope")), None);
    }
}
