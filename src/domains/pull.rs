//! Pull domain: model artifacts fetched into the local model runner.

use std::collections::BTreeSet;

use anyhow::{bail, Result};

use crate::command_runner::{command_exists, CommandOptions};
use crate::context::ExecutionContext;
use crate::engine::{Domain, Registry, Target};

/// Models the data pipeline expects to be present locally.
pub const DATA_MODELS: &[&str] = &["goekdenizguelmez/JOSIEFIED-Qwen3", "phi3:mini"];

pub fn registry() -> Registry {
    let mut registry = Registry::new(Domain::Pull);

    registry.add(Target {
        id: "data_models".to_string(),
        description: "Ollama models for Model_Data-1O".to_string(),
        dependencies: Vec::new(),
        check: Box::new(|ctx| match installed_models(ctx) {
            Ok(models) => DATA_MODELS.iter().all(|m| models.contains(*m)),
            Err(_) => false,
        }),
        apply: Box::new(pull_missing_models),
        verify: Box::new(|ctx| {
            let models = installed_models(ctx)?;
            let missing = missing_models(&models);
            if missing.is_empty() {
                Ok(())
            } else {
                bail!("missing models: {}", missing.join(", "))
            }
        }),
        diagnose: Some(Box::new(|ctx| match installed_models(ctx) {
            Ok(models) => missing_models(&models),
            Err(_) => Vec::new(),
        })),
    });

    registry
}

/// Default doctor set: every pull target.
pub fn doctor_targets(registry: &Registry) -> Vec<String> {
    registry.target_ids()
}

fn pull_missing_models(ctx: &ExecutionContext) -> Result<()> {
    let models = installed_models(ctx)?;
    for model in missing_models(&models) {
        let ok = if ctx.debug {
            ctx.runner()
                .run_status("ollama", &["pull", model.as_str()], &CommandOptions::default())?
                .success()
        } else {
            ctx.runner()
                .run_output("ollama", &["pull", model.as_str()], &CommandOptions::default())?
                .status
                .success()
        };
        if !ok {
            bail!("ollama pull failed: {model}");
        }
    }
    Ok(())
}

fn missing_models(installed: &BTreeSet<String>) -> Vec<String> {
    DATA_MODELS
        .iter()
        .filter(|m| !installed.contains(**m))
        .map(|m| m.to_string())
        .collect()
}

/// The model names `ollama list` currently reports.
pub(crate) fn installed_models(ctx: &ExecutionContext) -> Result<BTreeSet<String>> {
    if !command_exists("ollama") {
        bail!("ollama not installed. Run: continuum install ollama");
    }
    let output = ctx
        .runner()
        .run_output("ollama", &["list"], &CommandOptions::default())?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.is_empty() {
            bail!("ollama list failed");
        }
        bail!("{stderr}");
    }
    Ok(parse_model_list(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse `ollama list` output: first column of every non-header line.
fn parse_model_list(stdout: &str) -> BTreeSet<String> {
    let mut models = BTreeSet::new();
    for line in stdout.lines() {
        if line.trim().is_empty() || line.to_lowercase().starts_with("name") {
            continue;
        }
        if let Some(first) = line.split_whitespace().next() {
            models.insert(first.to_string());
        }
    }
    models
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_the_data_models_target() {
        let registry = registry();
        let target = registry.target("data_models").unwrap();
        assert!(target.dependencies.is_empty());
        assert!(target.diagnose.is_some());
        assert!(registry.bundles().is_empty());
    }

    #[test]
    fn parse_model_list_skips_header_and_blank_lines() {
        let stdout = "NAME                  ID            SIZE    MODIFIED\n\
                      phi3:mini             abc123        2.2 GB  3 days ago\n\
                      \n\
                      goekdenizguelmez/JOSIEFIED-Qwen3  def456  5.2 GB  1 day ago\n";
        let models = parse_model_list(stdout);
        assert_eq!(models.len(), 2);
        assert!(models.contains("phi3:mini"));
        assert!(models.contains("goekdenizguelmez/JOSIEFIED-Qwen3"));
    }

    #[test]
    fn missing_models_reports_the_absent_subset() {
        let mut installed = BTreeSet::new();
        installed.insert("phi3:mini".to_string());
        assert_eq!(
            missing_models(&installed),
            vec!["goekdenizguelmez/JOSIEFIED-Qwen3"]
        );
        for m in DATA_MODELS {
            installed.insert(m.to_string());
        }
        assert!(missing_models(&installed).is_empty());
    }
}
