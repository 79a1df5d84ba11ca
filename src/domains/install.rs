//! Install domain: system packages and runtimes.
//!
//! Most targets are plain apt packages checked via dpkg. `apt-get update`
//! runs at most once per invocation, tracked in the ExecutionContext.
//! Mutating commands are prefixed with sudo when not running as root.

use anyhow::{anyhow, bail, Result};
use nix::unistd::Uid;

use crate::command_runner::{command_exists, display_command, CommandOptions};
use crate::context::ExecutionContext;
use crate::engine::{Bundle, Domain, Registry, Target};
use crate::output::Output;

/// Build the install registry: targets first, then bundles.
pub fn registry() -> Registry {
    let mut registry = Registry::new(Domain::Install);

    registry.add(apt_target(
        "curl",
        "Command-line HTTP client",
        Some(&["curl", "--version"]),
    ));
    registry.add(apt_target(
        "git",
        "Git version control",
        Some(&["git", "--version"]),
    ));
    registry.add(apt_target("ca-certificates", "CA certificates", None));
    registry.add(apt_target(
        "unzip",
        "Zip extraction utility",
        Some(&["unzip", "-v"]),
    ));
    registry.add(apt_target("build-essential", "Build tools", None));
    registry.add(apt_target(
        "python3",
        "Python 3",
        Some(&["python3", "--version"]),
    ));
    registry.add(apt_target("python3-venv", "Python venv support", None));
    registry.add(apt_target(
        "python3-pip",
        "Python package installer",
        Some(&["pip3", "--version"]),
    ));

    // Node via Ubuntu's nodejs package for stability on servers.
    registry.add(Target {
        id: "node".to_string(),
        description: "Node.js runtime".to_string(),
        dependencies: Vec::new(),
        check: Box::new(|ctx| dpkg_installed(ctx, "nodejs")),
        apply: Box::new(|ctx| apt_install(ctx, &["nodejs"])),
        verify: Box::new(|ctx| probe(ctx, "node", &["--version"])),
        diagnose: None,
    });

    registry.add(Target {
        id: "ollama".to_string(),
        description: "Ollama local model runner".to_string(),
        dependencies: vec!["curl".to_string(), "ca-certificates".to_string()],
        check: Box::new(|_| command_exists("ollama")),
        apply: Box::new(install_ollama),
        verify: Box::new(verify_ollama),
        diagnose: None,
    });

    registry.add_bundle(Bundle::new(
        "base",
        [
            "curl",
            "git",
            "ca-certificates",
            "unzip",
            "build-essential",
            "python3",
            "python3-venv",
            "python3-pip",
        ],
    ));
    registry.add_bundle(Bundle::new("web", ["node"]));
    registry.add_bundle(Bundle::new("ai", ["ollama"]));
    registry.add_bundle(Bundle::new("full", ["base", "web", "ai"]));

    registry
}

/// Default doctor set: the base, web and ai bundle members, first
/// occurrence wins.
pub fn doctor_targets(registry: &Registry) -> Vec<String> {
    let mut ids = Vec::new();
    for bundle_id in ["base", "web", "ai"] {
        if let Some(bundle) = registry.bundle(bundle_id) {
            for member in &bundle.members {
                if !ids.contains(member) {
                    ids.push(member.clone());
                }
            }
        }
    }
    ids
}

fn apt_target(pkg: &str, description: &str, probe_cmd: Option<&'static [&'static str]>) -> Target {
    let check_pkg = pkg.to_string();
    let apply_pkg = pkg.to_string();
    Target {
        id: pkg.to_string(),
        description: description.to_string(),
        dependencies: Vec::new(),
        check: Box::new(move |ctx| dpkg_installed(ctx, &check_pkg)),
        apply: Box::new(move |ctx| apt_install(ctx, &[apply_pkg.as_str()])),
        verify: match probe_cmd {
            Some(cmd) => Box::new(move |ctx| probe(ctx, cmd[0], &cmd[1..])),
            None => Box::new(|_| Ok(())),
        },
        diagnose: None,
    }
}

fn install_ollama(ctx: &ExecutionContext) -> Result<()> {
    let prefix = sudo_prefix()?;
    let install = compose(
        &prefix,
        &["sh", "-c", "curl -fsSL https://ollama.com/install.sh | sh"],
    );
    run_system(ctx, &install)?;
    let enable = compose(&prefix, &["systemctl", "enable", "--now", "ollama"]);
    run_system(ctx, &enable)
}

fn verify_ollama(ctx: &ExecutionContext) -> Result<()> {
    probe(ctx, "ollama", &["--version"])?;
    // An installed binary with a dead service still cannot serve models.
    if command_exists("systemctl") {
        let output = ctx.runner().run_output(
            "systemctl",
            &["is-active", "ollama"],
            &CommandOptions::default(),
        )?;
        if !output.status.success() {
            bail!("ollama service inactive");
        }
    }
    Ok(())
}

/// dpkg's view of whether a package is installed. Probe failures (dpkg
/// absent, non-Debian host) read as not installed.
fn dpkg_installed(ctx: &ExecutionContext, pkg: &str) -> bool {
    ctx.runner()
        .run_output("dpkg", &["-s", pkg], &CommandOptions::default())
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Install packages via apt, running `apt-get update` first if this
/// invocation has not yet.
fn apt_install(ctx: &ExecutionContext, pkgs: &[&str]) -> Result<()> {
    apt_update(ctx)?;
    let prefix = sudo_prefix()?;
    let mut cmd = compose(&prefix, &["apt-get", "install", "-y"]);
    cmd.extend(pkgs.iter().map(|p| p.to_string()));
    run_apt(ctx, &cmd, &format!("apt-get install failed: {}", pkgs.join(" ")))
}

fn apt_update(ctx: &ExecutionContext) -> Result<()> {
    if ctx.apt_updated() {
        return Ok(());
    }
    let prefix = sudo_prefix()?;
    let cmd = compose(&prefix, &["apt-get", "update"]);
    run_apt(ctx, &cmd, "apt-get update failed")?;
    ctx.mark_apt_updated();
    Ok(())
}

/// Run an apt command noninteractively, decorating failures with the
/// usual operator hints.
fn run_apt(ctx: &ExecutionContext, cmd: &[String], failure: &str) -> Result<()> {
    let options = CommandOptions::with_env("DEBIAN_FRONTEND", "noninteractive");
    match run_system_with(ctx, cmd, &options) {
        Ok(()) => Ok(()),
        Err(RunError::Spawn(err)) => Err(err),
        Err(RunError::Exit(stderr)) => Err(anyhow!("{}", apt_failure(failure, &stderr, ctx.debug))),
    }
}

fn apt_failure(base: &str, stderr: &str, debug: bool) -> String {
    let mut msg = base.to_string();
    if stderr.contains("Could not get lock")
        || stderr.contains("Unable to acquire the dpkg frontend lock")
    {
        msg.push_str("\nAPT is locked; another apt/dpkg process is running; wait and retry.");
    }
    if stderr.to_lowercase().contains("permission denied") {
        msg.push_str("\nPermission denied; try running with sudo.");
    }
    if debug && !stderr.is_empty() {
        msg.push('\n');
        msg.push_str(stderr);
    }
    msg
}

/// Run a mutating system command; failures carry the rendered command line.
fn run_system(ctx: &ExecutionContext, cmd: &[String]) -> Result<()> {
    match run_system_with(ctx, cmd, &CommandOptions::default()) {
        Ok(()) => Ok(()),
        Err(RunError::Spawn(err)) => Err(err),
        Err(RunError::Exit(stderr)) => {
            let args: Vec<&str> = cmd.iter().map(String::as_str).collect();
            let mut msg = format!("Command failed: {}", display_command(args[0], &args[1..]));
            if ctx.debug && !stderr.is_empty() {
                msg.push('\n');
                msg.push_str(&stderr);
            }
            Err(anyhow!(msg))
        }
    }
}

enum RunError {
    /// The command could not be spawned at all.
    Spawn(anyhow::Error),
    /// The command ran and exited non-zero; payload is captured stderr
    /// (empty under --debug, where stdio is inherited).
    Exit(String),
}

fn run_system_with(
    ctx: &ExecutionContext,
    cmd: &[String],
    options: &CommandOptions,
) -> std::result::Result<(), RunError> {
    let args: Vec<&str> = cmd.iter().map(String::as_str).collect();
    let (&program, rest) = args
        .split_first()
        .expect("system commands are never empty");
    if ctx.debug {
        let status = ctx
            .runner()
            .run_status(program, rest, options)
            .map_err(RunError::Spawn)?;
        if status.success() {
            Ok(())
        } else {
            Err(RunError::Exit(String::new()))
        }
    } else {
        let output = ctx
            .runner()
            .run_output(program, rest, options)
            .map_err(RunError::Spawn)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(RunError::Exit(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }
}

/// Read-only verification probe, quiet unless --debug.
fn probe(ctx: &ExecutionContext, program: &str, args: &[&str]) -> Result<()> {
    let ok = if ctx.debug {
        ctx.runner()
            .run_status(program, args, &CommandOptions::default())?
            .success()
    } else {
        ctx.runner()
            .run_output(program, args, &CommandOptions::default())?
            .status
            .success()
    };
    if ok {
        Ok(())
    } else {
        bail!("Command failed: {}", display_command(program, args))
    }
}

/// Privilege prefix for mutating commands: empty when root, `sudo` when
/// available, an error otherwise.
fn sudo_prefix() -> Result<Vec<String>> {
    if Uid::effective().is_root() {
        return Ok(Vec::new());
    }
    if command_exists("sudo") {
        Output::info("sudo required");
        return Ok(vec!["sudo".to_string()]);
    }
    bail!("sudo not found; run as root or install sudo.")
}

fn compose(prefix: &[String], cmd: &[&str]) -> Vec<String> {
    let mut full: Vec<String> = prefix.to_vec();
    full.extend(cmd.iter().map(|s| s.to_string()));
    full
}
