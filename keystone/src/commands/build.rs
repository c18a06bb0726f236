//! `keystone` build command: CLI flags → composed command → NsJail.

use anyhow::Result;
use keystone_core::config::BuildDefaults;
use keystone_sandbox::{BuildRequest, ExecutionRecord, NsjailRunner, SandboxConfig};
use std::path::PathBuf;

use crate::cli::Cli;

/// Target, variant and goals: CLI values win, then env, then built-in defaults.
pub fn build_request(cli: &Cli, defaults: BuildDefaults) -> BuildRequest {
    let goals = if cli.goals.is_empty() {
        defaults.goals
    } else {
        cli.goals.clone()
    };
    BuildRequest::new(
        cli.android_target
            .clone()
            .unwrap_or(defaults.android_target),
        cli.variant.clone().unwrap_or(defaults.variant),
        goals,
    )
}

pub fn sandbox_config(cli: &Cli, android_target: &str, source_dir: PathBuf) -> SandboxConfig {
    SandboxConfig {
        nsjail_bin: cli.nsjail_bin.clone(),
        chroot: cli.chroot.clone(),
        source_dir,
        android_target: android_target.to_string(),
        dist_dir: cli.dist_dir.clone(),
        build_id: cli.build_id.clone(),
        max_cpus: cli.max_cpus,
    }
}

/// Render the execution record for stdout: one command per line, or JSON.
pub fn format_record(record: &ExecutionRecord, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(record)?);
    }
    Ok(record
        .commands()
        .iter()
        .map(|cmd| cmd.join(" "))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Build the selected target. `source_dir` is the Android source tree root
/// (the caller's working directory), passed in explicitly.
pub fn cmd_build(cli: &Cli, source_dir: PathBuf) -> Result<()> {
    let request = build_request(cli, BuildDefaults::from_env());
    let config = sandbox_config(cli, &request.target, source_dir);
    let command = request.compose();

    tracing::debug!(
        target_variant = %format!("{}-{}", request.target, request.variant),
        goals = ?request.goals,
        "Composed build command"
    );

    let runner = NsjailRunner::new().dry_run(cli.dry_run);
    let record = keystone_sandbox::execute(&runner, &command, &config)?;

    let out = format_record(&record, cli.json)?;
    if !out.is_empty() {
        println!("{}", out);
    }
    Ok(())
}
