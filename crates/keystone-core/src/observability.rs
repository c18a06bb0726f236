//! Observability: tracing init and the JSONL audit log.
//!
//! Uses config::ObservabilityConfig for KEYSTONE_QUIET, LOG_LEVEL, LOG_JSON and AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialize tracing. Call at process startup.
/// When KEYSTONE_QUIET=1 only WARN and above are logged. RUST_LOG wins when set.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "keystone=warn,keystone_sandbox=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    // Build output shares stdout with the sandboxed build; logs go to stderr.
    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

fn audit_path() -> Option<String> {
    let path = ObservabilityConfig::from_env().audit_log.clone()?;
    if let Some(parent) = Path::new(&path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    Some(path)
}

fn append_jsonl(path: &str, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn build_invoked_record(
    runner: &str,
    android_target: &str,
    build_id: &str,
    max_cpus: u32,
    command: &[String],
) -> serde_json::Value {
    json!({
        "ts": now(),
        "event": "build_invoked",
        "runner": runner,
        "android_target": android_target,
        "build_id": build_id,
        "max_cpus": max_cpus,
        "command": command,
    })
}

fn build_completed_record(
    runner: &str,
    android_target: &str,
    build_id: &str,
    ok: bool,
    duration_ms: u64,
    commands: usize,
) -> serde_json::Value {
    json!({
        "ts": now(),
        "event": "build_completed",
        "runner": runner,
        "android_target": android_target,
        "build_id": build_id,
        "ok": ok,
        "duration_ms": duration_ms,
        "commands": commands,
    })
}

/// Audit: build_invoked (right before the sandbox runner is called)
pub fn audit_build_invoked(
    runner: &str,
    android_target: &str,
    build_id: &str,
    max_cpus: u32,
    command: &[String],
) {
    if let Some(path) = audit_path() {
        let record = build_invoked_record(runner, android_target, build_id, max_cpus, command);
        append_jsonl(&path, &record);
    }
}

/// Audit: build_completed. `commands` is the length of the execution record (0 on failure).
pub fn audit_build_completed(
    runner: &str,
    android_target: &str,
    build_id: &str,
    ok: bool,
    duration_ms: u64,
    commands: usize,
) {
    if let Some(path) = audit_path() {
        let record =
            build_completed_record(runner, android_target, build_id, ok, duration_ms, commands);
        append_jsonl(&path, &record);
    }
}
