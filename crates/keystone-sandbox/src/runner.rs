use keystone_core::observability;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::command::ComposedCommand;
use crate::error::SandboxError;
use crate::sandbox_runner::SandboxRunner;

/// Sandbox parameters for one build.
///
/// Supplied by the caller and forwarded as-is; the composer never sees it.
/// `max_cpus` must already be validated as positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxConfig {
    /// Path (or bare name on PATH) of the nsjail binary
    pub nsjail_bin: PathBuf,
    /// Root filesystem of the sandbox
    pub chroot: PathBuf,
    /// Android source tree on the host, mounted at `/src`
    pub source_dir: PathBuf,
    /// Target name used to tag build outputs
    pub android_target: String,
    /// Host directory receiving release artifacts
    pub dist_dir: PathBuf,
    /// Build identifier labelling the artifacts
    pub build_id: String,
    /// CPU ceiling enforced by the sandbox
    pub max_cpus: u32,
}

/// Everything the isolation layer's single execution call receives.
#[derive(Debug, Clone, Copy)]
pub struct SandboxRequest<'a> {
    pub nsjail_bin: &'a Path,
    pub chroot: &'a Path,
    pub source_dir: &'a Path,
    pub command: &'a [String],
    pub android_target: &'a str,
    pub dist_dir: &'a Path,
    pub build_id: &'a str,
    pub max_cpus: u32,
}

impl<'a> SandboxRequest<'a> {
    pub fn new(command: &'a ComposedCommand, config: &'a SandboxConfig) -> Self {
        Self {
            nsjail_bin: &config.nsjail_bin,
            chroot: &config.chroot,
            source_dir: &config.source_dir,
            command: command.tokens(),
            android_target: &config.android_target,
            dist_dir: &config.dist_dir,
            build_id: &config.build_id,
            max_cpus: config.max_cpus,
        }
    }
}

/// The isolation layer's account of what it ran, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExecutionRecord(Vec<Vec<String>>);

impl ExecutionRecord {
    pub fn new(commands: Vec<Vec<String>>) -> Self {
        Self(commands)
    }

    pub fn commands(&self) -> &[Vec<String>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Run a composed build command through the sandbox runner.
///
/// Calls `runner.run` exactly once and returns its record or error untouched.
/// No retries, no validation of `config` (that belongs to the caller and the
/// runner). The only additions are a log line and an audit record on each side.
pub fn execute<R: SandboxRunner + ?Sized>(
    runner: &R,
    command: &ComposedCommand,
    config: &SandboxConfig,
) -> Result<ExecutionRecord, SandboxError> {
    let request = SandboxRequest::new(command, config);

    crate::info_log!(
        runner = runner.name(),
        android_target = %config.android_target,
        build_id = %config.build_id,
        max_cpus = config.max_cpus,
        chroot = %config.chroot.display(),
        "Sandboxed build start"
    );
    observability::audit_build_invoked(
        runner.name(),
        &config.android_target,
        &config.build_id,
        config.max_cpus,
        command.tokens(),
    );

    let start = Instant::now();
    let result = runner.run(&request);
    let duration_ms = start.elapsed().as_millis() as u64;

    match &result {
        Ok(record) => {
            crate::info_log!(
                runner = runner.name(),
                commands = record.len(),
                duration_ms,
                "Sandboxed build finished"
            );
        }
        Err(e) => {
            tracing::error!(
                runner = runner.name(),
                duration_ms,
                error = %e,
                "Sandboxed build failed"
            );
        }
    }
    observability::audit_build_completed(
        runner.name(),
        &config.android_target,
        &config.build_id,
        result.is_ok(),
        duration_ms,
        result.as_ref().map(ExecutionRecord::len).unwrap_or(0),
    );

    result
}
