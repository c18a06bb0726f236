//! SandboxRunner trait: extension point for isolation layers.
//!
//! The production runner is [`crate::nsjail::NsjailRunner`]. Tests inject a
//! recording fake; other isolation tools (bwrap, a remote executor) plug in
//! the same way.

use crate::error::SandboxError;
use crate::runner::{ExecutionRecord, SandboxRequest};

/// Isolation layer that executes one command inside a sandbox.
///
/// Implementations run `request.command` with `request.chroot` as the root
/// filesystem, `request.source_dir` available as the source tree, at most
/// `request.max_cpus` CPUs, and artifacts written under `request.dist_dir`.
/// They return every sub-command they ran, in order.
pub trait SandboxRunner {
    /// Runner name for logging and audit records.
    fn name(&self) -> &str;

    /// Execute the request. Called at most once per build.
    fn run(&self, request: &SandboxRequest<'_>) -> Result<ExecutionRecord, SandboxError>;
}

impl<R: SandboxRunner + ?Sized> SandboxRunner for &R {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&self, request: &SandboxRequest<'_>) -> Result<ExecutionRecord, SandboxError> {
        (**self).run(request)
    }
}

impl<R: SandboxRunner + ?Sized> SandboxRunner for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&self, request: &SandboxRequest<'_>) -> Result<ExecutionRecord, SandboxError> {
        (**self).run(request)
    }
}
