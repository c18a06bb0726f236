use thiserror::Error;

/// Failures of a sandboxed build. All of them originate in the isolation
/// layer; the gateway passes them through unchanged.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// Sandbox parameters rejected before anything was spawned.
    #[error("Invalid sandbox configuration: {0}")]
    Configuration(String),

    /// The sandboxed build exited unsuccessfully.
    #[error("Sandboxed build failed ({}): {stderr}", describe_exit(.exit_code))]
    ExecutionFailure {
        command: Vec<String>,
        /// `None` when the process was terminated by a signal.
        exit_code: Option<i32>,
        /// Tail of the captured stderr.
        stderr: String,
    },

    /// The sandbox could not be constructed (missing binary, spawn failure).
    #[error("Failed to set up sandbox with {binary}: {source}")]
    IsolationSetup {
        binary: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "terminated by signal".to_string(),
    }
}

impl SandboxError {
    /// Process exit status to report for this failure.
    ///
    /// Build failures mirror the sandboxed process's own status; configuration
    /// problems use 2 (usage error); everything else is 1.
    pub fn exit_status(&self) -> i32 {
        match self {
            Self::Configuration(_) => 2,
            Self::ExecutionFailure { exit_code, .. } => match exit_code {
                Some(c) if *c != 0 => *c,
                _ => 1,
            },
            Self::IsolationSetup { .. } => 1,
        }
    }
}
