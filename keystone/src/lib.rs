//! Keystone CLI library — argument parsing and dispatch for the `keystone` binary.

pub mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use keystone_sandbox::SandboxError;

/// Run the CLI — loads `.env`, initializes tracing, parses args and builds.
///
/// Busytown runs every build with the root of the Android source tree as
/// the working directory; that directory is read here, once, and handed to
/// the build as its source tree.
pub fn run_cli() -> Result<()> {
    let source_dir = std::env::current_dir().context("Failed to read current directory")?;
    keystone_core::config::load_dotenv_from_dir(&source_dir)?;
    keystone_core::observability::init_tracing();

    let cli = Cli::parse();
    commands::build::cmd_build(&cli, source_dir)
}

/// Process exit status for an error returned by [`run_cli`].
///
/// A [`SandboxError`] anywhere in the chain picks the status; anything else is 1.
pub fn exit_status(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<SandboxError>()
        .map(SandboxError::exit_status)
        .unwrap_or(1)
}
