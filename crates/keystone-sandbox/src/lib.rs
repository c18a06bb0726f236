pub mod command;
pub mod common;
pub mod error;
pub mod log;
pub mod nsjail;
pub mod runner;
pub mod sandbox_runner;

pub use command::{compose, BuildRequest, ComposedCommand};
pub use error::SandboxError;
pub use nsjail::NsjailRunner;
pub use runner::{execute, ExecutionRecord, SandboxConfig, SandboxRequest};
pub use sandbox_runner::SandboxRunner;
