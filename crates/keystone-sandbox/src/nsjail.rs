//! NsJail runner: launches the build under the external `nsjail` binary.
//!
//! Isolation (mount namespace, chroot, CPU limiting) is done entirely by
//! nsjail. This module only builds its command line and supervises the
//! process.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::common::{wait_streaming_stderr, STDERR_TAIL_BYTES};
use crate::error::SandboxError;
use crate::runner::{ExecutionRecord, SandboxRequest};
use crate::sandbox_runner::SandboxRunner;

/// Mount point of the source tree inside the sandbox.
pub const SANDBOX_SOURCE_DIR: &str = "/src";

/// Mount point of the dist directory inside the sandbox.
pub const SANDBOX_DIST_DIR: &str = "/dist";

/// User name the build sees inside the sandbox.
pub const SANDBOX_USER: &str = "android-build";

/// Runs builds through nsjail. With `dry_run` set, reports the command that
/// would run without spawning anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NsjailRunner {
    dry_run: bool,
}

impl NsjailRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Full nsjail invocation for `request`, starting with `nsjail_bin`.
pub fn nsjail_command(nsjail_bin: &Path, request: &SandboxRequest<'_>) -> Vec<String> {
    let path = |p: &Path| p.to_string_lossy().into_owned();
    let mut cmd = vec![path(nsjail_bin)];

    cmd.extend(["--chroot".to_string(), path(request.chroot)]);
    cmd.extend([
        "--bindmount".to_string(),
        format!("{}:{}", path(request.source_dir), SANDBOX_SOURCE_DIR),
    ]);
    cmd.extend([
        "--bindmount".to_string(),
        format!("{}:{}", path(request.dist_dir), SANDBOX_DIST_DIR),
    ]);
    cmd.extend(["--cwd".to_string(), SANDBOX_SOURCE_DIR.to_string()]);

    for (key, value) in [
        ("USER", SANDBOX_USER),
        ("BUILD_NUMBER", request.build_id),
        ("DIST_DIR", SANDBOX_DIST_DIR),
        ("TARGET_PRODUCT", request.android_target),
    ] {
        cmd.extend(["--env".to_string(), format!("{}={}", key, value)]);
    }

    cmd.extend(["--max_cpus".to_string(), request.max_cpus.to_string()]);

    // A platform build needs the host's limits, not nsjail's small defaults.
    for rlimit in [
        "--rlimit_as",
        "--rlimit_core",
        "--rlimit_cpu",
        "--rlimit_fsize",
        "--rlimit_nofile",
    ] {
        cmd.extend([rlimit.to_string(), "soft".to_string()]);
    }
    cmd.extend(["--time_limit".to_string(), "0".to_string()]);
    cmd.push("--disable_clone_newcgroup".to_string());
    cmd.push("--quiet".to_string());

    cmd.push("--".to_string());
    cmd.extend(request.command.iter().cloned());
    cmd
}

/// Resolve the nsjail binary: bare names are looked up on PATH, anything
/// with a path separator must exist as given.
fn resolve_binary(nsjail_bin: &Path) -> Result<PathBuf, SandboxError> {
    let setup_err =
        |source: Box<dyn std::error::Error + Send + Sync>| SandboxError::IsolationSetup {
            binary: nsjail_bin.display().to_string(),
            source,
        };
    if nsjail_bin.components().count() == 1 && !nsjail_bin.is_absolute() {
        return which::which(nsjail_bin).map_err(|e| setup_err(Box::new(e)));
    }
    if nsjail_bin.is_file() {
        Ok(nsjail_bin.to_path_buf())
    } else {
        Err(setup_err("binary not found".into()))
    }
}

/// Parameter checks that do not touch the filesystem.
fn check_request(request: &SandboxRequest<'_>) -> Result<(), SandboxError> {
    if request.max_cpus == 0 {
        return Err(SandboxError::Configuration(
            "max_cpus must be a positive integer".to_string(),
        ));
    }
    if request.command.is_empty() {
        return Err(SandboxError::Configuration("empty build command".to_string()));
    }
    Ok(())
}

/// Host paths the sandbox mounts. The dist directory is created on demand.
fn prepare_host_paths(request: &SandboxRequest<'_>) -> Result<(), SandboxError> {
    if !request.chroot.is_dir() {
        return Err(SandboxError::Configuration(format!(
            "chroot is not a directory: {}",
            request.chroot.display()
        )));
    }
    if !request.source_dir.is_dir() {
        return Err(SandboxError::Configuration(format!(
            "source directory does not exist: {}",
            request.source_dir.display()
        )));
    }
    fs::create_dir_all(request.dist_dir).map_err(|e| {
        SandboxError::Configuration(format!(
            "cannot create dist directory {}: {}",
            request.dist_dir.display(),
            e
        ))
    })
}

impl SandboxRunner for NsjailRunner {
    fn name(&self) -> &str {
        "nsjail"
    }

    fn run(&self, request: &SandboxRequest<'_>) -> Result<ExecutionRecord, SandboxError> {
        check_request(request)?;

        if self.dry_run {
            let cmd = nsjail_command(request.nsjail_bin, request);
            crate::info_log!(command = %cmd.join(" "), "Dry run: nsjail not started");
            return Ok(ExecutionRecord::new(vec![cmd]));
        }

        prepare_host_paths(request)?;
        let nsjail_bin = resolve_binary(request.nsjail_bin)?;
        let cmd = nsjail_command(&nsjail_bin, request);
        tracing::debug!(command = ?cmd, "Spawning nsjail");

        let mut child = Command::new(&nsjail_bin)
            .args(&cmd[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SandboxError::IsolationSetup {
                binary: nsjail_bin.display().to_string(),
                source: Box::new(e),
            })?;

        let (exit_code, stderr) =
            wait_streaming_stderr(&mut child, STDERR_TAIL_BYTES).map_err(|e| {
                SandboxError::IsolationSetup {
                    binary: nsjail_bin.display().to_string(),
                    source: Box::new(e),
                }
            })?;

        if exit_code != Some(0) {
            return Err(SandboxError::ExecutionFailure {
                command: cmd,
                exit_code,
                stderr,
            });
        }

        Ok(ExecutionRecord::new(vec![cmd]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::compose;
    use crate::runner::SandboxConfig;

    fn config(chroot: &Path, source: &Path, dist: &Path, nsjail_bin: &str) -> SandboxConfig {
        SandboxConfig {
            nsjail_bin: PathBuf::from(nsjail_bin),
            chroot: chroot.to_path_buf(),
            source_dir: source.to_path_buf(),
            android_target: "cloud_x86_64".to_string(),
            dist_dir: dist.to_path_buf(),
            build_id: "12345".to_string(),
            max_cpus: 8,
        }
    }

    #[test]
    fn test_nsjail_command_layout() {
        let command = compose("cloud_x86_64", "userdebug", &["droid", "dist"]);
        let cfg = config(
            Path::new("/mnt/chroot"),
            Path::new("/work/aosp"),
            Path::new("/dist"),
            "/bin/nsjail",
        );
        let request = SandboxRequest::new(&command, &cfg);
        let cmd = nsjail_command(request.nsjail_bin, &request);

        assert_eq!(cmd[0], "/bin/nsjail");
        assert_eq!(&cmd[1..3], ["--chroot", "/mnt/chroot"]);
        assert_eq!(&cmd[3..5], ["--bindmount", "/work/aosp:/src"]);
        assert_eq!(&cmd[5..7], ["--bindmount", "/dist:/dist"]);
        assert!(cmd.contains(&"BUILD_NUMBER=12345".to_string()));
        assert!(cmd.contains(&"TARGET_PRODUCT=cloud_x86_64".to_string()));

        let cpus = cmd.iter().position(|t| t == "--max_cpus").unwrap();
        assert_eq!(cmd[cpus + 1], "8");

        let sep = cmd.iter().position(|t| t == "--").unwrap();
        assert_eq!(&cmd[sep + 1..], command.tokens());
    }

    #[test]
    fn test_dry_run_does_not_spawn() {
        let command = compose("cloud_x86_64", "userdebug", &["droid"]);
        let cfg = config(
            Path::new("/nonexistent/chroot"),
            Path::new("/nonexistent/src"),
            Path::new("/nonexistent/dist"),
            "/nonexistent/nsjail",
        );
        let runner = NsjailRunner::new().dry_run(true);
        let record = runner.run(&SandboxRequest::new(&command, &cfg)).unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record.commands()[0][0], "/nonexistent/nsjail");
        assert!(!Path::new("/nonexistent/dist").exists());
    }

    #[test]
    fn test_zero_cpus_rejected_even_in_dry_run() {
        let command = compose("t", "v", &["droid"]);
        let mut cfg = config(Path::new("/c"), Path::new("/s"), Path::new("/d"), "nsjail");
        cfg.max_cpus = 0;
        let err = NsjailRunner::new()
            .dry_run(true)
            .run(&SandboxRequest::new(&command, &cfg))
            .unwrap_err();
        assert!(matches!(err, SandboxError::Configuration(_)));
    }

    #[test]
    fn test_missing_chroot_is_configuration_error() {
        let tmp = tempfile::tempdir().unwrap();
        let command = compose("t", "v", &["droid"]);
        let cfg = config(
            &tmp.path().join("no-chroot"),
            tmp.path(),
            &tmp.path().join("dist"),
            "/bin/true",
        );
        let err = NsjailRunner::new()
            .run(&SandboxRequest::new(&command, &cfg))
            .unwrap_err();
        assert!(matches!(err, SandboxError::Configuration(ref m) if m.contains("chroot")));
    }

    #[test]
    fn test_missing_binary_is_isolation_setup_error() {
        let tmp = tempfile::tempdir().unwrap();
        let command = compose("t", "v", &["droid"]);
        let cfg = config(
            tmp.path(),
            tmp.path(),
            &tmp.path().join("dist"),
            "/nonexistent/bin/nsjail",
        );
        let err = NsjailRunner::new()
            .run(&SandboxRequest::new(&command, &cfg))
            .unwrap_err();
        assert!(matches!(err, SandboxError::IsolationSetup { .. }));
        assert!(tmp.path().join("dist").is_dir());
    }

    #[test]
    fn test_unknown_bare_name_is_isolation_setup_error() {
        let tmp = tempfile::tempdir().unwrap();
        let command = compose("t", "v", &["droid"]);
        let cfg = config(
            tmp.path(),
            tmp.path(),
            tmp.path(),
            "keystone-no-such-nsjail-binary",
        );
        let err = NsjailRunner::new()
            .run(&SandboxRequest::new(&command, &cfg))
            .unwrap_err();
        assert!(matches!(err, SandboxError::IsolationSetup { .. }));
    }

    // `true`/`false` ignore their arguments, which stands in for an nsjail
    // run that succeeds or fails.
    #[cfg(unix)]
    #[test]
    fn test_successful_run_records_command() {
        let tmp = tempfile::tempdir().unwrap();
        let command = compose("cloud_x86_64", "userdebug", &["droid"]);
        let cfg = config(tmp.path(), tmp.path(), &tmp.path().join("dist"), "true");
        let record = NsjailRunner::new()
            .run(&SandboxRequest::new(&command, &cfg))
            .unwrap();
        assert_eq!(record.len(), 1);
        assert!(record.commands()[0][0].ends_with("true"));
        assert_eq!(record.commands()[0].last().unwrap(), "droid");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_run_is_execution_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let command = compose("cloud_x86_64", "userdebug", &["droid"]);
        let cfg = config(tmp.path(), tmp.path(), tmp.path(), "false");
        let err = NsjailRunner::new()
            .run(&SandboxRequest::new(&command, &cfg))
            .unwrap_err();
        match err {
            SandboxError::ExecutionFailure {
                exit_code, command, ..
            } => {
                assert_eq!(exit_code, Some(1));
                assert!(command.contains(&"--max_cpus".to_string()));
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }
}
