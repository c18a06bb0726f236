use clap::Parser;
use std::path::PathBuf;

/// Builds an Android target on a Busytown build host.
///
/// The build runs inside an NsJail sandbox rooted at --chroot, with the
/// current directory (the root of the Android source tree) mounted as /src.
#[derive(Parser, Debug)]
#[command(name = "keystone")]
#[command(author, version, about, long_about)]
pub struct Cli {
    /// Path to NsJail binary.
    #[arg(long = "nsjail_bin", env = "KEYSTONE_NSJAIL_BIN", value_name = "PATH")]
    pub nsjail_bin: PathBuf,

    /// Path to the chroot to be used for building the Android platform.
    /// This will be mounted as the root filesystem in the NsJail sandbox.
    #[arg(long = "chroot", env = "KEYSTONE_CHROOT", value_name = "DIR")]
    pub chroot: PathBuf,

    /// Path to the Android dist directory. This is where Android platform
    /// release artifacts will be written.
    #[arg(long = "dist_dir", env = "KEYSTONE_DIST_DIR", value_name = "DIR")]
    pub dist_dir: PathBuf,

    /// Build identifier that will label the Android platform release artifacts.
    #[arg(long = "build_id", env = "KEYSTONE_BUILD_ID", value_name = "ID")]
    pub build_id: String,

    /// Limit of concurrent CPU cores that the NsJail sandbox can use.
    #[arg(
        long = "max_cpus",
        env = "KEYSTONE_MAX_CPUS",
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_cpus: u32,

    /// Android target to build (default: from KEYSTONE_ANDROID_TARGET or cloud_x86_64)
    #[arg(long = "android_target", value_name = "TARGET")]
    pub android_target: Option<String>,

    /// Build variant (default: from KEYSTONE_VARIANT or userdebug)
    #[arg(long, value_name = "VARIANT")]
    pub variant: Option<String>,

    /// Print the sandbox command instead of running it
    #[arg(long = "dry_run", default_value = "false")]
    pub dry_run: bool,

    /// Print the execution record as JSON
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Build goals and options passed to make; put make options such as -k
    /// after `--` (default: from KEYSTONE_BUILD_GOALS or "droid dist platform_tests")
    #[arg(value_name = "GOAL")]
    pub goals: Vec<String>,
}
