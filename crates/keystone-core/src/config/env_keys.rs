//! Environment variable keys and aliases.
//!
//! Primary names use the `KEYSTONE_*` prefix. The `BUSYTOWN_*` aliases are
//! what older build host configs export.

/// Observability and logging
pub mod observability {
    pub const KEYSTONE_QUIET: &str = "KEYSTONE_QUIET";
    pub const QUIET_ALIASES: &[&str] = &["BUSYTOWN_QUIET"];

    pub const KEYSTONE_LOG_LEVEL: &str = "KEYSTONE_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &["BUSYTOWN_LOG_LEVEL"];

    pub const KEYSTONE_LOG_JSON: &str = "KEYSTONE_LOG_JSON";
    pub const LOG_JSON_ALIASES: &[&str] = &["BUSYTOWN_LOG_JSON"];

    pub const KEYSTONE_AUDIT_LOG: &str = "KEYSTONE_AUDIT_LOG";
    pub const AUDIT_LOG_ALIASES: &[&str] = &["BUSYTOWN_AUDIT_LOG"];
}

/// Build target selection. The sandbox flags themselves (`--chroot` etc.)
/// are read by clap with `KEYSTONE_*` env fallbacks in the CLI crate.
pub mod build {
    pub const KEYSTONE_ANDROID_TARGET: &str = "KEYSTONE_ANDROID_TARGET";
    pub const KEYSTONE_VARIANT: &str = "KEYSTONE_VARIANT";
    /// Comma-separated list, e.g. "droid,dist".
    pub const KEYSTONE_BUILD_GOALS: &str = "KEYSTONE_BUILD_GOALS";
}
