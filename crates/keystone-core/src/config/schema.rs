//! Config structs grouped by concern, loaded from the environment.

use super::env_keys::{build as build_keys, observability as obv_keys};
use super::loader::{env_bool, env_optional, env_or};

/// Target built when neither the CLI nor the environment names one.
pub const DEFAULT_ANDROID_TARGET: &str = "cloud_x86_64";

/// Variant built when neither the CLI nor the environment names one.
pub const DEFAULT_VARIANT: &str = "userdebug";

/// The default set of build goals and options for a Keystone target.
pub const DEFAULT_BUILD_GOALS: &[&str] = &["droid", "dist", "platform_tests"];

/// Observability: quiet, log_level, log_json, audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    /// Read once per process; later calls return the cached value.
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| Self {
            quiet: env_bool(obv_keys::KEYSTONE_QUIET, obv_keys::QUIET_ALIASES, false),
            log_level: env_or(
                obv_keys::KEYSTONE_LOG_LEVEL,
                obv_keys::LOG_LEVEL_ALIASES,
                || "keystone=info,keystone_sandbox=info".to_string(),
            ),
            log_json: env_bool(obv_keys::KEYSTONE_LOG_JSON, obv_keys::LOG_JSON_ALIASES, false),
            audit_log: env_optional(obv_keys::KEYSTONE_AUDIT_LOG, obv_keys::AUDIT_LOG_ALIASES),
        })
    }
}

/// Target/variant/goal selection used when the CLI does not override it.
///
/// The goal list is an owned copy of [`DEFAULT_BUILD_GOALS`] per load, so no
/// two builds ever share a mutable list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDefaults {
    pub android_target: String,
    pub variant: String,
    pub goals: Vec<String>,
}

impl Default for BuildDefaults {
    fn default() -> Self {
        Self {
            android_target: DEFAULT_ANDROID_TARGET.to_string(),
            variant: DEFAULT_VARIANT.to_string(),
            goals: DEFAULT_BUILD_GOALS.iter().map(|g| g.to_string()).collect(),
        }
    }
}

impl BuildDefaults {
    pub fn from_env() -> Self {
        let base = Self::default();
        let goals = env_optional(build_keys::KEYSTONE_BUILD_GOALS, &[])
            .map(|s| parse_goal_list(&s))
            .unwrap_or(base.goals);
        Self {
            android_target: env_or(build_keys::KEYSTONE_ANDROID_TARGET, &[], || {
                base.android_target
            }),
            variant: env_or(build_keys::KEYSTONE_VARIANT, &[], || base.variant),
            goals,
        }
    }
}

/// Split a goal list on commas and/or whitespace, dropping empty entries.
///
/// Accepts both `droid,dist` and the default's own `droid dist platform_tests`.
fn parse_goal_list(s: &str) -> Vec<String> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}
