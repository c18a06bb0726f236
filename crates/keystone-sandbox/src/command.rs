//! Keystone build command composition.
//!
//! The command is positional: `build_keystone.sh` reads its arguments by
//! index, so token order is part of the contract.

use serde::Serialize;

/// Entry point of the Keystone build inside the sandbox.
pub const BUILD_SCRIPT: &str = "/src/development/keystone/build_keystone.sh";

/// Root of the Android source tree as mounted inside the sandbox.
pub const SOURCE_ROOT: &str = "/src";

/// Build tool invocation prefix: tool name, then its parallelism flag.
pub const BUILD_TOOL: &[&str] = &["make", "-j"];

/// One target/variant/goals selection. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub target: String,
    pub variant: String,
    pub goals: Vec<String>,
}

impl BuildRequest {
    pub fn new(target: impl Into<String>, variant: impl Into<String>, goals: Vec<String>) -> Self {
        Self {
            target: target.into(),
            variant: variant.into(),
            goals,
        }
    }

    pub fn compose(&self) -> ComposedCommand {
        compose(&self.target, &self.variant, &self.goals)
    }
}

/// Ordered command tokens for a single build invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComposedCommand(Vec<String>);

impl ComposedCommand {
    pub fn tokens(&self) -> &[String] {
        &self.0
    }
}

/// Compose the sandboxed build command.
///
/// Produces `[BUILD_SCRIPT, "<target>-<variant>", SOURCE_ROOT, "make", "-j", goals...]`.
/// `target` and `variant` are joined as given: no validation, no escaping.
pub fn compose<S: AsRef<str>>(target: &str, variant: &str, goals: &[S]) -> ComposedCommand {
    let mut tokens = Vec::with_capacity(3 + BUILD_TOOL.len() + goals.len());
    tokens.push(BUILD_SCRIPT.to_string());
    tokens.push(format!("{}-{}", target, variant));
    tokens.push(SOURCE_ROOT.to_string());
    tokens.extend(BUILD_TOOL.iter().map(|t| t.to_string()));
    tokens.extend(goals.iter().map(|g| g.as_ref().to_string()));
    ComposedCommand(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_example() {
        let cmd = compose("cloud_x86_64", "userdebug", &["droid", "dist"]);
        assert_eq!(
            cmd.tokens(),
            [
                "/src/development/keystone/build_keystone.sh",
                "cloud_x86_64-userdebug",
                "/src",
                "make",
                "-j",
                "droid",
                "dist",
            ]
        );
    }

    #[test]
    fn test_compose_deterministic() {
        let goals = vec!["droid".to_string(), "platform_tests".to_string()];
        let a = compose("aosp_arm64", "eng", &goals);
        let b = compose("aosp_arm64", "eng", &goals);
        assert_eq!(a, b);
    }

    #[test]
    fn test_compose_empty_goals_is_fixed_prefix() {
        let cmd = compose::<&str>("cloud_x86_64", "user", &[]);
        assert_eq!(cmd.tokens().len(), 5);
        assert_eq!(cmd.tokens()[4], "-j");
        assert!(cmd.tokens().iter().all(|t| !t.is_empty()));
    }

    #[test]
    fn test_compose_preserves_goal_order() {
        let goals = ["dist", "droid", "TARGET_BUILD_APPS=Foo", "dist"];
        let cmd = compose("t", "v", &goals);
        assert_eq!(&cmd.tokens()[..3], [BUILD_SCRIPT, "t-v", SOURCE_ROOT]);
        assert_eq!(&cmd.tokens()[3..5], BUILD_TOOL);
        assert_eq!(&cmd.tokens()[5..], goals);
    }

    #[test]
    fn test_compose_does_not_escape_identifiers() {
        let cmd = compose("a b", "c;d", &["x"]);
        assert_eq!(cmd.tokens()[1], "a b-c;d");
    }

    #[test]
    fn test_build_request_compose_matches_free_fn() {
        let req = BuildRequest::new("cloud_x86_64", "userdebug", vec!["droid".to_string()]);
        assert_eq!(req.compose(), compose(&req.target, &req.variant, &req.goals));
    }

    #[test]
    fn test_composed_command_serializes_as_array() {
        let cmd = compose("t", "v", &["g"]);
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json[1], "t-v");
        assert_eq!(json.as_array().unwrap().len(), 6);
    }
}
