//! Environment loading helpers.
//!
//! Keeps the primary-then-alias fallback chain in one place so call sites
//! never repeat `or_else` ladders.

use anyhow::{Context, Result};
use std::env;
use std::path::Path;

/// Parse `.env` content into key/value pairs.
///
/// Blank lines and `#` comments are skipped, surrounding quotes are removed
/// and an unquoted trailing `# comment` is stripped.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Load `<dir>/.env` into the process environment without overriding
/// variables that are already set. Returns how many variables were applied.
///
/// A missing file is not an error. Call before any threads are spawned.
pub fn load_dotenv_from_dir(dir: &Path) -> Result<usize> {
    let path = dir.join(".env");
    if !path.is_file() {
        return Ok(0);
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut applied = 0;
    for (key, value) in parse_dotenv(&content) {
        if env::var_os(&key).is_none() {
            env::set_var(&key, &value);
            applied += 1;
        }
    }
    tracing::debug!(path = %path.display(), applied, "Loaded .env");
    Ok(applied)
}

/// Read the primary variable or the first set alias, falling back to `default`.
/// Empty values count as unset.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env_optional(primary, aliases).unwrap_or_else(default)
}

/// Read the primary variable or the first set alias (empty values → None).
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .and_then(|s| {
            let s = s.trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        })
}

/// Boolean env var: 0/false/no/off are false, any other value is true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    let v = env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()));
    match v.as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}
