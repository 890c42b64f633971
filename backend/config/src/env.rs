//! Environment handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside the YAML file, resolved at load time.
//!   Only uppercase `[A-Z_][A-Z0-9_]*` names are matched; `$${VAR}` escapes
//!   to a literal `${VAR}`.
//! - Well-known variables (`VISIONQUEST_*`, plus the `VITE_*`/`SUPABASE_*`
//!   names the hosted front end used) overlaid on top of the file.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::VisionQuestConfig;

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

pub const DETECTION_URL_VARS: &[&str] = &["VISIONQUEST_DETECTION_URL", "VITE_YOLO_API_URL"];
pub const WAKE_URL_VARS: &[&str] = &["VISIONQUEST_WAKE_URL"];
pub const INSIGHT_KEY_VARS: &[&str] = &["VISIONQUEST_API_KEY", "GEMINI_API_KEY", "API_KEY"];
pub const REMOTE_URL_VARS: &[&str] = &[
    "VISIONQUEST_SUPABASE_URL",
    "SUPABASE_URL",
    "VITE_SUPABASE_URL",
];
pub const REMOTE_KEY_VARS: &[&str] = &[
    "VISIONQUEST_SUPABASE_ANON_KEY",
    "SUPABASE_ANON_KEY",
    "VITE_SUPABASE_ANON_KEY",
];
pub const HISTORY_PATH_VARS: &[&str] = &["VISIONQUEST_HISTORY_PATH"];
pub const LOG_DIR_VARS: &[&str] = &["VISIONQUEST_LOG_DIR"];

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Substitute `${VAR}` references in a config value tree using `env`.
///
/// Fails if a referenced variable is unset or empty.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            // escaped: `$${NAME}` stays literal as `${NAME}`
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Collect all env var names referenced in a config value tree.
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    let mut vars = Vec::new();
    collect_vars_recursive(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

fn collect_vars_recursive(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            for caps in ENV_VAR_PATTERN.captures_iter(s) {
                if caps[1].is_empty() {
                    out.push(caps[2].to_string());
                }
            }
        }
        Value::Array(arr) => arr.iter().for_each(|v| collect_vars_recursive(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_vars_recursive(v, out)),
        _ => {}
    }
}

/// First non-empty value among `names`.
fn first_set(env: &HashMap<String, String>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env.get(*name))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Overlay well-known environment variables on top of a parsed config.
///
/// Environment wins over the file; unset or empty variables leave the file value.
pub fn apply_env_overrides(
    mut config: VisionQuestConfig,
    env: &HashMap<String, String>,
) -> VisionQuestConfig {
    if let Some(v) = first_set(env, DETECTION_URL_VARS) {
        config.detection.endpoint_url = Some(v);
    }
    if let Some(v) = first_set(env, WAKE_URL_VARS) {
        config.detection.wake_url = Some(v);
    }
    if let Some(v) = first_set(env, INSIGHT_KEY_VARS) {
        config.insight.api_key = Some(v);
    }
    if let Some(v) = first_set(env, REMOTE_URL_VARS) {
        config.remote.url = Some(v);
    }
    if let Some(v) = first_set(env, REMOTE_KEY_VARS) {
        config.remote.public_key = Some(v);
    }
    if let Some(v) = first_set(env, HISTORY_PATH_VARS) {
        config.history.path = Some(v);
    }
    if let Some(v) = first_set(env, LOG_DIR_VARS) {
        config.logging.dir = Some(v);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_var() {
        let v = json!({"insight": {"apiKey": "${MY_KEY}"}});
        let result = resolve_env_vars_with(&v, &env(&[("MY_KEY", "secret")])).unwrap();
        assert_eq!(result["insight"]["apiKey"], "secret");
    }

    #[test]
    fn missing_var_names_config_path() {
        let v = json!({"remote": {"url": "${NOPE}"}});
        let err = resolve_env_vars_with(&v, &env(&[])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("NOPE"));
        assert!(msg.contains("remote.url"));
    }

    #[test]
    fn escaped_reference_stays_literal() {
        let v = json!({"a": "$${KEEP_ME}"});
        let result = resolve_env_vars_with(&v, &env(&[])).unwrap();
        assert_eq!(result["a"], "${KEEP_ME}");
        assert!(collect_referenced_vars(&v).is_empty());
    }

    #[test]
    fn collects_referenced_vars() {
        let v = json!({"a": "${FOO}", "b": {"c": "x-${BAR}-${FOO}"}});
        assert_eq!(collect_referenced_vars(&v), vec!["BAR", "FOO"]);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = VisionQuestConfig::default();
        config.detection.endpoint_url = Some("http://file/predict".into());
        let config = apply_env_overrides(
            config,
            &env(&[
                ("VITE_YOLO_API_URL", "http://env/predict"),
                ("SUPABASE_URL", "https://abc.supabase.co"),
                ("VISIONQUEST_API_KEY", ""),
                ("GEMINI_API_KEY", "g-key"),
            ]),
        );
        assert_eq!(config.detection.endpoint_url.as_deref(), Some("http://env/predict"));
        assert_eq!(config.remote.url.as_deref(), Some("https://abc.supabase.co"));
        assert_eq!(config.insight.api_key.as_deref(), Some("g-key"));
        assert!(config.remote.public_key.is_none());
    }
}
