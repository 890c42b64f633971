//! `visionquest-config`: VisionQuest configuration.
//!
//! Provides:
//! - Typed config schema (detection, insight, remote, history, logging, viewer)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution and well-known env var overlay
//! - Default value application
//! - Validation report
//! - Redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides, collect_referenced_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use redact::redact;
pub use schema::{
    DetectionConfig, HistoryBackend, HistoryConfig, InsightConfig, LoggingConfig, RemoteConfig,
    ViewerConfig, VisionQuestConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Load, env-substitute, overlay env vars, apply defaults and validate.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<VisionQuestConfig> {
    load_and_prepare_with(path, &env::process_env()).await
}

/// Same as [`load_and_prepare`] with an explicit environment (useful for testing).
pub async fn load_and_prepare_with(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<VisionQuestConfig> {
    let raw = io::load_raw_config(path).await?;
    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;
    let config: VisionQuestConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_env_overrides(config, env);
    let state_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let config = apply_all_defaults(config, state_dir);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if let Some(first) = report.errors.first() {
        for error in &report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
        anyhow::bail!("{first}");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepares_file_with_env_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        tokio::fs::write(
            &path,
            "insight:\n  apiKey: ${TEST_GEMINI_KEY}\nremote:\n  url: https://abc.supabase.co\n",
        )
        .await
        .unwrap();

        let env: HashMap<String, String> = [
            ("TEST_GEMINI_KEY", "g-key"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = load_and_prepare_with(&path, &env).await.unwrap();
        assert_eq!(config.insight_api_key(), Some("g-key"));
        assert_eq!(config.remote_credentials(), Some(("https://abc.supabase.co", "anon")));
        assert_eq!(
            config.history.path.as_deref(),
            Some(dir.path().join("storage").to_string_lossy().as_ref())
        );
    }

    #[tokio::test]
    async fn invalid_endpoint_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        tokio::fs::write(&path, "detection:\n  endpointUrl: not-a-url\n")
            .await
            .unwrap();
        let err = load_and_prepare_with(&path, &HashMap::new()).await.unwrap_err();
        assert!(err.to_string().contains("detection.endpointUrl"));
    }
}
