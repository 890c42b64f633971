//! Config validation with user-friendly messages.

use crate::schema::VisionQuestConfig;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &VisionQuestConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_detection(config, &mut report);
    validate_insight(config, &mut report);
    validate_remote(config, &mut report);
    validate_history(config, &mut report);
    report
}

fn is_http_url(s: &str) -> bool {
    let s = s.trim();
    s.starts_with("http://") || s.starts_with("https://")
}

fn validate_detection(config: &VisionQuestConfig, report: &mut ValidationReport) {
    if let Some(url) = &config.detection.endpoint_url {
        if !is_http_url(url) {
            report.error("detection.endpointUrl", format!("'{url}' is not an http(s) URL"));
        }
    }
    if let Some(url) = &config.detection.wake_url {
        if !is_http_url(url) {
            report.warn("detection.wakeUrl", format!("'{url}' is not an http(s) URL"));
        }
    }
}

fn validate_insight(config: &VisionQuestConfig, report: &mut ValidationReport) {
    if config.insight_api_key().is_none() {
        return;
    }
    if config.insight.model.as_deref().map_or(true, |m| m.trim().is_empty()) {
        report.error("insight.model", "An API key is set but no model is named");
    }
}

/// A backend needs both values; one without the other is almost always a typo.
fn validate_remote(config: &VisionQuestConfig, report: &mut ValidationReport) {
    let remote = &config.remote;
    let has_url = remote.url.as_deref().is_some_and(|u| !u.trim().is_empty());
    let has_key = remote.public_key.as_deref().is_some_and(|k| !k.trim().is_empty());
    match (has_url, has_key) {
        (true, false) => report.warn(
            "remote.publicKey",
            "Backend URL is set without a public key; remote history stays disabled",
        ),
        (false, true) => report.warn(
            "remote.url",
            "Backend public key is set without a URL; remote history stays disabled",
        ),
        _ => {}
    }
    if has_url {
        if let Some(url) = &remote.url {
            if !is_http_url(url) {
                report.error("remote.url", format!("'{url}' is not an http(s) URL"));
            }
        }
    }
}

fn validate_history(config: &VisionQuestConfig, report: &mut ValidationReport) {
    if let Some(path) = &config.history.path {
        if path.trim().is_empty() {
            report.error("history.path", "History path must not be empty");
        }
    }
}
