//! VisionQuest configuration schema.
//!
//! Every value is optional; a missing value degrades the feature that
//! needs it instead of failing startup.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionQuestConfig {
    /// Remote object-detection endpoint
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Generative-AI insight service
    #[serde(default)]
    pub insight: InsightConfig,

    /// Hosted storage + row database
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Local history persistence
    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Local result viewer
    #[serde(default)]
    pub viewer: ViewerConfig,
}

impl VisionQuestConfig {
    /// AI credential, if one is set and non-empty.
    pub fn insight_api_key(&self) -> Option<&str> {
        non_empty(&self.insight.api_key)
    }

    /// Backend URL and public key, only when both are present.
    pub fn remote_credentials(&self) -> Option<(&str, &str)> {
        match (non_empty(&self.remote.url), non_empty(&self.remote.public_key)) {
            (Some(url), Some(key)) => Some((url, key)),
            _ => None,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    /// Page that wakes a sleeping hosted instance; quoted in connection errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wake_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    #[default]
    File,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<HistoryBackend>,
    /// Directory (file backend) or database file (sqlite backend).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// When set, NDJSON logs rotate daily in this directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_yaml() {
        let yaml = r#"
detection:
  endpointUrl: http://localhost:7860/predict/
remote:
  url: https://abc.supabase.co
  publicKey: anon
history:
  backend: sqlite
"#;
        let config: VisionQuestConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.detection.endpoint_url.as_deref(),
            Some("http://localhost:7860/predict/")
        );
        assert_eq!(config.history.backend, Some(HistoryBackend::Sqlite));
        assert_eq!(
            config.remote_credentials(),
            Some(("https://abc.supabase.co", "anon"))
        );
    }

    #[test]
    fn half_configured_remote_has_no_credentials() {
        let mut config = VisionQuestConfig::default();
        config.remote.url = Some("https://abc.supabase.co".into());
        config.remote.public_key = Some("   ".into());
        assert!(config.remote_credentials().is_none());
    }

    #[test]
    fn empty_api_key_counts_as_absent() {
        let mut config = VisionQuestConfig::default();
        config.insight.api_key = Some(String::new());
        assert!(config.insight_api_key().is_none());
    }
}
