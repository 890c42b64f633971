//! Startup wiring of optional collaborators.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use visionquest_config::defaults::{
    DEFAULT_DETECTION_URL, DEFAULT_INSIGHT_BASE_URL, DEFAULT_INSIGHT_MODEL, DEFAULT_REMOTE_BUCKET,
    DEFAULT_REMOTE_TABLE, DEFAULT_WAKE_URL,
};
use visionquest_config::{config_dir, HistoryBackend, VisionQuestConfig};
use visionquest_core::{DetectionClient, HistoryStorage, InsightProvider, RemotePersistence};
use visionquest_detection::HttpDetectionClient;
use visionquest_memory::{InMemoryHistoryStorage, JsonFileHistoryStorage, SqliteHistoryStorage};
use visionquest_remote::{SupabaseRemote, UnconfiguredRemote};
use visionquest_understanding::{GeminiInsightProvider, NoopInsightProvider};

/// Every external collaborator the workflow talks to.
#[derive(Clone)]
pub struct Capabilities {
    pub detection: Arc<dyn DetectionClient>,
    pub insight: Arc<dyn InsightProvider>,
    pub remote: Arc<dyn RemotePersistence>,
    pub history: Arc<dyn HistoryStorage>,
}

impl Capabilities {
    pub fn new(
        detection: Arc<dyn DetectionClient>,
        insight: Arc<dyn InsightProvider>,
        remote: Arc<dyn RemotePersistence>,
        history: Arc<dyn HistoryStorage>,
    ) -> Self {
        Self {
            detection,
            insight,
            remote,
            history,
        }
    }

    /// Decide once which implementation backs each capability.
    pub fn from_config(config: &VisionQuestConfig) -> Result<Self> {
        let detection = Arc::new(HttpDetectionClient::new(
            config
                .detection
                .endpoint_url
                .as_deref()
                .unwrap_or(DEFAULT_DETECTION_URL),
            config
                .detection
                .wake_url
                .as_deref()
                .unwrap_or(DEFAULT_WAKE_URL),
        ));

        let insight: Arc<dyn InsightProvider> = match config.insight_api_key() {
            Some(key) => Arc::new(
                GeminiInsightProvider::new(
                    key,
                    config.insight.model.as_deref().unwrap_or(DEFAULT_INSIGHT_MODEL),
                )
                .with_base_url(
                    config
                        .insight
                        .base_url
                        .as_deref()
                        .unwrap_or(DEFAULT_INSIGHT_BASE_URL),
                ),
            ),
            None => Arc::new(NoopInsightProvider),
        };

        let remote: Arc<dyn RemotePersistence> = match config.remote_credentials() {
            Some((url, key)) => Arc::new(SupabaseRemote::new(
                url,
                key,
                config.remote.bucket.as_deref().unwrap_or(DEFAULT_REMOTE_BUCKET),
                config.remote.table.as_deref().unwrap_or(DEFAULT_REMOTE_TABLE),
            )),
            None => Arc::new(UnconfiguredRemote),
        };

        let history = history_storage(config)?;

        info!(
            endpoint = detection.endpoint(),
            insight = insight.name(),
            remote = remote.is_configured(),
            history = history.name(),
            "Capabilities resolved"
        );

        Ok(Self {
            detection,
            insight,
            remote,
            history,
        })
    }
}

fn history_storage(config: &VisionQuestConfig) -> Result<Arc<dyn HistoryStorage>> {
    let backend = config.history.backend.unwrap_or_default();
    let path = config.history.path.as_ref().map(PathBuf::from);
    let storage: Arc<dyn HistoryStorage> = match backend {
        HistoryBackend::Memory => Arc::new(InMemoryHistoryStorage::new()),
        HistoryBackend::File => Arc::new(JsonFileHistoryStorage::new(
            path.unwrap_or_else(|| config_dir().join("storage")),
        )),
        HistoryBackend::Sqlite => Arc::new(SqliteHistoryStorage::open(
            path.unwrap_or_else(|| config_dir().join("history.db")),
        )?),
    };
    Ok(storage)
}
