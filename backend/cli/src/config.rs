use std::path::{Path, PathBuf};

use anyhow::Result;
use visionquest_config::{config_dir, config_file_path, load_and_prepare, VisionQuestConfig};
use visionquest_config::defaults::{DEFAULT_LOG_LEVEL, DEFAULT_VIEWER_BIND, DEFAULT_VIEWER_PORT};

/// Effective configuration plus where it was loaded from.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub path: PathBuf,
    pub config: VisionQuestConfig,
}

impl CliContext {
    /// Load `explicit`, or `config.yaml` in the config directory.
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config_file_path(&config_dir()));
        let config = load_and_prepare(&path).await?;
        Ok(Self { path, config })
    }

    pub fn log_level(&self) -> &str {
        self.config
            .logging
            .level
            .as_deref()
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.config.logging.dir.as_ref().map(PathBuf::from)
    }

    /// Viewer address; `port` overrides the configured one.
    pub fn viewer_addr(&self, port: Option<u16>) -> String {
        let bind = self
            .config
            .viewer
            .bind
            .as_deref()
            .unwrap_or(DEFAULT_VIEWER_BIND);
        let port = port
            .or(self.config.viewer.port)
            .unwrap_or(DEFAULT_VIEWER_PORT);
        format!("{bind}:{port}")
    }
}
