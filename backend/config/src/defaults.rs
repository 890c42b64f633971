//! Default values applied to a parsed config.

use crate::schema::{HistoryBackend, VisionQuestConfig};
use std::path::Path;

pub const DEFAULT_DETECTION_URL: &str = "https://lazypanda0103-yolo.hf.space/predict/";

pub const DEFAULT_WAKE_URL: &str = "https://huggingface.co/spaces/lazypanda0103/yolo";

pub const DEFAULT_INSIGHT_MODEL: &str = "gemini-3-flash-preview";

pub const DEFAULT_INSIGHT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub const DEFAULT_REMOTE_BUCKET: &str = "detections";

pub const DEFAULT_REMOTE_TABLE: &str = "history";

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_VIEWER_BIND: &str = "127.0.0.1";

pub const DEFAULT_VIEWER_PORT: u16 = 8787;

/// Apply all defaults. `state_dir` anchors the default history location.
pub fn apply_all_defaults(config: VisionQuestConfig, state_dir: &Path) -> VisionQuestConfig {
    let config = apply_detection_defaults(config);
    let config = apply_insight_defaults(config);
    let config = apply_remote_defaults(config);
    let config = apply_history_defaults(config, state_dir);
    apply_misc_defaults(config)
}

fn apply_detection_defaults(mut config: VisionQuestConfig) -> VisionQuestConfig {
    let detection = &mut config.detection;
    detection
        .endpoint_url
        .get_or_insert_with(|| DEFAULT_DETECTION_URL.to_string());
    detection
        .wake_url
        .get_or_insert_with(|| DEFAULT_WAKE_URL.to_string());
    config
}

fn apply_insight_defaults(mut config: VisionQuestConfig) -> VisionQuestConfig {
    let insight = &mut config.insight;
    insight
        .model
        .get_or_insert_with(|| DEFAULT_INSIGHT_MODEL.to_string());
    insight
        .base_url
        .get_or_insert_with(|| DEFAULT_INSIGHT_BASE_URL.to_string());
    config
}

fn apply_remote_defaults(mut config: VisionQuestConfig) -> VisionQuestConfig {
    let remote = &mut config.remote;
    remote
        .bucket
        .get_or_insert_with(|| DEFAULT_REMOTE_BUCKET.to_string());
    remote
        .table
        .get_or_insert_with(|| DEFAULT_REMOTE_TABLE.to_string());
    config
}

/// File backend stores under `<state_dir>/storage`, sqlite under `<state_dir>/history.db`.
fn apply_history_defaults(mut config: VisionQuestConfig, state_dir: &Path) -> VisionQuestConfig {
    let backend = *config.history.backend.get_or_insert(HistoryBackend::File);
    if config.history.path.is_none() {
        let path = match backend {
            HistoryBackend::File | HistoryBackend::Memory => state_dir.join("storage"),
            HistoryBackend::Sqlite => state_dir.join("history.db"),
        };
        config.history.path = Some(path.to_string_lossy().into_owned());
    }
    config
}

fn apply_misc_defaults(mut config: VisionQuestConfig) -> VisionQuestConfig {
    config
        .logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
        .viewer
        .bind
        .get_or_insert_with(|| DEFAULT_VIEWER_BIND.to_string());
    config.viewer.port.get_or_insert(DEFAULT_VIEWER_PORT);
    config
}
