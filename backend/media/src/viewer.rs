//! Local result viewer: serves the persisted history over HTTP.
//!
//!   GET /api/history          record summaries, newest first
//!   GET /history/:id/image    the annotated image of one record

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use visionquest_core::{HistoryRecord, HistoryStorage};

use crate::encoding::from_data_url;

#[derive(Clone)]
pub struct ViewerState {
    pub storage: Arc<dyn HistoryStorage>,
}

#[derive(Debug, Serialize)]
pub struct RecordSummary {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub image: String,
    pub encoded_len: usize,
}

impl From<&HistoryRecord> for RecordSummary {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            id: record.id,
            created_at: record.created_at,
            image: format!("/history/{}/image", record.id),
            encoded_len: record.result_url.len(),
        }
    }
}

pub fn viewer_router(storage: Arc<dyn HistoryStorage>) -> Router {
    Router::new()
        .route("/api/history", get(list_history))
        .route("/history/:id/image", get(serve_image))
        .with_state(ViewerState { storage })
}

async fn list_history(State(state): State<ViewerState>) -> Response {
    match state.storage.load().await {
        Ok(records) => {
            let summaries: Vec<RecordSummary> = records.iter().map(RecordSummary::from).collect();
            Json(summaries).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Failed to load history for viewer");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load history").into_response()
        }
    }
}

async fn serve_image(Path(id): Path<i64>, State(state): State<ViewerState>) -> Response {
    let records = match state.storage.load().await {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "Failed to load history for viewer");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load history").into_response();
        }
    };

    let Some(record) = records.iter().find(|r| r.id == id) else {
        return (StatusCode::NOT_FOUND, "History record not found").into_response();
    };

    match from_data_url(&record.result_url) {
        Ok((mime, bytes)) => {
            debug!(id, bytes = bytes.len(), "Serving history image");
            let mut headers = HeaderMap::new();
            if let Ok(value) = mime.parse() {
                headers.insert(header::CONTENT_TYPE, value);
            }
            headers.insert(
                header::CACHE_CONTROL,
                header::HeaderValue::from_static("private, max-age=3600"),
            );
            (StatusCode::OK, headers, bytes).into_response()
        }
        Err(e) => {
            warn!(id, error = %e, "Stored result is not a decodable data URL");
            (StatusCode::UNPROCESSABLE_ENTITY, "Stored image is corrupt").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::to_data_url;
    use async_trait::async_trait;

    struct FixedStorage(Vec<HistoryRecord>);

    #[async_trait]
    impl HistoryStorage for FixedStorage {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn load(&self) -> anyhow::Result<Vec<HistoryRecord>> {
            Ok(self.0.clone())
        }
        async fn save(&self, _records: &[HistoryRecord]) -> anyhow::Result<()> {
            Ok(())
        }
        async fn clear(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    async fn spawn_viewer(records: Vec<HistoryRecord>) -> String {
        let app = viewer_router(Arc::new(FixedStorage(records)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn record(id: i64, url: String) -> HistoryRecord {
        HistoryRecord {
            id,
            result_url: url,
            created_at: DateTime::from_timestamp_millis(id).unwrap(),
        }
    }

    #[tokio::test]
    async fn lists_and_serves_images() {
        let base = spawn_viewer(vec![
            record(2_000, to_data_url("image/png", b"second")),
            record(1_000, "garbage".into()),
        ])
        .await;

        let list: serde_json::Value = reqwest::get(format!("{base}/api/history"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(list[0]["id"], 2_000);
        assert_eq!(list[0]["image"], "/history/2000/image");

        let resp = reqwest::get(format!("{base}/history/2000/image")).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "image/png");
        assert_eq!(&resp.bytes().await.unwrap()[..], b"second");

        let resp = reqwest::get(format!("{base}/history/1000/image")).await.unwrap();
        assert_eq!(resp.status(), 422);

        let resp = reqwest::get(format!("{base}/history/42/image")).await.unwrap();
        assert_eq!(resp.status(), 404);
    }
}
