use std::sync::Arc;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use visionquest_core::HistoryStorage;
use visionquest_media::viewer_router;

/// Build the viewer router with health check, request tracing and permissive CORS.
pub fn build_router(storage: Arc<dyn HistoryStorage>) -> Router {
    let backend = storage.name().to_string();
    viewer_router(storage)
        .route(
            "/api/health",
            get(move || {
                let backend = backend.clone();
                async move { health(backend) }
            }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn health(backend: String) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "history": backend,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use visionquest_core::HistoryRecord;
    use visionquest_memory::InMemoryHistoryStorage;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn health_and_history_are_served() {
        let storage = InMemoryHistoryStorage::new();
        storage
            .save(&[HistoryRecord {
                id: 1_700_000_000_000,
                result_url: "data:image/png;base64,AAEC".into(),
                created_at: chrono::DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            }])
            .await
            .unwrap();
        let base = spawn(build_router(Arc::new(storage))).await;

        let health: Value = reqwest::get(format!("{base}/api/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["history"], "memory");

        let list: Value = reqwest::get(format!("{base}/api/history"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(list[0]["id"], 1_700_000_000_000i64);

        let image = reqwest::get(format!("{base}/history/1700000000000/image"))
            .await
            .unwrap();
        assert_eq!(image.status(), 200);
        assert_eq!(image.bytes().await.unwrap().as_ref(), &[0u8, 1, 2]);
    }
}
