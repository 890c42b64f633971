//! Insight via the Gemini `generateContent` API.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use visionquest_core::InsightProvider;
use visionquest_media::base64_payload;

use crate::insight::{INSIGHT_EMPTY_MESSAGE, INSIGHT_ERROR_MESSAGE, INSIGHT_PROMPT};

/// Images are always declared as JPEG to the model.
const INLINE_MIME: &str = "image/jpeg";

pub struct GeminiInsightProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiInsightProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn generate(&self, payload: &str) -> Result<Option<String>> {
        let body = GenerateContentRequest {
            contents: Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: INLINE_MIME,
                            data: payload,
                        },
                    },
                    Part::Text { text: INSIGHT_PROMPT },
                ],
            },
        };

        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, "Sending insight request to Gemini");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .context("Gemini HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            bail!("Gemini returned {}: {}", status, error_body);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(Some(text).filter(|t| !t.trim().is_empty()))
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Content<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait]
impl InsightProvider for GeminiInsightProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn analyze(&self, image_base64: &str) -> String {
        let payload = base64_payload(image_base64);
        match self.generate(payload).await {
            Ok(Some(text)) => {
                info!(model = %self.model, chars = text.len(), "Insight generated");
                text
            }
            Ok(None) => INSIGHT_EMPTY_MESSAGE.to_string(),
            Err(e) => {
                warn!(model = %self.model, error = %e, "Gemini analysis failed");
                INSIGHT_ERROR_MESSAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query},
        http::StatusCode,
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Answers with the inline payload it received, so tests can see what was sent.
    async fn echo(
        Path(model): Path<String>,
        Query(query): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let parts = &body["contents"]["parts"];
        let text = format!(
            "{}|{}|{}|{}|{}",
            model,
            query.get("key").cloned().unwrap_or_default(),
            parts[0]["inlineData"]["mimeType"].as_str().unwrap_or(""),
            parts[0]["inlineData"]["data"].as_str().unwrap_or(""),
            parts[1]["text"].as_str().map(|t| t.starts_with("This is an image")).unwrap_or(false),
        );
        Json(json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }))
    }

    #[tokio::test]
    async fn sends_payload_after_comma_with_fixed_prompt() {
        let base = spawn(Router::new().route("/v1beta/models/:model", post(echo))).await;
        let provider = GeminiInsightProvider::new("k-123", "gemini-test").with_base_url(base);

        let text = provider.analyze("data:image/png;base64,QUJD").await;
        assert_eq!(text, "gemini-test:generateContent|k-123|image/jpeg|QUJD|true");
    }

    #[tokio::test]
    async fn empty_answer_degrades_to_placeholder() {
        let app = Router::new().route(
            "/v1beta/models/:model",
            post(|| async { Json(json!({ "candidates": [] })) }),
        );
        let provider = GeminiInsightProvider::new("k", "m").with_base_url(spawn(app).await);
        assert_eq!(provider.analyze("QUJD").await, INSIGHT_EMPTY_MESSAGE);
    }

    #[tokio::test]
    async fn http_error_degrades_to_fallback() {
        let app = Router::new().route(
            "/v1beta/models/:model",
            post(|| async { (StatusCode::FORBIDDEN, "API key not valid") }),
        );
        let provider = GeminiInsightProvider::new("bad", "m").with_base_url(spawn(app).await);
        assert_eq!(provider.analyze("QUJD").await, INSIGHT_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_fallback() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let provider = GeminiInsightProvider::new("k", "m").with_base_url(format!("http://{addr}"));
        assert_eq!(provider.analyze("QUJD").await, INSIGHT_ERROR_MESSAGE);
    }
}
