use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Media types accepted for upload.
pub const ACCEPTED_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Maximum number of locally retained history records.
pub const HISTORY_LIMIT: usize = 15;

/// Durable storage key holding the JSON-encoded history list.
pub const HISTORY_STORAGE_KEY: &str = "vq_local_history";

// ---------------------------------------------------------------------------
// Binary payloads
// ---------------------------------------------------------------------------

/// A user-selected image, with the media type it declares.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl UploadedImage {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The opaque image returned by the detection endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedImage {
    pub mime_type: String,
    pub data: Bytes,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// One persisted past result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Creation timestamp in milliseconds since the Unix epoch.
    pub id: i64,
    /// Result image as a base64 `data:` URL.
    pub result_url: String,
    pub created_at: DateTime<Utc>,
}

/// A history row owned by the hosted backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteHistoryRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub user_id: String,
    pub original_url: String,
    pub result_url: String,
    #[serde(default)]
    pub insight: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Structured detection (declared; the endpoint returns an image instead)
// ---------------------------------------------------------------------------

/// A single detected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// `[x1, y1, x2, y2]`
    #[serde(rename = "box")]
    pub bbox: [f32; 4],
    pub label: String,
    pub score: f32,
}

impl Detection {
    pub fn width(&self) -> f32 {
        (self.bbox[2] - self.bbox[0]).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.bbox[3] - self.bbox[1]).max(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub detections: Vec<Detection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_time: Option<f64>,
}

impl PredictionResult {
    /// Distinct labels, in first-seen order.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for d in &self.detections {
            if !labels.contains(&d.label.as_str()) {
                labels.push(&d.label);
            }
        }
        labels
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSummary {
    pub summary: String,
    pub detailed_insights: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_record_uses_storage_field_names() {
        let record = HistoryRecord {
            id: 1_700_000_000_000,
            result_url: "data:image/png;base64,AAAA".into(),
            created_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 1_700_000_000_000i64);
        assert_eq!(json["result_url"], "data:image/png;base64,AAAA");
        assert_eq!(json["created_at"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn detection_parses_box_field() {
        let raw = r#"{"detections":[{"box":[10,20,50,80],"label":"dog","score":0.91},
                     {"box":[0,0,5,5],"label":"dog","score":0.4},
                     {"box":[1,1,2,2],"label":"cat","score":0.7}],"inferenceTime":12.5}"#;
        let result: PredictionResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.detections.len(), 3);
        assert_eq!(result.detections[0].width(), 40.0);
        assert_eq!(result.detections[0].height(), 60.0);
        assert_eq!(result.labels(), vec!["dog", "cat"]);
        assert_eq!(result.inference_time, Some(12.5));
    }
}
