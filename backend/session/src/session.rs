use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Instant;

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use visionquest_core::{
    AnnotatedImage, HistoryRecord, RemoteHistoryRow, UploadedImage, VisionError, VisionResult,
};
use visionquest_logging::{EventLogger, SessionEvent};
use visionquest_media::{extension_for, preview_url, to_data_url, validate_upload};
use visionquest_memory::HistoryStore;

use crate::capabilities::Capabilities;

/// Why a prediction request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoSelection,
    InFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictOutcome {
    Skipped(SkipReason),
    Completed(HistoryRecord),
    /// User-facing error text.
    Failed(String),
}

/// Read-only view of everything a front end would render.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub selected_file: Option<String>,
    pub preview_url: Option<String>,
    pub result_url: Option<String>,
    pub is_predicting: bool,
    pub error: Option<String>,
    pub history: Vec<HistoryRecord>,
}

/// What a successful publish stored remotely.
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    pub original_url: String,
    pub result_url: String,
    pub insight: String,
    pub rows: Vec<RemoteHistoryRow>,
}

#[derive(Default)]
struct SessionState {
    selection: Option<UploadedImage>,
    preview_url: Option<String>,
    result: Option<AnnotatedImage>,
    result_url: Option<String>,
    error: Option<String>,
}

/// Clears the in-flight flag however the prediction ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct VisionSession {
    id: String,
    caps: Capabilities,
    state: RwLock<SessionState>,
    history: Mutex<HistoryStore>,
    predicting: AtomicBool,
}

impl VisionSession {
    /// Build a session and hydrate history from the configured storage.
    pub async fn start(caps: Capabilities) -> Result<Self> {
        let history = HistoryStore::load(caps.history.clone()).await?;
        let id = format!("vq-{}", Utc::now().timestamp_millis());
        debug!(session_id = %id, "Session started");
        Ok(Self {
            id,
            caps,
            state: RwLock::new(SessionState::default()),
            history: Mutex::new(history),
            predicting: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Offer a file. Returns `false` (and sets the error text) when its type is not accepted;
    /// the previous selection is kept in that case.
    pub fn select_file(&self, image: UploadedImage) -> bool {
        if let Err(e) = validate_upload(&image) {
            EventLogger::log_event(
                &self.id,
                SessionEvent::FileRejected {
                    file_name: image.file_name.clone(),
                    mime_type: image.mime_type.clone(),
                },
            );
            self.update(|s| s.error = Some(e.to_string()));
            return false;
        }

        EventLogger::log_event(
            &self.id,
            SessionEvent::FileSelected {
                file_name: image.file_name.clone(),
                mime_type: image.mime_type.clone(),
                bytes: image.len(),
            },
        );
        let preview = preview_url(&image);
        self.update(|s| {
            s.selection = Some(image);
            s.preview_url = Some(preview);
            s.result = None;
            s.result_url = None;
            s.error = None;
        });
        true
    }

    /// Send the current selection to the detection endpoint and record the result.
    pub async fn predict(&self) -> PredictOutcome {
        let Some(image) = self.read(|s| s.selection.clone()) else {
            debug!(session_id = %self.id, "Predict requested without a selection");
            return PredictOutcome::Skipped(SkipReason::NoSelection);
        };
        if self
            .predicting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(session_id = %self.id, "Prediction already in flight");
            return PredictOutcome::Skipped(SkipReason::InFlight);
        }
        let _in_flight = InFlight(&self.predicting);

        self.update(|s| {
            s.error = None;
            s.result = None;
            s.result_url = None;
        });

        let started = Instant::now();
        let requested_ms = Utc::now().timestamp_millis();
        let annotated = match self.caps.detection.predict(&image).await {
            Ok(annotated) => annotated,
            Err(e) => {
                let message = e.to_string();
                warn!(session_id = %self.id, error = %message, "Prediction failed");
                EventLogger::log_event(
                    &self.id,
                    SessionEvent::PredictionFailed {
                        error_msg: message.clone(),
                    },
                );
                self.update(|s| s.error = Some(message.clone()));
                return PredictOutcome::Failed(message);
            }
        };

        let mut history = self.history.lock().await;
        let record = history.prepend_at(&annotated, requested_ms);
        let bytes = annotated.data.len();
        self.update(|s| {
            s.result = Some(annotated);
            s.result_url = Some(record.result_url.clone());
        });

        if let Err(e) = history.persist().await {
            let message = VisionError::Storage(format!("{e:#}")).to_string();
            warn!(session_id = %self.id, error = %message, "History could not be saved");
            self.update(|s| s.error = Some(message));
        }
        drop(history);

        EventLogger::log_event(
            &self.id,
            SessionEvent::PredictionSucceeded {
                record_id: record.id,
                bytes,
                elapsed_ms: started.elapsed().as_millis() as u64,
            },
        );
        PredictOutcome::Completed(record)
    }

    /// Empty the history and remove it from storage.
    pub async fn clear_history(&self) -> VisionResult<usize> {
        let mut history = self.history.lock().await;
        let removed = history
            .clear()
            .await
            .map_err(|e| VisionError::Storage(format!("{e:#}")))?;
        EventLogger::log_event(&self.id, SessionEvent::HistoryCleared { removed });
        Ok(removed)
    }

    pub async fn history(&self) -> Vec<HistoryRecord> {
        self.history.lock().await.records().to_vec()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let history = self.history().await;
        self.read(|s| SessionSnapshot {
            session_id: self.id.clone(),
            selected_file: s.selection.as_ref().map(|i| i.file_name.clone()),
            preview_url: s.preview_url.clone(),
            result_url: s.result_url.clone(),
            is_predicting: self.predicting.load(Ordering::Acquire),
            error: s.error.clone(),
            history,
        })
    }

    /// Natural-language description of the current result, if there is one.
    pub async fn insight(&self) -> Option<String> {
        let result_url = self.read(|s| s.result_url.clone())?;
        Some(self.caps.insight.analyze(&result_url).await)
    }

    /// Push the current selection and result to the hosted backend for `user_id`.
    pub async fn publish(&self, user_id: &str) -> VisionResult<PublishReceipt> {
        let (original, result) = self.read(|s| (s.selection.clone(), s.result.clone()));
        let (Some(original), Some(result)) = (original, result) else {
            return Err(VisionError::Other(anyhow!(
                "Nothing to publish: run a prediction first"
            )));
        };

        let stamp = Utc::now().timestamp_millis();
        let original_path = format!(
            "{user_id}/{stamp}-original.{}",
            extension_for(&original.mime_type)
        );
        let result_path = format!(
            "{user_id}/{stamp}-result.{}",
            extension_for(&result.mime_type)
        );

        let original_url = self
            .caps
            .remote
            .upload_object(original.data.clone(), &original.mime_type, &original_path)
            .await?;
        let result_url = self
            .caps
            .remote
            .upload_object(result.data.clone(), &result.mime_type, &result_path)
            .await?;

        let insight = self
            .caps
            .insight
            .analyze(&to_data_url(&result.mime_type, &result.data))
            .await;
        let rows = self
            .caps
            .remote
            .save_record(user_id, &original_url, &result_url, &insight)
            .await?;

        info!(session_id = %self.id, user_id, rows = rows.len(), "Result published");
        EventLogger::log_event(
            &self.id,
            SessionEvent::Published {
                user_id: user_id.to_string(),
                result_url: result_url.clone(),
            },
        );
        Ok(PublishReceipt {
            original_url,
            result_url,
            insight,
            rows,
        })
    }
}
