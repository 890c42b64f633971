pub mod error;
pub mod traits;
pub mod types;

pub use error::{VisionError, VisionResult, INVALID_UPLOAD_MESSAGE};
pub use traits::{DetectionClient, HistoryStorage, InsightProvider, RemotePersistence};
pub use types::{
    AnnotatedImage, Detection, InsightSummary, PredictionResult, RemoteHistoryRow,
    UploadedImage, HistoryRecord, ACCEPTED_MIME_TYPES, HISTORY_LIMIT, HISTORY_STORAGE_KEY,
};
