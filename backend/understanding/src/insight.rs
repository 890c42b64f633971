//! Insight prompt and the placeholder texts every failure degrades to.

use async_trait::async_trait;
use visionquest_core::InsightProvider;

pub const INSIGHT_PROMPT: &str = "This is an image that has been processed by a YOLO object detection model. \
You can see bounding boxes and labels for the detected objects. \
Please identify what was detected based on the labels in the image, \
provide a brief summary of the scene, and explain if the detection looks accurate.";

pub const INSIGHT_UNAVAILABLE_MESSAGE: &str = "AI insights are unavailable without an API key.";

pub const INSIGHT_EMPTY_MESSAGE: &str = "Unable to generate AI analysis.";

pub const INSIGHT_ERROR_MESSAGE: &str =
    "The AI assistant encountered an error while analyzing the detection results.";

/// Used when no AI credential is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInsightProvider;

#[async_trait]
impl InsightProvider for NoopInsightProvider {
    fn name(&self) -> &str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn analyze(&self, _image_base64: &str) -> String {
        INSIGHT_UNAVAILABLE_MESSAGE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_returns_unavailable_text() {
        let provider = NoopInsightProvider;
        assert!(!provider.is_available());
        assert_eq!(provider.analyze("QUJD").await, INSIGHT_UNAVAILABLE_MESSAGE);
    }
}
