pub mod gemini;
pub mod insight;

pub use gemini::GeminiInsightProvider;
pub use insight::{
    NoopInsightProvider, INSIGHT_EMPTY_MESSAGE, INSIGHT_ERROR_MESSAGE, INSIGHT_PROMPT,
    INSIGHT_UNAVAILABLE_MESSAGE,
};
