//! `visionquest-session`: the select / predict / persist workflow.
//!
//! [`VisionSession`] owns the state a page would show (selection, preview,
//! result, error text, busy flag) plus the bounded history, and drives the
//! injected [`Capabilities`].

pub mod capabilities;
pub mod session;

pub use capabilities::Capabilities;
pub use session::{PredictOutcome, PublishReceipt, SessionSnapshot, SkipReason, VisionSession};
