pub mod http;
pub mod mock;

pub use http::HttpDetectionClient;
pub use mock::FixedDetectionClient;
