//! Testing utilities and mock implementations.
//!
//! Provides a controllable `MediaConverter` so the orchestrator and HTTP
//! layer can be exercised without yt-dlp or network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use convertino_core::testing::{MockConverter, OutputNaming};
//!
//! let converter = Arc::new(MockConverter::new());
//! converter.set_title("Never Gonna Give You Up").await;
//! converter.set_output_naming(OutputNaming::Elsewhere).await;
//!
//! // Use in JobOrchestrator / AppState...
//! ```

mod mock_converter;

pub use mock_converter::{MockConverter, OutputNaming, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::converter::MediaMetadata;

    /// A valid source URL accepted by the default source policy.
    pub const VALID_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    /// Metadata with the given title and otherwise plausible values.
    pub fn metadata(title: &str) -> MediaMetadata {
        MediaMetadata {
            title: title.to_string(),
            webpage_url: VALID_URL.to_string(),
            duration: 180,
            thumbnail: String::new(),
            uploader: "Fixture Uploader".to_string(),
            upload_date: "20240101".to_string(),
            view_count: 42,
        }
    }
}
