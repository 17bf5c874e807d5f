//! Trait definitions for the converter module.

use async_trait::async_trait;

use super::error::ConverterError;
use super::types::{MediaMetadata, TranscodeRequest};

/// The two-phase conversion operation: metadata extraction, then
/// download + transcode to a local file.
///
/// Both calls may take arbitrarily long and fail for reasons outside the
/// service's control. Implementations make no promise about the exact name
/// of the file they produce.
#[async_trait]
pub trait MediaConverter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Fetches metadata for a source URL without downloading media.
    async fn extract_metadata(&self, url: &str) -> Result<MediaMetadata, ConverterError>;

    /// Downloads the source and transcodes it next to `request.output_template`.
    async fn fetch_and_transcode(&self, request: &TranscodeRequest) -> Result<(), ConverterError>;

    /// Validates that the converter is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;
}
