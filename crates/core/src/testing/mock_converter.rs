//! Mock converter for testing.

use async_trait::async_trait;
use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};

use crate::converter::{ConverterError, MediaConverter, MediaMetadata, TranscodeRequest};

/// Where the mock writes its output, relative to the requested template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputNaming {
    /// `<template>.<ext>` (what yt-dlp usually does).
    #[default]
    TemplateWithExtension,
    /// `<template>` verbatim, no extension.
    Template,
    /// An unrelated name that still contains the job id.
    Elsewhere,
    /// Report success without writing anything.
    Nothing,
}

/// A call made against the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ExtractMetadata { url: String },
    FetchAndTranscode(TranscodeRequest),
}

/// Mock implementation of the MediaConverter trait.
///
/// Provides controllable behavior for testing:
/// - Configurable metadata
/// - Simulated extraction/transcode failures (or a panic)
/// - Output file naming, to exercise artifact resolution
/// - Artificial delay, and a gate that holds transcodes until released
/// - Recorded calls for assertions
///
/// # Example
///
/// ```rust,ignore
/// use convertino_core::testing::{MockConverter, OutputNaming};
///
/// let converter = MockConverter::new();
/// converter.set_output_naming(OutputNaming::Template).await;
/// converter.fail_extraction("Video unavailable").await;
///
/// // Use in JobOrchestrator...
///
/// let calls = converter.recorded_calls().await;
/// ```
#[derive(Debug)]
pub struct MockConverter {
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    metadata: Arc<RwLock<MediaMetadata>>,
    extraction_error: Arc<RwLock<Option<String>>>,
    transcode_error: Arc<RwLock<Option<String>>>,
    panic_on_transcode: Arc<RwLock<bool>>,
    naming: Arc<RwLock<OutputNaming>>,
    output_bytes: Arc<RwLock<usize>>,
    delay: Arc<RwLock<Duration>>,
    gate: watch::Sender<bool>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter that succeeds with default metadata.
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            metadata: Arc::new(RwLock::new(Self::default_metadata())),
            extraction_error: Arc::new(RwLock::new(None)),
            transcode_error: Arc::new(RwLock::new(None)),
            panic_on_transcode: Arc::new(RwLock::new(false)),
            naming: Arc::new(RwLock::new(OutputNaming::default())),
            output_bytes: Arc::new(RwLock::new(2048)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            gate,
        }
    }

    fn default_metadata() -> MediaMetadata {
        MediaMetadata {
            title: "Test Song".to_string(),
            webpage_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            duration: 212,
            thumbnail: "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg".to_string(),
            uploader: "Test Uploader".to_string(),
            upload_date: "20091025".to_string(),
            view_count: 1_000_000,
        }
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Number of transcode calls made.
    pub async fn transcode_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, RecordedCall::FetchAndTranscode(_)))
            .count()
    }

    /// Set the metadata returned by extraction.
    pub async fn set_metadata(&self, metadata: MediaMetadata) {
        *self.metadata.write().await = metadata;
    }

    /// Set only the title of the returned metadata.
    pub async fn set_title(&self, title: impl Into<String>) {
        self.metadata.write().await.title = title.into();
    }

    /// Make every extraction fail with `reason`.
    pub async fn fail_extraction(&self, reason: impl Into<String>) {
        *self.extraction_error.write().await = Some(reason.into());
    }

    /// Make every transcode fail with `reason`.
    pub async fn fail_transcode(&self, reason: impl Into<String>) {
        *self.transcode_error.write().await = Some(reason.into());
    }

    /// Make every transcode panic.
    pub async fn panic_on_transcode(&self) {
        *self.panic_on_transcode.write().await = true;
    }

    /// Choose where transcode output is written.
    pub async fn set_output_naming(&self, naming: OutputNaming) {
        *self.naming.write().await = naming;
    }

    /// Size of the file written by transcode.
    pub async fn set_output_bytes(&self, bytes: usize) {
        *self.output_bytes.write().await = bytes;
    }

    /// Sleep this long in every call.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Block transcodes until [`release`](Self::release) is called.
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// Let held and future transcodes proceed.
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    async fn simulate_delay(&self) {
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl MediaConverter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract_metadata(&self, url: &str) -> Result<MediaMetadata, ConverterError> {
        self.calls.write().await.push(RecordedCall::ExtractMetadata {
            url: url.to_string(),
        });
        self.simulate_delay().await;

        if let Some(reason) = self.extraction_error.read().await.clone() {
            return Err(ConverterError::provider_failed("metadata extraction", reason));
        }
        Ok(self.metadata.read().await.clone())
    }

    async fn fetch_and_transcode(&self, request: &TranscodeRequest) -> Result<(), ConverterError> {
        self.calls
            .write()
            .await
            .push(RecordedCall::FetchAndTranscode(request.clone()));

        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;
        self.simulate_delay().await;

        if *self.panic_on_transcode.read().await {
            panic!("mock converter panicked during transcode");
        }
        if let Some(reason) = self.transcode_error.read().await.clone() {
            return Err(ConverterError::provider_failed("download", reason));
        }

        let ext = request.format.extension();
        let path = match *self.naming.read().await {
            OutputNaming::TemplateWithExtension => {
                let mut name = OsString::from(request.output_template.as_os_str());
                name.push(format!(".{}", ext));
                name.into()
            }
            OutputNaming::Template => request.output_template.clone(),
            OutputNaming::Elsewhere => {
                let dir = request
                    .output_template
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_default();
                dir.join(format!("{} [converted].{}", request.job_id, ext))
            }
            OutputNaming::Nothing => return Ok(()),
        };

        let bytes = *self.output_bytes.read().await;
        tokio::fs::write(&path, vec![0u8; bytes]).await?;
        Ok(())
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::AudioFormat;
    use crate::job::JobId;
    use tempfile::TempDir;

    fn request(dir: &TempDir) -> TranscodeRequest {
        let job_id = JobId::new();
        TranscodeRequest {
            job_id,
            source_url: "https://youtu.be/x".to_string(),
            output_template: dir.path().join(format!("Song_{}", job_id)),
            format: AudioFormat::Mp3,
            quality_kbps: 192,
        }
    }

    #[tokio::test]
    async fn test_default_writes_template_with_extension() {
        let dir = TempDir::new().unwrap();
        let converter = MockConverter::new();
        let req = request(&dir);

        converter.fetch_and_transcode(&req).await.unwrap();

        let expected = dir.path().join(format!("Song_{}.mp3", req.job_id));
        assert_eq!(std::fs::metadata(expected).unwrap().len(), 2048);
        assert_eq!(converter.transcode_count().await, 1);
    }

    #[tokio::test]
    async fn test_elsewhere_naming() {
        let dir = TempDir::new().unwrap();
        let converter = MockConverter::new();
        converter.set_output_naming(OutputNaming::Elsewhere).await;
        let req = request(&dir);

        converter.fetch_and_transcode(&req).await.unwrap();

        let expected = dir.path().join(format!("{} [converted].mp3", req.job_id));
        assert!(expected.exists());
    }

    #[tokio::test]
    async fn test_failures() {
        let converter = MockConverter::new();
        converter.fail_extraction("Video unavailable").await;

        let err = converter.extract_metadata("https://youtu.be/x").await.unwrap_err();
        assert_eq!(err.to_string(), "metadata extraction failed: Video unavailable");
        assert_eq!(
            converter.recorded_calls().await,
            vec![RecordedCall::ExtractMetadata {
                url: "https://youtu.be/x".to_string()
            }]
        );
    }
}
