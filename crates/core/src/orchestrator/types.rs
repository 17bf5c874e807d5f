//! Types for the job orchestrator.

use serde::Deserialize;
use thiserror::Error;

use crate::job::JobError;

/// Errors that can occur while accepting a job.
///
/// Execution failures never surface here; they are recorded on the job.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No source URL given.
    #[error("URL parameter is required")]
    MissingUrl,

    /// URL does not start with an allowed prefix.
    #[error("URL is not from an allowed source: {0}")]
    InvalidUrl(String),

    /// Registry rejected the new job.
    #[error("job registry error: {0}")]
    Registry(#[from] JobError),
}

impl OrchestratorError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            OrchestratorError::MissingUrl => "missing_url",
            OrchestratorError::InvalidUrl(_) => "invalid_url",
            OrchestratorError::Registry(_) => "registry",
        }
    }
}

/// Raw conversion request as received from a client.
///
/// All fields are optional strings. Only the URL is required; a format or
/// quality the orchestrator cannot honor is replaced by its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmitRequest {
    pub url: Option<String>,
    pub format: Option<String>,
    pub quality: Option<String>,
}

impl SubmitRequest {
    /// Request for `url` with default format and quality.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }
}
