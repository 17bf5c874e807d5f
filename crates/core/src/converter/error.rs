//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the conversion operation.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// Provider binary not found.
    #[error("yt-dlp not found at path: {path}")]
    BinaryNotFound { path: PathBuf },

    /// The provider rejected the source or failed mid-way.
    #[error("{operation} failed: {reason}")]
    ProviderFailed {
        operation: &'static str,
        reason: String,
    },

    /// The provider did not finish in time.
    #[error("{operation} timed out after {timeout_secs} seconds")]
    Timeout {
        operation: &'static str,
        timeout_secs: u64,
    },

    /// Provider output could not be understood.
    #[error("Failed to parse provider output: {reason}")]
    ParseError { reason: String },

    /// I/O error while talking to the provider.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    /// Creates a provider failure for the given operation.
    pub fn provider_failed(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::ProviderFailed {
            operation,
            reason: reason.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::ParseError {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ConverterError::provider_failed("metadata extraction", "Video unavailable");
        assert_eq!(
            err.to_string(),
            "metadata extraction failed: Video unavailable"
        );

        let err = ConverterError::Timeout {
            operation: "download",
            timeout_secs: 30,
        };
        assert_eq!(err.to_string(), "download timed out after 30 seconds");
    }
}
