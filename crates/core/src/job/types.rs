//! Core job data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::converter::AudioFormat;

/// Opaque job identifier (random v4 UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Coarse job status as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Downloading,
    Converting,
    Completed,
    Error,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Queued,
        JobStatus::Downloading,
        JobStatus::Converting,
        JobStatus::Completed,
        JobStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Downloading => "downloading",
            JobStatus::Converting => "converting",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result fields of a finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedJob {
    /// Artifact file name inside the storage directory.
    pub filename: String,
    pub title: String,
    /// Relative download path (`/api/download/<encoded filename>`).
    pub download_url: String,
    /// Size in bytes.
    pub file_size: u64,
    /// Size in MiB, rounded to 2 decimals.
    pub file_size_mb: f64,
    /// Duration in seconds.
    pub duration: u64,
    pub thumbnail: String,
    pub uploader: String,
    pub upload_date: String,
    pub view_count: u64,
}

/// State of a job.
///
/// ```text
/// Queued -> Downloading -> Converting -> Completed
///              |               |
///              v               v
///            Error           Error
/// ```
///
/// `Completed` and `Error` are terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobState {
    /// Accepted, execution not started yet.
    Queued,

    /// Fetching metadata and source media.
    Downloading { progress: u8 },

    /// Transcoding and locating the output file.
    Converting { progress: u8 },

    /// Artifact is ready for download.
    Completed(Box<CompletedJob>),

    /// Job failed; `progress` is the last checkpoint reached.
    Error { progress: u8, message: String },
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Queued => JobStatus::Queued,
            JobState::Downloading { .. } => JobStatus::Downloading,
            JobState::Converting { .. } => JobStatus::Converting,
            JobState::Completed(_) => JobStatus::Completed,
            JobState::Error { .. } => JobStatus::Error,
        }
    }

    /// Progress percentage in `0..=100`.
    pub fn progress(&self) -> u8 {
        match self {
            JobState::Queued => 0,
            JobState::Downloading { progress } | JobState::Converting { progress } => *progress,
            JobState::Completed(_) => 100,
            JobState::Error { progress, .. } => *progress,
        }
    }

    /// Returns true if no further transitions are allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed(_) | JobState::Error { .. })
    }

    /// Returns the error message, if this is an error state.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            JobState::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns the result fields, if completed.
    pub fn completed(&self) -> Option<&CompletedJob> {
        match self {
            JobState::Completed(done) => Some(done),
            _ => None,
        }
    }
}

/// A single conversion request and its current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Source URL as submitted (trimmed).
    pub source_url: String,
    pub format: AudioFormat,
    pub quality_kbps: u32,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Creates a job in the `queued` state.
    pub fn new(
        id: JobId,
        source_url: impl Into<String>,
        format: AudioFormat,
        quality_kbps: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            source_url: source_url.into(),
            format,
            quality_kbps,
            state: JobState::Queued,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    pub fn progress(&self) -> u8 {
        self.state.progress()
    }
}
