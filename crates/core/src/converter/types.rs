//! Types for the conversion operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::job::JobId;

/// Audio format produced by the transcode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// MPEG Audio Layer III
    Mp3,
    /// AAC in an MPEG-4 container
    M4a,
    /// Opus
    Opus,
    /// Ogg Vorbis
    Vorbis,
    /// Free Lossless Audio Codec (lossless)
    Flac,
    /// WAVE (uncompressed)
    Wav,
}

impl AudioFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
            Self::Opus => "opus",
            Self::Vorbis => "ogg",
            Self::Flac => "flac",
            Self::Wav => "wav",
        }
    }

    /// Returns the value passed to yt-dlp's `--audio-format`.
    pub fn ytdlp_codec(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
            Self::Opus => "opus",
            Self::Vorbis => "vorbis",
            Self::Flac => "flac",
            Self::Wav => "wav",
        }
    }

    /// Whether this format is lossless (bitrate is ignored).
    pub fn is_lossless(&self) -> bool {
        matches!(self, Self::Flac | Self::Wav)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    /// Accepts codec names and file extensions, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "m4a" | "aac" => Ok(Self::M4a),
            "opus" => Ok(Self::Opus),
            "ogg" | "vorbis" => Ok(Self::Vorbis),
            "flac" => Ok(Self::Flac),
            "wav" => Ok(Self::Wav),
            other => Err(format!("unsupported audio format: {}", other)),
        }
    }
}

/// Metadata returned by the extraction step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub title: String,
    /// Canonical page URL, used for the download step.
    pub webpage_url: String,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub uploader: String,
    /// Upload date as reported by the provider (`YYYYMMDD`).
    #[serde(default)]
    pub upload_date: String,
    #[serde(default)]
    pub view_count: u64,
}

/// Input of the download + transcode step.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeRequest {
    pub job_id: JobId,
    pub source_url: String,
    /// Output path without extension. The provider may append one, or write
    /// somewhere else entirely; callers must locate the result themselves.
    pub output_template: PathBuf,
    pub format: AudioFormat,
    pub quality_kbps: u32,
}
