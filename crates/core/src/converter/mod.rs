//! Conversion operation: the external fetch + transcode collaborator.
//!
//! The `MediaConverter` trait is a two-phase black box:
//!
//! - `extract_metadata`: title, canonical URL, duration, thumbnail, uploader,
//!   upload date and view count for a source URL
//! - `fetch_and_transcode`: download the source and write an audio file
//!   somewhere near a requested output template
//!
//! `YtDlpConverter` implements it on top of the yt-dlp binary.
//!
//! # Example
//!
//! ```ignore
//! use convertino_core::converter::{MediaConverter, TranscodeRequest, AudioFormat, YtDlpConverter};
//!
//! let converter = YtDlpConverter::with_defaults();
//! converter.validate().await?;
//!
//! let meta = converter.extract_metadata("https://youtu.be/dQw4w9WgXcQ").await?;
//! converter.fetch_and_transcode(&TranscodeRequest {
//!     job_id,
//!     source_url: meta.webpage_url.clone(),
//!     output_template: PathBuf::from("downloads/Song_<id>"),
//!     format: AudioFormat::Mp3,
//!     quality_kbps: 192,
//! }).await?;
//! ```

mod error;
mod traits;
mod types;
mod ytdlp;

pub use error::ConverterError;
pub use traits::MediaConverter;
pub use types::{AudioFormat, MediaMetadata, TranscodeRequest};
pub use ytdlp::YtDlpConverter;
