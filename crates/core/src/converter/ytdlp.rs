//! yt-dlp based converter implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::process::{Output, Stdio};
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::error::ConverterError;
use super::traits::MediaConverter;
use super::types::{MediaMetadata, TranscodeRequest};
use crate::config::ConverterConfig;
use crate::metrics::PROVIDER_CALL_DURATION;

const OP_METADATA: &str = "metadata extraction";
const OP_DOWNLOAD: &str = "download";

/// Converter that shells out to yt-dlp (which drives ffmpeg for extraction).
pub struct YtDlpConverter {
    config: ConverterConfig,
}

impl YtDlpConverter {
    /// Creates a new yt-dlp converter with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    fn build_metadata_args(url: &str) -> Vec<String> {
        vec![
            "--dump-single-json".to_string(),
            "--no-playlist".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
            url.to_string(),
        ]
    }

    fn build_download_args(&self, request: &TranscodeRequest) -> Vec<String> {
        let mut args = vec![
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            "-f".to_string(),
            "bestaudio/best".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            request.format.ytdlp_codec().to_string(),
        ];

        if !request.format.is_lossless() {
            args.extend([
                "--audio-quality".to_string(),
                format!("{}K", request.quality_kbps),
            ]);
        }

        if let Some(ref ffmpeg) = self.config.ffmpeg_location {
            args.extend([
                "--ffmpeg-location".to_string(),
                ffmpeg.to_string_lossy().to_string(),
            ]);
        }

        args.extend([
            "-o".to_string(),
            request.output_template.to_string_lossy().to_string(),
            request.source_url.clone(),
        ]);

        args
    }

    /// Parses the `--dump-single-json` document.
    fn parse_metadata(url: &str, output: &str) -> Result<MediaMetadata, ConverterError> {
        #[derive(Deserialize)]
        struct InfoDict {
            title: Option<String>,
            webpage_url: Option<String>,
            duration: Option<f64>,
            thumbnail: Option<String>,
            uploader: Option<String>,
            upload_date: Option<String>,
            view_count: Option<u64>,
        }

        let info: InfoDict = serde_json::from_str(output)
            .map_err(|e| ConverterError::parse(format!("invalid info JSON: {}", e)))?;

        let title = info
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConverterError::parse("info JSON has no title"))?;

        Ok(MediaMetadata {
            title,
            webpage_url: info.webpage_url.unwrap_or_else(|| url.to_string()),
            duration: info.duration.map(|d| d.max(0.0).round() as u64).unwrap_or(0),
            thumbnail: info.thumbnail.unwrap_or_default(),
            uploader: info.uploader.unwrap_or_default(),
            upload_date: info.upload_date.unwrap_or_default(),
            view_count: info.view_count.unwrap_or(0),
        })
    }

    /// Picks the most useful line out of yt-dlp's stderr.
    fn failure_reason(output: &Output) -> String {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        lines
            .iter()
            .rev()
            .find(|l| l.starts_with("ERROR"))
            .or_else(|| lines.last())
            .map(|l| l.trim_start_matches("ERROR:").trim().to_string())
            .unwrap_or_else(|| format!("yt-dlp exited with code: {:?}", output.status.code()))
    }

    async fn run(&self, operation: &'static str, args: &[String]) -> Result<Output, ConverterError> {
        debug!("Running {:?} {:?}", self.config.ytdlp_path, args);
        let start = Instant::now();

        let child = Command::new(&self.config.ytdlp_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConverterError::BinaryNotFound {
                        path: self.config.ytdlp_path.clone(),
                    }
                } else {
                    ConverterError::Io(e)
                }
            })?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = match self.config.timeout_secs {
            Some(secs) => timeout(Duration::from_secs(secs), child.wait_with_output())
                .await
                .map_err(|_| ConverterError::Timeout {
                    operation,
                    timeout_secs: secs,
                })??,
            None => child.wait_with_output().await?,
        };

        PROVIDER_CALL_DURATION
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());

        if !output.status.success() {
            return Err(ConverterError::provider_failed(
                operation,
                Self::failure_reason(&output),
            ));
        }

        Ok(output)
    }
}

#[async_trait]
impl MediaConverter for YtDlpConverter {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn extract_metadata(&self, url: &str) -> Result<MediaMetadata, ConverterError> {
        let output = self.run(OP_METADATA, &Self::build_metadata_args(url)).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_metadata(url, &stdout)
    }

    async fn fetch_and_transcode(&self, request: &TranscodeRequest) -> Result<(), ConverterError> {
        if let Some(parent) = request.output_template.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        self.run(OP_DOWNLOAD, &self.build_download_args(request))
            .await
            .map(|_| ())
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        self.run("version check", &["--version".to_string()])
            .await
            .map(|_| ())
    }
}
