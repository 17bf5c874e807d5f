use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    5000
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Expected value of the `X-RapidAPI-Key` header (required for `rapid_api`).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Expected value of the `X-RapidAPI-Host` header. When unset, any
    /// non-empty host header is accepted.
    #[serde(default)]
    pub api_host: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Development mode: every request is accepted.
    None,
    /// RapidAPI marketplace header pair.
    RapidApi,
}

/// Artifact store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding converted artifacts.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    /// Artifacts older than this are deleted by the sweep.
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,
    /// Extensions that may be served from the store (lowercase, no dot).
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// Re-run the sweep every N seconds. 0 = only at startup.
    #[serde(default)]
    pub sweep_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            retention_hours: default_retention_hours(),
            allowed_extensions: default_allowed_extensions(),
            sweep_interval_secs: 0,
        }
    }
}

impl StorageConfig {
    /// Retention window as a duration.
    pub fn retention(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.retention_hours.saturating_mul(3600))
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_retention_hours() -> u64 {
    24
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["mp3".to_string()]
}

/// Conversion operation (yt-dlp) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConverterConfig {
    /// Path to the yt-dlp binary.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,
    /// Directory or binary path handed to yt-dlp's `--ffmpeg-location`.
    #[serde(default)]
    pub ffmpeg_location: Option<PathBuf>,
    /// Per-call timeout in seconds. Unset means calls may run indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Output format used when a request does not name one.
    #[serde(default = "default_format")]
    pub default_format: String,
    /// Audio bitrate used when a request does not name one.
    #[serde(default = "default_quality")]
    pub default_quality_kbps: u32,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            ffmpeg_location: None,
            timeout_secs: None,
            default_format: default_format(),
            default_quality_kbps: default_quality(),
        }
    }
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_format() -> String {
    "mp3".to_string()
}

fn default_quality() -> u32 {
    192
}

/// Accepted source URLs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    #[serde(default = "default_allowed_prefixes")]
    pub allowed_prefixes: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            allowed_prefixes: default_allowed_prefixes(),
        }
    }
}

fn default_allowed_prefixes() -> Vec<String> {
    vec![
        "https://www.youtube.com/".to_string(),
        "https://youtu.be/".to_string(),
        "https://youtube.com/".to_string(),
    ]
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub converter: ConverterConfig,
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::RapidApi => "rapid_api".to_string(),
                },
                api_key_configured: config
                    .auth
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
                api_host: config.auth.api_host.clone(),
            },
            server: config.server.clone(),
            storage: config.storage.clone(),
            converter: config.converter.clone(),
            sources: config.sources.clone(),
        }
    }
}
