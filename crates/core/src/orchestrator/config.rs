//! Orchestrator configuration.

use crate::config::{Config, MAX_QUALITY_KBPS, MIN_QUALITY_KBPS};
use crate::converter::AudioFormat;

/// Submission policy for the job orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Source URLs must start with one of these.
    pub allowed_prefixes: Vec<String>,
    /// Output formats a request may ask for.
    pub allowed_formats: Vec<AudioFormat>,
    /// Format used when the request names none.
    pub default_format: AudioFormat,
    /// Bitrate used when the request names none.
    pub default_quality_kbps: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            allowed_prefixes: vec![
                "https://www.youtube.com/".to_string(),
                "https://youtu.be/".to_string(),
                "https://youtube.com/".to_string(),
            ],
            allowed_formats: vec![AudioFormat::Mp3],
            default_format: AudioFormat::Mp3,
            default_quality_kbps: 192,
        }
    }
}

impl OrchestratorConfig {
    /// Whether `kbps` is an accepted bitrate.
    pub fn quality_in_range(kbps: u32) -> bool {
        (MIN_QUALITY_KBPS..=MAX_QUALITY_KBPS).contains(&kbps)
    }
}

impl From<&Config> for OrchestratorConfig {
    /// Derives the policy from a validated config. Extensions that do not
    /// name an audio format are skipped.
    fn from(config: &Config) -> Self {
        let mut allowed_formats: Vec<AudioFormat> = Vec::new();
        for ext in &config.storage.allowed_extensions {
            if let Ok(format) = ext.parse::<AudioFormat>() {
                if !allowed_formats.contains(&format) {
                    allowed_formats.push(format);
                }
            }
        }

        let default_format = config
            .converter
            .default_format
            .parse()
            .unwrap_or(AudioFormat::Mp3);

        Self {
            allowed_prefixes: config.sources.allowed_prefixes.clone(),
            allowed_formats,
            default_format,
            default_quality_kbps: config.converter.default_quality_kbps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    #[test]
    fn test_from_config() {
        let config = load_config_from_str(
            r#"
            [auth]
            method = "none"

            [storage]
            allowed_extensions = ["mp3", "flac", "MP3"]

            [converter]
            default_quality_kbps = 256
            "#,
        )
        .unwrap();

        let orch = OrchestratorConfig::from(&config);
        assert_eq!(
            orch.allowed_formats,
            vec![AudioFormat::Mp3, AudioFormat::Flac]
        );
        assert_eq!(orch.default_format, AudioFormat::Mp3);
        assert_eq!(orch.default_quality_kbps, 256);
        assert_eq!(orch.allowed_prefixes.len(), 3);
    }

    #[test]
    fn test_quality_range() {
        assert!(OrchestratorConfig::quality_in_range(32));
        assert!(OrchestratorConfig::quality_in_range(320));
        assert!(!OrchestratorConfig::quality_in_range(31));
        assert!(!OrchestratorConfig::quality_in_range(321));
    }
}
