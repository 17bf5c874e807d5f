use super::{types::Config, AuthMethod, ConfigError};
use crate::converter::AudioFormat;

/// Lowest and highest bitrate accepted for `default_quality_kbps`.
pub const MIN_QUALITY_KBPS: u32 = 32;
pub const MAX_QUALITY_KBPS: u32 = 320;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::RapidApi
        && config.auth.api_key.as_deref().unwrap_or("").is_empty()
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when method = \"rapid_api\"".to_string(),
        ));
    }

    if config.sources.allowed_prefixes.is_empty() {
        return Err(ConfigError::ValidationError(
            "sources.allowed_prefixes cannot be empty".to_string(),
        ));
    }

    if config.storage.allowed_extensions.is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.allowed_extensions cannot be empty".to_string(),
        ));
    }

    for ext in &config.storage.allowed_extensions {
        if ext.parse::<AudioFormat>().is_err() {
            return Err(ConfigError::ValidationError(format!(
                "storage.allowed_extensions contains unsupported format: {}",
                ext
            )));
        }
    }

    let default_format = config.converter.default_format.to_lowercase();
    if !config
        .storage
        .allowed_extensions
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(&default_format))
    {
        return Err(ConfigError::ValidationError(format!(
            "converter.default_format '{}' is not in storage.allowed_extensions",
            config.converter.default_format
        )));
    }

    if !(MIN_QUALITY_KBPS..=MAX_QUALITY_KBPS).contains(&config.converter.default_quality_kbps) {
        return Err(ConfigError::ValidationError(format!(
            "converter.default_quality_kbps must be between {} and {}",
            MIN_QUALITY_KBPS, MAX_QUALITY_KBPS
        )));
    }

    if config.storage.sweep_interval_secs > 0 && config.storage.retention_hours == 0 {
        return Err(ConfigError::ValidationError(
            "storage.retention_hours must be at least 1 when storage.sweep_interval_secs is set"
                .to_string(),
        ));
    }

    Ok(())
}
