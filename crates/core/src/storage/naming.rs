//! Artifact file naming.

use crate::converter::AudioFormat;
use crate::job::JobId;

const FALLBACK_TITLE: &str = "audio";

/// Reduces a media title to characters safe in a file name.
///
/// Keeps alphanumerics (any script), space, `-` and `_`, then trims trailing
/// whitespace. An empty result becomes `audio`.
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let trimmed = kept.trim_end();
    if trimmed.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Output path without extension, as handed to the converter.
pub fn artifact_stem(title: &str, job_id: &JobId) -> String {
    format!("{}_{}", sanitize_title(title), job_id)
}

/// Final artifact file name: `{sanitized_title}_{job_id}.{ext}`.
pub fn artifact_filename(title: &str, job_id: &JobId, format: AudioFormat) -> String {
    format!("{}.{}", artifact_stem(title, job_id), format.extension())
}

/// Relative download URL for an artifact.
pub fn download_url(filename: &str) -> String {
    format!("/api/download/{}", urlencoding::encode(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_title() {
        assert_eq!(
            sanitize_title("Rick Astley - Never Gonna Give You Up (Official Video)"),
            "Rick Astley - Never Gonna Give You Up Official Video"
        );
        assert_eq!(sanitize_title("a/b\\c:d*e?f\"g<h>i|j"), "abcdefghij");
        assert_eq!(sanitize_title("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_title("trailing   "), "trailing");
        assert_eq!(sanitize_title("  leading"), "  leading");
        assert_eq!(sanitize_title("Café Señorita 東京"), "Café Señorita 東京");
    }

    #[test]
    fn test_sanitize_title_fallback() {
        assert_eq!(sanitize_title(""), "audio");
        assert_eq!(sanitize_title("!!!???"), "audio");
        assert_eq!(sanitize_title("   "), "audio");
    }

    #[test]
    fn test_artifact_filename() {
        let id: JobId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        assert_eq!(
            artifact_filename("My Song!", &id, AudioFormat::Mp3),
            "My Song_67e55044-10b1-426f-9247-bb680e5fe0c8.mp3"
        );
        assert_eq!(
            artifact_filename("x", &id, AudioFormat::Vorbis),
            "x_67e55044-10b1-426f-9247-bb680e5fe0c8.ogg"
        );
    }

    #[test]
    fn test_download_url_is_encoded() {
        assert_eq!(
            download_url("My Song_id.mp3"),
            "/api/download/My%20Song_id.mp3"
        );
    }
}
