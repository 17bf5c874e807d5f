//! Service metadata endpoints: health, info, index, config and metrics.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use convertino_core::SanitizedConfig;

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

/// Public service name.
pub const SERVICE_NAME: &str = "YouTube to MP3 Converter API";

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_RAPIDAPI_HOST: &str = "youtube-to-mp3-converter.p.rapidapi.com";

fn rapidapi_host(state: &AppState) -> &str {
    state
        .config()
        .auth
        .api_host
        .as_deref()
        .unwrap_or(DEFAULT_RAPIDAPI_HOST)
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "service": SERVICE_NAME,
        "version": VERSION,
        "rapidapi_compatible": true,
        "development_mode": state.development_mode(),
    }))
}

/// Self-description of the API: endpoints, parameters and usage examples.
pub async fn info(State(state): State<Arc<AppState>>) -> Json<Value> {
    let host = rapidapi_host(&state);
    let defaults = state.orchestrator().config();
    let formats: Vec<&str> = defaults
        .allowed_formats
        .iter()
        .map(|f| f.extension())
        .collect();

    Json(json!({
        "success": true,
        "api_info": {
            "name": SERVICE_NAME,
            "version": VERSION,
            "provider": "RapidAPI",
            "description": "Convert YouTube videos to MP3 format with high quality audio extraction",
            "development_mode": state.development_mode(),
        },
        "endpoints": {
            "POST /api/convert": {
                "description": "Convert YouTube video to MP3",
                "parameters": {
                    "url": {
                        "type": "string",
                        "required": true,
                        "description": "YouTube video URL",
                    },
                    "quality": {
                        "type": "string",
                        "required": false,
                        "default": defaults.default_quality_kbps.to_string(),
                        "description": "Audio quality in kbps (128, 192, 320)",
                    },
                    "format": {
                        "type": "string",
                        "required": false,
                        "default": defaults.default_format.extension(),
                        "description": format!("Output format ({})", formats.join(", ")),
                    },
                },
                "headers": {
                    "X-RapidAPI-Key": "Your RapidAPI key (not required in development mode)",
                    "X-RapidAPI-Host": format!("{} (not required in development mode)", host),
                    "Content-Type": "application/json",
                },
            },
            "GET /api/status/{task_id}": {
                "description": "Check conversion status",
                "parameters": {
                    "task_id": {
                        "type": "string",
                        "required": true,
                        "description": "Task ID returned from convert endpoint",
                    },
                },
            },
            "GET /api/download/{filename}": {
                "description": "Download converted file",
                "parameters": {
                    "filename": {
                        "type": "string",
                        "required": true,
                        "description": "Filename returned from status endpoint",
                    },
                },
            },
        },
        "usage_examples": {
            "convert_video": {
                "curl": "curl -X POST \"https://your-api-url.com/api/convert\" \\\n  -H \"Content-Type: application/json\" \\\n  -d '{\"url\": \"https://www.youtube.com/watch?v=VIDEO_ID\"}'",
                "javascript": "const response = await fetch(\"https://your-api-url.com/api/convert\", {\n  method: \"POST\",\n  headers: {\n    \"Content-Type\": \"application/json\"\n  },\n  body: JSON.stringify({\n    url: \"https://www.youtube.com/watch?v=VIDEO_ID\"\n  })\n});",
            },
        },
    }))
}

pub async fn index(State(state): State<Arc<AppState>>) -> Json<Value> {
    let host = rapidapi_host(&state);
    Json(json!({
        "name": SERVICE_NAME,
        "version": VERSION,
        "rapidapi_compatible": true,
        "development_mode": state.development_mode(),
        "endpoints": {
            "POST /api/convert": "Convert YouTube video to MP3",
            "GET /api/status/<task_id>": "Get conversion status",
            "GET /api/download/<filename>": "Download converted file",
            "GET /api/health": "Health check",
            "GET /api/info": "API information and documentation",
        },
        "rapidapi_headers": {
            "X-RapidAPI-Key": "Your RapidAPI key (not required in development mode)",
            "X-RapidAPI-Host": format!("{} (not required in development mode)", host),
        },
    }))
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
