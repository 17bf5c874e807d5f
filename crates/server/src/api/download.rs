//! Artifact download handler.

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{debug, error};

use convertino_core::StorageError;

use super::error::{internal_error, ApiError, ErrorResponse};
use crate::state::AppState;

/// Stream a converted file as an attachment.
///
/// Range and conditional requests are handled by `ServeFile`.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    request: Request,
) -> Response {
    let path = match state.store().get(&filename).await {
        Ok(path) => path,
        Err(e) => return storage_error(&state, e).into_response(),
    };

    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    // Swept between lookup and open
    if response.status() == StatusCode::NOT_FOUND {
        return not_found(&filename).into_response();
    }

    debug!("Serving {}", path.display());
    let mut response = response.map(Body::new);
    if response.status().is_success() {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, content_disposition(&filename));
    }
    response
}

fn not_found(filename: &str) -> ApiError {
    ErrorResponse::new(
        "File not found",
        format!("File {} not found or has expired", filename),
    )
    .into_api_error(StatusCode::NOT_FOUND)
}

fn storage_error(state: &AppState, e: StorageError) -> ApiError {
    match e {
        StorageError::DisallowedExtension { .. } => {
            let allowed: Vec<String> = state
                .store()
                .allowed_extensions()
                .iter()
                .map(|ext| ext.to_ascii_uppercase())
                .collect();
            ErrorResponse::new(
                "Invalid file type",
                format!("Only {} files are allowed for download", allowed.join("/")),
            )
            .into_api_error(StatusCode::BAD_REQUEST)
        }
        StorageError::InvalidFilename { .. } => {
            ErrorResponse::new("Invalid filename", e.to_string())
                .into_api_error(StatusCode::BAD_REQUEST)
        }
        StorageError::NotFound { filename } => not_found(&filename),
        other => {
            error!("Download failed: {}", other);
            internal_error(other.to_string())
        }
    }
}

/// `attachment` disposition with an ASCII fallback and the UTF-8 name.
fn content_disposition(filename: &str) -> HeaderValue {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
