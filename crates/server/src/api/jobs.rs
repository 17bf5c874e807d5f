//! Conversion job API handlers.

use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use convertino_core::{CompletedJob, Job, JobError, JobStatus, OrchestratorError, SubmitRequest};

use super::error::{internal_error, ApiError, ErrorResponse};
use super::middleware::AuthUser;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Quality as sent by clients: `"192"`, `"192k"` or `192`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QualityField {
    Text(String),
    Number(serde_json::Number),
}

/// Convert request body, accepted as JSON, an urlencoded form or multipart.
#[derive(Debug, Default, Deserialize)]
struct ConvertFields {
    url: Option<String>,
    format: Option<String>,
    quality: Option<QualityField>,
}

impl From<ConvertFields> for SubmitRequest {
    fn from(fields: ConvertFields) -> Self {
        SubmitRequest {
            url: fields.url,
            format: fields.format,
            quality: fields.quality.map(|q| match q {
                QualityField::Text(s) => s,
                QualityField::Number(n) => n.to_string(),
            }),
        }
    }
}

/// Extractor for the convert body.
///
/// Dispatches on `Content-Type`: JSON, urlencoded and multipart bodies are
/// parsed, anything else yields an empty request.
pub struct ConvertBody(pub SubmitRequest);

impl<S> FromRequest<S> for ConvertBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let fields = if content_type.starts_with("application/json") {
            let Json(fields) = Json::<ConvertFields>::from_request(req, state)
                .await
                .map_err(|e| invalid_body(e.body_text()))?;
            fields
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<ConvertFields>::from_request(req, state)
                .await
                .map_err(|e| invalid_body(e.body_text()))?;
            fields
        } else if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| invalid_body(e.body_text()))?;
            read_multipart(multipart).await?
        } else {
            ConvertFields::default()
        };

        Ok(ConvertBody(fields.into()))
    }
}

/// Collects the known text fields of a multipart body. Unknown parts are
/// skipped.
async fn read_multipart(mut multipart: Multipart) -> Result<ConvertFields, ApiError> {
    let mut fields = ConvertFields::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| invalid_body(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if !matches!(name.as_str(), "url" | "format" | "quality") {
            continue;
        }
        let text = field.text().await.map_err(|e| invalid_body(e.body_text()))?;
        match name.as_str() {
            "url" => fields.url = Some(text),
            "format" => fields.format = Some(text),
            _ => fields.quality = Some(QualityField::Text(text)),
        }
    }
    Ok(fields)
}

fn invalid_body(message: String) -> ApiError {
    ErrorResponse::new("Invalid request body", message).into_api_error(StatusCode::BAD_REQUEST)
}

/// Status payload: coarse status, progress and either the result fields or
/// the failure message.
#[derive(Debug, Serialize)]
pub struct JobData {
    pub status: JobStatus,
    pub progress: u8,
    #[serde(flatten)]
    pub result: Option<CompletedJob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&Job> for JobData {
    fn from(job: &Job) -> Self {
        Self {
            status: job.status(),
            progress: job.progress(),
            result: job.state.completed().cloned(),
            message: job.state.error_message().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub task_id: String,
    pub data: JobData,
}

// ============================================================================
// Handlers
// ============================================================================

/// Start a conversion job.
pub async fn convert(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    ConvertBody(request): ConvertBody,
) -> Response {
    match state.orchestrator().submit(request).await {
        Ok(task_id) => {
            info!("Conversion {} started for {}", task_id, user_id);
            let provider = if state.development_mode() {
                "Development"
            } else {
                "RapidAPI"
            };
            (
                StatusCode::ACCEPTED,
                Json(json!({
                    "success": true,
                    "task_id": task_id.to_string(),
                    "status": "started",
                    "message": "Conversion started successfully",
                    "api_info": {
                        "provider": provider,
                        "endpoint": "/api/convert",
                        "usage": "Use the task_id to check status at /api/status/{task_id}",
                    },
                })),
            )
                .into_response()
        }
        Err(e) => submit_error(&state, e).into_response(),
    }
}

fn submit_error(state: &AppState, e: OrchestratorError) -> ApiError {
    match e {
        OrchestratorError::MissingUrl => {
            let defaults = state.orchestrator().config();
            ErrorResponse::new("Missing required parameter", "URL parameter is required")
                .with_parameters(json!({
                    "url": "YouTube video URL (required)",
                    "quality": format!(
                        "Audio quality in kbps (optional, default: {})",
                        defaults.default_quality_kbps
                    ),
                    "format": format!(
                        "Output format (optional, default: {})",
                        defaults.default_format
                    ),
                }))
                .into_api_error(StatusCode::BAD_REQUEST)
        }
        OrchestratorError::InvalidUrl(_) => {
            ErrorResponse::new("Invalid URL format", "Please provide a valid YouTube URL")
                .into_api_error(StatusCode::BAD_REQUEST)
        }
        OrchestratorError::Registry(_) => {
            error!("Failed to record job: {}", e);
            internal_error(e.to_string())
        }
    }
}

/// Report the current state of a job.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<(StatusCode, Json<StatusResponse>), ApiError> {
    match state.orchestrator().status(&task_id) {
        Ok(job) => Ok((
            StatusCode::OK,
            Json(StatusResponse {
                success: job.status() != JobStatus::Error,
                task_id: job.id.to_string(),
                data: JobData::from(&job),
            }),
        )),
        Err(JobError::NotFound(_)) => Err(ErrorResponse::new(
            "Task not found",
            format!("No task found with ID: {}", task_id),
        )
        .with_task_id(task_id)
        .into_api_error(StatusCode::NOT_FOUND)),
        Err(e) => {
            error!("Failed to read job {}: {}", task_id, e);
            Err(internal_error(e.to_string()))
        }
    }
}
