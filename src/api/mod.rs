// HTTP surface: router construction and request handlers
//
// Handlers stay thin: multipart parsing and response encoding here, all
// sequencing and error mapping in the orchestration pipeline. Heavy work
// runs on the blocking pool; a panic inside it is caught at the join
// point and mapped to a generic 500 so raw internals never leak.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::core::config::Config;
use crate::core::types::{HealthResponse, ProcessResponse, ProcessingResult};
use crate::orchestration::{ApiError, Pipeline};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// Build the application router with CORS and a body limit sized to the
/// configured upload ceiling (plus multipart overhead slack)
pub fn app(pipeline: Arc<Pipeline>, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = config.max_file_size() * 2 + 1024 * 1024;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/process", post(process_image))
        .route("/results/:image_id", get(get_results))
        .with_state(AppState { pipeline })
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
}

async fn root() -> &'static str {
    "Rune-X OCR API - Chinese OCR with annotation and translation"
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "OCR API is running".to_string(),
    })
}

/// POST /process: multipart upload, field "file"
async fn process_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, ApiError> {
    let mut upload: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(|ct| ct.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Read error: {e}")))?;

        upload = Some((filename, content_type, data.to_vec()));
        break;
    }

    let Some((filename, content_type, bytes)) = upload else {
        return Err(ApiError::missing_file());
    };

    let pipeline = state.pipeline.clone();
    let response = tokio::task::spawn_blocking(move || {
        pipeline.process_upload(&filename, content_type.as_deref(), &bytes)
    })
    .await
    .map_err(|e| {
        error!("Processing task failed: {}", e);
        ApiError::internal("Processing task failed unexpectedly")
    })??;

    Ok(Json(response))
}

/// GET /results/{image_id}: stored result, without the status message
async fn get_results(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Json<ProcessingResult>, ApiError> {
    let pipeline = state.pipeline.clone();
    let result = tokio::task::spawn_blocking(move || pipeline.fetch_result(&image_id))
        .await
        .map_err(|e| {
            error!("Results task failed: {}", e);
            ApiError::internal("Results task failed unexpectedly")
        })??;

    Ok(Json(result))
}
