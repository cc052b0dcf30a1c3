//! Batch intake handler.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use validator::Validate;

use vsplice_models::{BatchRequest, TaskAccepted};

use crate::error::{ApiError, ApiResult};
use crate::metrics::record_batch_accepted;
use crate::state::AppState;

/// `POST /api/process`
///
/// Validates the request and the staged insert clip, then hands the batch
/// to the pipeline and returns 202 immediately. Results arrive at the
/// caller's webhook, never in this response.
pub async fn process_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> ApiResult<(StatusCode, Json<TaskAccepted>)> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let insert_path = state
        .pipeline
        .staged_insert_path(&request.insert_video_filename);
    if !insert_path.exists() {
        return Err(ApiError::not_found(format!(
            "Insert video '{}' has not been uploaded",
            request.insert_video_filename
        )));
    }

    info!(
        request_id = %request.request_id,
        videos = request.video_urls.len(),
        "Batch accepted"
    );
    record_batch_accepted(request.video_urls.len());

    let request_id = request.request_id.clone();
    let pipeline = Arc::clone(&state.pipeline);
    tokio::spawn(async move {
        pipeline.run(request).await;
    });

    Ok((StatusCode::ACCEPTED, Json(TaskAccepted::pending(request_id))))
}
