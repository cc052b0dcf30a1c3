//! Insert clip staging handlers.
//!
//! The insert clip must be staged before a batch referencing it is
//! accepted. It arrives either as a multipart upload or as a JSON body
//! naming a remote URL to fetch.

use std::path::Path;

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use tokio::io::AsyncWriteExt;
use tracing::info;
use validator::Validate;

use vsplice_media::{fetch_to_file, MediaError};
use vsplice_models::{UploadInsertRequest, UploadInsertResponse};

use crate::error::{ApiError, ApiResult};
use crate::metrics::record_insert_staged;
use crate::state::AppState;

/// Fallback filename when neither the upload nor the URL carries one.
const DEFAULT_INSERT_FILENAME: &str = "insert_video.mp4";

/// `POST /api/upload-insert`
///
/// Dispatches on the request content type: multipart bodies are written
/// directly to the staging area, JSON bodies name a URL to fetch from.
pub async fn upload_insert(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Json<UploadInsertResponse>> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?;
        stage_uploaded_file(&state, multipart).await
    } else {
        let Json(body): Json<UploadInsertRequest> = Json::from_request(request, &())
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {e}")))?;
        body.validate()
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        stage_remote_file(&state, &body.video_url).await
    }
}

/// Write the first file field of a multipart upload into the staging area.
async fn stage_uploaded_file(
    state: &AppState,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadInsertResponse>> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart field: {e}")))?
    {
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let filename = sanitize_filename(&original_name);
        let dest = state.pipeline.staged_insert_path(&filename);

        let mut file = tokio::fs::File::create(&dest)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to create staging file: {e}")))?;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::bad_request(format!("Upload interrupted: {e}")))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| ApiError::internal(format!("Failed to write staging file: {e}")))?;
        }
        file.flush()
            .await
            .map_err(|e| ApiError::internal(format!("Failed to write staging file: {e}")))?;

        info!(filename, "Insert clip staged from upload");
        record_insert_staged("upload");

        return Ok(Json(UploadInsertResponse {
            status: "success".to_string(),
            filename,
        }));
    }

    Err(ApiError::bad_request("No file field in multipart body"))
}

/// Download a remote insert clip into the staging area.
async fn stage_remote_file(state: &AppState, url: &str) -> ApiResult<Json<UploadInsertResponse>> {
    let filename = filename_from_url(url);
    let dest = state.pipeline.staged_insert_path(&filename);

    fetch_to_file(&state.http, url, &dest).await.map_err(|e| {
        // The remote host failed us, not the caller or this service
        match e {
            MediaError::DownloadFailed { message } => ApiError::bad_gateway(message),
            other => ApiError::from(other),
        }
    })?;

    info!(filename, url, "Insert clip staged from URL");
    record_insert_staged("url");

    Ok(Json(UploadInsertResponse {
        status: "success".to_string(),
        filename,
    }))
}

/// Strip any path components so a staged file can never escape the
/// staging directory.
fn sanitize_filename(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_INSERT_FILENAME.to_string())
}

/// Derive a staging filename from the URL's last path segment,
/// percent-decoded. Falls back to a fixed name when the URL has none.
fn filename_from_url(url: &str) -> String {
    let parsed = match url::Url::parse(url) {
        Ok(u) => u,
        Err(_) => return DEFAULT_INSERT_FILENAME.to_string(),
    };

    parsed
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::decode(s).map(|d| d.into_owned()).unwrap_or_else(|_| s.to_string()))
        .map(|s| sanitize_filename(&s))
        .unwrap_or_else(|| DEFAULT_INSERT_FILENAME.to_string())
}
