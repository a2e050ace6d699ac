//! Route handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::BoxError;

use crate::document::{detect_file_type, FileType, PageCounter};
use crate::error::CountError;
use crate::http::request::{parse_file_url, request_id, CountPagesRequest};
use crate::http::response::{CountPagesResponse, HealthResponse};
use crate::http::server::AppState;
use crate::observability::metrics;

/// `POST /api/count-pages`
pub async fn count_pages(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CountPagesRequest>, JsonRejection>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers);

    match run_count(&state, &request_id, payload).await {
        Ok(body) => {
            tracing::info!(
                request_id = %request_id,
                file_type = %body.file_type,
                page_count = body.page_count,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Page count complete"
            );
            metrics::record_request(200, "ok", start_time);
            Json(body).into_response()
        }
        Err(err) => {
            let status = err.status_code();
            if status.is_server_error() {
                tracing::error!(request_id = %request_id, kind = err.kind(), error = %err, "Count failed");
            } else {
                tracing::warn!(request_id = %request_id, kind = err.kind(), error = %err, "Count rejected");
            }
            metrics::record_request(status.as_u16(), err.kind(), start_time);
            err.into_response()
        }
    }
}

async fn run_count(
    state: &AppState,
    request_id: &str,
    payload: Result<Json<CountPagesRequest>, JsonRejection>,
) -> Result<CountPagesResponse, CountError> {
    let Json(request) = payload.map_err(body_rejection)?;
    let file_url = request.file_url()?;
    let url = parse_file_url(file_url)?;

    tracing::info!(request_id = %request_id, url = %url, "Downloading file");
    let bytes = state.downloader.fetch(&url).await.map_err(|err| {
        tracing::debug!(request_id = %request_id, detail = %err.detail(), "Download failed");
        err
    })?;
    metrics::record_download(bytes.len());

    let detection = detect_file_type(&bytes, file_url).ok_or(CountError::UnsupportedFormat)?;
    if !detection.signature_verified {
        tracing::warn!(
            request_id = %request_id,
            file_type = %detection.file_type,
            "ZIP signature missing, accepting on extension alone"
        );
    }

    tracing::info!(request_id = %request_id, file_type = %detection.file_type, bytes = bytes.len(), "Counting pages");
    let page_count = count_blocking(state.counter.clone(), bytes, detection.file_type).await?;

    Ok(CountPagesResponse::new(page_count, detection.file_type, file_url))
}

fn body_rejection(rejection: JsonRejection) -> CountError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        CountError::BodyTooLarge
    } else {
        CountError::InvalidBody(rejection.body_text())
    }
}

/// Run the CPU-bound counter off the async workers.
async fn count_blocking(
    counter: Arc<dyn PageCounter>,
    bytes: Vec<u8>,
    file_type: FileType,
) -> Result<u32, CountError> {
    tokio::task::spawn_blocking(move || counter.count(&bytes, file_type))
        .await
        .map_err(|e| CountError::Internal(format!("counting task failed: {}", e)))?
        .map_err(|source| CountError::Counting { file_type, source })
}

/// Error handler for the middleware stack; keeps the JSON envelope.
pub async fn middleware_error(err: BoxError) -> Response {
    let err = if err.is::<tower::timeout::error::Elapsed>() {
        CountError::RequestTimeout
    } else {
        CountError::Internal(err.to_string())
    };
    tracing::warn!(kind = err.kind(), error = %err, "Request aborted by middleware");
    err.into_response()
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// `GET /`
pub async fn index() -> Json<Value> {
    let formats: Vec<&str> = FileType::ALL.iter().map(FileType::label).collect();

    Json(json!({
        "message": "Page counting API for Word and PowerPoint files",
        "version": env!("CARGO_PKG_VERSION"),
        "supportedFormats": formats,
        "endpoint": "POST /api/count-pages",
        "examples": [
            {
                "method": "POST",
                "url": "/api/count-pages",
                "body": { "fileUrl": "https://example.com/document.docx" }
            },
            {
                "method": "POST",
                "url": "/api/count-pages",
                "body": { "fileUrl": "https://example.com/presentation.pptx" }
            }
        ]
    }))
}
