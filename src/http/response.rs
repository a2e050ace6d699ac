//! Response bodies and error envelopes.
//!
//! # Responsibilities
//! - Serialize success payloads in the public JSON shape (camelCase)
//! - Map pipeline errors to status code + `{ success: false, error }`
//!
//! # Design Decisions
//! - Every failure, including validation, uses the same envelope
//! - Internal detail stays in logs unless the message is meant for the client

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::document::FileType;
use crate::error::CountError;

/// Successful count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountPagesResponse {
    pub success: bool,
    pub page_count: u32,
    pub file_type: FileType,
    pub file_url: String,
}

impl CountPagesResponse {
    pub fn new(page_count: u32, file_type: FileType, file_url: impl Into<String>) -> Self {
        Self {
            success: true,
            page_count,
            file_type,
            file_url: file_url.into(),
        }
    }
}

/// Failure envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Liveness payload for `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

impl IntoResponse for CountError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
