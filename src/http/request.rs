//! Request handling and validation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) when the client sent none
//! - Deserialize the count request payload
//! - Validate the document URL before any network access
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Validation failures never reach the downloader

use axum::http::{HeaderMap, HeaderValue, Request};
use serde::Deserialize;
use tower_http::request_id::{MakeRequestId, RequestId};
use url::Url;
use uuid::Uuid;

use crate::error::CountError;

/// Header carrying the correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request ids for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request id set by the middleware stack.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Body of `POST /api/count-pages`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountPagesRequest {
    #[serde(rename = "fileUrl", default)]
    pub file_url: Option<String>,
}

impl CountPagesRequest {
    /// The non-empty `fileUrl`, or `MissingUrl`.
    pub fn file_url(&self) -> Result<&str, CountError> {
        match self.file_url.as_deref() {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(CountError::MissingUrl),
        }
    }
}

/// Parse a document URL; only http and https can be downloaded.
pub fn parse_file_url(raw: &str) -> Result<Url, CountError> {
    let url = Url::parse(raw).map_err(|_| CountError::InvalidUrl)?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CountError::UnsupportedScheme(other.to_string())),
    }
}
