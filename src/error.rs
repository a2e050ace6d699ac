//! Request failure classification.
//!
//! Every stage of the count pipeline fails into `CountError`. The display
//! text is the message returned to the client; `status_code` picks the HTTP
//! status.

use axum::http::StatusCode;
use thiserror::Error;

use crate::document::{CountingError, FileType};
use crate::fetch::FetchError;

/// Errors surfaced by `POST /api/count-pages`.
#[derive(Debug, Error)]
pub enum CountError {
    #[error("Missing fileUrl parameter. Please provide the URL of the file.")]
    MissingUrl,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Request body too large. Send a JSON object with a fileUrl field.")]
    BodyTooLarge,

    #[error("Invalid URL.")]
    InvalidUrl,

    #[error("Unsupported URL scheme '{0}'. Only http and https URLs are accepted.")]
    UnsupportedScheme(String),

    #[error("Unsupported file format. Supported: DOCX, PPTX.")]
    UnsupportedFormat,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(
        "Could not count pages for {} file. The file may be corrupted or incompatible. Details: {source}",
        .file_type.label()
    )]
    Counting {
        file_type: FileType,
        #[source]
        source: CountingError,
    },

    #[error("Request timeout. The request took too long to process. Please try again later.")]
    RequestTimeout,

    #[error("Error while processing file: {0}")]
    Internal(String),
}

impl CountError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CountError::MissingUrl
            | CountError::InvalidBody(_)
            | CountError::InvalidUrl
            | CountError::UnsupportedScheme(_)
            | CountError::UnsupportedFormat => StatusCode::BAD_REQUEST,
            CountError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            CountError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            CountError::Fetch(err) => err.status_code(),
            CountError::Counting { .. } | CountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CountError::MissingUrl | CountError::InvalidBody(_) => "bad_request",
            CountError::BodyTooLarge => "body_too_large",
            CountError::RequestTimeout => "request_timeout",
            CountError::InvalidUrl | CountError::UnsupportedScheme(_) => "invalid_url",
            CountError::UnsupportedFormat => "unsupported_format",
            CountError::Fetch(FetchError::Connect(_)) => "connect",
            CountError::Fetch(FetchError::Timeout) => "timeout",
            CountError::Fetch(FetchError::Status(_)) => "upstream_status",
            CountError::Fetch(FetchError::TooLarge { .. }) => "too_large",
            CountError::Fetch(FetchError::Transfer(_)) => "transfer",
            CountError::Counting { .. } => "counting",
            CountError::Internal(_) => "internal",
        }
    }
}
