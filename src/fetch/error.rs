//! Download failure classification.
//!
//! `reqwest` reports failures through flags on a single error type; this
//! module turns them into variants the HTTP layer can map to status codes.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while downloading a remote document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS resolution or TCP/TLS connection failed.
    #[error("Could not connect to the provided URL. Please check the URL.")]
    Connect(String),

    /// Connect, headers or body exceeded the download deadline.
    #[error("Request timeout. The file is too large or the server responded slowly. Please try again later.")]
    Timeout,

    /// Upstream answered with a non-success status.
    #[error("{}", upstream_status_message(.0))]
    Status(StatusCode),

    /// Payload exceeded the configured maximum size.
    #[error("Error while processing file: file exceeds the maximum size of {limit} bytes")]
    TooLarge { limit: u64 },

    /// Connection dropped or the body could not be decoded mid-transfer.
    #[error("Error while processing file: {0}")]
    Transfer(String),
}

impl FetchError {
    /// Status code returned to the caller for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            FetchError::Connect(_) => StatusCode::NOT_FOUND,
            FetchError::Timeout => StatusCode::REQUEST_TIMEOUT,
            FetchError::Status(status) => match *status {
                StatusCode::NOT_FOUND => StatusCode::NOT_FOUND,
                StatusCode::FORBIDDEN => StatusCode::FORBIDDEN,
                s if s.is_server_error() => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            FetchError::TooLarge { .. } | FetchError::Transfer(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Underlying detail for logs; the display message stays generic.
    pub fn detail(&self) -> String {
        match self {
            FetchError::Connect(detail) | FetchError::Transfer(detail) => detail.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // Timeout first: a connect timeout is both.
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connect(error_chain(&err))
        } else {
            FetchError::Transfer(error_chain(&err))
        }
    }
}

fn upstream_status_message(status: &StatusCode) -> String {
    match *status {
        StatusCode::NOT_FOUND => "File does not exist at the provided URL.".to_string(),
        StatusCode::FORBIDDEN => {
            "Access to the file is denied. The file may require authentication.".to_string()
        }
        s if s.is_server_error() => {
            "The server hosting the file is experiencing problems. Please try again later.".to_string()
        }
        s => format!("Error while processing file: request failed with status code {}", s.as_u16()),
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
