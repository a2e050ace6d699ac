//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, payload, URL validation)
//!     → handlers.rs (download → detect → count)
//!     → response.rs (JSON result or error envelope)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{CountPagesRequest, UuidRequestId, X_REQUEST_ID};
pub use response::{CountPagesResponse, ErrorBody, HealthResponse};
pub use server::{AppState, HttpServer, ServerError};
