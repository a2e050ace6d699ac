//! Remote document download subsystem.
//!
//! # Data Flow
//! ```text
//! validated URL
//!     → client.rs (GET with timeout, redirect limit, size limit)
//!     → error.rs (classify failures: connect, timeout, upstream status)
//!     → bytes held in memory for the rest of the request
//! ```
//!
//! # Design Decisions
//! - Every download has a deadline; no retries
//! - Size limit enforced while streaming, not after buffering
//! - Upstream status codes are classified, never forwarded verbatim

pub mod client;
pub mod error;

pub use client::Downloader;
pub use error::FetchError;
