//! Page counting service for Word and PowerPoint documents.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /api/count-pages { fileUrl }
//!         │
//!         ▼
//!   ┌───────────┐    ┌───────────┐    ┌────────────┐    ┌────────────┐
//!   │   http    │───▶│   fetch   │───▶│  document  │───▶│  document  │
//!   │ validate  │    │ download  │    │   detect   │    │  counter   │
//!   └───────────┘    └───────────┘    └────────────┘    └────────────┘
//!         │                │                 │                 │
//!         └────────────────┴──── error ──────┴─────────────────┘
//!                               │
//!                               ▼
//!                   { success, pageCount, fileType, fileUrl }
//!                   { success: false, error } + status code
//! ```
//!
//! Cross-cutting: `config`, `observability`, `lifecycle`.

// Core subsystems
pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use error::CountError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
