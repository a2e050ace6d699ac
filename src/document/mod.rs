//! Document handling subsystem.
//!
//! # Data Flow
//! ```text
//! downloaded bytes + source URL
//!     → detect.rs (ZIP signature, extension fallback)
//!     → counter.rs (open OOXML package, read page/slide count)
//!     → page count
//! ```
//!
//! # Design Decisions
//! - Only the two Office Open XML containers are supported
//! - Counting sits behind the `PageCounter` trait so the HTTP layer does not
//!   depend on how packages are parsed

pub mod counter;
pub mod detect;

use serde::{Deserialize, Serialize};

pub use counter::{CountingError, OfficePageCounter, PageCounter};
pub use detect::{detect_file_type, Detection};

/// Supported document container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Docx,
    Pptx,
}

impl FileType {
    pub const ALL: [FileType; 2] = [FileType::Docx, FileType::Pptx];

    /// Map a lowercase file extension to a supported format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "docx" => Some(FileType::Docx),
            "pptx" => Some(FileType::Pptx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Docx => "docx",
            FileType::Pptx => "pptx",
        }
    }

    /// Upper-case label used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            FileType::Docx => "DOCX",
            FileType::Pptx => "PPTX",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
