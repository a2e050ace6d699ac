//! File type detection from magic number and URL extension.
//!
//! DOCX and PPTX are both ZIP containers, so the signature alone cannot tell
//! them apart; the extension picks the format and the signature only records
//! whether the container looked right.

use super::FileType;

/// ZIP local file header signature (`PK\x03\x04`).
pub const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Outcome of sniffing a downloaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub file_type: FileType,
    /// False when only the extension matched and the bytes did not start
    /// with the ZIP signature.
    pub signature_verified: bool,
}

/// Returns true when the buffer starts with the ZIP local file header.
pub fn is_zip(bytes: &[u8]) -> bool {
    bytes.len() >= ZIP_MAGIC.len() && bytes[..ZIP_MAGIC.len()] == ZIP_MAGIC
}

/// Trailing extension of a document URL, lowercased.
///
/// Everything after the last dot of the raw text, so a query string or
/// fragment following the name is part of the extension and matches no
/// supported format.
pub fn url_extension(file_url: &str) -> Option<String> {
    let (_, candidate) = file_url.rsplit_once('.')?;

    if candidate.is_empty() {
        None
    } else {
        Some(candidate.to_ascii_lowercase())
    }
}

/// Detect the document format from its first bytes and its URL.
pub fn detect_file_type(bytes: &[u8], file_url: &str) -> Option<Detection> {
    let file_type = url_extension(file_url).and_then(|ext| FileType::from_extension(&ext))?;

    Some(Detection {
        file_type,
        signature_verified: is_zip(bytes),
    })
}
