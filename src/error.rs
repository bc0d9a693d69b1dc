//! Error types for the pdf2image library.
//!
//! Two distinct error types reflect the two failure granularities of a batch:
//!
//! * [`Pdf2ImageError`] — **Fatal**: nothing in the batch can be processed
//!   (PDFium cannot be bound, invalid configuration, unreadable input path).
//!   The batch converter reports it once and stops.
//!
//! * [`FileError`] — **Per-file**: one document is corrupt, encrypted or
//!   failed to render. It is reported for that file only and the batch moves
//!   on to the next file.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2image library.
///
/// Per-file failures use [`FileError`] and never escape the file loop.
#[derive(Debug, Error)]
pub enum Pdf2ImageError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, place the library in the working \
directory, or install it system-wide."
    )]
    EngineUnavailable(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal error for a single input file.
///
/// Its `Display` text is what the host sees in the
/// `"Error processing {filename}: {error}"` message and in the Json detail.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum FileError {
    /// The bytes carry no `%PDF` header.
    #[error("not a PDF document (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// pdfium could not parse the document.
    #[error("failed to open PDF: {detail}")]
    Open { detail: String },

    /// The document is encrypted and no password was configured.
    #[error("PDF is encrypted and requires a password")]
    PasswordRequired,

    /// A password was configured but pdfium rejected it.
    #[error("wrong password for encrypted PDF")]
    WrongPassword,

    /// Rasterisation of one page failed.
    #[error("rasterisation failed for page {page}: {detail}")]
    Render { page: usize, detail: String },

    /// Stacked page heights do not fit in a single image.
    #[error("composite image too large: {width}x{height} px")]
    CompositeTooLarge { width: u64, height: u64 },

    /// PNG encoding of the composite failed.
    #[error("PNG encoding failed: {detail}")]
    Encode { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_error_names_page() {
        let e = FileError::Render {
            page: 3,
            detail: "bitmap allocation failed".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 3"), "got: {msg}");
        assert!(msg.contains("bitmap allocation failed"));
    }

    #[test]
    fn not_a_pdf_shows_magic() {
        let e = FileError::NotAPdf {
            magic: b"GIF8".to_vec(),
        };
        assert!(e.to_string().contains("not a PDF"));
    }

    #[test]
    fn engine_unavailable_carries_hint() {
        let e = Pdf2ImageError::EngineUnavailable("libpdfium.so: cannot open".into());
        let msg = e.to_string();
        assert!(msg.contains("libpdfium.so"));
        assert!(msg.contains("PDFIUM_LIB_PATH"));
    }

    #[test]
    fn composite_too_large_display() {
        let e = FileError::CompositeTooLarge {
            width: 800,
            height: 5_000_000_000,
        };
        assert!(e.to_string().contains("800x5000000000"));
    }

    #[test]
    fn file_error_serialises() {
        let e = FileError::Open {
            detail: "bad xref".into(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["Open"]["detail"], "bad xref");
    }
}
