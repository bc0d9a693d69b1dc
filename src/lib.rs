//! # pdf2image
//!
//! Render every page of a PDF and stack the pages into a single PNG.
//!
//! A host hands over a batch of uploaded files and drains a sequence of
//! result messages: one PNG blob per converted document, a text line for
//! documents without pages, and a text line plus a JSON detail for
//! documents that failed. One bad file never stops the rest of the batch.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Render     open via pdfium, rasterise each page to RGB8
//!  ├─ 2. Composite  stack pages top to bottom (width = widest page)
//!  ├─ 3. Encode     PNG in memory, `name.pdf` → `name.png`
//!  └─ 4. Emit       Blob | Text | Text + Json, in input order
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2image::{convert_batch, ConversionConfig, InputFile, ResultMessage};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let files = vec![InputFile::from_path("report.pdf")?];
//!     for message in convert_batch(files, &ConversionConfig::default()) {
//!         match message {
//!             ResultMessage::Blob { data, meta } => std::fs::write(&meta.filename, data)?,
//!             ResultMessage::Text { text } => eprintln!("{text}"),
//!             ResultMessage::Json { json } => eprintln!("{json}"),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2image` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! pdfium itself is loaded at runtime from `PDFIUM_LIB_PATH`, the working
//! directory, or the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod message;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Background, ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert_batch, convert_batch_with, convert_file, BatchMessages, FileOutcome};
pub use error::{FileError, Pdf2ImageError};
pub use message::{BlobMeta, InputFile, ResultMessage, NO_FILES_MESSAGE, PNG_MIME_TYPE};
pub use pipeline::encode::png_filename;
pub use pipeline::render::{OpenDocument, PdfiumBackend, RenderBackend};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_stream, convert_stream_with, MessageStream};
