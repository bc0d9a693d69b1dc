//! Pipeline stages for PDF-to-image conversion.
//!
//! Each submodule implements exactly one transformation step, so the
//! compositor and encoder can be tested without a pdfium library.
//!
//! ## Data Flow
//!
//! ```text
//! render ──▶ composite ──▶ encode
//! (pdfium)   (stack)       (PNG)
//! ```
//!
//! 1. [`render`]    — open the PDF bytes and rasterise every page to RGB8
//! 2. [`composite`] — stack the page bitmaps top to bottom on one canvas
//! 3. [`encode`]    — PNG-encode the canvas and derive the output filename

pub mod composite;
pub mod encode;
pub mod render;
