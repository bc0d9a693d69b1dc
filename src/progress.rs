//! Progress-callback trait for per-file conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the batch converter works through its files.
//!
//! # Example
//!
//! ```rust
//! use pdf2image::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     converted: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, index: usize, total: usize, png_len: usize) {
//!         self.converted.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("File {}/{} done ({} bytes)", index, total, png_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     converted: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the batch converter as it processes each file.
///
/// Implementations must be `Send + Sync` because the streaming API drives
/// the batch from a blocking worker thread. All methods have default no-op
/// implementations so callers only override what they care about.
/// File indices are 1-based.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after the rendering engine is bound, before the first file.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a file is opened.
    fn on_file_start(&self, index: usize, total_files: usize, filename: &str) {
        let _ = (index, total_files, filename);
    }

    /// Called when a file produced a composite PNG.
    ///
    /// # Arguments
    /// * `png_len` — byte length of the encoded PNG
    fn on_file_complete(&self, index: usize, total_files: usize, png_len: usize) {
        let _ = (index, total_files, png_len);
    }

    /// Called when a file opened fine but has no pages.
    fn on_file_skipped(&self, index: usize, total_files: usize, filename: &str) {
        let _ = (index, total_files, filename);
    }

    /// Called when a file failed.
    fn on_file_error(&self, index: usize, total_files: usize, error: &str) {
        let _ = (index, total_files, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total_files: usize, converted: usize) {
        let _ = (total_files, converted);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
