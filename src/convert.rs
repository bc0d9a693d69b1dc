//! Batch conversion: every input file becomes one stacked PNG.
//!
//! [`convert_batch`] returns a lazy [`BatchMessages`] iterator. Nothing is
//! rendered until the caller asks for the next message, and a file is only
//! opened once the messages of the previous file have been drained.
//!
//! Failures come in two sizes:
//!
//! * whole-batch — no files at all, or pdfium cannot be bound. One `Text`
//!   message is emitted and the iterator ends.
//! * per-file — the file becomes a [`FileOutcome::Failed`], which maps to a
//!   `Text` line plus a `Json` detail. The next file is processed normally.

use crate::config::ConversionConfig;
use crate::error::{FileError, Pdf2ImageError};
use crate::message::{InputFile, ResultMessage, NO_FILES_MESSAGE};
use crate::pipeline::composite;
use crate::pipeline::encode::{encode_png, png_filename};
use crate::pipeline::render::{check_pdf_header, PdfiumBackend, RenderBackend};
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Result of converting one file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// The composite PNG and its dimensions.
    Converted {
        png: Vec<u8>,
        filename: String,
        width: u32,
        height: u32,
        page_count: usize,
    },
    /// The document opened but has no pages.
    NoPages,
    /// Opening, rendering or encoding failed.
    Failed(FileError),
}

impl FileOutcome {
    /// The messages the host receives for this file.
    pub fn into_messages(self, input_filename: &str) -> Vec<ResultMessage> {
        match self {
            FileOutcome::Converted { png, filename, .. } => {
                vec![ResultMessage::png(png, filename)]
            }
            FileOutcome::NoPages => {
                vec![ResultMessage::text(format!(
                    "No pages found in {input_filename}"
                ))]
            }
            FileOutcome::Failed(err) => vec![
                ResultMessage::text(format!("Error processing {input_filename}: {err}")),
                ResultMessage::file_error(input_filename, &err),
            ],
        }
    }
}

/// Convert one file with an already-bound backend.
///
/// Never fails as a whole: every error is captured as [`FileOutcome::Failed`].
pub fn convert_file(
    backend: &dyn RenderBackend,
    file: &InputFile,
    config: &ConversionConfig,
) -> FileOutcome {
    let start = Instant::now();
    info!("Processing file: {}", file.filename);

    match render_composite(backend, file, config) {
        Ok(Some(outcome)) => {
            info!(
                "Converted {} in {}ms",
                file.filename,
                start.elapsed().as_millis()
            );
            outcome
        }
        Ok(None) => {
            warn!("No pages found in {}", file.filename);
            FileOutcome::NoPages
        }
        Err(e) => {
            error!("Error processing {}: {}", file.filename, e);
            FileOutcome::Failed(e)
        }
    }
}

/// `Ok(None)` for a document without pages.
fn render_composite(
    backend: &dyn RenderBackend,
    file: &InputFile,
    config: &ConversionConfig,
) -> Result<Option<FileOutcome>, FileError> {
    check_pdf_header(&file.blob)?;

    // The document handle is dropped at the end of this block, before
    // compositing, on the error paths as well.
    let pages = {
        let document = backend.open(&file.blob)?;
        let page_count = document.page_count();
        debug!("{}: {} pages", file.filename, page_count);

        let mut pages = Vec::with_capacity(page_count);
        for index in 0..page_count {
            pages.push(document.render_page(index)?);
        }
        pages
    };

    if pages.is_empty() {
        return Ok(None);
    }

    let canvas = composite::stack_vertically(&pages, config.background.to_rgb())?;
    let page_count = pages.len();
    drop(pages);

    let png = encode_png(&canvas)?;

    Ok(Some(FileOutcome::Converted {
        png,
        filename: png_filename(&file.filename),
        width: canvas.width(),
        height: canvas.height(),
        page_count,
    }))
}

/// Convert a batch of files using pdfium.
///
/// See [`convert_batch_with`] for the message contract.
pub fn convert_batch(
    files: Vec<InputFile>,
    config: &ConversionConfig,
) -> BatchMessages<PdfiumBackend> {
    convert_batch_with(files, config, PdfiumBackend::bind)
}

/// Convert a batch of files with a backend produced by `bind`.
///
/// * empty `files` → one `Text` (`bind` is never called)
/// * `bind` fails → one `Text` describing the missing engine
/// * otherwise, per file in input order: a PNG `Blob`; or a `Text` for an
///   empty document; or a `Text` + `Json` pair for a failure
pub fn convert_batch_with<B, F>(
    files: Vec<InputFile>,
    config: &ConversionConfig,
    bind: F,
) -> BatchMessages<B>
where
    B: RenderBackend,
    F: FnOnce(&ConversionConfig) -> Result<B, Pdf2ImageError>,
{
    if files.is_empty() {
        info!("No files provided");
        return BatchMessages::finished(ResultMessage::text(NO_FILES_MESSAGE));
    }

    let backend = match bind(config) {
        Ok(backend) => backend,
        Err(e) => {
            error!("PDF rendering engine unavailable: {}", e);
            return BatchMessages::finished(ResultMessage::text(format!(
                "Error: PDF rendering engine is not available. {e}"
            )));
        }
    };

    info!("Starting batch of {} files", files.len());
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(files.len());
    }

    BatchMessages {
        backend: Some(backend),
        total: files.len(),
        files: files.into_iter(),
        pending: VecDeque::new(),
        config: config.clone(),
        index: 0,
        converted: 0,
    }
}

/// Lazy stream of result messages for a batch.
///
/// Holds the bound backend until the last file is done, then releases it.
pub struct BatchMessages<B> {
    backend: Option<B>,
    files: std::vec::IntoIter<InputFile>,
    pending: VecDeque<ResultMessage>,
    config: ConversionConfig,
    total: usize,
    index: usize,
    converted: usize,
}

impl<B> BatchMessages<B> {
    fn finished(message: ResultMessage) -> Self {
        Self {
            backend: None,
            files: Vec::new().into_iter(),
            pending: VecDeque::from([message]),
            config: ConversionConfig::default(),
            total: 0,
            index: 0,
            converted: 0,
        }
    }

    /// Files converted to a PNG so far.
    pub fn converted(&self) -> usize {
        self.converted
    }
}

impl<B: RenderBackend> BatchMessages<B> {
    fn process(&mut self, backend: &B, file: InputFile) {
        self.index += 1;
        let cb = self.config.progress_callback.clone();
        if let Some(ref cb) = cb {
            cb.on_file_start(self.index, self.total, &file.filename);
        }

        let outcome = convert_file(backend, &file, &self.config);

        match (&outcome, cb) {
            (FileOutcome::Converted { png, .. }, cb) => {
                self.converted += 1;
                if let Some(cb) = cb {
                    cb.on_file_complete(self.index, self.total, png.len());
                }
            }
            (FileOutcome::NoPages, Some(cb)) => {
                cb.on_file_skipped(self.index, self.total, &file.filename);
            }
            (FileOutcome::Failed(e), Some(cb)) => {
                cb.on_file_error(self.index, self.total, &e.to_string());
            }
            _ => {}
        }

        self.pending.extend(outcome.into_messages(&file.filename));
    }
}

impl<B: RenderBackend> Iterator for BatchMessages<B> {
    type Item = ResultMessage;

    fn next(&mut self) -> Option<ResultMessage> {
        loop {
            if let Some(message) = self.pending.pop_front() {
                return Some(message);
            }

            let backend = self.backend.take()?;
            match self.files.next() {
                Some(file) => {
                    self.process(&backend, file);
                    self.backend = Some(backend);
                }
                None => {
                    info!(
                        "Batch complete: {}/{} files converted",
                        self.converted, self.total
                    );
                    if let Some(ref cb) = self.config.progress_callback {
                        cb.on_batch_complete(self.total, self.converted);
                    }
                    return None;
                }
            }
        }
    }
}
