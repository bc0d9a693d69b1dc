//! Streaming conversion API: receive messages asynchronously as files finish.
//!
//! The batch itself stays synchronous. [`convert_stream`] runs the
//! [`crate::convert::BatchMessages`] iterator on a Tokio blocking thread
//! (pdfium is CPU-bound and not async-aware) and forwards every message
//! through a bounded channel. With a capacity of one the producer is never
//! more than one message ahead of the consumer. Dropping the stream stops the
//! producer after its next send.

use crate::config::ConversionConfig;
use crate::convert::{convert_batch, convert_batch_with};
use crate::error::Pdf2ImageError;
use crate::message::{InputFile, ResultMessage};
use crate::pipeline::render::RenderBackend;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tracing::debug;

/// A boxed stream of result messages.
pub type MessageStream = Pin<Box<dyn Stream<Item = ResultMessage> + Send>>;

/// Convert a batch with pdfium, streaming messages as they are produced.
///
/// Must be called from within a Tokio runtime.
///
/// # Example
/// ```rust,no_run
/// use pdf2image::{convert_stream, ConversionConfig, InputFile, ResultMessage};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let files = vec![InputFile::from_path("report.pdf")?];
/// let mut stream = convert_stream(files, &ConversionConfig::default());
/// while let Some(message) = stream.next().await {
///     match message {
///         ResultMessage::Blob { data, meta } => std::fs::write(&meta.filename, data)?,
///         other => eprintln!("{other:?}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub fn convert_stream(files: Vec<InputFile>, config: &ConversionConfig) -> MessageStream {
    let config = config.clone();
    spawn_producer(move |tx| forward(convert_batch(files, &config), tx))
}

/// Like [`convert_stream`] with a custom backend.
///
/// `bind` runs on the blocking thread, so the backend itself need not be `Send`.
pub fn convert_stream_with<B, F>(
    files: Vec<InputFile>,
    config: &ConversionConfig,
    bind: F,
) -> MessageStream
where
    B: RenderBackend + 'static,
    F: FnOnce(&ConversionConfig) -> Result<B, Pdf2ImageError> + Send + 'static,
{
    let config = config.clone();
    spawn_producer(move |tx| forward(convert_batch_with(files, &config, bind), tx))
}

fn spawn_producer<P>(produce: P) -> MessageStream
where
    P: FnOnce(mpsc::Sender<ResultMessage>) + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    tokio::task::spawn_blocking(move || produce(tx));
    Box::pin(ReceiverStream::new(rx))
}

fn forward(messages: impl Iterator<Item = ResultMessage>, tx: mpsc::Sender<ResultMessage>) {
    for message in messages {
        if tx.blocking_send(message).is_err() {
            debug!("Message stream dropped; stopping batch");
            return;
        }
    }
}
