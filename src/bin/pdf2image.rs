//! CLI binary for pdf2image.
//!
//! A thin local host over the library: reads PDFs from disk, drains the
//! message stream, and writes each PNG blob into the output directory.

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2image::{
    convert_stream, Background, ConversionConfig, ConversionProgressCallback, InputFile,
    ProgressCallback, ResultMessage,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the files of the batch, with a
/// log line per finished file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Set once the batch passed its up-front checks; from then on every
    /// file gets its own progress line.
    batch_started: AtomicBool,
    /// Start time of the file currently being converted.
    started: Mutex<Option<Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new(total_files: usize) -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(total_files as u64);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            batch_started: AtomicBool::new(false),
            started: Mutex::new(None),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn println(&self, line: impl AsRef<str>) {
        self.bar.println(line);
    }

    /// Per-file text messages repeat what the progress lines already said.
    fn covers_file_messages(&self) -> bool {
        self.batch_started.load(Ordering::SeqCst)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, _total_files: usize) {
        self.batch_started.store(true, Ordering::SeqCst);
    }

    fn on_file_start(&self, _index: usize, _total: usize, filename: &str) {
        if let Ok(mut s) = self.started.lock() {
            *s = Some(Instant::now());
        }
        self.bar.set_message(filename.to_string());
    }

    fn on_file_complete(&self, index: usize, total: usize, png_len: usize) {
        self.bar.println(format!(
            "  {} File {:>3}/{:<3}  {:<12}  {}",
            green("✓"),
            index,
            total,
            dim(&format!("{:>8} bytes", png_len)),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_file_skipped(&self, index: usize, total: usize, filename: &str) {
        self.bar.println(format!(
            "  {} File {:>3}/{:<3}  {}  {}",
            cyan("∅"),
            index,
            total,
            dim(&format!("{filename}: no pages")),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };

        self.bar.println(format!(
            "  {} File {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            red(&msg),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, converted: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);

        if failed == 0 {
            eprintln!(
                "{} {}/{} files converted",
                green("✔"),
                bold(&converted.to_string()),
                total_files
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&converted.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one PDF into report.png in the current directory
  pdf2image report.pdf

  # Several files into an output directory
  pdf2image a.pdf b.pdf c.pdf -o out/

  # Sharper render with a white strip next to narrow pages
  pdf2image --dpi 144 --background white slides.pdf

  # Print every result message as a JSON line (PNG bytes base64-encoded)
  pdf2image --json report.pdf > messages.ndjson

ENVIRONMENT VARIABLES:
  PDF2IMAGE_PDFIUM_LIB    Same as --pdfium-lib (must exist)
  PDFIUM_LIB_PATH         Path to libpdfium; skipped if it does not exist
  RUST_LOG                Override log filter (e.g. pdf2image=debug)

SETUP:
  pdf2image loads libpdfium at runtime. Put it next to where you run the
  command, install it system-wide, or point PDFIUM_LIB_PATH at it.
  Prebuilt libraries: https://github.com/bblanchon/pdfium-binaries/releases
"#;

/// Render PDF pages and stack them into one PNG per document.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2image",
    version,
    about = "Render PDF pages and stack them into one PNG per document",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files to convert, processed in the given order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for the generated PNG files.
    #[arg(short, long, env = "PDF2IMAGE_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Rendering DPI (36–600).
    #[arg(long, env = "PDF2IMAGE_DPI", default_value_t = 72,
          value_parser = clap::value_parser!(u32).range(36..=600))]
    dpi: u32,

    /// Cap on the width/height of a single rendered page in pixels [default: no cap].
    #[arg(long, env = "PDF2IMAGE_MAX_PIXELS")]
    max_pixels: Option<u32>,

    /// Fill for the strip next to pages narrower than the widest page.
    #[arg(long, env = "PDF2IMAGE_BACKGROUND", value_enum, default_value = "black")]
    background: BackgroundArg,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2IMAGE_PASSWORD")]
    password: Option<String>,

    /// Path to the pdfium shared library [default: PDFIUM_LIB_PATH, ./, system].
    #[arg(long, env = "PDF2IMAGE_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Print every result message as one JSON line on stdout; write no files.
    #[arg(long, env = "PDF2IMAGE_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMAGE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMAGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMAGE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum BackgroundArg {
    Black,
    White,
}

impl From<BackgroundArg> for Background {
    fn from(v: BackgroundArg) -> Self {
        match v {
            BackgroundArg::Black => Background::Black,
            BackgroundArg::White => Background::White,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Read inputs ──────────────────────────────────────────────────────
    let mut files = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        match InputFile::from_path(path) {
            Ok(file) => files.push(file),
            Err(e) => eprintln!("{} {}", red("✗"), e),
        }
    }

    if !cli.json {
        tokio::fs::create_dir_all(&cli.output_dir)
            .await
            .with_context(|| format!("Failed to create output directory {:?}", cli.output_dir))?;
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress = if show_progress && !files.is_empty() {
        Some(CliProgressCallback::new(files.len()))
    } else {
        None
    };

    let config = build_config(
        &cli,
        progress
            .clone()
            .map(|p| p as Arc<dyn ConversionProgressCallback>),
    )?;

    // ── Drain the message stream ─────────────────────────────────────────
    let report = |line: String| match progress {
        Some(ref p) => p.println(line),
        None => eprintln!("{line}"),
    };

    let mut written = 0usize;
    let mut stream = convert_stream(files, &config);
    while let Some(message) = stream.next().await {
        if cli.json {
            let line = serde_json::to_string(&message).context("Failed to serialise message")?;
            println!("{line}");
            continue;
        }

        match message {
            ResultMessage::Blob { data, meta } => {
                let path = output_path(&cli.output_dir, &meta.filename);
                tokio::fs::write(&path, &data)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                written += 1;
                if !cli.quiet && !show_progress {
                    report(format!("{} {}", green("✔"), bold(&path.display().to_string())));
                }
            }
            ResultMessage::Text { text } => {
                let covered = progress.as_ref().is_some_and(|p| p.covers_file_messages());
                if should_report_text(&text, cli.quiet, covered) {
                    report(text);
                }
            }
            ResultMessage::Json { json } => {
                tracing::debug!("error detail: {json}");
            }
        }
    }

    if !cli.quiet && !cli.json && !show_progress {
        eprintln!("Wrote {written} PNG file(s) to {}", cli.output_dir.display());
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .background(cli.background.clone().into());

    if let Some(px) = cli.max_pixels {
        builder = builder.max_rendered_pixels(px);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(lib.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Whether a `Text` message goes to the terminal.
///
/// `covered` means a progress line was already printed for the file.
fn should_report_text(text: &str, quiet: bool, covered: bool) -> bool {
    !covered && (!quiet || text.starts_with("Error"))
}

/// Place a blob's filename inside `dir`, ignoring any directory part it carries.
fn output_path(dir: &Path, filename: &str) -> PathBuf {
    let name = Path::new(filename)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "output.png".into());
    dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdfium_env_var_is_left_to_the_library() {
        // A stale PDFIUM_LIB_PATH must not become an explicit library path,
        // otherwise the default-location fallback never runs.
        std::env::set_var("PDFIUM_LIB_PATH", "/nope/libpdfium.so");
        let cli = Cli::try_parse_from(["pdf2image", "a.pdf"]).unwrap();
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.pdfium_library_path, None);
        std::env::remove_var("PDFIUM_LIB_PATH");
    }

    #[test]
    fn explicit_pdfium_lib_flag_is_passed_through() {
        let cli = Cli::try_parse_from(["pdf2image", "--pdfium-lib", "/opt/libpdfium.so", "a.pdf"])
            .unwrap();
        let config = build_config(&cli, None).unwrap();
        assert_eq!(
            config.pdfium_library_path,
            Some(PathBuf::from("/opt/libpdfium.so"))
        );
    }

    #[test]
    fn max_pixels_defaults_to_no_cap() {
        let cli = Cli::try_parse_from(["pdf2image", "a.pdf"]).unwrap();
        assert_eq!(build_config(&cli, None).unwrap().max_rendered_pixels, None);

        let cli = Cli::try_parse_from(["pdf2image", "--max-pixels", "3000", "a.pdf"]).unwrap();
        assert_eq!(
            build_config(&cli, None).unwrap().max_rendered_pixels,
            Some(3000)
        );
    }

    #[test]
    fn file_texts_are_not_repeated_under_the_progress_bar() {
        let progress = CliProgressCallback::new(2);
        assert!(!progress.covers_file_messages());
        progress.on_batch_start(2);
        assert!(progress.covers_file_messages());
        progress.bar.finish_and_clear();

        let text = "Error processing b.pdf: failed to open PDF: xref";
        assert!(!should_report_text(text, false, true));
        assert!(!should_report_text("No pages found in c.pdf", false, true));
    }

    #[test]
    fn batch_level_texts_still_reach_the_terminal() {
        // Engine failures arrive before on_batch_start, so nothing covers them.
        let text = "Error: PDF rendering engine is not available. no libpdfium";
        assert!(should_report_text(text, false, false));
        assert!(should_report_text(text, true, false));
        assert!(!should_report_text("No pages found in c.pdf", true, false));
    }
}
