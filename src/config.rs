//! Configuration types for PDF-to-image conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. One struct holds every knob so the
//! same config can be handed to the synchronous batch iterator and moved onto
//! the blocking thread behind [`crate::stream::convert_stream`].

use crate::error::Pdf2ImageError;
use crate::progress::ProgressCallback;
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for a batch conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2image::{Background, ConversionConfig};
///
/// let config = ConversionConfig::builder()
///     .dpi(144)
///     .background(Background::White)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 144);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI. Range: 36–600. Default: 72.
    ///
    /// 72 DPI renders one pixel per PDF point, so a US-letter page becomes
    /// 612 × 792 px.
    pub dpi: u32,

    /// Optional cap on the width and height of a single rendered page in
    /// pixels. Default: None (pages render at full size for the DPI).
    ///
    /// Applied after the DPI scale; the other dimension shrinks
    /// proportionally. The composite may still be taller than this since it
    /// stacks every page.
    pub max_rendered_pixels: Option<u32>,

    /// Fill for canvas pixels no page covers (narrow pages). Default: black.
    pub background: Background,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Explicit path to the pdfium shared library.
    ///
    /// If None, `PDFIUM_LIB_PATH`, the working directory and the system
    /// library search path are tried in that order.
    pub pdfium_library_path: Option<PathBuf>,

    /// Per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 72,
            max_rendered_pixels: None,
            background: Background::default(),
            password: None,
            pdfium_library_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("background", &self.background)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Render scale relative to PDF points (72 per inch).
    pub fn scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(36, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = Some(px.max(16));
        self
    }

    pub fn background(mut self, background: Background) -> Self {
        self.config.background = background;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2ImageError> {
        let c = &self.config;
        if let Some(px) = c.max_rendered_pixels {
            if px > i32::MAX as u32 {
                return Err(Pdf2ImageError::InvalidConfig(format!(
                    "max_rendered_pixels too large: {px}"
                )));
            }
        }
        if let Some(ref path) = c.pdfium_library_path {
            if path.as_os_str().is_empty() {
                return Err(Pdf2ImageError::InvalidConfig(
                    "pdfium library path is empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Fill colour for composite pixels not covered by any page.
///
/// Pages are left-aligned, so a page narrower than the widest page leaves a
/// strip on its right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    /// Black fill. (default)
    #[default]
    Black,
    /// White fill, matching the rendered page paper.
    White,
}

impl Background {
    pub fn to_rgb(self) -> Rgb<u8> {
        match self {
            Background::Black => Rgb([0, 0, 0]),
            Background::White => Rgb([255, 255, 255]),
        }
    }
}
