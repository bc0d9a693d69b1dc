//! PDF rasterisation: open a document from bytes and render pages to RGB8.
//!
//! The converter only talks to the [`RenderBackend`] / [`OpenDocument`]
//! traits. [`PdfiumBackend`] is the one real implementation; it is bound
//! once per batch so a missing pdfium library is reported before any file
//! is touched.
//!
//! Closing a document is a drop: the pdfium handle lives inside the boxed
//! [`OpenDocument`] and is released when the per-file scope ends, whether
//! rendering succeeded or not.

use crate::config::ConversionConfig;
use crate::error::{FileError, Pdf2ImageError};
use image::RgbImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How far into the file the `%PDF` header may appear.
///
/// pdfium, like most readers, tolerates leading junk before the header.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// A capability that can open PDF documents from bytes.
pub trait RenderBackend {
    /// Parse `bytes` into an open document.
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn OpenDocument + 'a>, FileError>;
}

/// An open document. Dropping it releases the engine's resources.
pub trait OpenDocument {
    fn page_count(&self) -> usize;

    /// Render page `index` (0-based) to an RGB bitmap without alpha.
    fn render_page(&self, index: usize) -> Result<RgbImage, FileError>;
}

/// Reject bytes that cannot possibly be a PDF before handing them to the engine.
pub fn check_pdf_header(bytes: &[u8]) -> Result<(), FileError> {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    if window.windows(4).any(|w| w == b"%PDF") {
        Ok(())
    } else {
        Err(FileError::NotAPdf {
            magic: bytes.iter().take(4).copied().collect(),
        })
    }
}

/// Map a pdfium load error to the per-file error the host sees.
///
/// pdfium reports encryption problems as a password error whether or not a
/// password was supplied.
fn classify_open_error(detail: String, has_password: bool) -> FileError {
    if !detail.to_ascii_lowercase().contains("password") {
        return FileError::Open { detail };
    }
    if has_password {
        FileError::WrongPassword
    } else {
        FileError::PasswordRequired
    }
}

/// pdfium-backed renderer.
pub struct PdfiumBackend {
    pdfium: Pdfium,
    render_config: PdfRenderConfig,
    password: Option<String>,
}

impl PdfiumBackend {
    /// Bind to a pdfium library and prepare the render settings from `config`.
    ///
    /// Library resolution, first match wins:
    /// 1. `config.pdfium_library_path`
    /// 2. `PDFIUM_LIB_PATH`
    /// 3. the platform library in the working directory
    /// 4. the system library search path
    pub fn bind(config: &ConversionConfig) -> Result<Self, Pdf2ImageError> {
        let pdfium = bind_pdfium(config.pdfium_library_path.as_deref())?;

        let mut render_config = PdfRenderConfig::new().scale_page_by_factor(config.scale());
        if let Some(max_px) = config.max_rendered_pixels {
            render_config = render_config
                .set_maximum_width(max_px as i32)
                .set_maximum_height(max_px as i32);
        }

        Ok(Self {
            pdfium,
            render_config,
            password: config.password.clone(),
        })
    }
}

impl RenderBackend for PdfiumBackend {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn OpenDocument + 'a>, FileError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, self.password.as_deref())
            .map_err(|e| classify_open_error(format!("{:?}", e), self.password.is_some()))?;

        Ok(Box::new(PdfiumDocument {
            document,
            render_config: &self.render_config,
        }))
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
    render_config: &'a PdfRenderConfig,
}

impl OpenDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&self, index: usize) -> Result<RgbImage, FileError> {
        let render_failed = |detail: String| FileError::Render {
            page: index + 1,
            detail,
        };

        let page_index = u16::try_from(index)
            .map_err(|_| render_failed(format!("page index {} out of range", index)))?;

        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| render_failed(format!("{:?}", e)))?;

        let bitmap = page
            .render_with_config(self.render_config)
            .map_err(|e| render_failed(format!("{:?}", e)))?;

        let image = bitmap.as_image().to_rgb8();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );

        Ok(image)
    }
}

/// Bind to pdfium following the resolution order of [`PdfiumBackend::bind`].
fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, Pdf2ImageError> {
    let env_path = std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from);
    if let Some(path) = library_override(explicit, env_path) {
        return bind_pdfium_from_path(&path);
    }

    let local = Pdfium::pdfium_platform_library_name_at_path("./");
    Pdfium::bind_to_library(&local)
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(|bindings| {
            info!("pdfium bound from default locations");
            Pdfium::new(bindings)
        })
        .map_err(|e| Pdf2ImageError::EngineUnavailable(e.to_string()))
}

/// The library path to bind directly, if any.
///
/// An explicit path always wins, even if missing, so the failure names it.
/// A `PDFIUM_LIB_PATH` that does not exist is ignored and `None` sends the
/// caller on to the default locations.
fn library_override(explicit: Option<&Path>, env_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let path = env_path.filter(|p| !p.as_os_str().is_empty())?;
    if path.exists() {
        Some(path)
    } else {
        warn!(
            "PDFIUM_LIB_PATH '{}' not found; trying default locations",
            path.display()
        );
        None
    }
}

fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, Pdf2ImageError> {
    Pdfium::bind_to_library(path)
        .map(|bindings| {
            info!("pdfium bound from {}", path.display());
            Pdfium::new(bindings)
        })
        .map_err(|e| {
            Pdf2ImageError::EngineUnavailable(format!("'{}': {}", path.display(), e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_at_start_is_accepted() {
        assert!(check_pdf_header(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n").is_ok());
    }

    #[test]
    fn header_after_leading_junk_is_accepted() {
        let mut bytes = vec![b' '; 100];
        bytes.extend_from_slice(b"%PDF-1.4");
        assert!(check_pdf_header(&bytes).is_ok());
    }

    #[test]
    fn header_beyond_window_is_rejected() {
        let mut bytes = vec![0u8; HEADER_SEARCH_WINDOW];
        bytes.extend_from_slice(b"%PDF-1.4");
        assert!(check_pdf_header(&bytes).is_err());
    }

    #[test]
    fn garbage_reports_first_bytes() {
        let err = check_pdf_header(b"\x89PNG\r\n\x1a\n").unwrap_err();
        assert_eq!(
            err,
            FileError::NotAPdf {
                magic: b"\x89PNG".to_vec()
            }
        );
    }

    #[test]
    fn empty_bytes_are_rejected() {
        let err = check_pdf_header(b"").unwrap_err();
        assert_eq!(err, FileError::NotAPdf { magic: vec![] });
    }

    #[test]
    fn password_error_without_password_needs_one() {
        let err = classify_open_error("PdfiumLibraryInternalError(PasswordError)".into(), false);
        assert_eq!(err, FileError::PasswordRequired);
    }

    #[test]
    fn password_error_with_password_is_wrong_password() {
        let err = classify_open_error("PdfiumLibraryInternalError(PasswordError)".into(), true);
        assert_eq!(err, FileError::WrongPassword);
    }

    #[test]
    fn other_load_errors_are_open_failures() {
        let detail = "PdfiumLibraryInternalError(FormatError)".to_string();
        let err = classify_open_error(detail.clone(), true);
        assert_eq!(err, FileError::Open { detail });
    }

    #[test]
    fn explicit_library_path_wins_over_env() {
        let chosen = library_override(
            Some(Path::new("/opt/pdfium/libpdfium.so")),
            Some(PathBuf::from("/somewhere/else.so")),
        );
        assert_eq!(chosen, Some(PathBuf::from("/opt/pdfium/libpdfium.so")));
    }

    #[test]
    fn missing_env_library_falls_back_to_defaults() {
        let chosen = library_override(None, Some(PathBuf::from("/nope/libpdfium.so")));
        assert_eq!(chosen, None);
        assert_eq!(library_override(None, Some(PathBuf::new())), None);
        assert_eq!(library_override(None, None), None);
    }

    #[test]
    fn existing_env_library_is_bound_directly() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("libpdfium.so");
        std::fs::write(&lib, b"").unwrap();
        assert_eq!(library_override(None, Some(lib.clone())), Some(lib));
    }

    #[test]
    fn missing_library_path_is_engine_unavailable() {
        let config = ConversionConfig::builder()
            .pdfium_library_path("/definitely/not/here/libpdfium.so")
            .build()
            .unwrap();
        let err = PdfiumBackend::bind(&config).err().expect("bind must fail");
        assert!(matches!(err, Pdf2ImageError::EngineUnavailable(_)));
    }
}
