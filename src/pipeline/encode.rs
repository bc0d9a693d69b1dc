//! Image encoding: composite `RgbImage` → PNG bytes, plus the output name.
//!
//! PNG is lossless, so rendered text stays crisp in the merged image.

use crate::error::FileError;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use tracing::debug;

/// Encode the composite as an in-memory PNG.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, FileError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| FileError::Encode {
            detail: e.to_string(),
        })?;

    debug!("Encoded {}x{} image → {} bytes PNG", img.width(), img.height(), buf.len());
    Ok(buf)
}

/// Output filename for an input: replace the final extension with `.png`.
///
/// Only the last `.` of the final path component counts. A name without an
/// extension, or whose only dot is its first character, keeps the whole
/// name and gains `.png`.
pub fn png_filename(filename: &str) -> String {
    let name_start = filename.rfind(['/', '\\']).map_or(0, |i| i + 1);
    match filename[name_start..].rfind('.') {
        Some(dot) if dot > 0 => format!("{}.png", &filename[..name_start + dot]),
        _ => format!("{filename}.png"),
    }
}
