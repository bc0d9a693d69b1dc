//! Vertical compositing: stack page bitmaps into one image.
//!
//! The canvas is as wide as the widest page and as tall as all pages
//! together. Pages are pasted left-aligned at x = 0, first page on top.
//! Pixels to the right of a narrower page keep the background fill.

use crate::error::FileError;
use image::{imageops, Rgb, RgbImage};
use tracing::debug;

/// Canvas size for `pages`: (max width, sum of heights).
///
/// Errors when the summed height does not fit in a `u32` image dimension.
pub fn composite_dimensions(pages: &[RgbImage]) -> Result<(u32, u32), FileError> {
    let width = pages.iter().map(|p| p.width()).max().unwrap_or(0);
    let total_height: u64 = pages.iter().map(|p| u64::from(p.height())).sum();

    let height = u32::try_from(total_height).map_err(|_| FileError::CompositeTooLarge {
        width: u64::from(width),
        height: total_height,
    })?;

    Ok((width, height))
}

/// Stack `pages` top to bottom on a `background`-filled canvas.
pub fn stack_vertically(pages: &[RgbImage], background: Rgb<u8>) -> Result<RgbImage, FileError> {
    let (width, height) = composite_dimensions(pages)?;

    let mut canvas = RgbImage::from_pixel(width, height, background);

    let mut y_offset: i64 = 0;
    for page in pages {
        imageops::replace(&mut canvas, page, 0, y_offset);
        y_offset += i64::from(page.height());
    }

    debug!(
        "Composited {} pages → {}x{} px",
        pages.len(),
        width,
        height
    );
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(w: u32, h: u32, shade: u8) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([shade, shade, shade]))
    }

    #[test]
    fn dimensions_are_max_width_and_summed_height() {
        let pages = [page(100, 40, 200), page(60, 30, 200), page(80, 10, 200)];
        assert_eq!(composite_dimensions(&pages).unwrap(), (100, 80));
    }

    #[test]
    fn pages_stack_in_order_top_to_bottom() {
        let pages = [page(10, 5, 10), page(10, 7, 20), page(10, 3, 30)];
        let canvas = stack_vertically(&pages, Rgb([0, 0, 0])).unwrap();

        assert_eq!(canvas.dimensions(), (10, 15));
        assert_eq!(canvas.get_pixel(0, 0), &Rgb([10, 10, 10]));
        assert_eq!(canvas.get_pixel(9, 4), &Rgb([10, 10, 10]));
        assert_eq!(canvas.get_pixel(0, 5), &Rgb([20, 20, 20]));
        assert_eq!(canvas.get_pixel(5, 11), &Rgb([20, 20, 20]));
        assert_eq!(canvas.get_pixel(0, 12), &Rgb([30, 30, 30]));
        assert_eq!(canvas.get_pixel(9, 14), &Rgb([30, 30, 30]));
    }

    #[test]
    fn narrow_page_leaves_black_strip() {
        let pages = [page(20, 4, 255), page(8, 4, 255)];
        let canvas = stack_vertically(&pages, Rgb([0, 0, 0])).unwrap();

        // Second page covers x in 0..8 only.
        assert_eq!(canvas.get_pixel(7, 6), &Rgb([255, 255, 255]));
        assert_eq!(canvas.get_pixel(8, 6), &Rgb([0, 0, 0]));
        assert_eq!(canvas.get_pixel(19, 7), &Rgb([0, 0, 0]));
        // First page fills its full row.
        assert_eq!(canvas.get_pixel(19, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn narrow_page_strip_uses_configured_fill() {
        let pages = [page(20, 4, 0), page(8, 4, 0)];
        let canvas = stack_vertically(&pages, Rgb([255, 255, 255])).unwrap();
        assert_eq!(canvas.get_pixel(15, 5), &Rgb([255, 255, 255]));
        assert_eq!(canvas.get_pixel(3, 5), &Rgb([0, 0, 0]));
    }

    #[test]
    fn single_page_is_copied_verbatim() {
        let mut p = page(3, 2, 0);
        p.put_pixel(2, 1, Rgb([1, 2, 3]));
        let canvas = stack_vertically(std::slice::from_ref(&p), Rgb([9, 9, 9])).unwrap();
        assert_eq!(canvas, p);
    }

    #[test]
    fn overflowing_height_is_rejected() {
        // Zero-width pages keep the test cheap while the heights overflow u32.
        let tall = RgbImage::new(0, u32::MAX);
        let err = composite_dimensions(&[tall.clone(), tall]).unwrap_err();
        assert!(matches!(err, FileError::CompositeTooLarge { .. }));
    }
}
