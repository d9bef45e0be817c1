//! Rendering of a [`SymbolMatrix`] to pixels, text and PNG files.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage};
use tracing::debug;

use crate::config::MAX_IMAGE_SIDE_PX;
use crate::error::{QrError, Result};
use crate::qrcode::SymbolMatrix;

/// An RGB pixel buffer holding a rendered symbol.
pub type RasterImage = RgbImage;

/// Renders `matrix` with each module as a solid `module_size_px` square.
///
/// Every pixel is either `fg` (dark module) or `bg` (light module), with no
/// intermediate values, so the output stays exactly scannable.
///
/// # Errors
///
/// Returns [`QrError::InvalidConfig`] if `module_size_px` is zero or the image
/// side would exceed [`MAX_IMAGE_SIDE_PX`].
///
/// # Example
///
/// ```rust
/// use image::Rgb;
/// use qrsnap::config::EncodingConfig;
/// use qrsnap::qrcode::encode;
/// use qrsnap::render::render;
///
/// let matrix = encode("Hello, World!", &EncodingConfig::default()).unwrap();
/// let img = render(&matrix, 10, Rgb([0, 0, 0]), Rgb([255, 255, 255])).unwrap();
/// assert_eq!(img.dimensions(), (290, 290));
/// ```
pub fn render(
    matrix: &SymbolMatrix,
    module_size_px: u32,
    fg: Rgb<u8>,
    bg: Rgb<u8>,
) -> Result<RasterImage> {
    if module_size_px < 1 {
        return Err(QrError::InvalidConfig(
            "module size must be at least 1 pixel".to_string(),
        ));
    }
    let size = u32::try_from(matrix.side_len())
        .ok()
        .and_then(|side| side.checked_mul(module_size_px))
        .filter(|&size| size <= MAX_IMAGE_SIDE_PX)
        .ok_or_else(|| {
            QrError::InvalidConfig(format!(
                "{} modules of {module_size_px} px exceed the maximum image side of {MAX_IMAGE_SIDE_PX} px",
                matrix.side_len()
            ))
        })?;

    let module = module_size_px as usize;
    let mut img = RgbImage::new(size, size);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = if matrix.is_dark(x as usize / module, y as usize / module) {
            fg
        } else {
            bg
        };
    }

    debug!(width = size, height = size, module_size_px, "Rendered QR image");
    Ok(img)
}

/// Returns a copy of `image` resized to fit inside `max_width`×`max_height`,
/// keeping its aspect ratio. Nearest-neighbour sampling keeps module edges
/// hard. Zero bounds are treated as 1.
///
/// This is for on-screen preview only; `image` itself is left untouched.
pub fn scale_for_display(image: &RasterImage, max_width: u32, max_height: u32) -> RasterImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let max_width = u64::from(max_width.max(1));
    let max_height = u64::from(max_height.max(1));
    let (w, h) = (u64::from(width), u64::from(height));

    // Whichever bound is tighter decides the scale
    let (new_width, new_height) = if max_width * h <= max_height * w {
        (max_width, (h * max_width / w).max(1))
    } else {
        ((w * max_height / h).max(1), max_height)
    };
    let (new_width, new_height) = (new_width as u32, new_height as u32);
    if (new_width, new_height) == (width, height) {
        return image.clone();
    }

    debug!(width, height, new_width, new_height, "Scaling QR image for display");
    imageops::resize(image, new_width, new_height, FilterType::Nearest)
}

/// Text rendering of `matrix`: two characters per module, `█` for dark,
/// space for light, one line per row.
pub fn to_text(matrix: &SymbolMatrix) -> String {
    let mut result = String::with_capacity(matrix.side_len() * (matrix.side_len() * 6 + 1));
    for row in matrix.rows() {
        for &dark in row {
            result.push_str(if dark { "██" } else { "  " });
        }
        result.push('\n');
    }
    result
}

/// Writes `image` to `path` as a PNG file.
///
/// The file handle is scoped to this call and flushed before returning. If
/// encoding or writing fails after the file was created, the partial file is
/// removed.
///
/// # Errors
///
/// Returns [`QrError::Io`] if the file cannot be created or written.
pub fn save_png(image: &RasterImage, path: &Path) -> Result<()> {
    let io_error = |source| QrError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    let written = image
        .write_to(&mut writer, ImageFormat::Png)
        .map_err(|err| QrError::from_image(path, err))
        .and_then(|()| writer.flush().map_err(io_error));
    drop(writer);

    if written.is_err() {
        let _ = fs::remove_file(path);
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncodingConfig;
    use crate::qrcode::encode;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn matrix(text: &str, border: u32) -> SymbolMatrix {
        encode(text, &EncodingConfig::default().with_border_modules(border)).unwrap()
    }

    #[test]
    fn test_render_dimensions() {
        let m = matrix("Hello, world!", 4);
        let img = render(&m, 10, BLACK, WHITE).unwrap();
        assert_eq!(img.dimensions(), (290, 290));

        let img = render(&m, 1, BLACK, WHITE).unwrap();
        assert_eq!(img.dimensions(), (29, 29));
    }

    #[test]
    fn test_render_zero_module_size() {
        let m = matrix("Hello, world!", 4);
        assert!(matches!(
            render(&m, 0, BLACK, WHITE),
            Err(QrError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_render_rejects_oversized_image() {
        let m = matrix("Hello, world!", 4);
        let err = render(&m, 10_000_000, BLACK, WHITE).unwrap_err();
        assert!(matches!(err, QrError::InvalidConfig(_)));

        // 29 modules: 564 px is the largest module that still fits
        let largest = MAX_IMAGE_SIDE_PX / 29;
        assert!(render(&m, largest + 1, BLACK, WHITE).is_err());
        assert_eq!(render(&m, 1, BLACK, WHITE).unwrap().width(), 29);
    }

    #[test]
    fn test_render_only_two_colors() {
        let fg = Rgb([25, 118, 210]);
        let bg = Rgb([245, 245, 245]);
        let img = render(&matrix("https://example.com", 4), 3, fg, bg).unwrap();
        assert!(img.pixels().all(|p| *p == fg || *p == bg));
        assert!(img.pixels().any(|p| *p == fg));
        assert!(img.pixels().any(|p| *p == bg));
    }

    #[test]
    fn test_render_modules_are_solid_blocks() {
        let m = matrix("blocks", 2);
        let size = 4u32;
        let img = render(&m, size, BLACK, WHITE).unwrap();
        for (x, y, pixel) in img.enumerate_pixels() {
            let dark = m.is_dark((x / size) as usize, (y / size) as usize);
            assert_eq!(*pixel, if dark { BLACK } else { WHITE }, "pixel ({x}, {y})");
        }
        // Top left finder corner starts right after the quiet zone
        assert_eq!(*img.get_pixel(7, 7), WHITE);
        assert_eq!(*img.get_pixel(8, 8), BLACK);
    }

    #[test]
    fn test_scale_for_display_fits_box() {
        let img = render(&matrix("https://example.com", 4), 10, BLACK, WHITE).unwrap();
        assert_eq!(img.dimensions(), (330, 330));

        let preview = scale_for_display(&img, 400, 400);
        assert_eq!(preview.dimensions(), (400, 400));

        let preview = scale_for_display(&img, 200, 100);
        assert_eq!(preview.dimensions(), (100, 100));

        let preview = scale_for_display(&img, 330, 1000);
        assert_eq!(preview.dimensions(), (330, 330));
        assert_eq!(preview, img);
    }

    #[test]
    fn test_scale_for_display_keeps_colors_and_source() {
        let img = render(&matrix("preview", 4), 10, BLACK, WHITE).unwrap();
        let before = img.clone();
        let preview = scale_for_display(&img, 123, 123);
        assert_eq!(preview.dimensions(), (123, 123));
        assert!(preview.pixels().all(|p| *p == BLACK || *p == WHITE));
        assert_eq!(img, before);
    }

    #[test]
    fn test_scale_for_display_zero_bounds() {
        let img = render(&matrix("tiny", 0), 1, BLACK, WHITE).unwrap();
        assert_eq!(scale_for_display(&img, 0, 0).dimensions(), (1, 1));
    }

    #[test]
    fn test_to_text_shape() {
        let m = matrix("text", 1);
        let text = to_text(&m);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), m.side_len());
        assert!(lines.iter().all(|l| l.chars().count() == m.side_len() * 2));
        // Quiet zone row is blank, the next row starts with the finder edge
        assert!(lines[0].trim().is_empty());
        assert!(lines[1].starts_with("  ██"));
    }

    #[test]
    fn test_save_png_roundtrip_dimensions() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("qr.png");
        let img = render(&matrix("save me", 4), 5, BLACK, WHITE).unwrap();
        save_png(&img, &path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), img.dimensions());
        assert_eq!(loaded, img);
    }

    #[test]
    fn test_save_png_missing_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("qr.png");
        let img = render(&matrix("save me", 4), 2, BLACK, WHITE).unwrap();
        match save_png(&img, &path) {
            Err(QrError::Io { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected Io error, got {other:?}"),
        }
        assert!(!path.exists());
    }
}
