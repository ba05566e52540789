//! Screenshot downsampling.
//!
//! Full-resolution captures can exceed what MCP hosts accept in a single
//! payload, so every capture is shrunk before it leaves the server.

use droid_core::{DroidError, Result};
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use std::io::BufWriter;
use std::path::Path;

/// Fraction of the original width and height kept.
pub const SCALE: f64 = 0.3;

/// Target size for a `width` x `height` capture, truncated, at least 1x1.
pub fn scaled_dimensions(width: u32, height: u32) -> (u32, u32) {
    let scale = |v: u32| ((v as f64 * SCALE) as u32).max(1);
    (scale(width), scale(height))
}

/// Decode `raw`, resize it with a Lanczos filter and write a maximally
/// compressed PNG to `out`. Returns the new dimensions.
pub fn compress_screenshot(raw: &Path, out: &Path) -> Result<(u32, u32)> {
    // Sniff the format so configured paths need no .png extension
    let img = image::ImageReader::open(raw)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| DroidError::operation("screenshot", format!("failed to open {}: {e}", raw.display())))?
        .decode()
        .map_err(|e| DroidError::operation("screenshot", format!("failed to decode {}: {e}", raw.display())))?;

    let (width, height) = scaled_dimensions(img.width(), img.height());
    let resized = img.resize_exact(width, height, FilterType::Lanczos3);

    let file = std::fs::File::create(out)
        .map_err(|e| DroidError::operation("screenshot", format!("failed to create {}: {e}", out.display())))?;
    let encoder = PngEncoder::new_with_quality(
        BufWriter::new(file),
        CompressionType::Best,
        PngFilter::Adaptive,
    );
    resized
        .write_with_encoder(encoder)
        .map_err(|e| DroidError::operation("screenshot", format!("failed to encode {}: {e}", out.display())))?;

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_scaled_dimensions() {
        assert_eq!(scaled_dimensions(1080, 2400), (324, 720));
        assert_eq!(scaled_dimensions(1000, 1000), (300, 300));
        assert_eq!(scaled_dimensions(3, 1), (1, 1));
    }

    #[test]
    fn test_compress_writes_smaller_png() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("screenshot.png");
        let out = dir.path().join("compressed_screenshot.png");
        RgbImage::from_pixel(200, 100, Rgb([10, 120, 200])).save(&raw).unwrap();

        let dims = compress_screenshot(&raw, &out).unwrap();
        assert_eq!(dims, (60, 30));

        let written = image::open(&out).unwrap();
        assert_eq!((written.width(), written.height()), (60, 30));
    }

    #[test]
    fn test_compress_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("screenshot.png");
        std::fs::write(&raw, b"not a png").unwrap();
        let err = compress_screenshot(&raw, &dir.path().join("out.png")).unwrap_err();
        assert!(matches!(err, DroidError::Operation { .. }));
    }

    #[test]
    fn test_missing_capture_is_operation_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = compress_screenshot(&dir.path().join("absent.png"), &dir.path().join("out.png"))
            .unwrap_err();
        assert!(matches!(err, DroidError::Operation { ref op, .. } if op == "screenshot"));
    }

    #[test]
    fn test_unwritable_output_is_operation_error() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("screenshot.png");
        RgbImage::from_pixel(20, 10, Rgb([0, 0, 0])).save(&raw).unwrap();
        let out = dir.path().join("no-such-dir").join("out.png");
        let err = compress_screenshot(&raw, &out).unwrap_err();
        assert!(matches!(err, DroidError::Operation { ref op, .. } if op == "screenshot"));
    }
}
