//! # Image Boundary
//!
//! Converts between encoded image files and the RGBA pixel buffers the codec
//! works on. Any format the `image` crate reads is accepted as a cover, but
//! stego images are only written in lossless formats: a lossy encoder would
//! rewrite the low bits that carry the payload.

use anyhow::{bail, Context, Result};
use image::{GenericImageView, ImageFormat, RgbaImage};
use log::debug;
use std::io::Cursor;
use std::path::Path;

/// Formats whose encoders keep every channel value intact.
pub const LOSSLESS_FORMATS: [ImageFormat; 5] = [
    ImageFormat::Png,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
    ImageFormat::Tga,
    ImageFormat::Pnm,
];

pub fn is_lossless(format: ImageFormat) -> bool {
    LOSSLESS_FORMATS.contains(&format)
}

/// Decode image bytes of any supported format into an RGBA buffer.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(bytes).context("failed to decode image")?;
    Ok(img.to_rgba8())
}

pub fn open_image(path: impl AsRef<Path>) -> Result<RgbaImage> {
    let path = path.as_ref();
    let img = image::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let (width, height) = img.dimensions();
    debug!("Loaded {} ({}x{})", path.display(), width, height);
    Ok(img.to_rgba8())
}

/// Encode the buffer as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut output_bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut output_bytes), ImageFormat::Png)
        .context("failed to encode PNG")?;
    Ok(output_bytes)
}

/// Write the buffer to `path`, choosing the format from the file extension.
///
/// # Errors
/// - The extension is unknown
/// - The format is lossy (JPEG, WebP, ...)
/// - Encoding or writing fails
pub fn save_image(image: &RgbaImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)
        .with_context(|| format!("cannot infer an image format for {}", path.display()))?;

    if !is_lossless(format) {
        bail!(
            "{:?} is not a lossless format; the hidden bits would not survive. Use PNG instead",
            format
        );
    }

    image
        .save_with_format(path, format)
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!("Wrote {} as {:?}", path.display(), format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(9, 7, |x, y| {
            Rgba([x as u8 | 1, y as u8, (x * y) as u8, 128 + x as u8])
        })
    }

    #[test]
    fn test_png_bytes_keep_every_bit() {
        let img = sample();
        let bytes = encode_png(&img).unwrap();
        assert_eq!(decode_image(&bytes).unwrap(), img);
    }

    #[test]
    fn test_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let img = sample();

        for name in ["out.png", "out.tiff", "out.bmp", "out.tga"] {
            let path = dir.path().join(name);
            save_image(&img, &path).unwrap();
            assert_eq!(open_image(&path).unwrap(), img, "{name}");
        }
    }

    #[test]
    fn test_pam_keeps_every_bit() {
        let dir = tempfile::tempdir().unwrap();
        let img = sample();
        let path = dir.path().join("out.pam");

        save_image(&img, &path).unwrap();
        assert_eq!(open_image(&path).unwrap(), img);
    }

    #[test]
    fn test_lossy_output_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let err = save_image(&sample(), &path).unwrap_err();
        assert!(err.to_string().contains("lossless"));
        assert!(!path.exists());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_image(&sample(), dir.path().join("out.xyz")).is_err());
    }

    #[test]
    fn test_garbage_bytes() {
        assert!(decode_image(b"definitely not an image").is_err());
    }
}
