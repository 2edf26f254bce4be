//! Canvas encoding: `RgbaImage` → bytes in the requested [`OutputFormat`].
//!
//! JPEG has no alpha channel and the `image` encoder refuses RGBA input, so
//! the canvas is reduced to RGB first. The compositor always paints onto an
//! opaque background, which makes dropping alpha lossless in practice.

use crate::config::OutputFormat;
use image::{DynamicImage, RgbaImage};
use std::io::Cursor;
use tracing::debug;

/// Encode a composed canvas.
pub fn encode_canvas(canvas: RgbaImage, format: OutputFormat) -> Result<Vec<u8>, image::ImageError> {
    let img = match format {
        OutputFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8()),
        OutputFormat::Png => DynamicImage::ImageRgba8(canvas),
    };

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format.image_format())?;
    debug!(
        "Encoded {}x{} canvas → {} bytes {}",
        img.width(),
        img.height(),
        buf.len(),
        format
    );

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn encode_png_keeps_pixels() {
        let canvas = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let bytes = encode_canvas(canvas, OutputFormat::Png).expect("encode should succeed");
        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(5, 5), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn encode_jpeg_from_rgba() {
        let canvas = RgbaImage::from_pixel(16, 8, Rgba([0, 128, 255, 255]));
        let bytes = encode_canvas(canvas, OutputFormat::Jpeg).expect("encode should succeed");
        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }
}
