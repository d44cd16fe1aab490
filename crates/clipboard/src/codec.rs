//! PNG conversion for clipboard images.

use crate::access::RawImage;
use crate::error::{ClipboardError, Result};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};

/// Encode RGBA8 pixels as PNG.
pub fn encode_png(image: &RawImage) -> Result<Vec<u8>> {
    let expected = image.width * image.height * 4;
    if image.width == 0 || image.height == 0 || image.rgba.len() != expected {
        return Err(ClipboardError::InvalidImage {
            width: image.width,
            height: image.height,
        });
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        &image.rgba,
        image.width as u32,
        image.height as u32,
        ExtendedColorType::Rgba8,
    )?;
    Ok(png)
}

/// Decode PNG bytes back to RGBA8 pixels.
pub fn decode_png(png: &[u8]) -> Result<RawImage> {
    let decoded = image::load_from_memory_with_format(png, ImageFormat::Png)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    Ok(RawImage {
        width: width as usize,
        height: height as usize,
        rgba: decoded.into_raw(),
    })
}
