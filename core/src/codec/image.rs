//! PNG encoding for rasterized pages and lightweight header probing.

use std::io::Cursor;

use anyhow::{Context, anyhow};
use image::{ImageFormat, ImageReader, RgbaImage};

use crate::types::ImageDimensions;

use super::Result;

/// Encode a straight-alpha RGBA8888 buffer as PNG.
pub fn encode_png(width: u32, height: u32, pixels: Vec<u8>) -> Result<Vec<u8>> {
    let image = RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| anyhow!("pixel buffer does not match {width}x{height} RGBA"))?;

    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png).context("encoding png")?;
    Ok(cursor.into_inner())
}

/// Read the pixel dimensions from the image header without decoding the pixels.
pub fn probe_dimensions(data: &[u8]) -> Result<ImageDimensions> {
    if data.is_empty() {
        return Err(anyhow!("empty image data"));
    }

    let reader =
        ImageReader::new(Cursor::new(data)).with_guessed_format().context("guessing image format")?;
    let (width, height) = reader.into_dimensions().context("reading image header")?;
    Ok(ImageDimensions { width, height })
}

/// File extension matching the image's magic bytes, if recognised.
pub fn sniff_extension(data: &[u8]) -> Option<&'static str> {
    image::guess_format(data)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
}
