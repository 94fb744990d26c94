//! Writes a finished pixel buffer to disk.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use log::info;

use crate::errors::Result;
use crate::render::PixelBuffer;

/// Encodes the buffer as an 8-bit RGBA PNG.
pub fn write_png<P: AsRef<Path>>(path: P, pixels: &PixelBuffer) -> Result<()> {
    let path = path.as_ref();
    let output = BufWriter::new(File::create(path)?);
    PngEncoder::new(output).write_image(
        pixels.as_bytes(),
        pixels.width() as u32,
        pixels.height() as u32,
        ColorType::Rgba8,
    )?;
    info!(
        "wrote {}x{} image to {}",
        pixels.width(),
        pixels.height(),
        path.display()
    );
    Ok(())
}
