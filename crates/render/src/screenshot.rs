use crate::surface::{PixelSource, Surface};
use anyhow::{Context, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::ColorType;
use image::ImageEncoder;
use std::path::Path;

/// Write an RGBA8 image to disk as a PNG.
pub fn write_png(path: &Path, size: (u32, u32), rgba: &[u8]) -> Result<()> {
    let (width, height) = size;
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let encoder = PngEncoder::new_with_quality(file, CompressionType::Fast, FilterType::NoFilter);
    encoder
        .write_image(rgba, width, height, ColorType::Rgba8.into())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Write the pixels currently behind `surface` as a PNG.
///
/// Live surfaces write the stream's latest frame. Returns `Ok(false)` when a
/// live stream has not produced a frame yet.
pub fn save_surface_png(surface: &Surface, path: &Path) -> Result<bool> {
    let frame;
    let raster = match surface.pixels() {
        PixelSource::Raster(raster) => raster,
        PixelSource::Video(source) => match source.stream().read_frame() {
            Some(latest) => {
                frame = latest;
                &frame
            }
            None => return Ok(false),
        },
    };

    write_png(path, (raster.width(), raster.height()), raster.as_bytes())?;
    Ok(true)
}
