//! Software pixel buffer used as the backing store of static surfaces.

use crate::color::Rgba;
use image::RgbaImage;
use std::fmt;

/// An RGBA8 pixel buffer with canvas-style fill and composite operations.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    image: RgbaImage,
}

impl fmt::Debug for RasterBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterBuffer")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

impl RasterBuffer {
    /// Create a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Wrap an already decoded image.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Mutably borrow the underlying image.
    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    /// Consume the buffer, returning the image.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Read a pixel, `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        (x < self.width() && y < self.height()).then(|| *self.image.get_pixel(x, y))
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = image::Rgba([0, 0, 0, 0]);
        }
    }

    /// Composite `color` over the rectangle, clipped to the buffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba) {
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = (x.saturating_add(width as i32)).clamp(0, self.width() as i32) as u32;
        let y1 = (y.saturating_add(height as i32)).clamp(0, self.height() as i32) as u32;

        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, 255);
            }
        }
    }

    /// Composite `color` at `(x, y)` scaled by an 8-bit `coverage` value
    /// (source-over, straight alpha). Out-of-bounds writes are ignored.
    pub fn blend(&mut self, x: u32, y: u32, color: Rgba, coverage: u8) {
        if x >= self.width() || y >= self.height() || coverage == 0 {
            return;
        }

        let src_a = (color[3] as f32 / 255.0) * (coverage as f32 / 255.0);
        if src_a <= 0.0 {
            return;
        }

        let dst = self.image.get_pixel_mut(x, y);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        for c in 0..3 {
            let src_c = color[c] as f32;
            let dst_c = dst[c] as f32;
            let out_c = (src_c * src_a + dst_c * dst_a * (1.0 - src_a)) / out_a;
            dst[c] = out_c.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Mirror the buffer left-to-right in place.
    pub fn flip_horizontal(&mut self) {
        image::imageops::flip_horizontal_in_place(&mut self.image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_over_transparent_keeps_source_alpha() {
        let mut buffer = RasterBuffer::new(4, 4);
        buffer.fill_rect(0, 0, 4, 4, image::Rgba([255, 255, 255, 128]));
        assert_eq!(buffer.pixel(2, 2), Some(image::Rgba([255, 255, 255, 128])));
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut buffer = RasterBuffer::new(4, 4);
        buffer.fill_rect(-2, -2, 3, 3, image::Rgba([255, 0, 0, 255]));
        assert_eq!(buffer.pixel(0, 0), Some(image::Rgba([255, 0, 0, 255])));
        assert_eq!(buffer.pixel(1, 1), Some(image::Rgba([0, 0, 0, 0])));
        assert_eq!(buffer.pixel(9, 9), None);
    }

    #[test]
    fn opaque_blend_replaces_destination() {
        let mut buffer = RasterBuffer::new(1, 1);
        buffer.fill_rect(0, 0, 1, 1, image::Rgba([0, 0, 255, 255]));
        buffer.blend(0, 0, image::Rgba([255, 0, 0, 255]), 255);
        assert_eq!(buffer.pixel(0, 0), Some(image::Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn flip_mirrors_columns() {
        let mut buffer = RasterBuffer::new(3, 1);
        buffer.fill_rect(0, 0, 1, 1, image::Rgba([1, 2, 3, 255]));
        buffer.flip_horizontal();
        assert_eq!(buffer.pixel(2, 0), Some(image::Rgba([1, 2, 3, 255])));
        assert_eq!(buffer.pixel(0, 0), Some(image::Rgba([0, 0, 0, 0])));
    }
}
