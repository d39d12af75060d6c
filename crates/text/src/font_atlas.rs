//! TrueType/OpenType faces loaded with `fontdue`.
//!
//! A [`FontAtlas`] caches the advance widths of a character set at a base
//! rasterization size so that measuring during layout (which measures the same
//! prefixes many times per font-size step) never re-parses glyph outlines.
//! Drawing rasterizes coverage bitmaps at the requested size.

use crate::metrics::{BlockFont, GlyphMetrics};
use anyhow::{Context, Result};
use fontdue::{Font, FontSettings};
use pane3d_core::{RasterBuffer, Rgba};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Character range for ASCII printable characters
pub const ASCII_RANGE: std::ops::Range<u32> = 32..127;

/// Smallest size advances are cached at.
pub const MIN_BASE_SIZE: f32 = 1.0;

const DEFAULT_BASE_SIZE: f32 = 48.0;

/// A parsed font with cached glyph advances.
pub struct FontAtlas {
    font: Font,
    /// Advance widths at `base_size`.
    advances: HashMap<char, f32>,
    /// Size the advance cache was measured at.
    base_size: f32,
}

impl FontAtlas {
    /// Get the font
    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Size the advance cache was measured at.
    pub fn base_size(&self) -> f32 {
        self.base_size
    }

    /// Number of characters with cached advances.
    pub fn cached_glyphs(&self) -> usize {
        self.advances.len()
    }
}

impl GlyphMetrics for FontAtlas {
    fn advance(&self, c: char, font_size: f32) -> f32 {
        match self.advances.get(&c) {
            Some(advance) => advance * font_size / self.base_size,
            None => self.font.metrics(c, font_size).advance_width,
        }
    }

    fn draw_text(
        &self,
        target: &mut RasterBuffer,
        text: &str,
        x: f32,
        baseline: f32,
        font_size: f32,
        color: Rgba,
    ) {
        let mut cursor_x = x;

        for c in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(c, font_size);
            let left = (cursor_x + metrics.xmin as f32).round() as i32;
            let top = (baseline - metrics.ymin as f32 - metrics.height as f32).round() as i32;

            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let coverage = bitmap[row * metrics.width + col];
                    let px = left + col as i32;
                    let py = top + row as i32;
                    if px >= 0 && py >= 0 {
                        target.blend(px as u32, py as u32, color, coverage);
                    }
                }
            }

            cursor_x += metrics.advance_width;
        }
    }
}

/// Builder for creating font atlases
pub struct FontAtlasBuilder {
    font_data: Vec<u8>,
    base_size: f32,
    chars: Vec<char>,
}

impl FontAtlasBuilder {
    /// Create a new builder from font data
    pub fn new(font_data: Vec<u8>) -> Self {
        Self {
            font_data,
            base_size: DEFAULT_BASE_SIZE,
            chars: ASCII_RANGE.filter_map(char::from_u32).collect(),
        }
    }

    /// Load font from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let font_data = std::fs::read(path)
            .with_context(|| format!("Failed to read font file: {}", path.display()))?;
        Ok(Self::new(font_data))
    }

    /// Set the size advances are cached at. Non-finite sizes keep the
    /// default; sizes below [`MIN_BASE_SIZE`] are raised to it.
    pub fn with_base_size(mut self, size: f32) -> Self {
        self.base_size = if size.is_finite() {
            size.max(MIN_BASE_SIZE)
        } else {
            DEFAULT_BASE_SIZE
        };
        self
    }

    /// Set custom character set
    pub fn with_chars(mut self, chars: Vec<char>) -> Self {
        self.chars = chars;
        self
    }

    /// Parse the font and cache advances.
    pub fn build(self) -> Result<FontAtlas> {
        let font = Font::from_bytes(self.font_data, FontSettings::default())
            .map_err(|e| anyhow::anyhow!("Failed to parse font: {}", e))?;

        let advances: HashMap<char, f32> = self
            .chars
            .iter()
            .map(|&c| (c, font.metrics(c, self.base_size).advance_width))
            .collect();

        debug!(
            "Cached {} glyph advances at size {}",
            advances.len(),
            self.base_size
        );

        Ok(FontAtlas {
            font,
            advances,
            base_size: self.base_size,
        })
    }
}

/// Font faces by name, with a fallback face for unknown names.
#[derive(Clone)]
pub struct FontBook {
    faces: HashMap<String, Arc<dyn GlyphMetrics>>,
    fallback: Arc<dyn GlyphMetrics>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new(Arc::new(BlockFont))
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.faces.keys().collect();
        names.sort();
        f.debug_struct("FontBook").field("faces", &names).finish()
    }
}

impl FontBook {
    /// Create a book whose unknown faces resolve to `fallback`.
    pub fn new(fallback: Arc<dyn GlyphMetrics>) -> Self {
        Self {
            faces: HashMap::new(),
            fallback,
        }
    }

    /// Register a face under a case-insensitive name.
    pub fn insert(&mut self, face: &str, metrics: Arc<dyn GlyphMetrics>) {
        self.faces.insert(face.to_ascii_lowercase(), metrics);
    }

    /// Load a font file and register it under `face`.
    pub fn load_face(&mut self, face: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let atlas = FontAtlasBuilder::from_file(path)?.build()?;
        info!("Loaded font face '{}' from {}", face, path.display());
        self.insert(face, Arc::new(atlas));
        Ok(())
    }

    /// Replace the fallback face.
    pub fn set_fallback(&mut self, metrics: Arc<dyn GlyphMetrics>) {
        self.fallback = metrics;
    }

    /// Look up a face, falling back when it is not registered.
    pub fn face(&self, name: &str) -> &dyn GlyphMetrics {
        self.faces
            .get(&name.to_ascii_lowercase())
            .map(|metrics| metrics.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    /// Whether `name` is registered explicitly.
    pub fn contains(&self, name: &str) -> bool {
        self.faces.contains_key(&name.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Wide;

    impl GlyphMetrics for Wide {
        fn advance(&self, _c: char, font_size: f32) -> f32 {
            font_size
        }

        fn draw_text(&self, _: &mut RasterBuffer, _: &str, _: f32, _: f32, _: f32, _: Rgba) {}
    }

    #[test]
    fn test_ascii_range() {
        let chars: Vec<char> = ASCII_RANGE.filter_map(char::from_u32).collect();
        assert!(!chars.is_empty());
        assert!(chars.contains(&'A'));
        assert!(chars.contains(&'z'));
        assert!(chars.contains(&'0'));
    }

    #[test]
    fn font_book_falls_back_for_unknown_faces() {
        let mut book = FontBook::default();
        book.insert("Wide", Arc::new(Wide));

        assert!(book.contains("wide"));
        assert_eq!(book.face("WIDE").measure("ab", 10.0), 20.0);
        assert_eq!(book.face("Arial").measure("ab", 10.0), 12.0);
    }

    #[test]
    fn base_size_is_kept_positive() {
        assert_eq!(FontAtlasBuilder::new(Vec::new()).with_base_size(0.0).base_size, MIN_BASE_SIZE);
        assert_eq!(FontAtlasBuilder::new(Vec::new()).with_base_size(-3.0).base_size, MIN_BASE_SIZE);
        assert_eq!(
            FontAtlasBuilder::new(Vec::new()).with_base_size(f32::NAN).base_size,
            DEFAULT_BASE_SIZE
        );
        assert_eq!(FontAtlasBuilder::new(Vec::new()).with_base_size(32.0).base_size, 32.0);
    }

    #[test]
    fn invalid_font_data_is_an_error() {
        assert!(FontAtlasBuilder::new(vec![0, 1, 2, 3]).build().is_err());
        assert!(FontAtlasBuilder::from_file("/nonexistent/font.ttf").is_err());
    }
}
