//! Glyph measurement and drawing.

use pane3d_core::{RasterBuffer, Rgba};

/// The subset of a 2-D text rasterizer the layout engine needs.
pub trait GlyphMetrics: Send + Sync {
    /// Horizontal advance of `c` at `font_size` pixels.
    fn advance(&self, c: char, font_size: f32) -> f32;

    /// Width of `text` at `font_size` pixels.
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|c| self.advance(c, font_size)).sum()
    }

    /// Composite `text` into `target` with its left edge at `x` and its
    /// baseline at `baseline`.
    fn draw_text(
        &self,
        target: &mut RasterBuffer,
        text: &str,
        x: f32,
        baseline: f32,
        font_size: f32,
        color: Rgba,
    );
}

/// Built-in monospaced face drawing every visible glyph as a solid block.
///
/// Used when no font file is configured, and in tests where exact widths
/// must be predictable: every character advances `0.6 * font_size`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockFont;

impl BlockFont {
    /// Advance of every glyph as a fraction of the font size.
    pub const ADVANCE_EM: f32 = 0.6;
    /// Block height above the baseline as a fraction of the font size.
    pub const ASCENT_EM: f32 = 0.7;
}

impl GlyphMetrics for BlockFont {
    fn advance(&self, _c: char, font_size: f32) -> f32 {
        font_size * Self::ADVANCE_EM
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
        let advance = self.advance(' ', font_size);
        let inset = advance * 0.1;
        let block_width = (advance - 2.0 * inset).max(1.0).round() as u32;
        let block_height = (font_size * Self::ASCENT_EM).max(1.0).round() as u32;
        let top = (baseline - block_height as f32).round() as i32;

        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let left = (x + i as f32 * advance + inset).round() as i32;
            target.fill_rect(left, top, block_width, block_height, color);
        }
    }
}
