//! Greedy wrapping with shrink-to-fit font sizing.

use crate::metrics::GlyphMetrics;
use pane3d_core::{RasterBuffer, ResolvedStyle};
use tracing::{debug, warn};

/// Font size decrement between fitting attempts.
pub const FONT_SIZE_STEP: u32 = 2;

/// Largest raster side allocated for a text surface.
pub const MAX_SURFACE_SIDE: u32 = 4096;

/// Result of laying out a block of text into a square box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayout {
    /// Wrapped lines, top to bottom, without trailing whitespace.
    pub lines: Vec<String>,
    /// Font size the lines were packed at.
    pub font_size: u32,
    /// Horizontal margin and inter-line gap: `font_size / 2`.
    pub line_spacing: u32,
    /// Height the block needs, margins included.
    pub projected_height: u64,
    /// Width and height of the square surface.
    pub surface_size: (u32, u32),
}

impl TextLayout {
    /// Whether the block fits vertically. `false` only when the floor size
    /// was reached and the text still overflows.
    pub fn fits(&self) -> bool {
        self.projected_height <= self.surface_size.1 as u64
    }

    /// Baseline of line `index`.
    pub fn baseline(&self, index: usize) -> u64 {
        (self.font_size as u64 + self.line_spacing as u64) * (index as u64 + 1)
    }
}

fn projected_height(line_count: usize, font_size: u32, line_spacing: u32) -> u64 {
    2 * line_spacing as u64 + line_count as u64 * (font_size as u64 + line_spacing as u64)
}

/// Lay out `text` inside a square of side `style.max_width`, clamped to
/// [`MAX_SURFACE_SIDE`].
pub fn layout(text: &str, style: &ResolvedStyle, font: &dyn GlyphMetrics) -> TextLayout {
    let max_width = style.max_width.min(MAX_SURFACE_SIDE);
    if max_width < style.max_width {
        warn!(
            requested = style.max_width,
            side = max_width,
            "Clamping text surface size"
        );
    }
    let mut font_size = first_candidate(style.font_size.max(1), max_width);

    loop {
        let line_spacing = font_size / 2;
        let lines = wrap_lines(
            text,
            font_size as f32,
            line_spacing as f32,
            max_width as f32,
            font,
        );
        let projected = projected_height(lines.len(), font_size, line_spacing);

        if projected <= max_width as u64 || font_size <= FONT_SIZE_STEP {
            if projected > max_width as u64 {
                debug!(
                    lines = lines.len(),
                    font_size, "Text overflows its surface at the minimum font size"
                );
            }
            return TextLayout {
                lines,
                font_size,
                line_spacing,
                projected_height: projected,
                surface_size: (max_width, max_width),
            };
        }

        font_size -= FONT_SIZE_STEP;
    }
}

/// Largest size on the `requested - k * FONT_SIZE_STEP` ladder that is at
/// most one pixel over `max_width`. Every larger size projects taller than
/// the box, so the search can start here.
fn first_candidate(requested: u32, max_width: u32) -> u32 {
    let limit = max_width.saturating_add(1);
    if requested <= limit {
        return requested;
    }
    let steps = (requested - limit).div_ceil(FONT_SIZE_STEP);
    requested - steps * FONT_SIZE_STEP
}

/// Greedily wrap `text` so every line's width plus `margin` stays within
/// `max_width`.
///
/// Breaks at the last whitespace at or before the fit point. A word too long
/// for a line of its own starts a new line and is hard-cut; at least one
/// character is placed per line. `\n` forces a break.
pub fn wrap_lines(
    text: &str,
    font_size: f32,
    margin: f32,
    max_width: f32,
    font: &dyn GlyphMetrics,
) -> Vec<String> {
    let mut lines = Vec::new();
    if text.is_empty() {
        return lines;
    }

    for paragraph in text.split('\n') {
        let chars: Vec<char> = paragraph.chars().collect();
        if chars.iter().all(|c| c.is_whitespace()) {
            lines.push(String::new());
            continue;
        }
        wrap_paragraph(&chars, font_size, margin, max_width, font, &mut lines);
    }

    lines
}

fn wrap_paragraph(
    chars: &[char],
    font_size: f32,
    margin: f32,
    max_width: f32,
    font: &dyn GlyphMetrics,
    lines: &mut Vec<String>,
) {
    let mut start = skip_whitespace(chars, 0);

    while start < chars.len() {
        let mut width = 0.0;
        let mut fit = start;
        while fit < chars.len() {
            let next = width + font.advance(chars[fit], font_size);
            if next + margin > max_width {
                break;
            }
            width = next;
            fit += 1;
        }

        let end = if fit == chars.len() {
            fit
        } else {
            match (start..=fit).rev().find(|&i| chars[i].is_whitespace()) {
                Some(space) if space > start => space,
                // the first word alone is wider than the line
                _ => fit.max(start + 1),
            }
        };

        let line: String = chars[start..end].iter().collect();
        lines.push(line.trim_end().to_string());
        start = skip_whitespace(chars, end);
    }
}

fn skip_whitespace(chars: &[char], mut index: usize) -> usize {
    while index < chars.len() && chars[index].is_whitespace() {
        index += 1;
    }
    index
}

/// Render a layout into a square raster.
pub fn render(layout: &TextLayout, style: &ResolvedStyle, font: &dyn GlyphMetrics) -> RasterBuffer {
    let side = layout.surface_size.0.min(MAX_SURFACE_SIDE);
    let mut raster = RasterBuffer::new(side, side);
    raster.fill_rect(0, 0, side, side, style.bg_color);

    for (i, line) in layout.lines.iter().enumerate() {
        font.draw_text(
            &mut raster,
            line,
            layout.line_spacing as f32,
            layout.baseline(i) as f32,
            layout.font_size as f32,
            style.text_color,
        );
    }

    raster
}

/// Lay out and render in one step.
pub fn rasterize_text(
    text: &str,
    style: &ResolvedStyle,
    font: &dyn GlyphMetrics,
) -> (TextLayout, RasterBuffer) {
    let layout = layout(text, style, font);
    let raster = render(&layout, style, font);
    (layout, raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::BlockFont;
    use pane3d_core::TextStyle;

    fn style(max_width: u32, font_size: u32) -> ResolvedStyle {
        TextStyle::default()
            .with_max_width(max_width)
            .with_font_size(font_size)
            .resolve()
    }

    #[test]
    fn short_text_keeps_requested_size() {
        let layout = layout("Hi", &style(512, 50), &BlockFont);
        assert_eq!(layout.lines, vec!["Hi"]);
        assert_eq!(layout.font_size, 50);
        assert_eq!(layout.line_spacing, 25);
        assert!(layout.fits());
    }

    #[test]
    fn wraps_at_last_space_before_fit_point() {
        // 10px font: 6px per char, margin 5 → 15 chars fit in 100px
        let lines = wrap_lines("aaaa bbbb cccc dddd", 10.0, 5.0, 100.0, &BlockFont);
        assert_eq!(lines, vec!["aaaa bbbb cccc", "dddd"]);
    }

    #[test]
    fn long_word_starts_new_line_and_is_hard_cut() {
        let lines = wrap_lines("ab cdefghijklmnopqrstuvwxyz", 10.0, 4.0, 40.0, &BlockFont);
        // 6 chars fit per line
        assert_eq!(lines, vec!["ab", "cdefgh", "ijklmn", "opqrst", "uvwxyz"]);
    }

    #[test]
    fn always_places_one_char_per_line() {
        let lines = wrap_lines("abc", 100.0, 0.0, 10.0, &BlockFont);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn newlines_force_breaks() {
        let lines = wrap_lines("one\n\ntwo", 10.0, 5.0, 200.0, &BlockFont);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        let layout = layout("", &style(100, 50), &BlockFont);
        assert!(layout.lines.is_empty());
        assert_eq!(layout.font_size, 50);
    }

    #[test]
    fn long_text_shrinks_until_it_fits() {
        let text = "Sample main text that goes into this pane.";
        let layout = layout(text, &style(100, 50), &BlockFont);
        assert!(layout.fits());
        assert!(layout.font_size < 50);
        assert_eq!(layout.font_size % 2, 0);

        // one step larger would not have fitted
        let larger = layout_at(text, 100, layout.font_size + FONT_SIZE_STEP);
        assert!(larger > 100);
    }

    fn layout_at(text: &str, max_width: u32, font_size: u32) -> u64 {
        let spacing = font_size / 2;
        let lines = wrap_lines(
            text,
            font_size as f32,
            spacing as f32,
            max_width as f32,
            &BlockFont,
        );
        projected_height(lines.len(), font_size, spacing)
    }

    #[test]
    fn stops_at_floor_and_reports_overflow() {
        let text = "x".repeat(10_000);
        let layout = layout(&text, &style(20, 11), &BlockFont);
        assert_eq!(layout.font_size, 1);
        assert!(!layout.fits());
    }

    #[test]
    fn first_candidate_stays_on_the_step_ladder() {
        assert_eq!(first_candidate(50, 100), 50);
        assert_eq!(first_candidate(101, 100), 101);
        assert_eq!(first_candidate(102, 100), 100);
        assert_eq!(first_candidate(103, 100), 101);
        assert_eq!(first_candidate(u32::MAX, 100), 101);
        assert_eq!(first_candidate(u32::MAX - 1, 100), 100);
    }

    #[test]
    fn huge_font_size_starts_at_box_side() {
        let layout = layout("Hi", &style(100, u32::MAX), &BlockFont);
        assert!(layout.font_size <= 100);
        assert!(layout.fits());
        assert_eq!(layout.surface_size, (100, 100));
    }

    #[test]
    fn parsed_huge_font_size_lays_out() {
        let points = pane3d_core::parse_data_points(
            r#"{"drawableId":"Title","type":"text","content":"Hi","fontSize":3000000000,"maxWidth":100}"#,
        )
        .unwrap();
        let style = points[0].style.resolve();
        let layout = layout(&points[0].content, &style, &BlockFont);
        assert!(layout.font_size <= 100);
        assert!(layout.projected_height <= 100);
    }

    #[test]
    fn oversized_box_is_clamped_before_wrapping() {
        let text = "word ".repeat(2_000);
        let (layout, raster) = rasterize_text(&text, &style(8_000, 40), &BlockFont);

        assert_eq!(layout.surface_size, (MAX_SURFACE_SIDE, MAX_SURFACE_SIDE));
        assert_eq!((raster.width(), raster.height()), (MAX_SURFACE_SIDE, MAX_SURFACE_SIDE));
        let side = MAX_SURFACE_SIDE as f32;
        for line in &layout.lines {
            let width = BlockFont.measure(line, layout.font_size as f32);
            assert!(width + layout.line_spacing as f32 <= side, "{line:?} overflows");
        }
    }

    #[test]
    fn render_fills_background_and_draws_lines() {
        let style = TextStyle::default()
            .with_max_width(64)
            .with_font_size(20)
            .with_bg_color("#0000ff")
            .with_text_color("#ffffff")
            .resolve();
        let (layout, raster) = rasterize_text("A", &style, &BlockFont);

        assert_eq!((raster.width(), raster.height()), (64, 64));
        assert_eq!(raster.pixel(63, 63), Some(image::Rgba([0, 0, 255, 255])));

        // first glyph block sits left of the baseline at x = line_spacing
        let baseline = layout.baseline(0) as u32;
        let glyph_x = layout.line_spacing + 5;
        assert_eq!(
            raster.pixel(glyph_x, baseline - 2),
            Some(image::Rgba([255, 255, 255, 255]))
        );
    }
}
