use pane3d_core::{RasterBuffer, TextStyle};
use pane3d_render::{PixelSource, RenderSide, Surface, SurfaceBuilder, SurfaceOptions, VideoFrameSource};
use pane3d_text::{rasterize_text, FontBook, TextLayout};
use std::sync::Arc;
use tracing::debug;

/// Text shown while media loads or after it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderText {
    /// Shown while a load is outstanding.
    pub loading: String,
    /// Shown when an image cannot be fetched or decoded.
    pub image_failed: String,
    /// Shown when the camera cannot be acquired.
    pub video_failed: String,
}

impl Default for PlaceholderText {
    fn default() -> Self {
        Self {
            loading: "Loading...".to_string(),
            image_failed: "Unable to load image.".to_string(),
            video_failed: "Unable to load video.".to_string(),
        }
    }
}

/// Builds every kind of surface a slot can show.
#[derive(Default)]
pub struct SurfaceFactory {
    fonts: FontBook,
    builder: SurfaceBuilder,
    messages: PlaceholderText,
}

impl SurfaceFactory {
    /// Factory rendering text with `fonts`.
    pub fn new(fonts: FontBook) -> Self {
        Self {
            fonts,
            ..Self::default()
        }
    }

    /// Builder: replace the placeholder strings.
    pub fn with_messages(mut self, messages: PlaceholderText) -> Self {
        self.messages = messages;
        self
    }

    /// Registered fonts.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Mutable access to the fonts, for registering faces.
    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Placeholder strings.
    pub fn messages(&self) -> &PlaceholderText {
        &self.messages
    }

    /// Shrink-to-fit text surface.
    pub fn text(
        &self,
        body: &str,
        style: &TextStyle,
        invert: bool,
        transparent: bool,
    ) -> (TextLayout, Surface) {
        let resolved = style.resolve();
        let font = self.fonts.face(&resolved.font_face);
        let (layout, raster) = rasterize_text(body, &resolved, font);
        debug!(
            lines = layout.lines.len(),
            font_size = layout.font_size,
            fits = layout.fits(),
            "Rendered text surface"
        );
        let options = SurfaceOptions::new()
            .with_invert(invert)
            .with_transparent(transparent);
        (layout, self.builder.build(PixelSource::Raster(raster), options))
    }

    /// Transparent "loading" placeholder.
    pub fn loading(&self, style: &TextStyle, invert: bool) -> Surface {
        self.text(&self.messages.loading, style, invert, true).1
    }

    /// Opaque image-failure fallback.
    pub fn image_failed(&self, style: &TextStyle, invert: bool) -> Surface {
        self.text(&self.messages.image_failed, style, invert, false).1
    }

    /// Opaque video-failure fallback.
    pub fn video_failed(&self, style: &TextStyle, invert: bool) -> Surface {
        self.text(&self.messages.video_failed, style, invert, false).1
    }

    /// Opaque surface over a decoded image.
    pub fn image(&self, raster: RasterBuffer, invert: bool) -> Surface {
        self.builder.build(
            PixelSource::Raster(raster),
            SurfaceOptions::new().with_invert(invert),
        )
    }

    /// Opaque surface over the shared camera frames. Inside-facing slots see
    /// the back face; the pixels are never mirrored.
    pub fn video(&self, source: Arc<VideoFrameSource>, invert: bool) -> Surface {
        let side = if invert { RenderSide::Back } else { RenderSide::Front };
        self.builder.build(
            PixelSource::Video(source),
            SurfaceOptions::new()
                .with_invert(invert)
                .with_render_side(side),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_differ_in_transparency() {
        let factory = SurfaceFactory::default();
        let style = TextStyle::default().with_max_width(64);

        let loading = factory.loading(&style, false);
        let failed = factory.image_failed(&style, false);
        assert!(loading.transparent());
        assert!(!failed.transparent());
        assert_ne!(loading.content_hash(), failed.content_hash());
    }

    #[test]
    fn text_surface_is_square_at_max_width() {
        let factory = SurfaceFactory::default();
        let style = TextStyle::default().with_max_width(100);
        let (layout, surface) = factory.text("Hello", &style, true, false);
        assert_eq!(surface.pixels().size(), (100, 100));
        assert_eq!(surface.render_side(), RenderSide::Back);
        assert!(layout.fits());
    }
}
