use crate::surface::{PixelSource, RenderSide, Surface, WrapMode};
use tracing::trace;

/// How a pixel source should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceOptions {
    /// The mesh is viewed from its inside face.
    pub invert: bool,
    /// Blend over whatever is behind the mesh.
    pub transparent: bool,
    /// Face override for live sources; static sources derive it from `invert`.
    pub render_side: Option<RenderSide>,
}

impl SurfaceOptions {
    /// Opaque, non-inverted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set inversion.
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Builder: set transparency.
    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    /// Builder: choose the face for live sources.
    pub fn with_render_side(mut self, side: RenderSide) -> Self {
        self.render_side = Some(side);
        self
    }
}

/// Turns raw pixels into displayable surfaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceBuilder;

impl SurfaceBuilder {
    /// Build a surface.
    ///
    /// Inverted static rasters are mirrored left-to-right so they read
    /// correctly from inside the mesh, and drawn on the back face. Inverted
    /// live sources are never pixel-flipped; they clamp at the edges and keep
    /// the face the caller asked for (front by default).
    pub fn build(&self, pixels: PixelSource, options: SurfaceOptions) -> Surface {
        let (pixels, render_side, wrap) = match pixels {
            PixelSource::Raster(mut raster) if options.invert => {
                raster.flip_horizontal();
                (PixelSource::Raster(raster), RenderSide::Back, WrapMode::Repeat)
            }
            PixelSource::Raster(raster) => {
                (PixelSource::Raster(raster), RenderSide::Front, WrapMode::Repeat)
            }
            PixelSource::Video(source) if options.invert => (
                PixelSource::Video(source),
                options.render_side.unwrap_or(RenderSide::Front),
                WrapMode::ClampToEdge,
            ),
            PixelSource::Video(source) => {
                (PixelSource::Video(source), RenderSide::Front, WrapMode::Repeat)
            }
        };

        trace!(
            live = pixels.is_live(),
            invert = options.invert,
            transparent = options.transparent,
            ?render_side,
            "Built surface"
        );

        Surface {
            pixels,
            orientation_inverted: options.invert,
            render_side,
            transparent: options.transparent,
            wrap,
        }
    }
}
