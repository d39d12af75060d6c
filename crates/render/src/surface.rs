use crate::video::VideoFrameSource;
use pane3d_core::RasterBuffer;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Which face of the mesh the surface is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderSide {
    /// Outside face.
    Front,
    /// Inside face; used when the viewer sits inside the geometry.
    Back,
}

/// How texture coordinates outside `[0, 1]` are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// Tile.
    Repeat,
    /// Clamp to the edge texel.
    ClampToEdge,
}

/// Pixels behind a surface.
#[derive(Debug, Clone)]
pub enum PixelSource {
    /// Static pixels, owned by this surface.
    Raster(RasterBuffer),
    /// Live frames shared with every other surface on the same capture.
    Video(Arc<VideoFrameSource>),
}

impl PixelSource {
    /// Whether the pixels change without a new draw.
    pub fn is_live(&self) -> bool {
        matches!(self, PixelSource::Video(_))
    }

    /// The raster, when static.
    pub fn as_raster(&self) -> Option<&RasterBuffer> {
        match self {
            PixelSource::Raster(raster) => Some(raster),
            PixelSource::Video(_) => None,
        }
    }

    /// The frame source, when live.
    pub fn as_video(&self) -> Option<&Arc<VideoFrameSource>> {
        match self {
            PixelSource::Raster(_) => None,
            PixelSource::Video(source) => Some(source),
        }
    }

    /// Pixel dimensions.
    pub fn size(&self) -> (u32, u32) {
        match self {
            PixelSource::Raster(raster) => (raster.width(), raster.height()),
            PixelSource::Video(source) => source.stream().frame_size(),
        }
    }
}

/// Video sources compare by identity, rasters by content.
impl PartialEq for PixelSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PixelSource::Raster(a), PixelSource::Raster(b)) => a == b,
            (PixelSource::Video(a), PixelSource::Video(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Content digest of a surface.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHash(pub [u8; 32]);

impl fmt::Debug for SurfaceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceHash({})", self)
    }
}

impl fmt::Display for SurfaceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A displayable material for one slot.
///
/// Built only by [`crate::SurfaceBuilder`], so pixels and metadata always
/// belong to the same generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub(crate) pixels: PixelSource,
    pub(crate) orientation_inverted: bool,
    pub(crate) render_side: RenderSide,
    pub(crate) transparent: bool,
    pub(crate) wrap: WrapMode,
}

impl Surface {
    /// Pixel source.
    pub fn pixels(&self) -> &PixelSource {
        &self.pixels
    }

    /// Whether the surface was built for an inside-facing mesh.
    pub fn orientation_inverted(&self) -> bool {
        self.orientation_inverted
    }

    /// Face the renderer should draw.
    pub fn render_side(&self) -> RenderSide {
        self.render_side
    }

    /// Whether the renderer must alpha-blend this surface.
    pub fn transparent(&self) -> bool {
        self.transparent
    }

    /// Texture wrap mode.
    pub fn wrap(&self) -> WrapMode {
        self.wrap
    }

    /// Whether the surface shows live video.
    pub fn is_live(&self) -> bool {
        self.pixels.is_live()
    }

    /// Digest over pixels and metadata. Live surfaces hash their device tag
    /// rather than the (changing) frame contents.
    pub fn content_hash(&self) -> SurfaceHash {
        let mut hasher = blake3::Hasher::new();
        match &self.pixels {
            PixelSource::Raster(raster) => {
                hasher.update(b"raster");
                hasher.update(&raster.width().to_le_bytes());
                hasher.update(&raster.height().to_le_bytes());
                hasher.update(raster.as_bytes());
            }
            PixelSource::Video(source) => {
                hasher.update(b"video");
                hasher.update(source.device().as_bytes());
            }
        }
        hasher.update(&[
            self.orientation_inverted as u8,
            matches!(self.render_side, RenderSide::Back) as u8,
            self.transparent as u8,
            matches!(self.wrap, WrapMode::ClampToEdge) as u8,
        ]);
        SurfaceHash(*hasher.finalize().as_bytes())
    }
}
