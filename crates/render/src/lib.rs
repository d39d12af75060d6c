#![warn(missing_docs)]
//! Surface/material composition.
//!
//! A [`Surface`] is what an external renderer binds as a mesh's visible
//! material: a pixel source (static raster or live video frame) plus the
//! orientation, face-culling side and transparency it must be drawn with.

mod builder;
mod screenshot;
mod surface;
mod video;

pub use builder::{SurfaceBuilder, SurfaceOptions};
pub use screenshot::{save_surface_png, write_png};
pub use surface::{PixelSource, RenderSide, Surface, SurfaceHash, WrapMode};
pub use video::{VideoFrameSource, VideoStream};
