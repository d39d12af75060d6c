//! Shrink-to-fit text layout and rasterization.
//!
//! Text is wrapped greedily into a square box and the font size is reduced in
//! fixed steps until the wrapped block fits. The result is rendered into a
//! [`RasterBuffer`] that the surface builder turns into a displayable surface.
//!
//! # Example
//!
//! ```rust
//! use pane3d_core::TextStyle;
//! use pane3d_text::{rasterize_text, BlockFont};
//!
//! let style = TextStyle::default().with_max_width(128).resolve();
//! let (layout, raster) = rasterize_text("Hello, panel", &style, &BlockFont);
//! assert!(layout.fits());
//! assert_eq!(raster.width(), 128);
//! ```

pub mod font_atlas;
pub mod layout;
pub mod metrics;

pub use font_atlas::{FontAtlas, FontAtlasBuilder, FontBook};
pub use layout::{layout, rasterize_text, render, wrap_lines, TextLayout, FONT_SIZE_STEP};
pub use metrics::{BlockFont, GlyphMetrics};

pub use pane3d_core::RasterBuffer;
