#![warn(missing_docs)]
//! Core primitives shared across the pane3d workspace.

pub mod color;
pub mod data;
pub mod raster;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use color::{parse_color, ColorParseError, Rgba};
pub use data::{
    parse_data_points, ContentKind, DrawBatch, DrawableDataPoint, ResolvedStyle, TextStyle,
};
pub use raster::RasterBuffer;

/// Render frame counter, advanced once per `tick()` of the host frame loop.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FrameTick(pub u64);

impl FrameTick {
    /// First frame of any panel timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` frames.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_tick_advances() {
        assert_eq!(FrameTick::ZERO.advance(3), FrameTick(3));
        assert!(FrameTick(2) > FrameTick(1));
    }
}
