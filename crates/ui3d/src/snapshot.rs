//! Serializable view of a panel, for golden tests and the headless driver.

use crate::definition::SlotRole;
use crate::registry::{ElementRegistry, Slot};
use pane3d_render::{PixelSource, RenderSide, Surface, WrapMode};
use serde::Serialize;

/// Every slot of one panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelSnapshot {
    /// Panel id.
    pub id: String,
    /// Slots in definition order.
    pub slots: Vec<SlotSnapshot>,
}

/// One slot's observable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSnapshot {
    /// Slot name.
    pub name: String,
    /// Drawable or helper.
    pub role: SlotRole,
    /// Shown or hidden.
    pub visible: bool,
    /// Assignments so far.
    pub generation: u64,
    /// Whether the slot is refreshed every frame.
    pub refresh_hook: bool,
    /// Current surface, if any.
    pub surface: Option<SurfaceSnapshot>,
}

/// Metadata of a surface. Pixels are summarized by size only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurfaceSnapshot {
    /// `raster` or `video`.
    pub source: &'static str,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Built for an inside-facing mesh.
    pub orientation_inverted: bool,
    /// Face to draw.
    pub render_side: RenderSide,
    /// Alpha-blended.
    pub transparent: bool,
    /// Texture wrap.
    pub wrap: WrapMode,
}

impl PanelSnapshot {
    pub(crate) fn capture(id: &str, registry: &ElementRegistry) -> Self {
        Self {
            id: id.to_string(),
            slots: registry.iter().map(SlotSnapshot::from).collect(),
        }
    }
}

impl From<&Slot> for SlotSnapshot {
    fn from(slot: &Slot) -> Self {
        Self {
            name: slot.name().to_string(),
            role: slot.role(),
            visible: slot.is_visible(),
            generation: slot.generation(),
            refresh_hook: slot.refresh_hook().is_some(),
            surface: slot.current_surface().map(SurfaceSnapshot::from),
        }
    }
}

impl From<&Surface> for SurfaceSnapshot {
    fn from(surface: &Surface) -> Self {
        let (width, height) = surface.pixels().size();
        Self {
            source: match surface.pixels() {
                PixelSource::Raster(_) => "raster",
                PixelSource::Video(_) => "video",
            },
            width,
            height,
            orientation_inverted: surface.orientation_inverted(),
            render_side: surface.render_side(),
            transparent: surface.transparent(),
            wrap: surface.wrap(),
        }
    }
}
