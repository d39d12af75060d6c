//! Static slot definitions: what a panel is made of before anything is drawn.

use glam::{Quat, Vec3};
use pane3d_core::{DrawBatch, DrawableDataPoint, TextStyle};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Whether a slot accepts content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotRole {
    /// Receives data points.
    Drawable,
    /// Structural only (e.g. the focus frame); never drawn into.
    Helper,
}

/// Transform of a slot's mesh relative to the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Translation.
    pub position: Vec3,
    /// Orientation.
    pub rotation: Quat,
    /// Non-uniform scale.
    pub scale: Vec3,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Placement {
    /// Placement at `position`.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder: set scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Builder: set rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

/// A cut-down sphere used as a curved display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereSegment {
    /// Sphere radius.
    pub radius: f32,
    /// Width of the visible display.
    pub horizontal_size: f32,
    /// Height of the visible display.
    pub vertical_size: f32,
    /// Angle trimmed from each horizontal side.
    pub horizontal_cut_off: f32,
    /// Angle trimmed from the top and bottom.
    pub vertical_cut_off: f32,
    /// Width and height segment count.
    pub resolution: u32,
}

impl Default for SphereSegment {
    fn default() -> Self {
        Self {
            radius: 2.0,
            horizontal_size: 1.6,
            vertical_size: 1.0,
            horizontal_cut_off: 1.1,
            vertical_cut_off: 1.3,
            resolution: 20,
        }
    }
}

impl SphereSegment {
    /// `(phi_start, phi_length, theta_start, theta_length)` of the segment.
    pub fn angles(&self) -> (f32, f32, f32, f32) {
        (
            PI + self.horizontal_cut_off,
            PI - 2.0 * self.horizontal_cut_off,
            self.vertical_cut_off,
            PI - 2.0 * self.vertical_cut_off,
        )
    }

    /// Offset that pulls the segment's inner face toward the panel origin.
    pub fn offset(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.radius / 2.5)
    }
}

/// Geometry handed to the scene graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshKind {
    /// Curved display.
    SphereSegment(SphereSegment),
    /// Flat quad.
    Plane {
        /// Width in world units.
        width: f32,
        /// Height in world units.
        height: f32,
    },
}

/// Mesh request for one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshDesc {
    /// Geometry.
    pub kind: MeshKind,
    /// Draw as a wireframe in this colour instead of with a surface.
    pub wireframe: Option<[f32; 4]>,
}

impl MeshDesc {
    /// Solid mesh.
    pub fn solid(kind: MeshKind) -> Self {
        Self {
            kind,
            wireframe: None,
        }
    }

    /// Wireframe mesh.
    pub fn wireframe(kind: MeshKind, color: [f32; 4]) -> Self {
        Self {
            kind,
            wireframe: Some(color),
        }
    }
}

/// Definition of one named slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotDef {
    /// Unique name within the panel.
    pub name: String,
    /// Drawable or helper.
    pub role: SlotRole,
    /// The mesh is viewed from inside.
    pub invert: bool,
    /// Mesh transform.
    pub placement: Placement,
    /// Mesh geometry.
    pub mesh: MeshDesc,
    /// Keep the slot visible when the panel is deactivated.
    pub persist_on_deactivate: bool,
}

impl SlotDef {
    fn new(name: impl Into<String>, role: SlotRole, mesh: MeshDesc) -> Self {
        Self {
            name: name.into(),
            role,
            invert: false,
            placement: Placement::default(),
            mesh,
            persist_on_deactivate: true,
        }
    }

    /// Content slot.
    pub fn drawable(name: impl Into<String>, mesh: MeshDesc) -> Self {
        Self::new(name, SlotRole::Drawable, mesh)
    }

    /// Structural slot.
    pub fn helper(name: impl Into<String>, mesh: MeshDesc) -> Self {
        Self::new(name, SlotRole::Helper, mesh)
    }

    /// Builder: view from inside.
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Builder: set placement.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Builder: hide on deactivate unless `persist`.
    pub fn with_persist_on_deactivate(mut self, persist: bool) -> Self {
        self.persist_on_deactivate = persist;
        self
    }
}

/// Slots plus the data shown when nothing else has been drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    /// Slot definitions, in scene order.
    pub slots: Vec<SlotDef>,
    /// Drawn at construction and on every deactivate.
    pub sample: DrawBatch,
}

impl PanelLayout {
    /// Layout with the given slots and sample data.
    pub fn new(slots: Vec<SlotDef>, sample: impl Into<DrawBatch>) -> Self {
        Self {
            slots,
            sample: sample.into(),
        }
    }

    /// The curved display panel built around `sphere`.
    pub fn curved(sphere: SphereSegment) -> Self {
        Self::new(default_slots(&sphere), sample_data())
    }
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::curved(SphereSegment::default())
    }
}

/// `main` curved display plus the `frame` focus rectangle.
pub fn default_slots(sphere: &SphereSegment) -> Vec<SlotDef> {
    vec![
        SlotDef::drawable("main", MeshDesc::solid(MeshKind::SphereSegment(*sphere)))
            .with_invert(true)
            .with_placement(Placement::new(sphere.offset())),
        SlotDef::helper(
            "frame",
            MeshDesc::wireframe(
                MeshKind::Plane {
                    width: sphere.horizontal_size,
                    height: sphere.vertical_size,
                },
                [0.0, 1.0, 0.0, 1.0],
            ),
        ),
    ]
}

/// Placeholder content for the `main` slot.
pub fn sample_data() -> DrawBatch {
    DrawableDataPoint::text("main", "Sample main text that goes into this pane.")
        .with_style(
            TextStyle::default()
                .with_bg_color("rgba(255, 255, 255, 0.5)")
                .with_text_color("#ffffff"),
        )
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_slots_match_curved_display() {
        let sphere = SphereSegment::default();
        let slots = default_slots(&sphere);
        assert_eq!(slots.len(), 2);

        let main = &slots[0];
        assert_eq!(main.role, SlotRole::Drawable);
        assert!(main.invert);
        assert_eq!(main.placement.position, Vec3::new(0.0, 0.0, 0.8));

        let frame = &slots[1];
        assert_eq!(frame.role, SlotRole::Helper);
        assert_eq!(
            frame.mesh.kind,
            MeshKind::Plane {
                width: 1.6,
                height: 1.0
            }
        );
        assert_eq!(frame.mesh.wireframe, Some([0.0, 1.0, 0.0, 1.0]));
    }

    #[test]
    fn segment_angles_trim_both_sides() {
        let (phi_start, phi_len, theta_start, theta_len) = SphereSegment::default().angles();
        assert!((phi_start - (PI + 1.1)).abs() < 1e-6);
        assert!((phi_len - (PI - 2.2)).abs() < 1e-6);
        assert!((theta_start - 1.3).abs() < 1e-6);
        assert!((theta_len - (PI - 2.6)).abs() < 1e-6);
    }

    #[test]
    fn sample_targets_main() {
        let sample = sample_data();
        assert_eq!(sample.len(), 1);
        let point = sample.iter().next().unwrap();
        assert_eq!(point.drawable_id, "main");
        assert_eq!(point.style.text_color.as_deref(), Some("#ffffff"));
    }
}
