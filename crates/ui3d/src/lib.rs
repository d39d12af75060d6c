#![warn(missing_docs)]
//! Spatial UI panels built from named slots.
//!
//! A [`Panel`] owns an [`ElementRegistry`] of slots created from a static
//! [`PanelLayout`], routes [`DrawableDataPoint`](pane3d_core::DrawableDataPoint)s
//! to them, and keeps live video slots refreshed through the
//! [`UpdateScheduler`]. Geometry is delegated to a [`SceneGraph`].
//!
//! # Example
//!
//! ```rust,no_run
//! use pane3d_core::DrawableDataPoint;
//! use pane3d_media::{DefaultImageFetcher, SharedVideoCapture, TestPatternCamera};
//! use pane3d_ui3d::{HeadlessScene, Panel, PanelLayout, PanelServices};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), pane3d_ui3d::PanelError> {
//! let capture = Arc::new(SharedVideoCapture::new(Arc::new(TestPatternCamera::default())));
//! let services = PanelServices::new(Arc::new(DefaultImageFetcher::new()), capture);
//! let mut scene = HeadlessScene::new();
//! let mut panel = Panel::new("pane-1", PanelLayout::default(), &mut scene, services)?;
//!
//! panel.draw(DrawableDataPoint::video("main", "webcam"));
//! panel.settle().await;
//!
//! // In the frame loop:
//! panel.pump();
//! panel.tick();
//! # Ok(())
//! # }
//! ```

pub mod definition;
pub mod panel;
pub mod registry;
pub mod scene;
pub mod scheduler;
pub mod snapshot;

// Re-export commonly used types
pub use definition::{
    default_slots, sample_data, MeshDesc, MeshKind, PanelLayout, Placement, SlotDef, SlotRole,
    SphereSegment,
};
pub use panel::{Panel, PanelServices};
pub use registry::{DirtyFlags, ElementRegistry, PanelError, RefreshHook, Slot};
pub use scene::{HeadlessScene, MeshHandle, SceneGraph, SceneMesh};
pub use scheduler::{TickReport, UpdateScheduler};
pub use snapshot::{PanelSnapshot, SlotSnapshot, SurfaceSnapshot};
