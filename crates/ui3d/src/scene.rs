//! The 3-D scene graph the panel hands its geometry to.

use crate::definition::{MeshDesc, Placement};
use tracing::trace;

/// Opaque handle to a mesh owned by the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

/// Creates meshes for panel slots. Rendering is the scene's business.
pub trait SceneGraph {
    /// Create the mesh backing slot `name`.
    fn create_mesh(&mut self, name: &str, mesh: &MeshDesc, placement: &Placement) -> MeshHandle;
}

/// A mesh recorded by [`HeadlessScene`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMesh {
    /// Handle returned to the panel.
    pub handle: MeshHandle,
    /// Owning slot.
    pub name: String,
    /// Geometry request.
    pub mesh: MeshDesc,
    /// Transform request.
    pub placement: Placement,
}

/// Scene graph that only records what it was asked to build.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    meshes: Vec<SceneMesh>,
    next_handle: u64,
}

impl HeadlessScene {
    /// Empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every mesh created so far.
    pub fn meshes(&self) -> &[SceneMesh] {
        &self.meshes
    }

    /// Look up a mesh by handle.
    pub fn mesh(&self, handle: MeshHandle) -> Option<&SceneMesh> {
        self.meshes.iter().find(|m| m.handle == handle)
    }
}

impl SceneGraph for HeadlessScene {
    fn create_mesh(&mut self, name: &str, mesh: &MeshDesc, placement: &Placement) -> MeshHandle {
        self.next_handle += 1;
        let handle = MeshHandle(self.next_handle);
        trace!(name, ?handle, "Created mesh");
        self.meshes.push(SceneMesh {
            handle,
            name: name.to_string(),
            mesh: *mesh,
            placement: *placement,
        });
        handle
    }
}
