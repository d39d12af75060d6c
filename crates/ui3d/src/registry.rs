//! Named slots of a panel and the surfaces they currently show.

use crate::definition::{Placement, SlotDef, SlotRole};
use crate::scene::{MeshHandle, SceneGraph};
use bitflags::bitflags;
use pane3d_core::TextStyle;
use pane3d_render::{Surface, VideoFrameSource};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors raised while building a panel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    /// Two slot definitions share a name.
    #[error("duplicate slot name `{0}`")]
    DuplicateSlot(String),
    /// A slot definition has an empty name.
    #[error("slot names must not be empty")]
    EmptySlotName,
}

bitflags! {
    /// What changed on a slot since the renderer last looked.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DirtyFlags: u8 {
        /// A new surface was assigned.
        const SURFACE = 1 << 0;
        /// Live pixels were refreshed in place.
        const PIXELS = 1 << 1;
    }
}

/// Per-frame refresh for a slot showing live video.
#[derive(Debug, Clone)]
pub struct RefreshHook {
    source: Arc<VideoFrameSource>,
}

impl RefreshHook {
    /// Hook refreshing `source`.
    pub fn new(source: Arc<VideoFrameSource>) -> Self {
        Self { source }
    }

    /// The frame source this hook refreshes.
    pub fn source(&self) -> &Arc<VideoFrameSource> {
        &self.source
    }

    /// Mark the frame for upload if data is buffered. Returns whether it was.
    pub fn run(&self) -> bool {
        self.source.refresh()
    }
}

/// One named target within a panel.
#[derive(Debug)]
pub struct Slot {
    def: SlotDef,
    mesh: MeshHandle,
    surface: Option<Surface>,
    hook: Option<RefreshHook>,
    visible: bool,
    generation: u64,
    dirty: DirtyFlags,
    style: TextStyle,
}

impl Slot {
    fn new(def: SlotDef, mesh: MeshHandle) -> Self {
        Self {
            def,
            mesh,
            surface: None,
            hook: None,
            visible: true,
            generation: 0,
            dirty: DirtyFlags::empty(),
            style: TextStyle::default(),
        }
    }

    /// Slot name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Fixed role.
    pub fn role(&self) -> SlotRole {
        self.def.role
    }

    /// Whether the mesh is viewed from inside.
    pub fn invert(&self) -> bool {
        self.def.invert
    }

    /// Mesh transform.
    pub fn placement(&self) -> &Placement {
        &self.def.placement
    }

    /// Scene mesh backing this slot.
    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    /// The definition the slot was built from.
    pub fn def(&self) -> &SlotDef {
        &self.def
    }

    /// The surface currently shown, if any.
    pub fn current_surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Per-frame hook; present iff the surface is live video.
    pub fn refresh_hook(&self) -> Option<&RefreshHook> {
        self.hook.as_ref()
    }

    /// Whether the slot is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Number of content assignments so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Pending change flags.
    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Style of the latest assignment, used for placeholders.
    pub fn style(&self) -> &TextStyle {
        &self.style
    }
}

/// All slots of a panel, in definition order.
#[derive(Debug, Default)]
pub struct ElementRegistry {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
}

impl ElementRegistry {
    /// Validate `defs` and create one mesh per slot.
    ///
    /// Nothing is created in the scene if any definition is rejected.
    pub fn from_defs(defs: Vec<SlotDef>, scene: &mut dyn SceneGraph) -> Result<Self, PanelError> {
        let mut seen = HashSet::with_capacity(defs.len());
        for def in &defs {
            if def.name.is_empty() {
                return Err(PanelError::EmptySlotName);
            }
            if !seen.insert(def.name.as_str()) {
                return Err(PanelError::DuplicateSlot(def.name.clone()));
            }
        }

        let mut registry = Self::default();
        for def in defs {
            let mesh = scene.create_mesh(&def.name, &def.mesh, &def.placement);
            registry.index.insert(def.name.clone(), registry.slots.len());
            registry.slots.push(Slot::new(def, mesh));
        }
        Ok(registry)
    }

    /// Look up a slot.
    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.index.get(name).map(|&i| &self.slots[i])
    }

    pub(crate) fn slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.index.get(name).map(|&i| &mut self.slots[i])
    }

    /// Slots in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the panel has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Start a new assignment on `name`: bump its generation, remember the
    /// style for placeholders and show the slot. Returns the new generation.
    pub(crate) fn begin_assignment(&mut self, name: &str, style: &TextStyle) -> Option<u64> {
        let slot = self.slot_mut(name)?;
        slot.generation += 1;
        slot.style = style.clone();
        slot.visible = true;
        Some(slot.generation)
    }

    /// Swap the slot's surface and hook in one assignment.
    /// Returns whether the slot exists.
    pub(crate) fn replace_surface(
        &mut self,
        name: &str,
        surface: Surface,
        hook: Option<RefreshHook>,
    ) -> bool {
        let Some(slot) = self.slot_mut(name) else {
            return false;
        };
        debug!(
            slot = name,
            live = surface.is_live(),
            hash = %surface.content_hash(),
            "Assigned surface"
        );
        slot.surface = Some(surface);
        slot.hook = hook;
        slot.dirty |= DirtyFlags::SURFACE;
        true
    }

    pub(crate) fn set_visible(&mut self, name: &str, visible: bool) {
        if let Some(slot) = self.slot_mut(name) {
            slot.visible = visible;
        }
    }

    pub(crate) fn mark_pixels(&mut self, name: &str) {
        if let Some(slot) = self.slot_mut(name) {
            slot.dirty |= DirtyFlags::PIXELS;
        }
    }

    /// Read and clear the slot's change flags.
    pub fn take_dirty(&mut self, name: &str) -> DirtyFlags {
        self.slot_mut(name)
            .map(|slot| std::mem::take(&mut slot.dirty))
            .unwrap_or_default()
    }
}
