//! The panel facade: registry, dispatcher, loader and scheduler in one place.

use crate::definition::{PanelLayout, SlotRole};
use crate::registry::{DirtyFlags, ElementRegistry, PanelError, RefreshHook, Slot};
use crate::scene::{MeshHandle, SceneGraph};
use crate::scheduler::{TickReport, UpdateScheduler};
use crate::snapshot::PanelSnapshot;
use pane3d_core::{ContentKind, DrawBatch, DrawableDataPoint};
use pane3d_media::{
    ImageFetcher, LoadCompletion, LoadOutcome, MediaLoader, SharedVideoCapture, SurfaceFactory,
};
use pane3d_render::Surface;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Collaborators a panel needs to acquire and render content.
pub struct PanelServices {
    /// Image source.
    pub fetcher: Arc<dyn ImageFetcher>,
    /// The camera capture, shared between panels that should share a camera.
    pub capture: Arc<SharedVideoCapture>,
    /// Text and placeholder rendering.
    pub surfaces: SurfaceFactory,
}

impl PanelServices {
    /// Services with the default surface factory.
    pub fn new(fetcher: Arc<dyn ImageFetcher>, capture: Arc<SharedVideoCapture>) -> Self {
        Self {
            fetcher,
            capture,
            surfaces: SurfaceFactory::default(),
        }
    }

    /// Builder: replace the surface factory.
    pub fn with_surfaces(mut self, surfaces: SurfaceFactory) -> Self {
        self.surfaces = surfaces;
        self
    }
}

/// A spatial UI panel made of named slots.
///
/// Owned by the frame loop. Call [`Panel::pump`] then [`Panel::tick`] once per
/// frame; `draw` may be called at any time in between.
pub struct Panel {
    id: String,
    created_at: SystemTime,
    registry: ElementRegistry,
    scheduler: UpdateScheduler,
    loader: MediaLoader,
    surfaces: SurfaceFactory,
    sample: DrawBatch,
    frame: Option<MeshHandle>,
}

impl Panel {
    /// Build the panel's slots in `scene` and draw the layout's sample data.
    pub fn new(
        id: impl Into<String>,
        layout: PanelLayout,
        scene: &mut dyn SceneGraph,
        services: PanelServices,
    ) -> Result<Self, PanelError> {
        let id = id.into();
        let registry = ElementRegistry::from_defs(layout.slots, scene)?;
        let frame = registry
            .iter()
            .find(|slot| slot.role() == SlotRole::Helper)
            .map(Slot::mesh);

        let mut panel = Self {
            id,
            created_at: SystemTime::now(),
            registry,
            scheduler: UpdateScheduler::new(),
            loader: MediaLoader::new(services.fetcher, services.capture),
            surfaces: services.surfaces,
            sample: layout.sample,
            frame,
        };
        info!(panel = %panel.id, slots = panel.registry.len(), "Panel created");

        let sample = panel.sample.clone();
        panel.draw(sample);
        Ok(panel)
    }

    /// Instance identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// When the panel was constructed.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Mesh of the first helper slot; hosts use it to move the panel into
    /// camera focus.
    pub fn frame(&self) -> Option<MeshHandle> {
        self.frame
    }

    /// Look up a slot.
    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.registry.slot(name)
    }

    /// All slots.
    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Slots refreshed every frame.
    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    /// The camera capture this panel draws video from.
    pub fn capture(&self) -> &Arc<SharedVideoCapture> {
        self.loader.capture()
    }

    /// Data shown at construction and on deactivate.
    pub fn sample(&self) -> &DrawBatch {
        &self.sample
    }

    /// Loads started but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.loader.in_flight()
    }

    /// Read and clear a slot's change flags.
    pub fn take_dirty(&mut self, name: &str) -> DirtyFlags {
        self.registry.take_dirty(name)
    }

    /// Serializable view of every slot.
    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot::capture(&self.id, &self.registry)
    }

    /// Route data points to their slots, in order.
    ///
    /// Unknown slot names and helper slots are skipped. Text is rendered
    /// before this returns; images and video show a placeholder until a
    /// later [`Panel::pump`] or [`Panel::settle`] applies the result.
    pub fn draw(&mut self, points: impl Into<DrawBatch>) {
        let batch: DrawBatch = points.into();
        for point in batch {
            self.draw_point(&point);
        }
    }

    fn draw_point(&mut self, point: &DrawableDataPoint) {
        let name = point.drawable_id.as_str();
        let Some(slot) = self.registry.slot(name) else {
            debug!(panel = %self.id, slot = name, "Dropping point for unknown slot");
            return;
        };
        if slot.role() != SlotRole::Drawable {
            warn!(panel = %self.id, slot = name, "Dropping point for helper slot");
            return;
        }
        let invert = slot.invert();
        let Some(generation) = self.registry.begin_assignment(name, &point.style) else {
            return;
        };
        debug!(slot = name, kind = ?point.kind, generation, "Drawing");

        match point.kind {
            ContentKind::Text => {
                let (_, surface) = self.surfaces.text(&point.content, &point.style, invert, false);
                self.install(name, surface, None);
            }
            ContentKind::Image => {
                let placeholder = self.surfaces.loading(&point.style, invert);
                self.install(name, placeholder, None);
                self.loader.load_image(name, generation, &point.content);
            }
            ContentKind::Video => {
                let placeholder = self.surfaces.loading(&point.style, invert);
                self.install(name, placeholder, None);
                if let Some(settled) = self.loader.load_video(name, generation, &point.content) {
                    self.apply(LoadCompletion {
                        slot: name.to_string(),
                        generation,
                        outcome: LoadOutcome::Video(settled),
                    });
                }
            }
        }
    }

    /// Redraw the sample data and hide slots that do not persist.
    pub fn deactivate(&mut self) {
        let sample = self.sample.clone();
        self.draw(sample);

        let hidden: Vec<String> = self
            .registry
            .iter()
            .filter(|slot| !slot.def().persist_on_deactivate)
            .map(|slot| slot.name().to_string())
            .collect();
        for name in &hidden {
            self.registry.set_visible(name, false);
        }
        debug!(panel = %self.id, hidden = hidden.len(), "Panel deactivated");
    }

    /// Replace a slot's surface from outside the dispatcher.
    ///
    /// Counts as a new assignment, so loads still in flight for the slot are
    /// discarded when they complete. Returns whether the slot exists.
    pub fn set_surface(&mut self, name: &str, surface: Surface, hook: Option<RefreshHook>) -> bool {
        let style = match self.registry.slot(name) {
            Some(slot) => slot.style().clone(),
            None => return false,
        };
        self.registry.begin_assignment(name, &style);
        self.install(name, surface, hook)
    }

    fn install(&mut self, name: &str, surface: Surface, hook: Option<RefreshHook>) -> bool {
        let live = hook.is_some();
        if !self.registry.replace_surface(name, surface, hook) {
            return false;
        }
        if live {
            self.scheduler.register(name);
        } else {
            self.scheduler.unregister(name);
        }
        true
    }

    fn apply(&mut self, completion: LoadCompletion) {
        let LoadCompletion {
            slot: name,
            generation,
            outcome,
        } = completion;

        let Some(slot) = self.registry.slot(&name) else {
            return;
        };
        if slot.generation() != generation {
            debug!(
                slot = %name,
                generation,
                current = slot.generation(),
                "Discarding stale load"
            );
            return;
        }
        let invert = slot.invert();
        let style = slot.style().clone();

        let (surface, hook) = match outcome {
            LoadOutcome::Image(Ok(raster)) => (self.surfaces.image(raster, invert), None),
            LoadOutcome::Image(Err(err)) => {
                warn!(slot = %name, %err, "Image load failed");
                (self.surfaces.image_failed(&style, invert), None)
            }
            LoadOutcome::Video(Ok(source)) => (
                self.surfaces.video(source.clone(), invert),
                Some(RefreshHook::new(source)),
            ),
            LoadOutcome::Video(Err(err)) => {
                warn!(slot = %name, %err, "Video load failed");
                (self.surfaces.video_failed(&style, invert), None)
            }
        };
        self.install(&name, surface, hook);
    }

    /// Apply every completion that has already arrived. Never waits.
    /// Returns how many completions were received.
    pub fn pump(&mut self) -> usize {
        let mut received = 0;
        while let Some(completion) = self.loader.try_next() {
            self.apply(completion);
            received += 1;
        }
        received
    }

    /// Wait until no load is outstanding, applying completions as they
    /// arrive. Returns how many completions were received.
    pub async fn settle(&mut self) -> usize {
        let mut received = 0;
        while let Some(completion) = self.loader.next().await {
            self.apply(completion);
            received += 1;
        }
        received
    }

    /// Run the per-frame refresh hooks.
    pub fn tick(&mut self) -> TickReport {
        self.scheduler.tick(&mut self.registry)
    }
}
