//! Per-frame refresh of slots whose pixels change outside `draw`.

use crate::registry::ElementRegistry;
use pane3d_core::FrameTick;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::trace;

/// What one `tick` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Frame the report belongs to.
    pub tick: FrameTick,
    /// Hooks invoked.
    pub invoked: usize,
    /// Hooks that found enough data and marked their source.
    pub refreshed: usize,
}

/// The set of slots with a refresh hook.
#[derive(Debug, Default)]
pub struct UpdateScheduler {
    registered: BTreeSet<String>,
    tick: FrameTick,
}

impl UpdateScheduler {
    /// Empty scheduler at frame zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` to the per-frame set. Idempotent.
    pub fn register(&mut self, name: &str) {
        if self.registered.insert(name.to_string()) {
            trace!(slot = name, "Registered for refresh");
        }
    }

    /// Remove `name` from the per-frame set. Idempotent.
    pub fn unregister(&mut self, name: &str) {
        if self.registered.remove(name) {
            trace!(slot = name, "Unregistered from refresh");
        }
    }

    /// Whether `name` is refreshed every frame.
    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains(name)
    }

    /// Registered slot names, sorted.
    pub fn registered(&self) -> impl Iterator<Item = &str> {
        self.registered.iter().map(String::as_str)
    }

    /// Number of registered slots.
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Frames ticked so far.
    pub fn current_tick(&self) -> FrameTick {
        self.tick
    }

    /// Run every registered hook once.
    pub fn tick(&mut self, registry: &mut ElementRegistry) -> TickReport {
        self.tick = self.tick.advance(1);
        let mut report = TickReport {
            tick: self.tick,
            invoked: 0,
            refreshed: 0,
        };

        for name in &self.registered {
            let Some(hook) = registry.slot(name).and_then(|s| s.refresh_hook()) else {
                continue;
            };
            report.invoked += 1;
            if hook.run() {
                report.refreshed += 1;
                registry.mark_pixels(name);
            }
        }

        if report.invoked > 0 {
            trace!(tick = report.tick.0, invoked = report.invoked, refreshed = report.refreshed, "Tick");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{MeshDesc, MeshKind, SlotDef};
    use crate::scene::HeadlessScene;

    fn registry() -> ElementRegistry {
        let plane = MeshDesc::solid(MeshKind::Plane {
            width: 1.0,
            height: 1.0,
        });
        ElementRegistry::from_defs(vec![SlotDef::drawable("a", plane)], &mut HeadlessScene::new())
            .unwrap()
    }

    #[test]
    fn empty_tick_only_advances_the_clock() {
        let mut registry = registry();
        let mut scheduler = UpdateScheduler::new();

        let report = scheduler.tick(&mut registry);
        assert_eq!(
            report,
            TickReport {
                tick: FrameTick(1),
                invoked: 0,
                refreshed: 0
            }
        );
        assert_eq!(scheduler.tick(&mut registry).tick, FrameTick(2));
    }

    #[test]
    fn registered_slot_without_hook_is_skipped() {
        let mut registry = registry();
        let mut scheduler = UpdateScheduler::new();
        scheduler.register("a");
        scheduler.register("a");
        assert_eq!(scheduler.len(), 1);

        assert_eq!(scheduler.tick(&mut registry).invoked, 0);

        scheduler.unregister("a");
        assert!(scheduler.is_empty());
    }
}
