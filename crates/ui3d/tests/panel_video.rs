//! Shared camera capture and per-frame refresh through the panel facade.

use pane3d_core::DrawableDataPoint;
use pane3d_media::{CapturePhase, SharedVideoCapture};
use pane3d_testkit::{FakeCamera, FakeImageFetcher, FakeVideoStream, Gate};
use pane3d_ui3d::{
    DirtyFlags, HeadlessScene, MeshDesc, MeshKind, Panel, PanelLayout, PanelServices, SlotDef,
};
use std::sync::Arc;

struct Rig {
    panel: Panel,
    camera: Arc<FakeCamera>,
    stream: Arc<FakeVideoStream>,
    gate: Gate,
}

fn rig(slots: &[&str], grant: bool) -> Rig {
    let gate = Gate::closed();
    let stream = Arc::new(FakeVideoStream::new("webcam"));
    let camera = Arc::new(if grant {
        FakeCamera::granting(stream.clone(), gate.clone())
    } else {
        FakeCamera::denying(gate.clone())
    });
    let capture = Arc::new(SharedVideoCapture::new(camera.clone()));

    let plane = MeshDesc::solid(MeshKind::Plane {
        width: 1.0,
        height: 1.0,
    });
    let defs = slots
        .iter()
        .map(|name| SlotDef::drawable(*name, plane))
        .collect();
    let panel = Panel::new(
        "video",
        PanelLayout::new(defs, Vec::<DrawableDataPoint>::new()),
        &mut HeadlessScene::new(),
        PanelServices::new(Arc::new(FakeImageFetcher::new()), capture),
    )
    .unwrap();

    Rig {
        panel,
        camera,
        stream,
        gate,
    }
}

#[tokio::test]
async fn concurrent_video_draws_request_camera_once() {
    let Rig {
        mut panel,
        camera,
        gate,
        ..
    } = rig(&["a", "b", "c"], true);

    panel.draw(vec![
        DrawableDataPoint::video("a", "webcam"),
        DrawableDataPoint::video("b", "webcam"),
        DrawableDataPoint::video("c", "webcam"),
    ]);
    assert_eq!(panel.capture().phase(), CapturePhase::Pending);
    for name in ["a", "b", "c"] {
        assert!(panel.slot(name).unwrap().current_surface().unwrap().transparent());
    }

    gate.open();
    assert_eq!(panel.settle().await, 3);
    assert_eq!(camera.calls(), 1);
    assert_eq!(panel.capture().requests_issued(), 1);

    let source = |name: &str| {
        panel
            .slot(name)
            .unwrap()
            .current_surface()
            .unwrap()
            .pixels()
            .as_video()
            .unwrap()
            .clone()
    };
    assert!(Arc::ptr_eq(&source("a"), &source("b")));
    assert!(Arc::ptr_eq(&source("b"), &source("c")));
    assert_eq!(panel.scheduler().len(), 3);
}

#[tokio::test]
async fn later_video_draw_reuses_acquired_source() {
    let Rig {
        mut panel,
        camera,
        gate,
        ..
    } = rig(&["a", "b"], true);

    panel.draw(DrawableDataPoint::video("a", "webcam"));
    gate.open();
    panel.settle().await;

    panel.draw(DrawableDataPoint::video("b", "webcam"));
    assert_eq!(panel.in_flight(), 0);
    let b = panel.slot("b").unwrap();
    assert!(b.refresh_hook().is_some());
    assert!(!b.current_surface().unwrap().transparent());

    let a_src = panel.slot("a").unwrap().refresh_hook().unwrap().source().clone();
    assert!(Arc::ptr_eq(&a_src, b.refresh_hook().unwrap().source()));
    assert_eq!(camera.calls(), 1);
}

#[tokio::test]
async fn camera_failure_falls_back_everywhere() {
    let Rig {
        mut panel,
        camera,
        gate,
        ..
    } = rig(&["a", "b"], false);

    panel.draw(DrawableDataPoint::video("a", "webcam"));
    panel.draw(DrawableDataPoint::video("b", "webcam"));
    gate.open();
    panel.settle().await;

    assert_eq!(panel.capture().phase(), CapturePhase::Failed);
    for name in ["a", "b"] {
        let slot = panel.slot(name).unwrap();
        assert!(slot.refresh_hook().is_none());
        let surface = slot.current_surface().unwrap();
        assert!(surface.pixels().as_raster().is_some());
        assert!(!surface.transparent());
    }
    assert!(panel.scheduler().is_empty());

    // Failed is terminal: later draws fall back without asking again.
    panel.draw(DrawableDataPoint::video("a", "webcam"));
    assert_eq!(panel.in_flight(), 0);
    assert!(panel.slot("a").unwrap().refresh_hook().is_none());
    assert_eq!(camera.calls(), 1);
}

#[tokio::test]
async fn tick_refreshes_only_when_data_is_buffered() {
    let Rig {
        mut panel,
        stream,
        gate,
        ..
    } = rig(&["a"], true);

    let idle = panel.tick();
    assert_eq!((idle.invoked, idle.refreshed), (0, 0));

    panel.draw(DrawableDataPoint::video("a", "webcam"));
    gate.open();
    panel.settle().await;
    panel.take_dirty("a");

    let starving = panel.tick();
    assert_eq!((starving.invoked, starving.refreshed), (1, 0));
    assert_eq!(panel.take_dirty("a"), DirtyFlags::empty());

    stream.set_ready(true);
    let fed = panel.tick();
    assert_eq!((fed.invoked, fed.refreshed), (1, 1));
    assert_eq!(panel.take_dirty("a"), DirtyFlags::PIXELS);

    let source = panel.slot("a").unwrap().refresh_hook().unwrap().source().clone();
    panel.tick();
    assert_eq!(source.version(), 1);
    assert!(source.take_needs_upload());
    panel.tick();
    assert_eq!(source.version(), 2);
}

#[tokio::test]
async fn text_over_video_unregisters_hook() {
    let Rig {
        mut panel,
        stream,
        gate,
        ..
    } = rig(&["a"], true);
    stream.set_ready(true);

    panel.draw(DrawableDataPoint::video("a", "webcam"));
    gate.open();
    panel.settle().await;
    assert!(panel.scheduler().is_registered("a"));

    panel.draw(DrawableDataPoint::text("a", "paused"));
    assert!(!panel.scheduler().is_registered("a"));
    assert!(panel.slot("a").unwrap().refresh_hook().is_none());
    assert_eq!(panel.tick().invoked, 0);
}

#[tokio::test]
async fn pump_applies_only_arrived_completions() {
    let Rig {
        mut panel, gate, ..
    } = rig(&["a"], true);

    panel.draw(DrawableDataPoint::video("a", "webcam"));
    assert_eq!(panel.pump(), 0);
    assert_eq!(panel.in_flight(), 1);

    gate.open();
    while panel.in_flight() > 0 {
        tokio::task::yield_now().await;
        panel.pump();
    }
    assert!(panel.slot("a").unwrap().current_surface().unwrap().is_live());
}
