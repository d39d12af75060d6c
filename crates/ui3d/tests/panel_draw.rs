//! Routing, text rendering and image loading through the panel facade.

use pane3d_core::{DrawableDataPoint, TextStyle};
use pane3d_media::{SharedVideoCapture, UnavailableCamera};
use pane3d_render::RenderSide;
use pane3d_testkit::{assert_json_snapshot, snapshot_path, FakeImageFetcher, Gate};
use pane3d_ui3d::{
    DirtyFlags, HeadlessScene, MeshDesc, MeshKind, Panel, PanelError, PanelLayout, PanelServices,
    SlotDef,
};
use std::sync::Arc;

fn services(fetcher: FakeImageFetcher) -> PanelServices {
    let capture = SharedVideoCapture::new(Arc::new(UnavailableCamera::default()));
    PanelServices::new(Arc::new(fetcher), Arc::new(capture))
}

fn default_panel(fetcher: FakeImageFetcher) -> Panel {
    Panel::new(
        "pane-1",
        PanelLayout::default(),
        &mut HeadlessScene::new(),
        services(fetcher),
    )
    .unwrap()
}

fn plane() -> MeshDesc {
    MeshDesc::solid(MeshKind::Plane {
        width: 1.0,
        height: 1.0,
    })
}

#[test]
fn construction_draws_sample_data() {
    let mut scene = HeadlessScene::new();
    let panel = Panel::new(
        "pane-1",
        PanelLayout::default(),
        &mut scene,
        services(FakeImageFetcher::new()),
    )
    .unwrap();

    assert_eq!(panel.id(), "pane-1");
    assert_eq!(scene.meshes().len(), 2);
    let frame = panel.frame().unwrap();
    assert_eq!(scene.mesh(frame).unwrap().name, "frame");

    let snapshot = snapshot_path(env!("CARGO_MANIFEST_DIR"), "default_panel");
    assert_json_snapshot(snapshot, &panel.snapshot()).unwrap();
}

#[test]
fn duplicate_slot_names_fail_construction() {
    let layout = PanelLayout::new(
        vec![SlotDef::drawable("a", plane()), SlotDef::helper("a", plane())],
        Vec::<DrawableDataPoint>::new(),
    );
    let result = Panel::new(
        "dup",
        layout,
        &mut HeadlessScene::new(),
        services(FakeImageFetcher::new()),
    );
    assert_eq!(result.err(), Some(PanelError::DuplicateSlot("a".into())));
}

#[test]
fn unknown_slot_is_a_no_op() {
    let mut panel = default_panel(FakeImageFetcher::new());
    let before = panel.snapshot();
    let hash = panel.slot("main").unwrap().current_surface().unwrap().content_hash();

    panel.draw(DrawableDataPoint::text("nonexistent", "x"));

    assert_eq!(panel.snapshot(), before);
    let after = panel.slot("main").unwrap().current_surface().unwrap().content_hash();
    assert_eq!(hash, after);
}

#[test]
fn helper_slots_reject_content() {
    let mut panel = default_panel(FakeImageFetcher::new());
    panel.draw(DrawableDataPoint::text("frame", "x"));
    let frame = panel.slot("frame").unwrap();
    assert!(frame.current_surface().is_none());
    assert_eq!(frame.generation(), 0);
}

#[test]
fn main_text_in_narrow_box() {
    let mut panel = default_panel(FakeImageFetcher::new());
    panel.take_dirty("main");

    panel.draw(
        DrawableDataPoint::text("main", "Hello")
            .with_style(TextStyle::default().with_max_width(100)),
    );

    let main = panel.slot("main").unwrap();
    let surface = main.current_surface().unwrap();
    assert_eq!(surface.pixels().size(), (100, 100));
    assert!(surface.orientation_inverted());
    assert_eq!(surface.render_side(), RenderSide::Back);
    assert!(!surface.transparent());
    assert!(main.refresh_hook().is_none());
    assert!(panel.scheduler().is_empty());
    assert_eq!(panel.take_dirty("main"), DirtyFlags::SURFACE);
}

#[test]
fn drawing_is_idempotent() {
    let mut panel = default_panel(FakeImageFetcher::new());
    let point = DrawableDataPoint::text("main", "Same words twice")
        .with_style(TextStyle::default().with_max_width(200).with_bg_color("navy"));

    panel.draw(&point);
    let first = panel.slot("main").unwrap().current_surface().unwrap().content_hash();
    panel.draw(vec![point.clone(), point]);
    let second = panel.slot("main").unwrap().current_surface().unwrap().content_hash();
    assert_eq!(first, second);
}

#[tokio::test]
async fn image_replaces_placeholder() {
    let fetcher = FakeImageFetcher::new().with_image("cat.png", 3, 3, [200, 10, 10, 255]);
    let mut panel = default_panel(fetcher);

    panel.draw(DrawableDataPoint::image("main", "cat.png"));
    let placeholder = panel.slot("main").unwrap().current_surface().unwrap();
    assert!(placeholder.transparent());
    assert_eq!(panel.in_flight(), 1);

    assert_eq!(panel.settle().await, 1);
    let surface = panel.slot("main").unwrap().current_surface().unwrap();
    assert_eq!(surface.pixels().size(), (3, 3));
    assert!(!surface.transparent());
    assert_eq!(surface.render_side(), RenderSide::Back);
}

#[tokio::test]
async fn failed_image_shows_fallback_text() {
    let mut panel = default_panel(FakeImageFetcher::new());
    let style = TextStyle::default().with_max_width(64);

    panel.draw(DrawableDataPoint::image("main", "missing.png").with_style(style));
    panel.settle().await;

    let surface = panel.slot("main").unwrap().current_surface().unwrap();
    assert_eq!(surface.pixels().size(), (64, 64));
    assert!(!surface.transparent());
    assert!(surface.pixels().as_raster().is_some());
}

#[tokio::test]
async fn stale_image_load_is_discarded() {
    let gate = Gate::closed();
    let fetcher = FakeImageFetcher::new()
        .with_image("slow.png", 3, 3, [0, 0, 0, 255])
        .with_gate("slow.png", gate.clone());
    let mut panel = default_panel(fetcher);

    panel.draw(DrawableDataPoint::image("main", "slow.png"));
    panel.draw(
        DrawableDataPoint::text("main", "newer").with_style(TextStyle::default().with_max_width(80)),
    );
    let text_hash = panel.slot("main").unwrap().current_surface().unwrap().content_hash();

    gate.open();
    assert_eq!(panel.settle().await, 1);

    let surface = panel.slot("main").unwrap().current_surface().unwrap();
    assert_eq!(surface.content_hash(), text_hash);
    assert_eq!(surface.pixels().size(), (80, 80));
}

#[test]
fn deactivate_hides_transient_slots_until_redrawn() {
    let layout = PanelLayout::new(
        vec![
            SlotDef::drawable("main", plane()),
            SlotDef::drawable("caption", plane()).with_persist_on_deactivate(false),
        ],
        DrawableDataPoint::text("main", "idle"),
    );
    let mut panel = Panel::new(
        "pane-2",
        layout,
        &mut HeadlessScene::new(),
        services(FakeImageFetcher::new()),
    )
    .unwrap();

    panel.draw(DrawableDataPoint::text("main", "busy"));
    panel.draw(DrawableDataPoint::text("caption", "hi"));
    let idle_hash = {
        let (_, idle) = pane3d_media::SurfaceFactory::default().text(
            "idle",
            &TextStyle::default(),
            false,
            false,
        );
        idle.content_hash()
    };

    panel.deactivate();
    assert!(!panel.slot("caption").unwrap().is_visible());
    assert!(panel.slot("main").unwrap().is_visible());
    let main = panel.slot("main").unwrap().current_surface().unwrap();
    assert_eq!(main.content_hash(), idle_hash);

    panel.draw(DrawableDataPoint::text("caption", "back"));
    assert!(panel.slot("caption").unwrap().is_visible());
}
