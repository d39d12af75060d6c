//! pane3d - headless driver for curved 3D content panels
//!
//! Builds one panel, draws the configured data points, runs the frame loop
//! and writes every slot's surface to PNG along with a JSON snapshot.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use config::{PanelConfig, DEFAULT_CONFIG_PATH};
use pane3d_core::parse_data_points;
use pane3d_media::{
    CameraDevice, DefaultImageFetcher, SharedVideoCapture, TestPatternCamera, UnavailableCamera,
};
use pane3d_render::save_surface_png;
use pane3d_ui3d::{HeadlessScene, Panel, PanelLayout, PanelServices};
use std::{fs, path::PathBuf, sync::Arc, time::Duration};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CameraChoice {
    /// Synthetic colour bars.
    TestPattern,
    /// Always refuses; video slots show the fallback text.
    Unavailable,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless driver for pane3d panels", long_about = None)]
struct Args {
    /// Panel configuration (TOML)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// JSON file with an array of data points; overrides `data` in the config
    #[arg(long)]
    data: Option<PathBuf>,

    /// Frames to run before dumping surfaces
    #[arg(long)]
    frames: Option<u64>,

    /// Directory for PNGs and the snapshot
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Camera backing video slots
    #[arg(long, value_enum, default_value_t = CameraChoice::TestPattern)]
    camera: CameraChoice,

    /// Deactivate the panel after the frame loop
    #[arg(long)]
    deactivate: bool,

    /// Write the effective configuration back to `--config` and exit
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // WARN by default; override with RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting pane3d v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = PanelConfig::load_from_path(&args.config);
    if args.save_config {
        config.save_to_path(&args.config)?;
        info!("Wrote {}", args.config.display());
        return Ok(());
    }
    let frames = args.frames.unwrap_or(config.frames);
    let output = args.output.clone().unwrap_or_else(|| config.output_dir.clone());

    let camera: Arc<dyn CameraDevice> = match args.camera {
        CameraChoice::TestPattern => Arc::new(TestPatternCamera::default()),
        CameraChoice::Unavailable => Arc::new(UnavailableCamera::default()),
    };
    let services = PanelServices::new(
        Arc::new(DefaultImageFetcher::new()),
        Arc::new(SharedVideoCapture::new(camera)),
    )
    .with_surfaces(config.surface_factory()?);

    let mut scene = HeadlessScene::new();
    let mut panel = Panel::new(
        config.panel_id.clone(),
        PanelLayout::curved(config.sphere),
        &mut scene,
        services,
    )?;

    let points = match &args.data {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read data points from {}", path.display()))?;
            parse_data_points(&json)
                .with_context(|| format!("Failed to parse data points in {}", path.display()))?
        }
        None => config.data.clone(),
    };
    info!(points = points.len(), "Drawing data points");
    panel.draw(config.apply_default_style(points));

    let interval = Duration::from_millis(config.frame_interval_ms);
    for _ in 0..frames {
        let applied = panel.pump();
        let report = panel.tick();
        debug!(
            tick = report.tick.0,
            applied,
            invoked = report.invoked,
            refreshed = report.refreshed,
            "Frame"
        );
        tokio::time::sleep(interval).await;
    }
    if panel.in_flight() > 0 {
        info!(in_flight = panel.in_flight(), "Waiting for outstanding loads");
        panel.settle().await;
    }

    if args.deactivate {
        panel.deactivate();
    }

    dump(&panel, &output)?;
    Ok(())
}

fn dump(panel: &Panel, output: &std::path::Path) -> Result<()> {
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    for slot in panel.registry().iter() {
        let Some(surface) = slot.current_surface() else {
            continue;
        };
        let path = output.join(format!("{}-{}.png", panel.id(), slot.name()));
        if save_surface_png(surface, &path)? {
            info!("Wrote {}", path.display());
        } else {
            warn!(slot = slot.name(), "No video frame available yet; skipped");
        }
    }

    let snapshot = serde_json::to_string_pretty(&panel.snapshot())?;
    let path = output.join(format!("{}.json", panel.id()));
    fs::write(&path, &snapshot).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{snapshot}");
    Ok(())
}
