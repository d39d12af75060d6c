use anyhow::{Context, Result};
use pane3d_core::{DrawableDataPoint, TextStyle};
use pane3d_media::{PlaceholderText, SurfaceFactory};
use pane3d_text::{FontAtlasBuilder, FontBook};
use pane3d_ui3d::SphereSegment;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "pane3d.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PanelConfig {
    pub panel_id: String,
    /// Font used for faces without an entry in `fonts`. Built-in block face
    /// when unset.
    pub font_path: Option<PathBuf>,
    /// Face name → font file.
    pub fonts: BTreeMap<String, PathBuf>,
    /// Merged under every data point's own style.
    pub default_style: TextStyle,
    pub placeholder: PlaceholderConfig,
    pub sphere: SphereSegment,
    /// Frames to run before dumping surfaces.
    pub frames: u64,
    pub frame_interval_ms: u64,
    pub output_dir: PathBuf,
    /// Points drawn after construction when no `--data` file is given.
    pub data: Vec<DrawableDataPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    pub loading: String,
    pub image_failed: String,
    pub video_failed: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        let text = PlaceholderText::default();
        Self {
            loading: text.loading,
            image_failed: text.image_failed,
            video_failed: text.video_failed,
        }
    }
}

impl From<&PlaceholderConfig> for PlaceholderText {
    fn from(config: &PlaceholderConfig) -> Self {
        Self {
            loading: config.loading.clone(),
            image_failed: config.image_failed.clone(),
            video_failed: config.video_failed.clone(),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            panel_id: "pane-1".to_string(),
            font_path: None,
            fonts: BTreeMap::new(),
            default_style: TextStyle::default(),
            placeholder: PlaceholderConfig::default(),
            sphere: SphereSegment::default(),
            frames: 60,
            frame_interval_ms: 16,
            output_dir: PathBuf::from("pane3d-out"),
            data: Vec::new(),
        }
    }
}

impl PanelConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<PanelConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    PanelConfig::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if path != Path::new(DEFAULT_CONFIG_PATH) {
                    warn!("Panel config not found at {}. Using defaults", path.display());
                }
                PanelConfig::default()
            }
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
                PanelConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    /// Fonts and placeholder text for the panel's surface factory.
    pub fn surface_factory(&self) -> Result<SurfaceFactory> {
        let mut fonts = FontBook::default();
        if let Some(path) = &self.font_path {
            let atlas = FontAtlasBuilder::from_file(path)
                .and_then(|builder| builder.build())
                .with_context(|| format!("Failed to load fallback font {}", path.display()))?;
            fonts.set_fallback(Arc::new(atlas));
        }
        for (face, path) in &self.fonts {
            fonts
                .load_face(face, path)
                .with_context(|| format!("Failed to load font face '{face}'"))?;
        }
        Ok(SurfaceFactory::new(fonts).with_messages((&self.placeholder).into()))
    }

    /// `points` with the configured default style underneath their own.
    pub fn apply_default_style(&self, points: Vec<DrawableDataPoint>) -> Vec<DrawableDataPoint> {
        points
            .into_iter()
            .map(|mut point| {
                point.style = self.default_style.clone().overlay(&point.style);
                point
            })
            .collect()
    }
}
