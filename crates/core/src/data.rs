//! Draw instructions fed to a panel.

use crate::color::{parse_color, Rgba};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Font size used when a style does not request one.
pub const DEFAULT_FONT_SIZE: u32 = 50;
/// Font face used when a style does not request one.
pub const DEFAULT_FONT_FACE: &str = "Arial";
/// Square surface side used when a style does not request one.
pub const DEFAULT_MAX_WIDTH: u32 = 512;
/// Foreground colour used when a style does not request one.
pub const DEFAULT_TEXT_COLOR: Rgba = image::Rgba([0, 0, 0, 255]);
/// Background colour used when a style does not request one.
pub const DEFAULT_BG_COLOR: Rgba = image::Rgba([0xee, 0xee, 0xee, 255]);

/// What a data point carries, and therefore which handler draws it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// `content` is the text body.
    Text,
    /// `content` is an image URL or path.
    Image,
    /// `content` is a capture-device tag.
    Video,
}

impl ContentKind {
    /// Whether slots showing this kind need a per-frame refresh.
    pub fn is_live(self) -> bool {
        matches!(self, ContentKind::Video)
    }
}

/// Optional text styling. Unset fields take the defaults above.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    /// Requested font size in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    /// Font face name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_face: Option<String>,
    /// Side of the square surface in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    /// Foreground colour string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    /// Background colour string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
}

impl TextStyle {
    /// Builder: set font size.
    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Builder: set font face.
    pub fn with_font_face(mut self, face: impl Into<String>) -> Self {
        self.font_face = Some(face.into());
        self
    }

    /// Builder: set surface side.
    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Builder: set foreground colour.
    pub fn with_text_color(mut self, color: impl Into<String>) -> Self {
        self.text_color = Some(color.into());
        self
    }

    /// Builder: set background colour.
    pub fn with_bg_color(mut self, color: impl Into<String>) -> Self {
        self.bg_color = Some(color.into());
        self
    }

    /// Fields set on `other` win over fields set on `self`.
    pub fn overlay(mut self, other: &TextStyle) -> Self {
        if other.font_size.is_some() {
            self.font_size = other.font_size;
        }
        if other.font_face.is_some() {
            self.font_face = other.font_face.clone();
        }
        if other.max_width.is_some() {
            self.max_width = other.max_width;
        }
        if other.text_color.is_some() {
            self.text_color = other.text_color.clone();
        }
        if other.bg_color.is_some() {
            self.bg_color = other.bg_color.clone();
        }
        self
    }

    /// Fill in defaults and parse colours. Zero sizes count as unset and
    /// unparseable colours fall back to the defaults with a warning.
    pub fn resolve(&self) -> ResolvedStyle {
        let color = |value: &Option<String>, fallback: Rgba| match value {
            Some(raw) => parse_color(raw).unwrap_or_else(|err| {
                warn!("Ignoring colour: {err}");
                fallback
            }),
            None => fallback,
        };

        ResolvedStyle {
            font_size: self.font_size.filter(|s| *s > 0).unwrap_or(DEFAULT_FONT_SIZE),
            font_face: self
                .font_face
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_FACE.to_string()),
            max_width: self.max_width.filter(|w| *w > 0).unwrap_or(DEFAULT_MAX_WIDTH),
            text_color: color(&self.text_color, DEFAULT_TEXT_COLOR),
            bg_color: color(&self.bg_color, DEFAULT_BG_COLOR),
        }
    }
}

/// A [`TextStyle`] with every field decided.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    /// Starting font size in pixels.
    pub font_size: u32,
    /// Font face name.
    pub font_face: String,
    /// Side of the square surface in pixels.
    pub max_width: u32,
    /// Foreground colour.
    pub text_color: Rgba,
    /// Background colour.
    pub bg_color: Rgba,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        TextStyle::default().resolve()
    }
}

/// One content instruction for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawDataPoint")]
pub struct DrawableDataPoint {
    /// Name of the target slot.
    pub drawable_id: String,
    /// Content type.
    #[serde(rename = "type")]
    pub kind: ContentKind,
    /// Text body, image URL or capture-device tag.
    pub content: String,
    /// Styling for text and for loading/fallback placeholders.
    #[serde(default)]
    pub style: TextStyle,
}

/// Wire shape: style fields may sit at the top level, under `style`, or both.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataPoint {
    drawable_id: String,
    #[serde(rename = "type")]
    kind: ContentKind,
    #[serde(default)]
    content: String,
    #[serde(default)]
    style: Option<TextStyle>,
    #[serde(flatten)]
    inline_style: TextStyle,
}

impl From<RawDataPoint> for DrawableDataPoint {
    fn from(raw: RawDataPoint) -> Self {
        let style = match raw.style {
            Some(nested) => raw.inline_style.overlay(&nested),
            None => raw.inline_style,
        };
        Self {
            drawable_id: raw.drawable_id,
            kind: raw.kind,
            content: raw.content,
            style,
        }
    }
}

impl DrawableDataPoint {
    /// Create a point of any kind with default style.
    pub fn new(drawable_id: impl Into<String>, kind: ContentKind, content: impl Into<String>) -> Self {
        Self {
            drawable_id: drawable_id.into(),
            kind,
            content: content.into(),
            style: TextStyle::default(),
        }
    }

    /// A text point.
    pub fn text(drawable_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(drawable_id, ContentKind::Text, body)
    }

    /// An image point.
    pub fn image(drawable_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(drawable_id, ContentKind::Image, url)
    }

    /// A video point.
    pub fn video(drawable_id: impl Into<String>, device: impl Into<String>) -> Self {
        Self::new(drawable_id, ContentKind::Video, device)
    }

    /// Builder: replace the style.
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }
}

/// An ordered sequence of points accepted by `draw`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawBatch(pub Vec<DrawableDataPoint>);

impl DrawBatch {
    /// Iterate in input order.
    pub fn iter(&self) -> impl Iterator<Item = &DrawableDataPoint> {
        self.0.iter()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for DrawBatch {
    type Item = DrawableDataPoint;
    type IntoIter = std::vec::IntoIter<DrawableDataPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<DrawableDataPoint> for DrawBatch {
    fn from(point: DrawableDataPoint) -> Self {
        Self(vec![point])
    }
}

impl From<&DrawableDataPoint> for DrawBatch {
    fn from(point: &DrawableDataPoint) -> Self {
        Self(vec![point.clone()])
    }
}

impl From<Vec<DrawableDataPoint>> for DrawBatch {
    fn from(points: Vec<DrawableDataPoint>) -> Self {
        Self(points)
    }
}

impl From<&[DrawableDataPoint]> for DrawBatch {
    fn from(points: &[DrawableDataPoint]) -> Self {
        Self(points.to_vec())
    }
}

/// Parse a JSON object or array of data points.
///
/// Array elements that do not describe a valid point (missing id, unknown
/// `type`, ...) are skipped with a warning rather than failing the batch.
pub fn parse_data_points(input: &str) -> Result<Vec<DrawableDataPoint>, serde_json::Error> {
    let value: Value = serde_json::from_str(input)?;
    let values = match value {
        Value::Array(values) => values,
        other => vec![other],
    };

    let mut points = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<DrawableDataPoint>(value) {
            Ok(point) => points.push(point),
            Err(err) => warn!("Skipping data point #{index}: {err}"),
        }
    }
    Ok(points)
}
