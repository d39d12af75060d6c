use crate::error::MediaError;
use async_trait::async_trait;
use pane3d_core::RasterBuffer;
use pane3d_render::VideoStream;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// A capture device that can be asked for a live stream.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Open a stream for `device`. May take arbitrarily long (permission
    /// prompts, hardware warm-up).
    async fn request_camera(&self, device: &str) -> Result<Arc<dyn VideoStream>, MediaError>;
}

/// Synthetic camera producing scrolling colour bars.
#[derive(Debug, Clone, Copy)]
pub struct TestPatternCamera {
    size: (u32, u32),
}

impl TestPatternCamera {
    /// Camera producing `width` x `height` frames.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width.max(1), height.max(1)),
        }
    }
}

impl Default for TestPatternCamera {
    fn default() -> Self {
        Self::new(320, 240)
    }
}

#[async_trait]
impl CameraDevice for TestPatternCamera {
    async fn request_camera(&self, device: &str) -> Result<Arc<dyn VideoStream>, MediaError> {
        info!(device, width = self.size.0, height = self.size.1, "Opened test pattern camera");
        Ok(Arc::new(TestPatternStream::new(device, self.size)))
    }
}

/// Stream behind [`TestPatternCamera`].
#[derive(Debug)]
pub struct TestPatternStream {
    device: String,
    size: (u32, u32),
    started: Instant,
}

impl TestPatternStream {
    const BARS: [[u8; 3]; 8] = [
        [255, 255, 255],
        [255, 255, 0],
        [0, 255, 255],
        [0, 255, 0],
        [255, 0, 255],
        [255, 0, 0],
        [0, 0, 255],
        [0, 0, 0],
    ];
    const SCROLL_PERIOD: Duration = Duration::from_millis(100);

    fn new(device: &str, size: (u32, u32)) -> Self {
        Self {
            device: device.to_string(),
            size,
            started: Instant::now(),
        }
    }

    /// Render the frame shown after `elapsed`.
    pub fn frame_at(&self, elapsed: Duration) -> RasterBuffer {
        let (width, height) = self.size;
        let shift = (elapsed.as_millis() / Self::SCROLL_PERIOD.as_millis()) as u32;
        let bar_width = (width / Self::BARS.len() as u32).max(1);

        let mut raster = RasterBuffer::new(width, height);
        for (x, y, pixel) in raster.image_mut().enumerate_pixels_mut() {
            let bar = ((x + shift) / bar_width) as usize % Self::BARS.len();
            let [r, g, b] = Self::BARS[bar];
            // Darken the bottom quarter so orientation is visible.
            let dim = if y >= height * 3 / 4 { 2 } else { 1 };
            *pixel = image::Rgba([r / dim, g / dim, b / dim, 255]);
        }
        raster
    }
}

impl VideoStream for TestPatternStream {
    fn device(&self) -> &str {
        &self.device
    }

    fn has_enough_data(&self) -> bool {
        true
    }

    fn frame_size(&self) -> (u32, u32) {
        self.size
    }

    fn read_frame(&self) -> Option<RasterBuffer> {
        Some(self.frame_at(self.started.elapsed()))
    }
}

/// Camera that always refuses, for hosts without a capture device.
#[derive(Debug, Clone, Default)]
pub struct UnavailableCamera {
    reason: String,
}

impl UnavailableCamera {
    /// Camera refusing with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl CameraDevice for UnavailableCamera {
    async fn request_camera(&self, device: &str) -> Result<Arc<dyn VideoStream>, MediaError> {
        let reason = if self.reason.is_empty() {
            format!("no capture device for `{device}`")
        } else {
            self.reason.clone()
        };
        Err(MediaError::CameraUnavailable(reason))
    }
}
