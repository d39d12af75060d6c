//! Scriptable stand-ins for the media collaborators.

use async_trait::async_trait;
use pane3d_core::RasterBuffer;
use pane3d_media::{CameraDevice, ImageFetcher, MediaError};
use pane3d_render::VideoStream;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// A latch: closed until [`Gate::open`], then open forever.
#[derive(Debug, Clone)]
pub struct Gate {
    tx: Arc<watch::Sender<bool>>,
}

impl Gate {
    /// Closed gate.
    pub fn closed() -> Self {
        Self {
            tx: Arc::new(watch::channel(false).0),
        }
    }

    /// Open gate.
    pub fn open_now() -> Self {
        let gate = Self::closed();
        gate.open();
        gate
    }

    /// Release every current and future waiter.
    pub fn open(&self) {
        self.tx.send_replace(true);
    }

    /// Whether the gate has been opened.
    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the gate is open.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|open| *open).await;
    }
}

/// Image fetcher serving canned rasters and errors.
#[derive(Debug)]
pub struct FakeImageFetcher {
    images: Mutex<HashMap<String, Result<RasterBuffer, MediaError>>>,
    gates: Mutex<HashMap<String, Gate>>,
    calls: AtomicUsize,
}

impl Default for FakeImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeImageFetcher {
    /// Fetcher that knows no URLs.
    pub fn new() -> Self {
        Self {
            images: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Serve a solid `width` x `height` image at `url`.
    pub fn with_image(self, url: &str, width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut raster = RasterBuffer::new(width, height);
        raster.fill_rect(0, 0, width, height, image_rgba(color));
        self.lock_images().insert(url.to_string(), Ok(raster));
        self
    }

    /// Hold fetches of `url` until `gate` opens.
    pub fn with_gate(self, url: &str, gate: Gate) -> Self {
        self.gates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.to_string(), gate);
        self
    }

    /// Number of fetches started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Acquire)
    }

    fn lock_images(&self) -> std::sync::MutexGuard<'_, HashMap<String, Result<RasterBuffer, MediaError>>> {
        self.images.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn image_rgba(color: [u8; 4]) -> pane3d_core::Rgba {
    pane3d_core::Rgba::from(color)
}

#[async_trait]
impl ImageFetcher for FakeImageFetcher {
    async fn fetch_image(&self, url: &str) -> Result<RasterBuffer, MediaError> {
        self.calls.fetch_add(1, Ordering::AcqRel);
        let gate = self
            .gates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(url)
            .cloned();
        if let Some(gate) = gate {
            gate.wait().await;
        }
        self.lock_images()
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                Err(MediaError::Fetch {
                    url: url.to_string(),
                    reason: "404 Not Found".to_string(),
                })
            })
    }
}

/// Video stream whose readiness is controlled by the test.
#[derive(Debug)]
pub struct FakeVideoStream {
    device: String,
    ready: AtomicBool,
    size: (u32, u32),
}

impl FakeVideoStream {
    /// Stream for `device`, initially without data.
    pub fn new(device: &str) -> Self {
        Self {
            device: device.to_string(),
            ready: AtomicBool::new(false),
            size: (8, 6),
        }
    }

    /// Set whether enough data is buffered.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }
}

impl VideoStream for FakeVideoStream {
    fn device(&self) -> &str {
        &self.device
    }

    fn has_enough_data(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn frame_size(&self) -> (u32, u32) {
        self.size
    }

    fn read_frame(&self) -> Option<RasterBuffer> {
        self.has_enough_data()
            .then(|| RasterBuffer::new(self.size.0, self.size.1))
    }
}

/// Camera that counts requests and resolves when its gate opens.
#[derive(Debug)]
pub struct FakeCamera {
    stream: Option<Arc<FakeVideoStream>>,
    gate: Gate,
    calls: AtomicUsize,
}

impl FakeCamera {
    /// Camera granting `stream` once `gate` opens.
    pub fn granting(stream: Arc<FakeVideoStream>, gate: Gate) -> Self {
        Self {
            stream: Some(stream),
            gate,
            calls: AtomicUsize::new(0),
        }
    }

    /// Camera refusing once `gate` opens.
    pub fn denying(gate: Gate) -> Self {
        Self {
            stream: None,
            gate,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `request_camera` calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Acquire)
    }
}

#[async_trait]
impl CameraDevice for FakeCamera {
    async fn request_camera(&self, device: &str) -> Result<Arc<dyn VideoStream>, MediaError> {
        self.calls.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(device, "Fake camera request");
        self.gate.wait().await;
        match &self.stream {
            Some(stream) => Ok(stream.clone() as Arc<dyn VideoStream>),
            None => Err(MediaError::CameraUnavailable("permission denied".into())),
        }
    }
}
