use pane3d_core::RasterBuffer;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// A live capture stream as seen by the renderer.
pub trait VideoStream: Send + Sync {
    /// Device tag the stream was opened for.
    fn device(&self) -> &str;

    /// Whether enough data is buffered to present a new frame.
    fn has_enough_data(&self) -> bool;

    /// Frame dimensions in pixels.
    fn frame_size(&self) -> (u32, u32);

    /// Copy of the most recent frame, if one has been decoded.
    fn read_frame(&self) -> Option<RasterBuffer>;
}

/// Shared, read-only video pixels plus the "needs re-upload" flag.
///
/// Every slot showing the camera holds the same `Arc<VideoFrameSource>`.
/// Marking is idempotent: any number of marks between two uploads count as
/// one.
pub struct VideoFrameSource {
    stream: Arc<dyn VideoStream>,
    needs_upload: AtomicBool,
    version: AtomicU64,
}

impl fmt::Debug for VideoFrameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoFrameSource")
            .field("device", &self.stream.device())
            .field("needs_upload", &self.needs_upload())
            .field("version", &self.version())
            .finish()
    }
}

impl VideoFrameSource {
    /// Wrap an opened stream.
    pub fn new(stream: Arc<dyn VideoStream>) -> Self {
        Self {
            stream,
            needs_upload: AtomicBool::new(false),
            version: AtomicU64::new(0),
        }
    }

    /// The underlying stream.
    pub fn stream(&self) -> &Arc<dyn VideoStream> {
        &self.stream
    }

    /// Device tag of the underlying stream.
    pub fn device(&self) -> &str {
        self.stream.device()
    }

    /// Mark the frame for re-upload if the stream has a frame ready.
    /// Returns whether the stream had enough data.
    pub fn refresh(&self) -> bool {
        if !self.stream.has_enough_data() {
            return false;
        }
        self.mark_needs_upload();
        true
    }

    /// Set the upload flag. Returns `true` only on the clean → dirty edge.
    pub fn mark_needs_upload(&self) -> bool {
        let newly_marked = !self.needs_upload.swap(true, Ordering::AcqRel);
        if newly_marked {
            self.version.fetch_add(1, Ordering::AcqRel);
        }
        newly_marked
    }

    /// Whether a re-upload is pending.
    pub fn needs_upload(&self) -> bool {
        self.needs_upload.load(Ordering::Acquire)
    }

    /// Consume the upload flag; called by the renderer after uploading.
    pub fn take_needs_upload(&self) -> bool {
        self.needs_upload.swap(false, Ordering::AcqRel)
    }

    /// Number of clean → dirty transitions so far.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}
