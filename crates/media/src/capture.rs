use crate::camera::CameraDevice;
use crate::error::MediaError;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use pane3d_render::VideoFrameSource;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{info, warn};

/// Outcome of a capture acquisition, shared by every waiter.
pub type CaptureResult = Result<Arc<VideoFrameSource>, MediaError>;

type PendingCapture = Shared<BoxFuture<'static, CaptureResult>>;

enum CaptureState {
    Unacquired,
    Pending(PendingCapture),
    Acquired(Arc<VideoFrameSource>),
    Failed(MediaError),
}

/// Observable lifecycle of a [`SharedVideoCapture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    /// Nobody has asked for video yet.
    Unacquired,
    /// The camera request is outstanding.
    Pending,
    /// A frame source is available.
    Acquired,
    /// The camera refused; never retried.
    Failed,
}

/// The single camera capture shared by every video slot.
///
/// `Unacquired → Pending → Acquired | Failed`. The camera is asked exactly
/// once no matter how many slots request video or when; requests that arrive
/// while the first is outstanding wait on the same future.
pub struct SharedVideoCapture {
    camera: Arc<dyn CameraDevice>,
    state: Arc<Mutex<CaptureState>>,
    requests: AtomicUsize,
}

impl fmt::Debug for SharedVideoCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedVideoCapture")
            .field("phase", &self.phase())
            .field("requests", &self.requests_issued())
            .finish()
    }
}

impl SharedVideoCapture {
    /// Capture backed by `camera`.
    pub fn new(camera: Arc<dyn CameraDevice>) -> Self {
        Self {
            camera,
            state: Arc::new(Mutex::new(CaptureState::Unacquired)),
            requests: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current phase.
    pub fn phase(&self) -> CapturePhase {
        match &*self.lock() {
            CaptureState::Unacquired => CapturePhase::Unacquired,
            CaptureState::Pending(_) => CapturePhase::Pending,
            CaptureState::Acquired(_) => CapturePhase::Acquired,
            CaptureState::Failed(_) => CapturePhase::Failed,
        }
    }

    /// How many times the camera has been asked. Never exceeds one.
    pub fn requests_issued(&self) -> usize {
        self.requests.load(Ordering::Acquire)
    }

    /// The frame source, once acquired.
    pub fn frame_source(&self) -> Option<Arc<VideoFrameSource>> {
        match &*self.lock() {
            CaptureState::Acquired(source) => Some(source.clone()),
            _ => None,
        }
    }

    /// The settled outcome, if there is one.
    pub fn settled(&self) -> Option<CaptureResult> {
        match &*self.lock() {
            CaptureState::Acquired(source) => Some(Ok(source.clone())),
            CaptureState::Failed(err) => Some(Err(err.clone())),
            CaptureState::Unacquired | CaptureState::Pending(_) => None,
        }
    }

    /// Future resolving to the shared frame source.
    ///
    /// The first call issues the camera request; later calls join it or
    /// resolve immediately from the settled state. The request only makes
    /// progress while some returned future is being polled.
    pub fn acquire(&self, device: &str) -> BoxFuture<'static, CaptureResult> {
        let mut state = self.lock();
        match &*state {
            CaptureState::Acquired(source) => future::ready(Ok(source.clone())).boxed(),
            CaptureState::Failed(err) => future::ready(Err(err.clone())).boxed(),
            CaptureState::Pending(pending) => pending.clone().boxed(),
            CaptureState::Unacquired => {
                self.requests.fetch_add(1, Ordering::AcqRel);
                info!(device, "Requesting camera capture");

                let pending = Self::request(
                    self.camera.clone(),
                    Arc::downgrade(&self.state),
                    device.to_string(),
                )
                .boxed()
                .shared();
                *state = CaptureState::Pending(pending.clone());
                pending.boxed()
            }
        }
    }

    async fn request(
        camera: Arc<dyn CameraDevice>,
        state: Weak<Mutex<CaptureState>>,
        device: String,
    ) -> CaptureResult {
        let result = camera
            .request_camera(&device)
            .await
            .map(|stream| Arc::new(VideoFrameSource::new(stream)));

        match &result {
            Ok(_) => info!(device = %device, "Camera capture acquired"),
            Err(err) => warn!(device = %device, %err, "Camera capture failed"),
        }

        if let Some(state) = state.upgrade() {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            *state = match &result {
                Ok(source) => CaptureState::Acquired(source.clone()),
                Err(err) => CaptureState::Failed(err.clone()),
            };
        }
        result
    }
}
