use crate::capture::{CaptureResult, SharedVideoCapture};
use crate::error::MediaError;
use crate::fetch::ImageFetcher;
use futures::FutureExt;
use pane3d_core::RasterBuffer;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// Result of one acquisition.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// A decoded image, or why there is none.
    Image(Result<RasterBuffer, MediaError>),
    /// The shared frame source, or why there is none.
    Video(CaptureResult),
}

/// A finished acquisition addressed to one slot.
///
/// `generation` is the slot's assignment counter at the time the load was
/// started; the receiver drops completions whose generation is stale.
#[derive(Debug, Clone)]
pub struct LoadCompletion {
    /// Target slot.
    pub slot: String,
    /// Assignment the load belongs to.
    pub generation: u64,
    /// What was loaded.
    pub outcome: LoadOutcome,
}

/// Runs acquisitions on the tokio runtime and queues their completions.
pub struct MediaLoader {
    fetcher: Arc<dyn ImageFetcher>,
    capture: Arc<SharedVideoCapture>,
    tx: UnboundedSender<LoadCompletion>,
    rx: UnboundedReceiver<LoadCompletion>,
    in_flight: usize,
}

impl MediaLoader {
    /// Loader using `fetcher` for images and `capture` for video.
    pub fn new(fetcher: Arc<dyn ImageFetcher>, capture: Arc<SharedVideoCapture>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            fetcher,
            capture,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// The shared capture.
    pub fn capture(&self) -> &Arc<SharedVideoCapture> {
        &self.capture
    }

    /// Acquisitions started but not yet received.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start fetching `url` for `slot`.
    pub fn load_image(&mut self, slot: &str, generation: u64, url: &str) {
        let fetcher = self.fetcher.clone();
        let url = url.to_string();
        self.spawn(slot, generation, LoadOutcome::Image, move || async move {
            fetcher.fetch_image(&url).await
        });
    }

    /// Start (or join) the camera acquisition for `slot`.
    ///
    /// Returns the outcome directly when the capture has already settled, so
    /// the caller can apply it without a round trip through the queue.
    pub fn load_video(&mut self, slot: &str, generation: u64, device: &str) -> Option<CaptureResult> {
        if let Some(settled) = self.capture.settled() {
            return Some(settled);
        }
        let capture = self.capture.clone();
        let device = device.to_string();
        self.spawn(slot, generation, LoadOutcome::Video, move || {
            capture.acquire(&device)
        });
        None
    }

    /// Run the task built by `start` on the current runtime. `start` is not
    /// called when there is no runtime, so no shared state is touched.
    fn spawn<T, F, S>(
        &mut self,
        slot: &str,
        generation: u64,
        wrap: fn(Result<T, MediaError>) -> LoadOutcome,
        start: S,
    ) where
        T: Send + 'static,
        F: Future<Output = Result<T, MediaError>> + Send + 'static,
        S: FnOnce() -> F,
    {
        let slot = slot.to_string();
        let tx = self.tx.clone();

        let Ok(runtime) = Handle::try_current() else {
            warn!(slot = %slot, "No tokio runtime; media load fails immediately");
            self.in_flight += 1;
            let _ = tx.send(LoadCompletion {
                slot,
                generation,
                outcome: wrap(Err(MediaError::NoRuntime)),
            });
            return;
        };

        let task = start();
        self.in_flight += 1;
        debug!(slot = %slot, generation, "Media load started");
        runtime.spawn(async move {
            let result = match AssertUnwindSafe(task).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => Err(MediaError::Aborted(panic_message(&*panic))),
            };
            let completion = LoadCompletion {
                slot,
                generation,
                outcome: wrap(result),
            };
            // The receiver only goes away with the loader itself.
            let _ = tx.send(completion);
        });
    }

    /// Next completion if one is queued, without waiting.
    pub fn try_next(&mut self) -> Option<LoadCompletion> {
        let completion = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }

    /// Wait for the next completion. `None` when nothing is in flight.
    pub async fn next(&mut self) -> Option<LoadCompletion> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        self.in_flight -= 1;
        Some(completion)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::TestPatternCamera;
    use async_trait::async_trait;

    struct SolidFetcher;

    #[async_trait]
    impl ImageFetcher for SolidFetcher {
        async fn fetch_image(&self, url: &str) -> Result<RasterBuffer, MediaError> {
            match url {
                "boom" => panic!("fetcher exploded"),
                "missing" => Err(MediaError::Fetch {
                    url: url.into(),
                    reason: "404".into(),
                }),
                _ => Ok(RasterBuffer::new(2, 2)),
            }
        }
    }

    fn loader() -> MediaLoader {
        MediaLoader::new(
            Arc::new(SolidFetcher),
            Arc::new(SharedVideoCapture::new(Arc::new(TestPatternCamera::new(4, 4)))),
        )
    }

    #[tokio::test]
    async fn image_completions_carry_slot_and_generation() {
        let mut loader = loader();
        loader.load_image("a", 3, "ok.png");
        loader.load_image("b", 1, "missing");
        assert_eq!(loader.in_flight(), 2);

        let mut seen = Vec::new();
        while let Some(done) = loader.next().await {
            let ok = matches!(done.outcome, LoadOutcome::Image(Ok(_)));
            seen.push((done.slot, done.generation, ok));
        }
        seen.sort();
        assert_eq!(seen, vec![("a".into(), 3, true), ("b".into(), 1, false)]);
        assert_eq!(loader.in_flight(), 0);
    }

    #[tokio::test]
    async fn panicking_fetch_becomes_an_error() {
        let mut loader = loader();
        loader.load_image("a", 1, "boom");
        let done = loader.next().await.unwrap();
        match done.outcome {
            LoadOutcome::Image(Err(MediaError::Aborted(msg))) => assert!(msg.contains("exploded")),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn settled_capture_resolves_inline() {
        let mut loader = loader();
        assert!(loader.load_video("a", 1, "cam").is_none());
        let first = loader.next().await.unwrap();
        assert!(matches!(first.outcome, LoadOutcome::Video(Ok(_))));

        let inline = loader.load_video("b", 1, "cam");
        assert!(matches!(inline, Some(Ok(_))));
        assert_eq!(loader.in_flight(), 0);
        assert_eq!(loader.capture().requests_issued(), 1);
    }

    #[test]
    fn without_runtime_loads_fail_immediately() {
        let mut loader = loader();
        loader.load_image("a", 1, "ok.png");
        let done = loader.try_next().unwrap();
        assert!(matches!(done.outcome, LoadOutcome::Image(Err(MediaError::NoRuntime))));
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn without_runtime_video_leaves_capture_unacquired() {
        let mut loader = loader();
        assert!(loader.load_video("a", 1, "cam").is_none());
        let done = loader.try_next().unwrap();
        assert!(matches!(done.outcome, LoadOutcome::Video(Err(MediaError::NoRuntime))));
        assert_eq!(loader.capture().phase(), crate::capture::CapturePhase::Unacquired);
        assert_eq!(loader.capture().requests_issued(), 0);
    }
}
