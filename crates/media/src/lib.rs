#![warn(missing_docs)]
//! Asynchronous media acquisition.
//!
//! Images are fetched and decoded on tokio tasks; the camera is acquired at
//! most once per [`SharedVideoCapture`] and shared by every slot that asks for
//! video. Results come back as [`LoadCompletion`] messages which the panel
//! applies between frames, so no acquisition ever blocks the frame loop.
//!
//! Failures never propagate to the caller of `draw`: they are turned into
//! visible fallback surfaces by [`SurfaceFactory`].

mod camera;
mod capture;
mod error;
mod fetch;
mod loader;
mod surfaces;

pub use camera::{CameraDevice, TestPatternCamera, TestPatternStream, UnavailableCamera};
pub use capture::{CapturePhase, CaptureResult, SharedVideoCapture};
pub use error::MediaError;
pub use fetch::{decode_image, DefaultImageFetcher, ImageFetcher};
pub use loader::{LoadCompletion, LoadOutcome, MediaLoader};
pub use surfaces::{PlaceholderText, SurfaceFactory};
