use thiserror::Error;

/// Errors emitted while acquiring media.
///
/// Cloneable so that one capture failure can be handed to every waiting slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// Network or filesystem read failed.
    #[error("failed to fetch {url}: {reason}")]
    Fetch {
        /// Requested location.
        url: String,
        /// Underlying error text.
        reason: String,
    },
    /// Bytes arrived but are not a supported image.
    #[error("failed to decode image {url}: {reason}")]
    Decode {
        /// Requested location.
        url: String,
        /// Underlying error text.
        reason: String,
    },
    /// The location uses a scheme no fetcher handles.
    #[error("unsupported image location `{0}`")]
    UnsupportedScheme(String),
    /// The camera rejected the capture request.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    /// No tokio runtime was available to run the acquisition.
    #[error("no async runtime available to load media")]
    NoRuntime,
    /// The acquisition task panicked.
    #[error("media task aborted: {0}")]
    Aborted(String),
}
