use crate::error::MediaError;
use async_trait::async_trait;
use pane3d_core::RasterBuffer;
use tracing::debug;

/// Source of decoded images.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch and decode the image at `url`.
    async fn fetch_image(&self, url: &str) -> Result<RasterBuffer, MediaError>;
}

/// Fetches `http(s)://` over the network and everything else from disk.
#[derive(Debug, Clone, Default)]
pub struct DefaultImageFetcher {
    http: reqwest::Client,
}

impl DefaultImageFetcher {
    /// Fetcher with a default HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher reusing an existing client (proxy, timeouts, ...).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn read_bytes(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        let fetch_err = |reason: String| MediaError::Fetch {
            url: url.to_string(),
            reason,
        };

        if url.starts_with("http://") || url.starts_with("https://") {
            let response = self
                .http
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| fetch_err(e.to_string()))?;
            let bytes = response.bytes().await.map_err(|e| fetch_err(e.to_string()))?;
            return Ok(bytes.to_vec());
        }

        let path = match url.strip_prefix("file://") {
            Some(path) => path,
            None if url.contains("://") => {
                return Err(MediaError::UnsupportedScheme(url.to_string()))
            }
            None => url,
        };
        tokio::fs::read(path)
            .await
            .map_err(|e| fetch_err(e.to_string()))
    }
}

#[async_trait]
impl ImageFetcher for DefaultImageFetcher {
    async fn fetch_image(&self, url: &str) -> Result<RasterBuffer, MediaError> {
        let bytes = self.read_bytes(url).await?;
        debug!(url, bytes = bytes.len(), "Fetched image");
        decode_image(url, &bytes)
    }
}

/// Decode PNG or JPEG bytes into an RGBA raster.
pub fn decode_image(url: &str, bytes: &[u8]) -> Result<RasterBuffer, MediaError> {
    image::load_from_memory(bytes)
        .map(|decoded| RasterBuffer::from_image(decoded.to_rgba8()))
        .map_err(|e| MediaError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
}
