//! Image upload adapter.
//!
//! Posts never store image bytes locally; the buffer is forwarded to an
//! external image host and only the resulting URL is persisted. The host
//! call is bounded by a client-level timeout and must complete before the
//! post row is written.

use async_trait::async_trait;
use bytes::Bytes;
use foodie_common::{AppError, AppResult, config::UploadConfig};
use image::ImageFormat;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Image host backend trait.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload an image buffer and return its hosted URL.
    async fn upload(&self, data: Bytes) -> AppResult<String>;
}

/// Type alias for the shared image host.
pub type ImageHostService = Arc<dyn ImageHost>;

/// HTTP image host client.
#[derive(Clone)]
pub struct HttpImageHost {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    folder: String,
}

/// Reply of the image host's upload endpoint.
#[derive(Debug, Deserialize)]
struct UploadReply {
    secure_url: String,
}

impl HttpImageHost {
    /// Create a new HTTP image host client from configuration.
    pub fn new(config: &UploadConfig) -> AppResult<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| AppError::Config(format!("Invalid upload endpoint: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            folder: config.folder.clone(),
        })
    }
}

#[async_trait]
impl ImageHost for HttpImageHost {
    async fn upload(&self, data: Bytes) -> AppResult<String> {
        let part = reqwest::multipart::Part::bytes(data.to_vec()).file_name("upload");
        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("folder", self.folder.clone());

        if let Some(api_key) = &self.api_key {
            form = form.text("api_key", api_key.clone());
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Upload(format!(
                "Image host returned {}",
                response.status()
            )));
        }

        let reply: UploadReply = response
            .json()
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        Ok(reply.secure_url)
    }
}

/// No-op image host for tests and key-less development configs.
///
/// Returns an empty URL, which posts store as "no photo".
#[derive(Clone, Default)]
pub struct NoOpImageHost;

#[async_trait]
impl ImageHost for NoOpImageHost {
    async fn upload(&self, _data: Bytes) -> AppResult<String> {
        Ok(String::new())
    }
}

/// Upload service: boundary validation plus the host call.
#[derive(Clone)]
pub struct UploadService {
    host: ImageHostService,
    max_bytes: usize,
}

impl UploadService {
    /// Create a new upload service.
    #[must_use]
    pub fn new(host: ImageHostService, config: &UploadConfig) -> Self {
        Self {
            host,
            max_bytes: config.max_bytes,
        }
    }

    /// Validate the buffer and forward it to the image host.
    ///
    /// Rejection happens before any external call: oversized buffers and
    /// buffers that are not JPEG/PNG/GIF/WebP (sniffed from content, not
    /// the file name) are 400s.
    pub async fn upload(&self, data: Bytes) -> AppResult<String> {
        if data.len() > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "Image exceeds the {} byte limit",
                self.max_bytes
            )));
        }

        match image::guess_format(&data) {
            Ok(
                ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif | ImageFormat::WebP,
            ) => {}
            _ => {
                return Err(AppError::BadRequest(
                    "Only image files are allowed!".to_string(),
                ));
            }
        }

        tracing::debug!(bytes = data.len(), "Forwarding image to external host");

        self.host.upload(data).await
    }
}
