//! Bounded HTTP download client.

use futures_util::StreamExt;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::config::DownloadConfig;
use crate::fetch::FetchError;

/// Downloads remote documents into memory under time and size limits.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    max_bytes: u64,
}

impl Downloader {
    /// Build a downloader from configuration.
    pub fn new(config: &DownloadConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone());

        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            max_bytes: config.max_bytes,
        })
    }

    /// Maximum accepted payload size in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Fetch the whole body of `url`.
    ///
    /// Non-success statuses are errors. A declared `Content-Length` above
    /// the limit is rejected before reading; otherwise the body is cut off
    /// as soon as it grows past the limit.
    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                tracing::warn!(content_length = length, limit = self.max_bytes, "Declared size over limit");
                return Err(FetchError::TooLarge { limit: self.max_bytes });
            }
        }

        let capacity = response.content_length().unwrap_or(0).min(self.max_bytes);
        let mut body = Vec::with_capacity(capacity as usize);
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                tracing::warn!(received = body.len() + chunk.len(), limit = self.max_bytes, "Body over limit");
                return Err(FetchError::TooLarge { limit: self.max_bytes });
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(bytes = body.len(), "Download complete");
        Ok(body)
    }
}
