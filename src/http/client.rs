//! Thin HTTP client used for manifests and pack files.

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, StatusCode};
use std::io::Write;

/// Network failures that are not plain transport errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("GET {url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("no data received from {0}")]
    EmptyBody(String),
}

/// HTTP client wrapper. Requests are made once; there is no retry.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Sends a GET request and fails on any non-success status.
    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                url: url.to_string(),
                status,
            }
            .into());
        }
        Ok(response)
    }

    /// Fetches the whole response body. An empty body is an error.
    #[tracing::instrument(skip(self))]
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self.get(url).await?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        if body.is_empty() {
            return Err(HttpError::EmptyBody(url.to_string()).into());
        }
        Ok(body.to_vec())
    }

    /// Streams a download into the writer returned by `create_writer`.
    ///
    /// The writer is only created once the server has answered with a
    /// success status, so a failed request leaves nothing behind.
    #[tracing::instrument(skip(self, create_writer))]
    pub async fn download<W, F>(&self, url: &str, create_writer: F) -> Result<u64>
    where
        W: Write,
        F: FnOnce() -> Result<W>,
    {
        debug!("Downloading {}", url);
        let mut response = self.get(url).await?;

        let mut writer = create_writer()?;
        let mut downloaded_bytes: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to read chunk from download stream")?
        {
            writer
                .write_all(&chunk)
                .context("Failed to write chunk to file")?;
            downloaded_bytes += chunk.len() as u64;
        }
        writer.flush().context("Failed to flush downloaded file")?;

        debug!(
            "Downloaded {:.2} MB from {}",
            downloaded_bytes as f64 / (1024.0 * 1024.0),
            url
        );

        Ok(downloaded_bytes)
    }
}
