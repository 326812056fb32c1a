//! Fetching remote content: manifests into memory, pack files onto disk.

use crate::http::HttpClient;
use crate::runtime::Runtime;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use std::path::Path;

/// Capability for fetching remote content.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Fetch the body at `url` into memory.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;

    /// Fetch the body at `url` into the file at `dest`, returning the byte count.
    /// `dest` is only created once the server has accepted the request.
    async fn fetch_to_file<R: Runtime + 'static>(
        &self,
        runtime: &R,
        url: &str,
        dest: &Path,
    ) -> Result<u64>;
}

/// [`Downloader`] backed by [`HttpClient`].
#[derive(Clone)]
pub struct HttpDownloader {
    http_client: HttpClient,
}

impl HttpDownloader {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.http_client.get_bytes(url).await
    }

    #[tracing::instrument(skip(self, runtime, dest))]
    async fn fetch_to_file<R: Runtime + 'static>(
        &self,
        runtime: &R,
        url: &str,
        dest: &Path,
    ) -> Result<u64> {
        debug!("Fetching {} to {:?}", url, dest);
        self.http_client
            .download(url, || {
                runtime
                    .create_file(dest)
                    .with_context(|| format!("Failed to create {:?}", dest))
            })
            .await
    }
}
