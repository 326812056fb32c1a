use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;

use crate::{
    application::{DEFAULT_FORGE_MAVEN, ForgeLoader},
    archive::{ArchiveExtractor, ArchiveExtractorImpl},
    download::{Downloader, HttpDownloader},
    http::HttpClient,
    runtime::Runtime,
};

pub const USER_AGENT: &str = concat!("gopacked/", env!("CARGO_PKG_VERSION"));

pub struct Config<R: Runtime, D: Downloader, E: ArchiveExtractor> {
    pub runtime: R,
    pub downloader: D,
    pub extractor: E,
    pub forge: ForgeLoader,
}

impl<R: Runtime> Config<R, HttpDownloader, ArchiveExtractorImpl> {
    pub fn new(runtime: R, forge_maven: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        let forge_maven = forge_maven.unwrap_or_else(|| DEFAULT_FORGE_MAVEN.to_string());
        debug!("Using Forge maven at {}", forge_maven);

        Ok(Self {
            runtime,
            downloader: HttpDownloader::new(HttpClient::new(client)),
            extractor: ArchiveExtractorImpl::new(),
            forge: ForgeLoader::new(forge_maven),
        })
    }
}
