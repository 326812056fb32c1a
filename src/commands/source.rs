//! Where a pack definition comes from: a URL, or the saved copy of an
//! installed pack.

use anyhow::{Context, Result, bail};
use log::info;
use std::path::{Path, PathBuf};
use url::{ParseError, Url};

use crate::download::Downloader;
use crate::pack::{GoPack, PackRepository};
use crate::runtime::Runtime;

use super::paths::default_install_path;

/// The `update`/`uninstall` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackTarget {
    /// A definition to fetch
    Url(String),
    /// An installed pack under `<minecraft>/gopacked/<name>`
    Name(String),
    /// Only `--path` says which pack is meant
    InstallPath,
}

impl PackTarget {
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some(arg) if arg.starts_with("http") => PackTarget::Url(arg.to_string()),
            Some(arg) => PackTarget::Name(arg.to_string()),
            None => PackTarget::InstallPath,
        }
    }

    /// The install path implied by a pack name.
    pub fn named_path(&self, minecraft_path: &Path) -> Option<PathBuf> {
        match self {
            PackTarget::Name(name) => Some(default_install_path(minecraft_path, name)),
            _ => None,
        }
    }
}

/// Parse a definition URL, defaulting to `http://` when no scheme is given.
///
/// `host:port/path` parses with `host` as its scheme, so anything that is not
/// `http`/`https` and has no `://` is treated as schemeless.
pub fn normalize_url(raw: &str) -> Result<Url> {
    let with_default_scheme = || {
        Url::parse(&format!("http://{}", raw))
            .with_context(|| format!("Invalid goPack URL {:?}", raw))
    };
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        Ok(url) if raw.contains("://") => {
            bail!("Unsupported goPack URL scheme {:?} in {:?}", url.scheme(), raw)
        }
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => with_default_scheme(),
        Err(e) => Err(e).with_context(|| format!("Invalid goPack URL {:?}", raw)),
    }
}

#[tracing::instrument(skip(downloader))]
pub async fn fetch_definition<D: Downloader>(downloader: &D, raw_url: &str) -> Result<GoPack> {
    let url = normalize_url(raw_url)?;
    info!("Fetching goPack definition from {}", url);
    let data = downloader
        .fetch_bytes(url.as_str())
        .await
        .context("Failed to fetch goPack definition")?;
    GoPack::from_slice(&data).with_context(|| format!("Invalid goPack definition at {}", url))
}

/// Read the definition saved in `install_path`, if any.
pub fn read_definition<R: Runtime>(runtime: &R, install_path: &Path) -> Result<Option<GoPack>> {
    let repository = PackRepository::new(runtime, install_path.to_path_buf());
    info!(
        "Reading goPack definition from {:?}",
        repository.definition_path()
    );
    repository
        .load()
        .context("Failed to read goPack definition")
}
