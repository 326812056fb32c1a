//! CLI-facing flows: work out which definitions and paths a command refers
//! to, then hand over to [`PackInstaller`].

use anyhow::{Context, Result, bail};
use log::warn;
use std::path::PathBuf;

use crate::{
    application::{InstallContext, PackInstaller},
    archive::ArchiveExtractor,
    download::Downloader,
    pack::{GoPack, Side},
    runtime::Runtime,
};

pub mod config;
mod paths;
mod source;

pub use paths::{default_install_path, default_minecraft_path};
pub use source::{PackTarget, fetch_definition, normalize_url, read_definition};

use config::Config;

/// Global command-line options.
#[derive(Debug, Clone)]
pub struct Options {
    pub install_path: Option<PathBuf>,
    pub minecraft_path: Option<PathBuf>,
    pub side: Side,
    pub assume_yes: bool,
    pub forge_maven: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            install_path: None,
            minecraft_path: None,
            side: Side::Client,
            assume_yes: false,
            forge_maven: None,
        }
    }
}

impl Options {
    fn minecraft_path<R: Runtime>(&self, runtime: &R) -> Result<PathBuf> {
        match &self.minecraft_path {
            Some(path) => Ok(path.clone()),
            None => default_minecraft_path(runtime, self.side),
        }
    }

    fn context(&self, install_path: PathBuf, minecraft_path: PathBuf) -> InstallContext {
        InstallContext {
            install_path,
            minecraft_path,
            side: self.side,
            assume_yes: self.assume_yes,
        }
    }
}

#[tracing::instrument(skip(runtime, options))]
pub async fn install<R: Runtime + 'static>(runtime: R, options: Options, url: &str) -> Result<()> {
    let config = Config::new(runtime, options.forge_maven.clone())?;
    run_install(&config, &options, url).await
}

#[tracing::instrument(skip(runtime, options))]
pub async fn update<R: Runtime + 'static>(
    runtime: R,
    options: Options,
    target: Option<&str>,
) -> Result<()> {
    let config = Config::new(runtime, options.forge_maven.clone())?;
    run_update(&config, &options, PackTarget::from_arg(target)).await
}

#[tracing::instrument(skip(runtime, options))]
pub async fn uninstall<R: Runtime + 'static>(
    runtime: R,
    options: Options,
    target: Option<&str>,
) -> Result<()> {
    let config = Config::new(runtime, options.forge_maven.clone())?;
    run_uninstall(&config, &options, PackTarget::from_arg(target)).await
}

#[tracing::instrument(skip(config, options))]
pub async fn run_install<R: Runtime + 'static, D: Downloader, E: ArchiveExtractor>(
    config: &Config<R, D, E>,
    options: &Options,
    url: &str,
) -> Result<()> {
    let pack = fetch_definition(&config.downloader, url).await?;
    let minecraft_path = options.minecraft_path(&config.runtime)?;
    let install_path = options
        .install_path
        .clone()
        .unwrap_or_else(|| default_install_path(&minecraft_path, &pack.simplename));

    let ctx = options.context(install_path, minecraft_path);
    installer(config).install(&pack, &ctx).await?;
    Ok(())
}

#[tracing::instrument(skip(config, options))]
pub async fn run_update<R: Runtime + 'static, D: Downloader, E: ArchiveExtractor>(
    config: &Config<R, D, E>,
    options: &Options,
    target: PackTarget,
) -> Result<()> {
    let minecraft_path = options.minecraft_path(&config.runtime)?;

    let (install_path, fetched) = match &target {
        PackTarget::Url(url) => {
            let pack = fetch_definition(&config.downloader, url).await?;
            let path = options
                .install_path
                .clone()
                .unwrap_or_else(|| default_install_path(&minecraft_path, &pack.simplename));
            (path, Some(pack))
        }
        _ => (resolve_install_path(&target, options, &minecraft_path)?, None),
    };

    let installed = read_definition(&config.runtime, &install_path)?
        .with_context(|| format!("No installed goPack found at {:?}", install_path))?;

    let updated = match fetched {
        Some(pack) => pack,
        None => {
            if installed.update_url.is_empty() {
                bail!("{} does not declare an update URL", installed.name);
            }
            fetch_definition(&config.downloader, &installed.update_url).await?
        }
    };

    let ctx = options.context(install_path, minecraft_path);
    installer(config).update(&installed, &updated, &ctx).await?;
    Ok(())
}

#[tracing::instrument(skip(config, options))]
pub async fn run_uninstall<R: Runtime + 'static, D: Downloader, E: ArchiveExtractor>(
    config: &Config<R, D, E>,
    options: &Options,
    target: PackTarget,
) -> Result<()> {
    let minecraft_path = options.minecraft_path(&config.runtime)?;

    let (install_path, pack) = match &target {
        PackTarget::Url(url) => {
            let fetched = fetch_definition(&config.downloader, url).await?;
            let path = options
                .install_path
                .clone()
                .unwrap_or_else(|| default_install_path(&minecraft_path, &fetched.simplename));
            let pack = saved_or(read_definition(&config.runtime, &path)?, fetched);
            (path, pack)
        }
        _ => {
            let path = resolve_install_path(&target, options, &minecraft_path)?;
            let pack = read_definition(&config.runtime, &path)?
                .with_context(|| format!("No installed goPack found at {:?}", path))?;
            (path, pack)
        }
    };

    let ctx = options.context(install_path, minecraft_path);
    installer(config).uninstall(&pack, &ctx).await?;
    Ok(())
}

fn installer<R: Runtime + 'static, D: Downloader, E: ArchiveExtractor>(
    config: &Config<R, D, E>,
) -> PackInstaller<'_, R, D, E> {
    PackInstaller::new(
        &config.runtime,
        &config.downloader,
        &config.extractor,
        config.forge.clone(),
    )
}

/// Install path for a target that is not a URL: the named pack, else `--path`.
fn resolve_install_path(
    target: &PackTarget,
    options: &Options,
    minecraft_path: &std::path::Path,
) -> Result<PathBuf> {
    if let Some(path) = target.named_path(minecraft_path) {
        return Ok(path);
    }
    options
        .install_path
        .clone()
        .context("goPack URL, name or install location not specified")
}

fn saved_or(saved: Option<GoPack>, fetched: GoPack) -> GoPack {
    match saved {
        Some(saved) => saved,
        None => {
            warn!("No saved goPack definition, using the fetched one");
            fetched
        }
    }
}
