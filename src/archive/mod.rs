mod tar_gz;
mod zip;

use crate::runtime::Runtime;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Component, Path, PathBuf};

pub use tar_gz::TarGzExtractor;
pub use zip::ZipExtractor;

/// Archive payloads that cannot be expanded.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("unsupported archive format: {}", .0.display())]
    Unsupported(PathBuf),
    #[error("corrupt archive {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}

/// Trait for format-specific archive extractors
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor: Send + Sync {
    /// Check if this extractor understands an archive starting with `header`
    fn can_handle(&self, header: &[u8]) -> bool;

    /// Expand the archive's contents directly into `extract_to`
    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
    ) -> Result<()>;
}

/// Dispatcher that picks an extractor from the archive's leading bytes.
///
/// Downloaded archives are stored under a fixed temporary name, so the file
/// extension says nothing about the format.
pub struct ArchiveExtractorImpl {
    tar_gz: TarGzExtractor,
    zip: ZipExtractor,
}

impl Default for ArchiveExtractorImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveExtractorImpl {
    pub fn new() -> Self {
        Self {
            tar_gz: TarGzExtractor,
            zip: ZipExtractor,
        }
    }
}

impl ArchiveExtractor for ArchiveExtractorImpl {
    fn can_handle(&self, header: &[u8]) -> bool {
        self.zip.can_handle(header) || self.tar_gz.can_handle(header)
    }

    #[tracing::instrument(skip(self, runtime))]
    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
    ) -> Result<()> {
        let header = read_header(runtime, archive_path)?;
        if !self.can_handle(&header) {
            return Err(ArchiveError::Unsupported(archive_path.to_path_buf()).into());
        }
        if self.zip.can_handle(&header) {
            self.zip.extract(runtime, archive_path, extract_to)
        } else {
            self.tar_gz.extract(runtime, archive_path, extract_to)
        }
    }
}

fn read_header<R: Runtime>(runtime: &R, archive_path: &Path) -> Result<Vec<u8>> {
    let reader = runtime
        .open(archive_path)
        .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;
    let mut header = Vec::with_capacity(4);
    reader
        .take(4)
        .read_to_end(&mut header)
        .with_context(|| format!("Failed to read archive {:?}", archive_path))?;
    Ok(header)
}

/// Relative entry path with no root, prefix or `..` components.
/// Returns `None` for entries that would land outside the target directory.
pub(crate) fn enclosed_path(entry: &Path) -> Option<PathBuf> {
    let mut result = PathBuf::new();
    for component in entry.components() {
        match component {
            Component::Normal(part) => result.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if result.as_os_str().is_empty() {
        None
    } else {
        Some(result)
    }
}
