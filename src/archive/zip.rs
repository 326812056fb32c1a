use crate::runtime::Runtime;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use super::{ArchiveError, ArchiveExtractor, enclosed_path};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";

/// Extractor for zip archives
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn can_handle(&self, header: &[u8]) -> bool {
        header.starts_with(ZIP_MAGIC) || header.starts_with(ZIP_EMPTY_MAGIC)
    }

    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
    ) -> Result<()> {
        debug!("Extracting zip archive {:?} to {:?}", archive_path, extract_to);
        let mut reader = runtime
            .open(archive_path)
            .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;

        // zip needs Read + Seek; Runtime::open only gives Read
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .with_context(|| format!("Failed to read archive {:?}", archive_path))?;

        let mut archive = ZipArchive::new(std::io::Cursor::new(buffer)).map_err(|e| {
            ArchiveError::Corrupt {
                path: archive_path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| ArchiveError::Corrupt {
                path: archive_path.to_path_buf(),
                reason: format!("entry {}: {}", i, e),
            })?;

            let Some(entry_path) = entry.enclosed_name().and_then(|p| enclosed_path(&p)) else {
                warn!("Skipping unsafe archive entry {:?}", entry.name());
                continue;
            };
            let full_path = extract_to.join(&entry_path);

            if entry.is_dir() {
                runtime.create_dir_all(&full_path)?;
                continue;
            }

            if let Some(parent) = full_path.parent() {
                runtime.create_dir_all(parent)?;
            }
            let mut dest_file = runtime.create_file(&full_path)?;
            std::io::copy(&mut entry, &mut dest_file)
                .with_context(|| format!("Failed to extract file {:?}", full_path))?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode()
                && let Err(e) = runtime.set_permissions(&full_path, mode)
            {
                debug!("Failed to set permissions on {:?}: {}", full_path, e);
            }
        }

        Ok(())
    }
}
