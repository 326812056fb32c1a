use crate::runtime::Runtime;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::{debug, warn};
use std::path::Path;
use tar::{Archive, EntryType};

use super::{ArchiveError, ArchiveExtractor, enclosed_path};

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// Extractor for gzip-compressed tar archives
pub struct TarGzExtractor;

impl ArchiveExtractor for TarGzExtractor {
    fn can_handle(&self, header: &[u8]) -> bool {
        header.starts_with(GZIP_MAGIC)
    }

    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
    ) -> Result<()> {
        debug!("Extracting tar.gz archive {:?} to {:?}", archive_path, extract_to);
        let reader = runtime
            .open(archive_path)
            .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;
        let mut archive = Archive::new(GzDecoder::new(reader));

        let corrupt = |e: std::io::Error| ArchiveError::Corrupt {
            path: archive_path.to_path_buf(),
            reason: e.to_string(),
        };

        for entry in archive.entries().map_err(corrupt)? {
            let mut entry = entry.map_err(corrupt)?;
            let raw_path = entry.path().map_err(corrupt)?.into_owned();

            let Some(entry_path) = enclosed_path(&raw_path) else {
                warn!("Skipping unsafe archive entry {:?}", raw_path);
                continue;
            };
            let full_path = extract_to.join(&entry_path);

            match entry.header().entry_type() {
                EntryType::Directory => runtime.create_dir_all(&full_path)?,
                EntryType::Regular | EntryType::Continuous => {
                    if let Some(parent) = full_path.parent() {
                        runtime.create_dir_all(parent)?;
                    }
                    let mut dest_file = runtime.create_file(&full_path)?;
                    std::io::copy(&mut entry, &mut dest_file)
                        .with_context(|| format!("Failed to extract file {:?}", full_path))?;

                    if let Ok(mode) = entry.header().mode()
                        && let Err(e) = runtime.set_permissions(&full_path, mode)
                    {
                        debug!("Failed to set permissions on {:?}: {}", full_path, e);
                    }
                }
                other => debug!("Skipping {:?} entry {:?}", other, raw_path),
            }
        }

        Ok(())
    }
}
