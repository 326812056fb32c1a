//! Install, update and remove a [`FileEntry`] tree on disk.
//!
//! Every operation is best effort: a failing node is logged and counted in
//! the returned [`Summary`], and its siblings are still processed.
//!
//! Paths passed to the public operations are already resolved. Children are
//! placed with [`FileEntry::resolve_path`] as the traversal descends.

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::cmp::Ordering;
use std::fmt;
use std::future::Future;
use std::ops::AddAssign;
use std::path::Path;
use std::pin::Pin;

use crate::archive::ArchiveExtractor;
use crate::download::Downloader;
use crate::pack::{FileEntry, Side, Version};
use crate::runtime::Runtime;

/// Name of the download an archive is expanded from, inside its target directory.
pub const TEMP_ARCHIVE: &str = "temp-archive.zip";

/// What a reconciliation run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub installed: usize,
    pub updated: usize,
    pub removed: usize,
    pub failed: usize,
}

impl Summary {
    fn installed() -> Self {
        Summary {
            installed: 1,
            ..Default::default()
        }
    }

    fn updated() -> Self {
        Summary {
            updated: 1,
            ..Default::default()
        }
    }

    fn removed() -> Self {
        Summary {
            removed: 1,
            ..Default::default()
        }
    }

    fn failed() -> Self {
        Summary {
            failed: 1,
            ..Default::default()
        }
    }
}

impl AddAssign for Summary {
    fn add_assign(&mut self, other: Summary) {
        self.installed += other.installed;
        self.updated += other.updated;
        self.removed += other.removed;
        self.failed += other.failed;
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} installed, {} updated, {} removed, {} failed",
            self.installed, self.updated, self.removed, self.failed
        )
    }
}

type Pending<'b> = Pin<Box<dyn Future<Output = Summary> + Send + 'b>>;

/// Walks file-entry trees for one installation side.
pub struct Reconciler<'a, R: Runtime, D: Downloader, E: ArchiveExtractor> {
    runtime: &'a R,
    downloader: &'a D,
    extractor: &'a E,
    side: Side,
}

impl<'a, R: Runtime + 'static, D: Downloader, E: ArchiveExtractor> Reconciler<'a, R, D, E> {
    pub fn new(runtime: &'a R, downloader: &'a D, extractor: &'a E, side: Side) -> Self {
        Self {
            runtime,
            downloader,
            extractor,
            side,
        }
    }

    /// Install `entry` at `path`, recursing into directory children.
    pub fn install<'b>(&'b self, key: &'b str, entry: &'b FileEntry, path: &'b Path) -> Pending<'b> {
        Box::pin(async move {
            if !entry.applies_to(self.side) {
                debug!("Skipping {} ({}-side only)", display_name(key, path), self.side_of(entry));
                return Summary::default();
            }

            match entry {
                FileEntry::Directory(dir) => {
                    let mut summary = self.ensure_dir(key, path);
                    for (child_key, child) in &dir.children {
                        let child_path = child.resolve_path(path, child_key);
                        summary += self.install(child_key, child, &child_path).await;
                    }
                    summary
                }
                FileEntry::File(_) | FileEntry::ZipArchive(_) => {
                    match self.install_leaf(key, entry, path).await {
                        Ok(()) => Summary::installed(),
                        Err(e) => {
                            error!("Failed to install {}: {:#}", entry.label(key), e);
                            Summary::failed()
                        }
                    }
                }
            }
        })
    }

    /// Delete whatever `entry` put at `path`.
    #[tracing::instrument(skip(self, entry))]
    pub fn remove(&self, key: &str, entry: &FileEntry, path: &Path) -> Summary {
        if !entry.applies_to(self.side) {
            debug!("Skipping {} ({}-side only)", display_name(key, path), self.side_of(entry));
            return Summary::default();
        }

        match self.remove_at(key, entry, path) {
            Ok(()) => Summary::removed(),
            Err(e) => {
                error!("Failed to remove {}: {:#}", display_name(key, path), e);
                Summary::failed()
            }
        }
    }

    /// Bring what `old` installed at `old_path` in line with `new` at `new_path`.
    ///
    /// Directories are diffed by child key. Files and archives are replaced
    /// when their versions differ in either direction.
    pub fn update<'b>(
        &'b self,
        key: &'b str,
        old: &'b FileEntry,
        new: &'b FileEntry,
        old_path: &'b Path,
        new_path: &'b Path,
    ) -> Pending<'b> {
        Box::pin(async move {
            if !old.applies_to(self.side) {
                debug!("Skipping {} ({}-side only)", display_name(key, old_path), self.side_of(old));
                return Summary::default();
            }

            match (old, new) {
                (FileEntry::Directory(old_dir), FileEntry::Directory(new_dir)) => {
                    let mut summary = Summary::default();
                    if !self.runtime.exists(old_path) {
                        summary += self.ensure_dir(key, old_path);
                    }
                    if new_path != old_path && !self.runtime.exists(new_path) {
                        summary += self.ensure_dir(key, new_path);
                    }

                    for (child_key, old_child) in &old_dir.children {
                        let old_child_path = old_child.resolve_path(old_path, child_key);
                        match new_dir.children.get(child_key) {
                            Some(new_child) => {
                                let new_child_path = new_child.resolve_path(new_path, child_key);
                                summary += self
                                    .update(child_key, old_child, new_child, &old_child_path, &new_child_path)
                                    .await;
                            }
                            None => summary += self.remove(child_key, old_child, &old_child_path),
                        }
                    }

                    for (child_key, new_child) in &new_dir.children {
                        if !old_dir.children.contains_key(child_key) {
                            let new_child_path = new_child.resolve_path(new_path, child_key);
                            summary += self.install(child_key, new_child, &new_child_path).await;
                        }
                    }
                    summary
                }
                (FileEntry::File(_), FileEntry::File(_))
                | (FileEntry::ZipArchive(_), FileEntry::ZipArchive(_)) => {
                    self.update_leaf(key, old, new, old_path, new_path).await
                }
                _ => {
                    info!(
                        "Replacing {} {} with {} {}",
                        old.kind(),
                        display_name(key, old_path),
                        new.kind(),
                        display_name(key, new_path)
                    );
                    let mut summary = self.remove(key, old, old_path);
                    summary += self.install(key, new, new_path).await;
                    summary
                }
            }
        })
    }

    async fn update_leaf(
        &self,
        key: &str,
        old: &FileEntry,
        new: &FileEntry,
        old_path: &Path,
        new_path: &Path,
    ) -> Summary {
        let old_version = old.version().unwrap_or_default();
        let new_version = new.version().unwrap_or_default();

        match Version::parse_and_compare(new_version, old_version) {
            Ok(Ordering::Equal) => {
                debug!("{} is up to date", old.label(key));
                return Summary::default();
            }
            Ok(Ordering::Greater) => {
                info!("Updating {} from v{} to v{}", key, old_version, new_version)
            }
            Ok(Ordering::Less) => {
                info!("Downgrading {} from v{} to v{}", key, old_version, new_version)
            }
            Err(e) => warn!(
                "Failed to compare versions of {} ({:?} -> {:?}): {}, reinstalling",
                key, old_version, new_version, e
            ),
        }

        if let Err(e) = self.remove_at(key, old, old_path) {
            warn!("Failed to remove old {}: {:#}", old.label(key), e);
        }

        match self.install_leaf(key, new, new_path).await {
            Ok(()) => Summary::updated(),
            Err(e) => {
                error!("Failed to install {}: {:#}", new.label(key), e);
                Summary::failed()
            }
        }
    }

    async fn install_leaf(&self, key: &str, entry: &FileEntry, path: &Path) -> Result<()> {
        match entry {
            FileEntry::File(spec) => {
                info!("Downloading {}", entry.label(key));
                self.downloader
                    .fetch_to_file(self.runtime, &spec.url, path)
                    .await?;
                Ok(())
            }
            FileEntry::ZipArchive(spec) => {
                info!("Downloading and extracting {}", entry.label(key));
                self.runtime
                    .create_dir_all(path)
                    .with_context(|| format!("Failed to create directory {:?}", path))?;

                let archive_path = path.join(TEMP_ARCHIVE);
                let fetched = self
                    .downloader
                    .fetch_to_file(self.runtime, &spec.url, &archive_path)
                    .await;
                if let Err(e) = fetched {
                    if self.runtime.exists(&archive_path) {
                        self.discard_archive(&archive_path);
                    }
                    return Err(e);
                }

                let extracted = self.extractor.extract(self.runtime, &archive_path, path);
                self.discard_archive(&archive_path);
                extracted.with_context(|| format!("Failed to extract archive into {:?}", path))
            }
            FileEntry::Directory(_) => Ok(()),
        }
    }

    fn remove_at(&self, key: &str, entry: &FileEntry, path: &Path) -> Result<()> {
        match entry {
            FileEntry::Directory(_) | FileEntry::ZipArchive(_) => {
                info!("Removing {:?}", path);
                self.runtime.remove_dir_all(path)
            }
            FileEntry::File(_) => {
                info!("Removing {}", entry.label(key));
                self.runtime.remove_file(path)
            }
        }
    }

    fn ensure_dir(&self, key: &str, path: &Path) -> Summary {
        info!("Creating directory {}", display_name(key, path));
        match self.runtime.create_dir_all(path) {
            Ok(()) => Summary::default(),
            Err(e) => {
                error!("Failed to create {:?}: {:#}", path, e);
                Summary::failed()
            }
        }
    }

    fn discard_archive(&self, archive_path: &Path) {
        if let Err(e) = self.runtime.remove_file(archive_path) {
            warn!("Failed to remove temporary archive {:?}: {:#}", archive_path, e);
        }
    }

    fn side_of(&self, entry: &FileEntry) -> Side {
        entry.side().unwrap_or(self.side)
    }
}

fn display_name(key: &str, path: &Path) -> String {
    if key.is_empty() {
        path.display().to_string()
    } else {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveExtractorImpl, MockArchiveExtractor};
    use crate::archive::fixtures::zip_bytes;
    use crate::runtime::{MockRuntime, RealRuntime};
    use crate::test_utils::FakeDownloader;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn mods(children: Vec<(&str, FileEntry)>) -> FileEntry {
        FileEntry::directory(children)
    }

    fn reconciler<'a>(
        downloader: &'a FakeDownloader,
        extractor: &'a ArchiveExtractorImpl,
    ) -> Reconciler<'a, RealRuntime, FakeDownloader, ArchiveExtractorImpl> {
        Reconciler::new(&RealRuntime, downloader, extractor, Side::Client)
    }

    #[test_log::test(tokio::test)]
    async fn test_install_tree() {
        let dir = tempdir().unwrap();
        let downloader = FakeDownloader::new()
            .with_file("http://x/mods/jei-4.8.jar", "jei")
            .with_file("http://x/mods/of.jar", "optifine");
        let extractor = ArchiveExtractorImpl::new();

        let tree = mods(vec![
            (
                "mods",
                mods(vec![
                    ("jei", FileEntry::file("http://x/mods/jei-4.8.jar", "4.8")),
                    (
                        "optifine",
                        FileEntry::file("http://x/mods/of.jar", "1").with_filename("OptiFine.jar"),
                    ),
                ]),
            ),
            ("resourcepacks", mods(vec![])),
        ]);

        let summary = reconciler(&downloader, &extractor)
            .install("", &tree, dir.path())
            .await;

        assert_eq!(summary.installed, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(fs::read_to_string(dir.path().join("mods/jei-4.8.jar")).unwrap(), "jei");
        assert_eq!(
            fs::read_to_string(dir.path().join("mods/OptiFine.jar")).unwrap(),
            "optifine"
        );
        assert!(dir.path().join("resourcepacks").is_dir());
    }

    #[tokio::test]
    async fn test_install_failed_download_does_not_stop_siblings() {
        let dir = tempdir().unwrap();
        let downloader = FakeDownloader::new().with_file("http://x/b.jar", "b");
        let extractor = ArchiveExtractorImpl::new();

        let tree = mods(vec![
            ("a", FileEntry::file("http://x/a.jar", "1")),
            ("b", FileEntry::file("http://x/b.jar", "1")),
        ]);

        let summary = reconciler(&downloader, &extractor)
            .install("", &tree, dir.path())
            .await;

        assert_eq!(
            summary,
            Summary {
                installed: 1,
                failed: 1,
                ..Default::default()
            }
        );
        assert!(!dir.path().join("a.jar").exists());
        assert!(dir.path().join("b.jar").exists());
    }

    #[test_log::test(tokio::test)]
    async fn test_update_upgrades_removes_and_adds() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("mods");
        let downloader = FakeDownloader::new()
            .with_file("http://x/a-1.jar", "a1")
            .with_file("http://x/a-2.jar", "a2")
            .with_file("http://x/b-1.jar", "b1")
            .with_file("http://x/c-1.jar", "c1")
            .with_file("http://x/d-1.jar", "d1");
        let extractor = ArchiveExtractorImpl::new();
        let reconciler = reconciler(&downloader, &extractor);

        let old = mods(vec![
            ("a", FileEntry::file("http://x/a-1.jar", "1")),
            ("b", FileEntry::file("http://x/b-1.jar", "1")),
            ("d", FileEntry::file("http://x/d-1.jar", "1")),
        ]);
        let new = mods(vec![
            ("a", FileEntry::file("http://x/a-2.jar", "2")),
            ("c", FileEntry::file("http://x/c-1.jar", "1")),
            ("d", FileEntry::file("http://x/d-1.jar", "1.0")),
        ]);

        reconciler.install("", &old, &root).await;
        // A local edit shows whether d gets touched
        fs::write(root.join("d-1.jar"), "local").unwrap();
        downloader.clear_requests();

        let summary = reconciler.update("", &old, &new, &root, &root).await;

        assert_eq!(
            summary,
            Summary {
                installed: 1,
                updated: 1,
                removed: 1,
                failed: 0
            }
        );
        assert!(!root.join("a-1.jar").exists());
        assert_eq!(fs::read_to_string(root.join("a-2.jar")).unwrap(), "a2");
        assert!(!root.join("b-1.jar").exists());
        assert_eq!(fs::read_to_string(root.join("c-1.jar")).unwrap(), "c1");
        assert_eq!(fs::read_to_string(root.join("d-1.jar")).unwrap(), "local");
        assert_eq!(
            downloader.requests(),
            vec!["http://x/a-2.jar".to_string(), "http://x/c-1.jar".to_string()]
        );
    }

    #[tokio::test]
    async fn test_update_downgrade_replaces_file() {
        let dir = tempdir().unwrap();
        let downloader = FakeDownloader::new().with_file("http://x/old.jar", "old");
        let extractor = ArchiveExtractorImpl::new();
        fs::write(dir.path().join("new.jar"), "new").unwrap();

        let old = mods(vec![("m", FileEntry::file("http://x/new.jar", "2.0"))]);
        let new = mods(vec![("m", FileEntry::file("http://x/old.jar", "1.9.9"))]);

        let summary = reconciler(&downloader, &extractor)
            .update("", &old, &new, dir.path(), dir.path())
            .await;

        assert_eq!(summary.updated, 1);
        assert!(!dir.path().join("new.jar").exists());
        assert_eq!(fs::read_to_string(dir.path().join("old.jar")).unwrap(), "old");
    }

    #[test_log::test(tokio::test)]
    async fn test_update_version_parse_failure_keeps_going() {
        let dir = tempdir().unwrap();
        let downloader = FakeDownloader::new()
            .with_file("http://x/a-2.jar", "a2")
            .with_file("http://x/b-2.jar", "b2")
            .with_file("http://x/c-2.jar", "c2");
        let extractor = ArchiveExtractorImpl::new();
        for name in ["a-1.jar", "b-1.jar", "c-1.jar"] {
            fs::write(dir.path().join(name), "v1").unwrap();
        }

        let mut unversioned = FileEntry::file("http://x/c-1.jar", "1");
        if let FileEntry::File(spec) = &mut unversioned {
            spec.version = None;
        }

        let old = mods(vec![
            ("a", FileEntry::file("http://x/a-1.jar", "beta")),
            ("b", FileEntry::file("http://x/b-1.jar", "1")),
            ("c", unversioned),
        ]);
        let new = mods(vec![
            ("a", FileEntry::file("http://x/a-2.jar", "2")),
            ("b", FileEntry::file("http://x/b-2.jar", "2")),
            ("c", FileEntry::file("http://x/c-2.jar", "2")),
        ]);

        let summary = reconciler(&downloader, &extractor)
            .update("", &old, &new, dir.path(), dir.path())
            .await;

        assert_eq!(summary.updated, 3);
        assert_eq!(summary.failed, 0);
        for name in ["a-2.jar", "b-2.jar", "c-2.jar"] {
            assert!(dir.path().join(name).exists(), "{} missing", name);
        }
    }

    #[tokio::test]
    async fn test_update_changed_kind_replaces_entry() {
        let dir = tempdir().unwrap();
        let downloader = FakeDownloader::new().with_file("http://x/inner.txt", "inner");
        let extractor = ArchiveExtractorImpl::new();
        fs::write(dir.path().join("options.txt"), "old").unwrap();

        let old = mods(vec![(
            "options",
            FileEntry::file("http://x/options.txt", "1"),
        )]);
        let new = mods(vec![(
            "options",
            mods(vec![("inner", FileEntry::file("http://x/inner.txt", "1"))]),
        )]);

        let summary = reconciler(&downloader, &extractor)
            .update("", &old, &new, dir.path(), dir.path())
            .await;

        assert_eq!(summary.removed, 1);
        assert_eq!(summary.installed, 1);
        assert!(!dir.path().join("options.txt").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("options/inner.txt")).unwrap(),
            "inner"
        );
    }

    #[tokio::test]
    async fn test_update_renamed_directory() {
        let dir = tempdir().unwrap();
        let downloader = FakeDownloader::new().with_file("http://x/c.jar", "c");
        let extractor = ArchiveExtractorImpl::new();
        fs::create_dir(dir.path().join("mods")).unwrap();
        fs::write(dir.path().join("mods/a.jar"), "a").unwrap();

        let old = mods(vec![(
            "mods",
            mods(vec![("a", FileEntry::file("http://x/a.jar", "1"))]),
        )]);
        let new = mods(vec![(
            "mods",
            mods(vec![
                ("a", FileEntry::file("http://x/a.jar", "1")),
                ("c", FileEntry::file("http://x/c.jar", "1")),
            ])
            .with_filename("mods-1.12"),
        )]);

        let summary = reconciler(&downloader, &extractor)
            .update("", &old, &new, dir.path(), dir.path())
            .await;

        assert_eq!(summary.installed, 1);
        assert!(dir.path().join("mods-1.12").is_dir());
        assert_eq!(fs::read_to_string(dir.path().join("mods-1.12/c.jar")).unwrap(), "c");
    }

    #[tokio::test]
    async fn test_directory_creation_failure_is_counted_and_traversal_continues() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("mods"), "not a directory").unwrap();
        let downloader = FakeDownloader::new()
            .with_file("http://x/a.jar", "a")
            .with_file("http://x/b.zip", "b");
        let extractor = ArchiveExtractorImpl::new();

        let tree = mods(vec![
            ("mods", mods(vec![("a", FileEntry::file("http://x/a.jar", "1"))])),
            (
                "resourcepacks",
                mods(vec![("b", FileEntry::file("http://x/b.zip", "1"))]),
            ),
        ]);

        let summary = reconciler(&downloader, &extractor)
            .install("", &tree, dir.path())
            .await;

        assert!(summary.failed >= 1);
        assert_eq!(summary.installed, 1);
        assert!(downloader.requests().contains(&"http://x/a.jar".to_string()));
        assert_eq!(
            fs::read_to_string(dir.path().join("resourcepacks/b.zip")).unwrap(),
            "b"
        );
    }

    #[tokio::test]
    async fn test_absolute_filename_stays_inside_install_root() {
        let root = tempdir().unwrap();
        let outside = tempdir().unwrap();
        fs::write(outside.path().join("keep.txt"), "keep").unwrap();
        let outside_name = outside.path().to_string_lossy().into_owned();
        let downloader = FakeDownloader::new().with_file("http://x/a.jar", "a");
        let extractor = ArchiveExtractorImpl::new();
        let reconciler = reconciler(&downloader, &extractor);

        let escaping = mods(vec![("cfg", mods(vec![]).with_filename(outside_name.clone()))]);
        let child_path = escaping
            .children()
            .and_then(|children| children.get("cfg"))
            .map(|cfg| cfg.resolve_path(root.path(), "cfg"))
            .unwrap();
        assert!(child_path.starts_with(root.path()));

        let removed = reconciler
            .update("", &escaping, &mods(vec![]), root.path(), root.path())
            .await;
        assert_eq!(removed.removed, 0);
        assert!(outside.path().join("keep.txt").exists());

        let file_tree = mods(vec![(
            "a",
            FileEntry::file("http://x/a.jar", "1").with_filename(format!("{}/a.jar", outside_name)),
        )]);
        let installed = reconciler.install("", &file_tree, root.path()).await;
        assert!(!outside.path().join("a.jar").exists());
        assert_eq!(installed.installed + installed.failed, 1);
    }

    #[tokio::test]
    async fn test_other_side_directory_is_skipped_entirely() {
        // No expectations: any runtime or extractor call panics
        let runtime = MockRuntime::new();
        let extractor = MockArchiveExtractor::new();
        let downloader = FakeDownloader::new();
        let reconciler = Reconciler::new(&runtime, &downloader, &extractor, Side::Client);

        let server_only = mods(vec![
            ("a", FileEntry::file("http://x/a.jar", "1")),
            ("cfg", FileEntry::zip_archive("http://x/cfg.zip", "1")),
        ])
        .with_side(Side::Server);
        let newer = mods(vec![("a", FileEntry::file("http://x/a.jar", "2"))]);
        let path = PathBuf::from("/srv/pack/serverconfig");

        assert_eq!(
            reconciler.install("serverconfig", &server_only, &path).await,
            Summary::default()
        );
        assert_eq!(
            reconciler.update("serverconfig", &server_only, &newer, &path, &path).await,
            Summary::default()
        );
        assert_eq!(
            reconciler.remove("serverconfig", &server_only, &path),
            Summary::default()
        );
        assert!(downloader.requests().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_install_zip_archive_leaves_contents_only() {
        let dir = tempdir().unwrap();
        let downloader = FakeDownloader::new().with_file(
            "http://x/config.zip",
            zip_bytes(&[("forge.cfg", "a=1"), ("jei/jei.cfg", "b=2")]).unwrap(),
        );
        let extractor = ArchiveExtractorImpl::new();
        let tree = mods(vec![("config", FileEntry::zip_archive("http://x/config.zip", "1"))]);

        let summary = reconciler(&downloader, &extractor)
            .install("", &tree, dir.path())
            .await;

        assert_eq!(summary.installed, 1);
        let config = dir.path().join("config");
        assert_eq!(fs::read_to_string(config.join("forge.cfg")).unwrap(), "a=1");
        assert_eq!(fs::read_to_string(config.join("jei/jei.cfg")).unwrap(), "b=2");
        assert!(!config.join(TEMP_ARCHIVE).exists());
    }

    #[tokio::test]
    async fn test_install_corrupt_archive_still_discards_download() {
        let dir = tempdir().unwrap();
        let downloader = FakeDownloader::new().with_file("http://x/config.zip", "<html>");
        let extractor = ArchiveExtractorImpl::new();
        let entry = FileEntry::zip_archive("http://x/config.zip", "1");
        let path = dir.path().join("config");

        let summary = reconciler(&downloader, &extractor)
            .install("config", &entry, &path)
            .await;

        assert_eq!(summary.failed, 1);
        assert!(path.is_dir());
        assert!(!path.join(TEMP_ARCHIVE).exists());
    }

    #[tokio::test]
    async fn test_update_zip_archive_uses_new_url() {
        let dir = tempdir().unwrap();
        let downloader = FakeDownloader::new()
            .with_file("http://x/config-2.zip", zip_bytes(&[("new.cfg", "2")]).unwrap());
        let extractor = ArchiveExtractorImpl::new();
        let config = dir.path().join("config");
        fs::create_dir(&config).unwrap();
        fs::write(config.join("old.cfg"), "1").unwrap();

        let old = mods(vec![("config", FileEntry::zip_archive("http://x/config-1.zip", "1"))]);
        let new = mods(vec![("config", FileEntry::zip_archive("http://x/config-2.zip", "2"))]);

        let summary = reconciler(&downloader, &extractor)
            .update("", &old, &new, dir.path(), dir.path())
            .await;

        assert_eq!(summary.updated, 1);
        assert!(!config.join("old.cfg").exists());
        assert_eq!(fs::read_to_string(config.join("new.cfg")).unwrap(), "2");
        assert_eq!(downloader.requests(), vec!["http://x/config-2.zip".to_string()]);
    }

    #[test]
    fn test_remove_directory_removes_subtree() {
        let dir = tempdir().unwrap();
        let downloader = FakeDownloader::new();
        let extractor = ArchiveExtractorImpl::new();
        let mods_dir = dir.path().join("mods");
        fs::create_dir(&mods_dir).unwrap();
        fs::write(mods_dir.join("a.jar"), "a").unwrap();
        fs::write(mods_dir.join("b.jar"), "b").unwrap();

        let entry = mods(vec![
            ("a", FileEntry::file("http://x/a.jar", "1")),
            ("b", FileEntry::file("http://x/b.jar", "1")),
        ]);

        let summary = reconciler(&downloader, &extractor).remove("mods", &entry, &mods_dir);

        assert_eq!(summary.removed, 1);
        assert!(!mods_dir.exists());
    }

    #[test]
    fn test_remove_missing_file_is_counted_not_fatal() {
        let dir = tempdir().unwrap();
        let downloader = FakeDownloader::new();
        let extractor = ArchiveExtractorImpl::new();
        let entry = FileEntry::file("http://x/a.jar", "1");

        let summary = reconciler(&downloader, &extractor).remove(
            "a",
            &entry,
            &dir.path().join("a.jar"),
        );

        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_remove_file_with_mock_runtime() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_remove_file()
            .with(mockall::predicate::eq(PathBuf::from("/pack/mods/a.jar")))
            .times(1)
            .returning(|_| Ok(()));
        let downloader = FakeDownloader::new();
        let extractor = MockArchiveExtractor::new();

        let summary = Reconciler::new(&runtime, &downloader, &extractor, Side::Server).remove(
            "a",
            &FileEntry::file("http://x/a.jar", "1").with_side(Side::Both),
            Path::new("/pack/mods/a.jar"),
        );

        assert_eq!(summary, Summary::removed());
    }

    #[test]
    fn test_summary_add_and_display() {
        let mut total = Summary::installed();
        total += Summary::installed();
        total += Summary::failed();
        total += Summary::removed();
        assert_eq!(total.to_string(), "2 installed, 0 updated, 1 removed, 1 failed");
    }
}
