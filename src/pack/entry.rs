//! The file-entry tree a pack definition is made of.
//!
//! A [`FileEntry`] is either a single downloadable file, a directory with
//! keyed children, or an archive that is expanded into a directory. Where a
//! node lands on disk is computed from its parent path by
//! [`FileEntry::resolve_path`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Declared filename meaning "do not nest, use the parent path".
pub const NO_NESTING: &str = "//";

/// Which kind of installation an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Client,
    Server,
    Both,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Client => "client",
            Side::Server => "server",
            Side::Both => "both",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes shared by `file` and `zip-archive` entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Kept as written; parsed only when two entries are compared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectorySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, FileEntry>,
}

/// A node of the pack's file tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FileEntry {
    File(FileSpec),
    Directory(DirectorySpec),
    ZipArchive(FileSpec),
}

impl FileEntry {
    pub fn file(url: impl Into<String>, version: impl Into<String>) -> Self {
        FileEntry::File(FileSpec {
            url: url.into(),
            version: Some(version.into()),
            ..Default::default()
        })
    }

    pub fn zip_archive(url: impl Into<String>, version: impl Into<String>) -> Self {
        FileEntry::ZipArchive(FileSpec {
            url: url.into(),
            version: Some(version.into()),
            ..Default::default()
        })
    }

    pub fn directory<K: Into<String>>(children: impl IntoIterator<Item = (K, FileEntry)>) -> Self {
        FileEntry::Directory(DirectorySpec {
            children: children.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Default::default()
        })
    }

    pub fn with_filename(mut self, name: impl Into<String>) -> Self {
        let name = Some(name.into());
        match &mut self {
            FileEntry::File(spec) | FileEntry::ZipArchive(spec) => spec.filename = name,
            FileEntry::Directory(spec) => spec.filename = name,
        }
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        match &mut self {
            FileEntry::File(spec) | FileEntry::ZipArchive(spec) => spec.side = Some(side),
            FileEntry::Directory(spec) => spec.side = Some(side),
        }
        self
    }

    /// The manifest `type` tag of this entry.
    pub fn kind(&self) -> &'static str {
        match self {
            FileEntry::File(_) => "file",
            FileEntry::Directory(_) => "directory",
            FileEntry::ZipArchive(_) => "zip-archive",
        }
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            FileEntry::File(spec) | FileEntry::ZipArchive(spec) => spec.side,
            FileEntry::Directory(spec) => spec.side,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            FileEntry::File(spec) | FileEntry::ZipArchive(spec) => spec.filename.as_deref(),
            FileEntry::Directory(spec) => spec.filename.as_deref(),
        }
    }

    /// Declared version; directories have none.
    pub fn version(&self) -> Option<&str> {
        match self {
            FileEntry::File(spec) | FileEntry::ZipArchive(spec) => spec.version.as_deref(),
            FileEntry::Directory(_) => None,
        }
    }

    pub fn children(&self) -> Option<&BTreeMap<String, FileEntry>> {
        match self {
            FileEntry::Directory(spec) => Some(&spec.children),
            _ => None,
        }
    }

    /// Whether this entry takes part in an installation for `side`.
    /// Unrestricted entries and `both` entries apply everywhere.
    pub fn applies_to(&self, side: Side) -> bool {
        match self.side() {
            None | Some(Side::Both) => true,
            Some(restricted) => restricted == side,
        }
    }

    /// Where this entry lives when stored under `key` in a directory at `parent`.
    ///
    /// Directories and archives use their declared filename (the
    /// [`NO_NESTING`] sentinel keeps `parent`), else `key`. Files use their
    /// declared filename, else the last segment of the URL path.
    ///
    /// A file never sits directly at `parent`: [`NO_NESTING`] on a file is
    /// ignored and the URL segment is used instead.
    ///
    /// The result never leaves `parent`. Names are appended component
    /// by component, dropping roots, drive prefixes, `.` and `..`, so
    /// `/home/user` lands at `<parent>/home/user`.
    pub fn resolve_path(&self, parent: &Path, key: &str) -> PathBuf {
        let declared = self.filename().filter(|name| !name.is_empty());
        match self {
            FileEntry::Directory(_) | FileEntry::ZipArchive(_) => match declared {
                Some(NO_NESTING) => parent.to_path_buf(),
                Some(name) => nested(parent, name),
                None => nested(parent, key),
            },
            FileEntry::File(spec) => match declared.filter(|name| *name != NO_NESTING) {
                Some(name) => nested(parent, name),
                None => match url_file_name(&spec.url) {
                    Some(name) => nested(parent, name),
                    None => nested(parent, key),
                },
            },
        }
    }

    /// Human-readable label for log lines: `key` plus the version if any.
    pub fn label(&self, key: &str) -> String {
        match self.version() {
            Some(version) => format!("{} v{}", key, version),
            None => key.to_string(),
        }
    }
}

/// Last `/`-delimited segment of `url`'s path.
///
/// The query and fragment are cut off first, so `http://x/dl?f=a/b.jar`
/// names `dl`, not `b.jar`.
fn url_file_name(url: &str) -> Option<&str> {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url[..end]
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// `parent` with the plain components of `name` appended.
fn nested(parent: &Path, name: &str) -> PathBuf {
    let mut path = parent.to_path_buf();
    for component in Path::new(name).components() {
        if let Component::Normal(part) = component {
            path.push(part);
        }
    }
    path
}
