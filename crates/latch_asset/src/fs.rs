//! Filesystem enumeration
//!
//! The manager never touches `std::fs` directly. It asks a [`FileSystem`] for
//! the direct children of a logical path, which keeps scanning independent of
//! host path conventions and lets tests run against [`MemoryFileSystem`].

use crate::{path, AssetSettings};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One direct child of an enumerated directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Logical, forward-slash path of the child.
    pub path: String,
    pub kind: EntryKind,
}

pub trait FileSystem {
    /// Direct children of the directory at `path`, in enumeration order.
    fn entries(&self, path: &str) -> io::Result<Vec<DirEntry>>;

    /// Full contents of the file at `path`.
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Host filesystem rooted at the project folder.
///
/// The project folder itself is the logical path [`AssetSettings::root_path`];
/// everything below it is addressed relative to that name. Entries are
/// returned sorted by name. Symlinked directories are skipped so a scan can
/// never loop, and the registry file is never listed.
#[derive(Debug, Clone)]
pub struct StdFileSystem {
    root: PathBuf,
    root_name: String,
    skip_hidden: bool,
    registry_file: Option<PathBuf>,
}

impl StdFileSystem {
    pub fn new(settings: &AssetSettings) -> Self {
        Self {
            root: settings.project_folder.clone(),
            root_name: settings.root_path(),
            skip_hidden: settings.skip_hidden,
            registry_file: settings.registry_path(),
        }
    }

    /// Map a logical path back onto the host. `None` for paths outside the
    /// project, embedded paths, and paths that climb with `..`.
    pub fn resolve(&self, logical: &str) -> Option<PathBuf> {
        if path::is_embedded(logical) {
            return None;
        }
        let rest = if logical == self.root_name {
            ""
        } else {
            logical.strip_prefix(&self.root_name)?.strip_prefix('/')?
        };

        let mut resolved = self.root.clone();
        for part in rest.split('/').filter(|part| !part.is_empty()) {
            if part == ".." {
                return None;
            }
            resolved.push(part);
        }
        Some(resolved)
    }

    fn resolve_or_err(&self, logical: &str) -> io::Result<PathBuf> {
        self.resolve(logical).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("'{logical}' is not inside project '{}'", self.root_name),
            )
        })
    }
}

impl FileSystem for StdFileSystem {
    fn entries(&self, logical: &str) -> io::Result<Vec<DirEntry>> {
        let dir = self.resolve_or_err(logical)?;
        let mut entries = Vec::new();

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!("ASSET_MANAGER: skipping non UTF-8 entry {raw:?} in '{logical}'");
                    continue;
                }
            };
            if self.skip_hidden && name.starts_with('.') {
                continue;
            }
            if self.registry_file.as_deref() == Some(entry.path().as_path()) {
                continue;
            }

            let file_type = entry.file_type()?;
            let kind = if file_type.is_symlink() {
                match fs::metadata(entry.path()) {
                    Ok(meta) if meta.is_dir() => {
                        warn!("ASSET_MANAGER: skipping symlinked directory '{logical}/{name}'");
                        continue;
                    }
                    Ok(_) => EntryKind::File,
                    Err(err) => {
                        warn!("ASSET_MANAGER: skipping broken link '{logical}/{name}': {err}");
                        continue;
                    }
                }
            } else if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };

            entries.push(DirEntry {
                path: path::join(logical, &name),
                kind,
            });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn read(&self, logical: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve_or_err(logical)?)
    }
}

#[derive(Debug, Clone)]
enum MemoryNode {
    Directory(Vec<String>),
    File(Vec<u8>),
}

/// In-memory tree. Children enumerate in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    nodes: BTreeMap<String, MemoryNode>,
    unreadable: BTreeSet<String>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory and any missing ancestors.
    pub fn add_dir(&mut self, logical: &str) -> &mut Self {
        let logical = logical.trim_end_matches('/');
        if logical.is_empty() || self.nodes.contains_key(logical) {
            return self;
        }
        self.link_to_parent(logical);
        self.nodes
            .insert(logical.to_string(), MemoryNode::Directory(Vec::new()));
        self
    }

    /// Add or overwrite a file, creating missing ancestors.
    pub fn add_file(&mut self, logical: &str, contents: impl Into<Vec<u8>>) -> &mut Self {
        if !self.nodes.contains_key(logical) {
            self.link_to_parent(logical);
        }
        self.nodes
            .insert(logical.to_string(), MemoryNode::File(contents.into()));
        self
    }

    pub fn with_dir(mut self, logical: &str) -> Self {
        self.add_dir(logical);
        self
    }

    pub fn with_file(mut self, logical: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.add_file(logical, contents);
        self
    }

    /// Remove an entry and everything below it.
    pub fn remove(&mut self, logical: &str) -> bool {
        let Some(node) = self.nodes.remove(logical) else {
            return false;
        };
        if let MemoryNode::Directory(children) = node {
            for child in children {
                self.remove(&path::join(logical, &child));
            }
        }
        if let Some((parent, name)) = logical.rsplit_once('/') {
            if let Some(MemoryNode::Directory(children)) = self.nodes.get_mut(parent) {
                children.retain(|child| child != name);
            }
        }
        true
    }

    /// Make enumeration of `logical` fail with `PermissionDenied`.
    pub fn deny(&mut self, logical: &str) -> &mut Self {
        self.unreadable.insert(logical.to_string());
        self
    }

    fn link_to_parent(&mut self, logical: &str) {
        let Some((parent, name)) = logical.rsplit_once('/') else {
            return;
        };
        self.add_dir(parent);
        if let Some(MemoryNode::Directory(children)) = self.nodes.get_mut(parent) {
            children.push(name.to_string());
        }
    }
}

impl FileSystem for MemoryFileSystem {
    fn entries(&self, logical: &str) -> io::Result<Vec<DirEntry>> {
        if self.unreadable.contains(logical) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("'{logical}' is not readable"),
            ));
        }
        match self.nodes.get(logical) {
            Some(MemoryNode::Directory(children)) => Ok(children
                .iter()
                .map(|name| {
                    let child = path::join(logical, name);
                    let kind = match self.nodes.get(&child) {
                        Some(MemoryNode::Directory(_)) => EntryKind::Directory,
                        _ => EntryKind::File,
                    };
                    DirEntry { path: child, kind }
                })
                .collect()),
            Some(MemoryNode::File(_)) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{logical}' is a file"),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("'{logical}' does not exist"),
            )),
        }
    }

    fn read(&self, logical: &str) -> io::Result<Vec<u8>> {
        match self.nodes.get(logical) {
            Some(MemoryNode::File(contents)) => Ok(contents.clone()),
            Some(MemoryNode::Directory(_)) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{logical}' is a directory"),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("'{logical}' does not exist"),
            )),
        }
    }
}
