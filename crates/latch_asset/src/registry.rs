//! Persistent path -> metadata mapping
//!
//! The registry is the source of truth for identity: a path found here keeps
//! its handle no matter how often it is re-scanned. It is stored on disk as a
//! versioned JSON document with entries sorted by path.

use crate::{AssetHandle, AssetMetadata, RegistryError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// On-disk format version.
pub const REGISTRY_VERSION: u32 = 1;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssetRegistry {
    entries: BTreeMap<String, AssetMetadata>,
}

#[derive(Serialize, Deserialize)]
struct RegistryFile {
    version: u32,
    assets: Vec<AssetMetadata>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&AssetMetadata> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Insert `metadata` unless its path is already registered.
    ///
    /// Returns `true` if the entry was added. Existing entries are never
    /// overwritten, which is what keeps handles stable.
    pub fn insert_if_absent(&mut self, metadata: &AssetMetadata) -> bool {
        if self.entries.contains_key(&metadata.path) {
            return false;
        }
        self.entries.insert(metadata.path.clone(), metadata.clone());
        true
    }

    /// Keep only entries whose handle satisfies `keep`. Returns the number removed.
    pub fn retain_handles(&mut self, mut keep: impl FnMut(AssetHandle) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, metadata| keep(metadata.handle));
        before - self.entries.len()
    }

    pub fn find_by_handle(&self, handle: AssetHandle) -> Option<&AssetMetadata> {
        self.entries.values().find(|metadata| metadata.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = &AssetMetadata> {
        self.entries.values()
    }

    /// Read a registry file. A missing file is an empty registry.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("ASSET_MANAGER: no registry at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(RegistryError::Io {
                    path: path.to_owned(),
                    source,
                })
            }
        };

        let file: RegistryFile =
            serde_json::from_str(&text).map_err(|source| RegistryError::Parse {
                path: path.to_owned(),
                source,
            })?;

        if file.version != REGISTRY_VERSION {
            return Err(RegistryError::UnsupportedVersion {
                path: path.to_owned(),
                found: file.version,
                expected: REGISTRY_VERSION,
            });
        }

        let entries = file
            .assets
            .into_iter()
            .map(|metadata| (metadata.path.clone(), metadata))
            .collect::<BTreeMap<_, _>>();
        debug!(
            "ASSET_MANAGER: loaded {} registry entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self { entries })
    }

    /// Write the registry, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), RegistryError> {
        let io_error = |source| RegistryError::Io {
            path: path.to_owned(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let file = RegistryFile {
            version: REGISTRY_VERSION,
            assets: self.entries.values().cloned().collect(),
        };
        let text =
            serde_json::to_string_pretty(&file).map_err(|source| RegistryError::Serialize {
                path: path.to_owned(),
                source,
            })?;
        fs::write(path, text).map_err(io_error)?;

        debug!(
            "ASSET_MANAGER: saved {} registry entries to {}",
            self.entries.len(),
            path.display()
        );
        Ok(())
    }
}
