//! Asset records
//!
//! An asset is split in two:
//! - [`AssetMetadata`] is the durable part (handle, path, type) kept in the registry
//! - [`RuntimeData`] is recomputed from the path on every scan and never persisted
//!
//! Directories are a variant of [`AssetKind`] rather than a separate type, so
//! the live store holds one record type.

use crate::{path, AssetHandle, AssetType};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Persisted identity record, one per logical path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub handle: AssetHandle,
    pub path: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
}

/// Fields derived at scan time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeData {
    pub filename: String,
    pub extension: String,
    pub parent: AssetHandle,
    pub loaded: bool,
}

impl RuntimeData {
    /// Decompose `logical` and link it to `parent`. Always starts unloaded.
    pub fn from_path(logical: &str, parent: AssetHandle) -> Self {
        Self {
            filename: path::file_name(logical).to_string(),
            extension: path::extension(logical).to_string(),
            parent,
            loaded: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetKind {
    File,
    /// Direct children in enumeration order of the most recent scan.
    Directory { children: Vec<AssetHandle> },
}

/// A live asset.
pub struct Asset {
    pub metadata: AssetMetadata,
    pub runtime_data: RuntimeData,
    pub kind: AssetKind,
    content: Option<Box<dyn Any>>,
}

impl Asset {
    /// Build a record from metadata. `kind` is chosen by the caller because a
    /// directory whose type was demoted to `None` is still a directory.
    pub fn new(metadata: AssetMetadata, runtime_data: RuntimeData, kind: AssetKind) -> Self {
        Self {
            metadata,
            runtime_data,
            kind,
            content: None,
        }
    }

    /// An unregistered file asset, typically the target of an embedded import.
    pub fn detached(asset_type: AssetType) -> Self {
        Self::new(
            AssetMetadata {
                handle: AssetHandle::none(),
                path: String::new(),
                asset_type,
            },
            RuntimeData::default(),
            AssetKind::File,
        )
    }

    #[inline]
    pub fn handle(&self) -> AssetHandle {
        self.metadata.handle
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.metadata.path
    }

    #[inline]
    pub fn asset_type(&self) -> AssetType {
        self.metadata.asset_type
    }

    #[inline]
    pub fn filename(&self) -> &str {
        &self.runtime_data.filename
    }

    #[inline]
    pub fn parent(&self) -> AssetHandle {
        self.runtime_data.parent
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.runtime_data.loaded
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, AssetKind::Directory { .. })
    }

    /// Direct children; empty for files.
    pub fn children(&self) -> &[AssetHandle] {
        match &self.kind {
            AssetKind::Directory { children } => children,
            AssetKind::File => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<AssetHandle>> {
        match &mut self.kind {
            AssetKind::Directory { children } => Some(children),
            AssetKind::File => None,
        }
    }

    /// Take over identity and derived path data from `source`.
    ///
    /// The loaded flag, kind and content of `self` are left untouched.
    pub fn copy_metadata_from(&mut self, source: &Asset) {
        self.metadata = source.metadata.clone();
        self.runtime_data.filename = source.runtime_data.filename.clone();
        self.runtime_data.extension = source.runtime_data.extension.clone();
        self.runtime_data.parent = source.runtime_data.parent;
    }

    /// Attach decoded content. Replaces any previous content.
    pub fn set_content<T: Any>(&mut self, content: T) {
        self.content = Some(Box::new(content));
    }

    pub fn content<T: Any>(&self) -> Option<&T> {
        self.content.as_ref()?.downcast_ref()
    }

    pub fn content_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.content.as_mut()?.downcast_mut()
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    pub fn clear_content(&mut self) {
        self.content = None;
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("metadata", &self.metadata)
            .field("runtime_data", &self.runtime_data)
            .field("kind", &self.kind)
            .field("has_content", &self.content.is_some())
            .finish()
    }
}
