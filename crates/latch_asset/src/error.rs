use crate::{AssetHandle, AssetType};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing the persisted registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to access registry file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse registry file '{}'", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize registry for '{}'", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("registry file '{}' has unsupported version {found} (expected {expected})", path.display())]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

/// Errors returned by [`AssetManager`](crate::AssetManager) operations.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("no registered asset at path '{path}'")]
    UnknownPath { path: String },

    #[error("no live asset with handle {handle}")]
    UnknownHandle { handle: AssetHandle },

    #[error("no loader bound for {asset_type} asset '{path}'")]
    NoLoaderBound { asset_type: AssetType, path: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
