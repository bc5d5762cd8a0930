//! Latch Asset Pipeline
//!
//! Discovers files under a project folder, gives each a stable handle and
//! dispatches to pluggable loaders:
//! - Persistent registry (logical path -> handle, type)
//! - Live store of directory and file assets with parent/child links
//! - Idempotent re-scans and re-imports
//! - Embedded assets addressed inside a host file

pub mod asset;
pub mod asset_type;
pub mod config;
pub mod error;
pub mod fs;
pub mod handle;
pub mod manager;
pub mod path;
pub mod registry;
pub mod serializer;
pub mod store;

pub use asset::{Asset, AssetKind, AssetMetadata, RuntimeData};
pub use asset_type::AssetType;
pub use config::AssetSettings;
pub use error::{AssetError, RegistryError};
pub use fs::{DirEntry, EntryKind, FileSystem, MemoryFileSystem, StdFileSystem};
pub use handle::AssetHandle;
pub use manager::{compare_assets, AssetManager, ScanFailure};
pub use registry::AssetRegistry;
pub use serializer::{AssetLoader, SerializerRegistry};
pub use store::AssetStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
