//! Asset pipeline settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default registry location, relative to the project folder.
pub const DEFAULT_REGISTRY_FILE: &str = ".latch/asset_registry.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSettings {
    /// Root of the scanned tree.
    pub project_folder: PathBuf,
    /// Where the registry is persisted. Defaults to [`DEFAULT_REGISTRY_FILE`]
    /// inside the project folder.
    #[serde(default)]
    pub registry_file: Option<PathBuf>,
    /// Disable to keep the registry purely in memory.
    #[serde(default = "enabled")]
    pub persist_registry: bool,
    /// Ignore entries whose name starts with a dot.
    #[serde(default = "enabled")]
    pub skip_hidden: bool,
}

fn enabled() -> bool {
    true
}

impl AssetSettings {
    pub fn new(project_folder: impl Into<PathBuf>) -> Self {
        Self {
            project_folder: project_folder.into(),
            ..Self::default()
        }
    }

    /// Settings for a tree that never touches the disk registry.
    pub fn in_memory(root: impl Into<PathBuf>) -> Self {
        Self {
            persist_registry: false,
            ..Self::new(root)
        }
    }

    /// Resolved registry file, or `None` when persistence is disabled.
    pub fn registry_path(&self) -> Option<PathBuf> {
        if !self.persist_registry {
            return None;
        }
        Some(
            self.registry_file
                .clone()
                .unwrap_or_else(|| self.project_folder.join(DEFAULT_REGISTRY_FILE)),
        )
    }

    /// Logical path of the project root: the project folder's own name.
    ///
    /// All logical paths start with it, so the registry stays valid when the
    /// project is moved on disk.
    pub fn root_path(&self) -> String {
        match self.project_folder.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            // "." and ".." have no name of their own
            None => std::fs::canonicalize(&self.project_folder)
                .ok()
                .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
                .unwrap_or_else(|| "project".to_string()),
        }
    }
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            project_folder: PathBuf::from("assets"),
            registry_file: None,
            persist_registry: true,
            skip_hidden: true,
        }
    }
}
