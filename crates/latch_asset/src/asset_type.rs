use crate::path;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset category.
///
/// Declaration order is significant: the sorted asset view orders by it, so
/// untyped assets come first, then directories, then content types.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AssetType {
    #[default]
    None,
    Directory,
    Model,
    Texture,
    Shader,
    Audio,
}

impl AssetType {
    pub const ALL: [AssetType; 6] = [
        AssetType::None,
        AssetType::Directory,
        AssetType::Model,
        AssetType::Texture,
        AssetType::Shader,
        AssetType::Audio,
    ];

    /// Classify a file by its extension (case-insensitive).
    ///
    /// Embedded paths and unknown extensions classify as [`AssetType::None`];
    /// embedded assets always get their type from the loader that creates them.
    pub fn from_path(logical: &str) -> Self {
        if path::is_embedded(logical) {
            return AssetType::None;
        }
        Self::from_extension(path::extension(logical))
    }

    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "fbx" | "obj" | "gltf" | "glb" | "dae" | "3ds" | "blend" => AssetType::Model,
            "png" | "jpg" | "jpeg" | "tga" | "bmp" | "hdr" | "dds" | "psd" => AssetType::Texture,
            "wgsl" | "glsl" | "hlsl" | "vert" | "frag" | "comp" => AssetType::Shader,
            "wav" | "ogg" | "mp3" | "flac" => AssetType::Audio,
            _ => AssetType::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AssetType::None => "None",
            AssetType::Directory => "Directory",
            AssetType::Model => "Model",
            AssetType::Texture => "Texture",
            AssetType::Shader => "Shader",
            AssetType::Audio => "Audio",
        }
    }

    /// Whether content can ever be loaded for this type.
    pub fn has_content(self) -> bool {
        !matches!(self, AssetType::None | AssetType::Directory)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(AssetType::from_path("proj/models/mesh1.fbx"), AssetType::Model);
        assert_eq!(AssetType::from_path("proj/textures/tex1.PNG"), AssetType::Texture);
        assert_eq!(AssetType::from_path("proj/shaders/lit.wgsl"), AssetType::Shader);
        assert_eq!(AssetType::from_path("proj/sfx/jump.ogg"), AssetType::Audio);
        assert_eq!(AssetType::from_path("proj/notes.txt"), AssetType::None);
        assert_eq!(AssetType::from_path("proj/Makefile"), AssetType::None);
    }

    #[test]
    fn embedded_paths_are_untyped() {
        assert_eq!(AssetType::from_path("<proj/scene.fbx>mesh.png"), AssetType::None);
    }

    #[test]
    fn ordering_follows_declaration() {
        let mut sorted = AssetType::ALL;
        sorted.reverse();
        sorted.sort();
        assert_eq!(sorted, AssetType::ALL);
        assert!(AssetType::Directory < AssetType::Model);
    }
}
