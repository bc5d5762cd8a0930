//! Asset manager: registry, live store, scanner and load dispatch
//!
//! A full refresh walks the project tree depth-first. Every directory and file
//! is turned into a live [`Asset`] whose handle comes from the registry when
//! its path is already known, so identities survive any number of re-scans.
//! After the walk the sorted view is rebuilt and registry rows without a live
//! asset are compacted away.

use crate::{
    path, Asset, AssetError, AssetHandle, AssetKind, AssetMetadata, AssetRegistry, AssetSettings,
    AssetStore, AssetType, EntryKind, FileSystem, RuntimeData, SerializerRegistry, StdFileSystem,
};
use std::cmp::Ordering;
use std::path::Path;
use tracing::{debug, error, trace, warn};

/// A directory whose contents could not be enumerated.
///
/// The scan skips the subtree and carries on; the directory itself stays
/// live, with no children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub path: String,
    pub reason: String,
}

pub struct AssetManager {
    settings: AssetSettings,
    filesystem: Box<dyn FileSystem>,
    serializers: SerializerRegistry,
    registry: AssetRegistry,
    assets: AssetStore,
    sorted_assets: Vec<AssetHandle>,
    scan_failures: Vec<ScanFailure>,
    /// Assets taken out of the store while their loader runs.
    loading: Vec<AssetHandle>,
    root: AssetHandle,
}

impl AssetManager {
    /// Create a manager over `filesystem`, loading the persisted registry if
    /// the settings enable one. Nothing is scanned yet.
    pub fn new(
        settings: AssetSettings,
        filesystem: impl FileSystem + 'static,
        serializers: SerializerRegistry,
    ) -> Result<Self, AssetError> {
        let registry = match settings.registry_path() {
            Some(file) => AssetRegistry::load(&file)?,
            None => AssetRegistry::new(),
        };

        Ok(Self {
            settings,
            filesystem: Box::new(filesystem),
            serializers,
            registry,
            assets: AssetStore::new(),
            sorted_assets: Vec::new(),
            scan_failures: Vec::new(),
            loading: Vec::new(),
            root: AssetHandle::none(),
        })
    }

    /// Open the project on disk and run the initial [`refresh`](Self::refresh).
    pub fn open(settings: AssetSettings, serializers: SerializerRegistry) -> Result<Self, AssetError> {
        let filesystem = StdFileSystem::new(&settings);
        let mut manager = Self::new(settings, filesystem, serializers)?;
        manager.refresh();
        Ok(manager)
    }

    /// Scan the whole project and rebuild the sorted view.
    pub fn refresh(&mut self) -> AssetHandle {
        self.scan_failures.clear();

        let root_path = self.settings.root_path();
        self.root = self.update_directory_assets(&root_path, AssetHandle::none());
        self.update_asset_registry();

        debug!(
            "ASSET_MANAGER: refreshed '{root_path}': {} live assets, {} registry entries, {} skipped directories",
            self.assets.len(),
            self.registry.len(),
            self.scan_failures.len()
        );
        self.root
    }

    /// Build an asset for `path` without registering or storing it.
    ///
    /// A known path keeps its registered handle and type. If the registered
    /// type disagrees with `asset_type` the asset is demoted to
    /// [`AssetType::None`]; content previously loaded for the old type is the
    /// caller's concern.
    pub fn create_empty_asset(&self, path: &str, asset_type: AssetType, parent: AssetHandle) -> Asset {
        let kind = if asset_type == AssetType::Directory {
            AssetKind::Directory {
                children: Vec::new(),
            }
        } else {
            AssetKind::File
        };

        let metadata = match self.registry.get(path) {
            Some(registered) => {
                let mut metadata = registered.clone();
                if metadata.asset_type != asset_type {
                    error!(
                        "ASSET_MANAGER: Asset type mismatch: {path} (registered {}, found {asset_type})",
                        metadata.asset_type
                    );
                    metadata.asset_type = AssetType::None;
                }
                metadata
            }
            None => AssetMetadata {
                handle: AssetHandle::generate(),
                path: path.to_string(),
                asset_type,
            },
        };

        Asset::new(metadata, RuntimeData::from_path(path, parent), kind)
    }

    /// Give `data_asset` a stable identity as `internal_path` inside the
    /// registered file `parent_path`.
    ///
    /// The synthetic path is registered but nothing is stored; pass the asset
    /// to [`add_asset`](Self::add_asset) to make it live; otherwise the next
    /// compaction drops its registry row.
    pub fn create_embedded_asset(
        &mut self,
        asset_type: AssetType,
        data_asset: &mut Asset,
        parent_path: &str,
        internal_path: &str,
    ) -> Result<AssetHandle, AssetError> {
        let parent = self
            .registry
            .get(parent_path)
            .map(|metadata| metadata.handle)
            .ok_or_else(|| AssetError::UnknownPath {
                path: parent_path.to_string(),
            })?;

        let embedded = path::embedded_path(parent_path, internal_path);
        let meta_asset = self.create_empty_asset(&embedded, asset_type, parent);
        if self.registry.insert_if_absent(&meta_asset.metadata) {
            trace!("ASSET_MANAGER: registered embedded asset {embedded}");
        }
        data_asset.copy_metadata_from(&meta_asset);

        Ok(data_asset.handle())
    }

    /// Run the bound loader on `asset` and record the result in its loaded flag.
    ///
    /// Directories have no content and report `Ok(false)`. Any other type
    /// without a loader, including demoted `None` assets, is an error.
    pub fn load_asset_data(&mut self, asset: &mut Asset) -> Result<bool, AssetError> {
        if asset.is_directory() || asset.asset_type() == AssetType::Directory {
            return Ok(false);
        }

        let Some(loader) = self.serializers.lookup(asset.asset_type()) else {
            asset.runtime_data.loaded = false;
            return Err(AssetError::NoLoaderBound {
                asset_type: asset.asset_type(),
                path: asset.path().to_string(),
            });
        };

        let loaded = loader.load(self, asset);
        asset.runtime_data.loaded = loaded;
        if loaded {
            trace!("ASSET_MANAGER: loaded {}", asset.path());
        } else {
            warn!("ASSET_MANAGER: loader failed for {}", asset.path());
        }
        Ok(loaded)
    }

    /// Load a live asset in place.
    ///
    /// The asset is taken out of the store while its loader runs, so the
    /// loader may freely use the manager. Compaction still counts it as live.
    pub fn load(&mut self, handle: AssetHandle) -> Result<bool, AssetError> {
        let mut asset = self
            .assets
            .remove(handle)
            .ok_or(AssetError::UnknownHandle { handle })?;
        self.loading.push(handle);
        let result = self.load_asset_data(&mut asset);
        self.loading.pop();
        self.assets.insert(asset);
        result
    }

    /// Load every live asset that has a bound loader. Returns how many loaded.
    pub fn load_all(&mut self) -> usize {
        let pending: Vec<AssetHandle> = self
            .assets
            .iter()
            .filter(|(_, asset)| !asset.is_loaded() && self.serializers.contains(asset.asset_type()))
            .map(|(handle, _)| handle)
            .collect();

        let mut loaded = 0;
        for handle in pending {
            match self.load(handle) {
                Ok(true) => loaded += 1,
                Ok(false) => {}
                Err(err) => warn!("ASSET_MANAGER: {err}"),
            }
        }
        loaded
    }

    /// Import the file at `path`, classifying it by extension.
    ///
    /// Re-importing a known path replaces the live object wholesale while the
    /// handle stays the same.
    pub fn import_asset(&mut self, path: &str, parent: AssetHandle) -> AssetHandle {
        let asset = self.create_empty_asset(path, AssetType::from_path(path), parent);
        self.store(asset)
    }

    /// Register (if new) and store an asset built by
    /// [`create_empty_asset`](Self::create_empty_asset) or
    /// [`create_embedded_asset`](Self::create_embedded_asset).
    pub fn add_asset(&mut self, asset: Asset) -> Result<AssetHandle, AssetError> {
        if !asset.handle().is_valid() {
            return Err(AssetError::UnknownHandle {
                handle: asset.handle(),
            });
        }
        Ok(self.store(asset))
    }

    /// Create or refresh the directory asset at `path` and scan below it.
    ///
    /// The directory is recreated, so its children list only holds what this
    /// scan finds. Unreadable directories are recorded in
    /// [`scan_failures`](Self::scan_failures) and left empty.
    pub fn update_directory_assets(&mut self, path: &str, parent: AssetHandle) -> AssetHandle {
        let mut directory = self.create_empty_asset(path, AssetType::Directory, parent);
        directory.runtime_data.loaded = true;
        let handle = self.store(directory);

        if parent.is_valid() {
            self.link_child(parent, handle);
        }

        let entries = match self.filesystem.entries(path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("ASSET_MANAGER: skipping unreadable directory '{path}': {err}");
                self.scan_failures.push(ScanFailure {
                    path: path.to_string(),
                    reason: err.to_string(),
                });
                return handle;
            }
        };

        for entry in entries {
            match entry.kind {
                EntryKind::Directory => {
                    self.update_directory_assets(&entry.path, handle);
                }
                EntryKind::File => {
                    let child = self.import_asset(&entry.path, handle);
                    self.link_child(handle, child);
                }
            }
        }

        handle
    }

    /// Rebuild the sorted view and drop registry rows with no live asset.
    pub fn update_asset_registry(&mut self) {
        let mut sorted: Vec<(AssetHandle, &Asset)> = self.assets.iter().collect();
        sorted.sort_by(|(_, a), (_, b)| compare_assets(a, b));
        self.sorted_assets = sorted.into_iter().map(|(handle, _)| handle).collect();

        let assets = &self.assets;
        let loading = &self.loading;
        let removed = self
            .registry
            .retain_handles(|handle| assets.contains(handle) || loading.contains(&handle));
        if removed > 0 {
            debug!("ASSET_MANAGER: compacted {removed} stale registry entries");
        }
    }

    /// Remove a live asset together with everything parented to it, and unlink
    /// it from its parent directory. Registry rows go at the next compaction.
    pub fn remove_asset(&mut self, handle: AssetHandle) -> Option<Asset> {
        let asset = self.assets.remove(handle)?;

        if let Some(children) = self
            .assets
            .get_mut(asset.parent())
            .and_then(Asset::children_mut)
        {
            children.retain(|child| *child != handle);
        }

        let mut removed = vec![handle];
        let mut cursor = 0;
        while cursor < removed.len() {
            let current = removed[cursor];
            let orphans: Vec<AssetHandle> = self
                .assets
                .iter()
                .filter(|(_, live)| live.parent() == current)
                .map(|(orphan, _)| orphan)
                .collect();
            for orphan in orphans {
                self.assets.remove(orphan);
                removed.push(orphan);
            }
            cursor += 1;
        }

        let assets = &self.assets;
        self.sorted_assets.retain(|sorted| assets.contains(*sorted));
        if handle == self.root {
            self.root = AssetHandle::none();
        }

        trace!(
            "ASSET_MANAGER: removed {} ({} assets)",
            asset.path(),
            removed.len()
        );
        Some(asset)
    }

    /// Persist the registry to the configured location. A no-op when
    /// persistence is disabled.
    pub fn save_registry(&self) -> Result<(), AssetError> {
        match self.settings.registry_path() {
            Some(file) => self.save_registry_to(&file),
            None => {
                debug!("ASSET_MANAGER: registry persistence disabled, not saving");
                Ok(())
            }
        }
    }

    pub fn save_registry_to(&self, file: &Path) -> Result<(), AssetError> {
        self.registry.save(file)?;
        Ok(())
    }

    pub fn get(&self, handle: AssetHandle) -> Option<&Asset> {
        self.assets.get(handle)
    }

    pub fn get_mut(&mut self, handle: AssetHandle) -> Option<&mut Asset> {
        self.assets.get_mut(handle)
    }

    /// Live asset registered under `path`.
    pub fn find_by_path(&self, path: &str) -> Option<&Asset> {
        self.assets.get(self.registry.get(path)?.handle)
    }

    /// Handle of the project root, or none before the first refresh.
    pub fn root(&self) -> AssetHandle {
        self.root
    }

    /// Display order from the last [`update_asset_registry`](Self::update_asset_registry):
    /// by type, then case-insensitive file name.
    pub fn sorted_assets(&self) -> &[AssetHandle] {
        &self.sorted_assets
    }

    pub fn sorted(&self) -> impl Iterator<Item = &Asset> {
        self.sorted_assets
            .iter()
            .filter_map(|handle| self.assets.get(*handle))
    }

    pub fn scan_failures(&self) -> &[ScanFailure] {
        &self.scan_failures
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn settings(&self) -> &AssetSettings {
        &self.settings
    }

    pub fn filesystem(&self) -> &dyn FileSystem {
        self.filesystem.as_ref()
    }

    fn store(&mut self, asset: Asset) -> AssetHandle {
        let handle = asset.handle();
        if self.registry.insert_if_absent(&asset.metadata) {
            trace!("ASSET_MANAGER: registered {} as {handle}", asset.path());
        }
        if self.assets.insert(asset).is_some() {
            trace!("ASSET_MANAGER: re-imported {handle}");
        }
        handle
    }

    fn link_child(&mut self, parent: AssetHandle, child: AssetHandle) {
        match self.assets.get_mut(parent).and_then(Asset::children_mut) {
            Some(children) => {
                if !children.contains(&child) {
                    children.push(child);
                }
            }
            None => warn!("ASSET_MANAGER: parent {parent} of {child} is not a live directory"),
        }
    }
}

impl Drop for AssetManager {
    fn drop(&mut self) {
        trace!("ASSET_MANAGER: releasing {} live assets", self.assets.len());
    }
}

/// Display ordering: type first, then ASCII case-insensitive file name.
pub fn compare_assets(a: &Asset, b: &Asset) -> Ordering {
    a.asset_type().cmp(&b.asset_type()).then_with(|| {
        let a = a.filename().bytes().map(|c| c.to_ascii_lowercase());
        let b = b.filename().bytes().map(|c| c.to_ascii_lowercase());
        a.cmp(b)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryFileSystem;
    use std::cell::Cell;
    use std::rc::Rc;

    fn manager_over(fs: MemoryFileSystem) -> AssetManager {
        AssetManager::new(AssetSettings::in_memory("root"), fs, SerializerRegistry::new()).unwrap()
    }

    fn handles_by_path(manager: &AssetManager) -> Vec<(String, AssetHandle)> {
        manager
            .registry()
            .iter()
            .map(|metadata| (metadata.path.clone(), metadata.handle))
            .collect()
    }

    #[test]
    fn directory_children_follow_enumeration_order() {
        let fs = MemoryFileSystem::new()
            .with_file("root/b.txt", "b")
            .with_file("root/a.txt", "a")
            .with_dir("root/sub");
        let mut manager = manager_over(fs);

        let root = manager.refresh();
        let root_asset = manager.get(root).unwrap();
        let children = root_asset.children();

        assert_eq!(children.len(), 3);
        let paths: Vec<&str> = children
            .iter()
            .map(|child| manager.get(*child).unwrap().path())
            .collect();
        assert_eq!(paths, ["root/b.txt", "root/a.txt", "root/sub"]);
        for child in children {
            assert_eq!(manager.get(*child).unwrap().parent(), root);
        }
        assert!(root_asset.is_loaded());
        assert!(!root_asset.parent().is_valid());
    }

    #[test]
    fn rescan_keeps_handles() {
        let fs = MemoryFileSystem::new()
            .with_file("root/textures/tex1.png", "t")
            .with_file("root/models/mesh1.fbx", "m");
        let mut manager = manager_over(fs);

        manager.refresh();
        let first = handles_by_path(&manager);
        manager.refresh();
        let second = handles_by_path(&manager);

        assert_eq!(first, second);
        assert_eq!(manager.assets().len(), 5);
    }

    #[test]
    fn rescan_replaces_directory_children() {
        let fs = MemoryFileSystem::new()
            .with_file("root/a.png", "a")
            .with_file("root/b.png", "b");
        let mut manager = manager_over(fs);
        let root = manager.refresh();
        let root_again = manager.refresh();

        assert_eq!(root, root_again);
        assert_eq!(manager.get(root).unwrap().children().len(), 2);
    }

    #[test]
    fn reimport_replaces_live_object_but_not_handle() {
        let mut manager = manager_over(MemoryFileSystem::new().with_file("root/a.png", "a"));
        manager.refresh();
        let original = manager.find_by_path("root/a.png").unwrap().handle();
        manager.get_mut(original).unwrap().set_content(7u8);

        let reimported = manager.import_asset("root/a.png", manager.root());

        assert_eq!(reimported, original);
        let live = manager.get(original).unwrap();
        assert!(!live.has_content());
        assert_eq!(manager.registry().len(), 2);
        assert_eq!(manager.registry().get("root/a.png").unwrap().handle, original);
    }

    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn content_is_released_once_on_replace_and_on_drop() {
        let fs = MemoryFileSystem::new()
            .with_file("root/a.png", "a")
            .with_file("root/b.png", "b")
            .with_file("root/sub/c.wav", "c");
        let mut manager = manager_over(fs);
        manager.refresh();
        let drops = Rc::new(Cell::new(0));
        let files = ["root/a.png", "root/b.png", "root/sub/c.wav"];
        for path in files {
            let handle = manager.find_by_path(path).unwrap().handle();
            manager
                .get_mut(handle)
                .unwrap()
                .set_content(DropCounter(drops.clone()));
        }

        let parent = manager.find_by_path("root/sub").unwrap().handle();
        manager.import_asset("root/sub/c.wav", parent);
        assert_eq!(drops.get(), 1);

        manager.refresh();
        assert_eq!(drops.get(), files.len());

        drop(manager);
        assert_eq!(drops.get(), files.len());
    }

    #[test]
    fn manager_drop_releases_every_live_asset() {
        let fs = MemoryFileSystem::new()
            .with_file("root/a.png", "a")
            .with_file("root/models/m.fbx", "m");
        let mut manager = manager_over(fs);
        manager.refresh();
        let drops = Rc::new(Cell::new(0));
        let handles: Vec<AssetHandle> = manager
            .assets()
            .iter()
            .filter(|(_, asset)| !asset.is_directory())
            .map(|(handle, _)| handle)
            .collect();
        for handle in &handles {
            manager
                .get_mut(*handle)
                .unwrap()
                .set_content(DropCounter(drops.clone()));
        }

        drop(manager);
        assert_eq!(drops.get(), handles.len());
    }

    #[test]
    fn type_mismatch_demotes_to_none_and_keeps_handle() {
        let mut manager = manager_over(MemoryFileSystem::new());
        let model = manager.create_empty_asset("/p/a.model", AssetType::Model, AssetHandle::none());
        let model_handle = manager.add_asset(model).unwrap();

        let asset =
            manager.create_empty_asset("/p/a.model", AssetType::Texture, AssetHandle::none());

        assert_eq!(asset.asset_type(), AssetType::None);
        assert_eq!(asset.handle(), model_handle);
        assert_eq!(
            manager.registry().get("/p/a.model").unwrap().asset_type,
            AssetType::Model
        );
    }

    #[test]
    fn file_replaced_by_directory_stays_a_directory() {
        let mut manager = manager_over(MemoryFileSystem::new().with_file("root/thing.png", "x"));
        manager.refresh();
        let file = manager.find_by_path("root/thing.png").unwrap().handle();

        let directory = manager.update_directory_assets("root/thing.png", manager.root());
        let asset = manager.get(directory).unwrap();

        assert_eq!(directory, file);
        assert_eq!(asset.asset_type(), AssetType::None);
        assert!(asset.is_directory());
    }

    #[test]
    fn embedded_asset_gets_its_own_handle() {
        let mut manager = manager_over(MemoryFileSystem::new().with_file("root/scene.fbx", "s"));
        manager.refresh();
        let host = manager.registry().get("root/scene.fbx").unwrap().handle;
        let before = manager.registry().len();

        let mut mesh = Asset::detached(AssetType::Model);
        let handle = manager
            .create_embedded_asset(AssetType::Model, &mut mesh, "root/scene.fbx", "submesh0")
            .unwrap();

        assert_eq!(mesh.path(), "<root/scene.fbx>submesh0");
        assert_eq!(mesh.handle(), handle);
        assert_ne!(handle, host);
        assert_eq!(mesh.parent(), host);
        assert_eq!(mesh.filename(), "submesh0");
        assert_eq!(manager.registry().len(), before + 1);
        assert_eq!(manager.registry().get(mesh.path()).unwrap().handle, handle);
        assert!(manager.get(handle).is_none());
    }

    #[test]
    fn embedded_asset_handle_is_stable() {
        let mut manager = manager_over(MemoryFileSystem::new().with_file("root/scene.fbx", "s"));
        manager.refresh();

        let mut first = Asset::detached(AssetType::Model);
        manager
            .create_embedded_asset(AssetType::Model, &mut first, "root/scene.fbx", "submesh0")
            .unwrap();
        let mut second = Asset::detached(AssetType::Model);
        manager
            .create_embedded_asset(AssetType::Model, &mut second, "root/scene.fbx", "submesh0")
            .unwrap();

        assert_eq!(first.handle(), second.handle());
    }

    #[test]
    fn embedded_asset_requires_registered_host() {
        let mut manager = manager_over(MemoryFileSystem::new());
        let mut mesh = Asset::detached(AssetType::Model);
        let err = manager
            .create_embedded_asset(AssetType::Model, &mut mesh, "root/missing.fbx", "submesh0")
            .unwrap_err();
        assert!(matches!(err, AssetError::UnknownPath { .. }));
        assert!(manager.registry().is_empty());
    }

    #[test]
    fn compaction_drops_unstored_embedded_rows() {
        let mut manager = manager_over(MemoryFileSystem::new().with_file("root/scene.fbx", "s"));
        manager.refresh();
        let mut dropped = Asset::detached(AssetType::Model);
        manager
            .create_embedded_asset(AssetType::Model, &mut dropped, "root/scene.fbx", "dropped")
            .unwrap();
        let mut kept = Asset::detached(AssetType::Model);
        manager
            .create_embedded_asset(AssetType::Model, &mut kept, "root/scene.fbx", "kept")
            .unwrap();
        manager.add_asset(kept).unwrap();

        manager.update_asset_registry();

        assert!(manager.registry().contains("<root/scene.fbx>kept"));
        assert!(!manager.registry().contains("<root/scene.fbx>dropped"));
    }

    #[test]
    fn detached_assets_cannot_be_added() {
        let mut manager = manager_over(MemoryFileSystem::new());
        let err = manager.add_asset(Asset::detached(AssetType::Model)).unwrap_err();
        assert!(matches!(err, AssetError::UnknownHandle { .. }));
    }

    #[test]
    fn loading_directories_is_a_noop() {
        let mut manager = manager_over(MemoryFileSystem::new().with_dir("root"));
        let root = manager.refresh();
        assert!(!manager.load(root).unwrap());
        assert!(manager.get(root).unwrap().is_loaded());
    }

    #[test]
    fn loading_without_loader_is_an_error() {
        let mut manager = manager_over(MemoryFileSystem::new().with_file("root/a.png", "a"));
        manager.refresh();
        let handle = manager.find_by_path("root/a.png").unwrap().handle();

        let err = manager.load(handle).unwrap_err();

        assert!(matches!(
            err,
            AssetError::NoLoaderBound {
                asset_type: AssetType::Texture,
                ..
            }
        ));
        assert!(!manager.get(handle).unwrap().is_loaded());
    }

    #[test]
    fn loader_result_is_stored_in_loaded_flag() {
        let fs = MemoryFileSystem::new()
            .with_file("root/good.png", "pixels")
            .with_file("root/bad.fbx", "");
        let serializers = SerializerRegistry::new()
            .with(AssetType::Texture, |manager: &mut AssetManager, asset: &mut Asset| {
                match manager.filesystem().read(asset.path()) {
                    Ok(bytes) => {
                        asset.set_content(bytes);
                        true
                    }
                    Err(_) => false,
                }
            })
            .with(AssetType::Model, |_: &mut AssetManager, _: &mut Asset| false);
        let mut manager =
            AssetManager::new(AssetSettings::in_memory("root"), fs, serializers).unwrap();
        manager.refresh();
        let good = manager.find_by_path("root/good.png").unwrap().handle();
        let bad = manager.find_by_path("root/bad.fbx").unwrap().handle();

        assert!(manager.load(good).unwrap());
        assert!(!manager.load(bad).unwrap());

        let texture = manager.get(good).unwrap();
        assert!(texture.is_loaded());
        assert_eq!(texture.content::<Vec<u8>>().map(Vec::as_slice), Some(&b"pixels"[..]));
        assert!(!manager.get(bad).unwrap().is_loaded());
    }

    #[test]
    fn loaders_can_register_embedded_assets() {
        let fs = MemoryFileSystem::new().with_file("root/scene.fbx", "two meshes");
        let serializers = SerializerRegistry::new().with(
            AssetType::Model,
            |manager: &mut AssetManager, asset: &mut Asset| {
                for name in ["mesh0", "mesh1"] {
                    let mut mesh = Asset::detached(AssetType::Model);
                    let created = manager.create_embedded_asset(
                        AssetType::Model,
                        &mut mesh,
                        asset.path(),
                        name,
                    );
                    if created.is_err() || manager.add_asset(mesh).is_err() {
                        return false;
                    }
                }
                true
            },
        );
        let mut manager =
            AssetManager::new(AssetSettings::in_memory("root"), fs, serializers).unwrap();
        manager.refresh();
        let scene = manager.find_by_path("root/scene.fbx").unwrap().handle();

        assert!(manager.load(scene).unwrap());
        manager.update_asset_registry();

        let mesh = manager.find_by_path("<root/scene.fbx>mesh1").unwrap();
        assert_eq!(mesh.parent(), scene);
        assert_eq!(manager.registry().len(), 4);
    }

    #[test]
    fn deleted_file_stays_live_until_removed() {
        let fs = MemoryFileSystem::new()
            .with_file("root/a.png", "a")
            .with_file("root/b.png", "b");
        let mut manager = manager_over(fs.clone());
        manager.refresh();
        let stale = manager.find_by_path("root/b.png").unwrap().handle();

        let mut fs = fs;
        fs.remove("root/b.png");
        manager.filesystem = Box::new(fs);

        manager.refresh();
        assert!(manager.find_by_path("root/b.png").is_some());
        assert!(manager.registry().contains("root/b.png"));
        assert!(manager.sorted().any(|asset| asset.handle() == stale));

        manager.remove_asset(stale);
        manager.update_asset_registry();
        assert!(manager.find_by_path("root/b.png").is_none());
        assert!(!manager.registry().contains("root/b.png"));
    }

    #[test]
    fn compaction_inside_a_loader_keeps_the_host() {
        let fs = MemoryFileSystem::new().with_file("root/scene.fbx", "one mesh");
        let serializers = SerializerRegistry::new().with(
            AssetType::Model,
            |manager: &mut AssetManager, asset: &mut Asset| {
                let mut mesh = Asset::detached(AssetType::Model);
                if manager
                    .create_embedded_asset(AssetType::Model, &mut mesh, asset.path(), "mesh0")
                    .is_err()
                    || manager.add_asset(mesh).is_err()
                {
                    return false;
                }
                manager.update_asset_registry();
                true
            },
        );
        let mut manager =
            AssetManager::new(AssetSettings::in_memory("root"), fs, serializers).unwrap();
        manager.refresh();
        let scene = manager.find_by_path("root/scene.fbx").unwrap().handle();

        assert!(manager.load(scene).unwrap());
        assert_eq!(manager.registry().get("root/scene.fbx").unwrap().handle, scene);

        manager.refresh();
        assert_eq!(manager.find_by_path("root/scene.fbx").unwrap().handle(), scene);
        assert_eq!(manager.registry().get("root/scene.fbx").unwrap().handle, scene);
        assert_eq!(manager.assets().len(), 3);
        assert!(manager.sorted().any(|asset| asset.handle() == scene));
    }

    #[test]
    fn load_all_skips_types_without_loader() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let fs = MemoryFileSystem::new()
            .with_file("root/a.png", "a")
            .with_file("root/b.png", "b")
            .with_file("root/c.fbx", "c");
        let serializers = SerializerRegistry::new().with(
            AssetType::Texture,
            move |_: &mut AssetManager, _: &mut Asset| {
                counter.set(counter.get() + 1);
                true
            },
        );
        let mut manager =
            AssetManager::new(AssetSettings::in_memory("root"), fs, serializers).unwrap();
        manager.refresh();

        assert_eq!(manager.load_all(), 2);
        assert_eq!(calls.get(), 2);
        // already loaded assets are not loaded twice
        assert_eq!(manager.load_all(), 0);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn sorted_view_orders_by_type_then_name() {
        let fs = MemoryFileSystem::new()
            .with_file("root/Zebra.png", "z")
            .with_file("root/apple.png", "a")
            .with_file("root/mesh.fbx", "m")
            .with_file("root/readme.txt", "r")
            .with_dir("root/Beta");
        let mut manager = manager_over(fs);
        manager.refresh();

        let names: Vec<&str> = manager.sorted().map(Asset::filename).collect();
        assert_eq!(
            names,
            ["readme.txt", "Beta", "root", "mesh.fbx", "apple.png", "Zebra.png"]
        );
    }

    #[test]
    fn sorting_is_stable_for_equal_keys() {
        let fs = MemoryFileSystem::new()
            .with_file("root/a/Same.png", "1")
            .with_file("root/b/same.png", "2")
            .with_file("root/c/SAME.png", "3");
        let mut manager = manager_over(fs);
        manager.refresh();

        let before: Vec<AssetHandle> = manager
            .assets()
            .iter()
            .filter(|(_, asset)| asset.asset_type() == AssetType::Texture)
            .map(|(handle, _)| handle)
            .collect();
        let after: Vec<AssetHandle> = manager
            .sorted()
            .filter(|asset| asset.asset_type() == AssetType::Texture)
            .map(Asset::handle)
            .collect();

        assert_eq!(before, after);
    }

    #[test]
    fn compaction_keeps_exactly_live_handles() {
        let fs = MemoryFileSystem::new()
            .with_file("root/models/mesh1.fbx", "m")
            .with_file("root/a.png", "a");
        let mut manager = manager_over(fs);
        manager.refresh();

        let models = manager.find_by_path("root/models").unwrap().handle();
        let removed = manager.remove_asset(models).unwrap();
        assert_eq!(removed.path(), "root/models");
        manager.update_asset_registry();

        for metadata in manager.registry().iter() {
            assert!(manager.assets().contains(metadata.handle));
        }
        for (handle, asset) in manager.assets().iter() {
            assert_eq!(manager.registry().get(asset.path()).unwrap().handle, handle);
        }
        assert_eq!(manager.registry().len(), 2);
        assert!(manager.find_by_path("root/models/mesh1.fbx").is_none());
        assert_eq!(manager.get(manager.root()).unwrap().children().len(), 1);
    }

    #[test]
    fn unreadable_directory_is_skipped() {
        let mut fs = MemoryFileSystem::new()
            .with_file("root/locked/secret.png", "s")
            .with_file("root/open/a.png", "a");
        fs.deny("root/locked");
        let mut manager = manager_over(fs);
        manager.refresh();

        assert_eq!(manager.scan_failures().len(), 1);
        assert_eq!(manager.scan_failures()[0].path, "root/locked");
        let locked = manager.find_by_path("root/locked").unwrap();
        assert!(locked.children().is_empty());
        assert!(manager.find_by_path("root/open/a.png").is_some());
        assert!(manager.find_by_path("root/locked/secret.png").is_none());

        // failures reset on the next refresh
        manager.refresh();
        assert_eq!(manager.scan_failures().len(), 1);
    }

    #[test]
    fn missing_root_is_recorded_not_fatal() {
        let mut manager = manager_over(MemoryFileSystem::new());
        let root = manager.refresh();
        assert!(root.is_valid());
        assert_eq!(manager.scan_failures().len(), 1);
        assert_eq!(manager.assets().len(), 1);
    }
}
