//! Loader bindings per asset type

use crate::{Asset, AssetManager, AssetType};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{trace, warn};

/// Fills an asset's content.
///
/// Loaders get mutable access to the manager so they can register embedded
/// assets while decoding their host file. They are never called for
/// directories or untyped assets.
pub trait AssetLoader {
    /// Returns whether the asset was loaded.
    fn load(&self, manager: &mut AssetManager, asset: &mut Asset) -> bool;
}

impl<F> AssetLoader for F
where
    F: Fn(&mut AssetManager, &mut Asset) -> bool,
{
    fn load(&self, manager: &mut AssetManager, asset: &mut Asset) -> bool {
        self(manager, asset)
    }
}

/// Maps asset types to their loader. One binding per type, last write wins.
#[derive(Default, Clone)]
pub struct SerializerRegistry {
    loaders: HashMap<AssetType, Rc<dyn AssetLoader>>,
}

impl SerializerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `loader` to `asset_type`, replacing any previous binding.
    ///
    /// Types without content (`None`, `Directory`) cannot be bound; the call
    /// is ignored with a warning.
    pub fn register(&mut self, asset_type: AssetType, loader: impl AssetLoader + 'static) {
        if !asset_type.has_content() {
            warn!("ASSET_MANAGER: refusing loader binding for {asset_type} assets");
            return;
        }
        if self.loaders.insert(asset_type, Rc::new(loader)).is_some() {
            trace!("ASSET_MANAGER: replaced loader for {asset_type}");
        }
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, asset_type: AssetType, loader: impl AssetLoader + 'static) -> Self {
        self.register(asset_type, loader);
        self
    }

    pub fn lookup(&self, asset_type: AssetType) -> Option<Rc<dyn AssetLoader>> {
        self.loaders.get(&asset_type).cloned()
    }

    pub fn contains(&self, asset_type: AssetType) -> bool {
        self.loaders.contains_key(&asset_type)
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}
