//! Live asset store
//!
//! Owns every live [`Asset`] by value. Replacing the entry for a handle drops
//! the previous asset right there, so no asset can be released twice or
//! leaked. Iteration is in handle order, which keeps the sorted view
//! deterministic across runs.

use crate::{Asset, AssetHandle};
use std::collections::BTreeMap;
use tracing::trace;

#[derive(Debug, Default)]
pub struct AssetStore {
    assets: BTreeMap<AssetHandle, Asset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `asset` under its own handle, returning the asset it replaced.
    pub fn insert(&mut self, asset: Asset) -> Option<Asset> {
        let handle = asset.handle();
        let previous = self.assets.insert(handle, asset);
        if previous.is_some() {
            trace!("ASSET_MANAGER: replaced live asset {handle}");
        }
        previous
    }

    pub fn get(&self, handle: AssetHandle) -> Option<&Asset> {
        self.assets.get(&handle)
    }

    pub fn get_mut(&mut self, handle: AssetHandle) -> Option<&mut Asset> {
        self.assets.get_mut(&handle)
    }

    pub fn remove(&mut self, handle: AssetHandle) -> Option<Asset> {
        self.assets.remove(&handle)
    }

    pub fn contains(&self, handle: AssetHandle) -> bool {
        self.assets.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetHandle, &Asset)> {
        self.assets.iter().map(|(handle, asset)| (*handle, asset))
    }

    pub fn handles(&self) -> impl Iterator<Item = AssetHandle> + '_ {
        self.assets.keys().copied()
    }
}
