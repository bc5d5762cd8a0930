//! Stable asset identity
//!
//! Handles are 128-bit random values. A handle is minted once for a logical
//! path and then persisted in the registry, so it survives re-scans and
//! process restarts.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Persistent identity of one logical asset.
///
/// The nil UUID is reserved as the "none" sentinel, used for "no parent"
/// and "unassigned".
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetHandle(Uuid);

impl AssetHandle {
    /// Mint a fresh handle (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The sentinel handle.
    pub const fn none() -> Self {
        Self(Uuid::nil())
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        !self.0.is_nil()
    }

    /// Rebuild a handle from its 128-bit value (for save files).
    pub const fn from_u128(bits: u128) -> Self {
        Self(Uuid::from_u128(bits))
    }

    pub fn as_u128(self) -> u128 {
        self.0.as_u128()
    }
}

impl Default for AssetHandle {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
