//! The market's explicit state object and its persistence boundary.
//!
//! All bookkeeping lives in one [`MarketState`] value: loaded from a CBOR
//! snapshot at startup, mutated in memory under the per-asset locks, and
//! flushed back after each commit when a snapshot path is configured.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MarketError, MarketResult};
use crate::marketplace::item::{MarketItem, PrivateMarketItem, Registration};
use crate::types::AssetId;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketState {
    /// Every public listing ever created, keyed by asset id. Terminal
    /// records stay here with `owner` set; a fresh listing on the same
    /// asset id overwrites them.
    pub items: HashMap<AssetId, MarketItem>,

    /// Every private listing ever created, keyed by asset id.
    pub private_items: HashMap<AssetId, PrivateMarketItem>,

    /// Append-only registration history.
    pub registrations: Vec<Registration>,
}

impl MarketState {
    /// Whether any listing (public or private) is active for this asset.
    pub fn has_active_listing(&self, asset_id: AssetId) -> bool {
        self.items
            .get(&asset_id)
            .is_some_and(MarketItem::is_active)
            || self
                .private_items
                .get(&asset_id)
                .is_some_and(PrivateMarketItem::is_active)
    }

    /// Load a snapshot, or start empty if none exists yet.
    pub fn load(path: &Path) -> MarketResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = std::fs::read(path)
            .map_err(|e| MarketError::Storage(format!("read {}: {e}", path.display())))?;
        ciborium::from_reader(bytes.as_slice())
            .map_err(|e| MarketError::Storage(format!("decode snapshot: {e}")))
    }

    /// Write the snapshot atomically: temp file in the same directory,
    /// then rename over the target.
    pub fn flush(&self, path: &Path) -> MarketResult<()> {
        let mut buffer = Vec::new();
        ciborium::into_writer(self, &mut buffer)
            .map_err(|e| MarketError::Storage(format!("encode snapshot: {e}")))?;

        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, &buffer)
            .map_err(|e| MarketError::Storage(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| MarketError::Storage(format!("rename {}: {e}", path.display())))?;
        Ok(())
    }
}
