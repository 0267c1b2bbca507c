//! Mock asset registry for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{MarketError, MarketResult};
use crate::traits::AssetRegistry;
use crate::types::{AccountId, AssetId, CollectionId};

#[derive(Debug)]
struct RegistryInner {
    /// Current owner per asset.
    owners: Mutex<HashMap<(CollectionId, AssetId), AccountId>>,
    /// (owner, operator) pairs with blanket transfer approval.
    approvals: Mutex<HashSet<(AccountId, AccountId)>>,
    /// The custodian account the market moves assets through.
    custodian: AccountId,
}

/// In-memory asset-ownership registry.
///
/// Transfers out of an account require that account to be the current
/// owner and to have approved the configured custodian, matching the
/// approval gate of a real registry. Clones share state.
#[derive(Debug, Clone)]
pub struct MockAssetRegistry {
    inner: Arc<RegistryInner>,
}

impl MockAssetRegistry {
    /// Create a registry whose transfer gate checks approvals granted to
    /// `custodian` (the market's custody account).
    pub fn new(custodian: AccountId) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                owners: Mutex::new(HashMap::new()),
                approvals: Mutex::new(HashSet::new()),
                custodian,
            }),
        }
    }

    /// Seed an asset with an initial owner.
    pub fn mint(&self, collection: CollectionId, asset: AssetId, owner: AccountId) {
        self.inner.owners.lock().insert((collection, asset), owner);
    }

    /// Grant or revoke the custodian's blanket approval for `owner`.
    pub fn set_approval_for_all(&self, owner: AccountId, operator: AccountId, approved: bool) {
        let mut approvals = self.inner.approvals.lock();
        if approved {
            approvals.insert((owner, operator));
        } else {
            approvals.remove(&(owner, operator));
        }
    }

    /// Synchronous owner lookup for test assertions.
    pub fn owner(&self, collection: CollectionId, asset: AssetId) -> Option<AccountId> {
        self.inner.owners.lock().get(&(collection, asset)).copied()
    }
}

#[async_trait]
impl AssetRegistry for MockAssetRegistry {
    async fn owner_of(
        &self,
        collection: CollectionId,
        asset: AssetId,
    ) -> MarketResult<AccountId> {
        self.inner
            .owners
            .lock()
            .get(&(collection, asset))
            .copied()
            .ok_or_else(|| MarketError::NotFound(format!("asset {asset} not known to the registry")))
    }

    async fn transfer_custody(
        &self,
        collection: CollectionId,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
    ) -> MarketResult<()> {
        let mut owners = self.inner.owners.lock();
        let owner = owners
            .get(&(collection, asset))
            .copied()
            .ok_or_else(|| MarketError::NotFound(format!("asset {asset} not known to the registry")))?;
        if owner != from {
            return Err(MarketError::Unauthorized(format!(
                "account {from} is not the owner of asset {asset}"
            )));
        }
        // Moving an asset out of a third-party account needs that
        // account's blanket approval for the custodian.
        if from != self.inner.custodian
            && !self
                .inner
                .approvals
                .lock()
                .contains(&(from, self.inner.custodian))
        {
            return Err(MarketError::NotApproved(format!(
                "custodian is not approved to move assets of {from}"
            )));
        }
        owners.insert((collection, asset), to);
        Ok(())
    }

    async fn is_approved_for_all(
        &self,
        owner: AccountId,
        operator: AccountId,
    ) -> MarketResult<bool> {
        Ok(self.inner.approvals.lock().contains(&(owner, operator)))
    }
}
